//! Kanna core library.
//!
//! Kanna emits the declarative build statements for C-family binary targets
//! of a resolved build graph: compile edges, precompiled-header edges, Swift
//! module edges and the final stamp or link edge, in the text format of the
//! low-level build executor.

pub mod config_values;
pub mod context;
pub mod emit;
pub mod error;
pub mod escape;
pub mod graph;
pub mod label;
pub mod output_file;
pub mod path_output;
pub mod source_file;
pub mod substitution;
pub mod target;
pub mod tool;
pub mod toolchain;
