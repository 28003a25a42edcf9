//! Emission errors.
//!
//! Every variant is fatal for the current target's artifact but not for the
//! process: the emitter reports through the shared context and aborts the
//! current target only.

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors surfaced while emitting build statements for one target.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum EmitError {
    /// Two sources map to the same object path.
    #[error("target {target} generates two object files with the same name: {path}")]
    #[diagnostic(
        code(kanna::emit::duplicate_object),
        help(
            "A file may be listed twice in the sources, or two source files \
             with the same name in different directories map to the same \
             object file. Rename one of the files or move one of the sources \
             to a separate source set."
        )
    )]
    DuplicateObject { target: String, path: Utf8PathBuf },

    /// A target exports a module map but the toolchain produced an
    /// unexpected number of compiled-module outputs.
    #[error("target {target} must compile its module map to exactly one module, found {count}")]
    #[diagnostic(code(kanna::emit::modulemap_output))]
    MissingModuleMapOutput { target: String, count: usize },

    /// A classified linkable dependency has no link output path.
    #[error("linkable dependency {dependency} of {target} has no link output")]
    #[diagnostic(code(kanna::emit::link_output))]
    MissingLinkOutput { target: String, dependency: String },

    /// A precompiled-header edge was requested for a tool whose dialect is
    /// `none`.
    #[error("tool {tool} requested a precompiled header without a header type")]
    #[diagnostic(code(kanna::emit::pch_type))]
    UnknownPchType { tool: &'static str },

    /// The underlying writer failed.
    #[error("failed to write build statements")]
    #[diagnostic(code(kanna::emit::format))]
    Format(#[from] std::fmt::Error),
}
