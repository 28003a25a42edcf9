//! Resolved targets.
//!
//! A [`Target`] is the read-only input to emission: sources, configuration
//! chain, dependency lists and the link data the resolution phase computed.
//! Nothing here is mutated during emission.

use camino::Utf8PathBuf;

use crate::config_values::{ConfigValues, LibFile};
use crate::graph::{TargetId, ToolchainId};
use crate::label::Label;
use crate::output_file::OutputFile;
use crate::source_file::{SourceFile, SourceFileTypeSet};

/// What a target produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Executable,
    SharedLibrary,
    LoadableModule,
    StaticLibrary,
    SourceSet,
    RustLibrary,
    RustProcMacro,
    Group,
    Action,
    Copy,
}

/// Swift-specific resolved data.
#[derive(Debug, Clone, Default)]
pub struct SwiftValues {
    /// The `.swiftmodule` this target produces, when it compiles Swift.
    pub module_output_file: Option<OutputFile>,
    /// Swift modules this target imports, in resolution order.
    pub modules: Vec<TargetId>,
}

/// One resolved target in the build graph.
#[derive(Debug, Clone)]
pub struct Target {
    pub label: Label,
    pub output_type: OutputType,
    pub sources: Vec<SourceFile>,
    /// The target's own values; walked before `configs`.
    pub config: ConfigValues,
    pub configs: Vec<ConfigValues>,
    pub output_name: String,
    /// Overrides the tool's default extension when set. Includes the `.`.
    pub output_extension: Option<String>,
    /// Overrides the tool's default output directory when set.
    pub output_dir: Option<Utf8PathBuf>,
    pub toolchain: ToolchainId,
    pub public_deps: Vec<TargetId>,
    pub private_deps: Vec<TargetId>,
    pub data_deps: Vec<TargetId>,
    /// The file dependents link against.
    pub link_output: Option<OutputFile>,
    /// The file dependents depend on. Differs from `link_output` for shared
    /// libraries with an import/TOC file.
    pub dependency_output: Option<OutputFile>,
    pub swift: SwiftValues,
    /// Ordered transitive closure of inherited libraries; consulted for
    /// Rust static libraries when this target is final.
    pub inherited_libraries: Vec<TargetId>,
    /// Resolved `libs` from the dependency tree, in discovery order.
    pub all_libs: Vec<LibFile>,
    pub all_lib_dirs: Vec<Utf8PathBuf>,
    pub all_frameworks: Vec<String>,
    pub all_framework_dirs: Vec<Utf8PathBuf>,
    /// Whether this target assembles a framework bundle.
    pub is_framework_bundle: bool,
}

impl Target {
    #[must_use]
    pub fn new(label: Label, output_type: OutputType) -> Self {
        let output_name = label.name().to_owned();
        Self {
            label,
            output_type,
            sources: Vec::new(),
            config: ConfigValues::default(),
            configs: Vec::new(),
            output_name,
            output_extension: None,
            output_dir: None,
            toolchain: ToolchainId::default(),
            public_deps: Vec::new(),
            private_deps: Vec::new(),
            data_deps: Vec::new(),
            link_output: None,
            dependency_output: None,
            swift: SwiftValues::default(),
            inherited_libraries: Vec::new(),
            all_libs: Vec::new(),
            all_lib_dirs: Vec::new(),
            all_frameworks: Vec::new(),
            all_framework_dirs: Vec::new(),
            is_framework_bundle: false,
        }
    }

    /// The config chain in extraction order: own values, then each config.
    pub fn config_chain(&self) -> impl Iterator<Item = &ConfigValues> {
        std::iter::once(&self.config).chain(self.configs.iter())
    }

    #[must_use]
    pub fn source_types_used(&self) -> SourceFileTypeSet {
        SourceFileTypeSet::from_sources(&self.sources)
    }

    /// Public deps then private deps, in declaration order.
    pub fn linked_deps(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.public_deps.iter().chain(self.private_deps.iter()).copied()
    }

    /// A final target's link pulls in transitive Rust libraries and Swift
    /// modules; an intermediate one defers them to its own dependents.
    #[must_use]
    pub fn is_final(&self) -> bool {
        matches!(
            self.output_type,
            OutputType::Executable | OutputType::SharedLibrary | OutputType::LoadableModule,
        )
    }

    #[must_use]
    pub fn is_linkable(&self) -> bool {
        matches!(
            self.output_type,
            OutputType::StaticLibrary
                | OutputType::SharedLibrary
                | OutputType::LoadableModule
                | OutputType::RustLibrary
                | OutputType::RustProcMacro,
        )
    }

    #[must_use]
    pub fn builds_swift_module(&self) -> bool {
        self.swift.module_output_file.is_some() && self.source_types_used().swift_used()
    }

    /// First non-empty precompiled header in chain order.
    #[must_use]
    pub fn precompiled_header(&self) -> Option<&str> {
        self.config_chain()
            .find(|config| !config.precompiled_header.is_empty())
            .map(|config| config.precompiled_header.as_str())
    }

    /// First precompiled source in chain order.
    #[must_use]
    pub fn precompiled_source(&self) -> Option<&SourceFile> {
        self.config_chain()
            .find_map(|config| config.precompiled_source.as_ref())
    }

    #[must_use]
    pub fn has_precompiled_headers(&self) -> bool {
        self.config_chain().any(ConfigValues::has_precompiled_header)
    }

    /// Build-relative object directory for this target, e.g. `obj/foo`.
    #[must_use]
    pub fn target_out_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from("obj").join(self.label.dir_as_output_component())
    }

    /// The stamp file standing for this target when it produces no artifact.
    #[must_use]
    pub fn stamp_output(&self) -> OutputFile {
        match &self.dependency_output {
            Some(output) => output.clone(),
            None => OutputFile::new(
                self.target_out_dir()
                    .join(format!("{}.stamp", self.output_name)),
            ),
        }
    }
}
