//! The resolved build graph and per-target resolution queries.
//!
//! Targets and toolchains live in arenas addressed by index handles; the
//! graph is immutable for the duration of emission, so handles can be copied
//! freely across threads. Resolution queries (tool dispatch, template
//! application, dependency classification) are answered here rather than on
//! the records themselves.

use camino::Utf8PathBuf;
use indexmap::IndexSet;

use crate::output_file::OutputFile;
use crate::source_file::{SourceFile, SourceFileType};
use crate::substitution::{Substitution, SubstitutionList, SubstitutionPattern};
use crate::target::{OutputType, Target};
use crate::tool::{
    PrecompiledHeaderType, ToolHeader, ToolKind, gcc_pch_output_extension,
    windows_pch_object_extension,
};
use crate::toolchain::Toolchain;

/// Handle to a [`Target`] in the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TargetId(usize);

/// Handle to a [`Toolchain`] in the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ToolchainId(usize);

/// Fixed facts about the build tree layout.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    /// Path from the build root back to the source root, used to rebase
    /// source-absolute paths into build-relative ones.
    pub source_prefix: Utf8PathBuf,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            source_prefix: Utf8PathBuf::from("../.."),
        }
    }
}

impl BuildSettings {
    /// Rebase a source file into build-relative form, e.g. `//foo/a.cc`
    /// becomes `../../foo/a.cc`.
    #[must_use]
    pub fn source_to_output(&self, source: &SourceFile) -> OutputFile {
        OutputFile::new(
            self.source_prefix
                .join(source.as_str().trim_start_matches('/')),
        )
    }

    /// Object directory for files compiled from a source directory, e.g.
    /// sources under `//foo` compile into `obj/foo`.
    #[must_use]
    pub fn source_out_dir(&self, source: &SourceFile) -> Utf8PathBuf {
        Utf8PathBuf::from("obj").join(source.dir().as_str().trim_start_matches('/'))
    }

    /// Rebase a source-absolute directory into build-relative form.
    #[must_use]
    pub fn dir_to_output(&self, dir: &camino::Utf8Path) -> Utf8PathBuf {
        self.source_prefix.join(dir.as_str().trim_start_matches('/'))
    }
}

/// Dependencies of one target, classified for the link edge. Iteration
/// order everywhere is discovery order; emitters must not reorder.
#[derive(Debug, Default)]
pub struct ClassifiedDeps {
    pub linkable_deps: Vec<TargetId>,
    pub non_linkable_deps: IndexSet<TargetId>,
    pub framework_deps: Vec<TargetId>,
    pub swiftmodule_deps: Vec<TargetId>,
    /// Object files contributed by source-set dependencies.
    pub extra_object_files: Vec<OutputFile>,
}

/// Arena of resolved targets and toolchains.
#[derive(Debug, Default)]
pub struct BuildGraph {
    settings: BuildSettings,
    targets: Vec<Target>,
    toolchains: Vec<Toolchain>,
}

impl BuildGraph {
    #[must_use]
    pub fn new(settings: BuildSettings) -> Self {
        Self {
            settings,
            targets: Vec::new(),
            toolchains: Vec::new(),
        }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    pub fn add_toolchain(&mut self, toolchain: Toolchain) -> ToolchainId {
        self.toolchains.push(toolchain);
        ToolchainId(self.toolchains.len() - 1)
    }

    pub fn add_target(&mut self, target: Target) -> TargetId {
        self.targets.push(target);
        TargetId(self.targets.len() - 1)
    }

    /// # Panics
    ///
    /// Panics if `id` does not come from this graph.
    #[must_use]
    pub fn target(&self, id: TargetId) -> &Target {
        &self.targets[id.0]
    }

    /// # Panics
    ///
    /// Panics if `id` does not come from this graph.
    #[must_use]
    pub fn toolchain(&self, id: ToolchainId) -> &Toolchain {
        &self.toolchains[id.0]
    }

    #[must_use]
    pub fn toolchain_of(&self, target: &Target) -> &Toolchain {
        self.toolchain(target.toolchain)
    }

    /// The tool and output files compiling `source` inside `target`.
    ///
    /// Object sources are forwarded to the link without a tool. Sources with
    /// no applicable tool (headers, def files) yield `None`.
    #[must_use]
    pub fn output_files_for_source(
        &self,
        target: &Target,
        source: &SourceFile,
    ) -> Option<(Option<ToolKind>, Vec<OutputFile>)> {
        if source.source_type() == SourceFileType::Object {
            return Some((None, vec![self.settings.source_to_output(source)]));
        }
        let kind = ToolKind::for_source_type(source.source_type())?;
        let tool = self.toolchain_of(target).tool(kind)?;
        let outputs =
            self.apply_compiler_outputs(target, tool.header(), source, &tool.header().outputs);
        if outputs.is_empty() {
            return None;
        }
        Some((Some(kind), outputs))
    }

    /// Apply a compiler-scoped template list for one source.
    #[must_use]
    pub fn apply_compiler_outputs(
        &self,
        target: &Target,
        header: &ToolHeader,
        source: &SourceFile,
        list: &SubstitutionList,
    ) -> Vec<OutputFile> {
        list.patterns()
            .iter()
            .map(|pattern| {
                OutputFile::new(pattern.apply(|sub| self.bind_compiler(target, header, source, sub)))
            })
            .collect()
    }

    /// Apply a linker-scoped template list for the target's final output.
    #[must_use]
    pub fn apply_linker_outputs(
        &self,
        target: &Target,
        header: &ToolHeader,
        list: &SubstitutionList,
    ) -> Vec<OutputFile> {
        list.patterns()
            .iter()
            .map(|pattern| OutputFile::new(self.apply_linker_pattern(target, header, pattern)))
            .collect()
    }

    #[must_use]
    pub fn apply_linker_pattern(
        &self,
        target: &Target,
        header: &ToolHeader,
        pattern: &SubstitutionPattern,
    ) -> String {
        pattern.apply(|sub| self.bind_linker(target, header, sub))
    }

    /// The output directory of the final artifact: target override first,
    /// then the tool's default pattern, then the object directory.
    #[must_use]
    pub fn resolved_output_dir(&self, target: &Target, header: &ToolHeader) -> Utf8PathBuf {
        if let Some(dir) = &target.output_dir {
            return dir.clone();
        }
        if let Some(pattern) = &header.default_output_dir {
            return Utf8PathBuf::from(pattern.apply(|sub| match sub {
                Substitution::RootOutDir => ".".to_owned(),
                Substitution::TargetOutDir => target.target_out_dir().into_string(),
                _ => String::new(),
            }));
        }
        target.target_out_dir()
    }

    /// The extension of the final artifact: target override first, then the
    /// tool default.
    #[must_use]
    pub fn resolved_output_extension(&self, target: &Target, header: &ToolHeader) -> String {
        target
            .output_extension
            .clone()
            .unwrap_or_else(|| header.default_output_extension.clone())
    }

    /// The target's output name with the final-output tool's prefix applied,
    /// matching the value the output templates bind.
    #[must_use]
    pub fn target_output_name(&self, target: &Target) -> String {
        let kind = ToolKind::for_target_final_output(target.output_type);
        let prefix = self
            .toolchain_of(target)
            .tool(kind)
            .map(|tool| tool.header().output_prefix.as_str())
            .unwrap_or_default();
        format!("{prefix}{}", target.output_name)
    }

    /// The precompiled-header outputs for one language tool, empty when the
    /// target or tool does not use precompiled headers.
    #[must_use]
    pub fn pch_output_files(&self, target: &Target, kind: ToolKind) -> Vec<OutputFile> {
        if target.precompiled_source().is_none() {
            return Vec::new();
        }
        let Some(tool) = self.toolchain_of(target).c_tool(kind) else {
            return Vec::new();
        };
        let extension = match tool.precompiled_header_type {
            PrecompiledHeaderType::Msvc => windows_pch_object_extension(kind),
            PrecompiledHeaderType::Gcc => gcc_pch_output_extension(kind),
            PrecompiledHeaderType::None => None,
        };
        let Some(extension) = extension else {
            return Vec::new();
        };
        vec![OutputFile::new(target.target_out_dir().join(format!(
            "{}.precompile{extension}",
            target.output_name,
        )))]
    }

    /// Collect the object files a source-set contributes to its dependents.
    pub fn add_source_set_files(&self, source_set: &Target, out: &mut Vec<OutputFile>) {
        for source in &source_set.sources {
            let Some((_, outputs)) = self.output_files_for_source(source_set, source) else {
                continue;
            };
            if source.is_module_map() {
                continue;
            }
            if let Some(first) = outputs.into_iter().next() {
                out.push(first);
            }
        }
    }

    /// Classify a target's dependencies for the link edge. Computed once per
    /// emission; iteration order is discovery order.
    #[must_use]
    pub fn classify_deps(&self, target: &Target) -> ClassifiedDeps {
        let mut classified = ClassifiedDeps::default();
        let collect_objects = target.output_type != OutputType::SourceSet;
        for dep_id in target.linked_deps() {
            self.classify_dependency(dep_id, collect_objects, &mut classified);
        }
        for dep_id in &target.data_deps {
            classified.non_linkable_deps.insert(*dep_id);
        }
        classified
    }

    fn classify_dependency(
        &self,
        dep_id: TargetId,
        collect_objects: bool,
        classified: &mut ClassifiedDeps,
    ) {
        let dep = self.target(dep_id);
        if dep.builds_swift_module() {
            classified.swiftmodule_deps.push(dep_id);
        }
        if dep.output_type == OutputType::SourceSet {
            classified.non_linkable_deps.insert(dep_id);
            if collect_objects {
                self.add_source_set_files(dep, &mut classified.extra_object_files);
            }
        } else if dep.is_framework_bundle {
            classified.framework_deps.push(dep_id);
        } else if dep.is_linkable() {
            classified.linkable_deps.push(dep_id);
        } else {
            classified.non_linkable_deps.insert(dep_id);
        }
    }

    fn bind_compiler(
        &self,
        target: &Target,
        header: &ToolHeader,
        source: &SourceFile,
        sub: Substitution,
    ) -> String {
        match sub {
            Substitution::Source => self.settings.source_to_output(source).as_str().to_owned(),
            Substitution::SourceNamePart => source.name_part().to_owned(),
            Substitution::SourceOutDir => self.settings.source_out_dir(source).into_string(),
            Substitution::TargetOutDir => target.target_out_dir().into_string(),
            Substitution::TargetOutputName => {
                format!("{}{}", header.output_prefix, target.output_name)
            }
            Substitution::Label => target.label.to_string(),
            Substitution::LabelNoToolchain => target.label.without_toolchain(),
            Substitution::RootOutDir => ".".to_owned(),
            _ => String::new(),
        }
    }

    fn bind_linker(&self, target: &Target, header: &ToolHeader, sub: Substitution) -> String {
        match sub {
            Substitution::OutputDir => self.resolved_output_dir(target, header).into_string(),
            Substitution::OutputExtension => self.resolved_output_extension(target, header),
            Substitution::TargetOutputName => {
                format!("{}{}", header.output_prefix, target.output_name)
            }
            Substitution::TargetOutDir => target.target_out_dir().into_string(),
            Substitution::RootOutDir => ".".to_owned(),
            Substitution::Label => target.label.to_string(),
            Substitution::LabelNoToolchain => target.label.without_toolchain(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Label;

    #[test]
    fn rebases_sources_into_build_relative_form() {
        let settings = BuildSettings::default();
        let source = SourceFile::new("//foo/a.cc");
        assert_eq!(settings.source_to_output(&source).as_str(), "../../foo/a.cc");
        assert_eq!(settings.source_out_dir(&source), Utf8PathBuf::from("obj/foo"));
    }

    #[test]
    fn classifies_deps_in_discovery_order() {
        let mut graph = BuildGraph::default();
        let toolchain = graph.add_toolchain(Toolchain::new(Label::new("//tc", "default")));

        let mut shared = Target::new(Label::new("//lib", "s"), OutputType::SharedLibrary);
        shared.toolchain = toolchain;
        let shared = graph.add_target(shared);

        let mut action = Target::new(Label::new("//gen", "hdrs"), OutputType::Action);
        action.toolchain = toolchain;
        let action = graph.add_target(action);

        let mut static_lib = Target::new(Label::new("//lib", "a"), OutputType::StaticLibrary);
        static_lib.toolchain = toolchain;
        let static_lib = graph.add_target(static_lib);

        let mut exe = Target::new(Label::new("//app", "x"), OutputType::Executable);
        exe.toolchain = toolchain;
        exe.public_deps = vec![shared, action];
        exe.private_deps = vec![static_lib];
        let exe = graph.add_target(exe);

        let classified = graph.classify_deps(graph.target(exe));
        assert_eq!(classified.linkable_deps, vec![shared, static_lib]);
        assert_eq!(
            classified.non_linkable_deps.iter().copied().collect::<Vec<_>>(),
            vec![action],
        );
        assert!(classified.framework_deps.is_empty());
        assert!(classified.extra_object_files.is_empty());
    }
}
