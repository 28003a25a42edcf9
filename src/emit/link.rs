//! The final link edge and its tail variables.

use std::fmt::Write;

use indexmap::IndexSet;

use crate::config_values::{LibFile, collect_flags, select_arflags, select_ldflags};
use crate::error::EmitError;
use crate::escape::{EscapeMode, escape_into, escaped};
use crate::graph::{ClassifiedDeps, TargetId};
use crate::output_file::OutputFile;
use crate::path_output::PathOutput;
use crate::source_file::SourceFile;
use crate::target::OutputType;
use crate::tool::{CTool, ToolHeader, ToolKind};

use super::CBinaryEmitter;

impl<W: Write> CBinaryEmitter<'_, W> {
    pub(super) fn write_linker_stuff(
        &mut self,
        classified: &ClassifiedDeps,
        object_files: &[OutputFile],
        other_files: &[SourceFile],
        input_deps: &[OutputFile],
    ) -> Result<(), EmitError> {
        let graph = self.graph;
        let target = self.target;
        let toolchain = self.toolchain;
        let final_kind = ToolKind::for_target_final_output(target.output_type);
        let tool = toolchain
            .tool(final_kind)
            .expect("toolchain provides a tool for the target's final output");
        let header = tool.header();

        let output_files = graph.apply_linker_outputs(target, header, &header.outputs);
        write!(self.out, "build")?;
        self.path.write_files(self.out, &output_files)?;
        write!(self.out, ": {}", toolchain.rule_name(final_kind))?;

        // Explicit inputs: own objects, source-set contributions, then
        // directly linkable dependency outputs.
        self.path.write_files(self.out, object_files)?;
        self.path.write_files(self.out, &classified.extra_object_files)?;

        let mut implicit_deps: Vec<OutputFile> = Vec::new();
        let mut solibs: Vec<OutputFile> = Vec::new();
        for dep_id in &classified.linkable_deps {
            let dep = graph.target(*dep_id);
            let Some(link_output) = &dep.link_output else {
                return Err(EmitError::MissingLinkOutput {
                    target: target.label.without_toolchain(),
                    dependency: dep.label.without_toolchain(),
                });
            };
            // Rust libraries enter through the inherited-library walk below.
            if matches!(
                dep.output_type,
                OutputType::RustLibrary | OutputType::RustProcMacro,
            ) {
                continue;
            }
            match &dep.dependency_output {
                // A shared library with separate link and dependency files:
                // relink tracks the dependency file while the command line
                // names the library itself.
                Some(dep_output) if dep_output != link_output => {
                    implicit_deps.push(dep_output.clone());
                    solibs.push(link_output.clone());
                }
                _ => {
                    write!(self.out, " ")?;
                    self.path.write_file(self.out, link_output)?;
                }
            }
        }

        // At most one def file participates in the link.
        let mut def_file: Option<&SourceFile> = None;
        for file in other_files {
            if file.is_def() {
                def_file = Some(file);
                implicit_deps.push(graph.settings().source_to_output(file));
                break;
            }
        }

        // Libraries referenced by path rather than by search name.
        for lib in &target.all_libs {
            if let LibFile::Path(file) = lib {
                implicit_deps.push(graph.settings().source_to_output(file));
            }
        }

        // Framework regeneration forces a relink so API changes propagate,
        // even when the relink is sometimes unnecessary.
        for dep_id in &classified.framework_deps {
            if let Some(output) = graph.target(*dep_id).dependency_output.clone() {
                implicit_deps.push(output);
            }
        }

        // Only needed when there are no object files to carry the
        // dependency transitively, and harmless otherwise.
        implicit_deps.extend(input_deps.iter().cloned());

        // A final link pulls in the whole tree of transitive Rust static
        // libraries found inside the linking unit.
        let mut rlibs: Vec<OutputFile> = Vec::new();
        if target.is_final() {
            for dep_id in &target.inherited_libraries {
                let dep = graph.target(*dep_id);
                if dep.output_type == OutputType::RustLibrary {
                    if let Some(output) = dep.dependency_output.clone() {
                        rlibs.push(output.clone());
                        implicit_deps.push(output);
                    }
                }
            }
        }

        // Swift modules from dependencies, and from self when built here.
        let mut swiftmodules: Vec<OutputFile> = Vec::new();
        if target.is_final() {
            for dep_id in &classified.swiftmodule_deps {
                if let Some(module) = graph.target(*dep_id).swift.module_output_file.clone() {
                    swiftmodules.push(module.clone());
                    implicit_deps.push(module);
                }
            }
            if target.builds_swift_module() {
                if let Some(module) = target.swift.module_output_file.clone() {
                    swiftmodules.push(module.clone());
                    implicit_deps.push(module);
                }
            }
        }

        if !implicit_deps.is_empty() {
            write!(self.out, " |")?;
            self.path.write_files(self.out, &implicit_deps)?;
        }

        self.write_order_only_dependencies(&classified.non_linkable_deps)?;
        writeln!(self.out)?;

        match target.output_type {
            OutputType::Executable | OutputType::SharedLibrary | OutputType::LoadableModule => {
                let c_tool = tool.as_c();
                self.write_linker_flags(c_tool, def_file)?;
                self.write_libs(c_tool)?;
                self.write_frameworks(c_tool)?;
                self.write_swift_modules(c_tool, &swiftmodules)?;
            }
            OutputType::StaticLibrary => {
                write!(self.out, "  arflags =")?;
                for flag in collect_flags(target.config_chain(), select_arflags) {
                    write!(self.out, " {}", escaped(flag, EscapeMode::NinjaCommand))?;
                }
                writeln!(self.out)?;
            }
            _ => {}
        }
        self.write_output_substitutions(header)?;
        self.write_libs_list("solibs", &solibs)?;
        self.write_libs_list("rlibs", &rlibs)?;
        self.write_pool(final_kind)?;
        Ok(())
    }

    fn write_linker_flags(
        &mut self,
        tool: Option<&CTool>,
        def_file: Option<&SourceFile>,
    ) -> Result<(), EmitError> {
        let graph = self.graph;
        let target = self.target;
        write!(self.out, "  ldflags =")?;
        for flag in collect_flags(target.config_chain(), select_ldflags) {
            write!(self.out, " {}", escaped(flag, EscapeMode::NinjaCommand))?;
        }
        if let Some(tool) = tool {
            for dir in &target.all_lib_dirs {
                write!(self.out, " {}", tool.lib_dir_switch)?;
                let rebased = graph.settings().dir_to_output(dir);
                escape_into(self.out, rebased.as_str(), EscapeMode::NinjaCommand)?;
            }
            for dir in &target.all_framework_dirs {
                write!(self.out, " {}", tool.framework_dir_switch)?;
                let rebased = graph.settings().dir_to_output(dir);
                escape_into(self.out, rebased.as_str(), EscapeMode::NinjaCommand)?;
            }
        }
        if let Some(def) = def_file {
            write!(self.out, " /DEF:")?;
            let rebased = graph.settings().source_to_output(def);
            escape_into(self.out, rebased.as_str(), EscapeMode::NinjaCommand)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn write_libs(&mut self, tool: Option<&CTool>) -> Result<(), EmitError> {
        let graph = self.graph;
        let target = self.target;
        write!(self.out, "  libs =")?;
        for lib in &target.all_libs {
            match lib {
                LibFile::Path(file) => {
                    write!(self.out, " ")?;
                    let rebased = graph.settings().source_to_output(file);
                    escape_into(self.out, rebased.as_str(), EscapeMode::NinjaCommand)?;
                }
                LibFile::Name(name) => {
                    match tool {
                        Some(tool) => write!(self.out, " {}", tool.lib_switch)?,
                        None => write!(self.out, " ")?,
                    }
                    escape_into(self.out, name, EscapeMode::NinjaCommand)?;
                }
            }
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn write_frameworks(&mut self, tool: Option<&CTool>) -> Result<(), EmitError> {
        let target = self.target;
        write!(self.out, "  frameworks =")?;
        if let Some(tool) = tool {
            for framework in &target.all_frameworks {
                write!(self.out, " {}", tool.framework_switch)?;
                escape_into(self.out, framework, EscapeMode::NinjaCommand)?;
            }
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn write_swift_modules(
        &mut self,
        tool: Option<&CTool>,
        swiftmodules: &[OutputFile],
    ) -> Result<(), EmitError> {
        write!(self.out, "  swiftmodules =")?;
        if let Some(tool) = tool {
            for module in swiftmodules {
                write!(self.out, " {}", tool.swiftmodule_switch)?;
                escape_into(self.out, module.as_str(), EscapeMode::NinjaCommand)?;
            }
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn write_output_substitutions(&mut self, header: &ToolHeader) -> Result<(), EmitError> {
        let graph = self.graph;
        let target = self.target;
        writeln!(
            self.out,
            "  output_extension = {}",
            graph.resolved_output_extension(target, header),
        )?;
        writeln!(
            self.out,
            "  output_dir = {}",
            graph.resolved_output_dir(target, header),
        )?;
        Ok(())
    }

    fn write_libs_list(&mut self, label: &str, files: &[OutputFile]) -> Result<(), EmitError> {
        if files.is_empty() {
            return Ok(());
        }
        write!(self.out, "  {label} =")?;
        let command_output = PathOutput::new(EscapeMode::NinjaCommand);
        command_output.write_files(self.out, files)?;
        writeln!(self.out)?;
        Ok(())
    }

    fn write_order_only_dependencies(
        &mut self,
        non_linkable_deps: &IndexSet<TargetId>,
    ) -> Result<(), EmitError> {
        let graph = self.graph;
        let deps: Vec<OutputFile> = non_linkable_deps
            .iter()
            .filter_map(|dep_id| graph.target(*dep_id).dependency_output.clone())
            .collect();
        if !deps.is_empty() {
            write!(self.out, " ||")?;
            self.path.write_files(self.out, &deps)?;
        }
        Ok(())
    }
}
