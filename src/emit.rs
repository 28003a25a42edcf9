//! Build-statement emission for C-family binary targets.
//!
//! For one resolved target this module produces, in order: the variable
//! block, the input-dependency markers, the precompiled-header edges, one
//! compile edge per source (or one grouped edge for Swift), and the terminal
//! stamp or link edge. Rust and action targets have their own emitters and
//! never pass through here.

mod input_deps;
mod link;
mod pch;
mod sources;
mod swift;
mod vars;

use std::fmt::Write;

use indexmap::IndexSet;
use tracing::debug;

use crate::context::EmitContext;
use crate::error::EmitError;
use crate::escape::EscapeMode;
use crate::graph::{BuildGraph, ClassifiedDeps, TargetId};
use crate::output_file::OutputFile;
use crate::path_output::PathOutput;
use crate::source_file::{SourceFile, SourceFileType};
use crate::target::{OutputType, Target};
use crate::tool::ToolKind;
use crate::toolchain::Toolchain;

/// One module-map-exporting target visible to the compile: the target itself
/// when it exports a module map, plus every linked dependency that does.
#[derive(Debug, Clone)]
pub struct ModuleDep {
    /// The `.modulemap` source file.
    pub modulemap: SourceFile,
    /// The internal module name: the exporting target's label without its
    /// toolchain suffix.
    pub module_name: String,
    /// The compiled module.
    pub pcm: OutputFile,
    /// Whether this record describes the target currently being emitted.
    pub is_self: bool,
}

/// Emit the build statements for one target into a fresh buffer.
///
/// # Errors
///
/// Returns [`EmitError`] when an emission invariant is violated; the error
/// is also recorded on `ctx` and the partial output is discarded.
///
/// # Panics
///
/// Panics if the target's toolchain lacks the tool its final output or its
/// Swift sources require, or if a Swift target carries no module output.
/// Toolchain consistency is established before emission.
pub fn emit(graph: &BuildGraph, target_id: TargetId, ctx: &EmitContext) -> Result<String, EmitError> {
    let mut out = String::new();
    emit_into(graph, target_id, ctx, &mut out)?;
    Ok(out)
}

/// Emit the build statements for one target into an existing writer.
///
/// # Errors
///
/// Returns [`EmitError`] when an emission invariant is violated or the
/// writer fails; the error is also recorded on `ctx`. The writer may have
/// received partial output.
pub fn emit_into<W: Write>(
    graph: &BuildGraph,
    target_id: TargetId,
    ctx: &EmitContext,
    out: &mut W,
) -> Result<(), EmitError> {
    let target = graph.target(target_id);
    let toolchain = graph.toolchain_of(target);
    let mut emitter = CBinaryEmitter {
        graph,
        target,
        toolchain,
        out,
        path: PathOutput::new(EscapeMode::NinjaPath),
    };
    if let Err(err) = emitter.run() {
        ctx.fail(err.clone());
        return Err(err);
    }
    Ok(())
}

struct CBinaryEmitter<'a, W> {
    graph: &'a BuildGraph,
    target: &'a Target,
    toolchain: &'a Toolchain,
    out: &'a mut W,
    path: PathOutput,
}

impl<W: Write> CBinaryEmitter<'_, W> {
    fn run(&mut self) -> Result<(), EmitError> {
        debug!(label = %self.target.label, "emitting build statements");

        let module_deps = self.module_deps_information()?;
        self.write_compiler_vars(&module_deps)?;

        // Each source compile references both markers, so the stamp collapse
        // is sized by the source count.
        let num_stamp_uses = self.target.sources.len();
        let input_deps = self.write_inputs_stamp_and_get_dep(num_stamp_uses)?;
        let classified = self.graph.classify_deps(self.target);
        let order_only_deps =
            self.write_input_deps_stamp_and_get_dep(&classified, num_stamp_uses)?;

        let mut pch_object_files = Vec::new();
        let mut pch_other_files = Vec::new();
        self.write_pch_commands(
            &input_deps,
            &order_only_deps,
            &mut pch_object_files,
            &mut pch_other_files,
        )?;
        // MSVC PCH outputs are objects and shadow the gch set when present.
        let pch_files = if pch_object_files.is_empty() {
            &pch_other_files
        } else {
            &pch_object_files
        };

        let mut object_files = Vec::new();
        let mut other_files = Vec::new();
        if self.target.source_types_used().swift_used() {
            self.write_swift_sources(&input_deps, &order_only_deps, &mut object_files)?;
        } else {
            self.write_sources(
                pch_files,
                &input_deps,
                &order_only_deps,
                &module_deps,
                &mut object_files,
                &mut other_files,
            )?;
        }

        object_files.extend(pch_object_files.iter().cloned());
        self.check_for_duplicate_object_files(&object_files)?;

        if self.target.output_type == OutputType::SourceSet {
            self.write_source_set_stamp(&classified, &object_files)
        } else {
            self.write_linker_stuff(&classified, &object_files, &other_files, &input_deps)
        }
    }

    fn module_deps_information(&self) -> Result<Vec<ModuleDep>, EmitError> {
        let mut records = Vec::new();
        if self
            .target
            .source_types_used()
            .get(SourceFileType::ModuleMap)
        {
            self.add_module_dep(self.target, true, &mut records)?;
        }
        for dep_id in self.target.linked_deps() {
            let dep = self.graph.target(dep_id);
            // A module-map source means the dependency is modularized.
            if dep.source_types_used().get(SourceFileType::ModuleMap) {
                self.add_module_dep(dep, false, &mut records)?;
            }
        }
        Ok(records)
    }

    fn add_module_dep(
        &self,
        target: &Target,
        is_self: bool,
        records: &mut Vec<ModuleDep>,
    ) -> Result<(), EmitError> {
        let Some(modulemap) = target.sources.iter().find(|source| source.is_module_map()) else {
            return Ok(());
        };
        let mut outputs = match self.graph.output_files_for_source(target, modulemap) {
            Some((_, outputs)) => outputs,
            None => Vec::new(),
        };
        if outputs.len() != 1 {
            return Err(EmitError::MissingModuleMapOutput {
                target: target.label.without_toolchain(),
                count: outputs.len(),
            });
        }
        records.push(ModuleDep {
            modulemap: modulemap.clone(),
            module_name: target.label.without_toolchain(),
            pcm: outputs.swap_remove(0),
            is_self,
        });
        Ok(())
    }

    /// `build <outputs>: <rule> <inputs> [| implicit] [|| order-only]`
    fn write_compiler_build_line(
        &mut self,
        inputs: &[OutputFile],
        implicit: &[OutputFile],
        order_only: &[OutputFile],
        kind: ToolKind,
        outputs: &[OutputFile],
    ) -> Result<(), EmitError> {
        write!(self.out, "build")?;
        self.path.write_files(self.out, outputs)?;
        write!(self.out, ": {}", self.toolchain.rule_name(kind))?;
        self.path.write_files(self.out, inputs)?;
        if !implicit.is_empty() {
            write!(self.out, " |")?;
            self.path.write_files(self.out, implicit)?;
        }
        if !order_only.is_empty() {
            write!(self.out, " ||")?;
            self.path.write_files(self.out, order_only)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn write_pool(&mut self, kind: ToolKind) -> Result<(), EmitError> {
        let toolchain = self.toolchain;
        if let Some(pool) = toolchain.tool(kind).and_then(|tool| tool.header().pool.as_ref()) {
            writeln!(self.out, "  pool = {pool}")?;
        }
        Ok(())
    }

    /// The executor accepts duplicate outputs silently and the collision
    /// surfaces as link-time non-determinism, so it is rejected here.
    fn check_for_duplicate_object_files(&self, files: &[OutputFile]) -> Result<(), EmitError> {
        let mut seen: IndexSet<&OutputFile> = IndexSet::with_capacity(files.len());
        for file in files {
            if !seen.insert(file) {
                return Err(EmitError::DuplicateObject {
                    target: self.target.label.without_toolchain(),
                    path: file.value().to_owned(),
                });
            }
        }
        Ok(())
    }

    /// A source set produces no artifact; a stamp edge aggregates its object
    /// files for dependents.
    fn write_source_set_stamp(
        &mut self,
        classified: &ClassifiedDeps,
        object_files: &[OutputFile],
    ) -> Result<(), EmitError> {
        let graph = self.graph;
        let stamp = self.target.stamp_output();
        let order_only: Vec<OutputFile> = classified
            .non_linkable_deps
            .iter()
            .filter_map(|dep_id| graph.target(*dep_id).dependency_output.clone())
            .collect();
        self.write_compiler_build_line(
            object_files,
            &[],
            &order_only,
            ToolKind::Stamp,
            std::slice::from_ref(&stamp),
        )
    }
}
