//! The grouped Swift compile edge.
//!
//! Swift sources compile as one unit producing the `.swiftmodule` plus,
//! with whole-module optimization off, per-source partial outputs. A stamp
//! edge ties the partial outputs to the module so the executor knows one
//! invocation produced them all.

use std::fmt::Write;

use indexmap::IndexSet;

use crate::error::EmitError;
use crate::output_file::OutputFile;
use crate::tool::ToolKind;

use super::CBinaryEmitter;

impl<W: Write> CBinaryEmitter<'_, W> {
    pub(super) fn write_swift_sources(
        &mut self,
        input_deps: &[OutputFile],
        order_only_deps: &[OutputFile],
        object_files: &mut Vec<OutputFile>,
    ) -> Result<(), EmitError> {
        let graph = self.graph;
        let target = self.target;
        let toolchain = self.toolchain;
        debug_assert!(target.source_types_used().swift_used());
        object_files.reserve(target.sources.len());

        let tool = toolchain
            .swift_tool()
            .expect("toolchain provides a swift tool for swift sources");
        let module_output = target
            .swift
            .module_output_file
            .clone()
            .expect("swift target provides a module output");

        let mut additional_outputs =
            graph.apply_linker_outputs(target, &tool.header, &tool.header.outputs);
        additional_outputs.retain(|output| *output != module_output);
        for output in &additional_outputs {
            if output.is_object() {
                object_files.push(output.clone());
            }
        }

        if !tool.partial_outputs.is_empty() {
            for source in &target.sources {
                if !source.is_swift() {
                    continue;
                }
                let partial_outputs =
                    graph.apply_compiler_outputs(target, &tool.header, source, &tool.partial_outputs);
                for output in partial_outputs {
                    if output.is_object() {
                        object_files.push(output.clone());
                    }
                    additional_outputs.push(output);
                }
            }
        }

        // Imported Swift modules must exist before the compile starts.
        let mut swift_order_only: IndexSet<OutputFile> =
            order_only_deps.iter().cloned().collect();
        for module_id in &target.swift.modules {
            if let Some(output) = graph.target(*module_id).dependency_output.clone() {
                swift_order_only.insert(output);
            }
        }
        let swift_order_only: Vec<OutputFile> = swift_order_only.into_iter().collect();

        let sources: Vec<OutputFile> = target
            .sources
            .iter()
            .filter(|source| source.is_swift())
            .map(|source| graph.settings().source_to_output(source))
            .collect();
        self.write_compiler_build_line(
            &sources,
            input_deps,
            &swift_order_only,
            ToolKind::Swift,
            std::slice::from_ref(&module_output),
        )?;

        // The module edge keeps the partial outputs up to date; the stamp
        // records that fact for the executor.
        if !additional_outputs.is_empty() {
            writeln!(self.out)?;
            self.write_compiler_build_line(
                std::slice::from_ref(&module_output),
                input_deps,
                &swift_order_only,
                ToolKind::Stamp,
                &additional_outputs,
            )?;
        }

        writeln!(self.out)?;
        Ok(())
    }
}
