//! Per-source compile edges for C-family targets.

use std::fmt::Write;

use tracing::debug;

use crate::error::EmitError;
use crate::output_file::OutputFile;
use crate::source_file::SourceFile;
use crate::tool::{
    PrecompiledHeaderType, gcc_pch_output_extension, windows_pch_object_extension,
};

use super::{CBinaryEmitter, ModuleDep};

impl<W: Write> CBinaryEmitter<'_, W> {
    pub(super) fn write_sources(
        &mut self,
        pch_deps: &[OutputFile],
        input_deps: &[OutputFile],
        order_only_deps: &[OutputFile],
        module_deps: &[ModuleDep],
        object_files: &mut Vec<OutputFile>,
        other_files: &mut Vec<SourceFile>,
    ) -> Result<(), EmitError> {
        let graph = self.graph;
        let target = self.target;
        let toolchain = self.toolchain;
        debug_assert!(!target.source_types_used().swift_used());
        object_files.reserve(target.sources.len());

        for source in &target.sources {
            let Some((kind, tool_outputs)) = graph.output_files_for_source(target, source) else {
                // Def files surface at the link; everything else toolless
                // (headers and such) is skipped.
                if source.is_def() {
                    other_files.push(source.clone());
                } else {
                    debug!(source = source.as_str(), "no tool for source, skipping");
                }
                continue;
            };

            if let Some(kind) = kind {
                let mut deps = input_deps.to_vec();

                // Only PCH outputs matching the tool's expected extension
                // apply: a C PCH must not pair with a C++ compile.
                if let Some(tool) = toolchain.c_tool(kind) {
                    let expected = match tool.precompiled_header_type {
                        PrecompiledHeaderType::None => None,
                        PrecompiledHeaderType::Msvc => windows_pch_object_extension(kind),
                        PrecompiledHeaderType::Gcc => gcc_pch_output_extension(kind),
                    };
                    if let Some(expected) = expected {
                        for dep in pch_deps {
                            if dep.as_str().ends_with(expected) {
                                deps.push(dep.clone());
                            }
                        }
                    }
                }

                // Compiling a module map must not depend on its own module.
                for module_dep in module_deps {
                    if tool_outputs[0] != module_dep.pcm {
                        deps.push(module_dep.pcm.clone());
                    }
                }

                let source_input = graph.settings().source_to_output(source);
                self.write_compiler_build_line(
                    std::slice::from_ref(&source_input),
                    &deps,
                    order_only_deps,
                    kind,
                    &tool_outputs,
                )?;
                self.write_pool(kind)?;
            }

            // A compiler can produce several outputs; only the first links.
            // A module map's compiled module is not an object file.
            if !source.is_module_map() {
                if let Some(first) = tool_outputs.first() {
                    object_files.push(first.clone());
                }
            }
        }

        writeln!(self.out)?;
        Ok(())
    }
}
