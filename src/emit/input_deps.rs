//! Input-dependency markers.
//!
//! Compiles rely on depfiles for precise header dependencies after the
//! first run, so upstream actions only need to exist before a compile
//! starts: an order-only marker suffices. Explicit markers are reserved for
//! files a compile genuinely consumes. Multi-entry sets referenced by more
//! than one edge collapse into a stamp to keep the output small.

use std::fmt::Write;

use crate::error::EmitError;
use crate::graph::ClassifiedDeps;
use crate::output_file::OutputFile;
use crate::tool::ToolKind;

use super::CBinaryEmitter;

impl<W: Write> CBinaryEmitter<'_, W> {
    /// Explicit prerequisites: the target's non-source inputs, collapsed
    /// into `<name>.inputs.stamp` when several edges would repeat them.
    pub(super) fn write_inputs_stamp_and_get_dep(
        &mut self,
        num_stamp_uses: usize,
    ) -> Result<Vec<OutputFile>, EmitError> {
        let graph = self.graph;
        let target = self.target;
        let outputs: Vec<OutputFile> = target
            .config_chain()
            .flat_map(|config| config.inputs.iter())
            .map(|input| graph.settings().source_to_output(input))
            .collect();
        if outputs.is_empty() || outputs.len() == 1 || num_stamp_uses == 1 {
            return Ok(outputs);
        }
        let stamp = OutputFile::new(
            target
                .target_out_dir()
                .join(format!("{}.inputs.stamp", target.output_name)),
        );
        self.write_compiler_build_line(
            &outputs,
            &[],
            &[],
            ToolKind::Stamp,
            std::slice::from_ref(&stamp),
        )?;
        Ok(vec![stamp])
    }

    /// Order-only prerequisites: the fan-in of transitive non-linkable
    /// dependencies, collapsed into `<name>.inputdeps.stamp` the same way.
    pub(super) fn write_input_deps_stamp_and_get_dep(
        &mut self,
        classified: &ClassifiedDeps,
        num_stamp_uses: usize,
    ) -> Result<Vec<OutputFile>, EmitError> {
        let graph = self.graph;
        let target = self.target;
        let deps: Vec<OutputFile> = classified
            .non_linkable_deps
            .iter()
            .filter_map(|dep_id| graph.target(*dep_id).dependency_output.clone())
            .collect();
        if deps.is_empty() || deps.len() == 1 || num_stamp_uses == 1 {
            return Ok(deps);
        }
        let stamp = OutputFile::new(
            target
                .target_out_dir()
                .join(format!("{}.inputdeps.stamp", target.output_name)),
        );
        self.write_compiler_build_line(
            &deps,
            &[],
            &[],
            ToolKind::Stamp,
            std::slice::from_ref(&stamp),
        )?;
        Ok(vec![stamp])
    }
}
