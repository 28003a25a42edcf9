//! Precompiled-header edges.
//!
//! One edge per language whose tool declares a PCH dialect and whose
//! sources are present. MSVC-dialect outputs are object files that flow
//! into the link; GCC-dialect `.gch` outputs are consumed by later compiles
//! only and must never be linked.

use std::fmt::Write;

use crate::config_values::{
    FlagSelector, collect_flags, select_cflags_c, select_cflags_cc, select_cflags_objc,
    select_cflags_objcc,
};
use crate::error::EmitError;
use crate::escape::{EscapeMode, escaped};
use crate::output_file::OutputFile;
use crate::source_file::SourceFileType;
use crate::substitution::Substitution;
use crate::tool::{PrecompiledHeaderType, ToolKind, pch_language};

use super::CBinaryEmitter;

impl<W: Write> CBinaryEmitter<'_, W> {
    pub(super) fn write_pch_commands(
        &mut self,
        input_deps: &[OutputFile],
        order_only_deps: &[OutputFile],
        object_files: &mut Vec<OutputFile>,
        other_files: &mut Vec<OutputFile>,
    ) -> Result<(), EmitError> {
        if !self.target.has_precompiled_headers() {
            return Ok(());
        }
        let used = self.target.source_types_used();
        let languages: [(ToolKind, Substitution, FlagSelector, SourceFileType, bool); 4] = [
            (
                ToolKind::Cc,
                Substitution::CFlagsC,
                select_cflags_c,
                SourceFileType::C,
                false,
            ),
            (
                ToolKind::Cxx,
                Substitution::CFlagsCc,
                select_cflags_cc,
                SourceFileType::Cpp,
                false,
            ),
            // There is no MSVC Objective-C toolchain; these two are GCC only.
            (
                ToolKind::ObjC,
                Substitution::CFlagsObjC,
                select_cflags_objc,
                SourceFileType::ObjC,
                true,
            ),
            (
                ToolKind::ObjCxx,
                Substitution::CFlagsObjCc,
                select_cflags_objcc,
                SourceFileType::ObjCpp,
                true,
            ),
        ];
        for (kind, flag_sub, select, source_type, gcc_only) in languages {
            if !used.get(source_type) {
                continue;
            }
            let Some(tool) = self.toolchain.c_tool(kind) else {
                continue;
            };
            let header_type = tool.precompiled_header_type;
            match header_type {
                PrecompiledHeaderType::None => continue,
                PrecompiledHeaderType::Msvc if gcc_only => continue,
                _ => {}
            }
            self.write_pch_command(
                flag_sub,
                kind,
                header_type,
                select,
                input_deps,
                order_only_deps,
                object_files,
                other_files,
            )?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn write_pch_command(
        &mut self,
        flag_sub: Substitution,
        kind: ToolKind,
        header_type: PrecompiledHeaderType,
        select: FlagSelector,
        input_deps: &[OutputFile],
        order_only_deps: &[OutputFile],
        object_files: &mut Vec<OutputFile>,
        other_files: &mut Vec<OutputFile>,
    ) -> Result<(), EmitError> {
        match header_type {
            PrecompiledHeaderType::Msvc => self.write_windows_pch_command(
                flag_sub,
                kind,
                input_deps,
                order_only_deps,
                object_files,
            ),
            PrecompiledHeaderType::Gcc => self.write_gcc_pch_command(
                flag_sub,
                kind,
                select,
                input_deps,
                order_only_deps,
                other_files,
            ),
            PrecompiledHeaderType::None => Err(EmitError::UnknownPchType { tool: kind.name() }),
        }
    }

    fn write_gcc_pch_command(
        &mut self,
        flag_sub: Substitution,
        kind: ToolKind,
        select: FlagSelector,
        input_deps: &[OutputFile],
        order_only_deps: &[OutputFile],
        gch_files: &mut Vec<OutputFile>,
    ) -> Result<(), EmitError> {
        let graph = self.graph;
        let target = self.target;
        let outputs = graph.pch_output_files(target, kind);
        if outputs.is_empty() {
            return Ok(());
        }
        gch_files.extend(outputs.iter().cloned());

        let Some(source) = target.precompiled_source() else {
            return Ok(());
        };
        let source_input = graph.settings().source_to_output(source);
        self.write_compiler_build_line(
            std::slice::from_ref(&source_input),
            input_deps,
            order_only_deps,
            kind,
            &outputs,
        )?;

        // The edge replaces the language flags: the `-include` generated for
        // normal compiles gives way to the header-language `-x` flag.
        write!(self.out, "  {} =", flag_sub.ninja_name())?;
        for flag in collect_flags(target.config_chain(), select) {
            write!(self.out, " {}", escaped(flag, EscapeMode::NinjaCommand))?;
        }
        if let Some(language) = pch_language(kind) {
            write!(self.out, " -x {language}")?;
        }
        writeln!(self.out)?;
        writeln!(self.out)?;
        Ok(())
    }

    fn write_windows_pch_command(
        &mut self,
        flag_sub: Substitution,
        kind: ToolKind,
        input_deps: &[OutputFile],
        order_only_deps: &[OutputFile],
        object_files: &mut Vec<OutputFile>,
    ) -> Result<(), EmitError> {
        let graph = self.graph;
        let target = self.target;
        let outputs = graph.pch_output_files(target, kind);
        if outputs.is_empty() {
            return Ok(());
        }
        object_files.extend(outputs.iter().cloned());

        let Some(source) = target.precompiled_source() else {
            return Ok(());
        };
        let source_input = graph.settings().source_to_output(source);
        self.write_compiler_build_line(
            std::slice::from_ref(&source_input),
            input_deps,
            order_only_deps,
            kind,
            &outputs,
        )?;

        // The edge appends to the language flags so the compile both
        // consumes the header and produces the pch.
        let name = flag_sub.ninja_name();
        write!(self.out, "  {name} = ${{{name}}}")?;
        if let Some(header) = target.precompiled_header() {
            write!(self.out, " /Yc{header}")?;
        }
        writeln!(self.out)?;
        writeln!(self.out)?;
        Ok(())
    }
}
