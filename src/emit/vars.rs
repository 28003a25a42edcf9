//! The per-target variable block.
//!
//! Flag variables are written only when the toolchain's tools reference the
//! substitution and, for language-specific flags, when sources of that
//! language are present. Values are escaped for the command context.

use std::fmt::Write;

use crate::config_values::{
    FlagSelector, collect_flags, select_asmflags, select_cflags, select_cflags_c,
    select_cflags_cc, select_cflags_objc, select_cflags_objcc,
};
use crate::error::EmitError;
use crate::escape::{EscapeMode, escape_into, escaped};
use crate::source_file::SourceFileType;
use crate::substitution::{Substitution, SubstitutionBits};
use crate::tool::{PrecompiledHeaderType, ToolKind};

use super::{CBinaryEmitter, ModuleDep};

impl<W: Write> CBinaryEmitter<'_, W> {
    pub(super) fn write_compiler_vars(
        &mut self,
        module_deps: &[ModuleDep],
    ) -> Result<(), EmitError> {
        let target = self.target;
        let bits = self.toolchain.substitution_bits();
        let used = target.source_types_used();
        let mut wrote = false;

        if bits.contains(Substitution::Defines) {
            write!(self.out, "{} =", Substitution::Defines.ninja_name())?;
            for define in target.config_chain().flat_map(|config| config.defines.iter()) {
                write!(self.out, " -D{}", escaped(define, EscapeMode::NinjaCommand))?;
            }
            writeln!(self.out)?;
            wrote = true;
        }
        if bits.contains(Substitution::IncludeDirs) {
            let graph = self.graph;
            write!(self.out, "{} =", Substitution::IncludeDirs.ninja_name())?;
            for dir in target.config_chain().flat_map(|config| config.include_dirs.iter()) {
                let rebased = graph.settings().dir_to_output(dir);
                write!(self.out, " -I{}", escaped(rebased.as_str(), EscapeMode::NinjaCommand))?;
            }
            writeln!(self.out)?;
            wrote = true;
        }

        let flag_vars: [(Substitution, FlagSelector, Option<SourceFileType>, Option<ToolKind>); 6] = [
            (Substitution::CFlags, select_cflags, None, None),
            (
                Substitution::AsmFlags,
                select_asmflags,
                Some(SourceFileType::Asm),
                None,
            ),
            (
                Substitution::CFlagsC,
                select_cflags_c,
                Some(SourceFileType::C),
                Some(ToolKind::Cc),
            ),
            (
                Substitution::CFlagsCc,
                select_cflags_cc,
                Some(SourceFileType::Cpp),
                Some(ToolKind::Cxx),
            ),
            (
                Substitution::CFlagsObjC,
                select_cflags_objc,
                Some(SourceFileType::ObjC),
                Some(ToolKind::ObjC),
            ),
            (
                Substitution::CFlagsObjCc,
                select_cflags_objcc,
                Some(SourceFileType::ObjCpp),
                Some(ToolKind::ObjCxx),
            ),
        ];
        for (sub, select, required_type, pch_kind) in flag_vars {
            if !bits.contains(sub) {
                continue;
            }
            if let Some(required) = required_type {
                if !used.get(required) {
                    continue;
                }
            }
            self.write_flag_var(sub, select, pch_kind)?;
            wrote = true;
        }

        if !module_deps.is_empty()
            && (used.get(SourceFileType::Cpp) || used.get(SourceFileType::ModuleMap))
        {
            wrote |= self.write_module_deps_substitution(Substitution::ModuleDeps, module_deps, true)?;
            wrote |=
                self.write_module_deps_substitution(Substitution::ModuleDepsNoSelf, module_deps, false)?;
        }

        // Shared variables answer to command lines only. A tool whose output
        // templates mention a path substitution resolves it at edge-emission
        // time and needs no variable definition.
        let command_bits = self.used_tool_command_bits();
        if command_bits.contains(Substitution::Label) {
            writeln!(
                self.out,
                "{} = {}",
                Substitution::Label.ninja_name(),
                target.label.without_toolchain(),
            )?;
            wrote = true;
        }
        if command_bits.contains(Substitution::TargetOutDir) {
            writeln!(
                self.out,
                "{} = {}",
                Substitution::TargetOutDir.ninja_name(),
                target.target_out_dir(),
            )?;
            wrote = true;
        }
        if command_bits.contains(Substitution::TargetOutputName) {
            writeln!(
                self.out,
                "{} = {}",
                Substitution::TargetOutputName.ninja_name(),
                self.graph.target_output_name(target),
            )?;
            wrote = true;
        }

        if wrote {
            writeln!(self.out)?;
        }
        Ok(())
    }

    /// Union of the command-line substitution bits of every tool this
    /// target's edges will invoke: one per source language present, plus the
    /// final-output tool.
    fn used_tool_command_bits(&self) -> SubstitutionBits {
        let toolchain = self.toolchain;
        let used = self.target.source_types_used();
        let mut bits = SubstitutionBits::empty();
        for ty in [
            SourceFileType::C,
            SourceFileType::Cpp,
            SourceFileType::ObjC,
            SourceFileType::ObjCpp,
            SourceFileType::Asm,
            SourceFileType::ModuleMap,
            SourceFileType::Swift,
        ] {
            if !used.get(ty) {
                continue;
            }
            if let Some(tool) = ToolKind::for_source_type(ty).and_then(|kind| toolchain.tool(kind))
            {
                bits.merge(tool.header().command_substitution_bits());
            }
        }
        let final_kind = ToolKind::for_target_final_output(self.target.output_type);
        if let Some(tool) = toolchain.tool(final_kind) {
            bits.merge(tool.header().command_substitution_bits());
        }
        bits
    }

    fn write_flag_var(
        &mut self,
        sub: Substitution,
        select: FlagSelector,
        pch_kind: Option<ToolKind>,
    ) -> Result<(), EmitError> {
        let target = self.target;
        write!(self.out, "{} =", sub.ninja_name())?;
        for flag in collect_flags(target.config_chain(), select) {
            write!(self.out, " {}", escaped(flag, EscapeMode::NinjaCommand))?;
        }
        if let Some(kind) = pch_kind {
            self.write_pch_usage_flags(kind)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// Flags teaching a normal compile to consume the precompiled header.
    fn write_pch_usage_flags(&mut self, kind: ToolKind) -> Result<(), EmitError> {
        let target = self.target;
        if !target.has_precompiled_headers() {
            return Ok(());
        }
        let Some(tool) = self.toolchain.c_tool(kind) else {
            return Ok(());
        };
        match tool.precompiled_header_type {
            PrecompiledHeaderType::None => {}
            PrecompiledHeaderType::Gcc => {
                // The compiler picks up `<name>.gch` next to the named file.
                let outputs = self.graph.pch_output_files(target, kind);
                if let Some(output) = outputs.first() {
                    let include = output
                        .as_str()
                        .strip_suffix(".gch")
                        .unwrap_or_else(|| output.as_str());
                    write!(self.out, " -include {}", escaped(include, EscapeMode::NinjaCommand))?;
                }
            }
            PrecompiledHeaderType::Msvc => {
                if let Some(header) = target.precompiled_header() {
                    write!(self.out, " /Yu{}", escaped(header, EscapeMode::NinjaCommand))?;
                }
            }
        }
        Ok(())
    }

    fn write_module_deps_substitution(
        &mut self,
        sub: Substitution,
        module_deps: &[ModuleDep],
        include_self: bool,
    ) -> Result<bool, EmitError> {
        if !self.toolchain.substitution_bits().contains(sub) {
            return Ok(false);
        }
        write!(
            self.out,
            "{} = -Xclang -fmodules-embed-all-files",
            sub.ninja_name(),
        )?;
        for module_dep in module_deps {
            if module_dep.is_self && !include_self {
                continue;
            }
            write!(self.out, " -fmodule-file=")?;
            escape_into(self.out, module_dep.pcm.as_str(), EscapeMode::NinjaCommand)?;
        }
        writeln!(self.out)?;
        Ok(true)
    }
}
