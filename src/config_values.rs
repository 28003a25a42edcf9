//! Per-config compile and link values.
//!
//! A target carries its own values plus an ordered list of configs. Flag
//! extraction walks the chain in declaration order and keeps duplicates:
//! linker flag groups such as `-Wl,--start-group`/`--end-group` are order
//! and repetition sensitive, so the walker never deduplicates.

use camino::Utf8PathBuf;

use crate::source_file::SourceFile;

/// A library reference: either a system name resolved by the linker's search
/// path, or an explicit file in the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibFile {
    Name(String),
    Path(SourceFile),
}

/// The compile/link values one config contributes.
#[derive(Debug, Clone, Default)]
pub struct ConfigValues {
    pub defines: Vec<String>,
    pub include_dirs: Vec<Utf8PathBuf>,
    pub cflags: Vec<String>,
    pub cflags_c: Vec<String>,
    pub cflags_cc: Vec<String>,
    pub cflags_objc: Vec<String>,
    pub cflags_objcc: Vec<String>,
    pub asmflags: Vec<String>,
    pub ldflags: Vec<String>,
    pub arflags: Vec<String>,
    pub libs: Vec<LibFile>,
    pub lib_dirs: Vec<Utf8PathBuf>,
    pub frameworks: Vec<String>,
    pub framework_dirs: Vec<Utf8PathBuf>,
    /// Non-source prerequisites of every compile in the target.
    pub inputs: Vec<SourceFile>,
    /// Header named by `/Yc`/`/Yu` style precompiled header flags.
    pub precompiled_header: String,
    /// Source compiled to produce the precompiled header.
    pub precompiled_source: Option<SourceFile>,
}

impl ConfigValues {
    /// Whether this config asks for precompiled headers.
    #[must_use]
    pub fn has_precompiled_header(&self) -> bool {
        !self.precompiled_header.is_empty() && self.precompiled_source.is_some()
    }
}

/// Selects one flag list out of a config. Used by the PCH writer to pick the
/// language-specific flags when overriding a compile edge's variables.
pub type FlagSelector = fn(&ConfigValues) -> &[String];

pub fn select_cflags(config: &ConfigValues) -> &[String] {
    &config.cflags
}

pub fn select_cflags_c(config: &ConfigValues) -> &[String] {
    &config.cflags_c
}

pub fn select_cflags_cc(config: &ConfigValues) -> &[String] {
    &config.cflags_cc
}

pub fn select_cflags_objc(config: &ConfigValues) -> &[String] {
    &config.cflags_objc
}

pub fn select_cflags_objcc(config: &ConfigValues) -> &[String] {
    &config.cflags_objcc
}

pub fn select_asmflags(config: &ConfigValues) -> &[String] {
    &config.asmflags
}

pub fn select_ldflags(config: &ConfigValues) -> &[String] {
    &config.ldflags
}

pub fn select_arflags(config: &ConfigValues) -> &[String] {
    &config.arflags
}

/// Walk a config chain and yield every flag the selector picks, in chain
/// order, duplicates retained.
pub fn collect_flags<'a>(
    chain: impl Iterator<Item = &'a ConfigValues>,
    select: FlagSelector,
) -> impl Iterator<Item = &'a str> {
    chain.flat_map(move |config| select(config).iter().map(String::as_str))
}
