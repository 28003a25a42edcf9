//! Substitutions: the closed set of placeholders a tool may reference.
//!
//! Each substitution has a fixed variable name in the emitted text and a
//! fixed `{{placeholder}}` spelling in tool templates. Tools declare which
//! substitutions they use; the toolchain exposes the union as a bitset so
//! the emit path never compares variable names as strings.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;

/// Every placeholder the emitter can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Substitution {
    // Path templates.
    Source,
    SourceNamePart,
    SourceOutDir,
    Output,
    OutputDir,
    OutputExtension,
    RootOutDir,
    TargetOutDir,
    TargetOutputName,
    Label,
    LabelNoToolchain,
    // Compiler variables.
    CFlags,
    AsmFlags,
    CFlagsC,
    CFlagsCc,
    CFlagsObjC,
    CFlagsObjCc,
    Defines,
    IncludeDirs,
    ModuleDeps,
    ModuleDepsNoSelf,
    // Linker tail variables.
    LdFlags,
    Libs,
    Frameworks,
    SwiftModules,
    ArFlags,
    Solibs,
    Rlibs,
}

impl Substitution {
    pub const ALL: [Self; 28] = [
        Self::Source,
        Self::SourceNamePart,
        Self::SourceOutDir,
        Self::Output,
        Self::OutputDir,
        Self::OutputExtension,
        Self::RootOutDir,
        Self::TargetOutDir,
        Self::TargetOutputName,
        Self::Label,
        Self::LabelNoToolchain,
        Self::CFlags,
        Self::AsmFlags,
        Self::CFlagsC,
        Self::CFlagsCc,
        Self::CFlagsObjC,
        Self::CFlagsObjCc,
        Self::Defines,
        Self::IncludeDirs,
        Self::ModuleDeps,
        Self::ModuleDepsNoSelf,
        Self::LdFlags,
        Self::Libs,
        Self::Frameworks,
        Self::SwiftModules,
        Self::ArFlags,
        Self::Solibs,
        Self::Rlibs,
    ];

    /// The variable name used in emitted build statements and in
    /// `{{placeholder}}` template spellings.
    #[must_use]
    pub fn ninja_name(self) -> &'static str {
        match self {
            Self::Source => "in",
            Self::SourceNamePart => "source_name_part",
            Self::SourceOutDir => "source_out_dir",
            Self::Output => "out",
            Self::OutputDir => "output_dir",
            Self::OutputExtension => "output_extension",
            Self::RootOutDir => "root_out_dir",
            Self::TargetOutDir => "target_out_dir",
            Self::TargetOutputName => "target_output_name",
            Self::Label => "label",
            Self::LabelNoToolchain => "label_no_toolchain",
            Self::CFlags => "cflags",
            Self::AsmFlags => "asmflags",
            Self::CFlagsC => "cflags_c",
            Self::CFlagsCc => "cflags_cc",
            Self::CFlagsObjC => "cflags_objc",
            Self::CFlagsObjCc => "cflags_objcc",
            Self::Defines => "defines",
            Self::IncludeDirs => "include_dirs",
            Self::ModuleDeps => "module_deps",
            Self::ModuleDepsNoSelf => "module_deps_no_self",
            Self::LdFlags => "ldflags",
            Self::Libs => "libs",
            Self::Frameworks => "frameworks",
            Self::SwiftModules => "swiftmodules",
            Self::ArFlags => "arflags",
            Self::Solibs => "solibs",
            Self::Rlibs => "rlibs",
        }
    }

    /// The template placeholder spelling, e.g. `source` for `{{source}}`.
    /// Path substitutions use their classic names rather than the short
    /// `in`/`out` variable aliases.
    #[must_use]
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Output => "output",
            other => other.ninja_name(),
        }
    }

    fn from_placeholder(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.placeholder() == name)
    }
}

/// Bitset over [`Substitution`], keyed by discriminant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstitutionBits(u64);

impl SubstitutionBits {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sub: Substitution) {
        self.0 |= 1 << sub as u64;
    }

    #[must_use]
    pub fn contains(self, sub: Substitution) -> bool {
        self.0 & (1 << sub as u64) != 0
    }

    pub fn merge(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

/// Error raised when parsing a tool template.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternParseError {
    #[error("unknown substitution placeholder {{{{{name}}}}}")]
    UnknownPlaceholder { name: String },
    #[error("unterminated substitution placeholder in {pattern:?}")]
    Unterminated { pattern: String },
}

/// One segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    Literal(String),
    Placeholder(Substitution),
}

/// A parsed tool template such as
/// `{{source_out_dir}}/{{target_output_name}}.{{source_name_part}}.o`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionPattern {
    segments: Vec<PatternSegment>,
}

impl SubstitutionPattern {
    /// Parse a template string.
    ///
    /// # Errors
    ///
    /// Returns [`PatternParseError`] for an unknown placeholder name or an
    /// unterminated `{{`.
    pub fn parse(pattern: &str) -> Result<Self, PatternParseError> {
        let mut segments = Vec::new();
        let mut rest = pattern;
        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(PatternSegment::Literal(rest[..start].to_owned()));
            }
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                return Err(PatternParseError::Unterminated {
                    pattern: pattern.to_owned(),
                });
            };
            let name = &after[..end];
            let sub = Substitution::from_placeholder(name).ok_or_else(|| {
                PatternParseError::UnknownPlaceholder {
                    name: name.to_owned(),
                }
            })?;
            segments.push(PatternSegment::Placeholder(sub));
            rest = &after[end + 2..];
        }
        if !rest.is_empty() {
            segments.push(PatternSegment::Literal(rest.to_owned()));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The substitutions this pattern references.
    #[must_use]
    pub fn required_bits(&self) -> SubstitutionBits {
        let mut bits = SubstitutionBits::empty();
        for segment in &self.segments {
            if let PatternSegment::Placeholder(sub) = segment {
                bits.insert(*sub);
            }
        }
        bits
    }

    /// Resolve the pattern by binding every placeholder through `bind`.
    #[must_use]
    pub fn apply(&self, mut bind: impl FnMut(Substitution) -> String) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                PatternSegment::Literal(text) => out.push_str(text),
                PatternSegment::Placeholder(sub) => out.push_str(&bind(*sub)),
            }
        }
        out
    }
}

impl Display for SubstitutionPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                PatternSegment::Literal(text) => f.write_str(text)?,
                PatternSegment::Placeholder(sub) => write!(f, "{{{{{}}}}}", sub.placeholder())?,
            }
        }
        Ok(())
    }
}

/// An ordered list of patterns, e.g. a tool's `outputs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionList {
    patterns: Vec<SubstitutionPattern>,
}

impl SubstitutionList {
    /// Parse each template in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`PatternParseError`] encountered.
    pub fn parse(patterns: &[&str]) -> Result<Self, PatternParseError> {
        let patterns = patterns
            .iter()
            .map(|p| SubstitutionPattern::parse(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[SubstitutionPattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    #[must_use]
    pub fn required_bits(&self) -> SubstitutionBits {
        let mut bits = SubstitutionBits::empty();
        for pattern in &self.patterns {
            bits.merge(pattern.required_bits());
        }
        bits
    }
}
