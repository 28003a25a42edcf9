//! Tool definitions.
//!
//! Tools come in four categories modelled as a tagged sum: C-family compile
//! and link tools, general tools (stamp, copy), Rust tools and the Swift
//! compile tool. The common header carries everything the emitter needs to
//! name rules, compute outputs and dispatch per-source work.

use crate::source_file::SourceFileType;
use crate::substitution::{SubstitutionBits, SubstitutionList, SubstitutionPattern};
use crate::target::OutputType;

/// Identifies one tool inside a toolchain. The string form is the rule name
/// in emitted build statements (prefixed for non-default toolchains).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Cc,
    Cxx,
    CxxModule,
    ObjC,
    ObjCxx,
    Asm,
    Alink,
    Solink,
    SolinkModule,
    Link,
    Stamp,
    Copy,
    Swift,
}

impl ToolKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Cc => "cc",
            Self::Cxx => "cxx",
            Self::CxxModule => "cxx_module",
            Self::ObjC => "objc",
            Self::ObjCxx => "objcxx",
            Self::Asm => "asm",
            Self::Alink => "alink",
            Self::Solink => "solink",
            Self::SolinkModule => "solink_module",
            Self::Link => "link",
            Self::Stamp => "stamp",
            Self::Copy => "copy",
            Self::Swift => "swift",
        }
    }

    /// The compile tool handling a given source type, if any. Headers,
    /// object files and def files have no tool; they are handled by the
    /// source writer directly.
    #[must_use]
    pub fn for_source_type(ty: SourceFileType) -> Option<Self> {
        match ty {
            SourceFileType::C => Some(Self::Cc),
            SourceFileType::Cpp => Some(Self::Cxx),
            SourceFileType::ModuleMap => Some(Self::CxxModule),
            SourceFileType::ObjC => Some(Self::ObjC),
            SourceFileType::ObjCpp => Some(Self::ObjCxx),
            SourceFileType::Asm => Some(Self::Asm),
            SourceFileType::Swift => Some(Self::Swift),
            _ => None,
        }
    }

    /// The tool producing a target's final artifact.
    #[must_use]
    pub fn for_target_final_output(output_type: OutputType) -> Self {
        match output_type {
            OutputType::Executable => Self::Link,
            OutputType::SharedLibrary => Self::Solink,
            OutputType::LoadableModule => Self::SolinkModule,
            OutputType::StaticLibrary => Self::Alink,
            _ => Self::Stamp,
        }
    }
}

/// Precompiled-header dialect a C tool supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrecompiledHeaderType {
    #[default]
    None,
    Gcc,
    Msvc,
}

/// Fields shared by every tool category.
#[derive(Debug, Clone, Default)]
pub struct ToolHeader {
    pub command: SubstitutionPattern,
    pub description: Option<SubstitutionPattern>,
    pub depfile: Option<SubstitutionPattern>,
    pub outputs: SubstitutionList,
    /// Includes the leading `.` when non-empty.
    pub default_output_extension: String,
    pub default_output_dir: Option<SubstitutionPattern>,
    pub output_prefix: String,
    pub rspfile: Option<SubstitutionPattern>,
    pub rspfile_content: Option<SubstitutionPattern>,
    pub pool: Option<String>,
}

impl ToolHeader {
    /// Substitutions referenced anywhere in this tool's templates.
    #[must_use]
    pub fn substitution_bits(&self) -> SubstitutionBits {
        let mut bits = self.command_substitution_bits();
        bits.merge(self.outputs.required_bits());
        bits
    }

    /// Substitutions the tool's command line consumes as variables. Output
    /// templates are excluded: the emitter resolves those itself, so they
    /// never demand a variable definition.
    #[must_use]
    pub fn command_substitution_bits(&self) -> SubstitutionBits {
        let mut bits = self.command.required_bits();
        if let Some(pattern) = &self.rspfile_content {
            bits.merge(pattern.required_bits());
        }
        bits
    }
}

/// A C-family compile or link tool.
#[derive(Debug, Clone, Default)]
pub struct CTool {
    pub header: ToolHeader,
    pub precompiled_header_type: PrecompiledHeaderType,
    pub lib_switch: String,
    pub lib_dir_switch: String,
    pub framework_switch: String,
    pub framework_dir_switch: String,
    pub swiftmodule_switch: String,
}

/// A general-purpose tool such as `stamp` or `copy`.
#[derive(Debug, Clone, Default)]
pub struct GeneralTool {
    pub header: ToolHeader,
}

/// A Rust tool. Rust targets have their own emitter; the C emitter only
/// consults Rust tools for classification.
#[derive(Debug, Clone, Default)]
pub struct RustTool {
    pub header: ToolHeader,
}

/// The Swift compile tool with its per-source partial output templates.
#[derive(Debug, Clone, Default)]
pub struct SwiftTool {
    pub header: ToolHeader,
    pub partial_outputs: SubstitutionList,
}

/// A tool, tagged by category.
#[derive(Debug, Clone)]
pub enum Tool {
    C(CTool),
    General(GeneralTool),
    Rust(RustTool),
    Swift(SwiftTool),
}

impl Tool {
    #[must_use]
    pub fn header(&self) -> &ToolHeader {
        match self {
            Self::C(tool) => &tool.header,
            Self::General(tool) => &tool.header,
            Self::Rust(tool) => &tool.header,
            Self::Swift(tool) => &tool.header,
        }
    }

    #[must_use]
    pub fn as_c(&self) -> Option<&CTool> {
        match self {
            Self::C(tool) => Some(tool),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_general(&self) -> Option<&GeneralTool> {
        match self {
            Self::General(tool) => Some(tool),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_rust(&self) -> Option<&RustTool> {
        match self {
            Self::Rust(tool) => Some(tool),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_swift(&self) -> Option<&SwiftTool> {
        match self {
            Self::Swift(tool) => Some(tool),
            _ => None,
        }
    }
}

/// Object extension produced alongside an MSVC-dialect precompiled header.
/// The language infix keeps a C PCH object from pairing with a C++ compile.
#[must_use]
pub fn windows_pch_object_extension(kind: ToolKind) -> Option<&'static str> {
    match kind {
        ToolKind::Cc => Some(".c.obj"),
        ToolKind::Cxx => Some(".cc.obj"),
        ToolKind::ObjC => Some(".m.obj"),
        ToolKind::ObjCxx => Some(".mm.obj"),
        _ => None,
    }
}

/// Extension of a GCC-dialect precompiled header output.
#[must_use]
pub fn gcc_pch_output_extension(kind: ToolKind) -> Option<&'static str> {
    match kind {
        ToolKind::Cc => Some(".c.gch"),
        ToolKind::Cxx => Some(".cc.gch"),
        ToolKind::ObjC => Some(".m.gch"),
        ToolKind::ObjCxx => Some(".mm.gch"),
        _ => None,
    }
}

/// Language name recognised by the compiler's `-x` flag for precompiled
/// header sources.
#[must_use]
pub fn pch_language(kind: ToolKind) -> Option<&'static str> {
    match kind {
        ToolKind::Cc => Some("c-header"),
        ToolKind::Cxx => Some("c++-header"),
        ToolKind::ObjC => Some("objective-c-header"),
        ToolKind::ObjCxx => Some("objective-c++-header"),
        _ => None,
    }
}
