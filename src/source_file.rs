//! Source files and their language classification.
//!
//! Sources are referenced by source-absolute path (`//`-rooted). The file
//! extension determines which compile tool applies, whether the file takes
//! part in linking, and whether it triggers special handling (module maps,
//! module definition files, precompiled objects).

use camino::{Utf8Path, Utf8PathBuf};

/// Language/kind of a source file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SourceFileType {
    C,
    Cpp,
    Header,
    ObjC,
    ObjCpp,
    Rc,
    Asm,
    Object,
    Def,
    Swift,
    ModuleMap,
    Rust,
    Unknown,
}

impl SourceFileType {
    const COUNT: usize = 13;

    /// Classify an extension the way the build language does.
    #[must_use]
    pub fn from_extension(extension: Option<&str>) -> Self {
        match extension {
            Some("cc" | "cpp" | "cxx") => Self::Cpp,
            Some("h" | "hpp" | "hxx" | "hh") => Self::Header,
            Some("c") => Self::C,
            Some("m") => Self::ObjC,
            Some("mm") => Self::ObjCpp,
            Some("rc") => Self::Rc,
            Some("S" | "s" | "asm") => Self::Asm,
            Some("o" | "obj") => Self::Object,
            Some("def") => Self::Def,
            Some("swift") => Self::Swift,
            Some("modulemap") => Self::ModuleMap,
            Some("rs") => Self::Rust,
            _ => Self::Unknown,
        }
    }
}

/// A source-absolute file path with cheap type queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile(Utf8PathBuf);

impl SourceFile {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn value(&self) -> &Utf8Path {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// File name without directory or extension.
    pub fn name_part(&self) -> &str {
        self.0.file_stem().unwrap_or_default()
    }

    /// Source-absolute directory of this file, e.g. `//foo` for `//foo/a.cc`.
    pub fn dir(&self) -> &Utf8Path {
        self.0.parent().unwrap_or_else(|| Utf8Path::new("//"))
    }

    #[must_use]
    pub fn source_type(&self) -> SourceFileType {
        SourceFileType::from_extension(self.0.extension())
    }

    pub fn is_module_map(&self) -> bool {
        self.source_type() == SourceFileType::ModuleMap
    }

    pub fn is_def(&self) -> bool {
        self.source_type() == SourceFileType::Def
    }

    pub fn is_swift(&self) -> bool {
        self.source_type() == SourceFileType::Swift
    }

    pub fn is_object(&self) -> bool {
        self.source_type() == SourceFileType::Object
    }
}

/// Bitset over [`SourceFileType`] recording which kinds a target uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceFileTypeSet(u16);

impl SourceFileTypeSet {
    #[must_use]
    pub fn from_sources<'a>(sources: impl IntoIterator<Item = &'a SourceFile>) -> Self {
        let mut set = Self::default();
        for source in sources {
            set.insert(source.source_type());
        }
        set
    }

    pub fn insert(&mut self, ty: SourceFileType) {
        debug_assert!((ty as usize) < SourceFileType::COUNT);
        self.0 |= 1 << ty as u16;
    }

    #[must_use]
    pub fn get(self, ty: SourceFileType) -> bool {
        self.0 & (1 << ty as u16) != 0
    }

    /// A target with any Swift source is compiled by the Swift path and
    /// never by the C-family path.
    #[must_use]
    pub fn swift_used(self) -> bool {
        self.get(SourceFileType::Swift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_extensions() {
        let cases = [
            ("//a/b.cc", SourceFileType::Cpp),
            ("//a/b.cpp", SourceFileType::Cpp),
            ("//a/b.cxx", SourceFileType::Cpp),
            ("//a/b.c", SourceFileType::C),
            ("//a/b.h", SourceFileType::Header),
            ("//a/b.hh", SourceFileType::Header),
            ("//a/b.m", SourceFileType::ObjC),
            ("//a/b.mm", SourceFileType::ObjCpp),
            ("//a/b.S", SourceFileType::Asm),
            ("//a/b.o", SourceFileType::Object),
            ("//a/b.obj", SourceFileType::Object),
            ("//a/b.def", SourceFileType::Def),
            ("//a/b.swift", SourceFileType::Swift),
            ("//a/b.modulemap", SourceFileType::ModuleMap),
            ("//a/b.rs", SourceFileType::Rust),
            ("//a/b.weird", SourceFileType::Unknown),
            ("//a/b", SourceFileType::Unknown),
        ];
        for (path, expected) in cases {
            assert_eq!(SourceFile::new(path).source_type(), expected, "{path}");
        }
    }

    #[test]
    fn name_part_strips_dir_and_extension() {
        assert_eq!(SourceFile::new("//foo/bar/a.cc").name_part(), "a");
        assert_eq!(SourceFile::new("//foo/a.precompile.h").name_part(), "a.precompile");
    }

    #[test]
    fn type_set_records_uses() {
        let sources = [SourceFile::new("//a/x.cc"), SourceFile::new("//a/y.c")];
        let set = SourceFileTypeSet::from_sources(&sources);
        assert!(set.get(SourceFileType::Cpp));
        assert!(set.get(SourceFileType::C));
        assert!(!set.get(SourceFileType::Swift));
        assert!(!set.swift_used());
    }
}
