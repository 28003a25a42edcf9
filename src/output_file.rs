//! Output files in build-root-relative form.

use camino::{Utf8Path, Utf8PathBuf};

/// Extension class of an output file. The emitter steers object files into
/// the link edge and keeps everything else out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputExtensionClass {
    Object,
    Gch,
    Pcm,
    SwiftModule,
    Stamp,
    Other,
}

/// A path relative to the build root, with a known extension class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputFile(Utf8PathBuf);

impl OutputFile {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn value(&self) -> &Utf8Path {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub fn extension_class(&self) -> OutputExtensionClass {
        match self.0.extension() {
            Some("o" | "obj") => OutputExtensionClass::Object,
            Some("gch") => OutputExtensionClass::Gch,
            Some("pcm") => OutputExtensionClass::Pcm,
            Some("swiftmodule") => OutputExtensionClass::SwiftModule,
            Some("stamp") => OutputExtensionClass::Stamp,
            _ => OutputExtensionClass::Other,
        }
    }

    /// Whether this file takes part in linking as an object.
    #[must_use]
    pub fn is_object(&self) -> bool {
        self.extension_class() == OutputExtensionClass::Object
    }
}
