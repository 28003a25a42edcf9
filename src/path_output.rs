//! Path writer for build statements and variable values.

use std::fmt::{self, Write};

use crate::escape::{EscapeMode, escape_into};
use crate::output_file::OutputFile;

/// Writes output-file paths with a fixed escaping mode. Build statements use
/// [`EscapeMode::NinjaPath`]; command-context lists such as `solibs` use
/// [`EscapeMode::NinjaCommand`].
#[derive(Debug, Clone, Copy)]
pub struct PathOutput {
    mode: EscapeMode,
}

impl PathOutput {
    #[must_use]
    pub fn new(mode: EscapeMode) -> Self {
        Self { mode }
    }

    pub fn write_file(&self, out: &mut impl Write, file: &OutputFile) -> fmt::Result {
        escape_into(out, file.as_str(), self.mode)
    }

    /// Write each file preceded by a single space.
    pub fn write_files<'a>(
        &self,
        out: &mut impl Write,
        files: impl IntoIterator<Item = &'a OutputFile>,
    ) -> fmt::Result {
        for file in files {
            out.write_char(' ')?;
            self.write_file(out, file)?;
        }
        Ok(())
    }
}
