//! Target labels.
//!
//! A label identifies one target in the resolved graph: a source-absolute
//! directory, a name, and an optional toolchain qualifier. Labels in the
//! default toolchain print without the qualifier.

use std::fmt::{self, Display, Formatter};

/// A `//dir:name` target label with an optional toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    dir: String,
    name: String,
    toolchain: Option<String>,
}

impl Label {
    /// Create a label in the default toolchain. `dir` is source-absolute,
    /// e.g. `//foo/bar`.
    pub fn new(dir: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
            toolchain: None,
        }
    }

    /// Create a label qualified with a non-default toolchain label.
    pub fn with_toolchain(
        dir: impl Into<String>,
        name: impl Into<String>,
        toolchain: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
            toolchain: Some(toolchain.into()),
        }
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The label string without any toolchain suffix. This is also the
    /// internal module name used for Clang module dependencies.
    #[must_use]
    pub fn without_toolchain(&self) -> String {
        format!("{}:{}", self.dir, self.name)
    }

    /// The directory component without the `//` prefix, suitable for
    /// building output paths under `obj/`.
    pub fn dir_as_output_component(&self) -> &str {
        self.dir.trim_start_matches('/')
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.dir, self.name)?;
        if let Some(toolchain) = &self.toolchain {
            write!(f, "({toolchain})")?;
        }
        Ok(())
    }
}
