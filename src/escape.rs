//! Escaping for the build executor's text format.
//!
//! Two contexts exist. Paths on `build` lines use the executor's path
//! escaping (`$`, space and `:` are significant). Values of command-context
//! variables additionally pass through the command line, so shell-significant
//! strings are quoted before `$` doubling is applied.

use std::fmt::{self, Write};

/// Escaping context for a string written to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeMode {
    /// A path on a build statement.
    NinjaPath,
    /// A token inside a command-context variable value.
    NinjaCommand,
}

/// Write `value` escaped for `mode` into `out`.
pub fn escape_into(out: &mut impl Write, value: &str, mode: EscapeMode) -> fmt::Result {
    match mode {
        EscapeMode::NinjaPath => escape_path(out, value),
        EscapeMode::NinjaCommand => escape_command(out, value),
    }
}

/// Convenience wrapper returning an owned escaped string.
#[must_use]
pub fn escaped(value: &str, mode: EscapeMode) -> String {
    let mut out = String::with_capacity(value.len());
    escape_into(&mut out, value, mode).expect("write escaped string");
    out
}

fn escape_path(out: &mut impl Write, value: &str) -> fmt::Result {
    for c in value.chars() {
        match c {
            '$' => out.write_str("$$")?,
            ' ' => out.write_str("$ ")?,
            ':' => out.write_str("$:")?,
            _ => out.write_char(c)?,
        }
    }
    Ok(())
}

/// Characters that survive a command line unquoted.
fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '_' | '/' | ':' | '.' | '=' | '@' | '%' | ',' | '~' | '^')
}

fn escape_command(out: &mut impl Write, value: &str) -> fmt::Result {
    if !value.is_empty() && value.chars().all(is_shell_safe) {
        return out.write_str(value);
    }
    out.write_char('"')?;
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.write_char('\\')?;
                out.write_char(c)?;
            }
            '$' => out.write_str("$$")?,
            _ => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_escapes_metacharacters() {
        assert_eq!(escaped("obj/a b.o", EscapeMode::NinjaPath), "obj/a$ b.o");
        assert_eq!(escaped("c:/x", EscapeMode::NinjaPath), "c$:/x");
        assert_eq!(escaped("a$b", EscapeMode::NinjaPath), "a$$b");
        assert_eq!(escaped("obj/foo/bar.o", EscapeMode::NinjaPath), "obj/foo/bar.o");
    }

    #[test]
    fn command_quotes_shell_significant_tokens() {
        assert_eq!(escaped("-std=c++17", EscapeMode::NinjaCommand), "-std=c++17");
        assert_eq!(escaped("-DNAME=\"x\"", EscapeMode::NinjaCommand), "\"-DNAME=\\\"x\\\"\"");
        assert_eq!(escaped("a b", EscapeMode::NinjaCommand), "\"a b\"");
        assert_eq!(escaped("a$b", EscapeMode::NinjaCommand), "\"a$$b\"");
        assert_eq!(escaped("", EscapeMode::NinjaCommand), "\"\"");
    }
}
