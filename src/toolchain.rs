//! Toolchains: the named set of tools a target is built with.

use indexmap::IndexMap;

use crate::label::Label;
use crate::substitution::SubstitutionBits;
use crate::tool::{CTool, SwiftTool, Tool, ToolKind};

/// A toolchain groups tools by kind and carries the rule-name prefix used
/// for every build statement it participates in. The default toolchain has
/// an empty prefix.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub label: Label,
    rule_prefix: String,
    tools: IndexMap<ToolKind, Tool>,
    bits: SubstitutionBits,
}

impl Toolchain {
    #[must_use]
    pub fn new(label: Label) -> Self {
        Self {
            label,
            rule_prefix: String::new(),
            tools: IndexMap::new(),
            bits: SubstitutionBits::empty(),
        }
    }

    #[must_use]
    pub fn with_rule_prefix(label: Label, rule_prefix: impl Into<String>) -> Self {
        Self {
            rule_prefix: rule_prefix.into(),
            ..Self::new(label)
        }
    }

    pub fn add_tool(&mut self, kind: ToolKind, tool: Tool) {
        self.bits.merge(tool.header().substitution_bits());
        self.tools.insert(kind, tool);
    }

    #[must_use]
    pub fn tool(&self, kind: ToolKind) -> Option<&Tool> {
        self.tools.get(&kind)
    }

    #[must_use]
    pub fn c_tool(&self, kind: ToolKind) -> Option<&CTool> {
        self.tool(kind).and_then(Tool::as_c)
    }

    #[must_use]
    pub fn swift_tool(&self) -> Option<&SwiftTool> {
        self.tool(ToolKind::Swift).and_then(Tool::as_swift)
    }

    /// Union of the substitutions used by every tool in this toolchain.
    #[must_use]
    pub fn substitution_bits(&self) -> SubstitutionBits {
        self.bits
    }

    /// The rule name for a tool kind, toolchain prefix applied.
    #[must_use]
    pub fn rule_name(&self, kind: ToolKind) -> String {
        format!("{}{}", self.rule_prefix, kind.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substitution::{Substitution, SubstitutionList, SubstitutionPattern};
    use crate::tool::ToolHeader;

    #[test]
    fn rule_names_carry_prefix() {
        let plain = Toolchain::new(Label::new("//toolchains", "default"));
        assert_eq!(plain.rule_name(ToolKind::Cxx), "cxx");

        let arm = Toolchain::with_rule_prefix(Label::new("//toolchains", "arm"), "arm_");
        assert_eq!(arm.rule_name(ToolKind::Cxx), "arm_cxx");
    }

    #[test]
    fn bits_accumulate_over_tools() {
        let mut toolchain = Toolchain::new(Label::new("//toolchains", "default"));
        toolchain.add_tool(
            ToolKind::Cxx,
            Tool::C(CTool {
                header: ToolHeader {
                    command: SubstitutionPattern::parse("c++ {{cflags_cc}} {{source}}")
                        .expect("parse"),
                    outputs: SubstitutionList::parse(&[
                        "{{source_out_dir}}/{{target_output_name}}.{{source_name_part}}.o",
                    ])
                    .expect("parse"),
                    ..ToolHeader::default()
                },
                ..CTool::default()
            }),
        );
        assert!(toolchain.substitution_bits().contains(Substitution::CFlagsCc));
        assert!(!toolchain.substitution_bits().contains(Substitution::CFlagsC));
    }
}
