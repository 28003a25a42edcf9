//! Shared test fixtures: a canonical toolchain and graph builders.

use kanna::graph::{BuildGraph, ToolchainId};
use kanna::label::Label;
use kanna::source_file::SourceFile;
use kanna::substitution::{SubstitutionList, SubstitutionPattern};
use kanna::target::{OutputType, Target};
use kanna::tool::{
    CTool, GeneralTool, PrecompiledHeaderType, SwiftTool, Tool, ToolHeader, ToolKind,
};
use kanna::toolchain::Toolchain;

/// Knobs for the canonical test toolchain.
#[derive(Debug, Default)]
pub struct ToolchainOptions {
    pub pch_type: PrecompiledHeaderType,
    /// Name objects `<target_out_dir>/<stem>.o`, discarding the source
    /// directory. Lets two sources collide on one object path.
    pub flat_object_names: bool,
    pub compile_pool: Option<String>,
    pub link_pool: Option<String>,
}

/// A fresh graph holding the canonical toolchain.
pub fn make_graph(options: &ToolchainOptions) -> (BuildGraph, ToolchainId) {
    let mut graph = BuildGraph::default();
    let toolchain = graph.add_toolchain(make_toolchain(options));
    (graph, toolchain)
}

pub fn default_graph() -> (BuildGraph, ToolchainId) {
    make_graph(&ToolchainOptions::default())
}

pub fn target(toolchain: ToolchainId, dir: &str, name: &str, output_type: OutputType) -> Target {
    let mut target = Target::new(Label::new(dir, name), output_type);
    target.toolchain = toolchain;
    target
}

pub fn sources(paths: &[&str]) -> Vec<SourceFile> {
    paths.iter().copied().map(SourceFile::new).collect()
}

fn tool_header(command: &str, outputs: &[&str]) -> ToolHeader {
    ToolHeader {
        command: SubstitutionPattern::parse(command).expect("parse command"),
        outputs: SubstitutionList::parse(outputs).expect("parse outputs"),
        ..ToolHeader::default()
    }
}

fn link_switches(tool: &mut CTool) {
    tool.lib_switch = "-l".into();
    tool.lib_dir_switch = "-L".into();
    tool.framework_switch = "-framework ".into();
    tool.framework_dir_switch = "-F".into();
    tool.swiftmodule_switch = "-add_ast_path ".into();
}

fn make_toolchain(options: &ToolchainOptions) -> Toolchain {
    let object_output = if options.flat_object_names {
        "{{target_out_dir}}/{{source_name_part}}.o"
    } else {
        "{{source_out_dir}}/{{target_output_name}}.{{source_name_part}}.o"
    };
    let mut toolchain = Toolchain::new(Label::new("//toolchains", "default"));

    let mut cc = CTool {
        header: tool_header(
            "cc {{defines}} {{include_dirs}} {{cflags}} {{cflags_c}} -c {{source}} -o {{output}}",
            &[object_output],
        ),
        precompiled_header_type: options.pch_type,
        ..CTool::default()
    };
    cc.header.pool.clone_from(&options.compile_pool);
    toolchain.add_tool(ToolKind::Cc, Tool::C(cc));

    let mut cxx = CTool {
        header: tool_header(
            "c++ {{defines}} {{include_dirs}} {{cflags}} {{cflags_cc}} {{module_deps}} -c {{source}} -o {{output}}",
            &[object_output],
        ),
        precompiled_header_type: options.pch_type,
        ..CTool::default()
    };
    cxx.header.pool.clone_from(&options.compile_pool);
    toolchain.add_tool(ToolKind::Cxx, Tool::C(cxx));

    toolchain.add_tool(
        ToolKind::CxxModule,
        Tool::C(CTool {
            header: tool_header(
                "c++ {{defines}} {{include_dirs}} {{cflags}} {{cflags_cc}} {{module_deps_no_self}} -c {{source}} -o {{output}}",
                &["{{source_out_dir}}/{{target_output_name}}.{{source_name_part}}.pcm"],
            ),
            ..CTool::default()
        }),
    );

    // No MSVC Objective-C toolchain exists.
    let objc_pch = match options.pch_type {
        PrecompiledHeaderType::Msvc => PrecompiledHeaderType::None,
        other => other,
    };
    toolchain.add_tool(
        ToolKind::ObjC,
        Tool::C(CTool {
            header: tool_header(
                "cc {{defines}} {{include_dirs}} {{cflags}} {{cflags_objc}} -c {{source}} -o {{output}}",
                &[object_output],
            ),
            precompiled_header_type: objc_pch,
            ..CTool::default()
        }),
    );
    toolchain.add_tool(
        ToolKind::ObjCxx,
        Tool::C(CTool {
            header: tool_header(
                "c++ {{defines}} {{include_dirs}} {{cflags}} {{cflags_objcc}} -c {{source}} -o {{output}}",
                &[object_output],
            ),
            precompiled_header_type: objc_pch,
            ..CTool::default()
        }),
    );

    let mut alink = CTool {
        header: tool_header(
            "ar {{arflags}} {{output}} {{source}}",
            &["{{output_dir}}/{{target_output_name}}{{output_extension}}"],
        ),
        ..CTool::default()
    };
    alink.header.default_output_extension = ".a".into();
    alink.header.default_output_dir =
        Some(SubstitutionPattern::parse("{{target_out_dir}}").expect("parse output dir"));
    alink.header.output_prefix = "lib".into();
    toolchain.add_tool(ToolKind::Alink, Tool::C(alink));

    for kind in [ToolKind::Solink, ToolKind::SolinkModule] {
        let mut solink = CTool {
            header: tool_header(
                "ld -shared {{ldflags}} {{libs}} {{frameworks}} {{solibs}} -o {{output}} {{source}}",
                &["{{output_dir}}/{{target_output_name}}{{output_extension}}"],
            ),
            ..CTool::default()
        };
        solink.header.default_output_extension = ".so".into();
        solink.header.default_output_dir =
            Some(SubstitutionPattern::parse("{{root_out_dir}}").expect("parse output dir"));
        solink.header.output_prefix = "lib".into();
        link_switches(&mut solink);
        toolchain.add_tool(kind, Tool::C(solink));
    }

    let mut link = CTool {
        header: tool_header(
            "ld {{ldflags}} {{libs}} {{frameworks}} {{swiftmodules}} {{solibs}} {{rlibs}} -o {{output}} {{source}}",
            &["{{output_dir}}/{{target_output_name}}{{output_extension}}"],
        ),
        ..CTool::default()
    };
    link.header.default_output_dir =
        Some(SubstitutionPattern::parse("{{root_out_dir}}").expect("parse output dir"));
    link.header.pool.clone_from(&options.link_pool);
    link_switches(&mut link);
    toolchain.add_tool(ToolKind::Link, Tool::C(link));

    toolchain.add_tool(
        ToolKind::Stamp,
        Tool::General(GeneralTool {
            header: tool_header("touch {{output}}", &[]),
        }),
    );

    toolchain.add_tool(
        ToolKind::Swift,
        Tool::Swift(SwiftTool {
            header: tool_header(
                "swiftc -module-name {{target_output_name}} -o {{output}} {{source}}",
                &["{{target_out_dir}}/{{target_output_name}}.swiftmodule"],
            ),
            partial_outputs: SubstitutionList::parse(&[
                "{{target_out_dir}}/{{source_name_part}}.o",
            ])
            .expect("parse partial outputs"),
        }),
    );

    toolchain
}
