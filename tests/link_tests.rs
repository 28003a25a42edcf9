#![allow(
    clippy::expect_used,
    reason = "integration tests prefer expect for expressive failures"
)]

//! Terminal-edge scenarios: stamps for source sets, dependency classes of
//! the link edge and its tail variables.

mod support;

use kanna::config_values::LibFile;
use kanna::context::EmitContext;
use kanna::emit::emit;
use kanna::output_file::OutputFile;
use kanna::source_file::SourceFile;
use kanna::target::OutputType;
use rstest::rstest;
use support::ToolchainOptions;

#[rstest]
fn source_set_stamp_aggregates_objects() {
    let (mut graph, toolchain) = support::default_graph();
    let mut set = support::target(toolchain, "//foo", "objs", OutputType::SourceSet);
    set.sources = support::sources(&["//foo/a.cc", "//foo/b.cc"]);
    let set = graph.add_target(set);

    let ninja = emit(&graph, set, &EmitContext::new()).expect("emit");
    let expected = concat!(
        "defines =\n",
        "include_dirs =\n",
        "cflags =\n",
        "cflags_cc =\n",
        "\n",
        "build obj/foo/objs.a.o: cxx ../../foo/a.cc\n",
        "build obj/foo/objs.b.o: cxx ../../foo/b.cc\n",
        "\n",
        "build obj/foo/objs.stamp: stamp obj/foo/objs.a.o obj/foo/objs.b.o\n",
    );
    assert_eq!(ninja, expected);
}

#[rstest]
fn dependent_collects_source_set_objects() {
    let (mut graph, toolchain) = support::default_graph();
    let mut set = support::target(toolchain, "//foo", "objs", OutputType::SourceSet);
    set.sources = support::sources(&["//foo/a.cc", "//foo/b.cc"]);
    set.dependency_output = Some(OutputFile::new("obj/foo/objs.stamp"));
    let set = graph.add_target(set);

    let mut exe = support::target(toolchain, "//app", "x", OutputType::Executable);
    exe.sources = support::sources(&["//app/main.cc"]);
    exe.public_deps = vec![set];
    let exe = graph.add_target(exe);

    let ninja = emit(&graph, exe, &EmitContext::new()).expect("emit");
    let expected = concat!(
        "defines =\n",
        "include_dirs =\n",
        "cflags =\n",
        "cflags_cc =\n",
        "\n",
        "build obj/app/x.main.o: cxx ../../app/main.cc || obj/foo/objs.stamp\n",
        "\n",
        "build ./x: link obj/app/x.main.o obj/foo/objs.a.o obj/foo/objs.b.o || obj/foo/objs.stamp\n",
        "  ldflags =\n",
        "  libs =\n",
        "  frameworks =\n",
        "  swiftmodules =\n",
        "  output_extension = \n",
        "  output_dir = .\n",
    );
    assert_eq!(ninja, expected);
}

#[rstest]
fn def_file_joins_ldflags_and_implicit_deps() {
    let (mut graph, toolchain) = support::default_graph();
    let mut shared = support::target(toolchain, "//lib", "s", OutputType::SharedLibrary);
    shared.sources = support::sources(&["//lib/s.cc", "//lib/s.def"]);
    let shared = graph.add_target(shared);

    let ninja = emit(&graph, shared, &EmitContext::new()).expect("emit");
    let expected = concat!(
        "defines =\n",
        "include_dirs =\n",
        "cflags =\n",
        "cflags_cc =\n",
        "\n",
        "build obj/lib/s.s.o: cxx ../../lib/s.cc\n",
        "\n",
        "build ./libs.so: solink obj/lib/s.s.o | ../../lib/s.def\n",
        "  ldflags = /DEF:../../lib/s.def\n",
        "  libs =\n",
        "  frameworks =\n",
        "  swiftmodules =\n",
        "  output_extension = .so\n",
        "  output_dir = .\n",
    );
    assert_eq!(ninja, expected);
}

#[rstest]
fn transitive_rust_libraries_relink_final_targets() {
    let (mut graph, toolchain) = support::default_graph();
    let mut rust = support::target(toolchain, "//r", "lib", OutputType::RustLibrary);
    rust.link_output = Some(OutputFile::new("obj/r/liblib.rlib"));
    rust.dependency_output = Some(OutputFile::new("obj/r/liblib.rlib"));
    let rust = graph.add_target(rust);

    let mut exe = support::target(toolchain, "//app", "x", OutputType::Executable);
    exe.sources = support::sources(&["//app/main.cc"]);
    exe.public_deps = vec![rust];
    exe.inherited_libraries = vec![rust];
    let exe = graph.add_target(exe);

    let ninja = emit(&graph, exe, &EmitContext::new()).expect("emit");
    let expected = concat!(
        "defines =\n",
        "include_dirs =\n",
        "cflags =\n",
        "cflags_cc =\n",
        "\n",
        "build obj/app/x.main.o: cxx ../../app/main.cc\n",
        "\n",
        "build ./x: link obj/app/x.main.o | obj/r/liblib.rlib\n",
        "  ldflags =\n",
        "  libs =\n",
        "  frameworks =\n",
        "  swiftmodules =\n",
        "  output_extension = \n",
        "  output_dir = .\n",
        "  rlibs = obj/r/liblib.rlib\n",
    );
    assert_eq!(ninja, expected);
}

#[rstest]
fn framework_deps_relink_pessimistically() {
    let (mut graph, toolchain) = support::default_graph();
    let mut framework = support::target(toolchain, "//fw", "fw", OutputType::Copy);
    framework.is_framework_bundle = true;
    framework.dependency_output = Some(OutputFile::new("obj/fw/fw.stamp"));
    let framework = graph.add_target(framework);

    let mut exe = support::target(toolchain, "//app", "x", OutputType::Executable);
    exe.sources = support::sources(&["//app/main.cc"]);
    exe.public_deps = vec![framework];
    exe.all_frameworks = vec!["UIKit".into()];
    exe.all_framework_dirs = vec!["//sdk/Frameworks".into()];
    let exe = graph.add_target(exe);

    let ninja = emit(&graph, exe, &EmitContext::new()).expect("emit");
    let expected = concat!(
        "defines =\n",
        "include_dirs =\n",
        "cflags =\n",
        "cflags_cc =\n",
        "\n",
        "build obj/app/x.main.o: cxx ../../app/main.cc\n",
        "\n",
        "build ./x: link obj/app/x.main.o | obj/fw/fw.stamp\n",
        "  ldflags = -F../../sdk/Frameworks\n",
        "  libs =\n",
        "  frameworks = -framework UIKit\n",
        "  swiftmodules =\n",
        "  output_extension = \n",
        "  output_dir = .\n",
    );
    assert_eq!(ninja, expected);
}

#[rstest]
fn libs_and_lib_dirs_enter_tail_variables() {
    let (mut graph, toolchain) = support::default_graph();
    let mut exe = support::target(toolchain, "//app", "x", OutputType::Executable);
    exe.sources = support::sources(&["//app/main.cc"]);
    exe.all_libs = vec![
        LibFile::Name("z".into()),
        LibFile::Path(SourceFile::new("//third_party/libfoo.a")),
    ];
    exe.all_lib_dirs = vec!["//libs".into()];
    let exe = graph.add_target(exe);

    let ninja = emit(&graph, exe, &EmitContext::new()).expect("emit");
    let expected = concat!(
        "defines =\n",
        "include_dirs =\n",
        "cflags =\n",
        "cflags_cc =\n",
        "\n",
        "build obj/app/x.main.o: cxx ../../app/main.cc\n",
        "\n",
        "build ./x: link obj/app/x.main.o | ../../third_party/libfoo.a\n",
        "  ldflags = -L../../libs\n",
        "  libs = -lz ../../third_party/libfoo.a\n",
        "  frameworks =\n",
        "  swiftmodules =\n",
        "  output_extension = \n",
        "  output_dir = .\n",
    );
    assert_eq!(ninja, expected);
}

#[rstest]
fn pools_annotate_compile_and_link_edges() {
    let (mut graph, toolchain) = support::make_graph(&ToolchainOptions {
        compile_pool: Some("highmem".into()),
        link_pool: Some("link_pool".into()),
        ..ToolchainOptions::default()
    });
    let mut exe = support::target(toolchain, "//app", "x", OutputType::Executable);
    exe.sources = support::sources(&["//app/main.cc"]);
    let exe = graph.add_target(exe);

    let ninja = emit(&graph, exe, &EmitContext::new()).expect("emit");
    let expected = concat!(
        "defines =\n",
        "include_dirs =\n",
        "cflags =\n",
        "cflags_cc =\n",
        "\n",
        "build obj/app/x.main.o: cxx ../../app/main.cc\n",
        "  pool = highmem\n",
        "\n",
        "build ./x: link obj/app/x.main.o\n",
        "  ldflags =\n",
        "  libs =\n",
        "  frameworks =\n",
        "  swiftmodules =\n",
        "  output_extension = \n",
        "  output_dir = .\n",
        "  pool = link_pool\n",
    );
    assert_eq!(ninja, expected);
}

#[rstest]
fn swift_executable_links_imported_modules() {
    let (mut graph, toolchain) = support::default_graph();
    let mut module = support::target(toolchain, "//lib", "mod", OutputType::StaticLibrary);
    module.output_name = "Mod".into();
    module.sources = support::sources(&["//lib/mod.swift"]);
    module.swift.module_output_file = Some(OutputFile::new("obj/lib/Mod.swiftmodule"));
    module.link_output = Some(OutputFile::new("obj/lib/libMod.a"));
    module.dependency_output = Some(OutputFile::new("obj/lib/libMod.a"));
    let module = graph.add_target(module);

    let mut exe = support::target(toolchain, "//app", "x", OutputType::Executable);
    exe.sources = support::sources(&["//app/main.swift"]);
    exe.swift.module_output_file = Some(OutputFile::new("obj/app/x.swiftmodule"));
    exe.swift.modules = vec![module];
    exe.public_deps = vec![module];
    let exe = graph.add_target(exe);

    let ninja = emit(&graph, exe, &EmitContext::new()).expect("emit");
    let expected = concat!(
        "defines =\n",
        "include_dirs =\n",
        "cflags =\n",
        "target_output_name = x\n",
        "\n",
        "build obj/app/x.swiftmodule: swift ../../app/main.swift || obj/lib/libMod.a\n",
        "\n",
        "build obj/app/main.o: stamp obj/app/x.swiftmodule || obj/lib/libMod.a\n",
        "\n",
        "build ./x: link obj/app/main.o obj/lib/libMod.a | obj/lib/Mod.swiftmodule obj/app/x.swiftmodule\n",
        "  ldflags =\n",
        "  libs =\n",
        "  frameworks =\n",
        "  swiftmodules = -add_ast_path obj/lib/Mod.swiftmodule -add_ast_path obj/app/x.swiftmodule\n",
        "  output_extension = \n",
        "  output_dir = .\n",
    );
    assert_eq!(ninja, expected);
}
