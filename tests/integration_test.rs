// Integration tests for gm-codegen

use assert_cmd::Command;
use gm_codegen::model::{
    FunctionArg, FunctionCategory, FunctionGroup, FunctionInterface, ScalarKind, ValueType,
};
use gm_codegen::output::SinkConfig;
use gm_codegen::{
    ArtifactKind, Catalog, Driver, Error, FileSink, Generation, TemplateEngine, TypeCatalog,
};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BANNER: &str = "//\n// This file is auto-generated, please do not modify directly!\n//\n\n";

fn templates_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
}

fn shipped_engine() -> TemplateEngine {
    TemplateEngine::from_dir(&templates_path()).expect("Failed to load templates")
}

fn vec3f() -> ValueType {
    ValueType::vector(&[3], ScalarKind::Float).unwrap()
}

fn mat4f() -> ValueType {
    ValueType::vector(&[4, 4], ScalarKind::Float).unwrap()
}

// float, Vec3f and Mat4f in, same type out
fn unary_group(names: &[&str]) -> FunctionGroup {
    let interfaces = [ValueType::scalar(ScalarKind::Float), vec3f(), mat4f()]
        .into_iter()
        .map(|ty| FunctionInterface::new(vec![FunctionArg::input("value", ty.clone())], Some(ty)))
        .collect::<gm_codegen::Result<Vec<_>>>()
        .unwrap();
    FunctionGroup::new(names, interfaces, FunctionCategory::Basic).unwrap()
}

fn small_catalog(groups: Vec<FunctionGroup>) -> Catalog {
    Catalog::new(
        TypeCatalog {
            vectors: vec![vec3f(), mat4f()],
            ..Default::default()
        },
        groups,
    )
}

fn run_small() -> Generation {
    let mut driver = Driver::new(shipped_engine());
    driver
        .run(&small_catalog(vec![unary_group(&["floor", "ceil", "abs"])]))
        .expect("Generation failed")
}

// ============================================================================
// Generation Tests
// ============================================================================

#[test]
fn test_unary_group_primary_declarations() {
    let generation = run_small();

    let primaries: Vec<_> = generation
        .artifacts_of(ArtifactKind::FunctionDeclaration)
        .collect();
    let outputs: Vec<&Path> = primaries.iter().map(|a| a.output.as_path()).collect();
    assert_eq!(
        outputs,
        vec![
            Path::new("functions/floor.h"),
            Path::new("functions/ceil.h"),
            Path::new("functions/abs.h"),
        ]
    );

    // One declaration per overload: 3 names x [float, Vec3f, Mat4f]
    let declarations: usize = primaries
        .iter()
        .map(|a| {
            a.text
                .lines()
                .filter(|l| l.starts_with("GM_HOST_DEVICE inline"))
                .count()
        })
        .sum();
    assert_eq!(declarations, 9);

    let floor = primaries[0];
    assert!(floor.text.starts_with(BANNER));
    assert!(floor
        .text
        .contains("GM_HOST_DEVICE inline Vec3f Floor( const Vec3f& i_value )"));
    assert!(floor
        .text
        .contains("GM_HOST_DEVICE inline float Floor( const float& i_value )"));
    assert!(floor.text.contains("#include <gm/types/mat4f.h>"));
}

#[test]
fn test_unary_group_benchmarks_and_bindings() {
    let generation = run_small();

    let benchmarks: Vec<PathBuf> = generation
        .artifacts_of(ArtifactKind::FunctionBenchmark)
        .map(|a| a.output.clone())
        .collect();
    assert_eq!(
        benchmarks,
        vec![
            PathBuf::from("functions/benchmarks/benchmarkFloor.cpp"),
            PathBuf::from("functions/benchmarks/benchmarkCeil.cpp"),
            PathBuf::from("functions/benchmarks/benchmarkAbs.cpp"),
        ]
    );

    let bindings: Vec<_> = generation
        .artifacts_of(ArtifactKind::FunctionBinding)
        .collect();
    assert_eq!(bindings.len(), 3);
    assert_eq!(bindings[1].output, PathBuf::from("python/functions/bindCeil.cpp"));
    assert_eq!(bindings[1].text.matches("o_module.def( \"Ceil\"").count(), 3);
}

#[test]
fn test_missing_function_test_template_is_skipped() {
    let generation = run_small();

    // Only floor ships a hand-authored test
    let tests: Vec<PathBuf> = generation
        .artifacts_of(ArtifactKind::FunctionTest)
        .map(|a| a.output.clone())
        .collect();
    assert_eq!(tests, vec![PathBuf::from("functions/tests/testFloor.cpp")]);
    assert_eq!(
        generation
            .artifacts_of(ArtifactKind::FunctionBindingTest)
            .count(),
        0
    );
}

#[test]
fn test_manifest_lists_types_and_functions() {
    let generation = run_small();

    let names: Vec<String> = generation.context.functions().map(|f| f.name()).collect();
    assert_eq!(names, vec!["Floor", "Ceil", "Abs"]);
    for function in generation.context.functions() {
        assert_eq!(function.interfaces().len(), 3);
    }

    let manifest = generation.manifest().expect("Manifest missing");
    assert_eq!(manifest.output, PathBuf::from("python/module.cpp"));
    for bind in ["BindVec3f", "BindMat4f", "BindFloor", "BindCeil", "BindAbs"] {
        assert!(
            manifest.text.contains(&format!("    {}( o_module );", bind)),
            "Manifest missing {}",
            bind
        );
    }
}

#[test]
fn test_type_artifacts() {
    let generation = run_small();

    let outputs: Vec<PathBuf> = generation
        .artifacts
        .iter()
        .filter(|a| {
            matches!(
                a.kind,
                ArtifactKind::TypeDeclaration
                    | ArtifactKind::TypeTest
                    | ArtifactKind::TypeBinding
                    | ArtifactKind::TypeBindingTest
            )
        })
        .map(|a| a.output.clone())
        .collect();
    assert_eq!(outputs.len(), 8);
    assert!(outputs.contains(&PathBuf::from("types/mat4f.h")));
    assert!(outputs.contains(&PathBuf::from("types/tests/testVec3f.cpp")));
    assert!(outputs.contains(&PathBuf::from("python/types/bindMat4f.cpp")));
    assert!(outputs.contains(&PathBuf::from("python/types/tests/testVec3f.py")));

    let py_test = generation
        .artifacts
        .iter()
        .find(|a| a.output == Path::new("python/types/tests/testVec3f.py"))
        .unwrap();
    assert!(py_test
        .text
        .starts_with("#\n# This file is auto-generated, please do not modify directly!\n#\n\n"));

    let mat4f = generation
        .artifacts
        .iter()
        .find(|a| a.output == Path::new("types/mat4f.h"))
        .unwrap();
    assert!(mat4f.text.contains("static constexpr size_t ElementSize = 16;"));
}

#[test]
fn test_duplicate_function_groups_fail() {
    let mut driver = Driver::new(shipped_engine());
    let catalog = small_catalog(vec![
        unary_group(&["floor", "ceil"]),
        unary_group(&["floor"]),
    ]);

    let err = driver.run(&catalog).unwrap_err();
    assert!(matches!(err, Error::DuplicateFunctions(ref names) if names == &["Floor".to_string()]));
}

#[test]
fn test_unknown_extension_fails() {
    let mut engine = shipped_engine();
    let err = engine
        .render(
            "python/module.cpp",
            Path::new("python/module.txt"),
            &tera::Context::new(),
        )
        .unwrap_err();
    assert!(err.to_string().contains("python/module.txt"));
}

#[test]
fn test_full_catalog_generation_writes_files() {
    let dir = TempDir::new().unwrap();
    let catalog = Catalog::graphics_math().unwrap();
    let mut driver = Driver::new(shipped_engine());
    let generation = driver.run(&catalog).expect("Generation failed");

    assert_eq!(generation.context.function_count(), catalog.function_count());

    let sink = FileSink::new(SinkConfig {
        output_dir: dir.path().to_path_buf(),
        ..Default::default()
    })
    .unwrap();
    let report = sink.write_all(&generation.artifacts).unwrap();
    assert_eq!(report.written, generation.artifacts.len());

    for path in [
        "types/vec3f.h",
        "types/floatRange.h",
        "types/vec3fArray.h",
        "functions/length.h",
        "functions/tests/testLength.cpp",
        "functions/tests/testRadians.cpp",
        "functions/benchmarks/benchmarkNormalize.cpp",
        "python/functions/bindDotProduct.cpp",
        "python/module.cpp",
    ] {
        assert!(dir.path().join(path).exists(), "Missing {}", path);
    }

    let length = fs::read_to_string(dir.path().join("functions/length.h")).unwrap();
    assert!(length.starts_with(BANNER));
    assert!(length.contains("float Length( const Vec3f& i_vector )"));
}

#[test]
fn test_regeneration_is_identical() {
    let first = run_small();
    let second = run_small();
    let texts = |g: &Generation| g.artifacts.iter().map(|a| a.text.clone()).collect::<Vec<_>>();
    assert_eq!(texts(&first), texts(&second));
}

// ============================================================================
// CLI Tests
// ============================================================================

fn cli() -> Command {
    Command::cargo_bin("gm-codegen").unwrap()
}

#[test]
fn test_cli_version() {
    cli()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("gm-codegen "));
}

#[test]
fn test_cli_list_json() {
    let output = cli().args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());

    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let functions = listing["functions"].as_array().unwrap();
    assert!(functions
        .iter()
        .any(|f| f["name"] == "Floor" && f["headerFileName"] == "floor.h"));
    assert!(listing["types"]
        .as_array()
        .unwrap()
        .iter()
        .any(|t| t["name"] == "Mat4f"));
}

#[test]
fn test_cli_generate() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("gm");

    cli()
        .current_dir(dir.path())
        .arg("generate")
        .arg("--templates")
        .arg(templates_path())
        .arg("--output")
        .arg(&out)
        .args(["--exclude", "python/**"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sources written to"));

    assert!(out.join("types/vec4f.h").exists());
    assert!(out.join("functions/floor.h").exists());
    assert!(!out.join("python").exists());
}

#[test]
fn test_cli_generate_dry_run() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("gm");

    cli()
        .current_dir(dir.path())
        .arg("generate")
        .arg("--templates")
        .arg(templates_path())
        .arg("--output")
        .arg(&out)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Would write"));

    assert!(!out.exists());
}

#[test]
fn test_cli_generate_with_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("gm-codegen.toml");
    fs::write(
        &config,
        format!(
            "[paths]\ntemplate_dir = {:?}\noutput_dir = \"from-config\"\n\n[output]\nexclude = [\"**/benchmarks/**\"]\n",
            templates_path().display().to_string()
        ),
    )
    .unwrap();

    cli()
        .current_dir(dir.path())
        .arg("generate")
        .assert()
        .success();

    let out = dir.path().join("from-config");
    assert!(out.join("python/module.cpp").exists());
    assert!(!out.join("functions/benchmarks").exists());
}

#[test]
fn test_cli_missing_templates() {
    let dir = TempDir::new().unwrap();
    cli()
        .current_dir(dir.path())
        .args(["generate", "--templates", "no-such-dir"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn test_cli_missing_config() {
    let dir = TempDir::new().unwrap();
    cli()
        .current_dir(dir.path())
        .args(["generate", "--config", "missing.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.toml"));
}
