//! Suite configuration files and CLI overrides.

use std::io::Write;

use validator_bench::BenchError;
use validator_bench::bench::{RunOptions, SuiteConfig, build_suite, load_suite_config};
use validator_bench::core::EnvironmentInfo;

fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_toml_config() {
    let file = write_temp(
        ".toml",
        r#"
engines = ["jsonschema", "validator"]
workloads = ["complex"]

[run]
warmup_iterations = 2000
parallel_compile = true
"#,
    );
    let cfg = load_suite_config(file.path()).unwrap();
    assert_eq!(cfg.engine_names(), vec!["jsonschema", "validator"]);
    assert_eq!(cfg.workload_names(), vec!["complex"]);
    assert_eq!(cfg.run.warmup_iterations, 2000);
    assert_eq!(cfg.run.measured_iterations, 5000);
    assert!(cfg.run.parallel_compile);
}

#[test]
fn test_load_yaml_config_by_extension() {
    let file = write_temp(
        ".yaml",
        "engines: [boon]\nrun:\n  measured_iterations: 42\n  per_pair_timeout_millis: 0\n",
    );
    let cfg = load_suite_config(file.path()).unwrap();
    assert_eq!(cfg.engine_names(), vec!["boon"]);
    assert_eq!(cfg.run.measured_iterations, 42);
    assert!(cfg.run.pair_budget().is_none());
    assert_eq!(cfg.workloads, None);
}

#[test]
fn test_malformed_config_is_an_error() {
    let file = write_temp(".toml", "engines = \"not a list\"\n");
    assert!(matches!(load_suite_config(file.path()), Err(BenchError::Message(_))));
}

#[test]
fn test_missing_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_suite_config(&dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_flags_override_file_values() {
    let file = write_temp(
        ".toml",
        "engines = [\"validator\"]\n[run]\nwarmup_iterations = 10\nmeasured_iterations = 20\n",
    );
    let opts = RunOptions {
        config: Some(file.path().to_path_buf()),
        engines: vec!["boon".into(), "jsonschema".into()],
        iterations: Some(3),
        ..Default::default()
    };
    let cfg = opts.resolve().unwrap();
    assert_eq!(cfg.engine_names(), vec!["boon", "jsonschema"]);
    assert_eq!(cfg.run.warmup_iterations, 10);
    assert_eq!(cfg.run.measured_iterations, 3);
}

#[test]
fn test_unknown_names_rejected_before_compile() {
    let file = write_temp(".toml", "workloads = [\"simple\", \"enormous\"]\n");
    let opts = RunOptions {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let err = opts.resolve().unwrap_err();
    assert!(err.to_string().contains("unknown workload 'enormous'"), "{err}");

    let cfg = SuiteConfig {
        engines: Some(vec!["ghost".into()]),
        ..Default::default()
    };
    assert!(build_suite(&cfg, EnvironmentInfo::default()).is_err());
}
