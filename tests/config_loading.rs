// tests/config_loading.rs

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use pomwatch::config::{load_and_validate, load_optional};
use pomwatch::errors::PomwatchError;
use pomwatch::types::CoalesceMode;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_is_loaded() {
    let file = write_config(
        r#"
[watch]
directory = "/srv/project"
coalesce = "off"
max_depth = 12

[build]
program = "./mvnw"
offline = true
quiet = true
batch_mode = false
settings = "/etc/maven/settings.xml"

[build.defines]
skipTests = "true"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.watch.directory, Some(PathBuf::from("/srv/project")));
    assert_eq!(cfg.watch.coalesce, CoalesceMode::Off);
    assert_eq!(cfg.watch.max_depth, 12);
    assert_eq!(cfg.build.program, "./mvnw");
    assert!(cfg.build.offline);
    assert!(cfg.build.quiet);
    assert!(!cfg.build.batch_mode);
    assert_eq!(cfg.build.settings, Some(PathBuf::from("/etc/maven/settings.xml")));
    assert_eq!(cfg.build.defines.get("skipTests").map(String::as_str), Some("true"));
}

#[test]
fn unknown_key_is_a_toml_error() {
    let file = write_config("[watch]\nrecursive = true\n");

    match load_and_validate(file.path()) {
        Err(PomwatchError::TomlError(err)) => {
            assert!(err.to_string().contains("recursive"));
        }
        other => panic!("expected TomlError, got {:?}", other),
    }
}

#[test]
fn unknown_coalesce_mode_is_a_toml_error() {
    let file = write_config("[watch]\ncoalesce = \"sometimes\"\n");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(PomwatchError::TomlError(_))
    ));
}

#[test]
fn invalid_values_are_config_errors() {
    let file = write_config("[build.defines]\n\"a=b\" = \"c\"\n");

    match load_and_validate(file.path()) {
        Err(PomwatchError::ConfigError(msg)) => assert!(msg.contains("a=b")),
        other => panic!("expected ConfigError, got {:?}", other),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("pomwatch.toml");

    assert!(matches!(
        load_optional(Some(&missing)),
        Err(PomwatchError::IoError(_))
    ));
}

#[test]
fn no_file_means_defaults() {
    let cfg = load_optional(None).unwrap();
    assert_eq!(cfg.watch.coalesce, CoalesceMode::Batch);
    assert_eq!(cfg.build.program, "mvn");
}
