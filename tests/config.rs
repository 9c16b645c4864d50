use std::error::Error;
use std::fs;
use std::path::Path;

use fanwatch::PathFilter;
use fanwatch::cli::CliArgs;
use fanwatch::config::{ConfigFile, RawConfigFile, Settings, load_and_validate, load_or_default};
use fanwatch::errors::FanwatchError;
use fanwatch::types::OutputFormat;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("Fanwatch.toml");
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn full_config_file_loads() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_config(
        &dir,
        r#"
[watch]
directory = "/srv/data"
include = ["/srv/data/**"]
exclude = ["**/.git/**"]
queue_length = 16
max_path_len = 4096
subtree_only = false

[output]
format = "json"
"#,
    );

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.watch().directory.as_deref(), Some(Path::new("/srv/data")));
    assert_eq!(cfg.watch().include, vec!["/srv/data/**".to_string()]);
    assert_eq!(cfg.watch().exclude, vec!["**/.git/**".to_string()]);
    assert_eq!(cfg.watch().queue_length, 16);
    assert_eq!(cfg.watch().max_path_len, Some(4096));
    assert!(!cfg.watch().subtree_only);
    assert_eq!(cfg.output().format, OutputFormat::Json);
    Ok(())
}

#[test]
fn empty_config_uses_defaults() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_config(&dir, "");

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.watch().directory, None);
    assert_eq!(cfg.watch().queue_length, 1024);
    assert_eq!(cfg.watch().max_path_len, None);
    assert!(cfg.watch().subtree_only);
    assert_eq!(cfg.output().format, OutputFormat::Text);
    Ok(())
}

#[test]
fn zero_queue_length_is_rejected() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_config(&dir, "[watch]\nqueue_length = 0\n");

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, FanwatchError::ConfigError(ref msg) if msg.contains("queue_length")));
    Ok(())
}

#[test]
fn zero_path_limit_is_rejected() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_config(&dir, "[watch]\nmax_path_len = 0\n");

    assert!(matches!(
        load_and_validate(&path),
        Err(FanwatchError::ConfigError(_))
    ));
    Ok(())
}

#[test]
fn invalid_glob_is_rejected() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_config(&dir, "[watch]\nexclude = [\"a[\"]\n");

    assert!(matches!(
        load_and_validate(&path),
        Err(FanwatchError::GlobError(_))
    ));
    Ok(())
}

#[test]
fn unknown_fields_are_rejected() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_config(&dir, "[watch]\nrecursive = true\n");

    assert!(matches!(
        load_and_validate(&path),
        Err(FanwatchError::TomlError(_))
    ));
    Ok(())
}

#[test]
fn explicit_missing_config_is_an_error() {
    let result = load_or_default(Some(Path::new("/definitely/not/here/Fanwatch.toml")));
    assert!(matches!(result, Err(FanwatchError::IoError(_))));
}

#[test]
fn cli_overrides_and_extends_config() -> TestResult {
    let watched = TempDir::new()?;
    let raw: RawConfigFile = toml::from_str(
        r#"
[watch]
directory = "/does/not/matter"
exclude = ["**/*.tmp"]
queue_length = 8
"#,
    )?;
    let cfg = ConfigFile::try_from(raw)?;
    let args = CliArgs {
        directory: Some(watched.path().to_path_buf()),
        exclude: vec!["**/*.swp".to_string()],
        queue_length: Some(32),
        format: Some(OutputFormat::Json),
        ..CliArgs::default()
    };

    let settings = Settings::from_sources(&cfg, &args)?;
    assert_eq!(settings.directory, watched.path().canonicalize()?);
    assert_eq!(
        settings.exclude,
        vec!["**/*.tmp".to_string(), "**/*.swp".to_string()]
    );
    assert_eq!(settings.queue_length, 32);
    assert_eq!(settings.format, OutputFormat::Json);
    Ok(())
}

#[test]
fn missing_directory_is_a_config_error() -> TestResult {
    let cfg = ConfigFile::try_from(RawConfigFile::default())?;

    let err = Settings::from_sources(&cfg, &CliArgs::default()).unwrap_err();
    assert!(matches!(err, FanwatchError::ConfigError(_)));

    let args = CliArgs {
        directory: Some("/definitely/not/here".into()),
        ..CliArgs::default()
    };
    let err = Settings::from_sources(&cfg, &args).unwrap_err();
    assert!(matches!(err, FanwatchError::ConfigError(_)));
    Ok(())
}

#[test]
fn zero_queue_length_on_cli_is_rejected() -> TestResult {
    let watched = TempDir::new()?;
    let cfg = ConfigFile::try_from(RawConfigFile::default())?;
    let args = CliArgs {
        directory: Some(watched.path().to_path_buf()),
        queue_length: Some(0),
        ..CliArgs::default()
    };

    assert!(matches!(
        Settings::from_sources(&cfg, &args),
        Err(FanwatchError::ConfigError(_))
    ));
    Ok(())
}

#[test]
fn settings_filter_limits_to_watched_subtree() -> TestResult {
    let watched = TempDir::new()?;
    let cfg = ConfigFile::try_from(RawConfigFile::default())?;
    let args = CliArgs {
        directory: Some(watched.path().to_path_buf()),
        exclude: vec!["**/*.tmp".to_string()],
        ..CliArgs::default()
    };
    let settings = Settings::from_sources(&cfg, &args)?;
    let filter = settings.filter()?;

    let root = &settings.directory;
    assert!(!filter.is_filtered(root));
    assert!(!filter.is_filtered(&root.join("notes.txt")));
    assert!(filter.is_filtered(&root.join("scratch.tmp")));
    assert!(filter.is_filtered(Path::new("/somewhere/else")));
    Ok(())
}

#[test]
fn include_patterns_narrow_what_is_kept() -> TestResult {
    let filter = fanwatch::GlobFilter::new(&["**/*.rs".to_string()], &[])?;

    assert!(!filter.is_filtered(Path::new("/src/main.rs")));
    assert!(filter.is_filtered(Path::new("/src/README.md")));
    Ok(())
}
