//! Loading config documents from disk.

use checkin_config::{
    FormsEnv, LogFormat, PassengerStorageMode, load_forms_config_from_path, to_pretty_toml,
};
use checkin_shared::ErrorCode;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn scratch_dir(name: &str) -> Result<PathBuf, Box<dyn Error>> {
    let dir = std::env::temp_dir().join(format!("checkin-config-{name}-{}", std::process::id()));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[test]
fn toml_file_is_loaded_and_normalized() -> Result<(), Box<dyn Error>> {
    let dir = scratch_dir("toml")?;
    let path = dir.join("forms.toml");
    fs::write(
        &path,
        r#"
version = 1

[validator]
debounceMs = 300

[directory]
takenUsernames = ["Cliff", "JASON", "cliff"]
takenMessage = "Username taken at Gate B12"

[storage]
mode = "file"
path = "/srv/checkin/passengers.json"

[log]
level = "Warn"
format = "json"
"#,
    )?;

    let config = load_forms_config_from_path(Some(&path), &FormsEnv::default())?;
    assert_eq!(config.debounce(), Duration::from_millis(300));
    assert_eq!(config.lookup_delay(), Duration::from_millis(500));
    assert_eq!(&*config.log.level, "warn");
    assert_eq!(config.log.format, LogFormat::Json);
    assert_eq!(
        config.storage_mode().snapshot_path(),
        Some(Path::new("/srv/checkin/passengers.json"))
    );

    let rules = config.username_rules()?;
    assert_eq!(rules.taken().collect::<Vec<_>>(), ["cliff", "jason"]);
    assert_eq!(rules.taken_message(), "Username taken at Gate B12");
    Ok(())
}

#[test]
fn json_file_round_trips_through_pretty_toml() -> Result<(), Box<dyn Error>> {
    let dir = scratch_dir("json")?;
    let json_path = dir.join("forms.json");
    fs::write(&json_path, r#"{ "directory": { "lookupDelayMs": 20 } }"#)?;
    let config = load_forms_config_from_path(Some(&json_path), &FormsEnv::default())?;
    assert_eq!(config.storage_mode(), PassengerStorageMode::Memory);

    let toml_path = dir.join("effective.toml");
    fs::write(&toml_path, to_pretty_toml(&config)?)?;
    let reloaded = load_forms_config_from_path(Some(&toml_path), &FormsEnv::default())?;
    assert_eq!(reloaded, config);
    Ok(())
}

#[test]
fn unsupported_version_is_reported_with_path() -> Result<(), Box<dyn Error>> {
    let dir = scratch_dir("version")?;
    let path = dir.join("forms.json");
    fs::write(&path, r#"{ "version": 2 }"#)?;

    let error = load_forms_config_from_path(Some(&path), &FormsEnv::default())
        .err()
        .ok_or("expected a version error")?;
    assert_eq!(error.code, ErrorCode::new("config", "unsupported_version"));
    assert_eq!(error.metadata.get("found").map(String::as_str), Some("2"));
    Ok(())
}

#[test]
fn malformed_toml_names_the_file() -> Result<(), Box<dyn Error>> {
    let dir = scratch_dir("malformed")?;
    let path = dir.join("forms.toml");
    fs::write(&path, "validator = [")?;

    let error = load_forms_config_from_path(Some(&path), &FormsEnv::default())
        .err()
        .ok_or("expected a parse error")?;
    assert_eq!(error.code, ErrorCode::new("config", "invalid_toml"));
    assert_eq!(
        error.metadata.get("path").map(String::as_str),
        Some(path.display().to_string().as_str())
    );
    Ok(())
}
