//! Config loading: file, then env overrides, then validation.

use crate::env::{FormsEnv, apply_env_overrides};
use crate::schema::{FormsConfig, ValidatedFormsConfig};
use checkin_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

/// Load from an optional JSON document.
///
/// Precedence (highest wins): env overrides, the document, defaults.
pub fn load_forms_config_from_sources(
    config_json: Option<&str>,
    env: &FormsEnv,
) -> Result<ValidatedFormsConfig, ErrorEnvelope> {
    let config = match config_json {
        None => FormsConfig::default(),
        Some(input) => parse_config_unvalidated(input, ConfigFormat::Json)?,
    };
    apply_env_overrides(config, env)
}

/// Load from an optional file; the format follows the extension.
pub fn load_forms_config_from_path(
    config_path: Option<&Path>,
    env: &FormsEnv,
) -> Result<ValidatedFormsConfig, ErrorEnvelope> {
    let config = match config_path {
        None => FormsConfig::default(),
        Some(path) => {
            let format = detect_config_format(path)?;
            let text = read_config_file(path)?;
            parse_config_unvalidated(&text, format)
                .map_err(|error| error.with_metadata("path", path.display().to_string()))?
        },
    };
    apply_env_overrides(config, env)
}

/// Load from an optional file plus the process environment.
pub fn load_forms_config_std_env(
    config_path: Option<&Path>,
) -> Result<ValidatedFormsConfig, ErrorEnvelope> {
    let env = FormsEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_forms_config_from_path(config_path, &env)
}

/// Pretty JSON with a trailing newline.
pub fn to_pretty_json(config: &FormsConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_json"),
            format!("failed to serialize config JSON: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Pretty TOML with a trailing newline.
pub fn to_pretty_toml(config: &FormsConfig) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

fn parse_config_unvalidated(
    input: &str,
    format: ConfigFormat,
) -> Result<FormsConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
        }),
    }
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };
        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.display().to_string())
    })
}

fn detect_config_format(path: &Path) -> Result<ConfigFormat, ErrorEnvelope> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some(other) => Err(ErrorEnvelope::expected(
            ErrorCode::new("config", "unsupported_format"),
            "unsupported config format; use .json or .toml",
        )
        .with_metadata("extension", other.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn no_sources_yields_defaults() -> Result<(), Box<dyn Error>> {
        let config = load_forms_config_from_sources(None, &FormsEnv::default())?;
        let defaults = FormsConfig::default().validate_and_normalize()?;
        assert_eq!(config, defaults);
        assert_eq!(
            config.directory.taken_usernames,
            ["james", "kirk", "lars", "robert"].map(Box::<str>::from)
        );
        Ok(())
    }

    #[test]
    fn env_beats_the_document() -> Result<(), Box<dyn Error>> {
        let env = FormsEnv {
            debounce_ms: Some(50),
            ..FormsEnv::default()
        };
        let config = load_forms_config_from_sources(
            Some(r#"{"validator":{"debounceMs":900,"lookupTimeoutMs":2000}}"#),
            &env,
        )?;
        assert_eq!(config.validator.debounce_ms, 50);
        assert_eq!(config.validator.lookup_timeout_ms, 2_000);
        Ok(())
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let error = load_forms_config_from_path(
            Some(Path::new("forms.yaml")),
            &FormsEnv::default(),
        )
        .err();
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("config", "unsupported_format"))
        );
    }

    #[test]
    fn missing_file_has_a_dedicated_code() {
        let error = load_forms_config_from_path(
            Some(Path::new("/definitely/not/here/forms.toml")),
            &FormsEnv::default(),
        )
        .err();
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("config", "config_file_not_found"))
        );
    }

    #[test]
    fn pretty_renderings_end_with_newline() -> Result<(), Box<dyn Error>> {
        let config = FormsConfig::default();
        let json = to_pretty_json(&config)?;
        let toml_text = to_pretty_toml(&config)?;
        assert!(json.ends_with('\n'));
        assert!(json.contains("\"debounceMs\": 400"));
        assert!(toml_text.contains("debounceMs = 400"));
        Ok(())
    }
}
