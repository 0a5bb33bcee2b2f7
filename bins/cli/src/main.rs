//! `checkin` CLI binary entrypoint.

mod commands;
mod error;
mod format;
mod logging;

use checkin_config::env::ENV_LOG_FORMAT;
use checkin_config::{LogFormat, ValidatedFormsConfig};
use checkin_infra::{FormServices, InfraError, load_effective_config};
use checkin_shared::{ErrorCode, redact_for_key};
use clap::{Args, Parser, Subcommand, ValueEnum};
use commands::{
    run_check_username, run_config_check, run_config_show, run_info, run_passengers_list,
    run_script, run_validate,
};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode, ndjson_line, pretty_json};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

const ENV_PREFIX: &str = "CHECKIN_";

#[derive(Debug, Parser)]
#[command(
    name = "checkin",
    version,
    about = "Passenger check-in forms with debounced username validation",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Config file (JSON or TOML). Env vars prefixed `CHECKIN_` override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log line format on stderr.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormatArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Text,
    Json,
}

impl LogFormatArg {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show build and version details.
    Info,
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Type one or more usernames in sequence and report what the field shows.
    CheckUsername {
        /// Values in typing order.
        #[arg(required = true)]
        values: Vec<String>,
        /// Pause between values, in milliseconds.
        #[arg(long, default_value_t = 100)]
        gap_ms: u64,
    },
    /// Validate a single synchronous field (full name, email, or seat).
    Validate {
        /// Field name (`fullName`, `email`, `seat`).
        field: String,
        /// Value to check.
        value: String,
    },
    /// Run a form script (stdin when no file is given).
    Run {
        /// Script file.
        #[arg(long)]
        script: Option<PathBuf>,
    },
    /// Stored passenger commands.
    Passengers {
        #[command(subcommand)]
        command: PassengersCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Validate the effective config.
    Check,
    /// Print the effective config (TOML in text mode, JSON otherwise).
    Show,
}

#[derive(Debug, Subcommand)]
enum PassengersCommands {
    /// List stored passengers in check-in order.
    List,
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

impl CliOutput {
    pub(crate) const fn ok(stdout: String) -> Self {
        Self {
            stdout,
            stderr: String::new(),
            exit_code: ExitCode::Ok,
        }
    }

    pub(crate) fn with_progress(mut self, mode: OutputMode, message: &str) -> Self {
        log_info(&mut self.stderr, message, mode.no_progress);
        self
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);
    let config = load_config(&cli.global);

    let (level, format) = config.as_ref().map_or(("info", LogFormat::Text), |config| {
        (&*config.log.level, config.log.format)
    });
    logging::init_tracing(if mode.no_progress { "warn" } else { level }, format);

    match run(&cli.command, mode, config) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(
    command: &Commands,
    mode: OutputMode,
    config: Result<ValidatedFormsConfig, InfraError>,
) -> Result<CliOutput, CliError> {
    if matches!(command, Commands::Info) {
        return run_info(mode);
    }
    if let Commands::Validate { field, value } = command {
        return run_validate(mode, field, value);
    }

    let config = match config {
        Ok(config) => config,
        Err(error) => return Ok(format_error_output(mode, &error)),
    };
    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Check => run_config_check(mode, &config),
            ConfigCommands::Show => run_config_show(mode, &config),
        },
        command => {
            let services = match FormServices::from_config(&config) {
                Ok(services) => services,
                Err(error) => return Ok(format_error_output(mode, &error)),
            };
            run_with_services(command, mode, &services)
        },
    }
}

fn run_with_services(
    command: &Commands,
    mode: OutputMode,
    services: &FormServices,
) -> Result<CliOutput, CliError> {
    match command {
        Commands::CheckUsername { values, gap_ms } => {
            run_check_username(mode, services, values, *gap_ms)
        },
        Commands::Run { script } => run_script(mode, services, script.as_deref()),
        Commands::Passengers {
            command: PassengersCommands::List,
        } => run_passengers_list(mode, services),
        Commands::Info | Commands::Validate { .. } | Commands::Config { .. } => {
            Ok(format_error_output(
                mode,
                &InfraError::invariant(
                    ErrorCode::internal(),
                    "command does not use form services",
                ),
            ))
        },
    }
}

fn load_config(global: &GlobalArgs) -> Result<ValidatedFormsConfig, InfraError> {
    let mut env = collect_scoped_env(ENV_PREFIX);
    if let Some(format) = global.log_format {
        env.insert(ENV_LOG_FORMAT.to_owned(), format.as_str().to_owned());
    }
    load_effective_config(&env, global.config.as_deref())
}

pub(crate) fn format_error_output(mode: OutputMode, error: &InfraError) -> CliOutput {
    let error = sanitize_error(error);
    let mut stderr = String::new();
    log_info(&mut stderr, "command failed", mode.no_progress);

    let stdout = if mode.is_ndjson() {
        let payload = serde_json::json!({
            "type": "error",
            "status": "error",
            "error": error,
        });
        ndjson_line(&payload).unwrap_or_else(|_| INTERNAL_ERROR_JSON.to_owned() + "\n")
    } else if mode.is_json() {
        let payload = serde_json::json!({
            "status": "error",
            "error": error,
        });
        pretty_json(&payload).unwrap_or_else(|_| INTERNAL_ERROR_JSON.to_owned() + "\n")
    } else {
        format_error_text(&error)
    };

    CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::for_envelope(&error),
    }
}

const INTERNAL_ERROR_JSON: &str =
    "{\"status\":\"error\",\"error\":{\"code\":\"core:internal\",\"message\":\"internal error\"}}";

fn sanitize_error(error: &InfraError) -> InfraError {
    let mut error = error.clone();
    for (key, value) in &mut error.metadata {
        if let Some(masked) = redact_for_key(key, value) {
            *value = masked;
        }
    }
    error
}

fn format_error_text(error: &InfraError) -> String {
    let mut out = format!(
        "status: error\ncode: {}\nmessage: {}\nkind: {}\n",
        error.code, error.message, error.kind
    );
    if !error.metadata.is_empty() {
        out.push_str("meta:\n");
        for (key, value) in &error.metadata {
            out.push_str(&format!("  {key}: {value}\n"));
        }
    }
    out
}

fn log_info(stderr: &mut String, message: &str, no_progress: bool) {
    if no_progress {
        return;
    }
    stderr.push_str("info: ");
    stderr.push_str(message);
    stderr.push('\n');
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout
        .write_all(output.stdout.as_bytes())
        .map_err(|error| CliError::io("failed to write stdout", error))?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr
            .write_all(output.stderr.as_bytes())
            .and_then(|()| stderr.flush())
            .map_err(|error| CliError::io("failed to write stderr", error))?;
    }
    Ok(())
}

fn collect_scoped_env(prefix: &str) -> BTreeMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(prefix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn text_mode() -> OutputMode {
        OutputMode::from_args(&OutputArgs {
            output: None,
            agent: false,
            no_progress: true,
        })
    }

    #[test]
    fn version_flag_is_supported() {
        let result = Cli::command().try_get_matches_from(["checkin", "--version"]);
        let is_version = matches!(
            result,
            Err(error) if error.kind() == clap::error::ErrorKind::DisplayVersion
        );
        assert!(is_version, "expected clap to render version");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn check_username_requires_a_value() {
        let result = Cli::command().try_get_matches_from(["checkin", "check-username"]);
        assert!(result.is_err());
    }

    #[test]
    fn expected_errors_exit_with_invalid_input() {
        let error = InfraError::expected(ErrorCode::invalid_input(), "bad field")
            .with_metadata("email", "kirk@enterprise.ship");
        let output = format_error_output(text_mode(), &error);

        assert_eq!(output.exit_code, ExitCode::InvalidInput);
        assert!(output.stdout.contains("code: core:invalid_input"));
        assert!(output.stdout.contains("email: k***@enterprise.ship"));
        assert!(output.stderr.is_empty());
    }

    #[test]
    fn io_failures_exit_with_io() {
        let error = InfraError::from(io::Error::other("disk full"));
        assert_eq!(format_error_output(text_mode(), &error).exit_code, ExitCode::Io);
    }

    #[test]
    fn cli_errors_map_to_exit_codes() -> Result<(), Box<dyn std::error::Error>> {
        let io_error = CliError::io("read", io::Error::other("io"));
        let serialization_error = match serde_json::from_str::<serde_json::Value>("not-json") {
            Ok(_) => return Err("expected serialization error".into()),
            Err(error) => CliError::Serialization(error),
        };
        assert_eq!(io_error.exit_code(), ExitCode::Io);
        assert_eq!(serialization_error.exit_code(), ExitCode::Internal);
        Ok(())
    }
}
