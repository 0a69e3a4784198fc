//! Replays a JSON-lines annotation command script and prints the result.
//!
//! Usage: `cascade-labeler [SCRIPT]`. Reads stdin when no script is given.

use std::io::Read;

use cascade_labeler::CascadeLabeler;
use cascade_labeler::config::{AppConfig, ConfigError};
use cascade_labeler::format::{FormatError, labels_to_json, parse_command_script};
use cascade_labeler::state::AnnotationError;

#[derive(Debug, thiserror::Error)]
enum ReplayError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("Command {number} failed: {source}")]
    Command {
        number: usize,
        source: AnnotationError,
    },
}

fn init_logging(config: &AppConfig) {
    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.into())
        .parse_default_env()
        .init();
}

/// Fall back to defaults when the config file is missing or unusable, keeping
/// the error so it can be reported once logging is up.
fn resolve_config(
    loaded: Result<Option<AppConfig>, ConfigError>,
) -> (AppConfig, Option<ConfigError>) {
    match loaded {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(e) => (AppConfig::default(), Some(e)),
    }
}

fn read_script(path: Option<String>) -> Result<String, FormatError> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut script = String::new();
            std::io::stdin().read_to_string(&mut script)?;
            Ok(script)
        }
    }
}

fn run(config: &AppConfig, path: Option<String>) -> Result<String, ReplayError> {
    let script = read_script(path)?;
    let commands = parse_command_script(&script)?;
    log::info!("Replaying {} commands", commands.len());

    let mut app = CascadeLabeler::with_config(config);
    for (index, command) in commands.into_iter().enumerate() {
        app.dispatch(command)
            .map_err(|source| ReplayError::Command {
                number: index + 1,
                source,
            })?;
    }

    Ok(labels_to_json(&app.all_annotations())?)
}

fn main() {
    let (config, config_error) = resolve_config(AppConfig::load_from_default_path());
    init_logging(&config);
    if let Some(e) = config_error {
        log::warn!("Ignoring config file, using defaults: {}", e);
    }

    match run(&config, std::env::args().nth(1)) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Replay error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_config_falls_back_with_error() {
        let broken = AppConfig::from_json(r#"{"version": 99}"#).map(Some);
        let (config, error) = resolve_config(broken);
        assert_eq!(config, AppConfig::default());
        assert!(matches!(error, Some(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn test_missing_config_is_silent() {
        let (config, error) = resolve_config(Ok(None));
        assert_eq!(config, AppConfig::default());
        assert!(error.is_none());
    }
}
