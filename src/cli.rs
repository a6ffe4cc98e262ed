//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for persona-settings.

use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};

use crate::types::model_ids;

/// Persona settings - view and edit the assistant's persona and model settings
///
/// Talks to the settings service: shows and edits the active persona, the
/// rotation interval and the generation parameters, and can run the
/// persona rotation schedule.
#[derive(Parser, Debug)]
#[command(name = "persona-settings")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and print the settings form
    Show {
        /// Path to configuration file
        #[arg(short, long, env = "PERSONA_SETTINGS_CONFIG")]
        config: Option<String>,
    },

    /// List personas in service order
    Personas {
        /// Path to configuration file
        #[arg(short, long, env = "PERSONA_SETTINGS_CONFIG")]
        config: Option<String>,
    },

    /// List the selectable models
    Models,

    /// Edit settings and save them
    Set(SetArgs),

    /// Rotate the active persona on schedule
    Rotate {
        /// Path to configuration file
        #[arg(short, long, env = "PERSONA_SETTINGS_CONFIG")]
        config: Option<String>,

        /// Rotate once right now and exit
        #[arg(long)]
        once: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Field edits for `set`; unset flags leave the field alone
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SetArgs {
    /// Path to configuration file
    #[arg(short, long, env = "PERSONA_SETTINGS_CONFIG")]
    pub config: Option<String>,

    /// Persona to make active
    #[arg(long)]
    pub persona: Option<String>,

    /// Rotation interval in minutes (unparseable or 0 means 360)
    #[arg(long, value_name = "MINUTES", allow_hyphen_values = true)]
    pub rotation_interval: Option<String>,

    /// Model identifier
    #[arg(long, value_parser = model_parser())]
    pub model: Option<String>,

    /// Sampling temperature, snapped to the 0-2 slider in 0.1 steps
    #[arg(long, allow_hyphen_values = true, value_parser = parse_temperature)]
    pub temperature: Option<f64>,

    /// Maximum tokens per response (unparseable means 0)
    #[arg(long, value_name = "TOKENS", allow_hyphen_values = true)]
    pub max_tokens: Option<String>,
}

impl SetArgs {
    /// True when no field flag was given
    pub fn is_empty(&self) -> bool {
        self.persona.is_none()
            && self.rotation_interval.is_none()
            && self.model.is_none()
            && self.temperature.is_none()
            && self.max_tokens.is_none()
    }
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the effective configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn model_parser() -> PossibleValuesParser {
    PossibleValuesParser::new(model_ids())
}

/// Temperature must be a finite number; range is the slider's job
fn parse_temperature(s: &str) -> Result<f64, String> {
    let value: f64 = s.trim().parse().map_err(|_| format!("'{}' is not a number", s))?;
    if !value.is_finite() {
        return Err(format!("'{}' is not a finite number", s));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_show_with_config() {
        let cli = Cli::parse_from(["persona-settings", "show", "--config", "/path/to/config.toml"]);
        match cli.command {
            Commands::Show { config } => {
                assert_eq!(config, Some("/path/to/config.toml".to_string()));
            }
            _ => panic!("Expected Show command"),
        }
    }

    #[test]
    fn test_set_all_fields() {
        let cli = Cli::parse_from([
            "persona-settings",
            "set",
            "--persona",
            "p2",
            "--rotation-interval",
            "45",
            "--model",
            "gpt-4o",
            "--temperature",
            "1.3",
            "--max-tokens",
            "2048",
        ]);
        match cli.command {
            Commands::Set(args) => {
                assert_eq!(args.persona.as_deref(), Some("p2"));
                assert_eq!(args.rotation_interval.as_deref(), Some("45"));
                assert_eq!(args.model.as_deref(), Some("gpt-4o"));
                assert_eq!(args.temperature, Some(1.3));
                assert_eq!(args.max_tokens.as_deref(), Some("2048"));
                assert!(!args.is_empty());
            }
            _ => panic!("Expected Set command"),
        }
    }

    #[test]
    fn test_set_keeps_raw_numbers() {
        let cli = Cli::parse_from([
            "persona-settings",
            "set",
            "--rotation-interval",
            "-5",
            "--max-tokens",
            "abc",
        ]);
        match cli.command {
            Commands::Set(args) => {
                assert_eq!(args.rotation_interval.as_deref(), Some("-5"));
                assert_eq!(args.max_tokens.as_deref(), Some("abc"));
            }
            _ => panic!("Expected Set command"),
        }
    }

    #[test]
    fn test_set_rejects_unknown_model() {
        let result = Cli::try_parse_from(["persona-settings", "set", "--model", "claude-9"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_set_rejects_non_finite_temperature() {
        for raw in ["NaN", "nan", "inf", "-inf", "infinity", "warm"] {
            let result = Cli::try_parse_from(["persona-settings", "set", "--temperature", raw]);
            assert!(result.is_err(), "{} accepted", raw);
        }

        let cli = Cli::parse_from(["persona-settings", "set", "--temperature", "-0.5"]);
        match cli.command {
            Commands::Set(args) => assert_eq!(args.temperature, Some(-0.5)),
            _ => panic!("Expected Set command"),
        }
    }

    #[test]
    fn test_set_without_fields() {
        let cli = Cli::parse_from(["persona-settings", "set"]);
        match cli.command {
            Commands::Set(args) => assert!(args.is_empty()),
            _ => panic!("Expected Set command"),
        }
    }

    #[test]
    fn test_rotate_once() {
        let cli = Cli::parse_from(["persona-settings", "rotate", "--once"]);
        match cli.command {
            Commands::Rotate { once, config } => {
                assert!(once);
                assert!(config.is_none());
            }
            _ => panic!("Expected Rotate command"),
        }
    }

    #[test]
    fn test_verbose_flags() {
        let cli = Cli::parse_from(["persona-settings", "-vv", "models"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["persona-settings", "config", "init", "--force"]);
        match cli.command {
            Commands::Config {
                subcommand: ConfigSubcommand::Init { path, force },
            } => {
                assert!(path.is_none());
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
