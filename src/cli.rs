use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "battery-cost", version, about = "Battery cell and pack cost estimator")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Estimate per-cell, total, and per-kWh cell cost
    Cell(CalculateArgs),

    /// Estimate total and per-kWh pack cost
    Pack(CalculateArgs),

    /// List input fields with their effective defaults
    Fields,

    /// Start the HTTP service (default)
    Serve,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CalculateArgs {
    /// Field value such as `capacity_ah=20` or `C=20`; repeatable.
    /// Unset fields use the configured preset or built-in default.
    #[arg(short, long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display the effective configuration
    Show,

    /// Validate configuration file
    Validate,
}

impl Cli {
    /// Get the command to execute, defaulting to Serve if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

/// Split `FIELD=VALUE`. The value is kept as raw text and parsed later so
/// that bad numbers are reported the same way as in the HTTP service.
fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli {
            config: PathBuf::from("config.toml"),
            command: None,
        };

        assert!(matches!(cli.get_command(), Commands::Serve));
    }

    #[test]
    fn test_cli_parsing_cell_with_fields() {
        let args = vec!["battery-cost", "cell", "--set", "C=20", "-s", "voltage_v=3.7"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Cell(args) => {
                assert_eq!(
                    args.set,
                    vec![
                        ("C".to_string(), "20".to_string()),
                        ("voltage_v".to_string(), "3.7".to_string())
                    ]
                );
                assert_eq!(args.format, OutputFormat::Text);
            }
            _ => panic!("Expected Cell command"),
        }
    }

    #[test]
    fn test_cli_parsing_pack_json() {
        let args = vec!["battery-cost", "--config", "alt.toml", "pack", "--format", "json"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.config, PathBuf::from("alt.toml"));
        match cli.get_command() {
            Commands::Pack(args) => {
                assert!(args.set.is_empty());
                assert_eq!(args.format, OutputFormat::Json);
            }
            _ => panic!("Expected Pack command"),
        }
    }

    #[test]
    fn test_cli_rejects_malformed_assignment() {
        let args = vec!["battery-cost", "cell", "--set", "capacity_ah"];
        assert!(Cli::try_parse_from(args).is_err());

        assert!(parse_assignment("=5").is_err());
        assert_eq!(
            parse_assignment("bms_cost=").unwrap(),
            ("bms_cost".to_string(), String::new())
        );
    }

    #[test]
    fn test_cli_parsing_config_show() {
        let args = vec!["battery-cost", "config", "show"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Config { action } => {
                assert!(matches!(action, ConfigCommands::Show));
            }
            _ => panic!("Expected Config command"),
        }
    }
}
