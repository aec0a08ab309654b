use anyhow::Result;
use battery_cost::config::Config;
use colored::Colorize;
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Prints the effective configuration (file, environment, and defaults merged)
pub fn show(cfg: &Config) -> Result<()> {
    info!("Displaying effective configuration");

    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(cfg)?;
    println!("{}", toml_string);

    Ok(())
}

/// Execute the config validate command
///
/// Loading already validated the configuration; this prints a summary.
pub fn validate(cfg: &Config, path: &Path) -> Result<()> {
    info!("Configuration validation successful");

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!(
        "  {}: {}",
        "Source".cyan(),
        if path.exists() {
            path.display().to_string()
        } else {
            format!("{} (not found, using defaults)", path.display())
        }
    );
    println!("  {}: {}:{}", "Server".cyan(), cfg.server.host, cfg.server.port);
    println!(
        "  {}: {} ({})",
        "Logging".cyan(),
        cfg.server.log_level,
        cfg.server.log_format
    );
    println!(
        "  {}: {}",
        "Metrics".cyan(),
        if cfg.metrics.enabled {
            cfg.metrics.endpoint.green()
        } else {
            "disabled".red()
        }
    );
    println!("  {}: {}", "Cell presets".cyan(), cfg.presets.cell.len());
    println!("  {}: {}", "Pack presets".cyan(), cfg.presets.pack.len());

    Ok(())
}
