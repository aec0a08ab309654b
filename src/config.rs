use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::calculators::{Calculator, CellCostCalculator, PackCostCalculator};
use crate::input::FieldSpec;

/// Environment variable prefix, e.g. `BATTERY_COST__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "BATTERY_COST";

/// Routes served regardless of configuration
const RESERVED_PATHS: &[&str] = &["/health", "/v1/fields", "/v1/cell-cost", "/v1/pack-cost"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub metrics: MetricsConfig,
    pub presets: PresetsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// `text` or `json`
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "/metrics".to_string(),
        }
    }
}

/// Per-calculator default overrides, keyed by field name or alias
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PresetsConfig {
    pub cell: HashMap<String, f64>,
    pub pack: HashMap<String, f64>,
}

impl PresetsConfig {
    /// Presets for the calculator registered under `name`
    pub fn for_calculator(&self, name: &str) -> &HashMap<String, f64> {
        if name == PackCostCalculator::NAME {
            &self.pack
        } else {
            &self.cell
        }
    }
}

/// Load configuration from an optional TOML file overlaid by environment
/// variables, then validate it.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    match cfg.server.log_format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Invalid log_format '{}', expected 'text' or 'json'", other),
    }

    if cfg.metrics.enabled {
        if !cfg.metrics.endpoint.starts_with('/') {
            anyhow::bail!(
                "Metrics endpoint must start with '/', got '{}'",
                cfg.metrics.endpoint
            );
        }
        if RESERVED_PATHS.contains(&cfg.metrics.endpoint.as_str()) {
            anyhow::bail!(
                "Metrics endpoint '{}' collides with a built-in route",
                cfg.metrics.endpoint
            );
        }
    }

    validate_presets::<CellCostCalculator>(&cfg.presets.cell)?;
    validate_presets::<PackCostCalculator>(&cfg.presets.pack)?;

    Ok(())
}

/// Preset keys must be known and must not name the same field twice, and
/// the resulting defaults must be computable on their own.
fn validate_presets<C: Calculator>(presets: &HashMap<String, f64>) -> anyhow::Result<()> {
    let fields: &[FieldSpec] = C::fields();
    for spec in fields {
        let hits = presets.keys().filter(|name| spec.matches(name)).count();
        if hits > 1 {
            anyhow::bail!(
                "Preset for {} field '{}' is given more than once (key and alias)",
                C::NAME,
                spec.key
            );
        }
    }

    C::calculate(presets, Vec::<(String, String)>::new())
        .map_err(|e| anyhow::anyhow!("Invalid {} presets: {}", C::NAME, e))?;

    Ok(())
}
