use anyhow::Result;
use battery_cost::{
    calculators::Calculator,
    config::Config,
    report::INPUT_ERROR_HINT,
};
use colored::Colorize;
use tracing::{debug, warn};

use crate::cli::{CalculateArgs, OutputFormat};

/// Execute the cell or pack command
///
/// Rejected input is returned as an error carrying the generic hint, with the
/// specific cause attached.
pub fn execute<C: Calculator>(cfg: &Config, args: CalculateArgs) -> Result<()> {
    debug!(calculator = C::NAME, fields = args.set.len(), "Running calculation");

    let calculation = match C::calculate(cfg.presets.for_calculator(C::NAME), args.set) {
        Ok(calculation) => calculation,
        Err(err) => {
            warn!(calculator = C::NAME, error = %err, "Calculation rejected");
            return Err(anyhow::Error::new(err).context(INPUT_ERROR_HINT));
        }
    };

    match args.format {
        OutputFormat::Text => {
            let title = format!("{} cost", capitalize(C::NAME));
            println!("{}", title.green().bold());
            println!("{}", calculation.report);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&calculation)?);
        }
    }

    Ok(())
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
