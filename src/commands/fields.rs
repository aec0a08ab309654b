use anyhow::Result;
use battery_cost::{
    calculators::{Calculator, CellCostCalculator, PackCostCalculator},
    config::Config,
    input::{effective_fields, EffectiveField, FieldKind},
};
use colored::Colorize;

/// Execute the fields command
pub fn execute(cfg: &Config) -> Result<()> {
    print_catalogue(
        "Cell cost fields:",
        &effective_fields(CellCostCalculator::fields(), &cfg.presets.cell),
    );
    println!();
    print_catalogue(
        "Pack cost fields:",
        &effective_fields(PackCostCalculator::fields(), &cfg.presets.pack),
    );
    Ok(())
}

fn print_catalogue(title: &str, fields: &[EffectiveField]) {
    println!("{}", title.bold());
    for field in fields {
        let name = if field.spec.alias == field.spec.key {
            field.spec.key.to_string()
        } else {
            format!("{} ({})", field.spec.key, field.spec.alias)
        };
        let preset = if field.effective_default != field.spec.default {
            " [preset]".yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "  {} {:<45} {}{}{}",
            format!("{:<40}", name).cyan(),
            field.spec.label,
            field.effective_default,
            if field.spec.kind == FieldKind::Percent { "%" } else { "" },
            preset
        );
    }
}
