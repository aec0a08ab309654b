//! Text reports for calculation results
//!
//! Currency amounts use `$`, comma thousands separators, and two decimals.
//! Per-cell and per-kWh figures are printed without separators.

use crate::calculators::{CellCostInputs, CellCostResult, PackCostResult};
use crate::error::InvalidInputError;

/// Shown in place of a report when a calculation is rejected
pub const INPUT_ERROR_MESSAGE: &str = "Error: Please ensure all inputs are valid numbers.";

/// Same hint without the prefix, for callers that add their own
pub const INPUT_ERROR_HINT: &str = "Please ensure all inputs are valid numbers.";

pub fn render_cell(inputs: &CellCostInputs, result: &CellCostResult) -> String {
    let mut report = format!("Cost per cell: ${:.2}\n", result.cost_per_cell);
    report += &format!(
        "Total cost for {} cells: {}\n",
        format_grouped(inputs.cell_count, 0),
        format_currency(result.total_cost)
    );
    report += &format!("Cost per kWh: ${:.2}/kWh", result.cost_per_kwh);
    report
}

pub fn render_pack(result: &PackCostResult) -> String {
    let lines = [
        ("Cell cost", result.cell_total),
        ("BMS cost", result.bms_cost),
        ("Thermal management cost", result.thermal_cost),
        ("Housing cost", result.housing_total),
        ("Assembly cost", result.assembly_total),
        ("Subtotal", result.subtotal),
        ("Overhead", result.overhead),
        ("Total pack cost", result.total_cost),
    ];

    let mut report = String::new();
    for (label, amount) in lines {
        report += &format!("{}: {}\n", label, format_currency(amount));
    }
    report += &format!("Cost per kWh: ${:.2}/kWh", result.cost_per_kwh);
    report
}

/// Generic failure text followed by the specific cause
pub fn render_error(err: &InvalidInputError) -> String {
    format!("{}\n{}", INPUT_ERROR_MESSAGE, err)
}

/// `$1,234.50`
pub fn format_currency(amount: f64) -> String {
    format!("${}", format_grouped(amount, 2))
}

/// Fixed-point formatting with comma-separated thousands
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    // "-0.00" would be misleading
    if value < 0.0 && formatted.bytes().any(|b| (b'1'..=b'9').contains(&b)) {
        grouped.push('-');
    }
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }

    grouped
}
