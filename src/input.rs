//! Numeric field handling shared by both calculators
//!
//! Form front ends hand over raw text per named field. This module turns
//! that text into validated numbers and resolves missing fields against
//! configured presets and the built-in catalogue defaults.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::error::InvalidInputError;

/// How a field's entered value maps to the number the calculator uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Used as entered
    Amount,
    /// Entered as 0-100, used as a fraction
    Percent,
}

/// One entry of a calculator's input catalogue
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub key: &'static str,
    /// Short name as it appears on the input form
    pub alias: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub default: f64,
}

impl FieldSpec {
    /// Names are compared case-insensitively; environment overrides
    /// arrive lowercased.
    pub fn matches(&self, name: &str) -> bool {
        self.key.eq_ignore_ascii_case(name) || self.alias.eq_ignore_ascii_case(name)
    }

    /// Built-in default as the calculator uses it
    pub fn default_value(&self) -> f64 {
        match self.kind {
            FieldKind::Amount => self.default,
            FieldKind::Percent => self.default / 100.0,
        }
    }
}

/// Look up a field by canonical key or alias
pub fn find_field(specs: &'static [FieldSpec], name: &str) -> Option<&'static FieldSpec> {
    specs.iter().find(|spec| spec.matches(name.trim()))
}

/// Catalogue default for `key`; NaN when the key is not in the catalogue,
/// which every calculator rejects as non-finite.
pub fn catalogue_default(specs: &'static [FieldSpec], key: &str) -> f64 {
    find_field(specs, key).map_or(f64::NAN, FieldSpec::default_value)
}

/// Parse raw text as a finite, non-negative real number
pub fn parse_nonnegative_number(field: &str, raw: &str) -> Result<f64, InvalidInputError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| InvalidInputError::NotANumber {
            field: field.to_string(),
            raw: raw.to_string(),
        })?;

    ensure_nonnegative(field, value)
}

/// Parse a 0-100 percentage and convert it to a fraction
///
/// Upper bounds differ per field and are enforced by the calculators.
pub fn parse_percentage(field: &str, raw: &str) -> Result<f64, InvalidInputError> {
    Ok(parse_nonnegative_number(field, raw)? / 100.0)
}

/// Reject non-finite and negative values
pub fn ensure_nonnegative(field: &str, value: f64) -> Result<f64, InvalidInputError> {
    if !value.is_finite() {
        return Err(InvalidInputError::NotFinite {
            field: field.to_string(),
        });
    }
    if value < 0.0 {
        return Err(InvalidInputError::Negative {
            field: field.to_string(),
            value,
        });
    }
    Ok(value)
}

/// Reject a computed figure that overflowed or lost its divisor
pub fn ensure_finite_result(field: &str, figure: &str, value: f64) -> Result<f64, InvalidInputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InvalidInputError::out_of_range(
            field,
            format!("{} is not a finite number", figure),
        ))
    }
}

/// Name of the input with the largest magnitude, blamed for an overflow
pub fn largest_field(fields: &[(&'static str, f64)]) -> &'static str {
    fields
        .iter()
        .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .map(|(field, _)| *field)
        .unwrap_or_default()
}

/// Raw text for every field of one calculator, keyed by canonical name
#[derive(Debug, Clone)]
pub struct FieldValues {
    specs: &'static [FieldSpec],
    values: HashMap<&'static str, String>,
}

impl FieldValues {
    /// Resolve each field from, in priority order, the explicit entries,
    /// the configured presets, and the catalogue default.
    ///
    /// Names in `presets` and `entries` may be canonical keys or aliases;
    /// anything else is rejected, as is an entry naming a field already
    /// given by another entry.
    pub fn resolve<I, K, V>(
        specs: &'static [FieldSpec],
        presets: &HashMap<String, f64>,
        entries: I,
    ) -> Result<Self, InvalidInputError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut values: HashMap<&'static str, String> = specs
            .iter()
            .map(|spec| (spec.key, spec.default.to_string()))
            .collect();

        for (name, value) in presets {
            let spec = find_field(specs, name)
                .ok_or_else(|| InvalidInputError::UnknownField(name.clone()))?;
            values.insert(spec.key, value.to_string());
        }

        let mut given = HashSet::new();
        for (name, raw) in entries {
            let name = name.as_ref();
            let spec = find_field(specs, name)
                .ok_or_else(|| InvalidInputError::UnknownField(name.to_string()))?;
            if !given.insert(spec.key) {
                return Err(InvalidInputError::DuplicateField(spec.key.to_string()));
            }
            values.insert(spec.key, raw.into());
        }

        Ok(Self { specs, values })
    }

    /// Raw text currently held for a field
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Parse a field according to its catalogue kind
    pub fn value(&self, key: &str) -> Result<f64, InvalidInputError> {
        let spec = find_field(self.specs, key)
            .ok_or_else(|| InvalidInputError::UnknownField(key.to_string()))?;
        let raw = self
            .values
            .get(spec.key)
            .ok_or_else(|| InvalidInputError::MissingField(spec.key.to_string()))?;

        match spec.kind {
            FieldKind::Amount => parse_nonnegative_number(spec.key, raw),
            FieldKind::Percent => parse_percentage(spec.key, raw),
        }
    }
}

/// Catalogue entries paired with their effective default after presets
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveField {
    #[serde(flatten)]
    pub spec: FieldSpec,
    pub effective_default: f64,
}

/// Apply presets to a catalogue for display
pub fn effective_fields(
    specs: &'static [FieldSpec],
    presets: &HashMap<String, f64>,
) -> Vec<EffectiveField> {
    specs
        .iter()
        .map(|spec| {
            let preset = presets
                .iter()
                .find(|(name, _)| spec.matches(name))
                .map(|(_, value)| *value);
            EffectiveField {
                spec: *spec,
                effective_default: preset.unwrap_or(spec.default),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    static SPECS: &[FieldSpec] = &[
        FieldSpec {
            key: "capacity_ah",
            alias: "C",
            label: "Cell capacity (Ah)",
            kind: FieldKind::Amount,
            default: 10.0,
        },
        FieldSpec {
            key: "scrap_rate",
            alias: "scrap_rate",
            label: "Scrap rate (%)",
            kind: FieldKind::Percent,
            default: 10.0,
        },
    ];

    #[test]
    fn test_parse_nonnegative_number() {
        assert_eq!(parse_nonnegative_number("x", "3.2").unwrap(), 3.2);
        assert_eq!(parse_nonnegative_number("x", "  42 ").unwrap(), 42.0);
        assert_eq!(parse_nonnegative_number("x", "1e3").unwrap(), 1000.0);
        assert_eq!(parse_nonnegative_number("x", "0").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_rejects_text() {
        let err = parse_nonnegative_number("capacity_ah", "ten").unwrap_err();
        assert!(matches!(err, InvalidInputError::NotANumber { .. }));
        assert!(parse_nonnegative_number("x", "").is_err());
        assert!(parse_nonnegative_number("x", "1,000").is_err());
    }

    #[test]
    fn test_parse_rejects_non_finite() {
        for raw in ["NaN", "inf", "-inf", "infinity", "1e400"] {
            let err = parse_nonnegative_number("x", raw).unwrap_err();
            assert!(
                matches!(err, InvalidInputError::NotFinite { .. }),
                "{} should be rejected as non-finite",
                raw
            );
        }
    }

    #[test]
    fn test_parse_rejects_negative() {
        let err = parse_nonnegative_number("bms_cost", "-5").unwrap_err();
        assert_eq!(
            err,
            InvalidInputError::Negative {
                field: "bms_cost".to_string(),
                value: -5.0
            }
        );
    }

    #[test]
    fn test_parse_percentage() {
        assert_eq!(parse_percentage("x", "15").unwrap(), 0.15);
        assert_eq!(parse_percentage("x", "0").unwrap(), 0.0);
        assert!(parse_percentage("x", "-1").is_err());
    }

    #[test]
    fn test_resolve_priority() {
        let mut presets = HashMap::new();
        presets.insert("C".to_string(), 20.0);
        presets.insert("scrap_rate".to_string(), 5.0);

        let values =
            FieldValues::resolve(SPECS, &presets, [("scrap_rate", "7.5")]).unwrap();

        assert_eq!(values.value("capacity_ah").unwrap(), 20.0);
        assert_eq!(values.value("scrap_rate").unwrap(), 0.075);
        assert_eq!(values.raw("scrap_rate"), Some("7.5"));
    }

    #[test]
    fn test_resolve_defaults_only() {
        let values =
            FieldValues::resolve(SPECS, &HashMap::new(), Vec::<(String, String)>::new()).unwrap();
        assert_eq!(values.value("C").unwrap(), 10.0);
        assert_eq!(values.value("scrap_rate").unwrap(), 0.1);
    }

    #[test]
    fn test_resolve_unknown_field() {
        let err = FieldValues::resolve(SPECS, &HashMap::new(), [("voltage", "3.2")]).unwrap_err();
        assert_eq!(err, InvalidInputError::UnknownField("voltage".to_string()));

        let mut presets = HashMap::new();
        presets.insert("bogus".to_string(), 1.0);
        let err = FieldValues::resolve(SPECS, &presets, Vec::<(&str, &str)>::new()).unwrap_err();
        assert_eq!(err, InvalidInputError::UnknownField("bogus".to_string()));
    }

    #[test]
    fn test_resolve_rejects_key_and_alias_together() {
        let err = FieldValues::resolve(
            SPECS,
            &HashMap::new(),
            [("C", "10"), ("capacity_ah", "20")],
        )
        .unwrap_err();
        assert_eq!(err, InvalidInputError::DuplicateField("capacity_ah".to_string()));

        let err = FieldValues::resolve(SPECS, &HashMap::new(), [("c", "1"), ("C", "2")])
            .unwrap_err();
        assert_eq!(err.field(), "capacity_ah");
    }

    #[test]
    fn test_catalogue_default() {
        assert_eq!(catalogue_default(SPECS, "capacity_ah"), 10.0);
        assert_eq!(catalogue_default(SPECS, "scrap_rate"), 0.1);
        assert!(catalogue_default(SPECS, "voltage_v").is_nan());
    }

    #[test]
    fn test_ensure_finite_result() {
        assert_eq!(ensure_finite_result("x", "total", 2.5).unwrap(), 2.5);

        let err = ensure_finite_result("pack_capacity_kwh", "cost per kWh", f64::INFINITY)
            .unwrap_err();
        assert_eq!(err.field(), "pack_capacity_kwh");
        assert_eq!(
            err.to_string(),
            "pack_capacity_kwh: cost per kWh is not a finite number"
        );
        assert!(ensure_finite_result("x", "total", f64::NAN).is_err());
    }

    #[test]
    fn test_largest_field() {
        assert_eq!(largest_field(&[("a", 1.0), ("b", 1e300), ("c", 5.0)]), "b");
        assert_eq!(largest_field(&[]), "");
    }

    #[test]
    fn test_effective_fields() {
        let mut presets = HashMap::new();
        presets.insert("C".to_string(), 50.0);

        let fields = effective_fields(SPECS, &presets);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].effective_default, 50.0);
        assert_eq!(fields[1].effective_default, 10.0);
    }
}
