//! Unit conversion tables

use serde::Serialize;

/// Measurement category of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Length,
    Weight,
    Volume,
    Temperature,
}

const FACTORS: &[(&str, &str, UnitType, f64)] = &[
    ("km", "miles", UnitType::Length, 1000.0 / 1609.344),
    ("miles", "km", UnitType::Length, 1609.344 / 1000.0),
    ("m", "ft", UnitType::Length, 10000.0 / 3048.0),
    ("ft", "m", UnitType::Length, 3048.0 / 10000.0),
    ("cm", "inch", UnitType::Length, 1.0 / 2.54),
    ("inch", "cm", UnitType::Length, 254.0 / 100.0),
    ("kg", "lb", UnitType::Weight, 2.2046226218),
    ("lb", "kg", UnitType::Weight, 0.45359237),
    ("g", "oz", UnitType::Weight, 1000.0 / 28349.523125),
    ("oz", "g", UnitType::Weight, 28.349523125),
    ("l", "gal", UnitType::Volume, 1000.0 / 3785.411784),
    ("gal", "l", UnitType::Volume, 3.785411784),
    ("ml", "floz", UnitType::Volume, 1000.0 / 29.5735296875),
    ("floz", "ml", UnitType::Volume, 29.5735296875),
];

const KELVIN_OFFSET: f64 = 273.15;

fn to_celsius(unit: &str, value: f64) -> Option<f64> {
    match unit {
        "celsius" => Some(value),
        "fahrenheit" => Some((value - 32.0) * 5.0 / 9.0),
        "kelvin" => Some(value - KELVIN_OFFSET),
        _ => None,
    }
}

fn from_celsius(unit: &str, celsius: f64) -> Option<f64> {
    match unit {
        "celsius" => Some(celsius),
        "fahrenheit" => Some(celsius * 9.0 / 5.0 + 32.0),
        "kelvin" => Some(celsius + KELVIN_OFFSET),
        _ => None,
    }
}

fn normalize(unit: &str) -> String {
    let unit = unit.trim().to_ascii_lowercase();
    match unit.as_str() {
        "mi" | "mile" => "miles".to_string(),
        "in" | "inches" => "inch".to_string(),
        "feet" | "foot" => "ft".to_string(),
        "lbs" | "pound" | "pounds" => "lb".to_string(),
        "c" => "celsius".to_string(),
        "f" => "fahrenheit".to_string(),
        "k" => "kelvin".to_string(),
        _ => unit,
    }
}

/// Convert `value` between two units, or `None` if the pair is unsupported
pub fn convert(value: f64, from: &str, to: &str) -> Option<(f64, UnitType)> {
    let from = normalize(from);
    let to = normalize(to);

    if let Some(celsius) = to_celsius(&from, value) {
        return from_celsius(&to, celsius).map(|v| (v, UnitType::Temperature));
    }

    FACTORS
        .iter()
        .find(|(f, t, _, _)| *f == from && *t == to)
        .map(|&(_, _, kind, factor)| (value * factor, kind))
}

/// All supported conversions as `from_to_to` keys
pub fn supported() -> Vec<String> {
    let temperatures = ["celsius", "fahrenheit", "kelvin"];
    FACTORS
        .iter()
        .map(|(f, t, _, _)| format!("{f}_to_{t}"))
        .chain(temperatures.iter().flat_map(|f| {
            temperatures
                .iter()
                .filter(move |t| *t != f)
                .map(move |t| format!("{f}_to_{t}"))
        }))
        .collect()
}
