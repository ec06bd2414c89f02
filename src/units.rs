use clap::ValueEnum;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("Invalid unit")]
    InvalidUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum UnitCategory {
    Length,
    Weight,
    Temperature,
    Volume,
}

impl fmt::Display for UnitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Length => "length",
            Self::Weight => "weight",
            Self::Temperature => "temperature",
            Self::Volume => "volume",
        };
        f.write_str(name)
    }
}

/// Linear units convert by a factor to the category's base unit; temperature
/// units are affine.
#[derive(Debug, Clone, Copy)]
enum Scale {
    Factor(f64),
    Affine { to_base: fn(f64) -> f64, from_base: fn(f64) -> f64 },
}

struct Unit {
    name: &'static str,
    scale: Scale,
}

impl Unit {
    const fn linear(name: &'static str, factor: f64) -> Self {
        Self {
            name,
            scale: Scale::Factor(factor),
        }
    }

    const fn affine(
        name: &'static str,
        to_base: fn(f64) -> f64,
        from_base: fn(f64) -> f64,
    ) -> Self {
        Self {
            name,
            scale: Scale::Affine { to_base, from_base },
        }
    }

    fn to_base(&self, value: f64) -> f64 {
        match self.scale {
            Scale::Factor(factor) => value * factor,
            Scale::Affine { to_base, .. } => to_base(value),
        }
    }

    fn from_base(&self, value: f64) -> f64 {
        match self.scale {
            Scale::Factor(factor) => value / factor,
            Scale::Affine { from_base, .. } => from_base(value),
        }
    }
}

const LENGTH: &[Unit] = &[
    Unit::linear("meter", 1.0),
    Unit::linear("kilometer", 1000.0),
    Unit::linear("foot", 0.3048),
    Unit::linear("mile", 1609.344),
];

const WEIGHT: &[Unit] = &[
    Unit::linear("kilogram", 1.0),
    Unit::linear("gram", 0.001),
    Unit::linear("pound", 0.453592),
];

fn identity(v: f64) -> f64 {
    v
}

fn fahrenheit_to_celsius(v: f64) -> f64 {
    (v - 32.0) * (5.0 / 9.0)
}

fn celsius_to_fahrenheit(v: f64) -> f64 {
    v * (9.0 / 5.0) + 32.0
}

fn kelvin_to_celsius(v: f64) -> f64 {
    v - 273.15
}

fn celsius_to_kelvin(v: f64) -> f64 {
    v + 273.15
}

const TEMPERATURE: &[Unit] = &[
    Unit::affine("celsius", identity, identity),
    Unit::affine("fahrenheit", fahrenheit_to_celsius, celsius_to_fahrenheit),
    Unit::affine("kelvin", kelvin_to_celsius, celsius_to_kelvin),
];

const VOLUME: &[Unit] = &[
    Unit::linear("liter", 1.0),
    Unit::linear("milliliter", 0.001),
    Unit::linear("gallon", 3.78541),
];

impl UnitCategory {
    fn table(&self) -> &'static [Unit] {
        match self {
            Self::Length => LENGTH,
            Self::Weight => WEIGHT,
            Self::Temperature => TEMPERATURE,
            Self::Volume => VOLUME,
        }
    }

    pub fn units(&self) -> Vec<&'static str> {
        self.table().iter().map(|unit| unit.name).collect()
    }

    fn find(&self, name: &str) -> Option<&'static Unit> {
        self.table()
            .iter()
            .find(|unit| unit.name.eq_ignore_ascii_case(name.trim()))
    }
}

pub fn convert_unit(
    value: f64,
    from_unit: &str,
    to_unit: &str,
    category: UnitCategory,
) -> Result<f64, ConvertError> {
    let from = category.find(from_unit).ok_or(ConvertError::InvalidUnit)?;
    let to = category.find(to_unit).ok_or(ConvertError::InvalidUnit)?;

    Ok(to.from_base(from.to_base(value)))
}
