//! # Unit Catalog
//!
//! Static mapping from unit names to a conversion factor into the base unit of
//! their family (milliliters for volume, grams for mass, pieces for counts).
//!
//! Unit mismatches are routine input, so every lookup here answers with an
//! `Option` instead of an error: `None` means "not found" for
//! [`UnitCatalog::base_factor`] and "not comparable" for [`UnitCatalog::convert`].
//!
//! ## Usage
//!
//! ```rust
//! use grocery_planner::units::UnitCatalog;
//!
//! let catalog = UnitCatalog::builtin();
//! assert_eq!(catalog.convert(2.0, "tbsp", "ml"), Some(30.0));
//! assert_eq!(catalog.convert(1.0, "cup", "g"), None);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// Unit families; conversion is only defined inside a family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitFamily {
    /// Base unit: milliliters
    Volume,
    /// Base unit: grams
    Mass,
    /// Base unit: single pieces
    Count,
}

impl fmt::Display for UnitFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitFamily::Volume => write!(f, "volume"),
            UnitFamily::Mass => write!(f, "mass"),
            UnitFamily::Count => write!(f, "count"),
        }
    }
}

/// One catalog entry: its family and how many base units one of it is worth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub family: UnitFamily,
    pub factor: f64,
}

// Container units (bottle, can, package, shaker, ...) are left out on purpose:
// their size depends on the product, so they never convert.
lazy_static! {
    static ref WHITESPACE_RUN: Regex =
        Regex::new(r"\s+").expect("Whitespace pattern should be valid");
    static ref BUILTIN_UNITS: Vec<(&'static str, UnitFamily, f64)> = {
        use UnitFamily::*;
        vec![
            // Volume units
            ("ml", Volume, 1.0),
            ("milliliter", Volume, 1.0),
            ("milliliters", Volume, 1.0),
            ("millilitre", Volume, 1.0),
            ("millilitres", Volume, 1.0),
            ("cl", Volume, 10.0),
            ("dl", Volume, 100.0),
            ("l", Volume, 1000.0),
            ("liter", Volume, 1000.0),
            ("liters", Volume, 1000.0),
            ("litre", Volume, 1000.0),
            ("litres", Volume, 1000.0),
            ("tsp", Volume, 5.0),
            ("teaspoon", Volume, 5.0),
            ("teaspoons", Volume, 5.0),
            ("spoon", Volume, 5.0),
            ("tbsp", Volume, 15.0),
            ("tablespoon", Volume, 15.0),
            ("tablespoons", Volume, 15.0),
            ("cup", Volume, 240.0),
            ("cups", Volume, 240.0),
            ("fl oz", Volume, 29.5735),
            ("fluid ounce", Volume, 29.5735),
            ("fluid ounces", Volume, 29.5735),
            ("pint", Volume, 473.176),
            ("pints", Volume, 473.176),
            ("pt", Volume, 473.176),
            ("quart", Volume, 946.353),
            ("quarts", Volume, 946.353),
            ("qt", Volume, 946.353),
            ("gallon", Volume, 3785.41),
            ("gallons", Volume, 3785.41),
            ("gal", Volume, 3785.41),
            // French volume units
            ("cuillère à café", Volume, 5.0),
            ("cuillères à café", Volume, 5.0),
            ("cac", Volume, 5.0),
            ("cuillère à soupe", Volume, 15.0),
            ("cuillères à soupe", Volume, 15.0),
            ("cas", Volume, 15.0),
            ("tasse", Volume, 240.0),
            ("tasses", Volume, 240.0),
            // Mass units
            ("mg", Mass, 0.001),
            ("g", Mass, 1.0),
            ("gram", Mass, 1.0),
            ("grams", Mass, 1.0),
            ("gramme", Mass, 1.0),
            ("grammes", Mass, 1.0),
            ("kg", Mass, 1000.0),
            ("kilogram", Mass, 1000.0),
            ("kilograms", Mass, 1000.0),
            ("kilogramme", Mass, 1000.0),
            ("kilogrammes", Mass, 1000.0),
            ("oz", Mass, 28.3495),
            ("ounce", Mass, 28.3495),
            ("ounces", Mass, 28.3495),
            ("lb", Mass, 453.592),
            ("lbs", Mass, 453.592),
            ("pound", Mass, 453.592),
            ("pounds", Mass, 453.592),
            // Count units
            ("piece", Count, 1.0),
            ("pieces", Count, 1.0),
            ("pièce", Count, 1.0),
            ("pièces", Count, 1.0),
            ("item", Count, 1.0),
            ("items", Count, 1.0),
            ("whole", Count, 1.0),
            ("dozen", Count, 12.0),
            ("doz", Count, 12.0),
        ]
    };
}

/// Trim, lowercase and collapse inner whitespace the way catalog keys are stored
pub fn canonical_unit(raw: &str) -> String {
    WHITESPACE_RUN
        .replace_all(raw.trim(), " ")
        .to_lowercase()
}

/// Case-insensitive unit equality
pub fn same_unit(a: &str, b: &str) -> bool {
    canonical_unit(a) == canonical_unit(b)
}

/// Unit name → (family, factor) lookup table
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCatalog {
    units: HashMap<String, UnitDefinition>,
}

impl UnitCatalog {
    /// The builtin catalog of common English and French cooking units
    pub fn builtin() -> Self {
        let units = BUILTIN_UNITS
            .iter()
            .map(|(name, family, factor)| {
                (
                    name.to_string(),
                    UnitDefinition {
                        family: *family,
                        factor: *factor,
                    },
                )
            })
            .collect();
        Self { units }
    }

    /// Catalog with no units at all; every conversion is "not comparable"
    pub fn empty() -> Self {
        Self {
            units: HashMap::new(),
        }
    }

    /// Build a catalog from user-supplied definitions, rejecting empty names
    /// and factors that are not strictly positive and finite
    pub fn from_definitions<I, S>(definitions: I) -> Result<Self, PlannerError>
    where
        I: IntoIterator<Item = (S, UnitDefinition)>,
        S: AsRef<str>,
    {
        let mut catalog = Self::empty();
        for (name, definition) in definitions {
            catalog.insert(name.as_ref(), definition)?;
        }
        Ok(catalog)
    }

    /// Parse a JSON object of `{"unit": {"family": "volume", "factor": 15.0}}`
    pub fn from_json_str(json: &str) -> Result<Self, PlannerError> {
        let definitions: BTreeMap<String, UnitDefinition> = serde_json::from_str(json)?;
        Self::from_definitions(definitions)
    }

    /// Add or replace a unit definition
    pub fn insert(&mut self, name: &str, definition: UnitDefinition) -> Result<(), PlannerError> {
        let key = canonical_unit(name);
        if key.is_empty() {
            return Err(PlannerError::InvalidUnit("unit name is empty".to_string()));
        }
        if !definition.factor.is_finite() || definition.factor <= 0.0 {
            return Err(PlannerError::InvalidUnit(format!(
                "factor {} for '{key}' must be strictly positive",
                definition.factor
            )));
        }
        self.units.insert(key, definition);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Full definition for a unit, if the catalog knows it
    pub fn definition(&self, unit: &str) -> Option<&UnitDefinition> {
        self.units.get(&canonical_unit(unit))
    }

    /// Factor converting one `unit` into its family's base unit
    pub fn base_factor(&self, unit: &str) -> Option<f64> {
        self.definition(unit).map(|d| d.factor)
    }

    pub fn family(&self, unit: &str) -> Option<UnitFamily> {
        self.definition(unit).map(|d| d.family)
    }

    /// Convert `amount` from one unit to another.
    ///
    /// Returns `None` when either unit is unknown or the two belong to
    /// different families. Identical units convert trivially even when the
    /// catalog does not list them.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Option<f64> {
        if same_unit(from, to) {
            return Some(amount);
        }
        let from_def = self.definition(from)?;
        let to_def = self.definition(to)?;
        if from_def.family != to_def.family {
            return None;
        }
        Some(amount * from_def.factor / to_def.factor)
    }

    /// Whether two units can be compared through this catalog
    pub fn comparable(&self, a: &str, b: &str) -> bool {
        self.convert(1.0, a, b).is_some()
    }
}

impl Default for UnitCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
