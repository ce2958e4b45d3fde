//! # Recipe, Fridge and Quantity Data Model
//!
//! Data structures supplied by the recipe and fridge collaborators. Every
//! ingredient entry carries exactly one unit, and amounts are either numeric
//! or a descriptive sentinel such as "to taste".
//!
//! ## Wire format
//!
//! Quantities keep the collaborator's JSON shape, an object with a single
//! `unit: amount` pair:
//!
//! ```rust
//! use grocery_planner::model::{Quantity, Recipe};
//!
//! let recipe: Recipe = serde_json::from_str(r#"{
//!     "id": "recipe-1",
//!     "recipe_name": "Spaghetti Bolognese",
//!     "ingredients": {
//!         "ground_beef": {"g": 500},
//!         "Garlic Clove": {"cloves": 3},
//!         "salt": {"": "to taste"}
//!     }
//! }"#).unwrap();
//!
//! assert_eq!(recipe.multiplier, 1);
//! assert_eq!(recipe.ingredients.len(), 3);
//! assert!(recipe.ingredient("garlic_clove").is_some());
//! assert_eq!(recipe.ingredient("salt"), Some(&Quantity::descriptive("to taste", "")));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::PlannerError;
use crate::identity::{normalize, IngredientId};
use crate::units::{canonical_unit, UnitCatalog};

/// Ingredient identifier → quantity, ordered by identifier
pub type IngredientMap = BTreeMap<IngredientId, Quantity>;

/// Amount of one ingredient in one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawQuantity", into = "RawQuantity")]
pub enum Quantity {
    /// A measurable, non-negative amount (e.g. "2 tbsp")
    Numeric { amount: f64, unit: String },
    /// A non-numeric sentinel (e.g. "to taste"); satisfied by presence alone
    Descriptive { text: String, unit: String },
}

/// Amount as it appears on the wire: a number or a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountValue {
    Number(f64),
    Text(String),
}

/// `{unit: amount}` object as exchanged with collaborators
#[doc(hidden)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawQuantity(BTreeMap<String, AmountValue>);

impl Quantity {
    /// Numeric quantity; the unit is trimmed and lowercased
    pub fn numeric(amount: f64, unit: &str) -> Self {
        Quantity::Numeric {
            amount,
            unit: canonical_unit(unit),
        }
    }

    /// Descriptive quantity such as "to taste"
    pub fn descriptive(text: &str, unit: &str) -> Self {
        Quantity::Descriptive {
            text: text.trim().to_string(),
            unit: canonical_unit(unit),
        }
    }

    /// Quantity carrying no information at all (an empty unit map)
    pub fn unspecified() -> Self {
        Quantity::Descriptive {
            text: String::new(),
            unit: String::new(),
        }
    }

    /// Build and validate a quantity from a unit and a wire amount.
    ///
    /// Numeric strings are read as numbers. Negative or non-finite amounts and
    /// empty descriptive text are rejected.
    pub fn from_parts(unit: &str, value: &AmountValue) -> Result<Self, PlannerError> {
        let unit = canonical_unit(unit);
        let amount = match value {
            AmountValue::Number(n) => *n,
            AmountValue::Text(text) => {
                let text = text.trim();
                match text.parse::<f64>() {
                    Ok(n) => n,
                    Err(_) if text.is_empty() => {
                        return Err(PlannerError::InvalidQuantity(format!(
                            "empty amount for unit '{unit}'"
                        )))
                    }
                    Err(_) => {
                        return Ok(Quantity::Descriptive {
                            text: text.to_string(),
                            unit,
                        })
                    }
                }
            }
        };
        if !amount.is_finite() || amount < 0.0 {
            return Err(PlannerError::InvalidQuantity(format!(
                "amount {amount} {unit} must be a non-negative number"
            )));
        }
        Ok(Quantity::Numeric { amount, unit })
    }

    pub fn unit(&self) -> &str {
        match self {
            Quantity::Numeric { unit, .. } | Quantity::Descriptive { unit, .. } => unit,
        }
    }

    /// Numeric amount, or `None` for descriptive quantities
    pub fn amount(&self) -> Option<f64> {
        match self {
            Quantity::Numeric { amount, .. } => Some(*amount),
            Quantity::Descriptive { .. } => None,
        }
    }

    pub fn is_descriptive(&self) -> bool {
        matches!(self, Quantity::Descriptive { .. })
    }

    /// Multiply a numeric amount; descriptive quantities are returned unchanged
    pub fn scaled(&self, factor: f64) -> Quantity {
        match self {
            Quantity::Numeric { amount, unit } => Quantity::Numeric {
                amount: amount * factor,
                unit: unit.clone(),
            },
            Quantity::Descriptive { .. } => self.clone(),
        }
    }

    /// Sum two quantities of the same ingredient.
    ///
    /// The result keeps `self`'s unit; `other` is converted into it when the
    /// units differ. A descriptive side makes the result descriptive (the
    /// first descriptive text is kept). Returns `None` when both are numeric
    /// and their units cannot be converted.
    pub fn combine(&self, other: &Quantity, catalog: &UnitCatalog) -> Option<Quantity> {
        match (self, other) {
            (Quantity::Descriptive { .. }, _) => Some(self.clone()),
            (_, Quantity::Descriptive { .. }) => Some(other.clone()),
            (
                Quantity::Numeric { amount, unit },
                Quantity::Numeric {
                    amount: other_amount,
                    unit: other_unit,
                },
            ) => catalog
                .convert(*other_amount, other_unit, unit)
                .map(|converted| Quantity::Numeric {
                    amount: amount + converted,
                    unit: unit.clone(),
                }),
        }
    }
}

impl TryFrom<RawQuantity> for Quantity {
    type Error = PlannerError;

    fn try_from(raw: RawQuantity) -> Result<Self, Self::Error> {
        let mut pairs = raw.0.into_iter();
        match (pairs.next(), pairs.next()) {
            (None, _) => Ok(Quantity::unspecified()),
            (Some((unit, value)), None) => Quantity::from_parts(&unit, &value),
            (Some((first, _)), Some((second, _))) => Err(PlannerError::InvalidQuantity(format!(
                "expected a single unit, found '{first}' and '{second}'"
            ))),
        }
    }
}

impl From<Quantity> for RawQuantity {
    fn from(quantity: Quantity) -> Self {
        let mut map = BTreeMap::new();
        match quantity {
            Quantity::Numeric { amount, unit } => {
                map.insert(unit, AmountValue::Number(amount));
            }
            Quantity::Descriptive { text, unit } => {
                if !text.is_empty() {
                    map.insert(unit, AmountValue::Text(text));
                }
            }
        }
        RawQuantity(map)
    }
}

/// Format an amount for display: whole numbers without decimals, everything
/// else rounded to two decimals with trailing zeros removed. Positive amounts
/// too small to show are printed as `<0.01`, never as `0`.
pub fn format_amount(amount: f64) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    if rounded == 0.0 && amount > 0.0 {
        return "<0.01".to_string();
    }
    if rounded.fract() == 0.0 {
        // `+ 0.0` turns a negative zero into a positive one
        format!("{}", rounded + 0.0)
    } else {
        let text = format!("{rounded:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Numeric { amount, unit } => {
                write!(f, "{}", format_amount(*amount))?;
                if !unit.is_empty() {
                    write!(f, " {unit}")?;
                }
                Ok(())
            }
            Quantity::Descriptive { text, unit } => {
                if !text.is_empty() {
                    write!(f, "{text}")
                } else if !unit.is_empty() {
                    write!(f, "some {unit}")
                } else {
                    write!(f, "some")
                }
            }
        }
    }
}

/// Merge `quantity` into `map` under `id`, summing with any existing entry
pub fn merge_ingredient(
    map: &mut IngredientMap,
    id: IngredientId,
    quantity: Quantity,
    catalog: &UnitCatalog,
) -> Result<(), PlannerError> {
    match map.get(&id) {
        None => {
            map.insert(id, quantity);
        }
        Some(existing) => {
            let merged = existing.combine(&quantity, catalog).ok_or_else(|| {
                PlannerError::InvalidQuantity(format!(
                    "'{id}' listed twice with incompatible units '{}' and '{}'",
                    existing.unit(),
                    quantity.unit()
                ))
            })?;
            debug!(ingredient = %id, merged = %merged, "Merged duplicate ingredient entry");
            map.insert(id, merged);
        }
    }
    Ok(())
}

/// One `{name, quantity, unit}` row as produced by entry forms and extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientEntry {
    pub name: String,
    pub quantity: AmountValue,
    pub unit: String,
}

impl IngredientEntry {
    pub fn new(name: &str, quantity: f64, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            quantity: AmountValue::Number(quantity),
            unit: unit.to_string(),
        }
    }
}

/// Turn entry rows into an ingredient map.
///
/// Names are normalized, units trimmed and lowercased. Numeric rows need a
/// unit. Rows whose names collide after normalization are summed.
pub fn ingredients_from_entries(
    entries: &[IngredientEntry],
    catalog: &UnitCatalog,
) -> Result<IngredientMap, PlannerError> {
    let mut map = IngredientMap::new();
    for entry in entries {
        let id = IngredientId::parse(&entry.name)?;
        let quantity = Quantity::from_parts(&entry.unit, &entry.quantity)?;
        if !quantity.is_descriptive() && quantity.unit().is_empty() {
            return Err(PlannerError::InvalidQuantity(format!(
                "unit cannot be empty for '{id}'"
            )));
        }
        merge_ingredient(&mut map, id, quantity, catalog)?;
    }
    Ok(map)
}

fn deserialize_ingredient_map<'de, D>(deserializer: D) -> Result<IngredientMap, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw: BTreeMap<String, Quantity> = BTreeMap::deserialize(deserializer)?;
    let catalog = UnitCatalog::builtin();
    let mut map = IngredientMap::new();
    for (name, quantity) in raw {
        let id = IngredientId::parse(&name).map_err(D::Error::custom)?;
        merge_ingredient(&mut map, id, quantity, &catalog).map_err(D::Error::custom)?;
    }
    Ok(map)
}

fn default_multiplier() -> u32 {
    1
}

/// A recipe as supplied by the recipe-management collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    #[serde(alias = "recipe_name")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_ingredient_map")]
    pub ingredients: IngredientMap,
    /// Servings/batches planned; every amount scales linearly with it
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,
}

impl Recipe {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ingredients: IngredientMap::new(),
            multiplier: 1,
        }
    }

    /// Add an ingredient, summing with an entry whose name normalizes the same
    pub fn with_ingredient(mut self, name: &str, quantity: Quantity) -> Result<Self, PlannerError> {
        let id = IngredientId::parse(name)?;
        merge_ingredient(&mut self.ingredients, id, quantity, &UnitCatalog::builtin())?;
        Ok(self)
    }

    pub fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Copy of this recipe planned `count` more times over
    pub fn scaled_by(&self, count: u32) -> Recipe {
        Recipe {
            multiplier: self.multiplier.saturating_mul(count),
            ..self.clone()
        }
    }

    /// Look an ingredient up by any surface form of its name
    pub fn ingredient(&self, name: &str) -> Option<&Quantity> {
        self.ingredients.get(&normalize(name))
    }

    /// One `name: amount` line per ingredient, as shown on a recipe card
    pub fn ingredient_summary(&self) -> String {
        self.ingredients
            .iter()
            .map(|(id, quantity)| format!("{}: {}", id.display_name(), quantity))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// On-hand supply of one fridge, as supplied by the fridge collaborator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Fridge {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "fridge_name")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_ingredient_map")]
    pub ingredients: IngredientMap,
}

impl Fridge {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ingredients: IngredientMap::new(),
        }
    }

    /// Add an ingredient, summing with an entry whose name normalizes the same
    pub fn with_ingredient(mut self, name: &str, quantity: Quantity) -> Result<Self, PlannerError> {
        let id = IngredientId::parse(name)?;
        merge_ingredient(&mut self.ingredients, id, quantity, &UnitCatalog::builtin())?;
        Ok(self)
    }

    pub fn get(&self, id: &IngredientId) -> Option<&Quantity> {
        self.ingredients.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }
}
