//! # Identity Normalizer
//!
//! Turns free-text ingredient names into canonical [`IngredientId`]s and
//! resolves registered aliases ("egg yolk" → "egg") for fridge matching.
//!
//! Matching between demand and supply is a two-step lookup: exact identifier
//! first, then the alias of the demand identifier. There is no substring or
//! fuzzy matching, so "onion" never matches "green onion".

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::PlannerError;

/// Separator joining the words of an identifier
pub const SEPARATOR: char = '_';

lazy_static! {
    static ref SEPARATOR_RUN: Regex =
        Regex::new(r"[\s_]+").expect("Separator pattern should be valid");
    static ref BUILTIN_ALIASES: Vec<(&'static str, &'static str)> = vec![
        ("egg_yolk", "egg"),
        ("egg_white", "egg"),
        ("garlic_clove", "garlic"),
        ("lemon_juice", "lemon"),
        ("lemon_zest", "lemon"),
        ("lime_juice", "lime"),
        ("lime_zest", "lime"),
        ("spring_onion", "green_onion"),
        ("scallion", "green_onion"),
    ];
}

/// Canonical ingredient key: lowercase words joined by `_`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IngredientId(String);

impl IngredientId {
    /// Normalize `raw` and reject names that normalize to nothing
    pub fn parse(raw: &str) -> Result<Self, PlannerError> {
        let id = normalize(raw);
        if id.is_empty() {
            return Err(PlannerError::InvalidIngredientName(raw.to_string()));
        }
        Ok(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Human-readable form with separators replaced by spaces
    pub fn display_name(&self) -> String {
        self.0.replace(SEPARATOR, " ")
    }
}

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for IngredientId {
    type Error = PlannerError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        IngredientId::parse(&raw)
    }
}

impl From<IngredientId> for String {
    fn from(id: IngredientId) -> Self {
        id.0
    }
}

impl AsRef<str> for IngredientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalize a free-text ingredient name.
///
/// Trims, lowercases and collapses every run of whitespace and/or separators
/// into a single `_`. Idempotent: `normalize(normalize(x)) == normalize(x)`.
///
/// # Examples
///
/// ```rust
/// use grocery_planner::identity::normalize;
///
/// assert_eq!(normalize("  Garlic   Clove "), normalize("garlic_clove"));
/// assert_eq!(normalize("Olive Oil").as_str(), "olive_oil");
/// ```
pub fn normalize(raw: &str) -> IngredientId {
    let lowered = raw.trim().to_lowercase();
    let joined = SEPARATOR_RUN.replace_all(&lowered, "_");
    IngredientId(joined.trim_matches(SEPARATOR).to_string())
}

/// Fixed table of identifier → parent identifier equivalences
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AliasTable {
    aliases: HashMap<IngredientId, IngredientId>,
}

impl AliasTable {
    /// Table with no aliases; every lookup falls through unchanged
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builtin derived-ingredient aliases (egg yolk → egg, lemon juice → lemon, ...)
    pub fn builtin() -> Self {
        let aliases = BUILTIN_ALIASES
            .iter()
            .map(|(from, to)| (normalize(from), normalize(to)))
            .collect();
        Self { aliases }
    }

    /// Parse a JSON object of `{"derived name": "parent name"}` pairs
    pub fn from_json_str(json: &str) -> Result<Self, PlannerError> {
        let mut table = Self::empty();
        table.extend_from_json_str(json)?;
        Ok(table)
    }

    /// Add the pairs of a JSON object to this table, overriding existing keys
    pub fn extend_from_json_str(&mut self, json: &str) -> Result<(), PlannerError> {
        let pairs: BTreeMap<String, String> = serde_json::from_str(json)?;
        for (from, to) in pairs {
            self.insert(&from, &to)?;
        }
        Ok(())
    }

    /// Register `from` as an alias of `to`; both names are normalized
    pub fn insert(&mut self, from: &str, to: &str) -> Result<(), PlannerError> {
        let from_id = IngredientId::parse(from)
            .map_err(|_| PlannerError::InvalidAlias(format!("empty alias name '{from}'")))?;
        let to_id = IngredientId::parse(to)
            .map_err(|_| PlannerError::InvalidAlias(format!("empty alias target for '{from}'")))?;
        if from_id == to_id {
            return Err(PlannerError::InvalidAlias(format!(
                "'{from_id}' cannot alias itself"
            )));
        }
        self.aliases.insert(from_id, to_id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Registered parent of `id`, if any. Single hop: aliases are not chained.
    pub fn lookup(&self, id: &IngredientId) -> Option<&IngredientId> {
        self.aliases.get(id)
    }

    /// Parent of `id`, or `id` itself when no alias is registered
    pub fn resolve(&self, id: &IngredientId) -> IngredientId {
        match self.lookup(id) {
            Some(parent) => {
                trace!(ingredient = %id, alias = %parent, "Resolved ingredient alias");
                parent.clone()
            }
            None => id.clone(),
        }
    }
}
