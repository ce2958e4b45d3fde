//! # Snapshot Store
//!
//! Boundary between the planner and the collaborator that owns recipes and
//! fridges. A JSON document is loaded once, asynchronously, into an immutable
//! [`Snapshot`]; everything after that is synchronous lookups.
//!
//! Document shape:
//!
//! ```json
//! {
//!   "recipes": [{"id": "recipe-1", "recipe_name": "Spaghetti Bolognese",
//!                "ingredients": {"onion": {"whole": 1}}}],
//!   "fridges": [{"id": "fridge-1", "name": "Home",
//!                "ingredients": {"onion": {"whole": 2}}}]
//! }
//! ```

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::PlannerError;
use crate::identity::AliasTable;
use crate::model::{Fridge, Recipe};
use crate::units::UnitCatalog;

/// Recipes and fridges as loaded from the collaborator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub fridges: Vec<Fridge>,
}

/// A recipe chosen for planning and how many times it is made
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSelection {
    pub recipe_id: String,
    pub count: u32,
}

impl RecipeSelection {
    pub fn new(recipe_id: &str, count: u32) -> Self {
        Self {
            recipe_id: recipe_id.to_string(),
            count,
        }
    }
}

impl FromStr for RecipeSelection {
    type Err = PlannerError;

    /// Parse `"<recipe_id>"` or `"<recipe_id>*<count>"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, count) = match s.rsplit_once('*') {
            Some((id, count)) => {
                let count = count.trim().parse::<u32>().map_err(|_| {
                    PlannerError::Parse(format!("invalid count in recipe selection '{s}'"))
                })?;
                (id.trim(), count)
            }
            None => (s.trim(), 1),
        };
        if id.is_empty() {
            return Err(PlannerError::Parse(format!(
                "empty recipe id in selection '{s}'"
            )));
        }
        Ok(Self::new(id, count))
    }
}

/// Read-only access to one loaded snapshot
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonStore {
    snapshot: Snapshot,
}

impl JsonStore {
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Parse a snapshot document held in memory
    pub fn from_json_str(json: &str) -> Result<Self, PlannerError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Load a snapshot document from disk
    pub async fn open(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "Loading recipe and fridge snapshot");
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let store = Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
        info!(
            recipes = store.snapshot.recipes.len(),
            fridges = store.snapshot.fridges.len(),
            "Snapshot loaded"
        );
        Ok(store)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.snapshot.recipes
    }

    pub fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.snapshot.recipes.iter().find(|recipe| recipe.id == id)
    }

    /// Selected recipes, each with its multiplier already multiplied by the
    /// selection count
    pub fn load_recipes(&self, selections: &[RecipeSelection]) -> Result<Vec<Recipe>, PlannerError> {
        selections
            .iter()
            .map(|selection| -> Result<Recipe, PlannerError> {
                let recipe = self
                    .recipe(&selection.recipe_id)
                    .ok_or_else(|| PlannerError::UnknownRecipe(selection.recipe_id.clone()))?;
                debug!(recipe_id = %recipe.id, count = selection.count, "Selected recipe");
                Ok(recipe.scaled_by(selection.count))
            })
            .collect()
    }

    /// The fridge with `id`, or the first fridge when `id` is `None`.
    ///
    /// A snapshot without any fridge yields an empty one, so every demand
    /// comes out as missing.
    pub fn load_fridge(&self, id: Option<&str>) -> Result<Fridge, PlannerError> {
        match id {
            Some(id) => self
                .snapshot
                .fridges
                .iter()
                .find(|fridge| fridge.id == id)
                .cloned()
                .ok_or_else(|| PlannerError::UnknownFridge(id.to_string())),
            None => match self.snapshot.fridges.first() {
                Some(fridge) => Ok(fridge.clone()),
                None => {
                    warn!("Snapshot has no fridge, comparing against an empty one");
                    Ok(Fridge::default())
                }
            },
        }
    }
}

/// Unit catalog from a JSON file, or the builtin catalog when no path is set
pub async fn load_unit_catalog(path: Option<&Path>) -> Result<UnitCatalog> {
    let Some(path) = path else {
        return Ok(UnitCatalog::builtin());
    };
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read unit catalog {}", path.display()))?;
    let catalog = UnitCatalog::from_json_str(&content)
        .with_context(|| format!("Invalid unit catalog {}", path.display()))?;
    info!(path = %path.display(), units = catalog.len(), "Loaded unit catalog");
    Ok(catalog)
}

/// Builtin alias table, extended with the pairs of a JSON file when set
pub async fn load_alias_table(path: Option<&Path>) -> Result<AliasTable> {
    let mut aliases = AliasTable::builtin();
    let Some(path) = path else {
        return Ok(aliases);
    };
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read alias table {}", path.display()))?;
    aliases
        .extend_from_json_str(&content)
        .with_context(|| format!("Invalid alias table {}", path.display()))?;
    info!(path = %path.display(), aliases = aliases.len(), "Loaded alias table");
    Ok(aliases)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "recipes": [
            {"id": "recipe-1", "recipe_name": "Spaghetti Bolognese",
             "ingredients": {"onion": {"whole": 1}, "garlic_clove": {"cloves": 3}}},
            {"id": "recipe-2", "name": "Omelette", "multiplier": 2,
             "ingredients": {"egg": {"whole": 3}}}
        ],
        "fridges": [
            {"id": "fridge-1", "name": "Home", "ingredients": {"onion": {"whole": 2}}},
            {"id": "fridge-2", "fridge_name": "Office", "ingredients": {}}
        ]
    }"#;

    #[test]
    fn test_selection_parsing() {
        assert_eq!("recipe-1".parse::<RecipeSelection>().unwrap(), RecipeSelection::new("recipe-1", 1));
        assert_eq!(" recipe-2*3 ".parse::<RecipeSelection>().unwrap(), RecipeSelection::new("recipe-2", 3));
        assert_eq!("recipe-2*0".parse::<RecipeSelection>().unwrap().count, 0);
        assert!("recipe-2*x".parse::<RecipeSelection>().is_err());
        assert!("*2".parse::<RecipeSelection>().is_err());
    }

    #[test]
    fn test_load_recipes_applies_count() {
        let store = JsonStore::from_json_str(SNAPSHOT).unwrap();
        let recipes = store
            .load_recipes(&[RecipeSelection::new("recipe-1", 1), RecipeSelection::new("recipe-2", 3)])
            .unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].multiplier, 1);
        assert_eq!(recipes[1].multiplier, 6);
    }

    #[test]
    fn test_load_recipes_unknown_id() {
        let store = JsonStore::from_json_str(SNAPSHOT).unwrap();
        let result = store.load_recipes(&[RecipeSelection::new("recipe-9", 1)]);
        assert_eq!(result, Err(PlannerError::UnknownRecipe("recipe-9".to_string())));
    }

    #[test]
    fn test_load_fridge() {
        let store = JsonStore::from_json_str(SNAPSHOT).unwrap();
        assert_eq!(store.load_fridge(None).unwrap().id, "fridge-1");
        assert_eq!(store.load_fridge(Some("fridge-2")).unwrap().name, "Office");
        assert!(matches!(
            store.load_fridge(Some("fridge-3")),
            Err(PlannerError::UnknownFridge(_))
        ));

        let empty = JsonStore::from_json_str(r#"{"recipes": []}"#).unwrap();
        assert!(empty.load_fridge(None).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_snapshot_rejected() {
        let result = JsonStore::from_json_str(
            r#"{"recipes": [{"id": "r", "name": "Bad", "ingredients": {"flour": {"g": -1}}}]}"#,
        );
        assert!(matches!(result, Err(PlannerError::Parse(_))));
    }
}
