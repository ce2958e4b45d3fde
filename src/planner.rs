//! # Meal Planner
//!
//! Runs the whole pipeline on one immutable snapshot: aggregate the selected
//! recipes, reconcile the demand against a fridge and build the shopping
//! list. Every call recomputes from scratch, so concurrent plans over
//! different snapshots never observe each other.
//!
//! ```rust
//! use grocery_planner::model::{Fridge, Quantity, Recipe};
//! use grocery_planner::planner::Planner;
//!
//! let recipe = Recipe::new("recipe-1", "Spaghetti Bolognese")
//!     .with_ingredient("onion", Quantity::numeric(1.0, "whole"))?;
//! let fridge = Fridge::new("fridge-1", "Home")
//!     .with_ingredient("onion", Quantity::numeric(2.0, "whole"))?;
//!
//! let plan = Planner::default().plan_recipes(&[recipe], &fridge);
//! assert_eq!(plan.shopping_list.in_fridge[0].amount_str, "1 whole");
//! # Ok::<(), grocery_planner::error::PlannerError>(())
//! ```

use serde::Serialize;
use tracing::info;

use crate::aggregate::{aggregate_demand, compute_aggregated_demand, AggregatedDemand};
use crate::identity::AliasTable;
use crate::model::{Fridge, Recipe};
use crate::reconcile::{reconcile, Classifications, Status};
use crate::shopping::{build_shopping_list, ShoppingList};
use crate::units::UnitCatalog;

/// Number of ingredients per classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PlanSummary {
    pub total: usize,
    pub satisfied: usize,
    pub partially_missing: usize,
    pub missing: usize,
    pub unresolvable: usize,
}

impl PlanSummary {
    pub fn from_classifications(classifications: &Classifications) -> Self {
        let mut summary = PlanSummary {
            total: classifications.len(),
            ..Default::default()
        };
        for classification in classifications.values() {
            match classification.status() {
                Status::Satisfied => summary.satisfied += 1,
                Status::PartiallyMissing => summary.partially_missing += 1,
                Status::Missing => summary.missing += 1,
                Status::Unresolvable => summary.unresolvable += 1,
            }
        }
        summary
    }

    /// Ingredients that need at least some shopping
    pub fn to_buy(&self) -> usize {
        self.partially_missing + self.missing + self.unresolvable
    }
}

/// Everything derived from one planning pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealPlan {
    pub fridge_id: String,
    pub demand: AggregatedDemand,
    pub classifications: Classifications,
    pub shopping_list: ShoppingList,
    pub summary: PlanSummary,
}

/// Reference data shared by every planning pass
#[derive(Debug, Clone, PartialEq)]
pub struct Planner {
    catalog: UnitCatalog,
    aliases: AliasTable,
}

impl Planner {
    pub fn new(catalog: UnitCatalog, aliases: AliasTable) -> Self {
        Self { catalog, aliases }
    }

    /// Plan `(recipe, count)` selections against `fridge`
    pub fn plan(&self, selections: &[(&Recipe, u32)], fridge: &Fridge) -> MealPlan {
        let demand = aggregate_demand(selections, &self.catalog);
        self.plan_demand(demand, fridge)
    }

    /// Plan recipes that are each selected once (multipliers still apply)
    pub fn plan_recipes(&self, recipes: &[Recipe], fridge: &Fridge) -> MealPlan {
        let demand = compute_aggregated_demand(recipes, &self.catalog);
        self.plan_demand(demand, fridge)
    }

    fn plan_demand(&self, demand: AggregatedDemand, fridge: &Fridge) -> MealPlan {
        let classifications = reconcile(&demand, fridge, &self.catalog, &self.aliases);
        let shopping_list = build_shopping_list(&classifications);
        let summary = PlanSummary::from_classifications(&classifications);

        info!(
            fridge_id = %fridge.id,
            ingredients = summary.total,
            to_buy = summary.to_buy(),
            unresolvable = summary.unresolvable,
            "Meal plan computed"
        );

        MealPlan {
            fridge_id: fridge.id.clone(),
            demand,
            classifications,
            shopping_list,
            summary,
        }
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(UnitCatalog::builtin(), AliasTable::builtin())
    }
}
