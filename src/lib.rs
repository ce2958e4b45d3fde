//! # Grocery Planner
//!
//! Ingredient reconciliation for meal planning: aggregate what the selected
//! recipes need, compare it with what one fridge holds, and produce a
//! shopping list split into "not in fridge" and "already in fridge".
//!
//! The pipeline (`aggregate` → `reconcile` → `shopping`) is pure and
//! synchronous; only `store` touches the filesystem.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod identity;
pub mod model;
pub mod planner;
pub mod reconcile;
pub mod shopping;
pub mod store;
pub mod units;

pub use aggregate::{aggregate_demand, compute_aggregated_demand, AggregatedDemand, Demand};
pub use error::PlannerError;
pub use identity::{normalize, AliasTable, IngredientId};
pub use model::{Fridge, Quantity, Recipe};
pub use planner::{MealPlan, Planner};
pub use reconcile::{reconcile, Classification, Classifications, Status};
pub use shopping::{build_shopping_list, ShoppingList, ShoppingListEntry};
pub use units::UnitCatalog;
