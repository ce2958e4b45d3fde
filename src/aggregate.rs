//! # Quantity Aggregator
//!
//! Sums the ingredients of every selected recipe into one demand map. Each
//! recipe is scaled by `count × multiplier`; same-unit amounts add up,
//! convertible units are folded into the lowest-sorting unit name, and
//! inconvertible units are kept apart under [`Demand::MixedUnits`].
//!
//! The result depends only on the multiset of selections, never on their
//! order.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use crate::identity::IngredientId;
use crate::model::{Quantity, Recipe};
use crate::units::UnitCatalog;

/// Ingredient identifier → total demand, ordered by identifier
pub type AggregatedDemand = BTreeMap<IngredientId, Demand>;

/// Total amount of one ingredient needed by the selected recipes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Demand {
    /// All contributions summed into a single quantity
    Single(Quantity),
    /// Numeric contributions whose units could not be converted to each
    /// other, one running total per unit in first-seen order
    MixedUnits(Vec<Quantity>),
}

impl Demand {
    /// Every quantity making up this demand
    pub fn parts(&self) -> &[Quantity] {
        match self {
            Demand::Single(quantity) => std::slice::from_ref(quantity),
            Demand::MixedUnits(parts) => parts,
        }
    }

    /// The single quantity, unless the units are mixed
    pub fn single(&self) -> Option<&Quantity> {
        match self {
            Demand::Single(quantity) => Some(quantity),
            Demand::MixedUnits(_) => None,
        }
    }

    pub fn is_mixed_units(&self) -> bool {
        matches!(self, Demand::MixedUnits(_))
    }

    /// Fold one more contribution into this demand
    pub fn absorb(&mut self, quantity: Quantity, catalog: &UnitCatalog) {
        match self {
            Demand::Single(existing) => match existing.combine(&quantity, catalog) {
                Some(merged) => *existing = merged,
                None => {
                    *self = Demand::MixedUnits(vec![existing.clone(), quantity]);
                }
            },
            Demand::MixedUnits(parts) => {
                if quantity.is_descriptive() {
                    *self = Demand::Single(quantity);
                    return;
                }
                for part in parts.iter_mut() {
                    if let Some(merged) = part.combine(&quantity, catalog) {
                        *part = merged;
                        return;
                    }
                }
                parts.push(quantity);
            }
        }
    }
}

impl fmt::Display for Demand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.parts().iter().map(|q| q.to_string()).collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Canonical fold order for the contributions to one ingredient: descriptive
/// amounts first, then by unit name, then by amount
fn contribution_order(a: &Quantity, b: &Quantity) -> Ordering {
    match (a, b) {
        (
            Quantity::Descriptive { text, unit },
            Quantity::Descriptive {
                text: other_text,
                unit: other_unit,
            },
        ) => unit.cmp(other_unit).then_with(|| text.cmp(other_text)),
        (Quantity::Descriptive { .. }, Quantity::Numeric { .. }) => Ordering::Less,
        (Quantity::Numeric { .. }, Quantity::Descriptive { .. }) => Ordering::Greater,
        (
            Quantity::Numeric { amount, unit },
            Quantity::Numeric {
                amount: other_amount,
                unit: other_unit,
            },
        ) => unit
            .cmp(other_unit)
            .then_with(|| amount.total_cmp(other_amount)),
    }
}

/// Aggregate `(recipe, count)` selections into total demand.
///
/// A selection contributes `count × recipe.multiplier` times its ingredient
/// amounts; a zero scale excludes it. Contributions are folded in a fixed
/// order, so the result does not depend on the order of `selections`:
/// convertible amounts end up in the lowest-sorting unit and mixed-unit parts
/// are listed by unit.
pub fn aggregate_demand(selections: &[(&Recipe, u32)], catalog: &UnitCatalog) -> AggregatedDemand {
    let mut contributions: BTreeMap<IngredientId, Vec<Quantity>> = BTreeMap::new();

    for (recipe, count) in selections {
        let scale = u64::from(*count) * u64::from(recipe.multiplier);
        if scale == 0 {
            trace!(recipe_id = %recipe.id, "Skipping recipe with zero scale");
            continue;
        }
        debug!(
            recipe_id = %recipe.id,
            scale,
            ingredients = recipe.ingredients.len(),
            "Aggregating recipe"
        );

        for (id, quantity) in &recipe.ingredients {
            contributions
                .entry(id.clone())
                .or_default()
                .push(quantity.scaled(scale as f64));
        }
    }

    contributions
        .into_iter()
        .filter_map(|(id, mut parts)| {
            parts.sort_by(contribution_order);
            let mut parts = parts.into_iter();
            let mut demand = Demand::Single(parts.next()?);
            for quantity in parts {
                demand.absorb(quantity, catalog);
            }
            if demand.is_mixed_units() {
                debug!(ingredient = %id, demand = %demand, "Ingredient needed in mixed units");
            }
            Some((id, demand))
        })
        .collect()
}

/// Aggregate recipes that are each selected once; their multipliers still apply
pub fn compute_aggregated_demand(recipes: &[Recipe], catalog: &UnitCatalog) -> AggregatedDemand {
    let selections: Vec<(&Recipe, u32)> = recipes.iter().map(|recipe| (recipe, 1)).collect();
    aggregate_demand(&selections, catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::normalize;

    fn bolognese() -> Recipe {
        Recipe::new("recipe-1", "Spaghetti Bolognese")
            .with_ingredient("ground_beef", Quantity::numeric(500.0, "g"))
            .unwrap()
            .with_ingredient("onion", Quantity::numeric(1.0, "whole"))
            .unwrap()
            .with_ingredient("garlic_clove", Quantity::numeric(3.0, "cloves"))
            .unwrap()
    }

    fn curry() -> Recipe {
        Recipe::new("recipe-2", "Chicken Curry")
            .with_ingredient("onion", Quantity::numeric(2.0, "whole"))
            .unwrap()
            .with_ingredient("ginger", Quantity::numeric(1.0, "inch_piece"))
            .unwrap()
            .with_ingredient("salt", Quantity::descriptive("to taste", ""))
            .unwrap()
    }

    fn single(demand: &AggregatedDemand, name: &str) -> Quantity {
        demand[&normalize(name)].single().unwrap().clone()
    }

    #[test]
    fn test_single_recipe() {
        let catalog = UnitCatalog::builtin();
        let demand = compute_aggregated_demand(&[bolognese()], &catalog);
        assert_eq!(demand.len(), 3);
        assert_eq!(single(&demand, "onion"), Quantity::numeric(1.0, "whole"));
    }

    #[test]
    fn test_same_unit_amounts_add() {
        let catalog = UnitCatalog::builtin();
        let demand = compute_aggregated_demand(&[bolognese(), curry()], &catalog);
        assert_eq!(demand.len(), 5);
        assert_eq!(single(&demand, "onion"), Quantity::numeric(3.0, "whole"));
    }

    #[test]
    fn test_count_and_multiplier_scale() {
        let catalog = UnitCatalog::builtin();
        let recipe = bolognese().with_multiplier(2);
        let demand = aggregate_demand(&[(&recipe, 3)], &catalog);
        assert_eq!(single(&demand, "ground beef"), Quantity::numeric(3000.0, "g"));
    }

    #[test]
    fn test_zero_count_excluded() {
        let catalog = UnitCatalog::builtin();
        let a = bolognese();
        let b = curry();
        let demand = aggregate_demand(&[(&a, 0), (&b, 1)], &catalog);
        assert!(!demand.contains_key(&normalize("ground_beef")));
        assert_eq!(single(&demand, "onion"), Quantity::numeric(2.0, "whole"));

        let zero_multiplier = bolognese().with_multiplier(0);
        assert!(compute_aggregated_demand(&[zero_multiplier], &catalog).is_empty());
    }

    #[test]
    fn test_additivity() {
        let catalog = UnitCatalog::builtin();
        let a = bolognese();
        let b = curry();

        let mut stepwise = aggregate_demand(&[(&a, 1), (&b, 1)], &catalog);
        for (id, demand) in aggregate_demand(&[(&a, 1)], &catalog) {
            let quantity = demand.single().unwrap().clone();
            stepwise.get_mut(&id).unwrap().absorb(quantity, &catalog);
        }
        let direct = aggregate_demand(&[(&a, 2), (&b, 1)], &catalog);

        assert_eq!(stepwise, direct);
    }

    #[test]
    fn test_selection_order_irrelevant_for_same_units() {
        let catalog = UnitCatalog::builtin();
        let a = bolognese();
        let b = curry();
        let forward = aggregate_demand(&[(&a, 1), (&b, 2)], &catalog);
        let backward = aggregate_demand(&[(&b, 2), (&a, 1)], &catalog);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_convertible_units_fold_into_lowest_unit() {
        let catalog = UnitCatalog::builtin();
        let a = Recipe::new("a", "Dressing")
            .with_ingredient("olive oil", Quantity::numeric(2.0, "tbsp"))
            .unwrap();
        let b = Recipe::new("b", "Marinade")
            .with_ingredient("olive oil", Quantity::numeric(3.0, "tsp"))
            .unwrap();
        let forward = compute_aggregated_demand(&[a.clone(), b.clone()], &catalog);
        let backward = compute_aggregated_demand(&[b, a], &catalog);
        assert_eq!(single(&forward, "olive_oil"), Quantity::numeric(3.0, "tbsp"));
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_inconvertible_units_become_mixed() {
        let catalog = UnitCatalog::builtin();
        let a = Recipe::new("a", "Soup")
            .with_ingredient("onion", Quantity::numeric(1.0, "whole"))
            .unwrap();
        let b = Recipe::new("b", "Salsa")
            .with_ingredient("onion", Quantity::numeric(100.0, "g"))
            .unwrap();
        let c = Recipe::new("c", "Stew")
            .with_ingredient("onion", Quantity::numeric(2.0, "pieces"))
            .unwrap();
        let demand = compute_aggregated_demand(&[a.clone(), b.clone(), c.clone()], &catalog);
        let onion = &demand[&normalize("onion")];
        assert!(onion.is_mixed_units());
        assert_eq!(
            onion.parts(),
            &[Quantity::numeric(100.0, "g"), Quantity::numeric(3.0, "pieces")]
        );
        assert_eq!(onion.to_string(), "100 g, 3 pieces");

        let reversed = compute_aggregated_demand(&[c, b, a], &catalog);
        assert_eq!(demand, reversed);
    }

    #[test]
    fn test_descriptive_contribution_wins() {
        let catalog = UnitCatalog::builtin();
        let a = Recipe::new("a", "Fries")
            .with_ingredient("salt", Quantity::numeric(1.0, "tsp"))
            .unwrap();
        let demand = compute_aggregated_demand(&[a, curry()], &catalog);
        assert_eq!(single(&demand, "salt"), Quantity::descriptive("to taste", ""));
    }

    #[test]
    fn test_descriptive_text_independent_of_order() {
        let catalog = UnitCatalog::builtin();
        let a = Recipe::new("a", "Fries")
            .with_ingredient("salt", Quantity::descriptive("a pinch", ""))
            .unwrap();
        let b = Recipe::new("b", "Soup")
            .with_ingredient("salt", Quantity::numeric(1.0, "tsp"))
            .unwrap();
        let forward = compute_aggregated_demand(&[a.clone(), b.clone(), curry()], &catalog);
        let backward = compute_aggregated_demand(&[curry(), b, a], &catalog);
        assert_eq!(forward, backward);
        assert_eq!(single(&forward, "salt"), Quantity::descriptive("a pinch", ""));
    }

    #[test]
    fn test_descriptive_collapses_mixed_units() {
        let catalog = UnitCatalog::builtin();
        let mut demand = Demand::Single(Quantity::numeric(1.0, "whole"));
        demand.absorb(Quantity::numeric(100.0, "g"), &catalog);
        assert!(demand.is_mixed_units());
        demand.absorb(Quantity::descriptive("a handful", ""), &catalog);
        assert_eq!(demand, Demand::Single(Quantity::descriptive("a handful", "")));
    }

    #[test]
    fn test_empty_selection() {
        let catalog = UnitCatalog::builtin();
        assert!(compute_aggregated_demand(&[], &catalog).is_empty());
    }
}
