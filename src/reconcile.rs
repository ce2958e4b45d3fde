//! # Reconciliation Engine
//!
//! Classifies every ingredient of the aggregated demand against one fridge:
//!
//! - **Missing**: the fridge has no entry for the ingredient (nor its alias)
//! - **Satisfied**: enough is on hand, or either side is descriptive
//! - **PartiallyMissing**: some is on hand but not enough
//! - **Unresolvable**: both sides are numeric but their units cannot be compared
//!
//! The engine is total: every input pair ends in exactly one classification,
//! and nothing here returns an error or touches I/O.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use crate::aggregate::{AggregatedDemand, Demand};
use crate::identity::{AliasTable, IngredientId};
use crate::model::{Fridge, Quantity};
use crate::units::{same_unit, UnitCatalog};

/// Absolute slack for float comparisons, scaled by the needed amount
const EPSILON: f64 = 1e-9;

/// Ingredient identifier → classification, in demand order
pub type Classifications = BTreeMap<IngredientId, Classification>;

/// Outcome of comparing one ingredient's demand with the fridge supply
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Classification {
    /// Nothing in the fridge; the whole demand has to be bought
    Missing { needed: Demand },
    /// The fridge covers the demand. `remaining` is what is left afterwards,
    /// in the supply unit, when both sides are numeric.
    ///
    /// A shortfall below the float tolerance still counts as covered; its
    /// `remaining` is zero, so `remaining + needed` may exceed `available` by
    /// at most `1e-9 × needed`.
    Satisfied {
        needed: Demand,
        available: Quantity,
        remaining: Option<Quantity>,
    },
    /// The fridge covers part of the demand. `deficit` is in the needed unit,
    /// `available` in the unit the fridge stores it in.
    PartiallyMissing {
        needed: Quantity,
        available: Quantity,
        deficit: Quantity,
    },
    /// Units could not be compared; surfaced on both sides of the list
    Unresolvable { needed: Demand, available: Quantity },
}

/// Classification kind without payload, for counting and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Missing,
    Satisfied,
    PartiallyMissing,
    Unresolvable,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Missing => write!(f, "missing"),
            Status::Satisfied => write!(f, "satisfied"),
            Status::PartiallyMissing => write!(f, "partially_missing"),
            Status::Unresolvable => write!(f, "unresolvable"),
        }
    }
}

impl Classification {
    pub fn status(&self) -> Status {
        match self {
            Classification::Missing { .. } => Status::Missing,
            Classification::Satisfied { .. } => Status::Satisfied,
            Classification::PartiallyMissing { .. } => Status::PartiallyMissing,
            Classification::Unresolvable { .. } => Status::Unresolvable,
        }
    }

    /// Whether this ingredient shows up in the "to buy" list
    pub fn needs_purchase(&self) -> bool {
        !matches!(self, Classification::Satisfied { .. })
    }

    /// Whether this ingredient shows up in the "already in fridge" list
    pub fn uses_fridge(&self) -> bool {
        !matches!(self, Classification::Missing { .. })
    }
}

/// Find the fridge entry for a demanded ingredient: exact identifier first,
/// then the identifier's registered alias
pub fn find_supply<'a>(
    id: &IngredientId,
    fridge: &'a Fridge,
    aliases: &AliasTable,
) -> Option<&'a Quantity> {
    if let Some(supply) = fridge.get(id) {
        return Some(supply);
    }
    let parent = aliases.lookup(id)?;
    let supply = fridge.get(parent);
    if supply.is_some() {
        trace!(ingredient = %id, matched = %parent, "Matched fridge entry through alias");
    }
    supply
}

/// Classify every ingredient of `demand` against `fridge`.
///
/// Pure and deterministic: the result depends only on the four inputs.
pub fn reconcile(
    demand: &AggregatedDemand,
    fridge: &Fridge,
    catalog: &UnitCatalog,
    aliases: &AliasTable,
) -> Classifications {
    demand
        .iter()
        .map(|(id, needed)| {
            let supply = find_supply(id, fridge, aliases);
            let classification = classify(needed, supply, catalog);
            debug!(
                ingredient = %id,
                needed = %needed,
                status = %classification.status(),
                "Classified ingredient"
            );
            (id.clone(), classification)
        })
        .collect()
}

/// Classify one ingredient given its demand and the matching supply, if any
pub fn classify(needed: &Demand, supply: Option<&Quantity>, catalog: &UnitCatalog) -> Classification {
    let Some(available) = supply else {
        return Classification::Missing {
            needed: needed.clone(),
        };
    };

    let needed_quantity = match needed {
        Demand::Single(quantity) => quantity,
        // A descriptive supply only proves presence, which covers any demand
        Demand::MixedUnits(_) if available.is_descriptive() => {
            return Classification::Satisfied {
                needed: needed.clone(),
                available: available.clone(),
                remaining: None,
            }
        }
        Demand::MixedUnits(_) => {
            return Classification::Unresolvable {
                needed: needed.clone(),
                available: available.clone(),
            }
        }
    };

    match (needed_quantity, available) {
        (Quantity::Descriptive { .. }, _) | (_, Quantity::Descriptive { .. }) => {
            Classification::Satisfied {
                needed: needed.clone(),
                available: available.clone(),
                remaining: None,
            }
        }
        (
            Quantity::Numeric {
                amount: need,
                unit: need_unit,
            },
            Quantity::Numeric {
                amount: have,
                unit: have_unit,
            },
        ) => {
            let have_in_need_unit = if same_unit(need_unit, have_unit) {
                Some(*have)
            } else {
                catalog.convert(*have, have_unit, need_unit)
            };

            let Some(have_converted) = have_in_need_unit else {
                return Classification::Unresolvable {
                    needed: needed.clone(),
                    available: available.clone(),
                };
            };

            if have_converted + EPSILON * need.max(1.0) >= *need {
                let leftover = (have_converted - need).max(0.0);
                let remaining = if same_unit(need_unit, have_unit) {
                    Some(leftover)
                } else {
                    catalog.convert(leftover, need_unit, have_unit)
                };
                Classification::Satisfied {
                    needed: needed.clone(),
                    available: available.clone(),
                    remaining: remaining.map(|amount| Quantity::numeric(amount, have_unit)),
                }
            } else {
                Classification::PartiallyMissing {
                    needed: needed_quantity.clone(),
                    available: available.clone(),
                    deficit: Quantity::numeric(need - have_converted, need_unit),
                }
            }
        }
    }
}
