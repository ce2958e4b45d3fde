//! # Shopping List Builder
//!
//! Splits reconciled ingredients into the two display lists: what has to be
//! bought (`notInFridge`) and what the fridge already covers (`inFridge`).
//! Entries follow the demand order, which is sorted by ingredient identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reconcile::{Classification, Classifications};

/// Shown instead of the lists when no recipe is selected
pub const EMPTY_PROMPT: &str = "Select recipes to see your ingredients.";

/// One line of the shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListEntry {
    /// Display name ("garlic clove")
    pub name: String,
    /// Human-readable amount ("3 cloves")
    pub amount_str: String,
}

impl ShoppingListEntry {
    pub fn new(name: impl Into<String>, amount_str: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount_str: amount_str.into(),
        }
    }
}

/// The two display sequences, rebuilt in full on every pass
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    pub not_in_fridge: Vec<ShoppingListEntry>,
    pub in_fridge: Vec<ShoppingListEntry>,
}

impl ShoppingList {
    pub fn is_empty(&self) -> bool {
        self.not_in_fridge.is_empty() && self.in_fridge.is_empty()
    }

    /// Entry for `name` in the "to buy" list
    pub fn to_buy(&self, name: &str) -> Option<&ShoppingListEntry> {
        self.not_in_fridge.iter().find(|entry| entry.name == name)
    }

    /// Entry for `name` in the "already in fridge" list
    pub fn on_hand(&self, name: &str) -> Option<&ShoppingListEntry> {
        self.in_fridge.iter().find(|entry| entry.name == name)
    }
}

/// Build the shopping list from per-ingredient classifications.
///
/// - Missing: full demand in `notInFridge`
/// - Satisfied: needed amount in `inFridge`
/// - PartiallyMissing: deficit in `notInFridge`, available amount in `inFridge`
/// - Unresolvable: an explanatory entry in both lists
pub fn build_shopping_list(classifications: &Classifications) -> ShoppingList {
    let mut list = ShoppingList::default();

    for (id, classification) in classifications {
        let name = id.display_name();
        match classification {
            Classification::Missing { needed } => {
                list.not_in_fridge
                    .push(ShoppingListEntry::new(name, needed.to_string()));
            }
            Classification::Satisfied { needed, .. } => {
                list.in_fridge.push(ShoppingListEntry::new(name, needed.to_string()));
            }
            Classification::PartiallyMissing {
                available, deficit, ..
            } => {
                list.not_in_fridge
                    .push(ShoppingListEntry::new(name.clone(), deficit.to_string()));
                list.in_fridge
                    .push(ShoppingListEntry::new(name, available.to_string()));
            }
            Classification::Unresolvable { needed, available } => {
                list.not_in_fridge.push(ShoppingListEntry::new(
                    name.clone(),
                    format!("{needed} needed (fridge has {available} in an incompatible unit)"),
                ));
                list.in_fridge.push(ShoppingListEntry::new(
                    name,
                    format!("{available} (cannot be compared with {needed} needed)"),
                ));
            }
        }
    }

    list
}

impl fmt::Display for ShoppingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "{EMPTY_PROMPT}");
        }

        if !self.not_in_fridge.is_empty() {
            writeln!(f, "Not in Fridge (To Buy):")?;
            for entry in &self.not_in_fridge {
                writeln!(f, "  • {}: {}", entry.name, entry.amount_str)?;
            }
        }

        if !self.in_fridge.is_empty() {
            if !self.not_in_fridge.is_empty() {
                writeln!(f)?;
            }
            writeln!(f, "Already in Fridge:")?;
            for entry in &self.in_fridge {
                writeln!(f, "  • {}: {}", entry.name, entry.amount_str)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Demand;
    use crate::identity::normalize;
    use crate::model::Quantity;

    fn classifications() -> Classifications {
        let mut map = Classifications::new();
        map.insert(
            normalize("ginger"),
            Classification::Missing {
                needed: Demand::Single(Quantity::numeric(1.0, "inch_piece")),
            },
        );
        map.insert(
            normalize("garlic_clove"),
            Classification::Satisfied {
                needed: Demand::Single(Quantity::numeric(3.0, "cloves")),
                available: Quantity::numeric(5.0, "cloves"),
                remaining: Some(Quantity::numeric(2.0, "cloves")),
            },
        );
        map.insert(
            normalize("onion"),
            Classification::PartiallyMissing {
                needed: Quantity::numeric(3.0, "whole"),
                available: Quantity::numeric(2.0, "whole"),
                deficit: Quantity::numeric(1.0, "whole"),
            },
        );
        map.insert(
            normalize("olive_oil"),
            Classification::Unresolvable {
                needed: Demand::Single(Quantity::numeric(2.0, "tbsp")),
                available: Quantity::numeric(1.0, "bottle"),
            },
        );
        map
    }

    #[test]
    fn test_partition_and_order() {
        let list = build_shopping_list(&classifications());

        let to_buy: Vec<&str> = list.not_in_fridge.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(to_buy, vec!["ginger", "olive oil", "onion"]);

        let on_hand: Vec<&str> = list.in_fridge.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(on_hand, vec!["garlic clove", "olive oil", "onion"]);
    }

    #[test]
    fn test_amount_strings() {
        let list = build_shopping_list(&classifications());
        assert_eq!(list.to_buy("ginger").unwrap().amount_str, "1 inch_piece");
        assert_eq!(list.on_hand("garlic clove").unwrap().amount_str, "3 cloves");
        assert_eq!(list.to_buy("onion").unwrap().amount_str, "1 whole");
        assert_eq!(list.on_hand("onion").unwrap().amount_str, "2 whole");
        assert_eq!(
            list.to_buy("olive oil").unwrap().amount_str,
            "2 tbsp needed (fridge has 1 bottle in an incompatible unit)"
        );
        assert_eq!(
            list.on_hand("olive oil").unwrap().amount_str,
            "1 bottle (cannot be compared with 2 tbsp needed)"
        );
    }

    #[test]
    fn test_mixed_units_joined() {
        let mut map = Classifications::new();
        map.insert(
            normalize("onion"),
            Classification::Missing {
                needed: Demand::MixedUnits(vec![
                    Quantity::numeric(1.0, "whole"),
                    Quantity::numeric(100.0, "g"),
                ]),
            },
        );
        let list = build_shopping_list(&map);
        assert_eq!(list.to_buy("onion").unwrap().amount_str, "1 whole, 100 g");
    }

    #[test]
    fn test_empty_classifications() {
        let list = build_shopping_list(&Classifications::new());
        assert!(list.is_empty());
        assert_eq!(list.to_string(), format!("{EMPTY_PROMPT}\n"));
    }

    #[test]
    fn test_serialized_field_names() {
        let list = build_shopping_list(&classifications());
        let json = serde_json::to_value(&list).unwrap();
        assert!(json.get("notInFridge").is_some());
        assert!(json.get("inFridge").is_some());
        assert_eq!(json["notInFridge"][0]["amountStr"], "1 inch_piece");
    }

    #[test]
    fn test_text_rendering() {
        let list = build_shopping_list(&classifications());
        let text = list.to_string();
        assert!(text.starts_with("Not in Fridge (To Buy):\n  • ginger: 1 inch_piece\n"));
        assert!(text.contains("Already in Fridge:\n  • garlic clove: 3 cloves\n"));
    }
}
