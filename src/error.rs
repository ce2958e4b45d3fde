//! # Planner Error Types Module
//!
//! Errors raised at the ingestion and loading boundary. The reconciliation
//! core itself never fails: unit mismatches and missing ingredients are
//! classifications, not errors.

/// Custom error types for recipe/fridge ingestion and snapshot loading
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// A quantity was negative, non-finite, multi-unit or otherwise malformed
    InvalidQuantity(String),
    /// An ingredient name normalized to an empty identifier
    InvalidIngredientName(String),
    /// A unit catalog entry had an empty name or a non-positive factor
    InvalidUnit(String),
    /// An alias entry was empty or pointed at itself
    InvalidAlias(String),
    /// A selected recipe id is not present in the snapshot
    UnknownRecipe(String),
    /// The requested fridge id is not present in the snapshot
    UnknownFridge(String),
    /// Configuration errors (bad environment values, etc.)
    Config(String),
    /// File read errors
    Io(String),
    /// JSON deserialization errors
    Parse(String),
}

impl std::fmt::Display for PlannerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlannerError::InvalidQuantity(msg) => write!(f, "Invalid quantity: {msg}"),
            PlannerError::InvalidIngredientName(name) => {
                write!(f, "Invalid ingredient name: '{name}'")
            }
            PlannerError::InvalidUnit(msg) => write!(f, "Invalid unit: {msg}"),
            PlannerError::InvalidAlias(msg) => write!(f, "Invalid alias: {msg}"),
            PlannerError::UnknownRecipe(id) => write!(f, "Unknown recipe: {id}"),
            PlannerError::UnknownFridge(id) => write!(f, "Unknown fridge: {id}"),
            PlannerError::Config(msg) => write!(f, "Configuration error: {msg}"),
            PlannerError::Io(msg) => write!(f, "IO error: {msg}"),
            PlannerError::Parse(msg) => write!(f, "Parse error: {msg}"),
        }
    }
}

impl std::error::Error for PlannerError {}

impl From<std::io::Error> for PlannerError {
    fn from(err: std::io::Error) -> Self {
        PlannerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = PlannerError::InvalidQuantity("amount -1 is negative".to_string());
        assert_eq!(err.to_string(), "Invalid quantity: amount -1 is negative");

        let err = PlannerError::UnknownRecipe("recipe-9".to_string());
        assert_eq!(err.to_string(), "Unknown recipe: recipe-9");
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: PlannerError = json_err.into();
        assert!(matches!(err, PlannerError::Parse(_)));
    }
}
