use serde::{Deserialize, Serialize};

/// A single requested item inside an ingredient group.
///
/// `amount` is free text ("100 g", "2 EL") and may be missing for items the
/// author never quantified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    pub name: String,
}

/// A labelled block of ingredients as stored on a recipe record
/// (e.g. "Dough", "Topping"). The label may be empty or missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub items: Vec<IngredientItem>,
}

/// The slice of a recipe record the shopping-list pipeline reads.
///
/// Recipes live schemaless in the collection file and carry more fields than
/// listed here (steps, tags, reviews, ...); the store hands the raw values
/// through untouched and only deserializes into this struct when the
/// aggregator needs typed access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<IngredientGroup>>,
}
