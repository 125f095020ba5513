use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One aggregated ingredient request line, tagged with the recipes it came
/// from.
///
/// `sourceRecipeIndices` holds 1-based display indices into the filtered
/// recipe selection of the current generation; a line carries several indices
/// once the consolidation step has merged duplicates. This struct is also the
/// wire shape serialized into the consolidation prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientLine {
    /// Free-text quantity ("100 g"); empty when the recipe never gave one.
    #[serde(default)]
    pub amount: String,
    pub name: String,
    pub source_recipe_indices: Vec<usize>,
}

/// A post-merge line as returned by the external consolidation call.
///
/// The field names are the JSON contract with that call: an array of objects
/// with `amount`, `ingredient` and `recipes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedLine {
    #[serde(default)]
    pub amount: String,
    pub ingredient: String,
    #[serde(default)]
    pub recipes: Vec<usize>,
}

/// Persisted metadata for one generated shopping list.
///
/// Created once per successful generation and never deleted; every field but
/// `notes` is immutable afterwards. The `id` is the generation timestamp
/// (`YYYY-MM-DD-HH-mm-ss`, UTC), suffixed with `-2`, `-3`, ... when two lists
/// are generated within the same second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListRecord {
    pub id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    /// The recipe identifiers of the original request, in request order.
    pub recipe_ids: Vec<String>,
    /// Relative URL of the rendered checklist document.
    pub list_file_url: String,
    /// Free text, editable by the list's holder after creation.
    #[serde(default)]
    pub notes: String,
}
