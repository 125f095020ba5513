//! Flattens the selected recipes' ingredient groups into one tagged list.

use common::model::recipe::Recipe;
use common::model::shopping_list::IngredientLine;

/// Result of flattening a recipe selection.
#[derive(Debug)]
pub struct Aggregation {
    /// Display names of the recipes that survived filtering, in input order.
    /// Position `i` carries display index `i + 1`; provenance indices on the
    /// lines refer to these positions.
    pub recipe_names: Vec<String>,
    pub lines: Vec<IngredientLine>,
}

/// True when the recipe has at least one ingredient group with items.
fn has_ingredients(recipe: &Recipe) -> bool {
    recipe
        .ingredients
        .as_ref()
        .map(|groups| groups.iter().any(|group| !group.items.is_empty()))
        .unwrap_or(false)
}

/// Flattens the ingredient groups of `selected` into a single sequence of
/// provenance-tagged lines.
///
/// Recipes without usable ingredients are skipped and do not consume a
/// display index; the indices are 1-based positions in the *filtered* list.
/// Line order is recipes in input order, groups in stored order, items in
/// stored order — the document rows depend on this ordering staying stable
/// through normalization. Items whose name is blank are dropped.
///
/// Returns `None` when filtering leaves no recipe at all; the caller turns
/// that into its "no valid recipes" failure.
pub fn aggregate(selected: &[Recipe]) -> Option<Aggregation> {
    let mut recipe_names = Vec::new();
    let mut lines = Vec::new();

    for recipe in selected.iter().filter(|recipe| has_ingredients(recipe)) {
        recipe_names.push(recipe.name.clone());
        let display_index = recipe_names.len();
        if let Some(groups) = &recipe.ingredients {
            for group in groups {
                for item in &group.items {
                    if item.name.trim().is_empty() {
                        continue;
                    }
                    lines.push(IngredientLine {
                        amount: item.amount.clone().unwrap_or_default(),
                        name: item.name.clone(),
                        source_recipe_indices: vec![display_index],
                    });
                }
            }
        }
    }

    if recipe_names.is_empty() {
        None
    } else {
        Some(Aggregation {
            recipe_names,
            lines,
        })
    }
}
