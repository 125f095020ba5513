//! Per-line cleanup of raw ingredient name/amount pairs.
//!
//! Both rules are pure and idempotent; the aggregator output is passed
//! through here once before consolidation.

use common::model::shopping_list::IngredientLine;
use regex::Regex;
use std::sync::OnceLock;

/// Matches a leading run of digits and numeric punctuation glued directly to
/// trailing unit text ("100g", "1.5l"). Amounts that already carry a space
/// after the number do not match.
fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9.,]+)([^0-9.,\s].*)$").expect("hard-coded amount pattern compiles")
    })
}

/// Title-cases each whitespace-separated token of an ingredient name;
/// tokens that do not start with a letter are dropped from the rejoined
/// string. "olive  oil" becomes "Olive Oil".
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|token| {
            let mut chars = token.chars();
            let first = chars.next()?;
            if !first.is_alphabetic() {
                return None;
            }
            let mut cased = String::new();
            cased.extend(first.to_uppercase());
            cased.push_str(&chars.as_str().to_lowercase());
            Some(cased)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Inserts a single space between a leading numeric run (digits, `.`, `,`)
/// and the unit text that follows it: "100g" becomes "100 g". Amounts
/// without trailing unit text, or with a space already present, are returned
/// trimmed.
pub fn normalize_amount(amount: &str) -> String {
    let trimmed = amount.trim();
    match amount_pattern().captures(trimmed) {
        Some(caps) => format!("{} {}", &caps[1], &caps[2]),
        None => trimmed.to_string(),
    }
}

/// Normalizes one aggregated line; provenance passes through untouched.
pub fn normalize_line(line: &IngredientLine) -> IngredientLine {
    IngredientLine {
        amount: normalize_amount(&line.amount),
        name: normalize_name(&line.name),
        source_recipe_indices: line.source_recipe_indices.clone(),
    }
}
