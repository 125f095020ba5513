//! Runtime configuration, read once from the environment at startup.
//!
//! Every variable has a default so the service starts on a bare machine;
//! `GOOGLE_PALM_API_KEY` is the one exception, and its absence only degrades
//! the consolidation step (see `services::shopping_list::consolidate`).

use std::env;

/// Prompt prefix sent to the external consolidation call. The aggregated
/// ingredient lines are appended as a JSON array on the following line.
/// Overridable via `CONSOLIDATION_PROMPT`.
const DEFAULT_CONSOLIDATION_PROMPT: &str = "You are given a shopping list as a JSON array of ingredient lines \
with the fields \"name\", \"amount\" and \"sourceRecipeIndices\". Merge duplicate or synonymous ingredients \
into single entries and sum compatible amounts. Answer with a JSON array only. Each entry must have the \
fields \"amount\" (string), \"ingredient\" (string) and \"recipes\" (the combined sourceRecipeIndices of the \
merged lines). Ingredient lines:";

/// Configuration shared across the Actix application as `web::Data`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the JSON collection file (`DATABASE_FILE`).
    pub database_file: String,
    /// Bind address (`SERVER_HOSTNAME`).
    pub host: String,
    /// Bind port (`SERVER_PORT`).
    pub port: u16,
    /// Directory the rendered checklist documents are written to
    /// (`SHOPPING_LISTS_DIR`); served under `/shopping-lists`.
    pub lists_dir: String,
    /// Directory holding the TTF families for the layout engine (`FONTS_DIR`).
    pub fonts_dir: String,
    /// API key for the consolidation call (`GOOGLE_PALM_API_KEY`). `None`
    /// degrades consolidation to an empty merge result.
    pub gemini_api_key: Option<String>,
    pub consolidation_prompt: String,
    /// Timeout for the consolidation call (`CONSOLIDATION_TIMEOUT_SECS`);
    /// expiry is treated like a parse failure.
    pub consolidation_timeout_secs: u64,
}

impl AppConfig {
    /// Reads the configuration from the environment, falling back to the
    /// defaults above. Unparseable numeric values fall back as well.
    pub fn from_env() -> AppConfig {
        AppConfig {
            database_file: var_or("DATABASE_FILE", "./db.json"),
            host: var_or("SERVER_HOSTNAME", "0.0.0.0"),
            port: env::var("SERVER_PORT")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(3010),
            lists_dir: var_or("SHOPPING_LISTS_DIR", "./public/shopping-lists"),
            fonts_dir: var_or("FONTS_DIR", "./fonts"),
            gemini_api_key: env::var("GOOGLE_PALM_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            consolidation_prompt: var_or("CONSOLIDATION_PROMPT", DEFAULT_CONSOLIDATION_PROMPT),
            consolidation_timeout_secs: env::var("CONSOLIDATION_TIMEOUT_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(10),
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}
