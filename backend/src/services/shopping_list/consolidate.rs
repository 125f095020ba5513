//! External merge of duplicate and synonymous ingredient lines.
//!
//! The aggregated, normalized lines are serialized into a single text
//! completion request; the reply is expected to contain a JSON array of
//! merged lines somewhere in its text. This is an at-most-one-shot call with
//! no retry: list generation is user-triggered, low-frequency and idempotent
//! on retry, so every failure mode (missing key, network error, non-success
//! status, timeout, unparseable reply) degrades to an empty consolidated
//! list with an error log instead of failing the request.

use crate::config::AppConfig;
use common::model::shopping_list::{ConsolidatedLine, IngredientLine};
use log::{error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::Duration;

const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1/models/gemini-2.5-flash:generateContent";

/// Failure modes of the consolidation call. None of them escape
/// `consolidate`; they exist to give the degradation log a precise cause.
#[derive(Debug)]
pub enum ConsolidationError {
    MissingApiKey,
    Network(reqwest::Error),
    Api {
        status: reqwest::StatusCode,
        error_body: String,
    },
    Serialization(serde_json::Error),
    EmptyResponse,
}

impl fmt::Display for ConsolidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsolidationError::MissingApiKey => {
                write!(f, "GOOGLE_PALM_API_KEY is not configured")
            }
            ConsolidationError::Network(err) => write!(f, "network error: {}", err),
            ConsolidationError::Api { status, error_body } => {
                write!(f, "API error {}: {}", status, error_body)
            }
            ConsolidationError::Serialization(err) => write!(f, "serialization error: {}", err),
            ConsolidationError::EmptyResponse => {
                write!(f, "reply carried no candidate text")
            }
        }
    }
}

impl Error for ConsolidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConsolidationError::Network(err) => Some(err),
            ConsolidationError::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ConsolidationError {
    fn from(err: reqwest::Error) -> Self {
        ConsolidationError::Network(err)
    }
}

impl From<serde_json::Error> for ConsolidationError {
    fn from(err: serde_json::Error) -> Self {
        ConsolidationError::Serialization(err)
    }
}

// Wire format of the text-generation endpoint.

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

/// Merges duplicate ingredients across the aggregated lines.
///
/// On success the reply's line list is sanitized (see `parse_consolidated`)
/// and returned; on any failure an empty list comes back and the caller
/// decides what an empty checklist means.
pub async fn consolidate(
    client: &Client,
    config: &AppConfig,
    lines: &[IngredientLine],
) -> Vec<ConsolidatedLine> {
    let max_index = lines
        .iter()
        .flat_map(|line| line.source_recipe_indices.iter().copied())
        .max()
        .unwrap_or(0);

    match request_consolidation(client, config, lines).await {
        Ok(text) => parse_consolidated(&text, max_index),
        Err(err) => {
            error!("ingredient consolidation degraded to an empty list: {}", err);
            Vec::new()
        }
    }
}

/// Issues the text completion request and extracts the first candidate's
/// text.
async fn request_consolidation(
    client: &Client,
    config: &AppConfig,
    lines: &[IngredientLine],
) -> Result<String, ConsolidationError> {
    let api_key = config
        .gemini_api_key
        .as_ref()
        .ok_or(ConsolidationError::MissingApiKey)?;

    let prompt = format!(
        "{}\n{}",
        config.consolidation_prompt,
        serde_json::to_string(lines)?
    );
    let request = GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            temperature: 0.2,
            max_output_tokens: 10_000,
            top_p: 0.8,
            top_k: 40,
        },
    };

    let response = client
        .post(GEMINI_URL)
        .header("x-goog-api-key", api_key)
        .timeout(Duration::from_secs(config.consolidation_timeout_secs))
        .json(&request)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error body".to_string());
        return Err(ConsolidationError::Api { status, error_body });
    }

    let reply: GenerateContentResponse = response.json().await?;
    reply
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .map(|part| part.text)
        .ok_or(ConsolidationError::EmptyResponse)
}

/// Reduces the reply text to its first `[` ... last `]` substring and parses
/// that as consolidated lines. A missing array or a parse failure yields an
/// empty list.
///
/// The reply is not trusted on provenance: indices outside `1..=max_index`
/// are an upstream bug and are dropped with a warning, and surviving index
/// lists are deduplicated preserving order. Lines with a blank ingredient
/// name are dropped entirely.
pub fn parse_consolidated(text: &str, max_index: usize) -> Vec<ConsolidatedLine> {
    let (start, end) = match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => {
            error!("consolidation reply contains no JSON array");
            return Vec::new();
        }
    };

    let parsed: Vec<ConsolidatedLine> = match serde_json::from_str(&text[start..=end]) {
        Ok(parsed) => parsed,
        Err(err) => {
            error!("failed to parse consolidation reply: {}", err);
            return Vec::new();
        }
    };

    parsed
        .into_iter()
        .filter_map(|line| sanitize_line(line, max_index))
        .collect()
}

fn sanitize_line(mut line: ConsolidatedLine, max_index: usize) -> Option<ConsolidatedLine> {
    if line.ingredient.trim().is_empty() {
        warn!("dropping consolidated line without an ingredient name");
        return None;
    }
    let mut recipes = Vec::new();
    for index in line.recipes {
        if index == 0 || index > max_index {
            warn!(
                "consolidation reply referenced unknown recipe index {}, dropping it",
                index
            );
        } else if !recipes.contains(&index) {
            recipes.push(index);
        }
    }
    line.recipes = recipes;
    Some(line)
}
