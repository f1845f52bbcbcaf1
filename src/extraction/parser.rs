use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::extraction::DraftItem;

/// Item record as the model emits it; all fields optional since the
/// model occasionally drops one.
#[derive(Debug, Deserialize)]
struct RawDraft {
    name: Option<String>,
    qty: Option<String>,
    expires: Option<String>,
}

/// A draft that passed validation and is ready to become a real item.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDraft {
    pub name: String,
    pub quantity: u32,
    pub expires_at: DateTime<Utc>,
}

/// Turn the raw model reply into editable drafts. Missing names fall
/// back to "Unknown Item", missing quantities to "1", missing dates to
/// the current date (as the prompt asks the model to assume purchase
/// today).
pub fn parse_model_reply(text: &str, now: DateTime<Utc>) -> Result<Vec<DraftItem>> {
    let clean = strip_code_fences(text);
    let raw: Vec<RawDraft> =
        serde_json::from_str(clean).context("model reply is not a JSON array of items")?;

    let today = now.date_naive().format("%Y-%m-%d").to_string();

    Ok(raw
        .into_iter()
        .map(|draft| DraftItem {
            id: Uuid::new_v4().to_string(),
            name: draft
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Unknown Item".to_string()),
            qty: draft.qty.unwrap_or_else(|| "1".to_string()),
            expires: draft.expires.unwrap_or_else(|| today.clone()),
        })
        .collect())
}

/// The model sometimes wraps the array in ```json fences despite the
/// prompt saying not to.
fn strip_code_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Extract a quantity from free text by taking the first contiguous
/// digit run ("x2" -> 2, "200g" -> 200, "1 block" -> 1). Anything
/// without digits, zero, or out of range falls back to 1.
pub fn parse_quantity(raw: &str) -> u32 {
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits.parse::<u32>().unwrap_or(1).max(1)
}

/// Parse an expiration date: either the YYYY-MM-DD the prompt asks for
/// (taken as midnight UTC) or a full RFC 3339 timestamp.
pub fn parse_expiration(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("unrecognized expiration date '{raw}'"))
}

/// Validate a user-confirmed draft. This is the gate in front of the
/// store and the categorizer: malformed dates are rejected here, at
/// the review step, never later.
pub fn normalize_draft(draft: &DraftItem) -> Result<NormalizedDraft> {
    let name = draft.name.trim();
    if name.is_empty() {
        bail!("draft item has an empty name");
    }

    let expires_at = parse_expiration(&draft.expires)
        .with_context(|| format!("draft '{}' has an invalid expiration date", draft.name))?;

    Ok(NormalizedDraft {
        name: name.to_string(),
        quantity: parse_quantity(&draft.qty),
        expires_at,
    })
}
