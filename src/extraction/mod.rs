pub mod client;
pub mod parser;

use serde::{Deserialize, Serialize};

pub use client::GeminiClient;

/// Provisional item produced by photo extraction. Every field is
/// free text straight from the model so the user can edit it during
/// review; nothing here is trusted until it passes normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DraftItem {
    pub id: String,
    pub name: String,
    /// e.g. "x2", "200g", "1 block"
    pub qty: String,
    /// YYYY-MM-DD as emitted by the model
    pub expires: String,
}
