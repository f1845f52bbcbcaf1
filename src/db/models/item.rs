use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One food item tracked in the fridge.
///
/// Items are only ever mutated by full replacement; there are no
/// partial field updates once a row exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn new(
        name: String,
        image_url: String,
        quantity: u32,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            image_url,
            quantity: quantity.max(1),
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }
}
