use chrono::{DateTime, Utc};
use serde::Deserialize;
use tauri::State;

use crate::{
    categorizer::{categorize_inventory, Bucket, CategorizerConfig},
    db::models::InventoryItem,
    extraction::{parser, DraftItem},
    AppState,
};

/// Default image for manual entries and confirmed drafts until the
/// user attaches a real photo.
const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/150";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItemInput {
    pub name: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub expires_at: DateTime<Utc>,
}

fn item_from_input(input: NewItemInput, now: DateTime<Utc>) -> Result<InventoryItem, String> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err("item name must not be empty".to_string());
    }
    if input.quantity < 1 {
        return Err("quantity must be at least 1".to_string());
    }

    Ok(InventoryItem::new(
        name.to_string(),
        input
            .image_url
            .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
        input.quantity,
        input.expires_at,
        now,
    ))
}

#[tauri::command]
pub async fn get_inventory_buckets(state: State<'_, AppState>) -> Result<Vec<Bucket>, String> {
    let db = &state.db;
    let items = db.list_items().await.map_err(|e| e.to_string())?;
    Ok(categorize_inventory(
        &items,
        Utc::now(),
        &CategorizerConfig::default(),
    ))
}

#[tauri::command]
pub async fn list_items(state: State<'_, AppState>) -> Result<Vec<InventoryItem>, String> {
    let db = &state.db;
    db.list_items().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn add_item(
    state: State<'_, AppState>,
    input: NewItemInput,
) -> Result<InventoryItem, String> {
    let item = item_from_input(input, Utc::now())?;
    state.db.insert_item(&item).await.map_err(|e| e.to_string())?;
    Ok(item)
}

#[tauri::command]
pub async fn add_items(
    state: State<'_, AppState>,
    inputs: Vec<NewItemInput>,
) -> Result<Vec<InventoryItem>, String> {
    let now = Utc::now();

    // Validate everything before touching the store so a bad entry
    // mid-batch doesn't leave a partial insert.
    let mut items = Vec::with_capacity(inputs.len());
    for input in inputs {
        items.push(item_from_input(input, now)?);
    }

    state
        .db
        .insert_items(items.clone())
        .await
        .map_err(|e| e.to_string())?;
    Ok(items)
}

#[tauri::command]
pub async fn delete_item(state: State<'_, AppState>, item_id: String) -> Result<(), String> {
    let deleted = state
        .db
        .delete_item(&item_id)
        .await
        .map_err(|e| e.to_string())?;

    if !deleted {
        return Err(format!("item {item_id} not found"));
    }
    Ok(())
}

#[tauri::command]
pub async fn replace_item(
    state: State<'_, AppState>,
    item: InventoryItem,
) -> Result<(), String> {
    if item.name.trim().is_empty() {
        return Err("item name must not be empty".to_string());
    }
    if item.quantity < 1 {
        return Err("quantity must be at least 1".to_string());
    }

    let replaced = state
        .db
        .replace_item(&item)
        .await
        .map_err(|e| e.to_string())?;

    if !replaced {
        return Err(format!("item {} not found", item.id));
    }
    Ok(())
}

#[tauri::command]
pub async fn analyze_photo(
    state: State<'_, AppState>,
    image_path: String,
) -> Result<Vec<DraftItem>, String> {
    let settings = state.settings.extraction();
    let image = std::fs::read(&image_path)
        .map_err(|e| format!("failed to read image {image_path}: {e}"))?;

    state
        .extractor
        .analyze_image(&settings.api_key, &settings.model, &image)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn confirm_drafts(
    state: State<'_, AppState>,
    drafts: Vec<DraftItem>,
) -> Result<Vec<InventoryItem>, String> {
    let now = Utc::now();

    let mut items = Vec::with_capacity(drafts.len());
    for draft in &drafts {
        let normalized = parser::normalize_draft(draft).map_err(|e| e.to_string())?;
        items.push(InventoryItem::new(
            normalized.name,
            PLACEHOLDER_IMAGE_URL.to_string(),
            normalized.quantity,
            normalized.expires_at,
            now,
        ));
    }

    state
        .db
        .insert_items(items.clone())
        .await
        .map_err(|e| e.to_string())?;
    Ok(items)
}
