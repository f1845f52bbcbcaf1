mod categorizer;
mod db;
mod extraction;
mod inventory;
mod settings;

use db::Database;
use extraction::GeminiClient;
use inventory::commands::{
    add_item, add_items, analyze_photo, confirm_drafts, delete_item, get_inventory_buckets,
    list_items, replace_item,
};
use settings::{ExtractionSettings, SettingsStore};
use tauri::{Manager, State};

pub(crate) struct AppState {
    pub(crate) db: Database,
    pub(crate) settings: SettingsStore,
    pub(crate) extractor: GeminiClient,
}

#[tauri::command]
fn get_extraction_settings(state: State<AppState>) -> Result<ExtractionSettings, String> {
    Ok(state.settings.extraction())
}

#[tauri::command]
fn set_extraction_settings(
    settings: ExtractionSettings,
    state: State<AppState>,
) -> Result<(), String> {
    state
        .settings
        .update_extraction(settings)
        .map_err(|e| e.to_string())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("FridgePal starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let db_path = app_data_dir.join("fridgepal.sqlite3");
                let database = Database::new(db_path)?;

                let settings_path = app_data_dir.join("settings.json");
                let settings_store = SettingsStore::new(settings_path)?;

                app.manage(AppState {
                    db: database,
                    settings: settings_store,
                    extractor: GeminiClient::new()?,
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            get_inventory_buckets,
            list_items,
            add_item,
            add_items,
            delete_item,
            replace_item,
            analyze_photo,
            confirm_drafts,
            get_extraction_settings,
            set_extraction_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
