pub mod algorithm;
pub mod config;

pub use algorithm::{categorize_inventory, Bucket, UrgencyTier};
pub use config::CategorizerConfig;
