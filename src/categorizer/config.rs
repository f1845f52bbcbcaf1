/// Thresholds for the expiration bucketing, in fractional hours.
#[derive(Debug, Clone)]
pub struct CategorizerConfig {
    /// Items strictly below this delta go in the Red bucket
    pub urgent_max_hours: f64,

    /// Items strictly above this delta go in the Green bucket;
    /// everything between the two thresholds (both ends inclusive) is Yellow
    pub safe_min_hours: f64,
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        Self {
            urgent_max_hours: 72.0,
            safe_min_hours: 7.0 * 24.0,
        }
    }
}
