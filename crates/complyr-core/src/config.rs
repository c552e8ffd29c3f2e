use crate::subscription::{clamp_trial_days, DEFAULT_TRIAL_DAYS};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// JSON snapshot seeding the in-memory store (subscriptions, rules, usage).
    pub fixture_path: Option<String>,
    /// Length of the synthetic trial granted to organizations without a record.
    pub trial_days: i64,
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            fixture_path: None,
            trial_days: DEFAULT_TRIAL_DAYS,
            cors_origins: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("COMPLYR_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            fixture_path: std::env::var("COMPLYR_FIXTURE_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            trial_days: std::env::var("COMPLYR_TRIAL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|days| *days >= 0)
                .map(clamp_trial_days)
                .unwrap_or(DEFAULT_TRIAL_DAYS),
            cors_origins: std::env::var("COMPLYR_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}
