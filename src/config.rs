use std::env;

/// Upper bound for the turnover gap, in hours.
pub const MAX_TURNOVER_HOURS: i64 = 240;

/// Default turnover gap needed between two stays for cleaning.
pub const DEFAULT_TURNOVER_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub turnover_min_hours: i64,
    pub cash_view_includes_cancelled: bool,
    pub fold_deferred_into_operational: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            turnover_min_hours: DEFAULT_TURNOVER_HOURS,
            cash_view_includes_cancelled: false,
            fold_deferred_into_operational: false,
        }
    }
}

impl EngineConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            turnover_min_hours: clamp_turnover_hours(env_parse_or(
                "TURNOVER_MIN_HOURS",
                defaults.turnover_min_hours,
            )),
            cash_view_includes_cancelled: env_parse_bool_or(
                "CASH_VIEW_INCLUDES_CANCELLED",
                defaults.cash_view_includes_cancelled,
            ),
            fold_deferred_into_operational: env_parse_bool_or(
                "FOLD_DEFERRED_INTO_OPERATIONAL",
                defaults.fold_deferred_into_operational,
            ),
        }
    }
}

pub fn clamp_turnover_hours(value: i64) -> i64 {
    value.clamp(0, MAX_TURNOVER_HOURS)
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parse_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    env_opt(key)
        .and_then(|raw| raw.parse::<T>().ok())
        .unwrap_or(default)
}

fn env_parse_bool_or(key: &str, default: bool) -> bool {
    parse_bool(env_opt(key).as_deref()).unwrap_or(default)
}

fn parse_bool(raw: Option<&str>) -> Option<bool> {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        Some("1" | "true" | "yes" | "on") => Some(true),
        Some("0" | "false" | "no" | "off") => Some(false),
        _ => None,
    }
}
