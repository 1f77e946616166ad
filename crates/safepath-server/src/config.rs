//! Server configuration from environment.

use safepath_core::ScoringRules;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub routing_url: String,
    pub hazard_feed_url: String,
    pub hazard_feed_key: Option<String>,
    pub geocoder_url: String,
    pub http_timeout_s: u64,
    pub hazard_cache_ttl_s: u64,
    pub hazard_cache_max_entries: usize,
    pub evaluate_timeout_ms: u64,
    pub log_json: bool,
    pub scoring: ScoringRules,
}

impl Config {
    pub fn from_env() -> Self {
        let mut scoring = ScoringRules::default();
        if let Some(buffer) = parse_env::<f64>("SAFEPATH_PROXIMITY_BUFFER_KM") {
            if buffer.is_finite() && buffer >= 0.0 {
                scoring.proximity_buffer_km = buffer;
            }
        }

        Self {
            server_port: parse_env("SAFEPATH_PORT").unwrap_or(3000),
            routing_url: env::var("SAFEPATH_ROUTING_URL")
                .unwrap_or_else(|_| "https://router.project-osrm.org".to_string()),
            hazard_feed_url: env::var("SAFEPATH_HAZARD_FEED_URL").unwrap_or_default(),
            hazard_feed_key: env::var("SAFEPATH_HAZARD_FEED_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            geocoder_url: env::var("SAFEPATH_GEOCODER_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            http_timeout_s: parse_env("SAFEPATH_HTTP_TIMEOUT_S").unwrap_or(10),
            hazard_cache_ttl_s: parse_env("SAFEPATH_HAZARD_CACHE_TTL_S").unwrap_or(600),
            hazard_cache_max_entries: parse_env("SAFEPATH_HAZARD_CACHE_MAX_ENTRIES")
                .unwrap_or(1024),
            evaluate_timeout_ms: parse_env("SAFEPATH_EVALUATE_TIMEOUT_MS").unwrap_or(2000),
            log_json: env::var("SAFEPATH_LOG_JSON")
                .map(|value| matches!(value.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
            scoring,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_s.max(1))
    }

    pub fn hazard_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.hazard_cache_ttl_s.max(30))
    }

    pub fn evaluate_timeout(&self) -> Duration {
        Duration::from_millis(self.evaluate_timeout_ms.max(50))
    }

    /// Upper bound for a whole plan request: geocoding, routing and hazard
    /// lookups run back to back before evaluation.
    pub fn plan_timeout(&self) -> Duration {
        self.http_timeout() * 3 + self.evaluate_timeout()
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.trim().parse().ok())
}
