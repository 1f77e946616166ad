//! Shared application state.

use crate::config::Config;
use crate::hazards::HazardService;
use crate::providers::{HazardFeedClient, NominatimClient, OsrmClient};
use reqwest::Client;
use safepath_core::RouteEvaluator;

const USER_AGENT: &str = concat!("safepath-server/", env!("CARGO_PKG_VERSION"));

/// Per-process state handed to every request handler.
pub struct AppState {
    pub config: Config,
    pub evaluator: RouteEvaluator,
    pub routing: OsrmClient,
    pub hazards: HazardService<HazardFeedClient>,
    pub geocoder: NominatimClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.http_timeout())
            .user_agent(USER_AGENT)
            .build()?;

        let feed = HazardFeedClient::new(
            client.clone(),
            config.hazard_feed_url.clone(),
            config.hazard_feed_key.clone(),
        );

        Ok(Self {
            evaluator: RouteEvaluator::new(config.scoring.clone()),
            routing: OsrmClient::new(client.clone(), config.routing_url.clone()),
            hazards: HazardService::new(
                feed,
                config.hazard_cache_ttl(),
                config.hazard_cache_max_entries,
            ),
            geocoder: NominatimClient::new(client, config.geocoder_url.clone()),
            config,
        })
    }
}
