use std::sync::Arc;

use crate::error::ApiError;
use crate::fare_api::{FareApi, SkyScannerApiQuery};
use crate::flight_api::{AviationStackApiQuery, FlightStatusApi};
use crate::settings::{EnvKeys, KeySource, Settings};

/// Shared, read-only state handed to every request handler
pub struct AppState {
    pub flight_status: Arc<dyn FlightStatusApi>,
    pub fares: Arc<dyn FareApi>,
    pub keys: Arc<dyn KeySource>,
    pub booking_domain: String,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Self {
        // One pooled client shared by both providers
        let client = reqwest::Client::new();

        AppState {
            flight_status: Arc::new(AviationStackApiQuery::new(
                client.clone(),
                settings.providers.flight_status_url.as_str(),
            )),
            fares: Arc::new(SkyScannerApiQuery::new(
                client,
                settings.providers.fare_url.as_str(),
            )),
            keys: Arc::new(EnvKeys),
            booking_domain: settings.providers.booking_domain.clone(),
        }
    }

    /// Look up a provider key, failing with a configuration error when it is not set
    pub fn api_key(&self, var: &'static str) -> Result<String, ApiError> {
        self.keys.get(var).ok_or(ApiError::MissingKey(var))
    }
}
