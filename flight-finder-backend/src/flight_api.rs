//! Flight API module to communicate with the flight-status provider.
//!
//! Flight status and route lookups go through the aviationstack REST API. Responses are decoded
//! into the provider's own schema here and normalized elsewhere.

use crate::query::FlightLookup;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Error deserializing JSON response from API.")]
    ResponseConversionErr(serde_json::Error, String),
    #[error("Error from reqwest.")]
    ReqwestErr(#[from] reqwest::Error),
    #[error("API rejected the access key.")]
    Unauthorized(Option<String>),
    #[error("Rate limit for API exceeded")]
    RateLimitExceeded(Option<String>),
    #[error("Bad response from API.")]
    BadResponse(u16, Option<String>),
    #[error("API reported an error in its response body.")]
    Provider(String),
}

impl QueryError {
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 => QueryError::Unauthorized(message),
            429 => QueryError::RateLimitExceeded(message),
            _ => QueryError::BadResponse(status, message),
        }
    }
}

/// Error object as providers embed it in a JSON body
#[derive(Debug, Default, Deserialize)]
pub struct ProviderError {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Pull a human readable message out of an error body, if there is one.
///
/// Accepts `{"error": {"message": ..}}`, `{"error": ".."}` and `{"message": ..}`.
pub fn provider_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let msg = value["error"]["message"]
        .as_str()
        .or_else(|| value["error"].as_str())
        .or_else(|| value["message"].as_str())?;

    let msg = msg.trim();
    if msg.is_empty() {
        None
    } else {
        Some(msg.to_string())
    }
}

/// Send a request and decode the body, turning non-success statuses into `QueryError`.
pub async fn fetch_json<T: serde::de::DeserializeOwned>(
    req: reqwest::RequestBuilder,
) -> Result<T, QueryError> {
    let resp = req.send().await?;
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "Provider returned an error status");
        return Err(QueryError::from_status(
            status.as_u16(),
            provider_message(&body),
        ));
    }

    tracing::debug!("Response from provider: {}", body);
    serde_json::from_str(&body).map_err(|e| QueryError::ResponseConversionErr(e, body))
}

// Provider schema. Every field is optional since the provider sends nulls liberally.

#[derive(Debug, Deserialize)]
pub struct StatusEnvelope<T> {
    /// Absent or `null` when the provider has nothing to report
    #[serde(default)]
    pub data: Option<Vec<T>>,
    pub error: Option<ProviderError>,
}

impl<T> StatusEnvelope<T> {
    /// Some failures arrive as a 2xx with an `error` object instead of data
    pub fn into_data(self) -> Result<Vec<T>, QueryError> {
        match self.error {
            Some(err) => Err(QueryError::Provider(
                err.message
                    .or(err.code)
                    .unwrap_or_else(|| "Unknown provider error".to_string()),
            )),
            None => Ok(self.data.unwrap_or_default()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AviationEndpoint {
    pub airport: Option<String>,
    pub timezone: Option<String>,
    pub iata: Option<String>,
    pub terminal: Option<String>,
    pub gate: Option<String>,
    pub delay: Option<i64>,
    pub scheduled: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AviationAirline {
    pub name: Option<String>,
    pub iata: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AviationFlightNumber {
    pub number: Option<String>,
    pub iata: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AviationLive {
    pub updated: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub speed_horizontal: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AviationFlight {
    pub flight_status: Option<String>,
    pub departure: Option<AviationEndpoint>,
    pub arrival: Option<AviationEndpoint>,
    pub airline: Option<AviationAirline>,
    pub flight: Option<AviationFlightNumber>,
    pub live: Option<AviationLive>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AviationRouteEndpoint {
    pub airport: Option<String>,
    pub timezone: Option<String>,
    pub iata: Option<String>,
    pub terminal: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AviationRoute {
    pub departure: Option<AviationRouteEndpoint>,
    pub arrival: Option<AviationRouteEndpoint>,
    pub airline: Option<AviationAirline>,
    pub flight: Option<AviationFlightNumber>,
}

/// Access to live flight status and scheduled routes
#[async_trait::async_trait]
pub trait FlightStatusApi: Send + Sync {
    async fn get_flights(
        &self,
        access_key: &str,
        lookup: &FlightLookup,
        date: Option<&str>,
    ) -> Result<Vec<AviationFlight>, QueryError>;

    async fn get_routes(
        &self,
        access_key: &str,
        origin: &str,
        destination: &str,
    ) -> Result<Vec<AviationRoute>, QueryError>;
}

pub struct AviationStackApiQuery {
    client: reqwest::Client,
    base_url: String,
}

impl AviationStackApiQuery {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        AviationStackApiQuery {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl FlightStatusApi for AviationStackApiQuery {
    async fn get_flights(
        &self,
        access_key: &str,
        lookup: &FlightLookup,
        date: Option<&str>,
    ) -> Result<Vec<AviationFlight>, QueryError> {
        let (field, value) = lookup.provider_param();
        let mut params = vec![("access_key", access_key), (field, value)];
        if let Some(date) = date {
            params.push(("flight_date", date));
        }

        tracing::info!(field, value, "Querying flight status provider");
        let req = self
            .client
            .get(format!("{}/flights", self.base_url))
            .query(&params);

        fetch_json::<StatusEnvelope<AviationFlight>>(req)
            .await?
            .into_data()
    }

    async fn get_routes(
        &self,
        access_key: &str,
        origin: &str,
        destination: &str,
    ) -> Result<Vec<AviationRoute>, QueryError> {
        tracing::info!(origin, destination, "Querying route provider");
        let req = self.client.get(format!("{}/routes", self.base_url)).query(&[
            ("access_key", access_key),
            ("dep_iata", origin),
            ("arr_iata", destination),
        ]);

        fetch_json::<StatusEnvelope<AviationRoute>>(req)
            .await?
            .into_data()
    }
}

/// In-process provider that serves canned JSON documents, or fails with a fixed status
#[cfg(test)]
pub struct TestFlightStatusApi {
    pub flights_json: &'static str,
    pub routes_json: &'static str,
    pub fail_status: Option<u16>,
    /// One line per upstream call, e.g. `flights flight_iata=AA100`
    pub calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl TestFlightStatusApi {
    pub fn new(flights_json: &'static str, routes_json: &'static str) -> Self {
        TestFlightStatusApi {
            flights_json,
            routes_json,
            fail_status: None,
            calls: Default::default(),
        }
    }

    pub fn failing(status: u16) -> Self {
        TestFlightStatusApi {
            flights_json: "{}",
            routes_json: "{}",
            fail_status: Some(status),
            calls: Default::default(),
        }
    }

    pub fn recorded(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn decode<T: serde::de::DeserializeOwned + Default>(&self, body: &str) -> Result<Vec<T>, QueryError> {
        if let Some(status) = self.fail_status {
            return Err(QueryError::from_status(status, None));
        }
        serde_json::from_str::<StatusEnvelope<T>>(body)
            .map_err(|e| QueryError::ResponseConversionErr(e, body.to_string()))?
            .into_data()
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl FlightStatusApi for TestFlightStatusApi {
    async fn get_flights(
        &self,
        _access_key: &str,
        lookup: &FlightLookup,
        date: Option<&str>,
    ) -> Result<Vec<AviationFlight>, QueryError> {
        let (field, value) = lookup.provider_param();
        let mut call = format!("flights {}={}", field, value);
        if let Some(date) = date {
            call.push_str(&format!(" flight_date={}", date));
        }
        self.calls.lock().unwrap().push(call);
        self.decode(self.flights_json)
    }

    async fn get_routes(
        &self,
        _access_key: &str,
        origin: &str,
        destination: &str,
    ) -> Result<Vec<AviationRoute>, QueryError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("routes {}-{}", origin, destination));
        let mut routes: Vec<AviationRoute> = self.decode(self.routes_json)?;
        // Only keep routes leaving the requested airport so return trips can be told apart
        routes.retain(|r| {
            r.departure
                .as_ref()
                .and_then(|d| d.iata.as_deref())
                .map_or(false, |iata| iata == origin)
        });
        Ok(routes)
    }
}
