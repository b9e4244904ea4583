//! Fare API module.
//!
//! Handles communication with the fare pricing API. The provider answers with itineraries that
//! reference places and carriers by numeric id; resolving those happens in `normalize`.

use crate::flight_api::{fetch_json, QueryError};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Validated parameters of one fare search
#[derive(Debug, Clone, PartialEq)]
pub struct FareQuery {
    pub from: String,
    pub to: String,
    pub date: String,
    pub adults: u8,
    pub currency: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FareResponse {
    #[serde(default)]
    pub itineraries: Vec<Itinerary>,
    #[serde(default)]
    pub places: HashMap<u64, Place>,
    #[serde(default)]
    pub carriers: HashMap<u64, Carrier>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    #[serde(default)]
    pub pricing_options: Vec<PricingOption>,
    #[serde(default)]
    pub legs: Vec<ItineraryLeg>,
}

#[derive(Debug, Deserialize)]
pub struct PricingOption {
    #[serde(default)]
    pub price: Option<FarePrice>,
    pub deeplink: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FarePrice {
    /// Sent either as a number or as a numeric string
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<f64>,
}

impl PricingOption {
    pub fn amount(&self) -> Option<f64> {
        self.price.as_ref().and_then(|p| p.amount)
    }
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    let amount = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(amount.filter(|a| a.is_finite()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryLeg {
    pub origin_place_id: Option<u64>,
    pub destination_place_id: Option<u64>,
    pub departure_date_time: Option<String>,
    pub arrival_date_time: Option<String>,
    pub duration_in_minutes: Option<u32>,
    pub stop_count: Option<u32>,
    #[serde(default)]
    pub marketing_carrier_ids: Vec<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Place {
    pub iata: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Carrier {
    pub iata: Option<String>,
    pub name: Option<String>,
}

#[async_trait::async_trait]
pub trait FareApi: Send + Sync {
    async fn search_fares(&self, api_key: &str, query: &FareQuery)
        -> Result<FareResponse, QueryError>;
}

pub struct SkyScannerApiQuery {
    client: reqwest::Client,
    base_url: String,
}

impl SkyScannerApiQuery {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        SkyScannerApiQuery {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl FareApi for SkyScannerApiQuery {
    async fn search_fares(
        &self,
        api_key: &str,
        query: &FareQuery,
    ) -> Result<FareResponse, QueryError> {
        tracing::info!(
            from = %query.from,
            to = %query.to,
            date = %query.date,
            "Querying fare provider"
        );

        let adults = query.adults.to_string();
        let req = self
            .client
            .get(format!("{}/flights/search", self.base_url))
            .header("x-api-key", api_key)
            .query(&[
                ("origin", query.from.as_str()),
                ("destination", query.to.as_str()),
                ("date", query.date.as_str()),
                ("adults", adults.as_str()),
                ("currency", query.currency.as_str()),
            ]);

        fetch_json(req).await
    }
}

/// Fare provider backed by a CSV of quotes, one row per itinerary
#[cfg(test)]
pub struct TestFareApiQuery {
    rows: Vec<MockFareRow>,
    pub fail_status: Option<u16>,
}

#[cfg(test)]
#[derive(Debug, Clone, Deserialize)]
struct MockFareRow {
    origin: String,
    origin_name: String,
    destination: String,
    destination_name: String,
    carrier_code: String,
    carrier_name: String,
    price: f64,
    departure: String,
    arrival: String,
    duration: u32,
    stops: u32,
    deeplink: String,
}

#[cfg(test)]
impl TestFareApiQuery {
    pub fn new() -> Self {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/test/MockFares.csv");
        let mut rdr = csv::Reader::from_path(path).unwrap();
        let rows = rdr
            .deserialize::<MockFareRow>()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        TestFareApiQuery {
            rows,
            fail_status: None,
        }
    }

    pub fn failing(status: u16) -> Self {
        TestFareApiQuery {
            rows: vec![],
            fail_status: Some(status),
        }
    }

    /// Builds a provider document the way the real API shapes it, ids and all
    fn to_response(&self, query: &FareQuery) -> FareResponse {
        let mut resp = FareResponse::default();
        let mut place_ids: HashMap<String, u64> = HashMap::new();
        let mut carrier_ids: HashMap<String, u64> = HashMap::new();

        let matching = self
            .rows
            .iter()
            .filter(|r| r.origin == query.from && r.destination == query.to);

        for row in matching {
            let mut place_id = |code: &str, name: &str| {
                let next = 1000 + place_ids.len() as u64;
                let id = *place_ids.entry(code.to_string()).or_insert(next);
                resp.places.insert(
                    id,
                    Place {
                        iata: Some(code.to_string()),
                        name: Some(name.to_string()),
                    },
                );
                id
            };
            let origin_id = place_id(&row.origin, &row.origin_name);
            let destination_id = place_id(&row.destination, &row.destination_name);

            let next = 1 + carrier_ids.len() as u64;
            let carrier_id = *carrier_ids.entry(row.carrier_code.clone()).or_insert(next);
            resp.carriers.insert(
                carrier_id,
                Carrier {
                    iata: Some(row.carrier_code.clone()),
                    name: Some(row.carrier_name.clone()),
                },
            );

            resp.itineraries.push(Itinerary {
                pricing_options: vec![PricingOption {
                    price: Some(FarePrice {
                        amount: Some(row.price),
                    }),
                    deeplink: Some(row.deeplink.clone()),
                }],
                legs: vec![ItineraryLeg {
                    origin_place_id: Some(origin_id),
                    destination_place_id: Some(destination_id),
                    departure_date_time: Some(row.departure.clone()),
                    arrival_date_time: Some(row.arrival.clone()),
                    duration_in_minutes: Some(row.duration),
                    stop_count: Some(row.stops),
                    marketing_carrier_ids: vec![carrier_id],
                }],
            });
        }

        resp
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl FareApi for TestFareApiQuery {
    async fn search_fares(
        &self,
        _api_key: &str,
        query: &FareQuery,
    ) -> Result<FareResponse, QueryError> {
        if let Some(status) = self.fail_status {
            return Err(QueryError::from_status(status, None));
        }
        Ok(self.to_response(query))
    }
}
