pub mod results {
    use serde::{Deserialize, Serialize};

    /// Normalized flight status. Provider vocabularies are mapped onto this set by the backend.
    #[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
    #[serde(rename_all = "kebab-case")]
    pub enum FlightStatus {
        Scheduled,
        Boarding,
        Departed,
        InFlight,
        Landed,
        Delayed,
        Cancelled,
    }

    impl FlightStatus {
        /// Human readable label used by the UI
        pub fn label(&self) -> &'static str {
            match self {
                FlightStatus::Scheduled => "Scheduled",
                FlightStatus::Boarding => "Boarding",
                FlightStatus::Departed => "Departed",
                FlightStatus::InFlight => "In flight",
                FlightStatus::Landed => "Landed",
                FlightStatus::Delayed => "Delayed",
                FlightStatus::Cancelled => "Cancelled",
            }
        }
    }

    /// One end of a flight, as shown in search results
    #[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct FlightLeg {
        pub airport: String,
        pub airport_name: String,
        pub scheduled: String,
        /// Zone name with its abbreviation, e.g. `America/New_York (EDT)`
        pub timezone: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub terminal: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub gate: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub delay: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
    pub struct LiveTelemetry {
        pub latitude: f64,
        pub longitude: f64,
        pub altitude: f64,
        pub speed: f64,
        pub updated: String,
    }

    /// Represents a single flight returned by the search endpoint.
    ///
    /// `id` is `{airline code}{position}` within one response and is not stable across requests.
    #[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct Flight {
        pub id: String,
        pub flight_number: String,
        pub airline: String,
        pub departure: FlightLeg,
        pub arrival: FlightLeg,
        pub status: FlightStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub live: Option<LiveTelemetry>,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct PriceLeg {
        pub airport: String,
        pub airport_name: String,
        pub time: String,
    }

    /// A single fare quote for a route, as returned by the pricing endpoint
    #[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct PriceResult {
        pub id: String,
        pub price: f64,
        pub currency: String,
        pub airline: String,
        pub airline_code: String,
        pub departure: PriceLeg,
        pub arrival: PriceLeg,
        pub duration_minutes: u32,
        pub stops: u32,
        pub booking_url: String,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct RouteLeg {
        pub airport: String,
        pub airport_name: String,
        pub time: String,
        pub timezone: String,
        #[serde(default)]
        pub terminal: Option<String>,
    }

    /// A regularly scheduled flight between two airports
    #[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct FlightRoute {
        pub id: String,
        pub flight_number: String,
        pub airline: String,
        pub airline_code: String,
        pub departure: RouteLeg,
        pub arrival: RouteLeg,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
    pub struct SearchResponse {
        pub flights: Vec<Flight>,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
    pub struct PriceMeta {
        pub total: usize,
        pub currency: String,
        pub from: String,
        pub to: String,
        pub date: String,
        pub adults: u8,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
    pub struct PricesResponse {
        pub prices: Vec<PriceResult>,
        pub meta: PriceMeta,
    }

    /// Routes found for one direction of a trip
    #[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
    pub struct RouteSet {
        pub origin: String,
        pub destination: String,
        pub date: Option<String>,
        pub routes: Vec<FlightRoute>,
    }

    #[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
    pub struct RoutesResponse {
        pub outbound: RouteSet,
        #[serde(rename = "return")]
        pub return_routes: Option<RouteSet>,
    }

    /// Body of every non-success response from the backend
    #[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
    pub struct ErrorResponse {
        pub error: String,
    }
}

#[cfg(test)]
mod tests {
    use crate::results::{
        Flight, FlightLeg, FlightStatus, RouteSet, RoutesResponse, SearchResponse,
    };
    use serde_json::json;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(FlightStatus::InFlight).unwrap(),
            json!("in-flight")
        );
        assert_eq!(
            serde_json::to_value(FlightStatus::Cancelled).unwrap(),
            json!("cancelled")
        );
        let parsed: FlightStatus = serde_json::from_value(json!("delayed")).unwrap();
        assert_eq!(parsed, FlightStatus::Delayed);
    }

    #[test]
    fn test_flight_field_names() {
        let flight = Flight {
            id: "AA0".to_string(),
            flight_number: "AA100".to_string(),
            airline: "American Airlines".to_string(),
            departure: FlightLeg {
                airport: "JFK".to_string(),
                airport_name: "John F Kennedy International".to_string(),
                scheduled: "2024-05-01T08:00:00+00:00".to_string(),
                timezone: "America/New_York (EDT)".to_string(),
                ..Default::default()
            },
            arrival: FlightLeg::default(),
            status: FlightStatus::Scheduled,
            live: None,
        };

        let value = serde_json::to_value(SearchResponse {
            flights: vec![flight.clone()],
        })
        .unwrap();

        let first = &value["flights"][0];
        assert_eq!(first["flightNumber"], json!("AA100"));
        assert_eq!(first["departure"]["airportName"], json!("John F Kennedy International"));
        assert!(first.get("live").is_none());
        assert!(first["departure"].get("terminal").is_none());

        let back: SearchResponse = serde_json::from_value(value).unwrap();
        assert_eq!(back.flights[0], flight);
    }

    #[test]
    fn test_missing_return_serializes_as_null() {
        let resp = RoutesResponse {
            outbound: RouteSet {
                origin: "JFK".to_string(),
                destination: "LAX".to_string(),
                date: None,
                routes: vec![],
            },
            return_routes: None,
        };

        let value = serde_json::to_value(resp).unwrap();
        assert_eq!(value["return"], serde_json::Value::Null);
        assert_eq!(value["outbound"]["origin"], json!("JFK"));
    }
}
