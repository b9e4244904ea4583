//! Classification of free-text search input into a flight-status lookup.

/// Which provider field a search query is matched against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlightLookup {
    FlightNumber(String),
    DepartureAirport(String),
    Airline(String),
}

impl FlightLookup {
    /// Query parameter name and value understood by the flight-status provider
    pub fn provider_param(&self) -> (&'static str, &str) {
        match self {
            FlightLookup::FlightNumber(v) => ("flight_iata", v),
            FlightLookup::DepartureAirport(v) => ("dep_iata", v),
            FlightLookup::Airline(v) => ("airline_iata", v),
        }
    }
}

/// Two letters followed by at least one digit, e.g. `AA100`
fn is_flight_number(q: &str) -> bool {
    let bytes = q.as_bytes();
    bytes.len() > 2
        && bytes[..2].iter().all(u8::is_ascii_uppercase)
        && bytes[2..].iter().all(u8::is_ascii_digit)
}

pub fn is_airport_code(q: &str) -> bool {
    q.len() == 3 && q.bytes().all(|b| b.is_ascii_uppercase())
}

/// Classify a search query. Never fails: anything unrecognized is looked up as a flight number
/// and the provider decides whether it matches anything.
pub fn classify(raw: &str) -> FlightLookup {
    let q = raw.trim().to_uppercase();

    if is_flight_number(&q) {
        FlightLookup::FlightNumber(q)
    } else if is_airport_code(&q) {
        FlightLookup::DepartureAirport(q)
    } else if q.chars().count() == 2 {
        FlightLookup::Airline(q)
    } else {
        FlightLookup::FlightNumber(q)
    }
}
