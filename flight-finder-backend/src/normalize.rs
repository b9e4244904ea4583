//! Reshaping of provider documents into the result types the UI consumes.
//!
//! Every transform assigns ids as `{carrier code}{position}`, where position is the index in the
//! provider's result array. Missing lookups degrade to empty strings rather than dropping an item.

use crate::fare_api::{FareResponse, Itinerary};
use crate::flight_api::{
    AviationEndpoint, AviationFlight, AviationLive, AviationRoute, AviationRouteEndpoint,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use flight_finder_shared::results::{
    Flight, FlightLeg, FlightRoute, FlightStatus, LiveTelemetry, PriceLeg, PriceResult, RouteLeg,
};

/// Delays strictly above this many minutes mark a flight as delayed
pub const DELAY_THRESHOLD_MINUTES: i64 = 15;

/// Map a provider status onto `FlightStatus`.
///
/// A delay over the threshold on either end wins over whatever the provider says. Unrecognized
/// provider values fall back to `Scheduled`.
pub fn map_status(
    provider_status: Option<&str>,
    departure_delay: Option<i64>,
    arrival_delay: Option<i64>,
) -> FlightStatus {
    let delayed = [departure_delay, arrival_delay]
        .iter()
        .flatten()
        .any(|d| *d > DELAY_THRESHOLD_MINUTES);
    if delayed {
        return FlightStatus::Delayed;
    }

    let Some(status) = provider_status else {
        return FlightStatus::Scheduled;
    };

    match status.to_ascii_lowercase().as_str() {
        "scheduled" => FlightStatus::Scheduled,
        "active" => FlightStatus::InFlight,
        "landed" => FlightStatus::Landed,
        "cancelled" => FlightStatus::Cancelled,
        "incident" | "diverted" => FlightStatus::Delayed,
        other => {
            tracing::warn!(status = other, "Unrecognized provider flight status, using scheduled");
            FlightStatus::Scheduled
        }
    }
}

pub fn timezone_label(name: &str) -> String {
    timezone_label_at(name, Utc::now())
}

/// `"<zone> (<abbreviation>)"` as of `at`, or the bare name if the zone is unknown
pub fn timezone_label_at(name: &str, at: DateTime<Utc>) -> String {
    match name.parse::<Tz>() {
        Ok(tz) => format!("{} ({})", name, at.with_timezone(&tz).format("%Z")),
        Err(_) => {
            if !name.is_empty() {
                tracing::debug!(zone = name, "Unknown timezone, leaving label unformatted");
            }
            name.to_string()
        }
    }
}

fn flight_leg(ep: AviationEndpoint) -> FlightLeg {
    FlightLeg {
        airport: ep.iata.unwrap_or_default(),
        airport_name: ep.airport.unwrap_or_default(),
        scheduled: ep.scheduled.unwrap_or_default(),
        timezone: ep
            .timezone
            .as_deref()
            .map(timezone_label)
            .unwrap_or_default(),
        terminal: ep.terminal,
        gate: ep.gate,
        delay: ep.delay,
    }
}

fn telemetry(live: AviationLive) -> Option<LiveTelemetry> {
    // Without a position there is nothing worth plotting
    Some(LiveTelemetry {
        latitude: live.latitude?,
        longitude: live.longitude?,
        altitude: live.altitude.unwrap_or_default(),
        speed: live.speed_horizontal.unwrap_or_default(),
        updated: live.updated.unwrap_or_default(),
    })
}

fn transform_flight(idx: usize, flight: AviationFlight) -> Flight {
    let airline = flight.airline.unwrap_or_default();
    let number = flight.flight.unwrap_or_default();
    let departure = flight.departure.unwrap_or_default();
    let arrival = flight.arrival.unwrap_or_default();

    let status = map_status(
        flight.flight_status.as_deref(),
        departure.delay,
        arrival.delay,
    );

    let carrier = airline.iata.unwrap_or_default();
    let flight_number = number
        .iata
        .unwrap_or_else(|| format!("{}{}", carrier, number.number.unwrap_or_default()));

    Flight {
        id: format!("{}{}", carrier, idx),
        flight_number,
        airline: airline.name.unwrap_or_default(),
        departure: flight_leg(departure),
        arrival: flight_leg(arrival),
        status,
        live: flight.live.and_then(telemetry),
    }
}

pub fn transform_flights(flights: Vec<AviationFlight>) -> Vec<Flight> {
    flights
        .into_iter()
        .enumerate()
        .map(|(idx, f)| transform_flight(idx, f))
        .collect()
}

fn route_leg(ep: AviationRouteEndpoint) -> RouteLeg {
    RouteLeg {
        airport: ep.iata.unwrap_or_default(),
        airport_name: ep.airport.unwrap_or_default(),
        time: ep.time.unwrap_or_default(),
        timezone: ep.timezone.unwrap_or_default(),
        terminal: ep.terminal,
    }
}

pub fn transform_routes(routes: Vec<AviationRoute>) -> Vec<FlightRoute> {
    routes
        .into_iter()
        .enumerate()
        .map(|(idx, route)| {
            let airline = route.airline.unwrap_or_default();
            let number = route.flight.unwrap_or_default();
            let carrier = airline.iata.unwrap_or_default();

            FlightRoute {
                id: format!("{}{}", carrier, idx),
                flight_number: number
                    .iata
                    .unwrap_or_else(|| format!("{}{}", carrier, number.number.unwrap_or_default())),
                airline: airline.name.unwrap_or_default(),
                airline_code: carrier,
                departure: route_leg(route.departure.unwrap_or_default()),
                arrival: route_leg(route.arrival.unwrap_or_default()),
            }
        })
        .collect()
}

/// Relative provider links are made absolute against `booking_domain`
pub fn booking_url(link: Option<&str>, booking_domain: &str) -> String {
    match link.map(str::trim) {
        None | Some("") => String::new(),
        Some(l) if l.starts_with("http://") || l.starts_with("https://") => l.to_string(),
        Some(l) => format!(
            "{}/{}",
            booking_domain.trim_end_matches('/'),
            l.trim_start_matches('/')
        ),
    }
}

fn transform_itinerary(
    idx: usize,
    itinerary: &Itinerary,
    resp: &FareResponse,
    currency: &str,
    booking_domain: &str,
) -> Option<PriceResult> {
    // Only the first pricing option and the first leg are considered
    let Some(option) = itinerary.pricing_options.first() else {
        tracing::debug!(idx, "Itinerary without pricing options, skipping");
        return None;
    };
    let Some(amount) = option.amount() else {
        tracing::debug!(idx, "Itinerary without a usable price, skipping");
        return None;
    };
    let leg = itinerary.legs.first();

    let place_leg = |place_id: Option<u64>, time: Option<&String>| {
        let place = place_id.and_then(|id| resp.places.get(&id));
        PriceLeg {
            airport: place.and_then(|p| p.iata.clone()).unwrap_or_default(),
            airport_name: place.and_then(|p| p.name.clone()).unwrap_or_default(),
            time: time.cloned().unwrap_or_default(),
        }
    };

    let carrier = leg
        .and_then(|l| l.marketing_carrier_ids.first())
        .and_then(|id| resp.carriers.get(id));
    let carrier_code = carrier.and_then(|c| c.iata.clone()).unwrap_or_default();

    Some(PriceResult {
        id: format!("{}{}", carrier_code, idx),
        price: amount,
        currency: currency.to_string(),
        airline: carrier.and_then(|c| c.name.clone()).unwrap_or_default(),
        airline_code: carrier_code,
        departure: place_leg(
            leg.and_then(|l| l.origin_place_id),
            leg.and_then(|l| l.departure_date_time.as_ref()),
        ),
        arrival: place_leg(
            leg.and_then(|l| l.destination_place_id),
            leg.and_then(|l| l.arrival_date_time.as_ref()),
        ),
        duration_minutes: leg.and_then(|l| l.duration_in_minutes).unwrap_or_default(),
        stops: leg.and_then(|l| l.stop_count).unwrap_or_default(),
        booking_url: booking_url(option.deeplink.as_deref(), booking_domain),
    })
}

/// Flatten a fare document into price results, cheapest first.
///
/// The sort is stable so equal prices keep the provider's order.
pub fn transform_prices(
    resp: &FareResponse,
    currency: &str,
    booking_domain: &str,
) -> Vec<PriceResult> {
    let mut prices: Vec<PriceResult> = resp
        .itineraries
        .iter()
        .enumerate()
        .filter_map(|(idx, it)| transform_itinerary(idx, it, resp, currency, booking_domain))
        .collect();

    prices.sort_by(|a, b| a.price.total_cmp(&b.price));
    prices
}
