//! Main web app module containing the API routes.
//!
//! Each handler checks its provider key first, then validates input, and only then calls out.

use actix_web::{get, web, HttpResponse, Responder};
use flight_finder_shared::results::{
    PriceMeta, PricesResponse, RouteSet, RoutesResponse, SearchResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::fare_api::FareQuery;
use crate::normalize::{transform_flights, transform_prices, transform_routes};
use crate::query::classify;
use crate::settings::{FARE_KEY_VAR, FLIGHT_STATUS_KEY_VAR};
use crate::state::AppState;
use crate::validation::{self, present, require_all};

#[derive(Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    date: Option<String>,
}

#[derive(Deserialize)]
pub struct PriceParams {
    from: Option<String>,
    to: Option<String>,
    date: Option<String>,
    adults: Option<String>,
    currency: Option<String>,
}

#[derive(Deserialize)]
pub struct RoutesParams {
    origin: Option<String>,
    destination: Option<String>,
    #[serde(rename = "departureDate")]
    departure_date: Option<String>,
    #[serde(rename = "returnDate")]
    return_date: Option<String>,
}

/// Register the API routes on an app or scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(search)
        .service(prices)
        .service(routes);
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Free-text flight search by flight number, departure airport or airline
#[get("/api/search")]
pub async fn search(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse, ApiError> {
    let key = state.api_key(FLIGHT_STATUS_KEY_VAR)?;

    let q = present(&params.q);
    require_all(&[("q", q)])?;
    let q = q.unwrap_or_default();
    let date = present(&params.date)
        .map(|d| validation::date("date", d))
        .transpose()?;

    let lookup = classify(q);
    let flights = state
        .flight_status
        .get_flights(&key, &lookup, date.as_deref())
        .await?;
    let flights = transform_flights(flights);

    tracing::info!(query = q, results = flights.len(), "Flight search complete");
    Ok(HttpResponse::Ok().json(SearchResponse { flights }))
}

/// Price comparison for one route on one day, cheapest first
#[get("/api/prices")]
pub async fn prices(
    state: web::Data<AppState>,
    params: web::Query<PriceParams>,
) -> Result<HttpResponse, ApiError> {
    let key = state.api_key(FARE_KEY_VAR)?;

    let (from, to, date) = (
        present(&params.from),
        present(&params.to),
        present(&params.date),
    );
    require_all(&[("from", from), ("to", to), ("date", date)])?;

    let query = FareQuery {
        from: validation::airport_code("from", from.unwrap_or_default())?,
        to: validation::airport_code("to", to.unwrap_or_default())?,
        date: validation::date("date", date.unwrap_or_default())?,
        adults: validation::adults(present(&params.adults))?,
        currency: validation::currency(present(&params.currency))?,
    };

    let resp = state.fares.search_fares(&key, &query).await?;
    let prices = transform_prices(&resp, &query.currency, &state.booking_domain);

    tracing::info!(
        from = %query.from,
        to = %query.to,
        results = prices.len(),
        "Price search complete"
    );
    Ok(HttpResponse::Ok().json(PricesResponse {
        meta: PriceMeta {
            total: prices.len(),
            currency: query.currency,
            from: query.from,
            to: query.to,
            date: query.date,
            adults: query.adults,
        },
        prices,
    }))
}

/// Scheduled routes between two airports, with the reverse direction when a return date is given.
///
/// The provider's route lookup is a standing timetable and takes no date, so `departureDate` and
/// `returnDate` are validated and echoed back in each `RouteSet` but never sent upstream.
#[get("/api/routes")]
pub async fn routes(
    state: web::Data<AppState>,
    params: web::Query<RoutesParams>,
) -> Result<HttpResponse, ApiError> {
    let key = state.api_key(FLIGHT_STATUS_KEY_VAR)?;

    let (origin, destination) = (present(&params.origin), present(&params.destination));
    require_all(&[("origin", origin), ("destination", destination)])?;
    let origin = validation::airport_code("origin", origin.unwrap_or_default())?;
    let destination = validation::airport_code("destination", destination.unwrap_or_default())?;
    let departure_date = present(&params.departure_date)
        .map(|d| validation::date("departureDate", d))
        .transpose()?;
    let return_date = present(&params.return_date)
        .map(|d| validation::date("returnDate", d))
        .transpose()?;

    let api = &state.flight_status;
    let (outbound, inbound) = match &return_date {
        Some(_) => {
            let (outbound, inbound) = tokio::try_join!(
                api.get_routes(&key, &origin, &destination),
                api.get_routes(&key, &destination, &origin),
            )?;
            (outbound, Some(inbound))
        }
        None => (api.get_routes(&key, &origin, &destination).await?, None),
    };

    let return_routes = inbound.map(|inbound| RouteSet {
        origin: destination.clone(),
        destination: origin.clone(),
        date: return_date.clone(),
        routes: transform_routes(inbound),
    });

    Ok(HttpResponse::Ok().json(RoutesResponse {
        outbound: RouteSet {
            origin,
            destination,
            date: departure_date,
            routes: transform_routes(outbound),
        },
        return_routes,
    }))
}

#[cfg(test)]
mod web_app_tests {
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::Value;

    use super::configure;
    use crate::fare_api::TestFareApiQuery;
    use crate::flight_api::fixtures::{FLIGHTS, ROUTES};
    use crate::flight_api::TestFlightStatusApi;
    use crate::settings::{StaticKeys, FARE_KEY_VAR, FLIGHT_STATUS_KEY_VAR};
    use crate::state::AppState;

    fn all_keys() -> StaticKeys {
        StaticKeys(vec![
            (FLIGHT_STATUS_KEY_VAR, "status-key"),
            (FARE_KEY_VAR, "fare-key"),
        ])
    }

    fn app_state(
        flight_status: Arc<TestFlightStatusApi>,
        fares: TestFareApiQuery,
        keys: StaticKeys,
    ) -> web::Data<AppState> {
        web::Data::new(AppState {
            flight_status,
            fares: Arc::new(fares),
            keys: Arc::new(keys),
            booking_domain: "https://www.skyscanner.net".to_string(),
        })
    }

    fn default_state() -> (Arc<TestFlightStatusApi>, web::Data<AppState>) {
        let status_api = Arc::new(TestFlightStatusApi::new(FLIGHTS, ROUTES));
        let state = app_state(status_api.clone(), TestFareApiQuery::new(), all_keys());
        (status_api, state)
    }

    async fn get(state: web::Data<AppState>, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn test_health() {
        let (_, state) = default_state();
        let (status, body) = get(state, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[actix_web::test]
    async fn test_search_by_flight_number() {
        let (status_api, state) = default_state();
        let (status, body) = get(state, "/api/search?q=aa100&date=2024-05-01").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            status_api.recorded(),
            vec!["flights flight_iata=AA100 flight_date=2024-05-01"]
        );

        let flights = body["flights"].as_array().unwrap();
        assert_eq!(flights.len(), 2);
        assert_eq!(flights[0]["id"], "AA0");
        assert_eq!(flights[0]["status"], "delayed");
        assert_eq!(flights[1]["status"], "cancelled");
    }

    #[actix_web::test]
    async fn test_search_classifies_airport_and_airline() {
        let (status_api, state) = default_state();
        get(state.clone(), "/api/search?q=JFK").await;
        get(state, "/api/search?q=UA").await;

        assert_eq!(
            status_api.recorded(),
            vec!["flights dep_iata=JFK", "flights airline_iata=UA"]
        );
    }

    #[actix_web::test]
    async fn test_search_requires_query() {
        let (status_api, state) = default_state();
        let (status, body) = get(state, "/api/search?q=%20%20").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required parameters: q");
        assert!(status_api.recorded().is_empty());
    }

    #[actix_web::test]
    async fn test_search_rejects_bad_date() {
        let (status_api, state) = default_state();
        let (status, body) = get(state, "/api/search?q=AA100&date=05/01/2024").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("YYYY-MM-DD"));
        assert!(status_api.recorded().is_empty());
    }

    #[actix_web::test]
    async fn test_search_without_key() {
        let status_api = Arc::new(TestFlightStatusApi::new(FLIGHTS, ROUTES));
        let state = app_state(
            status_api.clone(),
            TestFareApiQuery::new(),
            StaticKeys(vec![(FARE_KEY_VAR, "fare-key")]),
        );
        let (status, body) = get(state, "/api/search?q=AA100").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            "Server configuration error: AVIATIONSTACK_API_KEY is not set"
        );
        assert!(status_api.recorded().is_empty());
    }

    #[actix_web::test]
    async fn test_search_upstream_errors_pass_through() {
        for (upstream, expected) in [
            (401, StatusCode::UNAUTHORIZED),
            (429, StatusCode::TOO_MANY_REQUESTS),
            (500, StatusCode::INTERNAL_SERVER_ERROR),
        ] {
            let state = app_state(
                Arc::new(TestFlightStatusApi::failing(upstream)),
                TestFareApiQuery::new(),
                all_keys(),
            );
            let (status, body) = get(state, "/api/search?q=AA100").await;

            assert_eq!(status, expected);
            assert!(body["error"].is_string());
        }
    }

    #[actix_web::test]
    async fn test_search_error_in_provider_body() {
        let state = app_state(
            Arc::new(TestFlightStatusApi::new(
                crate::flight_api::fixtures::BODY_ERROR,
                ROUTES,
            )),
            TestFareApiQuery::new(),
            all_keys(),
        );
        let (status, body) = get(state, "/api/search?q=AA100").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("subscription plan"));
    }

    #[actix_web::test]
    async fn test_prices_sorted_with_meta() {
        let (_, state) = default_state();
        let (status, body) = get(state, "/api/prices?from=JFK&to=LAX&date=2024-05-01").await;

        assert_eq!(status, StatusCode::OK);

        let prices = body["prices"].as_array().unwrap();
        let ids: Vec<&str> = prices.iter().map(|p| p["id"].as_str().unwrap()).collect();
        // Delta and JetBlue tie on price and keep the provider's order
        assert_eq!(ids, vec!["DL1", "B62", "AA0", "UA3"]);
        assert_eq!(prices[0]["bookingUrl"], "https://www.delta.com/book?fare=dl2301");
        assert_eq!(
            prices[1]["bookingUrl"],
            "https://www.skyscanner.net/transport/flights/jfk/lax/b6423"
        );
        assert_eq!(prices[1]["stops"], 0);
        assert_eq!(prices[0]["departure"]["airport"], "JFK");

        assert_eq!(body["meta"]["total"], 4);
        assert_eq!(body["meta"]["currency"], "USD");
        assert_eq!(body["meta"]["adults"], 1);
    }

    #[actix_web::test]
    async fn test_prices_missing_params() {
        let (_, state) = default_state();
        let (status, body) = get(state, "/api/prices?from=JFK").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required parameters: to, date");
    }

    #[actix_web::test]
    async fn test_prices_malformed_airport() {
        let (_, state) = default_state();
        let (status, body) = get(state, "/api/prices?from=XX1&to=LAX&date=2024-05-01").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("'from'"));
    }

    #[actix_web::test]
    async fn test_prices_without_key_ignores_input() {
        let state = app_state(
            Arc::new(TestFlightStatusApi::new(FLIGHTS, ROUTES)),
            TestFareApiQuery::new(),
            StaticKeys(vec![(FLIGHT_STATUS_KEY_VAR, "status-key")]),
        );
        let (status, body) = get(state, "/api/prices?from=XX1").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            "Server configuration error: SKYSCANNER_API_KEY is not set"
        );
    }

    #[actix_web::test]
    async fn test_prices_rate_limited() {
        let state = app_state(
            Arc::new(TestFlightStatusApi::new(FLIGHTS, ROUTES)),
            TestFareApiQuery::failing(429),
            all_keys(),
        );
        let (status, body) = get(state, "/api/prices?from=JFK&to=LAX&date=2024-05-01").await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "Rate limit exceeded. Please try again later.");
    }

    #[actix_web::test]
    async fn test_routes_one_way() {
        let (status_api, state) = default_state();
        let (status, body) =
            get(state, "/api/routes?origin=JFK&destination=LAX&departureDate=2024-05-01").await;

        assert_eq!(status, StatusCode::OK);
        // The date is echoed, not forwarded
        assert_eq!(status_api.recorded(), vec!["routes JFK-LAX"]);
        assert_eq!(body["outbound"]["date"], "2024-05-01");
        assert_eq!(body["outbound"]["routes"][0]["flightNumber"], "AA100");
        assert_eq!(body["outbound"]["routes"].as_array().unwrap().len(), 1);
        assert!(body["return"].is_null());
    }

    #[actix_web::test]
    async fn test_routes_with_return() {
        let (status_api, state) = default_state();
        let (status, body) = get(
            state,
            "/api/routes?origin=JFK&destination=LAX&returnDate=2024-05-08",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let mut calls = status_api.recorded();
        calls.sort();
        assert_eq!(calls, vec!["routes JFK-LAX", "routes LAX-JFK"]);

        assert!(body["outbound"]["date"].is_null());
        assert_eq!(body["return"]["origin"], "LAX");
        assert_eq!(body["return"]["date"], "2024-05-08");
        assert_eq!(body["return"]["routes"][0]["flightNumber"], "AA101");
    }

    #[actix_web::test]
    async fn test_routes_validation() {
        let (status_api, state) = default_state();
        let (status, body) = get(state.clone(), "/api/routes?origin=JFK").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required parameters: destination");

        let (status, _) = get(state, "/api/routes?origin=JFK&destination=LAX&returnDate=next-week").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(status_api.recorded().is_empty());
    }
}
