use flight_finder_shared::results::{ErrorResponse, Flight, FlightLeg, FlightStatus, SearchResponse};
use log::{info, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{HtmlInputElement, Request, RequestInit, RequestMode, Response};
use yew::prelude::*;

/// What the results area is currently showing
#[derive(Clone, PartialEq)]
enum SearchState {
    Idle,
    Loading,
    Loaded(Vec<Flight>),
    Failed(String),
}

#[derive(Properties, PartialEq)]
struct ButtonProps {
    text: String,
    on_click: Callback<()>,
    disabled: bool,
}

#[derive(Properties, PartialEq)]
struct ResultsProps {
    state: SearchState,
}

#[derive(Properties, PartialEq)]
struct FlightCardProps {
    flight: Flight,
}

#[derive(Properties, PartialEq)]
struct LegProps {
    title: String,
    leg: FlightLeg,
}

fn js_error(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

async fn fetch_flights(query: &str) -> Result<Vec<Flight>, String> {
    let url = format!(
        "/api/search?q={}",
        String::from(js_sys::encode_uri_component(query))
    );

    let mut opts = RequestInit::new();
    opts.method("GET");
    opts.mode(RequestMode::SameOrigin);
    let request = Request::new_with_str_and_init(&url, &opts).map_err(js_error)?;

    let window = web_sys::window().ok_or("Can't find window")?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|_| "Could not reach the server. Please try again.".to_string())?;
    let resp: Response = resp_value.dyn_into().map_err(js_error)?;
    let text = JsFuture::from(resp.text().map_err(js_error)?)
        .await
        .map_err(js_error)?
        .as_string()
        .unwrap_or_default();

    if resp.ok() {
        serde_json::from_str::<SearchResponse>(&text)
            .map(|r| r.flights)
            .map_err(|e| format!("Unexpected response from server: {}", e))
    } else {
        Err(serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.error)
            .unwrap_or_else(|_| format!("Request failed with status {}", resp.status())))
    }
}

fn status_badge_class(status: FlightStatus) -> &'static str {
    match status {
        FlightStatus::Scheduled => "badge text-bg-secondary",
        FlightStatus::Boarding | FlightStatus::Departed => "badge text-bg-info",
        FlightStatus::InFlight => "badge text-bg-primary",
        FlightStatus::Landed => "badge text-bg-success",
        FlightStatus::Delayed => "badge text-bg-warning",
        FlightStatus::Cancelled => "badge text-bg-danger",
    }
}

#[function_component(Button)]
fn button(
    ButtonProps {
        text,
        on_click,
        disabled,
    }: &ButtonProps,
) -> Html {
    let on_click_fn = {
        let on_click = on_click.clone();
        Callback::from(move |_| on_click.emit(()))
    };

    html! {
        <button type={"button"} onclick={on_click_fn} disabled={*disabled} class={"btn btn-primary ms-2"}>{ text.clone() }</button>
    }
}

#[function_component(LegView)]
fn leg_view(LegProps { title, leg }: &LegProps) -> Html {
    html! {
        <div class="col">
            <div class="text-body-secondary small">{ title.clone() }</div>
            <div class="fs-4 fw-semibold">{ leg.airport.clone() }</div>
            <div>{ leg.airport_name.clone() }</div>
            <div class="small">{ leg.scheduled.clone() }</div>
            <div class="small text-body-secondary">{ leg.timezone.clone() }</div>
            if let Some(terminal) = &leg.terminal {
                <div class="small">{ format!("Terminal {}", terminal) }</div>
            }
        </div>
    }
}

#[function_component(FlightCard)]
fn flight_card(FlightCardProps { flight }: &FlightCardProps) -> Html {
    html! {
        <div class="card my-2">
            <div class="card-body">
                <div class="d-flex justify-content-between align-items-center mb-2">
                    <div>
                        <span class="fs-5 fw-bold me-2">{ flight.flight_number.clone() }</span>
                        <span class="text-body-secondary">{ flight.airline.clone() }</span>
                    </div>
                    <span class={ status_badge_class(flight.status) }>{ flight.status.label() }</span>
                </div>
                <div class="row">
                    <LegView title={ "Departure" } leg={ flight.departure.clone() } />
                    <LegView title={ "Arrival" } leg={ flight.arrival.clone() } />
                </div>
                if let Some(live) = &flight.live {
                    <div class="small text-body-secondary mt-2">
                        { format!(
                            "Live: {:.2}, {:.2} at {:.0} m, {:.0} km/h (updated {})",
                            live.latitude, live.longitude, live.altitude, live.speed, live.updated
                        ) }
                    </div>
                }
            </div>
        </div>
    }
}

#[function_component(Results)]
fn results(ResultsProps { state }: &ResultsProps) -> Html {
    match state {
        SearchState::Idle => html! {
            <p class="text-body-secondary">{ "Search by flight number (AA100), airport (JFK) or airline (UA)." }</p>
        },
        SearchState::Loading => html! {
            <div class="d-flex align-items-center">
                <div class="spinner-border spinner-border-sm me-2" role="status"></div>
                <span>{ "Searching flights..." }</span>
            </div>
        },
        SearchState::Failed(msg) => html! {
            <div class="alert alert-danger" role="alert">{ msg.clone() }</div>
        },
        SearchState::Loaded(flights) if flights.is_empty() => html! {
            <div class="alert alert-secondary" role="status">{ "No flights found." }</div>
        },
        SearchState::Loaded(flights) => flights
            .iter()
            .map(|flight| html! { <FlightCard key={ flight.id.clone() } flight={ flight.clone() } /> })
            .collect::<Html>(),
    }
}

#[function_component(App)]
fn app() -> Html {
    let input_ref = use_node_ref();
    let state = use_state(|| SearchState::Idle);

    let on_search = {
        let input_ref = input_ref.clone();
        let state = state.clone();
        Callback::from(move |_: ()| {
            let Some(input) = input_ref.cast::<HtmlInputElement>() else {
                return;
            };
            let query = input.value().trim().to_string();
            if query.is_empty() {
                return;
            }

            state.set(SearchState::Loading);
            let state = state.clone();
            spawn_local(async move {
                info!("Searching flights for {}", query);
                match fetch_flights(&query).await {
                    Ok(flights) => state.set(SearchState::Loaded(flights)),
                    Err(msg) => {
                        warn!("Flight search failed: {}", msg);
                        state.set(SearchState::Failed(msg))
                    }
                }
            });
        })
    };

    let onsubmit = {
        let on_search = on_search.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            on_search.emit(());
        })
    };

    let loading = *state == SearchState::Loading;

    html! {
        <main class="container my-4">
            <h1 class="mb-3">{ "Flight Finder" }</h1>
            <form class="d-flex mb-4" onsubmit={onsubmit}>
                <input type={"text"} ref={input_ref} class={"form-control"} placeholder={"Flight number, airport or airline code"} aria-label={"Search"} />
                <Button text={"Search"} on_click={on_search} disabled={loading} />
            </form>
            <Results state={ (*state).clone() } />
        </main>
    }
}

fn main() {
    let window = web_sys::window().expect("Can't find window");
    let document = window.document().expect("Can't find document in window");
    let root = document
        .get_element_by_id("flight-finder")
        .expect("Can't find flight-finder");

    wasm_logger::init(wasm_logger::Config::default());

    yew::Renderer::<App>::with_root(root).render();
}
