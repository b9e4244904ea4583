//! Backend crate for the flight finder web app.
//!
//! Uses actix to serve the search UI and three thin API routes that forward to flight-status and
//! fare providers, normalizing what comes back.

pub mod error;
pub mod fare_api;
pub mod flight_api;
pub mod normalize;
pub mod query;
pub mod settings;
pub mod state;
pub mod validation;
pub mod web_app;

use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flight_finder_backend=info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = settings::Settings::load()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let state = web::Data::new(state::AppState::from_settings(&settings));
    let static_dir = settings.server.static_dir.clone();

    tracing::info!(
        "Starting flight finder on {}:{}",
        settings.server.host,
        settings.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(web_app::configure)
            .service(actix_files::Files::new("/", &static_dir).index_file("index.html"))
    })
    .bind((settings.server.host.as_str(), settings.server.port))?
    .run()
    .await
}
