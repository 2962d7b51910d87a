use crate::{
    backend::BookingBackend, configuration::Configuration,
    configuration_handler::ConfigurationHandler, form_controller::FormController,
    http::create_app, key_value_store::{FileKeyValueStore, InMemoryKeyValueStore},
    local_bookings::LocalBookings,
};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod backend;
mod booking_repository;
mod configuration;
mod configuration_handler;
mod conflict;
mod errors;
mod form_controller;
mod http;
mod key_value_store;
mod local_bookings;
#[cfg(test)]
mod testutils;
mod types;
mod view;

#[derive(Clone)]
struct AppState<T: BookingBackend, C: Configuration> {
    controller: FormController<T, C>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("####################");
    println!("# Resource Booking #");
    println!("####################");

    let configuration = ConfigurationHandler::parse_arguments();

    let address = format!("0.0.0.0:{}", configuration.port());
    println!("Accessable at:\n{}", address.clone());
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(?err, %address, "Failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    let app = if let Some(storage_path) = configuration.storage_path() {
        match FileKeyValueStore::open(&storage_path) {
            Ok(store) => {
                info!(path = %storage_path.display(), "Storing bookings on disk");
                create_app(LocalBookings::new(store), configuration)
            }
            Err(err) => {
                error!(?err, path = %storage_path.display(), "Failed to open booking storage");
                return ExitCode::FAILURE;
            }
        }
    } else {
        warn!("No storage path configured. Bookings are kept in memory only.");
        create_app(LocalBookings::new(InMemoryKeyValueStore::default()), configuration)
    };

    if let Err(err) = axum::serve(listener, app).await {
        error!(?err, "Server stopped unexpectedly");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
