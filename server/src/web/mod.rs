use crate::cli_error::CliError;
use crate::data_store::{get_store_from_env, BookingStore};
use crate::setup::{
    get_listen_address_from_env, get_listen_port_from_env, get_secret_from_env,
    get_session_max_age_from_env, get_time_zone_from_env,
};
use actix_web::{middleware, web, App, HttpServer};
use log::info;
use std::sync::Arc;

mod http_error_logging;
pub(crate) mod ui;

pub fn serve() -> Result<(), CliError> {
    let state = AppState::new()?;
    let listen_address = get_listen_address_from_env()?;
    let listen_port = get_listen_port_from_env()?;
    info!("Starting web server at {}:{}", listen_address, listen_port);
    actix_web::rt::System::new()
        .block_on(
            HttpServer::new(move || {
                App::new()
                    .configure(ui::configure_app)
                    .app_data(web::Data::new(state.clone()))
                    .wrap(middleware::Compress::default())
            })
            .bind((listen_address, listen_port))
            .map_err(CliError::BindError)?
            .run(),
        )
        .map_err(CliError::ServerError)
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn BookingStore>,
    /// Secret for signing the session tokens
    secret: String,
    /// Time zone for displaying event dates and interpreting date inputs
    time_zone: chrono_tz::Tz,
    session_max_age: chrono::TimeDelta,
}

impl AppState {
    pub fn new() -> Result<Self, CliError> {
        Ok(Self {
            store: Arc::new(get_store_from_env()?),
            secret: get_secret_from_env()?,
            time_zone: get_time_zone_from_env()?,
            session_max_age: get_session_max_age_from_env()?,
        })
    }
}
