use crate::web::http_error_logging::error_logging_middleware;
use crate::web::ui::error::AppError;
use crate::web::ui::error_page::error_page_middleware;
use crate::web::ui::flash::flash_middleware;
use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::middleware::from_fn;
use actix_web::{get, web, HttpResponse, Responder};
use endpoints::*;
use rust_embed::Embed;

mod askama_filters;
mod base_template;
mod endpoints;
pub mod error;
mod error_page;
mod flash;
pub(crate) mod form_values;
mod util;
pub(crate) mod validation;


pub fn configure_app(cfg: &mut web::ServiceConfig) {
    // The error page middleware drops the original error. Thus, the logging middleware must be
    // placed inside of it. The flash middleware must be outside, for persisting the flash messages
    // added by the error page middleware.
    cfg.service(
        get_ui_service()
            .wrap(from_fn(error_logging_middleware))
            .wrap(from_fn(error_page_middleware))
            .wrap(from_fn(flash_middleware)),
    );
}

fn get_ui_service() -> actix_web::Scope {
    web::scope("")
        .service(static_resources)
        .service(index::index)
        .service(auth::login_form)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::registration_form)
        .service(auth::register)
        .service(rooms_list::rooms_list)
        .service(new_room::new_room_form)
        .service(new_room::new_room)
        .service(delete_room::delete_room)
        .service(new_event::new_event_form)
        .service(new_event::new_event)
        .service(cancel_event::cancel_event)
        .service(event_details::event_details)
        .service(booking::book_event)
        .service(booking::cancel_booking)
        .service(profile::profile)
        .default_service(web::to(not_found_handler))
}

#[derive(Embed)]
#[folder = "static/"]
struct Resources;

impl Resources {
    fn handle_embedded_file(path: &str) -> HttpResponse {
        match Self::get(path) {
            Some(content) => HttpResponse::Ok()
                .content_type(mime_guess::from_path(path).first_or_octet_stream().as_ref())
                .append_header(CacheControl(vec![CacheDirective::MaxAge(86400 * 365)]))
                .body(content.data.into_owned()),
            None => {
                HttpResponse::NotFound().body(format!("Static resource file '{}' not found", path))
            }
        }
    }
}

#[get("/static/{_:.*}")]
async fn static_resources(path: web::Path<String>) -> impl Responder {
    Resources::handle_embedded_file(path.as_str())
}

async fn not_found_handler() -> Result<&'static str, AppError> {
    Err(AppError::PageNotFound)
}
