//! Flash messages: notifications for the user that are shown on the next rendered page, e.g. after
//! a redirect.
//!
//! The pending messages are stored in a cookie as base64url-encoded JSON. The [flash_middleware]
//! loads them into the request's extensions and writes them back to the cookie, when they have been
//! changed by the handler (via the [FlashesInterface] methods of the [HttpRequest]).
// Inspiration: https://docs.rs/actix-session/latest/src/actix_session/session.rs.html

use actix_web::cookie::Cookie;
use actix_web::http::header::{HeaderValue, SET_COOKIE};
use actix_web::{HttpMessage, HttpRequest};
use base64::Engine;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashType {
    Info,
    Success,
    Warning,
    Error,
}

impl FlashType {
    pub fn css_class(&self) -> &'static str {
        match self {
            FlashType::Info => "info",
            FlashType::Success => "success",
            FlashType::Warning => "warning",
            FlashType::Error => "error",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub flash_type: FlashType,
    pub message: String,
}

struct Flashes {
    flashes: Vec<FlashMessage>,
    dirty: bool,
}

const COOKIE_NAME: &str = "flash";

impl Flashes {
    fn from_cookie(request: &HttpRequest) -> Result<Self, Box<dyn std::error::Error>> {
        let flashes = match request.cookie(COOKIE_NAME) {
            Some(cookie) => decode_flashes(cookie.value())?,
            None => vec![],
        };
        Ok(Flashes {
            flashes,
            dirty: false,
        })
    }

    fn into_cookie(self) -> Result<Cookie<'static>, serde_json::Error> {
        let mut result = Cookie::new(
            COOKIE_NAME,
            base64::engine::general_purpose::URL_SAFE_NO_PAD
                .encode(serde_json::to_string(&self.flashes)?),
        );
        result.set_path("/");
        result.set_http_only(true);
        if self.flashes.is_empty() {
            result.make_removal();
        }
        Ok(result)
    }
}

pub(super) fn decode_flashes(value: &str) -> Result<Vec<FlashMessage>, Box<dyn std::error::Error>> {
    let json = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(value)?;
    Ok(serde_json::from_slice(&json)?)
}

pub trait FlashesInterface {
    fn add_flash_message(&self, flash: FlashMessage);

    fn get_and_clear_flashes(&self) -> Vec<FlashMessage>;
}

impl FlashesInterface for HttpRequest {
    fn add_flash_message(&self, flash: FlashMessage) {
        if let Some(flashes) = self.extensions_mut().get_mut::<Flashes>() {
            flashes.flashes.push(flash);
            flashes.dirty = true;
            return;
        }
        // Must not be within the `if let` statement to avoid panicking of the `extensions` RefCell
        self.extensions_mut().insert(Flashes {
            flashes: vec![flash],
            dirty: true,
        });
    }

    fn get_and_clear_flashes(&self) -> Vec<FlashMessage> {
        self.extensions_mut()
            .get_mut::<Flashes>()
            .map(|flashes| {
                if !flashes.flashes.is_empty() {
                    flashes.dirty = true;
                }
                std::mem::take(&mut flashes.flashes)
            })
            .unwrap_or_default()
    }
}

pub async fn flash_middleware(
    req: actix_web::dev::ServiceRequest,
    next: actix_web::middleware::Next<impl actix_web::body::MessageBody>,
) -> Result<actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>, actix_web::Error> {
    // Ignore errors while parsing flashes from Request
    if let Ok(flashes) = Flashes::from_cookie(req.request()) {
        req.extensions_mut().insert(flashes);
    }

    let mut response = next.call(req).await?;

    let flashes = response.request().extensions_mut().remove::<Flashes>();
    if let Some(flashes) = flashes.filter(|f| f.dirty) {
        let cookie = flashes
            .into_cookie()
            .map_err(actix_web::error::ErrorInternalServerError)?;
        let val = HeaderValue::from_str(&cookie.to_string())?;
        response.headers_mut().append(SET_COOKIE, val);
    }
    Ok(response)
}
