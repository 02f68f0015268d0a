use crate::data_store::auth_token::{AuthToken, Privilege};
use crate::web::ui::flash::{FlashMessage, FlashesInterface};
use crate::web::ui::Resources;
use crate::web::AppState;
use actix_web::error::UrlGenerationError;
use actix_web::{web, HttpRequest};
use std::fmt::Write;

/// Common template data for all ui templates extending the `base.html` template
///
/// This struct must be a part of the template data structure, as the field `base`.
/// The contained data and functions can be used by the individual template's code, as well.
#[derive(Debug)]
pub struct BaseTemplateContext<'a> {
    /// The HTTP request the template is used to respond to. Used for creating ressource urls and
    /// extracting the flash messages
    pub request: &'a HttpRequest,
    /// HTML title
    pub page_title: &'a str,
    /// The authenticated user, if any. Used for rendering the navigation bar.
    pub auth_token: Option<&'a AuthToken>,
}

impl BaseTemplateContext<'_> {
    pub fn url_for_static(&self, file: &str) -> Result<String, UrlGenerationError> {
        let mut url = self.request.url_for("static_resources", [file])?;
        url.query_pairs_mut().append_pair(
            "hash",
            &Resources::get(file)
                .map(|f| bytes_to_hex(&f.metadata.sha256_hash()))
                .unwrap_or("unknown".to_string()),
        );
        Ok(url.to_string())
    }

    /// Generate the URL of a route without path parameters (e.g. "index")
    pub fn url_for(&self, route_name: &str) -> Result<String, UrlGenerationError> {
        Ok(self.request.url_for_static(route_name)?.path().to_owned())
    }

    /// Generate the URL of a route for a specific room or event, identified by its name
    pub fn url_for_entity(
        &self,
        route_name: &str,
        entity_name: &str,
    ) -> Result<String, UrlGenerationError> {
        Ok(self
            .request
            .url_for(route_name, [entity_name])?
            .path()
            .to_owned())
    }

    pub fn get_flashes(&self) -> Vec<FlashMessage> {
        self.request.get_and_clear_flashes()
    }

    pub fn has_privilege(&self, privilege: Privilege) -> bool {
        self.auth_token
            .is_some_and(|auth| auth.has_privilege(privilege))
    }

    pub fn is_staff(&self) -> bool {
        self.has_privilege(Privilege::ManageEvents)
    }

    /// Format the timestamp in the configured time zone for displaying it to the user.
    pub fn format_datetime(&self, timestamp: &chrono::DateTime<chrono::Utc>) -> String {
        let time_zone = self
            .request
            .app_data::<web::Data<AppState>>()
            .map(|state| state.time_zone)
            .unwrap_or(chrono_tz::Tz::UTC);
        timestamp
            .with_timezone(&time_zone)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::new(), |mut output, b| {
        let _ = write!(output, "{:02x}", b);
        output
    })
}
