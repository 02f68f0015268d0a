use crate::data_store::auth_token::Privilege;
use crate::data_store::models::FullEvent;
use crate::web::ui::base_template::BaseTemplateContext;
use crate::web::ui::error::AppError;
use crate::web::ui::util;
use crate::web::AppState;
use actix_web::web::Html;
use actix_web::{get, web, HttpRequest, Responder};
use askama::Template;
use std::collections::HashSet;

#[get("/")]
async fn index(state: web::Data<AppState>, req: HttpRequest) -> Result<impl Responder, AppError> {
    let auth = util::authorize(&state, &req, Privilege::ShowEvents).await?;
    let store = state.store.clone();
    let auth_clone = auth.clone();
    let (events, bookings) = web::block(move || -> Result<_, AppError> {
        let mut store = store.get_facade()?;
        Ok((
            store.get_events(&auth_clone)?,
            store.get_own_bookings(&auth_clone)?,
        ))
    })
    .await??;

    let tmpl = IndexTemplate {
        base: BaseTemplateContext {
            request: &req,
            page_title: "Events",
            auth_token: Some(&auth),
        },
        events: &events,
        booked_events: bookings
            .into_iter()
            .map(|booking| booking.booking.event_name)
            .collect(),
        now: chrono::Utc::now(),
    };
    Ok(Html::new(tmpl.render()?))
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    base: BaseTemplateContext<'a>,
    events: &'a Vec<FullEvent>,
    /// Names of the events booked by the current user
    booked_events: HashSet<String>,
    now: chrono::DateTime<chrono::Utc>,
}

impl IndexTemplate<'_> {
    fn is_booked(&self, event: &FullEvent) -> bool {
        self.booked_events.contains(&event.event.name)
    }

    fn can_book(&self, event: &FullEvent) -> bool {
        event.event.is_active(self.now) && event.availability() > 0
    }
}

mod filters {
    pub use crate::web::ui::askama_filters::ellipsis;
}
