use crate::data_store::auth_token::Privilege;
use crate::data_store::models::FullEvent;
use crate::web::ui::base_template::BaseTemplateContext;
use crate::web::ui::error::AppError;
use crate::web::ui::util;
use crate::web::AppState;
use actix_web::web::Html;
use actix_web::{get, web, HttpRequest, Responder};
use askama::Template;

#[get("/details/{event_name}")]
async fn event_details(
    path: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let auth = util::authorize(&state, &req, Privilege::ShowEvents).await?;
    let event_name = path.into_inner();
    let store = state.store.clone();
    let auth_clone = auth.clone();
    let event = web::block(move || -> Result<_, AppError> {
        let mut store = store.get_facade()?;
        Ok(store.get_event(&auth_clone, &event_name)?)
    })
    .await??;

    let tmpl = EventDetailsTemplate {
        base: BaseTemplateContext {
            request: &req,
            page_title: &event.event.name,
            auth_token: Some(&auth),
        },
        event: &event,
        is_active: event.event.is_active(chrono::Utc::now()),
    };
    Ok(Html::new(tmpl.render()?))
}

#[derive(Template)]
#[template(path = "event_details.html")]
struct EventDetailsTemplate<'a> {
    base: BaseTemplateContext<'a>,
    event: &'a FullEvent,
    is_active: bool,
}

mod filters {
    pub use crate::web::ui::askama_filters::markdown;
}
