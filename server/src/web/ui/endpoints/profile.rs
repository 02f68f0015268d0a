use crate::data_store::auth_token::Privilege;
use crate::data_store::models::BookedEvent;
use crate::web::ui::base_template::BaseTemplateContext;
use crate::web::ui::error::AppError;
use crate::web::ui::util;
use crate::web::AppState;
use actix_web::web::Html;
use actix_web::{get, web, HttpRequest, Responder};
use askama::Template;

#[get("/profile")]
async fn profile(state: web::Data<AppState>, req: HttpRequest) -> Result<impl Responder, AppError> {
    let auth = util::authorize(&state, &req, Privilege::ShowProfile).await?;
    let store = state.store.clone();
    let auth_clone = auth.clone();
    let bookings = web::block(move || -> Result<_, AppError> {
        let mut store = store.get_facade()?;
        Ok(store.get_own_bookings(&auth_clone)?)
    })
    .await??;

    let tmpl = ProfileTemplate {
        base: BaseTemplateContext {
            request: &req,
            page_title: "My bookings",
            auth_token: Some(&auth),
        },
        username: auth.username(),
        bookings: &bookings,
        now: chrono::Utc::now(),
    };
    Ok(Html::new(tmpl.render()?))
}

#[derive(Template)]
#[template(path = "profile.html")]
struct ProfileTemplate<'a> {
    base: BaseTemplateContext<'a>,
    username: &'a str,
    bookings: &'a Vec<BookedEvent>,
    now: chrono::DateTime<chrono::Utc>,
}

impl ProfileTemplate<'_> {
    fn is_past(&self, booking: &BookedEvent) -> bool {
        !booking.event.event.is_active(self.now)
    }
}
