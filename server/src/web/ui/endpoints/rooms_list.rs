use crate::data_store::auth_token::Privilege;
use crate::data_store::models::RoomWithEventCount;
use crate::web::ui::base_template::BaseTemplateContext;
use crate::web::ui::error::AppError;
use crate::web::ui::util;
use crate::web::AppState;
use actix_web::web::Html;
use actix_web::{get, web, HttpRequest, Responder};
use askama::Template;

#[get("/rooms")]
async fn rooms_list(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let auth = util::authorize(&state, &req, Privilege::ListRooms).await?;
    let store = state.store.clone();
    let auth_clone = auth.clone();
    let rooms = web::block(move || -> Result<_, AppError> {
        let mut store = store.get_facade()?;
        Ok(store.get_rooms(&auth_clone)?)
    })
    .await??;

    let tmpl = RoomsListTemplate {
        base: BaseTemplateContext {
            request: &req,
            page_title: "Rooms",
            auth_token: Some(&auth),
        },
        rooms: &rooms,
    };
    Ok(Html::new(tmpl.render()?))
}

#[derive(Template)]
#[template(path = "rooms_list.html")]
struct RoomsListTemplate<'a> {
    base: BaseTemplateContext<'a>,
    rooms: &'a Vec<RoomWithEventCount>,
}
