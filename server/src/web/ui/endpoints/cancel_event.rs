use crate::data_store::auth_token::Privilege;
use crate::web::ui::error::AppError;
use crate::web::ui::flash::{FlashMessage, FlashType, FlashesInterface};
use crate::web::ui::util;
use crate::web::AppState;
use actix_web::web::Redirect;
use actix_web::{route, web, HttpRequest, Responder};

/// Cancel (i.e. delete) an event together with all of its bookings
#[route("/cancel-event/{event_name}", method = "GET", method = "POST")]
async fn cancel_event(
    path: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let auth = util::authorize(&state, &req, Privilege::CancelEvents).await?;
    let event_name = path.into_inner();

    let store = state.store.clone();
    let name = event_name.clone();
    web::block(move || -> Result<_, AppError> {
        let mut store = store.get_facade()?;
        Ok(store.delete_event(&auth, &name)?)
    })
    .await??;

    req.add_flash_message(FlashMessage {
        flash_type: FlashType::Info,
        message: format!("The event {} has been canceled", event_name),
    });
    Ok(Redirect::to(req.url_for_static("index")?.path().to_owned()).see_other())
}
