use crate::data_store::auth_token::Privilege;
use crate::data_store::RoomDeletionOutcome;
use crate::web::ui::error::AppError;
use crate::web::ui::flash::{FlashMessage, FlashType, FlashesInterface};
use crate::web::ui::util;
use crate::web::AppState;
use actix_web::web::Redirect;
use actix_web::{route, web, HttpRequest, Responder};

/// Delete a room, unless it still hosts events.
///
/// Reachable via GET (plain links) and POST (the forms in the rooms list).
#[route("/delete-room/{room_name}", method = "GET", method = "POST")]
async fn delete_room(
    path: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let auth = util::authorize(&state, &req, Privilege::DeleteRooms).await?;
    let room_name = path.into_inner();

    let store = state.store.clone();
    let name = room_name.clone();
    let outcome = web::block(move || -> Result<_, AppError> {
        let mut store = store.get_facade()?;
        Ok(store.delete_room(&auth, &name)?)
    })
    .await??;

    let notification = match outcome {
        RoomDeletionOutcome::Deleted => FlashMessage {
            flash_type: FlashType::Info,
            message: format!("The room {} has been deleted", room_name),
        },
        RoomDeletionOutcome::HasEvents { .. } => FlashMessage {
            flash_type: FlashType::Error,
            message: format!("The room {} still has events", room_name),
        },
    };
    req.add_flash_message(notification);
    Ok(Redirect::to(req.url_for_static("rooms_list")?.path().to_owned()).see_other())
}
