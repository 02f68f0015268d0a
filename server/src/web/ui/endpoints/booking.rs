use crate::data_store::auth_token::Privilege;
use crate::data_store::BookingOutcome;
use crate::web::ui::error::AppError;
use crate::web::ui::flash::{FlashMessage, FlashType, FlashesInterface};
use crate::web::ui::util;
use crate::web::AppState;
use actix_web::web::Redirect;
use actix_web::{route, web, HttpRequest, Responder};

#[route("/book-event/{event_name}", method = "GET", method = "POST")]
async fn book_event(
    path: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let auth = util::authorize(&state, &req, Privilege::BookEvents).await?;
    let event_name = path.into_inner();

    let store = state.store.clone();
    let name = event_name.clone();
    let outcome = web::block(move || -> Result<_, AppError> {
        let mut store = store.get_facade()?;
        Ok(store.book_event(&auth, &name)?)
    })
    .await??;

    req.add_flash_message(match outcome {
        BookingOutcome::Booked => FlashMessage {
            flash_type: FlashType::Success,
            message: format!("Congratulations! Now you have a place for {}.", event_name),
        },
        BookingOutcome::AlreadyBooked => FlashMessage {
            flash_type: FlashType::Error,
            message: format!(
                "I'm sorry, you already have a place booked for {}.",
                event_name
            ),
        },
        BookingOutcome::NoSeatsAvailable => FlashMessage {
            flash_type: FlashType::Warning,
            message: format!(
                "I'm sorry, there are not any place available for {}.",
                event_name
            ),
        },
    });
    Ok(Redirect::to(req.url_for_static("index")?.path().to_owned()).see_other())
}

#[route("/cancel_subs/{event_name}", method = "GET", method = "POST")]
async fn cancel_booking(
    path: web::Path<String>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let auth = util::authorize(&state, &req, Privilege::BookEvents).await?;
    let event_name = path.into_inner();

    let store = state.store.clone();
    let name = event_name.clone();
    web::block(move || -> Result<_, AppError> {
        let mut store = store.get_facade()?;
        Ok(store.cancel_booking(&auth, &name)?)
    })
    .await??;

    req.add_flash_message(FlashMessage {
        flash_type: FlashType::Info,
        message: format!("Your place to the event {} has been canceled", event_name),
    });
    Ok(Redirect::to(req.url_for_static("profile")?.path().to_owned()).see_other())
}
