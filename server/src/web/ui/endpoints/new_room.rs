use crate::data_store::auth_token::Privilege;
use crate::data_store::models::NewRoom;
use crate::data_store::StoreError;
use crate::web::ui::base_template::BaseTemplateContext;
use crate::web::ui::error::AppError;
use crate::web::ui::flash::{FlashMessage, FlashType, FlashesInterface};
use crate::web::ui::form_values::{error_summary, FormValue, _FormValidSimpleValidate};
use crate::web::ui::{util, validation};
use crate::web::AppState;
use actix_web::web::{Form, Html, Redirect};
use actix_web::{get, post, web, HttpRequest, Responder};
use askama::Template;
use log::debug;
use serde::Deserialize;

#[get("/add-room")]
async fn new_room_form(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let auth = util::authorize(&state, &req, Privilege::ManageRooms).await?;

    let tmpl = NewRoomFormTemplate {
        base: BaseTemplateContext {
            request: &req,
            page_title: "Add room",
            auth_token: Some(&auth),
        },
    };
    Ok(Html::new(tmpl.render()?))
}

#[post("/add-room")]
async fn new_room(
    state: web::Data<AppState>,
    data: Form<RoomFormData>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let auth = util::authorize(&state, &req, Privilege::ManageRooms).await?;

    let mut form_data = data.into_inner();
    let result = if let Some(room) = form_data.validate() {
        let store = state.store.clone();
        let room_name = room.name.clone();
        web::block(move || -> Result<_, StoreError> {
            let mut store = store.get_facade()?;
            store.create_room(&auth, room)
        })
        .await?
        .map(|()| room_name)
    } else {
        debug!("Invalid room form data: {}", form_data.error_summary());
        Err(StoreError::InvalidInputData("Invalid room form data".to_owned()))
    };

    match result {
        Ok(room_name) => {
            req.add_flash_message(FlashMessage {
                flash_type: FlashType::Success,
                message: format!("The room {} has been created", room_name),
            });
            Ok(Redirect::to(req.url_for_static("rooms_list")?.path().to_owned()).see_other())
        }
        Err(StoreError::ConflictEntityExists | StoreError::InvalidInputData(_)) => {
            req.add_flash_message(FlashMessage {
                flash_type: FlashType::Error,
                message: "I'm sorry, an error has occurred. Check if the room does not exists and try again".to_owned(),
            });
            Ok(Redirect::to(req.url_for_static("new_room_form")?.path().to_owned()).see_other())
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Template)]
#[template(path = "new_room_form.html")]
struct NewRoomFormTemplate<'a> {
    base: BaseTemplateContext<'a>,
}

#[derive(Deserialize)]
struct RoomFormData {
    name: FormValue<validation::EntityName>,
    capacity: FormValue<validation::NonNegativeInt32>,
}

impl RoomFormData {
    fn validate(&mut self) -> Option<NewRoom> {
        let name = self.name.validate();
        let capacity = self.capacity.validate();

        Some(NewRoom {
            name: name?.into_inner(),
            capacity: capacity?.into_inner(),
        })
    }

    fn error_summary(&self) -> String {
        error_summary([
            ("name", self.name.errors()),
            ("capacity", self.capacity.errors()),
        ])
    }
}
