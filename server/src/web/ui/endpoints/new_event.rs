use crate::data_store::auth_token::{AuthToken, Privilege};
use crate::data_store::models::{NewEvent, RoomWithEventCount};
use crate::data_store::StoreError;
use crate::web::ui::base_template::BaseTemplateContext;
use crate::web::ui::error::AppError;
use crate::web::ui::flash::{FlashMessage, FlashType, FlashesInterface};
use crate::web::ui::form_values::{
    error_summary, BoolFormValue, FormValue, _FormValidSimpleValidate,
};
use crate::web::ui::{util, validation};
use crate::web::AppState;
use actix_web::web::{Form, Html, Redirect};
use actix_web::{get, post, web, HttpRequest, Responder};
use askama::Template;
use log::debug;
use serde::Deserialize;

#[get("/add-event")]
async fn new_event_form(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let auth = util::authorize(&state, &req, Privilege::ManageEvents).await?;
    let rooms = load_rooms(&state, &auth).await?;

    let tmpl = NewEventFormTemplate {
        base: BaseTemplateContext {
            request: &req,
            page_title: "Add event",
            auth_token: Some(&auth),
        },
        rooms: &rooms,
    };
    Ok(Html::new(tmpl.render()?))
}

#[post("/add-event")]
async fn new_event(
    state: web::Data<AppState>,
    data: Form<EventFormData>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let auth = util::authorize(&state, &req, Privilege::ManageEvents).await?;
    let room_names: Vec<String> = load_rooms(&state, &auth)
        .await?
        .into_iter()
        .map(|r| r.room.name)
        .collect();

    let mut form_data = data.into_inner();
    let result = if let Some(event) = form_data.validate(&room_names, &state.time_zone) {
        let store = state.store.clone();
        let event_name = event.name.clone();
        web::block(move || -> Result<_, StoreError> {
            let mut store = store.get_facade()?;
            store.create_event(&auth, event)
        })
        .await?
        .map(|()| event_name)
    } else {
        debug!("Invalid event form data: {}", form_data.error_summary());
        Err(StoreError::InvalidInputData(
            "Invalid event form data".to_owned(),
        ))
    };

    match result {
        Ok(event_name) => {
            req.add_flash_message(FlashMessage {
                flash_type: FlashType::Success,
                message: format!("The event {} has been created", event_name),
            });
            Ok(Redirect::to(req.url_for_static("index")?.path().to_owned()).see_other())
        }
        // A room deleted in the meantime shows up as InvalidInputData (foreign key violation)
        Err(StoreError::ConflictEntityExists | StoreError::InvalidInputData(_)) => {
            req.add_flash_message(FlashMessage {
                flash_type: FlashType::Error,
                message: "I'm sorry, an error has occurred. Check if the event does not exists and try again".to_owned(),
            });
            Ok(Redirect::to(req.url_for_static("new_event_form")?.path().to_owned()).see_other())
        }
        Err(e) => Err(e.into()),
    }
}

async fn load_rooms(
    state: &web::Data<AppState>,
    auth: &AuthToken,
) -> Result<Vec<RoomWithEventCount>, AppError> {
    let store = state.store.clone();
    let auth = auth.clone();
    web::block(move || -> Result<_, AppError> {
        let mut store = store.get_facade()?;
        Ok(store.get_rooms(&auth)?)
    })
    .await?
}

#[derive(Template)]
#[template(path = "new_event_form.html")]
struct NewEventFormTemplate<'a> {
    base: BaseTemplateContext<'a>,
    rooms: &'a Vec<RoomWithEventCount>,
}

#[derive(Deserialize)]
struct EventFormData {
    room: FormValue<validation::RoomNameFromList>,
    name: FormValue<validation::EntityName>,
    description: FormValue<String>,
    date: FormValue<validation::DateTimeLocal>,
    is_public: BoolFormValue,
}

impl EventFormData {
    fn validate(
        &mut self,
        room_names: &Vec<String>,
        time_zone: &chrono_tz::Tz,
    ) -> Option<NewEvent> {
        let room = self.room.validate_with(room_names);
        let name = self.name.validate();
        let description = self.description.validate();
        let date = self.date.validate_with(time_zone);

        Some(NewEvent {
            name: name?.into_inner(),
            room_name: room?.into_inner(),
            description: description?,
            date: date?.into_inner(),
            is_public: self.is_public.get_value(),
        })
    }

    fn error_summary(&self) -> String {
        error_summary([
            ("room", self.room.errors()),
            ("name", self.name.errors()),
            ("description", self.description.errors()),
            ("date", self.date.errors()),
        ])
    }
}
