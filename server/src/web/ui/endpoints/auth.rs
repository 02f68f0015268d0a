use crate::auth_session::SessionToken;
use crate::data_store::models::NewUser;
use crate::data_store::{password, StoreError};
use crate::web::ui::base_template::BaseTemplateContext;
use crate::web::ui::error::AppError;
use crate::web::ui::flash::{FlashMessage, FlashType, FlashesInterface};
use crate::web::ui::form_values::{
    error_summary, BoolFormValue, FormValue, _FormValidSimpleValidate,
};
use crate::web::ui::{util, validation};
use crate::web::AppState;
use actix_web::web::{Form, Html, Redirect};
use actix_web::{get, post, route, web, Either, HttpRequest, HttpResponse, Responder};
use askama::Template;
use log::{debug, info};
use serde::Deserialize;

#[get("/login")]
async fn login_form(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    if util::get_authenticated_user(&state, &req).await?.is_some() {
        return Ok(Either::Left(
            Redirect::to(req.url_for_static("index")?.path().to_owned()).see_other(),
        ));
    }

    let tmpl = LoginFormTemplate {
        base: BaseTemplateContext {
            request: &req,
            page_title: "Login",
            auth_token: None,
        },
    };
    Ok(Either::Right(Html::new(tmpl.render()?)))
}

#[post("/login")]
async fn login(
    state: web::Data<AppState>,
    data: Form<LoginFormData>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    if util::get_authenticated_user(&state, &req).await?.is_some() {
        return Ok(Redirect::to(req.url_for_static("index")?.path().to_owned())
            .see_other()
            .respond_to(&req)
            .map_into_boxed_body());
    }

    let data = data.into_inner();
    let store = state.store.clone();
    let username = data.username.clone();
    let result = web::block(move || -> Result<_, StoreError> {
        let mut store = store.get_facade()?;
        store.authenticate_user(&data.username, &data.password)
    })
    .await?;

    match result {
        Ok(user_id) => {
            info!("User '{}' logged in", username);
            Ok(HttpResponse::SeeOther()
                .cookie(util::create_session_cookie(
                    SessionToken::for_user(user_id),
                    &state,
                ))
                .insert_header((
                    actix_web::http::header::LOCATION,
                    req.url_for_static("index")?.path().to_owned(),
                ))
                .finish())
        }
        // Unknown user and wrong password must not be distinguishable
        Err(StoreError::NotExisting) => {
            debug!("Failed login attempt for user '{}'", username);
            req.add_flash_message(FlashMessage {
                flash_type: FlashType::Error,
                message: "Invalid username or password, please check your information".to_owned(),
            });
            Ok(Redirect::to(req.url_for_static("login_form")?.path().to_owned())
                .see_other()
                .respond_to(&req)
                .map_into_boxed_body())
        }
        Err(e) => Err(e.into()),
    }
}

#[route("/logout", method = "GET", method = "POST")]
async fn logout(req: HttpRequest) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::SeeOther()
        .cookie(util::create_session_removal_cookie())
        .insert_header((
            actix_web::http::header::LOCATION,
            req.url_for_static("login_form")?.path().to_owned(),
        ))
        .finish())
}

#[get("/sing-in")]
async fn registration_form(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    if util::get_authenticated_user(&state, &req).await?.is_some() {
        return Ok(Either::Left(
            Redirect::to(req.url_for_static("index")?.path().to_owned()).see_other(),
        ));
    }

    let tmpl = RegistrationFormTemplate {
        base: BaseTemplateContext {
            request: &req,
            page_title: "Sign in",
            auth_token: None,
        },
    };
    Ok(Either::Right(Html::new(tmpl.render()?)))
}

#[post("/sing-in")]
async fn register(
    state: web::Data<AppState>,
    data: Form<RegistrationFormData>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    if util::get_authenticated_user(&state, &req).await?.is_some() {
        return Ok(Redirect::to(req.url_for_static("index")?.path().to_owned()).see_other());
    }

    let mut form_data = data.into_inner();
    let result = if let Some(user) = form_data.validate() {
        let store = state.store.clone();
        web::block(move || -> Result<_, StoreError> {
            let mut store = store.get_facade()?;
            let password_hash = password::hash_password(&user.password)?;
            store.create_user(NewUser {
                username: user.username,
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                password_hash,
                is_staff: user.is_staff,
            })
        })
        .await?
    } else {
        debug!(
            "Invalid registration form data: {}",
            form_data.error_summary()
        );
        Err(StoreError::InvalidInputData(
            "Invalid registration form data".to_owned(),
        ))
    };

    match result {
        Ok(_user_id) => {
            req.add_flash_message(FlashMessage {
                flash_type: FlashType::Success,
                message: "The user has been created".to_owned(),
            });
            Ok(Redirect::to(req.url_for_static("index")?.path().to_owned()).see_other())
        }
        Err(StoreError::ConflictEntityExists | StoreError::InvalidInputData(_)) => {
            req.add_flash_message(FlashMessage {
                flash_type: FlashType::Error,
                message: "I'm sorry, an error has occurred. May the username already exists."
                    .to_owned(),
            });
            Ok(Redirect::to(req.url_for_static("registration_form")?.path().to_owned()).see_other())
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Template)]
#[template(path = "login_form.html")]
struct LoginFormTemplate<'a> {
    base: BaseTemplateContext<'a>,
}

#[derive(Template)]
#[template(path = "registration_form.html")]
struct RegistrationFormTemplate<'a> {
    base: BaseTemplateContext<'a>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct LoginFormData {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct RegistrationFormData {
    first_name: FormValue<validation::ShortText>,
    last_name: FormValue<validation::ShortText>,
    username: FormValue<validation::Username>,
    email: FormValue<validation::OptionalEmail>,
    password: FormValue<validation::NonEmptyString>,
    is_staff: BoolFormValue,
}

impl RegistrationFormData {
    fn validate(&mut self) -> Option<ValidatedRegistration> {
        let first_name = self.first_name.validate();
        let last_name = self.last_name.validate();
        let username = self.username.validate();
        let email = self.email.validate();
        let password = self.password.validate();

        Some(ValidatedRegistration {
            first_name: first_name?.into_inner(),
            last_name: last_name?.into_inner(),
            username: username?.into_inner(),
            email: email?.into_inner(),
            password: password?.into_inner(),
            is_staff: self.is_staff.get_value(),
        })
    }

    fn error_summary(&self) -> String {
        error_summary([
            ("first_name", self.first_name.errors()),
            ("last_name", self.last_name.errors()),
            ("username", self.username.errors()),
            ("email", self.email.errors()),
            ("password", self.password.errors()),
        ])
    }
}

struct ValidatedRegistration {
    first_name: String,
    last_name: String,
    username: String,
    email: String,
    password: String,
    is_staff: bool,
}
