use crate::auth_session::{SessionError, SessionToken};
use crate::data_store::auth_token::{AuthToken, Privilege};
use crate::data_store::StoreError;
use crate::web::ui::error::AppError;
use crate::web::AppState;
use actix_web::cookie::Cookie;
use actix_web::{web, HttpRequest};

pub const SESSION_COOKIE_NAME: &str = "roombook-session";

/// Check the client's session and the privileges of the session's user.
///
/// This is the access guard of all protected endpoints and must be called before doing anything
/// else. On success, the returned [AuthToken] is used for authorizing the data_store calls.
///
/// # return value
/// - `Err(AppError::NotAuthenticated)` if there is no valid session (missing, invalid or expired
///   session cookie or the session's user does not exist anymore)
/// - `Err(AppError::PermissionDenied)` if the user does not qualify for the `privilege`
pub async fn authorize(
    state: &web::Data<AppState>,
    request: &HttpRequest,
    privilege: Privilege,
) -> Result<AuthToken, AppError> {
    let auth = authenticate(state, request).await?;
    auth.check_privilege(privilege)?;
    Ok(auth)
}

/// Get the [AuthToken] of the client's session, if the client has a valid session.
///
/// Invalid sessions are treated like missing sessions by the login and registration pages. Thus,
/// only infrastructure errors are returned as `Err`.
pub async fn get_authenticated_user(
    state: &web::Data<AppState>,
    request: &HttpRequest,
) -> Result<Option<AuthToken>, AppError> {
    match authenticate(state, request).await {
        Ok(auth) => Ok(Some(auth)),
        Err(AppError::NotAuthenticated { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

async fn authenticate(
    state: &web::Data<AppState>,
    request: &HttpRequest,
) -> Result<AuthToken, AppError> {
    let session_token = extract_session_token(state, request)
        .map_err(|session_error| AppError::NotAuthenticated {
            session_error: Some(session_error),
        })?
        .ok_or(AppError::NotAuthenticated {
            session_error: None,
        })?;
    let store = state.store.clone();
    let result = web::block(move || -> Result<_, StoreError> {
        let mut store = store.get_facade()?;
        store.get_auth_token_for_session(&session_token)
    })
    .await?;
    match result {
        Ok(auth) => Ok(auth),
        // The session's user has been deleted
        Err(StoreError::NotExisting) => Err(AppError::NotAuthenticated {
            session_error: None,
        }),
        Err(e) => Err(e.into()),
    }
}

/// Extract the session token from the session token cookie and validate it
fn extract_session_token(
    app_state: &AppState,
    request: &HttpRequest,
) -> Result<Option<SessionToken>, SessionError> {
    request
        .cookie(SESSION_COOKIE_NAME)
        .map(|cookie| {
            SessionToken::from_string(cookie.value(), &app_state.secret, app_state.session_max_age)
        })
        .transpose()
}

pub fn create_session_cookie(session_token: SessionToken, app_state: &AppState) -> Cookie<'static> {
    let mut cookie = Cookie::new(
        SESSION_COOKIE_NAME,
        session_token.as_string(&app_state.secret),
    );
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(actix_web::cookie::SameSite::Lax);
    cookie.set_max_age(actix_web::cookie::time::Duration::seconds(
        app_state.session_max_age.num_seconds(),
    ));
    cookie
}

pub fn create_session_removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE_NAME, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

/// Get the message shown to users who tried an action they are not allowed to do.
pub fn permission_denied_message(privilege: Privilege) -> &'static str {
    match privilege {
        Privilege::ManageRooms => "I'm sorry, you do not have permissions to add rooms",
        Privilege::DeleteRooms => "You do not have permissions to delete rooms",
        Privilege::ManageEvents => "I'm sorry, you do not have permissions to add events",
        Privilege::CancelEvents => "You do not have permissions to cancel events",
        _ => "I'm sorry, you do not have permissions",
    }
}
