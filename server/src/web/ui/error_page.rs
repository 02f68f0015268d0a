//! This module provides functionality to generate nice-looking error pages for errors returned from
//! handler functions.
//!
//! This is achieved by an actix-web middleware that replaces the original HTTP response in the case
//! of an error. In contrast to rendering the error page in our [actix_web::ResponseError]
//! implementation, this allows us to access the HTTP Request, e.g. for generating URLs to static
//! files and other pages or adding flash messages.
use crate::web::ui::base_template::BaseTemplateContext;
use crate::web::ui::error::AppError;
use crate::web::ui::flash::{FlashMessage, FlashType, FlashesInterface};
use crate::web::ui::util;
use actix_web::body::EitherBody;
use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::web::Html;
use actix_web::{HttpRequest, HttpResponse, Responder, ResponseError};
use askama::Template;

/// An actix-web middleware for generating nice error pages
///
/// The middleware replaces the existing HTTP response (typically generated from the error's
/// ResponseError implementation) with a nice error page, when an error has been returned by the
/// endpoint handler function. The nice error page is generated from askama templates, extending the
/// "base.html" template to keep the application's look & feel. In case, rendering the template
/// fails, we fall back to a plain text representation of the error.
///
/// Authentication and authorization failures ([AppError::NotAuthenticated],
/// [AppError::PermissionDenied]) are not shown as error pages, but replaced by a redirect to the
/// login page or the home page (with an error flash message), respectively. Thus, this middleware
/// must be placed inside of the flash middleware.
pub async fn error_page_middleware<B: actix_web::body::MessageBody>(
    req: actix_web::dev::ServiceRequest,
    next: actix_web::middleware::Next<B>,
) -> Result<actix_web::dev::ServiceResponse<EitherBody<B, String>>, actix_web::Error> {
    let response = next.call(req).await?;

    if response.response().error().is_some() {
        let (req, res) = response.into_parts();
        let error = res
            .error()
            .expect("We checked that res has an error, above.");
        let response = if let Some(app_error) = error.as_error::<AppError>() {
            generate_app_error_response(app_error, &req)
        } else {
            generate_generic_error_page(error.as_response_error(), &req)
        };
        Ok(actix_web::dev::ServiceResponse::new(
            req,
            response.map_body(|_, body| EitherBody::right(body)),
        ))
    } else {
        Ok(response.map_body(|_, body| EitherBody::left(body)))
    }
}

/// Generate a redirect or a nice error page for the given [AppError].
fn generate_app_error_response(
    app_error: &AppError,
    http_request: &HttpRequest,
) -> HttpResponse<String> {
    match app_error {
        AppError::NotAuthenticated { .. } => redirect_to(http_request, "login_form"),
        AppError::PermissionDenied { required_privilege } => {
            http_request.add_flash_message(FlashMessage {
                flash_type: FlashType::Error,
                message: util::permission_denied_message(*required_privilege).to_owned(),
            });
            redirect_to(http_request, "index")
        }
        _ => {
            let tmpl = AppErrorTemplate {
                base: BaseTemplateContext {
                    request: http_request,
                    page_title: "Error",
                    auth_token: None,
                },
                error: app_error,
            };
            render_template_or_show_error_as_string(tmpl, app_error, http_request)
        }
    }
}

/// Generate a nice error page for the given `error`, using its string representation.
fn generate_generic_error_page(
    error: &dyn ResponseError,
    http_request: &HttpRequest,
) -> HttpResponse<String> {
    let tmpl = ErrorTemplate {
        base: BaseTemplateContext {
            request: http_request,
            page_title: "Error",
            auth_token: None,
        },
        error,
    };
    render_template_or_show_error_as_string(tmpl, error, http_request)
}

fn redirect_to(http_request: &HttpRequest, route_name: &str) -> HttpResponse<String> {
    let location = http_request
        .url_for_static(route_name)
        .map(|url| url.path().to_owned())
        .unwrap_or_else(|_| "/".to_owned());
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .message_body(String::new())
        .unwrap_or_else(|_| HttpResponse::with_body(StatusCode::SEE_OTHER, String::new()))
}

/// Try to render the given [askama::Template] structure and generate an HTTP response as an HTML
/// error page for the given error and create an HTTP response.
///
/// In case of an error while rendering the template, return a plain text HTTP response with the
/// error's string representation.
fn render_template_or_show_error_as_string(
    tmpl: impl Template,
    error: &dyn ResponseError,
    req: &HttpRequest,
) -> HttpResponse<String> {
    match tmpl.render() {
        Ok(body) => (Html::new(body), error.status_code()).respond_to(req),
        Err(err) => (
            format!(
                "Error: {}\n(Could not render nice error page: {})",
                error, err
            ),
            error.status_code(),
        )
            .respond_to(req),
    }
}

#[derive(Template)]
#[template(path = "app_error.html")]
struct AppErrorTemplate<'a> {
    base: BaseTemplateContext<'a>,
    error: &'a AppError,
}

impl AppErrorTemplate<'_> {
    fn title(&self) -> &'static str {
        match self.error {
            AppError::PageNotFound => "Page not found",
            AppError::EntityNotFound => "Not found",
            AppError::TransactionConflict => "Please try again",
            _ => "Internal server error",
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    base: BaseTemplateContext<'a>,
    error: &'a dyn ResponseError,
}
