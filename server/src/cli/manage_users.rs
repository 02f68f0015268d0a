use crate::cli::util::{query_user_and_check, query_user_bool};
use crate::cli::CliAuthTokenKey;
use crate::cli_error::CliError;
use crate::data_store::auth_token::GlobalAuthToken;
use crate::data_store::models::NewUser;
use crate::data_store::{get_store_from_env, password, BookingStore, StoreError};
use crate::web::ui::form_values::ValidateFromFormInput;
use crate::web::ui::validation;
use log::info;

pub fn print_user_list() -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;
    let auth_token = GlobalAuthToken::create_for_cli(&CliAuthTokenKey::new());

    let users = data_store.get_users(&auth_token)?;

    let mut table = comfy_table::Table::new();
    table
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED)
        .set_header(vec!["id", "username", "name", "email", "staff", "joined"])
        .add_rows(users.into_iter().map(|user| {
            [
                user.id.to_string(),
                user.username,
                format!("{} {}", user.first_name, user.last_name)
                    .trim()
                    .to_owned(),
                user.email,
                if user.is_staff { "yes" } else { "no" }.to_owned(),
                user.date_joined.format("%Y-%m-%d %H:%M").to_string(),
            ]
        }));

    println!("{table}");
    Ok(())
}

/// Interactively create a new user account, e.g. the first staff user of a new installation.
pub fn create_user() -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;

    let username: String = query_user_and_check("Username", check_username)?;
    let first_name: String = query_user_and_check("First name (optional)", check_short_text)?;
    let last_name: String = query_user_and_check("Last name (optional)", check_short_text)?;
    let email: String = query_user_and_check("Email address (optional)", check_email)?;
    let password: String = query_user_and_check("Password", |v: &String| {
        if v.is_empty() {
            Err("Password must not be empty")
        } else {
            Ok(())
        }
    })?;
    let is_staff = query_user_bool(
        "Shall the user be staff (managing rooms and events)?",
        Some(false),
    )?;

    let mut data_store = data_store_pool.get_facade()?;
    let user_id = data_store.create_user(NewUser {
        username,
        first_name,
        last_name,
        email,
        password_hash: password::hash_password(&password).map_err(StoreError::from)?,
        is_staff,
    })?;
    info!("Created user with id {}", user_id);
    println!("User created with id {}.", user_id);
    Ok(())
}

// Same rules as the web registration form

#[allow(clippy::ptr_arg)] // Signature required by query_user_and_check()
fn check_username(value: &String) -> Result<(), String> {
    validation::Username::from_form_value(value).map(|_| ())
}

#[allow(clippy::ptr_arg)]
fn check_short_text(value: &String) -> Result<(), String> {
    validation::ShortText::from_form_value(value).map(|_| ())
}

#[allow(clippy::ptr_arg)]
fn check_email(value: &String) -> Result<(), String> {
    validation::OptionalEmail::from_form_value(value).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_input_checks() {
        assert!(check_username(&"alice".to_owned()).is_ok());
        assert!(check_username(&"alice smith".to_owned()).is_err());
        assert!(check_username(&"a".repeat(151)).is_err());
        assert!(check_short_text(&"".to_owned()).is_ok());
        assert!(check_short_text(&"x".repeat(150)).is_ok());
        assert!(check_short_text(&"x".repeat(151)).is_err());
        assert!(check_email(&"".to_owned()).is_ok());
        assert!(check_email(&"alice@example.com".to_owned()).is_ok());
        assert!(check_email(&"alice@".to_owned()).is_err());
    }
}
