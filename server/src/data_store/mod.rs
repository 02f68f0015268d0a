//! The backend part of the application: the database interface
//!
//! The primary entry point to this module is the function [get_store_from_env], which returns an
//! object implementing the [BookingStore] trait. This object can be shared between threads in a
//! global application state and be used to create [BookingStoreFacade] instances for interaction
//! with the database. These provide a CRUD-like interface, using the data models from the [models]
//! module.
//!
//! The primary implementation of [BookingStore] ([postgres::PgDataStore]) wraps a PostgreSQL
//! connection pool and its corresponding [BookingStoreFacade] objects
//! ([postgres::PgDataStoreFacade]) hold a reference to one pooled connection each, using the Diesel
//! query DSL for implementing the database interaction.
//!
//! There is also a mock implementation for unittests.

use crate::auth_session::SessionToken;
use crate::cli_error::CliError;
use crate::setup;
use auth_token::{AuthToken, GlobalAuthToken, Privilege};
use std::fmt::Debug;

pub mod auth_token;
pub mod models;
pub mod password;
mod postgres;
mod schema;

#[cfg(test)]
pub mod store_mock;

/// Get a [BookingStore] instance, according the "DATABASE_URL" environment variable.
///
/// The DATABASE_URL must be a PosgreSQL connection url, following the schema
/// "postgres://{user}:{password}@{host}/{database}".
pub fn get_store_from_env() -> Result<impl BookingStore, CliError> {
    Ok(postgres::PgDataStore::new(
        &setup::get_database_url_from_env()?,
    )?)
}

pub type UserId = i32;
pub type BookingId = i32;

pub trait BookingStoreFacade {
    /// Get all rooms, newest first, together with the number of events hosted in each room.
    fn get_rooms(
        &mut self,
        auth_token: &AuthToken,
    ) -> Result<Vec<models::RoomWithEventCount>, StoreError>;

    /// Create a new room.
    ///
    /// Returns `Err(StoreError::ConflictEntityExists)` if a room with the same name exists
    /// already.
    fn create_room(&mut self, auth_token: &AuthToken, room: models::NewRoom)
        -> Result<(), StoreError>;

    /// Delete the room, if (and only if) it does not host any events.
    ///
    /// Counting the room's events and deleting the room happens atomically, so that no event can
    /// be added to the room concurrently.
    fn delete_room(
        &mut self,
        auth_token: &AuthToken,
        room_name: &str,
    ) -> Result<RoomDeletionOutcome, StoreError>;

    /// Get the events visible for the client, newest first.
    ///
    /// Clients with the [Privilege::ShowAllEvents] privilege get all events, all others only get
    /// the public events.
    fn get_events(&mut self, auth_token: &AuthToken) -> Result<Vec<models::FullEvent>, StoreError>;

    fn get_event(
        &mut self,
        auth_token: &AuthToken,
        event_name: &str,
    ) -> Result<models::FullEvent, StoreError>;

    /// Create a new event.
    ///
    /// # return value
    /// - `Ok(())` if the event has been created, successfully
    /// - `Err(StoreError::ConflictEntityExists)` if an event with the same name exists already
    /// - `Err(StoreError::InvalidInputData)` if the referenced room does not exist
    /// - `Err(_)` if something different went wrong, as usual
    fn create_event(
        &mut self,
        auth_token: &AuthToken,
        event: models::NewEvent,
    ) -> Result<(), StoreError>;

    /// Delete the event and (by cascade) all bookings for it.
    fn delete_event(&mut self, auth_token: &AuthToken, event_name: &str) -> Result<(), StoreError>;

    /// Get the bookings of the authenticated user, together with the booked events, most recent
    /// booking first.
    fn get_own_bookings(
        &mut self,
        auth_token: &AuthToken,
    ) -> Result<Vec<models::BookedEvent>, StoreError>;

    /// Reserve a seat at the event for the authenticated user.
    ///
    /// The checks for an existing booking and for the remaining seats are done within the same
    /// transaction as the insertion, with the event's row locked, so that concurrent requests
    /// cannot oversubscribe the room.
    fn book_event(
        &mut self,
        auth_token: &AuthToken,
        event_name: &str,
    ) -> Result<BookingOutcome, StoreError>;

    /// Delete the authenticated user's booking for the event.
    ///
    /// Returns `Err(StoreError::NotExisting)` if the user does not hold a booking for the event.
    fn cancel_booking(
        &mut self,
        auth_token: &AuthToken,
        event_name: &str,
    ) -> Result<(), StoreError>;

    /// Create a new user account (self-registration or via command line interface).
    ///
    /// Returns `Err(StoreError::ConflictEntityExists)` if the username is already taken.
    fn create_user(&mut self, user: models::NewUser) -> Result<UserId, StoreError>;

    fn get_users(&mut self, auth_token: &GlobalAuthToken) -> Result<Vec<models::User>, StoreError>;

    /// Check the given credentials and return the id of the authenticated user.
    ///
    /// Unknown usernames and wrong passwords both result in `Err(StoreError::NotExisting)` and
    /// take the same amount of work, so that clients cannot probe for existing usernames.
    fn authenticate_user(&mut self, username: &str, password: &str) -> Result<UserId, StoreError>;

    /// Get an [AuthToken] instance for a client, representing the client's user and its access
    /// roles
    ///
    /// Returns `Err(StoreError::NotExisting)` if the session's user does not exist (anymore).
    fn get_auth_token_for_session(
        &mut self,
        session_token: &SessionToken,
    ) -> Result<AuthToken, StoreError>;
}

pub trait BookingStore: Send + Sync {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn BookingStoreFacade + 'a>, StoreError>;
}

/// Result of [BookingStoreFacade::book_event]. Only [BookingOutcome::Booked] changes the
/// database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked,
    AlreadyBooked,
    NoSeatsAvailable,
}

/// Result of [BookingStoreFacade::delete_room]. Only [RoomDeletionOutcome::Deleted] changes the
/// database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomDeletionOutcome {
    Deleted,
    HasEvents { event_count: i64 },
}

#[derive(Debug)]
pub enum StoreError {
    /// Connection the database failed. See string description for details.
    ConnectionError(String),
    /// The query could not be executed because of some error not covered by the other members (see
    /// string description)
    QueryError(diesel::result::Error),
    /// Database transaction could not be commited due to a conflicting concurrent transaction
    TransactionConflict,
    /// The requested entity does not exist
    NotExisting,
    /// The entity could not be created because it already exists.
    ConflictEntityExists,
    /// The client is not authorized for this action. It would need to authenticate for an access
    /// role qualifying for the `required_privilege`.
    PermissionDenied { required_privilege: Privilege },
    /// The provided data is invalid, i.e. it does not match the expected ranges or violates a
    /// SQL constraint. See string description for details.
    InvalidInputData(String),
    /// Some data queried from the database could not be deserialized. See string description for
    /// details.
    InvalidDataInDatabase(String),
}

impl From<diesel::result::Error> for StoreError {
    fn from(error: diesel::result::Error) -> Self {
        match error {
            diesel::result::Error::NotFound => Self::NotExisting,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => Self::ConflictEntityExists,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::SerializationFailure,
                _,
            ) => Self::TransactionConflict,
            diesel::result::Error::DatabaseError(
                e @ diesel::result::DatabaseErrorKind::ForeignKeyViolation
                | e @ diesel::result::DatabaseErrorKind::CheckViolation,
                info,
            ) => Self::InvalidInputData(
                info.constraint_name()
                    .and_then(postgres::description_for_postgres_constraint)
                    .map(|d| d.to_owned())
                    .unwrap_or_else(|| format!("{:?}", e)),
            ),
            diesel::result::Error::SerializationError(e) => Self::InvalidInputData(e.to_string()),
            diesel::result::Error::DeserializationError(e) => {
                Self::InvalidDataInDatabase(e.to_string())
            }
            _ => Self::QueryError(error),
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(error: r2d2::Error) -> Self {
        Self::ConnectionError(error.to_string())
    }
}

impl From<password::PasswordHashError> for StoreError {
    fn from(error: password::PasswordHashError) -> Self {
        match error {
            password::PasswordHashError::InvalidFormat => {
                Self::InvalidDataInDatabase("Stored password hash is malformed".to_owned())
            }
            password::PasswordHashError::RandomGenerationFailed => {
                Self::InvalidInputData("Could not generate password salt".to_owned())
            }
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Error connecting to database: {}", e),
            Self::QueryError(e) => write!(f, "Error while executing database query: {}", e),
            Self::TransactionConflict => f.write_str("Database transaction could not be commited due to a conflicting concurrent transaction"),
            Self::NotExisting => f.write_str("Database record does not exist."),
            Self::ConflictEntityExists => f.write_str("Database record exists already."),
            Self::PermissionDenied { required_privilege } => {
                write!(f, "Client is not authorized to perform this action. {:?} privilege required.", required_privilege)
            }
            Self::InvalidInputData(e) => {
                write!(f, "Data to be stored in database is not valid: {}", e)
            }
            Self::InvalidDataInDatabase(e) => {
                write!(f, "Data queried from database could not be deserialized: {}", e)
            }
        }
    }
}

impl std::error::Error for StoreError {}
