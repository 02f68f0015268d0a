pub mod database_migration;
pub mod manage_users;
mod util;

/// Key for creating [crate::data_store::auth_token::GlobalAuthToken]s. It can only be
/// constructed within the command line interface, so the web server cannot accidentally gain
/// global privileges.
pub struct CliAuthTokenKey {
    _private: (),
}

impl CliAuthTokenKey {
    #[allow(clippy::new_without_default)] // We always want to explicitly create these objects
    pub fn new() -> Self {
        Self { _private: () }
    }
}
