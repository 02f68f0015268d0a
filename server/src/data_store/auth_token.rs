use crate::cli::CliAuthTokenKey;
use crate::data_store::{StoreError, UserId};

/// Authorization token for authorizing access to the data_store on behalf of a specific user
///
/// The AuthToken is keyed to a specific user (by its user id) and holds a list of active
/// [AccessRole]s of that user. These imply specific [Privilege]s.
///
/// This structure is our main protection against accidental unauthorized-access bugs: All
/// data_store access functions require an AuthToken and check the validity of the AuthToken
/// for the required privilege. An AuthToken can only be created by
/// [crate::data_store::BookingStoreFacade::get_auth_token_for_session], based on the user id in a
/// client's validated session.
///
/// For global, not user-specific authorization (command line interface), a GlobalAuthToken is
/// required instead.
#[derive(Clone, Debug)]
pub struct AuthToken {
    user_id: UserId,
    username: String,
    roles: Vec<AccessRole>,
}

impl AuthToken {
    /// Create a new AuthToken for a client session, based on the user account referenced by the
    /// client's [crate::auth_session::SessionToken].
    ///
    /// This function must only be used by implementations of
    /// [crate::data_store::BookingStoreFacade::get_auth_token_for_session]
    /// after checking that the user exists and deriving the user's roles from the database!
    pub(super) fn create_for_session(user_id: UserId, username: String, is_staff: bool) -> Self {
        let mut roles = vec![AccessRole::User];
        if is_staff {
            roles.push(AccessRole::Staff);
        }
        AuthToken {
            user_id,
            username,
            roles,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Check if the AuthToken authorizes for the given `privilege`.
    ///
    /// The actual authorization check is delegated to [Privilege::qualifying_roles], by checking if
    /// any of the qualifying roles is held by the user.
    pub fn has_privilege(&self, privilege: Privilege) -> bool {
        privilege
            .qualifying_roles()
            .iter()
            .any(|role| self.roles.contains(role))
    }

    /// Check if the AuthToken authorizes for the given `privilege`. If not, return an appropriate
    /// PermissionDenied error.
    pub fn check_privilege(&self, privilege: Privilege) -> Result<(), StoreError> {
        if self.has_privilege(privilege) {
            Ok(())
        } else {
            Err(StoreError::PermissionDenied {
                required_privilege: privilege,
            })
        }
    }
}

/// Authorization token for authorizing access to the data_store for global (not user-specific)
/// actions.
///
/// An GlobalAuthToken can only be created by cli functions via [GlobalAuthToken::create_for_cli].
pub struct GlobalAuthToken {
    roles: Vec<AccessRole>,
}

impl GlobalAuthToken {
    /// Create a new GlobalAuthToken with the AccessRole::Admin.
    ///
    /// This function must only be used by command line interface functions, not in the context of
    /// the web server!
    pub fn create_for_cli(_key: &CliAuthTokenKey) -> Self {
        GlobalAuthToken {
            roles: vec![AccessRole::Admin],
        }
    }

    pub fn has_privilege(&self, privilege: Privilege) -> bool {
        privilege
            .qualifying_roles()
            .iter()
            .any(|role| self.roles.contains(role))
    }

    pub fn check_privilege(&self, privilege: Privilege) -> Result<(), StoreError> {
        if self.has_privilege(privilege) {
            Ok(())
        } else {
            Err(StoreError::PermissionDenied {
                required_privilege: privilege,
            })
        }
    }
}

/// Possible roles of a client.
///
/// Each role qualifies for a set of [Privilege]s. See [Privilege::qualifying_roles].
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Debug)]
pub enum AccessRole {
    /// Any authenticated user
    User,
    /// Users with the staff flag, managing rooms and events
    Staff,
    /// Command line administration. Not available via the web interface.
    Admin,
}

impl AccessRole {
    pub fn name(&self) -> &str {
        match self {
            AccessRole::User => "User",
            AccessRole::Staff => "Staff",
            AccessRole::Admin => "Admin",
        }
    }
}

/// Enum of available authorization privileges.
///
/// Each data_store action and web endpoint typically requires a single privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    ShowEvents,
    /// See non-public events in the event list
    ShowAllEvents,
    ShowProfile,
    BookEvents,
    ListRooms,
    ManageRooms,
    DeleteRooms,
    ManageEvents,
    CancelEvents,
    ManageUsers,
}

impl Privilege {
    /// Get the list of user [AccessRole]s that qualify for this privilege. Each returned role is
    /// individually sufficient for the privilege.
    ///
    /// This is function is our source of truth for authorization!
    pub fn qualifying_roles(&self) -> &'static [AccessRole] {
        match self {
            Privilege::ShowEvents => &[AccessRole::User, AccessRole::Staff],
            Privilege::ShowAllEvents => &[AccessRole::Staff],
            Privilege::ShowProfile => &[AccessRole::User, AccessRole::Staff],
            Privilege::BookEvents => &[AccessRole::User, AccessRole::Staff],
            Privilege::ListRooms => &[AccessRole::Staff],
            Privilege::ManageRooms => &[AccessRole::Staff],
            Privilege::DeleteRooms => &[AccessRole::Staff],
            Privilege::ManageEvents => &[AccessRole::Staff],
            Privilege::CancelEvents => &[AccessRole::Staff],
            Privilege::ManageUsers => &[AccessRole::Admin],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_user_privileges() {
        let token = AuthToken::create_for_session(7, "alice".to_owned(), false);
        assert!(token.has_privilege(Privilege::ShowEvents));
        assert!(token.has_privilege(Privilege::BookEvents));
        assert!(!token.has_privilege(Privilege::ShowAllEvents));
        assert!(!token.has_privilege(Privilege::ManageRooms));
        assert!(matches!(
            token.check_privilege(Privilege::CancelEvents),
            Err(StoreError::PermissionDenied {
                required_privilege: Privilege::CancelEvents
            })
        ));
    }

    #[test]
    fn test_staff_privileges() {
        let token = AuthToken::create_for_session(1, "staff".to_owned(), true);
        assert!(token.has_privilege(Privilege::ShowAllEvents));
        assert!(token.has_privilege(Privilege::DeleteRooms));
        assert!(token.check_privilege(Privilege::ManageEvents).is_ok());
        // Users are only managed from the command line
        assert!(!token.has_privilege(Privilege::ManageUsers));
    }

    #[test]
    fn test_cli_token() {
        let token = GlobalAuthToken::create_for_cli(&CliAuthTokenKey::new());
        assert!(token.check_privilege(Privilege::ManageUsers).is_ok());
        assert!(!token.has_privilege(Privilege::BookEvents));
    }
}
