use std::env;
use std::env::VarError;
use std::fmt::{Display, Formatter};

const DEFAULT_SESSION_MAX_AGE_DAYS: i64 = 14;

/// Get the database URL from the environment variable.
pub fn get_database_url_from_env() -> Result<String, SetupError> {
    env::var("DATABASE_URL").map_err(|e| SetupError::from_env_error(e, "DATABASE_URL"))
}

/// Get the cryptographic application secret for signing session tokens from the environment
/// variable.
pub fn get_secret_from_env() -> Result<String, SetupError> {
    env::var("SECRET").map_err(|e| SetupError::from_env_error(e, "SECRET"))
}

/// Get the web server TCP listening port from the environment variable
pub fn get_listen_port_from_env() -> Result<u16, SetupError> {
    env::var("LISTEN_PORT")
        .map_err(|e| SetupError::from_env_error(e, "LISTEN_PORT"))
        .and_then(|v| {
            v.parse().map_err(|_| SetupError::EnvVariableInvalid {
                variable_name: "LISTEN_PORT",
                problem: "Not a valid uint16",
            })
        })
}

/// Get the web server TCP listening interface address from the environment variable
pub fn get_listen_address_from_env() -> Result<String, SetupError> {
    env::var("LISTEN_ADDRESS").map_err(|e| SetupError::from_env_error(e, "LISTEN_ADDRESS"))
}

/// Get the time zone for displaying event dates and interpreting form inputs from the
/// "TIME_ZONE" environment variable (IANA name). Defaults to UTC.
pub fn get_time_zone_from_env() -> Result<chrono_tz::Tz, SetupError> {
    match env::var("TIME_ZONE") {
        Err(VarError::NotPresent) => Ok(chrono_tz::Tz::UTC),
        Err(e) => Err(SetupError::from_env_error(e, "TIME_ZONE")),
        Ok(v) => v.parse().map_err(|_| SetupError::EnvVariableInvalid {
            variable_name: "TIME_ZONE",
            problem: "Not a known IANA time zone name",
        }),
    }
}

/// Get the maximum age of session tokens from the "SESSION_MAX_AGE_DAYS" environment variable.
pub fn get_session_max_age_from_env() -> Result<chrono::TimeDelta, SetupError> {
    let days = match env::var("SESSION_MAX_AGE_DAYS") {
        Err(VarError::NotPresent) => DEFAULT_SESSION_MAX_AGE_DAYS,
        Err(e) => return Err(SetupError::from_env_error(e, "SESSION_MAX_AGE_DAYS")),
        Ok(v) => v
            .parse::<i64>()
            .ok()
            .filter(|days| (1..=3650).contains(days))
            .ok_or(SetupError::EnvVariableInvalid {
                variable_name: "SESSION_MAX_AGE_DAYS",
                problem: "Not a number of days between 1 and 3650",
            })?,
    };
    Ok(chrono::TimeDelta::days(days))
}

#[derive(Debug)]
pub enum SetupError {
    EnvVariableMissing {
        variable_name: &'static str,
    },
    EnvVariableInvalid {
        variable_name: &'static str,
        problem: &'static str,
    },
}

impl SetupError {
    fn from_env_error(error: VarError, variable_name: &'static str) -> Self {
        match error {
            VarError::NotPresent => Self::EnvVariableMissing { variable_name },
            VarError::NotUnicode(_) => Self::EnvVariableInvalid {
                variable_name,
                problem: "no valid unicode",
            },
        }
    }
}

impl Display for SetupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::EnvVariableMissing { variable_name } => {
                write!(f, "Environment variable {} must be defined", variable_name)
            }
            SetupError::EnvVariableInvalid {
                variable_name,
                problem,
            } => write!(
                f,
                "Value of environment variable {} is invalid: {}",
                variable_name, problem
            ),
        }
    }
}
