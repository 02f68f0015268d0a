use crate::web::ui::form_values::{ValidateFromFormInput, ValidationDataForFormValue};
use chrono::TimeZone;
use lazy_static::lazy_static;
use std::fmt::Debug;

#[derive(Default, Debug)]
pub struct NonEmptyString(pub String);

impl NonEmptyString {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ValidateFromFormInput for NonEmptyString {
    fn from_form_value(value: &str) -> Result<Self, String> {
        if value.is_empty() {
            Err("Must not be empty".to_owned())
        } else {
            Ok(NonEmptyString(value.to_owned()))
        }
    }
}

/// Name of a room or an event. These are used as primary keys and as URL path segments, so they
/// must be non-empty, not longer than 255 characters and must not contain slashes.
#[derive(Debug, PartialEq)]
pub struct EntityName(pub String);

impl EntityName {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ValidateFromFormInput for EntityName {
    fn from_form_value(value: &str) -> Result<Self, String> {
        let value = value.trim();
        if value.is_empty() {
            Err("Must not be empty".to_owned())
        } else if value.chars().count() > 255 {
            Err("Must not be longer than 255 characters".to_owned())
        } else if value.contains('/') {
            Err("Must not contain '/'".to_owned())
        } else {
            Ok(EntityName(value.to_owned()))
        }
    }
}

/// A username, following the usual rules: 1 to 150 letters, digits and the characters `@.+-_`
#[derive(Debug, PartialEq)]
pub struct Username(pub String);

impl Username {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ValidateFromFormInput for Username {
    fn from_form_value(value: &str) -> Result<Self, String> {
        lazy_static! {
            static ref RE: regex::Regex = regex::Regex::new(r"^[\w.@+-]{1,150}$").unwrap();
        }
        if !RE.is_match(value) {
            return Err(
                "Only letters, digits and @/./+/-/_ are allowed, at most 150 characters".to_owned(),
            );
        }
        Ok(Username(value.to_owned()))
    }
}

/// An optional email address: Either empty or a plausible address
#[derive(Debug, PartialEq)]
pub struct OptionalEmail(pub String);

impl OptionalEmail {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ValidateFromFormInput for OptionalEmail {
    fn from_form_value(value: &str) -> Result<Self, String> {
        lazy_static! {
            static ref RE: regex::Regex =
                regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
        }
        let value = value.trim();
        if !value.is_empty() && (!RE.is_match(value) || value.chars().count() > 254) {
            return Err("Not a valid email address".to_owned());
        }
        Ok(OptionalEmail(value.to_owned()))
    }
}

/// A short free text (like a person's name), at most 150 characters, may be empty
#[derive(Debug, PartialEq)]
pub struct ShortText(pub String);

impl ShortText {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ValidateFromFormInput for ShortText {
    fn from_form_value(value: &str) -> Result<Self, String> {
        let value = value.trim();
        if value.chars().count() > 150 {
            return Err("Must not be longer than 150 characters".to_owned());
        }
        Ok(ShortText(value.to_owned()))
    }
}

#[derive(Debug, PartialEq, Default)]
pub struct NonNegativeInt32(pub i32);

impl NonNegativeInt32 {
    pub fn into_inner(self) -> i32 {
        self.0
    }
}

impl ValidateFromFormInput for NonNegativeInt32 {
    fn from_form_value(value: &'_ str) -> Result<Self, String> {
        let value = value
            .trim()
            .parse::<i32>()
            .map_err(|e| format!("Not a number: {}", e))?;
        if value < 0 {
            return Err("Must not be negative".to_owned());
        }
        Ok(Self(value))
    }
}

/// Name of one of the existing rooms, given as validation data
#[derive(Debug, PartialEq)]
pub struct RoomNameFromList(pub String);

impl RoomNameFromList {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ValidationDataForFormValue<RoomNameFromList> for &Vec<String> {
    fn validate_form_value(self, value: &'_ str) -> Result<RoomNameFromList, String> {
        if self.iter().any(|name| name == value) {
            Ok(RoomNameFromList(value.to_owned()))
        } else {
            Err("Unknown room".to_owned())
        }
    }
}

/// A timestamp, entered via a `datetime-local` input and interpreted in the given time zone
#[derive(Debug, PartialEq)]
pub struct DateTimeLocal(pub chrono::DateTime<chrono::Utc>);

impl DateTimeLocal {
    pub fn into_inner(self) -> chrono::DateTime<chrono::Utc> {
        self.0
    }
}

impl ValidationDataForFormValue<DateTimeLocal> for &chrono_tz::Tz {
    fn validate_form_value(self, value: &'_ str) -> Result<DateTimeLocal, String> {
        // See https://developer.mozilla.org/en-US/docs/Web/HTML/Guides/Date_and_time_formats#local_date_and_time_strings
        let naive = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
            .or_else(|_| chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
            .map_err(|e| format!("Could not parse as as ISO-formatted datetime value: {e}"))?;
        // Ambiguous local times (end of daylight saving time) resolve to the earlier instant
        self.from_local_datetime(&naive)
            .earliest()
            .map(|timestamp| DateTimeLocal(timestamp.with_timezone(&chrono::Utc)))
            .ok_or_else(|| format!("{} does not exist in time zone {}", naive, self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_entity_name() {
        assert_eq!(
            EntityName::from_form_value("  Main Hall ").unwrap(),
            EntityName("Main Hall".to_owned())
        );
        assert!(EntityName::from_form_value("   ").is_err());
        assert!(EntityName::from_form_value("a/b").is_err());
        assert!(EntityName::from_form_value(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_non_negative_int() {
        assert_eq!(NonNegativeInt32::from_form_value("0").unwrap().into_inner(), 0);
        assert_eq!(NonNegativeInt32::from_form_value(" 25").unwrap().into_inner(), 25);
        assert!(NonNegativeInt32::from_form_value("-1").is_err());
        assert!(NonNegativeInt32::from_form_value("ten").is_err());
    }

    #[test]
    fn test_username_and_email() {
        assert!(Username::from_form_value("alice.smith+1@home").is_ok());
        assert!(Username::from_form_value("alice smith").is_err());
        assert!(Username::from_form_value("").is_err());
        assert_eq!(OptionalEmail::from_form_value("").unwrap().into_inner(), "");
        assert!(OptionalEmail::from_form_value("alice@example.com").is_ok());
        assert!(OptionalEmail::from_form_value("alice@").is_err());
    }

    #[test]
    fn test_room_name_from_list() {
        let rooms = vec!["Hall".to_owned(), "Lab".to_owned()];
        let result: Result<RoomNameFromList, String> = (&rooms).validate_form_value("Lab");
        assert_eq!(result.unwrap().into_inner(), "Lab");
        let result: Result<RoomNameFromList, String> = (&rooms).validate_form_value("Attic");
        assert!(result.is_err());
    }

    #[test]
    fn test_datetime_local_in_time_zone() {
        let tz = chrono_tz::Europe::Berlin;
        let result: DateTimeLocal = (&tz).validate_form_value("2026-07-01T18:30").unwrap();
        assert_eq!(
            result.into_inner(),
            Utc.with_ymd_and_hms(2026, 7, 1, 16, 30, 0).unwrap()
        );
        let result: Result<DateTimeLocal, String> = (&tz).validate_form_value("2026-07-01");
        assert!(result.is_err());
        // Skipped by the switch to daylight saving time
        let result: Result<DateTimeLocal, String> = (&tz).validate_form_value("2026-03-29T02:30");
        assert!(result.is_err());
    }
}
