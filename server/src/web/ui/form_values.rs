//! This module provides the `FormValue` helper types that encapsulate submitted form string values
//! and validation error messages for validating and converting the user's form input.
//!
//! The collected error messages are only logged by the endpoints. The user gets a generic error
//! flash message instead.

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

#[derive(Deserialize)]
#[serde(transparent)]
pub struct FormValue<T> {
    value: Option<String>,
    #[serde(skip)]
    errors: Vec<String>,
    #[serde(skip)]
    _phantom: PhantomData<T>,
}

/// Trait for types that can be validated and converted directly from their form string
/// representation, without additional data.
///
/// This allows validating (and converting) the value of a [FormValue] of this type by calling
/// `form_value.validate()` (implemented in [_FormValidSimpleValidate::validate] trait).
pub trait ValidateFromFormInput: Sized {
    fn from_form_value(value: &'_ str) -> Result<Self, String>;
}

/// Allow validating/converting the type `R` with the help of this type.
///
/// Every type `D` implementing this trait, can be used as additional validation data for validating
/// (and converting) the value of a [FormValue] of type `R` via the [FormValue::validate_with]
/// function.
pub trait ValidationDataForFormValue<R> {
    fn validate_form_value(self, value: &'_ str) -> Result<R, String>;
}

impl ValidateFromFormInput for String {
    fn from_form_value(value: &'_ str) -> Result<Self, String> {
        Ok(value.to_owned())
    }
}

impl<T> FormValue<T> {
    pub fn validate_with<'d, D: ValidationDataForFormValue<T> + 'd>(
        &'_ mut self,
        data: D,
    ) -> Option<T> {
        if let Some(value) = &self.value {
            match data.validate_form_value(value) {
                Ok(v) => Some(v),
                Err(e) => {
                    self.errors.push(e);
                    None
                }
            }
        } else {
            self.errors.push("Value missing in form data".to_owned());
            None
        }
    }

    /// Get the list of validation errors related to this form value.
    pub fn errors(&self) -> &Vec<String> {
        &self.errors
    }
}

/// The submitted values are left out, since they may contain passwords.
impl<T> Debug for FormValue<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormValue")
            .field("present", &self.value.is_some())
            .field("errors", &self.errors)
            .finish()
    }
}

/// Helper trait with a simplified version of the [FormValue::validate_with] method that is added
/// to the [FormValue] type when the data type `T` does not require validation data.
pub trait _FormValidSimpleValidate<T> {
    fn validate(&mut self) -> Option<T>;
}

impl<T: ValidateFromFormInput> _FormValidSimpleValidate<T> for FormValue<T> {
    fn validate(&mut self) -> Option<T> {
        if let Some(value) = &self.value {
            match T::from_form_value(value) {
                Ok(v) => Some(v),
                Err(e) => {
                    self.errors.push(e);
                    None
                }
            }
        } else {
            self.errors.push("Value missing in form data".to_owned());
            None
        }
    }
}

/// Join the validation errors of the named form fields into a single line for logging.
pub fn error_summary<'a>(fields: impl IntoIterator<Item = (&'a str, &'a Vec<String>)>) -> String {
    fields
        .into_iter()
        .filter(|(_, errors)| !errors.is_empty())
        .map(|(name, errors)| format!("{}: {}", name, errors.join(", ")))
        .collect::<Vec<String>>()
        .join("; ")
}

/// Value of an HTML checkbox input
#[derive(Debug, Default)]
pub struct BoolFormValue {
    value: bool,
}

impl BoolFormValue {
    pub fn get_value(&self) -> bool {
        self.value
    }
}

/// Custom serde Deserialize implementation for BoolFormValue:
/// We want to treat the value like an Option<()>: The value shall be `true` when the field is
/// present (with any value) and `false` if the field is not present.
///
/// We achive this by the custom simple Visitor implementation [BoolFormValueVisitor] that only
/// reacts to `visit_some()` and `visit_none()`
impl<'de> serde::Deserialize<'de> for BoolFormValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_option(BoolFormValueVisitor {})
    }
}

struct BoolFormValueVisitor;

impl<'de> serde::de::Visitor<'de> for BoolFormValueVisitor {
    type Value = BoolFormValue;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("any value (true) or no such field at all")
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: Error,
    {
        Ok(BoolFormValue { value: false })
    }

    fn visit_some<D>(self, _deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(BoolFormValue { value: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::ui::validation::NonEmptyString;

    #[derive(Deserialize)]
    struct TestForm {
        name: FormValue<NonEmptyString>,
        #[serde(default)]
        flag: BoolFormValue,
    }

    #[test]
    fn test_checkbox_presence() {
        let form: TestForm = serde_urlencoded::from_str("name=abc&flag=on").unwrap();
        assert!(form.flag.get_value());
        let form: TestForm = serde_urlencoded::from_str("name=abc").unwrap();
        assert!(!form.flag.get_value());
    }

    #[test]
    fn test_validation_errors_are_collected() {
        let mut form: TestForm = serde_urlencoded::from_str("name=").unwrap();
        assert!(form.name.validate().is_none());
        assert_eq!(form.name.errors().len(), 1);
        assert_eq!(
            error_summary([("name", form.name.errors())]),
            format!("name: {}", form.name.errors()[0])
        );
    }
}
