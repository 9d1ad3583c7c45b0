//! Decoding and validation of contact payloads
//!
//! Encoding is plain `serde` on [`Contact`](crate::Contact). Decoding works
//! on a `serde_json::Value` so every offending field can be reported at once
//! instead of stopping at the first type error. Keys other than `name` and
//! `email` are ignored, `id` included.

use crate::types::{ContactChanges, NewContact};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Key used for errors that are not tied to a single field
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const NOT_STRING: &str = "Not a valid string.";
const NOT_OBJECT: &str = "Invalid data. Expected a dictionary.";
const NO_FIELDS: &str = "At least one of the fields name, email must be provided.";

const WRITABLE_FIELDS: [&str; 2] = ["name", "email"];

/// Field-keyed validation messages, in field declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.errors.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.errors.push((field.to_string(), vec![message])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages recorded for `field`, if any
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.errors
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|(name, _)| name.as_str())
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for (field, messages) in &self.errors {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Decode a create payload; `name` and `email` are both required
pub fn decode_create(payload: &Value) -> Result<NewContact, ValidationErrors> {
    decode_full(payload)
}

/// Decode a full-replacement payload; same rules as create
pub fn decode_replace(payload: &Value) -> Result<NewContact, ValidationErrors> {
    decode_full(payload)
}

/// Decode a partial update; at least one writable field must be present
pub fn decode_partial(payload: &Value) -> Result<ContactChanges, ValidationErrors> {
    let object = as_object(payload)?;
    let mut errors = ValidationErrors::new();

    let name = optional_string(object, "name", &mut errors);
    let email = optional_string(object, "email", &mut errors);

    if errors.is_empty() && name.is_none() && email.is_none() {
        errors.add(NON_FIELD_ERRORS, NO_FIELDS);
    }

    errors.into_result(ContactChanges { name, email })
}

fn decode_full(payload: &Value) -> Result<NewContact, ValidationErrors> {
    let object = as_object(payload)?;
    let mut errors = ValidationErrors::new();

    let mut required = |field: &str| {
        if object.contains_key(field) {
            optional_string(object, field, &mut errors)
        } else {
            errors.add(field, REQUIRED);
            None
        }
    };
    let name = required(WRITABLE_FIELDS[0]);
    let email = required(WRITABLE_FIELDS[1]);

    match (name, email) {
        (Some(name), Some(email)) => errors.into_result(NewContact { name, email }),
        _ => Err(errors),
    }
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    payload.as_object().ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.add(NON_FIELD_ERRORS, NOT_OBJECT);
        errors
    })
}

/// Validate `field` if present and return it with surrounding whitespace
/// removed; absent fields yield `None` without error
fn optional_string(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match object.get(field)? {
        Value::Null => {
            errors.add(field, NOT_NULL);
            None
        }
        Value::String(s) if s.trim().is_empty() => {
            errors.add(field, NOT_BLANK);
            None
        }
        Value::String(s) => Some(s.trim().to_string()),
        _ => {
            errors.add(field, NOT_STRING);
            None
        }
    }
}
