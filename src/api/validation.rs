//! Field validation for `POST /users` and `PUT /users/{id}` bodies.
//!
//! Every rule runs, failures are collected in field order (name, email, age,
//! role) and nothing is applied unless all of them pass.

use crate::store::{NewUser, Role, UserChanges};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

pub const MAX_AGE: u8 = 125;

const LOCATION_BODY: &str = "body";

/// A single rule violation, serialized as `{msg, param, location}`.
#[derive(ToSchema, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    #[serde(rename = "msg")]
    #[schema(example = "Valid email is required")]
    pub message: String,
    #[serde(rename = "param")]
    #[schema(example = "email")]
    pub field: String,
    #[schema(example = "body")]
    pub location: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            message: message.to_string(),
            field: field.to_string(),
            location: LOCATION_BODY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T> {
    Valid(T),
    Invalid(Vec<FieldError>),
}

impl<T> Validation<T> {
    /// # Errors
    /// Returns the collected violations when invalid.
    pub fn into_result(self) -> Result<T, Vec<FieldError>> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(errors) => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Update,
}

struct Rule {
    field: &'static str,
    message: &'static str,
    /// On update, `null` counts as "not supplied" instead of a bad value.
    nullable: bool,
}

const NAME: Rule = Rule {
    field: "name",
    message: "Name is required",
    nullable: false,
};

const EMAIL: Rule = Rule {
    field: "email",
    message: "Valid email is required",
    nullable: false,
};

const AGE: Rule = Rule {
    field: "age",
    message: "Age must be an integer between 0 and 125",
    nullable: true,
};

const ROLE: Rule = Rule {
    field: "role",
    message: "Role must be either admin or user",
    nullable: false,
};

/// Lightweight email sanity check.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

fn parse_name(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn parse_email(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|email| valid_email(email))
        .map(str::to_string)
}

/// Accepts a JSON integer (`18` or `18.0`) or a string of decimal digits in
/// `[0, 125]`.
fn parse_age(value: &Value) -> Option<u8> {
    let age = match value {
        Value::Number(number) => match number.as_u64() {
            Some(age) => age,
            None => whole_age(number.as_f64()?)?,
        },
        Value::String(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            digits.parse::<u64>().ok()?
        }
        _ => return None,
    };

    u8::try_from(age).ok().filter(|age| *age <= MAX_AGE)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_age(age: f64) -> Option<u64> {
    (age.fract() == 0.0 && (0.0..=f64::from(MAX_AGE)).contains(&age)).then(|| age as u64)
}

fn parse_role(value: &Value) -> Option<Role> {
    value.as_str().and_then(Role::parse)
}

/// Apply `rule` to `body[rule.field]`.
///
/// Returns the parsed value when supplied and valid. Records a violation when
/// the value is invalid, or missing in create mode.
fn check<T>(
    body: &Map<String, Value>,
    rule: &Rule,
    mode: Mode,
    parse: fn(&Value) -> Option<T>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let value = match body.get(rule.field) {
        None => None,
        Some(Value::Null) if mode == Mode::Create || rule.nullable => None,
        Some(value) => Some(value),
    };

    let Some(value) = value else {
        if mode == Mode::Create {
            errors.push(FieldError::new(rule.field, rule.message));
        }
        return None;
    };

    let parsed = parse(value);
    if parsed.is_none() {
        errors.push(FieldError::new(rule.field, rule.message));
    }
    parsed
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, Vec<FieldError>> {
    body.as_object().ok_or_else(|| {
        vec![FieldError::new(
            LOCATION_BODY,
            "Request body must be a JSON object",
        )]
    })
}

/// Validate a create body: every field is required.
#[must_use]
pub fn validate_new_user(body: &Value) -> Validation<NewUser> {
    let body = match as_object(body) {
        Ok(body) => body,
        Err(errors) => return Validation::Invalid(errors),
    };

    let mut errors = Vec::new();
    let name = check(body, &NAME, Mode::Create, parse_name, &mut errors);
    let email = check(body, &EMAIL, Mode::Create, parse_email, &mut errors);
    let age = check(body, &AGE, Mode::Create, parse_age, &mut errors);
    let role = check(body, &ROLE, Mode::Create, parse_role, &mut errors);

    match (name, email, age, role) {
        (Some(name), Some(email), Some(age), Some(role)) if errors.is_empty() => {
            Validation::Valid(NewUser {
                name,
                email,
                age,
                role,
            })
        }
        _ => Validation::Invalid(errors),
    }
}

/// Validate an update body: fields are optional but checked when supplied.
#[must_use]
pub fn validate_user_changes(body: &Value) -> Validation<UserChanges> {
    let body = match as_object(body) {
        Ok(body) => body,
        Err(errors) => return Validation::Invalid(errors),
    };

    let mut errors = Vec::new();
    let changes = UserChanges {
        name: check(body, &NAME, Mode::Update, parse_name, &mut errors),
        email: check(body, &EMAIL, Mode::Update, parse_email, &mut errors),
        age: check(body, &AGE, Mode::Update, parse_age, &mut errors),
        role: check(body, &ROLE, Mode::Update, parse_role, &mut errors),
    };

    if errors.is_empty() {
        Validation::Valid(changes)
    } else {
        Validation::Invalid(errors)
    }
}
