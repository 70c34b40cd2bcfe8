//! Global input-validation policy and per-DTO field rules.

use crate::error::AppError;
use regex::Regex;
use serde_json::{Map, Value};

/// Global policy installed at startup: strip fields outside the declared
/// set, reject payloads that carry them, coerce string scalars to the
/// declared type.
#[derive(Clone, Copy, Debug)]
pub struct ValidationPolicy {
    pub whitelist: bool,
    pub forbid_non_whitelisted: bool,
    pub transform: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            whitelist: true,
            forbid_non_whitelisted: true,
            transform: true,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum FieldType {
    Text,
    Email,
    /// 32-bit integer column; values outside i32 range fail validation.
    Integer,
    Boolean,
    Uuid,
}

/// Declared shape of one DTO field.
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
    pub max_length: Option<usize>,
}

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

/// Validate a JSON body against the declared fields under the global policy.
/// With `partial` set (PATCH), missing required fields are not an error.
/// Returns the (possibly stripped and coerced) object.
pub fn validate_payload(
    body: Value,
    fields: &[FieldSpec],
    policy: &ValidationPolicy,
    partial: bool,
) -> Result<Map<String, Value>, AppError> {
    let mut map = match body {
        Value::Object(m) => m,
        _ => return Err(AppError::BadRequest("body must be a JSON object".into())),
    };

    let unknown: Vec<String> = map
        .keys()
        .filter(|k| fields.iter().all(|f| f.name != k.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        if policy.forbid_non_whitelisted {
            return Err(AppError::Validation(format!(
                "property {} should not exist",
                unknown.join(", ")
            )));
        }
        if policy.whitelist {
            for key in &unknown {
                map.remove(key);
            }
        }
    }

    for field in fields {
        match map.get_mut(field.name) {
            None | Some(Value::Null) => {
                if field.required && !partial {
                    return Err(AppError::Validation(format!("{} is required", field.name)));
                }
            }
            Some(value) => {
                if policy.transform {
                    coerce(value, field.ty);
                }
                check_field(field, value)?;
            }
        }
    }
    Ok(map)
}

/// Best-effort coercion of string scalars to the declared type. Values that
/// do not parse are left alone and fail the type check instead.
fn coerce(value: &mut Value, ty: FieldType) {
    let Value::String(s) = value else { return };
    match ty {
        FieldType::Integer => {
            if let Ok(n) = s.trim().parse::<i64>() {
                *value = Value::Number(n.into());
            }
        }
        FieldType::Boolean => {
            if s.eq_ignore_ascii_case("true") {
                *value = Value::Bool(true);
            } else if s.eq_ignore_ascii_case("false") {
                *value = Value::Bool(false);
            }
        }
        FieldType::Text | FieldType::Email | FieldType::Uuid => {}
    }
}

fn check_field(field: &FieldSpec, value: &Value) -> Result<(), AppError> {
    match field.ty {
        FieldType::Text => {
            let s = value
                .as_str()
                .ok_or_else(|| AppError::Validation(format!("{} must be a string", field.name)))?;
            if let Some(max) = field.max_length {
                if s.len() > max {
                    return Err(AppError::Validation(format!(
                        "{} must be at most {} characters",
                        field.name, max
                    )));
                }
            }
        }
        FieldType::Email => {
            let s = value
                .as_str()
                .ok_or_else(|| AppError::Validation(format!("{} must be a string", field.name)))?;
            let re = Regex::new(EMAIL_PATTERN)
                .map_err(|_| AppError::Validation(format!("invalid pattern for {}", field.name)))?;
            if !re.is_match(s) {
                return Err(AppError::Validation(format!(
                    "{} must be a valid email",
                    field.name
                )));
            }
            if let Some(max) = field.max_length {
                if s.len() > max {
                    return Err(AppError::Validation(format!(
                        "{} must be at most {} characters",
                        field.name, max
                    )));
                }
            }
        }
        FieldType::Integer => {
            let in_range = value
                .as_i64()
                .is_some_and(|n| i32::try_from(n).is_ok());
            if !in_range {
                return Err(AppError::Validation(format!(
                    "{} must be a 32-bit integer",
                    field.name
                )));
            }
        }
        FieldType::Boolean => {
            if !value.is_boolean() {
                return Err(AppError::Validation(format!(
                    "{} must be a boolean",
                    field.name
                )));
            }
        }
        FieldType::Uuid => {
            let s = value
                .as_str()
                .ok_or_else(|| AppError::Validation(format!("{} must be a string", field.name)))?;
            uuid::Uuid::parse_str(s)
                .map_err(|_| AppError::Validation(format!("{} must be a uuid", field.name)))?;
        }
    }
    Ok(())
}
