//! Declared input contracts and their validation.
//!
//! Every entrypoint declares the fields it accepts. Validation turns an
//! untyped JSON input into a [`ValidatedInput`] with defaults applied, or a
//! list of field-level errors. Unknown fields are dropped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Type and constraints of a single input field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum FieldKind {
    Text {
        min_len: usize,
        max_len: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        one_of: Option<Vec<String>>,
    },
    Integer {
        min: i64,
        max: i64,
    },
    Boolean,
}

/// One declared input field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    pub description: String,
}

impl FieldSpec {
    /// A required text field of 1..=256 characters.
    pub fn text(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(
            name,
            description,
            FieldKind::Text {
                min_len: 1,
                max_len: 256,
                one_of: None,
            },
        )
    }

    /// A required integer field within `min..=max`.
    pub fn integer(
        name: impl Into<String>,
        description: impl Into<String>,
        min: i64,
        max: i64,
    ) -> Self {
        Self::new(name, description, FieldKind::Integer { min, max })
    }

    /// A required boolean field.
    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, FieldKind::Boolean)
    }

    fn new(name: impl Into<String>, description: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
            description: description.into(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Make the field optional, filling `value` when absent.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.required = false;
        self.default = Some(value.into());
        self
    }

    pub fn max_len(mut self, max: usize) -> Self {
        if let FieldKind::Text { max_len, .. } = &mut self.kind {
            *max_len = max;
        }
        self
    }

    /// Restrict a text field to a fixed set of values.
    pub fn one_of(mut self, options: &[&str]) -> Self {
        if let FieldKind::Text { one_of, .. } = &mut self.kind {
            *one_of = Some(options.iter().map(|o| o.to_string()).collect());
        }
        self
    }

    fn check(&self, value: &Value) -> Result<Value, String> {
        match &self.kind {
            FieldKind::Text {
                min_len,
                max_len,
                one_of,
            } => {
                let text = value.as_str().ok_or("expected a string")?;
                let len = text.chars().count();
                if len < *min_len {
                    return Err(format!("must be at least {} characters", min_len));
                }
                if len > *max_len {
                    return Err(format!("must be at most {} characters", max_len));
                }
                if let Some(options) = one_of {
                    if !options.iter().any(|o| o == text) {
                        return Err(format!("must be one of: {}", options.join(", ")));
                    }
                }
                Ok(Value::String(text.to_string()))
            }
            FieldKind::Integer { min, max } => {
                let number = match value {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                }
                .ok_or("expected an integer")?;
                if number < *min || number > *max {
                    return Err(format!("must be between {} and {}", min, max));
                }
                Ok(Value::from(number))
            }
            FieldKind::Boolean => match value {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                Value::String(s) if s == "true" => Ok(Value::Bool(true)),
                Value::String(s) if s == "false" => Ok(Value::Bool(false)),
                _ => Err("expected a boolean".to_string()),
            },
        }
    }
}

/// A field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field path (`$` for the input as a whole)
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// The declared input of an entrypoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InputContract {
    fields: Vec<FieldSpec>,
}

impl InputContract {
    /// A contract accepting no fields.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Check `raw` against the contract.
    ///
    /// `null` is accepted as an empty object. All field errors are
    /// collected rather than stopping at the first one.
    pub fn validate(&self, raw: &Value) -> Result<ValidatedInput, Vec<FieldError>> {
        let empty = Map::new();
        let object = match raw {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => return Err(vec![FieldError::new("$", "input must be a JSON object")]),
        };

        let mut values = Map::new();
        let mut errors = Vec::new();

        for spec in &self.fields {
            match object.get(&spec.name).filter(|v| !v.is_null()) {
                Some(value) => match spec.check(value) {
                    Ok(checked) => {
                        values.insert(spec.name.clone(), checked);
                    }
                    Err(reason) => errors.push(FieldError::new(&spec.name, reason)),
                },
                None if spec.required => errors.push(FieldError::new(&spec.name, "is required")),
                None => {
                    if let Some(default) = &spec.default {
                        values.insert(spec.name.clone(), default.clone());
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(ValidatedInput { values })
        } else {
            Err(errors)
        }
    }
}

/// Input that passed its contract, with defaults filled in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedInput {
    values: Map<String, Value>,
}

impl ValidatedInput {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(Value::as_i64)
    }

    /// Integer field as a non-negative size.
    pub fn size(&self, name: &str) -> Option<usize> {
        self.integer(name).and_then(|n| usize::try_from(n).ok())
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(Value::as_bool)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}
