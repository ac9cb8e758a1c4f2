//! Lead submission payload and its schema parse

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::Error;

/// Numeric fields every submission must carry, in check order
pub const REQUIRED_FIELDS: [&str; 7] = [
    "share",
    "clientHours",
    "clientCost",
    "target",
    "weeks",
    "daysPerWeek",
    "hoursPerDay",
];

/// Free-text fields that default to an empty string
pub const OPTIONAL_FIELDS: [&str; 4] = ["name", "email", "company", "message"];

/// A visitor's booking request, as sent by the form.
///
/// `client_hours` and `client_cost` are derived on the client and are taken
/// as-is; the server does not recompute them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub message: String,

    /// Percentage of annual capacity requested
    pub share: f64,
    pub client_hours: f64,
    pub client_cost: f64,

    /// Capacity snapshot at submission time
    pub target: f64,
    pub weeks: f64,
    pub days_per_week: f64,
    pub hours_per_day: f64,
}

/// A single schema violation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// Field absent or `null`
    Missing(&'static str),
    /// Field present with an unusable value
    Invalid(&'static str),
}

impl Violation {
    pub fn field(&self) -> &'static str {
        match *self {
            Violation::Missing(field) | Violation::Invalid(field) => field,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Missing(field) => write!(f, "Missing field: {}", field),
            Violation::Invalid(field) => write!(f, "Invalid field: {}", field),
        }
    }
}

impl LeadSubmission {
    /// Parse a raw request body.
    ///
    /// Bytes that are not JSON yield `Error::JsonSerialization`; a JSON
    /// document that fails the schema yields `Error::InvalidSubmission`.
    pub fn parse_json(body: &[u8]) -> crate::Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(&value).map_err(Error::InvalidSubmission)
    }

    /// Parse an untyped JSON body into a submission.
    ///
    /// Presence of every required field is checked before any value is
    /// coerced: if fields are missing, only `Missing` violations are returned,
    /// in `REQUIRED_FIELDS` order. A body that is not an object is treated as
    /// an empty object.
    pub fn from_value(value: &Value) -> Result<Self, Vec<Violation>> {
        let empty = Map::new();
        let object = value.as_object().unwrap_or(&empty);

        let missing: Vec<Violation> = REQUIRED_FIELDS
            .into_iter()
            .filter(|field| matches!(object.get(*field), None | Some(Value::Null)))
            .map(Violation::Missing)
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }

        let mut violations = Vec::new();
        let mut numbers = [0.0_f64; REQUIRED_FIELDS.len()];
        for (slot, field) in numbers.iter_mut().zip(REQUIRED_FIELDS) {
            match number_field(object, field) {
                Ok(n) => *slot = n,
                Err(v) => violations.push(v),
            }
        }

        let mut texts: [String; OPTIONAL_FIELDS.len()] = Default::default();
        for (slot, field) in texts.iter_mut().zip(OPTIONAL_FIELDS) {
            match text_field(object, field) {
                Ok(s) => *slot = s,
                Err(v) => violations.push(v),
            }
        }

        if !violations.is_empty() {
            return Err(violations);
        }

        let [name, email, company, message] = texts;
        let [share, client_hours, client_cost, target, weeks, days_per_week, hours_per_day] =
            numbers;

        Ok(Self {
            name,
            email,
            company,
            message,
            share,
            client_hours,
            client_cost,
            target,
            weeks,
            days_per_week,
            hours_per_day,
        })
    }
}

fn number_field(object: &Map<String, Value>, field: &'static str) -> Result<f64, Violation> {
    let n = match object.get(field) {
        None | Some(Value::Null) => return Err(Violation::Missing(field)),
        Some(Value::Number(n)) => n.as_f64(),
        // Numeric strings are accepted, matching how the form's values are coerced
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    n.filter(|n| n.is_finite()).ok_or(Violation::Invalid(field))
}

fn text_field(object: &Map<String, Value>, field: &'static str) -> Result<String, Violation> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(Violation::Invalid(field)),
    }
}
