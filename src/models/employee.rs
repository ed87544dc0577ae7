//! Employee model shared by the REST service, the HTTP client and the console.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// A single employee record.
///
/// `id` is assigned by the server. A draft that has not been created yet
/// carries an empty id, which is left out of the serialized body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(
        default,
        deserialize_with = "id_from_string_or_number",
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
}

impl Employee {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            email: email.into(),
            department: department.into(),
        }
    }

    /// Same record with the given id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Department => &self.department,
        }
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Department => self.department = value,
        }
    }

    /// True when no field, id included, holds anything.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
            && self.name.is_empty()
            && self.email.is_empty()
            && self.department.is_empty()
    }
}

/// User-editable fields of an [`Employee`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Department,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Department];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Department => "department",
        }
    }

    /// Placeholder shown next to an empty form input.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Field::Name => "Enter Name",
            Field::Email => "Enter Email",
            Field::Department => "Enter Department",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(Field::Name),
            "email" => Ok(Field::Email),
            "department" | "dept" => Ok(Field::Department),
            other => Err(format!("unknown field '{}'", other)),
        }
    }
}

/// Request body for creating or replacing an employee.
///
/// Any id in the body is ignored: the server assigns ids on create and takes
/// the path id on update. Missing fields default to empty so that they are
/// reported as validation errors instead of rejected payloads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: String,
}

/// Same shape a browser accepts for `type="email"`: `local@domain`, no spaces.
pub fn is_well_formed_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

// Services backed by numeric keys send ids as numbers, so accept either representation.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
        Missing(()),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
        RawId::Missing(()) => String::new(),
    })
}
