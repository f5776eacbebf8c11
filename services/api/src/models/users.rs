//! User profile and contact info models

use chrono::{DateTime, Utc};
use common::identity::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile of the signed-in user, joined with contact names
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// User as listed for admins
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Stored contact details
#[derive(Debug, Clone, Serialize)]
pub struct ContactInfo {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone_no: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Contact details submitted by a user
#[derive(Debug, Clone, Deserialize)]
pub struct ContactInfoPayload {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone_no: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl ContactInfoPayload {
    /// Trim every field and check lengths against the column limits
    pub fn validate(self) -> Result<Self, String> {
        let first_name = required("First name", &self.first_name, 50)?;
        let last_name = required("Last name", &self.last_name, 50)?;

        Ok(Self {
            first_name,
            last_name,
            phone_no: optional("Phone number", self.phone_no, 20)?,
            street: optional("Street", self.street, 255)?,
            city: optional("City", self.city, 100)?,
            state: optional("State", self.state, 100)?,
        })
    }
}

fn required(field: &str, value: &str, max: usize) -> Result<String, String> {
    optional(field, Some(value.to_string()), max)?.ok_or_else(|| format!("{field} is required"))
}

fn optional(field: &str, value: Option<String>, max: usize) -> Result<Option<String>, String> {
    let Some(value) = value else {
        return Ok(None);
    };

    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if value.chars().count() > max {
        return Err(format!("{field} must be at most {max} characters long"));
    }
    Ok(Some(value.to_string()))
}

/// Role change requested by an admin
#[derive(Debug, Clone, Deserialize)]
pub struct RoleUpdate {
    pub role: Option<String>,
}

impl RoleUpdate {
    pub fn validate(&self) -> Result<Role, String> {
        let role = self
            .role
            .as_deref()
            .filter(|role| !role.trim().is_empty())
            .ok_or_else(|| "Please provide a role".to_string())?;

        role.parse::<Role>().map_err(|e| e.to_string())
    }
}
