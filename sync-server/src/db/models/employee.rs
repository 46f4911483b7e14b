//! Employee Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::client::EmployeeView;
use surrealdb::RecordId;
use validator::Validate;

/// Employee ID type
pub type EmployeeId = RecordId;

/// Employee model matching the `employee` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<EmployeeId>,
    pub username: String,
    pub display_name: String,
    pub email: String,
    /// Organization-issued code, e.g. "NXT-0042"
    pub employee_code: String,
    pub feedback_sheet_url: Option<String>,
    #[serde(skip_serializing)]
    pub hash_pass: String,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub has_completed_setup: bool,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_admin: bool,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmployeeCreate {
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub display_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Employee code must not be empty"))]
    pub employee_code: String,
}

/// Update employee payload (self profile edit or admin inline edit)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmployeeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Invalid feedback sheet URL"))]
    pub feedback_sheet_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Employee {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.hash_pass)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    /// Wire view without credentials
    pub fn to_view(&self) -> EmployeeView {
        EmployeeView {
            id: self.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            employee_code: self.employee_code.clone(),
            feedback_sheet_url: self.feedback_sheet_url.clone(),
            has_completed_setup: self.has_completed_setup,
            is_admin: self.is_admin,
            is_active: self.is_active,
        }
    }
}
