//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{NewUser, SignupRequest};

/// Validate a first or last name
pub fn validate_name(field: &str, name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("{field} is required"));
    }

    if name.chars().count() > 50 {
        return Err(format!("{field} must be at most 50 characters long"));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 100 {
        return Err("Email must be at most 100 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !(has_upper && has_lower && has_digit) {
        return Err(
            "Password must contain an uppercase letter, a lowercase letter and a digit".to_string(),
        );
    }

    Ok(())
}

/// Validate a signup payload and normalize it into a [`NewUser`]
pub fn validate_signup(request: &SignupRequest) -> Result<NewUser, String> {
    let email = request.email.trim().to_ascii_lowercase();

    validate_name("First name", &request.first_name)?;
    validate_name("Last name", &request.last_name)?;
    validate_email(&email)?;
    validate_password(&request.password)?;

    if !request.role.is_self_assignable() {
        return Err(format!("Role {} cannot be chosen at signup", request.role));
    }

    Ok(NewUser {
        email,
        password: request.password.clone(),
        role: request.role,
        first_name: request.first_name.trim().to_string(),
        last_name: request.last_name.trim().to_string(),
    })
}
