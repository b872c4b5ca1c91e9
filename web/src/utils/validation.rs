//! Field checks run before any auth call, matching what the login, sign-up
//! and account-recovery forms enforce.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid regex"));
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{3}-\d{3,4}-\d{4}$").expect("valid regex"));

pub const MIN_USERNAME_LEN: usize = 4;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Problems found in one form, in field order. Displays as the messages
/// joined by a space.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{}", join_messages(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a problem unless `field` already has one.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        if self.get(field).is_none() {
            self.errors.push(FieldError {
                field,
                message: message.into(),
            });
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Korean mobile/landline format, e.g. `010-1234-5678`.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE.is_match(phone)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.username.trim().is_empty() {
            errors.add("username", "Enter your username.");
        }
        if self.password.is_empty() {
            errors.add("password", "Enter your password.");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub email: String,
    pub phone: String,
    pub agree_terms: bool,
}

impl RegistrationForm {
    /// Rules for the account fields themselves.
    pub fn validate_account(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.check_account(&mut errors);
        errors.into_result()
    }

    /// Everything the sign-up page checks, including the confirmation field,
    /// the terms box and a completed email verification.
    pub fn validate(&self, email_verified: bool) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.check_account(&mut errors);

        if self.password != self.confirm_password {
            errors.add("confirm_password", "Passwords do not match.");
        }
        if !email_verified {
            errors.add("email", "Email verification is required.");
        }
        if !self.agree_terms {
            errors.add("agree_terms", "You must agree to the terms of service.");
        }
        errors.into_result()
    }

    fn check_account(&self, errors: &mut ValidationErrors) {
        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", "Enter a username.");
        } else if username.chars().count() < MIN_USERNAME_LEN {
            errors.add(
                "username",
                format!("Usernames must be at least {MIN_USERNAME_LEN} characters."),
            );
        }

        check_new_password(errors, &self.password);

        if self.email.is_empty() {
            errors.add("email", "Enter an email address.");
        } else if !is_valid_email(&self.email) {
            errors.add("email", "Enter a valid email address.");
        }

        if self.phone.is_empty() {
            errors.add("phone", "Enter a phone number.");
        } else if !is_valid_phone(&self.phone) {
            errors.add("phone", "Use the format 010-1234-5678.");
        }
    }
}

fn check_new_password(errors: &mut ValidationErrors, password: &str) {
    if password.is_empty() {
        errors.add("password", "Enter a password.");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("Passwords must be at least {MIN_PASSWORD_LEN} characters."),
        );
    }
}

pub fn validate_email(email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if email.is_empty() {
        errors.add("email", "Enter an email address.");
    } else if !is_valid_email(email) {
        errors.add("email", "Enter a valid email address.");
    }
    errors.into_result()
}

pub fn validate_find_username(email: &str, phone: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if email.is_empty() || phone.is_empty() {
        errors.add("form", "Enter both your email and phone number.");
    }
    errors.into_result()
}

pub fn validate_reset_request(
    username: &str,
    email: &str,
    phone: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if username.is_empty() || email.is_empty() || phone.is_empty() {
        errors.add("form", "Enter your username, email and phone number.");
    }
    errors.into_result()
}

pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if password.is_empty() || confirm.is_empty() {
        errors.add("password", "Enter the new password and its confirmation.");
    }
    check_new_password(&mut errors, password);
    if password != confirm {
        errors.add("confirm_password", "Passwords do not match.");
    }
    errors.into_result()
}
