//! Field-level checks run before any remote call.

use crate::auth::AuthError;

pub const PASSWORD_MIN_LEN: usize = 6;
pub const NAME_MIN_LEN: usize = 2;

pub fn email(value: &str) -> Result<(), AuthError> {
    let value = value.trim();
    let well_formed = value
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'))
        .unwrap_or(false);

    if well_formed {
        Ok(())
    } else {
        Err(AuthError::Validation {
            field: "email",
            message: "enter a valid email address",
        })
    }
}

pub fn password(value: &str) -> Result<(), AuthError> {
    if value.chars().count() >= PASSWORD_MIN_LEN {
        Ok(())
    } else {
        Err(AuthError::Validation {
            field: "password",
            message: "password must be at least 6 characters",
        })
    }
}

pub fn display_name(value: &str) -> Result<(), AuthError> {
    if value.trim().chars().count() >= NAME_MIN_LEN {
        Ok(())
    } else {
        Err(AuthError::Validation {
            field: "name",
            message: "name must be at least 2 characters",
        })
    }
}
