//! Request DTOs for the Depot web API.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Send-passcode request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendPasscodeRequest {
    /// Email address to send the passcode to.
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    /// Full name; required on first sign-up, ignored afterwards.
    #[serde(default)]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub full_name: Option<String>,
}

/// Verify-passcode request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyPasscodeRequest {
    /// Pending account identifier returned by the send-passcode call.
    #[validate(length(min = 1, message = "must not be empty"))]
    pub account_id: String,
    /// The passcode from the email.
    #[validate(length(min = 4, max = 12, message = "must be 4-12 characters"))]
    pub passcode: String,
}

/// Rename request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RenameFileRequest {
    /// New name stem; the extension is preserved.
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
}

/// Collaborator list replacement request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCollaboratorsRequest {
    /// Full collaborator email list.
    #[validate(custom(function = "validate_email_list"))]
    pub emails: Vec<String>,
}

fn validate_email_list(emails: &[String]) -> Result<(), ValidationError> {
    for email in emails {
        if !validator::ValidateEmail::validate_email(email) {
            let mut err = ValidationError::new("email");
            err.message = Some(format!("invalid email address: {email}").into());
            return Err(err);
        }
    }
    Ok(())
}

/// Query parameters for file listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListFilesQuery {
    /// Comma-separated kind filter (e.g. `image,video`).
    pub kind: Option<String>,
    /// Name substring filter.
    pub search: Option<String>,
    /// Sort order (`name-asc`, `name-desc`, `size-asc`, `size-desc`,
    /// `date-asc`, `date-desc`).
    pub sort: Option<String>,
    /// Maximum number of rows.
    pub limit: Option<i64>,
}
