//! DTOs for the Identity Toolkit `signInWithPassword` call.

use serde::{Deserialize, Serialize};

use crate::domain::{Identity, IdentityValidationError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SignInRequestDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SignInResponseDto {
    pub(super) local_id: String,
    #[serde(default)]
    pub(super) email: String,
    #[serde(default)]
    pub(super) display_name: String,
    pub(super) id_token: String,
}

impl SignInResponseDto {
    pub(super) fn identity(&self) -> Result<Identity, IdentityValidationError> {
        Identity::try_from_strings(&self.local_id, self.display_name.as_str(), self.email.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelopeDto {
    pub(super) error: ErrorBodyDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    pub(super) message: String,
}

impl ErrorBodyDto {
    /// Error code without the optional ` : detail` suffix.
    pub(super) fn code(&self) -> &str {
        self.message
            .split_once(" : ")
            .map_or(self.message.as_str(), |(code, _)| code)
            .trim()
    }
}
