use serde::{Deserialize, Serialize};
use shared::domain::{BarId, UserId};

pub const AUDIENCE: &str = "authenticated";
pub const PROVIDER: &str = "custom_impersonate";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    pub provider: String,
    /// RFC 3339 timestamp of the impersonation grant.
    pub impersonated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bar_id: Option<BarId>,
    pub bar_role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    pub impersonation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpersonationClaims {
    pub sub: UserId,
    pub aud: String,
    pub role: String,
    pub email: String,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub app_metadata: AppMetadata,
    pub user_metadata: UserMetadata,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl ImpersonationClaims {
    pub fn is_impersonation(&self) -> bool {
        self.user_metadata.impersonation && self.app_metadata.provider == PROVIDER
    }
}
