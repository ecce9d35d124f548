use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{BarId, RoleName, UserId};

/// Body of `POST /impersonate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpersonateRequest {
    #[serde(default)]
    pub impersonated_user_id: Option<UserId>,
    #[serde(default)]
    pub impersonated_user_email: String,
    #[serde(default)]
    pub impersonated_user_role: Option<RoleName>,
    #[serde(default)]
    pub bar_id: Option<BarId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpersonateResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Body of `POST /impersonate/verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyTokenRequest {
    pub token: String,
}
