//! Signing and verification of impersonation bearer tokens.
//!
//! Tokens are HS256 JWTs shaped like the backend's own session tokens so that
//! row-level policies see the impersonated user. The signing secret must only
//! live in trusted back-office processes.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use shared::domain::{BarId, RoleName, UserId};
use tracing::{debug, warn};
use url::Url;

mod claims;
mod error;
mod expiry;

pub use claims::{AppMetadata, ImpersonationClaims, UserMetadata, AUDIENCE, PROVIDER};
pub use error::ImpersonationError;
pub use expiry::{parse_expires_in, DEFAULT_EXPIRES_IN};

pub const DEFAULT_ISSUER: &str = "https://supabase.io";

#[derive(Debug)]
pub struct ImpersonationConfig {
    pub secret: Option<SecretString>,
    pub issuer: Url,
}

/// Who is being impersonated, and for how long.
#[derive(Debug, Clone)]
pub struct ImpersonationGrant {
    pub user_id: UserId,
    pub email: String,
    pub role: RoleName,
    pub bar_id: Option<BarId>,
    pub expires_in: String,
}

impl ImpersonationGrant {
    pub fn new(user_id: UserId, email: impl Into<String>, role: RoleName) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
            bar_id: None,
            expires_in: DEFAULT_EXPIRES_IN.to_string(),
        }
    }

    pub fn for_bar(mut self, bar_id: BarId) -> Self {
        self.bar_id = Some(bar_id);
        self
    }

    pub fn expires_in(mut self, expires_in: impl Into<String>) -> Self {
        self.expires_in = expires_in.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct TokenService {
    config: ImpersonationConfig,
}

impl TokenService {
    pub fn new(config: ImpersonationConfig) -> Self {
        Self { config }
    }

    /// `iss` claim value; the root path's trailing slash is dropped.
    pub fn issuer(&self) -> &str {
        self.config.issuer.as_str().trim_end_matches('/')
    }

    pub fn is_configured(&self) -> bool {
        self.secret().is_ok()
    }

    pub fn sign(
        &self,
        user_id: UserId,
        email: &str,
        role: &RoleName,
        expires_in: &str,
    ) -> Result<String, ImpersonationError> {
        let grant = ImpersonationGrant::new(user_id, email, role.clone()).expires_in(expires_in);
        self.issue(&grant).map(|signed| signed.token)
    }

    pub fn issue(&self, grant: &ImpersonationGrant) -> Result<SignedToken, ImpersonationError> {
        self.issue_at(grant, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        grant: &ImpersonationGrant,
        now: DateTime<Utc>,
    ) -> Result<SignedToken, ImpersonationError> {
        let secret = self.secret()?;
        let lifetime = parse_expires_in(&grant.expires_in)?;
        let expires_at = now.checked_add_signed(lifetime).ok_or_else(|| {
            ImpersonationError::InvalidExpiry {
                input: grant.expires_in.clone(),
                reason: "expiry falls outside the representable date range".to_string(),
            }
        })?;

        let claims = ImpersonationClaims {
            sub: grant.user_id,
            aud: AUDIENCE.to_string(),
            role: grant.role.to_string(),
            email: grant.email.clone(),
            email_verified: true,
            phone_verified: false,
            app_metadata: AppMetadata {
                provider: PROVIDER.to_string(),
                impersonated_at: now.to_rfc3339(),
                bar_id: grant.bar_id,
                bar_role: grant.role.to_string(),
            },
            user_metadata: UserMetadata {
                impersonation: true,
            },
            iss: self.issuer().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(ImpersonationError::Signing)?;

        debug!(
            user_id = %grant.user_id,
            role = %grant.role,
            %expires_at,
            "signed impersonation token"
        );
        Ok(SignedToken { token, expires_at })
    }

    pub fn verify(&self, token: &str) -> Result<ImpersonationClaims, ImpersonationError> {
        let secret = self.secret()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(&[AUDIENCE]);
        validation.set_issuer(&[self.issuer()]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);

        decode::<ImpersonationClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|err| {
            let reason = match err.kind() {
                ErrorKind::ExpiredSignature => "token expired".to_string(),
                ErrorKind::InvalidSignature => "signature mismatch".to_string(),
                ErrorKind::InvalidAudience => "unexpected audience".to_string(),
                ErrorKind::InvalidIssuer => "unexpected issuer".to_string(),
                _ => err.to_string(),
            };
            warn!(%reason, "rejected impersonation token");
            ImpersonationError::InvalidToken(reason)
        })
    }

    fn secret(&self) -> Result<&str, ImpersonationError> {
        self.config
            .secret
            .as_ref()
            .map(|secret| secret.expose_secret())
            .filter(|secret| !secret.is_empty())
            .ok_or_else(ImpersonationError::missing_secret)
    }
}

/// Decodes the payload segment without checking the signature.
pub fn inspect(token: &str) -> Result<ImpersonationClaims, ImpersonationError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(ImpersonationError::InvalidToken(
            "expected three dot-separated segments".to_string(),
        ));
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload).map_err(|err| {
        ImpersonationError::InvalidToken(format!("payload is not base64url: {err}"))
    })?;
    serde_json::from_slice(&bytes).map_err(|err| {
        ImpersonationError::InvalidToken(format!("payload is not a claim set: {err}"))
    })
}

#[cfg(test)]
#[path = "tests/token_tests.rs"]
mod tests;
