//! Admin session service
//!
//! The admin is identified by a signed, http-only `isLoggedIn` cookie whose
//! value is `<nonce>.<hex hmac-sha256(nonce)>`. There is no server-side
//! session table; a cookie is valid as long as its signature checks out
//! against the configured secret.
//!
//! Credentials are compared as plain text against the configured admin
//! account.

use crate::config::AdminConfig;
use data_encoding::HEXLOWER;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Name of the admin session cookie
pub const SESSION_COOKIE: &str = "isLoggedIn";

/// Error types for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid session secret")]
    InvalidSecret,
}

/// Signs and verifies session tokens
#[derive(Clone)]
pub struct SessionSigner {
    mac: HmacSha256,
}

impl SessionSigner {
    pub fn new(secret: &[u8]) -> Result<Self, SessionError> {
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| SessionError::InvalidSecret)?;
        Ok(Self { mac })
    }

    /// Issue a fresh signed token
    pub fn issue(&self) -> String {
        let nonce = Uuid::new_v4().simple().to_string();
        let signature = self.sign(&nonce);
        format!("{}.{}", nonce, signature)
    }

    /// Check a token's signature
    pub fn verify(&self, token: &str) -> bool {
        let Some((nonce, signature)) = token.split_once('.') else {
            return false;
        };
        let Ok(expected) = HEXLOWER.decode(signature.as_bytes()) else {
            return false;
        };

        let mut mac = self.mac.clone();
        mac.update(nonce.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    fn sign(&self, nonce: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(nonce.as_bytes());
        HEXLOWER.encode(&mac.finalize().into_bytes())
    }
}

/// Generate a random session secret
pub fn generate_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Admin login and session cookie handling
pub struct SessionService {
    signer: SessionSigner,
    email: Option<String>,
    password: Option<String>,
    secure_cookie: bool,
    max_age: Option<u64>,
}

impl SessionService {
    pub fn new(config: &AdminConfig, secret: &str) -> Result<Self, SessionError> {
        Ok(Self {
            signer: SessionSigner::new(secret.as_bytes())?,
            email: config.email.clone().filter(|e| !e.is_empty()),
            password: config.password.clone().filter(|p| !p.is_empty()),
            secure_cookie: config.secure_cookie,
            max_age: config.session_max_age,
        })
    }

    /// Verify credentials and return the `Set-Cookie` value for the new session.
    ///
    /// Always fails when no admin account is configured.
    pub fn login(&self, email: &str, password: &str) -> Result<String, SessionError> {
        let (Some(expected_email), Some(expected_password)) = (&self.email, &self.password) else {
            return Err(SessionError::InvalidCredentials);
        };
        if email != expected_email || password != expected_password {
            return Err(SessionError::InvalidCredentials);
        }

        Ok(self.build_cookie(&self.signer.issue(), self.max_age))
    }

    /// `Set-Cookie` value that clears the session
    pub fn logout_cookie(&self) -> String {
        self.build_cookie("", Some(0))
    }

    /// Whether a cookie value carries a valid admin session
    pub fn is_authenticated(&self, token: &str) -> bool {
        !token.is_empty() && self.signer.verify(token)
    }

    fn build_cookie(&self, value: &str, max_age: Option<u64>) -> String {
        let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, value);
        if let Some(age) = max_age {
            cookie.push_str(&format!("; Max-Age={}", age));
        }
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_config() -> AdminConfig {
        AdminConfig {
            email: Some("admin@neonecy.com".to_string()),
            password: Some("hunter2".to_string()),
            ..Default::default()
        }
    }

    fn cookie_value(set_cookie: &str) -> &str {
        set_cookie
            .split(';')
            .next()
            .and_then(|pair| pair.strip_prefix("isLoggedIn="))
            .unwrap()
    }

    #[test]
    fn test_issued_token_verifies() {
        let signer = SessionSigner::new(b"secret").unwrap();
        let token = signer.issue();
        assert!(signer.verify(&token));
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let a = SessionSigner::new(b"secret-a").unwrap();
        let b = SessionSigner::new(b"secret-b").unwrap();
        assert!(!b.verify(&a.issue()));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let signer = SessionSigner::new(b"secret").unwrap();
        assert!(!signer.verify(""));
        assert!(!signer.verify("true"));
        assert!(!signer.verify("abc.not-hex"));
        assert!(!signer.verify("abc.00ff"));
    }

    #[test]
    fn test_login_with_valid_credentials() {
        let service = SessionService::new(&admin_config(), "secret").unwrap();
        let cookie = service.login("admin@neonecy.com", "hunter2").unwrap();

        assert!(cookie.starts_with("isLoggedIn="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Max-Age"));
        assert!(service.is_authenticated(cookie_value(&cookie)));
    }

    #[test]
    fn test_login_with_wrong_credentials() {
        let service = SessionService::new(&admin_config(), "secret").unwrap();
        assert!(matches!(
            service.login("admin@neonecy.com", "wrong"),
            Err(SessionError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("other@neonecy.com", "hunter2"),
            Err(SessionError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_login_fails_without_configured_account() {
        let service = SessionService::new(&AdminConfig::default(), "secret").unwrap();
        assert!(service.login("", "").is_err());
    }

    #[test]
    fn test_logout_cookie_expires_session() {
        let config = AdminConfig {
            secure_cookie: true,
            ..admin_config()
        };
        let service = SessionService::new(&config, "secret").unwrap();
        let cookie = service.logout_cookie();

        assert!(cookie.starts_with("isLoggedIn=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("Secure"));
        assert!(!service.is_authenticated(cookie_value(&cookie)));
    }

    #[test]
    fn test_session_max_age_is_applied() {
        let config = AdminConfig {
            session_max_age: Some(3600),
            ..admin_config()
        };
        let service = SessionService::new(&config, "secret").unwrap();
        let cookie = service.login("admin@neonecy.com", "hunter2").unwrap();
        assert!(cookie.contains("Max-Age=3600"));
    }

    #[test]
    fn test_generated_secrets_differ() {
        assert_ne!(generate_secret(), generate_secret());
        assert_eq!(generate_secret().len(), 64);
    }
}
