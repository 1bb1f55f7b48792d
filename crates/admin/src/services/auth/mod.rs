//! Admin authentication service.
//!
//! A fixed directory of back-office accounts, for development only. Passwords
//! are argon2-hashed when the directory is built and verified with argon2 on
//! login. Any mismatch yields the same [`AuthError::InvalidCredentials`].

mod error;

pub use error::AuthError;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use jfk_cannabis_core::{AdminUserId, Email, Role};

use crate::models::AdminUser;

/// Development accounts: (id, email, name, role, password).
const DEVELOPMENT_ACCOUNTS: &[(i32, &str, &str, Role, &str)] = &[
    (1, "admin@jfkcannabis.com", "Store Admin", Role::Admin, "admin123"),
    (2, "manager@jfkcannabis.com", "Store Manager", Role::Manager, "manager123"),
];

struct Account {
    user: AdminUser,
    password_hash: String,
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: AdminUser,
    pub token: String,
}

/// Back-office account directory.
pub struct AdminDirectory {
    accounts: Vec<Account>,
}

impl AdminDirectory {
    /// Directory with the two development accounts.
    ///
    /// # Errors
    ///
    /// Returns error if hashing fails.
    pub fn development() -> Result<Self, AuthError> {
        let accounts = DEVELOPMENT_ACCOUNTS
            .iter()
            .map(|&(id, email, name, role, password)| {
                Ok((
                    AdminUser {
                        id: AdminUserId::new(id),
                        email: Email::parse(email)?,
                        name: name.to_string(),
                        role,
                    },
                    password,
                ))
            })
            .collect::<Result<Vec<_>, AuthError>>()?;
        Self::from_accounts(accounts)
    }

    /// Directory from users and their plaintext passwords.
    ///
    /// # Errors
    ///
    /// Returns error if hashing fails.
    pub fn from_accounts<'a>(
        accounts: impl IntoIterator<Item = (AdminUser, &'a str)>,
    ) -> Result<Self, AuthError> {
        let accounts = accounts
            .into_iter()
            .map(|(user, password)| {
                Ok(Account {
                    user,
                    password_hash: hash_password(password)?,
                })
            })
            .collect::<Result<Vec<_>, AuthError>>()?;
        Ok(Self { accounts })
    }

    /// Check credentials and issue a session token.
    ///
    /// Runs argon2, so call it off the async runtime.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for any unknown email or wrong password.
    #[instrument(skip(self, password))]
    pub fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let account = self
            .accounts
            .iter()
            .find(|account| account.user.email == email)
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &account.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(AuthSession {
            user: account.user.clone(),
            token: issue_token(account.user.id, Utc::now()),
        })
    }

    /// Every user in the directory.
    pub fn users(&self) -> impl Iterator<Item = &AdminUser> {
        self.accounts.iter().map(|account| &account.user)
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Opaque token derived from the user and login time.
fn issue_token(id: AdminUserId, now: DateTime<Utc>) -> String {
    URL_SAFE_NO_PAD.encode(format!("{id}:{}", now.timestamp_millis()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_development_login() {
        let directory = AdminDirectory::development().unwrap();

        let session = directory.login("admin@jfkcannabis.com", "admin123").unwrap();
        assert_eq!(session.user.role, Role::Admin);
        assert!(!session.token.is_empty());

        let session = directory
            .login(" Manager@JFKCannabis.com ", "manager123")
            .unwrap();
        assert_eq!(session.user.role, Role::Manager);
    }

    #[test]
    fn test_login_failures_share_one_message() {
        let directory = AdminDirectory::development().unwrap();
        let attempts = [
            ("admin@jfkcannabis.com", "wrong"),
            ("nobody@jfkcannabis.com", "admin123"),
            ("not-an-email", "admin123"),
            ("manager@jfkcannabis.com", "admin123"),
        ];
        for (email, password) in attempts {
            let err = directory.login(email, password).unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials), "{email}");
            assert_eq!(err.to_string(), "Invalid email or password");
        }
    }

    #[test]
    fn test_passwords_are_not_stored_in_plaintext() {
        let directory = AdminDirectory::development().unwrap();
        for account in &directory.accounts {
            assert!(account.password_hash.starts_with("$argon2"));
            assert!(!account.password_hash.contains("admin123"));
        }
        assert_eq!(directory.users().count(), 2);
    }

    #[test]
    fn test_token_decodes_to_user_and_time() {
        let now = Utc::now();
        let token = issue_token(AdminUserId::new(7), now);
        let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(token).unwrap()).unwrap();
        assert_eq!(decoded, format!("7:{}", now.timestamp_millis()));
    }
}
