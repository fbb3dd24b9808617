//! Authentication service: passcode issuance, verification, session
//! resolution, and sign-out.

use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::db::{
    Database, NewPasscode, NewSession, NewUser, PasscodeRepository, SessionRepository, User,
    UserRepository,
};
use crate::datetime;
use crate::{DepotError, Result};

use super::mailer::PasscodeMailer;
use super::secret::{generate_passcode, generate_session_secret, hash_secret};

/// Authentication service.
pub struct AuthService<'a> {
    db: &'a Database,
    mailer: &'a dyn PasscodeMailer,
    config: &'a AuthConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService.
    pub fn new(db: &'a Database, mailer: &'a dyn PasscodeMailer, config: &'a AuthConfig) -> Self {
        Self { db, mailer, config }
    }

    /// Send a sign-in passcode to an email address.
    ///
    /// On first sign-up a full name must be provided and a user record is
    /// created; thereafter the email alone identifies the account. Returns
    /// the pending account identifier the client echoes back on
    /// verification.
    pub async fn send_passcode(&self, email: &str, full_name: Option<&str>) -> Result<String> {
        let email = email.trim().to_lowercase();
        let user_repo = UserRepository::new(self.db.pool());

        let user = match user_repo.get_by_email(&email).await? {
            Some(user) => user,
            None => match full_name {
                Some(full_name) if !full_name.trim().is_empty() => {
                    let user = user_repo
                        .create(&NewUser::new(email.clone(), full_name.trim()))
                        .await?;
                    info!("Created account {} for {}", user.account_id, user.email);
                    user
                }
                _ => return Err(DepotError::NotFound("account".into())),
            },
        };

        let code = generate_passcode(self.config.passcode_length);

        let passcode_repo = PasscodeRepository::new(self.db.pool());
        passcode_repo
            .create(&NewPasscode {
                user_id: user.id,
                code_hash: hash_secret(&code),
                expires_at: datetime::db_string_after_secs(self.config.passcode_ttl_secs),
            })
            .await?;

        self.mailer.deliver(&user.email, &code)?;
        debug!("Passcode issued for account {}", user.account_id);

        Ok(user.account_id)
    }

    /// Verify a passcode for a pending account and mint a session.
    ///
    /// Returns the user and the plain session secret for the cookie. A
    /// wrong code burns one attempt; hitting the attempt limit invalidates
    /// the passcode entirely.
    pub async fn verify_passcode(&self, account_id: &str, code: &str) -> Result<(User, String)> {
        let user_repo = UserRepository::new(self.db.pool());
        let user = user_repo
            .get_by_account_id(account_id)
            .await?
            .ok_or_else(|| DepotError::Auth("unknown account".into()))?;

        let passcode_repo = PasscodeRepository::new(self.db.pool());
        let consumed = passcode_repo
            .consume(
                user.id,
                &hash_secret(code.trim()),
                self.config.max_verify_attempts,
            )
            .await?;

        if consumed.is_none() {
            let attempts = passcode_repo.record_failed_attempt(user.id).await?;
            if let Some(attempts) = attempts {
                warn!(
                    "Failed passcode attempt {} for account {}",
                    attempts, account_id
                );
            }
            return Err(DepotError::Auth("invalid or expired passcode".into()));
        }

        let secret = generate_session_secret();
        let session_repo = SessionRepository::new(self.db.pool());
        session_repo
            .create(&NewSession {
                user_id: user.id,
                secret_hash: hash_secret(&secret),
                expires_at: datetime::db_string_after_secs(self.config.session_ttl_secs),
            })
            .await?;

        info!("Session opened for account {}", account_id);
        Ok((user, secret))
    }

    /// Resolve the current user from a session secret.
    ///
    /// Every failure reads as absence; this never errors.
    pub async fn current_user(&self, secret: &str) -> Option<User> {
        let session_repo = SessionRepository::new(self.db.pool());
        let session = match session_repo.get_valid(&hash_secret(secret)).await {
            Ok(Some(session)) => session,
            Ok(None) => return None,
            Err(e) => {
                debug!("Session lookup failed: {}", e);
                return None;
            }
        };

        let user_repo = UserRepository::new(self.db.pool());
        match user_repo.get_by_id(session.user_id).await {
            Ok(user) => user,
            Err(e) => {
                debug!("User lookup failed for session: {}", e);
                None
            }
        }
    }

    /// Sign out by deleting the session.
    ///
    /// Failures are swallowed; the caller clears the cookie and redirects
    /// regardless.
    pub async fn sign_out(&self, secret: &str) {
        let session_repo = SessionRepository::new(self.db.pool());
        match session_repo.delete(&hash_secret(secret)).await {
            Ok(true) => debug!("Session deleted"),
            Ok(false) => debug!("Session was already gone"),
            Err(e) => warn!("Session delete failed: {}", e),
        }
    }
}
