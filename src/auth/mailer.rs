//! Passcode delivery.
//!
//! Delivery is a trait seam so deployments can plug in a real mail
//! transport. The default `LogMailer` writes the code to the log, which is
//! enough for single-user and development setups; `MemoryMailer` captures
//! codes for tests.

use std::sync::Mutex;

use tracing::info;

use crate::Result;

/// Delivers sign-in passcodes to users.
pub trait PasscodeMailer: Send + Sync {
    /// Deliver a passcode to an email address.
    fn deliver(&self, email: &str, code: &str) -> Result<()>;
}

/// Mailer that writes passcodes to the application log.
#[derive(Debug, Default)]
pub struct LogMailer;

impl PasscodeMailer for LogMailer {
    fn deliver(&self, email: &str, code: &str) -> Result<()> {
        info!("Sign-in passcode for {}: {}", email, code);
        Ok(())
    }
}

/// Mailer that captures deliveries in memory.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl MemoryMailer {
    /// Create a new capture mailer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent code delivered to an address.
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }

    /// Number of deliveries captured.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl PasscodeMailer for MemoryMailer {
    fn deliver(&self, email: &str, code: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}
