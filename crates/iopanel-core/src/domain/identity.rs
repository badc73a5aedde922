//! Device identity and the rotating password.
//!
//! # How does the server know who it is talking to? (for beginners)
//!
//! Every device has a 6-byte id, generated once and then persisted, which it
//! puts at the front of every datagram it sends.  The user reads the id and
//! the current *password* off the device and types them into the server-side
//! program.  Every request must carry that password; anything else is
//! silently ignored.
//!
//! The password is a random 32-bit number stored in a 64-bit field.  It is
//! created the first time it is needed and lives for 24 hours.  Reading it
//! after it expires creates a new one, which locks out whoever held the old
//! value.  Regenerating it explicitly has the same effect immediately.

use std::fmt;
use std::time::{Duration, SystemTime};

use uuid::Uuid;

/// How long a password stays valid.
pub const PASSWORD_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// The 6-byte device identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId([u8; 6]);

impl DeviceId {
    pub const LEN: usize = 6;

    pub const fn from_bytes(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Builds an id from a persisted byte string, if it has the right length.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; 6] = bytes.try_into().ok()?;
        Some(Self(array))
    }

    /// Generates a fresh random id.
    pub fn generate() -> Self {
        let random = Uuid::new_v4();
        let mut bytes = [0u8; 6];
        bytes.copy_from_slice(&random.as_bytes()[..6]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    /// Formats as twelve lowercase hex digits, the form shown to the user.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// A device id plus its current password and expiry.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    id: DeviceId,
    password: u64,
    expires_at: Option<SystemTime>,
}

impl DeviceIdentity {
    /// Creates an identity whose password will be generated on first use.
    pub fn new(id: DeviceId) -> Self {
        Self {
            id,
            password: 0,
            expires_at: None,
        }
    }

    /// Creates an identity with a known password, mainly for tests.
    pub fn with_password(id: DeviceId, password: u64, expires_at: SystemTime) -> Self {
        Self {
            id,
            password,
            expires_at: Some(expires_at),
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Returns the password valid at `now`, generating a new one if needed.
    pub fn current_password(&mut self, now: SystemTime) -> u64 {
        match self.expires_at {
            Some(expiry) if now < expiry => self.password,
            _ => self.regenerate(now),
        }
    }

    /// Replaces the password immediately and returns the new value.
    pub fn regenerate(&mut self, now: SystemTime) -> u64 {
        self.password = random_password();
        self.expires_at = Some(now + PASSWORD_LIFETIME);
        tracing::info!(device = %self.id, "password regenerated");
        self.password
    }

    /// When the current password stops being accepted, if one exists yet.
    pub fn expires_at(&self) -> Option<SystemTime> {
        self.expires_at
    }
}

fn random_password() -> u64 {
    let random = Uuid::new_v4();
    let b = random.as_bytes();
    u64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}
