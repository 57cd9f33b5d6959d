//! Persisted enable flags.
//!
//! [`ConfigStore`] layers a small versioned record over any
//! [`StoragePort`] and implements [`FlagStore`] on top of it.  The record
//! is a `postcard` encoding of [`StoredFlags`]:
//!
//! ```text
//!  ┌─────────┬────────────────┬───────────────────┐
//!  │ version │ buzzer_enabled │ self_stop_enabled │
//!  │   u8    │  bool (0 / 1)  │   bool (0 / 1)    │
//!  └─────────┴────────────────┴───────────────────┘
//! ```
//!
//! Anything that does not decode, or carries another version, reads as
//! [`PersistenceError::Corrupted`].

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::app::ports::{FlagStore, StoragePort};
use crate::control::actuator::EnableFlags;
use crate::error::PersistenceError;

pub const FLAGS_NAMESPACE: &str = "tankwatch";
pub const FLAGS_KEY: &str = "flags";
pub const FLAGS_RECORD_VERSION: u8 = 1;

/// Upper bound on an encoded record.
pub const MAX_RECORD_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFlags {
    pub version: u8,
    pub flags: EnableFlags,
}

/// Encode `flags` into `buf`, returning the used prefix.
pub fn encode_flags<'a>(flags: &EnableFlags, buf: &'a mut [u8]) -> Result<&'a [u8], PersistenceError> {
    let record = StoredFlags {
        version: FLAGS_RECORD_VERSION,
        flags: *flags,
    };
    postcard::to_slice(&record, buf)
        .map(|used| &*used)
        .map_err(|_| PersistenceError::IoError)
}

pub fn decode_flags(bytes: &[u8]) -> Result<EnableFlags, PersistenceError> {
    let record: StoredFlags = postcard::from_bytes(bytes).map_err(|_| PersistenceError::Corrupted)?;
    if record.version != FLAGS_RECORD_VERSION {
        debug!("storage: unknown flag record version {}", record.version);
        return Err(PersistenceError::Corrupted);
    }
    Ok(record.flags)
}

/// Flag persistence over a key/value backend.
pub struct ConfigStore<S> {
    storage: S,
}

impl<S: StoragePort> ConfigStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}

impl<S: StoragePort> FlagStore for ConfigStore<S> {
    fn load(&self) -> Result<EnableFlags, PersistenceError> {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let len = self.storage.read(FLAGS_NAMESPACE, FLAGS_KEY, &mut buf)?;
        let flags = decode_flags(&buf[..len])?;
        info!(
            "storage: loaded flags (buzzer={}, self_stop={})",
            flags.buzzer_enabled, flags.self_stop_enabled
        );
        Ok(flags)
    }

    fn save(&mut self, flags: &EnableFlags) -> Result<(), PersistenceError> {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let bytes = encode_flags(flags, &mut buf)?;
        self.storage.write(FLAGS_NAMESPACE, FLAGS_KEY, bytes)?;
        debug!("storage: flags saved ({} bytes)", bytes.len());
        Ok(())
    }
}
