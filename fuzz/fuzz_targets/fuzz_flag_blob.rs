//! Fuzz target: persisted flag record
//!
//! Feeds arbitrary NVS blob contents through the boot-time load path and
//! verifies:
//! - `decode_flags` never panics
//! - `ConfigStore::load` only ever yields a typed error or valid flags
//! - anything that decodes re-encodes to a record that decodes the same
//!
//! cargo fuzz run fuzz_flag_blob

#![no_main]

use libfuzzer_sys::fuzz_target;
use tankwatch::app::ports::{FlagStore, StoragePort};
use tankwatch::error::PersistenceError;
use tankwatch::storage::{ConfigStore, FLAGS_KEY, FLAGS_NAMESPACE, MAX_RECORD_SIZE, decode_flags, encode_flags};

/// Storage holding a single raw blob under the flags key.
struct RawBlob(Vec<u8>);

impl StoragePort for RawBlob {
    fn read(&self, ns: &str, key: &str, buf: &mut [u8]) -> Result<usize, PersistenceError> {
        if ns != FLAGS_NAMESPACE || key != FLAGS_KEY {
            return Err(PersistenceError::NotFound);
        }
        let n = self.0.len().min(buf.len());
        buf[..n].copy_from_slice(&self.0[..n]);
        Ok(n)
    }

    fn write(&mut self, _ns: &str, _key: &str, data: &[u8]) -> Result<(), PersistenceError> {
        self.0 = data.to_vec();
        Ok(())
    }

    fn exists(&self, ns: &str, key: &str) -> bool {
        ns == FLAGS_NAMESPACE && key == FLAGS_KEY
    }
}

fuzz_target!(|data: &[u8]| {
    let direct = decode_flags(data);

    let store = ConfigStore::new(RawBlob(data.to_vec()));
    let loaded = store.load();
    if data.len() <= MAX_RECORD_SIZE {
        assert_eq!(loaded, direct, "store and decoder disagree");
    }

    if let Ok(flags) = direct {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let bytes = encode_flags(&flags, &mut buf).expect("valid flags always encode");
        assert_eq!(decode_flags(bytes), Ok(flags));
    }
});
