//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`StoragePort`] over the ESP-IDF NVS partition.  The flag
//! record format lives in [`crate::storage`]; this adapter only moves
//! blobs.
//!
//! - Namespace isolation: each subsystem uses its own namespace.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//! - Host builds use an in-memory map with the same semantics.

use log::info;

use crate::app::ports::StoragePort;
use crate::error::PersistenceError;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::warn;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Initialise NVS flash.
    ///
    /// A partition with no free pages or from a newer IDF version is
    /// erased and re-initialised; stored flags are then lost and the
    /// next boot falls back to defaults.
    pub fn new() -> Result<Self, PersistenceError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32 {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(PersistenceError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(PersistenceError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(PersistenceError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{namespace}::{key}")
    }

    /// NUL-terminated copy of an NVS name (max 15 chars).
    #[cfg(target_os = "espidf")]
    fn c_name(name: &str) -> [u8; 16] {
        let mut buf = [0u8; 16];
        let bytes = name.as_bytes();
        let len = bytes.len().min(15);
        buf[..len].copy_from_slice(&bytes[..len]);
        buf
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns_buf = Self::c_name(namespace);
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

impl Default for NvsAdapter {
    /// Falls back to an adapter whose reads and writes fail with
    /// [`PersistenceError::IoError`] if flash cannot be initialised.
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }
}

#[cfg(target_os = "espidf")]
fn map_nvs_err(rc: i32) -> PersistenceError {
    match rc {
        rc if rc == ESP_ERR_NVS_NOT_FOUND as i32 => PersistenceError::NotFound,
        rc if rc == ESP_ERR_NVS_NOT_ENOUGH_SPACE as i32 => PersistenceError::Full,
        _ => PersistenceError::IoError,
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, PersistenceError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.borrow().get(&composite) {
                Some(data) => {
                    let len = data.len().min(buf.len());
                    buf[..len].copy_from_slice(&data[..len]);
                    Ok(len)
                }
                None => Err(PersistenceError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let key_buf = Self::c_name(key);
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let mut size = buf.len();
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(size)
            });
            result.map_err(map_nvs_err)
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), PersistenceError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().insert(composite, data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let key_buf = Self::c_name(key);
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        data.as_ptr() as *const _,
                        data.len(),
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|rc| {
                warn!("NvsAdapter: write {namespace}/{key} failed ({rc})");
                map_nvs_err(rc)
            })
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow().contains_key(&composite)
        }

        #[cfg(target_os = "espidf")]
        {
            let key_buf = Self::c_name(key);
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let ret = unsafe {
                    nvs_find_key(handle, key_buf.as_ptr() as *const _, core::ptr::null_mut())
                };
                Ok(ret == ESP_OK)
            });
            result.unwrap_or(false)
        }
    }
}
