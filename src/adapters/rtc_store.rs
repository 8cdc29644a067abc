//! RTC slow-memory record store.
//!
//! Implements [`StoragePort`] for the single feed-counter record.
//!
//! - **`target_os = "espidf"`** — a length-prefixed slot in RTC slow
//!   memory (`.rtc.data`), which survives soft resets and deep sleep on
//!   battery-backed boards.  Contents are garbage after a full power
//!   cycle, which is exactly what the record's marker check is for.
//! - **all other targets** — an in-memory slot for host tests.
//!
//! The slot is written only from the single main-loop context.

use crate::app::ports::{StorageError, StoragePort};

/// Capacity of the record slot, bytes.
pub const RECORD_CAPACITY: usize = 64;

#[cfg(target_os = "espidf")]
mod slot {
    use super::RECORD_CAPACITY;

    /// 0 = empty.  Kept next to the buffer so both live in RTC memory.
    #[unsafe(link_section = ".rtc.data")]
    pub static mut RTC_LEN: u16 = 0;

    #[unsafe(link_section = ".rtc.data")]
    pub static mut RTC_BUF: [u8; RECORD_CAPACITY] = [0; RECORD_CAPACITY];
}

pub struct RtcStore {
    #[cfg(not(target_os = "espidf"))]
    slot: std::cell::RefCell<Option<Vec<u8>>>,
}

impl RtcStore {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            slot: std::cell::RefCell::new(None),
        }
    }
}

#[cfg(target_os = "espidf")]
impl StoragePort for RtcStore {
    fn write_record(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        if bytes.len() > RECORD_CAPACITY {
            return Err(StorageError::TooLarge);
        }
        // SAFETY: the RTC slot is accessed only from the single
        // main-loop context; raw pointers avoid aliasing a static mut.
        unsafe {
            core::ptr::copy_nonoverlapping(
                bytes.as_ptr(),
                (&raw mut slot::RTC_BUF).cast::<u8>(),
                bytes.len(),
            );
            *(&raw mut slot::RTC_LEN) = bytes.len() as u16;
        }
        Ok(())
    }

    fn read_record(&self, buf: &mut [u8]) -> Result<usize, StorageError> {
        // SAFETY: single main-loop context, see write_record.
        let len = usize::from(unsafe { *(&raw const slot::RTC_LEN) });
        if len == 0 {
            return Err(StorageError::NotFound);
        }
        if len > RECORD_CAPACITY || len > buf.len() {
            return Err(StorageError::TooLarge);
        }
        unsafe {
            core::ptr::copy_nonoverlapping(
                (&raw const slot::RTC_BUF).cast::<u8>(),
                buf.as_mut_ptr(),
                len,
            );
        }
        Ok(len)
    }
}

#[cfg(not(target_os = "espidf"))]
impl StoragePort for RtcStore {
    fn write_record(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        if bytes.len() > RECORD_CAPACITY {
            return Err(StorageError::TooLarge);
        }
        *self.slot.borrow_mut() = Some(bytes.to_vec());
        Ok(())
    }

    fn read_record(&self, buf: &mut [u8]) -> Result<usize, StorageError> {
        match &*self.slot.borrow() {
            Some(record) => {
                if record.len() > buf.len() {
                    return Err(StorageError::TooLarge);
                }
                buf[..record.len()].copy_from_slice(record);
                Ok(record.len())
            }
            None => Err(StorageError::NotFound),
        }
    }
}
