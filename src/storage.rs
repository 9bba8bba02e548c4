//! Persistent blob storage for calibration data.
//!
//! A `BlobStore` holds small named byte blobs. Opening and closing the
//! underlying file is folded into each call, so a handle never outlives
//! one `read` or `write`.
//!
//! Two implementations:
//!   - `MemoryBlobStore`: fixed-capacity RAM store (host simulation, tests).
//!   - `FlashBlobStore`: NOR flash via the `sequential-storage` key-value
//!     map, which handles wear levelling and GC. Blob names are hashed
//!     into map keys.

use core::ops::Range;

use embassy_futures::block_on;
use embedded_storage_async::nor_flash::MultiwriteNorFlash;
use heapless::{String, Vec};

use crate::config::{MAX_BLOB_SIZE, STORAGE_FLASH_SIZE, STORAGE_FLASH_START};
use crate::error::StorageError;

/// Longest blob name the in-memory store keeps.
const MAX_NAME_LEN: usize = 32;

/// Scratch buffer for one map item (key + header + value).
const ITEM_BUFFER_SIZE: usize = 128;

/// Named byte-blob storage service.
pub trait BlobStore {
    /// Whether a blob with this name is present.
    fn exists(&mut self, name: &str) -> bool;

    /// Read up to `buf.len()` bytes of the blob into `buf`.
    /// Returns the number of bytes copied, which is short when the blob is.
    fn read(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Create or replace the blob with `data`. Returns the bytes written.
    fn write(&mut self, name: &str, data: &[u8]) -> Result<usize, StorageError>;

    /// Delete the blob. Returns `false` if nothing was removed.
    fn remove(&mut self, name: &str) -> bool;
}

impl<T: BlobStore + ?Sized> BlobStore for &mut T {
    fn exists(&mut self, name: &str) -> bool {
        (**self).exists(name)
    }

    fn read(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        (**self).read(name, buf)
    }

    fn write(&mut self, name: &str, data: &[u8]) -> Result<usize, StorageError> {
        (**self).write(name, data)
    }

    fn remove(&mut self, name: &str) -> bool {
        (**self).remove(name)
    }
}

// In-memory store

struct MemoryBlob {
    name: String<MAX_NAME_LEN>,
    data: Vec<u8, MAX_BLOB_SIZE>,
}

/// RAM-backed blob store with room for `N` blobs.
///
/// Faults can be injected to exercise the degraded paths of callers.
pub struct MemoryBlobStore<const N: usize> {
    blobs: Vec<MemoryBlob, N>,
    fail_reads: bool,
    fail_writes: bool,
    fail_removes: bool,
    writes: usize,
    removes: usize,
}

impl<const N: usize> MemoryBlobStore<N> {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            blobs: Vec::new(),
            fail_reads: false,
            fail_writes: false,
            fail_removes: false,
            writes: 0,
            removes: 0,
        }
    }

    /// Make every subsequent `read` fail with `StorageError::Io`.
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Make every subsequent `write` fail with `StorageError::Io`.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Make every subsequent `remove` fail, leaving the blob in place.
    pub fn set_fail_removes(&mut self, fail: bool) {
        self.fail_removes = fail;
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Number of successful removals since creation.
    pub fn remove_count(&self) -> usize {
        self.removes
    }

    /// Size of the named blob, if present.
    pub fn blob_len(&self, name: &str) -> Option<usize> {
        self.position(name).map(|i| self.blobs[i].data.len())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.blobs.iter().position(|b| b.name.as_str() == name)
    }
}

impl<const N: usize> Default for MemoryBlobStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> BlobStore for MemoryBlobStore<N> {
    fn exists(&mut self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn read(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        if self.fail_reads {
            return Err(StorageError::Io);
        }
        let blob = &self.blobs[self.position(name).ok_or(StorageError::NotFound)?];
        let n = blob.data.len().min(buf.len());
        buf[..n].copy_from_slice(&blob.data[..n]);
        Ok(n)
    }

    fn write(&mut self, name: &str, data: &[u8]) -> Result<usize, StorageError> {
        if self.fail_writes {
            return Err(StorageError::Io);
        }
        let len = data.len();
        let data = Vec::from_slice(data).map_err(|_| StorageError::TooLarge)?;

        match self.position(name) {
            Some(i) => self.blobs[i].data = data,
            None => {
                let name = String::try_from(name).map_err(|_| StorageError::TooLarge)?;
                self.blobs
                    .push(MemoryBlob { name, data })
                    .map_err(|_| StorageError::Full)?;
            }
        }
        self.writes += 1;
        Ok(len)
    }

    fn remove(&mut self, name: &str) -> bool {
        if self.fail_removes {
            return false;
        }
        match self.position(name) {
            Some(i) => {
                self.blobs.swap_remove(i);
                self.removes += 1;
                true
            }
            None => false,
        }
    }
}

// Flash store

/// Blob store over a NOR flash partition.
///
/// The async flash driver is driven to completion inline; flash
/// operations are short and the control loop is single-threaded.
pub struct FlashBlobStore<F> {
    flash: F,
    range: Range<u32>,
    buf: [u8; ITEM_BUFFER_SIZE],
}

impl<F: MultiwriteNorFlash> FlashBlobStore<F> {
    /// Use the partition configured in `config`.
    pub fn new(flash: F) -> Self {
        Self::with_range(
            flash,
            STORAGE_FLASH_START..STORAGE_FLASH_START + STORAGE_FLASH_SIZE,
        )
    }

    /// Use an explicit, erase-aligned flash range.
    pub fn with_range(flash: F, range: Range<u32>) -> Self {
        Self {
            flash,
            range,
            buf: [0u8; ITEM_BUFFER_SIZE],
        }
    }

    /// Give back the flash driver.
    pub fn into_inner(self) -> F {
        self.flash
    }

    fn fetch(&mut self, key: u32) -> Result<Option<&[u8]>, StorageError> {
        block_on(sequential_storage::map::fetch_item::<u32, &[u8], _>(
            &mut self.flash,
            self.range.clone(),
            &mut sequential_storage::cache::NoCache::new(),
            &mut self.buf,
            &key,
        ))
        .map_err(|e| {
            error!("Flash read error: {:?}", defmt_debug(&e));
            StorageError::Io
        })
    }
}

impl<F: MultiwriteNorFlash> BlobStore for FlashBlobStore<F> {
    fn exists(&mut self, name: &str) -> bool {
        matches!(self.fetch(blob_key(name)), Ok(Some(_)))
    }

    fn read(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let data = self.fetch(blob_key(name))?.ok_or(StorageError::NotFound)?;
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }

    fn write(&mut self, name: &str, data: &[u8]) -> Result<usize, StorageError> {
        if data.len() > MAX_BLOB_SIZE {
            return Err(StorageError::TooLarge);
        }

        let key = blob_key(name);
        block_on(sequential_storage::map::store_item::<u32, &[u8], _>(
            &mut self.flash,
            self.range.clone(),
            &mut sequential_storage::cache::NoCache::new(),
            &mut self.buf,
            &key,
            &data,
        ))
        .map_err(|e| {
            error!("Flash write error: {:?}", defmt_debug(&e));
            match e {
                sequential_storage::Error::FullStorage => StorageError::Full,
                _ => StorageError::Io,
            }
        })?;
        Ok(data.len())
    }

    fn remove(&mut self, name: &str) -> bool {
        let key = blob_key(name);
        if !matches!(self.fetch(key), Ok(Some(_))) {
            return false;
        }
        block_on(sequential_storage::map::remove_item::<u32, _>(
            &mut self.flash,
            self.range.clone(),
            &mut sequential_storage::cache::NoCache::new(),
            &mut self.buf,
            &key,
        ))
        .is_ok()
    }
}

/// Map a blob name onto a flash map key (32-bit FNV-1a).
pub fn blob_key(name: &str) -> u32 {
    let mut hash: u32 = 0x811C_9DC5;
    for &b in name.as_bytes() {
        hash ^= b as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

#[cfg(feature = "defmt")]
fn defmt_debug<T: core::fmt::Debug>(value: &T) -> defmt::Debug2Format<'_, T> {
    defmt::Debug2Format(value)
}

#[cfg(not(feature = "defmt"))]
fn defmt_debug<T>(value: &T) -> &T {
    value
}
