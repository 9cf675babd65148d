//! Shared-memory file descriptor allocation.
//!
//! Buffers obtain their backing memory through a [`ShmAllocator`]. The default
//! [`MemfdAllocator`] creates anonymous `memfd` files; tests and embedders can
//! substitute their own source of descriptors.

use std::io;
use std::os::fd::OwnedFd;

use memfd::MemfdOptions;

use crate::config::PoolConfig;

/// Source of shared-memory file descriptors.
pub trait ShmAllocator {
    /// Returns a descriptor to a shared region of at least `size` bytes.
    fn allocate(&self, size: usize) -> io::Result<OwnedFd>;
}

impl<A: ShmAllocator + ?Sized> ShmAllocator for Box<A> {
    fn allocate(&self, size: usize) -> io::Result<OwnedFd> {
        (**self).allocate(size)
    }
}

/// Allocates anonymous shared memory with `memfd_create(2)`.
///
/// The descriptor is close-on-exec and sized with `ftruncate(2)`. The name only shows
/// up in `/proc/<pid>/fd` and `/proc/<pid>/maps` and has no other meaning.
#[derive(Debug, Clone)]
pub struct MemfdAllocator {
    name: String,
}

impl MemfdAllocator {
    /// Creates an allocator labelling its files with `name`.
    ///
    /// Fails with `InvalidInput` if `name` contains a NUL byte.
    pub fn new(name: &str) -> io::Result<Self> {
        if name.contains('\0') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "memfd name contains a NUL byte",
            ));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// Creates an allocator from the pool section of the configuration.
    pub fn from_config(config: &PoolConfig) -> io::Result<Self> {
        Self::new(&config.memfd_name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for MemfdAllocator {
    fn default() -> Self {
        Self {
            name: "novade-shm-buffer".to_string(),
        }
    }
}

impl ShmAllocator for MemfdAllocator {
    fn allocate(&self, size: usize) -> io::Result<OwnedFd> {
        let len = u64::try_from(size)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let memfd = MemfdOptions::new()
            .close_on_exec(true)
            .create(&self.name)
            .map_err(|e| {
                tracing::warn!("memfd_create failed: {}", e);
                match e {
                    memfd::Error::Create(source) => source,
                    other => io::Error::new(io::ErrorKind::Other, other),
                }
            })?;

        // `set_len` retries on EINTR.
        let file = memfd.into_file();
        file.set_len(len)?;
        tracing::trace!(size, "Allocated shared memory file");
        Ok(OwnedFd::from(file))
    }
}
