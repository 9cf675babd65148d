//! Fakes shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::fs::{self, File};
use std::io;
use std::os::fd::{AsRawFd, BorrowedFd, OwnedFd};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::format::{RasterFormat, SurfaceFormat};
use crate::raster::RasterBackend;
use crate::shm::{MemfdAllocator, ShmAllocator};
use crate::transport::{SurfacePool, SurfaceTransport};

/// A memfd name no other test in this process uses.
pub fn unique_memfd_name(tag: &str) -> String {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    format!(
        "novade-test-{}-{}-{}",
        tag,
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    )
}

fn memfd_marker(name: &str) -> String {
    format!("memfd:{} (deleted)", name)
}

/// Number of open descriptors in this process referring to the memfd `name`.
pub fn open_memfd_descriptors(name: &str) -> usize {
    let marker = memfd_marker(name);
    fs::read_dir("/proc/self/fd")
        .expect("/proc/self/fd is readable")
        .filter_map(|entry| fs::read_link(entry.ok()?.path()).ok())
        .filter(|target| target.to_string_lossy().contains(&marker))
        .count()
}

/// Number of mappings in this process backed by the memfd `name`.
pub fn memfd_mappings(name: &str) -> usize {
    let marker = memfd_marker(name);
    fs::read_to_string("/proc/self/maps")
        .expect("/proc/self/maps is readable")
        .lines()
        .filter(|line| line.contains(&marker))
        .count()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransportStats {
    pub pools_created: usize,
    pub pools_destroyed: usize,
    pub buffers_created: usize,
    pub buffers_destroyed: usize,
}

/// Records pool and buffer lifecycles instead of talking to a display server.
#[derive(Default)]
pub struct FakeTransport {
    stats: Rc<RefCell<TransportStats>>,
    refuse_pools: bool,
    refuse_buffers: bool,
}

impl FakeTransport {
    pub fn refusing_pools() -> Self {
        Self {
            refuse_pools: true,
            ..Self::default()
        }
    }

    pub fn refusing_buffers() -> Self {
        Self {
            refuse_buffers: true,
            ..Self::default()
        }
    }

    pub fn stats(&self) -> TransportStats {
        *self.stats.borrow()
    }

    /// Shared counters that stay readable after the transport is dropped.
    pub fn stats_handle(&self) -> Rc<RefCell<TransportStats>> {
        Rc::clone(&self.stats)
    }
}

impl SurfaceTransport for FakeTransport {
    type Buffer = FakeSurfaceBuffer;
    type Pool = FakePool;

    fn create_pool(&self, _fd: BorrowedFd<'_>, size: usize) -> Option<FakePool> {
        if self.refuse_pools {
            return None;
        }
        self.stats.borrow_mut().pools_created += 1;
        Some(FakePool {
            stats: Rc::clone(&self.stats),
            size,
            refuse_buffers: self.refuse_buffers,
        })
    }
}

pub struct FakePool {
    stats: Rc<RefCell<TransportStats>>,
    size: usize,
    refuse_buffers: bool,
}

impl SurfacePool for FakePool {
    type Buffer = FakeSurfaceBuffer;

    fn create_buffer(
        &self,
        offset: i32,
        width: i32,
        height: i32,
        stride: i32,
        format: SurfaceFormat,
    ) -> Option<FakeSurfaceBuffer> {
        if self.refuse_buffers {
            return None;
        }
        assert_eq!(offset, 0);
        assert!(height as usize * stride as usize <= self.size);
        self.stats.borrow_mut().buffers_created += 1;
        Some(FakeSurfaceBuffer {
            width,
            height,
            stride,
            format,
            stats: Rc::clone(&self.stats),
        })
    }
}

impl Drop for FakePool {
    fn drop(&mut self) {
        self.stats.borrow_mut().pools_destroyed += 1;
    }
}

pub struct FakeSurfaceBuffer {
    pub width: i32,
    pub height: i32,
    pub stride: i32,
    pub format: SurfaceFormat,
    stats: Rc<RefCell<TransportStats>>,
}

impl Drop for FakeSurfaceBuffer {
    fn drop(&mut self) {
        self.stats.borrow_mut().buffers_destroyed += 1;
    }
}

/// Counts allocation requests, optionally failing all of them.
#[derive(Default)]
pub struct CountingAllocator {
    inner: MemfdAllocator,
    calls: Cell<usize>,
    fail: bool,
}

impl CountingAllocator {
    pub fn named(name: &str) -> Self {
        Self {
            inner: MemfdAllocator::new(name).expect("valid memfd name"),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn allocations(&self) -> usize {
        self.calls.get()
    }
}

impl ShmAllocator for CountingAllocator {
    fn allocate(&self, size: usize) -> io::Result<OwnedFd> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::OutOfMemory, "allocator exhausted"));
        }
        self.inner.allocate(size)
    }
}

/// Hands out read-only descriptors to memfds, which cannot be mapped writable.
pub struct ReadOnlyAllocator {
    inner: MemfdAllocator,
}

impl ReadOnlyAllocator {
    pub fn named(name: &str) -> Self {
        Self {
            inner: MemfdAllocator::new(name).expect("valid memfd name"),
        }
    }
}

impl ShmAllocator for ReadOnlyAllocator {
    fn allocate(&self, size: usize) -> io::Result<OwnedFd> {
        let writable = self.inner.allocate(size)?;
        let read_only = File::open(format!("/proc/self/fd/{}", writable.as_raw_fd()))?;
        Ok(OwnedFd::from(read_only))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RasterStats {
    pub images_created: usize,
    pub images_destroyed: usize,
}

/// Raster backend applying pixman's parameter checks without drawing anything.
#[derive(Default)]
pub struct CheckingRaster {
    stats: Rc<RefCell<RasterStats>>,
}

impl CheckingRaster {
    pub fn stats(&self) -> RasterStats {
        *self.stats.borrow()
    }
}

impl RasterBackend for CheckingRaster {
    type Image = FakeImage;

    unsafe fn create_image(
        &self,
        format: RasterFormat,
        width: u32,
        height: u32,
        stride: u32,
        pixels: *mut u8,
        len: usize,
    ) -> Option<FakeImage> {
        if width == 0 || height == 0 || stride % 4 != 0 {
            return None;
        }
        if u64::from(stride) < u64::from(width) * u64::from(format.bytes_per_pixel()) {
            return None;
        }
        if (len as u64) < u64::from(height) * u64::from(stride) {
            return None;
        }
        self.stats.borrow_mut().images_created += 1;
        Some(FakeImage {
            format,
            width,
            height,
            stride,
            pixels,
            stats: Rc::clone(&self.stats),
        })
    }
}

pub struct FakeImage {
    pub format: RasterFormat,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub pixels: *mut u8,
    stats: Rc<RefCell<RasterStats>>,
}

impl Drop for FakeImage {
    fn drop(&mut self) {
        self.stats.borrow_mut().images_destroyed += 1;
    }
}
