use crate::{
    buffer::RawBuf,
    protocol::{to_offset, Cursors},
};
use core::{
    fmt,
    sync::atomic::{AtomicIsize, Ordering},
};
use crossbeam_utils::CachePadded;

/// Lock-free multi-producer multi-consumer ring of raw bytes.
///
/// Any number of threads may write while any number of threads read; the
/// reserve/commit protocol hands each participant a private region of the
/// buffer, so no byte is ever touched by two parties at once. Runs become
/// visible in write completion order and are consumed in read completion
/// order, which composes to FIFO delivery of the aggregate byte stream.
///
/// The ring stores raw bytes only. It does not remember run boundaries;
/// framing is the caller's concern.
///
/// Blocking operations busy-spin until they succeed and must not request
/// more than [`capacity`](Self::capacity) bytes. The `try_` variants refuse
/// rather than wait.
///
/// A `ByteRing` is a plain value: moving it never invalidates it, and Rust
/// ownership guarantees no operation is in flight when it is moved or
/// dropped. It is not cloneable; reads are destructive, so there is no
/// coherent way to duplicate one.
pub struct ByteRing {
    buf: RawBuf,
    /// Committed bytes no reader has claimed. Negative while readers
    /// over-reserve.
    used: CachePadded<AtomicIsize>,
    /// Bytes no writer has claimed. Negative while writers over-reserve.
    free: CachePadded<AtomicIsize>,
    read: CachePadded<Cursors>,
    write: CachePadded<Cursors>,
}

// SAFETY: the buffer holds plain bytes; between reserve and release every
// region belongs to exactly one participant, and all shared state is atomic.
unsafe impl Send for ByteRing {}
unsafe impl Sync for ByteRing {}

impl ByteRing {
    /// Creates a ring of `capacity` bytes.
    ///
    /// A capacity of zero yields the empty ring, which can only be queried,
    /// moved or dropped.
    pub fn new(capacity: usize) -> Self {
        Self::with_align(capacity, 1)
    }

    /// As [`Self::new`] but with a caller-chosen buffer alignment.
    pub(crate) fn with_align(capacity: usize, align: usize) -> Self {
        Self {
            buf: RawBuf::new(capacity, align),
            used: CachePadded::new(AtomicIsize::new(0)),
            free: CachePadded::new(AtomicIsize::new(capacity as isize)),
            read: CachePadded::new(Cursors::new()),
            write: CachePadded::new(Cursors::new()),
        }
    }

    /// Maximum number of bytes the ring can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of committed bytes no reader has claimed yet.
    ///
    /// Advisory: under concurrent traffic the value may be stale by the time
    /// it is returned. Never derive correctness from it.
    #[inline]
    pub fn len(&self) -> usize {
        self.used.load(Ordering::Acquire).clamp(0, self.capacity() as isize) as usize
    }

    /// Whether [`len`](Self::len) is zero. Advisory, like `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether [`len`](Self::len) equals the capacity. Advisory, like `len`.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Copies all of `src` into the ring, spinning until space allows.
    ///
    /// An empty `src` succeeds immediately on any ring. `src` must not be
    /// longer than the capacity, since such a write can never complete.
    pub fn write(&self, src: &[u8]) {
        if src.is_empty() {
            return;
        }
        debug_assert!(
            src.len() <= self.capacity(),
            "write of {} bytes into a ring of {} can never complete",
            src.len(),
            self.capacity(),
        );
        let start = self.acquire_write(src.len());
        unsafe { self.buf.copy_in(to_offset(start, self.capacity()), src) };
        self.release_write(start, src.len());
    }

    /// Fills all of `dst` from the ring, spinning until enough bytes are
    /// committed.
    ///
    /// An empty `dst` succeeds immediately on any ring. `dst` must not be
    /// longer than the capacity.
    pub fn read(&self, dst: &mut [u8]) {
        if dst.is_empty() {
            return;
        }
        debug_assert!(
            dst.len() <= self.capacity(),
            "read of {} bytes from a ring of {} can never complete",
            dst.len(),
            self.capacity(),
        );
        let start = self.acquire_read(dst.len());
        unsafe { self.buf.copy_out(to_offset(start, self.capacity()), dst) };
        self.release_read(start, dst.len());
    }

    /// Copies all of `src` into the ring if enough bytes are free right now.
    ///
    /// Returns `false` without blocking otherwise. Contention with other
    /// writers alone never causes failure, only lack of space does.
    pub fn try_write(&self, src: &[u8]) -> bool {
        if src.is_empty() {
            return true;
        }
        if src.len() > self.capacity() {
            return false;
        }
        match self.try_acquire_write(src.len()) {
            Some(start) => {
                unsafe { self.buf.copy_in(to_offset(start, self.capacity()), src) };
                self.release_write(start, src.len());
                true
            }
            None => false,
        }
    }

    /// Fills all of `dst` from the ring if enough bytes are committed right
    /// now.
    ///
    /// Returns `false` without blocking otherwise.
    pub fn try_read(&self, dst: &mut [u8]) -> bool {
        if dst.is_empty() {
            return true;
        }
        if dst.len() > self.capacity() {
            return false;
        }
        match self.try_acquire_read(dst.len()) {
            Some(start) => {
                unsafe { self.buf.copy_out(to_offset(start, self.capacity()), dst) };
                self.release_read(start, dst.len());
                true
            }
            None => false,
        }
    }

    // Reserve/release plumbing shared with the typed wrapper. Writers gate on
    // `free` and credit `used`; readers do the opposite.

    pub(crate) fn acquire_write(&self, len: usize) -> usize {
        self.write.acquire(&self.free, len, self.capacity())
    }

    pub(crate) fn try_acquire_write(&self, len: usize) -> Option<usize> {
        self.write.try_acquire(&self.free, len, self.capacity())
    }

    pub(crate) fn release_write(&self, start: usize, len: usize) {
        self.write.release(&self.used, start, len, self.capacity())
    }

    pub(crate) fn acquire_read(&self, len: usize) -> usize {
        self.read.acquire(&self.used, len, self.capacity())
    }

    pub(crate) fn try_acquire_read(&self, len: usize) -> Option<usize> {
        self.read.try_acquire(&self.used, len, self.capacity())
    }

    pub(crate) fn release_read(&self, start: usize, len: usize) {
        self.read.release(&self.free, start, len, self.capacity())
    }

    /// Pointer to the byte at logical position `pos`.
    ///
    /// # Safety
    ///
    /// `pos` must lie within the caller's reserved region.
    #[inline]
    pub(crate) unsafe fn slot(&self, pos: usize) -> *mut u8 {
        self.buf.slot(to_offset(pos, self.capacity()))
    }

    /// Physical start offset of the committed region. Exclusive access, so
    /// the cursors are settled.
    pub(crate) fn committed_start(&mut self) -> usize {
        let cap = self.capacity();
        to_offset(self.read.reserve_pos(), cap)
    }

    /// Length in bytes of the committed region. Exclusive access.
    pub(crate) fn committed_len(&mut self) -> usize {
        (*self.used.get_mut()).max(0) as usize
    }
}

impl Default for ByteRing {
    /// The empty ring (`capacity() == 0`).
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for ByteRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteRing")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
