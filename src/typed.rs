use crate::{protocol::wrap_add, ring::ByteRing};
use core::{fmt, marker::PhantomData, mem, ptr};

/// Lock-free multi-producer multi-consumer queue of fixed-size records.
///
/// A typed view over [`ByteRing`]: every record occupies
/// `size_of::<T>()` bytes, the buffer is aligned for `T`, and the byte
/// capacity is an exact multiple of the record size, so a record never
/// straddles the wrap point. Values are constructed in place on push and
/// moved out on pop.
///
/// Like the byte ring, [`push`](Self::push) and [`pop`](Self::pop) busy-spin
/// while the `try_` variants refuse rather than wait. Records still committed
/// when the queue is dropped are dropped with it.
///
/// `T`'s move and drop must not unwind: a panic while a record block is
/// reserved stalls publication for every later participant of the same role.
pub struct Ring<T> {
    bytes: ByteRing,
    _marker: PhantomData<T>,
}

// SAFETY: values of T cross threads by move, exactly as through a channel;
// no shared reference to a stored record is ever handed out.
unsafe impl<T: Send> Send for Ring<T> {}
unsafe impl<T: Send> Sync for Ring<T> {}

impl<T> Ring<T> {
    const STRIDE: usize = mem::size_of::<T>();

    /// Creates a queue holding at most `records` values.
    ///
    /// Panics if `T` is zero-sized or the byte capacity overflows `usize`.
    /// Zero `records` yields the empty queue, which can only be queried,
    /// moved or dropped.
    pub fn new(records: usize) -> Self {
        assert!(Self::STRIDE != 0, "zero-sized records are not representable");
        let capacity = records
            .checked_mul(Self::STRIDE)
            .expect("record capacity overflows usize");
        Self {
            bytes: ByteRing::with_align(capacity, mem::align_of::<T>()),
            _marker: PhantomData,
        }
    }

    /// Maximum number of records the queue can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.capacity() / Self::STRIDE
    }

    /// Number of committed records not yet claimed by any consumer.
    ///
    /// Advisory under concurrent traffic, like [`ByteRing::len`].
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() / Self::STRIDE
    }

    /// Whether [`len`](Self::len) is zero. Advisory.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether [`len`](Self::len) equals the capacity. Advisory.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Appends `value`, spinning until a slot is free.
    pub fn push(&self, value: T) {
        debug_assert!(self.capacity() > 0, "push into a zero-capacity queue never completes");
        let start = self.bytes.acquire_write(Self::STRIDE);
        unsafe { ptr::write(self.bytes.slot(start).cast::<T>(), value) };
        self.bytes.release_write(start, Self::STRIDE);
    }

    /// Appends `value` if a slot is free right now, handing it back
    /// otherwise.
    pub fn try_push(&self, value: T) -> Result<(), T> {
        if self.capacity() == 0 {
            return Err(value);
        }
        match self.bytes.try_acquire_write(Self::STRIDE) {
            Some(start) => {
                unsafe { ptr::write(self.bytes.slot(start).cast::<T>(), value) };
                self.bytes.release_write(start, Self::STRIDE);
                Ok(())
            }
            None => Err(value),
        }
    }

    /// Removes the oldest record, spinning until one is committed.
    pub fn pop(&self) -> T {
        debug_assert!(self.capacity() > 0, "pop from a zero-capacity queue never completes");
        let start = self.bytes.acquire_read(Self::STRIDE);
        let value = unsafe { ptr::read(self.bytes.slot(start).cast::<T>()) };
        self.bytes.release_read(start, Self::STRIDE);
        value
    }

    /// Removes the oldest record if one is committed right now.
    pub fn try_pop(&self) -> Option<T> {
        if self.capacity() == 0 {
            return None;
        }
        let start = self.bytes.try_acquire_read(Self::STRIDE)?;
        let value = unsafe { ptr::read(self.bytes.slot(start).cast::<T>()) };
        self.bytes.release_read(start, Self::STRIDE);
        Some(value)
    }
}

impl<T> Default for Ring<T> {
    /// The empty queue (`capacity() == 0`).
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T> Drop for Ring<T> {
    /// Drops every record still committed; the byte buffer follows.
    fn drop(&mut self) {
        if mem::needs_drop::<T>() {
            let count = self.bytes.committed_len() / Self::STRIDE;
            let cap = self.bytes.capacity();
            let mut pos = self.bytes.committed_start();
            for _ in 0..count {
                unsafe { ptr::drop_in_place(self.bytes.slot(pos).cast::<T>()) };
                pos = wrap_add(pos, Self::STRIDE, cap);
            }
        }
    }
}

impl<T> fmt::Debug for Ring<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ring")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
