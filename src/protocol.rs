//! The reserve/commit protocol.
//!
//! Readers and writers are exactly symmetric, so the protocol is implemented
//! once over a pair of cursors and driven by two signed counters owned by the
//! ring: each role *gates* on one counter (readers on committed bytes,
//! writers on free bytes) and *credits* the other when it completes.
//!
//! Cursors are logical positions in `0..2 * capacity`; the physical buffer
//! offset is the position reduced by the capacity. The doubled domain keeps a
//! claim of the full capacity from mapping a cursor onto itself, so every
//! successful claim moves the cursor and the commit CAS always distinguishes
//! two racing claims.
//!
//! A participant reserves by debiting the gate counter and then advancing the
//! reserve cursor with a CAS; a loser restores its debit and retries. The
//! debit comes first so the gate never overstates what is reservable, which
//! also pins the cursor short of a full lap while any reservation is
//! outstanding: the CAS can never observe a recycled position. Counters go
//! negative while several participants over-reserve the same bytes; every
//! loser's restore brings the balance back.

use core::{
    hint,
    sync::atomic::{AtomicIsize, AtomicUsize, Ordering},
};

/// Advances `pos` by `step` modulo `modulus`.
///
/// `step` never exceeds `modulus`, so one subtraction is enough.
#[inline]
pub(crate) fn wrap_add(pos: usize, step: usize, modulus: usize) -> usize {
    let next = pos + step;
    if next >= modulus {
        next - modulus
    } else {
        next
    }
}

/// Physical buffer offset of a logical cursor position.
#[inline]
pub(crate) fn to_offset(pos: usize, cap: usize) -> usize {
    if pos >= cap {
        pos - cap
    } else {
        pos
    }
}

/// Cursor pair for one role (readers or writers).
///
/// `reserve` is where the next participant of the role claims its region;
/// `publish` trails it and marks the frontier up to which every earlier claim
/// has completed. The region between them is in flight and owned by the
/// participants that claimed it.
pub(crate) struct Cursors {
    reserve: AtomicUsize,
    publish: AtomicUsize,
}

impl Cursors {
    pub const fn new() -> Self {
        Self {
            reserve: AtomicUsize::new(0),
            publish: AtomicUsize::new(0),
        }
    }

    /// Reserve-cursor position, for exclusive-access walks.
    pub fn reserve_pos(&mut self) -> usize {
        *self.reserve.get_mut()
    }

    /// Claims `len` bytes, spinning until the gate counter allows it.
    /// Returns the logical start position of the claimed region.
    pub fn acquire(&self, gate: &AtomicIsize, len: usize, cap: usize) -> usize {
        debug_assert!(len > 0 && len <= cap);
        loop {
            let start = self.reserve.load(Ordering::Acquire);
            while gate.load(Ordering::Acquire) < len as isize {
                hint::spin_loop();
            }
            if let Some(start) = self.commit(gate, start, len, cap) {
                return start;
            }
        }
    }

    /// Non-blocking [`Self::acquire`]: a short gate fails immediately, a lost
    /// commit race retries.
    pub fn try_acquire(&self, gate: &AtomicIsize, len: usize, cap: usize) -> Option<usize> {
        debug_assert!(len > 0 && len <= cap);
        loop {
            let start = self.reserve.load(Ordering::Acquire);
            if gate.load(Ordering::Acquire) < len as isize {
                return None;
            }
            if let Some(start) = self.commit(gate, start, len, cap) {
                return Some(start);
            }
        }
    }

    /// One debit-and-CAS attempt against the reserve cursor.
    #[inline]
    fn commit(&self, gate: &AtomicIsize, start: usize, len: usize, cap: usize) -> Option<usize> {
        let end = wrap_add(start, len, 2 * cap);
        gate.fetch_sub(len as isize, Ordering::AcqRel);
        if self
            .reserve
            .compare_exchange(start, end, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
        {
            Some(start)
        } else {
            gate.fetch_add(len as isize, Ordering::AcqRel);
            None
        }
    }

    /// Publishes a completed region and credits the opposite role.
    ///
    /// Publication is strictly in reserve order: the call spins until every
    /// earlier claim of this role has published, then advances the cursor
    /// past `start`. The spin is bounded by the transfers of those earlier
    /// claims; this is the lock-free-but-not-wait-free point of the design.
    pub fn release(&self, credit: &AtomicIsize, start: usize, len: usize, cap: usize) {
        debug_assert!(len > 0 && len <= cap);
        let end = wrap_add(start, len, 2 * cap);
        while self.publish.load(Ordering::Acquire) != start {
            hint::spin_loop();
        }
        self.publish.store(end, Ordering::Release);
        credit.fetch_add(len as isize, Ordering::Release);
    }
}
