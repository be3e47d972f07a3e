//! Lock-free multi-producer multi-consumer byte ring buffer.
//!
//! [`ByteRing`] moves raw byte runs between any number of concurrent
//! producers and consumers through a single fixed-size circular buffer,
//! without locks. Each participant *reserves* a contiguous region with a
//! compare-and-swap, transfers its bytes, then *publishes* the region in
//! reservation order. Byte runs are delivered FIFO in aggregate: bytes become
//! visible in write completion order and are consumed in read completion
//! order.
//!
//! [`Ring`] views the same machinery as a queue of fixed-size records of an
//! arbitrary type.
//!
//! ```
//! use bytering::ByteRing;
//!
//! let ring = ByteRing::new(8);
//! assert!(ring.try_write(&[1, 2, 3]));
//!
//! let mut buf = [0; 3];
//! assert!(ring.try_read(&mut buf));
//! assert_eq!(buf, [1, 2, 3]);
//! ```
//!
//! The blocking operations ([`ByteRing::read`], [`ByteRing::write`],
//! [`Ring::push`], [`Ring::pop`]) busy-spin until they succeed; the `try_`
//! variants report insufficient data or space instead. There are no other
//! failure modes and no timeouts.
#![cfg_attr(
    feature = "std",
    doc = r##"
```
use std::thread;
use std::sync::Arc;
use bytering::Ring;

let ring = Arc::new(Ring::<u32>::new(16));
let tx = Arc::clone(&ring);
let producer = thread::spawn(move || {
    for i in 0..100 {
        tx.push(i);
    }
});
let consumer = thread::spawn(move || {
    for i in 0..100 {
        assert_eq!(ring.pop(), i);
    }
});
producer.join().unwrap();
consumer.join().unwrap();
```
"##
)]
//!
//! The ring is lock-free but not wait-free: a participant that reserved a
//! region and then stalls delays the publication (not the reservation) of
//! every later participant of the same role.
#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod buffer;
mod protocol;
mod ring;
mod typed;

pub use ring::ByteRing;
pub use typed::Ring;

#[cfg(test)]
mod tests;
