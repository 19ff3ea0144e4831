// ============================================================================
// SPSC Ring Buffer
// Wait-free bounded channel between exactly one producer and one consumer
// ============================================================================

use crossbeam::utils::CachePadded;
use std::cell::UnsafeCell;
use std::fmt;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::interfaces::{BatchSource, PushSink};

/// Create a bounded SPSC channel holding at most `capacity` items.
///
/// The two halves are not `Clone`, so the single-producer/single-consumer
/// contract is enforced by ownership.
///
/// # Panics
/// Panics if `capacity` is zero.
///
/// # Example
/// ```
/// use lob_engine::queue::spsc;
///
/// let (mut tx, mut rx) = spsc::channel::<u32>(2);
/// assert!(tx.push(1).is_ok());
/// assert!(tx.push(2).is_ok());
/// assert_eq!(tx.push(3), Err(3));
/// assert_eq!(rx.pop(), Some(1));
/// ```
pub fn channel<T>(capacity: usize) -> (Producer<T>, Consumer<T>) {
    assert!(capacity > 0, "capacity must be non-zero");

    let buffer = (0..capacity)
        .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
        .collect();
    let ring = Arc::new(Ring {
        head: CachePadded::new(AtomicUsize::new(0)),
        tail: CachePadded::new(AtomicUsize::new(0)),
        buffer,
    });

    (
        Producer {
            ring: Arc::clone(&ring),
        },
        Consumer { ring },
    )
}

// ============================================================================
// Shared Ring
// ============================================================================

/// `head` and `tail` only ever grow; a slot is `cursor % capacity`.
/// Slots in `[tail, head)` hold initialized items.
struct Ring<T> {
    /// Write cursor, stored only by the producer
    head: CachePadded<AtomicUsize>,
    /// Read cursor, stored only by the consumer
    tail: CachePadded<AtomicUsize>,
    buffer: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

// Each slot is accessed by one side at a time, handed over through the
// release/acquire pairs on `head` and `tail`.
unsafe impl<T: Send> Send for Ring<T> {}
unsafe impl<T: Send> Sync for Ring<T> {}

impl<T> Ring<T> {
    #[inline]
    fn capacity(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    fn slot(&self, cursor: usize) -> *mut MaybeUninit<T> {
        self.buffer[cursor % self.buffer.len()].get()
    }

    fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        head.wrapping_sub(tail)
    }
}

impl<T> Drop for Ring<T> {
    fn drop(&mut self) {
        let head = *self.head.get_mut();
        let mut tail = *self.tail.get_mut();

        while tail != head {
            // SAFETY: slots in [tail, head) are initialized and nobody else
            // holds the ring any more.
            unsafe { (*self.slot(tail)).assume_init_drop() };
            tail = tail.wrapping_add(1);
        }
    }
}

// ============================================================================
// Producer
// ============================================================================

pub struct Producer<T> {
    ring: Arc<Ring<T>>,
}

impl<T> Producer<T> {
    /// Push an item, handing it back if the buffer is full.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        let head = self.ring.head.load(Ordering::Relaxed);
        let tail = self.ring.tail.load(Ordering::Acquire);

        if head.wrapping_sub(tail) == self.ring.capacity() {
            return Err(item);
        }

        // SAFETY: the slot at `head` is outside [tail, head), so the consumer
        // will not touch it until the store below publishes it.
        unsafe { (*self.ring.slot(head)).write(item) };
        self.ring.head.store(head.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.ring.len() == self.ring.capacity()
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }
}

impl<T> PushSink<T> for Producer<T> {
    fn try_push(&mut self, item: T) -> Result<(), T> {
        self.push(item)
    }
}

impl<T> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

// ============================================================================
// Consumer
// ============================================================================

pub struct Consumer<T> {
    ring: Arc<Ring<T>>,
}

impl<T> Consumer<T> {
    /// Pop the oldest item, `None` when empty.
    pub fn pop(&mut self) -> Option<T> {
        let tail = self.ring.tail.load(Ordering::Relaxed);
        let head = self.ring.head.load(Ordering::Acquire);

        if head == tail {
            return None;
        }

        // SAFETY: `tail < head`, and the acquire load of `head` makes the
        // producer's write to this slot visible.
        let item = unsafe { (*self.ring.slot(tail)).assume_init_read() };
        self.ring.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(item)
    }

    /// Pop up to `max` items into `out` with one cursor update.
    ///
    /// Returns the number of items popped, in FIFO order.
    pub fn pop_batch(&mut self, out: &mut Vec<T>, max: usize) -> usize {
        let tail = self.ring.tail.load(Ordering::Relaxed);
        let head = self.ring.head.load(Ordering::Acquire);
        let count = head.wrapping_sub(tail).min(max);

        out.reserve(count);
        for offset in 0..count {
            // SAFETY: every cursor in [tail, tail + count) is below `head`.
            let item = unsafe { (*self.ring.slot(tail.wrapping_add(offset))).assume_init_read() };
            out.push(item);
        }

        self.ring
            .tail
            .store(tail.wrapping_add(count), Ordering::Release);
        count
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }
}

impl<T> BatchSource<T> for Consumer<T> {
    fn try_pop(&mut self) -> Option<T> {
        self.pop()
    }

    fn pop_batch(&mut self, out: &mut Vec<T>, max: usize) -> usize {
        Consumer::pop_batch(self, out, max)
    }
}

impl<T> fmt::Debug for Consumer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_push_fails_when_full() {
        const N: usize = 8;
        let (mut tx, mut rx) = channel::<usize>(N);

        for i in 0..N {
            assert!(tx.push(i).is_ok());
        }
        assert!(tx.is_full());
        assert_eq!(tx.push(N), Err(N));

        // Exactly one slot frees up after one pop
        assert_eq!(rx.pop(), Some(0));
        assert!(tx.push(N).is_ok());
        assert_eq!(tx.push(N + 1), Err(N + 1));
    }

    #[test]
    fn test_pop_on_empty() {
        let (mut tx, mut rx) = channel::<u8>(4);
        assert_eq!(rx.pop(), None);

        tx.push(1).unwrap();
        assert_eq!(rx.pop(), Some(1));
        assert_eq!(rx.pop(), None);
        assert!(rx.is_empty());
    }

    #[test]
    fn test_fifo_across_many_laps() {
        let (mut tx, mut rx) = channel::<u32>(3);
        let mut next_out = 0;

        for i in 0..1_000u32 {
            tx.push(i).unwrap();
            if i % 2 == 1 {
                assert_eq!(rx.pop(), Some(next_out));
                assert_eq!(rx.pop(), Some(next_out + 1));
                next_out += 2;
            }
        }
        assert!(rx.is_empty());
    }

    #[test]
    fn test_pop_batch() {
        let (mut tx, mut rx) = channel::<u32>(8);
        for i in 0..5 {
            tx.push(i).unwrap();
        }

        let mut out = Vec::new();
        assert_eq!(rx.pop_batch(&mut out, 3), 3);
        assert_eq!(out, vec![0, 1, 2]);

        assert_eq!(rx.pop_batch(&mut out, 10), 2);
        assert_eq!(out, vec![0, 1, 2, 3, 4]);

        assert_eq!(rx.pop_batch(&mut out, 10), 0);
        assert_eq!(rx.pop_batch(&mut out, 0), 0);
        assert_eq!(tx.len(), 0);
    }

    #[test]
    fn test_capacity_one() {
        let (mut tx, mut rx) = channel::<&str>(1);
        assert!(tx.push("a").is_ok());
        assert_eq!(tx.push("b"), Err("b"));
        assert_eq!(rx.pop(), Some("a"));
        assert!(tx.push("b").is_ok());
        assert_eq!(rx.pop(), Some("b"));
    }

    #[test]
    #[should_panic(expected = "capacity must be non-zero")]
    fn test_zero_capacity_panics() {
        let _ = channel::<u8>(0);
    }

    #[test]
    fn test_drop_releases_unconsumed_items() {
        static DROPS: AtomicUsize = AtomicUsize::new(0);

        struct Tracked;
        impl Drop for Tracked {
            fn drop(&mut self) {
                DROPS.fetch_add(1, Ordering::SeqCst);
            }
        }

        let (mut tx, mut rx) = channel::<Tracked>(4);
        for _ in 0..3 {
            assert!(tx.push(Tracked).is_ok());
        }
        drop(rx.pop());
        assert_eq!(DROPS.load(Ordering::SeqCst), 1);

        drop(tx);
        drop(rx);
        assert_eq!(DROPS.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_threaded_fifo() {
        const COUNT: u64 = 100_000;
        let (mut tx, mut rx) = channel::<u64>(64);

        thread::scope(|s| {
            s.spawn(move || {
                for i in 0..COUNT {
                    let mut item = i;
                    while let Err(back) = tx.push(item) {
                        item = back;
                        thread::yield_now();
                    }
                }
            });

            let mut expected = 0;
            let mut batch = Vec::with_capacity(16);
            while expected < COUNT {
                batch.clear();
                if rx.pop_batch(&mut batch, 16) == 0 {
                    thread::yield_now();
                    continue;
                }
                for item in &batch {
                    assert_eq!(*item, expected);
                    expected += 1;
                }
            }
            assert_eq!(rx.pop(), None);
        });
    }
}
