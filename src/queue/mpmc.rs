// ============================================================================
// MPMC Ring Buffer
// Lock-free bounded queue using per-slot sequence numbers
// ============================================================================

use crossbeam::utils::{Backoff, CachePadded};
use std::cell::UnsafeCell;
use std::fmt;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::interfaces::{BatchSource, PushSink};

/// One cell of the ring.
///
/// For cursor `c` mapping to this slot, `sequence == c` means free for the
/// producer holding ticket `c`, and `sequence == c + 1` means filled for the
/// consumer holding ticket `c`.
struct Slot<T> {
    sequence: AtomicUsize,
    value: UnsafeCell<MaybeUninit<T>>,
}

/// Bounded multi-producer/multi-consumer queue.
///
/// Share it through an `Arc`. Neither `push` nor `pop` blocks: a full or
/// empty queue is reported immediately and the caller decides how to wait.
/// Items from one producer come out in the order that producer pushed them;
/// nothing is promised about interleaving across producers.
///
/// # Example
/// ```
/// use lob_engine::queue::MpmcQueue;
/// use std::sync::Arc;
///
/// let queue = Arc::new(MpmcQueue::new(2));
/// assert!(queue.push(1).is_ok());
/// assert!(queue.push(2).is_ok());
/// assert_eq!(queue.push(3), Err(3));
/// assert_eq!(queue.pop(), Some(1));
/// ```
pub struct MpmcQueue<T> {
    /// Next ticket for producers
    head: CachePadded<AtomicUsize>,
    /// Next ticket for consumers
    tail: CachePadded<AtomicUsize>,
    slots: Box<[Slot<T>]>,
}

// Slot values are only touched by the thread that won the ticket CAS, and
// handed over through release/acquire on the slot sequence.
unsafe impl<T: Send> Send for MpmcQueue<T> {}
unsafe impl<T: Send> Sync for MpmcQueue<T> {}

impl<T> MpmcQueue<T> {
    /// Create a queue with `capacity` slots.
    ///
    /// # Panics
    /// Panics if `capacity` is below 2; with a single slot the sequence
    /// values for "full" and "free" coincide.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "capacity must be at least 2");

        let slots = (0..capacity)
            .map(|i| Slot {
                sequence: AtomicUsize::new(i),
                value: UnsafeCell::new(MaybeUninit::uninit()),
            })
            .collect();

        Self {
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            slots,
        }
    }

    /// Push an item, handing it back if the queue is full.
    pub fn push(&self, item: T) -> Result<(), T> {
        let backoff = Backoff::new();
        let mut head = self.head.load(Ordering::Relaxed);

        loop {
            let slot = &self.slots[head % self.slots.len()];
            let sequence = slot.sequence.load(Ordering::Acquire);
            let diff = sequence.wrapping_sub(head) as isize;

            if diff == 0 {
                match self.head.compare_exchange_weak(
                    head,
                    head.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: winning ticket `head` grants exclusive access
                        // to this slot until the sequence is republished.
                        unsafe { (*slot.value.get()).write(item) };
                        slot.sequence
                            .store(head.wrapping_add(1), Ordering::Release);
                        return Ok(());
                    },
                    Err(current) => {
                        head = current;
                        backoff.spin();
                    },
                }
            } else if diff < 0 {
                // Slot still holds the item from one lap ago
                return Err(item);
            } else {
                // Another producer claimed this ticket first
                backoff.spin();
                head = self.head.load(Ordering::Relaxed);
            }
        }
    }

    /// Pop the next item, `None` when empty.
    pub fn pop(&self) -> Option<T> {
        let backoff = Backoff::new();
        let mut tail = self.tail.load(Ordering::Relaxed);

        loop {
            let slot = &self.slots[tail % self.slots.len()];
            let sequence = slot.sequence.load(Ordering::Acquire);
            let diff = sequence.wrapping_sub(tail.wrapping_add(1)) as isize;

            if diff == 0 {
                match self.tail.compare_exchange_weak(
                    tail,
                    tail.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: sequence == tail + 1 means the producer
                        // finished writing, and ticket `tail` is ours alone.
                        let item = unsafe { (*slot.value.get()).assume_init_read() };
                        slot.sequence
                            .store(tail.wrapping_add(self.slots.len()), Ordering::Release);
                        return Some(item);
                    },
                    Err(current) => {
                        tail = current;
                        backoff.spin();
                    },
                }
            } else if diff < 0 {
                // Slot not yet published for this lap
                return None;
            } else {
                backoff.spin();
                tail = self.tail.load(Ordering::Relaxed);
            }
        }
    }

    /// Pop up to `max` items into `out`, returning how many were popped.
    pub fn pop_batch(&self, out: &mut Vec<T>, max: usize) -> usize {
        let mut popped = 0;
        while popped < max {
            match self.pop() {
                Some(item) => {
                    out.push(item);
                    popped += 1;
                },
                None => break,
            }
        }
        popped
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Approximate number of queued items; exact when no operation is in flight
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        head.wrapping_sub(tail).min(self.slots.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.slots.len()
    }
}

impl<T> Drop for MpmcQueue<T> {
    fn drop(&mut self) {
        let head = *self.head.get_mut();
        let mut tail = *self.tail.get_mut();
        let capacity = self.slots.len();

        while tail != head {
            let slot = &mut self.slots[tail % capacity];
            // SAFETY: with exclusive access every ticket in [tail, head) has
            // completed its push.
            unsafe { slot.value.get_mut().assume_init_drop() };
            tail = tail.wrapping_add(1);
        }
    }
}

impl<T> fmt::Debug for MpmcQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MpmcQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl<T> PushSink<T> for &MpmcQueue<T> {
    fn try_push(&mut self, item: T) -> Result<(), T> {
        self.push(item)
    }
}

impl<T> PushSink<T> for Arc<MpmcQueue<T>> {
    fn try_push(&mut self, item: T) -> Result<(), T> {
        self.push(item)
    }
}

impl<T> BatchSource<T> for &MpmcQueue<T> {
    fn try_pop(&mut self) -> Option<T> {
        self.pop()
    }

    fn pop_batch(&mut self, out: &mut Vec<T>, max: usize) -> usize {
        MpmcQueue::pop_batch(&**self, out, max)
    }
}

impl<T> BatchSource<T> for Arc<MpmcQueue<T>> {
    fn try_pop(&mut self) -> Option<T> {
        self.pop()
    }

    fn pop_batch(&mut self, out: &mut Vec<T>, max: usize) -> usize {
        MpmcQueue::pop_batch(&**self, out, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicBool;
    use std::thread;

    fn push_until_accepted<T>(queue: &MpmcQueue<T>, mut item: T) {
        loop {
            match queue.push(item) {
                Ok(()) => return,
                Err(back) => {
                    item = back;
                    thread::yield_now();
                },
            }
        }
    }

    #[test]
    fn test_full_and_empty() {
        let queue = MpmcQueue::new(4);
        assert_eq!(queue.pop(), None::<u32>);

        for i in 0..4 {
            assert!(queue.push(i).is_ok());
        }
        assert!(queue.is_full());
        assert_eq!(queue.push(99), Err(99));

        assert_eq!(queue.pop(), Some(0));
        assert!(queue.push(4).is_ok());
        assert_eq!(queue.push(5), Err(5));

        let mut out = Vec::new();
        assert_eq!(queue.pop_batch(&mut out, 10), 4);
        assert_eq!(out, vec![1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_wraps_many_laps() {
        let queue = MpmcQueue::new(2);
        for i in 0..1_000u32 {
            queue.push(i).unwrap();
            assert_eq!(queue.pop(), Some(i));
        }
        assert_eq!(queue.len(), 0);
    }

    #[test]
    #[should_panic(expected = "capacity must be at least 2")]
    fn test_capacity_one_panics() {
        let _ = MpmcQueue::<u8>::new(1);
    }

    #[test]
    fn test_concurrent_producers_single_consumer() {
        const PRODUCERS: u64 = 4;
        const PER_PRODUCER: u64 = 1_000;
        let queue = MpmcQueue::new((PRODUCERS * PER_PRODUCER) as usize);

        thread::scope(|s| {
            for p in 0..PRODUCERS {
                let queue = &queue;
                s.spawn(move || {
                    for i in 0..PER_PRODUCER {
                        assert!(queue.push(p * 10_000 + i).is_ok());
                    }
                });
            }
        });

        let mut seen = HashSet::new();
        let mut last_per_producer = vec![None; PRODUCERS as usize];
        while let Some(item) = queue.pop() {
            assert!(seen.insert(item), "duplicate item {item}");
            // Per-producer order survives
            let producer = (item / 10_000) as usize;
            if let Some(previous) = last_per_producer[producer] {
                assert!(item > previous);
            }
            last_per_producer[producer] = Some(item);
        }
        assert_eq!(seen.len() as u64, PRODUCERS * PER_PRODUCER);
    }

    #[test]
    fn test_contended_small_queue() {
        const PRODUCERS: u64 = 4;
        const CONSUMERS: usize = 3;
        const PER_PRODUCER: u64 = 5_000;
        let queue = MpmcQueue::new(8);
        let done = AtomicBool::new(false);

        let collected: Vec<Vec<u64>> = thread::scope(|s| {
            let consumers: Vec<_> = (0..CONSUMERS)
                .map(|_| {
                    s.spawn(|| {
                        let mut got = Vec::new();
                        loop {
                            match queue.pop() {
                                Some(item) => got.push(item),
                                None if done.load(Ordering::Acquire) => {
                                    // Producers finished; drain what is left
                                    while let Some(item) = queue.pop() {
                                        got.push(item);
                                    }
                                    return got;
                                },
                                None => thread::yield_now(),
                            }
                        }
                    })
                })
                .collect();

            let producers: Vec<_> = (0..PRODUCERS)
                .map(|p| {
                    let queue = &queue;
                    s.spawn(move || {
                        for i in 0..PER_PRODUCER {
                            push_until_accepted(queue, p * 100_000 + i);
                        }
                    })
                })
                .collect();

            for producer in producers {
                producer.join().unwrap();
            }
            done.store(true, Ordering::Release);

            consumers.into_iter().map(|c| c.join().unwrap()).collect()
        });

        let mut all: Vec<u64> = collected.into_iter().flatten().collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(total, all.len(), "items were duplicated");
        assert_eq!(total as u64, PRODUCERS * PER_PRODUCER);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drop_releases_unconsumed_items() {
        let marker = Arc::new(());
        let queue = MpmcQueue::new(4);
        for _ in 0..3 {
            queue.push(Arc::clone(&marker)).unwrap();
        }
        drop(queue.pop());
        assert_eq!(Arc::strong_count(&marker), 3);

        drop(queue);
        assert_eq!(Arc::strong_count(&marker), 1);
    }

    #[test]
    fn test_trait_impls() {
        let queue = Arc::new(MpmcQueue::new(4));
        let mut sink = Arc::clone(&queue);
        let mut source = Arc::clone(&queue);

        sink.try_push(1u8).unwrap();
        sink.try_push(2u8).unwrap();
        assert_eq!(source.try_pop(), Some(1));

        let mut out = Vec::new();
        assert_eq!(BatchSource::pop_batch(&mut source, &mut out, 8), 1);
        assert_eq!(out, vec![2]);

        // Borrowed handle drains through the same batch path
        let mut borrowed = &*queue;
        for i in 3..6u8 {
            borrowed.try_push(i).unwrap();
        }
        out.clear();
        assert_eq!(BatchSource::pop_batch(&mut borrowed, &mut out, 2), 2);
        assert_eq!(out, vec![3, 4]);
        assert_eq!(MpmcQueue::pop_batch(&*queue, &mut out, 8), 1);
        assert_eq!(out, vec![3, 4, 5]);
    }
}
