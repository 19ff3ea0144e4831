// ============================================================================
// Order Pipeline
// Producer threads feed a ring buffer; one consumer thread owns the engine
// ============================================================================
//
// ```text
// producer(s) ──push_with_backoff──▶ [ SPSC | MPMC ] ──run_consumer──▶ MatchingEngine
// ```
//
// The engine is never shared: whichever thread calls `run_consumer` holds
// the only `&mut MatchingEngine`, so matching stays single-writer.

use crate::domain::{Order, PipelineConfig};
use crate::engine::MatchingEngine;
use crate::interfaces::{BatchSource, PushSink};
use crossbeam::utils::Backoff;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ============================================================================
// Shutdown Signal
// ============================================================================

/// Cloneable stop flag shared between producers and the consumer.
///
/// Triggering uses release ordering, so anything a producer pushed before
/// calling [`ShutdownSignal::trigger`] is visible to a consumer that
/// observes the flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

// ============================================================================
// Producer Side
// ============================================================================

/// Push `item`, backing off while the queue is full.
///
/// Gives the item back if shutdown is triggered before a slot frees up.
pub fn push_with_backoff<T, S>(sink: &mut S, item: T, shutdown: &ShutdownSignal) -> Result<(), T>
where
    S: PushSink<T> + ?Sized,
{
    let backoff = Backoff::new();
    let mut item = item;

    loop {
        match sink.try_push(item) {
            Ok(()) => return Ok(()),
            Err(back) => {
                if shutdown.is_triggered() {
                    return Err(back);
                }
                item = back;
                backoff.snooze();
            },
        }
    }
}

// ============================================================================
// Consumer Side
// ============================================================================

/// Counters from one `run_consumer` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Orders handed to the engine
    pub orders: u64,
    /// Non-empty batches drained
    pub batches: u64,
    /// Polls that found the queue empty
    pub idle_polls: u64,
}

/// Drain `source` into `engine` until shutdown is triggered and the source
/// is empty.
///
/// Orders are popped in batches of at most `config.batch_size` and
/// processed in pop order.
pub fn run_consumer<S>(
    source: &mut S,
    engine: &mut MatchingEngine,
    shutdown: &ShutdownSignal,
    config: &PipelineConfig,
) -> ConsumerStats
where
    S: BatchSource<Order> + ?Sized,
{
    if let Some(core) = config.pin_core {
        pin_current_thread(core);
    }

    let batch_size = config.batch_size.max(1);
    let mut batch = Vec::with_capacity(batch_size);
    let mut stats = ConsumerStats::default();
    let backoff = Backoff::new();

    loop {
        // Read the flag before polling: a trigger seen here happened after
        // every push the producers made, so an empty poll means drained.
        let stopping = shutdown.is_triggered();

        let popped = source.pop_batch(&mut batch, batch_size);
        if popped > 0 {
            engine.process_batch_orders(batch.drain(..));
            stats.orders += popped as u64;
            stats.batches += 1;
            backoff.reset();
            continue;
        }

        if stopping {
            break;
        }
        stats.idle_polls += 1;
        backoff.snooze();
    }

    tracing::info!(
        instrument = %engine.order_book().instrument(),
        orders = stats.orders,
        batches = stats.batches,
        idle_polls = stats.idle_polls,
        "consumer stopped"
    );

    stats
}

#[cfg(feature = "numa")]
fn pin_current_thread(core: usize) {
    let target = core_affinity::get_core_ids()
        .and_then(|ids| ids.into_iter().find(|id| id.id == core));

    match target {
        Some(id) if core_affinity::set_for_current(id) => {
            tracing::info!(core, "consumer pinned");
        },
        _ => tracing::warn!(core, "failed to pin consumer thread"),
    }
}

#[cfg(not(feature = "numa"))]
fn pin_current_thread(core: usize) {
    tracing::debug!(core, "core pinning requires the `numa` feature; ignored");
}
