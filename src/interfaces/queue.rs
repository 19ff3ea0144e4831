// ============================================================================
// Queue Interfaces
// Producer and consumer ends of a bounded, non-blocking channel
// ============================================================================

/// Producer end of a bounded channel.
///
/// A full channel hands the item back immediately; the caller chooses how
/// to wait.
pub trait PushSink<T> {
    fn try_push(&mut self, item: T) -> Result<(), T>;
}

/// Consumer end of a bounded channel.
pub trait BatchSource<T> {
    /// Pop a single item, `None` when empty
    fn try_pop(&mut self) -> Option<T>;

    /// Append up to `max` items to `out` in FIFO order, returning how many
    /// were popped
    fn pop_batch(&mut self, out: &mut Vec<T>, max: usize) -> usize;
}
