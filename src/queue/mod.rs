// ============================================================================
// Queue Module
// Bounded ring buffers for handing orders to the matching thread
// ============================================================================

pub mod mpmc;
pub mod spsc;

pub use mpmc::MpmcQueue;
pub use spsc::{channel, Consumer, Producer};
