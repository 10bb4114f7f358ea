//! Storage Engine
//!
//! Expiring key-value store over a pluggable backend: volatile memory or a
//! single redb file.

mod backend;
mod clock;
mod durable;
mod entry;
mod memory;
mod store;

pub use backend::Backend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use durable::RedbBackend;
pub use entry::{Entry, MAX_TTL_SECS};
pub use memory::MemoryBackend;
pub use store::ExpiringStore;
