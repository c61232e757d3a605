//! Display state core: the bounded slot pool, the cross-reference index
//! kept in lock-step with it, and the presenter that applies engine events
//! to both.

mod cross_index;
mod presenter;
mod slot_pool;

pub use cross_index::CrossIndex;
pub use presenter::StreamPresenter;
pub use slot_pool::{Evicted, SlotContent, SlotId, SlotPool, DEFAULT_CAPACITY, DEFAULT_EVICTION_MARGIN};
