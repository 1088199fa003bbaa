//! Append-only audit trail.
//!
//! Pipeline stages, catalog changes and lifecycle events are recorded
//! through a channel-backed writer so the hot path never waits on the
//! audit database. Failure events double as the reconciliation feed for
//! orphaned external objects.

mod events;
mod handle;
mod sqlite;
mod store;
mod writer;

pub use events::*;
pub use handle::*;
pub use sqlite::*;
pub use store::*;
pub use writer::*;
