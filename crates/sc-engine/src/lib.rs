//! Zone bookkeeping and hazard overlap detection for a single user session.

mod follow;
mod render;
mod session;
mod store;
mod tracker;

#[cfg(test)]
mod testing;

pub use follow::follow_repository;
pub use render::{NoopRenderer, RenderSink, ZonePolygon};
pub use session::{DocumentOutcome, SessionHandle, SnapshotOutcome, ZoneSession};
pub use store::{ReplaceOutcome, ZoneStore};
pub use tracker::OverlapTracker;
