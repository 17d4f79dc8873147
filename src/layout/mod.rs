//! Force-directed layout.
//!
//! The engine owns a `LayoutState` of per-node positions and velocities and
//! advances it one tick at a time. Renderers borrow the state read-only; the
//! only other writer is the drag protocol, which touches the pinned slot.

mod force;
mod forces;
mod quadtree;
mod state;

pub use force::{ForceConfig, ForceLayoutEngine};
pub use state::LayoutState;
