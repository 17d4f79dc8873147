//! Spatial indexing for O(log n) pointer hit testing.

mod rtree;

pub use rtree::{NodePoint, SpatialIndex};
