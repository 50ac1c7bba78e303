#![warn(missing_docs)]

//! Surface-pair intersection and boolean split engine for triangulated
//! surfaces.
//!
//! Two workflows share one candidate scan:
//! 1. **Intersection**: every pair of surfaces is intersected triangle by
//!    triangle and the segments are chained into polylines
//! 2. **Split and pick**: two surfaces are cut along their intersection,
//!    each piece is classified above, below or outside the other surface,
//!    and the caller merges the groups they keep
//!
//! Both run synchronously over immutable input. Host applications receive
//! output through the traits in [`sink`].

mod api;
pub mod chain;
pub mod classify;
pub mod coplanar;
pub mod dedup;
pub mod error;
pub mod grid;
pub mod intersect;
mod pipeline;
pub mod settings;
pub mod simplify;
pub mod sink;
pub mod split;

pub use api::{
    compute_splits, intersect_surfaces, publish_polylines, tolerance_for, IntersectionOutcome,
};
pub use chain::{chain_segments, chain_segments_with_tolerance, IntersectionPolyline, Polyline};
pub use classify::{MergedSurface, SplitGroup, SplitSession};
pub use dedup::{decimate_stride, dedup_points, weld_points, DedupResult};
pub use error::{BooleanError, Result};
pub use grid::{build_grid, query_grid, TriangleGrid};
pub use intersect::{
    tri_tri_intersection, tri_tri_signed_distances, CrossingRecord, Segment, TaggedSegment,
};
pub use settings::IntersectSettings;
pub use simplify::decimate_by_arc_length;
pub use sink::{MergeSink, PolylineCollector, PolylineSink, PolylineStyle, PreviewBuilder};
pub use split::{split_triangle, Side, SideTriangle};
