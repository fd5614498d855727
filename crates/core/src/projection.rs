use crate::filter::{filter_points, FilterKind};
use crate::point::Point;
use crate::sort::{sort_points, SortKind};
use crate::types::Timestamp;

/// The board's visible ordering: `sort(filter(points))`.
pub fn project(points: &[Point], filter: FilterKind, sort: SortKind, now: Timestamp) -> Vec<Point> {
    sort_points(&filter_points(points, filter, now), sort)
}
