//! Sort comparators for the board.
//!
//! All comparators are total orders over `Point` suitable for a stable
//! `sort_by`, so points that compare equal keep their collection order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// Sort selection offered above the point list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKind {
    /// Ascending start date. The board's default.
    #[default]
    Day,
    /// Longest duration first.
    Time,
    /// Most expensive first.
    Price,
}

impl SortKind {
    pub const ALL: [SortKind; 3] = [SortKind::Day, SortKind::Time, SortKind::Price];

    pub fn compare(self, a: &Point, b: &Point) -> Ordering {
        match self {
            SortKind::Day => compare_by_day(a, b),
            SortKind::Time => compare_by_time(a, b),
            SortKind::Price => compare_by_price(a, b),
        }
    }
}

/// Ascending `date_from`; points without a start date go last.
pub fn compare_by_day(a: &Point, b: &Point) -> Ordering {
    nones_last(a.date_from, b.date_from, |x, y| x.cmp(&y))
}

/// Descending duration; points with an unknown duration go last.
pub fn compare_by_time(a: &Point, b: &Point) -> Ordering {
    nones_last(a.duration(), b.duration(), |x, y| y.cmp(&x))
}

/// Descending base price.
pub fn compare_by_price(a: &Point, b: &Point) -> Ordering {
    b.base_price.cmp(&a.base_price)
}

fn nones_last<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Return `points` ordered by `kind`. The input is left untouched.
pub fn sort_points(points: &[Point], kind: SortKind) -> Vec<Point> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| kind.compare(a, b));
    sorted
}
