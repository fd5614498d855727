//! Time-relative filter predicates.
//!
//! Every predicate takes the evaluation instant explicitly. The filter store
//! captures `now` once when it is constructed, so a point does not drift
//! between tabs while the board is open.

use serde::{Deserialize, Serialize};

use crate::point::Point;
use crate::types::Timestamp;

/// Filter selection shown as tabs above the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    #[default]
    Everything,
    Future,
    Present,
    Past,
}

impl FilterKind {
    /// Every filter, in tab order.
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Everything,
        FilterKind::Future,
        FilterKind::Present,
        FilterKind::Past,
    ];

    /// Returns `true` if `point` belongs to this filter at instant `now`.
    ///
    /// - `Future`: starts strictly after `now`.
    /// - `Present`: `date_from <= now <= date_to`.
    /// - `Past`: ended strictly before `now`.
    ///
    /// A point missing the date a rule needs never matches that rule.
    pub fn matches(self, point: &Point, now: Timestamp) -> bool {
        match self {
            FilterKind::Everything => true,
            FilterKind::Future => point.date_from.is_some_and(|from| from > now),
            FilterKind::Present => match (point.date_from, point.date_to) {
                (Some(from), Some(to)) => from <= now && now <= to,
                _ => false,
            },
            FilterKind::Past => point.date_to.is_some_and(|to| to < now),
        }
    }

    /// Tab label, e.g. `"Future"`.
    pub fn label(self) -> &'static str {
        match self {
            FilterKind::Everything => "Everything",
            FilterKind::Future => "Future",
            FilterKind::Present => "Present",
            FilterKind::Past => "Past",
        }
    }

    /// Message shown on an empty board while this filter is active.
    pub fn empty_message(self) -> &'static str {
        match self {
            FilterKind::Everything => "Click New Event to create your first point",
            FilterKind::Future => "There are no future events now",
            FilterKind::Present => "There are no present events now",
            FilterKind::Past => "There are no past events now",
        }
    }
}

/// Points matching `kind` at `now`, in collection order.
pub fn filter_points(points: &[Point], kind: FilterKind, now: Timestamp) -> Vec<Point> {
    points
        .iter()
        .filter(|point| kind.matches(point, now))
        .cloned()
        .collect()
}

/// One filter tab with its match count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterTab {
    pub kind: FilterKind,
    pub label: &'static str,
    pub count: usize,
    /// Tabs other than `Everything` are disabled when nothing matches.
    pub disabled: bool,
}

/// Build the tab strip for `points` evaluated at `now`.
pub fn filter_tabs(points: &[Point], now: Timestamp) -> Vec<FilterTab> {
    FilterKind::ALL
        .into_iter()
        .map(|kind| {
            let count = points.iter().filter(|p| kind.matches(p, now)).count();
            FilterTab {
                kind,
                label: kind.label(),
                count,
                disabled: kind != FilterKind::Everything && count == 0,
            }
        })
        .collect()
}
