//! Trip header summary: route title, overall dates and total cost.

use std::collections::HashSet;

use serde::Serialize;

use crate::point::{find_destination, Destination, OffersByType, Point};
use crate::sort::{sort_points, SortKind};

/// Separator used in the route title and the date range.
const DASH: &str = " — ";

/// Up to this many cities are listed by name; longer routes are elided.
const MAX_TITLE_CITIES: usize = 3;

/// Aggregate shown above the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripSummary {
    pub title: String,
    pub dates: String,
    pub total_cost: u64,
}

impl TripSummary {
    /// Summarize `points`. Returns `None` when there is nothing to show.
    pub fn build(
        points: &[Point],
        destinations: &[Destination],
        offers: &OffersByType,
    ) -> Option<Self> {
        if points.is_empty() || destinations.is_empty() {
            return None;
        }

        let ordered = sort_points(points, SortKind::Day);
        Some(Self {
            title: route_title(&ordered, destinations),
            dates: date_range(&ordered),
            total_cost: total_cost(points, offers),
        })
    }
}

/// Unique destination names in travel order.
fn route_title(ordered: &[Point], destinations: &[Destination]) -> String {
    let mut seen = HashSet::new();
    let names: Vec<&str> = ordered
        .iter()
        .filter_map(|p| p.destination.as_ref())
        .filter(|id| seen.insert((*id).clone()))
        .filter_map(|id| find_destination(destinations, id))
        .map(|d| d.name.as_str())
        .collect();

    match names.as_slice() {
        [] => String::new(),
        short if short.len() <= MAX_TITLE_CITIES => short.join(DASH),
        [first, .., last] => format!("{first}{DASH}...{DASH}{last}"),
        _ => String::new(),
    }
}

/// Earliest start to latest end. Undated points are skipped.
fn date_range(points: &[Point]) -> String {
    let start = points.iter().filter_map(|p| p.date_from).min();
    let end = points.iter().filter_map(|p| p.date_to).max();

    match (start, end) {
        (Some(start), Some(end)) => {
            let same_month = start.format("%Y-%m").to_string() == end.format("%Y-%m").to_string();
            let end_fmt = if same_month { "%d" } else { "%d %b" };
            format!("{}{DASH}{}", start.format("%d %b"), end.format(end_fmt))
        }
        _ => String::new(),
    }
}

/// Base prices plus the price of every selected offer.
fn total_cost(points: &[Point], offers: &OffersByType) -> u64 {
    points
        .iter()
        .map(|p| {
            let extras: u64 = p
                .offers
                .iter()
                .filter_map(|id| offers.find(p.point_type, id))
                .map(|o| u64::from(o.price))
                .sum();
            u64::from(p.base_price) + extras
        })
        .sum()
}
