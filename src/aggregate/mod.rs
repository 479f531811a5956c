// src/aggregate/mod.rs
//! Cumulative-to-per-round conversion and TOTAL synthesis for a whole category.

pub mod delta;
pub mod total;

use rayon::prelude::*;
use tracing::debug;

use crate::category::Category;
use crate::rounds::RoundOrder;
use crate::table::StatRow;

pub use delta::{deltas, group_by_player, PlayerTimeline};
pub use total::total;

fn player_rows(category: Category, timeline: &PlayerTimeline) -> Vec<StatRow> {
    let mut rows = deltas(category, timeline);
    if let Some(t) = total(category, &rows) {
        rows.push(t);
    }
    rows
}

/// Convert a category's cumulative rows into per-round rows, each player followed
/// by their TOTAL row. Players appear in first-seen order and their rounds in
/// round order. With `parallel`, players are processed on the rayon pool; the
/// output is identical either way.
pub fn aggregate(
    category: Category,
    rows: Vec<StatRow>,
    order: &RoundOrder,
    parallel: bool,
) -> Vec<StatRow> {
    let timelines = group_by_player(rows, order);
    debug!(
        category = category.as_str(),
        players = timelines.len(),
        parallel,
        "aggregating"
    );

    let per_player: Vec<Vec<StatRow>> = if parallel {
        timelines
            .par_iter()
            .map(|t| player_rows(category, t))
            .collect()
    } else {
        timelines.iter().map(|t| player_rows(category, t)).collect()
    };

    per_player.into_iter().flatten().collect()
}
