// src/aggregate/delta.rs

use std::collections::HashMap;

use crate::category::{Category, ColumnRole};
use crate::cell::{tidy, Cell};
use crate::metrics;
use crate::rounds::RoundOrder;
use crate::table::{PlayerKey, StatRow};

/// One player's cumulative rows, ordered by round.
#[derive(Debug, Clone)]
pub struct PlayerTimeline {
    pub key: PlayerKey,
    pub rows: Vec<StatRow>,
}

/// Group rows by `(Team, Name)` keeping first-seen player order, then sort each
/// group by round. The sort is stable, so duplicate rounds keep input order.
pub fn group_by_player(rows: Vec<StatRow>, order: &RoundOrder) -> Vec<PlayerTimeline> {
    let mut index: HashMap<PlayerKey, usize> = HashMap::new();
    let mut timelines: Vec<PlayerTimeline> = Vec::new();

    for row in rows {
        let key = row.key();
        match index.get(&key) {
            Some(&i) => timelines[i].rows.push(row),
            None => {
                index.insert(key.clone(), timelines.len());
                timelines.push(PlayerTimeline {
                    key,
                    rows: vec![row],
                });
            }
        }
    }

    for t in &mut timelines {
        t.rows.sort_by_key(|r| order.rank(&r.round));
    }
    timelines
}

/// Turn a player's cumulative rows into per-round increments.
///
/// The first round is taken as starting from zero, so its values pass through
/// unchanged. Later rounds subtract the previous round's cumulative value for
/// every counting column present in the current row. Derived columns are
/// recomputed from the increments.
pub fn deltas(category: Category, timeline: &PlayerTimeline) -> Vec<StatRow> {
    let mut out = Vec::with_capacity(timeline.rows.len());
    let mut prev: Option<&StatRow> = None;

    for current in &timeline.rows {
        let mut row = current.clone();
        if let Some(prev) = prev {
            for col in category.columns().iter().copied() {
                if category.role(col) != ColumnRole::Counting || !current.has(col) {
                    continue;
                }
                let diff = tidy(current.number(col) - prev.number(col));
                row.set(col, Cell::Number(diff));
            }
        }
        metrics::recompute(category, &mut row);
        out.push(row);
        prev = Some(current);
    }
    out
}
