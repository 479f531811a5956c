// src/rounds.rs

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::category::TOTAL_ROUND;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit regex"));

/// Sort rank of a round label. Numbered rounds come first, in numeric order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RoundRank {
    Numbered(u64),
    Unnumbered,
}

/// Rank from the first digit run in `label`. Labels with no digits, a digit run too
/// large for `u64`, or the literal `TOTAL` sort after every numbered round.
pub fn round_rank(label: &str) -> RoundRank {
    if label.eq_ignore_ascii_case(TOTAL_ROUND) {
        return RoundRank::Unnumbered;
    }
    DIGITS
        .find(label)
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .map(RoundRank::Numbered)
        .unwrap_or(RoundRank::Unnumbered)
}

/// Total order over the round labels seen in a run, as label -> position.
#[derive(Debug, Clone, Default)]
pub struct RoundOrder {
    ranks: HashMap<String, usize>,
    labels: Vec<String>,
}

impl RoundOrder {
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels: Vec<String> = labels.into_iter().map(|s| s.as_ref().to_string()).collect();
        labels.sort_by(|a, b| round_rank(a).cmp(&round_rank(b)).then_with(|| a.cmp(b)));
        labels.dedup();

        let ranks = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();
        RoundOrder { ranks, labels }
    }

    /// Position of `label`; labels outside the resolved set sort last.
    pub fn rank(&self, label: &str) -> usize {
        self.ranks.get(label).copied().unwrap_or(usize::MAX)
    }

    /// Labels in resolved order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
