// src/table.rs

use std::collections::HashMap;

use crate::category::{Category, NAME, ROUND, TEAM};
use crate::cell::{safe_number, Cell};

/// Grouping key for a player. The jersey number is deliberately not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerKey {
    pub team: String,
    pub name: String,
}

/// One player's stat line for one round, keyed by canonical column name.
///
/// The same shape carries cumulative source rows, per-round increments and the
/// synthesized TOTAL row. A canonical column the source never had is simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub team: String,
    pub round: String,
    values: HashMap<&'static str, Cell>,
}

impl StatRow {
    pub fn new(team: impl Into<String>, round: impl Into<String>) -> Self {
        StatRow {
            team: team.into(),
            round: round.into(),
            values: HashMap::new(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.values.get(column)
    }

    pub fn set(&mut self, column: &'static str, cell: impl Into<Cell>) {
        self.values.insert(column, cell.into());
    }

    pub fn has(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    /// Safe numeric value of a column; missing or unparseable is 0.
    pub fn number(&self, column: &str) -> f64 {
        safe_number(self.get(column))
    }

    pub fn name(&self) -> String {
        self.get(NAME).map(Cell::to_string).unwrap_or_default()
    }

    pub fn key(&self) -> PlayerKey {
        PlayerKey {
            team: self.team.clone(),
            name: self.name(),
        }
    }

    /// Cell as it should be rendered for `column`, including `Team` and `Round`.
    pub fn render(&self, category: Category, column: &str) -> String {
        match column {
            TEAM => self.team.clone(),
            ROUND => self.round.clone(),
            _ => match (self.get(column), crate::metrics::places(category, column)) {
                (Some(Cell::Number(v)), Some(places)) if v.is_finite() => {
                    format!("{:.*}", places, v)
                }
                (Some(cell), _) => cell.to_string(),
                (None, _) => String::new(),
            },
        }
    }
}

/// A materialized output table for one category.
#[derive(Debug, Clone)]
pub struct Table {
    pub category: Category,
    /// Every canonical column, then `Team` and `Round`.
    pub columns: Vec<&'static str>,
    pub rows: Vec<StatRow>,
}

impl Table {
    pub fn from_rows(category: Category, rows: Vec<StatRow>) -> Self {
        let mut columns: Vec<&'static str> = category.columns().to_vec();
        columns.push(TEAM);
        columns.push(ROUND);
        Table {
            category,
            columns,
            rows,
        }
    }

    pub fn header(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.to_string()).collect()
    }

    pub fn records(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows.iter().map(move |row| {
            self.columns
                .iter()
                .map(|c| row.render(self.category, c))
                .collect()
        })
    }

    pub fn player_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.round == crate::category::TOTAL_ROUND)
            .count()
    }
}
