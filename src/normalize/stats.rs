//! Base stat ordering and totals

use serde::Serialize;
use std::collections::HashMap;

/// The six canonical stats in display order, with Korean labels
pub const STAT_ORDER: &[(&str, &str)] = &[
    ("hp", "HP"),
    ("attack", "공격"),
    ("defense", "방어"),
    ("special-attack", "특수공격"),
    ("special-defense", "특수방어"),
    ("speed", "스피드"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatValue {
    pub key: &'static str,
    pub name: &'static str,
    pub value: i64,
}

/// Six-stat view plus total. Missing stats read as zero and stats outside the
/// canonical six are ignored.
pub fn ordered_stats<'a>(rows: impl IntoIterator<Item = (&'a str, i64)>) -> (Vec<StatValue>, i64) {
    let raw: HashMap<&str, i64> = rows.into_iter().collect();
    let ordered: Vec<StatValue> = STAT_ORDER
        .iter()
        .map(|&(key, name)| StatValue {
            key,
            name,
            value: raw.get(key).copied().unwrap_or(0),
        })
        .collect();
    let total = ordered.iter().map(|s| s.value).sum();
    (ordered, total)
}
