//! Defensive type matchups

use serde::Serialize;
use std::collections::HashMap;

/// Pairwise damage factors in percent, keyed by (attacking, defending) type
#[derive(Debug, Clone, Default)]
pub struct DamageFactors {
    factors: HashMap<(i64, i64), i64>,
}

impl DamageFactors {
    pub fn new(rows: impl IntoIterator<Item = (i64, i64, i64)>) -> Self {
        Self {
            factors: rows
                .into_iter()
                .map(|(attack, target, factor)| ((attack, target), factor))
                .collect(),
        }
    }

    /// Factor as a multiplier; a pair with no fact is neutral
    pub fn multiplier(&self, attack: i64, target: i64) -> f64 {
        self.factors
            .get(&(attack, target))
            .map_or(1.0, |&factor| factor as f64 / 100.0)
    }

    /// Combined multiplier of one attacking type against every defending type
    pub fn combined(&self, attack: i64, defending: &[i64]) -> f64 {
        defending
            .iter()
            .map(|&target| self.multiplier(attack, target))
            .product()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeMultiplier {
    #[serde(rename = "type")]
    pub type_name: String,
    pub multiplier: f64,
}

/// Every known attacking type, split into the three display buckets
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Matchups {
    pub weakness: Vec<TypeMultiplier>,
    pub resistance: Vec<TypeMultiplier>,
    pub immune: Vec<TypeMultiplier>,
}

/// Classify every type in `known_types` (id, localized name) against the
/// defending type set. Neutral matchups appear in no bucket.
pub fn type_matchups(
    factors: &DamageFactors,
    known_types: &[(i64, String)],
    defending: &[i64],
) -> Matchups {
    let mut out = Matchups::default();

    for (type_id, name) in known_types {
        let multiplier = factors.combined(*type_id, defending);
        let entry = TypeMultiplier {
            type_name: name.clone(),
            multiplier,
        };
        if multiplier == 0.0 {
            out.immune.push(entry);
        } else if multiplier > 1.0 {
            out.weakness.push(entry);
        } else if multiplier < 1.0 {
            out.resistance.push(entry);
        }
    }

    for bucket in [&mut out.weakness, &mut out.resistance, &mut out.immune] {
        bucket.sort_by(|a, b| {
            a.multiplier
                .total_cmp(&b.multiplier)
                .then_with(|| a.type_name.cmp(&b.type_name))
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const NORMAL: i64 = 1;
    const FIGHTING: i64 = 2;
    const FLYING: i64 = 3;
    const GROUND: i64 = 5;
    const ROCK: i64 = 6;
    const GHOST: i64 = 8;
    const ELECTRIC: i64 = 13;

    fn known() -> Vec<(i64, String)> {
        vec![
            (NORMAL, "노말".to_string()),
            (FIGHTING, "격투".to_string()),
            (FLYING, "비행".to_string()),
            (GROUND, "땅".to_string()),
            (ROCK, "바위".to_string()),
            (GHOST, "고스트".to_string()),
            (ELECTRIC, "전기".to_string()),
        ]
    }

    fn factors() -> DamageFactors {
        DamageFactors::new(vec![
            (NORMAL, GHOST, 0),
            (FIGHTING, GHOST, 0),
            (FIGHTING, ROCK, 200),
            (FIGHTING, FLYING, 50),
            (GROUND, FLYING, 0),
            (GROUND, ROCK, 200),
            (ELECTRIC, FLYING, 200),
            (ELECTRIC, GROUND, 0),
            (ROCK, FLYING, 200),
            (ROCK, FIGHTING, 50),
            (FLYING, ROCK, 50),
        ])
    }

    #[test]
    fn test_missing_fact_is_neutral() {
        assert_eq!(factors().multiplier(GHOST, NORMAL), 1.0);
    }

    #[test]
    fn test_dual_type_products() {
        // rock/flying defender
        let m = type_matchups(&factors(), &known(), &[ROCK, FLYING]);
        let weak: Vec<_> = m.weakness.iter().map(|t| (t.type_name.as_str(), t.multiplier)).collect();
        assert_eq!(weak, vec![("바위", 2.0), ("전기", 2.0)]);

        let resist: Vec<_> = m.resistance.iter().map(|t| (t.type_name.as_str(), t.multiplier)).collect();
        assert_eq!(resist, vec![("비행", 0.5)]);

        let immune: Vec<_> = m.immune.iter().map(|t| t.type_name.as_str()).collect();
        assert_eq!(immune, vec!["땅"]);
    }

    #[test]
    fn test_immunity_absorbs_weakness() {
        // fighting hits rock 2x but ghost 0x
        let m = type_matchups(&factors(), &known(), &[ROCK, GHOST]);
        let immune: Vec<_> = m.immune.iter().map(|t| t.type_name.as_str()).collect();
        assert_eq!(immune, vec!["격투", "노말"]);
        assert!(m.weakness.iter().all(|t| t.type_name != "격투"));
    }

    #[test]
    fn test_buckets_sorted_by_multiplier_then_name() {
        let factors = DamageFactors::new(vec![(NORMAL, ROCK, 400), (GHOST, ROCK, 200), (FIGHTING, ROCK, 200)]);
        let m = type_matchups(&factors, &known(), &[ROCK]);
        let names: Vec<_> = m.weakness.iter().map(|t| t.type_name.as_str()).collect();
        assert_eq!(names, vec!["격투", "고스트", "노말"]);
    }
}
