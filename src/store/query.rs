//! Read-only views over a built store

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::Serialize;
use std::path::Path;

use crate::error::DatasetError;
use crate::normalize::{ordered_stats, type_matchups, DamageFactors, Matchups, StatValue};
use crate::normalize::text::NO_EFFECT_MARKER;

/// Maximum number of search hits returned
pub const SEARCH_LIMIT: i64 = 40;

const DEFAULT_EDGE_LABEL: &str = "진화";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub identifier: String,
    pub is_recent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbilityView {
    pub name: String,
    pub description: String,
    pub hidden: bool,
    pub is_recent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveView {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub damage_class: String,
    pub power: i64,
    pub accuracy: i64,
    pub pp: i64,
    pub effect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    pub is_recent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub depth: i64,
    pub pokemon_id: i64,
    pub name: String,
    pub is_special: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeEdge {
    pub from: i64,
    pub to: i64,
    pub condition: String,
}

/// Everything shown on one entity's page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PokemonDetail {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub identifier: String,
    pub is_recent: bool,
    pub types: Vec<String>,
    pub stats: Vec<StatValue>,
    pub stat_total: i64,
    pub abilities: Vec<AbilityView>,
    pub type_matchups: Matchups,
    pub level_moves: Vec<MoveView>,
    pub egg_moves: Vec<MoveView>,
    pub evolution_tree: Vec<TreeNode>,
    pub evolution_edges: Vec<TreeEdge>,
}

fn or_marker(text: String) -> String {
    if text.trim().is_empty() {
        NO_EFFECT_MARKER.to_string()
    } else {
        text
    }
}

/// Escape LIKE wildcards so the prefix matches literally
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// A read-only connection to a built store
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, DatasetError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Entities whose species or display name starts with `prefix`
    pub fn search(&self, prefix: &str) -> Result<Vec<SearchHit>, DatasetError> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare_cached(
            "SELECT id, name, display_name, identifier, is_recent
             FROM pokemon
             WHERE name LIKE ?1 ESCAPE '\\' OR display_name LIKE ?1 ESCAPE '\\'
             ORDER BY name, id
             LIMIT ?2",
        )?;
        let hits = stmt
            .query_map(params![like_prefix(prefix), SEARCH_LIMIT], |r| {
                Ok(SearchHit {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    display_name: r.get(2)?,
                    identifier: r.get(3)?,
                    is_recent: r.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(hits)
    }

    /// Full detail for one entity, or `None` if the id is unknown
    pub fn pokemon(&self, id: i64) -> Result<Option<PokemonDetail>, DatasetError> {
        let head = self
            .conn
            .query_row(
                "SELECT id, name, display_name, identifier, is_recent, evolution_chain_id
                 FROM pokemon WHERE id = ?1",
                [id],
                |r| {
                    Ok((
                        SearchHit {
                            id: r.get(0)?,
                            name: r.get(1)?,
                            display_name: r.get(2)?,
                            identifier: r.get(3)?,
                            is_recent: r.get(4)?,
                        },
                        r.get::<_, Option<i64>>(5)?.unwrap_or(0),
                    ))
                },
            )
            .optional()?;
        let Some((head, chain_id)) = head else {
            return Ok(None);
        };

        let types: Vec<(i64, String)> = self.collect(
            "SELECT type_id, type_name FROM pokemon_type WHERE pokemon_id = ?1 ORDER BY slot",
            id,
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        let stat_rows: Vec<(String, i64)> = self.collect(
            "SELECT stat_identifier, base_stat FROM pokemon_stat WHERE pokemon_id = ?1",
            id,
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        let (stats, stat_total) = ordered_stats(stat_rows.iter().map(|(k, v)| (k.as_str(), *v)));

        let abilities = self.collect(
            "SELECT name, effect, is_hidden, is_recent FROM pokemon_ability
             WHERE pokemon_id = ?1 ORDER BY is_hidden, ability_id",
            id,
            |r| {
                Ok(AbilityView {
                    name: r.get(0)?,
                    description: or_marker(r.get(1)?),
                    hidden: r.get(2)?,
                    is_recent: r.get(3)?,
                })
            },
        )?;

        let level_moves = self.collect(
            "SELECT move_name, type_name, damage_class, power, accuracy, pp, effect_text, is_recent, learn_level
             FROM pokemon_level_move WHERE pokemon_id = ?1 ORDER BY learn_level, move_name",
            id,
            |r| move_view(r, Some(r.get(8)?)),
        )?;
        let egg_moves = self.collect(
            "SELECT move_name, type_name, damage_class, power, accuracy, pp, effect_text, is_recent
             FROM pokemon_egg_move WHERE pokemon_id = ?1 ORDER BY move_name",
            id,
            |r| move_view(r, None),
        )?;

        let evolution_tree = self.collect(
            "SELECT depth, pokemon_id, display_name, is_special FROM evolution_member
             WHERE chain_id = ?1 ORDER BY depth, is_special, sort_order, pokemon_id",
            chain_id,
            |r| {
                Ok(TreeNode {
                    depth: r.get(0)?,
                    pokemon_id: r.get(1)?,
                    name: r.get(2)?,
                    is_special: r.get(3)?,
                })
            },
        )?;
        let evolution_edges = self.collect(
            "SELECT from_pokemon_id, to_pokemon_id, condition_text FROM evolution_edge
             WHERE chain_id = ?1 ORDER BY sort_order, from_pokemon_id, to_pokemon_id",
            chain_id,
            |r| {
                let condition: String = r.get(2)?;
                Ok(TreeEdge {
                    from: r.get(0)?,
                    to: r.get(1)?,
                    condition: if condition.is_empty() {
                        DEFAULT_EDGE_LABEL.to_string()
                    } else {
                        condition
                    },
                })
            },
        )?;

        let defending: Vec<i64> = types.iter().map(|(type_id, _)| *type_id).collect();

        Ok(Some(PokemonDetail {
            id: head.id,
            name: head.name,
            display_name: head.display_name,
            identifier: head.identifier,
            is_recent: head.is_recent,
            types: types.into_iter().map(|(_, name)| name).collect(),
            stats,
            stat_total,
            abilities,
            type_matchups: self.matchups(&defending)?,
            level_moves,
            egg_moves,
            evolution_tree,
            evolution_edges,
        }))
    }

    /// Buckets for a defender with the given types, over every type any entity has
    pub fn matchups(&self, defending: &[i64]) -> Result<Matchups, DatasetError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT DISTINCT type_id, type_name FROM pokemon_type ORDER BY type_id")?;
        let known = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
            .collect::<rusqlite::Result<Vec<(i64, String)>>>()?;

        let mut stmt = self
            .conn
            .prepare_cached("SELECT attack_type_id, target_type_id, damage_factor FROM type_efficacy")?;
        let factors = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))?
            .collect::<rusqlite::Result<Vec<(i64, i64, i64)>>>()?;

        Ok(type_matchups(&DamageFactors::new(factors), &known, defending))
    }

    fn collect<T>(
        &self,
        sql: &str,
        key: i64,
        map: impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, DatasetError> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt.query_map([key], map)?.collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(rows)
    }
}

fn move_view(r: &rusqlite::Row<'_>, level: Option<i64>) -> rusqlite::Result<MoveView> {
    Ok(MoveView {
        name: r.get(0)?,
        type_name: r.get(1)?,
        damage_class: r.get(2)?,
        power: r.get(3)?,
        accuracy: r.get(4)?,
        pp: r.get(5)?,
        effect: or_marker(r.get(6)?),
        level,
        is_recent: r.get(7)?,
    })
}
