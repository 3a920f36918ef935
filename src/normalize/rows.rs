//! Output rows, one struct per store table

use crate::parser::{SqlValue, ToSqlRow};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PokemonRow {
    pub id: i64,
    pub identifier: String,
    pub name: String,
    pub display_name: String,
    pub species_id: i64,
    pub evolution_chain_id: i64,
    pub is_recent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FormMetaRow {
    pub pokemon_id: i64,
    pub is_default: bool,
    pub is_mega: bool,
    pub is_gmax: bool,
    pub introduced_generation: i64,
    pub form_order: i64,
    pub sort_order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct StatRow {
    pub pokemon_id: i64,
    pub stat_identifier: String,
    pub base_stat: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AbilityRow {
    pub pokemon_id: i64,
    pub ability_id: i64,
    pub name: String,
    pub effect: String,
    pub is_recent: bool,
    pub is_hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TypeSlotRow {
    pub pokemon_id: i64,
    pub type_id: i64,
    pub slot: i64,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EfficacyRow {
    pub attack_type_id: i64,
    pub target_type_id: i64,
    pub damage_factor: i64,
}

/// Columns shared by both learnset tables
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MoveInfo {
    pub name: String,
    pub identifier: String,
    pub type_name: String,
    pub damage_class: String,
    pub power: i64,
    pub accuracy: i64,
    pub pp: i64,
    pub effect: String,
    pub is_recent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EggMoveRow {
    pub pokemon_id: i64,
    pub info: MoveInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LevelMoveRow {
    pub pokemon_id: i64,
    pub info: MoveInfo,
    pub level: i64,
}

impl ToSqlRow for PokemonRow {
    fn to_sql_row(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            self.identifier.as_str().into(),
            self.name.as_str().into(),
            self.display_name.as_str().into(),
            self.species_id.into(),
            self.evolution_chain_id.into(),
            self.is_recent.into(),
        ]
    }
}

impl ToSqlRow for FormMetaRow {
    fn to_sql_row(&self) -> Vec<SqlValue> {
        vec![
            self.pokemon_id.into(),
            self.is_default.into(),
            self.is_mega.into(),
            self.is_gmax.into(),
            self.introduced_generation.into(),
            self.form_order.into(),
            self.sort_order.into(),
        ]
    }
}

impl ToSqlRow for StatRow {
    fn to_sql_row(&self) -> Vec<SqlValue> {
        vec![
            self.pokemon_id.into(),
            self.stat_identifier.as_str().into(),
            self.base_stat.into(),
        ]
    }
}

impl ToSqlRow for AbilityRow {
    fn to_sql_row(&self) -> Vec<SqlValue> {
        vec![
            self.pokemon_id.into(),
            self.ability_id.into(),
            self.name.as_str().into(),
            self.effect.as_str().into(),
            self.is_recent.into(),
            self.is_hidden.into(),
        ]
    }
}

impl ToSqlRow for TypeSlotRow {
    fn to_sql_row(&self) -> Vec<SqlValue> {
        vec![
            self.pokemon_id.into(),
            self.type_id.into(),
            self.slot.into(),
            self.type_name.as_str().into(),
        ]
    }
}

impl ToSqlRow for EfficacyRow {
    fn to_sql_row(&self) -> Vec<SqlValue> {
        vec![
            self.attack_type_id.into(),
            self.target_type_id.into(),
            self.damage_factor.into(),
        ]
    }
}

impl ToSqlRow for EggMoveRow {
    fn to_sql_row(&self) -> Vec<SqlValue> {
        let m = &self.info;
        vec![
            self.pokemon_id.into(),
            m.name.as_str().into(),
            m.identifier.as_str().into(),
            m.type_name.as_str().into(),
            m.damage_class.as_str().into(),
            m.power.into(),
            m.accuracy.into(),
            m.pp.into(),
            m.effect.as_str().into(),
            m.is_recent.into(),
        ]
    }
}

impl ToSqlRow for LevelMoveRow {
    fn to_sql_row(&self) -> Vec<SqlValue> {
        let m = &self.info;
        vec![
            self.pokemon_id.into(),
            m.name.as_str().into(),
            m.identifier.as_str().into(),
            m.type_name.as_str().into(),
            m.damage_class.as_str().into(),
            m.power.into(),
            m.accuracy.into(),
            m.pp.into(),
            m.effect.as_str().into(),
            self.level.into(),
            m.is_recent.into(),
        ]
    }
}
