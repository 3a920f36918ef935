//! Table schema definitions for the wiki store

use super::types::*;

pub static POKEMON: TableSchema = TableSchema {
    name: "pokemon",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("identifier", ColumnType::Text),
        Column::required("name", ColumnType::Text),
        Column::required("display_name", ColumnType::Text),
        Column::required("species_id", ColumnType::Integer),
        Column::new("evolution_chain_id", ColumnType::Integer),
        Column::required("is_recent", ColumnType::Boolean),
    ],
    primary_key: &["id"],
    foreign_keys: &[],
    indexes: &[Index::on(&["name"]), Index::on(&["display_name"])],
};

pub static POKEMON_FORM_META: TableSchema = TableSchema {
    name: "pokemon_form_meta",
    columns: &[
        Column::required("pokemon_id", ColumnType::Integer),
        Column::new("is_default", ColumnType::Boolean),
        Column::new("is_mega", ColumnType::Boolean),
        Column::new("is_gmax", ColumnType::Boolean),
        Column::new("introduced_generation", ColumnType::Integer),
        Column::new("form_order", ColumnType::Integer),
        Column::new("sort_order", ColumnType::Integer),
    ],
    primary_key: &["pokemon_id"],
    foreign_keys: &[ForeignKey::new("pokemon_id", "pokemon")],
    indexes: &[],
};

pub static POKEMON_STAT: TableSchema = TableSchema {
    name: "pokemon_stat",
    columns: &[
        Column::required("pokemon_id", ColumnType::Integer),
        Column::required("stat_identifier", ColumnType::Text),
        Column::required("base_stat", ColumnType::Integer),
    ],
    primary_key: &["pokemon_id", "stat_identifier"],
    foreign_keys: &[ForeignKey::new("pokemon_id", "pokemon")],
    indexes: &[],
};

pub static POKEMON_ABILITY: TableSchema = TableSchema {
    name: "pokemon_ability",
    columns: &[
        Column::required("pokemon_id", ColumnType::Integer),
        Column::required("ability_id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
        Column::required("effect", ColumnType::Text),
        Column::required("is_recent", ColumnType::Boolean),
        Column::required("is_hidden", ColumnType::Boolean),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::new("pokemon_id", "pokemon")],
    indexes: &[],
};

pub static POKEMON_TYPE: TableSchema = TableSchema {
    name: "pokemon_type",
    columns: &[
        Column::required("pokemon_id", ColumnType::Integer),
        Column::required("type_id", ColumnType::Integer),
        Column::required("slot", ColumnType::Integer),
        Column::required("type_name", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::new("pokemon_id", "pokemon")],
    indexes: &[],
};

pub static TYPE_EFFICACY: TableSchema = TableSchema {
    name: "type_efficacy",
    columns: &[
        Column::required("attack_type_id", ColumnType::Integer),
        Column::required("target_type_id", ColumnType::Integer),
        Column::required("damage_factor", ColumnType::Integer),
    ],
    primary_key: &["attack_type_id", "target_type_id"],
    foreign_keys: &[],
    indexes: &[],
};

pub static POKEMON_EGG_MOVE: TableSchema = TableSchema {
    name: "pokemon_egg_move",
    columns: &[
        Column::required("pokemon_id", ColumnType::Integer),
        Column::required("move_name", ColumnType::Text),
        Column::required("move_identifier", ColumnType::Text),
        Column::required("type_name", ColumnType::Text),
        Column::required("damage_class", ColumnType::Text),
        Column::required("power", ColumnType::Integer),
        Column::required("accuracy", ColumnType::Integer),
        Column::required("pp", ColumnType::Integer),
        Column::required("effect_text", ColumnType::Text),
        Column::required("is_recent", ColumnType::Boolean),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::new("pokemon_id", "pokemon")],
    indexes: &[],
};

pub static POKEMON_LEVEL_MOVE: TableSchema = TableSchema {
    name: "pokemon_level_move",
    columns: &[
        Column::required("pokemon_id", ColumnType::Integer),
        Column::required("move_name", ColumnType::Text),
        Column::required("move_identifier", ColumnType::Text),
        Column::required("type_name", ColumnType::Text),
        Column::required("damage_class", ColumnType::Text),
        Column::required("power", ColumnType::Integer),
        Column::required("accuracy", ColumnType::Integer),
        Column::required("pp", ColumnType::Integer),
        Column::required("effect_text", ColumnType::Text),
        Column::required("learn_level", ColumnType::Integer),
        Column::required("is_recent", ColumnType::Boolean),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::new("pokemon_id", "pokemon")],
    indexes: &[],
};

pub static EVOLUTION_MEMBER: TableSchema = TableSchema {
    name: "evolution_member",
    columns: &[
        Column::required("chain_id", ColumnType::Integer),
        Column::required("depth", ColumnType::Integer),
        Column::required("pokemon_id", ColumnType::Integer),
        Column::required("display_name", ColumnType::Text),
        Column::required("is_special", ColumnType::Boolean),
        Column::required("sort_order", ColumnType::Integer),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::new("pokemon_id", "pokemon")],
    indexes: &[Index::on(&["chain_id"])],
};

pub static EVOLUTION_EDGE: TableSchema = TableSchema {
    name: "evolution_edge",
    columns: &[
        Column::required("chain_id", ColumnType::Integer),
        Column::required("from_pokemon_id", ColumnType::Integer),
        Column::required("to_pokemon_id", ColumnType::Integer),
        Column::required("condition_text", ColumnType::Text),
        Column::required("sort_order", ColumnType::Integer),
    ],
    primary_key: &[],
    foreign_keys: &[
        ForeignKey::new("from_pokemon_id", "pokemon"),
        ForeignKey::new("to_pokemon_id", "pokemon"),
    ],
    indexes: &[Index::on(&["chain_id"])],
};

/// All tables, parents before children
pub static ALL_TABLES: &[&TableSchema] = &[
    &POKEMON,
    &POKEMON_FORM_META,
    &POKEMON_STAT,
    &POKEMON_ABILITY,
    &POKEMON_TYPE,
    &TYPE_EFFICACY,
    &POKEMON_EGG_MOVE,
    &POKEMON_LEVEL_MOVE,
    &EVOLUTION_MEMBER,
    &EVOLUTION_EDGE,
];

/// Get all table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}
