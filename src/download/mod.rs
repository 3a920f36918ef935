pub mod cache;
pub mod client;

pub use cache::*;
pub use client::*;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;

use crate::parser::Table;
use crate::ui::Ui;

/// Every CSV table the normalizer reads
pub const SOURCE_TABLES: &[&str] = &[
    "languages",
    "pokemon",
    "pokemon_species",
    "pokemon_species_names",
    "pokemon_forms",
    "pokemon_form_names",
    "version_groups",
    "pokemon_evolution",
    "evolution_triggers",
    "evolution_trigger_prose",
    "items",
    "item_names",
    "pokemon_stats",
    "stats",
    "pokemon_abilities",
    "abilities",
    "ability_names",
    "ability_prose",
    "ability_flavor_text",
    "pokemon_types",
    "type_names",
    "type_efficacy",
    "pokemon_moves",
    "pokemon_move_methods",
    "moves",
    "move_names",
    "move_effect_prose",
    "move_flavor_text",
    "move_damage_classes",
    "move_damage_class_prose",
];

/// Where the raw CSV tables come from
pub trait TableSource {
    /// Short description for log lines
    fn describe(&self) -> String;

    fn load_table(&self, table: &str, ui: &mut impl Ui) -> Result<Table>;
}

/// Reads `<dir>/<table>.csv` from a local directory
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TableSource for DirSource {
    fn describe(&self) -> String {
        format!("local directory {:?}", self.dir)
    }

    fn load_table(&self, table: &str, _ui: &mut impl Ui) -> Result<Table> {
        let path = self.dir.join(format!("{}.csv", table));
        let file = File::open(&path).with_context(|| format!("Failed to open: {:?}", path))?;
        Table::from_reader(table, BufReader::new(file))
    }
}

/// Downloads tables over HTTP, keeping a copy in the cache directory
pub struct HttpSource {
    client: CsvClient,
    cache: CacheManager,
    force: bool,
}

impl HttpSource {
    pub fn new(client: CsvClient, cache: CacheManager, force: bool) -> Self {
        Self {
            client,
            cache,
            force,
        }
    }

    /// Make sure the table is present in the cache, downloading if needed
    pub fn ensure_cached(&self, table: &str, ui: &mut impl Ui) -> Result<PathBuf> {
        let path = self.cache.table_path(table);
        if !self.force && self.cache.is_cached(table) {
            return Ok(path);
        }

        let partial = self.cache.partial_path(table);
        let result = self.client.download_table(table, &partial).and_then(|bytes| {
            fs::rename(&partial, &path)
                .with_context(|| format!("Failed to move {:?} into cache", partial))?;
            Ok(bytes)
        });

        match result {
            Ok(bytes) => {
                ui.log(format!("{}: downloaded {}", table, format_bytes(bytes)));
                Ok(path)
            }
            Err(err) => {
                fs::remove_file(&partial).ok();
                Err(err)
            }
        }
    }
}

impl TableSource for HttpSource {
    fn describe(&self) -> String {
        format!("{} (cache {:?})", self.client.table_url("*"), self.cache.cache_dir())
    }

    fn load_table(&self, table: &str, ui: &mut impl Ui) -> Result<Table> {
        let path = self.ensure_cached(table, ui)?;
        let file = File::open(&path).with_context(|| format!("Failed to open: {:?}", path))?;
        Table::from_reader(table, BufReader::new(file))
    }
}

static EMPTY_TABLE: Lazy<Table> = Lazy::new(Table::default);

/// The full set of raw tables for one build
#[derive(Default)]
pub struct SourceTables {
    tables: HashMap<String, Table>,
}

impl SourceTables {
    /// Load every table in [`SOURCE_TABLES`]; any failure aborts the load
    pub fn load(source: &impl TableSource, ui: &mut impl Ui) -> Result<Self> {
        ui.set_info(source.describe());
        let total = SOURCE_TABLES.len() as u64;
        let mut tables = HashMap::new();

        for (idx, name) in SOURCE_TABLES.iter().enumerate() {
            ui.set_progress(idx as u64, total, *name);
            let table = source
                .load_table(name, ui)
                .with_context(|| format!("Failed to load source table {}", name))?;
            tables.insert(name.to_string(), table);
        }

        ui.set_progress(total, total, "tables loaded");
        ui.clear_progress();
        Ok(Self { tables })
    }

    pub fn from_tables(tables: impl IntoIterator<Item = Table>) -> Self {
        Self {
            tables: tables
                .into_iter()
                .map(|table| (table.name().to_string(), table))
                .collect(),
        }
    }

    /// A named table; tables that were never loaded read as empty
    pub fn get(&self, name: &str) -> &Table {
        self.tables.get(name).unwrap_or(&EMPTY_TABLE)
    }
}

/// Download every source table into the cache
pub fn prefetch(source: &HttpSource, ui: &mut impl Ui) -> Result<usize> {
    let total = SOURCE_TABLES.len() as u64;
    for (idx, name) in SOURCE_TABLES.iter().enumerate() {
        ui.set_progress(idx as u64, total, *name);
        source.ensure_cached(name, ui)?;
    }
    ui.clear_progress();
    Ok(SOURCE_TABLES.len())
}
