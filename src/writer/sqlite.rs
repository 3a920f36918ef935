use anyhow::{Context, Result};
use rusqlite::{Connection, Transaction};
use std::path::{Path, PathBuf};

use super::schema_gen::{generate_create_table, generate_indexes};
use crate::config::SCHEMA_VERSION;
use crate::normalize::NormalizedRows;
use crate::parser::ToSqlRow;
use crate::schema::{self, TableSchema, ALL_TABLES};
use crate::ui::Ui;

const BATCH_SIZE: usize = 1000;

/// The store file plus its WAL side files
pub fn store_files(db_path: &Path) -> Vec<PathBuf> {
    let mut files = vec![db_path.to_path_buf()];
    for suffix in ["-wal", "-shm", "-journal"] {
        let mut name = db_path.as_os_str().to_owned();
        name.push(suffix);
        files.push(PathBuf::from(name));
    }
    files
}

/// Delete the store file and any side files, ignoring ones that are absent
pub fn remove_store(db_path: &Path) -> Result<()> {
    for file in store_files(db_path) {
        if file.exists() {
            std::fs::remove_file(&file)
                .with_context(|| format!("Failed to remove {:?}", file))?;
        }
    }
    Ok(())
}

pub struct SqliteWriter {
    conn: Connection,
}

impl SqliteWriter {
    pub fn new(db_path: &Path) -> Result<Self> {
        remove_store(db_path).context("Failed to remove existing database")?;

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let conn = Connection::open(db_path).context("Failed to create database")?;

        // Enable foreign keys and optimize for bulk insert
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;",
        )?;

        Ok(Self { conn })
    }

    /// Create all tables for the given schemas
    pub fn create_tables(&self, schemas: &[&TableSchema], ui: &mut impl Ui) -> Result<()> {
        ui.log(format!("Creating {} tables...", schemas.len()));

        for schema in schemas {
            let sql = generate_create_table(schema);
            self.conn
                .execute(&sql, [])
                .with_context(|| format!("Failed to create table: {}", schema.name))?;

            for index_sql in generate_indexes(schema) {
                self.conn
                    .execute(&index_sql, [])
                    .with_context(|| format!("Failed to create index for: {}", schema.name))?;
            }
        }

        Ok(())
    }

    /// Write every normalized table inside one transaction
    pub fn write_rows(&mut self, rows: &NormalizedRows, ui: &mut impl Ui) -> Result<u64> {
        let total = rows.total_rows() as u64;
        let tx = self.conn.transaction()?;
        let mut progress = WriteProgress {
            ui: &mut *ui,
            done: 0,
            total,
        };

        progress.insert(&tx, &schema::POKEMON, &rows.pokemon)?;
        progress.insert(&tx, &schema::POKEMON_FORM_META, &rows.form_meta)?;
        progress.insert(&tx, &schema::POKEMON_STAT, &rows.stats)?;
        progress.insert(&tx, &schema::POKEMON_ABILITY, &rows.abilities)?;
        progress.insert(&tx, &schema::POKEMON_TYPE, &rows.types)?;
        progress.insert(&tx, &schema::TYPE_EFFICACY, &rows.efficacy)?;
        progress.insert(&tx, &schema::POKEMON_EGG_MOVE, &rows.egg_moves)?;
        progress.insert(&tx, &schema::POKEMON_LEVEL_MOVE, &rows.level_moves)?;
        progress.insert(&tx, &schema::EVOLUTION_MEMBER, &rows.evolution_members)?;
        progress.insert(&tx, &schema::EVOLUTION_EDGE, &rows.evolution_edges)?;

        tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        tx.commit().context("Failed to commit store transaction")?;
        ui.clear_progress();

        Ok(total)
    }

    /// Fold the WAL back into the main file so the store is a single file
    pub fn finalize(self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA optimize;
             PRAGMA journal_mode = DELETE;",
        )?;
        Ok(())
    }
}

struct WriteProgress<'u, U: Ui> {
    ui: &'u mut U,
    done: u64,
    total: u64,
}

impl<U: Ui> WriteProgress<'_, U> {
    fn insert<T: ToSqlRow>(&mut self, tx: &Transaction, schema: &TableSchema, rows: &[T]) -> Result<()> {
        let columns = schema.column_names();
        let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            schema.name,
            columns.join(", "),
            placeholders.join(", ")
        );

        for batch in rows.chunks(BATCH_SIZE) {
            insert_batch(tx, &insert_sql, batch)
                .with_context(|| format!("Failed to insert into {}", schema.name))?;
            self.done += batch.len() as u64;
            self.ui.set_progress(self.done, self.total, schema.name);
        }
        self.ui.log(format!("{}: {} records", schema.name, rows.len()));
        Ok(())
    }
}

/// Insert a batch of rows into the database
fn insert_batch<T: ToSqlRow>(tx: &Transaction, sql: &str, batch: &[T]) -> Result<()> {
    let mut stmt = tx.prepare_cached(sql)?;

    for row in batch {
        for (idx, value) in row.to_sql_row().iter().enumerate() {
            value.bind_to(idx + 1, &mut stmt)?;
        }
        stmt.raw_execute()?;
    }

    Ok(())
}

/// Create a fresh store at `db_path` holding `rows`
pub fn write_store(db_path: &Path, rows: &NormalizedRows, ui: &mut impl Ui) -> Result<u64> {
    let mut writer = SqliteWriter::new(db_path)?;
    writer.create_tables(ALL_TABLES, ui)?;
    let count = writer.write_rows(rows, ui)?;
    writer.finalize()?;
    Ok(count)
}
