//! Build-time constants and language selection

/// Default location of the SQLite store
pub const DEFAULT_DB_PATH: &str = "data/pokewiki.db";

/// Base URL for the upstream PokeAPI CSV export
pub const CSV_BASE_URL: &str = "https://raw.githubusercontent.com/PokeAPI/pokeapi/master/data/v2/csv";

/// Stamped into `PRAGMA user_version`; bump whenever the output schema changes
pub const SCHEMA_VERSION: i64 = 3;

/// Generations after this one are flagged as recent in every output row
pub const RECENT_GENERATION_THRESHOLD: i64 = 6;

/// Target display language and the single fallback source language.
///
/// Generated labels and translations are Korean, so Korean over English is
/// the only pair that can be built; the fields are fixed for that reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Languages {
    pub(crate) target: String,
    pub(crate) source: String,
    /// Used when `languages.csv` has no row for `target`
    pub(crate) target_default_id: String,
    /// Used when `languages.csv` has no row for `source`
    pub(crate) source_default_id: String,
}

impl Default for Languages {
    fn default() -> Self {
        Self {
            target: "ko".to_string(),
            source: "en".to_string(),
            target_default_id: "3".to_string(),
            source_default_id: "9".to_string(),
        }
    }
}
