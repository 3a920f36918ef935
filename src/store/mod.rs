//! Store lifecycle: staleness check, gated rebuild, read-only access

pub mod query;
pub mod staleness;

pub use query::*;
pub use staleness::*;

use anyhow::Result;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::config::Languages;
use crate::download::{SourceTables, TableSource};
use crate::error::DatasetError;
use crate::normalize::normalize;
use crate::ui::{Phase, Ui};
use crate::writer::{remove_store, write_store};

/// Serializes the check-then-build decision across callers in this process
static BUILD_GATE: Mutex<()> = Mutex::new(());

/// What [`refresh_store`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    Reused,
    Rebuilt { rows: u64 },
}

/// Load, normalize and write a fresh store at `path`
pub fn build_store(
    path: &Path,
    source: &impl TableSource,
    languages: &Languages,
    ui: &mut impl Ui,
) -> Result<u64> {
    ui.set_phase(Phase::Fetching);
    let tables = SourceTables::load(source, ui)?;

    ui.set_phase(Phase::Normalizing);
    let rows = normalize(&tables, languages, ui)?;

    ui.set_phase(Phase::Writing);
    write_store(path, &rows, ui)
}

/// Reuse the store at `path` if it is current, otherwise rebuild it.
///
/// A failed rebuild leaves no file behind.
pub fn refresh_store(
    path: &Path,
    source: &impl TableSource,
    languages: &Languages,
    ui: &mut impl Ui,
) -> Result<Refresh, DatasetError> {
    let _gate = BUILD_GATE.lock().unwrap_or_else(PoisonError::into_inner);

    ui.set_phase(Phase::Checking);
    let status = inspect_store(path);
    if status.is_ready() {
        ui.log(format!("{:?}: {}", path, status));
        return Ok(Refresh::Reused);
    }
    ui.log(format!("Rebuilding {:?}: {}", path, status));

    match build_store(path, source, languages, ui) {
        Ok(rows) => Ok(Refresh::Rebuilt { rows }),
        Err(err) => {
            if let Err(cleanup) = remove_store(path) {
                ui.log(format!("Failed to remove partial store: {:#}", cleanup));
            }
            Err(DatasetError::init(err))
        }
    }
}

/// Make sure a current store exists at `path` and open it read-only
pub fn ensure_store(
    path: &Path,
    source: &impl TableSource,
    languages: &Languages,
    ui: &mut impl Ui,
) -> Result<Store, DatasetError> {
    refresh_store(path, source, languages, ui)?;
    Store::open(path)
}
