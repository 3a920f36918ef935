use anyhow::{bail, Result};
use pokewiki_db::{
    cli::{Cli, Commands, SourceArgs},
    config::Languages,
    download::{prefetch, CacheManager, CsvClient, DirSource, HttpSource, TableSource},
    refresh_store,
    schema::table_names,
    store::{Refresh, Store},
    writer::remove_store,
    ConsoleUi, Ui, UiApp,
};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn http_source(cache_dir: Option<std::path::PathBuf>, base_url: Option<String>, force: bool) -> Result<HttpSource> {
    Ok(HttpSource::new(
        CsvClient::new(base_url)?,
        CacheManager::new(cache_dir)?,
        force,
    ))
}

fn build(db: &Path, source: &impl TableSource, languages: &Languages, tui: bool) -> Result<()> {
    let start = Instant::now();
    let summary = |outcome: &Refresh| match outcome {
        Refresh::Reused => format!("{:?} is up to date", db),
        Refresh::Rebuilt { rows } => format!(
            "Created {:?} ({} rows) in {:.1}s",
            db,
            rows,
            start.elapsed().as_secs_f64()
        ),
    };

    if tui {
        let mut app = UiApp::new()?;
        let outcome = refresh_store(db, source, languages, &mut app)?;
        app.finish(&summary(&outcome))?;
    } else {
        let mut ui = ConsoleUi::new();
        let outcome = refresh_store(db, source, languages, &mut ui)?;
        ui.log(summary(&outcome));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Build {
            db,
            source,
            force,
            tui,
        } => {
            let languages = Languages::default();
            if force {
                remove_store(&db)?;
            }

            let SourceArgs {
                csv_dir,
                cache_dir,
                base_url,
            } = source;
            match csv_dir {
                Some(dir) => build(&db, &DirSource::new(dir), &languages, tui)?,
                None => build(&db, &http_source(cache_dir, base_url, force)?, &languages, tui)?,
            }
        }

        Commands::Fetch {
            cache_dir,
            base_url,
            force,
        } => {
            let source = http_source(cache_dir, base_url, force)?;
            let mut ui = ConsoleUi::new();
            let count = prefetch(&source, &mut ui)?;
            ui.log(format!("{} tables cached from {}", count, source.describe()));
        }

        Commands::Search { query, db } => {
            let store = Store::open(&db)?;
            print_json(&store.search(&query)?)?;
        }

        Commands::Show { id, db } => {
            let store = Store::open(&db)?;
            match store.pokemon(id)? {
                Some(detail) => print_json(&detail)?,
                None => bail!("No pokemon with id {}", id),
            }
        }

        Commands::ListTables => {
            println!("Available tables:\n");
            for name in table_names() {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}
