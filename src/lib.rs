pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod normalize;
pub mod parser;
pub mod schema;
pub mod store;
pub mod ui;
pub mod writer;

pub use cli::{Cli, Commands};
pub use error::DatasetError;
pub use store::{ensure_store, refresh_store, Store};
pub use ui::{ConsoleUi, Phase, SilentUi, Ui, UiApp};
