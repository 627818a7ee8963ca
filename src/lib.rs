pub mod config;
pub mod core;
pub mod dom;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{
    api::{CachedDirectoryApi, HttpDirectoryApi},
    page::{Page, PageOptions},
    runner::{PageRunner, RunSummary},
};
pub use dom::Document;
pub use utils::error::{AppError, Result};
