pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_name, validate_path, validate_range, validate_url};

#[cfg(feature = "cli")]
use crate::core::api::DEFAULT_API_BASE;
#[cfg(feature = "cli")]
use crate::core::Id;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const MAX_TIMEOUT_SECONDS: u64 = 300;
pub const MAX_PLACEHOLDER_POSTS: usize = 100;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "staff-posts")]
#[command(about = "Render employees, their posts and comments from a JSONPlaceholder-style API")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "posts.html")]
    pub output_file: String,

    #[arg(long, help = "Employee id to select (an empty value selects the default employee)")]
    pub employee: Option<String>,

    #[arg(long = "expand", value_delimiter = ',', help = "Post ids whose comments are expanded")]
    pub expand_posts: Vec<Id>,

    #[arg(long, default_value = "10")]
    pub timeout_seconds: u64,

    #[arg(long, default_value = "10", help = "Empty cards shown when an employee has no posts")]
    pub placeholder_posts: usize,

    #[arg(long, help = "Reuse identical API responses within one run")]
    pub cache: bool,

    #[arg(long, help = "Load settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_base(&self) -> &str {
        &self.api_base
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn placeholder_posts(&self) -> usize {
        self.placeholder_posts
    }

    fn cache_enabled(&self) -> bool {
        self.cache
    }

    fn employee(&self) -> Option<&str> {
        self.employee.as_deref()
    }

    fn expand_posts(&self) -> &[Id] {
        &self.expand_posts
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

/// 各種設定來源共用的檢查
pub fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    validate_url("api_base", config.api_base())?;
    validate_path("output_path", config.output_path())?;
    validate_file_name("output_file", config.output_file())?;
    validate_range("timeout_seconds", config.timeout_seconds(), 1, MAX_TIMEOUT_SECONDS)?;
    validate_range(
        "placeholder_posts",
        config.placeholder_posts(),
        0,
        MAX_PLACEHOLDER_POSTS,
    )?;
    Ok(())
}
