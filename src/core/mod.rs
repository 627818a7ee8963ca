pub mod api;
pub mod page;
pub mod render;
pub mod runner;

pub use crate::domain::model::{Comment, Company, Id, Post, User};
pub use crate::domain::ports::{ConfigProvider, DirectoryApi, Storage};
pub use crate::utils::error::Result;
