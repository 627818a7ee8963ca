use crate::domain::model::{Comment, Id, Post, User};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_file(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn placeholder_posts(&self) -> usize;
    fn cache_enabled(&self) -> bool;
    /// 要選取的員工，對應 select 的 value；`None` 代表不觸發 change
    fn employee(&self) -> Option<&str>;
    fn expand_posts(&self) -> &[Id];
}

/// Read side of the employee directory. A zero id is rejected before any request.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    async fn get_users(&self) -> Result<Vec<User>>;
    async fn get_user(&self, user_id: Id) -> Result<User>;
    async fn get_user_posts(&self, user_id: Id) -> Result<Vec<Post>>;
    async fn get_post_comments(&self, post_id: Id) -> Result<Vec<Comment>>;
}
