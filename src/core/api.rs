use crate::core::{ConfigProvider, DirectoryApi};
use crate::domain::model::{Comment, Id, Post, User};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

pub const DEFAULT_API_BASE: &str = "https://jsonplaceholder.typicode.com";

/// Directory API over HTTP. Failures are logged here and returned to the caller.
#[derive(Debug, Clone)]
pub struct HttpDirectoryApi {
    client: Client,
    base_url: String,
}

impl HttpDirectoryApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.api_base(),
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        what: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let result = self.fetch(&url, query).await;
        if let Err(e) = &result {
            tracing::error!("❌ Error fetching {}: {}", what, e);
        }
        result
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        tracing::debug!("Making API request to: {} {:?}", url, query);
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);
        if !status.is_success() {
            return Err(AppError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // 先取 bytes 再解析，解析錯誤才能帶上 URL
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| AppError::DecodeError {
            url: url.to_string(),
            source,
        })
    }
}

fn require_id(id: Id, resource: &'static str) -> Result<Id> {
    if id == 0 {
        return Err(AppError::MissingId { resource });
    }
    Ok(id)
}

#[async_trait]
impl DirectoryApi for HttpDirectoryApi {
    async fn get_users(&self) -> Result<Vec<User>> {
        self.get_json("users", "/users", &[]).await
    }

    async fn get_user(&self, user_id: Id) -> Result<User> {
        let user_id = require_id(user_id, "user")?;
        self.get_json("user", &format!("/users/{}", user_id), &[])
            .await
    }

    async fn get_user_posts(&self, user_id: Id) -> Result<Vec<Post>> {
        let user_id = require_id(user_id, "user")?;
        self.get_json("user posts", "/posts", &[("userId", user_id.to_string())])
            .await
    }

    async fn get_post_comments(&self, post_id: Id) -> Result<Vec<Comment>> {
        let post_id = require_id(post_id, "post")?;
        self.get_json(
            "post comments",
            "/comments",
            &[("postId", post_id.to_string())],
        )
        .await
    }
}

#[derive(Debug, Default)]
struct CacheState {
    users: Option<Vec<User>>,
    user: HashMap<Id, User>,
    posts: HashMap<Id, Vec<Post>>,
    comments: HashMap<Id, Vec<Comment>>,
    hits: usize,
}

/// Memoises successful responses of another [`DirectoryApi`]. Errors are not cached.
#[derive(Debug)]
pub struct CachedDirectoryApi<A: DirectoryApi> {
    inner: A,
    state: Mutex<CacheState>,
}

impl<A: DirectoryApi> CachedDirectoryApi<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub async fn hits(&self) -> usize {
        self.state.lock().await.hits
    }

    pub async fn clear(&self) {
        *self.state.lock().await = CacheState::default();
    }
}

#[async_trait]
impl<A: DirectoryApi> DirectoryApi for CachedDirectoryApi<A> {
    async fn get_users(&self) -> Result<Vec<User>> {
        {
            let mut state = self.state.lock().await;
            if let Some(users) = state.users.clone() {
                state.hits += 1;
                return Ok(users);
            }
        }
        let users = self.inner.get_users().await?;
        self.state.lock().await.users = Some(users.clone());
        Ok(users)
    }

    async fn get_user(&self, user_id: Id) -> Result<User> {
        {
            let mut state = self.state.lock().await;
            if let Some(user) = state.user.get(&user_id).cloned() {
                state.hits += 1;
                return Ok(user);
            }
        }
        let user = self.inner.get_user(user_id).await?;
        self.state.lock().await.user.insert(user_id, user.clone());
        Ok(user)
    }

    async fn get_user_posts(&self, user_id: Id) -> Result<Vec<Post>> {
        {
            let mut state = self.state.lock().await;
            if let Some(posts) = state.posts.get(&user_id).cloned() {
                state.hits += 1;
                return Ok(posts);
            }
        }
        let posts = self.inner.get_user_posts(user_id).await?;
        self.state.lock().await.posts.insert(user_id, posts.clone());
        Ok(posts)
    }

    async fn get_post_comments(&self, post_id: Id) -> Result<Vec<Comment>> {
        {
            let mut state = self.state.lock().await;
            if let Some(comments) = state.comments.get(&post_id).cloned() {
                state.hits += 1;
                return Ok(comments);
            }
        }
        let comments = self.inner.get_post_comments(post_id).await?;
        self.state
            .lock()
            .await
            .comments
            .insert(post_id, comments.clone());
        Ok(comments)
    }
}

/// Lets the page hold either a plain or a cached client behind one type.
#[async_trait]
impl DirectoryApi for Box<dyn DirectoryApi> {
    async fn get_users(&self) -> Result<Vec<User>> {
        (**self).get_users().await
    }

    async fn get_user(&self, user_id: Id) -> Result<User> {
        (**self).get_user(user_id).await
    }

    async fn get_user_posts(&self, user_id: Id) -> Result<Vec<Post>> {
        (**self).get_user_posts(user_id).await
    }

    async fn get_post_comments(&self, post_id: Id) -> Result<Vec<Comment>> {
        (**self).get_post_comments(post_id).await
    }
}
