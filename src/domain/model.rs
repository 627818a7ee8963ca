use serde::{Deserialize, Serialize};

/// Ids from the directory API are positive; `0` means "no id".
pub type Id = u64;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Company {
    pub name: String,
    #[serde(rename = "catchPhrase")]
    pub catch_phrase: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: Id,
    pub name: String,
    pub username: String,
    pub email: String,
    pub company: Company,
}

/// `Post::default()` 即佔位貼文（id 為 0），對應 API 回傳 `{}` 的情況
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub id: Id,
    #[serde(rename = "userId")]
    pub user_id: Id,
    pub title: String,
    pub body: String,
}

impl Post {
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_placeholder(&self) -> bool {
        self.id == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub id: Id,
    #[serde(rename = "postId")]
    pub post_id: Id,
    pub name: String,
    pub email: String,
    pub body: String,
}
