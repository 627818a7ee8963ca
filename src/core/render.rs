use crate::core::DirectoryApi;
use crate::dom::helpers::{create_elem_with_text, HIDE_CLASS, SHOW_COMMENTS};
use crate::dom::{DomResult, Document, NodeId};
use crate::domain::model::{Comment, Id, Post};
use crate::utils::error::Result;

pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Fragment of `<article>`s, one per comment. `None` in, `None` out.
pub fn create_comments(doc: &mut Document, comments: Option<&[Comment]>) -> DomResult<Option<NodeId>> {
    let Some(comments) = comments else {
        return Ok(None);
    };

    let fragment = doc.create_document_fragment();
    for comment in comments {
        let article = doc.create_element("article");
        let h3 = create_elem_with_text(doc, "h3", &comment.name, None);
        let body = create_elem_with_text(doc, "p", &comment.body, None);
        let email = create_elem_with_text(doc, "p", &format!("From: {}", comment.email), None);
        doc.append(article, &[h3, body, email])?;
        doc.append_child(fragment, article)?;
    }
    Ok(Some(fragment))
}

/// 建立隱藏的留言區塊；抓留言失敗時回傳空的 section，不往外丟錯
pub async fn display_comments<A: DirectoryApi + ?Sized>(
    doc: &mut Document,
    api: &A,
    post_id: Id,
) -> Result<Option<NodeId>> {
    if post_id == 0 {
        return Ok(None);
    }

    let section = doc.create_element("section");
    doc.set_dataset(section, "postId", &post_id.to_string())?;
    doc.class_add(section, &["comments", HIDE_CLASS])?;

    let comments = match api.get_post_comments(post_id).await {
        Ok(comments) => Some(comments),
        Err(e) => {
            tracing::warn!("Rendering post {} without comments: {}", post_id, e);
            None
        }
    };

    if let Some(fragment) = create_comments(doc, comments.as_deref())? {
        doc.append_child(section, fragment)?;
    }
    Ok(Some(section))
}

/// Builds one `<article>` per post, fetching author and comments post by post.
///
/// A placeholder post becomes an empty card (blank heading and body, nothing
/// fetched). When the author lookup fails the card still renders, crediting
/// an unknown author.
pub async fn create_posts<A: DirectoryApi + ?Sized>(
    doc: &mut Document,
    api: &A,
    posts: Option<&[Post]>,
) -> Result<Option<NodeId>> {
    let Some(posts) = posts else {
        return Ok(None);
    };

    let fragment = doc.create_document_fragment();
    for post in posts {
        let article = doc.create_element("article");
        let h2 = create_elem_with_text(doc, "h2", &post.title, None);
        let body = create_elem_with_text(doc, "p", &post.body, None);

        if post.is_placeholder() {
            doc.append(article, &[h2, body])?;
            doc.append_child(fragment, article)?;
            continue;
        }

        let post_id = create_elem_with_text(doc, "p", &format!("Post ID: {}", post.id), None);

        let (author_line, catch_phrase) = match api.get_user(post.user_id).await {
            Ok(author) => (
                format!("Author: {} with {}", author.name, author.company.name),
                author.company.catch_phrase,
            ),
            Err(e) => {
                tracing::warn!("Author of post {} unavailable: {}", post.id, e);
                (format!("Author: {}", UNKNOWN_AUTHOR), String::new())
            }
        };
        let author = create_elem_with_text(doc, "p", &author_line, None);
        let catch_phrase = create_elem_with_text(doc, "p", &catch_phrase, None);

        let button = create_elem_with_text(doc, "button", SHOW_COMMENTS, None);
        doc.set_dataset(button, "postId", &post.id.to_string())?;

        doc.append(article, &[h2, body, post_id, author, catch_phrase, button])?;
        if let Some(section) = display_comments(doc, api, post.id).await? {
            doc.append_child(article, section)?;
        }
        doc.append_child(fragment, article)?;
    }

    tracing::debug!("Rendered {} post cards", posts.len());
    Ok(Some(fragment))
}
