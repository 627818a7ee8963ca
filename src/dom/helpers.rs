//! Small builders and toggles used by the page renderer.

use super::{DomResult, Document, NodeId};
use crate::domain::model::{Id, User};

pub const SHOW_COMMENTS: &str = "Show Comments";
pub const HIDE_COMMENTS: &str = "Hide Comments";
pub const HIDE_CLASS: &str = "hide";

/// Outcome of a lookup keyed by `data-post-id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// The post id was 0; nothing was looked up.
    MissingId,
    NotFound,
    Found(NodeId),
}

impl Toggle {
    pub fn node(self) -> Option<NodeId> {
        match self {
            Toggle::Found(node) => Some(node),
            _ => None,
        }
    }
}

/// `createElemWithText`：預設 tag 為 `p`，空的 class 名稱不設定
pub fn create_elem_with_text(
    doc: &mut Document,
    tag_name: &str,
    text: &str,
    class_name: Option<&str>,
) -> NodeId {
    let tag_name = if tag_name.is_empty() { "p" } else { tag_name };
    let element = doc.create_element(tag_name);
    if !text.is_empty() {
        doc.push_text(element, text);
    }
    if let Some(class_name) = class_name.filter(|name| !name.is_empty()) {
        doc.set_attr_unchecked(element, "class", class_name);
    }
    element
}

/// One detached `<option>` per user. `None` in, `None` out.
pub fn create_select_options(doc: &mut Document, users: Option<&[User]>) -> Option<Vec<NodeId>> {
    let users = users?;
    Some(
        users
            .iter()
            .map(|user| {
                let option = create_elem_with_text(doc, "option", &user.name, None);
                doc.set_attr_unchecked(option, "value", &user.id.to_string());
                option
            })
            .collect(),
    )
}

/// Removes every child element of `parent` (last first) and hands the same id
/// back. Returns `None` when `parent` is not an element.
pub fn delete_child_elements(doc: &mut Document, parent: NodeId) -> Option<NodeId> {
    if !doc.is_element(parent) {
        return None;
    }
    while let Some(child) = doc.last_element_child(parent) {
        doc.remove_child(parent, child).ok()?;
    }
    Some(parent)
}

fn find_by_post_id(doc: &Document, tag_name: &str, post_id: Id) -> DomResult<Toggle> {
    if post_id == 0 {
        return Ok(Toggle::MissingId);
    }
    let selector = format!("{}[data-post-id='{}']", tag_name, post_id);
    Ok(doc
        .query_selector(&selector)?
        .map(Toggle::Found)
        .unwrap_or(Toggle::NotFound))
}

pub fn toggle_comment_section(doc: &mut Document, post_id: Id) -> DomResult<Toggle> {
    let found = find_by_post_id(doc, "section", post_id)?;
    if let Toggle::Found(section) = found {
        doc.class_toggle(section, HIDE_CLASS)?;
    }
    Ok(found)
}

pub fn toggle_comment_button(doc: &mut Document, post_id: Id) -> DomResult<Toggle> {
    let found = find_by_post_id(doc, "button", post_id)?;
    if let Toggle::Found(button) = found {
        let next = if doc.text_content(button) == SHOW_COMMENTS {
            HIDE_COMMENTS
        } else {
            SHOW_COMMENTS
        };
        doc.set_text_content(button, next)?;
    }
    Ok(found)
}
