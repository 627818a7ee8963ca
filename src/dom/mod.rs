//! In-memory document tree the page renders into.
//!
//! Nodes live in an arena owned by [`Document`] and are addressed by [`NodeId`].
//! Removed nodes stay in the arena (detached), so ids handed out earlier never
//! dangle. Nothing is reclaimed: every `refresh_posts` leaves the previous cards
//! behind, so the arena grows with the number of refreshes over a document's
//! lifetime. Only the subset of DOM behaviour the page needs is modelled: element
//! attributes, class lists, `data-*` attributes, text content, fragments and
//! simple selectors.
//!
//! Some element state is not an attribute and never shows up in the HTML: the
//! current value of a `select` and the `listener` mark set when a click was
//! handled.

pub mod events;
pub mod helpers;
pub mod html;
pub mod selector;

use selector::Selector;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("cannot insert node {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("required element '{0}' is missing")]
    MissingElement(String),

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

pub type DomResult<T> = std::result::Result<T, DomError>;

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Document,
    Fragment,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    /// 保留插入順序，序列化結果才穩定
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) disabled: bool,
    /// `select` 目前的值，不序列化
    control_value: Option<String>,
    listener: bool,
}

impl Element {
    fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: Vec::new(),
            disabled: false,
            control_value: None,
            listener: false,
        }
    }

    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(key, _)| key != name);
    }

    pub(crate) fn classes(&self) -> Vec<&str> {
        self.attr("class")
            .map(|value| value.split_whitespace().collect())
            .unwrap_or_default()
    }

    fn set_classes(&mut self, classes: &[&str]) {
        if classes.is_empty() {
            self.remove_attr("class");
        } else {
            self.set_attr("class", &classes.join(" "));
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
        }
    }

    /// 建立頁面骨架：`header` 內有 `select#selectMenu`，`main` 為空
    pub fn page_shell(title: &str) -> Self {
        let mut doc = Self::new();
        let root = doc.root;

        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let title_el = doc.create_element("title");
        doc.push_text(title_el, title);
        let body = doc.create_element("body");
        let header = doc.create_element("header");
        let h1 = doc.create_element("h1");
        doc.push_text(h1, title);
        let select = doc.create_element("select");
        doc.set_attr_unchecked(select, "id", "selectMenu");
        let prompt = doc.create_element("option");
        doc.set_attr_unchecked(prompt, "value", "");
        doc.push_text(prompt, "Select an Employee");
        let main = doc.create_element("main");

        doc.push_child(root, html);
        doc.push_child(html, head);
        doc.push_child(head, title_el);
        doc.push_child(html, body);
        doc.push_child(body, header);
        doc.push_child(header, h1);
        doc.push_child(header, select);
        doc.push_child(select, prompt);
        doc.push_child(body, main);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.create_node(NodeKind::Element(Element::new(tag_name)))
    }

    pub fn create_text_node(&mut self, text: &str) -> NodeId {
        self.create_node(NodeKind::Text(text.to_string()))
    }

    pub fn create_document_fragment(&mut self) -> NodeId {
        self.create_node(NodeKind::Fragment)
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    pub(crate) fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|node| &node.kind)
    }

    pub(crate) fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut Element> {
        match self.nodes.get_mut(id.0).map(|node| &mut node.kind) {
            Some(NodeKind::Element(element)) => Ok(element),
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::UnknownNode(id)),
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn is_fragment(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Fragment))
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.tag_name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    pub fn last_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .rev()
            .copied()
            .find(|child| self.is_element(*child))
    }

    fn can_have_children(&self, id: NodeId) -> bool {
        matches!(
            self.kind(id),
            Some(NodeKind::Document | NodeKind::Fragment | NodeKind::Element(_))
        )
    }

    // 只給剛建立、尚未掛載的節點使用
    fn push_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn push_text(&mut self, parent: NodeId, text: &str) {
        let text_node = self.create_text_node(text);
        self.push_child(parent, text_node);
    }

    fn set_attr_unchecked(&mut self, id: NodeId, name: &str, value: &str) {
        if let Ok(element) = self.element_mut(id) {
            element.set_attr(name, value);
        }
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(old_parent) = self.nodes[child.0].parent.take() {
            self.nodes[old_parent.0].children.retain(|id| *id != child);
        }
    }

    /// Appends `child` to `parent`, moving it out of its current parent first.
    ///
    /// Appending a fragment moves all of its children (in order) and leaves the
    /// fragment empty, as the DOM does.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.node(parent)?;
        self.node(child)?;
        if !self.can_have_children(parent) || child == self.root || child == parent {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return Err(DomError::HierarchyRequest { parent, child });
            }
            cursor = self.parent(node);
        }

        if self.is_fragment(child) {
            let moved = std::mem::take(&mut self.nodes[child.0].children);
            for grandchild in moved {
                self.nodes[grandchild.0].parent = None;
                self.push_child(parent, grandchild);
            }
        } else {
            self.detach(child);
            self.push_child(parent, child);
        }
        Ok(child)
    }

    pub fn append(&mut self, parent: NodeId, children: &[NodeId]) -> DomResult<()> {
        for child in children {
            self.append_child(parent, *child)?;
        }
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.node(parent)?;
        if self.node(child)?.parent != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        Ok(child)
    }

    pub fn text_content(&self, id: NodeId) -> String {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => text.clone(),
            Some(_) => self
                .children(id)
                .iter()
                .map(|child| self.text_content(*child))
                .collect(),
            None => String::new(),
        }
    }

    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        match self.nodes.get_mut(id.0).map(|node| &mut node.kind) {
            None => return Err(DomError::UnknownNode(id)),
            Some(NodeKind::Text(existing)) => {
                *existing = text.to_string();
                return Ok(());
            }
            Some(NodeKind::Document) => return Err(DomError::NotAnElement(id)),
            Some(_) => {}
        }

        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
        if !text.is_empty() {
            self.push_text(id, text);
        }
        Ok(())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attr(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.element_mut(id)?.set_attr(&name.to_ascii_lowercase(), value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<()> {
        self.element_mut(id)?.remove_attr(&name.to_ascii_lowercase());
        Ok(())
    }

    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.attribute(id, "id")
    }

    /// For a `select` this is its current value: the last `set_value`, else the
    /// `selected` option, else the first option. Other elements read their
    /// `value` attribute.
    pub fn value(&self, id: NodeId) -> &str {
        let Some(element) = self.element(id) else {
            return "";
        };
        if element.tag_name != "select" {
            return element.attr("value").unwrap_or("");
        }
        if let Some(value) = &element.control_value {
            return value;
        }
        let options = self.element_children(id);
        options
            .iter()
            .find(|option| self.attribute(**option, "selected").is_some())
            .or_else(|| options.first())
            .map(|option| self.value(*option))
            .unwrap_or("")
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) -> DomResult<()> {
        let element = self.element_mut(id)?;
        if element.tag_name == "select" {
            element.control_value = Some(value.to_string());
        } else {
            element.set_attr("value", value);
        }
        Ok(())
    }

    pub fn dataset(&self, id: NodeId, key: &str) -> Option<&str> {
        self.attribute(id, &dataset_key_to_attr_name(key))
    }

    pub fn set_dataset(&mut self, id: NodeId, key: &str, value: &str) -> DomResult<()> {
        self.set_attribute(id, &dataset_key_to_attr_name(key), value)
    }

    pub fn class_name(&self, id: NodeId) -> String {
        self.attribute(id, "class").unwrap_or("").to_string()
    }

    pub fn has_class(&self, id: NodeId, class_name: &str) -> bool {
        self.element(id)
            .map(|element| element.classes().contains(&class_name))
            .unwrap_or(false)
    }

    pub fn class_add(&mut self, id: NodeId, class_names: &[&str]) -> DomResult<()> {
        let element = self.element_mut(id)?;
        let current = element.attr("class").unwrap_or("").to_string();
        let mut classes: Vec<&str> = current.split_whitespace().collect();
        for name in class_names {
            if !classes.contains(name) {
                classes.push(*name);
            }
        }
        element.set_classes(&classes);
        Ok(())
    }

    pub fn class_remove(&mut self, id: NodeId, class_name: &str) -> DomResult<()> {
        let element = self.element_mut(id)?;
        let current = element.attr("class").unwrap_or("").to_string();
        let classes: Vec<&str> = current
            .split_whitespace()
            .filter(|name| *name != class_name)
            .collect();
        element.set_classes(&classes);
        Ok(())
    }

    /// Returns whether the class is present after the toggle.
    pub fn class_toggle(&mut self, id: NodeId, class_name: &str) -> DomResult<bool> {
        if self.element(id).is_none() {
            self.node(id)?;
            return Err(DomError::NotAnElement(id));
        }
        if self.has_class(id, class_name) {
            self.class_remove(id, class_name)?;
            Ok(false)
        } else {
            self.class_add(id, &[class_name])?;
            Ok(true)
        }
    }

    pub fn disabled(&self, id: NodeId) -> bool {
        self.element(id).map(|element| element.disabled).unwrap_or(false)
    }

    pub fn set_disabled(&mut self, id: NodeId, disabled: bool) -> DomResult<()> {
        self.element_mut(id)?.disabled = disabled;
        Ok(())
    }

    pub fn listener(&self, id: NodeId) -> bool {
        self.element(id).map(|element| element.listener).unwrap_or(false)
    }

    pub fn set_listener(&mut self, id: NodeId, listener: bool) -> DomResult<()> {
        self.element_mut(id)?.listener = listener;
        Ok(())
    }

    /// 以先序走訪（document order）列出 `scope` 底下所有元素，不含 scope 本身
    pub fn descendant_elements(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_dfs(scope, &mut out);
        out
    }

    fn collect_elements_dfs(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(node) {
            if self.is_element(*child) {
                out.push(*child);
            }
            self.collect_elements_dfs(*child, out);
        }
    }

    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendant_elements(self.root)
            .into_iter()
            .find(|node| self.element_id(*node) == Some(element_id))
    }

    pub fn query_selector(&self, selector: &str) -> DomResult<Option<NodeId>> {
        self.query_selector_from(self.root, selector)
    }

    pub fn query_selector_all(&self, selector: &str) -> DomResult<Vec<NodeId>> {
        self.query_selector_all_from(self.root, selector)
    }

    pub fn query_selector_from(&self, scope: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        Ok(self.query_selector_all_from(scope, selector)?.into_iter().next())
    }

    pub fn query_selector_all_from(&self, scope: NodeId, selector: &str) -> DomResult<Vec<NodeId>> {
        let parsed = Selector::parse(selector)?;
        Ok(self
            .descendant_elements(scope)
            .into_iter()
            .filter(|node| parsed.matches(self, *node))
            .collect())
    }
}

/// `postId` -> `data-post-id`
pub fn dataset_key_to_attr_name(key: &str) -> String {
    let mut name = String::from("data-");
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            name.push('-');
            name.push(ch.to_ascii_lowercase());
        } else {
            name.push(ch);
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_shell_contract() {
        let doc = Document::page_shell("Employees");
        let select = doc.get_element_by_id("selectMenu").unwrap();
        assert_eq!(doc.tag_name(select), Some("select"));
        assert_eq!(doc.element_children(select).len(), 1);

        let main = doc.query_selector("main").unwrap().unwrap();
        assert!(doc.children(main).is_empty());
    }

    #[test]
    fn test_append_fragment_moves_children() {
        let mut doc = Document::page_shell("Employees");
        let main = doc.query_selector("main").unwrap().unwrap();
        let fragment = doc.create_document_fragment();
        let a = doc.create_element("article");
        let b = doc.create_element("article");
        doc.append(fragment, &[a, b]).unwrap();

        doc.append_child(main, fragment).unwrap();

        assert_eq!(doc.children(main), &[a, b]);
        assert!(doc.children(fragment).is_empty());
        assert_eq!(doc.parent(a), Some(main));
    }

    #[test]
    fn test_append_child_moves_attached_node() {
        let mut doc = Document::new();
        let first = doc.create_element("div");
        let second = doc.create_element("div");
        let child = doc.create_element("p");
        doc.append(doc.root(), &[first, second]).unwrap();

        doc.append_child(first, child).unwrap();
        doc.append_child(second, child).unwrap();

        assert!(doc.children(first).is_empty());
        assert_eq!(doc.children(second), &[child]);
    }

    #[test]
    fn test_append_child_rejects_cycles() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();

        let err = doc.append_child(inner, outer).unwrap_err();
        assert_eq!(
            err,
            DomError::HierarchyRequest {
                parent: inner,
                child: outer
            }
        );
    }

    #[test]
    fn test_set_text_content_replaces_children() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let span = doc.create_element("span");
        doc.append_child(p, span).unwrap();

        doc.set_text_content(p, "hello").unwrap();

        assert_eq!(doc.text_content(p), "hello");
        assert!(doc.element_children(p).is_empty());
        assert_eq!(doc.parent(span), None);
    }

    #[test]
    fn test_dataset_maps_to_kebab_case_attribute() {
        let mut doc = Document::new();
        let button = doc.create_element("button");
        doc.set_dataset(button, "postId", "7").unwrap();

        assert_eq!(doc.attribute(button, "data-post-id"), Some("7"));
        assert_eq!(doc.dataset(button, "postId"), Some("7"));
    }

    #[test]
    fn test_class_toggle() {
        let mut doc = Document::new();
        let section = doc.create_element("section");
        doc.class_add(section, &["comments", "hide"]).unwrap();

        assert!(!doc.class_toggle(section, "hide").unwrap());
        assert_eq!(doc.class_name(section), "comments");
        assert!(doc.class_toggle(section, "hide").unwrap());
        assert_eq!(doc.class_name(section), "comments hide");
    }

    #[test]
    fn test_last_element_child_and_remove_child() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let article = doc.create_element("article");
        let text = doc.create_text_node("trailing");
        doc.append(div, &[article, text]).unwrap();

        assert_eq!(doc.last_element_child(div), Some(article));
        assert_eq!(doc.remove_child(div, article).unwrap(), article);
        assert_eq!(doc.last_element_child(div), None);
        assert_eq!(doc.children(div), &[text]);

        let err = doc.remove_child(div, article).unwrap_err();
        assert_eq!(
            err,
            DomError::NotAChild {
                parent: div,
                child: article
            }
        );
    }

    #[test]
    fn test_select_value_is_element_state() {
        let mut doc = Document::page_shell("Employees");
        let select = doc.get_element_by_id("selectMenu").unwrap();
        let option = doc.create_element("option");
        doc.set_value(option, "1").unwrap();
        doc.append_child(select, option).unwrap();

        // 沒有設定值時取第一個 option
        assert_eq!(doc.value(select), "");
        doc.set_attribute(option, "selected", "selected").unwrap();
        assert_eq!(doc.value(select), "1");

        doc.set_value(select, "2").unwrap();
        assert_eq!(doc.value(select), "2");
        assert_eq!(doc.attribute(select, "value"), None);
        assert_eq!(doc.attribute(option, "value"), Some("1"));
    }

    #[test]
    fn test_listener_flag() {
        let mut doc = Document::new();
        let button = doc.create_element("button");
        assert!(!doc.listener(button));

        doc.set_listener(button, true).unwrap();
        assert!(doc.listener(button));

        let text = doc.create_text_node("x");
        assert!(doc.set_listener(text, true).is_err());
    }

    #[test]
    fn test_query_ignores_detached_nodes() {
        let mut doc = Document::page_shell("Employees");
        let orphan = doc.create_element("section");
        doc.set_dataset(orphan, "postId", "1").unwrap();

        assert_eq!(doc.query_selector("section").unwrap(), None);
        assert_eq!(
            doc.query_selector_from(orphan, "section").unwrap(),
            None,
            "scope itself is not part of the result"
        );
    }
}
