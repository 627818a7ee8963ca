use crate::core::render::create_posts;
use crate::core::DirectoryApi;
use crate::dom::events::{Event, EventRegistry, EventType};
use crate::dom::helpers::{
    create_elem_with_text, create_select_options, delete_child_elements, toggle_comment_button,
    toggle_comment_section, Toggle,
};
use crate::dom::{DomError, Document, NodeId};
use crate::domain::model::{Id, Post, User};
use crate::utils::error::Result;

pub const SELECT_MENU_ID: &str = "selectMenu";
pub const DEFAULT_TEXT: &str = "Select an Employee to display their posts.";

/// What a registered listener does when its event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageListener {
    ToggleComments { post_id: Id },
    SelectMenuChange,
}

#[derive(Debug, Clone)]
pub struct PageOptions {
    pub title: String,
    /// 員工沒有貼文時要補上的空白卡片數
    pub placeholder_posts: usize,
    /// select 的值為空時使用的員工 id
    pub default_user_id: Id,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            title: "Employee Posts".to_string(),
            placeholder_posts: 10,
            default_user_id: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub removed_buttons: Vec<NodeId>,
    pub main: NodeId,
    pub displayed: Vec<NodeId>,
    pub added_buttons: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeOutcome {
    pub user_id: Id,
    pub posts: Vec<Post>,
    pub refresh: Option<RefreshOutcome>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListenerOutcome {
    Toggled(Option<(Toggle, Toggle)>),
    Changed(ChangeOutcome),
}

/// The employee page: document, listeners and the directory it renders from.
///
/// Every mutating operation takes `&mut self`, so a second change event cannot
/// start while one is still rendering.
pub struct Page<A: DirectoryApi> {
    doc: Document,
    events: EventRegistry<PageListener>,
    api: A,
    options: PageOptions,
}

impl<A: DirectoryApi> Page<A> {
    pub fn new(api: A, options: PageOptions) -> Self {
        Self {
            doc: Document::page_shell(&options.title),
            events: EventRegistry::new(),
            api,
            options,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn events(&self) -> &EventRegistry<PageListener> {
        &self.events
    }

    pub fn to_html(&self) -> String {
        self.doc.to_html()
    }

    pub fn select_menu(&self) -> Result<NodeId> {
        self.doc
            .get_element_by_id(SELECT_MENU_ID)
            .ok_or_else(|| DomError::MissingElement(format!("select#{}", SELECT_MENU_ID)).into())
    }

    pub fn main_element(&self) -> Result<NodeId> {
        self.doc
            .query_selector("main")?
            .ok_or_else(|| DomError::MissingElement("main".to_string()).into())
    }

    /// Appends one option per user to the select menu. `None` in, `None` out.
    pub fn populate_select_menu(&mut self, users: Option<&[User]>) -> Result<Option<NodeId>> {
        let Some(options) = create_select_options(&mut self.doc, users) else {
            return Ok(None);
        };
        let select = self.select_menu()?;
        self.doc.append(select, &options)?;
        tracing::debug!("Select menu populated with {} employees", options.len());
        Ok(Some(select))
    }

    /// 有貼文就渲染卡片，否則放提示文字；回傳實際加進 `main` 的節點
    pub async fn display_posts(&mut self, posts: Option<&[Post]>) -> Result<Vec<NodeId>> {
        let main = self.main_element()?;

        let rendered = match posts {
            Some(posts) if !posts.is_empty() => {
                create_posts(&mut self.doc, &self.api, Some(posts)).await?
            }
            _ => None,
        };
        let element = match rendered {
            Some(fragment) => fragment,
            None => create_elem_with_text(&mut self.doc, "p", DEFAULT_TEXT, Some("default-text")),
        };

        let displayed = if self.doc.is_fragment(element) {
            self.doc.children(element).to_vec()
        } else {
            vec![element]
        };
        self.doc.append_child(main, element)?;
        Ok(displayed)
    }

    fn main_buttons(&self) -> Result<Vec<(NodeId, Id)>> {
        Ok(self
            .doc
            .query_selector_all("main button")?
            .into_iter()
            .map(|button| {
                let post_id = self
                    .doc
                    .dataset(button, "postId")
                    .and_then(|value| value.parse::<Id>().ok())
                    .unwrap_or(0);
                (button, post_id)
            })
            .collect())
    }

    /// Wires every post button in `main` to its comment toggle.
    pub fn add_button_listeners(&mut self) -> Result<Vec<NodeId>> {
        let buttons = self.main_buttons()?;
        for (button, post_id) in &buttons {
            if *post_id != 0 {
                self.events.add_event_listener(
                    *button,
                    EventType::Click,
                    PageListener::ToggleComments { post_id: *post_id },
                );
            }
        }
        Ok(buttons.into_iter().map(|(button, _)| button).collect())
    }

    pub fn remove_button_listeners(&mut self) -> Result<Vec<NodeId>> {
        let buttons = self.main_buttons()?;
        for (button, post_id) in &buttons {
            if *post_id != 0 {
                self.events.remove_event_listener(
                    *button,
                    EventType::Click,
                    &PageListener::ToggleComments { post_id: *post_id },
                );
            }
        }
        Ok(buttons.into_iter().map(|(button, _)| button).collect())
    }

    /// Toggles the comments of `post_id` and marks the clicked target as handled.
    pub fn toggle_comments(&mut self, event: &Event, post_id: Id) -> Result<Option<(Toggle, Toggle)>> {
        if post_id == 0 {
            return Ok(None);
        }
        self.doc.set_listener(event.target, true)?;

        let section = toggle_comment_section(&mut self.doc, post_id)?;
        let button = toggle_comment_button(&mut self.doc, post_id)?;
        Ok(Some((section, button)))
    }

    /// Clears `main`, renders `posts` into it and rebinds the button listeners.
    pub async fn refresh_posts(&mut self, posts: Option<&[Post]>) -> Result<Option<RefreshOutcome>> {
        let Some(posts) = posts else {
            return Ok(None);
        };

        let removed_buttons = self.remove_button_listeners()?;
        let main = self.main_element()?;
        let main = delete_child_elements(&mut self.doc, main)
            .ok_or_else(|| DomError::NotAnElement(main))?;
        let displayed = self.display_posts(Some(posts)).await?;
        let added_buttons = self.add_button_listeners()?;

        Ok(Some(RefreshOutcome {
            removed_buttons,
            main,
            displayed,
            added_buttons,
        }))
    }

    fn selected_user_id(&self, select: NodeId) -> Id {
        let value = self.doc.value(select).trim();
        if value.is_empty() {
            return self.options.default_user_id;
        }
        // 非數字的值視為沒有 id，後續會走佔位貼文
        value.parse().unwrap_or(0)
    }

    /// Handles a change of the select menu: loads the chosen employee's posts.
    ///
    /// The select is disabled while loading and re-enabled afterwards, also when
    /// rendering failed. An employee without posts (or a failed fetch) gets
    /// `placeholder_posts` empty cards.
    pub async fn select_menu_change(&mut self, event: &Event) -> Result<ChangeOutcome> {
        let select = event.target;
        self.doc.set_disabled(select, true)?;

        let outcome = self.load_employee_posts(select).await;

        self.doc.set_disabled(select, false)?;
        if let Err(e) = &outcome {
            tracing::error!("❌ An error occurred while changing employee: {}", e);
        }
        outcome
    }

    async fn load_employee_posts(&mut self, select: NodeId) -> Result<ChangeOutcome> {
        let user_id = self.selected_user_id(select);
        tracing::info!("Loading posts for employee {}", user_id);

        let posts = match self.api.get_user_posts(user_id).await {
            Ok(posts) if !posts.is_empty() => posts,
            Ok(_) => {
                tracing::info!(
                    "Employee {} has no posts, showing {} placeholders",
                    user_id,
                    self.options.placeholder_posts
                );
                vec![Post::placeholder(); self.options.placeholder_posts]
            }
            Err(e) => {
                tracing::warn!("Posts for employee {} unavailable: {}", user_id, e);
                vec![Post::placeholder(); self.options.placeholder_posts]
            }
        };

        let refresh = self.refresh_posts(Some(posts.as_slice())).await?;
        Ok(ChangeOutcome {
            user_id,
            posts,
            refresh,
        })
    }

    /// Runs every listener registered for the event's target and type.
    pub async fn dispatch(&mut self, event: Event) -> Result<Vec<ListenerOutcome>> {
        let mut outcomes = Vec::new();
        for listener in self.events.listeners(event.target, event.kind) {
            let outcome = match listener {
                PageListener::ToggleComments { post_id } => {
                    ListenerOutcome::Toggled(self.toggle_comments(&event, post_id)?)
                }
                PageListener::SelectMenuChange => {
                    ListenerOutcome::Changed(self.select_menu_change(&event).await?)
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    pub async fn click(&mut self, target: NodeId) -> Result<Vec<ListenerOutcome>> {
        self.dispatch(Event::click(target)).await
    }

    /// Sets the select menu to `value` and fires its change event.
    pub async fn select_employee(&mut self, value: &str) -> Result<Vec<ListenerOutcome>> {
        let select = self.select_menu()?;
        self.doc.set_value(select, value)?;
        for option in self.doc.element_children(select) {
            if self.doc.value(option) == value {
                self.doc.set_attribute(option, "selected", "selected")?;
            } else {
                self.doc.remove_attribute(option, "selected")?;
            }
        }
        self.dispatch(Event::change(select)).await
    }

    /// Clicks the comment button of `post_id`, if it is on the page.
    pub async fn click_post_button(&mut self, post_id: Id) -> Result<Vec<ListenerOutcome>> {
        let selector = format!("main button[data-post-id='{}']", post_id);
        match self.doc.query_selector(&selector)? {
            Some(button) => self.click(button).await,
            None => {
                tracing::warn!("No comment button for post {}", post_id);
                Ok(Vec::new())
            }
        }
    }

    pub async fn init_page(&mut self) -> Result<(Vec<User>, NodeId)> {
        let users = self.api.get_users().await?;
        self.populate_select_menu(Some(users.as_slice()))?;
        let select = self.select_menu()?;
        tracing::info!("Loaded {} employees", users.len());
        Ok((users, select))
    }

    /// Loads the employees and starts listening for select menu changes.
    pub async fn init_app(&mut self) -> Result<Vec<User>> {
        let (users, select) = self.init_page().await?;
        self.events
            .add_event_listener(select, EventType::Change, PageListener::SelectMenuChange);
        Ok(users)
    }
}
