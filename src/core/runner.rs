use crate::core::api::{CachedDirectoryApi, HttpDirectoryApi};
use crate::core::page::{ListenerOutcome, Page, PageOptions};
use crate::core::{ConfigProvider, DirectoryApi, Id, Storage};
use crate::dom::helpers::create_elem_with_text;
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_path: String,
    pub employees: usize,
    pub selected_user: Option<Id>,
    pub post_cards: usize,
    pub expanded: usize,
}

/// Boots the page, replays the configured interactions and writes the snapshot.
pub struct PageRunner<A: DirectoryApi, S: Storage> {
    page: Page<A>,
    storage: S,
    output_file: String,
    employee: Option<String>,
    expand_posts: Vec<Id>,
}

impl<S: Storage> PageRunner<Box<dyn DirectoryApi>, S> {
    /// HTTP client from the config, wrapped in a cache when enabled.
    pub fn from_config<C: ConfigProvider>(config: &C, storage: S) -> Result<Self> {
        let http = HttpDirectoryApi::from_config(config)?;
        let api: Box<dyn DirectoryApi> = if config.cache_enabled() {
            tracing::debug!("Response cache enabled");
            Box::new(CachedDirectoryApi::new(http))
        } else {
            Box::new(http)
        };

        let options = PageOptions {
            placeholder_posts: config.placeholder_posts(),
            ..PageOptions::default()
        };
        Ok(Self::new(Page::new(api, options), storage, config))
    }
}

impl<A: DirectoryApi, S: Storage> PageRunner<A, S> {
    pub fn new<C: ConfigProvider>(page: Page<A>, storage: S, config: &C) -> Self {
        Self {
            page,
            storage,
            output_file: config.output_file().to_string(),
            employee: config.employee().map(str::to_string),
            expand_posts: config.expand_posts().to_vec(),
        }
    }

    pub fn page(&self) -> &Page<A> {
        &self.page
    }

    pub async fn run(&mut self) -> Result<RunSummary> {
        tracing::info!("Starting page render...");

        let users = self.page.init_app().await?;
        tracing::info!("Select menu ready with {} employees", users.len());

        let mut selected_user = None;
        let mut post_cards = 0;
        if let Some(employee) = self.employee.clone() {
            for outcome in self.page.select_employee(&employee).await? {
                if let ListenerOutcome::Changed(change) = outcome {
                    selected_user = Some(change.user_id);
                    post_cards = change.posts.len();
                }
            }
        }

        let mut expanded = 0;
        for post_id in self.expand_posts.clone() {
            let outcomes = self.page.click_post_button(post_id).await?;
            if outcomes
                .iter()
                .any(|outcome| matches!(outcome, ListenerOutcome::Toggled(Some(_))))
            {
                expanded += 1;
            }
        }

        self.append_footer()?;
        let html = self.page.to_html();
        tracing::debug!("Writing {} bytes of HTML", html.len());
        let output_path = self.storage.write_file(&self.output_file, html.as_bytes()).await?;

        tracing::info!("Page written to {}", output_path);
        Ok(RunSummary {
            output_path,
            employees: users.len(),
            selected_user,
            post_cards,
            expanded,
        })
    }

    fn append_footer(&mut self) -> Result<()> {
        let generated_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let doc = self.page.document_mut();
        if let Some(body) = doc.query_selector("body")? {
            let footer = doc.create_element("footer");
            let text = create_elem_with_text(doc, "p", &format!("Generated at {}", generated_at), None);
            doc.append_child(footer, text)?;
            doc.append_child(body, footer)?;
        }
        Ok(())
    }
}
