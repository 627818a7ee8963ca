use httpmock::prelude::*;
use staff_posts::core::page::{ListenerOutcome, PageListener, DEFAULT_TEXT};
use staff_posts::dom::events::EventType;
use staff_posts::dom::helpers::{Toggle, HIDE_COMMENTS, SHOW_COMMENTS};
use staff_posts::{HttpDirectoryApi, Page, PageOptions};
use std::time::{Duration, Instant};

fn users_json() -> serde_json::Value {
    serde_json::json!([
        {
            "id": 1,
            "name": "Leanne Graham",
            "company": {"name": "Romaguera-Crona", "catchPhrase": "Multi-layered client-server neural-net"}
        },
        {
            "id": 2,
            "name": "Ervin Howell",
            "company": {"name": "Deckow-Crist", "catchPhrase": "Proactive didactic contingency"}
        }
    ])
}

fn mock_user(server: &MockServer, id: u64) {
    let user = users_json()
        .as_array()
        .unwrap()
        .iter()
        .find(|user| user["id"] == id)
        .cloned()
        .unwrap();
    server.mock(|when, then| {
        when.method(GET).path(format!("/users/{}", id));
        then.status(200).json_body(user);
    });
}

fn mock_users(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/users");
        then.status(200).json_body(users_json());
    });
    mock_user(server, 1);
    mock_user(server, 2);
}

fn mock_posts(server: &MockServer, user_id: u64, posts: serde_json::Value) {
    server.mock(|when, then| {
        when.method(GET)
            .path("/posts")
            .query_param("userId", user_id.to_string());
        then.status(200).json_body(posts);
    });
}

fn mock_comments(server: &MockServer, post_id: u64, count: usize) {
    let comments: Vec<serde_json::Value> = (1..=count)
        .map(|i| {
            serde_json::json!({
                "postId": post_id,
                "id": i,
                "name": format!("comment {} on {}", i, post_id),
                "email": format!("reader{}@example.com", i),
                "body": "quia molestiae reprehenderit"
            })
        })
        .collect();
    server.mock(|when, then| {
        when.method(GET)
            .path("/comments")
            .query_param("postId", post_id.to_string());
        then.status(200).json_body(serde_json::Value::Array(comments));
    });
}

fn page_for(server: &MockServer) -> Page<HttpDirectoryApi> {
    let api = HttpDirectoryApi::new(&server.base_url(), Duration::from_secs(5)).unwrap();
    Page::new(api, PageOptions::default())
}

fn two_posts_for_user_one() -> serde_json::Value {
    serde_json::json!([
        {"userId": 1, "id": 1, "title": "sunt aut facere", "body": "quia et suscipit"},
        {"userId": 1, "id": 2, "title": "qui est esse", "body": "est rerum tempore"}
    ])
}

#[tokio::test]
async fn test_init_app_populates_select_menu() {
    let server = MockServer::start();
    mock_users(&server);
    let mut page = page_for(&server);

    let users = page.init_app().await.unwrap();

    assert_eq!(users.len(), 2);
    let doc = page.document();
    let select = page.select_menu().unwrap();
    let options = doc.element_children(select);
    // 提示選項 + 兩位員工
    assert_eq!(options.len(), 3);
    assert_eq!(doc.value(options[2]), "2");
    assert_eq!(doc.text_content(options[2]), "Ervin Howell");
    assert_eq!(
        page.events().listeners(select, EventType::Change),
        vec![PageListener::SelectMenuChange]
    );
}

#[tokio::test]
async fn test_init_page_propagates_fetch_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/users");
        then.status(503);
    });
    let mut page = page_for(&server);

    assert!(page.init_page().await.is_err());
    let select = page.select_menu().unwrap();
    assert_eq!(page.document().element_children(select).len(), 1);
}

#[tokio::test]
async fn test_selecting_employee_renders_post_cards() {
    let server = MockServer::start();
    mock_users(&server);
    mock_posts(&server, 1, two_posts_for_user_one());
    mock_comments(&server, 1, 2);
    mock_comments(&server, 2, 1);
    let mut page = page_for(&server);
    page.init_app().await.unwrap();

    let outcomes = page.select_employee("1").await.unwrap();

    let ListenerOutcome::Changed(change) = &outcomes[0] else {
        panic!("expected a change outcome, got {:?}", outcomes);
    };
    assert_eq!(change.user_id, 1);
    assert_eq!(change.posts.len(), 2);
    let refresh = change.refresh.as_ref().unwrap();
    assert_eq!(refresh.displayed.len(), 2);
    assert_eq!(refresh.added_buttons.len(), 2);

    let doc = page.document();
    let html = doc.to_html();
    assert!(html.contains("<h2>sunt aut facere</h2>"));
    assert!(html.contains("<p>Author: Leanne Graham with Romaguera-Crona</p>"));
    assert!(html.contains("<p>Multi-layered client-server neural-net</p>"));
    assert!(html.contains(r#"<button data-post-id="2">Show Comments</button>"#));
    assert_eq!(
        doc.query_selector_all("section[data-post-id='1'] article")
            .unwrap()
            .len(),
        2
    );
    assert!(!doc.disabled(page.select_menu().unwrap()));
    assert_eq!(page.events().listener_count(EventType::Click), 2);
}

#[tokio::test]
async fn test_employee_without_posts_gets_ten_placeholder_cards() {
    let server = MockServer::start();
    mock_users(&server);
    mock_posts(&server, 1, serde_json::json!([]));
    let comments = server.mock(|when, then| {
        when.method(GET).path("/comments");
        then.status(200).json_body(serde_json::json!([]));
    });
    let mut page = page_for(&server);
    page.init_app().await.unwrap();

    page.select_employee("1").await.unwrap();

    let doc = page.document();
    let main = page.main_element().unwrap();
    let cards = doc.element_children(main);
    assert_eq!(cards.len(), 10);
    for card in cards {
        assert_eq!(doc.node_to_html(card), "<article><h2></h2><p></p></article>");
    }
    assert!(doc.query_selector_all("main button").unwrap().is_empty());
    comments.assert_hits(0);
}

#[tokio::test]
async fn test_failed_posts_fetch_re_enables_select() {
    let server = MockServer::start();
    mock_users(&server);
    server.mock(|when, then| {
        when.method(GET).path("/posts");
        then.status(500);
    });
    let options = PageOptions {
        placeholder_posts: 3,
        ..PageOptions::default()
    };
    let api = HttpDirectoryApi::new(&server.base_url(), Duration::from_secs(5)).unwrap();
    let mut page = Page::new(api, options);
    page.init_app().await.unwrap();

    let outcomes = page.select_employee("2").await.unwrap();

    let ListenerOutcome::Changed(change) = &outcomes[0] else {
        panic!("expected a change outcome");
    };
    assert_eq!(change.user_id, 2);
    assert!(change.posts.iter().all(|post| post.is_placeholder()));
    let main = page.main_element().unwrap();
    assert_eq!(page.document().element_children(main).len(), 3);
    assert!(!page.document().disabled(page.select_menu().unwrap()));
}

#[tokio::test]
async fn test_hung_posts_fetch_times_out_to_placeholders() {
    let server = MockServer::start();
    mock_users(&server);
    server.mock(|when, then| {
        when.method(GET).path("/posts");
        then.status(200)
            .delay(Duration::from_secs(3))
            .json_body(two_posts_for_user_one());
    });
    let options = PageOptions {
        placeholder_posts: 2,
        ..PageOptions::default()
    };
    let api = HttpDirectoryApi::new(&server.base_url(), Duration::from_millis(500)).unwrap();
    let mut page = Page::new(api, options);
    page.init_app().await.unwrap();

    let started = Instant::now();
    let outcomes = page.select_employee("1").await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    let ListenerOutcome::Changed(change) = &outcomes[0] else {
        panic!("expected a change outcome");
    };
    assert!(change.posts.iter().all(|post| post.is_placeholder()));
    let main = page.main_element().unwrap();
    assert_eq!(page.document().element_children(main).len(), 2);
    assert!(!page.document().disabled(page.select_menu().unwrap()));
}

#[tokio::test]
async fn test_selected_value_is_not_serialised_on_select() {
    let server = MockServer::start();
    mock_users(&server);
    mock_posts(&server, 2, serde_json::json!([]));
    let mut page = page_for(&server);
    page.init_app().await.unwrap();

    page.select_employee("2").await.unwrap();

    let select = page.select_menu().unwrap();
    assert_eq!(page.document().value(select), "2");
    let html = page.to_html();
    assert!(html.contains(r#"<select id="selectMenu"><option value="">"#));
    assert!(html.contains(r#"<option value="2" selected="selected">Ervin Howell</option>"#));
}

#[tokio::test]
async fn test_empty_select_value_defaults_to_first_employee() {
    let server = MockServer::start();
    mock_users(&server);
    let posts = server.mock(|when, then| {
        when.method(GET).path("/posts").query_param("userId", "1");
        then.status(200).json_body(serde_json::json!([]));
    });
    let mut page = page_for(&server);
    page.init_app().await.unwrap();

    let outcomes = page.select_employee("").await.unwrap();

    posts.assert();
    assert!(matches!(&outcomes[0], ListenerOutcome::Changed(change) if change.user_id == 1));
}

#[tokio::test]
async fn test_clicking_post_button_twice_restores_section() {
    let server = MockServer::start();
    mock_users(&server);
    mock_posts(&server, 1, two_posts_for_user_one());
    mock_comments(&server, 1, 1);
    mock_comments(&server, 2, 1);
    let mut page = page_for(&server);
    page.init_app().await.unwrap();
    page.select_employee("1").await.unwrap();

    let button = page
        .document()
        .query_selector("button[data-post-id='2']")
        .unwrap()
        .unwrap();
    let section = page
        .document()
        .query_selector("section[data-post-id='2']")
        .unwrap()
        .unwrap();

    assert!(!page.document().listener(button));
    let first = page.click(button).await.unwrap();
    assert_eq!(
        first,
        vec![ListenerOutcome::Toggled(Some((
            Toggle::Found(section),
            Toggle::Found(button)
        )))]
    );
    assert_eq!(page.document().class_name(section), "comments");
    assert_eq!(page.document().text_content(button), HIDE_COMMENTS);
    assert!(page.document().listener(button));

    page.click(button).await.unwrap();
    assert_eq!(page.document().class_name(section), "comments hide");
    assert_eq!(page.document().text_content(button), SHOW_COMMENTS);

    // 另一篇貼文不受影響
    let other = page
        .document()
        .query_selector("section[data-post-id='1']")
        .unwrap()
        .unwrap();
    assert!(page.document().has_class(other, "hide"));
}

#[tokio::test]
async fn test_repeated_changes_keep_one_listener_per_button() {
    let server = MockServer::start();
    mock_users(&server);
    mock_posts(&server, 1, two_posts_for_user_one());
    mock_posts(
        &server,
        2,
        serde_json::json!([{"userId": 2, "id": 11, "title": "et ea vero", "body": "delectus"}]),
    );
    mock_comments(&server, 1, 0);
    mock_comments(&server, 2, 0);
    mock_comments(&server, 11, 0);
    let mut page = page_for(&server);
    page.init_app().await.unwrap();

    page.select_employee("1").await.unwrap();
    page.select_employee("1").await.unwrap();
    assert_eq!(page.events().listener_count(EventType::Click), 2);

    page.select_employee("2").await.unwrap();
    let main = page.main_element().unwrap();
    assert_eq!(page.document().element_children(main).len(), 1);

    let button = page
        .document()
        .query_selector("main button")
        .unwrap()
        .unwrap();
    assert_eq!(
        page.events().listeners(button, EventType::Click),
        vec![PageListener::ToggleComments { post_id: 11 }]
    );
}

#[tokio::test]
async fn test_comment_fetch_failure_renders_empty_section() {
    let server = MockServer::start();
    mock_users(&server);
    mock_posts(
        &server,
        1,
        serde_json::json!([{"userId": 1, "id": 1, "title": "t", "body": "b"}]),
    );
    server.mock(|when, then| {
        when.method(GET).path("/comments");
        then.status(500);
    });
    let mut page = page_for(&server);
    page.init_app().await.unwrap();

    page.select_employee("1").await.unwrap();

    let doc = page.document();
    let section = doc
        .query_selector("section[data-post-id='1']")
        .unwrap()
        .unwrap();
    assert!(doc
        .query_selector_all_from(section, "article")
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_display_and_refresh_without_posts() {
    let server = MockServer::start();
    let mut page = page_for(&server);

    assert_eq!(page.refresh_posts(None).await.unwrap(), None);

    let displayed = page.display_posts(None).await.unwrap();
    let doc = page.document();
    assert_eq!(displayed.len(), 1);
    assert_eq!(doc.text_content(displayed[0]), DEFAULT_TEXT);
    assert_eq!(doc.class_name(displayed[0]), "default-text");

    let refresh = page.refresh_posts(Some(&[][..])).await.unwrap().unwrap();
    let main = page.main_element().unwrap();
    assert_eq!(refresh.main, main);
    assert_eq!(page.document().element_children(main), refresh.displayed);
}

#[tokio::test]
async fn test_populate_select_menu_none() {
    let server = MockServer::start();
    let mut page = page_for(&server);

    assert_eq!(page.populate_select_menu(None).unwrap(), None);
}
