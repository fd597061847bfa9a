//! GraphQL API tests
//!
//! Requests are executed directly against the built schema, with the caller
//! attached as request data the way the HTTP handler does after verifying a
//! bearer token.

use async_graphql::Request;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use linkfeed::db::{CreateUser, Database};
use linkfeed::graphql::{AuthUser, LinkSchema, build_schema};

async fn setup() -> (Database, LinkSchema) {
    let db = Database::connect_in_memory().await.unwrap();
    let schema = build_schema(db.clone());
    (db, schema)
}

async fn create_user(db: &Database, name: &str) -> i32 {
    db.users()
        .create(CreateUser {
            name: name.to_string(),
            email: format!("{}@example.com", name),
        })
        .await
        .unwrap()
        .id
}

async fn execute(schema: &LinkSchema, query: &str, caller: Option<i32>) -> Value {
    let mut request = Request::new(query);
    if let Some(user_id) = caller {
        request = request.data(AuthUser { user_id });
    }
    let response = schema.execute(request).await;
    serde_json::to_value(&response).unwrap()
}

fn error_code(response: &Value) -> (&str, i64) {
    let extensions = &response["errors"][0]["extensions"];
    (
        extensions["code"].as_str().unwrap_or_default(),
        extensions["status"].as_i64().unwrap_or_default(),
    )
}

async fn post_link(schema: &LinkSchema, user: i32, description: &str, url: &str) -> i64 {
    let query = format!(
        r#"mutation {{ post(description: "{}", url: "{}") {{ id }} }}"#,
        description, url
    );
    let response = execute(schema, &query, Some(user)).await;
    response["data"]["post"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_post_and_find_one_link_with_relations() {
    let (db, schema) = setup().await;
    let alice = create_user(&db, "alice").await;

    let id = post_link(&schema, alice, "Rust book", "https://doc.rust-lang.org/book").await;

    let response = execute(
        &schema,
        &format!(
            "{{ findOneLink(id: {}) {{ id description url totalVotes postedBy {{ id name email }} voters {{ id }} }} }}",
            id
        ),
        None,
    )
    .await;

    assert!(response.get("errors").is_none(), "{response}");
    assert_eq!(
        response["data"]["findOneLink"],
        json!({
            "id": id,
            "description": "Rust book",
            "url": "https://doc.rust-lang.org/book",
            "totalVotes": 0,
            "postedBy": { "id": alice, "name": "alice", "email": "alice@example.com" },
            "voters": []
        })
    );
}

#[tokio::test]
async fn test_anonymous_post_is_unauthenticated() {
    let (_db, schema) = setup().await;

    let response = execute(
        &schema,
        r#"mutation { post(description: "Rust book", url: "https://doc.rust-lang.org/book") { id } }"#,
        None,
    )
    .await;

    assert_eq!(error_code(&response), ("UNAUTHENTICATED", 401));
    assert_eq!(response["errors"][0]["message"], "Not authenticated");
}

#[tokio::test]
async fn test_duplicate_post_is_conflict() {
    let (db, schema) = setup().await;
    let alice = create_user(&db, "alice").await;
    post_link(&schema, alice, "Rust book", "https://doc.rust-lang.org/book").await;

    let response = execute(
        &schema,
        r#"mutation { post(description: "Other", url: "https://doc.rust-lang.org/book") { id } }"#,
        Some(alice),
    )
    .await;

    assert_eq!(error_code(&response), ("CONFLICT", 409));
}

#[tokio::test]
async fn test_update_and_delete_by_non_owner_are_forbidden() {
    let (db, schema) = setup().await;
    let alice = create_user(&db, "alice").await;
    let bob = create_user(&db, "bob").await;
    let id = post_link(&schema, alice, "Rust book", "https://doc.rust-lang.org/book").await;

    let update = execute(
        &schema,
        &format!(
            r#"mutation {{ updateLink(id: {}, description: "Mine now", url: "https://evil.example") {{ id }} }}"#,
            id
        ),
        Some(bob),
    )
    .await;
    assert_eq!(error_code(&update), ("FORBIDDEN", 403));

    let delete = execute(
        &schema,
        &format!("mutation {{ deleteLink(id: {}) {{ id }} }}", id),
        Some(bob),
    )
    .await;
    assert_eq!(error_code(&delete), ("FORBIDDEN", 403));
}

#[tokio::test]
async fn test_owner_update_and_delete() {
    let (db, schema) = setup().await;
    let alice = create_user(&db, "alice").await;
    let id = post_link(&schema, alice, "Rust book", "https://doc.rust-lang.org/book").await;

    let update = execute(
        &schema,
        &format!(
            r#"mutation {{ updateLink(id: {}, description: "The Book", url: "https://doc.rust-lang.org/book") {{ description updatedAt }} }}"#,
            id
        ),
        Some(alice),
    )
    .await;
    assert!(update.get("errors").is_none(), "{update}");
    assert_eq!(update["data"]["updateLink"]["description"], "The Book");
    assert!(update["data"]["updateLink"]["updatedAt"].is_string());

    let delete = execute(
        &schema,
        &format!("mutation {{ deleteLink(id: {}) {{ id description }} }}", id),
        Some(alice),
    )
    .await;
    assert_eq!(
        delete["data"]["deleteLink"],
        json!({ "id": id, "description": "The Book" })
    );

    let lookup = execute(
        &schema,
        &format!("{{ findOneLink(id: {}) {{ id }} }}", id),
        None,
    )
    .await;
    assert_eq!(error_code(&lookup), ("NOT_FOUND", 404));
}

#[tokio::test]
async fn test_feed_with_filter_order_and_pagination() {
    let (db, schema) = setup().await;
    let alice = create_user(&db, "alice").await;
    post_link(&schema, alice, "alpha", "https://example.com/a").await;
    post_link(&schema, alice, "beta", "https://example.com/b").await;
    post_link(&schema, alice, "gamma", "https://other.org/g").await;

    let response = execute(
        &schema,
        r#"{ feed(filter: "EXAMPLE", take: 1, orderBy: [{ description: desc }]) { id count links { description } } }"#,
        None,
    )
    .await;

    assert!(response.get("errors").is_none(), "{response}");
    assert_eq!(
        response["data"]["feed"],
        json!({
            "id": r#"main-feed: {"filter":"EXAMPLE","take":1,"orderBy":[{"description":"desc"}]}"#,
            "count": 2,
            "links": [{ "description": "beta" }]
        })
    );
}

#[tokio::test]
async fn test_feed_negative_take_is_bad_request() {
    let (_db, schema) = setup().await;

    let response = execute(&schema, "{ feed(take: -1) { count } }", None).await;

    assert_eq!(error_code(&response), ("BAD_REQUEST", 400));
}

#[tokio::test]
async fn test_vote_updates_totals_and_voters() {
    let (db, schema) = setup().await;
    let alice = create_user(&db, "alice").await;
    let bob = create_user(&db, "bob").await;
    let id = post_link(&schema, alice, "Rust book", "https://doc.rust-lang.org/book").await;

    let vote = format!("mutation {{ vote(linkId: {}) {{ totalVotes voters {{ name }} }} }}", id);

    let first = execute(&schema, &vote, Some(bob)).await;
    assert_eq!(
        first["data"]["vote"],
        json!({ "totalVotes": 1, "voters": [{ "name": "bob" }] })
    );

    let repeat = execute(&schema, &vote, Some(bob)).await;
    assert_eq!(error_code(&repeat), ("CONFLICT", 409));

    let feed = execute(
        &schema,
        "{ feed { links { totalVotes postedBy { name } voters { name } } } }",
        None,
    )
    .await;
    assert_eq!(
        feed["data"]["feed"]["links"],
        json!([{ "totalVotes": 1, "postedBy": { "name": "alice" }, "voters": [{ "name": "bob" }] }])
    );
}

#[tokio::test]
async fn test_feed_id_keeps_ordering_input_shape() {
    let (db, schema) = setup().await;
    let alice = create_user(&db, "alice").await;
    post_link(&schema, alice, "same", "https://example.com/b").await;
    post_link(&schema, alice, "other", "https://example.com/a").await;

    let response = execute(
        &schema,
        r#"{ feed(orderBy: [{ description: desc, url: asc }, { createdAt: desc }]) { id links { description } } }"#,
        None,
    )
    .await;

    assert!(response.get("errors").is_none(), "{response}");
    assert_eq!(
        response["data"]["feed"]["id"],
        r#"main-feed: {"orderBy":[{"description":"desc","url":"asc"},{"createdAt":"desc"}]}"#
    );
    assert_eq!(
        response["data"]["feed"]["links"],
        json!([{ "description": "same" }, { "description": "other" }])
    );
}
