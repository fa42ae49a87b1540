use async_trait::async_trait;
use dmmf::DmmfHelper;
use pretty_assertions::assert_eq;
use prisma_value::PrismaValue;
use request_handlers::{Action, ClientConfig, ClientError, EngineError, QueryEngine, RequestHandler, RequestParams};
use serde_json::json;
use std::sync::Mutex;

fn blog() -> DmmfHelper {
    DmmfHelper::from_json_str(include_str!("../../dmmf/test-files/blog.dmmf.json")).unwrap()
}

/// Answers every request with the same response and remembers the queries it saw.
struct MockEngine {
    response: serde_json::Value,
    queries: Mutex<Vec<String>>,
}

impl MockEngine {
    fn new(response: serde_json::Value) -> Self {
        Self {
            response,
            queries: Mutex::new(Vec::new()),
        }
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryEngine for MockEngine {
    async fn request(&self, query: &str) -> Result<serde_json::Value, EngineError> {
        self.queries.lock().unwrap().push(query.to_owned());
        Ok(self.response.clone())
    }
}

struct UnreachableEngine;

#[async_trait]
impl QueryEngine for UnreachableEngine {
    async fn request(&self, _query: &str) -> Result<serde_json::Value, EngineError> {
        Err(EngineError::Unreachable("connection refused".to_owned()))
    }
}

fn args(value: serde_json::Value) -> PrismaValue {
    PrismaValue::from(value)
}

#[tokio::test]
async fn find_many_sends_the_document_and_unpacks_the_rows() {
    let dmmf = blog();
    let engine = MockEngine::new(json!({
        "data": { "findManyUser": [{ "id": "1", "createdAt": "2020-01-02T03:04:05.000Z" }] }
    }));
    let handler = RequestHandler::new(&dmmf, &engine, ClientConfig::default());

    let users = handler
        .model("User")
        .unwrap()
        .find_many(args(json!({ "select": { "id": true, "createdAt": true } })))
        .await
        .unwrap();

    assert_eq!(
        engine.queries(),
        ["query {\n  findManyUser {\n    id\n    createdAt\n  }\n}"]
    );

    let row = users.as_list().unwrap()[0].as_object().unwrap();
    assert_eq!(row["id"], PrismaValue::from("1"));
    assert!(matches!(row["createdAt"], PrismaValue::DateTime(_)));
}

#[tokio::test]
async fn invalid_arguments_never_reach_the_engine() {
    let dmmf = blog();
    let engine = MockEngine::new(json!({ "data": {} }));
    let handler = RequestHandler::new(&dmmf, &engine, ClientConfig::default());

    let err = handler
        .model("User")
        .unwrap()
        .find_unique(args(json!({})))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(
        err.to_string().contains("Invalid `prisma.user.findUnique()` invocation"),
        "{err}"
    );
    assert!(engine.queries().is_empty());
}

#[tokio::test]
async fn engine_errors_are_surfaced() {
    let dmmf = blog();
    let engine = MockEngine::new(json!({
        "errors": [{ "error": "raw", "user_facing_error": { "message": "Record to delete does not exist." } }]
    }));
    let handler = RequestHandler::new(&dmmf, &engine, ClientConfig::default());

    let err = handler
        .model("User")
        .unwrap()
        .delete(args(json!({ "where": { "id": "1" } })))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Engine(ref message) if message == "Record to delete does not exist."));
    assert_eq!(engine.queries().len(), 1);
    assert!(engine.queries()[0].starts_with("mutation {\n  deleteOneUser(where: {"));
}

#[tokio::test]
async fn transport_failures_are_reported() {
    let dmmf = blog();
    let handler = RequestHandler::new(&dmmf, &UnreachableEngine, ClientConfig::default());

    let err = handler
        .model("User")
        .unwrap()
        .find_many(args(json!({})))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Transport(EngineError::Unreachable(_))));
}

#[tokio::test]
async fn count_collapses_to_a_number() {
    let dmmf = blog();
    let engine = MockEngine::new(json!({ "data": { "aggregateUser": { "_count": { "_all": 3 } } } }));
    let handler = RequestHandler::new(&dmmf, &engine, ClientConfig::default());

    let count = handler
        .model("User")
        .unwrap()
        .count(args(json!({ "where": { "name": "Bob" } })))
        .await
        .unwrap();

    assert_eq!(count, PrismaValue::Int(3));
    assert!(engine.queries()[0].contains("_count {\n      _all\n    }"), "{:?}", engine.queries());
}

#[tokio::test]
async fn count_with_select_returns_the_counts() {
    let dmmf = blog();
    let engine = MockEngine::new(json!({ "data": { "aggregateUser": { "_count": { "email": 2 } } } }));
    let handler = RequestHandler::new(&dmmf, &engine, ClientConfig::default());

    let count = handler
        .model("User")
        .unwrap()
        .count(args(json!({ "select": { "email": true } })))
        .await
        .unwrap();

    assert_eq!(count, args(json!({ "email": 2 })));
}

#[tokio::test]
async fn group_by_collapses_row_counts() {
    let dmmf = blog();
    let engine = MockEngine::new(json!({
        "data": { "groupByUser": [{ "role": "ADMIN", "_count": { "_all": 2 } }] }
    }));
    let handler = RequestHandler::new(&dmmf, &engine, ClientConfig::default());

    let groups = handler
        .model("User")
        .unwrap()
        .group_by(args(json!({ "by": ["role"], "_count": true })))
        .await
        .unwrap();

    assert_eq!(groups, args(json!([{ "role": "ADMIN", "_count": 2 }])));

    let query = &engine.queries()[0];
    assert!(query.contains("groupByUser(by: ["), "{query}");
    assert!(query.contains("    role\n"), "{query}");
}

#[tokio::test]
async fn raw_queries_run_without_a_model() {
    let dmmf = blog();
    let engine = MockEngine::new(json!({ "data": { "executeRaw": 2 } }));
    let handler = RequestHandler::new(&dmmf, &engine, ClientConfig::default());

    let affected = handler
        .execute_raw("DELETE FROM User WHERE id = $1", Some(args(json!(["1"]))))
        .await
        .unwrap();

    assert_eq!(affected, PrismaValue::Int(2));
    let query = &engine.queries()[0];
    assert!(query.starts_with("mutation {\n  executeRaw(\n"), "{query}");
    assert!(query.contains("query: \"DELETE FROM User WHERE id = $1\""), "{query}");
}

#[tokio::test]
async fn client_and_schema_mismatches_are_internal_errors() {
    let dmmf = blog();
    let engine = MockEngine::new(json!({ "data": {} }));
    let handler = RequestHandler::new(&dmmf, &engine, ClientConfig::default());

    let cases = [
        (RequestParams::new(Action::FindMany, None), "Model missing for action findMany"),
        (
            RequestParams::new(Action::QueryRaw, Some("User")),
            "executeRaw and queryRaw can't be executed on a model basis. The model User has been provided",
        ),
        (
            RequestParams::new(Action::FindMany, Some("Comment")),
            "Could not find mapping for model Comment",
        ),
        (
            RequestParams::new(Action::Create, Some("Post")),
            "Could not find rootField undefined for action create for model Post on rootType mutation",
        ),
    ];

    for (params, expected) in cases {
        let err = handler.request(params).await.unwrap_err();

        assert!(matches!(err, ClientError::Internal(_)), "{err:?}");
        assert_eq!(err.to_string(), expected);
    }

    assert!(handler.model("Comment").is_err());
    assert!(engine.queries().is_empty());
}

#[tokio::test]
async fn delegates_know_their_actions() {
    let dmmf = blog();
    let engine = MockEngine::new(json!({ "data": {} }));
    let handler = RequestHandler::new(&dmmf, &engine, ClientConfig::default());

    let post = handler.model("Post").unwrap();
    assert!(post.supports(Action::FindMany));
    assert!(!post.supports(Action::Create));

    let user = handler.model("User").unwrap();
    assert_eq!(user.root_field(Action::Count), Some("aggregateUser"));
    assert_eq!(user.root_field(Action::Update), Some("updateOneUser"));

    let names: Vec<_> = handler.models().map(|m| m.name()).collect();
    assert_eq!(names, ["User", "Post", "Tag"]);
}

#[tokio::test]
async fn update_many_returns_the_affected_rows() {
    let dmmf = blog();
    let engine = MockEngine::new(json!({ "data": { "updateManyUser": { "count": 5 } } }));
    let handler = RequestHandler::new(&dmmf, &engine, ClientConfig::default());

    let result = handler
        .model("User")
        .unwrap()
        .update_many(args(json!({ "data": { "name": "Anonymous" } })))
        .await
        .unwrap();

    assert_eq!(result, args(json!({ "count": 5 })));
    assert!(engine.queries()[0].contains("updateManyUser(data: {"));
}
