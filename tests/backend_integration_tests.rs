use docent::core::action::Action;
use docent::core::state::ViewState;
use docent::core::sync;
use docent::core::transcript::{ERROR_MARKER, Role};
use docent::remote::{Backend, ChatEntry, Document, HttpBackend, Mode, RemoteError};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_string_contains, method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

async fn mock_json(server: &MockServer, verb: &str, route: &str, body: serde_json::Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// A server with one global-mode session holding one document and no history.
async fn single_session_server() -> MockServer {
    let server = MockServer::start().await;
    mock_json(
        &server,
        "GET",
        "/session/list",
        json!([{"_id": "s1", "description": "Contracts", "mode": "global"}]),
    )
    .await;
    mock_json(
        &server,
        "POST",
        "/document/list",
        json!({"documents": [{"filename": "lease.pdf", "type": "pdf"}]}),
    )
    .await;
    mock_json(&server, "POST", "/chat/history", json!({"chat_history": []})).await;
    server
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn test_create_session_posts_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/create"))
        .and(body_json(json!({"description": "Contracts"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"session_id": "abc"})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(server.uri());
    assert_eq!(backend.create_session("Contracts").await.unwrap(), "abc");
}

#[tokio::test]
async fn test_list_sessions_accepts_store_documents() {
    let server = MockServer::start().await;
    mock_json(
        &server,
        "GET",
        "/session/list",
        json!([
            {"_id": "a", "description": "One", "mode": "local", "documents": []},
            {"_id": "b", "description": null, "current_mode": "global"}
        ]),
    )
    .await;

    let sessions = HttpBackend::new(server.uri()).list_sessions().await.unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id, "a");
    assert_eq!(sessions[0].mode, Mode::Local);
    assert_eq!(sessions[1].description, "");
    assert_eq!(sessions[1].mode, Mode::Global);
}

#[tokio::test]
async fn test_delete_session_returns_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/delete"))
        .and(body_json(json!({"session_id": "a"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Session deleted"})),
        )
        .mount(&server)
        .await;

    let message = HttpBackend::new(server.uri())
        .delete_session("a")
        .await
        .unwrap();
    assert_eq!(message, "Session deleted");
}

// ============================================================================
// Documents
// ============================================================================

#[tokio::test]
async fn test_list_documents() {
    let server = single_session_server().await;
    let documents = HttpBackend::new(server.uri())
        .list_documents("s1")
        .await
        .unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].filename, "lease.pdf");
    assert_eq!(documents[0].kind.as_deref(), Some("pdf"));
}

#[tokio::test]
async fn test_upload_sends_multipart_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/document/upload"))
        .and(body_string_contains("name=\"session_id\""))
        .and(body_string_contains("filename=\"notes.txt\""))
        .and(body_string_contains("remember the milk"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Upload successful"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let message = HttpBackend::new(server.uri())
        .upload_document("s1", b"remember the milk".to_vec(), "notes.txt")
        .await
        .unwrap();
    assert_eq!(message, "Upload successful");
}

#[tokio::test]
async fn test_delete_document_without_message_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/document/delete"))
        .and(body_json(json!({"session_id": "s1", "filename": "lease.pdf"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let message = HttpBackend::new(server.uri())
        .delete_document("s1", "lease.pdf")
        .await
        .unwrap();
    assert_eq!(message, "lease.pdf deleted");
}

// ============================================================================
// Chat
// ============================================================================

#[tokio::test]
async fn test_ask_sends_mode_and_returns_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(
            json!({"session_id": "s1", "question": "rent?", "mode": "global"}),
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"answer": "(From global source) 1200 a month"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let answer = HttpBackend::new(server.uri())
        .ask("s1", "rent?", Some(Mode::Global))
        .await
        .unwrap();
    assert_eq!(answer, "(From global source) 1200 a month");
}

#[tokio::test]
async fn test_ask_without_mode_omits_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(json!({"session_id": "s1", "question": "hi"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "hello"})))
        .expect(1)
        .mount(&server)
        .await;

    let answer = HttpBackend::new(server.uri())
        .ask("s1", "hi", None)
        .await
        .unwrap();
    assert_eq!(answer, "hello");
}

#[tokio::test]
async fn test_ask_without_answer_field_shows_raw_body() {
    let server = MockServer::start().await;
    mock_json(&server, "POST", "/ask", json!({"error": "index empty"})).await;

    let answer = HttpBackend::new(server.uri())
        .ask("s1", "hi", None)
        .await
        .unwrap();
    assert!(answer.contains("index empty"));
}

#[tokio::test]
async fn test_history_and_switch_mode() {
    let server = MockServer::start().await;
    mock_json(
        &server,
        "POST",
        "/chat/history",
        json!({"chat_history": [{"question": "q1", "answer": "a1"}]}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/chat/switch_mode"))
        .and(body_json(json!({"session_id": "s1", "mode": "local"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Mode changed to local"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(server.uri());
    assert_eq!(
        backend.get_history("s1").await.unwrap(),
        vec![ChatEntry::new("q1", "a1")]
    );
    assert_eq!(
        backend.switch_mode("s1", Mode::Local).await.unwrap(),
        "Mode changed to local"
    );
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_endpoints_send_query_as_q() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search/documents"))
        .and(body_json(json!({"session_id": "s1", "q": "rent"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"matches": ["The **rent** is due monthly"]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/search/chat"))
        .and(body_json(json!({"session_id": "s1", "q": "rent"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"matches": [{"question": "**rent**?", "answer": "1200"}]}),
        ))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(server.uri());
    assert_eq!(
        backend.search_documents("s1", "rent").await.unwrap(),
        vec!["The **rent** is due monthly".to_string()]
    );
    assert_eq!(
        backend.search_chat("s1", "rent").await.unwrap(),
        vec![ChatEntry::new("**rent**?", "1200")]
    );
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_non_success_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/history"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Session not found"))
        .mount(&server)
        .await;

    let result = HttpBackend::new(server.uri()).get_history("missing").await;
    match result {
        Err(RemoteError::Api { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "Session not found");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unparseable_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = HttpBackend::new(server.uri()).list_sessions().await;
    assert!(matches!(result, Err(RemoteError::Parse(_))));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Nothing listens on port 1
    let backend = HttpBackend::new("http://127.0.0.1:1");
    let result = backend.list_sessions().await;
    assert!(matches!(result, Err(RemoteError::Network(_))));
}

// ============================================================================
// End to end through the reducer
// ============================================================================

#[tokio::test]
async fn test_refresh_select_and_ask_against_http() {
    let server = single_session_server().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(
            json!({"session_id": "s1", "question": "who signed?", "mode": "global"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "Both parties"})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(server.uri());
    let mut state = ViewState::new(server.uri());

    sync::dispatch(&mut state, &backend, Action::Refresh).await;
    assert_eq!(state.sessions.len(), 1);
    assert_eq!(state.sessions[0].documents, vec![Document {
        filename: "lease.pdf".into(),
        kind: Some("pdf".into()),
    }]);

    sync::dispatch(&mut state, &backend, Action::SelectSession("s1".into())).await;
    sync::dispatch(&mut state, &backend, Action::Ask("who signed?".into())).await;

    let last = state.transcript.entries().last().unwrap();
    assert_eq!(last.role, Role::Bot);
    assert_eq!(last.text, "Both parties");
    assert!(!state.is_busy());
}

#[tokio::test]
async fn test_ask_against_dead_server_leaves_one_error_entry() {
    let backend = HttpBackend::new("http://127.0.0.1:1");
    let mut state = ViewState::new("http://127.0.0.1:1");
    state.current_session_id = Some("s1".into());

    sync::dispatch(&mut state, &backend, Action::Ask("anyone there?".into())).await;

    let entries = state.transcript.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].role, Role::User);
    assert!(entries[1].text.starts_with(ERROR_MARKER));
    assert!(!state.transcript.is_typing());
}

#[tokio::test]
async fn test_upload_from_disk_refreshes_documents() {
    let server = single_session_server().await;
    Mock::given(method("POST"))
        .and(path("/document/upload"))
        .and(body_string_contains("filename=\"docent-upload-test.txt\""))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Upload successful"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let file = std::env::temp_dir().join("docent-upload-test.txt");
    std::fs::write(&file, "clause 4: no pets").unwrap();

    let backend = HttpBackend::new(server.uri());
    let mut state = ViewState::new(server.uri());
    sync::dispatch(&mut state, &backend, Action::Refresh).await;
    state.current_session_id = Some("s1".into());
    sync::dispatch(&mut state, &backend, Action::Upload(file.clone())).await;

    assert_eq!(state.alert.as_deref(), Some("Upload successful"));
    assert!(!state.is_busy());
    let _ = std::fs::remove_file(&file);
}
