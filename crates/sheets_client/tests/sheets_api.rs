//! Wire-contract tests against a local mock of the token and sheets endpoints.

use std::sync::OnceLock;

use bookreg_config::{ServiceAccountConfig, SheetConfig};
use bookreg_core::{Action, AppendRows, BookRecord, Field, Form, SubmitError};
use bookreg_sheets::{Failure, SheetsClient, SheetsError};
use httpmock::prelude::*;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use serde_json::json;

const SHEET_ID: &str = "sheet-123";
const APPEND_PATH: &str = "/v4/spreadsheets/sheet-123/values/Sheet1!A:J:append";
const READ_PATH: &str = "/v4/spreadsheets/sheet-123/values/Sheet1!A2:J";

fn test_pem() -> &'static str {
    static PEM: OnceLock<String> = OnceLock::new();
    PEM.get_or_init(|| {
        let key = RsaPrivateKey::new(&mut rand::thread_rng(), 1024).unwrap();
        key.to_pkcs8_pem(LineEnding::LF).unwrap().to_string()
    })
}

fn client(server: &MockServer) -> SheetsClient {
    let account = ServiceAccountConfig {
        identity: "svc@books.iam.gserviceaccount.com".into(),
        signing_key: test_pem().to_string(),
        scope: "https://www.googleapis.com/auth/spreadsheets".into(),
        audience: server.url("/token"),
        resource_id: SHEET_ID.into(),
    };
    let sheet = SheetConfig {
        api_base: server.base_url(),
        ..SheetConfig::default()
    };
    SheetsClient::new(account, sheet)
}

fn mock_token(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(POST)
            .path("/token")
            .header("Content-Type", "application/x-www-form-urlencoded");
        then.status(200).json_body(json!({
            "access_token": "ya29.test",
            "expires_in": 3599,
            "token_type": "Bearer"
        }));
    })
}

fn record(id: &str, name: &str) -> BookRecord {
    let mut r = BookRecord::default();
    r.set(Field::BookId, id);
    r.set(Field::BookName, name);
    r
}

// ── Token exchange ────────────────────────────────────────────────

#[test]
fn token_is_exchanged_once_and_cached() {
    let server = MockServer::start();
    let token = mock_token(&server);

    let c = client(&server);
    assert_eq!(c.access_token().unwrap(), "ya29.test");
    assert_eq!(c.access_token().unwrap(), "ya29.test");
    token.assert_hits(1);
}

#[test]
fn token_rejection_is_auth_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(400).json_body(json!({ "error": "invalid_grant" }));
    });

    let err = client(&server).access_token().unwrap_err();
    match err {
        SheetsError::Auth(Failure::Http(400, body)) => assert!(body.contains("invalid_grant")),
        other => panic!("expected auth failure, got {:?}", other),
    }
}

#[test]
fn token_response_without_access_token_is_auth_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(200).json_body(json!({ "token_type": "Bearer" }));
    });

    let err = client(&server).access_token().unwrap_err();
    assert!(matches!(err, SheetsError::Auth(Failure::Parse(_))));
}

#[test]
fn bad_key_fails_before_any_request() {
    let server = MockServer::start();
    let token = mock_token(&server);

    let base = client(&server);
    let c = SheetsClient::new(
        ServiceAccountConfig {
            signing_key: "not a key".into(),
            ..base.account().clone()
        },
        base.sheet().clone(),
    );
    let err = c.access_token().unwrap_err();
    assert!(matches!(err, SheetsError::Auth(Failure::Key(_))));
    token.assert_hits(0);
}

// ── Append ────────────────────────────────────────────────────────

#[test]
fn append_sends_ten_cells_per_row() {
    let server = MockServer::start();
    mock_token(&server);
    let append = server.mock(|when, then| {
        when.method(POST)
            .path(APPEND_PATH)
            .query_param("valueInputOption", "USER_ENTERED")
            .header("Authorization", "Bearer ya29.test")
            .json_body(json!({
                "values": [
                    ["1", "채식주의자", "", "", "", "", "", "", "", "2024. 1. 15. 오후 3:04:05"],
                    ["2", "소년이 온다", "", "", "", "", "", "", "", "2024. 1. 15. 오후 3:04:05"]
                ]
            }));
        then.status(200).json_body(json!({
            "spreadsheetId": SHEET_ID,
            "updates": { "updatedRows": 2 }
        }));
    });

    let rows = [record("1", "채식주의자"), record("2", "소년이 온다")];
    let sent = client(&server)
        .append_rows(&rows, "2024. 1. 15. 오후 3:04:05")
        .unwrap();
    assert_eq!(sent, 2);
    append.assert();
}

#[test]
fn append_failure_is_save_error() {
    let server = MockServer::start();
    mock_token(&server);
    server.mock(|when, then| {
        when.method(POST).path(APPEND_PATH);
        then.status(403).body("The caller does not have permission");
    });

    let err = client(&server).append_rows(&[record("1", "a")], "t").unwrap_err();
    assert!(matches!(err, SheetsError::Save(Failure::Http(403, _))));
    assert!(err.to_string().starts_with("saving rows failed"));
}

#[test]
fn form_submit_through_client_resets_on_success() {
    let server = MockServer::start();
    mock_token(&server);
    let append = server.mock(|when, then| {
        when.method(POST).path(APPEND_PATH);
        then.status(200).json_body(json!({}));
    });

    let mut form = Form::default();
    form.dispatch(Action::Paste {
        row: 0,
        field: Field::BookId,
        text: "1\tA\n2\tB\n3\tC".into(),
    });

    let c = client(&server);
    let sent = form.submit(&c, "now").unwrap();
    assert_eq!(sent, 3);
    assert!(form.grid().content_rows().is_empty());
    append.assert_hits(1);
}

#[test]
fn form_submit_failure_keeps_rows() {
    let server = MockServer::start();
    mock_token(&server);
    server.mock(|when, then| {
        when.method(POST).path(APPEND_PATH);
        then.status(500);
    });

    let mut form = Form::default();
    form.dispatch(Action::SetCell { row: 4, field: Field::Author, value: "한강".into() });

    let err = form.submit(&client(&server), "now").unwrap_err();
    assert!(matches!(err, SubmitError::Remote(SheetsError::Save(_))));
    assert_eq!(form.grid().row(4).unwrap().get(Field::Author), "한강");
}

#[test]
fn empty_form_never_reaches_the_network() {
    let server = MockServer::start();
    let token = mock_token(&server);

    let mut form = Form::default();
    let err = form.submit(&client(&server), "now").unwrap_err();
    assert!(matches!(err, SubmitError::NothingToSubmit));
    token.assert_hits(0);
}

#[test]
fn client_is_an_append_sink() {
    fn takes_sink<S: AppendRows>(_: &S) {}
    let server = MockServer::start();
    takes_sink(&client(&server));
}

// ── Read ──────────────────────────────────────────────────────────

#[test]
fn read_maps_rows_positionally() {
    let server = MockServer::start();
    mock_token(&server);
    let read = server.mock(|when, then| {
        when.method(GET)
            .path(READ_PATH)
            .header("Authorization", "Bearer ya29.test");
        then.status(200).json_body(json!({
            "range": "Sheet1!A2:J3",
            "majorDimension": "ROWS",
            "values": [
                ["1", "채식주의자", "한강", "창비", "9788936434120", "12000", "2007-10-30", "", "2024-01-15", "2024. 1. 15. 오후 3:04:05"],
                ["2", "짧은 행"]
            ]
        }));
    });

    let rows = client(&server).read_submissions().unwrap();
    read.assert();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].record.author, "한강");
    assert_eq!(rows[0].record.price, "12000");
    assert_eq!(rows[0].submitted_at, "2024. 1. 15. 오후 3:04:05");
    assert_eq!(rows[1].record.book_name, "짧은 행");
    assert_eq!(rows[1].record.publisher, "");
    assert_eq!(rows[1].submitted_at, "");
}

#[test]
fn read_empty_range_is_no_rows() {
    let server = MockServer::start();
    mock_token(&server);
    server.mock(|when, then| {
        when.method(GET).path(READ_PATH);
        then.status(200).json_body(json!({ "range": "Sheet1!A2:J", "majorDimension": "ROWS" }));
    });

    assert!(client(&server).read_submissions().unwrap().is_empty());
}

#[test]
fn read_numbers_become_text() {
    let server = MockServer::start();
    mock_token(&server);
    server.mock(|when, then| {
        when.method(GET).path(READ_PATH);
        then.status(200).json_body(json!({ "values": [[7, "t", null, "", "", 15000]] }));
    });

    let rows = client(&server).read_submissions().unwrap();
    assert_eq!(rows[0].record.book_id, "7");
    assert_eq!(rows[0].record.author, "");
    assert_eq!(rows[0].record.price, "15000");
}

#[test]
fn read_failure_is_load_error() {
    let server = MockServer::start();
    mock_token(&server);
    server.mock(|when, then| {
        when.method(GET).path(READ_PATH);
        then.status(404).body("Requested entity was not found.");
    });

    let err = client(&server).read_submissions().unwrap_err();
    assert!(matches!(err, SheetsError::Load(Failure::Http(404, _))));
}

#[test]
fn unreachable_server_is_classified_by_stage() {
    let server = MockServer::start();
    mock_token(&server);
    let base = client(&server);
    let c = SheetsClient::new(
        base.account().clone(),
        SheetConfig {
            api_base: "http://127.0.0.1:1".into(),
            ..SheetConfig::default()
        },
    );
    assert!(matches!(c.read_submissions(), Err(SheetsError::Load(Failure::Network(_)))));
    assert!(matches!(
        c.append_rows(&[record("1", "a")], "t"),
        Err(SheetsError::Save(Failure::Network(_)))
    ));
}
