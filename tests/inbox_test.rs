use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde_json::json;
use tempmail_extract::*;

const INBOX_BODY: &str = r#"{
  "data": {
    "inbox": [
      {"id": "m1", "date": "2025-01-01T12:00:00Z", "mailfrom": "a@b.com", "subject": "Hi", "data": null},
      {"id": "m2", "date": "2025-01-01T12:05:00Z", "mailfrom": "c@d.com", "subject": "Yo"}
    ]
  }
}"#;

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

fn summary(id: &str) -> Message {
    Message {
        id: MessageId::new(id),
        date: String::new(),
        mailfrom: "sender@example.com".into(),
        subject: "Subject".into(),
        data: None,
    }
}

// --- InboxQuery ---

#[test]
fn test_inbox_query_body() {
    let query = InboxQuery::inbox("abc123");
    assert!(query.query.contains("inbox(mailbox: $mailbox)"));
    assert_eq!(query.variables, json!({ "mailbox": "abc123" }));

    let body = query.to_json().unwrap();
    assert!(body.contains(r#""mailbox":"abc123""#));
}

#[test]
fn test_message_query_body() {
    let query = InboxQuery::message("abc123", &MessageId::new("m1"));
    assert!(query.query.contains("message(mailbox: $mailbox, id: $id)"));
    assert_eq!(query.variables, json!({ "mailbox": "abc123", "id": "m1" }));
}

// --- Response decoding ---

#[test]
fn test_parse_inbox_response() {
    let messages = parse_inbox_response(INBOX_BODY).unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].id.as_str(), "m1");
    assert!(messages[0].data.is_none());
    assert!(messages[1].data.is_none());
    assert_eq!(messages[1].mailfrom, "c@d.com");
}

#[test]
fn test_parse_inbox_null_fields() {
    let body = r#"{"data": {"inbox": [
        {"id": "1", "date": null, "mailfrom": null, "subject": null, "data": null},
        {"id": "2", "date": "2025-01-01T12:00:00Z", "mailfrom": "a@b.com", "subject": "Hi"}
    ]}}"#;
    let messages = parse_inbox_response(body).unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].subject, "");
    assert_eq!(messages[0].mailfrom, "");
    assert!(messages[0].received_at().is_none());
    assert_eq!(messages[1].subject, "Hi");
}

#[test]
fn test_parse_inbox_provider_errors() {
    let body = r#"{"data": null, "errors": [{"message": "mailbox not found"}]}"#;
    match parse_inbox_response(body) {
        Err(Error::Provider(errors)) => assert_eq!(errors, vec!["mailbox not found"]),
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[test]
fn test_parse_inbox_missing_field() {
    assert!(matches!(
        parse_inbox_response(r#"{"data": {}}"#),
        Err(Error::MissingField(_))
    ));
}

#[test]
fn test_parse_inbox_invalid_json() {
    assert!(matches!(
        parse_inbox_response("<html>502 Bad Gateway</html>"),
        Err(Error::Json(_))
    ));
}

#[test]
fn test_parse_message_response() {
    let body = r#"{"data": {"message": {"id": "m1", "date": "", "mailfrom": "a@b.com",
        "subject": "Hi", "data": "Hello=20there"}}}"#;
    let message = parse_message_response(body).unwrap().unwrap();

    assert_eq!(message.raw_body(), "Hello=20there");
    assert_eq!(message.content().text, "Hello there");
}

#[test]
fn test_parse_message_response_with_errors_keeps_data() {
    let body = r#"{"data": {"message": {"id": "m1", "subject": null, "data": "Hi"}},
        "errors": [{"message": "partial result"}]}"#;
    let message = parse_message_response(body).unwrap().unwrap();
    assert_eq!(message.raw_body(), "Hi");
}

#[test]
fn test_parse_message_response_null() {
    let body = r#"{"data": {"message": null}}"#;
    assert!(parse_message_response(body).unwrap().is_none());
}

// --- Inbox state ---

#[test]
fn test_inbox_keeps_stale_list_on_error() {
    let mut inbox = Inbox::new();
    assert!(inbox.apply(noon(), parse_inbox_response(INBOX_BODY)));
    assert_eq!(inbox.len(), 2);

    let failed = parse_inbox_response("not json");
    assert!(!inbox.apply(noon() + TimeDelta::seconds(5), failed));
    assert_eq!(inbox.len(), 2);
    assert!(inbox.find(&MessageId::new("m2")).is_some());
}

#[test]
fn test_inbox_reset() {
    let mut inbox = Inbox::new();
    inbox.apply(noon(), parse_inbox_response(INBOX_BODY));
    inbox.reset();

    assert!(inbox.is_empty());
    assert!(inbox.poll_due(noon(), TimeDelta::seconds(5)));
}

#[test]
fn test_inbox_poll_due() {
    let mut inbox = Inbox::new();
    let interval = ProviderConfig::default().poll_interval();

    assert!(inbox.poll_due(noon(), interval));
    inbox.apply(noon(), Ok(Vec::new()));
    assert!(!inbox.poll_due(noon() + TimeDelta::seconds(4), interval));
    assert!(inbox.poll_due(noon() + TimeDelta::seconds(5), interval));
}

#[test]
fn test_open_prefers_fetched_message() {
    let mut full = summary("m1");
    full.data = Some("Full body".into());

    let opened = Inbox::open(&summary("m1"), Ok(Some(full.clone())));
    assert_eq!(opened, full);
}

#[test]
fn test_open_falls_back_to_summary() {
    let base = summary("m1");

    assert_eq!(Inbox::open(&base, Ok(None)), base);
    assert_eq!(
        Inbox::open(&base, Err(Error::MissingField("data".into()))),
        base
    );
}
