#![allow(clippy::unwrap_used, clippy::expect_used)]

use access_security::Caller;

#[test]
fn default_caller_has_no_identity() {
    let caller = Caller::default();
    assert!(caller.principal().is_none());
    assert!(caller.roles().is_empty());
}

#[test]
fn caller_equality_ignores_role_order() {
    let a = Caller::builder().roles(["ops", "admin"]).build();
    let b = Caller::builder().roles(["admin", "ops"]).build();
    assert_eq!(a, b);
}

#[test]
fn caller_from_json_payload() {
    let caller: Caller =
        serde_json::from_str(r#"{"service":"billing","roles":["ops"]}"#).unwrap();

    assert_eq!(caller.service_name(), Some("billing"));
    assert!(caller.has_role("ops"));
    assert!(caller.user().is_none());
}
