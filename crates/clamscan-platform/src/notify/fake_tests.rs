// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn records_sent_notifications() {
    let adapter = FakeNotifyAdapter::new();
    adapter.notify("infected file found", "worker-1: eicar.com").await.unwrap();
    let calls = adapter.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].subject, "infected file found");
}

#[tokio::test]
async fn forced_failure_is_one_shot() {
    let adapter = FakeNotifyAdapter::new();
    adapter.fail_next_send();
    assert!(adapter.notify("a", "b").await.is_err());
    assert!(adapter.notify("a", "b").await.is_ok());
    assert_eq!(adapter.calls().len(), 1);
}

#[tokio::test]
async fn credential_resolver_errors_on_unseeded_ref() {
    let resolver = FakeCredentialResolver::new();
    let cred = CredentialRef { store: "vault".into(), key: "chat-webhook".into() };
    assert!(resolver.resolve(&cred).await.is_err());
    resolver.seed(cred.clone(), "https://hooks.example.com/abc");
    assert_eq!(resolver.resolve(&cred).await.unwrap(), "https://hooks.example.com/abc");
}
