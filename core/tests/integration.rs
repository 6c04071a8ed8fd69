//! Full create/fetch/delete lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port on a background tokio runtime,
//! then drives the client through its real `ureq` transport. Each test
//! gets its own server so tests can run in parallel.

use std::net::SocketAddr;
use std::time::Duration;

use accounts_core::{
    AccountApiPayload, AccountAttributes, AccountData, AccountsClient, ApiError, ClientConfig,
    Outcome,
};
use uuid::Uuid;

const ORG: &str = "eb0bd6f5-c3f5-44b2-b677-acd23cdde73c";

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn client() -> AccountsClient {
    let addr = start_server();
    AccountsClient::new(ClientConfig::new(&format!(
        "http://{addr}{}",
        mock_server::ACCOUNTS_PATH
    )))
}

fn account(id: &str) -> AccountApiPayload {
    AccountApiPayload::new(AccountData {
        id: id.to_string(),
        organisation_id: ORG.to_string(),
        kind: "accounts".to_string(),
        version: Some(0),
        attributes: Some(AccountAttributes {
            bank_id: Some("400300".to_string()),
            country: Some("GB".to_string()),
            bic: Some("NWBKGB22".to_string()),
            name: vec!["TEST".to_string()],
            ..Default::default()
        }),
    })
}

#[test]
fn account_lifecycle() {
    let client = client();
    let id = Uuid::new_v4().to_string();

    // Step 1: create.
    assert_eq!(client.create(&account(&id)), Outcome::Success);

    // Step 2: fetch it back.
    let (fetched, outcome) = client.fetch(&id);
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(fetched.id(), Some(id.as_str()));
    let data = fetched.data.unwrap();
    assert_eq!(data.organisation_id, ORG);
    assert_eq!(data.version, Some(0));
    assert_eq!(data.attributes.unwrap().country.as_deref(), Some("GB"));

    // Step 3: delete.
    assert_eq!(client.delete(&id, Some(0)), Outcome::Success);

    // Step 4: fetch after delete.
    let (fetched, outcome) = client.fetch(&id);
    assert_eq!(outcome, Outcome::Failure);
    assert!(fetched.data.is_none());

    // Step 5: delete again.
    assert_eq!(client.delete(&id, Some(0)), Outcome::Failure);
}

#[test]
fn creating_an_empty_payload_fails() {
    let client = client();
    assert_eq!(client.create(&AccountApiPayload::default()), Outcome::Failure);
}

#[test]
fn creating_an_invalid_account_fails() {
    let client = client();
    let mut payload = account("000");
    if let Some(data) = payload.data.as_mut() {
        data.organisation_id = "0000".to_string();
        data.kind = "INVALID".to_string();
    }
    let err = client.try_create(&payload).unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[test]
fn creating_a_duplicate_fails() {
    let client = client();
    let id = Uuid::new_v4().to_string();
    assert!(client.create(&account(&id)).is_success());

    let err = client.try_create(&account(&id)).unwrap_err();
    assert_eq!(err.status(), Some(409));
}

#[test]
fn fetching_an_unknown_id_fails() {
    let client = client();
    let (fetched, outcome) = client.fetch("some-invalid-account-id");
    assert_eq!(outcome, Outcome::Failure);
    assert!(fetched.data.is_none());

    let err = client.try_fetch("some-invalid-account-id").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn fetching_an_empty_id_fails_locally() {
    let client = client();
    let err = client.try_fetch("").unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
}

#[test]
fn deleting_unknown_or_invalid_versions_fails() {
    let client = client();
    let id = "a1b2c3-q4w5e6r7-z0x9c8v7";

    assert_eq!(client.delete(id, Some(0)), Outcome::Failure);
    assert_eq!(client.delete(id, Some(-999)), Outcome::Failure);
    assert_eq!(client.delete(id, None), Outcome::Failure);
}

#[test]
fn deleting_with_a_stale_version_fails_and_keeps_the_account() {
    let client = client();
    let id = Uuid::new_v4().to_string();
    assert!(client.create(&account(&id)).is_success());

    let err = client.try_delete(&id, Some(7)).unwrap_err();
    assert_eq!(err.status(), Some(409));

    let (_, outcome) = client.fetch(&id);
    assert!(outcome.is_success());
}

#[test]
fn unreachable_service_is_a_transport_failure() {
    // Bind then drop to get a port nothing is listening on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let config = ClientConfig::new(&format!("http://{addr}/v1/organisation/accounts"))
        .with_timeout(Duration::from_secs(2));
    let client = AccountsClient::new(config);

    let err = client.try_fetch("ad27e265-9605-4b4b-a0e5-3003ea9cc4dc").unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[test]
fn concurrent_calls_share_one_client() {
    let client = client();
    let ids: Vec<String> = (0..4).map(|_| Uuid::new_v4().to_string()).collect();

    std::thread::scope(|s| {
        for id in &ids {
            let client = &client;
            s.spawn(move || {
                assert!(client.create(&account(id)).is_success());
                let (fetched, outcome) = client.fetch(id);
                assert!(outcome.is_success());
                assert_eq!(fetched.id(), Some(id.as_str()));
                assert!(client.delete(id, Some(0)).is_success());
            });
        }
    });
}
