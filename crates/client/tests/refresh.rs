mod common;

use std::sync::atomic::Ordering;

use api_types::expense::Expense;
use client::{AuthState, ClientError, StatusCode};
use common::{Backend, client_for, session_with, spawn};

#[tokio::test]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let backend = Backend::new();
    let addr = spawn(backend.clone()).await;
    let api = client_for(addr, session_with("a1", "r1")).await;
    backend.expire_access();

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..10 {
        let api = api.clone();
        tasks.spawn(async move { api.list::<Expense>().await });
    }

    while let Some(result) = tasks.join_next().await {
        let expenses = result.unwrap().unwrap();
        assert_eq!(expenses.len(), 2);
    }
    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(api.session().access_token().as_deref(), Some("a2"));
    assert_eq!(api.session().refresh_token().as_deref(), Some("r1"));
    assert_eq!(api.session().state(), AuthState::Authenticated);
}

#[tokio::test]
async fn failed_refresh_expires_the_session_for_every_caller() {
    let backend = Backend::new();
    backend.refresh_ok.store(false, Ordering::SeqCst);
    let addr = spawn(backend.clone()).await;
    let api = client_for(addr, session_with("a1", "r1")).await;
    backend.expire_access();

    let mut state = api.session().subscribe();
    let _ = state.borrow_and_update();

    let (a, b, c) = tokio::join!(
        api.list::<Expense>(),
        api.list::<Expense>(),
        api.get::<Expense>(1),
    );

    assert!(matches!(a, Err(ClientError::SessionExpired)));
    assert!(matches!(b, Err(ClientError::SessionExpired)));
    assert!(matches!(c, Err(ClientError::SessionExpired)));
    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(api.session().access_token(), None);
    assert_eq!(api.session().refresh_token(), None);

    assert!(state.has_changed().unwrap());
    assert_eq!(*state.borrow_and_update(), AuthState::Expired);
}

#[tokio::test]
async fn missing_refresh_token_expires_without_calling_backend() {
    let backend = Backend::new();
    let addr = spawn(backend.clone()).await;
    let api = client_for(addr, client::Session::in_memory()).await;

    let err = api.list::<Expense>().await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert_eq!(backend.refresh_calls(), 0);
    assert_eq!(api.session().state(), AuthState::Expired);
}

#[tokio::test]
async fn retry_is_attempted_once_after_refresh() {
    let backend = Backend::new();
    let addr = spawn(backend.clone()).await;
    let api = client_for(addr, session_with("a1", "r1")).await;
    backend.expire_access();

    let err = api
        .request("/locked/", client::RequestOptions::get())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(backend.requests.load(Ordering::SeqCst), 2);
    assert_eq!(api.session().access_token().as_deref(), Some("a2"));
}

#[tokio::test]
async fn a_later_expiry_starts_a_new_refresh() {
    let backend = Backend::new();
    let addr = spawn(backend.clone()).await;
    let api = client_for(addr, session_with("a1", "r1")).await;

    backend.expire_access();
    api.list::<Expense>().await.unwrap();
    assert_eq!(backend.refresh_calls(), 1);

    backend.expire_access();
    api.list::<Expense>().await.unwrap();
    assert_eq!(backend.refresh_calls(), 2);
}

#[tokio::test]
async fn rejected_login_never_refreshes() {
    let backend = Backend::new();
    let addr = spawn(backend.clone()).await;
    let api = client_for(addr, session_with("a1", "r1")).await;

    let err = api.login("alice", "wrong").await.unwrap_err();
    match err {
        ClientError::Http {
            status, message, ..
        } => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(message, "No active account found with the given credentials");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(backend.refresh_calls(), 0);
    assert_eq!(api.session().access_token().as_deref(), Some("a1"));
}
