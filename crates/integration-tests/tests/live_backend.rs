//! Tests against a real backend project.
//!
//! These tests require:
//! - `SUPABASE_URL` and `SUPABASE_ANON_KEY` for a project with the dashboard schema
//! - `FRUIT_TEST_ADMIN_LOGIN` / `FRUIT_TEST_ADMIN_PASSWORD` for an admin account
//!
//! Run with: cargo test -p fruit-union-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use fruit_union_core::{Email, UserRole};
use fruit_union_dashboard::config::SupabaseConfig;
use fruit_union_dashboard::gateway::RemoteGateway;
use fruit_union_dashboard::supabase::{SupabaseClient, SupabaseError};

fn client() -> SupabaseClient {
    SupabaseClient::new(&SupabaseConfig::from_env().expect("SUPABASE_URL / SUPABASE_ANON_KEY"))
}

fn admin_credentials() -> (Email, String) {
    let login = std::env::var("FRUIT_TEST_ADMIN_LOGIN").expect("FRUIT_TEST_ADMIN_LOGIN");
    let password = std::env::var("FRUIT_TEST_ADMIN_PASSWORD").expect("FRUIT_TEST_ADMIN_PASSWORD");
    (Email::from_login(&login).unwrap(), password)
}

#[tokio::test]
#[ignore = "Requires a live backend project"]
async fn test_backend_health() {
    client().health().await.unwrap();
}

#[tokio::test]
#[ignore = "Requires a live backend project"]
async fn test_wrong_password_rejected() {
    let (email, _) = admin_credentials();
    let err = client()
        .sign_in_with_password(&email, "definitely-not-the-password")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SupabaseError::Api { status: 400, .. } | SupabaseError::Unauthorized(_)
    ));
}

#[tokio::test]
#[ignore = "Requires a live backend project and admin credentials"]
async fn test_admin_reads() {
    let client = client();
    let (email, password) = admin_credentials();

    let session = client.sign_in_with_password(&email, &password).await.unwrap();
    let role = client
        .fetch_role(&session.access_token, session.user.id)
        .await
        .unwrap();
    assert_eq!(role, Some(UserRole::Admin));

    let gateway = client.for_user(&session.access_token);
    let customers = gateway.list_customers().await.unwrap();
    let total = gateway.count_customers().await.unwrap();
    assert_eq!(customers.len() as u64, total);
    let active = gateway.count_active_deliveries().await.unwrap();
    assert!(active <= gateway.count_deliveries().await.unwrap());

    client.sign_out(&session.access_token).await.unwrap();
}
