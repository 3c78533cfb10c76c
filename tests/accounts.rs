//! Account lifecycle: registration, authentication, status changes, deletion
//! and admin seeding.

use std::sync::Arc;

use rust_decimal_macros::dec;
use stock_ledger::accounts::{AccountRepository, normalize_email, validate_profile};
use stock_ledger::credentials::{hash_password, verify_password};
use stock_ledger::error::LedgerError;
use stock_ledger::ledger::{Ledger, LedgerConfig};
use stock_ledger::persistence::{BlobStore, MemoryStore, USERS_KEY};
use stock_ledger::quotes::StaticQuoteSource;
use stock_ledger::types::account::{AccountRole, AccountStatus, NewAccount};
use stock_ledger::types::order::OrderSide;

async fn ledger_on(store: Arc<dyn BlobStore>) -> Ledger {
    Ledger::load(
        store,
        Arc::new(StaticQuoteSource::with_default_catalog()),
        LedgerConfig::default(),
    )
    .await
    .unwrap()
}

async fn fresh_ledger() -> Ledger {
    ledger_on(Arc::new(MemoryStore::new())).await
}

#[tokio::test]
async fn create_account_funds_and_persists() {
    let store = Arc::new(MemoryStore::new());
    let ledger = ledger_on(store.clone()).await;

    let account = ledger
        .create_account(NewAccount::new("  Alice@Example.com ", "Alice", "secret123"))
        .await
        .unwrap();

    assert_eq!(account.email, "alice@example.com");
    assert_eq!(account.name, "Alice");
    assert_eq!(account.status, AccountStatus::Active);
    assert_eq!(account.role, AccountRole::Trader);
    assert_eq!(account.cash_balance, dec!(100000));
    assert_eq!(account.total_invested, dec!(0));
    assert_eq!(account.login_count, 0);
    assert!(account.portfolio.is_empty());
    assert_ne!(account.password_hash, "secret123");
    assert!(verify_password("secret123", &account.password_hash));

    let blob = store.get(USERS_KEY).await.unwrap().unwrap();
    let persisted = AccountRepository::decode(&blob).unwrap();
    assert_eq!(persisted.find(account.id), Some(&account));
}

#[tokio::test]
async fn duplicate_email_is_case_insensitive() {
    let ledger = fresh_ledger().await;
    let bob = ledger
        .create_account(NewAccount::new("bob@example.com", "Bob", "secret123"))
        .await
        .unwrap();

    let err = ledger
        .create_account(NewAccount::new("BOB@example.com", "Other Bob", "secret456"))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::DuplicateEmail(e) if e == "bob@example.com"));

    let accounts = ledger.list_accounts().await;
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0], bob);
    assert_eq!(accounts[0].name, "Bob");
    assert_eq!(accounts[0].cash_balance, dec!(100000));
    assert!(verify_password("secret123", &accounts[0].password_hash));
}

#[tokio::test]
async fn invalid_profiles_are_rejected() {
    let ledger = fresh_ledger().await;

    for profile in [
        NewAccount::new("", "Name", "secret123"),
        NewAccount::new("not-an-email", "Name", "secret123"),
        NewAccount::new("a@b.com", "   ", "secret123"),
        NewAccount::new("a@b.com", "Name", "short"),
    ] {
        let err = ledger.create_account(profile).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidProfile(_)), "got {err:?}");
    }
    assert!(ledger.list_accounts().await.is_empty());
}

#[test]
fn validate_profile_accepts_minimum_password() {
    assert!(validate_profile(&NewAccount::new("c@d.io", "C", "123456")).is_ok());
    assert_eq!(normalize_email(" X@Y.Z "), "x@y.z");
}

#[tokio::test]
async fn authenticate_counts_logins() {
    let ledger = fresh_ledger().await;
    let created = ledger
        .create_account(NewAccount::new("carol@example.com", "Carol", "secret123"))
        .await
        .unwrap();

    let first = ledger
        .authenticate("CAROL@example.com", "secret123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.id, created.id);
    assert_eq!(first.login_count, 1);
    assert!(first.last_active >= created.last_active);

    let second = ledger
        .authenticate("carol@example.com", "secret123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.login_count, 2);
}

#[tokio::test]
async fn authenticate_rejects_bad_credentials() {
    let ledger = fresh_ledger().await;
    ledger
        .create_account(NewAccount::new("dave@example.com", "Dave", "secret123"))
        .await
        .unwrap();

    assert!(ledger.authenticate("dave@example.com", "wrong-pass").await.unwrap().is_none());
    assert!(ledger.authenticate("nobody@example.com", "secret123").await.unwrap().is_none());

    let account = &ledger.list_accounts().await[0];
    assert_eq!(account.login_count, 0);
}

#[tokio::test]
async fn set_status_and_delete() {
    let ledger = fresh_ledger().await;
    let account = ledger
        .create_account(NewAccount::new("erin@example.com", "Erin", "secret123"))
        .await
        .unwrap();
    ledger
        .settle_trade(account.id, "AAPL", OrderSide::Buy, 1)
        .await
        .unwrap();

    let blocked = ledger
        .set_account_status(account.id, AccountStatus::Blocked)
        .await
        .unwrap();
    assert_eq!(blocked.status, AccountStatus::Blocked);
    assert_eq!(
        ledger.get_account(account.id).await.unwrap().status,
        AccountStatus::Blocked
    );

    assert!(ledger.delete_account(account.id).await.unwrap());
    assert!(matches!(
        ledger.get_account(account.id).await,
        Err(LedgerError::AccountNotFound(_))
    ));
    // History outlives the account
    assert_eq!(ledger.get_transactions(account.id).await.len(), 1);

    assert!(!ledger.delete_account(account.id).await.unwrap());
    assert!(matches!(
        ledger
            .set_account_status(account.id, AccountStatus::Active)
            .await,
        Err(LedgerError::AccountNotFound(_))
    ));
}

#[tokio::test]
async fn seed_admin_only_into_empty_ledger() {
    let ledger = fresh_ledger().await;

    let admin = ledger
        .seed_admin("admin@example.com", "Admin", "admin-pass")
        .await
        .unwrap()
        .unwrap();
    assert!(admin.is_admin());

    let again = ledger
        .seed_admin("other-admin@example.com", "Admin 2", "admin-pass")
        .await
        .unwrap();
    assert!(again.is_none());
    assert_eq!(ledger.list_accounts().await.len(), 1);
}

#[test]
fn password_hash_round_trip() {
    let hash = hash_password("hunter22").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("hunter22", &hash));
    assert!(!verify_password("hunter23", &hash));
    assert!(!verify_password("hunter22", "not-a-phc-string"));
}
