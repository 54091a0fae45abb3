mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{FaultyEnvironment, TestEnvironment};
use ledger_mock::{MockChain, DEFAULT_ACCOUNTS};
use ledger_wallet::storage::{Storage, TRANSACTION_COUNT_KEY};
use ledger_wallet::{FlowState, FormState, TransactionStore, WalletError};
use transfer_ledger::{Address, ConfirmationPolicy, LedgerError, Wallet};

const RECEIVER: &str = "0xABC0000000000000000000000000000000000ABC";

#[tokio::test]
async fn test_connect_without_wallet_stays_disconnected() {
    common::init_logging();
    let dir = tempfile::TempDir::new().unwrap();
    let store: TransactionStore<MockChain> = TransactionStore::new(
        Wallet::Unavailable,
        transfer_ledger::DEFAULT_CONTRACT_ADDRESS,
        Storage::new_with_base_dir(dir.path().to_path_buf()),
    );

    let err = store.connect_wallet().await.unwrap_err();
    assert!(matches!(err, WalletError::Ledger(LedgerError::WalletUnavailable)));
    assert_eq!(err.kind(), "environment_missing");

    assert_eq!(store.session().current_account, None);
    assert_eq!(store.flow(), FlowState::Disconnected);

    assert!(store.initialize().await.is_err());
}

#[tokio::test]
async fn test_rejected_connection_is_distinguishable() {
    let env = TestEnvironment::new().unwrap();
    env.chain.set_reject_authorization(true);

    let err = env.store.connect_wallet().await.unwrap_err();
    assert_eq!(err.kind(), "user_rejected");
    assert_eq!(env.store.session().current_account, None);
}

#[tokio::test]
async fn test_initialize_without_authorization_does_not_prompt() {
    let env = TestEnvironment::new().unwrap();

    assert_eq!(env.store.initialize().await.unwrap(), None);
    assert_eq!(env.store.flow(), FlowState::Disconnected);
    assert!(!env.chain.is_authorized());
}

#[tokio::test]
async fn test_connect_binds_first_account_and_notifies() {
    let env = TestEnvironment::new().unwrap();
    let mut updates = env.store.subscribe();

    let account = env.store.connect_wallet().await.unwrap();
    assert_eq!(account, DEFAULT_ACCOUNTS[0]);

    assert!(updates.has_changed().unwrap());
    let session = updates.borrow_and_update().clone();
    assert_eq!(session.current_account, Some(account));
    assert_eq!(session.transaction_count, Some(0));
    assert_eq!(env.store.flow(), FlowState::Connected);
}

#[tokio::test]
async fn test_submit_records_single_payable_transfer() {
    let env = TestEnvironment::new().unwrap();
    let account = env.store.connect_wallet().await.unwrap();

    env.fill_form(RECEIVER, "0.01", "hello", "hi");
    let receipt = env.store.submit().await.unwrap();
    assert_eq!(receipt.transaction_count, Some(1));

    // One wallet request carries the value to the ledger contract
    let sent = env.chain.sent_transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, account);
    assert_eq!(sent[0].to, env.store.contract_address());
    assert_eq!(sent[0].value.as_deref(), Some("10000000000000000"));

    let receiver: Address = RECEIVER.parse().unwrap();
    let session = env.store.session();
    assert_eq!(session.transaction_count, Some(1));
    assert!(!session.is_loading);

    let entry = session.transactions.last().unwrap();
    assert_eq!(entry.sender, account);
    assert_eq!(entry.receiver, receiver);
    assert_eq!(entry.message, "hi");
    assert_eq!(entry.keyword, "hello");
    assert_eq!(entry.display_amount(), "0.01");

    assert_eq!(env.chain.balance(receiver).to_string(), "10000000000000000");
    assert_eq!(env.store.form(), FormState::default());
}

#[tokio::test]
async fn test_submit_requires_connection_and_valid_form() {
    let env = TestEnvironment::new().unwrap();
    env.fill_form(RECEIVER, "0.01", "hello", "hi");
    assert!(matches!(
        env.store.submit().await,
        Err(WalletError::NotConnected)
    ));

    env.store.connect_wallet().await.unwrap();
    env.fill_form(RECEIVER, "not a number", "hello", "hi");
    let err = env.store.submit().await.unwrap_err();
    assert_eq!(err.kind(), "invalid_input");

    assert!(env.chain.sent_transactions().is_empty());
    assert_eq!(env.store.flow(), FlowState::Connected);
    // The form is kept for correction
    assert_eq!(env.store.form().amount, "not a number");
}

#[tokio::test]
async fn test_failed_submit_clears_loading_and_keeps_form() {
    let env = TestEnvironment::new().unwrap();
    env.store.connect_wallet().await.unwrap();

    // More than the funded balance
    env.fill_form(RECEIVER, "20000", "hello", "hi");
    let err = env.store.submit().await.unwrap_err();
    assert_eq!(err.kind(), "chain");

    let session = env.store.session();
    assert!(!session.is_loading);
    assert!(session.transactions.is_empty());
    assert_eq!(env.store.form().amount, "20000");
    assert!(env.chain.entries().is_empty());
}

#[tokio::test]
async fn test_refresh_is_idempotent() {
    let env = TestEnvironment::new().unwrap();
    env.store.connect_wallet().await.unwrap();

    env.fill_form(RECEIVER, "0.5", "cats", "first");
    env.store.submit().await.unwrap();
    env.fill_form(&DEFAULT_ACCOUNTS[1].to_string(), "1", "dogs", "second");
    env.store.submit().await.unwrap();

    let first = env.store.refresh_entries().await.unwrap();
    let second = env.store.refresh_entries().await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
    assert_eq!(env.store.session().transactions, second);

    assert_eq!(env.store.refresh().await.unwrap(), 2);
    assert_eq!(env.store.session().transactions, first);
}

#[tokio::test]
async fn test_fresh_session_persists_contract_count() {
    let env = TestEnvironment::new().unwrap();
    env.store.connect_wallet().await.unwrap();
    env.fill_form(RECEIVER, "0.01", "hello", "hi");
    env.store.submit().await.unwrap();

    // A stale hint is shown until the ledger is read again
    env.storage().set(TRANSACTION_COUNT_KEY, "7").unwrap();
    let reloaded = env.reopen();
    assert_eq!(reloaded.session().transaction_count, Some(7));

    let account = reloaded.initialize().await.unwrap();
    assert_eq!(account, Some(DEFAULT_ACCOUNTS[0]));

    let contract_count = env.chain.entries().len() as u64;
    assert_eq!(reloaded.session().transaction_count, Some(contract_count));
    assert_eq!(
        env.storage().get(TRANSACTION_COUNT_KEY).unwrap(),
        Some(contract_count.to_string())
    );
    assert_eq!(reloaded.session().transactions.len(), 1);
}

#[tokio::test]
async fn test_unwritable_count_cache_does_not_block_reads() {
    let env = TestEnvironment::new().unwrap();
    env.fill_form(RECEIVER, "0.01", "hello", "hi");
    env.store.connect_wallet().await.unwrap();
    env.store.submit().await.unwrap();

    std::fs::write(env.temp_dir.path().join("local_storage.json"), "garbage").unwrap();

    let reloaded = env.reopen();
    assert_eq!(reloaded.session().transaction_count, None);
    let account = reloaded.connect_wallet().await.unwrap();
    assert_eq!(account, DEFAULT_ACCOUNTS[0]);

    let session = reloaded.session();
    assert_eq!(session.transaction_count, Some(1));
    assert_eq!(session.transactions.len(), 1);
    assert_eq!(reloaded.refresh().await.unwrap(), 1);
}

#[tokio::test]
async fn test_confirmed_submit_succeeds_when_reread_fails() {
    let env = FaultyEnvironment::new(common::fast_confirmation()).unwrap();
    env.store.connect_wallet().await.unwrap();
    env.fill_form(RECEIVER, "0.01", "hello", "hi");

    env.node.faults.fail_calls.store(true, Ordering::SeqCst);
    let receipt = env.store.submit().await.unwrap();
    assert_eq!(receipt.transaction_count, None);

    // The transfer is final, so nothing is left to resubmit
    assert_eq!(env.node.chain.entries().len(), 1);
    assert_eq!(env.store.form(), FormState::default());
    assert!(!env.store.session().is_loading);
    assert_eq!(env.store.flow(), FlowState::Connected);

    env.node.faults.fail_calls.store(false, Ordering::SeqCst);
    assert_eq!(env.store.refresh().await.unwrap(), 1);
}

#[tokio::test]
async fn test_connect_binds_account_when_ledger_unreadable() {
    let env = FaultyEnvironment::new(common::fast_confirmation()).unwrap();
    env.node.faults.fail_calls.store(true, Ordering::SeqCst);

    let account = env.store.connect_wallet().await.unwrap();
    assert_eq!(account, DEFAULT_ACCOUNTS[0]);
    assert_eq!(env.store.flow(), FlowState::Connected);
    assert_eq!(env.store.session().current_account, Some(account));
    assert_eq!(env.store.session().transaction_count, None);

    let err = env.store.refresh().await.unwrap_err();
    assert_eq!(err.kind(), "transport");

    env.node.faults.fail_calls.store(false, Ordering::SeqCst);
    assert_eq!(env.store.initialize().await.unwrap(), Some(account));
    assert_eq!(env.store.session().transaction_count, Some(0));
}

#[tokio::test]
async fn test_second_submit_while_pending_is_busy() {
    let env = FaultyEnvironment::new(ConfirmationPolicy {
        poll_interval: Duration::from_millis(10),
        max_attempts: Some(1000),
    })
    .unwrap();
    env.store.connect_wallet().await.unwrap();
    env.fill_form(RECEIVER, "0.01", "hello", "hi");
    env.node.faults.hold_receipts.store(true, Ordering::SeqCst);

    let mut session = env.store.subscribe();
    let second = async {
        tokio::time::timeout(Duration::from_secs(5), session.wait_for(|s| s.is_loading))
            .await
            .expect("first submit never started waiting")
            .unwrap();
        assert_eq!(env.store.flow(), FlowState::Submitting);

        let busy = env.store.submit().await;
        env.node.faults.hold_receipts.store(false, Ordering::SeqCst);
        busy
    };
    let (first, second) = tokio::join!(env.store.submit(), second);

    assert!(matches!(second, Err(WalletError::Busy)));
    assert_eq!(first.unwrap().transaction_count, Some(1));
    assert_eq!(env.node.chain.sent_transactions().len(), 1);
    assert_eq!(env.store.flow(), FlowState::Connected);

    // The in-flight flag is released after an error too
    env.fill_form(RECEIVER, "not a number", "hello", "hi");
    assert!(env.store.submit().await.is_err());
    env.fill_form(RECEIVER, "0.02", "hello", "again");
    assert_eq!(env.store.submit().await.unwrap().transaction_count, Some(2));
}

#[tokio::test]
async fn test_reverted_submit_clears_loading_and_keeps_form() {
    let env = FaultyEnvironment::new(common::fast_confirmation()).unwrap();
    env.store.connect_wallet().await.unwrap();
    env.fill_form(RECEIVER, "0.01", "hello", "hi");
    env.node.faults.revert_receipts.store(true, Ordering::SeqCst);

    let err = env.store.submit().await.unwrap_err();
    assert!(matches!(
        err,
        WalletError::Ledger(LedgerError::Reverted { .. })
    ));
    assert_eq!(err.kind(), "chain");

    assert!(!env.store.session().is_loading);
    assert_eq!(env.store.form().amount, "0.01");
    assert_eq!(env.store.flow(), FlowState::Connected);
}

#[tokio::test]
async fn test_unconfirmed_submit_times_out_and_keeps_form() {
    let env = FaultyEnvironment::new(ConfirmationPolicy {
        poll_interval: Duration::from_millis(5),
        max_attempts: Some(3),
    })
    .unwrap();
    env.store.connect_wallet().await.unwrap();
    env.fill_form(RECEIVER, "0.01", "hello", "hi");
    env.node.faults.hold_receipts.store(true, Ordering::SeqCst);

    let err = env.store.submit().await.unwrap_err();
    match err {
        WalletError::Ledger(LedgerError::ConfirmationTimeout { attempts, .. }) => {
            assert_eq!(attempts, 3)
        }
        other => panic!("expected a confirmation timeout, got {:?}", other),
    }

    assert!(!env.store.session().is_loading);
    assert_eq!(env.store.form().message, "hi");
    assert_eq!(env.store.flow(), FlowState::Connected);
}
