mod common;

use ledger_mock::{MockChain, DEFAULT_ACCOUNTS};
use transfer_ledger::{
    parse_amount, HttpProvider, LedgerContract, LedgerError, Wallet, WalletProvider,
    TRANSFER_GAS_LIMIT,
};

#[tokio::test]
async fn test_send_value_wire_format() {
    common::init_logging();
    let chain = MockChain::default();
    chain.authorize();
    let wallet = Wallet::Available(chain.clone());
    let [from, to] = DEFAULT_ACCOUNTS;
    let before = chain.balance(to);

    let amount = parse_amount("0.01").unwrap();
    wallet.send_value(from, to, amount, TRANSFER_GAS_LIMIT).await.unwrap();

    let sent = chain.sent_transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].gas.as_deref(), Some("0x5208"));
    assert_eq!(sent[0].value.as_deref(), Some("10000000000000000"));
    assert_eq!(chain.balance(to), before + amount);
}

#[tokio::test]
async fn test_http_provider_against_mock_node() {
    common::init_logging();
    let chain = MockChain::default();
    let url = common::spawn_mock_node(chain.clone()).await.unwrap();
    let wallet = Wallet::Available(HttpProvider::new(url));

    let chain_id = wallet
        .provider()
        .unwrap()
        .request("eth_chainId", serde_json::json!([]))
        .await
        .unwrap();
    assert_eq!(chain_id, "0x7a69");

    assert!(wallet.authorized_accounts().await.unwrap().is_empty());
    let accounts = wallet.request_accounts().await.unwrap();
    assert_eq!(accounts, DEFAULT_ACCOUNTS.to_vec());

    let ledger = LedgerContract::create(&wallet, chain.contract_address())
        .await
        .unwrap();
    assert_eq!(ledger.signer(), DEFAULT_ACCOUNTS[0]);

    let pending = ledger
        .append(DEFAULT_ACCOUNTS[1], parse_amount("2").unwrap(), "rent", "house")
        .await
        .unwrap();
    pending
        .wait_for_confirmation(&common::fast_confirmation())
        .await
        .unwrap();

    assert_eq!(ledger.count().await.unwrap(), 1);
    let entries = ledger.list_all().await.unwrap();
    assert_eq!(entries[0].keyword, "house");
    assert_eq!(entries[0].display_amount(), "2.0");
}

#[tokio::test]
async fn test_http_provider_maps_rejection_and_unreachable_node() {
    common::init_logging();
    let chain = MockChain::default();
    chain.set_reject_authorization(true);
    let url = common::spawn_mock_node(chain).await.unwrap();

    let err = Wallet::Available(HttpProvider::new(url))
        .request_accounts()
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::UserRejected(_)));

    // Nothing listens on port 9 locally
    let err = Wallet::Available(HttpProvider::new("http://127.0.0.1:9"))
        .authorized_accounts()
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Transport(_)));
}

#[tokio::test]
async fn test_contract_requires_authorized_signer() {
    let chain = MockChain::default();
    let wallet = Wallet::Available(chain.clone());

    let err = LedgerContract::create(&wallet, chain.contract_address())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NoSigner));
}
