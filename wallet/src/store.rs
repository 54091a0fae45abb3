//! Transaction store
//!
//! Holds the session (connected account, loading flag, entry count, entry
//! list) and the transfer form, and runs the wallet and ledger operations
//! that change them. Subscribers watch the session through a
//! [`tokio::sync::watch`] channel.
//!
//! Every operation returns a typed result and logs its failure. After each
//! mutating action the store calls [`TransactionStore::refresh`] itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use transfer_ledger::{
    parse_amount, Address, ConfirmationPolicy, Entry, HttpProvider, LedgerContract, LedgerError,
    Wallet, WalletProvider, B256, U256,
};

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::storage::{Storage, TRANSACTION_COUNT_KEY};

/// Derived session cache; everything here can be re-read from the chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub current_account: Option<Address>,
    pub is_loading: bool,
    /// Starts from the persisted hint until the first refresh
    pub transaction_count: Option<u64>,
    /// Full snapshot from the last read
    pub transactions: Vec<Entry>,
}

/// Free-text transfer form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub address_to: String,
    pub amount: String,
    pub keyword: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    AddressTo,
    Amount,
    Keyword,
    Message,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    Disconnected,
    Connected,
    Submitting,
}

/// Result of a confirmed submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitReceipt {
    pub transaction_hash: B256,
    /// Entry count read back after confirmation, if the read succeeded
    pub transaction_count: Option<u64>,
}

/// Form contents after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub receiver: Address,
    pub amount: U256,
    pub message: String,
    pub keyword: String,
}

impl FormState {
    fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::AddressTo => &mut self.address_to,
            FormField::Amount => &mut self.amount,
            FormField::Keyword => &mut self.keyword,
            FormField::Message => &mut self.message,
        }
    }

    /// All four fields non-empty, a valid receiver and a positive amount
    pub fn validate(&self) -> Result<TransferRequest, WalletError> {
        let fields = [
            ("addressTo", &self.address_to),
            ("amount", &self.amount),
            ("keyword", &self.keyword),
            ("message", &self.message),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(WalletError::InvalidForm(format!("{} is required", name)));
        }

        let receiver = self
            .address_to
            .trim()
            .parse::<Address>()
            .map_err(|e| WalletError::InvalidForm(format!("addressTo: {}", e)))?;
        let amount = parse_amount(&self.amount)
            .map_err(|e| WalletError::InvalidForm(format!("amount: {}", e)))?;

        Ok(TransferRequest {
            receiver,
            amount,
            message: self.message.clone(),
            keyword: self.keyword.clone(),
        })
    }
}

/// Clears the in-flight flag however `submit` exits
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct TransactionStore<P> {
    wallet: Wallet<P>,
    contract_address: Address,
    confirmation: ConfirmationPolicy,
    storage: Storage,
    session: watch::Sender<SessionState>,
    form: RwLock<FormState>,
    submitting: AtomicBool,
}

impl TransactionStore<HttpProvider> {
    /// Store over the wallet endpoint named in the configuration
    pub fn from_config(config: &WalletConfig) -> Self {
        let wallet = Wallet::from_option(config.wallet_rpc_url.as_deref().map(HttpProvider::new));
        Self::new(
            wallet,
            config.contract_address,
            Storage::new_with_base_dir(config.storage_path.clone()),
        )
        .with_confirmation(config.confirmation.clone())
    }
}

impl<P: WalletProvider> TransactionStore<P> {
    /// Create a store; the session starts from the persisted count hint
    pub fn new(wallet: Wallet<P>, contract_address: Address, storage: Storage) -> Self {
        let transaction_count = match storage.get(TRANSACTION_COUNT_KEY) {
            Ok(Some(raw)) => raw.parse::<u64>().ok(),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Could not read persisted transaction count: {}", e);
                None
            }
        };

        let (session, _) = watch::channel(SessionState {
            transaction_count,
            ..Default::default()
        });

        Self {
            wallet,
            contract_address,
            confirmation: ConfirmationPolicy::default(),
            storage,
            session,
            form: RwLock::new(FormState::default()),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn with_confirmation(mut self, policy: ConfirmationPolicy) -> Self {
        self.confirmation = policy;
        self
    }

    pub fn wallet(&self) -> &Wallet<P> {
        &self.wallet
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    /// Session snapshot
    pub fn session(&self) -> SessionState {
        self.session.borrow().clone()
    }

    /// Receive every session change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    /// Form snapshot
    pub fn form(&self) -> FormState {
        self.read_form().clone()
    }

    pub fn flow(&self) -> FlowState {
        let connected = self.session.borrow().current_account.is_some();
        if !connected {
            FlowState::Disconnected
        } else if self.submitting.load(Ordering::SeqCst) {
            FlowState::Submitting
        } else {
            FlowState::Connected
        }
    }

    /// Pick up an already-authorized account without prompting
    ///
    /// When one is found it is bound and the ledger is read.
    pub async fn initialize(&self) -> Result<Option<Address>, WalletError> {
        self.initialize_inner()
            .await
            .inspect_err(|e| log::error!("Session initialization failed: {}", e))
    }

    async fn initialize_inner(&self) -> Result<Option<Address>, WalletError> {
        if !self.wallet.is_available() {
            return Err(LedgerError::WalletUnavailable.into());
        }

        let accounts = self.wallet.authorized_accounts().await?;
        let Some(account) = accounts.first().copied() else {
            log::info!("No authorized accounts found");
            return Ok(None);
        };

        self.bind_account(account);
        self.refresh_after_bind().await;
        Ok(Some(account))
    }

    /// Prompt the wallet for access and bind the first account
    ///
    /// On rejection or a missing wallet the session stays disconnected. Once
    /// an account is bound the call succeeds; a failed ledger read is logged
    /// and left for the next refresh.
    pub async fn connect_wallet(&self) -> Result<Address, WalletError> {
        self.connect_inner()
            .await
            .inspect_err(|e| log::error!("Wallet connection failed: {}", e))
    }

    async fn connect_inner(&self) -> Result<Address, WalletError> {
        let accounts = self.wallet.request_accounts().await?;
        let account = accounts
            .first()
            .copied()
            .ok_or(WalletError::Ledger(LedgerError::NoSigner))?;

        self.bind_account(account);
        self.refresh_after_bind().await;
        Ok(account)
    }

    /// Edit one form field
    pub fn handle_change(&self, field: FormField, value: impl Into<String>) {
        *self.form_mut().field_mut(field) = value.into();
    }

    /// Record the form's transfer in the ledger and wait for it
    ///
    /// The value travels with the ledger call itself. `is_loading` is set
    /// while waiting for confirmation. Once confirmed the transfer is final:
    /// the form is cleared and the call succeeds even if re-reading the
    /// ledger fails, in which case `transaction_count` may be `None`.
    pub async fn submit(&self) -> Result<SubmitReceipt, WalletError> {
        self.submit_inner()
            .await
            .inspect_err(|e| log::error!("Transfer submission failed: {}", e))
    }

    async fn submit_inner(&self) -> Result<SubmitReceipt, WalletError> {
        let connected = self.session.borrow().current_account.is_some();
        if !connected {
            return Err(WalletError::NotConnected);
        }
        if self.submitting.swap(true, Ordering::SeqCst) {
            return Err(WalletError::Busy);
        }
        let _guard = SubmitGuard(&self.submitting);

        let request = self.form().validate()?;

        let ledger = LedgerContract::create(&self.wallet, self.contract_address).await?;
        let pending = ledger
            .append(
                request.receiver,
                request.amount,
                &request.message,
                &request.keyword,
            )
            .await?;
        let transaction_hash = pending.hash();

        self.set_loading(true);
        log::info!("Loading - {}", transaction_hash);
        let confirmed = pending.wait_for_confirmation(&self.confirmation).await;
        self.set_loading(false);
        confirmed?;
        log::info!("Success - {}", transaction_hash);

        *self.form_mut() = FormState::default();
        let transaction_count = match self.refresh().await {
            Ok(count) => Some(count),
            Err(_) => ledger.count().await.ok(),
        };

        Ok(SubmitReceipt {
            transaction_hash,
            transaction_count,
        })
    }

    /// Re-read the entry count (persisting it) and the full entry list
    pub async fn refresh(&self) -> Result<u64, WalletError> {
        self.refresh_inner()
            .await
            .inspect_err(|e| log::error!("Ledger refresh failed: {}", e))
    }

    async fn refresh_inner(&self) -> Result<u64, WalletError> {
        let ledger = LedgerContract::create(&self.wallet, self.contract_address).await?;

        let count = ledger.count().await?;
        if let Err(e) = self.storage.set(TRANSACTION_COUNT_KEY, &count.to_string()) {
            log::warn!("Could not persist transaction count: {}", e);
        }
        self.session
            .send_modify(|session| session.transaction_count = Some(count));

        let entries = ledger.list_all().await?;
        log::debug!("Loaded {} ledger entries", entries.len());
        self.session
            .send_modify(|session| session.transactions = entries);

        Ok(count)
    }

    /// Replace the entry list from a fresh full read
    pub async fn refresh_entries(&self) -> Result<Vec<Entry>, WalletError> {
        let result: Result<Vec<Entry>, WalletError> = async {
            let ledger = LedgerContract::create(&self.wallet, self.contract_address).await?;
            Ok(ledger.list_all().await?)
        }
        .await;

        let entries = result.inspect_err(|e| log::error!("Entry refresh failed: {}", e))?;
        let snapshot = entries.clone();
        self.session
            .send_modify(|session| session.transactions = snapshot);
        Ok(entries)
    }

    /// The refresh logs its own failure
    async fn refresh_after_bind(&self) {
        if self.refresh().await.is_err() {
            log::warn!("Account bound but the ledger could not be read yet");
        }
    }

    fn bind_account(&self, account: Address) {
        log::info!("Connected account {}", account);
        self.session
            .send_modify(|session| session.current_account = Some(account));
    }

    fn set_loading(&self, is_loading: bool) {
        self.session
            .send_modify(|session| session.is_loading = is_loading);
    }

    fn read_form(&self) -> RwLockReadGuard<'_, FormState> {
        self.form.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn form_mut(&self) -> RwLockWriteGuard<'_, FormState> {
        self.form.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
