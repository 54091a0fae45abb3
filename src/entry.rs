//! Ledger entries as recorded by the transfer ledger contract

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::units::format_amount;

/// One recorded transfer
///
/// Created only by the contract's append operation; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub sender: Address,
    pub receiver: Address,
    /// Amount in wei
    pub amount: U256,
    pub message: String,
    pub keyword: String,
    /// Block timestamp in seconds
    pub timestamp: u64,
}

impl Entry {
    /// Amount in ether for display ("0.01")
    pub fn display_amount(&self) -> String {
        format_amount(self.amount)
    }

    /// Timestamp as a local date-time string
    pub fn display_timestamp(&self) -> String {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|utc| {
                utc.with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| self.timestamp.to_string())
    }
}

/// Display projection of an [`Entry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryView {
    pub address_to: String,
    pub address_from: String,
    pub timestamp: String,
    pub message: String,
    pub keyword: String,
    pub amount: String,
}

impl From<&Entry> for EntryView {
    fn from(entry: &Entry) -> Self {
        Self {
            address_to: entry.receiver.to_string(),
            address_from: entry.sender.to_string(),
            timestamp: entry.display_timestamp(),
            message: entry.message.clone(),
            keyword: entry.keyword.clone(),
            amount: entry.display_amount(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn sample() -> Entry {
        Entry {
            sender: address!("1230000000000000000000000000000000000123"),
            receiver: address!("abc0000000000000000000000000000000000abc"),
            amount: U256::from(10_000_000_000_000_000u64),
            message: "hi".to_string(),
            keyword: "hello".to_string(),
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn test_view_formats_amount_and_addresses() {
        let entry = sample();
        let view = EntryView::from(&entry);
        assert_eq!(view.amount, "0.01");
        assert_eq!(view.message, "hi");
        assert_eq!(view.keyword, "hello");
        assert_eq!(view.address_from.parse::<Address>().unwrap(), entry.sender);
        assert_eq!(view.address_to.parse::<Address>().unwrap(), entry.receiver);
    }

    #[test]
    fn test_timestamp_is_formatted() {
        let view = EntryView::from(&sample());
        // 2023-11-14 in every timezone
        assert!(view.timestamp.starts_with("2023-11-1"));
        assert_eq!(view.timestamp.len(), "2023-11-14 22:13:20".len());
    }
}
