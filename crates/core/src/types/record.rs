//! Transaction history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, TxStatus};

/// Result of a settled checkout, appended to the session-local history.
///
/// The history is append-only and lives for the session; nothing is
/// persisted to durable storage. A record is only created from an actual
/// receipt, so its `status` always reflects what the chain reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Hash of the broadcast transaction.
    pub tx_hash: String,
    /// Hash of the containing block, if the receipt carried one.
    pub block_hash: Option<String>,
    /// Number of the containing block, if the receipt carried one.
    pub block_number: Option<u64>,
    /// Sender account.
    pub from: String,
    /// Recipient (the marketplace contract).
    pub to: Option<String>,
    /// Gas consumed by this transaction.
    pub gas_used: u64,
    /// Cumulative gas consumed in the block up to this transaction.
    pub cumulative_gas_used: u64,
    /// Receipt status.
    pub status: TxStatus,
    /// When the receipt was observed.
    pub time: DateTime<Utc>,
    /// Identifiers of the purchased products.
    pub product_ids: Vec<ProductId>,
}
