//! # Meme Canvas Mint
//!
//! Everything between an exported meme and an on-chain collection.
//!
//! The `meme-canvas` binary only validates the mint form and writes
//! metadata. Receipt polling and the record store are library surface for
//! the hosting app, which owns the wallet and submits the transaction.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   validate   ┌────────────────┐
//! │  MintDraft   │─────────────▶│ ValidatedDraft │
//! └──────────────┘              └───────┬────────┘
//!                                       │ submit (wallet, out of crate)
//!                                       ▼
//! ┌──────────────┐   poll ×10   ┌────────────────┐
//! │ JsonRpcClient│◀─────────────│ ReceiptPoller  │
//! └──────────────┘              └───────┬────────┘
//!                                       │ success
//!                                       ▼
//!                               ┌────────────────┐
//!                               │  RecordStore   │
//!                               └────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod draft;
pub mod error;
pub mod metadata;
pub mod receipt;
pub mod records;

pub use draft::{validate_price, validate_supply, MintDraft, ValidatedDraft, Wei, MIN_SUPPLY};
pub use error::{MintError, MintResult, ValidationError};
pub use metadata::NftMetadata;
pub use receipt::{
    JsonRpcClient, PollConfig, ReceiptPoller, ReceiptSource, ReceiptStatus, SupplyStatus,
    TransactionReceipt,
};
pub use records::{
    record_created, record_purchase, MemoryRecordStore, NftRecord, RecordStore, UserRecord,
};

/// Default testnet RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://testnet-rpc.monad.xyz";

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
