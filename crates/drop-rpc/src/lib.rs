//! [`claim_core::DropSdk`] for DropERC1155-style contracts over Ethereum
//! JSON-RPC, with allow-list proofs built from a local snapshot.

pub mod abi;
pub mod client;
pub mod merkle;
pub mod metadata;
pub mod rpc;
pub mod snapshot;

pub use client::{ClientOptions, DropClient};
pub use snapshot::Snapshot;
