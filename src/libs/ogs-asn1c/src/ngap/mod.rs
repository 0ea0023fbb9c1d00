//! NGAP (3GPP TS 38.413) PDU envelope
//!
//! The PDU, its ProtocolIE container and the small IEs every message shares.
//! Structured IEs live in the `ogs-ngap` crate.

pub mod cause;
pub mod ies;
pub mod pdu;
pub mod types;

pub use cause::*;
pub use ies::*;
pub use pdu::*;
pub use types::*;
