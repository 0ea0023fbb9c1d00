//! NextGCore ASN.1 Codec Library
//!
//! This crate provides ASN.1 PER encoding/decoding for the NGAP protocol.
//!
//! # Modules
//!
//! - `per` - Packed Encoding Rules (APER) encoder/decoder
//! - `ngap` - NGAP PDU envelope and common IEs (3GPP TS 38.413)

pub mod ngap; // NGAP codec (directory module)
pub mod per; // Packed Encoding Rules

#[cfg(test)]
mod property_tests;

// Re-export commonly used types
pub use per::{AperDecode, AperDecoder, AperEncode, AperEncoder, Constraint, PerError, PerResult};
