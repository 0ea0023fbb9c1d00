//! NextGCore NGAP Protocol Library
//!
//! This crate provides the IE codec and the message builder/parser for the
//! NGAP procedures an AMF runs toward gNBs (3GPP TS 38.413).
//!
//! # Architecture
//!
//! The library is layered on top of `ogs-asn1c` which provides raw ASN.1 APER
//! encoding/decoding and the PDU envelope. This crate adds:
//!
//! - **IE codec** (`ie`) - value types with their APER codecs, plus NAS-style TLVs
//! - **IE tables** (`table`) - per-message `(id, name, criticality, presence)` rows
//!   and the reader/writer that enforce them
//! - **Message types** (`msg`) - one struct per message kind
//! - **Builder** (`builder`) and **Parser** (`parser`) - bytes to typed messages and back
//!
//! # Supported Procedures
//!
//! - **Handover**: Preparation, Resource Allocation, Notification, Cancel (Section 8.4)
//! - **RAN Status Transfer**: Uplink and Downlink (Section 8.4.6, 8.4.7)
//! - **PDU Session Resource**: Setup, Modify, Release (Section 8.2)
//! - **Initial Context Setup** and **UE Radio Capability Info Indication** (Section 8.3.1, 8.14.1)
//! - **UE Context Release** (Section 8.3.3)
//! - **NG Setup** and **NG Reset** (Section 8.7)
//! - **NAS Transport**: Initial UE Message, Uplink/Downlink NAS Transport, Reroute NAS Request (Section 8.6)
//!
//! # Example
//!
//! ```no_run
//! use ogs_ngap::msg::DownlinkNasTransport;
//! use ogs_ngap::{builder, parser, NgapMessage};
//! use ogs_asn1c::ngap::NasPdu;
//!
//! let msg = DownlinkNasTransport {
//!     amf_ue_ngap_id: 1,
//!     ran_ue_ngap_id: 100,
//!     nas_pdu: NasPdu(vec![0x7e, 0x00, 0x56]),
//!     ue_ambr: None,
//!     allowed_nssai: None,
//! };
//! let bytes = builder::encode_message(&msg).unwrap();
//!
//! let decoded = parser::decode_ngap_message(&bytes).unwrap();
//! assert_eq!(decoded, NgapMessage::DownlinkNasTransport(msg));
//! ```

pub mod builder;
pub mod error;
pub mod ie;
pub mod msg;
pub mod parser;
pub mod table;

// Re-export key types for convenience
pub use builder::{encode_message, BuildIes};
pub use error::{NgapError, NgapResult};
pub use msg::NgapMessageType;
pub use parser::{decode_as, decode_ngap_message, NgapMessage, ParseIes};

#[cfg(test)]
mod property_tests;
