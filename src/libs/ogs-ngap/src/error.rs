//! NGAP Error Types

use ogs_asn1c::ngap::{Criticality, PduKind, ProcedureCode};
use ogs_asn1c::PerError;
use thiserror::Error;

/// Errors that can occur during NGAP message processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NgapError {
    /// ASN.1 encoding/decoding error
    #[error("ASN.1 codec error: {0}")]
    Asn1(#[from] PerError),

    /// Missing mandatory IE
    #[error("Missing mandatory IE: {ie_name} (id={ie_id})")]
    MissingMandatoryIe { ie_name: &'static str, ie_id: u16 },

    /// An IE whose criticality is not `ignore` failed to decode
    #[error("IE {ie_name} (id={ie_id}, criticality={}) failed to decode: {source}", criticality.name())]
    CriticalityViolation {
        ie_name: &'static str,
        ie_id: u16,
        criticality: Criticality,
        source: PerError,
    },

    /// IE id not declared for the message, received with `reject` criticality
    #[error("Unknown IE id={id} in {message}")]
    UnknownIe { id: u16, message: &'static str },

    /// IE id appears more than once in one container
    #[error("Duplicate IE {ie_name} (id={ie_id})")]
    DuplicateIe { ie_name: &'static str, ie_id: u16 },

    /// PDU choice or procedure code does not match the expected message
    #[error("Unexpected message: expected {expected}, got {} procedure code {}", kind.name(), procedure_code.0)]
    UnexpectedMessage {
        expected: &'static str,
        kind: PduKind,
        procedure_code: ProcedureCode,
    },

    /// Invalid IE value
    #[error("Invalid IE value for {ie_name}: {reason}")]
    InvalidIeValue {
        ie_name: &'static str,
        reason: String,
    },

    /// Admitted and failed PDU session lists overlap or leave the request
    #[error("PDU session partition violation: {reason}")]
    PartitionViolation { reason: String },
}

pub type NgapResult<T> = Result<T, NgapError>;
