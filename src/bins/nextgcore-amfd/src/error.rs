//! AMF Error Types

use ogs_ngap::NgapError;
use thiserror::Error;

use crate::context::AssocId;

/// Failures of the UE context registry
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The AMF-UE-NGAP-ID is already bound to a different context
    #[error("AMF-UE-NGAP-ID {0} is already bound to another context")]
    DuplicateAssignment(u64),

    /// The context already carries a different AMF-UE-NGAP-ID
    #[error("context already has AMF-UE-NGAP-ID {current}, refusing {requested}")]
    AlreadyAssigned { current: u64, requested: u64 },

    /// No context behind the given id
    #[error("no UE context for {0}")]
    NotFound(UeKey),
}

/// Id a lookup was made by, kept for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UeKey {
    AmfUeNgapId(u64),
    RanUeNgapId { assoc_id: AssocId, ran_ue_ngap_id: u32 },
}

impl std::fmt::Display for UeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UeKey::AmfUeNgapId(id) => write!(f, "amf_ue_ngap_id={id}"),
            UeKey::RanUeNgapId {
                assoc_id,
                ran_ue_ngap_id,
            } => write!(f, "assoc={assoc_id} ran_ue_ngap_id={ran_ue_ngap_id}"),
        }
    }
}

/// Errors surfaced by the AMF NGAP core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmfError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// A message or event arrived in a state that does not accept it
    #[error("Invalid transition: {event} in state {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },

    #[error("NGAP codec error: {0}")]
    Codec(#[from] NgapError),

    /// Association without a completed NG Setup
    #[error("Unknown association {0}")]
    UnknownAssociation(AssocId),

    /// Reroute requested for a UE whose Initial UE Message was not kept
    #[error("No Initial UE Message stored for amf_ue_ngap_id={0}")]
    NoInitialUeMessage(u64),
}

impl From<ogs_asn1c::PerError> for AmfError {
    fn from(e: ogs_asn1c::PerError) -> Self {
        AmfError::Codec(NgapError::Asn1(e))
    }
}

pub type AmfResult<T> = Result<T, AmfError>;
