//! AMF Event Definitions
//!
//! What crosses the boundary of the NGAP core: decoded inbound messages,
//! outbound messages tagged with their destination association, timer steps,
//! and indications for the layers above.

use std::time::Duration;

use bytes::Bytes;
use ogs_asn1c::ngap::NasPdu;
use ogs_ngap::{NgapMessage, NgapResult};

use crate::context::AssocId;

/// An inbound message after decoding, with the association it arrived on
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    pub assoc_id: AssocId,
    pub message: NgapMessage,
    /// Encoded form as received
    pub raw: Bytes,
}

impl DecodedMessage {
    /// Wrap a message that did not come off the wire; `raw` is produced by
    /// encoding it
    pub fn from_message(assoc_id: AssocId, message: NgapMessage) -> NgapResult<Self> {
        let raw = Bytes::from(message.encode()?);
        Ok(Self {
            assoc_id,
            message,
            raw,
        })
    }
}

/// A message for the transport layer to send on `assoc_id`
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub assoc_id: AssocId,
    pub message: NgapMessage,
}

impl OutboundMessage {
    pub fn new(assoc_id: AssocId, message: impl Into<NgapMessage>) -> Self {
        Self {
            assoc_id,
            message: message.into(),
        }
    }

    pub fn encode(&self) -> NgapResult<Bytes> {
        Ok(Bytes::from(self.message.encode()?))
    }
}

/// Handover steps guarded by a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandoverStep {
    /// Handover Request sent, waiting for the target's answer
    Preparation,
    /// Handover Command sent, waiting for Handover Notify
    Completion,
}

impl HandoverStep {
    pub fn name(&self) -> &'static str {
        match self {
            HandoverStep::Preparation => "TNGRELOCprep",
            HandoverStep::Completion => "TNGRELOCoverall",
        }
    }
}

/// Indications from the NGAP core to the layers above it
#[derive(Debug, Clone, PartialEq)]
pub enum AmfIndication {
    /// NAS PDU received from the UE
    Nas {
        amf_ue_ngap_id: u64,
        nas_pdu: NasPdu,
    },
    /// Arm the timer for `step`; on expiry call `handle_timeout`
    StartTimer {
        amf_ue_ngap_id: u64,
        step: HandoverStep,
        duration: Duration,
    },
    StopTimer {
        amf_ue_ngap_id: u64,
        step: HandoverStep,
    },
    /// The UE context is gone
    ContextReleased { amf_ue_ngap_id: u64 },
}

impl AmfIndication {
    pub fn name(&self) -> &'static str {
        match self {
            AmfIndication::Nas { .. } => "NAS",
            AmfIndication::StartTimer { .. } => "START_TIMER",
            AmfIndication::StopTimer { .. } => "STOP_TIMER",
            AmfIndication::ContextReleased { .. } => "CONTEXT_RELEASED",
        }
    }
}
