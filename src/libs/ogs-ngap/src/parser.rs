//! NGAP Message Parsers
//!
//! Decoding runs in one place for every message kind: the PDU choice and
//! procedure code select the kind, `IeReader::collect` applies the kind's
//! table, and the kind's `ParseIes` impl pulls out typed fields.

use ogs_asn1c::ngap::{
    AmfUeNgapId, NgapPdu, ProcedureMessage, ProtocolIeId, RanUeNgapId, RelativeAmfCapacity,
};
use ogs_asn1c::per::{AperDecode, AperDecoder};

use crate::builder::{build_pdu, encode_pdu};
use crate::error::{NgapError, NgapResult};
use crate::ie::UeContextRequest;
use crate::msg::*;
use crate::table::{IeReader, MessageSpec};

/// A message kind that can be read back from its IEs
pub trait ParseIes: NgapMessageType {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self>;
}

fn parse_message<T: ParseIes>(message: &ProcedureMessage) -> NgapResult<T> {
    let reader = IeReader::collect(T::SPEC, &message.value)?;
    T::read_ies(&reader)
}

fn read_ue_ids(reader: &IeReader<'_>) -> NgapResult<(u64, u32)> {
    let amf = reader.require::<AmfUeNgapId>(ProtocolIeId::AMF_UE_NGAP_ID)?;
    let ran = reader.require::<RanUeNgapId>(ProtocolIeId::RAN_UE_NGAP_ID)?;
    Ok((amf.0, ran.0))
}

/// Decode the PDU envelope only
pub fn decode_pdu(data: &[u8]) -> NgapResult<NgapPdu> {
    let mut decoder = AperDecoder::new(data);
    Ok(NgapPdu::decode_aper(&mut decoder)?)
}

/// Decode bytes that must hold a `T`
pub fn decode_as<T: ParseIes>(data: &[u8]) -> NgapResult<T> {
    let pdu = decode_pdu(data)?;
    if !T::SPEC.matches(pdu.kind(), pdu.procedure_code()) {
        return Err(NgapError::UnexpectedMessage {
            expected: T::SPEC.name,
            kind: pdu.kind(),
            procedure_code: pdu.procedure_code(),
        });
    }
    parse_message(pdu.message())
}

/// Decode an NGAP PDU from APER bytes into a high-level NgapMessage
pub fn decode_ngap_message(data: &[u8]) -> NgapResult<NgapMessage> {
    decode_ngap_pdu_raw(&decode_pdu(data)?)
}

macro_rules! ngap_messages {
    ($($variant:ident),* $(,)?) => {
        /// Decoded NGAP message - discriminated union of all supported message types
        #[derive(Debug, Clone, PartialEq)]
        pub enum NgapMessage {
            $($variant($variant),)*
        }

        $(
            impl From<$variant> for NgapMessage {
                fn from(msg: $variant) -> Self {
                    NgapMessage::$variant(msg)
                }
            }
        )*

        impl NgapMessage {
            pub fn spec(&self) -> &'static MessageSpec {
                match self {
                    $(NgapMessage::$variant(_) => $variant::SPEC,)*
                }
            }

            pub fn to_pdu(&self) -> NgapResult<NgapPdu> {
                match self {
                    $(NgapMessage::$variant(msg) => build_pdu(msg),)*
                }
            }
        }

        /// Decode an already-decoded PDU envelope into a typed message
        pub fn decode_ngap_pdu_raw(pdu: &NgapPdu) -> NgapResult<NgapMessage> {
            let kind = pdu.kind();
            let message = pdu.message();
            $(
                if $variant::SPEC.matches(kind, message.procedure_code) {
                    return parse_message::<$variant>(message).map(NgapMessage::$variant);
                }
            )*
            Err(NgapError::UnexpectedMessage {
                expected: "a supported NGAP message",
                kind,
                procedure_code: message.procedure_code,
            })
        }
    };
}

ngap_messages!(
    HandoverRequired,
    HandoverCommand,
    HandoverPreparationFailure,
    HandoverRequest,
    HandoverRequestAcknowledge,
    HandoverFailure,
    HandoverNotify,
    HandoverCancel,
    HandoverCancelAcknowledge,
    UplinkRanStatusTransfer,
    DownlinkRanStatusTransfer,
    PduSessionResourceSetupRequest,
    PduSessionResourceSetupResponse,
    PduSessionResourceModifyRequest,
    PduSessionResourceModifyResponse,
    PduSessionResourceReleaseCommand,
    PduSessionResourceReleaseResponse,
    InitialContextSetupRequest,
    InitialContextSetupResponse,
    InitialContextSetupFailure,
    UeRadioCapabilityInfoIndication,
    UeContextReleaseCommand,
    UeContextReleaseComplete,
    NgSetupRequest,
    NgSetupResponse,
    NgSetupFailure,
    NgReset,
    NgResetAcknowledge,
    RerouteNasRequest,
    InitialUeMessage,
    UplinkNasTransport,
    DownlinkNasTransport,
);

impl NgapMessage {
    pub fn name(&self) -> &'static str {
        self.spec().name
    }

    pub fn encode(&self) -> NgapResult<Vec<u8>> {
        encode_pdu(&self.to_pdu()?)
    }

    /// AMF-UE-NGAP-ID carried by the message, if any
    pub fn amf_ue_ngap_id(&self) -> Option<u64> {
        match self {
            NgapMessage::HandoverRequired(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::HandoverCommand(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::HandoverPreparationFailure(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::HandoverRequest(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::HandoverRequestAcknowledge(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::HandoverFailure(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::HandoverNotify(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::HandoverCancel(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::HandoverCancelAcknowledge(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::UplinkRanStatusTransfer(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::DownlinkRanStatusTransfer(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::PduSessionResourceSetupRequest(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::PduSessionResourceSetupResponse(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::PduSessionResourceModifyRequest(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::PduSessionResourceModifyResponse(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::PduSessionResourceReleaseCommand(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::PduSessionResourceReleaseResponse(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::InitialContextSetupRequest(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::InitialContextSetupResponse(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::InitialContextSetupFailure(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::UeRadioCapabilityInfoIndication(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::UeContextReleaseCommand(m) => Some(m.ue_ngap_ids.amf_ue_ngap_id().0),
            NgapMessage::UeContextReleaseComplete(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::RerouteNasRequest(m) => m.amf_ue_ngap_id,
            NgapMessage::UplinkNasTransport(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::DownlinkNasTransport(m) => Some(m.amf_ue_ngap_id),
            NgapMessage::InitialUeMessage(_)
            | NgapMessage::NgSetupRequest(_)
            | NgapMessage::NgSetupResponse(_)
            | NgapMessage::NgSetupFailure(_)
            | NgapMessage::NgReset(_)
            | NgapMessage::NgResetAcknowledge(_) => None,
        }
    }

    /// RAN-UE-NGAP-ID carried by the message, if any
    pub fn ran_ue_ngap_id(&self) -> Option<u32> {
        match self {
            NgapMessage::HandoverRequired(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::HandoverCommand(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::HandoverPreparationFailure(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::HandoverRequestAcknowledge(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::HandoverNotify(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::HandoverCancel(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::HandoverCancelAcknowledge(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::UplinkRanStatusTransfer(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::DownlinkRanStatusTransfer(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::PduSessionResourceSetupRequest(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::PduSessionResourceSetupResponse(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::PduSessionResourceModifyRequest(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::PduSessionResourceModifyResponse(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::PduSessionResourceReleaseCommand(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::PduSessionResourceReleaseResponse(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::InitialContextSetupRequest(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::InitialContextSetupResponse(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::InitialContextSetupFailure(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::UeRadioCapabilityInfoIndication(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::UeContextReleaseCommand(m) => match m.ue_ngap_ids {
                crate::ie::UeNgapIds::Pair { ran_ue_ngap_id, .. } => Some(ran_ue_ngap_id.0),
                crate::ie::UeNgapIds::AmfUeNgapId(_) => None,
            },
            NgapMessage::UeContextReleaseComplete(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::RerouteNasRequest(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::InitialUeMessage(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::UplinkNasTransport(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::DownlinkNasTransport(m) => Some(m.ran_ue_ngap_id),
            NgapMessage::HandoverRequest(_)
            | NgapMessage::HandoverFailure(_)
            | NgapMessage::NgSetupRequest(_)
            | NgapMessage::NgSetupResponse(_)
            | NgapMessage::NgSetupFailure(_)
            | NgapMessage::NgReset(_)
            | NgapMessage::NgResetAcknowledge(_) => None,
        }
    }
}

// ============================================================================
// Handover preparation / resource allocation
// ============================================================================

impl ParseIes for HandoverRequired {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(HandoverRequired {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            handover_type: reader.require(ProtocolIeId::HANDOVER_TYPE)?,
            cause: reader.require(ProtocolIeId::CAUSE)?,
            target_id: reader.require(ProtocolIeId::TARGET_ID)?,
            pdu_session_list: reader.require(ProtocolIeId::PDU_SESSION_RESOURCE_LIST_HO_RQD)?,
            source_to_target_container: reader
                .require(ProtocolIeId::SOURCE_TO_TARGET_TRANSPARENT_CONTAINER)?,
        })
    }
}

impl ParseIes for HandoverCommand {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(HandoverCommand {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            handover_type: reader.require(ProtocolIeId::HANDOVER_TYPE)?,
            handover_list: reader.optional(ProtocolIeId::PDU_SESSION_RESOURCE_HANDOVER_LIST)?,
            to_release_list: reader
                .optional(ProtocolIeId::PDU_SESSION_RESOURCE_TO_RELEASE_LIST_HO_CMD)?,
            target_to_source_container: reader
                .require(ProtocolIeId::TARGET_TO_SOURCE_TRANSPARENT_CONTAINER)?,
        })
    }
}

impl ParseIes for HandoverPreparationFailure {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(HandoverPreparationFailure {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            cause: reader.require(ProtocolIeId::CAUSE)?,
        })
    }
}

impl ParseIes for HandoverRequest {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        Ok(HandoverRequest {
            amf_ue_ngap_id: reader.require::<AmfUeNgapId>(ProtocolIeId::AMF_UE_NGAP_ID)?.0,
            handover_type: reader.require(ProtocolIeId::HANDOVER_TYPE)?,
            cause: reader.require(ProtocolIeId::CAUSE)?,
            ue_ambr: reader.require(ProtocolIeId::UE_AGGREGATE_MAXIMUM_BIT_RATE)?,
            ue_security_capabilities: reader.require(ProtocolIeId::UE_SECURITY_CAPABILITIES)?,
            security_context: reader.require(ProtocolIeId::SECURITY_CONTEXT)?,
            pdu_session_setup_list: reader
                .require(ProtocolIeId::PDU_SESSION_RESOURCE_SETUP_LIST_HO_REQ)?,
            allowed_nssai: reader.require(ProtocolIeId::ALLOWED_NSSAI)?,
            source_to_target_container: reader
                .require(ProtocolIeId::SOURCE_TO_TARGET_TRANSPARENT_CONTAINER)?,
            guami: reader.require(ProtocolIeId::GUAMI)?,
        })
    }
}

impl ParseIes for HandoverRequestAcknowledge {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(HandoverRequestAcknowledge {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            admitted_list: reader.require(ProtocolIeId::PDU_SESSION_RESOURCE_ADMITTED_LIST)?,
            failed_list: reader
                .optional(ProtocolIeId::PDU_SESSION_RESOURCE_FAILED_TO_SETUP_LIST_HO_ACK)?,
            target_to_source_container: reader
                .require(ProtocolIeId::TARGET_TO_SOURCE_TRANSPARENT_CONTAINER)?,
        })
    }
}

impl ParseIes for HandoverFailure {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        Ok(HandoverFailure {
            amf_ue_ngap_id: reader.require::<AmfUeNgapId>(ProtocolIeId::AMF_UE_NGAP_ID)?.0,
            cause: reader.require(ProtocolIeId::CAUSE)?,
        })
    }
}

impl ParseIes for HandoverNotify {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(HandoverNotify {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            user_location_information: reader.require(ProtocolIeId::USER_LOCATION_INFORMATION)?,
        })
    }
}

impl ParseIes for HandoverCancel {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(HandoverCancel {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            cause: reader.require(ProtocolIeId::CAUSE)?,
        })
    }
}

impl ParseIes for HandoverCancelAcknowledge {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(HandoverCancelAcknowledge {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
        })
    }
}

// ============================================================================
// RAN status transfer
// ============================================================================

impl ParseIes for UplinkRanStatusTransfer {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(UplinkRanStatusTransfer {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            container: reader.require(ProtocolIeId::RAN_STATUS_TRANSFER_TRANSPARENT_CONTAINER)?,
        })
    }
}

impl ParseIes for DownlinkRanStatusTransfer {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(DownlinkRanStatusTransfer {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            container: reader.require(ProtocolIeId::RAN_STATUS_TRANSFER_TRANSPARENT_CONTAINER)?,
        })
    }
}

// ============================================================================
// PDU session resource management
// ============================================================================

impl ParseIes for PduSessionResourceSetupRequest {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(PduSessionResourceSetupRequest {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            nas_pdu: reader.optional(ProtocolIeId::NAS_PDU)?,
            setup_list: reader.require(ProtocolIeId::PDU_SESSION_RESOURCE_SETUP_LIST_SU_REQ)?,
            ue_ambr: reader.optional(ProtocolIeId::UE_AGGREGATE_MAXIMUM_BIT_RATE)?,
        })
    }
}

impl ParseIes for PduSessionResourceSetupResponse {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(PduSessionResourceSetupResponse {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            setup_list: reader.optional(ProtocolIeId::PDU_SESSION_RESOURCE_SETUP_LIST_SU_RES)?,
            failed_list: reader
                .optional(ProtocolIeId::PDU_SESSION_RESOURCE_FAILED_TO_SETUP_LIST_SU_RES)?,
        })
    }
}

impl ParseIes for PduSessionResourceModifyRequest {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(PduSessionResourceModifyRequest {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            modify_list: reader.require(ProtocolIeId::PDU_SESSION_RESOURCE_MODIFY_LIST_MOD_REQ)?,
        })
    }
}

impl ParseIes for PduSessionResourceModifyResponse {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(PduSessionResourceModifyResponse {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            modify_list: reader.optional(ProtocolIeId::PDU_SESSION_RESOURCE_MODIFY_LIST_MOD_RES)?,
            failed_list: reader
                .optional(ProtocolIeId::PDU_SESSION_RESOURCE_FAILED_TO_MODIFY_LIST_MOD_RES)?,
            user_location_information: reader.optional(ProtocolIeId::USER_LOCATION_INFORMATION)?,
        })
    }
}

impl ParseIes for PduSessionResourceReleaseCommand {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(PduSessionResourceReleaseCommand {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            nas_pdu: reader.optional(ProtocolIeId::NAS_PDU)?,
            to_release_list: reader
                .require(ProtocolIeId::PDU_SESSION_RESOURCE_TO_RELEASE_LIST_REL_CMD)?,
        })
    }
}

impl ParseIes for PduSessionResourceReleaseResponse {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(PduSessionResourceReleaseResponse {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            released_list: reader
                .require(ProtocolIeId::PDU_SESSION_RESOURCE_RELEASED_LIST_REL_RES)?,
            user_location_information: reader.optional(ProtocolIeId::USER_LOCATION_INFORMATION)?,
        })
    }
}

// ============================================================================
// Initial context setup / UE radio capability
// ============================================================================

impl ParseIes for InitialContextSetupRequest {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(InitialContextSetupRequest {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            ue_ambr: reader.optional(ProtocolIeId::UE_AGGREGATE_MAXIMUM_BIT_RATE)?,
            guami: reader.require(ProtocolIeId::GUAMI)?,
            setup_list: reader.optional(ProtocolIeId::PDU_SESSION_RESOURCE_SETUP_LIST_CXT_REQ)?,
            allowed_nssai: reader.require(ProtocolIeId::ALLOWED_NSSAI)?,
            ue_security_capabilities: reader.require(ProtocolIeId::UE_SECURITY_CAPABILITIES)?,
            security_key: reader.require(ProtocolIeId::SECURITY_KEY)?,
            ue_radio_capability: reader.optional(ProtocolIeId::UE_RADIO_CAPABILITY)?,
            nas_pdu: reader.optional(ProtocolIeId::NAS_PDU)?,
        })
    }
}

impl ParseIes for InitialContextSetupResponse {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(InitialContextSetupResponse {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            setup_list: reader.optional(ProtocolIeId::PDU_SESSION_RESOURCE_SETUP_LIST_CXT_RES)?,
            failed_list: reader
                .optional(ProtocolIeId::PDU_SESSION_RESOURCE_FAILED_TO_SETUP_LIST_CXT_RES)?,
        })
    }
}

impl ParseIes for InitialContextSetupFailure {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(InitialContextSetupFailure {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            failed_list: reader
                .optional(ProtocolIeId::PDU_SESSION_RESOURCE_FAILED_TO_SETUP_LIST_CXT_FAIL)?,
            cause: reader.require(ProtocolIeId::CAUSE)?,
        })
    }
}

impl ParseIes for UeRadioCapabilityInfoIndication {
    // UERadioCapabilityForPaging is accepted and left unread
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(UeRadioCapabilityInfoIndication {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            ue_radio_capability: reader.require(ProtocolIeId::UE_RADIO_CAPABILITY)?,
        })
    }
}

// ============================================================================
// UE context release
// ============================================================================

impl ParseIes for UeContextReleaseCommand {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        Ok(UeContextReleaseCommand {
            ue_ngap_ids: reader.require(ProtocolIeId::UE_NGAP_IDS)?,
            cause: reader.require(ProtocolIeId::CAUSE)?,
        })
    }
}

impl ParseIes for UeContextReleaseComplete {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(UeContextReleaseComplete {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            user_location_information: reader.optional(ProtocolIeId::USER_LOCATION_INFORMATION)?,
        })
    }
}

// ============================================================================
// Interface management
// ============================================================================

impl ParseIes for NgSetupRequest {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        Ok(NgSetupRequest {
            global_ran_node_id: reader.require(ProtocolIeId::GLOBAL_RAN_NODE_ID)?,
            ran_node_name: reader.optional(ProtocolIeId::RAN_NODE_NAME)?,
            supported_ta_list: reader.require(ProtocolIeId::SUPPORTED_TA_LIST)?,
            default_paging_drx: reader.require(ProtocolIeId::DEFAULT_PAGING_DRX)?,
        })
    }
}

impl ParseIes for NgSetupResponse {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        Ok(NgSetupResponse {
            amf_name: reader.require(ProtocolIeId::AMF_NAME)?,
            served_guami_list: reader.require(ProtocolIeId::SERVED_GUAMI_LIST)?,
            relative_amf_capacity: reader
                .require::<RelativeAmfCapacity>(ProtocolIeId::RELATIVE_AMF_CAPACITY)?
                .0,
            plmn_support_list: reader.require(ProtocolIeId::PLMN_SUPPORT_LIST)?,
        })
    }
}

impl ParseIes for NgSetupFailure {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        Ok(NgSetupFailure {
            cause: reader.require(ProtocolIeId::CAUSE)?,
            time_to_wait: reader.optional(ProtocolIeId::TIME_TO_WAIT)?,
        })
    }
}

impl ParseIes for NgReset {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        Ok(NgReset {
            cause: reader.require(ProtocolIeId::CAUSE)?,
            reset_type: reader.require(ProtocolIeId::RESET_TYPE)?,
        })
    }
}

impl ParseIes for NgResetAcknowledge {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        Ok(NgResetAcknowledge {
            connection_list: reader
                .optional(ProtocolIeId::UE_ASSOCIATED_LOGICAL_NG_CONNECTION_LIST)?,
        })
    }
}

// ============================================================================
// NAS transport
// ============================================================================

impl ParseIes for RerouteNasRequest {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        Ok(RerouteNasRequest {
            ran_ue_ngap_id: reader.require::<RanUeNgapId>(ProtocolIeId::RAN_UE_NGAP_ID)?.0,
            amf_ue_ngap_id: reader
                .optional::<AmfUeNgapId>(ProtocolIeId::AMF_UE_NGAP_ID)?
                .map(|id| id.0),
            ngap_message: reader.require(ProtocolIeId::NGAP_MESSAGE)?,
            amf_set_id: reader.require(ProtocolIeId::AMF_SET_ID)?,
            allowed_nssai: reader.optional(ProtocolIeId::ALLOWED_NSSAI)?,
        })
    }
}

impl ParseIes for InitialUeMessage {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        Ok(InitialUeMessage {
            ran_ue_ngap_id: reader.require::<RanUeNgapId>(ProtocolIeId::RAN_UE_NGAP_ID)?.0,
            nas_pdu: reader.require(ProtocolIeId::NAS_PDU)?,
            user_location_information: reader.require(ProtocolIeId::USER_LOCATION_INFORMATION)?,
            rrc_establishment_cause: reader.require(ProtocolIeId::RRC_ESTABLISHMENT_CAUSE)?,
            amf_set_id: reader.optional(ProtocolIeId::AMF_SET_ID)?,
            ue_context_requested: reader
                .optional::<UeContextRequest>(ProtocolIeId::UE_CONTEXT_REQUEST)?
                .is_some(),
            allowed_nssai: reader.optional(ProtocolIeId::ALLOWED_NSSAI)?,
        })
    }
}

impl ParseIes for UplinkNasTransport {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(UplinkNasTransport {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            nas_pdu: reader.require(ProtocolIeId::NAS_PDU)?,
            user_location_information: reader.require(ProtocolIeId::USER_LOCATION_INFORMATION)?,
        })
    }
}

impl ParseIes for DownlinkNasTransport {
    fn read_ies(reader: &IeReader<'_>) -> NgapResult<Self> {
        let (amf_ue_ngap_id, ran_ue_ngap_id) = read_ue_ids(reader)?;
        Ok(DownlinkNasTransport {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
            nas_pdu: reader.require(ProtocolIeId::NAS_PDU)?,
            ue_ambr: reader.optional(ProtocolIeId::UE_AGGREGATE_MAXIMUM_BIT_RATE)?,
            allowed_nssai: reader.optional(ProtocolIeId::ALLOWED_NSSAI)?,
        })
    }
}
