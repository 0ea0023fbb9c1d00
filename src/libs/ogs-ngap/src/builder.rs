//! NGAP Message Builders
//!
//! Each message kind writes its IEs through an `IeWriter` bound to the kind's
//! table; `encode_message` wraps the container in the PDU choice the table
//! names and APER-encodes it.

use ogs_asn1c::ngap::{AmfUeNgapId, NgapPdu, ProcedureMessage, ProtocolIeId, RanUeNgapId, RelativeAmfCapacity};
use ogs_asn1c::per::{AperEncode, AperEncoder};

use crate::error::NgapResult;
use crate::ie::UeContextRequest;
use crate::msg::*;
use crate::table::IeWriter;

/// A message kind that can lay its fields out as IEs
pub trait BuildIes: NgapMessageType {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()>;
}

/// Encode an NgapPdu to APER bytes
pub fn encode_pdu(pdu: &NgapPdu) -> NgapResult<Vec<u8>> {
    let mut encoder = AperEncoder::new();
    pdu.encode_aper(&mut encoder)?;
    encoder.align();
    Ok(encoder.into_bytes().to_vec())
}

/// Build the PDU for `msg` without encoding it
pub fn build_pdu<T: BuildIes>(msg: &T) -> NgapResult<NgapPdu> {
    let spec = T::SPEC;
    let mut writer = IeWriter::new(spec);
    msg.write_ies(&mut writer)?;
    let value = writer.finish()?;
    Ok(NgapPdu::new(
        spec.kind,
        ProcedureMessage {
            procedure_code: spec.procedure_code,
            criticality: spec.criticality,
            value,
        },
    ))
}

/// Build and encode any message
pub fn encode_message<T: BuildIes>(msg: &T) -> NgapResult<Vec<u8>> {
    encode_pdu(&build_pdu(msg)?)
}

fn put_ue_ids(writer: &mut IeWriter, amf_ue_ngap_id: u64, ran_ue_ngap_id: u32) -> NgapResult<()> {
    // IE: AMF-UE-NGAP-ID (mandatory)
    writer.put(ProtocolIeId::AMF_UE_NGAP_ID, &AmfUeNgapId(amf_ue_ngap_id))?;
    // IE: RAN-UE-NGAP-ID (mandatory)
    writer.put(ProtocolIeId::RAN_UE_NGAP_ID, &RanUeNgapId(ran_ue_ngap_id))
}

// ============================================================================
// Handover preparation / resource allocation
// ============================================================================

impl BuildIes for HandoverRequired {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        // IE: HandoverType (mandatory)
        writer.put(ProtocolIeId::HANDOVER_TYPE, &self.handover_type)?;
        // IE: Cause (mandatory)
        writer.put(ProtocolIeId::CAUSE, &self.cause)?;
        // IE: TargetID (mandatory)
        writer.put(ProtocolIeId::TARGET_ID, &self.target_id)?;
        // IE: PDUSessionResourceListHORqd (mandatory)
        writer.put(ProtocolIeId::PDU_SESSION_RESOURCE_LIST_HO_RQD, &self.pdu_session_list)?;
        // IE: SourceToTarget-TransparentContainer (mandatory)
        writer.put(
            ProtocolIeId::SOURCE_TO_TARGET_TRANSPARENT_CONTAINER,
            &self.source_to_target_container,
        )
    }
}

impl BuildIes for HandoverCommand {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        // IE: HandoverType (mandatory)
        writer.put(ProtocolIeId::HANDOVER_TYPE, &self.handover_type)?;
        // IE: PDUSessionResourceHandoverList (optional)
        writer.put_opt(ProtocolIeId::PDU_SESSION_RESOURCE_HANDOVER_LIST, self.handover_list.as_ref())?;
        // IE: PDUSessionResourceToReleaseListHOCmd (optional)
        writer.put_opt(
            ProtocolIeId::PDU_SESSION_RESOURCE_TO_RELEASE_LIST_HO_CMD,
            self.to_release_list.as_ref(),
        )?;
        // IE: TargetToSource-TransparentContainer (mandatory)
        writer.put(
            ProtocolIeId::TARGET_TO_SOURCE_TRANSPARENT_CONTAINER,
            &self.target_to_source_container,
        )
    }
}

impl BuildIes for HandoverPreparationFailure {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        // IE: Cause (mandatory)
        writer.put(ProtocolIeId::CAUSE, &self.cause)
    }
}

impl BuildIes for HandoverRequest {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        // IE: AMF-UE-NGAP-ID (mandatory)
        writer.put(ProtocolIeId::AMF_UE_NGAP_ID, &AmfUeNgapId(self.amf_ue_ngap_id))?;
        // IE: HandoverType (mandatory)
        writer.put(ProtocolIeId::HANDOVER_TYPE, &self.handover_type)?;
        // IE: Cause (mandatory)
        writer.put(ProtocolIeId::CAUSE, &self.cause)?;
        // IE: UEAggregateMaximumBitRate (mandatory)
        writer.put(ProtocolIeId::UE_AGGREGATE_MAXIMUM_BIT_RATE, &self.ue_ambr)?;
        // IE: UESecurityCapabilities (mandatory)
        writer.put(ProtocolIeId::UE_SECURITY_CAPABILITIES, &self.ue_security_capabilities)?;
        // IE: SecurityContext (mandatory)
        writer.put(ProtocolIeId::SECURITY_CONTEXT, &self.security_context)?;
        // IE: PDUSessionResourceSetupListHOReq (mandatory)
        writer.put(
            ProtocolIeId::PDU_SESSION_RESOURCE_SETUP_LIST_HO_REQ,
            &self.pdu_session_setup_list,
        )?;
        // IE: AllowedNSSAI (mandatory)
        writer.put(ProtocolIeId::ALLOWED_NSSAI, &self.allowed_nssai)?;
        // IE: SourceToTarget-TransparentContainer (mandatory)
        writer.put(
            ProtocolIeId::SOURCE_TO_TARGET_TRANSPARENT_CONTAINER,
            &self.source_to_target_container,
        )?;
        // IE: GUAMI (mandatory)
        writer.put(ProtocolIeId::GUAMI, &self.guami)
    }
}

impl BuildIes for HandoverRequestAcknowledge {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        // IE: PDUSessionResourceAdmittedList (mandatory)
        writer.put(ProtocolIeId::PDU_SESSION_RESOURCE_ADMITTED_LIST, &self.admitted_list)?;
        // IE: PDUSessionResourceFailedToSetupListHOAck (optional)
        writer.put_opt(
            ProtocolIeId::PDU_SESSION_RESOURCE_FAILED_TO_SETUP_LIST_HO_ACK,
            self.failed_list.as_ref(),
        )?;
        // IE: TargetToSource-TransparentContainer (mandatory)
        writer.put(
            ProtocolIeId::TARGET_TO_SOURCE_TRANSPARENT_CONTAINER,
            &self.target_to_source_container,
        )
    }
}

impl BuildIes for HandoverFailure {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        // IE: AMF-UE-NGAP-ID (mandatory)
        writer.put(ProtocolIeId::AMF_UE_NGAP_ID, &AmfUeNgapId(self.amf_ue_ngap_id))?;
        // IE: Cause (mandatory)
        writer.put(ProtocolIeId::CAUSE, &self.cause)
    }
}

impl BuildIes for HandoverNotify {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        // IE: UserLocationInformation (mandatory)
        writer.put(ProtocolIeId::USER_LOCATION_INFORMATION, &self.user_location_information)
    }
}

impl BuildIes for HandoverCancel {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        // IE: Cause (mandatory)
        writer.put(ProtocolIeId::CAUSE, &self.cause)
    }
}

impl BuildIes for HandoverCancelAcknowledge {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)
    }
}

// ============================================================================
// RAN status transfer
// ============================================================================

impl BuildIes for UplinkRanStatusTransfer {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        // IE: RANStatusTransfer-TransparentContainer (mandatory)
        writer.put(ProtocolIeId::RAN_STATUS_TRANSFER_TRANSPARENT_CONTAINER, &self.container)
    }
}

impl BuildIes for DownlinkRanStatusTransfer {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        // IE: RANStatusTransfer-TransparentContainer (mandatory)
        writer.put(ProtocolIeId::RAN_STATUS_TRANSFER_TRANSPARENT_CONTAINER, &self.container)
    }
}

// ============================================================================
// PDU session resource management
// ============================================================================

impl BuildIes for PduSessionResourceSetupRequest {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        // IE: NAS-PDU (optional)
        writer.put_opt(ProtocolIeId::NAS_PDU, self.nas_pdu.as_ref())?;
        // IE: PDUSessionResourceSetupListSUReq (mandatory)
        writer.put(ProtocolIeId::PDU_SESSION_RESOURCE_SETUP_LIST_SU_REQ, &self.setup_list)?;
        // IE: UEAggregateMaximumBitRate (optional)
        writer.put_opt(ProtocolIeId::UE_AGGREGATE_MAXIMUM_BIT_RATE, self.ue_ambr.as_ref())
    }
}

impl BuildIes for PduSessionResourceSetupResponse {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        writer.put_opt(ProtocolIeId::PDU_SESSION_RESOURCE_SETUP_LIST_SU_RES, self.setup_list.as_ref())?;
        writer.put_opt(
            ProtocolIeId::PDU_SESSION_RESOURCE_FAILED_TO_SETUP_LIST_SU_RES,
            self.failed_list.as_ref(),
        )
    }
}

impl BuildIes for PduSessionResourceModifyRequest {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        // IE: PDUSessionResourceModifyListModReq (mandatory)
        writer.put(ProtocolIeId::PDU_SESSION_RESOURCE_MODIFY_LIST_MOD_REQ, &self.modify_list)
    }
}

impl BuildIes for PduSessionResourceModifyResponse {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        writer.put_opt(ProtocolIeId::PDU_SESSION_RESOURCE_MODIFY_LIST_MOD_RES, self.modify_list.as_ref())?;
        writer.put_opt(
            ProtocolIeId::PDU_SESSION_RESOURCE_FAILED_TO_MODIFY_LIST_MOD_RES,
            self.failed_list.as_ref(),
        )?;
        writer.put_opt(
            ProtocolIeId::USER_LOCATION_INFORMATION,
            self.user_location_information.as_ref(),
        )
    }
}

impl BuildIes for PduSessionResourceReleaseCommand {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        // IE: NAS-PDU (optional)
        writer.put_opt(ProtocolIeId::NAS_PDU, self.nas_pdu.as_ref())?;
        // IE: PDUSessionResourceToReleaseListRelCmd (mandatory)
        writer.put(
            ProtocolIeId::PDU_SESSION_RESOURCE_TO_RELEASE_LIST_REL_CMD,
            &self.to_release_list,
        )
    }
}

impl BuildIes for PduSessionResourceReleaseResponse {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        // IE: PDUSessionResourceReleasedListRelRes (mandatory)
        writer.put(ProtocolIeId::PDU_SESSION_RESOURCE_RELEASED_LIST_REL_RES, &self.released_list)?;
        writer.put_opt(
            ProtocolIeId::USER_LOCATION_INFORMATION,
            self.user_location_information.as_ref(),
        )
    }
}

// ============================================================================
// Initial context setup / UE radio capability
// ============================================================================

impl BuildIes for InitialContextSetupRequest {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        writer.put_opt(ProtocolIeId::UE_AGGREGATE_MAXIMUM_BIT_RATE, self.ue_ambr.as_ref())?;
        // IE: GUAMI (mandatory)
        writer.put(ProtocolIeId::GUAMI, &self.guami)?;
        writer.put_opt(ProtocolIeId::PDU_SESSION_RESOURCE_SETUP_LIST_CXT_REQ, self.setup_list.as_ref())?;
        // IE: AllowedNSSAI (mandatory)
        writer.put(ProtocolIeId::ALLOWED_NSSAI, &self.allowed_nssai)?;
        // IE: UESecurityCapabilities (mandatory)
        writer.put(ProtocolIeId::UE_SECURITY_CAPABILITIES, &self.ue_security_capabilities)?;
        // IE: SecurityKey (mandatory)
        writer.put(ProtocolIeId::SECURITY_KEY, &self.security_key)?;
        writer.put_opt(ProtocolIeId::UE_RADIO_CAPABILITY, self.ue_radio_capability.as_ref())?;
        writer.put_opt(ProtocolIeId::NAS_PDU, self.nas_pdu.as_ref())
    }
}

impl BuildIes for InitialContextSetupResponse {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        writer.put_opt(ProtocolIeId::PDU_SESSION_RESOURCE_SETUP_LIST_CXT_RES, self.setup_list.as_ref())?;
        writer.put_opt(
            ProtocolIeId::PDU_SESSION_RESOURCE_FAILED_TO_SETUP_LIST_CXT_RES,
            self.failed_list.as_ref(),
        )
    }
}

impl BuildIes for InitialContextSetupFailure {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        writer.put_opt(
            ProtocolIeId::PDU_SESSION_RESOURCE_FAILED_TO_SETUP_LIST_CXT_FAIL,
            self.failed_list.as_ref(),
        )?;
        // IE: Cause (mandatory)
        writer.put(ProtocolIeId::CAUSE, &self.cause)
    }
}

impl BuildIes for UeRadioCapabilityInfoIndication {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        // IE: UERadioCapability (mandatory)
        writer.put(ProtocolIeId::UE_RADIO_CAPABILITY, &self.ue_radio_capability)
    }
}

// ============================================================================
// UE context release
// ============================================================================

impl BuildIes for UeContextReleaseCommand {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        // IE: UE-NGAP-IDs (mandatory)
        writer.put(ProtocolIeId::UE_NGAP_IDS, &self.ue_ngap_ids)?;
        // IE: Cause (mandatory)
        writer.put(ProtocolIeId::CAUSE, &self.cause)
    }
}

impl BuildIes for UeContextReleaseComplete {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        writer.put_opt(
            ProtocolIeId::USER_LOCATION_INFORMATION,
            self.user_location_information.as_ref(),
        )
    }
}

// ============================================================================
// Interface management
// ============================================================================

impl BuildIes for NgSetupRequest {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        // IE: GlobalRANNodeID (mandatory)
        writer.put(ProtocolIeId::GLOBAL_RAN_NODE_ID, &self.global_ran_node_id)?;
        // IE: RANNodeName (optional)
        writer.put_opt(ProtocolIeId::RAN_NODE_NAME, self.ran_node_name.as_ref())?;
        // IE: SupportedTAList (mandatory)
        writer.put(ProtocolIeId::SUPPORTED_TA_LIST, &self.supported_ta_list)?;
        // IE: DefaultPagingDRX (mandatory)
        writer.put(ProtocolIeId::DEFAULT_PAGING_DRX, &self.default_paging_drx)
    }
}

impl BuildIes for NgSetupResponse {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        // IE: AMFName (mandatory)
        writer.put(ProtocolIeId::AMF_NAME, &self.amf_name)?;
        // IE: ServedGUAMIList (mandatory)
        writer.put(ProtocolIeId::SERVED_GUAMI_LIST, &self.served_guami_list)?;
        // IE: RelativeAMFCapacity (mandatory)
        writer.put(
            ProtocolIeId::RELATIVE_AMF_CAPACITY,
            &RelativeAmfCapacity(self.relative_amf_capacity),
        )?;
        // IE: PLMNSupportList (mandatory)
        writer.put(ProtocolIeId::PLMN_SUPPORT_LIST, &self.plmn_support_list)
    }
}

impl BuildIes for NgSetupFailure {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        // IE: Cause (mandatory)
        writer.put(ProtocolIeId::CAUSE, &self.cause)?;
        // IE: TimeToWait (optional)
        writer.put_opt(ProtocolIeId::TIME_TO_WAIT, self.time_to_wait.as_ref())
    }
}

impl BuildIes for NgReset {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        // IE: Cause (mandatory)
        writer.put(ProtocolIeId::CAUSE, &self.cause)?;
        // IE: ResetType (mandatory)
        writer.put(ProtocolIeId::RESET_TYPE, &self.reset_type)
    }
}

impl BuildIes for NgResetAcknowledge {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        writer.put_opt(
            ProtocolIeId::UE_ASSOCIATED_LOGICAL_NG_CONNECTION_LIST,
            self.connection_list.as_ref(),
        )
    }
}

// ============================================================================
// NAS transport
// ============================================================================

impl BuildIes for RerouteNasRequest {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        // IE: RAN-UE-NGAP-ID (mandatory)
        writer.put(ProtocolIeId::RAN_UE_NGAP_ID, &RanUeNgapId(self.ran_ue_ngap_id))?;
        // IE: AMF-UE-NGAP-ID (optional)
        writer.put_opt(
            ProtocolIeId::AMF_UE_NGAP_ID,
            self.amf_ue_ngap_id.map(AmfUeNgapId).as_ref(),
        )?;
        // IE: NGAP-Message (mandatory)
        writer.put(ProtocolIeId::NGAP_MESSAGE, &self.ngap_message)?;
        // IE: AMFSetID (mandatory)
        writer.put(ProtocolIeId::AMF_SET_ID, &self.amf_set_id)?;
        // IE: AllowedNSSAI (optional)
        writer.put_opt(ProtocolIeId::ALLOWED_NSSAI, self.allowed_nssai.as_ref())
    }
}

impl BuildIes for InitialUeMessage {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        // IE: RAN-UE-NGAP-ID (mandatory)
        writer.put(ProtocolIeId::RAN_UE_NGAP_ID, &RanUeNgapId(self.ran_ue_ngap_id))?;
        // IE: NAS-PDU (mandatory)
        writer.put(ProtocolIeId::NAS_PDU, &self.nas_pdu)?;
        // IE: UserLocationInformation (mandatory)
        writer.put(ProtocolIeId::USER_LOCATION_INFORMATION, &self.user_location_information)?;
        // IE: RRCEstablishmentCause (mandatory)
        writer.put(ProtocolIeId::RRC_ESTABLISHMENT_CAUSE, &self.rrc_establishment_cause)?;
        // IE: AMFSetID (optional)
        writer.put_opt(ProtocolIeId::AMF_SET_ID, self.amf_set_id.as_ref())?;
        // IE: UEContextRequest (optional)
        writer.put_opt(
            ProtocolIeId::UE_CONTEXT_REQUEST,
            self.ue_context_requested.then_some(&UeContextRequest),
        )?;
        // IE: AllowedNSSAI (optional)
        writer.put_opt(ProtocolIeId::ALLOWED_NSSAI, self.allowed_nssai.as_ref())
    }
}

impl BuildIes for UplinkNasTransport {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        // IE: NAS-PDU (mandatory)
        writer.put(ProtocolIeId::NAS_PDU, &self.nas_pdu)?;
        // IE: UserLocationInformation (mandatory)
        writer.put(ProtocolIeId::USER_LOCATION_INFORMATION, &self.user_location_information)
    }
}

impl BuildIes for DownlinkNasTransport {
    fn write_ies(&self, writer: &mut IeWriter) -> NgapResult<()> {
        put_ue_ids(writer, self.amf_ue_ngap_id, self.ran_ue_ngap_id)?;
        // IE: NAS-PDU (mandatory)
        writer.put(ProtocolIeId::NAS_PDU, &self.nas_pdu)?;
        // IE: UEAggregateMaximumBitRate (optional)
        writer.put_opt(ProtocolIeId::UE_AGGREGATE_MAXIMUM_BIT_RATE, self.ue_ambr.as_ref())?;
        // IE: AllowedNSSAI (optional)
        writer.put_opt(ProtocolIeId::ALLOWED_NSSAI, self.allowed_nssai.as_ref())
    }
}
