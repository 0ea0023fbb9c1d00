//! NGAP message types and their IE tables
//!
//! One struct per message kind. `NgapMessageType::SPEC` places the message in
//! the PDU (choice and procedure code) and lists its IEs as TS 38.413 section 9.2
//! defines them.

use ogs_asn1c::ngap::{
    Cause, Criticality, NasPdu, PduKind, PduSessionId, ProcedureCode, ProtocolIeId, TimeToWait,
};

use crate::error::{NgapError, NgapResult};
use crate::ie::*;
use crate::table::{IeSpec, MessageSpec};

pub type PduSessionResourceList = PduSessionList<PduSessionResourceItem>;

/// A message kind with a fixed place in the PDU and a fixed IE table
pub trait NgapMessageType: Sized {
    const SPEC: &'static MessageSpec;
}

macro_rules! message_spec {
    ($name:ident, $kind:ident, $code:ident, $crit:ident, [$($ie:expr),* $(,)?]) => {
        impl NgapMessageType for $name {
            const SPEC: &'static MessageSpec = &MessageSpec {
                name: stringify!($name),
                kind: PduKind::$kind,
                procedure_code: ProcedureCode::$code,
                criticality: Criticality::$crit,
                ies: &[$($ie),*],
            };
        }
    };
}

const fn m(id: ProtocolIeId, name: &'static str, criticality: Criticality) -> IeSpec {
    IeSpec::mandatory(id, name, criticality)
}

const fn o(id: ProtocolIeId, name: &'static str, criticality: Criticality) -> IeSpec {
    IeSpec::optional(id, name, criticality)
}

const R: Criticality = Criticality::Reject;
const I: Criticality = Criticality::Ignore;

const AMF_ID: ProtocolIeId = ProtocolIeId::AMF_UE_NGAP_ID;
const RAN_ID: ProtocolIeId = ProtocolIeId::RAN_UE_NGAP_ID;

// ============================================================================
// Handover preparation / resource allocation
// ============================================================================

/// Handover Required (source gNB -> AMF)
#[derive(Debug, Clone, PartialEq)]
pub struct HandoverRequired {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub handover_type: HandoverType,
    pub cause: Cause,
    pub target_id: TargetId,
    pub pdu_session_list: PduSessionResourceList,
    pub source_to_target_container: TransparentContainer,
}

message_spec!(HandoverRequired, InitiatingMessage, HANDOVER_PREPARATION, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", R),
    m(RAN_ID, "RAN-UE-NGAP-ID", R),
    m(ProtocolIeId::HANDOVER_TYPE, "HandoverType", R),
    m(ProtocolIeId::CAUSE, "Cause", I),
    m(ProtocolIeId::TARGET_ID, "TargetID", R),
    m(ProtocolIeId::PDU_SESSION_RESOURCE_LIST_HO_RQD, "PDUSessionResourceListHORqd", R),
    m(ProtocolIeId::SOURCE_TO_TARGET_TRANSPARENT_CONTAINER, "SourceToTarget-TransparentContainer", R),
]);

/// Handover Command (AMF -> source gNB)
#[derive(Debug, Clone, PartialEq)]
pub struct HandoverCommand {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub handover_type: HandoverType,
    pub handover_list: Option<PduSessionResourceList>,
    pub to_release_list: Option<PduSessionResourceList>,
    pub target_to_source_container: TransparentContainer,
}

message_spec!(HandoverCommand, SuccessfulOutcome, HANDOVER_PREPARATION, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", R),
    m(RAN_ID, "RAN-UE-NGAP-ID", R),
    m(ProtocolIeId::HANDOVER_TYPE, "HandoverType", R),
    o(ProtocolIeId::PDU_SESSION_RESOURCE_HANDOVER_LIST, "PDUSessionResourceHandoverList", I),
    o(ProtocolIeId::PDU_SESSION_RESOURCE_TO_RELEASE_LIST_HO_CMD, "PDUSessionResourceToReleaseListHOCmd", I),
    m(ProtocolIeId::TARGET_TO_SOURCE_TRANSPARENT_CONTAINER, "TargetToSource-TransparentContainer", R),
]);

/// Handover Preparation Failure (AMF -> source gNB)
#[derive(Debug, Clone, PartialEq)]
pub struct HandoverPreparationFailure {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub cause: Cause,
}

message_spec!(HandoverPreparationFailure, UnsuccessfulOutcome, HANDOVER_PREPARATION, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", I),
    m(RAN_ID, "RAN-UE-NGAP-ID", I),
    m(ProtocolIeId::CAUSE, "Cause", I),
]);

/// Handover Request (AMF -> target gNB)
#[derive(Debug, Clone, PartialEq)]
pub struct HandoverRequest {
    pub amf_ue_ngap_id: u64,
    pub handover_type: HandoverType,
    pub cause: Cause,
    pub ue_ambr: UeAmbr,
    pub ue_security_capabilities: UeSecurityCapabilities,
    pub security_context: SecurityContext,
    pub pdu_session_setup_list: PduSessionList<PduSessionHandoverSetupItem>,
    pub allowed_nssai: AllowedNssai,
    pub source_to_target_container: TransparentContainer,
    pub guami: Guami,
}

message_spec!(HandoverRequest, InitiatingMessage, HANDOVER_RESOURCE_ALLOCATION, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", R),
    m(ProtocolIeId::HANDOVER_TYPE, "HandoverType", R),
    m(ProtocolIeId::CAUSE, "Cause", I),
    m(ProtocolIeId::UE_AGGREGATE_MAXIMUM_BIT_RATE, "UEAggregateMaximumBitRate", R),
    m(ProtocolIeId::UE_SECURITY_CAPABILITIES, "UESecurityCapabilities", R),
    m(ProtocolIeId::SECURITY_CONTEXT, "SecurityContext", R),
    m(ProtocolIeId::PDU_SESSION_RESOURCE_SETUP_LIST_HO_REQ, "PDUSessionResourceSetupListHOReq", R),
    m(ProtocolIeId::ALLOWED_NSSAI, "AllowedNSSAI", R),
    m(ProtocolIeId::SOURCE_TO_TARGET_TRANSPARENT_CONTAINER, "SourceToTarget-TransparentContainer", R),
    m(ProtocolIeId::GUAMI, "GUAMI", R),
]);

/// Handover Request Acknowledge (target gNB -> AMF)
#[derive(Debug, Clone, PartialEq)]
pub struct HandoverRequestAcknowledge {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub admitted_list: PduSessionResourceList,
    pub failed_list: Option<PduSessionResourceList>,
    pub target_to_source_container: TransparentContainer,
}

message_spec!(HandoverRequestAcknowledge, SuccessfulOutcome, HANDOVER_RESOURCE_ALLOCATION, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", I),
    m(RAN_ID, "RAN-UE-NGAP-ID", I),
    m(ProtocolIeId::PDU_SESSION_RESOURCE_ADMITTED_LIST, "PDUSessionResourceAdmittedList", I),
    o(ProtocolIeId::PDU_SESSION_RESOURCE_FAILED_TO_SETUP_LIST_HO_ACK, "PDUSessionResourceFailedToSetupListHOAck", I),
    m(ProtocolIeId::TARGET_TO_SOURCE_TRANSPARENT_CONTAINER, "TargetToSource-TransparentContainer", R),
]);

impl HandoverRequestAcknowledge {
    /// Split `requested` into admitted and failed sessions.
    ///
    /// Admitted ids must all have been requested and must not also be listed
    /// as failed. Requested ids the target left out of both lists count as
    /// failed. The failed set comes back in `requested` order.
    pub fn partition(
        &self,
        requested: &[PduSessionId],
    ) -> NgapResult<(Vec<PduSessionId>, Vec<PduSessionId>)> {
        let admitted = self.admitted_list.ids();
        let explicit_failed = self
            .failed_list
            .as_ref()
            .map(|list| list.ids())
            .unwrap_or_default();

        for id in &admitted {
            if !requested.contains(id) {
                return Err(NgapError::PartitionViolation {
                    reason: format!("admitted PDU session {} was not requested", id.0),
                });
            }
            if explicit_failed.contains(id) {
                return Err(NgapError::PartitionViolation {
                    reason: format!("PDU session {} is both admitted and failed", id.0),
                });
            }
        }
        for (i, id) in admitted.iter().enumerate() {
            if admitted[i + 1..].contains(id) {
                return Err(NgapError::PartitionViolation {
                    reason: format!("PDU session {} admitted twice", id.0),
                });
            }
        }

        let failed = requested
            .iter()
            .filter(|id| !admitted.contains(id))
            .copied()
            .collect();
        Ok((admitted, failed))
    }
}

/// Handover Failure (target gNB -> AMF)
#[derive(Debug, Clone, PartialEq)]
pub struct HandoverFailure {
    pub amf_ue_ngap_id: u64,
    pub cause: Cause,
}

message_spec!(HandoverFailure, UnsuccessfulOutcome, HANDOVER_RESOURCE_ALLOCATION, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", I),
    m(ProtocolIeId::CAUSE, "Cause", I),
]);

/// Handover Notify (target gNB -> AMF)
#[derive(Debug, Clone, PartialEq)]
pub struct HandoverNotify {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub user_location_information: UserLocationInformation,
}

message_spec!(HandoverNotify, InitiatingMessage, HANDOVER_NOTIFICATION, Ignore, [
    m(AMF_ID, "AMF-UE-NGAP-ID", R),
    m(RAN_ID, "RAN-UE-NGAP-ID", R),
    m(ProtocolIeId::USER_LOCATION_INFORMATION, "UserLocationInformation", I),
]);

/// Handover Cancel (source gNB -> AMF)
#[derive(Debug, Clone, PartialEq)]
pub struct HandoverCancel {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub cause: Cause,
}

message_spec!(HandoverCancel, InitiatingMessage, HANDOVER_CANCEL, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", R),
    m(RAN_ID, "RAN-UE-NGAP-ID", R),
    m(ProtocolIeId::CAUSE, "Cause", I),
]);

/// Handover Cancel Acknowledge (AMF -> source gNB)
#[derive(Debug, Clone, PartialEq)]
pub struct HandoverCancelAcknowledge {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
}

message_spec!(HandoverCancelAcknowledge, SuccessfulOutcome, HANDOVER_CANCEL, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", I),
    m(RAN_ID, "RAN-UE-NGAP-ID", I),
]);

// ============================================================================
// RAN status transfer
// ============================================================================

/// Uplink RAN Status Transfer (source gNB -> AMF)
#[derive(Debug, Clone, PartialEq)]
pub struct UplinkRanStatusTransfer {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub container: RanStatusTransferContainer,
}

message_spec!(UplinkRanStatusTransfer, InitiatingMessage, UPLINK_RAN_STATUS_TRANSFER, Ignore, [
    m(AMF_ID, "AMF-UE-NGAP-ID", R),
    m(RAN_ID, "RAN-UE-NGAP-ID", R),
    m(ProtocolIeId::RAN_STATUS_TRANSFER_TRANSPARENT_CONTAINER, "RANStatusTransfer-TransparentContainer", R),
]);

/// Downlink RAN Status Transfer (AMF -> target gNB)
#[derive(Debug, Clone, PartialEq)]
pub struct DownlinkRanStatusTransfer {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub container: RanStatusTransferContainer,
}

message_spec!(DownlinkRanStatusTransfer, InitiatingMessage, DOWNLINK_RAN_STATUS_TRANSFER, Ignore, [
    m(AMF_ID, "AMF-UE-NGAP-ID", R),
    m(RAN_ID, "RAN-UE-NGAP-ID", R),
    m(ProtocolIeId::RAN_STATUS_TRANSFER_TRANSPARENT_CONTAINER, "RANStatusTransfer-TransparentContainer", R),
]);

// ============================================================================
// PDU session resource management
// ============================================================================

/// PDU Session Resource Setup Request
#[derive(Debug, Clone, PartialEq)]
pub struct PduSessionResourceSetupRequest {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub nas_pdu: Option<NasPdu>,
    pub setup_list: PduSessionList<PduSessionSetupItem>,
    pub ue_ambr: Option<UeAmbr>,
}

message_spec!(PduSessionResourceSetupRequest, InitiatingMessage, PDU_SESSION_RESOURCE_SETUP, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", R),
    m(RAN_ID, "RAN-UE-NGAP-ID", R),
    o(ProtocolIeId::NAS_PDU, "NAS-PDU", R),
    m(ProtocolIeId::PDU_SESSION_RESOURCE_SETUP_LIST_SU_REQ, "PDUSessionResourceSetupListSUReq", R),
    o(ProtocolIeId::UE_AGGREGATE_MAXIMUM_BIT_RATE, "UEAggregateMaximumBitRate", I),
]);

/// PDU Session Resource Setup Response
#[derive(Debug, Clone, PartialEq)]
pub struct PduSessionResourceSetupResponse {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub setup_list: Option<PduSessionResourceList>,
    pub failed_list: Option<PduSessionResourceList>,
}

message_spec!(PduSessionResourceSetupResponse, SuccessfulOutcome, PDU_SESSION_RESOURCE_SETUP, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", I),
    m(RAN_ID, "RAN-UE-NGAP-ID", I),
    o(ProtocolIeId::PDU_SESSION_RESOURCE_SETUP_LIST_SU_RES, "PDUSessionResourceSetupListSURes", I),
    o(ProtocolIeId::PDU_SESSION_RESOURCE_FAILED_TO_SETUP_LIST_SU_RES, "PDUSessionResourceFailedToSetupListSURes", I),
]);

/// PDU Session Resource Modify Request
#[derive(Debug, Clone, PartialEq)]
pub struct PduSessionResourceModifyRequest {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub modify_list: PduSessionList<PduSessionModifyItem>,
}

message_spec!(PduSessionResourceModifyRequest, InitiatingMessage, PDU_SESSION_RESOURCE_MODIFY, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", R),
    m(RAN_ID, "RAN-UE-NGAP-ID", R),
    m(ProtocolIeId::PDU_SESSION_RESOURCE_MODIFY_LIST_MOD_REQ, "PDUSessionResourceModifyListModReq", R),
]);

/// PDU Session Resource Modify Response
#[derive(Debug, Clone, PartialEq)]
pub struct PduSessionResourceModifyResponse {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub modify_list: Option<PduSessionResourceList>,
    pub failed_list: Option<PduSessionResourceList>,
    pub user_location_information: Option<UserLocationInformation>,
}

message_spec!(PduSessionResourceModifyResponse, SuccessfulOutcome, PDU_SESSION_RESOURCE_MODIFY, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", I),
    m(RAN_ID, "RAN-UE-NGAP-ID", I),
    o(ProtocolIeId::PDU_SESSION_RESOURCE_MODIFY_LIST_MOD_RES, "PDUSessionResourceModifyListModRes", I),
    o(ProtocolIeId::PDU_SESSION_RESOURCE_FAILED_TO_MODIFY_LIST_MOD_RES, "PDUSessionResourceFailedToModifyListModRes", I),
    o(ProtocolIeId::USER_LOCATION_INFORMATION, "UserLocationInformation", I),
]);

/// PDU Session Resource Release Command
#[derive(Debug, Clone, PartialEq)]
pub struct PduSessionResourceReleaseCommand {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub nas_pdu: Option<NasPdu>,
    pub to_release_list: PduSessionResourceList,
}

message_spec!(PduSessionResourceReleaseCommand, InitiatingMessage, PDU_SESSION_RESOURCE_RELEASE, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", R),
    m(RAN_ID, "RAN-UE-NGAP-ID", R),
    o(ProtocolIeId::NAS_PDU, "NAS-PDU", I),
    m(ProtocolIeId::PDU_SESSION_RESOURCE_TO_RELEASE_LIST_REL_CMD, "PDUSessionResourceToReleaseListRelCmd", R),
]);

/// PDU Session Resource Release Response
#[derive(Debug, Clone, PartialEq)]
pub struct PduSessionResourceReleaseResponse {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub released_list: PduSessionResourceList,
    pub user_location_information: Option<UserLocationInformation>,
}

message_spec!(PduSessionResourceReleaseResponse, SuccessfulOutcome, PDU_SESSION_RESOURCE_RELEASE, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", I),
    m(RAN_ID, "RAN-UE-NGAP-ID", I),
    m(ProtocolIeId::PDU_SESSION_RESOURCE_RELEASED_LIST_REL_RES, "PDUSessionResourceReleasedListRelRes", I),
    o(ProtocolIeId::USER_LOCATION_INFORMATION, "UserLocationInformation", I),
]);

// ============================================================================
// Initial context setup / UE radio capability
// ============================================================================

/// Initial Context Setup Request (AMF -> gNB)
#[derive(Debug, Clone, PartialEq)]
pub struct InitialContextSetupRequest {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub ue_ambr: Option<UeAmbr>,
    pub guami: Guami,
    pub setup_list: Option<PduSessionList<PduSessionSetupItem>>,
    pub allowed_nssai: AllowedNssai,
    pub ue_security_capabilities: UeSecurityCapabilities,
    pub security_key: SecurityKey,
    pub ue_radio_capability: Option<UeRadioCapability>,
    pub nas_pdu: Option<NasPdu>,
}

message_spec!(InitialContextSetupRequest, InitiatingMessage, INITIAL_CONTEXT_SETUP, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", R),
    m(RAN_ID, "RAN-UE-NGAP-ID", R),
    o(ProtocolIeId::UE_AGGREGATE_MAXIMUM_BIT_RATE, "UEAggregateMaximumBitRate", R),
    m(ProtocolIeId::GUAMI, "GUAMI", R),
    o(ProtocolIeId::PDU_SESSION_RESOURCE_SETUP_LIST_CXT_REQ, "PDUSessionResourceSetupListCxtReq", R),
    m(ProtocolIeId::ALLOWED_NSSAI, "AllowedNSSAI", R),
    m(ProtocolIeId::UE_SECURITY_CAPABILITIES, "UESecurityCapabilities", R),
    m(ProtocolIeId::SECURITY_KEY, "SecurityKey", R),
    o(ProtocolIeId::UE_RADIO_CAPABILITY, "UERadioCapability", I),
    o(ProtocolIeId::NAS_PDU, "NAS-PDU", I),
]);

/// Initial Context Setup Response (gNB -> AMF)
#[derive(Debug, Clone, PartialEq)]
pub struct InitialContextSetupResponse {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub setup_list: Option<PduSessionResourceList>,
    pub failed_list: Option<PduSessionResourceList>,
}

message_spec!(InitialContextSetupResponse, SuccessfulOutcome, INITIAL_CONTEXT_SETUP, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", I),
    m(RAN_ID, "RAN-UE-NGAP-ID", I),
    o(ProtocolIeId::PDU_SESSION_RESOURCE_SETUP_LIST_CXT_RES, "PDUSessionResourceSetupListCxtRes", I),
    o(ProtocolIeId::PDU_SESSION_RESOURCE_FAILED_TO_SETUP_LIST_CXT_RES, "PDUSessionResourceFailedToSetupListCxtRes", I),
]);

/// Initial Context Setup Failure (gNB -> AMF)
#[derive(Debug, Clone, PartialEq)]
pub struct InitialContextSetupFailure {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub failed_list: Option<PduSessionResourceList>,
    pub cause: Cause,
}

message_spec!(InitialContextSetupFailure, UnsuccessfulOutcome, INITIAL_CONTEXT_SETUP, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", I),
    m(RAN_ID, "RAN-UE-NGAP-ID", I),
    o(ProtocolIeId::PDU_SESSION_RESOURCE_FAILED_TO_SETUP_LIST_CXT_FAIL, "PDUSessionResourceFailedToSetupListCxtFail", I),
    m(ProtocolIeId::CAUSE, "Cause", I),
]);

/// UE Radio Capability Info Indication (gNB -> AMF)
#[derive(Debug, Clone, PartialEq)]
pub struct UeRadioCapabilityInfoIndication {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub ue_radio_capability: UeRadioCapability,
}

message_spec!(UeRadioCapabilityInfoIndication, InitiatingMessage, UE_RADIO_CAPABILITY_INFO_INDICATION, Ignore, [
    m(AMF_ID, "AMF-UE-NGAP-ID", R),
    m(RAN_ID, "RAN-UE-NGAP-ID", R),
    m(ProtocolIeId::UE_RADIO_CAPABILITY, "UERadioCapability", I),
    o(ProtocolIeId::UE_RADIO_CAPABILITY_FOR_PAGING, "UERadioCapabilityForPaging", I),
]);

// ============================================================================
// UE context release
// ============================================================================

/// UE Context Release Command (AMF -> gNB)
#[derive(Debug, Clone, PartialEq)]
pub struct UeContextReleaseCommand {
    pub ue_ngap_ids: UeNgapIds,
    pub cause: Cause,
}

message_spec!(UeContextReleaseCommand, InitiatingMessage, UE_CONTEXT_RELEASE, Reject, [
    m(ProtocolIeId::UE_NGAP_IDS, "UE-NGAP-IDs", R),
    m(ProtocolIeId::CAUSE, "Cause", I),
]);

/// UE Context Release Complete (gNB -> AMF)
#[derive(Debug, Clone, PartialEq)]
pub struct UeContextReleaseComplete {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub user_location_information: Option<UserLocationInformation>,
}

message_spec!(UeContextReleaseComplete, SuccessfulOutcome, UE_CONTEXT_RELEASE, Reject, [
    m(AMF_ID, "AMF-UE-NGAP-ID", I),
    m(RAN_ID, "RAN-UE-NGAP-ID", I),
    o(ProtocolIeId::USER_LOCATION_INFORMATION, "UserLocationInformation", I),
]);

// ============================================================================
// Interface management
// ============================================================================

/// NG Setup Request (gNB -> AMF)
#[derive(Debug, Clone, PartialEq)]
pub struct NgSetupRequest {
    pub global_ran_node_id: GlobalRanNodeId,
    pub ran_node_name: Option<RanNodeName>,
    pub supported_ta_list: SupportedTaList,
    pub default_paging_drx: PagingDrx,
}

message_spec!(NgSetupRequest, InitiatingMessage, NG_SETUP, Reject, [
    m(ProtocolIeId::GLOBAL_RAN_NODE_ID, "GlobalRANNodeID", R),
    o(ProtocolIeId::RAN_NODE_NAME, "RANNodeName", I),
    m(ProtocolIeId::SUPPORTED_TA_LIST, "SupportedTAList", R),
    m(ProtocolIeId::DEFAULT_PAGING_DRX, "DefaultPagingDRX", I),
]);

/// NG Setup Response (AMF -> gNB)
#[derive(Debug, Clone, PartialEq)]
pub struct NgSetupResponse {
    pub amf_name: AmfName,
    pub served_guami_list: ServedGuamiList,
    pub relative_amf_capacity: u8,
    pub plmn_support_list: PlmnSupportList,
}

message_spec!(NgSetupResponse, SuccessfulOutcome, NG_SETUP, Reject, [
    m(ProtocolIeId::AMF_NAME, "AMFName", R),
    m(ProtocolIeId::SERVED_GUAMI_LIST, "ServedGUAMIList", R),
    m(ProtocolIeId::RELATIVE_AMF_CAPACITY, "RelativeAMFCapacity", I),
    m(ProtocolIeId::PLMN_SUPPORT_LIST, "PLMNSupportList", R),
]);

/// NG Setup Failure (AMF -> gNB)
#[derive(Debug, Clone, PartialEq)]
pub struct NgSetupFailure {
    pub cause: Cause,
    pub time_to_wait: Option<TimeToWait>,
}

message_spec!(NgSetupFailure, UnsuccessfulOutcome, NG_SETUP, Reject, [
    m(ProtocolIeId::CAUSE, "Cause", I),
    o(ProtocolIeId::TIME_TO_WAIT, "TimeToWait", I),
]);

/// NG Reset (either direction)
#[derive(Debug, Clone, PartialEq)]
pub struct NgReset {
    pub cause: Cause,
    pub reset_type: ResetType,
}

message_spec!(NgReset, InitiatingMessage, NG_RESET, Reject, [
    m(ProtocolIeId::CAUSE, "Cause", I),
    m(ProtocolIeId::RESET_TYPE, "ResetType", R),
]);

/// NG Reset Acknowledge
#[derive(Debug, Clone, PartialEq)]
pub struct NgResetAcknowledge {
    pub connection_list: Option<UeAssociatedLogicalNgConnectionList>,
}

message_spec!(NgResetAcknowledge, SuccessfulOutcome, NG_RESET, Reject, [
    o(ProtocolIeId::UE_ASSOCIATED_LOGICAL_NG_CONNECTION_LIST, "UE-associatedLogicalNG-connectionList", I),
]);

// ============================================================================
// NAS transport
// ============================================================================

/// Reroute NAS Request (AMF -> gNB)
#[derive(Debug, Clone, PartialEq)]
pub struct RerouteNasRequest {
    pub ran_ue_ngap_id: u32,
    pub amf_ue_ngap_id: Option<u64>,
    /// Encoded Initial UE Message
    pub ngap_message: TransparentContainer,
    pub amf_set_id: AmfSetId,
    pub allowed_nssai: Option<AllowedNssai>,
}

message_spec!(RerouteNasRequest, InitiatingMessage, REROUTE_NAS_REQUEST, Reject, [
    m(RAN_ID, "RAN-UE-NGAP-ID", R),
    o(AMF_ID, "AMF-UE-NGAP-ID", I),
    m(ProtocolIeId::NGAP_MESSAGE, "NGAP-Message", R),
    m(ProtocolIeId::AMF_SET_ID, "AMFSetID", R),
    o(ProtocolIeId::ALLOWED_NSSAI, "AllowedNSSAI", R),
]);

/// Initial UE Message (gNB -> AMF)
#[derive(Debug, Clone, PartialEq)]
pub struct InitialUeMessage {
    pub ran_ue_ngap_id: u32,
    pub nas_pdu: NasPdu,
    pub user_location_information: UserLocationInformation,
    pub rrc_establishment_cause: RrcEstablishmentCause,
    pub amf_set_id: Option<AmfSetId>,
    pub ue_context_requested: bool,
    pub allowed_nssai: Option<AllowedNssai>,
}

message_spec!(InitialUeMessage, InitiatingMessage, INITIAL_UE_MESSAGE, Ignore, [
    m(RAN_ID, "RAN-UE-NGAP-ID", R),
    m(ProtocolIeId::NAS_PDU, "NAS-PDU", R),
    m(ProtocolIeId::USER_LOCATION_INFORMATION, "UserLocationInformation", R),
    m(ProtocolIeId::RRC_ESTABLISHMENT_CAUSE, "RRCEstablishmentCause", I),
    o(ProtocolIeId::AMF_SET_ID, "AMFSetID", I),
    o(ProtocolIeId::UE_CONTEXT_REQUEST, "UEContextRequest", I),
    o(ProtocolIeId::ALLOWED_NSSAI, "AllowedNSSAI", R),
]);

/// Uplink NAS Transport (gNB -> AMF)
#[derive(Debug, Clone, PartialEq)]
pub struct UplinkNasTransport {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub nas_pdu: NasPdu,
    pub user_location_information: UserLocationInformation,
}

message_spec!(UplinkNasTransport, InitiatingMessage, UPLINK_NAS_TRANSPORT, Ignore, [
    m(AMF_ID, "AMF-UE-NGAP-ID", R),
    m(RAN_ID, "RAN-UE-NGAP-ID", R),
    m(ProtocolIeId::NAS_PDU, "NAS-PDU", R),
    m(ProtocolIeId::USER_LOCATION_INFORMATION, "UserLocationInformation", I),
]);

/// Downlink NAS Transport (AMF -> gNB)
#[derive(Debug, Clone, PartialEq)]
pub struct DownlinkNasTransport {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub nas_pdu: NasPdu,
    pub ue_ambr: Option<UeAmbr>,
    pub allowed_nssai: Option<AllowedNssai>,
}

message_spec!(DownlinkNasTransport, InitiatingMessage, DOWNLINK_NAS_TRANSPORT, Ignore, [
    m(AMF_ID, "AMF-UE-NGAP-ID", R),
    m(RAN_ID, "RAN-UE-NGAP-ID", R),
    m(ProtocolIeId::NAS_PDU, "NAS-PDU", R),
    o(ProtocolIeId::UE_AGGREGATE_MAXIMUM_BIT_RATE, "UEAggregateMaximumBitRate", I),
    o(ProtocolIeId::ALLOWED_NSSAI, "AllowedNSSAI", R),
]);
