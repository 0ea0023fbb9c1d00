//! NGAP Message Building
//!
//! Outbound messages the AMF originates, assembled from UE context and
//! configuration. Encoding happens later, in `OutboundMessage::encode`.

use ogs_asn1c::ngap::{
    AmfUeNgapId, Cause, CauseNas, CauseRadioNetwork, NasPdu, PduSessionId, RanUeNgapId,
    TimeToWait,
};
use ogs_ngap::ie::{
    encode_value, HandoverType, PduSessionHandoverSetupItem, PduSessionResourceItem,
    PduSessionResourceReleaseCommandTransfer, PduSessionSetupItem, RanStatusTransferContainer,
    ResetType, SecurityKey, TransparentContainer, UeNgapIds,
};
use ogs_ngap::msg::*;
use ogs_ngap::NgapResult;

use crate::config::AmfProfile;
use crate::context::UeNgapContext;
use crate::handover::HandoverSession;

/// NG Setup Response from the configured profile
pub fn build_ng_setup_response(profile: &AmfProfile) -> NgSetupResponse {
    NgSetupResponse {
        amf_name: profile.amf_name.clone(),
        served_guami_list: profile.served_guami_list(),
        relative_amf_capacity: profile.relative_capacity,
        plmn_support_list: profile.plmn_support.clone(),
    }
}

pub fn build_ng_setup_failure(cause: Cause, time_to_wait: Option<TimeToWait>) -> NgSetupFailure {
    NgSetupFailure {
        cause,
        time_to_wait,
    }
}

pub fn build_ng_reset(cause: Cause, reset_type: ResetType) -> NgReset {
    NgReset { cause, reset_type }
}

/// UE Context Release Command; the pair form when the RAN id is known
pub fn build_ue_context_release_command(
    amf_ue_ngap_id: u64,
    ran_ue_ngap_id: Option<u32>,
    cause: Cause,
) -> UeContextReleaseCommand {
    let amf_ue_ngap_id = AmfUeNgapId(amf_ue_ngap_id);
    let ue_ngap_ids = match ran_ue_ngap_id {
        Some(ran) => UeNgapIds::Pair {
            amf_ue_ngap_id,
            ran_ue_ngap_id: RanUeNgapId(ran),
        },
        None => UeNgapIds::AmfUeNgapId(amf_ue_ngap_id),
    };
    UeContextReleaseCommand { ue_ngap_ids, cause }
}

/// Answer to a UE-associated message naming a UE this AMF does not know
pub fn build_unknown_ue_release(amf_ue_ngap_id: u64, ran_ue_ngap_id: u32) -> UeContextReleaseCommand {
    build_ue_context_release_command(
        amf_ue_ngap_id,
        Some(ran_ue_ngap_id),
        Cause::RadioNetwork(CauseRadioNetwork::UnknownLocalUeNgapId),
    )
}

pub fn build_downlink_nas_transport(
    amf_ue_ngap_id: u64,
    ran_ue_ngap_id: u32,
    ue: &UeNgapContext,
    nas_pdu: NasPdu,
) -> DownlinkNasTransport {
    DownlinkNasTransport {
        amf_ue_ngap_id,
        ran_ue_ngap_id,
        nas_pdu,
        ue_ambr: ue.ue_ambr,
        allowed_nssai: None,
    }
}

/// PDUSessionResourceReleaseCommandTransfer carrying only a cause. The same
/// octets serve as HandoverPreparationUnsuccessfulTransfer.
pub fn build_release_command_transfer(cause: Cause) -> NgapResult<Vec<u8>> {
    encode_value(&PduSessionResourceReleaseCommandTransfer { cause })
}

pub fn build_pdu_session_resource_release_command(
    amf_ue_ngap_id: u64,
    ran_ue_ngap_id: u32,
    pdu_session_ids: &[PduSessionId],
    nas_pdu: Option<NasPdu>,
    cause: Cause,
) -> NgapResult<PduSessionResourceReleaseCommand> {
    let transfer = build_release_command_transfer(cause)?;
    let to_release_list = pdu_session_ids
        .iter()
        .map(|id| PduSessionResourceItem {
            pdu_session_id: *id,
            transfer: transfer.clone(),
        })
        .collect::<Vec<_>>()
        .into();
    Ok(PduSessionResourceReleaseCommand {
        amf_ue_ngap_id,
        ran_ue_ngap_id,
        nas_pdu,
        to_release_list,
    })
}

/// Handover Request toward the target; the UE's own values win over the
/// configured defaults
pub fn build_handover_request(
    amf_ue_ngap_id: u64,
    ue: &UeNgapContext,
    profile: &AmfProfile,
    ho: &HandoverSession,
    source_to_target_container: TransparentContainer,
) -> NgapResult<HandoverRequest> {
    let pdu_session_setup_list = ho
        .requested
        .iter()
        .filter_map(|id| ue.sessions.get(&id.0))
        .map(|session| PduSessionHandoverSetupItem {
            pdu_session_id: session.pdu_session_id,
            s_nssai: session.s_nssai,
            transfer: session.setup_request_transfer.clone(),
        })
        .collect::<Vec<_>>()
        .into();

    Ok(HandoverRequest {
        amf_ue_ngap_id,
        handover_type: HandoverType::Intra5gs,
        cause: Cause::RadioNetwork(CauseRadioNetwork::HandoverDesirableForRadioReason),
        ue_ambr: ue.ue_ambr.unwrap_or(profile.default_ue_ambr),
        ue_security_capabilities: ue
            .ue_security_capabilities
            .unwrap_or(profile.default_security_capabilities),
        security_context: ue.security_context.unwrap_or_default(),
        pdu_session_setup_list,
        allowed_nssai: profile.allowed_nssai(),
        source_to_target_container,
        guami: profile.primary_guami()?,
    })
}

/// Initial Context Setup Request. Sessions, UE-AMBR and the stored radio
/// capability are only sent along with PDU sessions to set up.
pub fn build_initial_context_setup_request(
    amf_ue_ngap_id: u64,
    ran_ue_ngap_id: u32,
    ue: &UeNgapContext,
    profile: &AmfProfile,
    security_key: SecurityKey,
    nas_pdu: Option<NasPdu>,
    setup_items: Vec<PduSessionSetupItem>,
) -> NgapResult<InitialContextSetupRequest> {
    let with_sessions = !setup_items.is_empty();
    Ok(InitialContextSetupRequest {
        amf_ue_ngap_id,
        ran_ue_ngap_id,
        ue_ambr: with_sessions.then(|| ue.ue_ambr.unwrap_or(profile.default_ue_ambr)),
        guami: profile.primary_guami()?,
        setup_list: with_sessions.then(|| setup_items.into()),
        allowed_nssai: profile.allowed_nssai(),
        ue_security_capabilities: ue
            .ue_security_capabilities
            .unwrap_or(profile.default_security_capabilities),
        security_key,
        ue_radio_capability: ue.ue_radio_capability.clone().filter(|_| with_sessions),
        nas_pdu,
    })
}

/// Handover Command toward the source. Admitted sessions carry the target's
/// transfers; failed ones are listed for release.
pub fn build_handover_command(
    amf_ue_ngap_id: u64,
    ho: &HandoverSession,
    ack: &HandoverRequestAcknowledge,
) -> NgapResult<HandoverCommand> {
    let handover_list = (!ack.admitted_list.0.is_empty()).then(|| ack.admitted_list.clone());
    let to_release_list = if ho.failed.is_empty() {
        None
    } else {
        let transfer = build_release_command_transfer(Cause::RadioNetwork(
            CauseRadioNetwork::HoFailureInTarget5gcNgranNodeOrTargetSystem,
        ))?;
        Some(
            ho.failed
                .iter()
                .map(|id| PduSessionResourceItem {
                    pdu_session_id: *id,
                    transfer: transfer.clone(),
                })
                .collect::<Vec<_>>()
                .into(),
        )
    };

    Ok(HandoverCommand {
        amf_ue_ngap_id,
        ran_ue_ngap_id: ho.source_ran_ue_ngap_id,
        handover_type: HandoverType::Intra5gs,
        handover_list,
        to_release_list,
        target_to_source_container: ack.target_to_source_container.clone(),
    })
}

pub fn build_handover_preparation_failure(
    amf_ue_ngap_id: u64,
    ran_ue_ngap_id: u32,
    cause: Cause,
) -> HandoverPreparationFailure {
    HandoverPreparationFailure {
        amf_ue_ngap_id,
        ran_ue_ngap_id,
        cause,
    }
}

pub fn build_handover_cancel_ack(amf_ue_ngap_id: u64, ran_ue_ngap_id: u32) -> HandoverCancelAcknowledge {
    HandoverCancelAcknowledge {
        amf_ue_ngap_id,
        ran_ue_ngap_id,
    }
}

pub fn build_downlink_ran_status_transfer(
    amf_ue_ngap_id: u64,
    ran_ue_ngap_id: u32,
    container: RanStatusTransferContainer,
) -> DownlinkRanStatusTransfer {
    DownlinkRanStatusTransfer {
        amf_ue_ngap_id,
        ran_ue_ngap_id,
        container,
    }
}

/// Normal release cause used for AMF-initiated session release
pub fn normal_release() -> Cause {
    Cause::Nas(CauseNas::NormalRelease)
}
