//! NGAP Message Handling
//!
//! Per-message handlers for everything a gNB sends the AMF, and the
//! dispatcher that routes a decoded message to them. Handover procedures
//! live in `handover`.

use std::sync::Arc;

use ogs_asn1c::ngap::{Cause, CauseMisc};
use ogs_ngap::ie::{ResetType, UeAssociatedLogicalNgConnectionItem};
use ogs_ngap::msg::*;
use ogs_ngap::NgapMessage;

use crate::amf::Amf;
use crate::context::{AssocId, PduSessionState, RanKey, UeHandle};
use crate::error::{AmfError, AmfResult, RegistryError, UeKey};
use crate::event::{AmfIndication, DecodedMessage, OutboundMessage};
use crate::gnb::GnbInfo;
use crate::handover;
use crate::ngap_build::*;

// ============================================================================
// Dispatch
// ============================================================================

/// Route a decoded message to its handler
pub fn dispatch(amf: &Amf, decoded: &DecodedMessage) -> AmfResult<Vec<OutboundMessage>> {
    let assoc_id = decoded.assoc_id;
    log::debug!("[assoc={}] {} received", assoc_id, decoded.message.name());

    match &decoded.message {
        NgapMessage::NgSetupRequest(msg) => handle_ng_setup_request(amf, assoc_id, msg),
        NgapMessage::NgReset(msg) => handle_ng_reset(amf, assoc_id, msg),
        NgapMessage::NgResetAcknowledge(msg) => {
            log::info!(
                "[assoc={}] NG Reset acknowledged ({} connections)",
                assoc_id,
                msg.connection_list.as_ref().map_or(0, |l| l.0.len())
            );
            Ok(Vec::new())
        }
        NgapMessage::InitialUeMessage(msg) => {
            handle_initial_ue_message(amf, assoc_id, msg, decoded)
        }
        NgapMessage::UplinkNasTransport(msg) => handle_uplink_nas_transport(amf, assoc_id, msg),
        NgapMessage::PduSessionResourceSetupResponse(msg) => {
            handle_pdu_session_resource_setup_response(amf, assoc_id, msg)
        }
        NgapMessage::PduSessionResourceModifyResponse(msg) => {
            handle_pdu_session_resource_modify_response(amf, assoc_id, msg)
        }
        NgapMessage::PduSessionResourceReleaseResponse(msg) => {
            handle_pdu_session_resource_release_response(amf, assoc_id, msg)
        }
        NgapMessage::InitialContextSetupResponse(msg) => {
            handle_initial_context_setup_response(amf, assoc_id, msg)
        }
        NgapMessage::InitialContextSetupFailure(msg) => {
            handle_initial_context_setup_failure(amf, assoc_id, msg)
        }
        NgapMessage::UeRadioCapabilityInfoIndication(msg) => {
            handle_ue_radio_capability_info_indication(amf, assoc_id, msg)
        }
        NgapMessage::UeContextReleaseComplete(msg) => {
            handle_ue_context_release_complete(amf, assoc_id, msg)
        }
        NgapMessage::HandoverRequired(msg) => handover::handle_handover_required(amf, assoc_id, msg),
        NgapMessage::HandoverRequestAcknowledge(msg) => {
            handover::handle_handover_request_ack(amf, assoc_id, msg)
        }
        NgapMessage::HandoverFailure(msg) => handover::handle_handover_failure(amf, assoc_id, msg),
        NgapMessage::UplinkRanStatusTransfer(msg) => {
            handover::handle_uplink_ran_status_transfer(amf, assoc_id, msg)
        }
        NgapMessage::HandoverNotify(msg) => handover::handle_handover_notify(amf, assoc_id, msg),
        NgapMessage::HandoverCancel(msg) => handover::handle_handover_cancel(amf, assoc_id, msg),
        other => {
            log::warn!(
                "[assoc={}] {} is not expected from a gNB, ignored",
                assoc_id,
                other.name()
            );
            Ok(Vec::new())
        }
    }
}

/// Look up a context for a response-type message
fn lookup_for_response(amf: &Amf, amf_ue_ngap_id: u64) -> AmfResult<Arc<UeHandle>> {
    amf.registry.lookup_by_amf_id(amf_ue_ngap_id).ok_or(AmfError::Registry(
        RegistryError::NotFound(UeKey::AmfUeNgapId(amf_ue_ngap_id)),
    ))
}

/// Abort any handover the context owns, drop it from both indices and tell
/// the layers above
pub(crate) fn drop_ue(amf: &Amf, ue: &Arc<UeHandle>, assoc_id: AssocId) -> Vec<OutboundMessage> {
    let out = handover::abort_for_lost_source(amf, ue, assoc_id).unwrap_or_else(|e| {
        log::error!("Handover abort failed: {}", e);
        Vec::new()
    });
    amf.registry.destroy(ue);
    if let Some(amf_ue_ngap_id) = ue.amf_ue_ngap_id() {
        amf.indicate(AmfIndication::ContextReleased { amf_ue_ngap_id });
    }
    out
}

// ============================================================================
// Interface Management
// ============================================================================

/// Handle NG Setup Request
pub fn handle_ng_setup_request(
    amf: &Amf,
    assoc_id: AssocId,
    msg: &NgSetupRequest,
) -> AmfResult<Vec<OutboundMessage>> {
    log::debug!(
        "[assoc={}] NG Setup Request from {} ({} TAs)",
        assoc_id,
        msg.global_ran_node_id,
        msg.supported_ta_list.0.len()
    );

    let info = GnbInfo {
        assoc_id,
        global_ran_node_id: msg.global_ran_node_id,
        name: msg.ran_node_name.as_ref().map(|n| n.as_str().to_string()),
        supported_ta_list: msg.supported_ta_list.clone(),
        paging_drx: msg.default_paging_drx,
    };

    // At least one broadcast PLMN must be one of ours
    if !info
        .broadcast_plmns()
        .iter()
        .any(|plmn_id| amf.profile.serves_plmn(plmn_id))
    {
        log::warn!(
            "[assoc={}] NG Setup rejected: no served PLMN in supported TA list",
            assoc_id
        );
        return Ok(vec![OutboundMessage::new(
            assoc_id,
            build_ng_setup_failure(Cause::Misc(CauseMisc::UnknownPlmnOrSnpn), None),
        )]);
    }

    if let Some(old) = amf.gnbs.add(info) {
        if old.assoc_id != assoc_id {
            log::info!(
                "[{}] gNB moved from assoc={} to assoc={}",
                old.global_ran_node_id,
                old.assoc_id,
                assoc_id
            );
        }
    }
    log::info!(
        "[assoc={}] NG Setup complete for {}",
        assoc_id,
        msg.global_ran_node_id
    );
    Ok(vec![OutboundMessage::new(
        assoc_id,
        build_ng_setup_response(&amf.profile),
    )])
}

/// Handle NG Reset from a gNB
pub fn handle_ng_reset(
    amf: &Amf,
    assoc_id: AssocId,
    msg: &NgReset,
) -> AmfResult<Vec<OutboundMessage>> {
    log::info!("[assoc={}] NG Reset, cause: {}", assoc_id, msg.cause);

    let mut out = Vec::new();
    let connection_list = match &msg.reset_type {
        ResetType::NgInterface => {
            for ue in amf.registry.list_by_association(assoc_id) {
                out.extend(drop_ue(amf, &ue, assoc_id));
            }
            None
        }
        ResetType::PartOfNgInterface(list) => {
            for item in &list.0 {
                match find_reset_target(amf, assoc_id, item) {
                    Some(ue) => out.extend(drop_ue(amf, &ue, assoc_id)),
                    None => log::debug!("[assoc={}] NG Reset item not found: {:?}", assoc_id, item),
                }
            }
            Some(list.clone())
        }
    };

    out.push(OutboundMessage::new(
        assoc_id,
        NgResetAcknowledge { connection_list },
    ));
    Ok(out)
}

/// A reset item names a UE on the resetting association by either id
fn find_reset_target(
    amf: &Amf,
    assoc_id: AssocId,
    item: &UeAssociatedLogicalNgConnectionItem,
) -> Option<Arc<UeHandle>> {
    let by_amf = item
        .amf_ue_ngap_id
        .and_then(|id| amf.registry.lookup_by_amf_id(id.0))
        .filter(|ue| ue.ran_key().assoc_id == assoc_id);
    by_amf.or_else(|| {
        item.ran_ue_ngap_id
            .and_then(|id| amf.registry.lookup_by_ran_id(RanKey::new(assoc_id, id.0)))
    })
}

// ============================================================================
// NAS Transport
// ============================================================================

/// Handle Initial UE Message: create the context and hand the NAS PDU up
pub fn handle_initial_ue_message(
    amf: &Amf,
    assoc_id: AssocId,
    msg: &InitialUeMessage,
    decoded: &DecodedMessage,
) -> AmfResult<Vec<OutboundMessage>> {
    log::debug!(
        "Initial UE Message, RAN UE NGAP ID: {}, cause: {:?}",
        msg.ran_ue_ngap_id,
        msg.rrc_establishment_cause
    );
    if amf.gnbs.find_by_assoc(assoc_id).is_none() {
        return Err(AmfError::UnknownAssociation(assoc_id));
    }

    let ue = amf
        .registry
        .create(RanKey::new(assoc_id, msg.ran_ue_ngap_id));
    let amf_ue_ngap_id = amf.registry.assign_amf_ue_ngap_id(&ue)?;
    {
        let mut ctx = ue.lock();
        ctx.user_location = Some(msg.user_location_information);
        ctx.initial_ue_message = Some(decoded.raw.clone());
    }

    log::info!(
        "[assoc={}] UE attached (amf_ue_ngap_id={}, ran_ue_ngap_id={})",
        assoc_id,
        amf_ue_ngap_id,
        msg.ran_ue_ngap_id
    );
    amf.indicate(AmfIndication::Nas {
        amf_ue_ngap_id,
        nas_pdu: msg.nas_pdu.clone(),
    });
    Ok(Vec::new())
}

/// Handle Uplink NAS Transport
pub fn handle_uplink_nas_transport(
    amf: &Amf,
    assoc_id: AssocId,
    msg: &UplinkNasTransport,
) -> AmfResult<Vec<OutboundMessage>> {
    log::debug!(
        "Uplink NAS Transport, AMF UE NGAP ID: {}, RAN UE NGAP ID: {}",
        msg.amf_ue_ngap_id,
        msg.ran_ue_ngap_id
    );
    let ue = amf
        .registry
        .lookup_by_amf_id(msg.amf_ue_ngap_id)
        .filter(|ue| ue.ran_key() == RanKey::new(assoc_id, msg.ran_ue_ngap_id));
    let Some(ue) = ue else {
        log::warn!(
            "[assoc={}] Uplink NAS for unknown UE (amf_ue_ngap_id={}, ran_ue_ngap_id={})",
            assoc_id,
            msg.amf_ue_ngap_id,
            msg.ran_ue_ngap_id
        );
        return Ok(vec![OutboundMessage::new(
            assoc_id,
            build_unknown_ue_release(msg.amf_ue_ngap_id, msg.ran_ue_ngap_id),
        )]);
    };

    ue.lock().user_location = Some(msg.user_location_information);
    amf.indicate(AmfIndication::Nas {
        amf_ue_ngap_id: msg.amf_ue_ngap_id,
        nas_pdu: msg.nas_pdu.clone(),
    });
    Ok(Vec::new())
}

// ============================================================================
// PDU Session Management
// ============================================================================

pub fn handle_pdu_session_resource_setup_response(
    amf: &Amf,
    assoc_id: AssocId,
    msg: &PduSessionResourceSetupResponse,
) -> AmfResult<Vec<OutboundMessage>> {
    log::debug!(
        "[assoc={}] PDU Session Resource Setup Response, AMF UE NGAP ID: {}",
        assoc_id,
        msg.amf_ue_ngap_id
    );
    let ue = lookup_for_response(amf, msg.amf_ue_ngap_id)?;
    let mut ctx = ue.lock();

    for item in msg.setup_list.iter().flat_map(|l| l.0.iter()) {
        match ctx.sessions.get_mut(&item.pdu_session_id.0) {
            Some(session) => {
                session.state = PduSessionState::Active;
                session.response_transfer = Some(item.transfer.clone());
                log::info!(
                    "PDU session {} active (amf_ue_ngap_id={})",
                    item.pdu_session_id.0,
                    msg.amf_ue_ngap_id
                );
            }
            None => log::warn!(
                "Setup response for unrequested PDU session {}",
                item.pdu_session_id.0
            ),
        }
    }
    for item in msg.failed_list.iter().flat_map(|l| l.0.iter()) {
        if ctx.sessions.remove(&item.pdu_session_id.0).is_some() {
            log::warn!(
                "PDU session {} setup failed (amf_ue_ngap_id={})",
                item.pdu_session_id.0,
                msg.amf_ue_ngap_id
            );
        }
    }
    Ok(Vec::new())
}

pub fn handle_pdu_session_resource_modify_response(
    amf: &Amf,
    assoc_id: AssocId,
    msg: &PduSessionResourceModifyResponse,
) -> AmfResult<Vec<OutboundMessage>> {
    log::debug!(
        "[assoc={}] PDU Session Resource Modify Response, AMF UE NGAP ID: {}",
        assoc_id,
        msg.amf_ue_ngap_id
    );
    let ue = lookup_for_response(amf, msg.amf_ue_ngap_id)?;
    let mut ctx = ue.lock();

    for item in msg.modify_list.iter().flat_map(|l| l.0.iter()) {
        if let Some(session) = ctx.sessions.get_mut(&item.pdu_session_id.0) {
            session.response_transfer = Some(item.transfer.clone());
        }
    }
    for item in msg.failed_list.iter().flat_map(|l| l.0.iter()) {
        log::warn!(
            "PDU session {} modify failed (amf_ue_ngap_id={})",
            item.pdu_session_id.0,
            msg.amf_ue_ngap_id
        );
    }
    if let Some(uli) = msg.user_location_information {
        ctx.user_location = Some(uli);
    }
    Ok(Vec::new())
}

pub fn handle_pdu_session_resource_release_response(
    amf: &Amf,
    assoc_id: AssocId,
    msg: &PduSessionResourceReleaseResponse,
) -> AmfResult<Vec<OutboundMessage>> {
    log::debug!(
        "[assoc={}] PDU Session Resource Release Response, AMF UE NGAP ID: {}",
        assoc_id,
        msg.amf_ue_ngap_id
    );
    let ue = lookup_for_response(amf, msg.amf_ue_ngap_id)?;
    let mut ctx = ue.lock();

    for id in msg.released_list.ids() {
        if ctx.sessions.remove(&id.0).is_some() {
            log::info!(
                "PDU session {} released (amf_ue_ngap_id={})",
                id.0,
                msg.amf_ue_ngap_id
            );
        }
    }
    if let Some(uli) = msg.user_location_information {
        ctx.user_location = Some(uli);
    }
    Ok(Vec::new())
}

// ============================================================================
// UE Context Management
// ============================================================================

pub fn handle_initial_context_setup_response(
    amf: &Amf,
    assoc_id: AssocId,
    msg: &InitialContextSetupResponse,
) -> AmfResult<Vec<OutboundMessage>> {
    log::debug!(
        "[assoc={}] Initial Context Setup Response, AMF UE NGAP ID: {}",
        assoc_id,
        msg.amf_ue_ngap_id
    );
    let ue = lookup_for_response(amf, msg.amf_ue_ngap_id)?;
    let mut ctx = ue.lock();

    for item in msg.setup_list.iter().flat_map(|l| l.0.iter()) {
        if let Some(session) = ctx.sessions.get_mut(&item.pdu_session_id.0) {
            session.state = PduSessionState::Active;
            session.response_transfer = Some(item.transfer.clone());
        }
    }
    for item in msg.failed_list.iter().flat_map(|l| l.0.iter()) {
        if ctx.sessions.remove(&item.pdu_session_id.0).is_some() {
            log::warn!(
                "PDU session {} not set up with the UE context (amf_ue_ngap_id={})",
                item.pdu_session_id.0,
                msg.amf_ue_ngap_id
            );
        }
    }
    log::info!(
        "[assoc={}] UE context established (amf_ue_ngap_id={})",
        assoc_id,
        msg.amf_ue_ngap_id
    );
    Ok(Vec::new())
}

/// The gNB could not establish the context: its sessions are gone and the
/// UE context is released
pub fn handle_initial_context_setup_failure(
    amf: &Amf,
    assoc_id: AssocId,
    msg: &InitialContextSetupFailure,
) -> AmfResult<Vec<OutboundMessage>> {
    log::warn!(
        "[assoc={}] Initial Context Setup Failure (amf_ue_ngap_id={}): {}",
        assoc_id,
        msg.amf_ue_ngap_id,
        msg.cause
    );
    let ue = lookup_for_response(amf, msg.amf_ue_ngap_id)?;
    let key = ue.ran_key();
    if key != RanKey::new(assoc_id, msg.ran_ue_ngap_id) {
        log::debug!(
            "[assoc={}] Initial Context Setup Failure from a previous binding, ignored",
            assoc_id
        );
        return Ok(Vec::new());
    }

    {
        let mut ctx = ue.lock();
        for id in msg.failed_list.iter().flat_map(|l| l.ids()) {
            ctx.sessions.remove(&id.0);
        }
        ctx.sessions
            .retain(|_, session| session.state != PduSessionState::SetupRequested);
    }
    Ok(vec![OutboundMessage::new(
        assoc_id,
        build_ue_context_release_command(
            msg.amf_ue_ngap_id,
            Some(msg.ran_ue_ngap_id),
            normal_release(),
        ),
    )])
}

/// Store the capability for the next Initial Context Setup
pub fn handle_ue_radio_capability_info_indication(
    amf: &Amf,
    assoc_id: AssocId,
    msg: &UeRadioCapabilityInfoIndication,
) -> AmfResult<Vec<OutboundMessage>> {
    log::debug!(
        "UE Radio Capability Info Indication, AMF UE NGAP ID: {}, RAN UE NGAP ID: {}",
        msg.amf_ue_ngap_id,
        msg.ran_ue_ngap_id
    );
    let ue = amf
        .registry
        .lookup_by_amf_id(msg.amf_ue_ngap_id)
        .filter(|ue| ue.ran_key() == RanKey::new(assoc_id, msg.ran_ue_ngap_id));
    let Some(ue) = ue else {
        log::warn!(
            "[assoc={}] Radio capability for unknown UE (amf_ue_ngap_id={}, ran_ue_ngap_id={})",
            assoc_id,
            msg.amf_ue_ngap_id,
            msg.ran_ue_ngap_id
        );
        return Ok(vec![OutboundMessage::new(
            assoc_id,
            build_unknown_ue_release(msg.amf_ue_ngap_id, msg.ran_ue_ngap_id),
        )]);
    };

    ue.lock().ue_radio_capability = Some(msg.ue_radio_capability.clone());
    Ok(Vec::new())
}

/// Handle UE Context Release Complete. After a handover the old source
/// answers too; only the current owner's answer destroys the context.
pub fn handle_ue_context_release_complete(
    amf: &Amf,
    assoc_id: AssocId,
    msg: &UeContextReleaseComplete,
) -> AmfResult<Vec<OutboundMessage>> {
    log::debug!(
        "UE Context Release Complete, AMF UE NGAP ID: {}, RAN UE NGAP ID: {}",
        msg.amf_ue_ngap_id,
        msg.ran_ue_ngap_id
    );
    let ue = lookup_for_response(amf, msg.amf_ue_ngap_id)?;
    if ue.ran_key() != RanKey::new(assoc_id, msg.ran_ue_ngap_id) {
        log::debug!(
            "[assoc={}] Release complete from a previous binding (amf_ue_ngap_id={})",
            assoc_id,
            msg.amf_ue_ngap_id
        );
        return Ok(Vec::new());
    }

    let out = drop_ue(amf, &ue, assoc_id);
    log::info!(
        "[assoc={}] UE context released (amf_ue_ngap_id={})",
        assoc_id,
        msg.amf_ue_ngap_id
    );
    Ok(out)
}
