//! N2 Handover State Machine
//!
//! Per-UE handover phase and the handlers that drive it:
//!
//! ```text
//! Idle -> RequiredSent -> RequestSent -> Acknowledged -> CommandSent -> Completing -> Idle
//!                              |                              |
//!                              +----------> Failed <----------+
//! ```
//!
//! Every handler runs with the UE context locked, so a concurrent reader sees
//! either the state before the step or the state after it.

use ogs_asn1c::ngap::{Cause, CauseRadioNetwork, PduSessionId};
use ogs_ngap::ie::{GlobalRanNodeId, HandoverType, Tai, TargetId};
use ogs_ngap::msg::{
    HandoverCancel, HandoverFailure, HandoverNotify, HandoverRequestAcknowledge, HandoverRequired,
    UplinkRanStatusTransfer,
};

use crate::amf::Amf;
use crate::context::{AssocId, RanKey, UeHandle, UeNgapContext};
use crate::error::{AmfError, AmfResult, RegistryError, UeKey};
use crate::event::{AmfIndication, HandoverStep, OutboundMessage};
use crate::ngap_build::*;

// ============================================================================
// States
// ============================================================================

/// Handover phase of one UE context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandoverPhase {
    /// No handover in progress
    #[default]
    Idle,
    /// Handover Required accepted, target selected
    RequiredSent,
    /// Handover Request sent to the target
    RequestSent,
    /// Target admitted the handover
    Acknowledged,
    /// Handover Command sent to the source
    CommandSent,
    /// Handover Notify received, source being released
    Completing,
    /// Last attempt failed; a new Handover Required may start over
    Failed,
}

impl HandoverPhase {
    /// Get the name of the state
    pub fn name(&self) -> &'static str {
        match self {
            HandoverPhase::Idle => "HANDOVER_STATE_IDLE",
            HandoverPhase::RequiredSent => "HANDOVER_STATE_REQUIRED_SENT",
            HandoverPhase::RequestSent => "HANDOVER_STATE_REQUEST_SENT",
            HandoverPhase::Acknowledged => "HANDOVER_STATE_ACKNOWLEDGED",
            HandoverPhase::CommandSent => "HANDOVER_STATE_COMMAND_SENT",
            HandoverPhase::Completing => "HANDOVER_STATE_COMPLETING",
            HandoverPhase::Failed => "HANDOVER_STATE_FAILED",
        }
    }

    pub fn can_transition_to(&self, to: HandoverPhase) -> bool {
        use HandoverPhase::*;
        matches!(
            (self, to),
            (Idle, RequiredSent)
                | (Failed, Idle)
                | (RequiredSent, RequestSent)
                | (RequiredSent, Failed)
                | (RequestSent, Acknowledged)
                | (RequestSent, Failed)
                | (RequestSent, Idle)
                | (Acknowledged, CommandSent)
                | (Acknowledged, Failed)
                | (Acknowledged, Idle)
                | (CommandSent, Completing)
                | (CommandSent, Failed)
                | (CommandSent, Idle)
                | (Completing, Idle)
                | (Completing, Failed)
        )
    }

    /// A handover is between Handover Required and its outcome
    pub fn is_in_flight(&self) -> bool {
        !matches!(self, HandoverPhase::Idle | HandoverPhase::Failed)
    }

    /// Timer guarding this phase, if any
    pub fn guard_timer(&self) -> Option<HandoverStep> {
        match self {
            HandoverPhase::RequestSent => Some(HandoverStep::Preparation),
            HandoverPhase::CommandSent => Some(HandoverStep::Completion),
            _ => None,
        }
    }
}

/// Source and target bookkeeping of an in-flight handover
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoverSession {
    pub source_assoc: AssocId,
    pub source_ran_ue_ngap_id: u32,
    pub target_assoc: AssocId,
    /// Learned from Handover Request Acknowledge
    pub target_ran_ue_ngap_id: Option<u32>,
    pub target_id: GlobalRanNodeId,
    pub selected_tai: Tai,
    /// Sessions offered to the target, in Handover Required order
    pub requested: Vec<PduSessionId>,
    pub admitted: Vec<PduSessionId>,
    /// Sessions that will not survive the handover
    pub failed: Vec<PduSessionId>,
}

/// Move `ue` to `to`, refusing edges the state machine does not have
pub(crate) fn transition(
    ue: &mut UeNgapContext,
    to: HandoverPhase,
    amf_ue_ngap_id: u64,
) -> AmfResult<()> {
    let from = ue.handover_phase;
    if !from.can_transition_to(to) {
        return Err(AmfError::InvalidTransition {
            state: from.name(),
            event: to.name(),
        });
    }
    log::debug!(
        "Handover state transition: {} -> {} (amf_ue_ngap_id={})",
        from.name(),
        to.name(),
        amf_ue_ngap_id
    );
    ue.handover_phase = to;
    Ok(())
}

fn expect_phase(ue: &UeNgapContext, accepted: &[HandoverPhase], event: &'static str) -> AmfResult<()> {
    if accepted.contains(&ue.handover_phase) {
        Ok(())
    } else {
        Err(AmfError::InvalidTransition {
            state: ue.handover_phase.name(),
            event,
        })
    }
}

fn not_found(amf_ue_ngap_id: u64) -> AmfError {
    AmfError::Registry(RegistryError::NotFound(UeKey::AmfUeNgapId(amf_ue_ngap_id)))
}

fn unknown_ue(assoc_id: AssocId, amf_ue_ngap_id: u64, ran_ue_ngap_id: u32) -> Vec<OutboundMessage> {
    log::warn!(
        "Unknown UE (amf_ue_ngap_id={}, ran_ue_ngap_id={}), releasing",
        amf_ue_ngap_id,
        ran_ue_ngap_id
    );
    vec![OutboundMessage::new(
        assoc_id,
        build_unknown_ue_release(amf_ue_ngap_id, ran_ue_ngap_id),
    )]
}

/// Best-effort release of whatever the target allocated: PDU sessions first,
/// then the UE context. Nothing to do until the target RAN id is known.
fn release_target_resources(
    amf_ue_ngap_id: u64,
    ho: &HandoverSession,
    admitted: &[PduSessionId],
    cause: Cause,
) -> AmfResult<Vec<OutboundMessage>> {
    let Some(target_ran) = ho.target_ran_ue_ngap_id else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(2);
    if !admitted.is_empty() {
        out.push(OutboundMessage::new(
            ho.target_assoc,
            build_pdu_session_resource_release_command(
                amf_ue_ngap_id,
                target_ran,
                admitted,
                None,
                cause,
            )?,
        ));
    }
    out.push(OutboundMessage::new(
        ho.target_assoc,
        build_ue_context_release_command(amf_ue_ngap_id, Some(target_ran), cause),
    ));
    Ok(out)
}

fn stop_guard_timer(amf: &Amf, ue: &UeNgapContext, amf_ue_ngap_id: u64) {
    if let Some(step) = ue.handover_phase.guard_timer() {
        amf.indicate(AmfIndication::StopTimer {
            amf_ue_ngap_id,
            step,
        });
    }
}

// ============================================================================
// Handover Preparation
// ============================================================================

/// Handle Handover Required from the source gNB
pub fn handle_handover_required(
    amf: &Amf,
    assoc_id: AssocId,
    msg: &HandoverRequired,
) -> AmfResult<Vec<OutboundMessage>> {
    log::debug!(
        "Handover Required, AMF UE NGAP ID: {}, RAN UE NGAP ID: {}",
        msg.amf_ue_ngap_id,
        msg.ran_ue_ngap_id
    );
    let amf_ue_ngap_id = msg.amf_ue_ngap_id;

    let Some(handle) = amf.registry.lookup_by_amf_id(amf_ue_ngap_id) else {
        return Ok(unknown_ue(assoc_id, amf_ue_ngap_id, msg.ran_ue_ngap_id));
    };
    let mut ue = handle.lock();
    expect_phase(
        &ue,
        &[HandoverPhase::Idle, HandoverPhase::Failed],
        "HandoverRequired",
    )?;
    if ue.handover_phase == HandoverPhase::Failed {
        transition(&mut ue, HandoverPhase::Idle, amf_ue_ngap_id)?;
    }

    let refuse = |cause: CauseRadioNetwork| {
        log::warn!(
            "Handover refused (amf_ue_ngap_id={}): {:?}",
            amf_ue_ngap_id,
            cause
        );
        Ok(vec![OutboundMessage::new(
            assoc_id,
            build_handover_preparation_failure(
                amf_ue_ngap_id,
                msg.ran_ue_ngap_id,
                Cause::RadioNetwork(cause),
            ),
        )])
    };

    // Both ids must name this context on this association
    if handle.ran_key() != RanKey::new(assoc_id, msg.ran_ue_ngap_id) {
        return refuse(CauseRadioNetwork::InconsistentRemoteUeNgapId);
    }
    if msg.handover_type != HandoverType::Intra5gs {
        return refuse(CauseRadioNetwork::HoTargetNotAllowed);
    }

    let TargetId::RanNode {
        global_ran_node_id,
        selected_tai,
    } = msg.target_id;
    let Some(target) = amf.gnbs.find_by_global_id(&global_ran_node_id) else {
        return refuse(CauseRadioNetwork::UnknownTargetId);
    };
    if !target.serves_tai(&selected_tai) {
        return refuse(CauseRadioNetwork::UnknownTargetId);
    }
    let source = amf
        .gnbs
        .find_by_assoc(assoc_id)
        .ok_or(AmfError::UnknownAssociation(assoc_id))?;

    // PLMN compatibility: some PLMN must be broadcast on both sides
    let source_plmns = source.broadcast_plmns();
    if target
        .broadcast_plmns()
        .intersection(&source_plmns)
        .next()
        .is_none()
    {
        return refuse(CauseRadioNetwork::HoTargetNotAllowed);
    }

    let (requested, failed): (Vec<PduSessionId>, Vec<PduSessionId>) = msg
        .pdu_session_list
        .ids()
        .into_iter()
        .partition(|id| ue.sessions.contains_key(&id.0));
    for id in &failed {
        log::warn!(
            "PDU session {} unknown to amf_ue_ngap_id={}, not handed over",
            id.0,
            amf_ue_ngap_id
        );
    }
    if requested.is_empty() {
        return refuse(CauseRadioNetwork::UnknownPduSessionId);
    }

    let ho = HandoverSession {
        source_assoc: assoc_id,
        source_ran_ue_ngap_id: msg.ran_ue_ngap_id,
        target_assoc: target.assoc_id,
        target_ran_ue_ngap_id: None,
        target_id: global_ran_node_id,
        selected_tai,
        requested,
        admitted: Vec::new(),
        failed,
    };
    let request = build_handover_request(
        amf_ue_ngap_id,
        &ue,
        &amf.profile,
        &ho,
        msg.source_to_target_container.clone(),
    )?;
    transition(&mut ue, HandoverPhase::RequiredSent, amf_ue_ngap_id)?;
    ue.handover = Some(ho);
    transition(&mut ue, HandoverPhase::RequestSent, amf_ue_ngap_id)?;
    amf.indicate(AmfIndication::StartTimer {
        amf_ue_ngap_id,
        step: HandoverStep::Preparation,
        duration: amf.profile.handover_preparation_timeout,
    });

    log::info!(
        "Handover Request sent (amf_ue_ngap_id={}, target={})",
        amf_ue_ngap_id,
        global_ran_node_id
    );
    Ok(vec![OutboundMessage::new(target.assoc_id, request)])
}

// ============================================================================
// Handover Resource Allocation
// ============================================================================

/// Handle Handover Request Acknowledge from the target gNB
pub fn handle_handover_request_ack(
    amf: &Amf,
    assoc_id: AssocId,
    msg: &HandoverRequestAcknowledge,
) -> AmfResult<Vec<OutboundMessage>> {
    log::debug!(
        "Handover Request Acknowledge, AMF UE NGAP ID: {}, RAN UE NGAP ID: {}",
        msg.amf_ue_ngap_id,
        msg.ran_ue_ngap_id
    );
    let amf_ue_ngap_id = msg.amf_ue_ngap_id;
    let handle = amf
        .registry
        .lookup_by_amf_id(amf_ue_ngap_id)
        .ok_or_else(|| not_found(amf_ue_ngap_id))?;
    let mut ue = handle.lock();

    // The sender allocated resources nobody is waiting for: after a timeout
    // or cancel, or on a gNB other than the chosen target
    let awaited = ue.handover_phase == HandoverPhase::RequestSent
        && ue.handover.as_ref().is_some_and(|ho| ho.target_assoc == assoc_id);
    if !awaited {
        log::warn!(
            "[assoc={}] Handover Request Acknowledge in {} (amf_ue_ngap_id={}), releasing its resources",
            assoc_id,
            ue.handover_phase.name(),
            amf_ue_ngap_id
        );
        return Ok(vec![OutboundMessage::new(
            assoc_id,
            build_ue_context_release_command(
                amf_ue_ngap_id,
                Some(msg.ran_ue_ngap_id),
                Cause::RadioNetwork(CauseRadioNetwork::HandoverCancelled),
            ),
        )]);
    }
    let Some(mut ho) = ue.handover.take() else {
        return Err(AmfError::InvalidTransition {
            state: ue.handover_phase.name(),
            event: "HandoverRequestAcknowledge",
        });
    };
    ho.target_ran_ue_ngap_id = Some(msg.ran_ue_ngap_id);

    match msg.partition(&ho.requested) {
        Err(e) => {
            log::error!(
                "Handover Request Acknowledge rejected (amf_ue_ngap_id={}): {}",
                amf_ue_ngap_id,
                e
            );
            stop_guard_timer(amf, &ue, amf_ue_ngap_id);
            transition(&mut ue, HandoverPhase::Failed, amf_ue_ngap_id)?;
            let cause = Cause::RadioNetwork(
                CauseRadioNetwork::HoFailureInTarget5gcNgranNodeOrTargetSystem,
            );
            let mut out = vec![OutboundMessage::new(
                ho.source_assoc,
                build_handover_preparation_failure(
                    amf_ue_ngap_id,
                    ho.source_ran_ue_ngap_id,
                    cause,
                ),
            )];
            out.extend(release_target_resources(
                amf_ue_ngap_id,
                &ho,
                &msg.admitted_list.ids(),
                cause,
            )?);
            Ok(out)
        }
        Ok((admitted, failed)) => {
            ho.admitted = admitted;
            for id in failed {
                if !ho.failed.contains(&id) {
                    ho.failed.push(id);
                }
            }
            for item in &msg.admitted_list.0 {
                if let Some(session) = ue.sessions.get_mut(&item.pdu_session_id.0) {
                    session.response_transfer = Some(item.transfer.clone());
                }
            }

            let command = match build_handover_command(amf_ue_ngap_id, &ho, msg) {
                Ok(command) => command,
                Err(e) => {
                    ue.handover = Some(ho);
                    return Err(e.into());
                }
            };
            stop_guard_timer(amf, &ue, amf_ue_ngap_id);
            transition(&mut ue, HandoverPhase::Acknowledged, amf_ue_ngap_id)?;
            transition(&mut ue, HandoverPhase::CommandSent, amf_ue_ngap_id)?;
            amf.indicate(AmfIndication::StartTimer {
                amf_ue_ngap_id,
                step: HandoverStep::Completion,
                duration: amf.profile.handover_completion_timeout,
            });

            let source_assoc = ho.source_assoc;
            ue.handover = Some(ho);
            Ok(vec![OutboundMessage::new(source_assoc, command)])
        }
    }
}

/// Handle Handover Failure from the target gNB
pub fn handle_handover_failure(
    amf: &Amf,
    assoc_id: AssocId,
    msg: &HandoverFailure,
) -> AmfResult<Vec<OutboundMessage>> {
    log::debug!(
        "Handover Failure, AMF UE NGAP ID: {}, cause: {}",
        msg.amf_ue_ngap_id,
        msg.cause
    );
    let amf_ue_ngap_id = msg.amf_ue_ngap_id;
    let handle = amf
        .registry
        .lookup_by_amf_id(amf_ue_ngap_id)
        .ok_or_else(|| not_found(amf_ue_ngap_id))?;
    let mut ue = handle.lock();
    expect_phase(&ue, &[HandoverPhase::RequestSent], "HandoverFailure")?;
    let target_matches = ue
        .handover
        .as_ref()
        .is_some_and(|ho| ho.target_assoc == assoc_id);
    if !target_matches {
        return Err(AmfError::InvalidTransition {
            state: ue.handover_phase.name(),
            event: "HandoverFailure",
        });
    }

    stop_guard_timer(amf, &ue, amf_ue_ngap_id);
    transition(&mut ue, HandoverPhase::Failed, amf_ue_ngap_id)?;
    let Some(ho) = ue.handover.take() else {
        return Ok(Vec::new());
    };
    Ok(vec![OutboundMessage::new(
        ho.source_assoc,
        build_handover_preparation_failure(amf_ue_ngap_id, ho.source_ran_ue_ngap_id, msg.cause),
    )])
}

// ============================================================================
// Handover Execution
// ============================================================================

/// Handle Uplink RAN Status Transfer from the source gNB
pub fn handle_uplink_ran_status_transfer(
    amf: &Amf,
    assoc_id: AssocId,
    msg: &UplinkRanStatusTransfer,
) -> AmfResult<Vec<OutboundMessage>> {
    log::debug!(
        "Uplink RAN Status Transfer, AMF UE NGAP ID: {}, RAN UE NGAP ID: {}, DRBs: {}",
        msg.amf_ue_ngap_id,
        msg.ran_ue_ngap_id,
        msg.container.drbs.len()
    );
    let Some(handle) = amf.registry.lookup_by_amf_id(msg.amf_ue_ngap_id) else {
        return Ok(unknown_ue(assoc_id, msg.amf_ue_ngap_id, msg.ran_ue_ngap_id));
    };
    let mut ue = handle.lock();
    expect_phase(&ue, &[HandoverPhase::CommandSent], "UplinkRanStatusTransfer")?;

    let route = ue.handover.as_ref().and_then(|ho| {
        let from_source = ho.source_assoc == assoc_id
            && ho.source_ran_ue_ngap_id == msg.ran_ue_ngap_id;
        from_source
            .then_some(ho.target_ran_ue_ngap_id.map(|ran| (ho.target_assoc, ran)))
            .flatten()
    });
    let Some((target_assoc, target_ran)) = route else {
        return Err(AmfError::InvalidTransition {
            state: ue.handover_phase.name(),
            event: "UplinkRanStatusTransfer",
        });
    };

    ue.drb_status = msg.container.drbs.clone();
    Ok(vec![OutboundMessage::new(
        target_assoc,
        build_downlink_ran_status_transfer(msg.amf_ue_ngap_id, target_ran, msg.container.clone()),
    )])
}

/// Handle Handover Notify from the target gNB: the UE has arrived
pub fn handle_handover_notify(
    amf: &Amf,
    assoc_id: AssocId,
    msg: &HandoverNotify,
) -> AmfResult<Vec<OutboundMessage>> {
    log::debug!(
        "Handover Notify, AMF UE NGAP ID: {}, RAN UE NGAP ID: {}",
        msg.amf_ue_ngap_id,
        msg.ran_ue_ngap_id
    );
    let amf_ue_ngap_id = msg.amf_ue_ngap_id;
    let Some(handle) = amf.registry.lookup_by_amf_id(amf_ue_ngap_id) else {
        return Ok(unknown_ue(assoc_id, amf_ue_ngap_id, msg.ran_ue_ngap_id));
    };
    let mut ue = handle.lock();
    expect_phase(&ue, &[HandoverPhase::CommandSent], "HandoverNotify")?;
    let from_target = ue.handover.as_ref().is_some_and(|ho| {
        ho.target_assoc == assoc_id && ho.target_ran_ue_ngap_id == Some(msg.ran_ue_ngap_id)
    });
    if !from_target {
        return Err(AmfError::InvalidTransition {
            state: ue.handover_phase.name(),
            event: "HandoverNotify",
        });
    }

    stop_guard_timer(amf, &ue, amf_ue_ngap_id);
    transition(&mut ue, HandoverPhase::Completing, amf_ue_ngap_id)?;
    let Some(ho) = ue.handover.take() else {
        return Ok(Vec::new());
    };

    // Tear down the source side
    let release = OutboundMessage::new(
        ho.source_assoc,
        build_ue_context_release_command(
            amf_ue_ngap_id,
            Some(ho.source_ran_ue_ngap_id),
            Cause::RadioNetwork(CauseRadioNetwork::SuccessfulHandover),
        ),
    );

    if let Err(e) = amf
        .registry
        .rebind_ran(&handle, RanKey::new(ho.target_assoc, msg.ran_ue_ngap_id))
    {
        log::error!(
            "Rebind after handover failed (amf_ue_ngap_id={}): {}",
            amf_ue_ngap_id,
            e
        );
    }
    ue.user_location = Some(msg.user_location_information);
    ue.sessions
        .retain(|id, _| ho.admitted.contains(&PduSessionId(*id)));
    ue.drb_status.clear();
    transition(&mut ue, HandoverPhase::Idle, amf_ue_ngap_id)?;

    log::info!(
        "Handover complete (amf_ue_ngap_id={}, assoc={} -> {})",
        amf_ue_ngap_id,
        ho.source_assoc,
        ho.target_assoc
    );
    Ok(vec![release])
}

/// Handle Handover Cancel from the source gNB
pub fn handle_handover_cancel(
    amf: &Amf,
    assoc_id: AssocId,
    msg: &HandoverCancel,
) -> AmfResult<Vec<OutboundMessage>> {
    log::debug!(
        "Handover Cancel, AMF UE NGAP ID: {}, RAN UE NGAP ID: {}, cause: {}",
        msg.amf_ue_ngap_id,
        msg.ran_ue_ngap_id,
        msg.cause
    );
    let amf_ue_ngap_id = msg.amf_ue_ngap_id;
    let Some(handle) = amf.registry.lookup_by_amf_id(amf_ue_ngap_id) else {
        return Ok(unknown_ue(assoc_id, amf_ue_ngap_id, msg.ran_ue_ngap_id));
    };
    let mut ue = handle.lock();
    expect_phase(
        &ue,
        &[
            HandoverPhase::RequestSent,
            HandoverPhase::Acknowledged,
            HandoverPhase::CommandSent,
        ],
        "HandoverCancel",
    )?;
    let from_source = ue
        .handover
        .as_ref()
        .is_some_and(|ho| ho.source_assoc == assoc_id);
    if !from_source {
        return Err(AmfError::InvalidTransition {
            state: ue.handover_phase.name(),
            event: "HandoverCancel",
        });
    }

    stop_guard_timer(amf, &ue, amf_ue_ngap_id);
    let Some(ho) = ue.handover.take() else {
        return Ok(Vec::new());
    };
    let mut out = release_target_resources(
        amf_ue_ngap_id,
        &ho,
        &ho.admitted,
        Cause::RadioNetwork(CauseRadioNetwork::HandoverCancelled),
    )?;
    out.push(OutboundMessage::new(
        assoc_id,
        build_handover_cancel_ack(amf_ue_ngap_id, msg.ran_ue_ngap_id),
    ));
    transition(&mut ue, HandoverPhase::Idle, amf_ue_ngap_id)?;
    Ok(out)
}

// ============================================================================
// Timers and association loss
// ============================================================================

/// A guard timer fired. Timers for a phase the UE has already left are stale.
pub fn handle_timeout(
    amf: &Amf,
    amf_ue_ngap_id: u64,
    step: HandoverStep,
) -> AmfResult<Vec<OutboundMessage>> {
    let Some(handle) = amf.registry.lookup_by_amf_id(amf_ue_ngap_id) else {
        log::debug!(
            "{} expired for released UE (amf_ue_ngap_id={})",
            step.name(),
            amf_ue_ngap_id
        );
        return Ok(Vec::new());
    };
    let mut ue = handle.lock();
    if ue.handover_phase.guard_timer() != Some(step) {
        log::debug!(
            "Stale {} in {} (amf_ue_ngap_id={})",
            step.name(),
            ue.handover_phase.name(),
            amf_ue_ngap_id
        );
        return Ok(Vec::new());
    }

    log::warn!(
        "{} expired (amf_ue_ngap_id={})",
        step.name(),
        amf_ue_ngap_id
    );
    transition(&mut ue, HandoverPhase::Failed, amf_ue_ngap_id)?;
    let Some(ho) = ue.handover.take() else {
        return Ok(Vec::new());
    };

    match step {
        HandoverStep::Preparation => {
            let cause = Cause::RadioNetwork(CauseRadioNetwork::TngrelocprepExpiry);
            let mut out = vec![OutboundMessage::new(
                ho.source_assoc,
                build_handover_preparation_failure(
                    amf_ue_ngap_id,
                    ho.source_ran_ue_ngap_id,
                    cause,
                ),
            )];
            out.extend(release_target_resources(
                amf_ue_ngap_id,
                &ho,
                &ho.admitted,
                cause,
            )?);
            Ok(out)
        }
        HandoverStep::Completion => release_target_resources(
            amf_ue_ngap_id,
            &ho,
            &ho.admitted,
            Cause::RadioNetwork(CauseRadioNetwork::TngrelocoverallExpiry),
        ),
    }
}

/// The UE's own association is gone: release what the target holds. The
/// caller destroys the context afterwards.
pub(crate) fn abort_for_lost_source(
    amf: &Amf,
    handle: &UeHandle,
    lost: AssocId,
) -> AmfResult<Vec<OutboundMessage>> {
    let mut ue = handle.lock();
    if !ue.handover_phase.is_in_flight() {
        return Ok(Vec::new());
    }
    let Some(amf_ue_ngap_id) = handle.amf_ue_ngap_id() else {
        return Ok(Vec::new());
    };
    stop_guard_timer(amf, &ue, amf_ue_ngap_id);
    transition(&mut ue, HandoverPhase::Failed, amf_ue_ngap_id)?;
    let Some(ho) = ue.handover.take() else {
        return Ok(Vec::new());
    };
    if ho.target_assoc == lost {
        return Ok(Vec::new());
    }
    release_target_resources(
        amf_ue_ngap_id,
        &ho,
        &ho.admitted,
        Cause::RadioNetwork(CauseRadioNetwork::RadioConnectionWithUeLost),
    )
}

/// The handover target's association is gone: fail the handover and keep
/// the UE on its source
pub(crate) fn abort_for_lost_target(
    amf: &Amf,
    handle: &UeHandle,
    lost: AssocId,
) -> AmfResult<Vec<OutboundMessage>> {
    let mut ue = handle.lock();
    let targets_lost = ue
        .handover
        .as_ref()
        .is_some_and(|ho| ho.target_assoc == lost);
    if !ue.handover_phase.is_in_flight() || !targets_lost {
        return Ok(Vec::new());
    }
    let Some(amf_ue_ngap_id) = handle.amf_ue_ngap_id() else {
        return Ok(Vec::new());
    };

    let preparing = matches!(
        ue.handover_phase,
        HandoverPhase::RequiredSent | HandoverPhase::RequestSent
    );
    stop_guard_timer(amf, &ue, amf_ue_ngap_id);
    transition(&mut ue, HandoverPhase::Failed, amf_ue_ngap_id)?;
    let Some(ho) = ue.handover.take() else {
        return Ok(Vec::new());
    };

    if preparing && ho.source_assoc != lost {
        Ok(vec![OutboundMessage::new(
            ho.source_assoc,
            build_handover_preparation_failure(
                amf_ue_ngap_id,
                ho.source_ran_ue_ngap_id,
                Cause::RadioNetwork(CauseRadioNetwork::HoFailureInTarget5gcNgranNodeOrTargetSystem),
            ),
        )])
    } else {
        Ok(Vec::new())
    }
}
