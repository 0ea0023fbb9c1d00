//! N2 Handover Integration Tests
//!
//! Source gNB on association 1, target gNB on association 2. Covers
//! preparation, resource allocation, execution, cancel, guard timers and
//! association loss on either side.
//!
//! Reference: 3GPP TS 38.413 section 8.4

use nextgcore_amfd::config::{PlmnConf, PlmnSupportConf, SNssaiConf};
use nextgcore_amfd::{AmfIndication, HandoverPhase, HandoverStep, OutboundMessage, RanKey};
use nextgcore_tests::*;
use ogs_asn1c::ngap::{AmfUeNgapId, Cause, CauseRadioNetwork, PduSessionId, RanUeNgapId};
use ogs_ngap::ie::{
    CountValue, DrbStatusDl, DrbStatusItem, DrbStatusUl, HandoverType, PdcpSnLength, PlmnId,
    RanStatusTransferContainer, UeNgapIds,
};
use ogs_ngap::msg::{HandoverCancel, HandoverFailure, HandoverNotify, HandoverRequired, UeContextReleaseComplete, UplinkRanStatusTransfer};
use ogs_ngap::NgapMessage;

const TARGET_RAN_ID: u32 = 50;

fn ids(list: &[u8]) -> Vec<PduSessionId> {
    list.iter().map(|id| PduSessionId(*id)).collect()
}

fn phase(bench: &Bench, amf_ue_ngap_id: u64) -> HandoverPhase {
    bench
        .context(amf_ue_ngap_id)
        .map(|ctx| ctx.handover_phase())
        .unwrap_or_else(|| panic!("context {amf_ue_ngap_id} gone"))
}

fn preparation_failure_cause(message: &OutboundMessage) -> Cause {
    match &message.message {
        NgapMessage::HandoverPreparationFailure(failure) => failure.cause,
        other => panic!("expected Handover Preparation Failure, got {}", other.name()),
    }
}

/// A late or misdirected acknowledge is answered with a release of the
/// sender's resources under the ids it used
fn assert_sender_released(message: &OutboundMessage, assoc_id: u64, amf_ue_ngap_id: u64) {
    assert_eq!(message.assoc_id, assoc_id);
    let NgapMessage::UeContextReleaseCommand(cmd) = &message.message else {
        panic!("expected UE Context Release Command, got {}", message.message.name());
    };
    assert_eq!(
        cmd.ue_ngap_ids,
        UeNgapIds::Pair {
            amf_ue_ngap_id: AmfUeNgapId(amf_ue_ngap_id),
            ran_ue_ngap_id: RanUeNgapId(TARGET_RAN_ID),
        }
    );
    assert_eq!(cmd.cause, Cause::RadioNetwork(CauseRadioNetwork::HandoverCancelled));
}

fn status_container() -> RanStatusTransferContainer {
    RanStatusTransferContainer {
        drbs: vec![DrbStatusItem {
            drb_id: 1,
            ul: DrbStatusUl {
                sn_length: PdcpSnLength::Sn12,
                count: CountValue { pdcp_sn: 100, hfn: 5 },
                receive_status: None,
            },
            dl: DrbStatusDl {
                sn_length: PdcpSnLength::Sn12,
                count: CountValue { pdcp_sn: 200, hfn: 5 },
            },
        }],
    }
}

/// Attach with `sessions` and run preparation up to RequestSent
fn prepared(bench: &mut Bench, sessions: &[u8]) -> u64 {
    let id = bench.attach_with_sessions(1, sessions);
    let out = bench
        .source
        .send(&bench.amf, bench.handover_required(id, 1, sessions))
        .unwrap();
    let request = single(&out);
    assert_eq!(request.assoc_id, bench.target.assoc_id);
    assert!(matches!(request.message, NgapMessage::HandoverRequest(_)));
    assert_eq!(phase(bench, id), HandoverPhase::RequestSent);
    bench.drain_indications();
    id
}

/// Run preparation and resource allocation up to CommandSent
fn commanded(bench: &mut Bench, sessions: &[u8], admitted: &[u8]) -> u64 {
    let id = prepared(bench, sessions);
    let ack = bench.request_acknowledge(id, TARGET_RAN_ID, admitted, &[]);
    let out = bench.target.send(&bench.amf, ack).unwrap();
    assert!(matches!(single(&out).message, NgapMessage::HandoverCommand(_)));
    assert_eq!(phase(bench, id), HandoverPhase::CommandSent);
    bench.drain_indications();
    id
}

#[test]
fn test_n2_handover_with_partial_admission() {
    let mut bench = Bench::new();
    let id = bench.attach_with_sessions(1, &[1, 2, 3]);

    // Preparation
    let out = bench
        .source
        .send(&bench.amf, bench.handover_required(id, 1, &[1, 2, 3]))
        .unwrap();
    let request = single(&out);
    assert_eq!(request.assoc_id, bench.target.assoc_id);
    let NgapMessage::HandoverRequest(req) = &request.message else {
        panic!("expected Handover Request, got {}", request.message.name());
    };
    assert_eq!(req.amf_ue_ngap_id, id);
    assert_eq!(req.pdu_session_setup_list.ids(), ids(&[1, 2, 3]));
    assert_eq!(req.source_to_target_container.as_bytes(), &[0x40, 0x41, 0x42]);
    assert_eq!(
        bench.drain_indications(),
        vec![AmfIndication::StartTimer {
            amf_ue_ngap_id: id,
            step: HandoverStep::Preparation,
            duration: bench.amf.profile().handover_preparation_timeout,
        }]
    );

    // Resource allocation: the target admits 1 and 2
    let ack = bench.request_acknowledge(id, TARGET_RAN_ID, &[1, 2], &[3]);
    let out = bench.target.send(&bench.amf, ack).unwrap();
    let command = single(&out);
    assert_eq!(command.assoc_id, bench.source.assoc_id);
    let NgapMessage::HandoverCommand(cmd) = &command.message else {
        panic!("expected Handover Command, got {}", command.message.name());
    };
    assert_eq!(cmd.ran_ue_ngap_id, 1);
    assert_eq!(cmd.handover_list.as_ref().map(|l| l.ids()), Some(ids(&[1, 2])));
    assert_eq!(cmd.to_release_list.as_ref().map(|l| l.ids()), Some(ids(&[3])));
    assert_eq!(cmd.target_to_source_container.as_bytes(), &[0x50, 0x51]);
    assert_eq!(phase(&bench, id), HandoverPhase::CommandSent);
    let indications = bench.drain_indications();
    assert!(indications.contains(&AmfIndication::StopTimer {
        amf_ue_ngap_id: id,
        step: HandoverStep::Preparation,
    }));
    assert!(indications.iter().any(|i| matches!(
        i,
        AmfIndication::StartTimer { step: HandoverStep::Completion, .. }
    )));

    // Status transfer is relayed to the target with its own RAN id
    let status = UplinkRanStatusTransfer {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: 1,
        container: status_container(),
    };
    let out = bench.source.send(&bench.amf, status).unwrap();
    let relayed = single(&out);
    assert_eq!(relayed.assoc_id, bench.target.assoc_id);
    let NgapMessage::DownlinkRanStatusTransfer(dl) = &relayed.message else {
        panic!("expected Downlink RAN Status Transfer");
    };
    assert_eq!(dl.ran_ue_ngap_id, TARGET_RAN_ID);
    assert_eq!(dl.container, status_container());

    // Execution completes on the target
    let notify = HandoverNotify {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: TARGET_RAN_ID,
        user_location_information: bench.target.user_location(),
    };
    let out = bench.target.send(&bench.amf, notify).unwrap();
    let release = single(&out);
    assert_eq!(release.assoc_id, bench.source.assoc_id);
    let NgapMessage::UeContextReleaseCommand(rel) = &release.message else {
        panic!("expected UE Context Release Command");
    };
    assert_eq!(rel.cause, Cause::RadioNetwork(CauseRadioNetwork::SuccessfulHandover));

    let ctx = bench.context(id).unwrap();
    assert_eq!(ctx.handover_phase(), HandoverPhase::Idle);
    assert!(ctx.handover.is_none());
    assert_eq!(ctx.session_ids(), ids(&[1, 2]));
    assert_eq!(ctx.sessions[&1u8].response_transfer.as_deref(), Some(&[0x30, 1][..]));
    assert_eq!(ctx.user_location, Some(bench.target.user_location()));
    assert!(ctx.drb_status.is_empty());

    let registry = bench.amf.registry();
    let moved = registry
        .lookup_by_ran_id(RanKey::new(bench.target.assoc_id, TARGET_RAN_ID))
        .unwrap();
    assert_eq!(moved.amf_ue_ngap_id(), Some(id));
    assert!(registry
        .lookup_by_ran_id(RanKey::new(bench.source.assoc_id, 1))
        .is_none());

    // The old source confirms; the context now belongs to the target
    let complete = UeContextReleaseComplete {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: 1,
        user_location_information: None,
    };
    assert!(bench.source.send(&bench.amf, complete).unwrap().is_empty());
    assert!(bench.context(id).is_some());
}

#[test]
fn test_n2_handover_with_full_admission() {
    let mut bench = Bench::new();
    let id = prepared(&mut bench, &[1, 2]);

    let ack = bench.request_acknowledge(id, TARGET_RAN_ID, &[1, 2], &[]);
    let out = bench.target.send(&bench.amf, ack).unwrap();
    let command = single(&out);
    assert_eq!(command.assoc_id, bench.source.assoc_id);
    let NgapMessage::HandoverCommand(cmd) = &command.message else {
        panic!("expected Handover Command, got {}", command.message.name());
    };
    assert_eq!(cmd.handover_list.as_ref().map(|l| l.ids()), Some(ids(&[1, 2])));
    assert_eq!(cmd.to_release_list, None);

    let notify = HandoverNotify {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: TARGET_RAN_ID,
        user_location_information: bench.target.user_location(),
    };
    let out = bench.target.send(&bench.amf, notify).unwrap();
    assert_eq!(single(&out).assoc_id, bench.source.assoc_id);

    let ctx = bench.context(id).unwrap();
    assert_eq!(ctx.handover_phase(), HandoverPhase::Idle);
    assert_eq!(ctx.session_ids(), ids(&[1, 2]));
    let ue = bench.amf.registry().lookup_by_amf_id(id).unwrap();
    assert_eq!(ue.ran_key(), RanKey::new(bench.target.assoc_id, TARGET_RAN_ID));
    let by_ran = bench
        .amf
        .registry()
        .lookup_by_ran_id(RanKey::new(bench.target.assoc_id, TARGET_RAN_ID))
        .unwrap();
    assert!(std::sync::Arc::ptr_eq(&ue, &by_ran));
}

#[test]
fn test_handover_required_skips_unknown_sessions() {
    let mut bench = Bench::new();
    let id = bench.attach_with_sessions(1, &[1]);

    let out = bench
        .source
        .send(&bench.amf, bench.handover_required(id, 1, &[1, 7]))
        .unwrap();
    let NgapMessage::HandoverRequest(req) = &single(&out).message else {
        panic!("expected Handover Request");
    };
    assert_eq!(req.pdu_session_setup_list.ids(), ids(&[1]));

    let ack = bench.request_acknowledge(id, TARGET_RAN_ID, &[1], &[]);
    let out = bench.target.send(&bench.amf, ack).unwrap();
    let NgapMessage::HandoverCommand(cmd) = &single(&out).message else {
        panic!("expected Handover Command");
    };
    assert_eq!(cmd.to_release_list.as_ref().map(|l| l.ids()), Some(ids(&[7])));
}

#[test]
fn test_handover_required_refusals() {
    let mut bench = Bench::new();
    let id = bench.attach_with_sessions(1, &[1]);

    let refusal = |bench: &Bench, required: HandoverRequired| {
        let out = bench.source.send(&bench.amf, required).unwrap();
        let reply = single(&out);
        assert_eq!(reply.assoc_id, bench.source.assoc_id);
        preparation_failure_cause(reply)
    };

    // RAN id does not match the context's binding
    let required = bench.handover_required(id, 9, &[1]);
    assert_eq!(
        refusal(&bench, required),
        Cause::RadioNetwork(CauseRadioNetwork::InconsistentRemoteUeNgapId)
    );

    let mut required = bench.handover_required(id, 1, &[1]);
    required.handover_type = HandoverType::FivegsToEps;
    assert_eq!(
        refusal(&bench, required),
        Cause::RadioNetwork(CauseRadioNetwork::HoTargetNotAllowed)
    );

    // No NG Setup from this gNB
    let mut required = bench.handover_required(id, 1, &[1]);
    required.target_id = GnbSim::new(3, 0x303, 2).target_id();
    assert_eq!(
        refusal(&bench, required),
        Cause::RadioNetwork(CauseRadioNetwork::UnknownTargetId)
    );

    // Known target, TAI it does not serve
    let mut required = bench.handover_required(id, 1, &[1]);
    required.target_id = GnbSim::new(2, 0x202, 99).target_id();
    assert_eq!(
        refusal(&bench, required),
        Cause::RadioNetwork(CauseRadioNetwork::UnknownTargetId)
    );

    // None of the listed sessions exist
    let required = bench.handover_required(id, 1, &[7, 8]);
    assert_eq!(
        refusal(&bench, required),
        Cause::RadioNetwork(CauseRadioNetwork::UnknownPduSessionId)
    );

    assert_eq!(phase(&bench, id), HandoverPhase::Idle);
    assert!(bench.drain_indications().is_empty());
}

#[test]
fn test_handover_refused_without_common_plmn() {
    let mut config = test_config();
    config.plmn_support.push(PlmnSupportConf {
        plmn_id: PlmnConf {
            mcc: 1,
            mnc: 1,
            mnc_len: Some(2),
        },
        s_nssai: vec![SNssaiConf { sst: 1, sd: None }],
    });
    let mut bench = Bench::with_profile(config.resolve().unwrap());
    let id = bench.attach_with_sessions(1, &[1]);

    let foreign = GnbSim::new(3, 0x303, 3).with_plmn(PlmnId::from_mcc_mnc(1, 1, 2));
    let out = foreign.send(&bench.amf, foreign.ng_setup_request()).unwrap();
    assert!(matches!(single(&out).message, NgapMessage::NgSetupResponse(_)));

    let mut required = bench.handover_required(id, 1, &[1]);
    required.target_id = foreign.target_id();
    let out = bench.source.send(&bench.amf, required).unwrap();
    assert_eq!(
        preparation_failure_cause(single(&out)),
        Cause::RadioNetwork(CauseRadioNetwork::HoTargetNotAllowed)
    );
    assert_eq!(phase(&bench, id), HandoverPhase::Idle);
}

#[test]
fn test_handover_required_for_unknown_ue() {
    let bench = Bench::new();
    let out = bench
        .source
        .send(&bench.amf, bench.handover_required(777, 1, &[1]))
        .unwrap();
    let reply = single(&out);
    assert_eq!(reply.assoc_id, bench.source.assoc_id);
    let NgapMessage::UeContextReleaseCommand(cmd) = &reply.message else {
        panic!("expected UE Context Release Command");
    };
    assert_eq!(cmd.cause, Cause::RadioNetwork(CauseRadioNetwork::UnknownLocalUeNgapId));
}

#[test]
fn test_duplicate_handover_required_is_ignored() {
    let mut bench = Bench::new();
    let id = prepared(&mut bench, &[1]);

    let out = bench
        .source
        .send(&bench.amf, bench.handover_required(id, 1, &[1]))
        .unwrap();
    assert!(out.is_empty());
    assert_eq!(phase(&bench, id), HandoverPhase::RequestSent);
}

#[test]
fn test_preparation_timeout_then_retry() {
    let mut bench = Bench::new();
    let id = prepared(&mut bench, &[1]);

    let out = bench.amf.handle_timeout(id, HandoverStep::Preparation);
    // The target never answered, so there is nothing to release there
    let reply = single(&out);
    assert_eq!(reply.assoc_id, bench.source.assoc_id);
    assert_eq!(
        preparation_failure_cause(reply),
        Cause::RadioNetwork(CauseRadioNetwork::TngrelocprepExpiry)
    );
    assert_eq!(phase(&bench, id), HandoverPhase::Failed);

    // A late acknowledge gets its target resources released
    let ack = bench.request_acknowledge(id, TARGET_RAN_ID, &[1], &[]);
    let out = bench.target.send(&bench.amf, ack).unwrap();
    assert_sender_released(single(&out), bench.target.assoc_id, id);
    assert_eq!(phase(&bench, id), HandoverPhase::Failed);
    assert!(bench.context(id).unwrap().handover.is_none());

    // The target confirms; the UE stays on its source
    let complete = UeContextReleaseComplete {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: TARGET_RAN_ID,
        user_location_information: None,
    };
    assert!(bench.target.send(&bench.amf, complete).unwrap().is_empty());
    assert_eq!(
        bench.amf.registry().lookup_by_amf_id(id).unwrap().ran_key(),
        RanKey::new(bench.source.assoc_id, 1)
    );

    // The source may try again
    let out = bench
        .source
        .send(&bench.amf, bench.handover_required(id, 1, &[1]))
        .unwrap();
    assert!(matches!(single(&out).message, NgapMessage::HandoverRequest(_)));
    assert_eq!(phase(&bench, id), HandoverPhase::RequestSent);
}

#[test]
fn test_stale_timeout_is_ignored() {
    let mut bench = Bench::new();
    let id = commanded(&mut bench, &[1], &[1]);

    assert!(bench.amf.handle_timeout(id, HandoverStep::Preparation).is_empty());
    assert_eq!(phase(&bench, id), HandoverPhase::CommandSent);

    // Timers for released contexts are dropped too
    assert!(bench.amf.handle_timeout(9999, HandoverStep::Completion).is_empty());
}

#[test]
fn test_completion_timeout_releases_target() {
    let mut bench = Bench::new();
    let id = commanded(&mut bench, &[1, 2], &[1, 2]);

    let out = bench.amf.handle_timeout(id, HandoverStep::Completion);
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|m| m.assoc_id == bench.target.assoc_id));
    let NgapMessage::PduSessionResourceReleaseCommand(cmd) = &out[0].message else {
        panic!("expected PDU Session Resource Release Command");
    };
    assert_eq!(cmd.ran_ue_ngap_id, TARGET_RAN_ID);
    assert_eq!(cmd.to_release_list.ids(), ids(&[1, 2]));
    let NgapMessage::UeContextReleaseCommand(rel) = &out[1].message else {
        panic!("expected UE Context Release Command");
    };
    assert_eq!(rel.cause, Cause::RadioNetwork(CauseRadioNetwork::TngrelocoverallExpiry));

    // The UE stays on its source
    assert_eq!(phase(&bench, id), HandoverPhase::Failed);
    let ue = bench
        .amf
        .registry()
        .lookup_by_ran_id(RanKey::new(bench.source.assoc_id, 1))
        .unwrap();
    assert_eq!(ue.amf_ue_ngap_id(), Some(id));
}

#[test]
fn test_handover_failure_from_target() {
    let mut bench = Bench::new();
    let id = prepared(&mut bench, &[1]);

    let failure = HandoverFailure {
        amf_ue_ngap_id: id,
        cause: Cause::RadioNetwork(CauseRadioNetwork::NoRadioResourcesAvailableInTargetCell),
    };
    let out = bench.target.send(&bench.amf, failure).unwrap();
    let reply = single(&out);
    assert_eq!(reply.assoc_id, bench.source.assoc_id);
    assert_eq!(
        preparation_failure_cause(reply),
        Cause::RadioNetwork(CauseRadioNetwork::NoRadioResourcesAvailableInTargetCell)
    );
    assert_eq!(phase(&bench, id), HandoverPhase::Failed);
    assert!(bench.drain_indications().contains(&AmfIndication::StopTimer {
        amf_ue_ngap_id: id,
        step: HandoverStep::Preparation,
    }));
}

#[test]
fn test_cancel_during_preparation() {
    let mut bench = Bench::new();
    let id = prepared(&mut bench, &[1]);

    let cancel = HandoverCancel {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: 1,
        cause: Cause::RadioNetwork(CauseRadioNetwork::HandoverCancelled),
    };
    let out = bench.source.send(&bench.amf, cancel).unwrap();
    let reply = single(&out);
    assert_eq!(reply.assoc_id, bench.source.assoc_id);
    assert!(matches!(reply.message, NgapMessage::HandoverCancelAcknowledge(_)));
    assert_eq!(phase(&bench, id), HandoverPhase::Idle);
}

#[test]
fn test_cancel_after_command_releases_target() {
    let mut bench = Bench::new();
    let id = commanded(&mut bench, &[1], &[1]);

    let cancel = HandoverCancel {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: 1,
        cause: Cause::RadioNetwork(CauseRadioNetwork::HandoverCancelled),
    };
    let out = bench.source.send(&bench.amf, cancel).unwrap();
    let names: Vec<(u64, &str)> = out.iter().map(|m| (m.assoc_id, m.message.name())).collect();
    assert_eq!(
        names,
        vec![
            (bench.target.assoc_id, "PduSessionResourceReleaseCommand"),
            (bench.target.assoc_id, "UeContextReleaseCommand"),
            (bench.source.assoc_id, "HandoverCancelAcknowledge"),
        ]
    );
    assert_eq!(phase(&bench, id), HandoverPhase::Idle);
    assert!(bench.drain_indications().contains(&AmfIndication::StopTimer {
        amf_ue_ngap_id: id,
        step: HandoverStep::Completion,
    }));
}

#[test]
fn test_acknowledge_in_wrong_state_releases_sender() {
    let mut bench = Bench::new();
    let id = bench.attach_with_sessions(1, &[1]);

    let ack = bench.request_acknowledge(id, TARGET_RAN_ID, &[1], &[]);
    let out = bench.target.send(&bench.amf, ack).unwrap();
    assert_sender_released(single(&out), bench.target.assoc_id, id);
    assert_eq!(phase(&bench, id), HandoverPhase::Idle);

    let notify = HandoverNotify {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: TARGET_RAN_ID,
        user_location_information: bench.target.user_location(),
    };
    assert!(bench.target.send(&bench.amf, notify).unwrap().is_empty());
    assert_eq!(
        bench.amf.registry().lookup_by_amf_id(id).unwrap().ran_key(),
        RanKey::new(bench.source.assoc_id, 1)
    );
}

#[test]
fn test_acknowledge_from_wrong_gnb_releases_sender() {
    let mut bench = Bench::new();
    let id = prepared(&mut bench, &[1]);

    // Only the target may acknowledge; preparation toward it goes on
    let ack = bench.request_acknowledge(id, TARGET_RAN_ID, &[1], &[]);
    let out = bench.source.send(&bench.amf, ack).unwrap();
    assert_sender_released(single(&out), bench.source.assoc_id, id);
    assert_eq!(phase(&bench, id), HandoverPhase::RequestSent);
    assert!(bench.context(id).unwrap().handover.is_some());
    assert!(bench.drain_indications().is_empty());
}

#[test]
fn test_acknowledge_admitting_unrequested_session() {
    let mut bench = Bench::new();
    let id = prepared(&mut bench, &[1]);

    let ack = bench.request_acknowledge(id, TARGET_RAN_ID, &[1, 9], &[]);
    let out = bench.target.send(&bench.amf, ack).unwrap();
    let names: Vec<(u64, &str)> = out.iter().map(|m| (m.assoc_id, m.message.name())).collect();
    assert_eq!(
        names,
        vec![
            (bench.source.assoc_id, "HandoverPreparationFailure"),
            (bench.target.assoc_id, "PduSessionResourceReleaseCommand"),
            (bench.target.assoc_id, "UeContextReleaseCommand"),
        ]
    );
    assert_eq!(phase(&bench, id), HandoverPhase::Failed);
    assert!(bench.context(id).unwrap().handover.is_none());
}

#[test]
fn test_target_lost_during_preparation() {
    let mut bench = Bench::new();
    let id = prepared(&mut bench, &[1]);

    let out = bench.amf.on_association_lost(bench.target.assoc_id);
    let reply = single(&out);
    assert_eq!(reply.assoc_id, bench.source.assoc_id);
    assert_eq!(
        preparation_failure_cause(reply),
        Cause::RadioNetwork(CauseRadioNetwork::HoFailureInTarget5gcNgranNodeOrTargetSystem)
    );
    assert_eq!(phase(&bench, id), HandoverPhase::Failed);
    assert!(bench.amf.gnbs().find_by_assoc(bench.target.assoc_id).is_none());
}

#[test]
fn test_source_lost_after_command() {
    let mut bench = Bench::new();
    let id = commanded(&mut bench, &[1], &[1]);

    let out = bench.amf.on_association_lost(bench.source.assoc_id);
    assert!(!out.is_empty());
    assert!(out.iter().all(|m| m.assoc_id == bench.target.assoc_id));
    assert!(out
        .iter()
        .any(|m| matches!(m.message, NgapMessage::UeContextReleaseCommand(_))));
    assert!(bench.context(id).is_none());
    assert!(bench
        .drain_indications()
        .contains(&AmfIndication::ContextReleased { amf_ue_ngap_id: id }));
}
