//! Property-Based Tests for handover message sequences
//!
//! Whatever order the gNBs send handover messages in, the AMF keeps the
//! handover record and the state machine consistent and never leaves a
//! context in a transient phase between messages.

use std::collections::BTreeSet;
use std::sync::Arc;

use nextgcore_amfd::{HandoverPhase, HandoverStep, RanKey};
use nextgcore_tests::*;
use ogs_asn1c::ngap::{Cause, CauseRadioNetwork};
use ogs_ngap::ie::{
    CountValue, DrbStatusDl, DrbStatusItem, DrbStatusUl, PdcpSnLength, RanStatusTransferContainer,
};
use ogs_ngap::msg::{HandoverCancel, HandoverFailure, HandoverNotify, UplinkRanStatusTransfer};
use proptest::prelude::*;

const TARGET_RAN_ID: u32 = 50;

#[derive(Debug, Clone)]
enum HoEvent {
    Required(BTreeSet<u8>),
    Acknowledge(BTreeSet<u8>),
    Failure,
    StatusTransfer,
    Notify,
    Cancel,
    Timeout(HandoverStep),
}

fn arb_sessions() -> impl Strategy<Value = BTreeSet<u8>> {
    proptest::collection::btree_set(1u8..6, 1..4)
}

fn arb_event() -> impl Strategy<Value = HoEvent> {
    prop_oneof![
        3 => arb_sessions().prop_map(HoEvent::Required),
        3 => arb_sessions().prop_map(HoEvent::Acknowledge),
        1 => Just(HoEvent::Failure),
        1 => Just(HoEvent::StatusTransfer),
        2 => Just(HoEvent::Notify),
        1 => Just(HoEvent::Cancel),
        1 => Just(HoEvent::Timeout(HandoverStep::Preparation)),
        1 => Just(HoEvent::Timeout(HandoverStep::Completion)),
    ]
}

fn status_container() -> RanStatusTransferContainer {
    RanStatusTransferContainer {
        drbs: vec![DrbStatusItem {
            drb_id: 2,
            ul: DrbStatusUl {
                sn_length: PdcpSnLength::Sn18,
                count: CountValue { pdcp_sn: 7, hfn: 1 },
                receive_status: None,
            },
            dl: DrbStatusDl {
                sn_length: PdcpSnLength::Sn18,
                count: CountValue { pdcp_sn: 9, hfn: 1 },
            },
        }],
    }
}

fn apply(bench: &Bench, id: u64, event: &HoEvent) -> usize {
    let sent = match event {
        HoEvent::Required(sessions) => {
            let sessions: Vec<u8> = sessions.iter().copied().collect();
            bench
                .source
                .send(&bench.amf, bench.handover_required(id, 1, &sessions))
        }
        HoEvent::Acknowledge(admitted) => {
            let admitted: Vec<u8> = admitted.iter().copied().collect();
            bench.target.send(
                &bench.amf,
                bench.request_acknowledge(id, TARGET_RAN_ID, &admitted, &[]),
            )
        }
        HoEvent::Failure => bench.target.send(
            &bench.amf,
            HandoverFailure {
                amf_ue_ngap_id: id,
                cause: Cause::RadioNetwork(CauseRadioNetwork::CellNotAvailable),
            },
        ),
        HoEvent::StatusTransfer => bench.source.send(
            &bench.amf,
            UplinkRanStatusTransfer {
                amf_ue_ngap_id: id,
                ran_ue_ngap_id: 1,
                container: status_container(),
            },
        ),
        HoEvent::Notify => bench.target.send(
            &bench.amf,
            HandoverNotify {
                amf_ue_ngap_id: id,
                ran_ue_ngap_id: TARGET_RAN_ID,
                user_location_information: bench.target.user_location(),
            },
        ),
        HoEvent::Cancel => bench.source.send(
            &bench.amf,
            HandoverCancel {
                amf_ue_ngap_id: id,
                ran_ue_ngap_id: 1,
                cause: Cause::RadioNetwork(CauseRadioNetwork::HandoverCancelled),
            },
        ),
        HoEvent::Timeout(step) => Ok(bench.amf.handle_timeout(id, *step)),
    };
    match sent {
        Ok(out) => out.len(),
        Err(e) => panic!("{:?} failed: {}", event, e),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_handover_sequences_stay_consistent(
        events in proptest::collection::vec(arb_event(), 1..25)
    ) {
        let mut bench = Bench::new();
        let id = bench.attach_with_sessions(1, &[1, 2, 3]);

        for event in &events {
            apply(&bench, id, event);

            let handle = bench.amf.registry().lookup_by_amf_id(id);
            prop_assert!(handle.is_some());
            let Some(handle) = handle else { break };
            let ctx = handle.snapshot();
            let phase = ctx.handover_phase();

            prop_assert!(matches!(
                phase,
                HandoverPhase::Idle
                    | HandoverPhase::RequestSent
                    | HandoverPhase::CommandSent
                    | HandoverPhase::Failed
            ), "transient phase {} after {:?}", phase.name(), event);
            prop_assert_eq!(ctx.handover.is_some(), phase.is_in_flight());

            let key = handle.ran_key();
            prop_assert!(key == RanKey::new(bench.source.assoc_id, 1)
                || key == RanKey::new(bench.target.assoc_id, TARGET_RAN_ID));
            let by_ran = bench.amf.registry().lookup_by_ran_id(key);
            prop_assert!(by_ran.is_some_and(|ue| Arc::ptr_eq(&ue, &handle)));

            if let Some(ho) = &ctx.handover {
                prop_assert_eq!(ho.source_assoc, key.assoc_id);
                prop_assert!(ho.admitted.iter().all(|a| !ho.failed.contains(a)));
            }
        }
        bench.drain_indications();
    }
}
