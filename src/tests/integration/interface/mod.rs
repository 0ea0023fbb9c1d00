//! Interface management: NG Setup, NG Reset, association loss

use nextgcore_amfd::{AmfError, AmfIndication};
use nextgcore_tests::*;
use ogs_asn1c::ngap::{AmfUeNgapId, Cause, CauseMisc, RanUeNgapId};
use ogs_ngap::ie::{PlmnId, ResetType, UeAssociatedLogicalNgConnectionItem, UeAssociatedLogicalNgConnectionList};
use ogs_ngap::msg::NgReset;
use ogs_ngap::NgapMessage;

#[test]
fn test_ng_setup_accepts_served_plmn() {
    init_logging();
    let amf = Amf::new(test_profile());
    let gnb = GnbSim::new(7, 0x777, 1);

    let out = gnb.send(&amf, gnb.ng_setup_request()).unwrap();
    let reply = single(&out);
    assert_eq!(reply.assoc_id, 7);
    let NgapMessage::NgSetupResponse(rsp) = &reply.message else {
        panic!("expected NG Setup Response, got {}", reply.message.name());
    };
    assert_eq!(rsp.amf_name.as_str(), "amf-test");
    assert!(!rsp.served_guami_list.0.is_empty());
    assert_eq!(rsp.plmn_support_list.0[0].plmn_id, home_plmn());

    let info = amf.gnbs().find_by_assoc(7).unwrap();
    assert_eq!(info.global_ran_node_id, gnb.global_ran_node_id());
    assert_eq!(info.name.as_deref(), Some("gnb-1911"));
}

#[test]
fn test_ng_setup_rejects_foreign_plmn() {
    init_logging();
    let amf = Amf::new(test_profile());
    let gnb = GnbSim::new(7, 0x777, 1).with_plmn(PlmnId::from_mcc_mnc(1, 1, 2));

    let out = gnb.send(&amf, gnb.ng_setup_request()).unwrap();
    let NgapMessage::NgSetupFailure(failure) = &single(&out).message else {
        panic!("expected NG Setup Failure");
    };
    assert_eq!(failure.cause, Cause::Misc(CauseMisc::UnknownPlmnOrSnpn));
    assert!(amf.gnbs().find_by_assoc(7).is_none());
}

#[test]
fn test_initial_ue_message_before_ng_setup() {
    init_logging();
    let amf = Amf::new(test_profile());
    let gnb = GnbSim::new(9, 0x999, 1);

    let result = gnb.send(&amf, gnb.initial_ue_message(1));
    assert!(matches!(result, Err(AmfError::UnknownAssociation(9))));
    assert!(amf.registry().is_empty());
}

#[test]
fn test_ng_reset_whole_interface() {
    let mut bench = Bench::new();
    let first = bench.attach(1);
    let second = bench.attach(2);

    let reset = NgReset {
        cause: Cause::Misc(CauseMisc::OmIntervention),
        reset_type: ResetType::NgInterface,
    };
    let out = bench.source.send(&bench.amf, reset).unwrap();
    let NgapMessage::NgResetAcknowledge(ack) = &single(&out).message else {
        panic!("expected NG Reset Acknowledge");
    };
    assert!(ack.connection_list.is_none());
    assert!(bench.context(first).is_none());
    assert!(bench.context(second).is_none());

    let released: Vec<u64> = bench
        .drain_indications()
        .into_iter()
        .filter_map(|i| match i {
            AmfIndication::ContextReleased { amf_ue_ngap_id } => Some(amf_ue_ngap_id),
            _ => None,
        })
        .collect();
    assert_eq!(released.len(), 2);
    assert!(released.contains(&first) && released.contains(&second));
}

#[test]
fn test_ng_reset_partial_echoes_list() {
    let mut bench = Bench::new();
    let kept = bench.attach(1);
    let reset_by_amf = bench.attach(2);
    let _reset_by_ran = bench.attach(3);

    let list = UeAssociatedLogicalNgConnectionList(vec![
        UeAssociatedLogicalNgConnectionItem {
            amf_ue_ngap_id: Some(AmfUeNgapId(reset_by_amf)),
            ran_ue_ngap_id: None,
        },
        UeAssociatedLogicalNgConnectionItem {
            amf_ue_ngap_id: None,
            ran_ue_ngap_id: Some(RanUeNgapId(3)),
        },
        // Unknown entries are still acknowledged
        UeAssociatedLogicalNgConnectionItem {
            amf_ue_ngap_id: None,
            ran_ue_ngap_id: Some(RanUeNgapId(99)),
        },
    ]);
    let reset = NgReset {
        cause: Cause::Misc(CauseMisc::OmIntervention),
        reset_type: ResetType::PartOfNgInterface(list.clone()),
    };
    let out = bench.source.send(&bench.amf, reset).unwrap();
    let NgapMessage::NgResetAcknowledge(ack) = &single(&out).message else {
        panic!("expected NG Reset Acknowledge");
    };
    assert_eq!(ack.connection_list.as_ref(), Some(&list));

    assert!(bench.context(kept).is_some());
    assert!(bench.context(reset_by_amf).is_none());
    assert_eq!(bench.amf.registry().len(), 1);
}

#[test]
fn test_amf_initiated_ng_reset() {
    let mut bench = Bench::new();
    let id = bench.attach(1);

    let out = bench.amf.ng_reset(bench.source.assoc_id, ResetType::NgInterface).unwrap();
    let reset = out.last().unwrap();
    assert_eq!(reset.assoc_id, bench.source.assoc_id);
    assert!(matches!(reset.message, NgapMessage::NgReset(_)));
    assert!(bench.context(id).is_none());

    assert!(matches!(
        bench.amf.ng_reset(42, ResetType::NgInterface),
        Err(AmfError::UnknownAssociation(42))
    ));
}

#[test]
fn test_association_loss_drops_owned_contexts() {
    let mut bench = Bench::new();
    let on_source = bench.attach(1);

    let out = bench.amf.on_association_lost(bench.source.assoc_id);
    assert!(out.iter().all(|m| m.assoc_id != bench.source.assoc_id));
    assert!(bench.context(on_source).is_none());
    assert!(bench.amf.gnbs().find_by_assoc(bench.source.assoc_id).is_none());
    assert!(bench.amf.gnbs().find_by_assoc(bench.target.assoc_id).is_some());
}
