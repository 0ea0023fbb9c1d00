//! NAS transport and PDU session resource management

use nextgcore_amfd::context::PduSessionState;
use nextgcore_amfd::{AmfError, AmfIndication, RanKey, RegistryError, UeKey};
use nextgcore_tests::*;
use ogs_asn1c::ngap::{
    AmfUeNgapId, Cause, CauseNas, CauseRadioNetwork, NasPdu, PduSessionId, RanUeNgapId,
};
use ogs_ngap::ie::{
    PduSessionModifyItem, PduSessionResourceItem, PduSessionSetupItem, SecurityKey, UeAmbr,
    UeNgapIds, UeRadioCapability,
};
use ogs_ngap::msg::{
    InitialContextSetupFailure, InitialContextSetupResponse, PduSessionResourceModifyResponse,
    PduSessionResourceReleaseResponse, PduSessionResourceSetupResponse,
    UeContextReleaseComplete, UeRadioCapabilityInfoIndication, UplinkNasTransport,
};
use ogs_ngap::NgapMessage;

#[test]
fn test_initial_ue_message_creates_context() {
    let mut bench = Bench::new();
    let out = bench
        .source
        .send(&bench.amf, bench.source.initial_ue_message(5))
        .unwrap();
    assert!(out.is_empty());

    let ue = bench
        .amf
        .registry()
        .lookup_by_ran_id(RanKey::new(bench.source.assoc_id, 5))
        .unwrap();
    let id = ue.amf_ue_ngap_id().unwrap();
    let ctx = ue.snapshot();
    assert_eq!(ctx.user_location, Some(bench.source.user_location()));
    assert!(ctx.initial_ue_message.is_some());

    match bench.drain_indications().as_slice() {
        [AmfIndication::Nas {
            amf_ue_ngap_id,
            nas_pdu,
        }] => {
            assert_eq!(*amf_ue_ngap_id, id);
            assert_eq!(nas_pdu, &NasPdu(vec![0x7e, 0x00, 0x41, 0x79]));
        }
        other => panic!("unexpected indications: {:?}", other),
    }
}

#[test]
fn test_uplink_and_downlink_nas() {
    let mut bench = Bench::new();
    let id = bench.attach(1);

    let uplink = UplinkNasTransport {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: 1,
        nas_pdu: NasPdu(vec![0x7e, 0x00, 0x43]),
        user_location_information: bench.source.user_location(),
    };
    assert!(bench.source.send(&bench.amf, uplink).unwrap().is_empty());
    assert!(matches!(
        bench.drain_indications().as_slice(),
        [AmfIndication::Nas { nas_pdu, .. }] if nas_pdu.0 == [0x7e, 0x00, 0x43]
    ));

    let downlink = bench
        .amf
        .downlink_nas_transport(id, NasPdu(vec![0x7e, 0x00, 0x42]))
        .unwrap();
    assert_eq!(downlink.assoc_id, bench.source.assoc_id);
    let NgapMessage::DownlinkNasTransport(msg) = on_the_wire(&downlink.message) else {
        panic!("expected Downlink NAS Transport");
    };
    assert_eq!(msg.amf_ue_ngap_id, id);
    assert_eq!(msg.ran_ue_ngap_id, 1);
}

#[test]
fn test_uplink_nas_for_unknown_ue_is_released() {
    let mut bench = Bench::new();
    let id = bench.attach(1);

    // Right AMF id, wrong RAN id
    let uplink = UplinkNasTransport {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: 77,
        nas_pdu: NasPdu(vec![0x7e]),
        user_location_information: bench.source.user_location(),
    };
    let out = bench.source.send(&bench.amf, uplink).unwrap();
    let NgapMessage::UeContextReleaseCommand(cmd) = &single(&out).message else {
        panic!("expected UE Context Release Command");
    };
    assert_eq!(cmd.cause, Cause::RadioNetwork(CauseRadioNetwork::UnknownLocalUeNgapId));
    assert!(bench.drain_indications().is_empty());
    assert!(bench.context(id).is_some());
}

#[test]
fn test_pdu_session_setup_then_active() {
    let mut bench = Bench::new();
    let id = bench.attach_with_sessions(1, &[1, 2]);

    let ctx = bench.context(id).unwrap();
    assert_eq!(ctx.session_ids(), vec![PduSessionId(1), PduSessionId(2)]);
    for session in ctx.sessions.values() {
        assert_eq!(session.state, PduSessionState::Active);
        assert_eq!(
            session.response_transfer.as_deref(),
            Some(&[0x10, session.pdu_session_id.0][..])
        );
    }
}

#[test]
fn test_pdu_session_setup_partial_failure() {
    let mut bench = Bench::new();
    let id = bench.attach(1);
    let items = [3u8, 4]
        .iter()
        .map(|psi| ogs_ngap::ie::PduSessionSetupItem {
            pdu_session_id: PduSessionId(*psi),
            nas_pdu: None,
            s_nssai: default_slice(),
            transfer: vec![*psi],
        })
        .collect();
    bench.amf.setup_pdu_sessions(id, None, items).unwrap();

    let response = PduSessionResourceSetupResponse {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: 1,
        setup_list: Some(vec![PduSessionResourceItem::new(3, vec![0x01])].into()),
        failed_list: Some(vec![PduSessionResourceItem::new(4, vec![0x02])].into()),
    };
    bench.source.send(&bench.amf, response).unwrap();

    let ctx = bench.context(id).unwrap();
    assert_eq!(ctx.session_ids(), vec![PduSessionId(3)]);
}

#[test]
fn test_pdu_session_setup_requires_sessions() {
    let mut bench = Bench::new();
    let id = bench.attach(1);
    assert!(matches!(
        bench.amf.setup_pdu_sessions(id, None, Vec::new()),
        Err(AmfError::Codec(_))
    ));
}

#[test]
fn test_pdu_session_modify() {
    let mut bench = Bench::new();
    let id = bench.attach_with_sessions(1, &[1]);

    let items = vec![
        PduSessionModifyItem {
            pdu_session_id: PduSessionId(1),
            nas_pdu: None,
            transfer: vec![0xaa],
        },
        PduSessionModifyItem {
            pdu_session_id: PduSessionId(9),
            nas_pdu: None,
            transfer: vec![0xbb],
        },
    ];
    let request = bench.amf.modify_pdu_sessions(id, items).unwrap();
    let NgapMessage::PduSessionResourceModifyRequest(req) = on_the_wire(&request.message) else {
        panic!("expected PDU Session Resource Modify Request");
    };
    assert_eq!(req.modify_list.ids(), vec![PduSessionId(1)]);

    let response = PduSessionResourceModifyResponse {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: 1,
        modify_list: Some(vec![PduSessionResourceItem::new(1, vec![0xcc])].into()),
        failed_list: None,
        user_location_information: Some(bench.source.user_location()),
    };
    bench.source.send(&bench.amf, response).unwrap();
    let ctx = bench.context(id).unwrap();
    assert_eq!(ctx.sessions[&1u8].response_transfer.as_deref(), Some(&[0xcc][..]));

    let only_unknown = vec![PduSessionModifyItem {
        pdu_session_id: PduSessionId(9),
        nas_pdu: None,
        transfer: vec![0xbb],
    }];
    assert!(bench.amf.modify_pdu_sessions(id, only_unknown).is_err());
}

#[test]
fn test_pdu_session_release() {
    let mut bench = Bench::new();
    let id = bench.attach_with_sessions(1, &[1, 2]);

    let command = bench
        .amf
        .release_pdu_sessions(id, &[PduSessionId(2)], None)
        .unwrap();
    let NgapMessage::PduSessionResourceReleaseCommand(cmd) = on_the_wire(&command.message) else {
        panic!("expected PDU Session Resource Release Command");
    };
    assert_eq!(cmd.to_release_list.ids(), vec![PduSessionId(2)]);
    assert_eq!(
        bench.context(id).unwrap().sessions[&2u8].state,
        PduSessionState::ReleaseRequested
    );

    let response = PduSessionResourceReleaseResponse {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: 1,
        released_list: vec![PduSessionResourceItem::new(2, Vec::new())].into(),
        user_location_information: None,
    };
    bench.source.send(&bench.amf, response).unwrap();
    assert_eq!(bench.context(id).unwrap().session_ids(), vec![PduSessionId(1)]);
}

#[test]
fn test_ue_context_release_round_trip() {
    let mut bench = Bench::new();
    let id = bench.attach(1);

    let command = bench
        .amf
        .release_ue_context(id, Cause::Nas(CauseNas::NormalRelease))
        .unwrap();
    let NgapMessage::UeContextReleaseCommand(cmd) = on_the_wire(&command.message) else {
        panic!("expected UE Context Release Command");
    };
    assert_eq!(cmd.ue_ngap_ids.amf_ue_ngap_id().0, id);
    assert!(matches!(cmd.ue_ngap_ids, UeNgapIds::Pair { .. }));
    // Nothing is torn down until the gNB confirms
    assert!(bench.context(id).is_some());

    let complete = UeContextReleaseComplete {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: 1,
        user_location_information: None,
    };
    assert!(bench.source.send(&bench.amf, complete).unwrap().is_empty());
    assert!(bench.context(id).is_none());
    assert!(bench
        .drain_indications()
        .contains(&AmfIndication::ContextReleased { amf_ue_ngap_id: id }));
}

#[test]
fn test_release_complete_for_unknown_ue() {
    let bench = Bench::new();
    let complete = UeContextReleaseComplete {
        amf_ue_ngap_id: 4242,
        ran_ue_ngap_id: 1,
        user_location_information: None,
    };
    assert!(matches!(
        bench.source.send(&bench.amf, complete),
        Err(AmfError::Registry(RegistryError::NotFound(UeKey::AmfUeNgapId(4242))))
    ));
}

#[test]
fn test_pdu_session_release_response_for_unknown_ue() {
    let mut bench = Bench::new();
    let id = bench.attach_with_sessions(1, &[1]);

    let response = PduSessionResourceReleaseResponse {
        amf_ue_ngap_id: 4242,
        ran_ue_ngap_id: 1,
        released_list: vec![PduSessionResourceItem::new(1, Vec::new())].into(),
        user_location_information: None,
    };
    assert!(matches!(
        bench.source.send(&bench.amf, response),
        Err(AmfError::Registry(RegistryError::NotFound(UeKey::AmfUeNgapId(4242))))
    ));
    // The known UE keeps its session
    assert_eq!(bench.context(id).unwrap().session_ids(), vec![PduSessionId(1)]);
    assert!(bench.drain_indications().is_empty());
}

fn setup_items(sessions: &[u8]) -> Vec<PduSessionSetupItem> {
    sessions
        .iter()
        .map(|psi| PduSessionSetupItem {
            pdu_session_id: PduSessionId(*psi),
            nas_pdu: None,
            s_nssai: default_slice(),
            transfer: vec![0x60, *psi],
        })
        .collect()
}

#[test]
fn test_initial_context_setup_carries_ue_state() {
    let mut bench = Bench::new();
    let id = bench.attach(1);
    let ambr = UeAmbr {
        dl: 3_000_000,
        ul: 1_500_000,
    };
    bench.amf.set_ue_ambr(id, ambr).unwrap();

    let indication = UeRadioCapabilityInfoIndication {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: 1,
        ue_radio_capability: vec![0xCA, 0xFE].into(),
    };
    assert!(bench.source.send(&bench.amf, indication).unwrap().is_empty());
    assert_eq!(
        bench.context(id).unwrap().ue_radio_capability,
        Some(UeRadioCapability(vec![0xCA, 0xFE]))
    );

    let key = SecurityKey([0x42; 32]);
    let request = bench
        .amf
        .initial_context_setup(id, key, Some(NasPdu(vec![0x7e, 0x02])), setup_items(&[5, 6]))
        .unwrap();
    assert_eq!(request.assoc_id, bench.source.assoc_id);
    let NgapMessage::InitialContextSetupRequest(req) = on_the_wire(&request.message) else {
        panic!("expected Initial Context Setup Request");
    };
    assert_eq!((req.amf_ue_ngap_id, req.ran_ue_ngap_id), (id, 1));
    assert_eq!(req.guami, bench.amf.profile().guamis[0]);
    assert_eq!(req.ue_ambr, Some(ambr));
    assert_eq!(
        req.setup_list.as_ref().map(|l| l.ids()),
        Some(vec![PduSessionId(5), PduSessionId(6)])
    );
    assert_eq!(req.ue_radio_capability, Some(UeRadioCapability(vec![0xCA, 0xFE])));
    assert_eq!(req.security_key, key);
    assert_eq!(req.nas_pdu, Some(NasPdu(vec![0x7e, 0x02])));

    let ctx = bench.context(id).unwrap();
    assert!(ctx
        .sessions
        .values()
        .all(|s| s.state == PduSessionState::SetupRequested));

    // The gNB sets up 5 and drops 6
    let response = InitialContextSetupResponse {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: 1,
        setup_list: Some(vec![PduSessionResourceItem::new(5, vec![0x15])].into()),
        failed_list: Some(vec![PduSessionResourceItem::new(6, vec![0x00])].into()),
    };
    assert!(bench.source.send(&bench.amf, response).unwrap().is_empty());
    let ctx = bench.context(id).unwrap();
    assert_eq!(ctx.session_ids(), vec![PduSessionId(5)]);
    assert_eq!(ctx.sessions[&5u8].state, PduSessionState::Active);
    assert_eq!(ctx.sessions[&5u8].response_transfer.as_deref(), Some(&[0x15][..]));
}

#[test]
fn test_initial_context_setup_without_sessions() {
    let mut bench = Bench::new();
    let id = bench.attach(1);

    let request = bench
        .amf
        .initial_context_setup(id, SecurityKey::default(), None, Vec::new())
        .unwrap();
    let NgapMessage::InitialContextSetupRequest(req) = on_the_wire(&request.message) else {
        panic!("expected Initial Context Setup Request");
    };
    assert_eq!(req.setup_list, None);
    assert_eq!(req.ue_ambr, None);
    assert_eq!(req.ue_security_capabilities, bench.amf.profile().default_security_capabilities);

    let response = InitialContextSetupResponse {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: 1,
        setup_list: None,
        failed_list: None,
    };
    assert!(bench.source.send(&bench.amf, response).unwrap().is_empty());
    assert!(bench.context(id).unwrap().sessions.is_empty());

    assert!(matches!(
        bench.amf.initial_context_setup(4242, SecurityKey::default(), None, Vec::new()),
        Err(AmfError::Registry(RegistryError::NotFound(UeKey::AmfUeNgapId(4242))))
    ));
}

#[test]
fn test_initial_context_setup_failure_releases_ue() {
    let mut bench = Bench::new();
    let id = bench.attach_with_sessions(1, &[1]);
    bench
        .amf
        .initial_context_setup(id, SecurityKey::default(), None, setup_items(&[2, 3]))
        .unwrap();

    let failure = InitialContextSetupFailure {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: 1,
        failed_list: Some(vec![PduSessionResourceItem::new(2, vec![0x00])].into()),
        cause: Cause::RadioNetwork(CauseRadioNetwork::RadioResourcesNotAvailable),
    };
    let out = bench.source.send(&bench.amf, failure).unwrap();
    let reply = single(&out);
    assert_eq!(reply.assoc_id, bench.source.assoc_id);
    let NgapMessage::UeContextReleaseCommand(cmd) = &reply.message else {
        panic!("expected UE Context Release Command");
    };
    assert_eq!(
        cmd.ue_ngap_ids,
        UeNgapIds::Pair {
            amf_ue_ngap_id: AmfUeNgapId(id),
            ran_ue_ngap_id: RanUeNgapId(1),
        }
    );
    // Sessions still waiting on the context are gone, active ones stay
    // until the release completes
    assert_eq!(bench.context(id).unwrap().session_ids(), vec![PduSessionId(1)]);

    let complete = UeContextReleaseComplete {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: 1,
        user_location_information: None,
    };
    bench.source.send(&bench.amf, complete).unwrap();
    assert!(bench.context(id).is_none());
}

#[test]
fn test_radio_capability_for_unknown_ue_is_released() {
    let mut bench = Bench::new();
    let id = bench.attach(1);

    let indication = UeRadioCapabilityInfoIndication {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: 8,
        ue_radio_capability: vec![0x01].into(),
    };
    let out = bench.source.send(&bench.amf, indication).unwrap();
    let NgapMessage::UeContextReleaseCommand(cmd) = &single(&out).message else {
        panic!("expected UE Context Release Command");
    };
    assert_eq!(cmd.cause, Cause::RadioNetwork(CauseRadioNetwork::UnknownLocalUeNgapId));
    assert_eq!(bench.context(id).unwrap().ue_radio_capability, None);
}
