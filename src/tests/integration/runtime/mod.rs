//! Flows through the worker runtime: real guard timers and the TCP framing

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use nextgcore_amfd::runtime::serve_tcp;
use nextgcore_amfd::{AmfIndication, OutboundMessage, Runtime, RuntimeOutputs};
use nextgcore_tests::*;
use ogs_asn1c::ngap::{Cause, CauseRadioNetwork, PduSessionId};
use ogs_ngap::ie::{HandoverType, PduSessionResourceItem, PduSessionSetupItem};
use ogs_ngap::msg::{
    HandoverNotify, HandoverRequestAcknowledge, HandoverRequired, PduSessionResourceSetupResponse,
};
use ogs_ngap::{decode_ngap_message, NgapMessage};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);

fn submit(runtime: &Runtime, gnb: &GnbSim, message: impl Into<NgapMessage>) {
    let message = message.into();
    let bytes = message.encode().unwrap();
    runtime.submit(gnb.assoc_id, Bytes::from(bytes)).unwrap();
}

async fn next_outbound(outputs: &mut RuntimeOutputs) -> OutboundMessage {
    timeout(WAIT, outputs.outbound.recv())
        .await
        .expect("no outbound message in time")
        .expect("outbound channel closed")
}

async fn next_indication(outputs: &mut RuntimeOutputs) -> AmfIndication {
    timeout(WAIT, outputs.upper.recv())
        .await
        .expect("no indication in time")
        .expect("indication channel closed")
}

/// NG-set-up source and target, one UE on the source with session 1 active
async fn bench_runtime(workers: usize) -> (Runtime, RuntimeOutputs, GnbSim, GnbSim, u64) {
    init_logging();
    let (runtime, mut outputs) = Runtime::start(test_profile(), workers);
    let source = GnbSim::new(1, 0x101, 1);
    let target = GnbSim::new(2, 0x202, 2);

    for gnb in [&source, &target] {
        submit(&runtime, gnb, gnb.ng_setup_request());
        let reply = next_outbound(&mut outputs).await;
        assert_eq!(reply.assoc_id, gnb.assoc_id);
        assert!(matches!(reply.message, NgapMessage::NgSetupResponse(_)));
    }

    submit(&runtime, &source, source.initial_ue_message(1));
    let AmfIndication::Nas { amf_ue_ngap_id, .. } = next_indication(&mut outputs).await else {
        panic!("expected a NAS indication");
    };

    let item = PduSessionSetupItem {
        pdu_session_id: PduSessionId(1),
        nas_pdu: None,
        s_nssai: default_slice(),
        transfer: vec![0x01],
    };
    runtime
        .amf()
        .setup_pdu_sessions(amf_ue_ngap_id, None, vec![item])
        .unwrap();
    submit(
        &runtime,
        &source,
        PduSessionResourceSetupResponse {
            amf_ue_ngap_id,
            ran_ue_ngap_id: 1,
            setup_list: Some(vec![PduSessionResourceItem::new(1, vec![0x02])].into()),
            failed_list: None,
        },
    );
    (runtime, outputs, source, target, amf_ue_ngap_id)
}

fn handover_required(target: &GnbSim, amf_ue_ngap_id: u64) -> HandoverRequired {
    HandoverRequired {
        amf_ue_ngap_id,
        ran_ue_ngap_id: 1,
        handover_type: HandoverType::Intra5gs,
        cause: Cause::RadioNetwork(CauseRadioNetwork::HandoverDesirableForRadioReason),
        target_id: target.target_id(),
        pdu_session_list: vec![PduSessionResourceItem::new(1, vec![0x20])].into(),
        source_to_target_container: vec![0x40].into(),
    }
}

#[tokio::test]
async fn test_preparation_timer_fires() {
    let (runtime, mut outputs, source, target, id) = bench_runtime(4).await;

    // Same worker as the setup response, so it is handled after it
    submit(&runtime, &source, handover_required(&target, id));
    let request = next_outbound(&mut outputs).await;
    assert_eq!(request.assoc_id, target.assoc_id);
    assert!(matches!(request.message, NgapMessage::HandoverRequest(_)));

    // The target stays silent
    let failure = next_outbound(&mut outputs).await;
    assert_eq!(failure.assoc_id, source.assoc_id);
    let NgapMessage::HandoverPreparationFailure(msg) = &failure.message else {
        panic!("expected Handover Preparation Failure, got {}", failure.message.name());
    };
    assert_eq!(msg.cause, Cause::RadioNetwork(CauseRadioNetwork::TngrelocprepExpiry));

    runtime.shutdown();
}

#[tokio::test]
async fn test_completed_handover_stops_timers() {
    let (runtime, mut outputs, source, target, id) = bench_runtime(2).await;

    submit(&runtime, &source, handover_required(&target, id));
    assert!(matches!(
        next_outbound(&mut outputs).await.message,
        NgapMessage::HandoverRequest(_)
    ));

    let ack = HandoverRequestAcknowledge {
        amf_ue_ngap_id: id,
        ran_ue_ngap_id: 50,
        admitted_list: vec![PduSessionResourceItem::new(1, vec![0x30])].into(),
        failed_list: None,
        target_to_source_container: vec![0x50].into(),
    };
    submit(&runtime, &target, ack);
    let command = next_outbound(&mut outputs).await;
    assert_eq!(command.assoc_id, source.assoc_id);
    assert!(matches!(command.message, NgapMessage::HandoverCommand(_)));

    submit(
        &runtime,
        &target,
        HandoverNotify {
            amf_ue_ngap_id: id,
            ran_ue_ngap_id: 50,
            user_location_information: target.user_location(),
        },
    );
    let release = next_outbound(&mut outputs).await;
    assert_eq!(release.assoc_id, source.assoc_id);
    assert!(matches!(release.message, NgapMessage::UeContextReleaseCommand(_)));

    // Past both guard timers nothing else goes out
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(outputs.outbound.try_recv().is_err());

    runtime.shutdown();
}

#[tokio::test]
async fn test_association_loss_through_runtime() {
    let (runtime, mut outputs, source, _target, id) = bench_runtime(3).await;

    runtime.association_lost(source.assoc_id);
    assert_eq!(
        next_indication(&mut outputs).await,
        AmfIndication::ContextReleased { amf_ue_ngap_id: id }
    );
    assert!(runtime.amf().registry().lookup_by_amf_id(id).is_none());

    runtime.shutdown();
}

#[tokio::test]
async fn test_ng_setup_over_tcp() {
    init_logging();
    let (runtime, outputs) = Runtime::start(test_profile(), 2);
    let runtime = Arc::new(runtime);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve_tcp(runtime.clone(), listener, outputs.outbound));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    // The first connection is association 1
    let gnb = GnbSim::new(1, 0x101, 1);
    let pdu = NgapMessage::from(gnb.ng_setup_request()).encode().unwrap();
    stream.write_u32(pdu.len() as u32).await.unwrap();
    stream.write_all(&pdu).await.unwrap();

    let length = timeout(WAIT, stream.read_u32()).await.unwrap().unwrap() as usize;
    let mut buf = vec![0u8; length];
    stream.read_exact(&mut buf).await.unwrap();
    let reply = decode_ngap_message(&buf).unwrap();
    assert!(matches!(reply, NgapMessage::NgSetupResponse(_)));
    assert_eq!(runtime.amf().gnbs().len(), 1);

    // Closing the connection loses the association
    drop(stream);
    timeout(WAIT, async {
        while !runtime.amf().gnbs().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    server.abort();
}
