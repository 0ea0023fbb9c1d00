//! Property-based tests for the UE registry and the handover state machine

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use ogs_asn1c::ngap::PduSessionId;
use ogs_ngap::ie::PduSessionResourceItem;
use ogs_ngap::msg::HandoverRequestAcknowledge;
use proptest::prelude::*;

use crate::context::{RanKey, UeHandle, UeNgapContext, UeRegistry};
use crate::handover::{transition, HandoverPhase};

// ============================================================================
// Strategies
// ============================================================================

#[derive(Debug, Clone)]
enum RegistryOp {
    Create(RanKey),
    Assign(usize),
    RemoveRan(usize),
    RemoveAmf(usize),
    Rebind(usize, RanKey),
    Destroy(usize),
}

fn arb_key() -> impl Strategy<Value = RanKey> {
    (1u64..4, 0u32..6).prop_map(|(assoc_id, ran)| RanKey::new(assoc_id, ran))
}

fn arb_op() -> impl Strategy<Value = RegistryOp> {
    prop_oneof![
        3 => arb_key().prop_map(RegistryOp::Create),
        3 => any::<usize>().prop_map(RegistryOp::Assign),
        1 => any::<usize>().prop_map(RegistryOp::RemoveRan),
        1 => any::<usize>().prop_map(RegistryOp::RemoveAmf),
        2 => (any::<usize>(), arb_key()).prop_map(|(i, k)| RegistryOp::Rebind(i, k)),
        1 => any::<usize>().prop_map(RegistryOp::Destroy),
    ]
}

fn arb_phase() -> impl Strategy<Value = HandoverPhase> {
    prop_oneof![
        Just(HandoverPhase::Idle),
        Just(HandoverPhase::RequiredSent),
        Just(HandoverPhase::RequestSent),
        Just(HandoverPhase::Acknowledged),
        Just(HandoverPhase::CommandSent),
        Just(HandoverPhase::Completing),
        Just(HandoverPhase::Failed),
    ]
}

fn pick(handles: &[Arc<UeHandle>], i: usize) -> Option<&Arc<UeHandle>> {
    if handles.is_empty() {
        None
    } else {
        handles.get(i % handles.len())
    }
}

fn all_keys() -> Vec<RanKey> {
    (1u64..4)
        .flat_map(|assoc_id| (0u32..6).map(move |ran| RanKey::new(assoc_id, ran)))
        .collect()
}

fn resource_items(ids: &[u8]) -> Vec<PduSessionResourceItem> {
    ids.iter()
        .map(|id| PduSessionResourceItem::new(*id, vec![*id]))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Both indices agree with the identity of the context they point at,
    /// and an assigned AMF-UE-NGAP-ID never changes
    #[test]
    fn prop_registry_indices_agree(ops in proptest::collection::vec(arb_op(), 1..60)) {
        let registry = UeRegistry::new();
        let mut handles: Vec<Arc<UeHandle>> = Vec::new();
        let mut first_ids: HashMap<usize, u64> = HashMap::new();

        for op in ops {
            match op {
                RegistryOp::Create(key) => handles.push(registry.create(key)),
                RegistryOp::Assign(i) => {
                    if let Some(ue) = pick(&handles, i) {
                        let _ = registry.assign_amf_ue_ngap_id(ue);
                    }
                }
                RegistryOp::RemoveRan(i) => {
                    if let Some(ue) = pick(&handles, i) {
                        registry.remove_by_ran_id(ue.ran_key());
                    }
                }
                RegistryOp::RemoveAmf(i) => {
                    if let Some(id) = pick(&handles, i).and_then(|ue| ue.amf_ue_ngap_id()) {
                        registry.remove_by_amf_id(id);
                    }
                }
                RegistryOp::Rebind(i, key) => {
                    if let Some(ue) = pick(&handles, i) {
                        let _ = registry.rebind_ran(ue, key);
                    }
                }
                RegistryOp::Destroy(i) => {
                    if let Some(ue) = pick(&handles, i) {
                        registry.destroy(ue);
                    }
                }
            }

            for key in all_keys() {
                if let Some(ue) = registry.lookup_by_ran_id(key) {
                    prop_assert_eq!(ue.ran_key(), key);
                    if let Some(id) = ue.amf_ue_ngap_id() {
                        if let Some(other) = registry.lookup_by_amf_id(id) {
                            prop_assert!(Arc::ptr_eq(&ue, &other));
                        }
                    }
                }
            }
            for (index, ue) in handles.iter().enumerate() {
                if let Some(id) = ue.amf_ue_ngap_id() {
                    let first = *first_ids.entry(index).or_insert(id);
                    prop_assert_eq!(first, id);
                    if let Some(found) = registry.lookup_by_amf_id(id) {
                        prop_assert_eq!(found.amf_ue_ngap_id(), Some(id));
                    }
                }
            }
        }
    }

    /// A successful partition splits the requested set into disjoint
    /// admitted and failed parts; a violating acknowledge is refused
    #[test]
    fn prop_partition_is_disjoint_cover(
        requested in proptest::collection::btree_set(1u8..16, 1..8),
        admitted in proptest::collection::btree_set(1u8..20, 1..8),
        failed in proptest::collection::btree_set(1u8..20, 0..4),
    ) {
        let requested_ids: Vec<PduSessionId> = requested.iter().map(|id| PduSessionId(*id)).collect();
        let ack = HandoverRequestAcknowledge {
            amf_ue_ngap_id: 1,
            ran_ue_ngap_id: 2,
            admitted_list: resource_items(&admitted.iter().copied().collect::<Vec<_>>()).into(),
            failed_list: (!failed.is_empty())
                .then(|| resource_items(&failed.iter().copied().collect::<Vec<_>>()).into()),
            target_to_source_container: vec![0x00].into(),
        };

        let violating = !admitted.is_subset(&requested) || admitted.intersection(&failed).next().is_some();
        match ack.partition(&requested_ids) {
            Ok((admitted_ids, failed_ids)) => {
                prop_assert!(!violating);
                let a: BTreeSet<u8> = admitted_ids.iter().map(|id| id.0).collect();
                let f: BTreeSet<u8> = failed_ids.iter().map(|id| id.0).collect();
                prop_assert!(a.is_disjoint(&f));
                prop_assert_eq!(a.union(&f).copied().collect::<BTreeSet<_>>(), requested.clone());
            }
            Err(_) => prop_assert!(violating),
        }
    }

    /// `transition` moves exactly along the edges the state machine allows
    #[test]
    fn prop_transition_follows_edges(steps in proptest::collection::vec(arb_phase(), 1..30)) {
        let mut ctx = UeNgapContext::default();
        for to in steps {
            let from = ctx.handover_phase();
            let allowed = from.can_transition_to(to);
            let result = transition(&mut ctx, to, 1);
            prop_assert_eq!(result.is_ok(), allowed);
            prop_assert_eq!(ctx.handover_phase(), if allowed { to } else { from });
        }
    }
}
