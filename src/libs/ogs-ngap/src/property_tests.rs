//! Property-based tests for the IE codec and the message parser

use crate::ie::*;
use crate::msg::HandoverRequestAcknowledge;
use crate::parser::decode_ngap_message;
use crate::{decode_as, encode_message};
use proptest::prelude::*;

fn plmn_strategy() -> impl Strategy<Value = PlmnId> {
    (0u16..1000, prop_oneof![(0u16..100, Just(2u8)), (0u16..1000, Just(3u8))])
        .prop_map(|(mcc, (mnc, mnc_len))| PlmnId::from_mcc_mnc(mcc, mnc, mnc_len))
}

fn s_nssai_strategy() -> impl Strategy<Value = SNssai> {
    (any::<u8>(), proptest::option::of(0u32..=0xFF_FFFF)).prop_map(|(sst, sd)| SNssai::new(sst, sd))
}

fn resource_list_strategy() -> impl Strategy<Value = PduSessionList<PduSessionResourceItem>> {
    proptest::collection::btree_map(any::<u8>(), proptest::collection::vec(any::<u8>(), 0..8), 1..8)
        .prop_map(|items| {
            items
                .into_iter()
                .map(|(id, transfer)| PduSessionResourceItem::new(id, transfer))
                .collect::<Vec<_>>()
                .into()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_plmn_digits_survive(plmn in plmn_strategy()) {
        let wire = encode_value(&plmn).unwrap();
        let decoded = decode_value::<PlmnId>(&wire).unwrap();
        prop_assert_eq!(decoded.mcc(), plmn.mcc());
        prop_assert_eq!(decoded.mnc(), plmn.mnc());
        prop_assert_eq!(decoded.mnc_len(), plmn.mnc_len());
    }

    #[test]
    fn prop_amf_set_id_bit_layout(value in 0u16..=AmfSetId::MAX) {
        let id = AmfSetId::new(value).unwrap();
        let [b0, b1] = id.to_octets();
        prop_assert_eq!(b0, ((value & 0x3fc) >> 2) as u8);
        prop_assert_eq!(b1, ((value & 0x3) << 6) as u8);
        prop_assert_eq!(AmfSetId::from_octets([b0, b1]).value(), value);
    }

    #[test]
    fn prop_allowed_nssai_keeps_order(slices in proptest::collection::vec(s_nssai_strategy(), 1..=8)) {
        let nssai = AllowedNssai(slices);
        let wire = encode_value(&nssai).unwrap();
        prop_assert_eq!(decode_value::<AllowedNssai>(&wire).unwrap(), nssai);
    }

    #[test]
    fn prop_acknowledge_lists_survive(
        admitted in resource_list_strategy(),
        failed in proptest::option::of(resource_list_strategy()),
        amf in 0u64..=ogs_asn1c::ngap::AmfUeNgapId::MAX,
        ran in any::<u32>(),
    ) {
        let msg = HandoverRequestAcknowledge {
            amf_ue_ngap_id: amf,
            ran_ue_ngap_id: ran,
            admitted_list: admitted,
            failed_list: failed,
            target_to_source_container: vec![0x01].into(),
        };
        let bytes = encode_message(&msg).unwrap();
        prop_assert_eq!(decode_as::<HandoverRequestAcknowledge>(&bytes).unwrap(), msg);
    }

    #[test]
    fn prop_parser_never_panics(data in proptest::collection::vec(any::<u8>(), 0..128)) {
        let _ = decode_ngap_message(&data);
        let _ = decode_value::<UserLocationInformation>(&data);
        let _ = decode_value::<RanStatusTransferContainer>(&data);
        let _ = decode_value::<ResetType>(&data);
        let _ = nas::decode_tlv::<nas::UeSecurityCapability>(&data, true);
    }
}
