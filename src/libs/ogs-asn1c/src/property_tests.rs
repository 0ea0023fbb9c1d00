//! Property-based tests for the APER primitives

use crate::per::{AperDecoder, AperEncoder, Constraint};
use proptest::prelude::*;

fn constraint_strategy() -> impl Strategy<Value = (Constraint, i64)> {
    prop_oneof![
        (0i64..=2).prop_map(|v| (Constraint::new(0, 2), v)),
        (0i64..=255).prop_map(|v| (Constraint::new(0, 255), v)),
        (0i64..=65535).prop_map(|v| (Constraint::new(0, 65535), v)),
        (0i64..=4_294_967_295).prop_map(|v| (Constraint::new(0, 4_294_967_295), v)),
        (0i64..=1_099_511_627_775).prop_map(|v| (Constraint::new(0, 1_099_511_627_775), v)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_constrained_whole_number_roundtrip((constraint, value) in constraint_strategy()) {
        let mut encoder = AperEncoder::new();
        encoder.encode_constrained_whole_number(value, &constraint).unwrap();
        let bytes = encoder.into_bytes();

        let mut decoder = AperDecoder::new(&bytes);
        prop_assert_eq!(decoder.decode_constrained_whole_number(&constraint).unwrap(), value);
    }

    #[test]
    fn prop_decoder_never_panics(data in proptest::collection::vec(any::<u8>(), 0..64)) {
        let mut decoder = AperDecoder::new(&data);
        let _ = decoder.decode_length_determinant();
        let _ = decoder.decode_octet_string(None, None);
        let _ = decoder.decode_constrained_whole_number(&Constraint::new(0, 1_099_511_627_775));
        let _ = decoder.skip_extension_additions();
    }
}
