//! NGAP IE Encoding/Decoding
//!
//! Value types for the structured NGAP IEs together with their APER codecs.
//! Every IE type implements `AperEncode`/`AperDecode`; `encode_value` and
//! `decode_value` turn one into the octets of a `ProtocolIE-Field` value and
//! back.

use ogs_asn1c::ngap::skip_ie_extensions;
use ogs_asn1c::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, PerError, PerResult};

use crate::error::NgapResult;

pub mod handover;
pub mod identity;
pub mod lists;
pub mod nas;
pub mod reset;
pub mod scalar;

pub use handover::*;
pub use identity::*;
pub use lists::*;
pub use reset::*;
pub use scalar::*;

// ============================================================================
// IE value helpers
// ============================================================================

/// Encode a value to raw APER bytes for use in ProtocolIeField.value
pub fn encode_value<T: AperEncode>(value: &T) -> NgapResult<Vec<u8>> {
    let mut encoder = AperEncoder::new();
    value.encode_aper(&mut encoder)?;
    Ok(encoder.into_bytes().to_vec())
}

/// Decode a value from raw APER bytes in a ProtocolIeField.value
pub fn decode_value<T: AperDecode>(wire: &[u8]) -> NgapResult<T> {
    Ok(decode_with(wire, T::decode_aper)?)
}

/// Run `decode` over a complete IE value, rejecting octets left over after
/// the final alignment padding
pub(crate) fn decode_with<T>(
    wire: &[u8],
    decode: impl FnOnce(&mut AperDecoder) -> PerResult<T>,
) -> PerResult<T> {
    let mut decoder = AperDecoder::new(wire);
    let value = decode(&mut decoder)?;
    decoder.align();
    let trailing = decoder.remaining_bits() / 8;
    if trailing > 0 {
        return Err(PerError::MalformedLength { length: wire.len() });
    }
    Ok(value)
}

// ============================================================================
// SEQUENCE helpers
// ============================================================================

/// Preamble of an extensible NGAP SEQUENCE whose last OPTIONAL component is
/// `iE-Extensions`
pub(crate) struct SequenceHeader {
    extended: bool,
    present: Vec<bool>,
}

impl SequenceHeader {
    /// `optional` counts every OPTIONAL component, `iE-Extensions` included
    pub(crate) fn decode(decoder: &mut AperDecoder, optional: usize) -> PerResult<Self> {
        let (extended, present) = decoder.decode_sequence_preamble(true, optional)?;
        Ok(Self { extended, present })
    }

    pub(crate) fn is_present(&self, index: usize) -> bool {
        self.present.get(index).copied().unwrap_or(false)
    }

    /// Step over `iE-Extensions` and extension additions after the root
    /// components have been read
    pub(crate) fn finish(&self, decoder: &mut AperDecoder) -> PerResult<()> {
        if self.present.last() == Some(&true) {
            skip_ie_extensions(decoder)?;
        }
        if self.extended {
            decoder.skip_extension_additions()?;
        }
        Ok(())
    }
}

/// Encode `SEQUENCE (SIZE(min..max)) OF T`, preserving order
pub(crate) fn encode_seq_of<T: AperEncode>(
    encoder: &mut AperEncoder,
    items: &[T],
    min: usize,
    max: usize,
) -> PerResult<()> {
    encoder.encode_constrained_length(items.len(), min, max)?;
    for item in items {
        item.encode_aper(encoder)?;
    }
    Ok(())
}

/// Decode `SEQUENCE (SIZE(min..max)) OF T`. The first failing item fails the
/// whole list.
pub(crate) fn decode_seq_of<T: AperDecode>(
    decoder: &mut AperDecoder,
    min: usize,
    max: usize,
) -> PerResult<Vec<T>> {
    let count = decoder.decode_constrained_length(min, max)?;
    // Every item takes at least one bit
    let mut items = Vec::with_capacity(count.min(decoder.remaining_bits()));
    for _ in 0..count {
        items.push(T::decode_aper(decoder)?);
    }
    Ok(items)
}

/// Copy a decoded fixed-size octet string into an array
pub(crate) fn to_array<const N: usize>(bytes: &[u8]) -> PerResult<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| PerError::MalformedLength { length: bytes.len() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogs_asn1c::ngap::RelativeAmfCapacity;

    #[test]
    fn test_trailing_octets_rejected() {
        assert_eq!(decode_value::<RelativeAmfCapacity>(&[0x07]).unwrap(), RelativeAmfCapacity(7));
        assert!(matches!(
            decode_value::<RelativeAmfCapacity>(&[0x07, 0x00]),
            Err(crate::NgapError::Asn1(PerError::MalformedLength { length: 2 }))
        ));
    }

    #[test]
    fn test_short_buffer_is_truncated() {
        assert!(matches!(
            decode_value::<RelativeAmfCapacity>(&[]),
            Err(crate::NgapError::Asn1(PerError::Truncated { .. }))
        ));
    }
}
