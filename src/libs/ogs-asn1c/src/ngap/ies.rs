//! NGAP Information Elements
//!
//! Protocol IE containers and the scalar IEs from NGAP-IEs (3GPP TS 38.413)

use super::types::{Criticality, ProtocolIeId};
use crate::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, Constraint, PerError, PerResult};

/// ProtocolIE-Field - Single IE with ID, criticality, and value
/// ASN.1: ProtocolIE-Field ::= SEQUENCE { id, criticality, value }
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolIeField {
    pub id: ProtocolIeId,
    pub criticality: Criticality,
    pub value: Vec<u8>, // Raw APER-encoded value
}

impl AperEncode for ProtocolIeField {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        self.id.encode_aper(encoder)?;
        self.criticality.encode_aper(encoder)?;
        encoder.encode_open_type(&self.value)
    }
}

impl AperDecode for ProtocolIeField {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let id = ProtocolIeId::decode_aper(decoder)?;
        let criticality = Criticality::decode_aper(decoder)?;
        let value = decoder.decode_open_type()?;

        Ok(ProtocolIeField {
            id,
            criticality,
            value,
        })
    }
}

/// ProtocolIE-Container - Sequence of IEs
/// ASN.1: ProtocolIE-Container ::= SEQUENCE (SIZE (0..maxProtocolIEs)) OF ProtocolIE-Field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtocolIeContainer {
    pub ies: Vec<ProtocolIeField>,
}

impl ProtocolIeContainer {
    // maxProtocolIEs = 65535
    pub const MAX_PROTOCOL_IES: usize = 65535;

    pub fn new() -> Self {
        Self { ies: Vec::new() }
    }

    pub fn push(&mut self, ie: ProtocolIeField) {
        self.ies.push(ie);
    }

    pub fn len(&self) -> usize {
        self.ies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ies.is_empty()
    }

    /// Find an IE by ID
    pub fn find(&self, id: ProtocolIeId) -> Option<&ProtocolIeField> {
        self.ies.iter().find(|ie| ie.id == id)
    }
}

impl AperEncode for ProtocolIeContainer {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_constrained_length(self.ies.len(), 0, Self::MAX_PROTOCOL_IES)?;
        for ie in &self.ies {
            ie.encode_aper(encoder)?;
        }
        Ok(())
    }
}

impl AperDecode for ProtocolIeContainer {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let count = decoder.decode_constrained_length(0, Self::MAX_PROTOCOL_IES)?;

        // Each field takes at least 4 octets; do not trust the count for capacity
        let mut ies = Vec::with_capacity(count.min(decoder.remaining_bits() / 32));
        for _ in 0..count {
            ies.push(ProtocolIeField::decode_aper(decoder)?);
        }

        Ok(ProtocolIeContainer { ies })
    }
}

/// Skip a `ProtocolExtensionContainer` (the `iE-Extensions` component present
/// in most NGAP SEQUENCEs). Every extension is carried as an open type, so it
/// can be stepped over without knowing its id.
pub fn skip_ie_extensions(decoder: &mut AperDecoder) -> PerResult<()> {
    let count = decoder.decode_constrained_length(1, 65535)?;
    for _ in 0..count {
        ProtocolIeId::decode_aper(decoder)?;
        Criticality::decode_aper(decoder)?;
        decoder.skip_open_type()?;
    }
    Ok(())
}

/// AMF-UE-NGAP-ID - Unique identifier for UE in AMF
/// ASN.1: AMF-UE-NGAP-ID ::= INTEGER (0..1099511627775)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AmfUeNgapId(pub u64);

impl AmfUeNgapId {
    // 40-bit value (0 to 2^40 - 1)
    pub const MAX: u64 = 1_099_511_627_775;
    pub const CONSTRAINT: Constraint = Constraint::new(0, 1_099_511_627_775);
}

impl AperEncode for AmfUeNgapId {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        if self.0 > Self::MAX {
            return Err(PerError::ConstraintViolation {
                value: self.0.min(i64::MAX as u64) as i64,
                min: 0,
                max: Self::MAX as i64,
            });
        }
        encoder.encode_constrained_whole_number(self.0 as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for AmfUeNgapId {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let value = decoder.decode_constrained_whole_number(&Self::CONSTRAINT)?;
        Ok(AmfUeNgapId(value as u64))
    }
}

/// RAN-UE-NGAP-ID - Unique identifier for UE in RAN
/// ASN.1: RAN-UE-NGAP-ID ::= INTEGER (0..4294967295)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RanUeNgapId(pub u32);

impl RanUeNgapId {
    pub const CONSTRAINT: Constraint = Constraint::new(0, 4_294_967_295);
}

impl AperEncode for RanUeNgapId {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_constrained_whole_number(self.0 as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for RanUeNgapId {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let value = decoder.decode_constrained_whole_number(&Self::CONSTRAINT)?;
        Ok(RanUeNgapId(value as u32))
    }
}

/// TimeToWait - Time to wait before retrying
/// ASN.1: TimeToWait ::= ENUMERATED { v1s, v2s, v5s, v10s, v20s, v60s, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TimeToWait {
    V1s = 0,
    V2s = 1,
    V5s = 2,
    V10s = 3,
    V20s = 4,
    V60s = 5,
}

impl TimeToWait {
    pub const CONSTRAINT: Constraint = Constraint::extensible(0, 5);

    /// Get the wait time in seconds
    pub fn seconds(&self) -> u32 {
        match self {
            TimeToWait::V1s => 1,
            TimeToWait::V2s => 2,
            TimeToWait::V5s => 5,
            TimeToWait::V10s => 10,
            TimeToWait::V20s => 20,
            TimeToWait::V60s => 60,
        }
    }
}

impl AperEncode for TimeToWait {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_enumerated(*self as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for TimeToWait {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_enumerated(&Self::CONSTRAINT)? {
            0 => Ok(TimeToWait::V1s),
            1 => Ok(TimeToWait::V2s),
            2 => Ok(TimeToWait::V5s),
            3 => Ok(TimeToWait::V10s),
            4 => Ok(TimeToWait::V20s),
            5 => Ok(TimeToWait::V60s),
            _ => Err(PerError::UnsupportedExtension("TimeToWait")),
        }
    }
}

/// RelativeAMFCapacity - Relative capacity of AMF
/// ASN.1: RelativeAMFCapacity ::= INTEGER (0..255)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelativeAmfCapacity(pub u8);

impl RelativeAmfCapacity {
    pub const CONSTRAINT: Constraint = Constraint::new(0, 255);
}

impl AperEncode for RelativeAmfCapacity {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_constrained_whole_number(self.0 as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for RelativeAmfCapacity {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let value = decoder.decode_constrained_whole_number(&Self::CONSTRAINT)?;
        Ok(RelativeAmfCapacity(value as u8))
    }
}

/// NAS-PDU - NAS Protocol Data Unit (opaque octet string)
/// ASN.1: NAS-PDU ::= OCTET STRING
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NasPdu(pub Vec<u8>);

impl NasPdu {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AperEncode for NasPdu {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_octet_string(&self.0, None, None)
    }
}

impl AperDecode for NasPdu {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        Ok(NasPdu(decoder.decode_octet_string(None, None)?))
    }
}

/// PDUSessionID ::= INTEGER (0..255)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PduSessionId(pub u8);

impl PduSessionId {
    pub const CONSTRAINT: Constraint = Constraint::new(0, 255);
}

impl AperEncode for PduSessionId {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_constrained_whole_number(self.0 as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for PduSessionId {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let value = decoder.decode_constrained_whole_number(&Self::CONSTRAINT)?;
        Ok(PduSessionId(value as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amf_ue_ngap_id_roundtrip() {
        for raw in [0u64, 255, 256, 12_345_678, AmfUeNgapId::MAX] {
            let id = AmfUeNgapId(raw);
            let mut encoder = AperEncoder::new();
            id.encode_aper(&mut encoder).unwrap();

            let bytes = encoder.into_bytes();
            let mut decoder = AperDecoder::new(&bytes);
            assert_eq!(AmfUeNgapId::decode_aper(&mut decoder).unwrap(), id);
        }
    }

    #[test]
    fn test_amf_ue_ngap_id_above_40_bits() {
        let mut encoder = AperEncoder::new();
        assert!(matches!(
            AmfUeNgapId(1 << 40).encode_aper(&mut encoder),
            Err(PerError::ConstraintViolation { .. })
        ));
    }

    #[test]
    fn test_ran_ue_ngap_id_wire() {
        // 2-bit octet count, then the octets
        let mut encoder = AperEncoder::new();
        RanUeNgapId(0xDEADBEEF).encode_aper(&mut encoder).unwrap();
        let bytes = encoder.into_bytes();
        assert_eq!(bytes.as_ref(), &[0xC0, 0xDE, 0xAD, 0xBE, 0xEF]);

        let mut decoder = AperDecoder::new(&bytes);
        assert_eq!(RanUeNgapId::decode_aper(&mut decoder).unwrap(), RanUeNgapId(0xDEADBEEF));
    }

    #[test]
    fn test_protocol_ie_container_roundtrip() {
        let mut container = ProtocolIeContainer::new();
        container.push(ProtocolIeField {
            id: ProtocolIeId::AMF_UE_NGAP_ID,
            criticality: Criticality::Reject,
            value: vec![0x00, 0x01, 0x02, 0x03],
        });
        container.push(ProtocolIeField {
            id: ProtocolIeId::RAN_UE_NGAP_ID,
            criticality: Criticality::Ignore,
            value: vec![0xDE, 0xAD, 0xBE, 0xEF],
        });

        let mut encoder = AperEncoder::new();
        container.encode_aper(&mut encoder).unwrap();

        let bytes = encoder.into_bytes();
        let mut decoder = AperDecoder::new(&bytes);
        assert_eq!(ProtocolIeContainer::decode_aper(&mut decoder).unwrap(), container);
    }

    #[test]
    fn test_skip_ie_extensions() {
        let mut encoder = AperEncoder::new();
        encoder.encode_constrained_length(1, 1, 65535).unwrap();
        ProtocolIeId(999).encode_aper(&mut encoder).unwrap();
        Criticality::Ignore.encode_aper(&mut encoder).unwrap();
        encoder.encode_open_type(&[1, 2, 3]).unwrap();
        RelativeAmfCapacity(7).encode_aper(&mut encoder).unwrap();
        let bytes = encoder.into_bytes();

        let mut decoder = AperDecoder::new(&bytes);
        skip_ie_extensions(&mut decoder).unwrap();
        assert_eq!(RelativeAmfCapacity::decode_aper(&mut decoder).unwrap(), RelativeAmfCapacity(7));
    }
}
