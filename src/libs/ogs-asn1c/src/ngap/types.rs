//! NGAP Basic Types
//!
//! Basic types from NGAP-CommonDataTypes (3GPP TS 38.413)

use crate::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, Constraint, PerError, PerResult};

/// Criticality - indicates how to handle unrecognized IEs
/// ASN.1: Criticality ::= ENUMERATED { reject, ignore, notify }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Criticality {
    Reject = 0,
    Ignore = 1,
    Notify = 2,
}

impl Criticality {
    pub const CONSTRAINT: Constraint = Constraint::new(0, 2);

    pub fn name(&self) -> &'static str {
        match self {
            Criticality::Reject => "reject",
            Criticality::Ignore => "ignore",
            Criticality::Notify => "notify",
        }
    }
}

impl AperEncode for Criticality {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_enumerated(*self as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for Criticality {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_enumerated(&Self::CONSTRAINT)? {
            0 => Ok(Criticality::Reject),
            1 => Ok(Criticality::Ignore),
            2 => Ok(Criticality::Notify),
            value => Err(PerError::ConstraintViolation { value, min: 0, max: 2 }),
        }
    }
}

/// ProcedureCode - identifies the NGAP procedure
/// ASN.1: ProcedureCode ::= INTEGER (0..255)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcedureCode(pub u8);

impl ProcedureCode {
    pub const CONSTRAINT: Constraint = Constraint::new(0, 255);

    // Procedure code constants from 3GPP TS 38.413
    pub const DOWNLINK_NAS_TRANSPORT: Self = Self(4);
    pub const DOWNLINK_RAN_STATUS_TRANSFER: Self = Self(7);
    pub const HANDOVER_CANCEL: Self = Self(10);
    pub const HANDOVER_NOTIFICATION: Self = Self(11);
    pub const HANDOVER_PREPARATION: Self = Self(12);
    pub const HANDOVER_RESOURCE_ALLOCATION: Self = Self(13);
    pub const INITIAL_CONTEXT_SETUP: Self = Self(14);
    pub const INITIAL_UE_MESSAGE: Self = Self(15);
    pub const NG_RESET: Self = Self(20);
    pub const NG_SETUP: Self = Self(21);
    pub const PDU_SESSION_RESOURCE_MODIFY: Self = Self(26);
    pub const PDU_SESSION_RESOURCE_RELEASE: Self = Self(28);
    pub const PDU_SESSION_RESOURCE_SETUP: Self = Self(29);
    pub const REROUTE_NAS_REQUEST: Self = Self(36);
    pub const UE_CONTEXT_RELEASE: Self = Self(41);
    pub const UE_RADIO_CAPABILITY_INFO_INDICATION: Self = Self(44);
    pub const UPLINK_NAS_TRANSPORT: Self = Self(46);
    pub const UPLINK_RAN_STATUS_TRANSFER: Self = Self(49);
}

impl AperEncode for ProcedureCode {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_constrained_whole_number(self.0 as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for ProcedureCode {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let value = decoder.decode_constrained_whole_number(&Self::CONSTRAINT)?;
        Ok(ProcedureCode(value as u8))
    }
}

/// ProtocolIE-ID - identifies the Information Element
/// ASN.1: ProtocolIE-ID ::= INTEGER (0..65535)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolIeId(pub u16);

impl ProtocolIeId {
    pub const CONSTRAINT: Constraint = Constraint::new(0, 65535);

    // IE IDs from 3GPP TS 38.413 (NGAP-Constants)
    pub const ALLOWED_NSSAI: Self = Self(0);
    pub const AMF_NAME: Self = Self(1);
    pub const AMF_SET_ID: Self = Self(3);
    pub const AMF_UE_NGAP_ID: Self = Self(10);
    pub const CAUSE: Self = Self(15);
    pub const DEFAULT_PAGING_DRX: Self = Self(21);
    pub const GLOBAL_RAN_NODE_ID: Self = Self(27);
    pub const GUAMI: Self = Self(28);
    pub const HANDOVER_TYPE: Self = Self(29);
    pub const NAS_PDU: Self = Self(38);
    pub const NGAP_MESSAGE: Self = Self(42);
    pub const PDU_SESSION_RESOURCE_ADMITTED_LIST: Self = Self(53);
    pub const PDU_SESSION_RESOURCE_FAILED_TO_MODIFY_LIST_MOD_RES: Self = Self(54);
    pub const PDU_SESSION_RESOURCE_FAILED_TO_SETUP_LIST_CXT_RES: Self = Self(55);
    pub const PDU_SESSION_RESOURCE_FAILED_TO_SETUP_LIST_HO_ACK: Self = Self(56);
    pub const PDU_SESSION_RESOURCE_FAILED_TO_SETUP_LIST_SU_RES: Self = Self(58);
    pub const PDU_SESSION_RESOURCE_HANDOVER_LIST: Self = Self(59);
    pub const PDU_SESSION_RESOURCE_LIST_HO_RQD: Self = Self(61);
    pub const PDU_SESSION_RESOURCE_MODIFY_LIST_MOD_REQ: Self = Self(64);
    pub const PDU_SESSION_RESOURCE_MODIFY_LIST_MOD_RES: Self = Self(65);
    pub const PDU_SESSION_RESOURCE_RELEASED_LIST_REL_RES: Self = Self(70);
    pub const PDU_SESSION_RESOURCE_SETUP_LIST_CXT_REQ: Self = Self(71);
    pub const PDU_SESSION_RESOURCE_SETUP_LIST_CXT_RES: Self = Self(72);
    pub const PDU_SESSION_RESOURCE_SETUP_LIST_HO_REQ: Self = Self(73);
    pub const PDU_SESSION_RESOURCE_SETUP_LIST_SU_REQ: Self = Self(74);
    pub const PDU_SESSION_RESOURCE_SETUP_LIST_SU_RES: Self = Self(75);
    pub const PDU_SESSION_RESOURCE_TO_RELEASE_LIST_HO_CMD: Self = Self(78);
    pub const PDU_SESSION_RESOURCE_TO_RELEASE_LIST_REL_CMD: Self = Self(79);
    pub const PLMN_SUPPORT_LIST: Self = Self(80);
    pub const RAN_NODE_NAME: Self = Self(82);
    pub const RAN_STATUS_TRANSFER_TRANSPARENT_CONTAINER: Self = Self(84);
    pub const RAN_UE_NGAP_ID: Self = Self(85);
    pub const RELATIVE_AMF_CAPACITY: Self = Self(86);
    pub const RESET_TYPE: Self = Self(88);
    pub const RRC_ESTABLISHMENT_CAUSE: Self = Self(90);
    pub const SECURITY_CONTEXT: Self = Self(93);
    pub const SECURITY_KEY: Self = Self(94);
    pub const SERVED_GUAMI_LIST: Self = Self(96);
    pub const SOURCE_TO_TARGET_TRANSPARENT_CONTAINER: Self = Self(101);
    pub const SUPPORTED_TA_LIST: Self = Self(102);
    pub const TARGET_ID: Self = Self(105);
    pub const TARGET_TO_SOURCE_TRANSPARENT_CONTAINER: Self = Self(106);
    pub const TIME_TO_WAIT: Self = Self(107);
    pub const UE_AGGREGATE_MAXIMUM_BIT_RATE: Self = Self(110);
    pub const UE_ASSOCIATED_LOGICAL_NG_CONNECTION_LIST: Self = Self(111);
    pub const UE_CONTEXT_REQUEST: Self = Self(112);
    pub const UE_NGAP_IDS: Self = Self(114);
    pub const UE_RADIO_CAPABILITY: Self = Self(117);
    pub const UE_RADIO_CAPABILITY_FOR_PAGING: Self = Self(118);
    pub const UE_SECURITY_CAPABILITIES: Self = Self(119);
    pub const USER_LOCATION_INFORMATION: Self = Self(121);
    pub const PDU_SESSION_RESOURCE_FAILED_TO_SETUP_LIST_CXT_FAIL: Self = Self(132);
}

impl AperEncode for ProtocolIeId {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_constrained_whole_number(self.0 as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for ProtocolIeId {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let value = decoder.decode_constrained_whole_number(&Self::CONSTRAINT)?;
        Ok(ProtocolIeId(value as u16))
    }
}

impl std::fmt::Display for ProtocolIeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Presence - indicates whether an IE is optional, conditional, or mandatory
/// ASN.1: Presence ::= ENUMERATED { optional, conditional, mandatory }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Presence {
    Optional = 0,
    Conditional = 1,
    Mandatory = 2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procedure_code_is_one_aligned_octet() {
        let mut encoder = AperEncoder::new();
        encoder.write_bit(true);
        ProcedureCode::HANDOVER_PREPARATION.encode_aper(&mut encoder).unwrap();
        assert_eq!(encoder.into_bytes().as_ref(), &[0x80, 12]);
    }

    #[test]
    fn test_ie_id_is_two_aligned_octets() {
        let mut encoder = AperEncoder::new();
        ProtocolIeId::USER_LOCATION_INFORMATION.encode_aper(&mut encoder).unwrap();
        assert_eq!(encoder.into_bytes().as_ref(), &[0x00, 121]);
    }

    #[test]
    fn test_criticality_out_of_range() {
        // 2 bits holding 3
        let mut decoder = AperDecoder::new(&[0xC0]);
        assert!(matches!(
            Criticality::decode_aper(&mut decoder),
            Err(PerError::ConstraintViolation { value: 3, .. })
        ));
    }
}
