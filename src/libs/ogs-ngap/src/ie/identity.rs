//! Identity IEs: PLMN, TAI, NR-CGI, S-NSSAI, GUAMI, RAN node and target ids,
//! User Location Information

use std::fmt;

use ogs_asn1c::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, PerError, PerResult};

use super::{to_array, SequenceHeader};

// ============================================================================
// PLMN Identity / TAC
// ============================================================================

/// PLMNIdentity ::= OCTET STRING (SIZE(3)), TBCD-packed MCC and MNC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlmnId(pub [u8; 3]);

impl PlmnId {
    pub fn from_mcc_mnc(mcc: u16, mnc: u16, mnc_len: u8) -> Self {
        let mcc1 = ((mcc / 100) % 10) as u8;
        let mcc2 = ((mcc / 10) % 10) as u8;
        let mcc3 = (mcc % 10) as u8;

        let (mnc1, mnc2, mnc3) = if mnc_len == 2 {
            (((mnc / 10) % 10) as u8, (mnc % 10) as u8, 0x0F)
        } else {
            (((mnc / 100) % 10) as u8, ((mnc / 10) % 10) as u8, (mnc % 10) as u8)
        };

        Self([(mcc2 << 4) | mcc1, (mnc3 << 4) | mcc3, (mnc2 << 4) | mnc1])
    }

    pub fn mcc(&self) -> u16 {
        let [b0, b1, _] = self.0;
        (b0 & 0x0F) as u16 * 100 + (b0 >> 4) as u16 * 10 + (b1 & 0x0F) as u16
    }

    pub fn mnc(&self) -> u16 {
        let [_, b1, b2] = self.0;
        let (mnc1, mnc2, mnc3) = ((b2 & 0x0F) as u16, (b2 >> 4) as u16, (b1 >> 4) as u16);
        if mnc3 == 0x0F {
            mnc1 * 10 + mnc2
        } else {
            mnc1 * 100 + mnc2 * 10 + mnc3
        }
    }

    pub fn mnc_len(&self) -> u8 {
        if self.0[1] >> 4 == 0x0F {
            2
        } else {
            3
        }
    }

    /// Every digit must be 0..9, except the third MNC digit which may be the
    /// 0xF filler
    pub fn validate(&self) -> PerResult<()> {
        let [b0, b1, b2] = self.0;
        let digits = [b0 & 0x0F, b0 >> 4, b1 & 0x0F, b2 & 0x0F, b2 >> 4];
        let mnc3 = b1 >> 4;
        if digits.iter().any(|d| *d > 9) || (mnc3 > 9 && mnc3 != 0x0F) {
            return Err(PerError::InvalidValue {
                what: "PLMNIdentity",
                reason: format!("{:02x}{:02x}{:02x} is not TBCD", b0, b1, b2),
            });
        }
        Ok(())
    }
}

impl fmt::Display for PlmnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mnc_len() == 2 {
            write!(f, "{:03}-{:02}", self.mcc(), self.mnc())
        } else {
            write!(f, "{:03}-{:03}", self.mcc(), self.mnc())
        }
    }
}

impl AperEncode for PlmnId {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        self.validate()?;
        encoder.encode_octet_string(&self.0, Some(3), Some(3))
    }
}

impl AperDecode for PlmnId {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let plmn = PlmnId(to_array(&decoder.decode_octet_string(Some(3), Some(3))?)?);
        plmn.validate()?;
        Ok(plmn)
    }
}

/// TAC ::= OCTET STRING (SIZE(3))
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tac(pub [u8; 3]);

impl Tac {
    pub fn from_u32(value: u32) -> Self {
        let b = (value & 0x00FF_FFFF).to_be_bytes();
        Self([b[1], b[2], b[3]])
    }

    pub fn value(&self) -> u32 {
        u32::from_be_bytes([0, self.0[0], self.0[1], self.0[2]])
    }
}

impl AperEncode for Tac {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_octet_string(&self.0, Some(3), Some(3))
    }
}

impl AperDecode for Tac {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        Ok(Tac(to_array(&decoder.decode_octet_string(Some(3), Some(3))?)?))
    }
}

/// TAI ::= SEQUENCE { pLMNIdentity, tAC, iE-Extensions OPTIONAL, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tai {
    pub plmn_id: PlmnId,
    pub tac: Tac,
}

impl AperEncode for Tai {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[false]);
        self.plmn_id.encode_aper(encoder)?;
        self.tac.encode_aper(encoder)
    }
}

impl AperDecode for Tai {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 1)?;
        let plmn_id = PlmnId::decode_aper(decoder)?;
        let tac = Tac::decode_aper(decoder)?;
        header.finish(decoder)?;
        Ok(Tai { plmn_id, tac })
    }
}

/// NR-CGI ::= SEQUENCE { pLMNIdentity, nRCellIdentity BIT STRING (SIZE(36)), ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NrCgi {
    pub plmn_id: PlmnId,
    pub cell_id: u64,
}

impl AperEncode for NrCgi {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[false]);
        self.plmn_id.encode_aper(encoder)?;
        encoder.encode_fixed_bits(self.cell_id, 36)
    }
}

impl AperDecode for NrCgi {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 1)?;
        let plmn_id = PlmnId::decode_aper(decoder)?;
        let cell_id = decoder.decode_fixed_bits(36)?;
        header.finish(decoder)?;
        Ok(NrCgi { plmn_id, cell_id })
    }
}

// ============================================================================
// S-NSSAI
// ============================================================================

/// Slice Differentiator, 24 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sd(u32);

impl Sd {
    pub fn new(value: u32) -> Self {
        Sd(value & 0x00FF_FFFF)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn to_octets(&self) -> [u8; 3] {
        let b = self.0.to_be_bytes();
        [b[1], b[2], b[3]]
    }

    /// Accepts the 3-octet form and the legacy 4-octet form, whose first
    /// octet is dropped
    pub fn from_octets(octets: &[u8]) -> PerResult<Self> {
        match octets {
            [a, b, c] | [_, a, b, c] => Ok(Sd(u32::from_be_bytes([0, *a, *b, *c]))),
            _ => Err(PerError::MalformedLength { length: octets.len() }),
        }
    }
}

/// S-NSSAI ::= SEQUENCE { sST SST, sD SD OPTIONAL, iE-Extensions OPTIONAL, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SNssai {
    pub sst: u8,
    pub sd: Option<Sd>,
}

impl SNssai {
    pub fn new(sst: u8, sd: Option<u32>) -> Self {
        Self {
            sst,
            sd: sd.map(Sd::new),
        }
    }
}

impl AperEncode for SNssai {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[self.sd.is_some(), false]);
        encoder.encode_octet_string(&[self.sst], Some(1), Some(1))?;
        if let Some(sd) = &self.sd {
            encoder.encode_octet_string(&sd.to_octets(), Some(3), Some(3))?;
        }
        Ok(())
    }
}

impl AperDecode for SNssai {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 2)?;
        let sst = decoder.decode_octet_string(Some(1), Some(1))?[0];
        let sd = if header.is_present(0) {
            Some(Sd::from_octets(&decoder.decode_octet_string(Some(3), Some(3))?)?)
        } else {
            None
        };
        header.finish(decoder)?;
        Ok(SNssai { sst, sd })
    }
}

// ============================================================================
// GUAMI
// ============================================================================

/// AMFSetID ::= BIT STRING (SIZE(10))
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AmfSetId(u16);

impl AmfSetId {
    pub const MAX: u16 = 0x3FF;

    pub fn new(value: u16) -> PerResult<Self> {
        if value > Self::MAX {
            return Err(PerError::ConstraintViolation {
                value: value as i64,
                min: 0,
                max: Self::MAX as i64,
            });
        }
        Ok(AmfSetId(value))
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// Two octets, six unused trailing bits
    pub fn to_octets(&self) -> [u8; 2] {
        [((self.0 & 0x3FC) >> 2) as u8, ((self.0 & 0x003) << 6) as u8]
    }

    pub fn from_octets(octets: [u8; 2]) -> Self {
        AmfSetId(((((octets[0] as u16) << 8) | octets[1] as u16) & 0xFFC0) >> 6)
    }
}

impl AperEncode for AmfSetId {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_fixed_bits(self.0 as u64, 10)
    }
}

impl AperDecode for AmfSetId {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        Ok(AmfSetId(decoder.decode_fixed_bits(10)? as u16))
    }
}

/// GUAMI ::= SEQUENCE { pLMNIdentity, aMFRegionID, aMFSetID, aMFPointer, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guami {
    pub plmn_id: PlmnId,
    /// AMF Region ID (8 bits)
    pub amf_region_id: u8,
    pub amf_set_id: AmfSetId,
    /// AMF Pointer (6 bits)
    pub amf_pointer: u8,
}

impl AperEncode for Guami {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[false]);
        self.plmn_id.encode_aper(encoder)?;
        encoder.encode_fixed_bits(self.amf_region_id as u64, 8)?;
        self.amf_set_id.encode_aper(encoder)?;
        encoder.encode_fixed_bits(self.amf_pointer as u64, 6)
    }
}

impl AperDecode for Guami {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 1)?;
        let plmn_id = PlmnId::decode_aper(decoder)?;
        let amf_region_id = decoder.decode_fixed_bits(8)? as u8;
        let amf_set_id = AmfSetId::decode_aper(decoder)?;
        let amf_pointer = decoder.decode_fixed_bits(6)? as u8;
        header.finish(decoder)?;
        Ok(Guami {
            plmn_id,
            amf_region_id,
            amf_set_id,
            amf_pointer,
        })
    }
}

// ============================================================================
// Global RAN Node ID / Target ID
// ============================================================================

/// NgENB-ID ::= CHOICE { macroNgENB-ID, shortMacroNgENB-ID, longMacroNgENB-ID, choice-Extensions }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NgEnbId {
    /// 20 bits
    Macro(u32),
    /// 18 bits
    ShortMacro(u32),
    /// 21 bits
    LongMacro(u32),
}

impl AperEncode for NgEnbId {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        let (index, value, bits) = match self {
            NgEnbId::Macro(v) => (0, *v, 20),
            NgEnbId::ShortMacro(v) => (1, *v, 18),
            NgEnbId::LongMacro(v) => (2, *v, 21),
        };
        encoder.encode_choice_index(index, 4, false)?;
        encoder.encode_fixed_bits(value as u64, bits)
    }
}

impl AperDecode for NgEnbId {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_choice_index(4, false)? {
            0 => Ok(NgEnbId::Macro(decoder.decode_fixed_bits(20)? as u32)),
            1 => Ok(NgEnbId::ShortMacro(decoder.decode_fixed_bits(18)? as u32)),
            2 => Ok(NgEnbId::LongMacro(decoder.decode_fixed_bits(21)? as u32)),
            index => Err(PerError::UnknownChoice { index, alternatives: 3 }),
        }
    }
}

/// GlobalRANNodeID ::= CHOICE { globalGNB-ID, globalNgENB-ID, globalN3IWF-ID, choice-Extensions }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalRanNodeId {
    Gnb {
        plmn_id: PlmnId,
        gnb_id: u32,
        /// gNB ID bit length (22..32)
        gnb_id_len: u8,
    },
    NgEnb {
        plmn_id: PlmnId,
        ng_enb_id: NgEnbId,
    },
}

impl GlobalRanNodeId {
    pub fn plmn_id(&self) -> PlmnId {
        match self {
            GlobalRanNodeId::Gnb { plmn_id, .. } | GlobalRanNodeId::NgEnb { plmn_id, .. } => {
                *plmn_id
            }
        }
    }
}

impl fmt::Display for GlobalRanNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlobalRanNodeId::Gnb { plmn_id, gnb_id, .. } => write!(f, "gnb:{plmn_id}:{gnb_id:#x}"),
            GlobalRanNodeId::NgEnb { plmn_id, ng_enb_id } => {
                write!(f, "ng-enb:{plmn_id}:{ng_enb_id:?}")
            }
        }
    }
}

impl AperEncode for GlobalRanNodeId {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        match self {
            GlobalRanNodeId::Gnb {
                plmn_id,
                gnb_id,
                gnb_id_len,
            } => {
                encoder.encode_choice_index(0, 4, false)?;
                encoder.encode_sequence_preamble(true, &[false]);
                plmn_id.encode_aper(encoder)?;
                // GNB-ID ::= CHOICE { gNB-ID BIT STRING (SIZE(22..32)), choice-Extensions }
                encoder.encode_choice_index(0, 2, false)?;
                encoder.encode_sized_bits(*gnb_id as u64, *gnb_id_len as usize, 22, 32)
            }
            GlobalRanNodeId::NgEnb { plmn_id, ng_enb_id } => {
                encoder.encode_choice_index(1, 4, false)?;
                encoder.encode_sequence_preamble(true, &[false]);
                plmn_id.encode_aper(encoder)?;
                ng_enb_id.encode_aper(encoder)
            }
        }
    }
}

impl AperDecode for GlobalRanNodeId {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_choice_index(4, false)? {
            0 => {
                let header = SequenceHeader::decode(decoder, 1)?;
                let plmn_id = PlmnId::decode_aper(decoder)?;
                let gnb_choice = decoder.decode_choice_index(2, false)?;
                if gnb_choice != 0 {
                    return Err(PerError::UnknownChoice { index: gnb_choice, alternatives: 1 });
                }
                let (gnb_id, len) = decoder.decode_sized_bits(22, 32)?;
                header.finish(decoder)?;
                Ok(GlobalRanNodeId::Gnb {
                    plmn_id,
                    gnb_id: gnb_id as u32,
                    gnb_id_len: len as u8,
                })
            }
            1 => {
                let header = SequenceHeader::decode(decoder, 1)?;
                let plmn_id = PlmnId::decode_aper(decoder)?;
                let ng_enb_id = NgEnbId::decode_aper(decoder)?;
                header.finish(decoder)?;
                Ok(GlobalRanNodeId::NgEnb { plmn_id, ng_enb_id })
            }
            index => Err(PerError::UnknownChoice { index, alternatives: 2 }),
        }
    }
}

/// TargetID ::= CHOICE { targetRANNodeID, targeteNB-ID, choice-Extensions }
///
/// Only intra-5GS targets are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetId {
    RanNode {
        global_ran_node_id: GlobalRanNodeId,
        selected_tai: Tai,
    },
}

impl AperEncode for TargetId {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        match self {
            TargetId::RanNode {
                global_ran_node_id,
                selected_tai,
            } => {
                encoder.encode_choice_index(0, 3, false)?;
                encoder.encode_sequence_preamble(true, &[false]);
                global_ran_node_id.encode_aper(encoder)?;
                selected_tai.encode_aper(encoder)
            }
        }
    }
}

impl AperDecode for TargetId {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_choice_index(3, false)? {
            0 => {
                let header = SequenceHeader::decode(decoder, 1)?;
                let global_ran_node_id = GlobalRanNodeId::decode_aper(decoder)?;
                let selected_tai = Tai::decode_aper(decoder)?;
                header.finish(decoder)?;
                Ok(TargetId::RanNode {
                    global_ran_node_id,
                    selected_tai,
                })
            }
            index => Err(PerError::UnknownChoice { index, alternatives: 1 }),
        }
    }
}

// ============================================================================
// User Location Information
// ============================================================================

/// UserLocationInformationNR ::= SEQUENCE { nR-CGI, tAI, timeStamp OPTIONAL, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserLocationInformationNr {
    pub nr_cgi: NrCgi,
    pub tai: Tai,
    pub timestamp: Option<[u8; 4]>,
}

/// UserLocationInformation ::= CHOICE { userLocationInformationEUTRA,
/// userLocationInformationNR, userLocationInformationN3IWF, choice-Extensions }
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserLocationInformation {
    Nr(UserLocationInformationNr),
}

impl UserLocationInformation {
    pub fn tai(&self) -> Tai {
        match self {
            UserLocationInformation::Nr(nr) => nr.tai,
        }
    }
}

impl AperEncode for UserLocationInformation {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        match self {
            UserLocationInformation::Nr(nr) => {
                encoder.encode_choice_index(1, 4, false)?;
                encoder.encode_sequence_preamble(true, &[nr.timestamp.is_some(), false]);
                nr.nr_cgi.encode_aper(encoder)?;
                nr.tai.encode_aper(encoder)?;
                if let Some(ts) = &nr.timestamp {
                    encoder.encode_octet_string(ts, Some(4), Some(4))?;
                }
                Ok(())
            }
        }
    }
}

impl AperDecode for UserLocationInformation {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_choice_index(4, false)? {
            1 => {
                let header = SequenceHeader::decode(decoder, 2)?;
                let nr_cgi = NrCgi::decode_aper(decoder)?;
                let tai = Tai::decode_aper(decoder)?;
                let timestamp = if header.is_present(0) {
                    Some(to_array(&decoder.decode_octet_string(Some(4), Some(4))?)?)
                } else {
                    None
                };
                header.finish(decoder)?;
                Ok(UserLocationInformation::Nr(UserLocationInformationNr {
                    nr_cgi,
                    tai,
                    timestamp,
                }))
            }
            index => Err(PerError::UnknownChoice { index, alternatives: 4 }),
        }
    }
}
