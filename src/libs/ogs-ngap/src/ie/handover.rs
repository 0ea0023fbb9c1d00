//! Handover IEs: UE-AMBR, security capabilities and context, RAN status
//! transfer container, release command transfer

use bitvec::prelude::*;
use ogs_asn1c::ngap::Cause;
use ogs_asn1c::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, Constraint, PerError, PerResult};

use super::{decode_seq_of, encode_seq_of, SequenceHeader};

pub const MAX_NO_OF_DRBS: usize = 32;

// ============================================================================
// UE-AMBR
// ============================================================================

/// BitRate ::= INTEGER (0..4000000000000, ...)
const BIT_RATE: Constraint = Constraint::extensible(0, 4_000_000_000_000);

/// UEAggregateMaximumBitRate ::= SEQUENCE { uEAggregateMaximumBitRateDL,
/// uEAggregateMaximumBitRateUL, iE-Extensions OPTIONAL, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UeAmbr {
    pub dl: u64,
    pub ul: u64,
}

impl AperEncode for UeAmbr {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[false]);
        encoder.encode_integer(bit_rate(self.dl)?, &BIT_RATE)?;
        encoder.encode_integer(bit_rate(self.ul)?, &BIT_RATE)
    }
}

impl AperDecode for UeAmbr {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 1)?;
        let dl = decoder.decode_integer(&BIT_RATE)?;
        let ul = decoder.decode_integer(&BIT_RATE)?;
        header.finish(decoder)?;
        Ok(UeAmbr {
            dl: u64::try_from(dl).map_err(|_| negative_bit_rate(dl))?,
            ul: u64::try_from(ul).map_err(|_| negative_bit_rate(ul))?,
        })
    }
}

fn bit_rate(value: u64) -> PerResult<i64> {
    i64::try_from(value).map_err(|_| PerError::ConstraintViolation {
        value: i64::MAX,
        min: BIT_RATE.min,
        max: BIT_RATE.max,
    })
}

fn negative_bit_rate(value: i64) -> PerError {
    PerError::ConstraintViolation {
        value,
        min: BIT_RATE.min,
        max: BIT_RATE.max,
    }
}

// ============================================================================
// Security
// ============================================================================

/// UESecurityCapabilities ::= SEQUENCE { nRencryptionAlgorithms,
/// nRintegrityProtectionAlgorithms, eUTRAencryptionAlgorithms,
/// eUTRAintegrityProtectionAlgorithms, iE-Extensions OPTIONAL, ... }
///
/// Each algorithm set is a BIT STRING (SIZE(16, ...)), held MSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UeSecurityCapabilities {
    pub nr_encryption: u16,
    pub nr_integrity: u16,
    pub eutra_encryption: u16,
    pub eutra_integrity: u16,
}

impl UeSecurityCapabilities {
    /// NEA1-3 / NIA1-3 (and their E-UTRA counterparts)
    pub const DEFAULT_ALGORITHMS: u16 = 0xe000;
}

impl Default for UeSecurityCapabilities {
    fn default() -> Self {
        Self {
            nr_encryption: Self::DEFAULT_ALGORITHMS,
            nr_integrity: Self::DEFAULT_ALGORITHMS,
            eutra_encryption: Self::DEFAULT_ALGORITHMS,
            eutra_integrity: Self::DEFAULT_ALGORITHMS,
        }
    }
}

fn encode_algorithms(encoder: &mut AperEncoder, value: u16) -> PerResult<()> {
    encoder.write_bit(false);
    encoder.encode_fixed_bits(value as u64, 16)
}

fn decode_algorithms(decoder: &mut AperDecoder) -> PerResult<u16> {
    if decoder.read_bit()? {
        return Err(PerError::UnsupportedExtension("SecurityAlgorithms size"));
    }
    Ok(decoder.decode_fixed_bits(16)? as u16)
}

impl AperEncode for UeSecurityCapabilities {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[false]);
        encode_algorithms(encoder, self.nr_encryption)?;
        encode_algorithms(encoder, self.nr_integrity)?;
        encode_algorithms(encoder, self.eutra_encryption)?;
        encode_algorithms(encoder, self.eutra_integrity)
    }
}

impl AperDecode for UeSecurityCapabilities {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 1)?;
        let capabilities = UeSecurityCapabilities {
            nr_encryption: decode_algorithms(decoder)?,
            nr_integrity: decode_algorithms(decoder)?,
            eutra_encryption: decode_algorithms(decoder)?,
            eutra_integrity: decode_algorithms(decoder)?,
        };
        header.finish(decoder)?;
        Ok(capabilities)
    }
}

/// SecurityContext ::= SEQUENCE { nextHopChainingCount INTEGER (0..7),
/// nextHopNH SecurityKey, iE-Extensions OPTIONAL, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SecurityContext {
    pub next_hop_chaining_count: u8,
    /// SecurityKey ::= BIT STRING (SIZE(256))
    pub next_hop: [u8; 32],
}

impl SecurityContext {
    const NCC: Constraint = Constraint::new(0, 7);
}

impl AperEncode for SecurityContext {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[false]);
        encoder.encode_constrained_whole_number(self.next_hop_chaining_count as i64, &Self::NCC)?;
        encoder.encode_bit_string(self.next_hop.view_bits::<Msb0>(), Some(256), Some(256))
    }
}

impl AperDecode for SecurityContext {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 1)?;
        let ncc = decoder.decode_constrained_whole_number(&Self::NCC)? as u8;
        let bits = decoder.decode_bit_string(Some(256), Some(256))?;
        let mut next_hop = [0u8; 32];
        next_hop.view_bits_mut::<Msb0>().copy_from_bitslice(&bits);
        header.finish(decoder)?;
        Ok(SecurityContext {
            next_hop_chaining_count: ncc,
            next_hop,
        })
    }
}

/// SecurityKey ::= BIT STRING (SIZE(256)), the KgNB of an Initial Context
/// Setup Request
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct SecurityKey(pub [u8; 32]);

impl std::fmt::Debug for SecurityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecurityKey(..)")
    }
}

impl AperEncode for SecurityKey {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_bit_string(self.0.view_bits::<Msb0>(), Some(256), Some(256))
    }
}

impl AperDecode for SecurityKey {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let bits = decoder.decode_bit_string(Some(256), Some(256))?;
        let mut key = [0u8; 32];
        key.view_bits_mut::<Msb0>().copy_from_bitslice(&bits);
        Ok(SecurityKey(key))
    }
}

// ============================================================================
// RAN Status Transfer
// ============================================================================

/// PDCP sequence number length, selecting the 12-bit or 18-bit COUNT layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdcpSnLength {
    Sn12,
    Sn18,
}

impl PdcpSnLength {
    fn index(&self) -> usize {
        match self {
            PdcpSnLength::Sn12 => 0,
            PdcpSnLength::Sn18 => 1,
        }
    }

    fn from_index(index: usize) -> PerResult<Self> {
        match index {
            0 => Ok(PdcpSnLength::Sn12),
            1 => Ok(PdcpSnLength::Sn18),
            _ => Err(PerError::UnknownChoice { index, alternatives: 2 }),
        }
    }

    fn sn(&self) -> Constraint {
        match self {
            PdcpSnLength::Sn12 => Constraint::new(0, 4095),
            PdcpSnLength::Sn18 => Constraint::new(0, 262_143),
        }
    }

    fn hfn(&self) -> Constraint {
        match self {
            PdcpSnLength::Sn12 => Constraint::new(0, 1_048_575),
            PdcpSnLength::Sn18 => Constraint::new(0, 16_383),
        }
    }

    /// Upper bound of the receive-status bitmap
    fn max_receive_status(&self) -> usize {
        match self {
            PdcpSnLength::Sn12 => 2048,
            PdcpSnLength::Sn18 => 131_072,
        }
    }
}

/// COUNTValueForPDCP-SN12 / COUNTValueForPDCP-SN18
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountValue {
    pub pdcp_sn: u32,
    pub hfn: u32,
}

impl CountValue {
    fn encode(&self, encoder: &mut AperEncoder, sn_length: PdcpSnLength) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[false]);
        encoder.encode_constrained_whole_number(self.pdcp_sn as i64, &sn_length.sn())?;
        encoder.encode_constrained_whole_number(self.hfn as i64, &sn_length.hfn())
    }

    fn decode(decoder: &mut AperDecoder, sn_length: PdcpSnLength) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 1)?;
        let pdcp_sn = decoder.decode_constrained_whole_number(&sn_length.sn())? as u32;
        let hfn = decoder.decode_constrained_whole_number(&sn_length.hfn())? as u32;
        header.finish(decoder)?;
        Ok(CountValue { pdcp_sn, hfn })
    }
}

/// DRBStatusUL ::= CHOICE { dRBStatusUL12, dRBStatusUL18, choice-Extensions }
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrbStatusUl {
    pub sn_length: PdcpSnLength,
    pub count: CountValue,
    pub receive_status: Option<BitVec<u8, Msb0>>,
}

impl AperEncode for DrbStatusUl {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_choice_index(self.sn_length.index(), 3, false)?;
        encoder.encode_sequence_preamble(true, &[self.receive_status.is_some(), false]);
        self.count.encode(encoder, self.sn_length)?;
        if let Some(bits) = &self.receive_status {
            encoder.encode_bit_string(bits, Some(1), Some(self.sn_length.max_receive_status()))?;
        }
        Ok(())
    }
}

impl AperDecode for DrbStatusUl {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let sn_length = PdcpSnLength::from_index(decoder.decode_choice_index(3, false)?)?;
        let header = SequenceHeader::decode(decoder, 2)?;
        let count = CountValue::decode(decoder, sn_length)?;
        let receive_status = if header.is_present(0) {
            Some(decoder.decode_bit_string(Some(1), Some(sn_length.max_receive_status()))?)
        } else {
            None
        };
        header.finish(decoder)?;
        Ok(DrbStatusUl {
            sn_length,
            count,
            receive_status,
        })
    }
}

/// DRBStatusDL ::= CHOICE { dRBStatusDL12, dRBStatusDL18, choice-Extensions }
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrbStatusDl {
    pub sn_length: PdcpSnLength,
    pub count: CountValue,
}

impl AperEncode for DrbStatusDl {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_choice_index(self.sn_length.index(), 3, false)?;
        encoder.encode_sequence_preamble(true, &[false]);
        self.count.encode(encoder, self.sn_length)
    }
}

impl AperDecode for DrbStatusDl {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let sn_length = PdcpSnLength::from_index(decoder.decode_choice_index(3, false)?)?;
        let header = SequenceHeader::decode(decoder, 1)?;
        let count = CountValue::decode(decoder, sn_length)?;
        header.finish(decoder)?;
        Ok(DrbStatusDl { sn_length, count })
    }
}

/// DRBsSubjectToStatusTransferItem ::= SEQUENCE { dRB-ID, dRBStatusUL,
/// dRBStatusDL, iE-Extension OPTIONAL, ... }
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrbStatusItem {
    /// DRB-ID ::= INTEGER (1..32, ...)
    pub drb_id: u8,
    pub ul: DrbStatusUl,
    pub dl: DrbStatusDl,
}

impl DrbStatusItem {
    const DRB_ID: Constraint = Constraint::extensible(1, 32);
}

impl AperEncode for DrbStatusItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[false]);
        encoder.encode_integer(self.drb_id as i64, &Self::DRB_ID)?;
        self.ul.encode_aper(encoder)?;
        self.dl.encode_aper(encoder)
    }
}

impl AperDecode for DrbStatusItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 1)?;
        let drb_id = decoder.decode_integer(&Self::DRB_ID)?;
        let drb_id = u8::try_from(drb_id).map_err(|_| PerError::ConstraintViolation {
            value: drb_id,
            min: 1,
            max: 32,
        })?;
        let ul = DrbStatusUl::decode_aper(decoder)?;
        let dl = DrbStatusDl::decode_aper(decoder)?;
        header.finish(decoder)?;
        Ok(DrbStatusItem { drb_id, ul, dl })
    }
}

/// RANStatusTransfer-TransparentContainer ::= SEQUENCE {
/// dRBsSubjectToStatusTransferList, iE-Extensions OPTIONAL, ... }
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RanStatusTransferContainer {
    pub drbs: Vec<DrbStatusItem>,
}

impl AperEncode for RanStatusTransferContainer {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[false]);
        encode_seq_of(encoder, &self.drbs, 1, MAX_NO_OF_DRBS)
    }
}

impl AperDecode for RanStatusTransferContainer {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 1)?;
        let drbs = decode_seq_of(decoder, 1, MAX_NO_OF_DRBS)?;
        header.finish(decoder)?;
        Ok(RanStatusTransferContainer { drbs })
    }
}

// ============================================================================
// PDU Session Resource Release Command Transfer
// ============================================================================

/// PDUSessionResourceReleaseCommandTransfer ::= SEQUENCE { cause,
/// iE-Extensions OPTIONAL, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduSessionResourceReleaseCommandTransfer {
    pub cause: Cause,
}

impl AperEncode for PduSessionResourceReleaseCommandTransfer {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[false]);
        self.cause.encode_aper(encoder)
    }
}

impl AperDecode for PduSessionResourceReleaseCommandTransfer {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 1)?;
        let cause = Cause::decode_aper(decoder)?;
        header.finish(decoder)?;
        Ok(PduSessionResourceReleaseCommandTransfer { cause })
    }
}
