//! List IEs
//!
//! Slice and PLMN lists exchanged during NG Setup, and the PDU session
//! resource lists of the session management and handover procedures. Lists
//! decode atomically: a single malformed item fails the whole IE.

use ogs_asn1c::ngap::{NasPdu, PduSessionId};
use ogs_asn1c::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, PerResult};

use super::identity::{Guami, PlmnId, SNssai, Tac};
use super::scalar::AmfName;
use super::{decode_seq_of, encode_seq_of, SequenceHeader};

pub const MAX_NO_OF_ALLOWED_S_NSSAIS: usize = 8;
pub const MAX_NO_OF_PLMN_SLICES: usize = 12;
pub const MAX_NO_OF_SLICE_ITEMS: usize = 1024;
pub const MAX_NO_OF_SERVED_GUAMIS: usize = 256;
pub const MAX_NO_OF_TACS: usize = 256;
pub const MAX_NO_OF_BPLMNS: usize = 12;
pub const MAX_NO_OF_PDU_SESSIONS: usize = 256;

// ============================================================================
// Slice lists
// ============================================================================

/// Item of AllowedNSSAI and of SliceSupportList: { s-NSSAI, iE-Extensions OPTIONAL, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SliceItem(pub SNssai);

impl AperEncode for SliceItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[false]);
        self.0.encode_aper(encoder)
    }
}

impl AperDecode for SliceItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 1)?;
        let s_nssai = SNssai::decode_aper(decoder)?;
        header.finish(decoder)?;
        Ok(SliceItem(s_nssai))
    }
}

fn encode_slices(encoder: &mut AperEncoder, slices: &[SNssai], max: usize) -> PerResult<()> {
    let items: Vec<SliceItem> = slices.iter().copied().map(SliceItem).collect();
    encode_seq_of(encoder, &items, 1, max)
}

fn decode_slices(decoder: &mut AperDecoder, max: usize) -> PerResult<Vec<SNssai>> {
    Ok(decode_seq_of::<SliceItem>(decoder, 1, max)?
        .into_iter()
        .map(|item| item.0)
        .collect())
}

/// AllowedNSSAI ::= SEQUENCE (SIZE(1..maxnoofAllowedS-NSSAIs)) OF AllowedNSSAI-Item
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AllowedNssai(pub Vec<SNssai>);

impl AperEncode for AllowedNssai {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encode_slices(encoder, &self.0, MAX_NO_OF_ALLOWED_S_NSSAIS)
    }
}

impl AperDecode for AllowedNssai {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        Ok(AllowedNssai(decode_slices(decoder, MAX_NO_OF_ALLOWED_S_NSSAIS)?))
    }
}

// ============================================================================
// NG Setup lists
// ============================================================================

/// PLMNSupportItem ::= SEQUENCE { pLMNIdentity, sliceSupportList, iE-Extensions OPTIONAL, ... }
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlmnSupportItem {
    pub plmn_id: PlmnId,
    pub slice_support_list: Vec<SNssai>,
}

impl AperEncode for PlmnSupportItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[false]);
        self.plmn_id.encode_aper(encoder)?;
        encode_slices(encoder, &self.slice_support_list, MAX_NO_OF_SLICE_ITEMS)
    }
}

impl AperDecode for PlmnSupportItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 1)?;
        let plmn_id = PlmnId::decode_aper(decoder)?;
        let slice_support_list = decode_slices(decoder, MAX_NO_OF_SLICE_ITEMS)?;
        header.finish(decoder)?;
        Ok(PlmnSupportItem {
            plmn_id,
            slice_support_list,
        })
    }
}

/// PLMNSupportList ::= SEQUENCE (SIZE(1..maxnoofPLMNs)) OF PLMNSupportItem
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlmnSupportList(pub Vec<PlmnSupportItem>);

impl AperEncode for PlmnSupportList {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encode_seq_of(encoder, &self.0, 1, MAX_NO_OF_PLMN_SLICES)
    }
}

impl AperDecode for PlmnSupportList {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        Ok(PlmnSupportList(decode_seq_of(decoder, 1, MAX_NO_OF_PLMN_SLICES)?))
    }
}

/// ServedGUAMIItem ::= SEQUENCE { gUAMI, backupAMFName OPTIONAL, iE-Extensions OPTIONAL, ... }
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedGuamiItem {
    pub guami: Guami,
    pub backup_amf_name: Option<AmfName>,
}

impl AperEncode for ServedGuamiItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[self.backup_amf_name.is_some(), false]);
        self.guami.encode_aper(encoder)?;
        if let Some(name) = &self.backup_amf_name {
            name.encode_aper(encoder)?;
        }
        Ok(())
    }
}

impl AperDecode for ServedGuamiItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 2)?;
        let guami = Guami::decode_aper(decoder)?;
        let backup_amf_name = if header.is_present(0) {
            Some(AmfName::decode_aper(decoder)?)
        } else {
            None
        };
        header.finish(decoder)?;
        Ok(ServedGuamiItem {
            guami,
            backup_amf_name,
        })
    }
}

/// ServedGUAMIList ::= SEQUENCE (SIZE(1..maxnoofServedGUAMIs)) OF ServedGUAMIItem
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServedGuamiList(pub Vec<ServedGuamiItem>);

impl AperEncode for ServedGuamiList {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encode_seq_of(encoder, &self.0, 1, MAX_NO_OF_SERVED_GUAMIS)
    }
}

impl AperDecode for ServedGuamiList {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        Ok(ServedGuamiList(decode_seq_of(decoder, 1, MAX_NO_OF_SERVED_GUAMIS)?))
    }
}

/// BroadcastPLMNItem ::= SEQUENCE { pLMNIdentity, tAISliceSupportList, iE-Extensions OPTIONAL, ... }
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastPlmnItem {
    pub plmn_id: PlmnId,
    pub tai_slice_support_list: Vec<SNssai>,
}

impl AperEncode for BroadcastPlmnItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[false]);
        self.plmn_id.encode_aper(encoder)?;
        encode_slices(encoder, &self.tai_slice_support_list, MAX_NO_OF_SLICE_ITEMS)
    }
}

impl AperDecode for BroadcastPlmnItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 1)?;
        let plmn_id = PlmnId::decode_aper(decoder)?;
        let tai_slice_support_list = decode_slices(decoder, MAX_NO_OF_SLICE_ITEMS)?;
        header.finish(decoder)?;
        Ok(BroadcastPlmnItem {
            plmn_id,
            tai_slice_support_list,
        })
    }
}

/// SupportedTAItem ::= SEQUENCE { tAC, broadcastPLMNList, iE-Extensions OPTIONAL, ... }
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedTaItem {
    pub tac: Tac,
    pub broadcast_plmn_list: Vec<BroadcastPlmnItem>,
}

impl AperEncode for SupportedTaItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[false]);
        self.tac.encode_aper(encoder)?;
        encode_seq_of(encoder, &self.broadcast_plmn_list, 1, MAX_NO_OF_BPLMNS)
    }
}

impl AperDecode for SupportedTaItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 1)?;
        let tac = Tac::decode_aper(decoder)?;
        let broadcast_plmn_list = decode_seq_of(decoder, 1, MAX_NO_OF_BPLMNS)?;
        header.finish(decoder)?;
        Ok(SupportedTaItem {
            tac,
            broadcast_plmn_list,
        })
    }
}

/// SupportedTAList ::= SEQUENCE (SIZE(1..maxnoofTACs)) OF SupportedTAItem
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SupportedTaList(pub Vec<SupportedTaItem>);

impl AperEncode for SupportedTaList {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encode_seq_of(encoder, &self.0, 1, MAX_NO_OF_TACS)
    }
}

impl AperDecode for SupportedTaList {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        Ok(SupportedTaList(decode_seq_of(decoder, 1, MAX_NO_OF_TACS)?))
    }
}

// ============================================================================
// PDU session resource lists
// ============================================================================

/// Item that names the PDU session it belongs to
pub trait PduSessionItem {
    fn pdu_session_id(&self) -> PduSessionId;
}

/// SEQUENCE (SIZE(1..maxnoofPDUSessions)) OF item, shared by every PDU
/// session resource list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PduSessionList<T>(pub Vec<T>);

impl<T> Default for PduSessionList<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> From<Vec<T>> for PduSessionList<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T: PduSessionItem> PduSessionList<T> {
    /// Session ids in list order
    pub fn ids(&self) -> Vec<PduSessionId> {
        self.0.iter().map(PduSessionItem::pdu_session_id).collect()
    }
}

impl<T: AperEncode> AperEncode for PduSessionList<T> {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encode_seq_of(encoder, &self.0, 1, MAX_NO_OF_PDU_SESSIONS)
    }
}

impl<T: AperDecode> AperDecode for PduSessionList<T> {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        Ok(PduSessionList(decode_seq_of(decoder, 1, MAX_NO_OF_PDU_SESSIONS)?))
    }
}

/// { pDUSessionID, <transfer> OCTET STRING, iE-Extensions OPTIONAL, ... }
///
/// Shape of most PDU session resource items; the transfer is an opaque
/// SMF-owned container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PduSessionResourceItem {
    pub pdu_session_id: PduSessionId,
    pub transfer: Vec<u8>,
}

impl PduSessionResourceItem {
    pub fn new(pdu_session_id: u8, transfer: Vec<u8>) -> Self {
        Self {
            pdu_session_id: PduSessionId(pdu_session_id),
            transfer,
        }
    }
}

impl PduSessionItem for PduSessionResourceItem {
    fn pdu_session_id(&self) -> PduSessionId {
        self.pdu_session_id
    }
}

impl AperEncode for PduSessionResourceItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[false]);
        self.pdu_session_id.encode_aper(encoder)?;
        encoder.encode_octet_string(&self.transfer, None, None)
    }
}

impl AperDecode for PduSessionResourceItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 1)?;
        let pdu_session_id = PduSessionId::decode_aper(decoder)?;
        let transfer = decoder.decode_octet_string(None, None)?;
        header.finish(decoder)?;
        Ok(PduSessionResourceItem {
            pdu_session_id,
            transfer,
        })
    }
}

/// PDUSessionResourceSetupItemSUReq ::= SEQUENCE { pDUSessionID,
/// pDUSessionNAS-PDU OPTIONAL, s-NSSAI, pDUSessionResourceSetupRequestTransfer,
/// iE-Extensions OPTIONAL, ... }
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PduSessionSetupItem {
    pub pdu_session_id: PduSessionId,
    pub nas_pdu: Option<NasPdu>,
    pub s_nssai: SNssai,
    pub transfer: Vec<u8>,
}

impl PduSessionItem for PduSessionSetupItem {
    fn pdu_session_id(&self) -> PduSessionId {
        self.pdu_session_id
    }
}

impl AperEncode for PduSessionSetupItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[self.nas_pdu.is_some(), false]);
        self.pdu_session_id.encode_aper(encoder)?;
        if let Some(nas) = &self.nas_pdu {
            nas.encode_aper(encoder)?;
        }
        self.s_nssai.encode_aper(encoder)?;
        encoder.encode_octet_string(&self.transfer, None, None)
    }
}

impl AperDecode for PduSessionSetupItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 2)?;
        let pdu_session_id = PduSessionId::decode_aper(decoder)?;
        let nas_pdu = if header.is_present(0) {
            Some(NasPdu::decode_aper(decoder)?)
        } else {
            None
        };
        let s_nssai = SNssai::decode_aper(decoder)?;
        let transfer = decoder.decode_octet_string(None, None)?;
        header.finish(decoder)?;
        Ok(PduSessionSetupItem {
            pdu_session_id,
            nas_pdu,
            s_nssai,
            transfer,
        })
    }
}

/// PDUSessionResourceSetupItemHOReq ::= SEQUENCE { pDUSessionID, s-NSSAI,
/// handoverRequestTransfer, iE-Extensions OPTIONAL, ... }
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PduSessionHandoverSetupItem {
    pub pdu_session_id: PduSessionId,
    pub s_nssai: SNssai,
    pub transfer: Vec<u8>,
}

impl PduSessionItem for PduSessionHandoverSetupItem {
    fn pdu_session_id(&self) -> PduSessionId {
        self.pdu_session_id
    }
}

impl AperEncode for PduSessionHandoverSetupItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[false]);
        self.pdu_session_id.encode_aper(encoder)?;
        self.s_nssai.encode_aper(encoder)?;
        encoder.encode_octet_string(&self.transfer, None, None)
    }
}

impl AperDecode for PduSessionHandoverSetupItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 1)?;
        let pdu_session_id = PduSessionId::decode_aper(decoder)?;
        let s_nssai = SNssai::decode_aper(decoder)?;
        let transfer = decoder.decode_octet_string(None, None)?;
        header.finish(decoder)?;
        Ok(PduSessionHandoverSetupItem {
            pdu_session_id,
            s_nssai,
            transfer,
        })
    }
}

/// PDUSessionResourceModifyItemModReq ::= SEQUENCE { pDUSessionID,
/// nAS-PDU OPTIONAL, pDUSessionResourceModifyRequestTransfer,
/// iE-Extensions OPTIONAL, ... }
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PduSessionModifyItem {
    pub pdu_session_id: PduSessionId,
    pub nas_pdu: Option<NasPdu>,
    pub transfer: Vec<u8>,
}

impl PduSessionItem for PduSessionModifyItem {
    fn pdu_session_id(&self) -> PduSessionId {
        self.pdu_session_id
    }
}

impl AperEncode for PduSessionModifyItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[self.nas_pdu.is_some(), false]);
        self.pdu_session_id.encode_aper(encoder)?;
        if let Some(nas) = &self.nas_pdu {
            nas.encode_aper(encoder)?;
        }
        encoder.encode_octet_string(&self.transfer, None, None)
    }
}

impl AperDecode for PduSessionModifyItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 2)?;
        let pdu_session_id = PduSessionId::decode_aper(decoder)?;
        let nas_pdu = if header.is_present(0) {
            Some(NasPdu::decode_aper(decoder)?)
        } else {
            None
        };
        let transfer = decoder.decode_octet_string(None, None)?;
        header.finish(decoder)?;
        Ok(PduSessionModifyItem {
            pdu_session_id,
            nas_pdu,
            transfer,
        })
    }
}
