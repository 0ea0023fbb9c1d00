//! NG Reset and UE context release identifiers

use ogs_asn1c::ngap::{AmfUeNgapId, RanUeNgapId};
use ogs_asn1c::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, Constraint, PerError, PerResult};

use super::{decode_seq_of, encode_seq_of, SequenceHeader};

pub const MAX_NO_OF_NG_CONNECTIONS_TO_RESET: usize = 65536;

/// UE-associatedLogicalNG-connectionItem ::= SEQUENCE { aMF-UE-NGAP-ID OPTIONAL,
/// rAN-UE-NGAP-ID OPTIONAL, iE-Extensions OPTIONAL, ... }
///
/// At least one of the two ids must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UeAssociatedLogicalNgConnectionItem {
    pub amf_ue_ngap_id: Option<AmfUeNgapId>,
    pub ran_ue_ngap_id: Option<RanUeNgapId>,
}

impl UeAssociatedLogicalNgConnectionItem {
    fn check(&self) -> PerResult<()> {
        if self.amf_ue_ngap_id.is_none() && self.ran_ue_ngap_id.is_none() {
            return Err(PerError::InvalidValue {
                what: "UE-associatedLogicalNG-connectionItem",
                reason: "neither AMF-UE-NGAP-ID nor RAN-UE-NGAP-ID present".to_string(),
            });
        }
        Ok(())
    }
}

impl AperEncode for UeAssociatedLogicalNgConnectionItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        self.check()?;
        encoder.encode_sequence_preamble(
            true,
            &[self.amf_ue_ngap_id.is_some(), self.ran_ue_ngap_id.is_some(), false],
        );
        if let Some(id) = &self.amf_ue_ngap_id {
            id.encode_aper(encoder)?;
        }
        if let Some(id) = &self.ran_ue_ngap_id {
            id.encode_aper(encoder)?;
        }
        Ok(())
    }
}

impl AperDecode for UeAssociatedLogicalNgConnectionItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let header = SequenceHeader::decode(decoder, 3)?;
        let amf_ue_ngap_id = if header.is_present(0) {
            Some(AmfUeNgapId::decode_aper(decoder)?)
        } else {
            None
        };
        let ran_ue_ngap_id = if header.is_present(1) {
            Some(RanUeNgapId::decode_aper(decoder)?)
        } else {
            None
        };
        header.finish(decoder)?;
        let item = UeAssociatedLogicalNgConnectionItem {
            amf_ue_ngap_id,
            ran_ue_ngap_id,
        };
        item.check()?;
        Ok(item)
    }
}

/// UE-associatedLogicalNG-connectionList ::= SEQUENCE
/// (SIZE(1..maxnoofNGConnectionsToReset)) OF UE-associatedLogicalNG-connectionItem
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UeAssociatedLogicalNgConnectionList(pub Vec<UeAssociatedLogicalNgConnectionItem>);

impl AperEncode for UeAssociatedLogicalNgConnectionList {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encode_seq_of(encoder, &self.0, 1, MAX_NO_OF_NG_CONNECTIONS_TO_RESET)
    }
}

impl AperDecode for UeAssociatedLogicalNgConnectionList {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        Ok(UeAssociatedLogicalNgConnectionList(decode_seq_of(
            decoder,
            1,
            MAX_NO_OF_NG_CONNECTIONS_TO_RESET,
        )?))
    }
}

/// ResetType ::= CHOICE { nG-Interface ResetAll, partOfNG-Interface
/// UE-associatedLogicalNG-connectionList, choice-Extensions }
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetType {
    /// ResetAll ::= ENUMERATED { reset-all, ... }
    NgInterface,
    PartOfNgInterface(UeAssociatedLogicalNgConnectionList),
}

impl ResetType {
    const RESET_ALL: Constraint = Constraint::extensible(0, 0);
}

impl AperEncode for ResetType {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        match self {
            ResetType::NgInterface => {
                encoder.encode_choice_index(0, 3, false)?;
                encoder.encode_enumerated(0, &Self::RESET_ALL)
            }
            ResetType::PartOfNgInterface(list) => {
                encoder.encode_choice_index(1, 3, false)?;
                list.encode_aper(encoder)
            }
        }
    }
}

impl AperDecode for ResetType {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_choice_index(3, false)? {
            0 => match decoder.decode_enumerated(&Self::RESET_ALL)? {
                0 => Ok(ResetType::NgInterface),
                _ => Err(PerError::UnsupportedExtension("ResetAll")),
            },
            1 => Ok(ResetType::PartOfNgInterface(
                UeAssociatedLogicalNgConnectionList::decode_aper(decoder)?,
            )),
            index => Err(PerError::UnknownChoice { index, alternatives: 2 }),
        }
    }
}

/// UE-NGAP-IDs ::= CHOICE { uE-NGAP-ID-pair, aMF-UE-NGAP-ID, choice-Extensions }
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UeNgapIds {
    /// UE-NGAP-ID-pair ::= SEQUENCE { aMF-UE-NGAP-ID, rAN-UE-NGAP-ID, iE-Extensions OPTIONAL, ... }
    Pair {
        amf_ue_ngap_id: AmfUeNgapId,
        ran_ue_ngap_id: RanUeNgapId,
    },
    AmfUeNgapId(AmfUeNgapId),
}

impl UeNgapIds {
    pub fn amf_ue_ngap_id(&self) -> AmfUeNgapId {
        match self {
            UeNgapIds::Pair { amf_ue_ngap_id, .. } => *amf_ue_ngap_id,
            UeNgapIds::AmfUeNgapId(id) => *id,
        }
    }
}

impl AperEncode for UeNgapIds {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        match self {
            UeNgapIds::Pair {
                amf_ue_ngap_id,
                ran_ue_ngap_id,
            } => {
                encoder.encode_choice_index(0, 3, false)?;
                encoder.encode_sequence_preamble(true, &[false]);
                amf_ue_ngap_id.encode_aper(encoder)?;
                ran_ue_ngap_id.encode_aper(encoder)
            }
            UeNgapIds::AmfUeNgapId(id) => {
                encoder.encode_choice_index(1, 3, false)?;
                id.encode_aper(encoder)
            }
        }
    }
}

impl AperDecode for UeNgapIds {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_choice_index(3, false)? {
            0 => {
                let header = SequenceHeader::decode(decoder, 1)?;
                let amf_ue_ngap_id = AmfUeNgapId::decode_aper(decoder)?;
                let ran_ue_ngap_id = RanUeNgapId::decode_aper(decoder)?;
                header.finish(decoder)?;
                Ok(UeNgapIds::Pair {
                    amf_ue_ngap_id,
                    ran_ue_ngap_id,
                })
            }
            1 => Ok(UeNgapIds::AmfUeNgapId(AmfUeNgapId::decode_aper(decoder)?)),
            index => Err(PerError::UnknownChoice { index, alternatives: 2 }),
        }
    }
}
