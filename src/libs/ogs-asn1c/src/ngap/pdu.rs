//! NGAP PDU Types
//!
//! Top-level PDU structures from NGAP-PDU-Descriptions (3GPP TS 38.413)

use super::ies::ProtocolIeContainer;
use super::types::{Criticality, ProcedureCode};
use crate::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, PerError, PerResult};

/// Which of the three NGAP-PDU alternatives a message travels in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PduKind {
    InitiatingMessage,
    SuccessfulOutcome,
    UnsuccessfulOutcome,
}

impl PduKind {
    pub fn name(&self) -> &'static str {
        match self {
            PduKind::InitiatingMessage => "initiatingMessage",
            PduKind::SuccessfulOutcome => "successfulOutcome",
            PduKind::UnsuccessfulOutcome => "unsuccessfulOutcome",
        }
    }

    fn index(&self) -> usize {
        match self {
            PduKind::InitiatingMessage => 0,
            PduKind::SuccessfulOutcome => 1,
            PduKind::UnsuccessfulOutcome => 2,
        }
    }
}

/// NGAP-PDU - Top-level PDU for all NGAP messages
/// ASN.1: NGAP-PDU ::= CHOICE { initiatingMessage, successfulOutcome, unsuccessfulOutcome, ... }
#[derive(Debug, Clone, PartialEq)]
pub enum NgapPdu {
    InitiatingMessage(ProcedureMessage),
    SuccessfulOutcome(ProcedureMessage),
    UnsuccessfulOutcome(ProcedureMessage),
}

impl NgapPdu {
    pub const NUM_ALTERNATIVES: usize = 3;
    pub const EXTENSIBLE: bool = true;

    pub fn new(kind: PduKind, message: ProcedureMessage) -> Self {
        match kind {
            PduKind::InitiatingMessage => NgapPdu::InitiatingMessage(message),
            PduKind::SuccessfulOutcome => NgapPdu::SuccessfulOutcome(message),
            PduKind::UnsuccessfulOutcome => NgapPdu::UnsuccessfulOutcome(message),
        }
    }

    pub fn kind(&self) -> PduKind {
        match self {
            NgapPdu::InitiatingMessage(_) => PduKind::InitiatingMessage,
            NgapPdu::SuccessfulOutcome(_) => PduKind::SuccessfulOutcome,
            NgapPdu::UnsuccessfulOutcome(_) => PduKind::UnsuccessfulOutcome,
        }
    }

    pub fn message(&self) -> &ProcedureMessage {
        match self {
            NgapPdu::InitiatingMessage(m)
            | NgapPdu::SuccessfulOutcome(m)
            | NgapPdu::UnsuccessfulOutcome(m) => m,
        }
    }

    pub fn into_message(self) -> ProcedureMessage {
        match self {
            NgapPdu::InitiatingMessage(m)
            | NgapPdu::SuccessfulOutcome(m)
            | NgapPdu::UnsuccessfulOutcome(m) => m,
        }
    }

    pub fn procedure_code(&self) -> ProcedureCode {
        self.message().procedure_code
    }
}

impl AperEncode for NgapPdu {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_choice_index(self.kind().index(), Self::NUM_ALTERNATIVES, Self::EXTENSIBLE)?;
        self.message().encode_aper(encoder)
    }
}

impl AperDecode for NgapPdu {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let index = decoder.decode_choice_index(Self::NUM_ALTERNATIVES, Self::EXTENSIBLE)?;
        let kind = match index {
            0 => PduKind::InitiatingMessage,
            1 => PduKind::SuccessfulOutcome,
            2 => PduKind::UnsuccessfulOutcome,
            _ => {
                return Err(PerError::UnknownChoice {
                    index,
                    alternatives: Self::NUM_ALTERNATIVES,
                })
            }
        };
        Ok(NgapPdu::new(kind, ProcedureMessage::decode_aper(decoder)?))
    }
}

/// Body shared by InitiatingMessage, SuccessfulOutcome and UnsuccessfulOutcome
/// ASN.1: SEQUENCE { procedureCode, criticality, value }
///
/// `value` is an open type holding the message SEQUENCE, which in turn is an
/// extensible `{ protocolIEs ProtocolIE-Container, ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureMessage {
    pub procedure_code: ProcedureCode,
    pub criticality: Criticality,
    pub value: ProtocolIeContainer,
}

impl AperEncode for ProcedureMessage {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        self.procedure_code.encode_aper(encoder)?;
        self.criticality.encode_aper(encoder)?;

        let mut value_encoder = AperEncoder::new();
        value_encoder.encode_sequence_preamble(true, &[]);
        self.value.encode_aper(&mut value_encoder)?;
        let value_bytes = value_encoder.into_bytes();

        encoder.encode_open_type(&value_bytes)
    }
}

impl AperDecode for ProcedureMessage {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let procedure_code = ProcedureCode::decode_aper(decoder)?;
        let criticality = Criticality::decode_aper(decoder)?;

        let value_bytes = decoder.decode_open_type()?;
        let mut value_decoder = AperDecoder::new(&value_bytes);
        let (extended, _) = value_decoder.decode_sequence_preamble(true, 0)?;
        let value = ProtocolIeContainer::decode_aper(&mut value_decoder)?;
        if extended {
            value_decoder.skip_extension_additions()?;
        }

        Ok(ProcedureMessage {
            procedure_code,
            criticality,
            value,
        })
    }
}
