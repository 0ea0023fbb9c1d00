//! Names, enumerations and opaque containers

use ogs_asn1c::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, Constraint, PerError, PerResult};

/// AMFName / RANNodeName ::= PrintableString (SIZE(1..150, ...))
macro_rules! printable_name {
    ($name:ident, $what:literal) => {
        #[doc = concat!($what, " ::= PrintableString (SIZE(1..150, ...))")]
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub const MIN_LEN: usize = 1;
            pub const MAX_LEN: usize = 150;

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl AperEncode for $name {
            fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
                encoder.encode_printable_string(&self.0, Self::MIN_LEN, Self::MAX_LEN, true)
            }
        }

        impl AperDecode for $name {
            fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
                Ok(Self(decoder.decode_printable_string(Self::MIN_LEN, Self::MAX_LEN, true)?))
            }
        }
    };
}

printable_name!(AmfName, "AMFName");
printable_name!(RanNodeName, "RANNodeName");

/// PagingDRX ::= ENUMERATED { v32, v64, v128, v256, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PagingDrx {
    V32 = 0,
    V64 = 1,
    V128 = 2,
    V256 = 3,
}

impl PagingDrx {
    pub const CONSTRAINT: Constraint = Constraint::extensible(0, 3);

    pub fn frames(&self) -> u16 {
        match self {
            PagingDrx::V32 => 32,
            PagingDrx::V64 => 64,
            PagingDrx::V128 => 128,
            PagingDrx::V256 => 256,
        }
    }
}

impl AperEncode for PagingDrx {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_enumerated(*self as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for PagingDrx {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_enumerated(&Self::CONSTRAINT)? {
            0 => Ok(PagingDrx::V32),
            1 => Ok(PagingDrx::V64),
            2 => Ok(PagingDrx::V128),
            3 => Ok(PagingDrx::V256),
            _ => Err(PerError::UnsupportedExtension("PagingDRX")),
        }
    }
}

/// RRCEstablishmentCause ::= ENUMERATED { emergency, highPriorityAccess,
/// mt-Access, mo-Signalling, mo-Data, mo-VoiceCall, mo-VideoCall, mo-SMS,
/// mps-PriorityAccess, mcs-PriorityAccess, ..., notAvailable }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RrcEstablishmentCause {
    Emergency = 0,
    HighPriorityAccess = 1,
    MtAccess = 2,
    MoSignalling = 3,
    MoData = 4,
    MoVoiceCall = 5,
    MoVideoCall = 6,
    MoSms = 7,
    MpsPriorityAccess = 8,
    McsPriorityAccess = 9,
    NotAvailable = 10,
}

impl RrcEstablishmentCause {
    pub const CONSTRAINT: Constraint = Constraint::extensible(0, 9);

    const ALL: [RrcEstablishmentCause; 11] = [
        RrcEstablishmentCause::Emergency,
        RrcEstablishmentCause::HighPriorityAccess,
        RrcEstablishmentCause::MtAccess,
        RrcEstablishmentCause::MoSignalling,
        RrcEstablishmentCause::MoData,
        RrcEstablishmentCause::MoVoiceCall,
        RrcEstablishmentCause::MoVideoCall,
        RrcEstablishmentCause::MoSms,
        RrcEstablishmentCause::MpsPriorityAccess,
        RrcEstablishmentCause::McsPriorityAccess,
        RrcEstablishmentCause::NotAvailable,
    ];
}

impl AperEncode for RrcEstablishmentCause {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_enumerated(*self as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for RrcEstablishmentCause {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let value = decoder.decode_enumerated(&Self::CONSTRAINT)?;
        usize::try_from(value)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or(PerError::UnsupportedExtension("RRCEstablishmentCause"))
    }
}

/// UEContextRequest ::= ENUMERATED { requested, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UeContextRequest;

impl UeContextRequest {
    pub const CONSTRAINT: Constraint = Constraint::extensible(0, 0);
}

impl AperEncode for UeContextRequest {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_enumerated(0, &Self::CONSTRAINT)
    }
}

impl AperDecode for UeContextRequest {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_enumerated(&Self::CONSTRAINT)? {
            0 => Ok(UeContextRequest),
            _ => Err(PerError::UnsupportedExtension("UEContextRequest")),
        }
    }
}

/// HandoverType ::= ENUMERATED { intra5gs, fivegs-to-eps, eps-to-5gs, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HandoverType {
    Intra5gs = 0,
    FivegsToEps = 1,
    EpsTo5gs = 2,
}

impl HandoverType {
    pub const CONSTRAINT: Constraint = Constraint::extensible(0, 2);
}

impl AperEncode for HandoverType {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_enumerated(*self as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for HandoverType {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_enumerated(&Self::CONSTRAINT)? {
            0 => Ok(HandoverType::Intra5gs),
            1 => Ok(HandoverType::FivegsToEps),
            2 => Ok(HandoverType::EpsTo5gs),
            _ => Err(PerError::UnsupportedExtension("HandoverType")),
        }
    }
}

/// Unconstrained OCTET STRING carried without interpretation: the
/// source/target transparent containers and the NGAP-Message of a reroute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TransparentContainer(pub Vec<u8>);

impl TransparentContainer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for TransparentContainer {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl AperEncode for TransparentContainer {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_octet_string(&self.0, None, None)
    }
}

impl AperDecode for TransparentContainer {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        Ok(Self(decoder.decode_octet_string(None, None)?))
    }
}

/// UERadioCapability ::= OCTET STRING, stored per UE and handed back to the
/// gNB on the next Initial Context Setup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UeRadioCapability(pub Vec<u8>);

impl From<Vec<u8>> for UeRadioCapability {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl AperEncode for UeRadioCapability {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_octet_string(&self.0, None, None)
    }
}

impl AperDecode for UeRadioCapability {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        Ok(Self(decoder.decode_octet_string(None, None)?))
    }
}
