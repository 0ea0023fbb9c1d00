//! NGAP Cause Types
//!
//! Cause types from NGAP-IEs (3GPP TS 38.413)

use crate::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, Constraint, PerError, PerResult};

/// Look a decoded enumeration index up in the variant table of its type.
/// Unknown extension values are reported rather than guessed.
fn from_table<T: Copy>(table: &[T], value: i64, what: &'static str) -> PerResult<T> {
    usize::try_from(value)
        .ok()
        .and_then(|i| table.get(i).copied())
        .ok_or(PerError::UnsupportedExtension(what))
}

/// CauseRadioNetwork - Radio network layer cause values
/// ASN.1: CauseRadioNetwork ::= ENUMERATED { ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CauseRadioNetwork {
    Unspecified = 0,
    TxnrelocoverallExpiry = 1,
    SuccessfulHandover = 2,
    ReleaseDueToNgranGeneratedReason = 3,
    ReleaseDueTo5gcGeneratedReason = 4,
    HandoverCancelled = 5,
    PartialHandover = 6,
    HoFailureInTarget5gcNgranNodeOrTargetSystem = 7,
    HoTargetNotAllowed = 8,
    TngrelocoverallExpiry = 9,
    TngrelocprepExpiry = 10,
    CellNotAvailable = 11,
    UnknownTargetId = 12,
    NoRadioResourcesAvailableInTargetCell = 13,
    UnknownLocalUeNgapId = 14,
    InconsistentRemoteUeNgapId = 15,
    HandoverDesirableForRadioReason = 16,
    TimeCriticalHandover = 17,
    ResourceOptimisationHandover = 18,
    ReduceLoadInServingCell = 19,
    UserInactivity = 20,
    RadioConnectionWithUeLost = 21,
    RadioResourcesNotAvailable = 22,
    InvalidQosCombination = 23,
    FailureInRadioInterfaceProcedure = 24,
    InteractionWithOtherProcedure = 25,
    UnknownPduSessionId = 26,
    UnknownQosFlowId = 27,
    MultiplePduSessionIdInstances = 28,
    MultipleQosFlowIdInstances = 29,
    EncryptionAndOrIntegrityProtectionAlgorithmsNotSupported = 30,
    NgIntraSystemHandoverTriggered = 31,
    NgInterSystemHandoverTriggered = 32,
    XnHandoverTriggered = 33,
    NotSupported5qiValue = 34,
    UeContextTransfer = 35,
    ImsVoiceEpsFallbackOrRatFallbackTriggered = 36,
    UpIntegrityProtectionNotPossible = 37,
    UpConfidentialityProtectionNotPossible = 38,
    SliceNotSupported = 39,
    UeInRrcInactiveStateNotReachable = 40,
    Redirection = 41,
    ResourcesNotAvailableForTheSlice = 42,
    UeMaxIntegrityProtectedDataRateReason = 43,
    ReleaseDueToCnDetectedMobility = 44,
    // Extension values (45+)
    N26InterfaceNotAvailable = 45,
    ReleaseDueToPreEmption = 46,
}

impl CauseRadioNetwork {
    // Root enumeration has 45 values (0-44), extensible
    pub const CONSTRAINT: Constraint = Constraint::extensible(0, 44);

    const ALL: [Self; 47] = [
        Self::Unspecified,
        Self::TxnrelocoverallExpiry,
        Self::SuccessfulHandover,
        Self::ReleaseDueToNgranGeneratedReason,
        Self::ReleaseDueTo5gcGeneratedReason,
        Self::HandoverCancelled,
        Self::PartialHandover,
        Self::HoFailureInTarget5gcNgranNodeOrTargetSystem,
        Self::HoTargetNotAllowed,
        Self::TngrelocoverallExpiry,
        Self::TngrelocprepExpiry,
        Self::CellNotAvailable,
        Self::UnknownTargetId,
        Self::NoRadioResourcesAvailableInTargetCell,
        Self::UnknownLocalUeNgapId,
        Self::InconsistentRemoteUeNgapId,
        Self::HandoverDesirableForRadioReason,
        Self::TimeCriticalHandover,
        Self::ResourceOptimisationHandover,
        Self::ReduceLoadInServingCell,
        Self::UserInactivity,
        Self::RadioConnectionWithUeLost,
        Self::RadioResourcesNotAvailable,
        Self::InvalidQosCombination,
        Self::FailureInRadioInterfaceProcedure,
        Self::InteractionWithOtherProcedure,
        Self::UnknownPduSessionId,
        Self::UnknownQosFlowId,
        Self::MultiplePduSessionIdInstances,
        Self::MultipleQosFlowIdInstances,
        Self::EncryptionAndOrIntegrityProtectionAlgorithmsNotSupported,
        Self::NgIntraSystemHandoverTriggered,
        Self::NgInterSystemHandoverTriggered,
        Self::XnHandoverTriggered,
        Self::NotSupported5qiValue,
        Self::UeContextTransfer,
        Self::ImsVoiceEpsFallbackOrRatFallbackTriggered,
        Self::UpIntegrityProtectionNotPossible,
        Self::UpConfidentialityProtectionNotPossible,
        Self::SliceNotSupported,
        Self::UeInRrcInactiveStateNotReachable,
        Self::Redirection,
        Self::ResourcesNotAvailableForTheSlice,
        Self::UeMaxIntegrityProtectedDataRateReason,
        Self::ReleaseDueToCnDetectedMobility,
        Self::N26InterfaceNotAvailable,
        Self::ReleaseDueToPreEmption,
    ];
}

impl AperEncode for CauseRadioNetwork {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_enumerated(*self as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for CauseRadioNetwork {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let value = decoder.decode_enumerated(&Self::CONSTRAINT)?;
        from_table(&Self::ALL, value, "CauseRadioNetwork")
    }
}

/// CauseTransport - Transport layer cause values
/// ASN.1: CauseTransport ::= ENUMERATED { transport-resource-unavailable, unspecified, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CauseTransport {
    TransportResourceUnavailable = 0,
    Unspecified = 1,
}

impl CauseTransport {
    pub const CONSTRAINT: Constraint = Constraint::extensible(0, 1);

    const ALL: [Self; 2] = [Self::TransportResourceUnavailable, Self::Unspecified];
}

impl AperEncode for CauseTransport {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_enumerated(*self as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for CauseTransport {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let value = decoder.decode_enumerated(&Self::CONSTRAINT)?;
        from_table(&Self::ALL, value, "CauseTransport")
    }
}

/// CauseNas - NAS layer cause values
/// ASN.1: CauseNas ::= ENUMERATED { normal-release, authentication-failure, deregister, unspecified, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CauseNas {
    NormalRelease = 0,
    AuthenticationFailure = 1,
    Deregister = 2,
    Unspecified = 3,
    // Extension
    UeNotInPlmnServingArea = 4,
}

impl CauseNas {
    pub const CONSTRAINT: Constraint = Constraint::extensible(0, 3);

    const ALL: [Self; 5] = [
        Self::NormalRelease,
        Self::AuthenticationFailure,
        Self::Deregister,
        Self::Unspecified,
        Self::UeNotInPlmnServingArea,
    ];
}

impl AperEncode for CauseNas {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_enumerated(*self as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for CauseNas {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let value = decoder.decode_enumerated(&Self::CONSTRAINT)?;
        from_table(&Self::ALL, value, "CauseNas")
    }
}

/// CauseProtocol - Protocol layer cause values
/// ASN.1: CauseProtocol ::= ENUMERATED { ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CauseProtocol {
    TransferSyntaxError = 0,
    AbstractSyntaxErrorReject = 1,
    AbstractSyntaxErrorIgnoreAndNotify = 2,
    MessageNotCompatibleWithReceiverState = 3,
    SemanticError = 4,
    AbstractSyntaxErrorFalselyConstructedMessage = 5,
    Unspecified = 6,
}

impl CauseProtocol {
    pub const CONSTRAINT: Constraint = Constraint::extensible(0, 6);

    const ALL: [Self; 7] = [
        Self::TransferSyntaxError,
        Self::AbstractSyntaxErrorReject,
        Self::AbstractSyntaxErrorIgnoreAndNotify,
        Self::MessageNotCompatibleWithReceiverState,
        Self::SemanticError,
        Self::AbstractSyntaxErrorFalselyConstructedMessage,
        Self::Unspecified,
    ];
}

impl AperEncode for CauseProtocol {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_enumerated(*self as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for CauseProtocol {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let value = decoder.decode_enumerated(&Self::CONSTRAINT)?;
        from_table(&Self::ALL, value, "CauseProtocol")
    }
}

/// CauseMisc - Miscellaneous cause values
/// ASN.1: CauseMisc ::= ENUMERATED { ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CauseMisc {
    ControlProcessingOverload = 0,
    NotEnoughUserPlaneProcessingResources = 1,
    HardwareFailure = 2,
    OmIntervention = 3,
    UnknownPlmnOrSnpn = 4,
    Unspecified = 5,
}

impl CauseMisc {
    pub const CONSTRAINT: Constraint = Constraint::extensible(0, 5);

    const ALL: [Self; 6] = [
        Self::ControlProcessingOverload,
        Self::NotEnoughUserPlaneProcessingResources,
        Self::HardwareFailure,
        Self::OmIntervention,
        Self::UnknownPlmnOrSnpn,
        Self::Unspecified,
    ];
}

impl AperEncode for CauseMisc {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_enumerated(*self as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for CauseMisc {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let value = decoder.decode_enumerated(&Self::CONSTRAINT)?;
        from_table(&Self::ALL, value, "CauseMisc")
    }
}

/// Cause - CHOICE type for all cause categories
/// ASN.1: Cause ::= CHOICE { radioNetwork, transport, nas, protocol, misc, choice-Extensions }
///
/// The CHOICE has no extension marker; `choice-Extensions` is a sixth root
/// alternative whose content this codec does not interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    RadioNetwork(CauseRadioNetwork),
    Transport(CauseTransport),
    Nas(CauseNas),
    Protocol(CauseProtocol),
    Misc(CauseMisc),
}

impl Cause {
    pub const NUM_ALTERNATIVES: usize = 6;
    pub const EXTENSIBLE: bool = false;

    /// Group name and numeric value, for logs
    pub fn describe(&self) -> (&'static str, u8) {
        match self {
            Cause::RadioNetwork(v) => ("radioNetwork", *v as u8),
            Cause::Transport(v) => ("transport", *v as u8),
            Cause::Nas(v) => ("nas", *v as u8),
            Cause::Protocol(v) => ("protocol", *v as u8),
            Cause::Misc(v) => ("misc", *v as u8),
        }
    }
}

impl std::fmt::Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (group, value) = self.describe();
        write!(f, "{group}:{value}")
    }
}

impl AperEncode for Cause {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        match self {
            Cause::RadioNetwork(v) => {
                encoder.encode_choice_index(0, Self::NUM_ALTERNATIVES, Self::EXTENSIBLE)?;
                v.encode_aper(encoder)
            }
            Cause::Transport(v) => {
                encoder.encode_choice_index(1, Self::NUM_ALTERNATIVES, Self::EXTENSIBLE)?;
                v.encode_aper(encoder)
            }
            Cause::Nas(v) => {
                encoder.encode_choice_index(2, Self::NUM_ALTERNATIVES, Self::EXTENSIBLE)?;
                v.encode_aper(encoder)
            }
            Cause::Protocol(v) => {
                encoder.encode_choice_index(3, Self::NUM_ALTERNATIVES, Self::EXTENSIBLE)?;
                v.encode_aper(encoder)
            }
            Cause::Misc(v) => {
                encoder.encode_choice_index(4, Self::NUM_ALTERNATIVES, Self::EXTENSIBLE)?;
                v.encode_aper(encoder)
            }
        }
    }
}

impl AperDecode for Cause {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let index = decoder.decode_choice_index(Self::NUM_ALTERNATIVES, Self::EXTENSIBLE)?;
        match index {
            0 => Ok(Cause::RadioNetwork(CauseRadioNetwork::decode_aper(decoder)?)),
            1 => Ok(Cause::Transport(CauseTransport::decode_aper(decoder)?)),
            2 => Ok(Cause::Nas(CauseNas::decode_aper(decoder)?)),
            3 => Ok(Cause::Protocol(CauseProtocol::decode_aper(decoder)?)),
            4 => Ok(Cause::Misc(CauseMisc::decode_aper(decoder)?)),
            _ => Err(PerError::UnknownChoice {
                index,
                alternatives: Self::NUM_ALTERNATIVES - 1,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(cause: Cause) -> Cause {
        let mut encoder = AperEncoder::new();
        cause.encode_aper(&mut encoder).unwrap();
        let bytes = encoder.into_bytes();
        let mut decoder = AperDecoder::new(&bytes);
        Cause::decode_aper(&mut decoder).unwrap()
    }

    #[test]
    fn test_cause_radio_network_roundtrip() {
        let cause = Cause::RadioNetwork(CauseRadioNetwork::HandoverDesirableForRadioReason);
        assert_eq!(roundtrip(cause), cause);
    }

    #[test]
    fn test_cause_extension_value_roundtrip() {
        let cause = Cause::RadioNetwork(CauseRadioNetwork::ReleaseDueToPreEmption);
        assert_eq!(roundtrip(cause), cause);
    }

    #[test]
    fn test_cause_misc_roundtrip() {
        let cause = Cause::Misc(CauseMisc::HardwareFailure);
        assert_eq!(roundtrip(cause), cause);
    }

    #[test]
    fn test_cause_wire_bits() {
        // 3-bit choice index 0, ext bit 0, 6-bit value 10
        let mut encoder = AperEncoder::new();
        Cause::RadioNetwork(CauseRadioNetwork::TngrelocprepExpiry)
            .encode_aper(&mut encoder)
            .unwrap();
        assert_eq!(encoder.into_bytes().as_ref(), &[0x02, 0x80]);
    }

    #[test]
    fn test_cause_choice_extensions_rejected() {
        // Index 5 is choice-Extensions
        let mut decoder = AperDecoder::new(&[0xA0, 0x00]);
        assert!(matches!(
            Cause::decode_aper(&mut decoder),
            Err(PerError::UnknownChoice { index: 5, .. })
        ));
    }

    #[test]
    fn test_unknown_extension_value() {
        // misc, ext bit set, normally-small 9
        let mut encoder = AperEncoder::new();
        encoder.encode_choice_index(4, Cause::NUM_ALTERNATIVES, false).unwrap();
        encoder.write_bit(true);
        encoder.encode_normally_small_non_negative(9).unwrap();
        let bytes = encoder.into_bytes();

        let mut decoder = AperDecoder::new(&bytes);
        assert_eq!(
            Cause::decode_aper(&mut decoder),
            Err(PerError::UnsupportedExtension("CauseMisc"))
        );
    }
}
