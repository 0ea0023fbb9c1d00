//! Per-message IE tables
//!
//! Every message kind declares which IEs it carries, with the criticality
//! and presence TS 38.413 assigns to each. `IeReader` and `IeWriter` are the
//! only ways a message touches its `ProtocolIE-Container`, so the criticality
//! rules are applied in one place for every message.

use ogs_asn1c::ngap::{
    Criticality, PduKind, Presence, ProcedureCode, ProtocolIeContainer, ProtocolIeField,
    ProtocolIeId,
};
use ogs_asn1c::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, PerResult};

use crate::error::{NgapError, NgapResult};
use crate::ie::decode_with;

/// One row of a message's IE table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IeSpec {
    pub id: ProtocolIeId,
    pub name: &'static str,
    pub criticality: Criticality,
    pub presence: Presence,
}

impl IeSpec {
    pub const fn mandatory(id: ProtocolIeId, name: &'static str, criticality: Criticality) -> Self {
        Self {
            id,
            name,
            criticality,
            presence: Presence::Mandatory,
        }
    }

    pub const fn optional(id: ProtocolIeId, name: &'static str, criticality: Criticality) -> Self {
        Self {
            id,
            name,
            criticality,
            presence: Presence::Optional,
        }
    }
}

/// IE table and PDU placement of one message kind
#[derive(Debug)]
pub struct MessageSpec {
    pub name: &'static str,
    pub kind: PduKind,
    pub procedure_code: ProcedureCode,
    /// Criticality of the elementary procedure
    pub criticality: Criticality,
    pub ies: &'static [IeSpec],
}

impl MessageSpec {
    pub fn matches(&self, kind: PduKind, procedure_code: ProcedureCode) -> bool {
        self.kind == kind && self.procedure_code == procedure_code
    }

    fn position(&self, id: ProtocolIeId) -> Option<usize> {
        self.ies.iter().position(|ie| ie.id == id)
    }

    fn entry(&self, id: ProtocolIeId) -> NgapResult<(usize, &'static IeSpec)> {
        let ies: &'static [IeSpec] = self.ies;
        ies.iter()
            .enumerate()
            .find(|(_, ie)| ie.id == id)
            .ok_or(NgapError::UnknownIe {
                id: id.0,
                message: self.name,
            })
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Decoded view of a container, indexed by the message's IE table
pub struct IeReader<'a> {
    spec: &'static MessageSpec,
    fields: Vec<Option<&'a ProtocolIeField>>,
}

impl<'a> IeReader<'a> {
    /// Walk the container in wire order. An id outside the table fails the
    /// message whatever criticality it was sent with; a repeated id fails the
    /// message; every mandatory IE must be present.
    pub fn collect(spec: &'static MessageSpec, container: &'a ProtocolIeContainer) -> NgapResult<Self> {
        let mut fields: Vec<Option<&'a ProtocolIeField>> = vec![None; spec.ies.len()];

        for field in &container.ies {
            let Some(index) = spec.position(field.id) else {
                log::warn!(
                    "{}: unknown IE id={} (criticality={})",
                    spec.name,
                    field.id,
                    field.criticality.name()
                );
                return Err(NgapError::UnknownIe {
                    id: field.id.0,
                    message: spec.name,
                });
            };

            if fields[index].is_some() {
                return Err(NgapError::DuplicateIe {
                    ie_name: spec.ies[index].name,
                    ie_id: field.id.0,
                });
            }
            fields[index] = Some(field);
        }

        for (ie, field) in spec.ies.iter().zip(&fields) {
            if ie.presence == Presence::Mandatory && field.is_none() {
                return Err(NgapError::MissingMandatoryIe {
                    ie_name: ie.name,
                    ie_id: ie.id.0,
                });
            }
        }

        Ok(Self { spec, fields })
    }

    pub fn message_name(&self) -> &'static str {
        self.spec.name
    }

    /// Decode a mandatory IE
    pub fn require<T: AperDecode>(&self, id: ProtocolIeId) -> NgapResult<T> {
        self.require_with(id, T::decode_aper)
    }

    /// Decode an optional IE
    pub fn optional<T: AperDecode>(&self, id: ProtocolIeId) -> NgapResult<Option<T>> {
        self.optional_with(id, T::decode_aper)
    }

    pub fn require_with<T>(
        &self,
        id: ProtocolIeId,
        decode: impl FnOnce(&mut AperDecoder) -> PerResult<T>,
    ) -> NgapResult<T> {
        let (_, ie) = self.spec.entry(id)?;
        self.optional_with(id, decode)?
            .ok_or(NgapError::MissingMandatoryIe {
                ie_name: ie.name,
                ie_id: ie.id.0,
            })
    }

    /// Decode an IE if present. A decode failure aborts on `reject` and
    /// leaves the IE absent otherwise.
    pub fn optional_with<T>(
        &self,
        id: ProtocolIeId,
        decode: impl FnOnce(&mut AperDecoder) -> PerResult<T>,
    ) -> NgapResult<Option<T>> {
        let (index, ie) = self.spec.entry(id)?;
        let Some(field) = self.fields[index] else {
            return Ok(None);
        };

        match decode_with(&field.value, decode) {
            Ok(value) => Ok(Some(value)),
            Err(source) if ie.criticality == Criticality::Reject => {
                Err(NgapError::CriticalityViolation {
                    ie_name: ie.name,
                    ie_id: ie.id.0,
                    criticality: ie.criticality,
                    source,
                })
            }
            Err(source) => {
                log::warn!(
                    "{}: ignoring undecodable IE {} (id={}): {}",
                    self.spec.name,
                    ie.name,
                    ie.id,
                    source
                );
                Ok(None)
            }
        }
    }
}

// ============================================================================
// Writer
// ============================================================================

/// Builds a container in table terms: criticality comes from the table, ids
/// outside it are refused, and mandatory IEs are checked on `finish`
pub struct IeWriter {
    spec: &'static MessageSpec,
    present: Vec<bool>,
    container: ProtocolIeContainer,
}

impl IeWriter {
    pub fn new(spec: &'static MessageSpec) -> Self {
        Self {
            spec,
            present: vec![false; spec.ies.len()],
            container: ProtocolIeContainer::new(),
        }
    }

    pub fn put<T: AperEncode>(&mut self, id: ProtocolIeId, value: &T) -> NgapResult<()> {
        self.put_with(id, |encoder| value.encode_aper(encoder))
    }

    pub fn put_opt<T: AperEncode>(&mut self, id: ProtocolIeId, value: Option<&T>) -> NgapResult<()> {
        match value {
            Some(value) => self.put(id, value),
            None => {
                self.spec.entry(id)?;
                Ok(())
            }
        }
    }

    pub fn put_with(
        &mut self,
        id: ProtocolIeId,
        encode: impl FnOnce(&mut AperEncoder) -> PerResult<()>,
    ) -> NgapResult<()> {
        let (index, ie) = self.spec.entry(id)?;
        if self.present[index] {
            return Err(NgapError::DuplicateIe {
                ie_name: ie.name,
                ie_id: ie.id.0,
            });
        }

        let mut encoder = AperEncoder::new();
        encode(&mut encoder)?;
        self.container.push(ProtocolIeField {
            id,
            criticality: ie.criticality,
            value: encoder.into_bytes().to_vec(),
        });
        self.present[index] = true;
        Ok(())
    }

    pub fn finish(self) -> NgapResult<ProtocolIeContainer> {
        for (ie, present) in self.spec.ies.iter().zip(&self.present) {
            if ie.presence == Presence::Mandatory && !present {
                return Err(NgapError::MissingMandatoryIe {
                    ie_name: ie.name,
                    ie_id: ie.id.0,
                });
            }
        }
        Ok(self.container)
    }
}
