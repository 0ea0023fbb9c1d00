//! NAS-style type-length-value IEs
//!
//! Some NAS IEs reach the AMF core as raw TLVs and are mapped onto NGAP IEs.
//! A TLV carries an IEI octet when the field is optional in its message.
//! The length octet counts the value only, so it is the total length minus
//! two with an IEI and minus one without.

use bytes::{Buf, BufMut, BytesMut};
use ogs_asn1c::per::{PerError, PerResult};

use super::handover::UeSecurityCapabilities;

/// Value part of a NAS TLV
pub trait NasValue: Sized {
    const IEI: u8;
    const NAME: &'static str;
    /// Bounds on the value length
    const MIN_LEN: usize;
    const MAX_LEN: usize;

    fn put_value(&self, buf: &mut BytesMut);
    fn parse_value(value: &[u8]) -> PerResult<Self>;
}

/// Length octet for a TLV whose encoding is `total` octets long
fn length_octet(total: usize, with_iei: bool) -> usize {
    if with_iei {
        total - 2
    } else {
        total - 1
    }
}

pub fn encode_tlv<T: NasValue>(value: &T, with_iei: bool) -> PerResult<Vec<u8>> {
    let mut body = BytesMut::new();
    value.put_value(&mut body);
    if body.len() < T::MIN_LEN || body.len() > T::MAX_LEN {
        return Err(PerError::MalformedLength { length: body.len() });
    }

    let header = if with_iei { 2 } else { 1 };
    let total = header + body.len();
    let mut buf = BytesMut::with_capacity(total);
    if with_iei {
        buf.put_u8(T::IEI);
    }
    buf.put_u8(length_octet(total, with_iei) as u8);
    buf.put_slice(&body);
    Ok(buf.to_vec())
}

/// Decode a TLV. With `optional` set the IEI octet is read and checked first.
pub fn decode_tlv<T: NasValue>(wire: &[u8], optional: bool) -> PerResult<T> {
    let mut buf = wire;
    if optional {
        if !buf.has_remaining() {
            return Err(PerError::Truncated { needed: 8, available: 0 });
        }
        let iei = buf.get_u8();
        if iei != T::IEI {
            return Err(PerError::InvalidValue {
                what: T::NAME,
                reason: format!("IEI 0x{iei:02x}, expected 0x{:02x}", T::IEI),
            });
        }
    }
    if !buf.has_remaining() {
        return Err(PerError::Truncated { needed: 8, available: 0 });
    }
    let length = buf.get_u8() as usize;
    if length < T::MIN_LEN || length > T::MAX_LEN {
        return Err(PerError::MalformedLength { length });
    }
    if buf.remaining() < length {
        return Err(PerError::Truncated {
            needed: length * 8,
            available: buf.remaining() * 8,
        });
    }
    if buf.remaining() > length {
        return Err(PerError::MalformedLength { length: wire.len() });
    }
    T::parse_value(&buf[..length])
}

/// 5GS UE security capability: 5G-EA, 5G-IA, then optional EEA and EIA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UeSecurityCapability {
    pub nr_ea: u8,
    pub nr_ia: u8,
    pub eutra_ea: Option<u8>,
    pub eutra_ia: Option<u8>,
}

impl NasValue for UeSecurityCapability {
    const IEI: u8 = 0x2E;
    const NAME: &'static str = "UE security capability";
    const MIN_LEN: usize = 2;
    const MAX_LEN: usize = 8;

    fn put_value(&self, buf: &mut BytesMut) {
        buf.put_u8(self.nr_ea);
        buf.put_u8(self.nr_ia);
        if self.eutra_ea.is_some() || self.eutra_ia.is_some() {
            buf.put_u8(self.eutra_ea.unwrap_or(0));
            buf.put_u8(self.eutra_ia.unwrap_or(0));
        }
    }

    fn parse_value(value: &[u8]) -> PerResult<Self> {
        let mut buf = value;
        let nr_ea = buf.get_u8();
        let nr_ia = buf.get_u8();
        let eutra_ea = buf.has_remaining().then(|| buf.get_u8());
        let eutra_ia = buf.has_remaining().then(|| buf.get_u8());
        Ok(UeSecurityCapability {
            nr_ea,
            nr_ia,
            eutra_ea,
            eutra_ia,
        })
    }
}

impl UeSecurityCapability {
    /// NGAP bitmaps carry algorithms 1..3 in the top bits of 16; the NAS
    /// octet has algorithm 0 in its MSB. Without an E-UTRA part the NR sets
    /// are reused.
    pub fn to_ngap(&self) -> UeSecurityCapabilities {
        let map = |octet: u8| ((octet & 0x70) as u16) << 9;
        UeSecurityCapabilities {
            nr_encryption: map(self.nr_ea),
            nr_integrity: map(self.nr_ia),
            eutra_encryption: map(self.eutra_ea.unwrap_or(self.nr_ea)),
            eutra_integrity: map(self.eutra_ia.unwrap_or(self.nr_ia)),
        }
    }
}

/// S1 UE network capability: EEA and EIA octets; the rest is carried as is
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UeNetworkCapability {
    pub eea: u8,
    pub eia: u8,
    pub rest: Vec<u8>,
}

impl NasValue for UeNetworkCapability {
    const IEI: u8 = 0x17;
    const NAME: &'static str = "UE network capability";
    const MIN_LEN: usize = 2;
    const MAX_LEN: usize = 13;

    fn put_value(&self, buf: &mut BytesMut) {
        buf.put_u8(self.eea);
        buf.put_u8(self.eia);
        buf.put_slice(&self.rest);
    }

    fn parse_value(value: &[u8]) -> PerResult<Self> {
        let mut buf = value;
        let eea = buf.get_u8();
        let eia = buf.get_u8();
        Ok(UeNetworkCapability {
            eea,
            eia,
            rest: buf.to_vec(),
        })
    }
}
