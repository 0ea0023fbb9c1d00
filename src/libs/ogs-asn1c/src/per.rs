//! PER (Packed Encoding Rules) encoding/decoding
//!
//! Aligned PER (APER, ITU-T X.691) as carried on the NG interface. Every read
//! is bounds-checked before it touches the buffer; running past the end is a
//! `Truncated` error, never a panic.

use bitvec::prelude::*;
use bytes::Bytes;
use thiserror::Error;

/// PER codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PerError {
    #[error("Truncated: need {needed} bits, have {available}")]
    Truncated { needed: usize, available: usize },
    #[error("Malformed length: {length}")]
    MalformedLength { length: usize },
    #[error("Constraint violation: value {value} not in range {min}..={max}")]
    ConstraintViolation { value: i64, min: i64, max: i64 },
    #[error("Unknown choice index {index} ({alternatives} root alternatives)")]
    UnknownChoice { index: usize, alternatives: usize },
    #[error("Invalid value for {what}: {reason}")]
    InvalidValue { what: &'static str, reason: String },
    #[error("Unsupported extension in {0}")]
    UnsupportedExtension(&'static str),
}

pub type PerResult<T> = Result<T, PerError>;

/// Lengths at or above this value need X.691 fragmentation, which NGAP
/// messages never use.
pub const FRAGMENT_THRESHOLD: usize = 16384;

/// Constraint definition for constrained integers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    pub min: i64,
    pub max: i64,
    pub extensible: bool,
}

impl Constraint {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max, extensible: false }
    }

    pub const fn extensible(min: i64, max: i64) -> Self {
        Self { min, max, extensible: true }
    }

    /// Number of values in the root range
    pub fn range(&self) -> u64 {
        if self.max >= self.min {
            (self.max - self.min) as u64 + 1
        } else {
            0
        }
    }

    /// Bits needed to hold any offset in the range
    pub fn bits_needed(&self) -> usize {
        let range = self.range();
        if range <= 1 {
            0
        } else {
            64 - (range - 1).leading_zeros() as usize
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }

    fn check(&self, value: i64) -> PerResult<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(PerError::ConstraintViolation {
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Minimum number of octets holding `value` (at least one)
fn octets_needed(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(8).max(1)
}

fn is_printable(c: u8) -> bool {
    c.is_ascii_alphanumeric() || b" '()+,-./:=?".contains(&c)
}

/// APER (Aligned PER) Encoder
pub struct AperEncoder {
    buffer: BitVec<u8, Msb0>,
}

impl AperEncoder {
    pub fn new() -> Self {
        Self {
            buffer: BitVec::new(),
        }
    }

    /// Pad to an octet boundary and hand out the encoded octets
    pub fn into_bytes(mut self) -> Bytes {
        self.align();
        Bytes::from(self.buffer.into_vec())
    }

    pub fn bit_len(&self) -> usize {
        self.buffer.len()
    }

    /// Align to octet boundary
    pub fn align(&mut self) {
        let remainder = self.buffer.len() % 8;
        if remainder != 0 {
            let padding = 8 - remainder;
            self.buffer.resize(self.buffer.len() + padding, false);
        }
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.buffer.push(bit);
    }

    /// Write the low `num_bits` of `value`, MSB first
    pub fn write_bits(&mut self, value: u64, num_bits: usize) {
        for i in (0..num_bits).rev() {
            self.buffer.push((value >> i) & 1 == 1);
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.write_bits(*byte as u64, 8);
        }
    }

    /// Encode constrained whole number (X.691 10.5)
    pub fn encode_constrained_whole_number(
        &mut self,
        value: i64,
        constraint: &Constraint,
    ) -> PerResult<()> {
        constraint.check(value)?;

        let range = constraint.range();
        let offset = (value - constraint.min) as u64;

        if range == 1 {
            return Ok(());
        }

        if range <= 255 {
            self.write_bits(offset, constraint.bits_needed());
        } else if range == 256 {
            self.align();
            self.write_bits(offset, 8);
        } else if range <= 65536 {
            self.align();
            self.write_bits(offset, 16);
        } else {
            // Indefinite-length case: octet count as a small constrained
            // number, then the minimum number of octets
            let max_octets = octets_needed(range - 1);
            let octets = octets_needed(offset);
            let len_constraint = Constraint::new(1, max_octets as i64);
            self.encode_constrained_whole_number(octets as i64, &len_constraint)?;
            self.align();
            self.write_bits(offset, octets * 8);
        }

        Ok(())
    }

    /// Encode an INTEGER, honouring an extension marker on its constraint
    pub fn encode_integer(&mut self, value: i64, constraint: &Constraint) -> PerResult<()> {
        if constraint.extensible {
            let in_root = constraint.contains(value);
            self.write_bit(!in_root);
            if !in_root {
                return self.encode_unconstrained_whole_number(value);
            }
        }
        self.encode_constrained_whole_number(value, constraint)
    }

    /// Encode unconstrained whole number (X.691 10.8), two's complement
    pub fn encode_unconstrained_whole_number(&mut self, value: i64) -> PerResult<()> {
        let mut octets = value.to_be_bytes().to_vec();
        while octets.len() > 1 {
            let redundant = (octets[0] == 0x00 && octets[1] & 0x80 == 0)
                || (octets[0] == 0xff && octets[1] & 0x80 != 0);
            if !redundant {
                break;
            }
            octets.remove(0);
        }

        self.encode_length_determinant(octets.len())?;
        self.write_bytes(&octets);
        Ok(())
    }

    /// Encode length determinant (X.691 10.9)
    pub fn encode_length_determinant(&mut self, length: usize) -> PerResult<()> {
        self.align();
        if length <= 127 {
            self.write_bits(length as u64, 8);
        } else if length < FRAGMENT_THRESHOLD {
            self.write_bits(0x8000 | length as u64, 16);
        } else {
            return Err(PerError::MalformedLength { length });
        }
        Ok(())
    }

    /// Encode a length bounded by a SIZE constraint
    pub fn encode_constrained_length(
        &mut self,
        length: usize,
        min: usize,
        max: usize,
    ) -> PerResult<()> {
        let constraint = Constraint::new(min as i64, max as i64);
        constraint.check(length as i64)?;
        if max < 65536 {
            self.encode_constrained_whole_number(length as i64, &constraint)
        } else {
            self.encode_length_determinant(length)
        }
    }

    /// Encode ENUMERATED (X.691 13)
    pub fn encode_enumerated(&mut self, value: i64, constraint: &Constraint) -> PerResult<()> {
        if constraint.extensible {
            let in_root = constraint.contains(value);
            self.write_bit(!in_root);
            if in_root {
                self.encode_constrained_whole_number(value, constraint)?;
            } else {
                let index = value - constraint.max - 1;
                if index < 0 {
                    return Err(PerError::ConstraintViolation {
                        value,
                        min: constraint.min,
                        max: constraint.max,
                    });
                }
                self.encode_normally_small_non_negative(index as u64)?;
            }
        } else {
            self.encode_constrained_whole_number(value, constraint)?;
        }
        Ok(())
    }

    /// Encode normally small non-negative whole number (X.691 10.6)
    pub fn encode_normally_small_non_negative(&mut self, value: u64) -> PerResult<()> {
        if value <= 63 {
            self.write_bit(false);
            self.write_bits(value, 6);
        } else {
            self.write_bit(true);
            self.encode_unconstrained_whole_number(value as i64)?;
        }
        Ok(())
    }

    /// Encode CHOICE index (X.691 23)
    pub fn encode_choice_index(
        &mut self,
        index: usize,
        num_alternatives: usize,
        extensible: bool,
    ) -> PerResult<()> {
        let in_root = index < num_alternatives;
        if extensible {
            self.write_bit(!in_root);
            if !in_root {
                return self.encode_normally_small_non_negative((index - num_alternatives) as u64);
            }
        } else if !in_root {
            return Err(PerError::UnknownChoice {
                index,
                alternatives: num_alternatives,
            });
        }
        let constraint = Constraint::new(0, num_alternatives as i64 - 1);
        self.encode_constrained_whole_number(index as i64, &constraint)
    }

    /// Write the preamble of a SEQUENCE: extension bit (when the type has an
    /// extension marker) followed by one presence bit per OPTIONAL component
    pub fn encode_sequence_preamble(&mut self, extensible: bool, present: &[bool]) {
        if extensible {
            self.write_bit(false);
        }
        for bit in present {
            self.write_bit(*bit);
        }
    }

    /// Encode OCTET STRING (X.691 16)
    pub fn encode_octet_string(
        &mut self,
        data: &[u8],
        min_len: Option<usize>,
        max_len: Option<usize>,
    ) -> PerResult<()> {
        let len = data.len();

        match (min_len, max_len) {
            (Some(min), Some(max)) if min == max => {
                if len != min {
                    return Err(PerError::MalformedLength { length: len });
                }
                if min > 2 {
                    self.align();
                }
            }
            (Some(min), Some(max)) => {
                self.encode_constrained_length(len, min, max)?;
                self.align();
            }
            _ => {
                self.encode_length_determinant(len)?;
            }
        }
        self.write_bytes(data);
        Ok(())
    }

    /// Encode BIT STRING (X.691 15)
    pub fn encode_bit_string(
        &mut self,
        bits: &BitSlice<u8, Msb0>,
        min_len: Option<usize>,
        max_len: Option<usize>,
    ) -> PerResult<()> {
        let len = bits.len();

        match (min_len, max_len) {
            (Some(min), Some(max)) if min == max => {
                if len != min {
                    return Err(PerError::MalformedLength { length: len });
                }
                if min > 16 {
                    self.align();
                }
            }
            (Some(min), Some(max)) => {
                self.encode_constrained_length(len, min, max)?;
                if max > 16 {
                    self.align();
                }
            }
            _ => {
                self.encode_length_determinant(len)?;
            }
        }
        self.buffer.extend_from_bitslice(bits);
        Ok(())
    }

    /// Encode a fixed-size BIT STRING held in an integer
    pub fn encode_fixed_bits(&mut self, value: u64, num_bits: usize) -> PerResult<()> {
        if num_bits < 64 && value >> num_bits != 0 {
            return Err(PerError::ConstraintViolation {
                value: value as i64,
                min: 0,
                max: ((1u64 << num_bits) - 1) as i64,
            });
        }
        if num_bits > 16 {
            self.align();
        }
        self.write_bits(value, num_bits);
        Ok(())
    }

    /// Encode a variable-size BIT STRING (SIZE(min..max)) held in an integer
    pub fn encode_sized_bits(
        &mut self,
        value: u64,
        num_bits: usize,
        min: usize,
        max: usize,
    ) -> PerResult<()> {
        self.encode_constrained_length(num_bits, min, max)?;
        if max > 16 {
            self.align();
        }
        if num_bits < 64 && value >> num_bits != 0 {
            return Err(PerError::ConstraintViolation {
                value: value as i64,
                min: 0,
                max: ((1u64 << num_bits) - 1) as i64,
            });
        }
        self.write_bits(value, num_bits);
        Ok(())
    }

    /// Encode PrintableString (SIZE(min..max[, ...]))
    pub fn encode_printable_string(
        &mut self,
        value: &str,
        min: usize,
        max: usize,
        extensible: bool,
    ) -> PerResult<()> {
        let bytes = value.as_bytes();
        if let Some(bad) = bytes.iter().find(|c| !is_printable(**c)) {
            return Err(PerError::InvalidValue {
                what: "PrintableString",
                reason: format!("character 0x{bad:02x} outside the PrintableString alphabet"),
            });
        }
        let in_root = bytes.len() >= min && bytes.len() <= max;
        if extensible {
            self.write_bit(!in_root);
            if !in_root {
                self.encode_length_determinant(bytes.len())?;
                self.write_bytes(bytes);
                return Ok(());
            }
        }
        self.encode_constrained_length(bytes.len(), min, max)?;
        if max * 8 > 16 {
            self.align();
        }
        self.write_bytes(bytes);
        Ok(())
    }

    /// Encode an open type: length determinant followed by the octets of a
    /// separately encoded value
    pub fn encode_open_type(&mut self, value: &[u8]) -> PerResult<()> {
        self.encode_length_determinant(value.len())?;
        self.write_bytes(value);
        Ok(())
    }
}

impl Default for AperEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// APER (Aligned PER) Decoder
pub struct AperDecoder<'a> {
    data: &'a BitSlice<u8, Msb0>,
    position: usize,
}

impl<'a> AperDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data: BitSlice::from_slice(data),
            position: 0,
        }
    }

    pub fn bit_position(&self) -> usize {
        self.position
    }

    pub fn remaining_bits(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Align to octet boundary
    pub fn align(&mut self) {
        let remainder = self.position % 8;
        if remainder != 0 {
            self.position += 8 - remainder;
        }
    }

    fn ensure(&self, bits: usize) -> PerResult<()> {
        let available = self.remaining_bits();
        if bits > available {
            return Err(PerError::Truncated {
                needed: bits,
                available,
            });
        }
        Ok(())
    }

    pub fn read_bit(&mut self) -> PerResult<bool> {
        self.ensure(1)?;
        let bit = self.data[self.position];
        self.position += 1;
        Ok(bit)
    }

    /// Read up to 64 bits as a value (MSB first)
    pub fn read_bits(&mut self, num_bits: usize) -> PerResult<u64> {
        if num_bits > 64 {
            return Err(PerError::MalformedLength { length: num_bits });
        }
        self.ensure(num_bits)?;
        let mut value: u64 = 0;
        for bit in &self.data[self.position..self.position + num_bits] {
            value = (value << 1) | (*bit as u64);
        }
        self.position += num_bits;
        Ok(value)
    }

    pub fn read_bytes(&mut self, num_bytes: usize) -> PerResult<Vec<u8>> {
        self.ensure(num_bytes.saturating_mul(8))?;
        let mut bytes = Vec::with_capacity(num_bytes);
        for _ in 0..num_bytes {
            bytes.push(self.read_bits(8)? as u8);
        }
        Ok(bytes)
    }

    pub fn skip_bytes(&mut self, num_bytes: usize) -> PerResult<()> {
        self.ensure(num_bytes.saturating_mul(8))?;
        self.position += num_bytes * 8;
        Ok(())
    }

    /// Decode constrained whole number (X.691 10.5)
    pub fn decode_constrained_whole_number(&mut self, constraint: &Constraint) -> PerResult<i64> {
        let range = constraint.range();

        if range == 1 {
            return Ok(constraint.min);
        }

        let offset = if range <= 255 {
            self.read_bits(constraint.bits_needed())?
        } else if range == 256 {
            self.align();
            self.read_bits(8)?
        } else if range <= 65536 {
            self.align();
            self.read_bits(16)?
        } else {
            let max_octets = octets_needed(range - 1);
            let len_constraint = Constraint::new(1, max_octets as i64);
            let octets = self.decode_constrained_whole_number(&len_constraint)? as usize;
            self.align();
            self.read_bits(octets * 8)?
        };

        let value = constraint.min.saturating_add(offset as i64);
        if offset >= range || !constraint.contains(value) {
            return Err(PerError::ConstraintViolation {
                value,
                min: constraint.min,
                max: constraint.max,
            });
        }
        Ok(value)
    }

    /// Decode an INTEGER, honouring an extension marker on its constraint
    pub fn decode_integer(&mut self, constraint: &Constraint) -> PerResult<i64> {
        if constraint.extensible && self.read_bit()? {
            return self.decode_unconstrained_whole_number();
        }
        self.decode_constrained_whole_number(constraint)
    }

    /// Decode unconstrained whole number (X.691 10.8)
    pub fn decode_unconstrained_whole_number(&mut self) -> PerResult<i64> {
        let len = self.decode_length_determinant()?;
        if len == 0 || len > 8 {
            return Err(PerError::MalformedLength { length: len });
        }
        let bytes = self.read_bytes(len)?;

        let negative = bytes[0] & 0x80 != 0;
        let mut value: i64 = if negative { -1 } else { 0 };
        for byte in bytes {
            value = (value << 8) | (byte as i64);
        }
        Ok(value)
    }

    /// Decode length determinant (X.691 10.9)
    pub fn decode_length_determinant(&mut self) -> PerResult<usize> {
        self.align();
        let first_byte = self.read_bits(8)? as u8;

        if first_byte & 0x80 == 0 {
            Ok(first_byte as usize)
        } else if first_byte & 0x40 == 0 {
            let second_byte = self.read_bits(8)? as u8;
            Ok((((first_byte & 0x3F) as usize) << 8) | (second_byte as usize))
        } else {
            // 11xxxxxx: fragmented form
            Err(PerError::MalformedLength {
                length: ((first_byte & 0x3F) as usize) * FRAGMENT_THRESHOLD,
            })
        }
    }

    /// Decode a length bounded by a SIZE constraint
    pub fn decode_constrained_length(&mut self, min: usize, max: usize) -> PerResult<usize> {
        let constraint = Constraint::new(min as i64, max as i64);
        let length = if max < 65536 {
            self.decode_constrained_whole_number(&constraint)? as usize
        } else {
            self.decode_length_determinant()?
        };
        if length < min || length > max {
            return Err(PerError::MalformedLength { length });
        }
        Ok(length)
    }

    /// Decode ENUMERATED (X.691 13). Extension values come back numbered
    /// after the root, i.e. starting at `constraint.max + 1`.
    pub fn decode_enumerated(&mut self, constraint: &Constraint) -> PerResult<i64> {
        if constraint.extensible && self.read_bit()? {
            let index = self.decode_normally_small_non_negative()?;
            return Ok(constraint.max + 1 + index as i64);
        }
        self.decode_constrained_whole_number(constraint)
    }

    /// Decode normally small non-negative whole number (X.691 10.6)
    pub fn decode_normally_small_non_negative(&mut self) -> PerResult<u64> {
        let large = self.read_bit()?;
        if !large {
            self.read_bits(6)
        } else {
            let value = self.decode_unconstrained_whole_number()?;
            if value < 0 {
                return Err(PerError::ConstraintViolation {
                    value,
                    min: 0,
                    max: i64::MAX,
                });
            }
            Ok(value as u64)
        }
    }

    /// Decode CHOICE index (X.691 23). An index at or beyond
    /// `num_alternatives` means an extension alternative.
    pub fn decode_choice_index(
        &mut self,
        num_alternatives: usize,
        extensible: bool,
    ) -> PerResult<usize> {
        if extensible && self.read_bit()? {
            let ext_index = self.decode_normally_small_non_negative()?;
            return Ok(num_alternatives + ext_index as usize);
        }
        let constraint = Constraint::new(0, num_alternatives as i64 - 1);
        self.decode_constrained_whole_number(&constraint)
            .map(|v| v as usize)
    }

    /// Read a SEQUENCE preamble. Returns the extension bit and one presence
    /// flag per OPTIONAL component.
    pub fn decode_sequence_preamble(
        &mut self,
        extensible: bool,
        optional_count: usize,
    ) -> PerResult<(bool, Vec<bool>)> {
        let extended = if extensible { self.read_bit()? } else { false };
        let mut present = Vec::with_capacity(optional_count);
        for _ in 0..optional_count {
            present.push(self.read_bit()?);
        }
        Ok((extended, present))
    }

    /// Skip the extension additions of a SEQUENCE whose extension bit was set
    pub fn skip_extension_additions(&mut self) -> PerResult<()> {
        let count = self.decode_normally_small_non_negative()? as usize + 1;
        let mut present = Vec::with_capacity(count);
        for _ in 0..count {
            present.push(self.read_bit()?);
        }
        for is_present in present {
            if is_present {
                self.skip_open_type()?;
            }
        }
        Ok(())
    }

    /// Decode OCTET STRING (X.691 16)
    pub fn decode_octet_string(
        &mut self,
        min_len: Option<usize>,
        max_len: Option<usize>,
    ) -> PerResult<Vec<u8>> {
        let len = match (min_len, max_len) {
            (Some(min), Some(max)) if min == max => {
                if min > 2 {
                    self.align();
                }
                min
            }
            (Some(min), Some(max)) => {
                let len = self.decode_constrained_length(min, max)?;
                self.align();
                len
            }
            _ => self.decode_length_determinant()?,
        };

        self.read_bytes(len)
    }

    /// Decode BIT STRING (X.691 15)
    pub fn decode_bit_string(
        &mut self,
        min_len: Option<usize>,
        max_len: Option<usize>,
    ) -> PerResult<BitVec<u8, Msb0>> {
        let len = match (min_len, max_len) {
            (Some(min), Some(max)) if min == max => {
                if min > 16 {
                    self.align();
                }
                min
            }
            (Some(min), Some(max)) => {
                let len = self.decode_constrained_length(min, max)?;
                if max > 16 {
                    self.align();
                }
                len
            }
            _ => self.decode_length_determinant()?,
        };

        self.ensure(len)?;
        let bits = self.data[self.position..self.position + len].to_bitvec();
        self.position += len;
        Ok(bits)
    }

    /// Decode a fixed-size BIT STRING into an integer
    pub fn decode_fixed_bits(&mut self, num_bits: usize) -> PerResult<u64> {
        if num_bits > 16 {
            self.align();
        }
        self.read_bits(num_bits)
    }

    /// Decode a variable-size BIT STRING (SIZE(min..max)) into `(value, bits)`
    pub fn decode_sized_bits(&mut self, min: usize, max: usize) -> PerResult<(u64, usize)> {
        let len = self.decode_constrained_length(min, max)?;
        if max > 16 {
            self.align();
        }
        Ok((self.read_bits(len)?, len))
    }

    /// Decode PrintableString (SIZE(min..max[, ...]))
    pub fn decode_printable_string(
        &mut self,
        min: usize,
        max: usize,
        extensible: bool,
    ) -> PerResult<String> {
        let bytes = if extensible && self.read_bit()? {
            let len = self.decode_length_determinant()?;
            self.read_bytes(len)?
        } else {
            let len = self.decode_constrained_length(min, max)?;
            if max * 8 > 16 {
                self.align();
            }
            self.read_bytes(len)?
        };
        if let Some(bad) = bytes.iter().find(|c| !is_printable(**c)) {
            return Err(PerError::InvalidValue {
                what: "PrintableString",
                reason: format!("character 0x{bad:02x} outside the PrintableString alphabet"),
            });
        }
        // Printable characters are all ASCII
        Ok(bytes.into_iter().map(char::from).collect())
    }

    /// Decode an open type and return its octets
    pub fn decode_open_type(&mut self) -> PerResult<Vec<u8>> {
        let len = self.decode_length_determinant()?;
        self.read_bytes(len)
    }

    pub fn skip_open_type(&mut self) -> PerResult<()> {
        let len = self.decode_length_determinant()?;
        self.skip_bytes(len)
    }
}

/// Trait for types that can be encoded with APER
pub trait AperEncode {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()>;
}

/// Trait for types that can be decoded with APER
pub trait AperDecode: Sized {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_bits_needed() {
        assert_eq!(Constraint::new(0, 0).bits_needed(), 0);
        assert_eq!(Constraint::new(0, 1).bits_needed(), 1);
        assert_eq!(Constraint::new(0, 2).bits_needed(), 2);
        assert_eq!(Constraint::new(0, 7).bits_needed(), 3);
        assert_eq!(Constraint::new(1, 8).bits_needed(), 3);
        assert_eq!(Constraint::new(0, 255).bits_needed(), 8);
    }

    #[test]
    fn test_constrained_roundtrip() {
        let constraint = Constraint::new(0, 2);

        for value in 0..=2 {
            let mut encoder = AperEncoder::new();
            encoder.encode_constrained_whole_number(value, &constraint).unwrap();
            let bytes = encoder.into_bytes();

            let mut decoder = AperDecoder::new(&bytes);
            assert_eq!(decoder.decode_constrained_whole_number(&constraint).unwrap(), value);
        }
    }

    #[test]
    fn test_constraint_violation_on_encode() {
        let mut encoder = AperEncoder::new();
        let err = encoder
            .encode_constrained_whole_number(9, &Constraint::new(0, 7))
            .unwrap_err();
        assert_eq!(err, PerError::ConstraintViolation { value: 9, min: 0, max: 7 });
    }

    #[test]
    fn test_indefinite_length_integer() {
        // AMF-UE-NGAP-ID style: 0..2^40-1 takes a 3-bit octet count
        let constraint = Constraint::new(0, (1 << 40) - 1);

        let mut encoder = AperEncoder::new();
        encoder.encode_constrained_whole_number(1, &constraint).unwrap();
        assert_eq!(encoder.into_bytes().as_ref(), &[0x00, 0x01]);

        let mut encoder = AperEncoder::new();
        encoder.encode_constrained_whole_number(0x0102_0304_05, &constraint).unwrap();
        let bytes = encoder.into_bytes();
        assert_eq!(bytes.as_ref(), &[0x80, 0x01, 0x02, 0x03, 0x04, 0x05]);

        let mut decoder = AperDecoder::new(&bytes);
        assert_eq!(
            decoder.decode_constrained_whole_number(&constraint).unwrap(),
            0x0102_0304_05
        );
    }

    #[test]
    fn test_extensible_integer() {
        let constraint = Constraint::extensible(0, 4_000_000_000_000);
        for value in [0i64, 1, 1_000_000_000, 4_000_000_000_000] {
            let mut encoder = AperEncoder::new();
            encoder.encode_integer(value, &constraint).unwrap();
            let bytes = encoder.into_bytes();
            let mut decoder = AperDecoder::new(&bytes);
            assert_eq!(decoder.decode_integer(&constraint).unwrap(), value);
        }
    }

    #[test]
    fn test_length_roundtrip() {
        for len in [0, 1, 127, 128, 255, 1000, 16383] {
            let mut encoder = AperEncoder::new();
            encoder.encode_length_determinant(len).unwrap();

            let bytes = encoder.into_bytes();
            let mut decoder = AperDecoder::new(&bytes);
            assert_eq!(decoder.decode_length_determinant().unwrap(), len);
        }
    }

    #[test]
    fn test_fragmented_length_rejected() {
        let mut encoder = AperEncoder::new();
        assert!(matches!(
            encoder.encode_length_determinant(FRAGMENT_THRESHOLD),
            Err(PerError::MalformedLength { .. })
        ));

        let mut decoder = AperDecoder::new(&[0xC1, 0x00]);
        assert!(matches!(
            decoder.decode_length_determinant(),
            Err(PerError::MalformedLength { .. })
        ));
    }

    #[test]
    fn test_octet_string_roundtrip() {
        let data = vec![0x01, 0x02, 0x03, 0x04];

        let mut encoder = AperEncoder::new();
        encoder.encode_octet_string(&data, None, None).unwrap();

        let bytes = encoder.into_bytes();
        let mut decoder = AperDecoder::new(&bytes);
        assert_eq!(decoder.decode_octet_string(None, None).unwrap(), data);
    }

    #[test]
    fn test_truncated_read() {
        // Length says 5 octets, only 2 follow
        let mut decoder = AperDecoder::new(&[0x05, 0xAA, 0xBB]);
        let err = decoder.decode_octet_string(None, None).unwrap_err();
        assert_eq!(err, PerError::Truncated { needed: 40, available: 16 });
    }

    #[test]
    fn test_printable_string() {
        let mut encoder = AperEncoder::new();
        encoder.encode_printable_string("amf.open5gs", 1, 150, true).unwrap();
        let bytes = encoder.into_bytes();
        let mut decoder = AperDecoder::new(&bytes);
        assert_eq!(decoder.decode_printable_string(1, 150, true).unwrap(), "amf.open5gs");

        let mut encoder = AperEncoder::new();
        assert!(matches!(
            encoder.encode_printable_string("amf_1", 1, 150, true),
            Err(PerError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_skip_extension_additions() {
        // Two additions, the second present with a 2-octet open type
        let mut encoder = AperEncoder::new();
        encoder.encode_normally_small_non_negative(1).unwrap();
        encoder.write_bit(false);
        encoder.write_bit(true);
        encoder.encode_open_type(&[0xDE, 0xAD]).unwrap();
        encoder.write_bits(0x5A, 8);
        let bytes = encoder.into_bytes();

        let mut decoder = AperDecoder::new(&bytes);
        decoder.skip_extension_additions().unwrap();
        assert_eq!(decoder.read_bits(8).unwrap(), 0x5A);
    }
}
