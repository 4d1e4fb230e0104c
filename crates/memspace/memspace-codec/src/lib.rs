#![forbid(unsafe_code)]
//! A portable field encoding for tuple payloads.
//!
//! `memspace-core` treats a tuple's payload as an opaque byte string — it
//! neither inspects nor defines its format. This crate supplies one concrete,
//! documented encoding that callers (the bundled façade, the test suite, or
//! any other codec-agnostic client) may opt into so that tuples posted by one
//! process are readable by another without an out-of-band agreement.
//!
//! # Wire format
//!
//! A [`Tuple`] is a sequence of [`Field`]s, each encoded as a 1-byte tag
//! followed by its payload:
//!
//! | Tag | Field | Payload |
//! |---|---|---|
//! | `0x01` | `Int(i64)` | 8 bytes, little-endian |
//! | `0x02` | `Bytes(Vec<u8>)` | 4-byte LE length prefix, then that many bytes |
//!
//! [`Field::Wildcard`] only ever appears in a [`Template`], never in an
//! encoded [`Tuple`]; attempting to encode one is a [`CodecError`].

use thiserror::Error;

const TAG_INT: u8 = 0x01;
const TAG_BYTES: u8 = 0x02;

/// One positional field of a tuple or a template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field {
    /// Matches any value in this position. Valid only inside a [`Template`].
    Wildcard,
    /// A signed 64-bit integer.
    Int(i64),
    /// An opaque byte string.
    Bytes(Vec<u8>),
}

/// A concrete, fully-specified tuple — no wildcards.
pub type Tuple = Vec<Field>;

/// A query template — may mix concrete fields and wildcards.
pub type Template = Vec<Field>;

/// Failures decoding or encoding a tuple's wire payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("wildcard field cannot appear in an encoded tuple")]
    WildcardInTuple,

    #[error("truncated payload: expected at least {needed} more bytes, found {available}")]
    Truncated { needed: usize, available: usize },

    #[error("unknown field tag {0:#x}")]
    UnknownTag(u8),

    #[error("tuple has {0} fields, arity is limited to 255")]
    ArityOverflow(usize),
}

/// Encodes a tuple into its wire representation.
///
/// Returns [`CodecError::WildcardInTuple`] if any field is a
/// [`Field::Wildcard`] — wildcards are a template-only concept.
pub fn encode(tuple: &[Field]) -> Result<Vec<u8>, CodecError> {
    if tuple.len() > 255 {
        return Err(CodecError::ArityOverflow(tuple.len()));
    }
    let mut out = Vec::new();
    for field in tuple {
        match field {
            Field::Wildcard => return Err(CodecError::WildcardInTuple),
            Field::Int(v) => {
                out.push(TAG_INT);
                out.extend_from_slice(&v.to_le_bytes());
            }
            Field::Bytes(b) => {
                out.push(TAG_BYTES);
                out.extend_from_slice(&(b.len() as u32).to_le_bytes());
                out.extend_from_slice(b);
            }
        }
    }
    Ok(out)
}

/// Decodes a tuple's wire payload back into its fields.
///
/// `arity` is the number of fields the caller expects (taken from the slot
/// header, which carries arity independently of the payload bytes); decoding
/// stops once that many fields have been read and ignores any trailing bytes,
/// matching the slot format's `length`-is-authoritative contract.
pub fn decode(mut payload: &[u8], arity: u8) -> Result<Tuple, CodecError> {
    let mut fields = Vec::with_capacity(arity as usize);
    for _ in 0..arity {
        let tag = take_u8(&mut payload)?;
        match tag {
            TAG_INT => {
                let raw = take_n(&mut payload, 8)?;
                let mut buf = [0u8; 8];
                buf.copy_from_slice(raw);
                fields.push(Field::Int(i64::from_le_bytes(buf)));
            }
            TAG_BYTES => {
                let len_raw = take_n(&mut payload, 4)?;
                let mut len_buf = [0u8; 4];
                len_buf.copy_from_slice(len_raw);
                let len = u32::from_le_bytes(len_buf) as usize;
                let bytes = take_n(&mut payload, len)?;
                fields.push(Field::Bytes(bytes.to_vec()));
            }
            other => return Err(CodecError::UnknownTag(other)),
        }
    }
    Ok(fields)
}

fn take_u8(buf: &mut &[u8]) -> Result<u8, CodecError> {
    let b = take_n(buf, 1)?[0];
    Ok(b)
}

fn take_n<'a>(buf: &mut &'a [u8], n: usize) -> Result<&'a [u8], CodecError> {
    if buf.len() < n {
        return Err(CodecError::Truncated { needed: n, available: buf.len() });
    }
    let (head, tail) = buf.split_at(n);
    *buf = tail;
    Ok(head)
}

/// Positional wildcard unification between a query template and a decoded
/// tuple — the matching engine described in §4.5/§4.6.
///
/// A tuple matches a template iff arities are equal and, for every position,
/// the template field is a [`Field::Wildcard`] or value-equal to the tuple's
/// field at that position.
pub fn matches(template: &Template, tuple: &Tuple) -> bool {
    if template.len() != tuple.len() {
        return false;
    }
    template.iter().zip(tuple.iter()).all(|(t, v)| match t {
        Field::Wildcard => true,
        concrete => concrete == v,
    })
}

/// Builds an all-wildcard template of the given arity.
pub fn wildcard_template(arity: usize) -> Template {
    vec![Field::Wildcard; arity]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_mixed_fields() {
        let tuple = vec![Field::Int(42), Field::Bytes(b"hello".to_vec())];
        let encoded = encode(&tuple).unwrap();
        let decoded = decode(&encoded, tuple.len() as u8).unwrap();
        assert_eq!(decoded, tuple);
    }

    #[test]
    fn encoding_a_wildcard_is_rejected() {
        let tuple = vec![Field::Wildcard];
        assert_eq!(encode(&tuple), Err(CodecError::WildcardInTuple));
    }

    #[test]
    fn decode_truncated_payload_fails() {
        let err = decode(&[TAG_INT, 1, 2, 3], 1).unwrap_err();
        assert!(matches!(err, CodecError::Truncated { .. }));
    }

    #[test]
    fn decode_unknown_tag_fails() {
        let err = decode(&[0xFF], 1).unwrap_err();
        assert_eq!(err, CodecError::UnknownTag(0xFF));
    }

    #[test]
    fn wildcard_matches_anything_of_equal_arity() {
        let template = wildcard_template(2);
        let tuple = vec![Field::Int(1), Field::Bytes(b"x".to_vec())];
        assert!(matches(&template, &tuple));
    }

    #[test]
    fn mismatched_arity_never_matches() {
        let template = wildcard_template(1);
        let tuple = vec![Field::Int(1), Field::Int(2)];
        assert!(!matches(&template, &tuple));
    }

    #[test]
    fn concrete_field_must_be_equal() {
        let template = vec![Field::Int(5), Field::Wildcard];
        let matching = vec![Field::Int(5), Field::Bytes(b"anything".to_vec())];
        let non_matching = vec![Field::Int(6), Field::Bytes(b"anything".to_vec())];
        assert!(matches(&template, &matching));
        assert!(!matches(&template, &non_matching));
    }
}
