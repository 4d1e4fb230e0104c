//! JSON wire representation of a [`Field`], distinct from the binary codec
//! used by `memspace-core` attachers so that HTTP clients never need to know
//! the shmem payload encoding.

use memspace_codec::Field;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum WireField {
    Wildcard,
    Int(i64),
    Bytes(Vec<u8>),
}

impl From<&Field> for WireField {
    fn from(field: &Field) -> Self {
        match field {
            Field::Wildcard => WireField::Wildcard,
            Field::Int(v) => WireField::Int(*v),
            Field::Bytes(b) => WireField::Bytes(b.clone()),
        }
    }
}

impl From<WireField> for Field {
    fn from(field: WireField) -> Self {
        match field {
            WireField::Wildcard => Field::Wildcard,
            WireField::Int(v) => Field::Int(v),
            WireField::Bytes(b) => Field::Bytes(b),
        }
    }
}

pub fn to_wire(tuple: &[Field]) -> Vec<WireField> {
    tuple.iter().map(WireField::from).collect()
}

pub fn from_wire(fields: Vec<WireField>) -> Vec<Field> {
    fields.into_iter().map(Field::from).collect()
}
