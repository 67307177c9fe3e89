use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Result;
use bytes::Bytes;
use std::io::{BufRead, Write};

pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

pub trait Unpackable {
    /// Parse the record body; the `<type> <size>\0` header has already been consumed.
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

/// A record addressed by the hash of its own serialization
pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn object_id(&self) -> Result<ObjectId> {
        Ok(ObjectId::digest(&self.serialize()?))
    }
}

/// Prefix `body` with the `<type> <size>\0` header shared by every record.
pub fn frame(object_type: ObjectType, body: &[u8]) -> Result<Bytes> {
    let mut bytes = Vec::with_capacity(body.len() + 16);
    write!(bytes, "{} {}\0", object_type.as_str(), body.len())?;
    bytes.write_all(body)?;

    Ok(Bytes::from(bytes))
}
