//! Conversion between `Value` and storable bytes.
//!
//! Layout of a stored scalar:
//!
//! - `Value::String(s)` is stored as the raw UTF-8 bytes of `s`
//! - any other value is stored as [`ENCODED_MARKER`] followed by the JSON
//!   form of the value
//!
//! `0x80` is a continuation byte in UTF-8 and can never start a valid
//! string, so a plain string can never be read back as an encoded value.

use bytes::{BufMut, Bytes, BytesMut};

use crate::Value;

/// First byte of every non-string encoded value.
pub const ENCODED_MARKER: u8 = 0x80;

/// Convert a value into the bytes stored remotely.
///
/// Never fails. A value that cannot be serialized reversibly (it contains a
/// NaN or infinite float) degrades to its text rendering and will read back
/// as a string.
pub fn encode(value: &Value) -> Bytes {
    if let Value::String(s) = value {
        return Bytes::copy_from_slice(s.as_bytes());
    }

    match serialize(value) {
        Ok(bytes) => bytes,
        Err(message) => {
            log::debug!("storing {} as text: {}", value.kind(), message);
            Bytes::from(value.to_string())
        }
    }
}

/// Convert stored bytes back into a value.
///
/// Never fails. Bytes that were not produced by [`encode`] (written by
/// another client, say) come back as a string when they are UTF-8 and as
/// raw bytes otherwise.
pub fn decode(bytes: &[u8]) -> Value {
    if let Some((&ENCODED_MARKER, payload)) = bytes.split_first() {
        if let Ok(value) = serde_json::from_slice::<Value>(payload) {
            return value;
        }
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => Value::String(s.to_string()),
        Err(_) => Value::Bytes(bytes.to_vec()),
    }
}

fn serialize(value: &Value) -> Result<Bytes, String> {
    // serde_json writes non-finite floats as `null`, which would not read back.
    if value.has_non_finite() {
        return Err("non-finite float".to_string());
    }

    let mut buf = BytesMut::new();
    buf.put_u8(ENCODED_MARKER);
    let mut writer = buf.writer();
    serde_json::to_writer(&mut writer, &canonical(value)).map_err(|e| e.to_string())?;
    Ok(writer.into_inner().freeze())
}

/// A copy of `value` whose sets hold each member once, ordered by the
/// member's encoded bytes. Equal values then always encode to equal bytes.
fn canonical(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        Value::Map(fields) => Value::Map(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), canonical(v)))
                .collect(),
        ),
        Value::Set(members) => {
            let mut keyed: Vec<(Bytes, Value)> = members
                .iter()
                .map(|member| (encode(member), canonical(member)))
                .collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            keyed.dedup_by(|a, b| a.0 == b.0);
            Value::Set(keyed.into_iter().map(|(_, member)| member).collect())
        }
        other => other.clone(),
    }
}
