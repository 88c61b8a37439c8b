use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    const HEX: &[u8; 16] = b"0123456789abcdef";
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

/// Sha256 over the JSON encoding of `value`.
///
/// Maps and sets in the step models are ordered (`BTreeMap`/`BTreeSet`), so
/// equal models always encode to the same bytes.
pub fn snapshot_hash<T: Serialize>(value: &T) -> String {
    let mut hasher = Sha256::new();
    match serde_json::to_vec(value) {
        Ok(bytes) => hasher.update(&bytes),
        Err(err) => hasher.update(err.to_string().as_bytes()),
    }
    to_hex(&hasher.finalize())
}
