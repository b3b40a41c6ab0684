// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Opaque record identifiers.
//!
//! Identifiers double as bearer capabilities for sessions and tasks, so they
//! carry 128 bits from the operating system CSPRNG and never derive from
//! timestamps or counters.

use std::borrow::Borrow;
use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Unguessable identifier rendered as 32 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Number of random bytes behind every identifier.
    pub const ENTROPY_BYTES: usize = 16;

    /// Length of the rendered identifier.
    pub const LEN: usize = Self::ENTROPY_BYTES * 2;

    /// Generates a fresh identifier.
    pub fn generate() -> Self {
        let mut bytes = [0u8; Self::ENTROPY_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Borrows the identifier as `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RecordId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_128_bit_hex() {
        let id = RecordId::generate();
        assert_eq!(id.as_str().len(), RecordId::LEN);
        assert_eq!(RecordId::LEN, 32);
        assert!(
            id.as_str()
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
        );
        let decoded = hex::decode(id.as_str()).expect("valid hex");
        assert_eq!(decoded.len() * 8, 128);
    }

    #[test]
    fn ids_do_not_collide() {
        let ids: HashSet<RecordId> = (0..10_000).map(|_| RecordId::generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn ids_have_no_shared_prefix() {
        // Sequential generation must not produce counter-like or time-like prefixes.
        let a = RecordId::generate();
        let b = RecordId::generate();
        assert_ne!(a.as_str()[..8], b.as_str()[..8]);
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = RecordId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
