// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed identifiers.
//!
//! Every durable-log row id is `{4-char prefix}{19-char nanoid}`, 23
//! ASCII bytes total, stored inline so ids stay `Copy` and never
//! allocate after minting. [`define_id!`] stamps out one newtype per
//! table; the storage, minting, and parsing logic lives on [`RawId`]
//! rather than in the macro body.

/// Total byte length of a minted id (prefix + random suffix).
pub const ID_LEN: usize = 23;

const SUFFIX_LEN: usize = 19;

/// Returns `s` truncated to at most `n` characters.
pub fn short(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((at, _)) => &s[..at],
        None => s,
    }
}

/// Inline id storage shared by every typed identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawId {
    len: u8,
    bytes: [u8; ID_LEN],
}

impl RawId {
    /// Mint a fresh random id under `prefix`.
    pub fn generate(prefix: &str) -> Self {
        Self::parse(&format!("{prefix}{}", nanoid::nanoid!(SUFFIX_LEN)))
    }

    /// Wrap an existing id string, e.g. one read back from storage.
    ///
    /// Oversized input keeps the longest prefix that ends on a character
    /// boundary. The serde path rejects oversize instead, so nothing
    /// clamped ever round-trips through the wire unnoticed.
    pub fn parse(s: &str) -> Self {
        let mut len = 0;
        for (at, c) in s.char_indices() {
            let end = at + c.len_utf8();
            if end > ID_LEN {
                break;
            }
            len = end;
        }
        let mut bytes = [0u8; ID_LEN];
        bytes[..len].copy_from_slice(&s.as_bytes()[..len]);
        Self { len: len as u8, bytes }
    }

    pub fn as_str(&self) -> &str {
        // parse() only ever copies whole characters, so the active bytes
        // are valid UTF-8.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("")
    }
}

impl std::fmt::Debug for RawId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self.as_str(), f)
    }
}

impl std::fmt::Display for RawId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for RawId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for RawId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.len() > ID_LEN {
            return Err(serde::de::Error::custom(format!("id exceeds {ID_LEN} bytes: {s:?}")));
        }
        Ok(Self::parse(&s))
    }
}

/// Stamp out a typed id newtype over [`RawId`].
///
/// The generated type carries its prefix as a constant, `new()` for
/// minting, `from_string()` for decoding rows, and `as_str()` for
/// binding, plus `Display` and transparent serde. Anything beyond that
/// (ordering, borrowing as `str`, prefix stripping) is deliberately not
/// generated; callers that need it have outgrown the newtype.
///
/// ```ignore
/// define_id! {
///     /// Row id for the agents table.
///     pub struct AgentRecordId("agt-");
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($prefix:literal);
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name($crate::id::RawId);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Mint a fresh random id.
            pub fn new() -> Self {
                Self($crate::id::RawId::generate(Self::PREFIX))
            }

            /// Wrap an id read back from storage.
            pub fn from_string(raw: impl AsRef<str>) -> Self {
                Self($crate::id::RawId::parse(raw.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.0.as_str())
            }
        }
    };
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
