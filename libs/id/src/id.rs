//! The identifier type: canonical textual representation, the trailing-group
//! codec, and the operations built on top of them.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use rand::RngCore;

use crate::IdError;

/// Expected lengths of the five hyphen-separated groups.
const GROUP_LENS: [usize; 5] = [8, 4, 4, 4, 12];

/// Hex digits in the trailing group (48 bits).
const TRAILING_DIGITS: usize = 12;

/// Low bits of the trailing value that form the chunk counter.
const CHUNK_COUNTER_MASK: u64 = 0xFFFF;

/// A UUID-shaped identifier with application semantics in the trailing group.
///
/// The canonical form is the 36-character `8-4-4-4-12` grouped hexadecimal
/// string. The value stores its text verbatim; case is preserved on
/// round-trip and ignored on comparison.
///
/// `Id` does not enforce well-formedness at construction: [`Id::parse`] is
/// the validating path, while [`Id::from_raw`] carries arbitrary text so the
/// fail-open filter operations can be applied to untrusted input. Operations
/// that need a decodable trailing group return [`IdError::Malformed`] when
/// they cannot have one.
#[derive(Debug, Clone)]
pub struct Id {
    text: String,
}

impl Default for Id {
    /// The empty identifier: zero-length text, never well-formed.
    ///
    /// This is the absent value inside an invalid [`NullId`](crate::NullId);
    /// use [`Id::new`] for a fresh random identifier.
    fn default() -> Self {
        Id {
            text: String::new(),
        }
    }
}

impl Id {
    /// Generates a fresh random identifier.
    ///
    /// The result is well-formed, lowercase, and carries uniformly random
    /// bits (RFC 4122 version 4); it is never internal in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_rng(&mut rand::rng())
    }

    /// Generates a fresh identifier from the given random source.
    ///
    /// Seed the source to make generation deterministic in tests.
    #[must_use]
    pub fn new_with_rng<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
        Id {
            text: uuid.hyphenated().to_string(),
        }
    }

    /// Generates an internal identifier: groups 1-4 are all zero.
    ///
    /// `index` distinguishes logically distinct call sites and occupies the
    /// high 16 bits of the trailing group; the low 32 bits come from a
    /// process-wide monotonic sequence seeded from the current unix time.
    /// Two calls with different `index` can therefore never collide, and
    /// repeated calls with the same `index` stay unique for up to 2^32
    /// generations per process.
    #[must_use]
    pub fn new_internal(index: u16) -> Self {
        let seq = next_internal_seq() & 0xFFFF_FFFF;
        let trailing = (u64::from(index) << 32) | seq;
        Id {
            text: format!("00000000-0000-0000-0000-{trailing:012x}"),
        }
    }

    /// Parses and validates identifier text.
    ///
    /// The returned identifier carries the input verbatim; no case
    /// normalization is applied.
    pub fn parse(text: &str) -> Result<Self, IdError> {
        let id = Id::from_raw(text);
        id.validate()?;
        Ok(id)
    }

    /// Wraps arbitrary text as an identifier without validation.
    ///
    /// Intended for boundaries that must hold possibly-malformed input and
    /// apply the fail-open filter operations to it. Use [`Id::parse`] when
    /// well-formedness is required.
    #[must_use]
    pub fn from_raw(text: impl Into<String>) -> Self {
        Id { text: text.into() }
    }

    /// The canonical text of this identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true if the identifier text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Consumes the identifier, returning its text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }

    /// Checks the structural invariant of the canonical form.
    ///
    /// Well-formed text has exactly five hyphen-separated groups of lengths
    /// 8, 4, 4, 4, and 12, with every non-hyphen character a hexadecimal
    /// digit of either case.
    pub fn validate(&self) -> Result<(), IdError> {
        let mut count = 0;
        for (i, group) in self.text.split('-').enumerate() {
            count += 1;
            let expected = match GROUP_LENS.get(i) {
                Some(len) => *len,
                None => {
                    return Err(IdError::malformed(
                        &self.text,
                        "more than 5 hyphen-separated groups",
                    ));
                }
            };
            if group.len() != expected {
                return Err(IdError::malformed(
                    &self.text,
                    format!(
                        "group {} has length {}, expected {expected}",
                        i + 1,
                        group.len()
                    ),
                ));
            }
            if !group.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(IdError::malformed(
                    &self.text,
                    format!("group {} contains a non-hex character", i + 1),
                ));
            }
        }
        if count != GROUP_LENS.len() {
            return Err(IdError::malformed(
                &self.text,
                "expected 5 hyphen-separated groups",
            ));
        }
        Ok(())
    }

    /// Returns true if this is an internal (system-generated) identifier.
    ///
    /// Internal identifiers have all-zero digits in groups 1-4. Text that is
    /// not well-formed is reported as not internal rather than as an error.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        if self.validate().is_err() {
            return false;
        }
        self.text
            .split('-')
            .take(4)
            .all(|group| group.bytes().all(|b| b == b'0'))
    }

    /// Extracts the trailing group as a 48-bit unsigned value.
    ///
    /// Requires at least five hyphen-separated groups and a trailing group
    /// parseable as hexadecimal; the leading groups are not validated here.
    pub fn trailing_value(&self) -> Result<u64, IdError> {
        let trailing = self.text.split('-').nth(4).ok_or_else(|| {
            IdError::malformed(&self.text, "fewer than 5 hyphen-separated groups")
        })?;
        u64::from_str_radix(trailing, 16).map_err(|_| {
            IdError::malformed(
                &self.text,
                format!("trailing group '{trailing}' is not hexadecimal"),
            )
        })
    }

    /// Returns a copy of this identifier with the trailing group replaced.
    ///
    /// The new value is formatted as lowercase hexadecimal, left-padded to
    /// 12 digits; a value wider than 48 bits widens the group. All other
    /// groups are preserved unchanged.
    pub fn with_trailing_value(&self, value: u64) -> Result<Self, IdError> {
        let mut groups: Vec<&str> = self.text.split('-').collect();
        if groups.len() < GROUP_LENS.len() {
            return Err(IdError::malformed(
                &self.text,
                "fewer than 5 hyphen-separated groups",
            ));
        }
        let trailing = format!("{value:0width$x}", width = TRAILING_DIGITS);
        groups[4] = &trailing;
        Ok(Id {
            text: groups.join("-"),
        })
    }

    /// Returns a copy with the chunk counter (low 16 bits of the trailing
    /// value) replaced, preserving the upper 32 bits.
    pub fn with_chunk_counter(&self, counter: u16) -> Result<Self, IdError> {
        let trailing = self.trailing_value()?;
        self.with_trailing_value((trailing & !CHUNK_COUNTER_MASK) | u64::from(counter))
    }

    /// The current chunk counter value.
    pub fn chunk_counter(&self) -> Result<u16, IdError> {
        Ok((self.trailing_value()? & CHUNK_COUNTER_MASK) as u16)
    }

    /// Returns a copy with the chunk counter reset to zero.
    pub fn reset_chunk_counter(&self) -> Result<Self, IdError> {
        self.with_chunk_counter(0)
    }

    /// Returns a copy with the chunk counter incremented by one.
    ///
    /// The counter wraps silently from 0xffff back to 0x0000; callers that
    /// need more than 65536 related identifiers must allocate a new base.
    pub fn increment(&self) -> Result<Self, IdError> {
        let counter = self.chunk_counter()?;
        self.with_chunk_counter(counter.wrapping_add(1))
    }

    /// Returns a copy with the unix timestamp of `t` added to the trailing
    /// value.
    ///
    /// The addition is plain, not masked to the 48-bit group width: a large
    /// prior value plus a large timestamp can widen the textual group. On
    /// error the caller's value is untouched.
    pub fn with_time(&self, t: DateTime<Utc>) -> Result<Self, IdError> {
        let trailing = self.trailing_value()?;
        self.with_trailing_value(trailing.wrapping_add(t.timestamp() as u64))
    }

    /// The bucket this identifier falls into: trailing value mod 100.
    fn bucket(&self) -> Result<u8, IdError> {
        Ok((self.trailing_value()? % 100) as u8)
    }

    /// Returns true if this identifier is selected for a rollout of the
    /// given percentage.
    ///
    /// Selection is `bucket < percent`, so 0 selects nothing and 100 (or
    /// more) selects every well-formed identifier. Undecodable identifiers
    /// are never selected.
    #[must_use]
    pub fn ab_test(&self, percent: u8) -> bool {
        match self.bucket() {
            Ok(bucket) => bucket < percent,
            Err(_) => false,
        }
    }

    /// The experiment group of this identifier, in `[0, 99]`.
    ///
    /// Unlike [`Id::ab_test`], this is a direct accessor: an undecodable
    /// identifier is an error for the caller to handle.
    pub fn ab_test_group(&self) -> Result<u8, IdError> {
        self.bucket()
    }

    /// Returns true if this identifier's bucket lies in `[from, to)`.
    ///
    /// The left bound is included and the right bound excluded. Designed as
    /// a boolean filter for bulk processing: undecodable identifiers
    /// (including text that is not an identifier at all) fall outside every
    /// range rather than raising an error.
    #[must_use]
    pub fn in_ab_test_range(&self, from: u8, to: u8) -> bool {
        match self.bucket() {
            Ok(bucket) => (from..to).contains(&bucket),
            Err(_) => false,
        }
    }
}

/// Monotonic sequence for internal identifiers, seeded from unix time at
/// first use so values stay distinct across typical process restarts.
fn next_internal_seq() -> u64 {
    static SEQ: OnceLock<AtomicU64> = OnceLock::new();
    SEQ.get_or_init(|| AtomicU64::new(Utc::now().timestamp() as u64))
        .fetch_add(1, Ordering::Relaxed)
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Id {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl PartialEq for Id {
    /// Identifiers compare equal without regard to hex-digit case.
    fn eq(&self, other: &Self) -> bool {
        self.text.eq_ignore_ascii_case(&other.text)
    }
}

impl Eq for Id {}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Equality is case-insensitive, so the hash must be too.
        self.text.to_ascii_lowercase().hash(state);
    }
}

impl serde::Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> serde::Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Id::parse(&text).map_err(serde::de::Error::custom)
    }
}
