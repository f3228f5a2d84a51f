//! # beacon-id
//!
//! Identifier types for the beacon platform.
//!
//! A beacon [`Id`] looks like a standard UUID but multiplexes extra
//! application semantics into the 48-bit trailing group of its textual form:
//!
//! - an *internal* marker: an identifier whose first four groups (80 bits)
//!   are all zero is system-generated rather than externally issued;
//! - a deterministic *bucket* in `[0, 99]` (trailing value mod 100), used
//!   for percentage-based experiment assignment;
//! - a 16-bit *chunk counter* in the low bits of the trailing group, used
//!   to derive a family of related identifiers from one base value.
//!
//! ## Identifier format
//!
//! The canonical form is the 36-character grouped hexadecimal string,
//! `8-4-4-4-12` digits separated by hyphens:
//!
//! - `db2e2e9e-7b84-46f0-93e7-000000000007` — bucket 7
//! - `00000000-0000-0000-0000-00005ac3fbfb` — internal
//!
//! Input is case-insensitive and case is preserved on round-trip; equality
//! compares identifiers without regard to case.
//!
//! ## Design principles
//!
//! - Identifiers are immutable values; every "mutating" operation
//!   (time embedding, counter reset/increment) returns a new value and the
//!   caller reassigns.
//! - Validity is a per-operation concern: [`Id::parse`] validates, while
//!   the boolean filters ([`Id::ab_test`], [`Id::in_ab_test_range`],
//!   [`Id::is_internal`]) accept arbitrary text and treat undecodable input
//!   as "not selected".
//! - Sub-fields are reached only through the documented projection and
//!   injection operations, never by callers poking at raw bit positions.
//!
//! The [`NullId`] wrapper adds SQL-NULL / JSON-null semantics for storage
//! boundaries; the bare [`Id`] treats null as an error.

mod error;
mod id;
mod null_id;
#[cfg(feature = "sqlx")]
mod sql;

pub use error::IdError;
pub use id::Id;
pub use null_id::NullId;
