//! Postgres value conversions for [`Id`] and [`NullId`].
//!
//! Identifiers travel as text. Decoding accepts the TEXT family and BYTEA
//! (UTF-8 bytes of the canonical form) and validates on the way in; any
//! other SQL type is rejected. SQL NULL into a bare [`Id`] is an error —
//! only [`NullId`] decodes it, as a valid absent value.

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::{Decode, Encode, Postgres, Type, ValueRef};

use crate::{Id, IdError, NullId};

impl Type<Postgres> for Id {
    fn type_info() -> PgTypeInfo {
        <&str as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <&str as Type<Postgres>>::compatible(ty) || <&[u8] as Type<Postgres>>::compatible(ty)
    }
}

impl Encode<'_, Postgres> for Id {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <&str as Encode<'_, Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> Decode<'r, Postgres> for Id {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        if value.is_null() {
            return Err(IdError::Null.into());
        }

        // The compatibility check is skipped on try_get_unchecked paths, so
        // guard the source type here as well.
        let info = value.type_info().into_owned();
        if <&str as Type<Postgres>>::compatible(&info) {
            let text = <&str as Decode<'r, Postgres>>::decode(value)?;
            return Ok(Id::parse(text)?);
        }
        if <&[u8] as Type<Postgres>>::compatible(&info) {
            let bytes = <&[u8] as Decode<'r, Postgres>>::decode(value)?;
            let text = std::str::from_utf8(bytes).map_err(|_| {
                IdError::malformed(
                    String::from_utf8_lossy(bytes),
                    "byte value is not valid UTF-8",
                )
            })?;
            return Ok(Id::parse(text)?);
        }

        Err(IdError::UnsupportedSource {
            source_type: info.to_string(),
        }
        .into())
    }
}

impl Type<Postgres> for NullId {
    fn type_info() -> PgTypeInfo {
        <Id as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <Id as Type<Postgres>>::compatible(ty)
    }
}

impl Encode<'_, Postgres> for NullId {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        if self.valid {
            <Id as Encode<'_, Postgres>>::encode_by_ref(&self.id, buf)
        } else {
            Ok(IsNull::Yes)
        }
    }
}

impl<'r> Decode<'r, Postgres> for NullId {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        if value.is_null() {
            return Ok(NullId::default());
        }
        let id = <Id as Decode<'r, Postgres>>::decode(value)?;
        Ok(NullId { valid: true, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compatible_source_types() {
        let text = <&str as Type<Postgres>>::type_info();
        assert!(<Id as Type<Postgres>>::compatible(&text));
        assert!(<NullId as Type<Postgres>>::compatible(&text));

        let bytea = <&[u8] as Type<Postgres>>::type_info();
        assert!(<Id as Type<Postgres>>::compatible(&bytea));

        let float = <f64 as Type<Postgres>>::type_info();
        assert!(!<Id as Type<Postgres>>::compatible(&float));
        assert!(!<NullId as Type<Postgres>>::compatible(&float));
    }

    #[test]
    fn test_encode_id_as_text() {
        let id = Id::parse("592b56f9-1c75-444f-8eb6-88d40d8314fc").unwrap();
        let mut buf = PgArgumentBuffer::default();
        let is_null = <Id as Encode<'_, Postgres>>::encode_by_ref(&id, &mut buf).unwrap();
        assert!(matches!(is_null, IsNull::No));
        assert_eq!(&buf[..], id.as_str().as_bytes());
    }

    #[test]
    fn test_encode_invalid_null_id_as_null() {
        let mut buf = PgArgumentBuffer::default();
        let is_null =
            <NullId as Encode<'_, Postgres>>::encode_by_ref(&NullId::default(), &mut buf).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
        assert!(buf.is_empty());
    }
}
