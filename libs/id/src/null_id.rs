//! Nullable identifier wrapper for storage and serialization boundaries.

use std::fmt;

use crate::Id;

/// An identifier that may be absent.
///
/// `NullId` gives boundaries that need a present/absent tri-state (SQL NULL
/// columns, nullable JSON fields) a value-type representation without
/// pointer semantics. When `valid` is false the wrapped identifier is
/// meaningless and is never validated or read.
///
/// The bare [`Id`] treats null as an error; only this wrapper decodes it as
/// a valid, error-free outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NullId {
    /// Whether `id` holds a present identifier.
    pub valid: bool,
    /// The wrapped identifier; meaningless unless `valid` is true.
    pub id: Id,
}

impl NullId {
    /// Wraps an identifier, marking it valid when its text is non-empty.
    #[must_use]
    pub fn new(id: Id) -> Self {
        NullId {
            valid: !id.is_empty(),
            id,
        }
    }

    /// The wrapped identifier, or `None` when absent.
    #[must_use]
    pub fn as_option(&self) -> Option<&Id> {
        self.valid.then_some(&self.id)
    }
}

impl From<Id> for NullId {
    fn from(id: Id) -> Self {
        NullId::new(id)
    }
}

impl From<Option<Id>> for NullId {
    fn from(id: Option<Id>) -> Self {
        match id {
            Some(id) => NullId::new(id),
            None => NullId::default(),
        }
    }
}

impl From<NullId> for Option<Id> {
    fn from(null_id: NullId) -> Self {
        null_id.valid.then_some(null_id.id)
    }
}

impl fmt::Display for NullId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            self.id.fmt(f)
        } else {
            f.write_str("null")
        }
    }
}

impl serde::Serialize for NullId {
    /// Serializes as the identifier when valid, as null otherwise.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if self.valid {
            self.id.serialize(serializer)
        } else {
            serializer.serialize_none()
        }
    }
}

impl<'de> serde::Deserialize<'de> for NullId {
    /// Deserializes null as the absent value; anything else is delegated to
    /// the identifier decoder.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match Option::<Id>::deserialize(deserializer)? {
            Some(id) => Ok(NullId { valid: true, id }),
            None => Ok(NullId::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[test]
    fn test_new_with_id_is_valid() {
        let null_id = NullId::new(Id::new());
        assert!(null_id.valid);
        assert!(null_id.id.validate().is_ok());
    }

    #[test]
    fn test_new_with_empty_id_is_invalid() {
        let null_id = NullId::new(Id::default());
        assert!(!null_id.valid);
        assert!(null_id.id.validate().is_err());
    }

    #[test]
    fn test_as_option() {
        let id = Id::parse("592b56f9-1c75-444f-8eb6-88d40d8314fc").unwrap();
        let null_id = NullId::new(id.clone());
        assert_eq!(null_id.as_option(), Some(&id));
        assert_eq!(NullId::default().as_option(), None);
    }

    #[test]
    fn test_option_round_trip() {
        let id = Id::new();
        let null_id = NullId::from(Some(id.clone()));
        assert!(null_id.valid);
        assert_eq!(Option::<Id>::from(null_id), Some(id));

        let absent = NullId::from(None);
        assert!(!absent.valid);
        assert_eq!(Option::<Id>::from(absent), None);
    }

    #[test]
    fn test_display() {
        let null_id = NullId::new(Id::parse("592b56f9-1c75-444f-8eb6-88d40d8314fc").unwrap());
        assert_eq!(null_id.to_string(), "592b56f9-1c75-444f-8eb6-88d40d8314fc");
        assert_eq!(NullId::default().to_string(), "null");
    }

    #[test]
    fn test_marshal_valid() {
        let null_id = NullId::new(Id::parse("592b56f9-1c75-444f-8eb6-88d40d8314fc").unwrap());
        let json = serde_json::to_string(&null_id).unwrap();
        assert_eq!(json, "\"592b56f9-1c75-444f-8eb6-88d40d8314fc\"");
    }

    #[test]
    fn test_marshal_invalid() {
        let json = serde_json::to_string(&NullId::default()).unwrap();
        assert_eq!(json, "null");
    }

    #[test]
    fn test_unmarshal_null() {
        let null_id: NullId = serde_json::from_str("null").unwrap();
        assert!(!null_id.valid);
        assert_eq!(null_id.id.as_str(), "");
    }

    #[test]
    fn test_unmarshal_id() {
        let null_id: NullId =
            serde_json::from_str("\"592b56f9-1c75-444f-8eb6-88d40d8314fc\"").unwrap();
        assert!(null_id.valid);
        assert_eq!(null_id.id.as_str(), "592b56f9-1c75-444f-8eb6-88d40d8314fc");
    }

    #[test]
    fn test_unmarshal_rejects_malformed() {
        assert!(serde_json::from_str::<NullId>("\"bad id\"").is_err());
    }

    #[test]
    fn test_absent_field_defaults_to_invalid() {
        #[derive(Deserialize)]
        struct Record {
            #[serde(default)]
            parent: NullId,
        }

        let record: Record = serde_json::from_str("{}").unwrap();
        assert!(!record.parent.valid);
        assert_eq!(record.parent.id.as_str(), "");
    }
}
