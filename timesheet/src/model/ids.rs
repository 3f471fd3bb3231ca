use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifiers arrive either as strings (UUIDs) or as plain numbers depending on
/// which backend service produced them.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_id!(
    /// A resource (employee) identifier, also used as the employee code.
    EmployeeId
);
string_id!(ProjectId);
string_id!(TaskId);
string_id!(
    /// A logged time entry. The timesheet backend uses numeric ids.
    TimeEntryId
);
string_id!(
    /// A role of the cost catalog (name + experience tier).
    RoleId
);
string_id!(CostId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_numeric_and_text_ids() {
        let ids: Vec<TimeEntryId> = serde_json::from_str(r#"[12, "abc-1"]"#).unwrap();
        assert_eq!(ids, vec![TimeEntryId::new("12"), TimeEntryId::new("abc-1")]);
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&EmployeeId::from("e-7")).unwrap();
        assert_eq!(json, r#""e-7""#);
    }
}
