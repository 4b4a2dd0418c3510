use serde::{Deserialize, Serialize};

use super::string_enum;

string_enum! {
    /// Kind of identifier an order is placed for.
    pub enum IdentifierType {
        Dns => "dns",
        Ip => "ip",
        /// Device serial numbers, validated with `device-attest-01`.
        PermanentIdentifier => "permanent-identifier",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(rename = "type")]
    pub _type: IdentifierType,
    pub value: String,
}

impl Identifier {
    pub fn dns(value: impl Into<String>) -> Self {
        Self {
            _type: IdentifierType::Dns,
            value: value.into(),
        }
    }

    pub fn permanent_identifier(value: impl Into<String>) -> Self {
        Self {
            _type: IdentifierType::PermanentIdentifier,
            value: value.into(),
        }
    }

    pub fn is_type_dns(&self) -> bool {
        self._type == IdentifierType::Dns
    }
}
