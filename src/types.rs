//! Enumerations the API encodes as plain strings or integers.
//!
//! Each type serializes as its underlying primitive, and parsing or
//! converting from a value outside the known set fails with
//! [`Error::Validation`]. They are used in request bodies; the models
//! decoded from responses keep these values as plain text so a value added
//! on the server does not break decoding.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Returns the value as sent over the wire.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )+
                }
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok($name::$variant), )+
                    other => Err(Error::Validation(format!(
                        "{:?} is not a valid {}",
                        other,
                        stringify!($name)
                    ))),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Virtual hardware profile of a server.
    pub enum ServerHardwareProfile {
        Default => "default",
        Nested => "nested",
        Legacy => "legacy",
        CiscoCsr => "cisco_csr",
        SophosUtm => "sophos_utm",
        F5BigIp => "f5_bigip",
        Q35 => "q35",
    }
}

string_enum! {
    /// Performance class of a storage.
    pub enum StorageType {
        Storage => "storage",
        StorageHigh => "storage_high",
        StorageInsane => "storage_insane",
    }
}

string_enum! {
    /// Balancing algorithm of a load balancer.
    pub enum LoadbalancerAlgorithm {
        RoundRobin => "roundrobin",
        LeastConnections => "leastconn",
    }
}

string_enum! {
    /// How a password handed to a template storage is encoded.
    pub enum PasswordType {
        Plain => "plain",
        Crypt => "crypt",
    }
}

string_enum! {
    /// Aggregation interval for usage reports.
    pub enum UsageInterval {
        Hour => "H",
        Day => "D",
        Week => "W",
        Month => "M",
    }
}

/// IP address family, encoded as the integer 4 or 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IpAddressFamily {
    /// IPv4
    V4,
    /// IPv6
    V6,
}

impl TryFrom<u8> for IpAddressFamily {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(IpAddressFamily::V4),
            6 => Ok(IpAddressFamily::V6),
            other => Err(Error::Validation(format!(
                "{other} is not a valid IP address family"
            ))),
        }
    }
}

impl From<IpAddressFamily> for u8 {
    fn from(value: IpAddressFamily) -> u8 {
        match value {
            IpAddressFamily::V4 => 4,
            IpAddressFamily::V6 => 6,
        }
    }
}

impl fmt::Display for IpAddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCategory;
    use serde_json::json;

    #[test]
    fn test_string_enums_encode_as_strings() {
        assert_eq!(
            serde_json::to_value(ServerHardwareProfile::CiscoCsr).unwrap(),
            json!("cisco_csr")
        );
        assert_eq!(
            serde_json::to_value(LoadbalancerAlgorithm::LeastConnections).unwrap(),
            json!("leastconn")
        );
        assert_eq!(serde_json::to_value(UsageInterval::Week).unwrap(), json!("W"));
        assert_eq!(
            serde_json::from_value::<StorageType>(json!("storage_insane")).unwrap(),
            StorageType::StorageInsane
        );
    }

    #[test]
    fn test_unknown_values_are_rejected() {
        let err = "storage_ludicrous".parse::<StorageType>().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(serde_json::from_value::<PasswordType>(json!("md5")).is_err());
        assert!(serde_json::from_value::<UsageInterval>(json!("Y")).is_err());
    }

    #[test]
    fn test_ip_family_is_an_integer() {
        assert_eq!(serde_json::to_value(IpAddressFamily::V6).unwrap(), json!(6));
        assert_eq!(
            serde_json::from_value::<IpAddressFamily>(json!(4)).unwrap(),
            IpAddressFamily::V4
        );
        assert!(serde_json::from_value::<IpAddressFamily>(json!(5)).is_err());
        assert!(IpAddressFamily::try_from(0).is_err());
    }
}
