//! Closed vocabularies for free-form configuration values.
//!
//! Every enumerated configuration field is matched case-insensitively
//! against one of these vocabularies; anything outside the vocabulary is a
//! [`ConfigError::UnsupportedValue`] naming the category and the valid
//! choices. `as_str` returns the canonical upper-case token used in
//! generated code.

use crate::error::{ConfigError, ConfigResult};

/// Placement type of a VPC subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubnetType {
    Isolated,
    Private,
    Public,
}

impl SubnetType {
    pub fn parse(value: &str) -> ConfigResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "isolated" => Ok(Self::Isolated),
            "private" => Ok(Self::Private),
            "public" => Ok(Self::Public),
            _ => Err(ConfigError::UnsupportedValue {
                category: "subnet type",
                value: value.to_string(),
                choices: "isolated, private, public",
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Isolated => "ISOLATED",
            Self::Private => "PRIVATE",
            Self::Public => "PUBLIC",
        }
    }
}

/// Policy applied when a resource is removed from its stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPolicy {
    Retain,
    Destroy,
}

impl RemovalPolicy {
    pub fn parse(value: &str) -> ConfigResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "retain" => Ok(Self::Retain),
            "destroy" => Ok(Self::Destroy),
            _ => Err(ConfigError::UnsupportedValue {
                category: "removal policy",
                value: value.to_string(),
                choices: "retain, destroy",
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retain => "RETAIN",
            Self::Destroy => "DESTROY",
        }
    }
}

/// Load balancer listener protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Https,
    Http,
    Tcp,
    Tls,
}

impl Protocol {
    pub fn parse(value: &str) -> ConfigResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "https" => Ok(Self::Https),
            "http" => Ok(Self::Http),
            "tcp" => Ok(Self::Tcp),
            "tls" => Ok(Self::Tls),
            _ => Err(ConfigError::UnsupportedValue {
                category: "protocol",
                value: value.to_string(),
                choices: "https, http, tcp, tls",
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Https => "HTTPS",
            Self::Http => "HTTP",
            Self::Tcp => "TCP",
            Self::Tls => "TLS",
        }
    }
}

/// How step-scaling adjustment numbers are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentType {
    ChangeInCapacity,
    PercentChangeInCapacity,
    ExactCapacity,
}

impl AdjustmentType {
    pub fn parse(value: &str) -> ConfigResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "change_in_capacity" => Ok(Self::ChangeInCapacity),
            "percent_change_in_capacity" => Ok(Self::PercentChangeInCapacity),
            "exact_capacity" => Ok(Self::ExactCapacity),
            _ => Err(ConfigError::UnsupportedValue {
                category: "adjustment type",
                value: value.to_string(),
                choices: "change_in_capacity, percent_change_in_capacity, exact_capacity",
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChangeInCapacity => "CHANGE_IN_CAPACITY",
            Self::PercentChangeInCapacity => "PERCENT_CHANGE_IN_CAPACITY",
            Self::ExactCapacity => "EXACT_CAPACITY",
        }
    }
}

/// Load balancer IP address type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpAddressType {
    Ipv4,
    Dualstack,
}

impl IpAddressType {
    pub fn parse(value: &str) -> ConfigResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "ipv4" => Ok(Self::Ipv4),
            "dualstack" => Ok(Self::Dualstack),
            _ => Err(ConfigError::UnsupportedValue {
                category: "ip address type",
                value: value.to_string(),
                choices: "ipv4, dualstack",
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ipv4 => "IPV4",
            Self::Dualstack => "DUALSTACK",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_type_case_insensitive() {
        assert_eq!(SubnetType::parse("isolated").unwrap(), SubnetType::Isolated);
        assert_eq!(SubnetType::parse("PRIVATE").unwrap(), SubnetType::Private);
        assert_eq!(SubnetType::parse("Public").unwrap(), SubnetType::Public);
        assert_eq!(SubnetType::parse("public").unwrap().as_str(), "PUBLIC");
    }

    #[test]
    fn test_subnet_type_rejects_unknown() {
        let err = SubnetType::parse("internal").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("subnet type"));
        assert!(msg.contains("isolated, private, public"));
    }

    #[test]
    fn test_removal_policy() {
        assert_eq!(RemovalPolicy::parse("Retain").unwrap().as_str(), "RETAIN");
        assert_eq!(RemovalPolicy::parse("DESTROY").unwrap().as_str(), "DESTROY");
        assert!(RemovalPolicy::parse("keep").is_err());
    }

    #[test]
    fn test_protocol() {
        assert_eq!(Protocol::parse("https").unwrap().as_str(), "HTTPS");
        assert!(Protocol::parse("udp").is_err());
    }

    #[test]
    fn test_adjustment_type() {
        assert_eq!(
            AdjustmentType::parse("Percent_Change_In_Capacity").unwrap(),
            AdjustmentType::PercentChangeInCapacity
        );
        assert!(AdjustmentType::parse("percentchangeincapacity").is_err());
    }

    #[test]
    fn test_ip_address_type() {
        assert_eq!(IpAddressType::parse("IPv4").unwrap().as_str(), "IPV4");
        assert!(IpAddressType::parse("ipv6").is_err());
    }
}
