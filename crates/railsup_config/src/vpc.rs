//! Network topology configuration: VPC, subnets, subnet selection.

use crate::error::{ConfigError, ConfigResult};
use crate::raw::{RawSubnet, RawSubnetSelection, RawVpc};
use crate::validate::SubnetType;

/// Validated VPC configuration for the init stack.
#[derive(Debug, Clone)]
pub struct Vpc {
    pub max_azs: u32,
    pub cidr: String,
    pub enable_dns: bool,
    pub nat_gateways: u32,
    pub nat_gateway_subnets: Option<SubnetSelection>,
    pub subnets: Vec<Subnet>,
}

impl Vpc {
    /// Compile the `vpc` section, applying defaults for absent fields.
    ///
    /// When no `subnets` are configured, exactly three are synthesized in
    /// this order: application/private/24, ingress/public/24,
    /// database/isolated/28.
    pub fn from_raw(raw: Option<RawVpc>) -> ConfigResult<Self> {
        let raw = raw.unwrap_or_default();

        let max_azs = raw.max_azs.unwrap_or(3);
        let cidr = raw.cidr.unwrap_or_else(|| "10.0.0.0/21".to_string());
        let enable_dns = raw.enable_dns.unwrap_or(true);
        // NAT gateway count follows the AZ count unless pinned explicitly
        let nat_gateways = raw.nat_gateways.unwrap_or(max_azs);
        let nat_gateway_subnets = raw
            .nat_gateway_subnets
            .map(SubnetSelection::from_raw)
            .transpose()?;

        let subnets = match raw.subnets {
            Some(entries) => entries
                .into_iter()
                .map(|(name, subnet)| Subnet::from_raw(name, subnet))
                .collect::<ConfigResult<Vec<_>>>()?,
            None => Self::default_subnets(),
        };

        Ok(Self {
            max_azs,
            cidr,
            enable_dns,
            nat_gateways,
            nat_gateway_subnets,
            subnets,
        })
    }

    fn default_subnets() -> Vec<Subnet> {
        vec![
            Subnet {
                name: "application".to_string(),
                cidr_mask: 24,
                subnet_type: SubnetType::Private,
            },
            Subnet {
                name: "ingress".to_string(),
                cidr_mask: 24,
                subnet_type: SubnetType::Public,
            },
            Subnet {
                name: "database".to_string(),
                cidr_mask: 28,
                subnet_type: SubnetType::Isolated,
            },
        ]
    }
}

/// A single subnet configuration entry.
#[derive(Debug, Clone)]
pub struct Subnet {
    pub name: String,
    pub cidr_mask: u32,
    pub subnet_type: SubnetType,
}

impl Subnet {
    pub fn from_raw(name: String, raw: RawSubnet) -> ConfigResult<Self> {
        let cidr_mask = raw.cidr_mask.ok_or(ConfigError::MissingField {
            section: "vpc.subnets",
            field: "cidr_mask",
        })?;
        let subnet_type = raw
            .subnet_type
            .ok_or(ConfigError::MissingField {
                section: "vpc.subnets",
                field: "type",
            })
            .and_then(|value| SubnetType::parse(&value))?;

        Ok(Self {
            name,
            cidr_mask,
            subnet_type,
        })
    }
}

/// Selects subnets either by configured name or by type, never both.
#[derive(Debug, Clone)]
pub struct SubnetSelection {
    pub name: Option<String>,
    pub subnet_type: Option<SubnetType>,
}

impl SubnetSelection {
    pub fn from_raw(raw: RawSubnetSelection) -> ConfigResult<Self> {
        let subnet_type = raw
            .subnet_type
            .as_deref()
            .map(SubnetType::parse)
            .transpose()?;
        if raw.name.is_some() && subnet_type.is_some() {
            return Err(ConfigError::AmbiguousSubnetSelection);
        }
        Ok(Self {
            name: raw.name,
            subnet_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vpc_defaults() {
        let vpc = Vpc::from_raw(None).unwrap();
        assert_eq!(vpc.max_azs, 3);
        assert_eq!(vpc.cidr, "10.0.0.0/21");
        assert!(vpc.enable_dns);
        assert_eq!(vpc.nat_gateways, 3);
        assert!(vpc.nat_gateway_subnets.is_none());
    }

    #[test]
    fn test_default_subnets_synthesized_in_order() {
        let vpc = Vpc::from_raw(None).unwrap();
        let summary: Vec<_> = vpc
            .subnets
            .iter()
            .map(|s| (s.name.as_str(), s.cidr_mask, s.subnet_type))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("application", 24, SubnetType::Private),
                ("ingress", 24, SubnetType::Public),
                ("database", 28, SubnetType::Isolated),
            ]
        );
    }

    #[test]
    fn test_nat_gateways_follow_max_azs() {
        let raw: RawVpc = serde_yaml::from_str("max_azs: 2").unwrap();
        let vpc = Vpc::from_raw(Some(raw)).unwrap();
        assert_eq!(vpc.nat_gateways, 2);
    }

    #[test]
    fn test_explicit_false_enable_dns_is_kept() {
        let raw: RawVpc = serde_yaml::from_str("enable_dns: false").unwrap();
        let vpc = Vpc::from_raw(Some(raw)).unwrap();
        assert!(!vpc.enable_dns);
    }

    #[test]
    fn test_configured_subnets_replace_defaults() {
        let raw: RawVpc = serde_yaml::from_str(
            r#"
subnets:
  web:
    cidr_mask: 20
    type: public
  data:
    cidr_mask: 28
    type: isolated
"#,
        )
        .unwrap();
        let vpc = Vpc::from_raw(Some(raw)).unwrap();
        assert_eq!(vpc.subnets.len(), 2);
        assert_eq!(vpc.subnets[0].name, "web");
        assert_eq!(vpc.subnets[0].subnet_type, SubnetType::Public);
        assert_eq!(vpc.subnets[1].name, "data");
    }

    #[test]
    fn test_subnet_requires_type() {
        let err = Subnet::from_raw(
            "web".to_string(),
            RawSubnet {
                cidr_mask: Some(24),
                subnet_type: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "type", .. }));
    }

    #[test]
    fn test_subnet_selection_rejects_name_and_type() {
        let raw = RawSubnetSelection {
            name: Some("a".to_string()),
            subnet_type: Some("public".to_string()),
        };
        let err = SubnetSelection::from_raw(raw).unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousSubnetSelection));
    }

    #[test]
    fn test_subnet_selection_single_field_ok() {
        let by_name = SubnetSelection::from_raw(RawSubnetSelection {
            name: Some("ingress".to_string()),
            subnet_type: None,
        })
        .unwrap();
        assert_eq!(by_name.name.as_deref(), Some("ingress"));

        let by_type = SubnetSelection::from_raw(RawSubnetSelection {
            name: None,
            subnet_type: Some("public".to_string()),
        })
        .unwrap();
        assert_eq!(by_type.subnet_type, Some(SubnetType::Public));
    }
}
