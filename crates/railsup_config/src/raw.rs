//! Raw configuration document structures.
//!
//! These mirror the `railsup.yml` layout one-to-one: every field is
//! optional and untyped beyond its serde shape. The typed models in the
//! sibling modules are the only place where defaults and validation apply.
//!
//! YAML mappings whose entry order matters (services, subnets, environment
//! pairs, parameter-group parameters, metric dimensions) deserialize into
//! ordered `Vec`s rather than hash maps.

use serde::de::{DeserializeOwned, Error as DeError};
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// Root of the configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub vpc: Option<RawVpc>,
    #[serde(deserialize_with = "opt_ordered_map")]
    pub services: Option<Vec<(String, RawService)>>,
}

/// One named service section under `services`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawService {
    pub source_path: Option<String>,
    pub enable_cicd: Option<bool>,
    pub fargate: Option<RawFargate>,
    pub db_cluster: Option<RawDbCluster>,
    pub scaling: Option<RawScaling>,
    pub cicd: Option<RawCicd>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawVpc {
    pub max_azs: Option<u32>,
    pub cidr: Option<String>,
    pub enable_dns: Option<bool>,
    pub nat_gateways: Option<u32>,
    pub nat_gateway_subnets: Option<RawSubnetSelection>,
    #[serde(deserialize_with = "opt_ordered_map")]
    pub subnets: Option<Vec<(String, RawSubnet)>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSubnet {
    pub cidr_mask: Option<u32>,
    #[serde(rename = "type")]
    pub subnet_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSubnetSelection {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub subnet_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDbCluster {
    pub username: Option<String>,
    pub engine: Option<String>,
    pub engine_version: Option<String>,
    pub instance_type: Option<String>,
    pub instance_subnet: Option<String>,
    pub backup: Option<RawBackup>,
    pub cluster_identifier: Option<String>,
    pub db_name: Option<String>,
    pub removal_policy: Option<String>,
    pub instance_identifier: Option<String>,
    pub instances: Option<u32>,
    pub port: Option<u16>,
    pub kms_key_arn: Option<String>,
    pub preferred_maintenance_window: Option<String>,
    pub parameter_group: Option<RawParameterGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawBackup {
    pub retention_days: Option<u32>,
    pub preferred_window: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawParameterGroup {
    pub family: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "opt_scalar_pairs")]
    pub parameters: Option<Vec<(String, String)>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFargate {
    pub service_name: Option<String>,
    pub desired_count: Option<u32>,
    pub public: Option<bool>,
    pub domain_name: Option<String>,
    pub domain_zone: Option<String>,
    pub certificate: Option<String>,
    pub memory: Option<u32>,
    pub cpu: Option<u32>,
    #[serde(deserialize_with = "opt_scalar_pairs")]
    pub envs: Option<Vec<(String, String)>>,
    pub container_port: Option<u16>,
    pub container_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawScaling {
    pub max_capacity: Option<u32>,
    pub min_capacity: Option<u32>,
    pub on_cpu: Option<RawBaseScaling>,
    pub on_memory: Option<RawBaseScaling>,
    pub on_request: Option<RawBaseScaling>,
    pub on_metric: Option<RawStepScaling>,
    pub on_custom_metric: Option<RawTrackingScaling>,
    pub on_schedule: Option<RawScheduleScaling>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawBaseScaling {
    pub disable_scale_in: Option<bool>,
    pub scale_in_cooldown: Option<u32>,
    pub scale_out_cooldown: Option<u32>,
    pub target_util_percent: Option<u32>,
    pub requests_per_target: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStepScaling {
    pub metric: Option<RawMetric>,
    pub scaling_steps: Option<Vec<RawScalingStep>>,
    pub cooldown: Option<u32>,
    pub adjustment_type: Option<String>,
    pub min_adjustment_magnitude: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTrackingScaling {
    pub metric: Option<RawMetric>,
    pub target_value: Option<u32>,
    pub disable_scale_in: Option<bool>,
    pub scale_in_cooldown: Option<u32>,
    pub scale_out_cooldown: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawScheduleScaling {
    pub schedule: Option<String>,
    pub max_capacity: Option<u32>,
    pub min_capacity: Option<u32>,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawScalingStep {
    pub change: Option<i64>,
    pub lower: Option<u64>,
    pub upper: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMetric {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub color: Option<String>,
    pub label: Option<String>,
    pub period: Option<u32>,
    pub statistic: Option<String>,
    pub unit: Option<String>,
    #[serde(deserialize_with = "opt_scalar_pairs")]
    pub dimensions: Option<Vec<(String, String)>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCicd {
    pub pipeline_name: Option<String>,
    pub source_repo: Option<String>,
    pub source_description: Option<String>,
    pub skip_migration: Option<bool>,
    pub build: Option<RawCodeBuild>,
    pub migration: Option<RawCodeBuild>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCodeBuild {
    pub project_name: Option<String>,
    pub description: Option<String>,
    pub buildspec: Option<String>,
    pub build_image: Option<String>,
    pub timeout: Option<u32>,
}

/// Deserialize an optional YAML mapping into a `Vec` preserving entry order.
fn opt_ordered_map<'de, D, T>(deserializer: D) -> Result<Option<Vec<(String, T)>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let mapping = Option::<serde_yaml::Mapping>::deserialize(deserializer)?;
    mapping
        .map(|mapping| {
            mapping
                .into_iter()
                .map(|(key, value)| {
                    let key = scalar_string(&key)
                        .ok_or_else(|| DeError::custom("mapping key must be a scalar"))?;
                    let value = serde_yaml::from_value(value).map_err(DeError::custom)?;
                    Ok((key, value))
                })
                .collect()
        })
        .transpose()
}

/// Deserialize an optional YAML mapping of scalars into ordered string pairs.
///
/// Values like `RAILS_LOG_TO_STDOUT: true` or `PORT: 80` stringify the way
/// they will appear in generated code.
fn opt_scalar_pairs<'de, D>(deserializer: D) -> Result<Option<Vec<(String, String)>>, D::Error>
where
    D: Deserializer<'de>,
{
    let mapping = Option::<serde_yaml::Mapping>::deserialize(deserializer)?;
    mapping
        .map(|mapping| {
            mapping
                .into_iter()
                .map(|(key, value)| {
                    let key = scalar_string(&key)
                        .ok_or_else(|| DeError::custom("mapping key must be a scalar"))?;
                    let value = scalar_string(&value)
                        .ok_or_else(|| DeError::custom("mapping value must be a scalar"))?;
                    Ok((key, value))
                })
                .collect()
        })
        .transpose()
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_services_preserve_insertion_order() {
        let yaml = r#"
services:
  rails_foo:
    source_path: ./foo
  rails_bar:
    source_path: ./bar
  rails_baz:
    source_path: ./baz
"#;
        let config: RawConfig = serde_yaml::from_str(yaml).unwrap();
        let names: Vec<_> = config
            .services
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["rails_foo", "rails_bar", "rails_baz"]);
    }

    #[test]
    fn test_scalar_pairs_stringify_numbers_and_bools() {
        let yaml = r#"
envs:
  RAILS_LOG_TO_STDOUT: true
  PORT: 80
  RAILS_ENV: production
"#;
        let fargate: RawFargate = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            fargate.envs.unwrap(),
            vec![
                ("RAILS_LOG_TO_STDOUT".to_string(), "true".to_string()),
                ("PORT".to_string(), "80".to_string()),
                ("RAILS_ENV".to_string(), "production".to_string()),
            ]
        );
    }

    #[test]
    fn test_absent_sections_deserialize_to_none() {
        let config: RawConfig = serde_yaml::from_str("vpc:\n  max_azs: 2\n").unwrap();
        assert!(config.services.is_none());
        assert_eq!(config.vpc.unwrap().max_azs, Some(2));
    }
}
