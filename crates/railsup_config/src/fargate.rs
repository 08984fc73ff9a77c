//! Fargate compute service configuration.

use crate::raw::RawFargate;

/// Validated `fargate` section.
///
/// `has_db` is derived by the owning service from whether a database
/// cluster is configured; it is never read from user input. `service_name`
/// is injected by the stack view (the service's stack prefix).
#[derive(Debug, Clone)]
pub struct Fargate {
    pub has_db: bool,
    pub service_name: String,
    pub desired_count: u32,
    pub public: bool,
    pub domain_name: Option<String>,
    pub domain_zone: Option<String>,
    pub certificate: Option<String>,
    pub memory: u32,
    pub cpu: u32,
    pub envs: Vec<(String, String)>,
    pub container_port: u16,
    pub container_name: String,
}

impl Fargate {
    pub fn from_raw(raw: RawFargate, service_name: String, has_db: bool) -> Self {
        Self {
            has_db,
            service_name,
            desired_count: raw.desired_count.unwrap_or(2),
            public: raw.public.unwrap_or(false),
            domain_name: raw.domain_name,
            domain_zone: raw.domain_zone,
            certificate: raw.certificate,
            memory: raw.memory.unwrap_or(512),
            cpu: raw.cpu.unwrap_or(256),
            envs: raw.envs.unwrap_or_default(),
            container_port: raw.container_port.unwrap_or(80),
            container_name: raw
                .container_name
                .unwrap_or_else(|| "FargateTaskContainer".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let fargate = Fargate::from_raw(RawFargate::default(), "RailsFoo".to_string(), false);
        assert_eq!(fargate.desired_count, 2);
        assert_eq!(fargate.memory, 512);
        assert_eq!(fargate.cpu, 256);
        assert_eq!(fargate.container_port, 80);
        assert_eq!(fargate.container_name, "FargateTaskContainer");
        assert!(!fargate.public);
        assert!(!fargate.has_db);
        assert!(fargate.envs.is_empty());
        assert_eq!(fargate.service_name, "RailsFoo");
    }

    #[test]
    fn test_explicit_zero_desired_count_is_kept() {
        let raw = RawFargate {
            desired_count: Some(0),
            ..Default::default()
        };
        let fargate = Fargate::from_raw(raw, "Svc".to_string(), false);
        assert_eq!(fargate.desired_count, 0);
    }

    #[test]
    fn test_has_db_is_caller_derived() {
        let fargate = Fargate::from_raw(RawFargate::default(), "Svc".to_string(), true);
        assert!(fargate.has_db);
    }

    #[test]
    fn test_envs_keep_order() {
        let raw: RawFargate = serde_yaml::from_str(
            "envs:\n  RAILS_ENV: production\n  RAILS_LOG_TO_STDOUT: true\n  PORT: 80",
        )
        .unwrap();
        let fargate = Fargate::from_raw(raw, "Svc".to_string(), false);
        let keys: Vec<_> = fargate.envs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["RAILS_ENV", "RAILS_LOG_TO_STDOUT", "PORT"]);
    }
}
