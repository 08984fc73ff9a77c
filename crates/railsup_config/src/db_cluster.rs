//! Database cluster configuration.

use crate::error::{ConfigError, ConfigResult};
use crate::raw::{RawDbCluster, RawParameterGroup};
use crate::validate::{RemovalPolicy, SubnetType};

/// Supported Aurora engine flavors.
///
/// Free-form input uses the hyphenated form (`aurora-postgresql`); the
/// underscore form is not accepted. The canonical token is what generated
/// code references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbEngine {
    Aurora,
    AuroraMysql,
    AuroraPostgresql,
}

impl DbEngine {
    pub fn parse(value: &str) -> ConfigResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "aurora" => Ok(Self::Aurora),
            "aurora-mysql" => Ok(Self::AuroraMysql),
            "aurora-postgresql" => Ok(Self::AuroraPostgresql),
            _ => Err(ConfigError::UnsupportedValue {
                category: "db engine",
                value: value.to_string(),
                choices: "aurora, aurora-mysql, aurora-postgresql",
            }),
        }
    }

    /// Canonical token, e.g. `AURORA_POSTGRESQL`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aurora => "AURORA",
            Self::AuroraMysql => "AURORA_MYSQL",
            Self::AuroraPostgresql => "AURORA_POSTGRESQL",
        }
    }

    /// Hyphenated lower-case form used in derived resource names.
    pub fn kebab(&self) -> &'static str {
        match self {
            Self::Aurora => "aurora",
            Self::AuroraMysql => "aurora-mysql",
            Self::AuroraPostgresql => "aurora-postgresql",
        }
    }

    fn default_instance_type(&self) -> &'static str {
        match self {
            Self::Aurora => "r5.large",
            Self::AuroraMysql => "r5.large",
            Self::AuroraPostgresql => "r4.large",
        }
    }

    fn default_port(&self) -> u16 {
        match self {
            Self::Aurora => 3306,
            Self::AuroraMysql => 3306,
            Self::AuroraPostgresql => 3306,
        }
    }

    fn parameter_group_family(&self) -> &'static str {
        match self {
            Self::Aurora => "aurora5.6",
            Self::AuroraMysql => "aurora-mysql5.7",
            Self::AuroraPostgresql => "aurora-postgresql9.6",
        }
    }
}

/// Validated `db_cluster` section.
#[derive(Debug, Clone)]
pub struct DbCluster {
    pub engine: DbEngine,
    pub engine_version: Option<String>,
    pub username: String,
    pub instance_type: String,
    pub instance_subnet: SubnetType,
    pub backup: Option<BackUp>,
    pub db_name: String,
    pub cluster_identifier: Option<String>,
    pub removal_policy: RemovalPolicy,
    pub instance_identifier: Option<String>,
    pub instances: u32,
    pub kms_key_arn: Option<String>,
    pub port: u16,
    pub preferred_maintenance_window: Option<String>,
    pub parameter_group: ParameterGroup,
}

impl DbCluster {
    /// Compile the `db_cluster` section.
    ///
    /// `engine` and `db_name` are required; the engine drives the default
    /// instance type, port and parameter-group family. An engine outside
    /// the closed vocabulary fails outright rather than degrading to a
    /// generic default.
    pub fn from_raw(raw: RawDbCluster) -> ConfigResult<Self> {
        let engine = raw
            .engine
            .ok_or(ConfigError::MissingField {
                section: "db_cluster",
                field: "engine",
            })
            .and_then(|value| DbEngine::parse(&value))?;

        let mut username = raw.username.unwrap_or_else(|| "DBAdminUser".to_string());
        if engine != DbEngine::AuroraPostgresql && username.chars().count() > 16 {
            // MySQL-family engines cap usernames at 16 characters
            username = username.chars().take(16).collect();
        }

        let instance_type = raw
            .instance_type
            .unwrap_or_else(|| engine.default_instance_type().to_string());
        let instance_subnet = SubnetType::parse(raw.instance_subnet.as_deref().unwrap_or("isolated"))?;

        let db_name = raw.db_name.ok_or(ConfigError::MissingField {
            section: "db_cluster",
            field: "db_name",
        })?;

        let removal_policy =
            RemovalPolicy::parse(raw.removal_policy.as_deref().unwrap_or("retain"))?;
        let instances = raw.instances.unwrap_or(2);
        let port = raw.port.unwrap_or_else(|| engine.default_port());
        let parameter_group = ParameterGroup::from_raw(engine, raw.parameter_group);

        Ok(Self {
            engine,
            engine_version: raw.engine_version,
            username,
            instance_type,
            instance_subnet,
            backup: raw.backup.map(|backup| BackUp {
                retention_days: backup.retention_days,
                preferred_window: backup.preferred_window,
            }),
            db_name,
            cluster_identifier: raw.cluster_identifier,
            removal_policy,
            instance_identifier: raw.instance_identifier,
            instances,
            kms_key_arn: raw.kms_key_arn,
            port,
            preferred_maintenance_window: raw.preferred_maintenance_window,
            parameter_group,
        })
    }

    pub fn postgres(&self) -> bool {
        self.engine == DbEngine::AuroraPostgresql
    }
}

/// Backup window configuration for the cluster.
#[derive(Debug, Clone)]
pub struct BackUp {
    pub retention_days: Option<u32>,
    pub preferred_window: Option<String>,
}

/// DB cluster parameter group.
///
/// With explicit `parameters` the group is rendered inline into the stack
/// (`cfn` is true). Without them, generated code references a default group
/// by name; that group must be ensured against the RDS administration
/// service before deployment.
#[derive(Debug, Clone)]
pub struct ParameterGroup {
    pub family: String,
    pub description: String,
    pub cfn: bool,
    pub name: Option<String>,
    pub parameters: Vec<(String, String)>,
}

impl ParameterGroup {
    pub fn from_raw(engine: DbEngine, raw: Option<RawParameterGroup>) -> Self {
        let raw = raw.unwrap_or_default();
        let family = raw
            .family
            .unwrap_or_else(|| engine.parameter_group_family().to_string());
        let description = raw
            .description
            .unwrap_or_else(|| "created by railsup".to_string());

        match raw.parameters {
            Some(parameters) => Self {
                family,
                description,
                cfn: true,
                name: None,
                parameters,
            },
            None => Self {
                family,
                description,
                cfn: false,
                name: Some(format!("railsup-default-{}", engine.kebab())),
                parameters: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(yaml: &str) -> RawDbCluster {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_engine_parses_hyphen_forms_any_casing() {
        assert_eq!(DbEngine::parse("aurora").unwrap(), DbEngine::Aurora);
        assert_eq!(
            DbEngine::parse("Aurora-MySQL").unwrap(),
            DbEngine::AuroraMysql
        );
        assert_eq!(
            DbEngine::parse("AURORA-POSTGRESQL").unwrap().as_str(),
            "AURORA_POSTGRESQL"
        );
    }

    #[test]
    fn test_engine_rejects_underscore_form() {
        assert!(DbEngine::parse("AURORA_POSTGRESQL").is_err());
        assert!(DbEngine::parse("mysql").is_err());
    }

    #[test]
    fn test_defaults_follow_engine() {
        let cluster =
            DbCluster::from_raw(raw("engine: aurora-postgresql\ndb_name: app_development"))
                .unwrap();
        assert_eq!(cluster.instance_type, "r4.large");
        assert_eq!(cluster.port, 3306);
        assert_eq!(cluster.instances, 2);
        assert_eq!(cluster.instance_subnet, SubnetType::Isolated);
        assert_eq!(cluster.removal_policy, RemovalPolicy::Retain);
        assert!(cluster.postgres());

        let cluster = DbCluster::from_raw(raw("engine: aurora-mysql\ndb_name: app")).unwrap();
        assert_eq!(cluster.instance_type, "r5.large");
        assert!(!cluster.postgres());
    }

    #[test]
    fn test_missing_engine_or_db_name() {
        let err = DbCluster::from_raw(raw("db_name: app")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "engine", .. }));

        let err = DbCluster::from_raw(raw("engine: aurora")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "db_name", .. }));
    }

    #[test]
    fn test_username_truncated_for_mysql_engines_only() {
        let cluster = DbCluster::from_raw(raw(
            "engine: aurora-mysql\ndb_name: app\nusername: AVeryLongAdministratorName",
        ))
        .unwrap();
        assert_eq!(cluster.username, "AVeryLongAdminis");
        assert_eq!(cluster.username.len(), 16);

        let cluster = DbCluster::from_raw(raw(
            "engine: aurora-postgresql\ndb_name: app\nusername: AVeryLongAdministratorName",
        ))
        .unwrap();
        assert_eq!(cluster.username, "AVeryLongAdministratorName");
    }

    #[test]
    fn test_username_truncation_counts_characters_not_bytes() {
        let cluster = DbCluster::from_raw(raw(
            "engine: aurora-mysql\ndb_name: app\nusername: Ädministratörüser",
        ))
        .unwrap();
        assert_eq!(cluster.username, "Ädministratörüse");
        assert_eq!(cluster.username.chars().count(), 16);
    }

    #[test]
    fn test_explicit_port_and_instance_type_kept() {
        let cluster = DbCluster::from_raw(raw(
            "engine: aurora\ndb_name: app\nport: 5432\ninstance_type: r5.xlarge",
        ))
        .unwrap();
        assert_eq!(cluster.port, 5432);
        assert_eq!(cluster.instance_type, "r5.xlarge");
    }

    #[test]
    fn test_parameter_group_default_is_externally_managed() {
        let group = ParameterGroup::from_raw(DbEngine::AuroraPostgresql, None);
        assert!(!group.cfn);
        assert_eq!(
            group.name.as_deref(),
            Some("railsup-default-aurora-postgresql")
        );
        assert_eq!(group.family, "aurora-postgresql9.6");
        assert_eq!(group.description, "created by railsup");
        assert!(group.parameters.is_empty());
    }

    #[test]
    fn test_parameter_group_with_parameters_is_inline() {
        let raw_group: RawParameterGroup = serde_yaml::from_str(
            r#"
family: aurora-mysql5.7
parameters:
  max_connections: 1000
  character_set_server: utf8mb4
"#,
        )
        .unwrap();
        let group = ParameterGroup::from_raw(DbEngine::AuroraMysql, Some(raw_group));
        assert!(group.cfn);
        assert!(group.name.is_none());
        assert_eq!(
            group.parameters,
            vec![
                ("max_connections".to_string(), "1000".to_string()),
                ("character_set_server".to_string(), "utf8mb4".to_string()),
            ]
        );
    }

    #[test]
    fn test_parameter_group_families() {
        assert_eq!(
            ParameterGroup::from_raw(DbEngine::Aurora, None).family,
            "aurora5.6"
        );
        assert_eq!(
            ParameterGroup::from_raw(DbEngine::AuroraMysql, None).family,
            "aurora-mysql5.7"
        );
    }

    #[test]
    fn test_backup_section() {
        let cluster = DbCluster::from_raw(raw(
            "engine: aurora\ndb_name: app\nbackup:\n  retention_days: 7\n  preferred_window: '01:00-02:00'",
        ))
        .unwrap();
        let backup = cluster.backup.unwrap();
        assert_eq!(backup.retention_days, Some(7));
        assert_eq!(backup.preferred_window.as_deref(), Some("01:00-02:00"));
    }
}
