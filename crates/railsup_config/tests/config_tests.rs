//! End-to-end configuration compilation tests: a full `railsup.yml`
//! document through the loader and into validated models.

use std::io::Write;

use railsup_config::{
    loader, ConfigError, DbCluster, DbEngine, Fargate, Scaling, SubnetType, Vpc,
};
use tempfile::NamedTempFile;

const FULL_CONFIG: &str = r#"
vpc:
  max_azs: 2
  cidr: 10.0.0.0/21
services:
  rails_foo:
    source_path: ./rails_foo
    enable_cicd: true
    fargate:
      desired_count: 5
      public: true
      envs:
        RAILS_ENV: production
        PORT: 80
    db_cluster:
      engine: aurora-postgresql
      db_name: app_development
    scaling:
      max_capacity: 7
      on_cpu:
        target_util_percent: 40
  rails_no_db:
    source_path: ./no_db
    fargate:
      desired_count: 1
"#;

fn write_config(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn test_full_document_compiles_into_models() {
    let file = write_config(FULL_CONFIG);
    let raw = loader::load_file(file.path()).unwrap();

    let vpc = Vpc::from_raw(raw.vpc).unwrap();
    assert_eq!(vpc.max_azs, 2);
    assert_eq!(vpc.nat_gateways, 2);
    assert_eq!(vpc.subnets.len(), 3);

    let services = raw.services.unwrap();
    assert_eq!(services.len(), 2);
    assert_eq!(services[0].0, "rails_foo");
    assert_eq!(services[1].0, "rails_no_db");

    let (_, foo) = &services[0];
    assert_eq!(foo.enable_cicd, Some(true));

    let db = DbCluster::from_raw(foo.db_cluster.clone().unwrap()).unwrap();
    assert_eq!(db.engine, DbEngine::AuroraPostgresql);
    assert_eq!(db.db_name, "app_development");
    assert_eq!(db.instance_subnet, SubnetType::Isolated);

    let fargate = Fargate::from_raw(foo.fargate.clone().unwrap(), "RailsFoo".to_string(), true);
    assert_eq!(fargate.desired_count, 5);
    assert!(fargate.public);
    assert_eq!(
        fargate.envs,
        vec![
            ("RAILS_ENV".to_string(), "production".to_string()),
            ("PORT".to_string(), "80".to_string()),
        ]
    );

    let scaling = Scaling::from_raw(foo.scaling.clone().unwrap()).unwrap();
    assert_eq!(scaling.max_capacity, 7);
    assert_eq!(scaling.on_cpu.unwrap().target_util_percent, Some(40));
}

#[test]
fn test_invalid_enum_value_names_choices() {
    let file = write_config(
        "services:\n  app:\n    source_path: ./app\n    db_cluster:\n      engine: mysql\n      db_name: app\n",
    );
    let raw = loader::load_file(file.path()).unwrap();
    let (_, service) = raw.services.unwrap().into_iter().next().unwrap();

    let err = DbCluster::from_raw(service.db_cluster.unwrap()).unwrap_err();
    match err {
        ConfigError::UnsupportedValue { value, choices, .. } => {
            assert_eq!(value, "mysql");
            assert!(choices.contains("aurora-postgresql"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
