//! # railsup_config
//!
//! Configuration-to-model compiler for railsup.
//!
//! Takes the loosely-typed `railsup.yml` document (a nested key/value
//! configuration parsed into raw serde structures) and produces
//! fully-defaulted, cross-validated configuration objects:
//!
//! - network topology ([`Vpc`], [`Subnet`], [`SubnetSelection`])
//! - database cluster ([`DbCluster`], [`ParameterGroup`], [`BackUp`])
//! - compute service ([`Fargate`])
//! - autoscaling policies ([`Scaling`] and its per-kind variants)
//! - CI/CD build projects ([`CodeBuildProject`])
//!
//! Each object's constructor is the sole validation point for its
//! configuration section: required fields missing, enumerated values outside
//! their closed vocabulary, or unsupported combinations all fail with a
//! [`ConfigError`] before any code generation happens. Defaults are applied
//! only when a field is entirely absent; explicit falsy values are kept.

pub mod code_build;
pub mod db_cluster;
pub mod error;
pub mod fargate;
pub mod loader;
pub mod raw;
pub mod scaling;
pub mod validate;
pub mod vpc;

pub use code_build::CodeBuildProject;
pub use db_cluster::{BackUp, DbCluster, DbEngine, ParameterGroup};
pub use error::{ConfigError, ConfigResult};
pub use fargate::Fargate;
pub use raw::{
    RawCicd, RawCodeBuild, RawConfig, RawDbCluster, RawFargate, RawScaling, RawService, RawVpc,
};
pub use scaling::{
    Metric, RequestScaling, Scaling, ScalingStep, ScheduleScaling, StepScaling, TrackingScaling,
    UtilizationScaling,
};
pub use validate::{AdjustmentType, IpAddressType, Protocol, RemovalPolicy, SubnetType};
pub use vpc::{Subnet, SubnetSelection, Vpc};
