//! # railsup_codegen
//!
//! Turns compiled railsup configuration into a deployable AWS CDK
//! TypeScript project:
//!
//! - [`CdkProject`] orchestrates rendering: an init stack (VPC + Fargate
//!   cluster), a fargate stack per service, a pipeline stack per CI/CD
//!   enabled service, and the app entry point, exposed as a lazy file
//!   sequence that accumulates npm package requirements as it is consumed.
//! - [`CdkBuilder`] materializes the project: `cdk init`, source writing,
//!   `npm install` of the accumulated packages, `npm run build`.
//! - [`CdkDeployer`] runs `cdk bootstrap` and `cdk deploy` per selected
//!   stack.
//! - [`ParameterGroupStore`] is the seam to the RDS control plane for
//!   default DB cluster parameter groups referenced by generated code.

pub mod builder;
pub mod deployer;
pub mod error;
pub mod parameter_groups;
pub mod project;
pub mod service;
pub mod views;

pub use builder::CdkBuilder;
pub use deployer::{CdkDeployer, DeployOptions};
pub use error::{CodegenError, CodegenResult};
pub use parameter_groups::{
    ensure_parameter_groups, ParameterGroupStore, RdsParameterGroupStore,
};
pub use project::{CdkProject, SourceFiles};
pub use service::{Service, ServiceRegistry};
