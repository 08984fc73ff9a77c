//! CLI command definitions.

use clap::{Parser, Subcommand};

pub mod build;
pub mod deploy;

/// railsup - provision AWS Fargate infrastructure for Rails apps with CDK
#[derive(Parser)]
#[command(name = "railsup")]
#[command(
    version,
    about = "railsup - provision AWS Fargate infrastructure for Rails apps with CDK"
)]
#[command(long_about = r#"
railsup reads a railsup.yml definition of your Rails services and generates
an AWS CDK TypeScript project with separate stacks:

  InitStack      → shared VPC and Fargate cluster
  FargateStack   → per-service Fargate service, DB cluster, autoscaling, ALB
  PipelineStack  → per-service CI/CD CodePipeline (when enabled)

WORKFLOWS:
  build    → generate the CDK project, install packages and compile it
  deploy   → cdk bootstrap and deploy the generated stacks

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Configuration failure
  4 - Command failure (npm/cdk)
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate and compile the CDK project from railsup.yml
    Build(build::BuildArgs),

    /// Deploy the generated stacks
    Deploy(deploy::DeployArgs),
}
