//! Deploy command - bootstrap and deploy the generated stacks.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use railsup_codegen::{CdkDeployer, CdkProject, DeployOptions};
use railsup_config::loader;

#[derive(Args)]
pub struct DeployArgs {
    /// Path to the configuration file
    #[arg(short, long, default_value = "railsup.yml")]
    pub file: PathBuf,

    /// Directory of the generated CDK project
    #[arg(long)]
    pub cdk_dir: Option<String>,

    /// Deploy only the init stack
    #[arg(long)]
    pub init: bool,

    /// Deploy fargate stacks (both kinds when neither flag is set)
    #[arg(long)]
    pub fargate: bool,

    /// Deploy pipeline stacks
    #[arg(long)]
    pub cicd: bool,

    /// Deploy a single named service
    #[arg(short, long)]
    pub service: Option<String>,

    /// AWS shared-config profile
    #[arg(short, long)]
    pub profile: Option<String>,
}

pub async fn execute(args: DeployArgs) -> Result<()> {
    let raw = loader::load_file(&args.file)
        .with_context(|| format!("failed to load configuration {}", args.file.display()))?;
    let project = CdkProject::new(raw, args.cdk_dir, &args.file)
        .context("invalid configuration")?;

    info!("deploying stacks for {}", project.cdk_dir());

    let options = DeployOptions {
        init_only: args.init,
        fargate: args.fargate,
        cicd: args.cicd,
        service_name: args.service,
        profile: args.profile,
    };
    let root = std::env::current_dir()?;
    CdkDeployer::new(&root, options)
        .run(&project)
        .await
        .context("deploy failed")?;

    println!("deploy complete");
    Ok(())
}
