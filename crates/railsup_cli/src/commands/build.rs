//! Build command - generate the CDK project from configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use railsup_codegen::{
    ensure_parameter_groups, CdkBuilder, CdkProject, RdsParameterGroupStore,
};
use railsup_config::loader;

#[derive(Args)]
pub struct BuildArgs {
    /// Path to the configuration file
    #[arg(short, long, default_value = "railsup.yml")]
    pub file: PathBuf,

    /// Directory for the generated CDK project
    #[arg(long)]
    pub cdk_dir: Option<String>,

    /// AWS shared-config profile
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Skip the global aws-cdk npm install
    #[arg(long)]
    pub skip_install: bool,

    /// Skip npm install of the CDK service packages
    #[arg(long)]
    pub skip_deps: bool,

    /// Skip creating default DB cluster parameter groups against RDS
    #[arg(long)]
    pub skip_parameter_groups: bool,
}

pub async fn execute(args: BuildArgs) -> Result<()> {
    info!("building CDK project from {}", args.file.display());

    let raw = loader::load_file(&args.file)
        .with_context(|| format!("failed to load configuration {}", args.file.display()))?;
    let mut project = CdkProject::new(raw, args.cdk_dir, &args.file)
        .context("invalid configuration")?;

    let root = std::env::current_dir()?;
    let builder = CdkBuilder::new(&root)
        .skip_cdk_install(args.skip_install)
        .skip_dependencies(args.skip_deps);
    builder
        .run(&mut project)
        .context("failed to build the CDK project")?;

    if !args.skip_parameter_groups {
        let store = RdsParameterGroupStore::from_env(args.profile.as_deref()).await;
        ensure_parameter_groups(&project, &store)
            .await
            .context("failed to ensure DB cluster parameter groups")?;
    }

    println!("CDK project generated at {}", root.join(project.cdk_dir()).display());
    Ok(())
}
