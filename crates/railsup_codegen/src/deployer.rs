//! CDK deployment: bootstrap plus `cdk deploy` per stack, driven by the
//! deploy flags.

use std::path::PathBuf;

use tracing::info;

use crate::builder::run_command;
use crate::error::CodegenResult;
use crate::project::CdkProject;
use crate::service::Service;

/// Stack selection for a deploy run.
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Deploy only the init stack.
    pub init_only: bool,
    /// Deploy fargate stacks. When neither this nor `cicd` is set, both
    /// stack kinds deploy.
    pub fargate: bool,
    /// Deploy pipeline stacks.
    pub cicd: bool,
    /// Restrict the deploy to one named service.
    pub service_name: Option<String>,
    /// AWS shared-config profile to deploy with.
    pub profile: Option<String>,
}

/// Deploys the generated stacks with the cdk CLI.
pub struct CdkDeployer {
    root: PathBuf,
    options: DeployOptions,
}

impl CdkDeployer {
    pub fn new(root: impl Into<PathBuf>, options: DeployOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    pub async fn run(&self, project: &CdkProject) -> CodegenResult<()> {
        let cdk_path = self.root.join(project.cdk_dir());

        run_command(&cdk_path, "cdk", &["bootstrap"]).await?;
        self.deploy_stack(&cdk_path, &format!("{}InitStack", project.stack_prefix()))
            .await?;
        if self.options.init_only {
            return Ok(());
        }

        match &self.options.service_name {
            Some(name) => {
                let svc = project.services().get(name)?;
                self.deploy_service(&cdk_path, svc).await?;
            }
            None => {
                for svc in project.services().iter() {
                    self.deploy_service(&cdk_path, svc).await?;
                }
            }
        }
        Ok(())
    }

    async fn deploy_service(&self, cdk_path: &std::path::Path, svc: &Service) -> CodegenResult<()> {
        let both = !self.options.fargate && !self.options.cicd;
        if both || self.options.fargate {
            self.deploy_stack(cdk_path, &format!("{}FargateStack", svc.stack_prefix()))
                .await?;
        }
        if (both || self.options.cicd) && svc.enable_cicd() {
            self.deploy_stack(cdk_path, &format!("{}PipelineStack", svc.stack_prefix()))
                .await?;
        }
        Ok(())
    }

    async fn deploy_stack(&self, cdk_path: &std::path::Path, stack: &str) -> CodegenResult<()> {
        info!("deploying {stack}");
        // prompts are disabled; deploys run unattended
        let mut args = vec!["deploy", stack, "--require-approval", "never"];
        if let Some(profile) = &self.options.profile {
            args.push("--profile");
            args.push(profile);
        }
        run_command(cdk_path, "cdk", &args).await
    }
}
