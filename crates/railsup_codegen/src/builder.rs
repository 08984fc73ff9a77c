//! CDK app build: init the TypeScript app, write generated sources,
//! install the accumulated npm packages and compile.

use std::fs;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{CodegenError, CodegenResult};
use crate::project::CdkProject;

/// Run `program args..` in `dir`, failing on a non-zero exit.
pub(crate) async fn run_command(dir: &Path, program: &str, args: &[&str]) -> CodegenResult<()> {
    debug!("running `{program} {}` in {}", args.join(" "), dir.display());
    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .status()
        .await?;
    if !status.success() {
        return Err(CodegenError::CommandFailed {
            command: format!("{program} {}", args.join(" ")),
            status,
        });
    }
    Ok(())
}

/// Materializes a [`CdkProject`] on disk.
pub struct CdkBuilder {
    root: PathBuf,
    skip_cdk_install: bool,
    skip_dependencies: bool,
}

impl CdkBuilder {
    /// `root` is the directory the cdk directory lives under, normally the
    /// current working directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            skip_cdk_install: false,
            skip_dependencies: false,
        }
    }

    /// Skip the global `npm i -g aws-cdk` during app initialization.
    pub fn skip_cdk_install(mut self, skip: bool) -> Self {
        self.skip_cdk_install = skip;
        self
    }

    /// Skip `npm install` of the accumulated packages.
    pub fn skip_dependencies(mut self, skip: bool) -> Self {
        self.skip_dependencies = skip;
        self
    }

    /// Full build: init app if needed, write sources, install packages,
    /// compile.
    pub async fn run(&self, project: &mut CdkProject) -> CodegenResult<()> {
        self.init_cdk_app(project).await?;
        self.write_source_files(project)?;
        if !self.skip_dependencies {
            self.install_dependencies(project).await?;
        }
        self.npm_build(project).await
    }

    /// `cdk init` a fresh TypeScript app when the target directory does not
    /// exist yet, then drop the default stack and test files it generates.
    pub async fn init_cdk_app(&self, project: &CdkProject) -> CodegenResult<()> {
        let cdk_path = self.root.join(project.cdk_dir());
        if cdk_path.exists() {
            debug!("cdk app {} already initialized", cdk_path.display());
            return Ok(());
        }

        info!("initializing cdk app at {}", cdk_path.display());
        fs::create_dir_all(&cdk_path)?;
        if !self.skip_cdk_install {
            run_command(&cdk_path, "npm", &["i", "-g", "aws-cdk"]).await?;
        }
        run_command(&cdk_path, "cdk", &["init", "app", "--language=typescript"]).await?;

        for default in [project.default_stack(), project.default_test()] {
            let path = self.root.join(default);
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    /// Write every generated source file, reporting create vs replace.
    pub fn write_source_files(&self, project: &mut CdkProject) -> CodegenResult<()> {
        for entry in project.source_files() {
            let (path, code) = entry?;
            let path = self.root.join(path);
            if path.exists() {
                info!("replacing {}", path.display());
            } else {
                info!("creating {}", path.display());
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, code)?;
        }
        Ok(())
    }

    async fn install_dependencies(&self, project: &CdkProject) -> CodegenResult<()> {
        let cdk_path = self.root.join(project.cdk_dir());
        for pkg in project.packages() {
            info!("installing {pkg}");
            run_command(&cdk_path, "npm", &["install", pkg]).await?;
        }
        Ok(())
    }

    async fn npm_build(&self, project: &CdkProject) -> CodegenResult<()> {
        let cdk_path = self.root.join(project.cdk_dir());
        info!("running npm run build ...");
        run_command(&cdk_path, "npm", &["run", "build"]).await
    }
}
