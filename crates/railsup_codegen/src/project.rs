//! CDK project orchestration: one init stack, per-service fargate and
//! pipeline stacks, and the app entry point, produced as a lazy file
//! sequence.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use railsup_config::{RawConfig, Vpc};

use crate::error::CodegenResult;
use crate::service::{dir_prefix, ServiceRegistry};
use crate::views::{AppView, InitStackView, StackRef};

/// A generated CDK project.
pub struct CdkProject {
    cdk_dir: String,
    stack_prefix: String,
    vpc: Vpc,
    services: ServiceRegistry,
    packages: BTreeSet<String>,
}

impl CdkProject {
    /// Build the project model from a parsed configuration document.
    ///
    /// `config_path` is where the document was loaded from; service source
    /// paths resolve relative to its directory.
    pub fn new(
        raw: RawConfig,
        cdk_dir: Option<String>,
        config_path: &Path,
    ) -> CodegenResult<Self> {
        let cdk_dir = cdk_dir.unwrap_or_else(|| "cdk-sample".to_string());
        let stack_prefix = dir_prefix(&cdk_dir);
        let vpc = Vpc::from_raw(raw.vpc)?;
        let services = ServiceRegistry::from_raw(raw.services, config_path)?;

        Ok(Self {
            cdk_dir,
            stack_prefix,
            vpc,
            services,
            packages: BTreeSet::new(),
        })
    }

    pub fn cdk_dir(&self) -> &str {
        &self.cdk_dir
    }

    pub fn stack_prefix(&self) -> &str {
        &self.stack_prefix
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    /// npm packages referenced by the files rendered so far. The set is
    /// complete only after [`CdkProject::source_files`] has been exhausted.
    pub fn packages(&self) -> &BTreeSet<String> {
        &self.packages
    }

    /// Lazy sequence of `(path, code)` pairs for every file the project
    /// generates: the init stack, then per service a fargate stack and a
    /// pipeline stack when CI/CD is enabled, then the app entry point.
    ///
    /// Rendering accumulates npm package requirements as each file is
    /// consumed; the iterator fuses after the first error.
    pub fn source_files(&mut self) -> SourceFiles<'_> {
        SourceFiles {
            project: self,
            state: State::Init,
        }
    }

    /// The empty stack `cdk init` drops, removed by the builder.
    pub fn default_stack(&self) -> PathBuf {
        PathBuf::from(format!(
            "{dir}/lib/{dir}-stack.ts",
            dir = self.cdk_dir
        ))
    }

    /// The default test file `cdk init` drops, removed by the builder.
    pub fn default_test(&self) -> PathBuf {
        PathBuf::from(format!(
            "{dir}/test/{dir}.test.ts",
            dir = self.cdk_dir
        ))
    }

    fn init_stack(&mut self) -> String {
        let view = InitStackView::new(self.stack_prefix.clone(), self.vpc.clone());
        self.packages.extend(view.packages());
        view.render()
    }

    fn app(&self) -> String {
        let stacks = self
            .services
            .iter()
            .map(|svc| StackRef {
                name: svc.name().to_string(),
                stack_prefix: svc.stack_prefix().to_string(),
                path_prefix: svc.path_prefix().to_string(),
                const_prefix: svc.const_prefix().to_string(),
                enable_cicd: svc.enable_cicd(),
            })
            .collect();
        AppView::new(self.stack_prefix.clone(), self.cdk_dir.clone(), stacks).render()
    }

    fn lib_path(&self, file_prefix: &str, kind: &str) -> PathBuf {
        PathBuf::from(format!(
            "{dir}/lib/{file_prefix}-{kind}-stack.ts",
            dir = self.cdk_dir
        ))
    }
}

enum State {
    Init,
    Service { index: usize, stage: Stage },
    App,
    Done,
}

enum Stage {
    Fargate,
    Pipeline,
}

/// Iterator over the project's generated files. See
/// [`CdkProject::source_files`].
pub struct SourceFiles<'a> {
    project: &'a mut CdkProject,
    state: State,
}

impl SourceFiles<'_> {
    fn after_service(&self, index: usize) -> State {
        if index + 1 < self.project.services.len() {
            State::Service {
                index: index + 1,
                stage: Stage::Fargate,
            }
        } else {
            State::App
        }
    }
}

impl Iterator for SourceFiles<'_> {
    type Item = CodegenResult<(PathBuf, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        match std::mem::replace(&mut self.state, State::Done) {
            State::Init => {
                let code = self.project.init_stack();
                let path = PathBuf::from(format!(
                    "{dir}/lib/{dir}-init-stack.ts",
                    dir = self.project.cdk_dir
                ));
                self.state = if self.project.services.is_empty() {
                    State::App
                } else {
                    State::Service {
                        index: 0,
                        stage: Stage::Fargate,
                    }
                };
                Some(Ok((path, code)))
            }
            State::Service { index, stage } => {
                let is_fargate = matches!(stage, Stage::Fargate);
                let (rendered, path_prefix, enable_cicd, packages) = {
                    let Some(svc) = self.project.services.get_mut(index) else {
                        self.state = State::Done;
                        return None;
                    };
                    let rendered = if is_fargate {
                        svc.fargate_stack()
                    } else {
                        svc.pipeline_stack()
                    };
                    let packages: Vec<String> = svc.packages().iter().cloned().collect();
                    (
                        rendered,
                        svc.path_prefix().to_string(),
                        svc.enable_cicd(),
                        packages,
                    )
                };
                match rendered {
                    Ok(code) => {
                        self.project.packages.extend(packages);
                        let kind = if is_fargate { "fargate" } else { "pipeline" };
                        self.state = if is_fargate && enable_cicd {
                            State::Service {
                                index,
                                stage: Stage::Pipeline,
                            }
                        } else {
                            self.after_service(index)
                        };
                        Some(Ok((self.project.lib_path(&path_prefix, kind), code)))
                    }
                    Err(err) => {
                        self.state = State::Done;
                        Some(Err(err))
                    }
                }
            }
            State::App => {
                let code = self.project.app();
                let path = PathBuf::from(format!(
                    "{dir}/bin/{dir}.ts",
                    dir = self.project.cdk_dir
                ));
                self.state = State::Done;
                Some(Ok((path, code)))
            }
            State::Done => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(yaml: &str, cdk_dir: Option<&str>) -> CdkProject {
        let raw: RawConfig = serde_yaml::from_str(yaml).unwrap();
        CdkProject::new(
            raw,
            cdk_dir.map(str::to_string),
            Path::new("/work/railsup.yml"),
        )
        .unwrap()
    }

    const TWO_SERVICES: &str = r#"
services:
  rails_foo:
    source_path: ./rails_foo
    enable_cicd: true
    db_cluster:
      engine: aurora-postgresql
      db_name: app
  rails_no_db:
    source_path: ./no_db
"#;

    #[test]
    fn test_default_paths() {
        let project = project("services:", None);
        assert_eq!(project.cdk_dir(), "cdk-sample");
        assert_eq!(project.stack_prefix(), "CdkSample");
        assert_eq!(
            project.default_stack(),
            PathBuf::from("cdk-sample/lib/cdk-sample-stack.ts")
        );
        assert_eq!(
            project.default_test(),
            PathBuf::from("cdk-sample/test/cdk-sample.test.ts")
        );
    }

    #[test]
    fn test_source_files_order() {
        let mut project = project(TWO_SERVICES, None);
        let files: Vec<PathBuf> = project
            .source_files()
            .map(|entry| entry.unwrap().0)
            .collect();
        assert_eq!(
            files,
            vec![
                PathBuf::from("cdk-sample/lib/cdk-sample-init-stack.ts"),
                PathBuf::from("cdk-sample/lib/rails-foo-fargate-stack.ts"),
                PathBuf::from("cdk-sample/lib/rails-foo-pipeline-stack.ts"),
                PathBuf::from("cdk-sample/lib/rails-no-db-fargate-stack.ts"),
                PathBuf::from("cdk-sample/bin/cdk-sample.ts"),
            ]
        );
    }

    #[test]
    fn test_packages_accumulate_lazily() {
        let mut project = project(TWO_SERVICES, None);
        {
            let mut files = project.source_files();
            files.next().unwrap().unwrap();
        }
        // only the init stack has been consumed
        assert_eq!(
            project.packages().iter().cloned().collect::<Vec<_>>(),
            vec!["@aws-cdk/aws-ec2", "@aws-cdk/aws-ecs"]
        );

        for entry in project.source_files() {
            entry.unwrap();
        }
        let packages = project.packages();
        assert!(packages.contains("@aws-cdk/aws-secretsmanager"));
        assert!(packages.contains("@aws-cdk/aws-codepipeline-actions"));
        assert!(packages.contains("@aws-cdk/aws-ecs-patterns"));
    }

    #[test]
    fn test_error_fuses_iterator() {
        // second service misses required db_name
        let yaml = r#"
services:
  bad:
    source_path: ./bad
    db_cluster:
      engine: aurora
"#;
        let mut project = project(yaml, None);
        let mut files = project.source_files();
        files.next().unwrap().unwrap();
        assert!(files.next().unwrap().is_err());
        assert!(files.next().is_none());
    }

    #[test]
    fn test_custom_cdk_dir_drives_naming() {
        let mut project = project("services:", Some("my-infra"));
        assert_eq!(project.stack_prefix(), "MyInfra");
        let files: Vec<PathBuf> = project
            .source_files()
            .map(|entry| entry.unwrap().0)
            .collect();
        assert_eq!(
            files,
            vec![
                PathBuf::from("my-infra/lib/my-infra-init-stack.ts"),
                PathBuf::from("my-infra/bin/my-infra.ts"),
            ]
        );
    }
}
