//! Pipeline stack view: CodeCommit source, CodeBuild image build, optional
//! DB migration run and ECS deploy, chained into a CodePipeline.

use std::path::Path;

use railsup_config::{CodeBuildProject, RawCicd};

use super::{import_lines, to_pkgs};

const IMPORTS: &[(&str, &str)] = &[
    ("iam", "iam"),
    ("ec2", "ec2"),
    ("ecr", "ecr"),
    ("ecs", "ecs"),
    ("rds", "rds"),
    ("codebuild", "codebuild"),
    ("codecommit", "codecommit"),
    ("codepipeline", "codepipeline"),
    ("pipelineactions", "codepipeline-actions"),
];

/// Renders `<path-prefix>-pipeline-stack.ts`.
pub struct PipelineStackView {
    stack_prefix: String,
    pipeline_name: String,
    source_repo: String,
    source_description: String,
    build: CodeBuildProject,
    migration: Option<CodeBuildProject>,
}

impl PipelineStackView {
    /// `force_skip_migration` is set when the service has no database
    /// cluster; the migration stage is dropped regardless of configuration.
    pub fn new(
        stack_prefix: &str,
        source_path: &Path,
        raw: Option<RawCicd>,
        force_skip_migration: bool,
    ) -> Self {
        let raw = raw.unwrap_or_default();
        let skip_migration = force_skip_migration || raw.skip_migration.unwrap_or(false);

        let migration = if skip_migration {
            None
        } else {
            Some(CodeBuildProject::migration(
                raw.migration,
                &format!("{stack_prefix}DBMigration"),
            ))
        };

        Self {
            pipeline_name: raw
                .pipeline_name
                .unwrap_or_else(|| format!("{stack_prefix}Pipeline")),
            source_repo: raw
                .source_repo
                .unwrap_or_else(|| repo_name(source_path)),
            source_description: raw.source_description.unwrap_or_else(|| {
                format!("created by railsup with AWS CDK for {stack_prefix}")
            }),
            build: CodeBuildProject::build(raw.build, &format!("{stack_prefix}ImageBuild")),
            migration,
            stack_prefix: stack_prefix.to_string(),
        }
    }

    pub fn packages(&self) -> Vec<String> {
        to_pkgs(IMPORTS.iter().map(|(_, svc)| *svc))
    }

    pub fn render(&self) -> String {
        let prefix = &self.stack_prefix;
        let mut code = format!(
            r#"import cdk = require('@aws-cdk/core');
{imports}
interface {prefix}PipelineStackProps {{
    vpc: ec2.IVpc,
    dbUrl: string,
    repoName: string,
    service: ecs.FargateService,
    db: rds.DatabaseCluster
}}

export class {prefix}PipelineStack extends cdk.Stack {{
    constructor(scope: cdk.App, id: string, props: {prefix}PipelineStackProps) {{
        super(scope, id);

        const pipeline = new codepipeline.Pipeline(this, 'FargatePipeline', {{
            pipelineName: '{pipeline_name}',
        }});

        const repo = new codecommit.Repository(this, 'CodeCommitRepo', {{
            repositoryName: '{source_repo}',
            description: '{source_description}'
        }});

        const sourceOutput = new codepipeline.Artifact();
        const sourceStage = pipeline.addStage({{
            stageName: 'Source',
            actions: [
                new pipelineactions.CodeCommitSourceAction({{
                    actionName: 'SourceAction',
                    repository: repo,
                    output: sourceOutput
                }})
            ]
        }});

        const ecrRepo = ecr.Repository.fromRepositoryName(this, 'ImageRepo', props.repoName);

        const role = new iam.Role(this, 'ImageBuildRole', {{
            assumedBy: new iam.ServicePrincipal('codebuild.amazonaws.com')
        }});
        const policy = new iam.PolicyStatement();
        policy.addAllResources();
        policy.addActions(
            "ecr:BatchCheckLayerAvailability",
            "ecr:CompleteLayerUpload",
            "ecr:GetAuthorizationToken",
            "ecr:InitiateLayerUpload",
            "ecr:PutImage",
            "ecr:UploadLayerPart"
        );
        role.addToPolicy(policy);

        const build = new codebuild.PipelineProject(this, 'ImageBuildToECR', {{
            projectName: '{build_name}',
            description: '{build_description}',
            environmentVariables: {{
                'REPO_NAME': {{
                  value: ecrRepo.repositoryName,
                  type: codebuild.BuildEnvironmentVariableType.PLAINTEXT
                }},
                'REPO_PREFIX': {{
                  value: ecrRepo.repositoryUri,
                  type: codebuild.BuildEnvironmentVariableType.PLAINTEXT
                }},
            }},
            environment: {{
                buildImage: codebuild.LinuxBuildImage.{build_image},
                privileged: true
            }},
            buildSpec: codebuild.BuildSpec.fromSourceFilename('{build_buildspec}'),
{build_timeout}            role: role
        }});

        const buildOutput = new codepipeline.Artifact();
        const buildStage = pipeline.addStage({{
            stageName: 'Build',
            placement: {{
                justAfter: sourceStage
            }},
            actions: [
                new pipelineactions.CodeBuildAction({{
                    actionName: 'ImageBuildAction',
                    input: sourceOutput,
                    outputs: [ buildOutput ],
                    project: build
                }})
            ]
        }});

"#,
            imports = import_lines(IMPORTS),
            pipeline_name = self.pipeline_name,
            source_repo = self.source_repo,
            source_description = self.source_description,
            build_name = self.build.project_name,
            build_description = self.build.description,
            build_image = self.build.build_image,
            build_buildspec = self.build.buildspec,
            build_timeout = timeout_line(&self.build),
        );

        let deploy_after = if let Some(migration) = &self.migration {
            code.push_str(&format!(
                r#"        const migration = new codebuild.PipelineProject(this, 'DBMigration', {{
            projectName: '{name}',
            description: '{description}',
            environmentVariables: {{
                'DATABASE_URL': {{
                  value: props.dbUrl,
                  type: codebuild.BuildEnvironmentVariableType.PLAINTEXT
                }}
            }},
            environment:{{
                buildImage: codebuild.LinuxBuildImage.{image}
            }},
            buildSpec: codebuild.BuildSpec.fromSourceFilename('{buildspec}'),
{timeout}            vpc: props.vpc,
            subnetSelection: {{
                subnetType: ec2.SubnetType.PRIVATE
            }}
        }});
        migration.connections.allowToDefaultPort(props.db, 'DB Migration CodeBuild');

        const migrationStage = pipeline.addStage({{
            stageName: 'DBMigration',
            placement: {{
                justAfter: buildStage
            }},
            actions: [
                new pipelineactions.CodeBuildAction({{
                    actionName: 'DBMigrationAction',
                    project: migration,
                    input: sourceOutput
                }})
            ]
        }});

"#,
                name = migration.project_name,
                description = migration.description,
                image = migration.build_image,
                buildspec = migration.buildspec,
                timeout = timeout_line(migration),
            ));
            "migrationStage"
        } else {
            "buildStage"
        };

        code.push_str(&format!(
            r#"        pipeline.addStage({{
            stageName: 'Deploy',
            placement: {{
                justAfter: {deploy_after}
            }},
            actions: [
                new pipelineactions.EcsDeployAction({{
                    actionName: 'FargateDeployAction',
                    service: props.service,
                    input: buildOutput
                }})
            ]
        }});
    }}
}}
"#,
        ));
        code
    }
}

fn timeout_line(project: &CodeBuildProject) -> String {
    project
        .timeout
        .map(|minutes| format!("            timeout: cdk.Duration.minutes({minutes}),\n"))
        .unwrap_or_default()
}

/// Last path component of the service source directory.
fn repo_name(source_path: &Path) -> String {
    source_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "RailsupAppSource".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn cicd(yaml: &str) -> RawCicd {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_defaults_derived_from_stack_prefix() {
        let view = PipelineStackView::new(
            "RailsFoo",
            &PathBuf::from("/work/rails_foo"),
            None,
            false,
        );
        assert_eq!(view.pipeline_name, "RailsFooPipeline");
        assert_eq!(view.source_repo, "rails_foo");
        assert_eq!(
            view.source_description,
            "created by railsup with AWS CDK for RailsFoo"
        );
        assert_eq!(view.build.project_name, "RailsFooImageBuild");
        assert_eq!(
            view.migration.as_ref().unwrap().project_name,
            "RailsFooDBMigration"
        );
    }

    #[test]
    fn test_forced_skip_migration_wins() {
        let view = PipelineStackView::new(
            "RailsNoDb",
            &PathBuf::from("/work/no_db"),
            Some(cicd("skip_migration: false")),
            true,
        );
        assert!(view.migration.is_none());
        let code = view.render();
        assert!(!code.contains("DBMigration"));
        assert!(code.contains("justAfter: buildStage"));
    }

    #[test]
    fn test_packages() {
        let view =
            PipelineStackView::new("App", &PathBuf::from("/work/app"), None, false);
        assert_eq!(
            view.packages(),
            vec![
                "@aws-cdk/aws-iam",
                "@aws-cdk/aws-ec2",
                "@aws-cdk/aws-ecr",
                "@aws-cdk/aws-ecs",
                "@aws-cdk/aws-rds",
                "@aws-cdk/aws-codebuild",
                "@aws-cdk/aws-codecommit",
                "@aws-cdk/aws-codepipeline",
                "@aws-cdk/aws-codepipeline-actions",
            ]
        );
    }

    #[test]
    fn test_render_with_migration() {
        let view = PipelineStackView::new(
            "RailsFoo",
            &PathBuf::from("/work/rails_foo"),
            Some(cicd("pipeline_name: RailsFoo")),
            false,
        );
        let code = view.render();
        assert!(code.contains("export class RailsFooPipelineStack extends cdk.Stack {"));
        assert!(code.contains("pipelineName: 'RailsFoo',"));
        assert!(code.contains("repositoryName: 'rails_foo',"));
        assert!(code.contains("buildImage: codebuild.LinuxBuildImage.UBUNTU_14_04_DOCKER_18_09_0,"));
        assert!(code.contains("buildSpec: codebuild.BuildSpec.fromSourceFilename('buildspec-ecr.yml'),"));
        assert!(code.contains("projectName: 'RailsFooDBMigration',"));
        assert!(code.contains("buildImage: codebuild.LinuxBuildImage.STANDARD_1_0"));
        assert!(code.contains("subnetType: ec2.SubnetType.PRIVATE"));
        assert!(code.contains("justAfter: migrationStage"));
        assert!(code.contains("new pipelineactions.EcsDeployAction({"));
    }

    #[test]
    fn test_render_build_timeout() {
        let view = PipelineStackView::new(
            "App",
            &PathBuf::from("/work/app"),
            Some(cicd("build:\n  timeout: 30")),
            true,
        );
        let code = view.render();
        assert!(code.contains("timeout: cdk.Duration.minutes(30),"));
    }
}
