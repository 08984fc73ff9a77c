//! CodeBuild project configuration for the CI/CD pipeline.

use crate::raw::RawCodeBuild;

/// One CodeBuild project in the pipeline, either the image build or the
/// database migration run.
///
/// The two constructors differ only in their defaults; the migration
/// project runs inside the private subnet and uses a plain standard image
/// while the build project needs Docker available.
#[derive(Debug, Clone)]
pub struct CodeBuildProject {
    pub project_name: String,
    pub description: String,
    pub buildspec: String,
    pub build_image: String,
    pub timeout: Option<u32>,
}

impl CodeBuildProject {
    /// Image build project: builds, tags and pushes the app image to ECR.
    pub fn build(raw: Option<RawCodeBuild>, default_name: &str) -> Self {
        Self::from_raw(
            raw,
            default_name,
            "build, tag and push image to ECR",
            "buildspec-ecr.yml",
            "ubuntu_14_04_docker_18_09_0",
        )
    }

    /// DB migration project: runs `rails db:migrate` against the cluster.
    pub fn migration(raw: Option<RawCodeBuild>, default_name: &str) -> Self {
        Self::from_raw(
            raw,
            default_name,
            "running DB Migration for the rails app inside private subnet",
            "buildspec-db.yml",
            "standard_1_0",
        )
    }

    fn from_raw(
        raw: Option<RawCodeBuild>,
        default_name: &str,
        default_description: &str,
        default_buildspec: &str,
        default_image: &str,
    ) -> Self {
        let raw = raw.unwrap_or_default();
        Self {
            project_name: raw.project_name.unwrap_or_else(|| default_name.to_string()),
            description: raw
                .description
                .unwrap_or_else(|| default_description.to_string()),
            buildspec: raw.buildspec.unwrap_or_else(|| default_buildspec.to_string()),
            build_image: raw
                .build_image
                .unwrap_or_else(|| default_image.to_string())
                .to_ascii_uppercase(),
            timeout: raw.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_defaults() {
        let project = CodeBuildProject::build(None, "RailsFooImageBuild");
        assert_eq!(project.project_name, "RailsFooImageBuild");
        assert_eq!(project.description, "build, tag and push image to ECR");
        assert_eq!(project.buildspec, "buildspec-ecr.yml");
        assert_eq!(project.build_image, "UBUNTU_14_04_DOCKER_18_09_0");
        assert!(project.timeout.is_none());
    }

    #[test]
    fn test_migration_defaults() {
        let project = CodeBuildProject::migration(None, "RailsFooDBMigration");
        assert_eq!(project.project_name, "RailsFooDBMigration");
        assert_eq!(
            project.description,
            "running DB Migration for the rails app inside private subnet"
        );
        assert_eq!(project.buildspec, "buildspec-db.yml");
        assert_eq!(project.build_image, "STANDARD_1_0");
    }

    #[test]
    fn test_configured_fields_override_defaults() {
        let raw: RawCodeBuild = serde_yaml::from_str(
            r#"
project_name: CustomBuild
buildspec: custom-spec.yml
build_image: standard_2_0
timeout: 30
"#,
        )
        .unwrap();
        let project = CodeBuildProject::build(Some(raw), "Ignored");
        assert_eq!(project.project_name, "CustomBuild");
        assert_eq!(project.buildspec, "custom-spec.yml");
        assert_eq!(project.build_image, "STANDARD_2_0");
        assert_eq!(project.timeout, Some(30));
    }

    #[test]
    fn test_build_image_is_upcased() {
        let raw = RawCodeBuild {
            build_image: Some("ubuntu_14_04_ruby_2_5_3".to_string()),
            ..Default::default()
        };
        let project = CodeBuildProject::migration(Some(raw), "M");
        assert_eq!(project.build_image, "UBUNTU_14_04_RUBY_2_5_3");
    }
}
