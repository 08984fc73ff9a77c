//! TypeScript stack views.
//!
//! Each view holds the compiled configuration a stack needs, reports the
//! npm packages its output references, and renders the stack source with
//! `format!`-composed sections.

mod app;
mod fargate_stack;
mod init_stack;
mod pipeline_stack;

pub use app::{AppView, StackRef};
pub use fargate_stack::FargateStackView;
pub use init_stack::InitStackView;
pub use pipeline_stack::PipelineStackView;

/// npm package names for CDK service modules: `ec2` -> `@aws-cdk/aws-ec2`.
pub(crate) fn to_pkgs<'a>(services: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    services
        .into_iter()
        .map(|svc| format!("@aws-cdk/aws-{svc}"))
        .collect()
}

/// `import <alias> = require('@aws-cdk/aws-<svc>');` lines.
pub(crate) fn import_lines(imports: &[(&str, &str)]) -> String {
    imports
        .iter()
        .map(|(alias, svc)| format!("import {alias} = require('@aws-cdk/aws-{svc}');\n"))
        .collect()
}

/// `'key': 'value',` lines at the given indentation.
pub(crate) fn quoted_pairs(pairs: &[(String, String)], indent: &str) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{indent}'{key}': '{value}',\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pkgs() {
        assert_eq!(
            to_pkgs(["ec2", "ecs-patterns"]),
            vec!["@aws-cdk/aws-ec2", "@aws-cdk/aws-ecs-patterns"]
        );
    }

    #[test]
    fn test_import_lines() {
        assert_eq!(
            import_lines(&[("ecs_patterns", "ecs-patterns")]),
            "import ecs_patterns = require('@aws-cdk/aws-ecs-patterns');\n"
        );
    }

    #[test]
    fn test_quoted_pairs() {
        let pairs = vec![("PORT".to_string(), "80".to_string())];
        assert_eq!(quoted_pairs(&pairs, "    "), "    'PORT': '80',\n");
    }
}
