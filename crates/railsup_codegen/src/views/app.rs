//! App entry point view: `bin/<dir>.ts` instantiating every stack.

/// Stack naming for one service, as the app file needs it.
pub struct StackRef {
    pub name: String,
    pub stack_prefix: String,
    pub path_prefix: String,
    pub const_prefix: String,
    pub enable_cicd: bool,
}

/// Renders `bin/<dir>.ts`.
pub struct AppView {
    stack_prefix: String,
    path_prefix: String,
    stacks: Vec<StackRef>,
}

impl AppView {
    pub fn new(stack_prefix: String, path_prefix: String, stacks: Vec<StackRef>) -> Self {
        Self {
            stack_prefix,
            path_prefix,
            stacks,
        }
    }

    pub fn render(&self) -> String {
        let prefix = &self.stack_prefix;

        let mut imports = format!(
            "import {{ {prefix}InitStack }} from '../lib/{dir}-init-stack';\n",
            dir = self.path_prefix,
        );
        for stack in &self.stacks {
            imports.push_str(&format!(
                "import {{ {sp}FargateStack }} from '../lib/{pp}-fargate-stack';\n",
                sp = stack.stack_prefix,
                pp = stack.path_prefix,
            ));
            if stack.enable_cicd {
                imports.push_str(&format!(
                    "import {{ {sp}PipelineStack }} from '../lib/{pp}-pipeline-stack';\n",
                    sp = stack.stack_prefix,
                    pp = stack.path_prefix,
                ));
            }
        }

        let mut code = format!(
            r#"#!/usr/bin/env node

import cdk = require('@aws-cdk/core');
{imports}
const app = new cdk.App();
const initStack = new {prefix}InitStack(app, '{prefix}InitStack');
"#,
        );

        for stack in &self.stacks {
            code.push_str(&format!(
                r#"
// for service :{name}
const {cp}FargateStack = new {sp}FargateStack(app, '{sp}FargateStack', {{
    vpc: initStack.vpc,
    cluster: initStack.cluster
}});
"#,
                name = stack.name,
                cp = stack.const_prefix,
                sp = stack.stack_prefix,
            ));
            if stack.enable_cicd {
                code.push_str(&format!(
                    r#"
new {sp}PipelineStack(app, '{sp}PipelineStack', {{
    vpc: initStack.vpc,
    dbUrl: {cp}FargateStack.dbUrl,
    db: {cp}FargateStack.db,
    repoName: {cp}FargateStack.repoName,
    service: {cp}FargateStack.service
}});
"#,
                    cp = stack.const_prefix,
                    sp = stack.stack_prefix,
                ));
            }
        }

        code.push_str("\napp.synth();\n");
        code
    }
}
