//! Fargate stack view: ECR image asset, optional Aurora cluster with its
//! secret and parameter group, the load-balanced Fargate service and its
//! scaling policies.

use std::path::PathBuf;

use railsup_config::{
    DbCluster, Fargate, Metric, RequestScaling, Scaling, ScheduleScaling, StepScaling,
    TrackingScaling, UtilizationScaling,
};

use super::{import_lines, quoted_pairs, to_pkgs};

/// Renders `<path-prefix>-fargate-stack.ts`.
pub struct FargateStackView {
    stack_prefix: String,
    source_path: PathBuf,
    fargate: Fargate,
    db_cluster: Option<DbCluster>,
    scaling: Option<Scaling>,
}

impl FargateStackView {
    pub fn new(
        stack_prefix: String,
        source_path: PathBuf,
        fargate: Fargate,
        db_cluster: Option<DbCluster>,
        scaling: Option<Scaling>,
    ) -> Self {
        Self {
            stack_prefix,
            source_path,
            fargate,
            db_cluster,
            scaling,
        }
    }

    fn services(&self) -> Vec<&'static str> {
        let mut services = vec!["ec2", "ecs", "ecs-patterns", "ecr-assets", "rds"];
        if self.fargate.certificate.is_some() {
            services.push("certificatemanager");
        }
        if self.scaling.as_ref().is_some_and(Scaling::uses_metrics) {
            services.push("cloudwatch");
        }
        if let Some(db) = &self.db_cluster {
            services.push("secretsmanager");
            if db.kms_key_arn.is_some() {
                services.push("kms");
            }
        }
        services
    }

    pub fn packages(&self) -> Vec<String> {
        to_pkgs(self.services())
    }

    // The import list is wider than the package list: the ECR module ships
    // with the ECS install and the application-autoscaling module with the
    // ECS patterns install, so both are imported without their own package.
    fn imports(&self) -> Vec<(&'static str, &'static str)> {
        let mut imports = vec![("ec2", "ec2"), ("ecs", "ecs")];
        if self.db_cluster.is_none() {
            imports.push(("ecr", "ecr"));
        }
        imports.push(("ecs_patterns", "ecs-patterns"));
        imports.push(("ecr_assets", "ecr-assets"));
        imports.push(("rds", "rds"));
        if self.fargate.certificate.is_some() {
            imports.push(("certificatemanager", "certificatemanager"));
        }
        if self.scaling.as_ref().is_some_and(Scaling::uses_metrics) {
            imports.push(("cloudwatch", "cloudwatch"));
        }
        if self
            .scaling
            .as_ref()
            .is_some_and(|s| s.on_metric.is_some() || s.on_schedule.is_some())
        {
            imports.push(("appscaling", "applicationautoscaling"));
        }
        if let Some(db) = &self.db_cluster {
            imports.push(("secretsmanager", "secretsmanager"));
            if db.kms_key_arn.is_some() {
                imports.push(("kms", "kms"));
            }
        }
        imports
    }

    pub fn render(&self) -> String {
        let prefix = &self.stack_prefix;
        let mut code = format!(
            r#"import cdk = require('@aws-cdk/core');
{imports}
interface {prefix}FargateStackProps {{
    vpc: ec2.IVpc,
    cluster: ecs.ICluster,
}}

export class {prefix}FargateStack extends cdk.Stack {{
    public readonly service: ecs.FargateService;
    public readonly repoName: string;
    public readonly dbUrl: string;
    public readonly db: rds.DatabaseCluster;

    constructor(scope: cdk.App, id: string, props: {prefix}FargateStackProps) {{
        super(scope, id);

        // import resources
        const cluster = props.cluster;
"#,
            imports = import_lines(&self.imports()),
        );

        if let Some(db) = &self.db_cluster {
            code.push_str("        const vpc = props.vpc;\n\n");
            code.push_str(&self.db_section(db));
        } else {
            code.push('\n');
        }

        code.push_str(&format!(
            r#"        const asset = new ecr_assets.DockerImageAsset(this, 'ImageAssetBuild', {{
            directory: '{directory}'
        }});

        // compute repo name from asset image
        const parts = asset.imageUri.split("@")[0].split("/");
        const repoName = parts.slice(1, parts.length).join("/").split(":")[0];
        this.repoName = repoName;

"#,
            directory = self.source_path.display(),
        ));

        if self.db_cluster.is_some() {
            code.push_str(
                "        const image = ecs.ContainerImage.fromDockerImageAsset(asset);\n\n",
            );
        } else {
            code.push_str(
                "        const ecrRepo = ecr.Repository.fromRepositoryName(this, 'EcrRepo', repoName);\n\
                 \x20       const image = ecs.ContainerImage.fromEcrRepository(ecrRepo);\n\n",
            );
        }

        code.push_str(&self.service_section());

        if let Some(scaling) = &self.scaling {
            code.push_str(&scaling_section(scaling));
        }

        if self.db_cluster.is_some() {
            code.push_str(
                "        db.connections.allowDefaultPortFrom(lbFargate.service, 'From Fargate');\n\
                 \x20       this.db = db;\n",
            );
        }
        code.push_str("        this.service = lbFargate.service;\n    }\n}\n");
        code
    }

    fn db_section(&self, db: &DbCluster) -> String {
        let parameter_group = if db.parameter_group.cfn {
            format!(
                r#"        // DB cluster ParameterGroup
        const clusterParameterGroup = new rds.ClusterParameterGroup(this, 'DBClusterPG', {{
            family: '{family}',
            description: '{description}',
            parameters: {{
{parameters}            }}
        }});
"#,
                family = db.parameter_group.family,
                description = db.parameter_group.description,
                parameters = quoted_pairs(&db.parameter_group.parameters, "                "),
            )
        } else {
            format!(
                r#"        // Import DB cluster ParameterGroup
        const clusterParameterGroup = rds.ClusterParameterGroup.fromParameterGroupName(
            this, 'DBClusterPG', '{name}');
"#,
                name = db.parameter_group.name.as_deref().unwrap_or_default(),
            )
        };

        let mut props = vec![
            format!(
                "            engine: rds.DatabaseClusterEngine.{}",
                db.engine.as_str()
            ),
        ];
        if let Some(version) = &db.engine_version {
            props.push(format!("            engineVersion: '{version}'"));
        }
        props.push(
            "            masterUser: {\n                username: username,\n                password: password\n            }"
                .to_string(),
        );
        props.push(format!(
            "            instanceProps: {{\n                instanceType: new ec2.InstanceType('{instance_type}'),\n                vpc: vpc,\n                vpcSubnets: {{\n                  subnetType: ec2.SubnetType.{subnet_type}\n                }}\n            }}",
            instance_type = db.instance_type,
            subnet_type = db.instance_subnet.as_str(),
        ));
        props.push(format!(
            "            defaultDatabaseName: '{}'",
            db.db_name
        ));
        props.push(format!(
            "            removalPolicy: cdk.RemovalPolicy.{}",
            db.removal_policy.as_str()
        ));
        props.push(format!("            instances: {}", db.instances));
        if db.port != 3306 {
            props.push(format!("            port: {}", db.port));
        }
        if let Some(identifier) = &db.cluster_identifier {
            props.push(format!("            clusterIdentifier: '{identifier}'"));
        }
        if let Some(identifier) = &db.instance_identifier {
            props.push(format!("            instanceIdentifierBase: '{identifier}'"));
        }
        if let Some(backup) = &db.backup {
            let mut lines = Vec::new();
            if let Some(days) = backup.retention_days {
                lines.push(format!("                retention: cdk.Duration.days({days})"));
            }
            if let Some(window) = &backup.preferred_window {
                lines.push(format!("                preferredWindow: '{window}'"));
            }
            props.push(format!(
                "            backup: {{\n{}\n            }}",
                lines.join(",\n")
            ));
        }
        if let Some(window) = &db.preferred_maintenance_window {
            props.push(format!(
                "            preferredMaintenanceWindow: '{window}'"
            ));
        }
        if let Some(arn) = &db.kms_key_arn {
            props.push(format!(
                "            kmsKey: kms.Key.fromKeyArn(this, 'DBKey', '{arn}')"
            ));
        }
        props.push("            parameterGroup: clusterParameterGroup".to_string());

        let scheme = if db.postgres() {
            "postgres://"
        } else {
            "mysql2://"
        };

        format!(
            r#"        // Create secret from SecretsManager
        const username = '{username}';
        const secret = new secretsmanager.Secret(this, 'Secret', {{
            generateSecretString: {{
                excludePunctuation: true
            }}
        }});
        const password = secret.secretValue;

{parameter_group}        // Create DB Cluster
        const db = new rds.DatabaseCluster(this, 'DBCluster', {{
{props}
        }});
        const dbUrl = "{scheme}" + username + ":" + password + "@" + db.clusterEndpoint.socketAddress + "/{db_name}";
        this.dbUrl = dbUrl;

"#,
            username = db.username,
            props = props.join(",\n"),
            db_name = db.db_name,
        )
    }

    fn service_section(&self) -> String {
        let fargate = &self.fargate;
        let mut props = vec![
            format!("            serviceName: '{}'", fargate.service_name),
            "            cluster: cluster".to_string(),
        ];

        if self.db_cluster.is_some() {
            // DATABASE_URL always leads the container environment
            let mut environment = "                  'DATABASE_URL': dbUrl,\n".to_string();
            environment.push_str(&quoted_pairs(&fargate.envs, "                  "));
            props.push(format!(
                "            taskImageOptions: {{\n              image: image,\n              containerName: '{name}',\n              containerPort: {port},\n              environment: {{\n{environment}              }},\n              enableLogging: true,\n            }}",
                name = fargate.container_name,
                port = fargate.container_port,
            ));
            props.push(format!("            memoryLimitMiB: {}", fargate.memory));
            props.push(format!("            cpu: {}", fargate.cpu));
            props.push(format!("            desiredCount: {}", fargate.desired_count));
            self.push_domain_props(&mut props);
            props.push(format!(
                "            publicLoadBalancer: {}",
                fargate.public
            ));
            if fargate.public {
                props.push("            assignPublicIp: true".to_string());
            }

            format!(
                "        // Fargate service\n        const lbFargate = new ecs_patterns.ApplicationLoadBalancedFargateService(this, 'LBFargate', {{\n{}\n        }});\n",
                props.join(",\n")
            )
        } else {
            props.push("            image: image".to_string());
            props.push(format!(
                "            containerName: '{}'",
                fargate.container_name
            ));
            props.push(format!(
                "            containerPort: {}",
                fargate.container_port
            ));
            props.push(format!("            memoryLimitMiB: {}", fargate.memory));
            props.push(format!("            cpu: {}", fargate.cpu));
            if !fargate.envs.is_empty() {
                props.push(format!(
                    "            environment: {{\n{}            }}",
                    quoted_pairs(&fargate.envs, "                ")
                ));
            }
            props.push("            enableLogging: true".to_string());
            props.push(format!("            desiredCount: {}", fargate.desired_count));
            self.push_domain_props(&mut props);
            props.push(format!(
                "            publicLoadBalancer: {}",
                fargate.public
            ));
            if fargate.public {
                props.push("            publicTasks: true".to_string());
            }

            format!(
                "        // Fargate service\n        const lbFargate = new ecs_patterns.LoadBalancedFargateService(this, 'LBFargate', {{\n{}\n        }});\n",
                props.join(",\n")
            )
        }
    }

    fn push_domain_props(&self, props: &mut Vec<String>) {
        if let Some(domain) = &self.fargate.domain_name {
            props.push(format!("            domainName: '{domain}'"));
        }
        if let Some(zone) = &self.fargate.domain_zone {
            props.push(format!("            domainZone: '{zone}'"));
        }
        if let Some(arn) = &self.fargate.certificate {
            props.push(format!(
                "            certificate: certificatemanager.Certificate.fromCertificateArn(this, 'LBCertificate', '{arn}')"
            ));
        }
    }
}

fn scaling_section(scaling: &Scaling) -> String {
    let mut target_props = vec![format!("            maxCapacity: {}", scaling.max_capacity)];
    if let Some(min) = scaling.min_capacity {
        target_props.push(format!("            minCapacity: {min}"));
    }

    let mut code = format!(
        "        // Service scaling setting\n        const scalableTarget = lbFargate.service.autoScaleTaskCount({{\n{}\n        }});\n",
        target_props.join(",\n")
    );

    if let Some(on_cpu) = &scaling.on_cpu {
        code.push_str(&utilization_policy(
            "scaleOnCpuUtilization",
            "CpuScaling",
            on_cpu,
        ));
    }
    if let Some(on_memory) = &scaling.on_memory {
        code.push_str(&utilization_policy(
            "scaleOnMemoryUtilization",
            "MemoryScaling",
            on_memory,
        ));
    }
    if let Some(on_request) = &scaling.on_request {
        code.push_str(&request_policy(on_request));
    }
    if let Some(on_metric) = &scaling.on_metric {
        code.push_str(&step_policy(on_metric));
    }
    if let Some(on_custom_metric) = &scaling.on_custom_metric {
        code.push_str(&tracking_policy(on_custom_metric));
    }
    if let Some(on_schedule) = &scaling.on_schedule {
        code.push_str(&schedule_policy(on_schedule));
    }
    code.push('\n');
    code
}

fn policy_call(method: &str, id: &str, props: Vec<String>) -> String {
    format!(
        "        scalableTarget.{method}('{id}', {{\n{}\n        }});\n",
        props.join(",\n")
    )
}

fn utilization_policy(method: &str, id: &str, policy: &UtilizationScaling) -> String {
    let mut props = Vec::new();
    if let Some(percent) = policy.target_util_percent {
        props.push(format!("            targetUtilizationPercent: {percent}"));
    }
    push_tracking_common(
        &mut props,
        policy.disable_scale_in,
        policy.scale_in_cooldown,
        policy.scale_out_cooldown,
    );
    policy_call(method, id, props)
}

fn request_policy(policy: &RequestScaling) -> String {
    let mut props = Vec::new();
    if let Some(requests) = policy.requests_per_target {
        props.push(format!("            requestsPerTarget: {requests}"));
    }
    props.push("            targetGroup: lbFargate.targetGroup".to_string());
    push_tracking_common(
        &mut props,
        policy.disable_scale_in,
        policy.scale_in_cooldown,
        policy.scale_out_cooldown,
    );
    policy_call("scaleOnRequestCount", "RequestScaling", props)
}

fn step_policy(policy: &StepScaling) -> String {
    let mut props = vec![format!(
        "            metric: new cloudwatch.Metric({{\n{}\n            }})",
        metric_props(&policy.metric).join(",\n")
    )];
    if !policy.scaling_steps.is_empty() {
        let steps: String = policy
            .scaling_steps
            .iter()
            .map(|step| {
                let mut fields = Vec::new();
                if let Some(change) = step.change {
                    fields.push(format!("change: {change}"));
                }
                if let Some(lower) = step.lower {
                    fields.push(format!("lower: {lower}"));
                }
                if let Some(upper) = step.upper {
                    fields.push(format!("upper: {upper}"));
                }
                format!("                {{ {} }},\n", fields.join(", "))
            })
            .collect();
        props.push(format!(
            "            scalingSteps: [\n{steps}            ]"
        ));
    }
    if let Some(adjustment_type) = policy.adjustment_type {
        props.push(format!(
            "            adjustmentType: appscaling.AdjustmentType.{}",
            adjustment_type.as_str()
        ));
    }
    if let Some(magnitude) = policy.min_adjustment_magnitude {
        props.push(format!("            minAdjustmentMagnitude: {magnitude}"));
    }
    if let Some(cooldown) = policy.cooldown {
        props.push(format!(
            "            cooldown: cdk.Duration.seconds({cooldown})"
        ));
    }
    policy_call("scaleOnMetric", "MetricScaling", props)
}

fn tracking_policy(policy: &TrackingScaling) -> String {
    let mut props = vec![format!(
        "            metric: new cloudwatch.Metric({{\n{}\n            }})",
        metric_props(&policy.metric).join(",\n")
    )];
    if let Some(target) = policy.target_value {
        props.push(format!("            targetValue: {target}"));
    }
    push_tracking_common(
        &mut props,
        policy.disable_scale_in,
        policy.scale_in_cooldown,
        policy.scale_out_cooldown,
    );
    policy_call("scaleToTrackCustomMetric", "CustomMetricScaling", props)
}

fn schedule_policy(policy: &ScheduleScaling) -> String {
    let mut props = vec![format!(
        "            schedule: appscaling.Schedule.expression('{}')",
        policy.schedule
    )];
    if let Some(max) = policy.max_capacity {
        props.push(format!("            maxCapacity: {max}"));
    }
    if let Some(min) = policy.min_capacity {
        props.push(format!("            minCapacity: {min}"));
    }
    if let Some(start) = policy.start_time {
        props.push(format!("            startTime: new Date({start})"));
    }
    if let Some(end) = policy.end_time {
        props.push(format!("            endTime: new Date({end})"));
    }
    policy_call("scaleOnSchedule", "ScheduleScaling", props)
}

fn push_tracking_common(
    props: &mut Vec<String>,
    disable_scale_in: bool,
    scale_in_cooldown: Option<u32>,
    scale_out_cooldown: Option<u32>,
) {
    if disable_scale_in {
        props.push("            disableScaleIn: true".to_string());
    }
    if let Some(cooldown) = scale_in_cooldown {
        props.push(format!(
            "            scaleInCooldown: cdk.Duration.seconds({cooldown})"
        ));
    }
    if let Some(cooldown) = scale_out_cooldown {
        props.push(format!(
            "            scaleOutCooldown: cdk.Duration.seconds({cooldown})"
        ));
    }
}

fn metric_props(metric: &Metric) -> Vec<String> {
    let mut props = vec![
        format!("                metricName: '{}'", metric.name),
        format!("                namespace: '{}'", metric.namespace),
    ];
    if let Some(color) = &metric.color {
        props.push(format!("                color: '{color}'"));
    }
    if let Some(label) = &metric.label {
        props.push(format!("                label: '{label}'"));
    }
    if let Some(period) = metric.period {
        props.push(format!(
            "                period: cdk.Duration.seconds({period})"
        ));
    }
    if let Some(statistic) = &metric.statistic {
        props.push(format!("                statistic: '{statistic}'"));
    }
    if let Some(unit) = &metric.unit {
        props.push(format!("                unit: '{unit}'"));
    }
    if !metric.dimensions.is_empty() {
        props.push(format!(
            "                dimensions: {{\n{}                }}",
            quoted_pairs(&metric.dimensions, "                    ")
        ));
    }
    props
}
