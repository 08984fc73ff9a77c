//! Init stack view: shared VPC and Fargate cluster.

use railsup_config::{SubnetSelection, Vpc};

use super::{import_lines, to_pkgs};

/// Renders `<dir>-init-stack.ts`.
pub struct InitStackView {
    stack_prefix: String,
    vpc: Vpc,
}

impl InitStackView {
    pub fn new(stack_prefix: String, vpc: Vpc) -> Self {
        Self { stack_prefix, vpc }
    }

    pub fn packages(&self) -> Vec<String> {
        to_pkgs(["ec2", "ecs"])
    }

    pub fn render(&self) -> String {
        let vpc = &self.vpc;

        let subnets: String = vpc
            .subnets
            .iter()
            .map(|subnet| {
                format!(
                    r#"                {{
                  cidrMask: {cidr_mask},
                  name: '{name}',
                  subnetType: ec2.SubnetType.{subnet_type}
                }},
"#,
                    cidr_mask = subnet.cidr_mask,
                    name = subnet.name,
                    subnet_type = subnet.subnet_type.as_str(),
                )
            })
            .collect();

        // a selection with neither name nor type would render an empty block
        let nat_gateway_subnets = vpc
            .nat_gateway_subnets
            .as_ref()
            .map(subnet_selection)
            .filter(|selection| !selection.is_empty())
            .map(|selection| {
                format!(
                    "            natGatewaySubnets: {{\n                {selection}\n            }},\n"
                )
            })
            .unwrap_or_default();

        format!(
            r#"import cdk = require('@aws-cdk/core');
{imports}
export class {prefix}InitStack extends cdk.Stack {{
    public readonly vpc: ec2.IVpc;
    public readonly cluster: ecs.ICluster;

    constructor(scope: cdk.App, id: string, props?: cdk.StackProps) {{
        super(scope, id, props);

        // Setting up VPC with subnets
        const vpc = new ec2.Vpc(this, 'Vpc', {{
            maxAzs: {max_azs},
            cidr: '{cidr}',
            enableDnsSupport: {enable_dns},
            natGateways: {nat_gateways},
{nat_gateway_subnets}            subnetConfiguration: [
{subnets}            ]
        }});
        this.vpc = vpc;

        this.cluster = new ecs.Cluster(this, 'FargateCluster', {{
            vpc: vpc
        }});

    }}
}}
"#,
            imports = import_lines(&[("ec2", "ec2"), ("ecs", "ecs")]),
            prefix = self.stack_prefix,
            max_azs = vpc.max_azs,
            cidr = vpc.cidr,
            enable_dns = vpc.enable_dns,
            nat_gateways = vpc.nat_gateways,
        )
    }
}

fn subnet_selection(selection: &SubnetSelection) -> String {
    match (&selection.name, &selection.subnet_type) {
        (Some(name), _) => format!("subnetName: '{name}'"),
        (None, Some(subnet_type)) => {
            format!("subnetType: ec2.SubnetType.{}", subnet_type.as_str())
        }
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use railsup_config::RawVpc;

    fn view(yaml: &str) -> InitStackView {
        let raw: RawVpc = serde_yaml::from_str(yaml).unwrap();
        InitStackView::new("CdkSample".to_string(), Vpc::from_raw(Some(raw)).unwrap())
    }

    #[test]
    fn test_packages() {
        assert_eq!(
            view("max_azs: 2").packages(),
            vec!["@aws-cdk/aws-ec2", "@aws-cdk/aws-ecs"]
        );
    }

    #[test]
    fn test_render_default_subnets() {
        let code = view("max_azs: 2").render();
        assert!(code.contains("export class CdkSampleInitStack extends cdk.Stack {"));
        assert!(code.contains("maxAzs: 2,"));
        assert!(code.contains("natGateways: 2,"));
        assert!(code.contains("cidr: '10.0.0.0/21',"));
        assert!(code.contains("name: 'application',"));
        assert!(code.contains("subnetType: ec2.SubnetType.PRIVATE"));
        assert!(code.contains("new ecs.Cluster(this, 'FargateCluster'"));
        assert!(!code.contains("natGatewaySubnets"));
    }

    #[test]
    fn test_render_nat_gateway_subnets_by_name() {
        let code = view("nat_gateway_subnets:\n  name: ingress").render();
        assert!(code.contains("natGatewaySubnets: {"));
        assert!(code.contains("subnetName: 'ingress'"));
    }

    #[test]
    fn test_empty_nat_gateway_selection_renders_nothing() {
        let code = view("nat_gateway_subnets: {}").render();
        assert!(!code.contains("natGatewaySubnets"));
    }
}
