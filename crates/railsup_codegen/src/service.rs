//! Per-service model: derived naming, raw section hand-off to the stack
//! views, and package accumulation.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use railsup_config::{
    ConfigError, ConfigResult, DbCluster, Fargate, ParameterGroup, RawCicd, RawDbCluster,
    RawFargate, RawScaling, RawService, Scaling,
};

use crate::error::CodegenResult;
use crate::views::{FargateStackView, PipelineStackView};

/// CamelCase of an underscore-separated name: `rails_foo` -> `RailsFoo`.
pub(crate) fn camel_case(name: &str) -> String {
    name.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect()
}

/// Kebab form used in generated file names: `rails_foo` -> `rails-foo`.
pub(crate) fn kebab_case(name: &str) -> String {
    name.to_lowercase().replace('_', "-")
}

/// Lower-cases only the first character: `RailsFoo` -> `railsFoo`.
pub(crate) fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Stack prefix for a cdk directory name: each '-' separated segment gets
/// its first character upper-cased, the rest is left as-is
/// (`cdk-sample` -> `CdkSample`).
pub(crate) fn dir_prefix(dir: &str) -> String {
    dir.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// One configured Rails service and everything derived from its name.
///
/// The raw configuration sections stay unparsed here; the stack views
/// compile them when a stack is rendered. `packages` fills up as a side
/// effect of rendering and is only complete once both render entry points
/// for the service have run.
#[derive(Debug, Clone)]
pub struct Service {
    name: String,
    stack_prefix: String,
    path_prefix: String,
    const_prefix: String,
    enable_cicd: bool,
    source_path: PathBuf,
    fargate: Option<RawFargate>,
    db_cluster: Option<RawDbCluster>,
    scaling: Option<RawScaling>,
    cicd: Option<RawCicd>,
    packages: BTreeSet<String>,
}

impl Service {
    /// Build a service from its configuration entry.
    ///
    /// `config_path` is the `railsup.yml` location; the service source
    /// path resolves relative to its directory.
    pub fn new(name: &str, raw: RawService, config_path: &Path) -> ConfigResult<Self> {
        let source_path = raw.source_path.ok_or(ConfigError::MissingField {
            section: "services",
            field: "source_path",
        })?;

        let config_dir = std::path::absolute(config_path)?
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let stack_prefix = camel_case(name);
        Ok(Self {
            name: name.to_string(),
            path_prefix: kebab_case(name),
            const_prefix: lower_first(&stack_prefix),
            stack_prefix,
            enable_cicd: raw.enable_cicd.unwrap_or(false),
            source_path: config_dir.join(source_path),
            fargate: raw.fargate,
            db_cluster: raw.db_cluster,
            scaling: raw.scaling,
            cicd: raw.cicd,
            packages: BTreeSet::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stack_prefix(&self) -> &str {
        &self.stack_prefix
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    pub fn const_prefix(&self) -> &str {
        &self.const_prefix
    }

    pub fn enable_cicd(&self) -> bool {
        self.enable_cicd
    }

    /// npm packages referenced by the stacks rendered so far.
    pub fn packages(&self) -> &BTreeSet<String> {
        &self.packages
    }

    /// Render the Fargate stack for this service, accumulating its
    /// package requirements.
    pub fn fargate_stack(&mut self) -> CodegenResult<String> {
        let db_cluster = self.db_cluster_model()?;
        let fargate = Fargate::from_raw(
            self.fargate.clone().unwrap_or_default(),
            self.stack_prefix.clone(),
            db_cluster.is_some(),
        );
        let scaling = self
            .scaling
            .clone()
            .map(Scaling::from_raw)
            .transpose()?;

        let view = FargateStackView::new(
            self.stack_prefix.clone(),
            self.source_path.clone(),
            fargate,
            db_cluster,
            scaling,
        );
        self.packages.extend(view.packages());
        Ok(view.render())
    }

    /// Render the pipeline stack for this service, accumulating its
    /// package requirements. Migration is forced off when the service has
    /// no database cluster.
    pub fn pipeline_stack(&mut self) -> CodegenResult<String> {
        let view = PipelineStackView::new(
            &self.stack_prefix,
            &self.source_path,
            self.cicd.clone(),
            self.db_cluster.is_none(),
        );
        self.packages.extend(view.packages());
        Ok(view.render())
    }

    /// The default parameter group generated code will reference, when the
    /// service uses one that is not rendered inline. It must exist before
    /// the stack can deploy.
    pub fn pending_parameter_group(&self) -> ConfigResult<Option<ParameterGroup>> {
        Ok(self
            .db_cluster_model()?
            .map(|db| db.parameter_group)
            .filter(|group| !group.cfn))
    }

    fn db_cluster_model(&self) -> ConfigResult<Option<DbCluster>> {
        let Some(mut raw) = self.db_cluster.clone() else {
            return Ok(None);
        };
        if raw.username.is_none() {
            raw.username = Some(format!("{}DBAdminUser", self.stack_prefix));
        }
        DbCluster::from_raw(raw).map(Some)
    }
}

/// Insertion-ordered collection of configured services.
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: Vec<Service>,
}

impl ServiceRegistry {
    pub fn from_raw(
        raw: Option<Vec<(String, RawService)>>,
        config_path: &Path,
    ) -> ConfigResult<Self> {
        let services = raw
            .unwrap_or_default()
            .into_iter()
            .map(|(name, service)| Service::new(&name, service, config_path))
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(Self { services })
    }

    pub fn get(&self, name: &str) -> ConfigResult<&Service> {
        self.services
            .iter()
            .find(|svc| svc.name == name)
            .ok_or_else(|| ConfigError::UnknownService(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Service> {
        self.services.iter()
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Service> {
        self.services.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
