//! Default DB cluster parameter groups.
//!
//! Generated stacks reference a default parameter group by name when no
//! inline parameters are configured. That group lives outside the stack, so
//! it is created against RDS as an explicit step before deploy; a group
//! that already exists counts as success.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use tracing::{debug, info};

use crate::error::{CodegenError, CodegenResult};
use crate::project::CdkProject;

/// Where default parameter groups are ensured to exist.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParameterGroupStore: Send + Sync {
    async fn ensure_group(
        &self,
        name: &str,
        family: &str,
        description: &str,
    ) -> CodegenResult<()>;
}

/// RDS-backed store.
pub struct RdsParameterGroupStore {
    client: aws_sdk_rds::Client,
}

impl RdsParameterGroupStore {
    /// Load AWS configuration from the environment, optionally pinned to a
    /// shared-config profile.
    pub async fn from_env(profile: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;
        Self {
            client: aws_sdk_rds::Client::new(&config),
        }
    }

    pub fn new(client: aws_sdk_rds::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ParameterGroupStore for RdsParameterGroupStore {
    async fn ensure_group(
        &self,
        name: &str,
        family: &str,
        description: &str,
    ) -> CodegenResult<()> {
        let result = self
            .client
            .create_db_cluster_parameter_group()
            .db_cluster_parameter_group_name(name)
            .db_parameter_group_family(family)
            .description(description)
            .send()
            .await;

        match result {
            Ok(_) => {
                info!("created db cluster parameter group {name}");
                Ok(())
            }
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_db_parameter_group_already_exists_fault()) =>
            {
                debug!("db cluster parameter group {name} already exists");
                Ok(())
            }
            Err(err) => Err(CodegenError::ParameterGroup {
                name: name.to_string(),
                source: Box::new(err),
            }),
        }
    }
}

/// Ensure the default parameter group for every service that references
/// one. Services rendering their group inline are skipped.
pub async fn ensure_parameter_groups(
    project: &CdkProject,
    store: &dyn ParameterGroupStore,
) -> CodegenResult<()> {
    for svc in project.services().iter() {
        if let Some(group) = svc.pending_parameter_group()? {
            let name = group.name.as_deref().unwrap_or_default();
            store
                .ensure_group(name, &group.family, &group.description)
                .await?;
        }
    }
    Ok(())
}
