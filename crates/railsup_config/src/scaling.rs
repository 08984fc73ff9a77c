//! Autoscaling configuration for Fargate services.
//!
//! Each scaling slot is an explicit variant type with its own named
//! fields, built by a dedicated constructor: utilization tracking for CPU
//! and memory, request-count tracking, step scaling on a CloudWatch
//! metric, target tracking on a custom metric, and scheduled scaling.
//! A slot that is absent from configuration stays `None`, which means no
//! policy of that kind.

use crate::error::{ConfigError, ConfigResult};
use crate::raw::{
    RawBaseScaling, RawMetric, RawScaling, RawScalingStep, RawScheduleScaling, RawStepScaling,
    RawTrackingScaling,
};
use crate::validate::AdjustmentType;

/// Validated `scaling` section.
#[derive(Debug, Clone)]
pub struct Scaling {
    pub max_capacity: u32,
    pub min_capacity: Option<u32>,
    pub on_cpu: Option<UtilizationScaling>,
    pub on_memory: Option<UtilizationScaling>,
    pub on_request: Option<RequestScaling>,
    pub on_metric: Option<StepScaling>,
    pub on_custom_metric: Option<TrackingScaling>,
    pub on_schedule: Option<ScheduleScaling>,
}

impl Scaling {
    pub fn from_raw(raw: RawScaling) -> ConfigResult<Self> {
        let max_capacity = raw.max_capacity.ok_or(ConfigError::MissingField {
            section: "scaling",
            field: "max_capacity",
        })?;

        Ok(Self {
            max_capacity,
            min_capacity: raw.min_capacity,
            on_cpu: raw.on_cpu.map(UtilizationScaling::from_raw),
            on_memory: raw.on_memory.map(UtilizationScaling::from_raw),
            on_request: raw.on_request.map(RequestScaling::from_raw),
            on_metric: raw.on_metric.map(StepScaling::from_raw).transpose()?,
            on_custom_metric: raw
                .on_custom_metric
                .map(TrackingScaling::from_raw)
                .transpose()?,
            on_schedule: raw
                .on_schedule
                .map(ScheduleScaling::from_raw)
                .transpose()?,
        })
    }

    /// Whether any policy needs the CloudWatch metric package.
    pub fn uses_metrics(&self) -> bool {
        self.on_metric.is_some() || self.on_custom_metric.is_some()
    }
}

/// Target tracking on average CPU or memory utilization.
#[derive(Debug, Clone)]
pub struct UtilizationScaling {
    pub target_util_percent: Option<u32>,
    pub disable_scale_in: bool,
    pub scale_in_cooldown: Option<u32>,
    pub scale_out_cooldown: Option<u32>,
}

impl UtilizationScaling {
    pub fn from_raw(raw: RawBaseScaling) -> Self {
        Self {
            target_util_percent: raw.target_util_percent,
            disable_scale_in: raw.disable_scale_in.unwrap_or(false),
            scale_in_cooldown: raw.scale_in_cooldown,
            scale_out_cooldown: raw.scale_out_cooldown,
        }
    }
}

/// Target tracking on ALB requests per target.
#[derive(Debug, Clone)]
pub struct RequestScaling {
    pub requests_per_target: Option<u32>,
    pub disable_scale_in: bool,
    pub scale_in_cooldown: Option<u32>,
    pub scale_out_cooldown: Option<u32>,
}

impl RequestScaling {
    pub fn from_raw(raw: RawBaseScaling) -> Self {
        Self {
            requests_per_target: raw.requests_per_target,
            disable_scale_in: raw.disable_scale_in.unwrap_or(false),
            scale_in_cooldown: raw.scale_in_cooldown,
            scale_out_cooldown: raw.scale_out_cooldown,
        }
    }
}

/// Step scaling driven by a CloudWatch metric.
#[derive(Debug, Clone)]
pub struct StepScaling {
    pub metric: Metric,
    pub scaling_steps: Vec<ScalingStep>,
    pub cooldown: Option<u32>,
    pub adjustment_type: Option<AdjustmentType>,
    pub min_adjustment_magnitude: Option<u32>,
}

impl StepScaling {
    pub fn from_raw(raw: RawStepScaling) -> ConfigResult<Self> {
        let metric = raw
            .metric
            .ok_or(ConfigError::MissingField {
                section: "scaling.on_metric",
                field: "metric",
            })
            .and_then(Metric::from_raw)?;

        let adjustment_type = raw
            .adjustment_type
            .as_deref()
            .map(AdjustmentType::parse)
            .transpose()?;
        // only meaningful for percentage adjustments
        let min_adjustment_magnitude = if adjustment_type
            == Some(AdjustmentType::PercentChangeInCapacity)
        {
            raw.min_adjustment_magnitude
        } else {
            None
        };

        Ok(Self {
            metric,
            scaling_steps: raw
                .scaling_steps
                .unwrap_or_default()
                .into_iter()
                .map(ScalingStep::from_raw)
                .collect(),
            cooldown: raw.cooldown,
            adjustment_type,
            min_adjustment_magnitude,
        })
    }
}

/// Target tracking on a custom metric.
#[derive(Debug, Clone)]
pub struct TrackingScaling {
    pub metric: Metric,
    pub target_value: Option<u32>,
    pub disable_scale_in: bool,
    pub scale_in_cooldown: Option<u32>,
    pub scale_out_cooldown: Option<u32>,
}

impl TrackingScaling {
    pub fn from_raw(raw: RawTrackingScaling) -> ConfigResult<Self> {
        let metric = raw
            .metric
            .ok_or(ConfigError::MissingField {
                section: "scaling.on_custom_metric",
                field: "metric",
            })
            .and_then(Metric::from_raw)?;

        Ok(Self {
            metric,
            target_value: raw.target_value,
            disable_scale_in: raw.disable_scale_in.unwrap_or(false),
            scale_in_cooldown: raw.scale_in_cooldown,
            scale_out_cooldown: raw.scale_out_cooldown,
        })
    }
}

/// Time-based scaling.
#[derive(Debug, Clone)]
pub struct ScheduleScaling {
    pub schedule: String,
    pub max_capacity: Option<u32>,
    pub min_capacity: Option<u32>,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
}

impl ScheduleScaling {
    pub fn from_raw(raw: RawScheduleScaling) -> ConfigResult<Self> {
        let schedule = raw.schedule.ok_or(ConfigError::MissingField {
            section: "scaling.on_schedule",
            field: "schedule",
        })?;

        Ok(Self {
            schedule,
            max_capacity: raw.max_capacity,
            min_capacity: raw.min_capacity,
            start_time: raw.start_time,
            end_time: raw.end_time,
        })
    }
}

/// One interval of a step-scaling policy.
#[derive(Debug, Clone)]
pub struct ScalingStep {
    pub change: Option<i64>,
    pub lower: Option<u64>,
    pub upper: Option<u64>,
}

impl ScalingStep {
    fn from_raw(raw: RawScalingStep) -> Self {
        Self {
            change: raw.change,
            lower: raw.lower,
            upper: raw.upper,
        }
    }
}

/// CloudWatch metric referenced by a scaling policy.
#[derive(Debug, Clone)]
pub struct Metric {
    pub name: String,
    pub namespace: String,
    pub color: Option<String>,
    pub label: Option<String>,
    pub period: Option<u32>,
    pub statistic: Option<String>,
    pub unit: Option<String>,
    pub dimensions: Vec<(String, String)>,
}

impl Metric {
    pub fn from_raw(raw: RawMetric) -> ConfigResult<Self> {
        let name = raw.name.ok_or(ConfigError::MissingField {
            section: "metric",
            field: "name",
        })?;
        let namespace = raw.namespace.ok_or(ConfigError::MissingField {
            section: "metric",
            field: "namespace",
        })?;

        Ok(Self {
            name,
            namespace,
            color: raw.color,
            label: raw.label,
            period: raw.period,
            statistic: raw.statistic,
            unit: raw.unit,
            dimensions: raw.dimensions.unwrap_or_default(),
        })
    }
}
