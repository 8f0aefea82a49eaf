//! `azurerm_netapp_snapshot_policy` resource

use super::ids::SnapshotPolicyId;
use super::validate::{daily_schedule, hourly_schedule, monthly_schedule, weekly_schedule};
use super::API_VERSION;
use crate::azure::client::ArmClient;
use crate::azure::http::response_was_not_found;
use crate::resource::{import_as_exists_error, Attribute, AttributeType, Schema, TypedResource};
use crate::resourceids::ParseError;
use crate::validation::{normalize_location, resource_group_name, string_is_not_empty};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const RESOURCE_TYPE: &str = "azurerm_netapp_snapshot_policy";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPolicyModel {
    pub name: String,
    pub resource_group_name: String,
    pub account_name: String,
    pub location: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_schedule: Option<HourlySchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_schedule: Option<DailySchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_schedule: Option<WeeklySchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_schedule: Option<MonthlySchedule>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySchedule {
    pub snapshots_to_keep: i64,
    pub minute: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySchedule {
    pub snapshots_to_keep: i64,
    pub hour: i64,
    pub minute: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub snapshots_to_keep: i64,
    pub days_of_week: Vec<String>,
    pub hour: i64,
    pub minute: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySchedule {
    pub snapshots_to_keep: i64,
    pub days_of_month: Vec<i64>,
    pub hour: i64,
    pub minute: i64,
}

/// Snapshot policy as sent to and returned by the API
#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotPolicy {
    #[serde(default, skip_serializing)]
    id: Option<String>,
    location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<BTreeMap<String, String>>,
    #[serde(default)]
    properties: SnapshotPolicyProperties,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotPolicyProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hourly_schedule: Option<ApiSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    daily_schedule: Option<ApiSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weekly_schedule: Option<ApiSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    monthly_schedule: Option<ApiSchedule>,
}

/// Superset of the four API schedule shapes
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    snapshots_to_keep: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    minute: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hour: Option<i64>,
    /// Comma separated weekday names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    day: Option<String>,
    /// Comma separated day numbers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    days_of_month: Option<String>,
}

impl SnapshotPolicyModel {
    fn id(&self, subscription_id: &str) -> SnapshotPolicyId {
        SnapshotPolicyId::new(
            subscription_id,
            self.resource_group_name.clone(),
            self.account_name.clone(),
            self.name.clone(),
        )
    }

    fn to_api(&self) -> SnapshotPolicy {
        SnapshotPolicy {
            id: None,
            location: normalize_location(&self.location),
            tags: Some(self.tags.clone()),
            properties: SnapshotPolicyProperties {
                enabled: Some(self.enabled),
                hourly_schedule: self.hourly_schedule.as_ref().map(expand_hourly),
                daily_schedule: self.daily_schedule.as_ref().map(expand_daily),
                weekly_schedule: self.weekly_schedule.as_ref().map(expand_weekly),
                monthly_schedule: self.monthly_schedule.as_ref().map(expand_monthly),
            },
        }
    }
}

fn expand_hourly(s: &HourlySchedule) -> ApiSchedule {
    ApiSchedule {
        snapshots_to_keep: Some(s.snapshots_to_keep),
        minute: Some(s.minute),
        ..ApiSchedule::default()
    }
}

fn expand_daily(s: &DailySchedule) -> ApiSchedule {
    ApiSchedule {
        snapshots_to_keep: Some(s.snapshots_to_keep),
        hour: Some(s.hour),
        minute: Some(s.minute),
        ..ApiSchedule::default()
    }
}

fn expand_weekly(s: &WeeklySchedule) -> ApiSchedule {
    ApiSchedule {
        snapshots_to_keep: Some(s.snapshots_to_keep),
        day: Some(s.days_of_week.join(",")),
        hour: Some(s.hour),
        minute: Some(s.minute),
        ..ApiSchedule::default()
    }
}

fn expand_monthly(s: &MonthlySchedule) -> ApiSchedule {
    ApiSchedule {
        snapshots_to_keep: Some(s.snapshots_to_keep),
        days_of_month: Some(
            s.days_of_month
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        ),
        hour: Some(s.hour),
        minute: Some(s.minute),
        ..ApiSchedule::default()
    }
}

fn split_list(list: Option<&str>) -> impl Iterator<Item = &str> {
    list.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// The API reports a schedule that was never set as all zeroes
fn is_unset(schedule: &ApiSchedule) -> bool {
    schedule.snapshots_to_keep.unwrap_or_default() == 0
        && schedule.minute.unwrap_or_default() == 0
        && schedule.hour.unwrap_or_default() == 0
        && split_list(schedule.day.as_deref()).next().is_none()
        && split_list(schedule.days_of_month.as_deref()).next().is_none()
}

/// A configured all-zero schedule reads back like an unset one, so keep it
fn keep_zero_schedule<T: Clone>(prior: Option<&T>, expand: fn(&T) -> ApiSchedule) -> Option<T> {
    prior.filter(|s| is_unset(&expand(s))).cloned()
}

fn flatten_hourly(schedule: Option<ApiSchedule>) -> Option<HourlySchedule> {
    schedule.filter(|s| !is_unset(s)).map(|s| HourlySchedule {
        snapshots_to_keep: s.snapshots_to_keep.unwrap_or_default(),
        minute: s.minute.unwrap_or_default(),
    })
}

fn flatten_daily(schedule: Option<ApiSchedule>) -> Option<DailySchedule> {
    schedule.filter(|s| !is_unset(s)).map(|s| DailySchedule {
        snapshots_to_keep: s.snapshots_to_keep.unwrap_or_default(),
        hour: s.hour.unwrap_or_default(),
        minute: s.minute.unwrap_or_default(),
    })
}

fn flatten_weekly(schedule: Option<ApiSchedule>) -> Option<WeeklySchedule> {
    schedule.filter(|s| !is_unset(s)).map(|s| WeeklySchedule {
        snapshots_to_keep: s.snapshots_to_keep.unwrap_or_default(),
        days_of_week: split_list(s.day.as_deref()).map(str::to_string).collect(),
        hour: s.hour.unwrap_or_default(),
        minute: s.minute.unwrap_or_default(),
    })
}

fn flatten_monthly(schedule: Option<ApiSchedule>) -> Result<Option<MonthlySchedule>> {
    let Some(s) = schedule.filter(|s| !is_unset(s)) else {
        return Ok(None);
    };

    let days_of_month = split_list(s.days_of_month.as_deref())
        .map(|day| {
            day.parse::<i64>()
                .with_context(|| format!("parsing day of month {:?}", day))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(MonthlySchedule {
        snapshots_to_keep: s.snapshots_to_keep.unwrap_or_default(),
        days_of_month,
        hour: s.hour.unwrap_or_default(),
        minute: s.minute.unwrap_or_default(),
    }))
}

pub struct SnapshotPolicyResource;

impl SnapshotPolicyResource {
    async fn put(&self, client: &ArmClient, id: &SnapshotPolicyId, model: &SnapshotPolicyModel) -> Result<()> {
        let body = serde_json::to_value(model.to_api())
            .with_context(|| format!("encoding {}", id))?;

        client
            .put(&id.id(), API_VERSION, &body)
            .await
            .with_context(|| format!("creating/updating {}", id))?;

        Ok(())
    }
}

#[async_trait]
impl TypedResource for SnapshotPolicyResource {
    type Model = SnapshotPolicyModel;

    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .with(
                "name",
                Attribute::required(AttributeType::String)
                    .force_new()
                    .validate_with(string_is_not_empty),
            )
            .with(
                "resource_group_name",
                Attribute::required(AttributeType::String)
                    .force_new()
                    .validate_with(resource_group_name),
            )
            .with(
                "account_name",
                Attribute::required(AttributeType::String)
                    .force_new()
                    .validate_with(string_is_not_empty),
            )
            .with(
                "location",
                Attribute::required(AttributeType::String)
                    .force_new()
                    .validate_with(string_is_not_empty),
            )
            .with("enabled", Attribute::required(AttributeType::Bool))
            .with(
                "hourly_schedule",
                Attribute::optional(AttributeType::Object).validate_with(hourly_schedule),
            )
            .with(
                "daily_schedule",
                Attribute::optional(AttributeType::Object).validate_with(daily_schedule),
            )
            .with(
                "weekly_schedule",
                Attribute::optional(AttributeType::Object).validate_with(weekly_schedule),
            )
            .with(
                "monthly_schedule",
                Attribute::optional(AttributeType::Object).validate_with(monthly_schedule),
            )
            .with("tags", Attribute::optional(AttributeType::Map))
    }

    fn validate_import_id(&self, id: &str) -> Result<(), ParseError> {
        SnapshotPolicyId::parse(id).map(|_| ())
    }

    async fn create(&self, client: &ArmClient, model: Self::Model) -> Result<String> {
        let id = model.id(&client.subscription_id);

        tracing::info!("Checking for presence of existing {}", id);
        match client.get(&id.id(), API_VERSION).await {
            Ok(existing) => {
                let existing_id = existing
                    .get("id")
                    .and_then(Value::as_str)
                    .map_or_else(|| id.id(), str::to_string);
                return Err(import_as_exists_error(RESOURCE_TYPE, &existing_id));
            }
            Err(err) if response_was_not_found(&err) => {}
            Err(err) => {
                return Err(err.context(format!("checking for presence of existing {}", id)))
            }
        }

        tracing::info!("Creating snapshot policy {:?} in {}", id.name, id.account_id());
        self.put(client, &id, &model).await?;

        Ok(id.id())
    }

    async fn read(
        &self,
        client: &ArmClient,
        id: &str,
        prior: Option<Self::Model>,
    ) -> Result<Option<Self::Model>> {
        let id = SnapshotPolicyId::parse(id)?;

        tracing::info!("Reading {}", id);
        let response = match client.get(&id.id(), API_VERSION).await {
            Ok(response) => response,
            Err(err) if response_was_not_found(&err) => {
                tracing::info!("{} was not found - removing from state", id);
                return Ok(None);
            }
            Err(err) => return Err(err.context(format!("retrieving {}", id))),
        };

        let policy: SnapshotPolicy = serde_json::from_value(response)
            .with_context(|| format!("decoding {}", id))?;

        // the API may re-case the id; the state id keeps the configured casing
        if let Some(remote) = policy.id.as_deref() {
            let remote_id = SnapshotPolicyId::parse_insensitively(remote)
                .with_context(|| format!("parsing id returned for {}", id))?;
            if !remote_id.id().eq_ignore_ascii_case(&id.id()) {
                return Err(anyhow!(
                    "retrieving {}: the API returned a different snapshot policy {:?}",
                    id,
                    remote
                ));
            }
        }

        let prior = prior.as_ref();
        let location = match prior {
            Some(prior) if normalize_location(&prior.location) == normalize_location(&policy.location) => {
                prior.location.clone()
            }
            _ => normalize_location(&policy.location),
        };

        let properties = policy.properties;
        Ok(Some(SnapshotPolicyModel {
            name: id.name,
            resource_group_name: id.resource_group,
            account_name: id.net_app_account_name,
            location,
            enabled: properties.enabled.unwrap_or_default(),
            hourly_schedule: flatten_hourly(properties.hourly_schedule).or_else(|| {
                keep_zero_schedule(prior.and_then(|p| p.hourly_schedule.as_ref()), expand_hourly)
            }),
            daily_schedule: flatten_daily(properties.daily_schedule).or_else(|| {
                keep_zero_schedule(prior.and_then(|p| p.daily_schedule.as_ref()), expand_daily)
            }),
            weekly_schedule: flatten_weekly(properties.weekly_schedule).or_else(|| {
                keep_zero_schedule(prior.and_then(|p| p.weekly_schedule.as_ref()), expand_weekly)
            }),
            monthly_schedule: match flatten_monthly(properties.monthly_schedule)? {
                Some(schedule) => Some(schedule),
                None => keep_zero_schedule(prior.and_then(|p| p.monthly_schedule.as_ref()), expand_monthly),
            },
            tags: policy.tags.unwrap_or_default(),
        }))
    }

    async fn update(&self, client: &ArmClient, id: &str, model: Self::Model) -> Result<()> {
        let id = SnapshotPolicyId::parse(id)?;
        tracing::info!("Updating {}", id);
        self.put(client, &id, &model).await
    }

    async fn delete(&self, client: &ArmClient, id: &str) -> Result<()> {
        let id = SnapshotPolicyId::parse(id)?;

        tracing::info!("Deleting {}", id);
        match client.delete(&id.id(), API_VERSION).await {
            Ok(_) => Ok(()),
            Err(err) if response_was_not_found(&err) => Ok(()),
            Err(err) => Err(err.context(format!("deleting {}", id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> SnapshotPolicyModel {
        SnapshotPolicyModel {
            name: "snapshotpolicy1".to_string(),
            resource_group_name: "resGroup1".to_string(),
            account_name: "account1".to_string(),
            location: "West Europe".to_string(),
            enabled: true,
            hourly_schedule: Some(HourlySchedule {
                snapshots_to_keep: 4,
                minute: 15,
            }),
            daily_schedule: None,
            weekly_schedule: Some(WeeklySchedule {
                snapshots_to_keep: 1,
                days_of_week: vec!["Monday".to_string(), "Friday".to_string()],
                hour: 23,
                minute: 0,
            }),
            monthly_schedule: Some(MonthlySchedule {
                snapshots_to_keep: 1,
                days_of_month: vec![1, 15],
                hour: 5,
                minute: 45,
            }),
            tags: BTreeMap::new(),
        }
    }

    #[test]
    fn test_request_body() {
        let body = serde_json::to_value(model().to_api()).unwrap();
        assert_eq!(
            body,
            json!({
                "location": "westeurope",
                "tags": {},
                "properties": {
                    "enabled": true,
                    "hourlySchedule": {"snapshotsToKeep": 4, "minute": 15},
                    "weeklySchedule": {"snapshotsToKeep": 1, "day": "Monday,Friday", "hour": 23, "minute": 0},
                    "monthlySchedule": {"snapshotsToKeep": 1, "daysOfMonth": "1,15", "hour": 5, "minute": 45}
                }
            })
        );
    }

    #[test]
    fn test_flatten_schedules() {
        let zeroed = ApiSchedule {
            snapshots_to_keep: Some(0),
            hour: Some(0),
            minute: Some(0),
            ..ApiSchedule::default()
        };
        assert!(flatten_daily(Some(zeroed)).is_none());

        let weekly = ApiSchedule {
            snapshots_to_keep: Some(2),
            day: Some("Monday, Friday".to_string()),
            hour: Some(1),
            minute: Some(2),
            ..ApiSchedule::default()
        };
        assert_eq!(
            flatten_weekly(Some(weekly)).unwrap().days_of_week,
            vec!["Monday", "Friday"]
        );

        let monthly = ApiSchedule {
            snapshots_to_keep: Some(2),
            days_of_month: Some("1,x".to_string()),
            ..ApiSchedule::default()
        };
        assert!(flatten_monthly(Some(monthly)).is_err());
    }

    #[test]
    fn test_configured_zero_schedule_is_kept() {
        let zero = DailySchedule {
            snapshots_to_keep: 0,
            hour: 0,
            minute: 0,
        };
        let reported = ApiSchedule {
            snapshots_to_keep: Some(0),
            hour: Some(0),
            minute: Some(0),
            ..ApiSchedule::default()
        };

        let flattened = flatten_daily(Some(reported))
            .or_else(|| keep_zero_schedule(Some(&zero), expand_daily));
        assert_eq!(flattened, Some(zero));

        let nonzero = DailySchedule {
            snapshots_to_keep: 1,
            hour: 0,
            minute: 0,
        };
        assert_eq!(keep_zero_schedule(Some(&nonzero), expand_daily), None);
        assert_eq!(keep_zero_schedule::<DailySchedule>(None, expand_daily), None);
    }

    #[test]
    fn test_schema_accepts_nested_schedules() {
        let schema = TypedResource::schema(&SnapshotPolicyResource);
        let config = json!({
            "name": "snapshotpolicy1",
            "resource_group_name": "resGroup1",
            "account_name": "account1",
            "location": "westeurope",
            "enabled": true,
            "daily_schedule": {"snapshots_to_keep": 1, "hour": 2, "minute": 3},
        });
        let validation = schema.validate(config.as_object().unwrap());
        assert!(validation.is_valid(), "{:?}", validation.errors);

        let config = json!({
            "name": "snapshotpolicy1",
            "resource_group_name": "resGroup1",
            "account_name": "account1",
            "location": "westeurope",
            "enabled": "yes",
            "daily_schedule": {"snapshots_to_keep": 1, "hour": 24, "minute": 3},
        });
        assert_eq!(schema.validate(config.as_object().unwrap()).errors.len(), 2);
    }

    #[test]
    fn test_id_from_model() {
        let id = model().id("12345678-1234-9876-4563-123456789012");
        assert_eq!(
            id.id(),
            "/subscriptions/12345678-1234-9876-4563-123456789012/resourceGroups/resGroup1/providers/Microsoft.NetApp/netAppAccounts/account1/snapshotPolicies/snapshotpolicy1"
        );
        assert_eq!(id.account_id().name, "account1");
    }
}
