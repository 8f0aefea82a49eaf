//! Snapshot schedule validators

use crate::validation::{Validation, ValidationError};
use serde_json::{Map, Value};

pub const WEEKDAYS: &[&str] = &[
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Clone, Copy)]
enum Field {
    Int { name: &'static str, min: i64, max: i64 },
    Weekdays { name: &'static str },
    DaysOfMonth { name: &'static str },
}

impl Field {
    fn name(self) -> &'static str {
        match self {
            Field::Int { name, .. } | Field::Weekdays { name } | Field::DaysOfMonth { name } => name,
        }
    }
}

const SNAPSHOTS_TO_KEEP: Field = Field::Int {
    name: "snapshots_to_keep",
    min: 0,
    max: 255,
};
const MINUTE: Field = Field::Int {
    name: "minute",
    min: 0,
    max: 59,
};
const HOUR: Field = Field::Int {
    name: "hour",
    min: 0,
    max: 23,
};
const DAYS_OF_WEEK: Field = Field::Weekdays {
    name: "days_of_week",
};
const DAYS_OF_MONTH: Field = Field::DaysOfMonth {
    name: "days_of_month",
};

pub fn hourly_schedule(value: &Value, key: &str) -> Validation {
    check_schedule(value, key, &[SNAPSHOTS_TO_KEEP, MINUTE])
}

pub fn daily_schedule(value: &Value, key: &str) -> Validation {
    check_schedule(value, key, &[SNAPSHOTS_TO_KEEP, HOUR, MINUTE])
}

pub fn weekly_schedule(value: &Value, key: &str) -> Validation {
    check_schedule(value, key, &[SNAPSHOTS_TO_KEEP, DAYS_OF_WEEK, HOUR, MINUTE])
}

pub fn monthly_schedule(value: &Value, key: &str) -> Validation {
    check_schedule(value, key, &[SNAPSHOTS_TO_KEEP, DAYS_OF_MONTH, HOUR, MINUTE])
}

/// Every field is required and no other key is accepted
fn check_schedule(value: &Value, key: &str, fields: &[Field]) -> Validation {
    let Some(schedule) = value.as_object() else {
        return Validation::error(ValidationError::WrongType {
            key: key.to_string(),
            expected: "an object",
        });
    };

    let mut validation = Validation::ok();

    for name in schedule.keys() {
        if !fields.iter().any(|field| field.name() == name) {
            validation.push_error(ValidationError::Unknown {
                key: format!("{key}.{name}"),
            });
        }
    }

    for field in fields {
        validation.merge(check_field(schedule, key, *field));
    }

    validation
}

fn check_field(schedule: &Map<String, Value>, key: &str, field: Field) -> Validation {
    let path = format!("{key}.{}", field.name());

    let Some(value) = schedule.get(field.name()).filter(|v| !v.is_null()) else {
        return Validation::error(ValidationError::Missing { key: path });
    };

    match field {
        Field::Int { min, max, .. } => match value.as_i64() {
            Some(n) if (min..=max).contains(&n) => Validation::ok(),
            Some(n) => Validation::error(ValidationError::invalid(
                &path,
                format!("expected {path} to be in the range ({min} - {max}), got {n}"),
            )),
            None => Validation::error(ValidationError::WrongType {
                key: path,
                expected: "an integer",
            }),
        },
        Field::Weekdays { .. } => {
            let Some(days) = value.as_array().filter(|days| !days.is_empty()) else {
                return Validation::error(ValidationError::WrongType {
                    key: path,
                    expected: "a non-empty list of weekdays",
                });
            };

            let mut validation = Validation::ok();
            let mut seen = Vec::new();
            for day in days {
                match day.as_str() {
                    Some(day) if WEEKDAYS.contains(&day) => {
                        if seen.contains(&day) {
                            validation.push_error(ValidationError::invalid(
                                &path,
                                format!("{path} contains {day:?} more than once"),
                            ));
                        }
                        seen.push(day);
                    }
                    _ => validation.push_error(ValidationError::invalid(
                        &path,
                        format!("expected {path} to contain only {:?}, got {day}", WEEKDAYS),
                    )),
                }
            }
            validation
        }
        Field::DaysOfMonth { .. } => {
            let Some(days) = value.as_array().filter(|days| !days.is_empty()) else {
                return Validation::error(ValidationError::WrongType {
                    key: path,
                    expected: "a non-empty list of days",
                });
            };

            let mut validation = Validation::ok();
            let mut seen = Vec::new();
            for day in days {
                match day.as_i64() {
                    Some(n) if (1..=30).contains(&n) => {
                        if seen.contains(&n) {
                            validation.push_error(ValidationError::invalid(
                                &path,
                                format!("{path} contains {n} more than once"),
                            ));
                        }
                        seen.push(n);
                    }
                    _ => validation.push_error(ValidationError::invalid(
                        &path,
                        format!("expected {path} to contain days in the range (1 - 30), got {day}"),
                    )),
                }
            }
            validation
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hourly_schedule() {
        assert!(hourly_schedule(&json!({"snapshots_to_keep": 2, "minute": 15}), "hourly_schedule").is_valid());

        let validation = hourly_schedule(&json!({"snapshots_to_keep": 256, "minute": 60}), "hourly_schedule");
        assert_eq!(validation.errors.len(), 2);

        let validation = hourly_schedule(&json!({"minute": 15, "hour": 1}), "hourly_schedule");
        assert!(validation.errors.contains(&ValidationError::Missing {
            key: "hourly_schedule.snapshots_to_keep".to_string()
        }));
        assert!(validation.errors.contains(&ValidationError::Unknown {
            key: "hourly_schedule.hour".to_string()
        }));
    }

    #[test]
    fn test_weekly_schedule() {
        let valid = json!({"snapshots_to_keep": 1, "days_of_week": ["Monday", "Friday"], "hour": 23, "minute": 0});
        assert!(weekly_schedule(&valid, "weekly_schedule").is_valid());

        let invalid = json!({"snapshots_to_keep": 1, "days_of_week": ["monday", "Friday", "Friday"], "hour": 23, "minute": 0});
        assert_eq!(weekly_schedule(&invalid, "weekly_schedule").errors.len(), 2);

        let empty = json!({"snapshots_to_keep": 1, "days_of_week": [], "hour": 23, "minute": 0});
        assert!(!weekly_schedule(&empty, "weekly_schedule").is_valid());
    }

    #[test]
    fn test_monthly_schedule() {
        let valid = json!({"snapshots_to_keep": 1, "days_of_month": [1, 15, 30], "hour": 0, "minute": 0});
        assert!(monthly_schedule(&valid, "monthly_schedule").is_valid());

        let invalid = json!({"snapshots_to_keep": 1, "days_of_month": [0, 31], "hour": 0, "minute": 0});
        assert_eq!(monthly_schedule(&invalid, "monthly_schedule").errors.len(), 2);
    }

    #[test]
    fn test_schedule_must_be_an_object() {
        let validation = daily_schedule(&json!("daily"), "daily_schedule");
        assert_eq!(
            validation.errors,
            vec![ValidationError::WrongType {
                key: "daily_schedule".to_string(),
                expected: "an object",
            }]
        );
    }
}
