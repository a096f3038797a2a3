//! Query-string shapes of the list endpoints and their translation into
//! domain list parameters.
//!
//! Values arrive as raw strings so that one bad filter yields a field error
//! naming it, instead of a generic deserialization failure.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use domains::{
    CommentFilter, GoalFilter, GoalPriority, GoalStatus, ListParams, OrderBy, SortField,
    ValidationErrors, Window,
};

/// `ordering`, `search`, `limit` and `offset`, shared by every list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub ordering: Option<String>,
    pub search: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListQuery {
    /// Limit/offset window. A missing, malformed or non-positive `limit`
    /// turns pagination off and `offset` with it; a malformed `offset`
    /// counts as zero.
    pub fn window(&self) -> Window {
        let limit = self
            .limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|limit| *limit > 0);
        let offset = limit
            .and(self.offset.as_deref())
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(0);
        Window { limit, offset }
    }

    pub fn params<F: SortField>(&self, defaults: ListParams<F>) -> ListParams<F> {
        ListParams {
            ordering: OrderBy::parse_list(self.ordering.as_deref(), defaults.ordering),
            search: self.search.clone(),
            window: self.window(),
        }
    }

    /// Same as [`ListQuery::params`] for endpoints without search fields.
    pub fn params_unsearched<F: SortField>(&self, defaults: ListParams<F>) -> ListParams<F> {
        ListParams {
            search: None,
            ..self.params(defaults)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    #[serde(rename = "due_date__gte")]
    pub due_date_gte: Option<String>,
    #[serde(rename = "due_date__lte")]
    pub due_date_lte: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "category__in")]
    pub category_in: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "status__in")]
    pub status_in: Option<String>,
    pub priority: Option<String>,
    #[serde(rename = "priority__in")]
    pub priority_in: Option<String>,
}

impl GoalQuery {
    /// Every filter ANDs together.
    pub fn filter(&self) -> Result<GoalFilter, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let due_date_gte = parse_date(&mut errors, "due_date__gte", self.due_date_gte.as_deref());
        let due_date_lte = parse_date(&mut errors, "due_date__lte", self.due_date_lte.as_deref());

        let categories = intersect(
            parse_id(&mut errors, "category", self.category.as_deref()).map(|id| vec![id]),
            parse_ids(&mut errors, "category__in", self.category_in.as_deref()),
        );
        let statuses = intersect(
            parse_choice::<GoalStatus>(&mut errors, "status", self.status.as_deref())
                .map(|status| vec![status]),
            parse_choices::<GoalStatus>(&mut errors, "status__in", self.status_in.as_deref()),
        );
        let priorities = intersect(
            parse_choice::<GoalPriority>(&mut errors, "priority", self.priority.as_deref())
                .map(|priority| vec![priority]),
            parse_choices::<GoalPriority>(&mut errors, "priority__in", self.priority_in.as_deref()),
        );
        errors.into_result()?;

        Ok(GoalFilter {
            due_date_gte,
            due_date_lte,
            categories,
            statuses,
            priorities,
        })
    }
}

/// `x` and `x__in` on one field both apply.
fn intersect<T: PartialEq>(a: Option<Vec<T>>, b: Option<Vec<T>>) -> Option<Vec<T>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.into_iter().filter(|v| b.contains(v)).collect()),
        (a, b) => a.or(b),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    pub goal: Option<String>,
}

impl CommentQuery {
    pub fn filter(&self) -> Result<CommentFilter, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let goal_id = parse_id(&mut errors, "goal", self.goal.as_deref());
        errors.into_result()?;
        Ok(CommentFilter { goal_id })
    }
}

fn parse_date(errors: &mut ValidationErrors, field: &str, raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw.map(str::trim).filter(|raw| !raw.is_empty())?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "Enter a valid date.");
            None
        }
    }
}

/// One exact value; a comma list is just an invalid value here.
/// Blank input means "not filtered".
fn parse_value<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &str,
    raw: Option<&str>,
    invalid: impl Fn(&str) -> String,
) -> Option<T> {
    let raw = raw.map(str::trim).filter(|raw| !raw.is_empty())?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.add(field, invalid(raw));
            None
        }
    }
}

/// Comma-separated values. Blank input means "not filtered".
fn parse_values<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &str,
    raw: Option<&str>,
    invalid: impl Fn(&str) -> String,
) -> Option<Vec<T>> {
    let raw = raw.map(str::trim).filter(|raw| !raw.is_empty())?;
    let mut values = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        match item.parse::<T>() {
            Ok(value) => values.push(value),
            Err(_) => {
                errors.add(field, invalid(item));
                return None;
            }
        }
    }
    Some(values)
}

fn parse_id(errors: &mut ValidationErrors, field: &str, raw: Option<&str>) -> Option<Uuid> {
    parse_value(errors, field, raw, |_| "Enter a valid UUID.".to_string())
}

fn parse_ids(errors: &mut ValidationErrors, field: &str, raw: Option<&str>) -> Option<Vec<Uuid>> {
    parse_values(errors, field, raw, |_| "Enter a valid UUID.".to_string())
}

fn invalid_choice(item: &str) -> String {
    format!("Select a valid choice. {item} is not one of the available choices.")
}

fn parse_choice<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &str,
    raw: Option<&str>,
) -> Option<T> {
    parse_value(errors, field, raw, invalid_choice)
}

fn parse_choices<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &str,
    raw: Option<&str>,
) -> Option<Vec<T>> {
    parse_values(errors, field, raw, invalid_choice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::GoalSort;

    #[test]
    fn window_is_lenient_like_limit_offset_pagination() {
        let query = ListQuery {
            limit: Some("abc".into()),
            offset: Some("-3".into()),
            ..Default::default()
        };
        assert_eq!(query.window(), Window { limit: None, offset: 0 });

        let query = ListQuery {
            limit: Some("0".into()),
            ..Default::default()
        };
        assert!(!query.window().is_paginated());

        let query = ListQuery {
            limit: Some("5".into()),
            offset: Some("10".into()),
            ..Default::default()
        };
        assert_eq!(query.window(), Window { limit: Some(5), offset: 10 });
    }

    #[test]
    fn unknown_ordering_falls_back_to_default() {
        let query = ListQuery {
            ordering: Some("priority,-bogus".into()),
            ..Default::default()
        };
        let params = query.params(ListParams::goals());
        assert_eq!(params.ordering, vec![OrderBy::asc(GoalSort::Title)]);

        let query = ListQuery {
            ordering: Some("-created".into()),
            search: Some("x".into()),
            ..Default::default()
        };
        let params = query.params_unsearched(ListParams::goals());
        assert_eq!(params.ordering, vec![OrderBy::desc(GoalSort::Created)]);
        assert_eq!(params.search, None);
    }

    #[test]
    fn goal_filter_parses_every_lookup() {
        let category = Uuid::now_v7();
        let query = GoalQuery {
            due_date_gte: Some("2023-01-01".into()),
            due_date_lte: Some("2023-12-31".into()),
            category_in: Some(format!("{category}, {}", Uuid::now_v7())),
            category: Some(category.to_string()),
            status_in: Some("to_do,in_progress".into()),
            priority: Some("high".into()),
            ..Default::default()
        };
        let filter = query.filter().unwrap();

        assert_eq!(filter.due_date_gte, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(filter.due_date_lte, NaiveDate::from_ymd_opt(2023, 12, 31));
        assert_eq!(filter.categories, Some(vec![category]));
        assert_eq!(
            filter.statuses,
            Some(vec![GoalStatus::ToDo, GoalStatus::InProgress])
        );
        assert_eq!(filter.priorities, Some(vec![GoalPriority::High]));
    }

    #[test]
    fn bad_filter_values_become_field_errors() {
        let query = GoalQuery {
            due_date_gte: Some("yesterday".into()),
            status: Some("paused".into()),
            category_in: Some("nope".into()),
            ..Default::default()
        };
        let errors = query.filter().unwrap_err();

        assert_eq!(errors.get("due_date__gte").unwrap(), &vec!["Enter a valid date.".to_string()]);
        assert!(errors.get("status").unwrap()[0].contains("paused"));
        assert!(errors.get("category__in").is_some());
        assert!(errors.get("priority").is_none());
    }

    #[test]
    fn disjoint_exact_and_in_lookups_match_nothing() {
        let query = GoalQuery {
            status: Some("done".into()),
            status_in: Some("to_do".into()),
            ..Default::default()
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.statuses, Some(vec![]));
        assert_eq!(filter.priorities, None);
    }

    #[test]
    fn comment_filter_reads_goal() {
        let goal = Uuid::now_v7();
        let query = CommentQuery {
            goal: Some(goal.to_string()),
            ..Default::default()
        };
        assert_eq!(query.filter().unwrap().goal_id, Some(goal));
        assert_eq!(CommentQuery::default().filter().unwrap().goal_id, None);
    }

    #[test]
    fn exact_lookups_reject_comma_lists() {
        let query = CommentQuery {
            goal: Some(format!("{},{}", Uuid::now_v7(), Uuid::now_v7())),
            ..Default::default()
        };
        let errors = query.filter().unwrap_err();
        assert_eq!(errors.get("goal").unwrap(), &vec!["Enter a valid UUID.".to_string()]);

        let query = GoalQuery {
            category: Some(format!("{},{}", Uuid::now_v7(), Uuid::now_v7())),
            status: Some("to_do,done".into()),
            status_in: Some("to_do,done".into()),
            ..Default::default()
        };
        let errors = query.filter().unwrap_err();
        assert!(errors.get("category").is_some());
        assert!(errors.get("status").unwrap()[0].contains("to_do,done"));
        assert!(errors.get("status__in").is_none());
    }
}
