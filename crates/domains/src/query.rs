//! List-endpoint parameters: ordering, search, filters and limit/offset
//! pagination. Storage adapters translate these into their own predicates;
//! the scoping predicates themselves are fixed per port method.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{GoalPriority, GoalStatus};

/// A whitelisted sortable column for one entity.
pub trait SortField: Copy + Sized {
    fn parse(name: &str) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy<F> {
    pub field: F,
    pub descending: bool,
}

impl<F: SortField> OrderBy<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    /// Parses `title,-created`. Unknown names are dropped; if nothing usable
    /// remains the endpoint default applies.
    pub fn parse_list(raw: Option<&str>, default: Vec<OrderBy<F>>) -> Vec<OrderBy<F>> {
        let parsed: Vec<OrderBy<F>> = raw
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .filter_map(|term| match term.strip_prefix('-') {
                Some(name) => F::parse(name).map(OrderBy::desc),
                None => F::parse(term).map(OrderBy::asc),
            })
            .collect();
        if parsed.is_empty() {
            default
        } else {
            parsed
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardSort {
    Title,
    Created,
}

impl SortField for BoardSort {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "title" => Some(BoardSort::Title),
            "created" => Some(BoardSort::Created),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySort {
    Title,
    Created,
}

impl SortField for CategorySort {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "title" => Some(CategorySort::Title),
            "created" => Some(CategorySort::Created),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalSort {
    Title,
    Created,
}

impl SortField for GoalSort {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "title" => Some(GoalSort::Title),
            "created" => Some(GoalSort::Created),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentSort {
    Created,
    Updated,
}

impl SortField for CommentSort {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "created" => Some(CommentSort::Created),
            "updated" => Some(CommentSort::Updated),
            _ => None,
        }
    }
}

/// Limit/offset window. No limit means "everything from offset".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub limit: Option<u32>,
    pub offset: u32,
}

impl Window {
    pub fn is_paginated(&self) -> bool {
        self.limit.is_some()
    }

    /// Applies the window to an already ordered sequence.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let iter = items.into_iter().skip(self.offset as usize);
        match self.limit {
            Some(limit) => iter.take(limit as usize).collect(),
            None => iter.collect(),
        }
    }
}

/// Common list parameters for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams<F> {
    pub ordering: Vec<OrderBy<F>>,
    pub search: Option<String>,
    pub window: Window,
}

impl<F: SortField> ListParams<F> {
    pub fn new(ordering: Vec<OrderBy<F>>) -> Self {
        Self {
            ordering,
            search: None,
            window: Window::default(),
        }
    }

    /// Whitespace-separated search words. Empty means "no search".
    pub fn search_terms(&self) -> Vec<&str> {
        self.search
            .as_deref()
            .map(|search| search.split_whitespace().collect())
            .unwrap_or_default()
    }
}

impl ListParams<BoardSort> {
    pub fn boards() -> Self {
        Self::new(vec![OrderBy::asc(BoardSort::Title)])
    }
}

impl ListParams<CategorySort> {
    pub fn categories() -> Self {
        Self::new(vec![OrderBy::asc(CategorySort::Title)])
    }
}

impl ListParams<GoalSort> {
    pub fn goals() -> Self {
        Self::new(vec![OrderBy::asc(GoalSort::Title)])
    }
}

impl ListParams<CommentSort> {
    pub fn comments() -> Self {
        Self::new(vec![OrderBy::desc(CommentSort::Created)])
    }
}

/// Every term must occur, case-insensitively, in at least one field.
/// No terms matches everything.
pub fn matches_search(fields: &[&str], terms: &[&str]) -> bool {
    let fields: Vec<String> = fields.iter().map(|f| f.to_lowercase()).collect();
    terms.iter().all(|term| {
        let term = term.to_lowercase();
        fields.iter().any(|field| field.contains(&term))
    })
}

/// Goal filter set: due-date range plus exact/`in` lookups.
/// `None` leaves a field unfiltered; `Some(vec![])` matches nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalFilter {
    pub due_date_gte: Option<NaiveDate>,
    pub due_date_lte: Option<NaiveDate>,
    pub categories: Option<Vec<Uuid>>,
    pub statuses: Option<Vec<GoalStatus>>,
    pub priorities: Option<Vec<GoalPriority>>,
}

impl GoalFilter {
    pub fn accepts(
        &self,
        category_id: Uuid,
        status: GoalStatus,
        priority: GoalPriority,
        due_date: Option<NaiveDate>,
    ) -> bool {
        if let Some(from) = self.due_date_gte {
            if !due_date.is_some_and(|d| d >= from) {
                return false;
            }
        }
        if let Some(to) = self.due_date_lte {
            if !due_date.is_some_and(|d| d <= to) {
                return false;
            }
        }
        self.categories.as_ref().is_none_or(|ids| ids.contains(&category_id))
            && self.statuses.as_ref().is_none_or(|s| s.contains(&status))
            && self.priorities.as_ref().is_none_or(|p| p.contains(&priority))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentFilter {
    pub goal_id: Option<Uuid>,
}

/// One page of a list plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}
