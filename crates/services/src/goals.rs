//! Goal use cases. Deleting a goal archives it; rows are never removed.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use domains::validation::clean_title;
use domains::{
    check_object, Access, CategoryRepository, DomainError, Goal, GoalChanges, GoalFilter,
    GoalPriority, GoalRepository, GoalSort, GoalStatus, ListParams, NewGoal, Page, Requester,
    Result, ValidationErrors,
};

use crate::input::{double_option, not_null, WriteMode};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGoal {
    pub category: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<GoalStatus>,
    #[serde(default)]
    pub priority: Option<GoalPriority>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGoal {
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<GoalStatus>>,
    #[serde(default, deserialize_with = "double_option")]
    pub priority: Option<Option<GoalPriority>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
}

pub struct GoalService {
    categories: Arc<dyn CategoryRepository>,
    goals: Arc<dyn GoalRepository>,
}

impl GoalService {
    pub fn new(categories: Arc<dyn CategoryRepository>, goals: Arc<dyn GoalRepository>) -> Self {
        Self { categories, goals }
    }

    pub async fn create(&self, requester: &Requester, input: CreateGoal) -> Result<Goal> {
        let mut errors = ValidationErrors::new();
        let title = clean_title(&mut errors, "title", &input.title);
        self.check_category(requester, input.category, &mut errors)
            .await?;
        errors.into_result()?;

        let goal = self
            .goals
            .create(NewGoal {
                category_id: input.category,
                user_id: requester.id,
                title,
                description: normalize_description(input.description),
                status: input.status.unwrap_or_default(),
                priority: input.priority.unwrap_or_default(),
                due_date: input.due_date,
            })
            .await?;
        info!(subsystem = "goals", op = "create", goal_id = %goal.id, category_id = %goal.category_id, "Goal created");
        Ok(goal)
    }

    pub async fn list(
        &self,
        requester: &Requester,
        filter: &GoalFilter,
        params: &ListParams<GoalSort>,
    ) -> Result<Page<Goal>> {
        self.goals.list_owned(requester.id, filter, params).await
    }

    pub async fn get(&self, requester: &Requester, id: Uuid) -> Result<Goal> {
        let goal = self.lookup(id).await?;
        check_object(requester, &goal, Access::Read)?;
        Ok(goal)
    }

    pub async fn update(
        &self,
        requester: &Requester,
        id: Uuid,
        input: UpdateGoal,
        mode: WriteMode,
    ) -> Result<Goal> {
        let goal = self.lookup(id).await?;
        check_object(requester, &goal, Access::Write)?;

        let mut errors = ValidationErrors::new();
        mode.require(&mut errors, "title", &input.title);
        mode.require(&mut errors, "category", &input.category);
        let category = not_null(&mut errors, "category", input.category);
        let status = not_null(&mut errors, "status", input.status);
        let priority = not_null(&mut errors, "priority", input.priority);
        let title = not_null(&mut errors, "title", input.title)
            .map(|raw| clean_title(&mut errors, "title", &raw));
        if let Some(category) = category {
            if category != goal.category_id {
                self.check_category(requester, category, &mut errors)
                    .await?;
            }
        }
        errors.into_result()?;

        let changes = GoalChanges {
            category_id: category,
            title,
            description: input.description.map(normalize_description),
            status,
            priority,
            due_date: input.due_date,
        };
        if changes == GoalChanges::default() {
            return Ok(goal);
        }
        self.goals.update(goal.id, changes).await
    }

    /// Archives the goal and returns it.
    pub async fn delete(&self, requester: &Requester, id: Uuid) -> Result<Goal> {
        let goal = self.lookup(id).await?;
        check_object(requester, &goal, Access::Write)?;

        let goal = self.goals.archive(goal.id).await?;
        info!(subsystem = "goals", op = "archive", goal_id = %goal.id, user_id = %requester.id, "Goal archived");
        Ok(goal)
    }

    async fn lookup(&self, id: Uuid) -> Result<Goal> {
        self.goals
            .find_visible(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Goal", id))
    }

    /// Goals may only be filed under a live category the caller owns.
    async fn check_category(
        &self,
        requester: &Requester,
        category_id: Uuid,
        errors: &mut ValidationErrors,
    ) -> Result<()> {
        match self.categories.find_active(category_id).await? {
            None => errors.add("category", "Category not found."),
            Some(category) if category.user_id != requester.id => {
                errors.add("category", "You are not the owner of this category.")
            }
            Some(_) => {}
        }
        Ok(())
    }
}

fn normalize_description(raw: Option<String>) -> Option<String> {
    raw.map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{GoalCategory, MockCategoryRepository, MockGoalRepository};

    fn requester() -> Requester {
        Requester {
            id: Uuid::now_v7(),
            username: "ann".into(),
        }
    }

    fn goal_of(owner: Uuid) -> Goal {
        Goal {
            id: Uuid::now_v7(),
            category_id: Uuid::now_v7(),
            user_id: owner,
            title: "Read more".into(),
            description: None,
            status: GoalStatus::ToDo,
            priority: GoalPriority::Medium,
            due_date: None,
            created: Utc::now(),
            updated: Utc::now(),
        }
    }

    fn category_of(owner: Uuid, id: Uuid) -> GoalCategory {
        GoalCategory {
            id,
            board_id: Uuid::now_v7(),
            user_id: owner,
            title: "Personal".into(),
            is_deleted: false,
            created: Utc::now(),
            updated: Utc::now(),
        }
    }

    #[tokio::test]
    async fn delete_archives_instead_of_removing() {
        let me = requester();
        let goal = goal_of(me.id);
        let id = goal.id;
        let archived = Goal {
            status: GoalStatus::Archived,
            ..goal.clone()
        };
        let mut goals = MockGoalRepository::new();
        goals
            .expect_find_visible()
            .returning(move |_| Ok(Some(goal.clone())));
        goals
            .expect_archive()
            .withf(move |target| *target == id)
            .times(1)
            .returning(move |_| Ok(archived.clone()));
        goals.expect_update().never();

        let service = GoalService::new(Arc::new(MockCategoryRepository::new()), Arc::new(goals));
        let result = service.delete(&me, id).await.unwrap();
        assert_eq!(result.status, GoalStatus::Archived);
    }

    #[tokio::test]
    async fn archived_goal_is_not_found() {
        let mut goals = MockGoalRepository::new();
        goals.expect_find_visible().returning(|_| Ok(None));
        goals.expect_archive().never();

        let service = GoalService::new(Arc::new(MockCategoryRepository::new()), Arc::new(goals));
        let err = service.delete(&requester(), Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound("Goal", _)));
    }

    #[tokio::test]
    async fn non_owner_cannot_archive() {
        let goal = goal_of(Uuid::now_v7());
        let id = goal.id;
        let mut goals = MockGoalRepository::new();
        goals
            .expect_find_visible()
            .returning(move |_| Ok(Some(goal.clone())));
        goals.expect_archive().never();

        let service = GoalService::new(Arc::new(MockCategoryRepository::new()), Arc::new(goals));
        let err = service.delete(&requester(), id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn create_in_foreign_category_is_rejected() {
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_active()
            .returning(|id| Ok(Some(category_of(Uuid::now_v7(), id))));
        let mut goals = MockGoalRepository::new();
        goals.expect_create().never();

        let service = GoalService::new(Arc::new(categories), Arc::new(goals));
        let err = service
            .create(
                &requester(),
                CreateGoal {
                    category: Uuid::now_v7(),
                    title: "Learn Rust".into(),
                    description: None,
                    status: None,
                    priority: None,
                    due_date: None,
                },
            )
            .await
            .unwrap_err();
        match err {
            DomainError::Validation(errors) => assert!(errors.get("category").is_some()),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let me = requester();
        let owner = me.id;
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_active()
            .returning(move |id| Ok(Some(category_of(owner, id))));
        let mut goals = MockGoalRepository::new();
        goals
            .expect_create()
            .withf(|new| {
                new.status == GoalStatus::ToDo
                    && new.priority == GoalPriority::Medium
                    && new.description.is_none()
            })
            .times(1)
            .returning(|new| {
                Ok(Goal {
                    id: Uuid::now_v7(),
                    category_id: new.category_id,
                    user_id: new.user_id,
                    title: new.title,
                    description: new.description,
                    status: new.status,
                    priority: new.priority,
                    due_date: new.due_date,
                    created: Utc::now(),
                    updated: Utc::now(),
                })
            });

        let service = GoalService::new(Arc::new(categories), Arc::new(goals));
        let goal = service
            .create(
                &me,
                CreateGoal {
                    category: Uuid::now_v7(),
                    title: "Run".into(),
                    description: Some("   ".into()),
                    status: None,
                    priority: None,
                    due_date: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(goal.user_id, me.id);
    }

    #[tokio::test]
    async fn empty_patch_returns_goal_unchanged() {
        let me = requester();
        let goal = goal_of(me.id);
        let id = goal.id;
        let mut goals = MockGoalRepository::new();
        goals
            .expect_find_visible()
            .returning(move |_| Ok(Some(goal.clone())));
        goals.expect_update().never();

        let service = GoalService::new(Arc::new(MockCategoryRepository::new()), Arc::new(goals));
        let unchanged = service
            .update(&me, id, UpdateGoal::default(), WriteMode::Partial)
            .await
            .unwrap();
        assert_eq!(unchanged.id, id);
    }

    #[tokio::test]
    async fn explicit_null_category_is_a_field_error() {
        let me = requester();
        let goal = goal_of(me.id);
        let id = goal.id;
        let mut goals = MockGoalRepository::new();
        goals
            .expect_find_visible()
            .returning(move |_| Ok(Some(goal.clone())));
        goals.expect_update().never();
        let mut categories = MockCategoryRepository::new();
        categories.expect_find_active().never();

        let service = GoalService::new(Arc::new(categories), Arc::new(goals));
        let input = UpdateGoal {
            category: Some(None),
            title: Some(Some("Read less".into())),
            ..Default::default()
        };
        for mode in [WriteMode::Partial, WriteMode::Replace] {
            let err = service.update(&me, id, input.clone(), mode).await.unwrap_err();
            match err {
                DomainError::Validation(errors) => {
                    assert_eq!(
                        errors.get("category").unwrap(),
                        &vec!["This field may not be null.".to_string()]
                    );
                    assert!(errors.get("title").is_none());
                }
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }
}
