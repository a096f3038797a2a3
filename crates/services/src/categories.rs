//! Goal category use cases.
//!
//! Detail lookups only hide soft-deleted rows; whether the caller may change
//! the category is decided afterwards by the owner-or-read-only check. The
//! list, by contrast, is scoped to the caller's own rows.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use domains::validation::clean_title;
use domains::{
    check_object, Access, BoardRepository, CategoryRepository, CategorySort, DomainError,
    GoalCategory, ListParams, NewCategory, Page, Requester, Result, ValidationErrors,
};

use crate::input::WriteMode;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub title: String,
    pub board: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategory {
    pub title: Option<String>,
}

pub struct CategoryService {
    boards: Arc<dyn BoardRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(boards: Arc<dyn BoardRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self { boards, categories }
    }

    pub async fn create(&self, requester: &Requester, input: CreateCategory) -> Result<GoalCategory> {
        let mut errors = ValidationErrors::new();
        let title = clean_title(&mut errors, "title", &input.title);
        if self
            .boards
            .find_owned(input.board, requester.id)
            .await?
            .is_none()
        {
            errors.add("board", "Board not found or not owned by you.");
        }
        errors.into_result()?;

        let category = self
            .categories
            .create(NewCategory {
                board_id: input.board,
                user_id: requester.id,
                title,
            })
            .await?;
        info!(subsystem = "categories", op = "create", category_id = %category.id, user_id = %requester.id, "Category created");
        Ok(category)
    }

    pub async fn list(
        &self,
        requester: &Requester,
        params: &ListParams<CategorySort>,
    ) -> Result<Page<GoalCategory>> {
        self.categories.list_owned(requester.id, params).await
    }

    pub async fn get(&self, requester: &Requester, id: Uuid) -> Result<GoalCategory> {
        let category = self.lookup(id).await?;
        check_object(requester, &category, Access::Read)?;
        Ok(category)
    }

    pub async fn update(
        &self,
        requester: &Requester,
        id: Uuid,
        input: UpdateCategory,
        mode: WriteMode,
    ) -> Result<GoalCategory> {
        let category = self.lookup(id).await?;
        check_object(requester, &category, Access::Write)?;

        let mut errors = ValidationErrors::new();
        mode.require(&mut errors, "title", &input.title);
        let title = input
            .title
            .as_deref()
            .map(|raw| clean_title(&mut errors, "title", raw));
        errors.into_result()?;

        match title {
            Some(title) => self.categories.rename(category.id, title).await,
            None => Ok(category),
        }
    }

    /// Marks the category deleted and archives all of its goals as one unit.
    /// Returns the soft-deleted category.
    pub async fn delete(&self, requester: &Requester, id: Uuid) -> Result<GoalCategory> {
        let category = self.lookup(id).await?;
        check_object(requester, &category, Access::Write)?;

        let category = self.categories.soft_delete(category.id).await?;
        info!(subsystem = "categories", op = "soft_delete", category_id = %category.id, user_id = %requester.id, "Category deleted, goals archived");
        Ok(category)
    }

    async fn lookup(&self, id: Uuid) -> Result<GoalCategory> {
        self.categories
            .find_active(id)
            .await?
            .ok_or_else(|| DomainError::not_found("GoalCategory", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{Board, MockBoardRepository, MockCategoryRepository};

    fn requester() -> Requester {
        Requester {
            id: Uuid::now_v7(),
            username: "ann".into(),
        }
    }

    fn category_of(owner: Uuid) -> GoalCategory {
        GoalCategory {
            id: Uuid::now_v7(),
            board_id: Uuid::now_v7(),
            user_id: owner,
            title: "Work".into(),
            is_deleted: false,
            created: Utc::now(),
            updated: Utc::now(),
        }
    }

    fn service(boards: MockBoardRepository, categories: MockCategoryRepository) -> CategoryService {
        CategoryService::new(Arc::new(boards), Arc::new(categories))
    }

    #[tokio::test]
    async fn non_owner_delete_is_forbidden_and_nothing_is_written() {
        let category = category_of(Uuid::now_v7());
        let id = category.id;
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_active()
            .returning(move |_| Ok(Some(category.clone())));
        categories.expect_soft_delete().never();

        let err = service(MockBoardRepository::new(), categories)
            .delete(&requester(), id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn non_owner_may_still_read_detail() {
        let category = category_of(Uuid::now_v7());
        let id = category.id;
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_active()
            .returning(move |_| Ok(Some(category.clone())));

        let found = service(MockBoardRepository::new(), categories)
            .get(&requester(), id)
            .await
            .unwrap();
        assert_eq!(found.id, id);
    }

    #[tokio::test]
    async fn owner_delete_soft_deletes_once() {
        let me = requester();
        let category = category_of(me.id);
        let id = category.id;
        let deleted = GoalCategory {
            is_deleted: true,
            ..category.clone()
        };
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_active()
            .returning(move |_| Ok(Some(category.clone())));
        categories
            .expect_soft_delete()
            .withf(move |target| *target == id)
            .times(1)
            .returning(move |_| Ok(deleted.clone()));

        let result = service(MockBoardRepository::new(), categories)
            .delete(&me, id)
            .await
            .unwrap();
        assert!(result.is_deleted);
    }

    #[tokio::test]
    async fn create_requires_an_owned_board() {
        let mut boards = MockBoardRepository::new();
        boards.expect_find_owned().returning(|_, _| Ok(None));
        let mut categories = MockCategoryRepository::new();
        categories.expect_create().never();

        let err = service(boards, categories)
            .create(
                &requester(),
                CreateCategory {
                    title: "Work".into(),
                    board: Uuid::now_v7(),
                },
            )
            .await
            .unwrap_err();
        match err {
            DomainError::Validation(errors) => assert!(errors.get("board").is_some()),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_sets_requester_as_owner() {
        let me = requester();
        let me_id = me.id;
        let board_id = Uuid::now_v7();
        let mut boards = MockBoardRepository::new();
        boards.expect_find_owned().returning(move |id, owner| {
            Ok(Some(Board {
                id,
                user_id: owner,
                title: "Life".into(),
                is_deleted: false,
                created: Utc::now(),
                updated: Utc::now(),
            }))
        });
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_create()
            .withf(move |new| new.user_id == me_id && new.title == "Work")
            .times(1)
            .returning(|new| {
                Ok(GoalCategory {
                    id: Uuid::now_v7(),
                    board_id: new.board_id,
                    user_id: new.user_id,
                    title: new.title,
                    is_deleted: false,
                    created: Utc::now(),
                    updated: Utc::now(),
                })
            });

        let created = service(boards, categories)
            .create(
                &me,
                CreateCategory {
                    title: " Work ".into(),
                    board: board_id,
                },
            )
            .await
            .unwrap();
        assert_eq!(created.board_id, board_id);
    }

    #[tokio::test]
    async fn replace_without_title_is_a_validation_error() {
        let me = requester();
        let category = category_of(me.id);
        let id = category.id;
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_active()
            .returning(move |_| Ok(Some(category.clone())));
        categories.expect_rename().never();

        let err = service(MockBoardRepository::new(), categories)
            .update(&me, id, UpdateCategory::default(), WriteMode::Replace)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
