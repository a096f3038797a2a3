use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::debug;
use uuid::Uuid;

use domains::{
    CategoryRepository, CategorySort, DomainError, GoalCategory, GoalStatus, ListParams,
    NewCategory, Page, Result,
};

use super::{db_err, like_pattern, push_order, push_window, PgStore, SortColumn};

const CATEGORY_COLUMNS: &str = "id, board_id, user_id, title, is_deleted, created, updated";

impl SortColumn for CategorySort {
    fn column(&self) -> &'static str {
        match self {
            CategorySort::Title => "LOWER(title)",
            CategorySort::Created => "created",
        }
    }
}

fn category_from_row(row: &PgRow) -> Result<GoalCategory> {
    Ok(GoalCategory {
        id: row.try_get("id").map_err(db_err)?,
        board_id: row.try_get("board_id").map_err(db_err)?,
        user_id: row.try_get("user_id").map_err(db_err)?,
        title: row.try_get("title").map_err(db_err)?,
        is_deleted: row.try_get("is_deleted").map_err(db_err)?,
        created: row.try_get("created").map_err(db_err)?,
        updated: row.try_get("updated").map_err(db_err)?,
    })
}

fn push_scope(
    qb: &mut QueryBuilder<'_, Postgres>,
    owner: Uuid,
    params: &ListParams<CategorySort>,
) {
    qb.push(" WHERE user_id = ");
    qb.push_bind(owner);
    qb.push(" AND is_deleted = FALSE");
    for term in params.search_terms() {
        qb.push(" AND title ILIKE ");
        qb.push_bind(like_pattern(term));
    }
}

#[async_trait]
impl CategoryRepository for PgStore {
    async fn create(&self, category: NewCategory) -> Result<GoalCategory> {
        let row = sqlx::query(&format!(
            "INSERT INTO goal_categories (id, board_id, user_id, title) \
             VALUES ($1, $2, $3, $4) RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(category.board_id)
        .bind(category.user_id)
        .bind(&category.title)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        category_from_row(&row)
    }

    async fn find_active(&self, id: Uuid) -> Result<Option<GoalCategory>> {
        sqlx::query(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM goal_categories WHERE id = $1 AND is_deleted = FALSE"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .as_ref()
        .map(category_from_row)
        .transpose()
    }

    async fn list_owned(
        &self,
        owner: Uuid,
        params: &ListParams<CategorySort>,
    ) -> Result<Page<GoalCategory>> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM goal_categories");
        push_scope(&mut count_qb, owner, params);
        let count = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {CATEGORY_COLUMNS} FROM goal_categories"
        ));
        push_scope(&mut qb, owner, params);
        push_order(&mut qb, &params.ordering, "id");
        push_window(&mut qb, &params.window);
        let rows = qb.build().fetch_all(&self.pool).await.map_err(db_err)?;

        Ok(Page {
            count: count as u64,
            items: rows
                .iter()
                .map(category_from_row)
                .collect::<Result<_>>()?,
        })
    }

    async fn rename(&self, id: Uuid, title: String) -> Result<GoalCategory> {
        sqlx::query(&format!(
            "UPDATE goal_categories SET title = $2, updated = now() \
             WHERE id = $1 RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .bind(&title)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .as_ref()
        .map(category_from_row)
        .transpose()?
        .ok_or_else(|| DomainError::not_found("GoalCategory", id))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<GoalCategory> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // 1. Flag the category; only that column is written.
        let row = sqlx::query(&format!(
            "UPDATE goal_categories SET is_deleted = TRUE WHERE id = $1 RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("GoalCategory", id))?;

        // 2. Archive every goal in it with one bulk statement.
        let archived = sqlx::query("UPDATE goals SET status = $2 WHERE category_id = $1")
            .bind(id)
            .bind(GoalStatus::Archived.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?
            .rows_affected();

        tx.commit().await.map_err(db_err)?;
        debug!(category_id = %id, archived, "category soft-deleted");
        category_from_row(&row)
    }
}
