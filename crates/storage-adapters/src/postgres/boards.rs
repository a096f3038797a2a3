use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::debug;
use uuid::Uuid;

use domains::{
    Board, BoardRepository, BoardSort, DomainError, GoalStatus, ListParams, NewBoard, Page, Result,
};

use super::{db_err, like_pattern, push_order, push_window, PgStore, SortColumn};

const BOARD_COLUMNS: &str = "id, user_id, title, is_deleted, created, updated";

impl SortColumn for BoardSort {
    fn column(&self) -> &'static str {
        match self {
            BoardSort::Title => "LOWER(title)",
            BoardSort::Created => "created",
        }
    }
}

fn board_from_row(row: &PgRow) -> Result<Board> {
    Ok(Board {
        id: row.try_get("id").map_err(db_err)?,
        user_id: row.try_get("user_id").map_err(db_err)?,
        title: row.try_get("title").map_err(db_err)?,
        is_deleted: row.try_get("is_deleted").map_err(db_err)?,
        created: row.try_get("created").map_err(db_err)?,
        updated: row.try_get("updated").map_err(db_err)?,
    })
}

fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, owner: Uuid, params: &ListParams<BoardSort>) {
    qb.push(" WHERE user_id = ");
    qb.push_bind(owner);
    qb.push(" AND is_deleted = FALSE");
    for term in params.search_terms() {
        qb.push(" AND title ILIKE ");
        qb.push_bind(like_pattern(term));
    }
}

#[async_trait]
impl BoardRepository for PgStore {
    async fn create(&self, board: NewBoard) -> Result<Board> {
        let row = sqlx::query(&format!(
            "INSERT INTO boards (id, user_id, title) VALUES ($1, $2, $3) RETURNING {BOARD_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(board.user_id)
        .bind(&board.title)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        board_from_row(&row)
    }

    async fn find_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<Board>> {
        sqlx::query(&format!(
            "SELECT {BOARD_COLUMNS} FROM boards WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .as_ref()
        .map(board_from_row)
        .transpose()
    }

    async fn list_owned(
        &self,
        owner: Uuid,
        params: &ListParams<BoardSort>,
    ) -> Result<Page<Board>> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM boards");
        push_scope(&mut count_qb, owner, params);
        let count: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {BOARD_COLUMNS} FROM boards"));
        push_scope(&mut qb, owner, params);
        push_order(&mut qb, &params.ordering, "id");
        push_window(&mut qb, &params.window);
        let rows = qb.build().fetch_all(&self.pool).await.map_err(db_err)?;

        Ok(Page {
            count: count as u64,
            items: rows.iter().map(board_from_row).collect::<Result<_>>()?,
        })
    }

    async fn rename(&self, id: Uuid, title: String) -> Result<Board> {
        sqlx::query(&format!(
            "UPDATE boards SET title = $2, updated = now() WHERE id = $1 RETURNING {BOARD_COLUMNS}"
        ))
        .bind(id)
        .bind(&title)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .as_ref()
        .map(board_from_row)
        .transpose()?
        .ok_or_else(|| DomainError::not_found("Board", id))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<Board> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let row = sqlx::query(&format!(
            "UPDATE boards SET is_deleted = TRUE WHERE id = $1 RETURNING {BOARD_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Board", id))?;

        let categories = sqlx::query("UPDATE goal_categories SET is_deleted = TRUE WHERE board_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?
            .rows_affected();

        let goals = sqlx::query(
            "UPDATE goals SET status = $2 \
             WHERE category_id IN (SELECT id FROM goal_categories WHERE board_id = $1)",
        )
        .bind(id)
        .bind(GoalStatus::Archived.as_str())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?
        .rows_affected();

        tx.commit().await.map_err(db_err)?;
        debug!(board_id = %id, categories, goals, "board soft-deleted");
        board_from_row(&row)
    }

    async fn purge(&self, id: Uuid) -> Result<()> {
        let affected = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?
            .rows_affected();
        if affected == 0 {
            return Err(DomainError::not_found("Board", id));
        }
        Ok(())
    }
}
