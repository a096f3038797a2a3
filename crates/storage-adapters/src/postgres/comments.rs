use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

use domains::{
    CommentFilter, CommentRepository, CommentSort, DomainError, GoalComment, ListParams,
    NewComment, Page, Result,
};

use super::{db_err, push_order, push_window, PgStore, SortColumn};

const COMMENT_COLUMNS: &str = "id, goal_id, user_id, text, created, updated";

impl SortColumn for CommentSort {
    fn column(&self) -> &'static str {
        match self {
            CommentSort::Created => "created",
            CommentSort::Updated => "updated",
        }
    }
}

fn comment_from_row(row: &PgRow) -> Result<GoalComment> {
    Ok(GoalComment {
        id: row.try_get("id").map_err(db_err)?,
        goal_id: row.try_get("goal_id").map_err(db_err)?,
        user_id: row.try_get("user_id").map_err(db_err)?,
        text: row.try_get("text").map_err(db_err)?,
        created: row.try_get("created").map_err(db_err)?,
        updated: row.try_get("updated").map_err(db_err)?,
    })
}

fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, owner: Uuid, filter: &CommentFilter) {
    qb.push(" WHERE user_id = ");
    qb.push_bind(owner);
    if let Some(goal_id) = filter.goal_id {
        qb.push(" AND goal_id = ");
        qb.push_bind(goal_id);
    }
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn create(&self, comment: NewComment) -> Result<GoalComment> {
        let row = sqlx::query(&format!(
            "INSERT INTO goal_comments (id, goal_id, user_id, text) \
             VALUES ($1, $2, $3, $4) RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(comment.goal_id)
        .bind(comment.user_id)
        .bind(&comment.text)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        comment_from_row(&row)
    }

    async fn find_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<GoalComment>> {
        sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM goal_comments WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .as_ref()
        .map(comment_from_row)
        .transpose()
    }

    async fn list_owned(
        &self,
        owner: Uuid,
        filter: &CommentFilter,
        params: &ListParams<CommentSort>,
    ) -> Result<Page<GoalComment>> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM goal_comments");
        push_scope(&mut count_qb, owner, filter);
        let count = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {COMMENT_COLUMNS} FROM goal_comments"));
        push_scope(&mut qb, owner, filter);
        push_order(&mut qb, &params.ordering, "id");
        push_window(&mut qb, &params.window);
        let rows = qb.build().fetch_all(&self.pool).await.map_err(db_err)?;

        Ok(Page {
            count: count as u64,
            items: rows.iter().map(comment_from_row).collect::<Result<_>>()?,
        })
    }

    async fn update_text(&self, id: Uuid, text: String) -> Result<GoalComment> {
        sqlx::query(&format!(
            "UPDATE goal_comments SET text = $2, updated = now() \
             WHERE id = $1 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(&text)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .as_ref()
        .map(comment_from_row)
        .transpose()?
        .ok_or_else(|| DomainError::not_found("GoalComment", id))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let affected = sqlx::query("DELETE FROM goal_comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?
            .rows_affected();
        if affected == 0 {
            return Err(DomainError::not_found("GoalComment", id));
        }
        Ok(())
    }
}
