use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

use domains::{
    DomainError, Goal, GoalChanges, GoalFilter, GoalPriority, GoalRepository, GoalSort,
    GoalStatus, ListParams, NewGoal, Page, Result,
};

use super::{db_err, like_pattern, push_order, push_window, PgStore, SortColumn};

const GOAL_COLUMNS: &str = "g.id, g.category_id, g.user_id, g.title, g.description, g.status, \
                            g.priority, g.due_date, g.created, g.updated";

/// Goals joined to their category, restricted to visible rows.
const VISIBLE_GOALS: &str = "FROM goals g JOIN goal_categories c ON c.id = g.category_id \
                             WHERE c.is_deleted = FALSE AND g.status <> 'archived'";

impl SortColumn for GoalSort {
    fn column(&self) -> &'static str {
        match self {
            GoalSort::Title => "LOWER(g.title)",
            GoalSort::Created => "g.created",
        }
    }
}

fn goal_from_row(row: &PgRow) -> Result<Goal> {
    let status: String = row.try_get("status").map_err(db_err)?;
    let priority: String = row.try_get("priority").map_err(db_err)?;
    Ok(Goal {
        id: row.try_get("id").map_err(db_err)?,
        category_id: row.try_get("category_id").map_err(db_err)?,
        user_id: row.try_get("user_id").map_err(db_err)?,
        title: row.try_get("title").map_err(db_err)?,
        description: row.try_get("description").map_err(db_err)?,
        status: status.parse::<GoalStatus>().map_err(DomainError::Internal)?,
        priority: priority
            .parse::<GoalPriority>()
            .map_err(DomainError::Internal)?,
        due_date: row.try_get("due_date").map_err(db_err)?,
        created: row.try_get("created").map_err(db_err)?,
        updated: row.try_get("updated").map_err(db_err)?,
    })
}

fn push_scope(
    qb: &mut QueryBuilder<'_, Postgres>,
    owner: Uuid,
    filter: &GoalFilter,
    params: &ListParams<GoalSort>,
) {
    qb.push(" AND g.user_id = ");
    qb.push_bind(owner);
    if let Some(from) = filter.due_date_gte {
        qb.push(" AND g.due_date >= ");
        qb.push_bind(from);
    }
    if let Some(to) = filter.due_date_lte {
        qb.push(" AND g.due_date <= ");
        qb.push_bind(to);
    }
    if let Some(categories) = &filter.categories {
        qb.push(" AND g.category_id = ANY(");
        qb.push_bind(categories.clone());
        qb.push(")");
    }
    if let Some(statuses) = &filter.statuses {
        qb.push(" AND g.status = ANY(");
        qb.push_bind(
            statuses
                .iter()
                .map(|s| s.as_str().to_string())
                .collect::<Vec<_>>(),
        );
        qb.push(")");
    }
    if let Some(priorities) = &filter.priorities {
        qb.push(" AND g.priority = ANY(");
        qb.push_bind(
            priorities
                .iter()
                .map(|p| p.as_str().to_string())
                .collect::<Vec<_>>(),
        );
        qb.push(")");
    }
    for term in params.search_terms() {
        let pattern = like_pattern(term);
        qb.push(" AND (g.title ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR g.description ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
}

#[async_trait]
impl GoalRepository for PgStore {
    async fn create(&self, goal: NewGoal) -> Result<Goal> {
        let row = sqlx::query(&format!(
            "INSERT INTO goals AS g (id, category_id, user_id, title, description, status, priority, due_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {GOAL_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(goal.category_id)
        .bind(goal.user_id)
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.status.as_str())
        .bind(goal.priority.as_str())
        .bind(goal.due_date)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        goal_from_row(&row)
    }

    async fn find_visible(&self, id: Uuid) -> Result<Option<Goal>> {
        sqlx::query(&format!(
            "SELECT {GOAL_COLUMNS} {VISIBLE_GOALS} AND g.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .as_ref()
        .map(goal_from_row)
        .transpose()
    }

    async fn list_owned(
        &self,
        owner: Uuid,
        filter: &GoalFilter,
        params: &ListParams<GoalSort>,
    ) -> Result<Page<Goal>> {
        let mut count_qb = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) {VISIBLE_GOALS}"));
        push_scope(&mut count_qb, owner, filter, params);
        let count = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {GOAL_COLUMNS} {VISIBLE_GOALS}"));
        push_scope(&mut qb, owner, filter, params);
        push_order(&mut qb, &params.ordering, "g.id");
        push_window(&mut qb, &params.window);
        let rows = qb.build().fetch_all(&self.pool).await.map_err(db_err)?;

        Ok(Page {
            count: count as u64,
            items: rows.iter().map(goal_from_row).collect::<Result<_>>()?,
        })
    }

    async fn update(&self, id: Uuid, changes: GoalChanges) -> Result<Goal> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE goals AS g SET updated = now()");
        if let Some(category_id) = changes.category_id {
            qb.push(", category_id = ");
            qb.push_bind(category_id);
        }
        if let Some(title) = changes.title {
            qb.push(", title = ");
            qb.push_bind(title);
        }
        if let Some(description) = changes.description {
            qb.push(", description = ");
            qb.push_bind(description);
        }
        if let Some(status) = changes.status {
            qb.push(", status = ");
            qb.push_bind(status.as_str());
        }
        if let Some(priority) = changes.priority {
            qb.push(", priority = ");
            qb.push_bind(priority.as_str());
        }
        if let Some(due_date) = changes.due_date {
            qb.push(", due_date = ");
            qb.push_bind(due_date);
        }
        qb.push(" WHERE g.id = ");
        qb.push_bind(id);
        qb.push(format!(" RETURNING {GOAL_COLUMNS}"));

        qb.build()
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(goal_from_row)
            .transpose()?
            .ok_or_else(|| DomainError::not_found("Goal", id))
    }

    async fn archive(&self, id: Uuid) -> Result<Goal> {
        sqlx::query(&format!(
            "UPDATE goals AS g SET status = $2 WHERE g.id = $1 RETURNING {GOAL_COLUMNS}"
        ))
        .bind(id)
        .bind(GoalStatus::Archived.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .as_ref()
        .map(goal_from_row)
        .transpose()?
        .ok_or_else(|| DomainError::not_found("Goal", id))
    }
}
