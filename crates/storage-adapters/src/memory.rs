//! # In-process store
//!
//! Implements every repository port over plain maps. All tables sit behind a
//! single `RwLock`, so a multi-table change (category soft delete, board
//! cascade) happens under one write guard and readers never observe half of
//! it. Used by the `memory` backend and by the test suites.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use domains::{
    matches_search, Board, BoardRepository, BoardSort, CategoryRepository, CategorySort,
    CommentFilter, CommentRepository, CommentSort, DomainError, Goal, GoalCategory, GoalChanges,
    GoalComment, GoalFilter, GoalRepository, GoalSort, GoalStatus, ListParams, NewBoard,
    NewCategory, NewComment, NewGoal, NewUser, OrderBy, Page, Result, SortField, User,
    UserRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    boards: HashMap<Uuid, Board>,
    categories: HashMap<Uuid, GoalCategory>,
    goals: HashMap<Uuid, Goal>,
    comments: HashMap<Uuid, GoalComment>,
}

impl Tables {
    fn goal_is_visible(&self, goal: &Goal) -> bool {
        self.categories
            .get(&goal.category_id)
            .is_some_and(|category| goal.is_visible_in(category))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw rows, bypassing every scoping rule. For inspection in tests.
    pub async fn board_row(&self, id: Uuid) -> Option<Board> {
        self.tables.read().await.boards.get(&id).cloned()
    }

    pub async fn category_row(&self, id: Uuid) -> Option<GoalCategory> {
        self.tables.read().await.categories.get(&id).cloned()
    }

    pub async fn goal_row(&self, id: Uuid) -> Option<Goal> {
        self.tables.read().await.goals.get(&id).cloned()
    }

    /// A category and every goal filed under it, read under one guard.
    pub async fn category_snapshot(&self, id: Uuid) -> Option<(GoalCategory, Vec<Goal>)> {
        let tables = self.tables.read().await;
        let category = tables.categories.get(&id).cloned()?;
        let goals = tables
            .goals
            .values()
            .filter(|g| g.category_id == id)
            .cloned()
            .collect();
        Some((category, goals))
    }
}

/// Titles order case-insensitively; the id tie-break settles equal ones.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Column comparison for one sort key.
trait SortKey<T>: SortField {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl SortKey<Board> for BoardSort {
    fn compare(&self, a: &Board, b: &Board) -> Ordering {
        match self {
            BoardSort::Title => compare_titles(&a.title, &b.title),
            BoardSort::Created => a.created.cmp(&b.created),
        }
    }
}

impl SortKey<GoalCategory> for CategorySort {
    fn compare(&self, a: &GoalCategory, b: &GoalCategory) -> Ordering {
        match self {
            CategorySort::Title => compare_titles(&a.title, &b.title),
            CategorySort::Created => a.created.cmp(&b.created),
        }
    }
}

impl SortKey<Goal> for GoalSort {
    fn compare(&self, a: &Goal, b: &Goal) -> Ordering {
        match self {
            GoalSort::Title => compare_titles(&a.title, &b.title),
            GoalSort::Created => a.created.cmp(&b.created),
        }
    }
}

impl SortKey<GoalComment> for CommentSort {
    fn compare(&self, a: &GoalComment, b: &GoalComment) -> Ordering {
        match self {
            CommentSort::Created => a.created.cmp(&b.created),
            CommentSort::Updated => a.updated.cmp(&b.updated),
        }
    }
}

/// Sorts by the requested keys, ties broken by id, then applies the window.
fn paginate<T, F>(mut rows: Vec<T>, params: &ListParams<F>, id: impl Fn(&T) -> Uuid) -> Page<T>
where
    F: SortKey<T>,
{
    rows.sort_by(|a, b| {
        params
            .ordering
            .iter()
            .map(|OrderBy { field, descending }| {
                let ordering = field.compare(a, b);
                if *descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| id(a).cmp(&id(b)))
    });
    Page {
        count: rows.len() as u64,
        items: params.window.slice(rows),
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(DomainError::Conflict(format!(
                "username {} already exists",
                user.username
            )));
        }
        let user = User {
            id: Uuid::now_v7(),
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl BoardRepository for MemoryStore {
    async fn create(&self, board: NewBoard) -> Result<Board> {
        let now = Utc::now();
        let board = Board {
            id: Uuid::now_v7(),
            user_id: board.user_id,
            title: board.title,
            is_deleted: false,
            created: now,
            updated: now,
        };
        self.tables
            .write()
            .await
            .boards
            .insert(board.id, board.clone());
        Ok(board)
    }

    async fn find_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<Board>> {
        Ok(self
            .tables
            .read()
            .await
            .boards
            .get(&id)
            .filter(|b| b.user_id == owner && !b.is_deleted)
            .cloned())
    }

    async fn list_owned(
        &self,
        owner: Uuid,
        params: &ListParams<BoardSort>,
    ) -> Result<Page<Board>> {
        let tables = self.tables.read().await;
        let terms = params.search_terms();
        let rows = tables
            .boards
            .values()
            .filter(|b| b.user_id == owner && !b.is_deleted)
            .filter(|b| matches_search(&[b.title.as_str()], &terms))
            .cloned()
            .collect();
        Ok(paginate(rows, params, |b| b.id))
    }

    async fn rename(&self, id: Uuid, title: String) -> Result<Board> {
        let mut tables = self.tables.write().await;
        let board = tables
            .boards
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Board", id))?;
        board.title = title;
        board.updated = Utc::now();
        Ok(board.clone())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<Board> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        let board = tables
            .boards
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Board", id))?;
        board.is_deleted = true;
        let board = board.clone();

        let mut category_ids = Vec::new();
        for category in tables.categories.values_mut().filter(|c| c.board_id == id) {
            category.is_deleted = true;
            category_ids.push(category.id);
        }
        for goal in tables
            .goals
            .values_mut()
            .filter(|g| category_ids.contains(&g.category_id))
        {
            goal.status = GoalStatus::Archived;
        }
        debug!(board_id = %id, categories = category_ids.len(), "board soft-deleted in memory");
        Ok(board)
    }

    async fn purge(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.categories.values().any(|c| c.board_id == id) {
            return Err(DomainError::Protected(format!(
                "board {id} is still referenced by goal categories"
            )));
        }
        tables
            .boards
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("Board", id))
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create(&self, category: NewCategory) -> Result<GoalCategory> {
        let mut tables = self.tables.write().await;
        if !tables.boards.contains_key(&category.board_id) {
            return Err(DomainError::not_found("Board", category.board_id));
        }
        let now = Utc::now();
        let category = GoalCategory {
            id: Uuid::now_v7(),
            board_id: category.board_id,
            user_id: category.user_id,
            title: category.title,
            is_deleted: false,
            created: now,
            updated: now,
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_active(&self, id: Uuid) -> Result<Option<GoalCategory>> {
        Ok(self
            .tables
            .read()
            .await
            .categories
            .get(&id)
            .filter(|c| !c.is_deleted)
            .cloned())
    }

    async fn list_owned(
        &self,
        owner: Uuid,
        params: &ListParams<CategorySort>,
    ) -> Result<Page<GoalCategory>> {
        let tables = self.tables.read().await;
        let terms = params.search_terms();
        let rows = tables
            .categories
            .values()
            .filter(|c| c.user_id == owner && !c.is_deleted)
            .filter(|c| matches_search(&[c.title.as_str()], &terms))
            .cloned()
            .collect();
        Ok(paginate(rows, params, |c| c.id))
    }

    async fn rename(&self, id: Uuid, title: String) -> Result<GoalCategory> {
        let mut tables = self.tables.write().await;
        let category = tables
            .categories
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("GoalCategory", id))?;
        category.title = title;
        category.updated = Utc::now();
        Ok(category.clone())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<GoalCategory> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        let category = tables
            .categories
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("GoalCategory", id))?;
        category.is_deleted = true;
        let category = category.clone();

        let mut archived = 0usize;
        for goal in tables.goals.values_mut().filter(|g| g.category_id == id) {
            goal.status = GoalStatus::Archived;
            archived += 1;
        }
        debug!(category_id = %id, archived, "category soft-deleted in memory");
        Ok(category)
    }
}

#[async_trait]
impl GoalRepository for MemoryStore {
    async fn create(&self, goal: NewGoal) -> Result<Goal> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&goal.category_id) {
            return Err(DomainError::not_found("GoalCategory", goal.category_id));
        }
        let now = Utc::now();
        let goal = Goal {
            id: Uuid::now_v7(),
            category_id: goal.category_id,
            user_id: goal.user_id,
            title: goal.title,
            description: goal.description,
            status: goal.status,
            priority: goal.priority,
            due_date: goal.due_date,
            created: now,
            updated: now,
        };
        tables.goals.insert(goal.id, goal.clone());
        Ok(goal)
    }

    async fn find_visible(&self, id: Uuid) -> Result<Option<Goal>> {
        let tables = self.tables.read().await;
        Ok(tables
            .goals
            .get(&id)
            .filter(|g| tables.goal_is_visible(g))
            .cloned())
    }

    async fn list_owned(
        &self,
        owner: Uuid,
        filter: &GoalFilter,
        params: &ListParams<GoalSort>,
    ) -> Result<Page<Goal>> {
        let tables = self.tables.read().await;
        let terms = params.search_terms();
        let rows = tables
            .goals
            .values()
            .filter(|g| g.user_id == owner && tables.goal_is_visible(g))
            .filter(|g| filter.accepts(g.category_id, g.status, g.priority, g.due_date))
            .filter(|g| {
                let description = g.description.as_deref().unwrap_or_default();
                matches_search(&[g.title.as_str(), description], &terms)
            })
            .cloned()
            .collect();
        Ok(paginate(rows, params, |g| g.id))
    }

    async fn update(&self, id: Uuid, changes: GoalChanges) -> Result<Goal> {
        let mut tables = self.tables.write().await;
        let goal = tables
            .goals
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Goal", id))?;
        if let Some(category_id) = changes.category_id {
            goal.category_id = category_id;
        }
        if let Some(title) = changes.title {
            goal.title = title;
        }
        if let Some(description) = changes.description {
            goal.description = description;
        }
        if let Some(status) = changes.status {
            goal.status = status;
        }
        if let Some(priority) = changes.priority {
            goal.priority = priority;
        }
        if let Some(due_date) = changes.due_date {
            goal.due_date = due_date;
        }
        goal.updated = Utc::now();
        Ok(goal.clone())
    }

    async fn archive(&self, id: Uuid) -> Result<Goal> {
        let mut tables = self.tables.write().await;
        let goal = tables
            .goals
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Goal", id))?;
        goal.status = GoalStatus::Archived;
        Ok(goal.clone())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, comment: NewComment) -> Result<GoalComment> {
        let mut tables = self.tables.write().await;
        if !tables.goals.contains_key(&comment.goal_id) {
            return Err(DomainError::not_found("Goal", comment.goal_id));
        }
        let now = Utc::now();
        let comment = GoalComment {
            id: Uuid::now_v7(),
            goal_id: comment.goal_id,
            user_id: comment.user_id,
            text: comment.text,
            created: now,
            updated: now,
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<GoalComment>> {
        Ok(self
            .tables
            .read()
            .await
            .comments
            .get(&id)
            .filter(|c| c.user_id == owner)
            .cloned())
    }

    async fn list_owned(
        &self,
        owner: Uuid,
        filter: &CommentFilter,
        params: &ListParams<CommentSort>,
    ) -> Result<Page<GoalComment>> {
        let tables = self.tables.read().await;
        let rows = tables
            .comments
            .values()
            .filter(|c| c.user_id == owner)
            .filter(|c| filter.goal_id.is_none_or(|goal_id| c.goal_id == goal_id))
            .cloned()
            .collect();
        Ok(paginate(rows, params, |c| c.id))
    }

    async fn update_text(&self, id: Uuid, text: String) -> Result<GoalComment> {
        let mut tables = self.tables.write().await;
        let comment = tables
            .comments
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("GoalComment", id))?;
        comment.text = text;
        comment.updated = Utc::now();
        Ok(comment.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.tables
            .write()
            .await
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("GoalComment", id))
    }
}
