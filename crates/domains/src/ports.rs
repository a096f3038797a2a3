//! # Ports
//!
//! Any adapter must implement these traits to be used by the binary.
//! Each `find_*`/`list_*` method bakes in the scoping predicate of the
//! endpoint it serves, so callers cannot forget it.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Board, Goal, GoalCategory, GoalChanges, GoalComment, NewBoard, NewCategory, NewComment,
    NewGoal, NewUser, Requester, User,
};
use crate::query::{
    BoardSort, CategorySort, CommentFilter, CommentSort, GoalFilter, GoalSort, ListParams, Page,
};

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the username is taken.
    async fn create(&self, user: NewUser) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BoardRepository: Send + Sync {
    async fn create(&self, board: NewBoard) -> Result<Board>;
    /// owner == `owner` AND NOT is_deleted.
    async fn find_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<Board>>;
    /// owner == `owner` AND NOT is_deleted.
    async fn list_owned(&self, owner: Uuid, params: &ListParams<BoardSort>)
        -> Result<Page<Board>>;
    async fn rename(&self, id: Uuid, title: String) -> Result<Board>;
    /// Atomically marks the board and its categories deleted and archives
    /// every goal in those categories.
    async fn soft_delete(&self, id: Uuid) -> Result<Board>;
    /// Physical removal. Fails with `Protected` while any category
    /// references the board.
    async fn purge(&self, id: Uuid) -> Result<()>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: NewCategory) -> Result<GoalCategory>;
    /// NOT is_deleted. Ownership is left to the permission layer.
    async fn find_active(&self, id: Uuid) -> Result<Option<GoalCategory>>;
    /// owner == `owner` AND NOT is_deleted; search over title.
    async fn list_owned(
        &self,
        owner: Uuid,
        params: &ListParams<CategorySort>,
    ) -> Result<Page<GoalCategory>>;
    async fn rename(&self, id: Uuid, title: String) -> Result<GoalCategory>;
    /// Sets is_deleted and archives every goal of the category in one
    /// transaction. Goals are never removed.
    async fn soft_delete(&self, id: Uuid) -> Result<GoalCategory>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait GoalRepository: Send + Sync {
    async fn create(&self, goal: NewGoal) -> Result<Goal>;
    /// Category NOT is_deleted AND status != archived. Ownership is left to
    /// the permission layer.
    async fn find_visible(&self, id: Uuid) -> Result<Option<Goal>>;
    /// owner == `owner` AND category NOT is_deleted AND status != archived,
    /// narrowed by `filter`; search over title and description.
    async fn list_owned(
        &self,
        owner: Uuid,
        filter: &GoalFilter,
        params: &ListParams<GoalSort>,
    ) -> Result<Page<Goal>>;
    async fn update(&self, id: Uuid, changes: GoalChanges) -> Result<Goal>;
    /// Sets status = archived. The row stays.
    async fn archive(&self, id: Uuid) -> Result<Goal>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: NewComment) -> Result<GoalComment>;
    /// owner == `owner`.
    async fn find_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<GoalComment>>;
    /// owner == `owner`, narrowed by `filter`.
    async fn list_owned(
        &self,
        owner: Uuid,
        filter: &CommentFilter,
        params: &ListParams<CommentSort>,
    ) -> Result<Page<GoalComment>>;
    async fn update_text(&self, id: Uuid, text: String) -> Result<GoalComment>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Password hashing contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;
    /// `false` for a wrong password or an unparsable hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// A signed bearer token handed to a client at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: u64,
}

/// Bearer token contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenService: Send + Sync {
    fn issue(&self, requester: &Requester) -> Result<IssuedToken>;
    /// `Unauthorized` for malformed, forged or expired tokens.
    fn verify(&self, token: &str) -> Result<Requester>;
}
