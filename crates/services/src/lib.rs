//! # services
//!
//! Use cases for goalboard. Every operation runs in the same order:
//! the caller is already authenticated, the row is fetched through its
//! scoped port method, the owner-or-read-only check runs, and only then is
//! anything written.

pub mod accounts;
pub mod boards;
pub mod categories;
pub mod comments;
pub mod goals;
pub mod input;

use std::sync::Arc;

use domains::{
    BoardRepository, CategoryRepository, CommentRepository, GoalRepository, PasswordHasher,
    TokenService, UserRepository,
};

pub use accounts::{AccountService, Login, Signup};
pub use boards::{BoardService, CreateBoard, UpdateBoard};
pub use categories::{CategoryService, CreateCategory, UpdateCategory};
pub use comments::{CommentService, CreateComment, UpdateComment};
pub use goals::{CreateGoal, GoalService, UpdateGoal};
pub use input::WriteMode;

/// Every port the services need, as trait objects.
#[derive(Clone)]
pub struct Ports {
    pub users: Arc<dyn UserRepository>,
    pub boards: Arc<dyn BoardRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub goals: Arc<dyn GoalRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
}

impl Ports {
    /// Backs every repository port with one store.
    pub fn from_store<S>(
        store: Arc<S>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self
    where
        S: UserRepository
            + BoardRepository
            + CategoryRepository
            + GoalRepository
            + CommentRepository
            + 'static,
    {
        Self {
            users: store.clone(),
            boards: store.clone(),
            categories: store.clone(),
            goals: store.clone(),
            comments: store,
            hasher,
            tokens,
        }
    }
}

/// All use cases, wired once at startup and shared by every request.
pub struct Services {
    pub accounts: AccountService,
    pub boards: BoardService,
    pub categories: CategoryService,
    pub goals: GoalService,
    pub comments: CommentService,
}

impl Services {
    pub fn new(ports: Ports) -> Self {
        Self {
            accounts: AccountService::new(ports.users, ports.hasher, ports.tokens),
            boards: BoardService::new(ports.boards.clone()),
            categories: CategoryService::new(ports.boards, ports.categories.clone()),
            goals: GoalService::new(ports.categories, ports.goals.clone()),
            comments: CommentService::new(ports.goals, ports.comments),
        }
    }
}
