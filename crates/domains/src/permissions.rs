//! Object-level permission: anyone authenticated may read, only the owner
//! may write or delete.

use uuid::Uuid;

use crate::error::{DomainError, Result};
use crate::models::{Board, Goal, GoalCategory, GoalComment, Requester};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Anything with a recorded owner.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Board {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Owned for GoalCategory {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Owned for Goal {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Owned for GoalComment {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// Owner-or-read-only. Must run after the object was looked up through its
/// scoped query and before any mutation.
pub fn check_object<T: Owned>(requester: &Requester, object: &T, access: Access) -> Result<()> {
    match access {
        Access::Read => Ok(()),
        Access::Write if object.owner_id() == requester.id => Ok(()),
        Access::Write => Err(DomainError::Forbidden(
            "You do not have permission to perform this action.".to_string(),
        )),
    }
}
