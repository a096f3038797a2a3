//! Goal comment use cases. Every lookup is scoped to the comment author, so
//! other users' comments are simply not found, even on goals the caller owns.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use domains::validation::clean_text;
use domains::{
    check_object, Access, CommentFilter, CommentRepository, CommentSort, DomainError,
    GoalComment, GoalRepository, ListParams, NewComment, Page, Requester, Result,
    ValidationErrors,
};

use crate::input::WriteMode;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub goal: Uuid,
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateComment {
    pub text: Option<String>,
}

pub struct CommentService {
    goals: Arc<dyn GoalRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(goals: Arc<dyn GoalRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { goals, comments }
    }

    pub async fn create(&self, requester: &Requester, input: CreateComment) -> Result<GoalComment> {
        let mut errors = ValidationErrors::new();
        let text = clean_text(&mut errors, "text", &input.text);
        match self.goals.find_visible(input.goal).await? {
            None => errors.add("goal", "Goal not found."),
            Some(goal) if goal.user_id != requester.id => {
                errors.add("goal", "You are not the owner of this goal.")
            }
            Some(_) => {}
        }
        errors.into_result()?;

        let comment = self
            .comments
            .create(NewComment {
                goal_id: input.goal,
                user_id: requester.id,
                text,
            })
            .await?;
        info!(subsystem = "comments", op = "create", comment_id = %comment.id, goal_id = %comment.goal_id, "Comment created");
        Ok(comment)
    }

    pub async fn list(
        &self,
        requester: &Requester,
        filter: &CommentFilter,
        params: &ListParams<CommentSort>,
    ) -> Result<Page<GoalComment>> {
        self.comments.list_owned(requester.id, filter, params).await
    }

    pub async fn get(&self, requester: &Requester, id: Uuid) -> Result<GoalComment> {
        let comment = self.lookup(requester, id).await?;
        check_object(requester, &comment, Access::Read)?;
        Ok(comment)
    }

    pub async fn update(
        &self,
        requester: &Requester,
        id: Uuid,
        input: UpdateComment,
        mode: WriteMode,
    ) -> Result<GoalComment> {
        let comment = self.lookup(requester, id).await?;
        check_object(requester, &comment, Access::Write)?;

        let mut errors = ValidationErrors::new();
        mode.require(&mut errors, "text", &input.text);
        let text = input
            .text
            .as_deref()
            .map(|raw| clean_text(&mut errors, "text", raw));
        errors.into_result()?;

        match text {
            Some(text) => self.comments.update_text(comment.id, text).await,
            None => Ok(comment),
        }
    }

    /// Comments are the one resource that is physically removed.
    pub async fn delete(&self, requester: &Requester, id: Uuid) -> Result<()> {
        let comment = self.lookup(requester, id).await?;
        check_object(requester, &comment, Access::Write)?;

        self.comments.delete(comment.id).await?;
        info!(subsystem = "comments", op = "delete", comment_id = %comment.id, user_id = %requester.id, "Comment deleted");
        Ok(())
    }

    async fn lookup(&self, requester: &Requester, id: Uuid) -> Result<GoalComment> {
        self.comments
            .find_owned(id, requester.id)
            .await?
            .ok_or_else(|| DomainError::not_found("GoalComment", id))
    }
}
