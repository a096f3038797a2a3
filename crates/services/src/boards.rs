//! Board use cases. Boards are owner-scoped on every read.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use domains::validation::clean_title;
use domains::{
    check_object, Access, Board, BoardRepository, BoardSort, DomainError, ListParams, NewBoard,
    Page, Requester, Result, ValidationErrors,
};

use crate::input::WriteMode;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBoard {
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBoard {
    pub title: Option<String>,
}

pub struct BoardService {
    boards: Arc<dyn BoardRepository>,
}

impl BoardService {
    pub fn new(boards: Arc<dyn BoardRepository>) -> Self {
        Self { boards }
    }

    pub async fn create(&self, requester: &Requester, input: CreateBoard) -> Result<Board> {
        let mut errors = ValidationErrors::new();
        let title = clean_title(&mut errors, "title", &input.title);
        errors.into_result()?;

        let board = self
            .boards
            .create(NewBoard {
                user_id: requester.id,
                title,
            })
            .await?;
        info!(subsystem = "boards", op = "create", board_id = %board.id, user_id = %requester.id, "Board created");
        Ok(board)
    }

    pub async fn list(
        &self,
        requester: &Requester,
        params: &ListParams<BoardSort>,
    ) -> Result<Page<Board>> {
        self.boards.list_owned(requester.id, params).await
    }

    pub async fn get(&self, requester: &Requester, id: Uuid) -> Result<Board> {
        let board = self.lookup(requester, id).await?;
        check_object(requester, &board, Access::Read)?;
        Ok(board)
    }

    pub async fn update(
        &self,
        requester: &Requester,
        id: Uuid,
        input: UpdateBoard,
        mode: WriteMode,
    ) -> Result<Board> {
        let board = self.lookup(requester, id).await?;
        check_object(requester, &board, Access::Write)?;

        let mut errors = ValidationErrors::new();
        mode.require(&mut errors, "title", &input.title);
        let title = input
            .title
            .as_deref()
            .map(|raw| clean_title(&mut errors, "title", raw));
        errors.into_result()?;

        match title {
            Some(title) => self.boards.rename(board.id, title).await,
            None => Ok(board),
        }
    }

    /// Soft-deletes the board, its categories and archives their goals.
    pub async fn delete(&self, requester: &Requester, id: Uuid) -> Result<Board> {
        let board = self.lookup(requester, id).await?;
        check_object(requester, &board, Access::Write)?;

        let board = self.boards.soft_delete(board.id).await?;
        info!(subsystem = "boards", op = "soft_delete", board_id = %board.id, user_id = %requester.id, "Board deleted with its categories");
        Ok(board)
    }

    async fn lookup(&self, requester: &Requester, id: Uuid) -> Result<Board> {
        self.boards
            .find_owned(id, requester.id)
            .await?
            .ok_or_else(|| DomainError::not_found("Board", id))
    }
}
