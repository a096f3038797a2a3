use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode, Uri},
    routing::{get, post},
    Extension, Json, Router,
};

use domains::{Board, ListParams, Requester};
use services::{CreateBoard, UpdateBoard, WriteMode};

use super::{list_body, parse_id};
use crate::error::ApiResult;
use crate::pagination::ListBody;
use crate::query::ListQuery;
use crate::AppState;

async fn create_board(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    payload: Result<Json<CreateBoard>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Board>)> {
    let Json(input) = payload?;
    let board = state.services.boards.create(&requester, input).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

async fn list_boards(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    uri: Uri,
    headers: HeaderMap,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<ListBody<Board>>> {
    let Query(query) = query?;
    let params = query.params(ListParams::boards());
    let page = state.services.boards.list(&requester, &params).await?;
    Ok(list_body(page, &params.window, &uri, &headers))
}

async fn get_board(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<String>,
) -> ApiResult<Json<Board>> {
    let id = parse_id("Board", &id)?;
    Ok(Json(state.services.boards.get(&requester, id).await?))
}

async fn write_board(
    state: AppState,
    requester: Requester,
    id: String,
    payload: Result<Json<UpdateBoard>, JsonRejection>,
    mode: WriteMode,
) -> ApiResult<Json<Board>> {
    let id = parse_id("Board", &id)?;
    let Json(input) = payload?;
    let board = state
        .services
        .boards
        .update(&requester, id, input, mode)
        .await?;
    Ok(Json(board))
}

async fn put_board(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateBoard>, JsonRejection>,
) -> ApiResult<Json<Board>> {
    write_board(state, requester, id, payload, WriteMode::Replace).await
}

async fn patch_board(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateBoard>, JsonRejection>,
) -> ApiResult<Json<Board>> {
    write_board(state, requester, id, payload, WriteMode::Partial).await
}

async fn delete_board(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id("Board", &id)?;
    state.services.boards.delete(&requester, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/goals/board/create", post(create_board))
        .route("/goals/board/list", get(list_boards))
        .route(
            "/goals/board/{id}",
            get(get_board)
                .put(put_board)
                .patch(patch_board)
                .delete(delete_board),
        )
}
