use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode, Uri},
    routing::{get, post},
    Extension, Json, Router,
};

use domains::{GoalComment, ListParams, Requester};
use services::{CreateComment, UpdateComment, WriteMode};

use super::{list_body, parse_id};
use crate::error::ApiResult;
use crate::pagination::ListBody;
use crate::query::CommentQuery;
use crate::AppState;

async fn create_comment(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    payload: Result<Json<CreateComment>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<GoalComment>)> {
    let Json(input) = payload?;
    let comment = state.services.comments.create(&requester, input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_comments(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    uri: Uri,
    headers: HeaderMap,
    query: Result<Query<CommentQuery>, QueryRejection>,
) -> ApiResult<Json<ListBody<GoalComment>>> {
    let Query(query) = query?;
    let filter = query.filter()?;
    let params = query.list.params_unsearched(ListParams::comments());
    let page = state.services.comments.list(&requester, &filter, &params).await?;
    Ok(list_body(page, &params.window, &uri, &headers))
}

async fn get_comment(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<String>,
) -> ApiResult<Json<GoalComment>> {
    let id = parse_id("GoalComment", &id)?;
    Ok(Json(state.services.comments.get(&requester, id).await?))
}

async fn write_comment(
    state: AppState,
    requester: Requester,
    id: String,
    payload: Result<Json<UpdateComment>, JsonRejection>,
    mode: WriteMode,
) -> ApiResult<Json<GoalComment>> {
    let id = parse_id("GoalComment", &id)?;
    let Json(input) = payload?;
    let comment = state
        .services
        .comments
        .update(&requester, id, input, mode)
        .await?;
    Ok(Json(comment))
}

async fn put_comment(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateComment>, JsonRejection>,
) -> ApiResult<Json<GoalComment>> {
    write_comment(state, requester, id, payload, WriteMode::Replace).await
}

async fn patch_comment(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateComment>, JsonRejection>,
) -> ApiResult<Json<GoalComment>> {
    write_comment(state, requester, id, payload, WriteMode::Partial).await
}

async fn delete_comment(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id("GoalComment", &id)?;
    state.services.comments.delete(&requester, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/goals/goal_comment/create", post(create_comment))
        .route("/goals/goal_comment/list", get(list_comments))
        .route(
            "/goals/goal_comment/{id}",
            get(get_comment)
                .put(put_comment)
                .patch(patch_comment)
                .delete(delete_comment),
        )
}
