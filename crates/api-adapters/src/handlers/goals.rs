use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode, Uri},
    routing::{get, post},
    Extension, Json, Router,
};

use domains::{Goal, ListParams, Requester};
use services::{CreateGoal, UpdateGoal, WriteMode};

use super::{list_body, parse_id};
use crate::error::ApiResult;
use crate::pagination::ListBody;
use crate::query::GoalQuery;
use crate::AppState;

async fn create_goal(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    payload: Result<Json<CreateGoal>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Goal>)> {
    let Json(input) = payload?;
    let goal = state.services.goals.create(&requester, input).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

async fn list_goals(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    uri: Uri,
    headers: HeaderMap,
    query: Result<Query<GoalQuery>, QueryRejection>,
) -> ApiResult<Json<ListBody<Goal>>> {
    let Query(query) = query?;
    let filter = query.filter()?;
    let params = query.list.params(ListParams::goals());
    let page = state.services.goals.list(&requester, &filter, &params).await?;
    Ok(list_body(page, &params.window, &uri, &headers))
}

async fn get_goal(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<String>,
) -> ApiResult<Json<Goal>> {
    let id = parse_id("Goal", &id)?;
    Ok(Json(state.services.goals.get(&requester, id).await?))
}

async fn write_goal(
    state: AppState,
    requester: Requester,
    id: String,
    payload: Result<Json<UpdateGoal>, JsonRejection>,
    mode: WriteMode,
) -> ApiResult<Json<Goal>> {
    let id = parse_id("Goal", &id)?;
    let Json(input) = payload?;
    let goal = state
        .services
        .goals
        .update(&requester, id, input, mode)
        .await?;
    Ok(Json(goal))
}

async fn put_goal(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateGoal>, JsonRejection>,
) -> ApiResult<Json<Goal>> {
    write_goal(state, requester, id, payload, WriteMode::Replace).await
}

async fn patch_goal(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateGoal>, JsonRejection>,
) -> ApiResult<Json<Goal>> {
    write_goal(state, requester, id, payload, WriteMode::Partial).await
}

async fn delete_goal(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id("Goal", &id)?;
    // Archives; the row stays.
    state.services.goals.delete(&requester, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/goals/goal/create", post(create_goal))
        .route("/goals/goal/list", get(list_goals))
        .route(
            "/goals/goal/{id}",
            get(get_goal)
                .put(put_goal)
                .patch(patch_goal)
                .delete(delete_goal),
        )
}
