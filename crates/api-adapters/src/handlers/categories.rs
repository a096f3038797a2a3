use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode, Uri},
    routing::{get, post},
    Extension, Json, Router,
};

use domains::{GoalCategory, ListParams, Requester};
use services::{CreateCategory, UpdateCategory, WriteMode};

use super::{list_body, parse_id};
use crate::error::ApiResult;
use crate::pagination::ListBody;
use crate::query::ListQuery;
use crate::AppState;

async fn create_category(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    payload: Result<Json<CreateCategory>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<GoalCategory>)> {
    let Json(input) = payload?;
    let category = state.services.categories.create(&requester, input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn list_categories(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    uri: Uri,
    headers: HeaderMap,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<ListBody<GoalCategory>>> {
    let Query(query) = query?;
    let params = query.params(ListParams::categories());
    let page = state.services.categories.list(&requester, &params).await?;
    Ok(list_body(page, &params.window, &uri, &headers))
}

async fn get_category(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<String>,
) -> ApiResult<Json<GoalCategory>> {
    let id = parse_id("GoalCategory", &id)?;
    Ok(Json(state.services.categories.get(&requester, id).await?))
}

async fn write_category(
    state: AppState,
    requester: Requester,
    id: String,
    payload: Result<Json<UpdateCategory>, JsonRejection>,
    mode: WriteMode,
) -> ApiResult<Json<GoalCategory>> {
    let id = parse_id("GoalCategory", &id)?;
    let Json(input) = payload?;
    let category = state
        .services
        .categories
        .update(&requester, id, input, mode)
        .await?;
    Ok(Json(category))
}

async fn put_category(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCategory>, JsonRejection>,
) -> ApiResult<Json<GoalCategory>> {
    write_category(state, requester, id, payload, WriteMode::Replace).await
}

async fn patch_category(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCategory>, JsonRejection>,
) -> ApiResult<Json<GoalCategory>> {
    write_category(state, requester, id, payload, WriteMode::Partial).await
}

async fn delete_category(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id("GoalCategory", &id)?;
    state.services.categories.delete(&requester, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/goals/goal_category/create", post(create_category))
        .route("/goals/goal_category/list", get(list_categories))
        .route(
            "/goals/goal_category/{id}",
            get(get_category)
                .put(put_category)
                .patch(patch_category)
                .delete(delete_category),
        )
}
