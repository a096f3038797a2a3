use axum::http::StatusCode;
use serde_json::json;

use domains::{CommentFilter, CommentRepository, ListParams, NewComment};
use integration_tests::factories::{BoardFactory, CategoryFactory, CommentFactory, GoalFactory};
use integration_tests::{TestApp, TestUser};
use uuid::Uuid;

async fn goal_for(app: &TestApp, user: &TestUser) -> Uuid {
    let services = app.services();
    let board = services
        .boards
        .create(&user.requester, BoardFactory::create())
        .await
        .unwrap();
    let category = services
        .categories
        .create(&user.requester, CategoryFactory::create(board.id))
        .await
        .unwrap();
    services
        .goals
        .create(&user.requester, GoalFactory::create(category.id))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn comment_list_shows_only_the_callers_own_comments() {
    let app = TestApp::new();
    let ann = app.user().await;
    let eve = app.user().await;
    let goal = goal_for(&app, &ann).await;

    let mine = app
        .services()
        .comments
        .create(&ann.requester, CommentFactory::create(goal))
        .await
        .unwrap();
    // Written straight to storage: the service refuses comments on goals
    // the author does not own.
    let theirs = CommentRepository::create(
        &*app.store,
        NewComment {
            goal_id: goal,
            user_id: eve.requester.id,
            text: "drive-by".into(),
        },
    )
    .await
    .unwrap();

    let (status, list) = app.get(&ann, &format!("/goals/goal_comment/list?goal={goal}")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![mine.id.to_string()]);

    let (_, list) = app.get(&eve, "/goals/goal_comment/list").await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], theirs.id.to_string());

    let page = app
        .services()
        .comments
        .list(&ann.requester, &CommentFilter::default(), &ListParams::comments())
        .await
        .unwrap();
    assert_eq!(page.count, 1);
}

#[tokio::test]
async fn comment_goal_filter_takes_exactly_one_id() {
    let app = TestApp::new();
    let ann = app.user().await;
    let first = goal_for(&app, &ann).await;
    let second = goal_for(&app, &ann).await;
    for goal in [first, second] {
        app.services()
            .comments
            .create(&ann.requester, CommentFactory::create(goal))
            .await
            .unwrap();
    }

    let (status, body) = app
        .get(&ann, &format!("/goals/goal_comment/list?goal={first},{second}"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["goal"], json!(["Enter a valid UUID."]));

    let (status, list) = app.get(&ann, &format!("/goals/goal_comment/list?goal={second}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["goal"], second.to_string());
}

#[tokio::test]
async fn someone_elses_comment_is_not_found() {
    let app = TestApp::new();
    let ann = app.user().await;
    let eve = app.user().await;
    let goal = goal_for(&app, &ann).await;
    let comment = app
        .services()
        .comments
        .create(&ann.requester, CommentFactory::create(goal))
        .await
        .unwrap();
    let uri = format!("/goals/goal_comment/{}", comment.id);

    for (status, _) in [
        app.get(&eve, &uri).await,
        app.patch(&eve, &uri, json!({"text": "edited"})).await,
        app.delete(&eve, &uri).await,
    ] {
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let (status, body) = app.get(&ann, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], comment.text);
}

#[tokio::test]
async fn comments_are_edited_and_physically_deleted_by_their_author() {
    let app = TestApp::new();
    let ann = app.user().await;
    let goal = goal_for(&app, &ann).await;

    let (status, comment) = app
        .post(&ann, "/goals/goal_comment/create", json!({"goal": goal, "text": "first"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["goal"], goal.to_string());
    let uri = format!("/goals/goal_comment/{}", comment["id"].as_str().unwrap());

    let (status, body) = app.patch(&ann, &uri, json!({"text": "second"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "second");

    let (status, body) = app.patch(&ann, &uri, json!({"text": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["text"].is_array());

    let (status, _) = app.delete(&ann, &uri).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&ann, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, list) = app.get(&ann, "/goals/goal_comment/list").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn comments_need_a_visible_goal_of_the_caller() {
    let app = TestApp::new();
    let ann = app.user().await;
    let eve = app.user().await;
    let goal = goal_for(&app, &ann).await;

    let (status, body) = app
        .post(&eve, "/goals/goal_comment/create", json!({"goal": goal, "text": "hi"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["goal"].is_array());

    app.services().goals.delete(&ann.requester, goal).await.unwrap();
    let (status, body) = app
        .post(&ann, "/goals/goal_comment/create", json!({"goal": goal, "text": "late"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["goal"].is_array());
}
