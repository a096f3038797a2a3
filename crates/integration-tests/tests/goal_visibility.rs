use axum::http::StatusCode;
use serde_json::json;

use domains::{GoalPriority, GoalStatus};
use integration_tests::factories::{BoardFactory, CategoryFactory, GoalFactory};
use integration_tests::{titles, TestApp, TestUser};
use uuid::Uuid;

async fn category_for(app: &TestApp, user: &TestUser) -> Uuid {
    let services = app.services();
    let board = services
        .boards
        .create(&user.requester, BoardFactory::create())
        .await
        .unwrap();
    services
        .categories
        .create(&user.requester, CategoryFactory::create(board.id))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn deleting_a_goal_archives_it_and_keeps_the_row() {
    let app = TestApp::new();
    let ann = app.user().await;
    let category = category_for(&app, &ann).await;

    let mut input = GoalFactory::create(category);
    input.title = "Run a marathon".into();
    let goal = app.services().goals.create(&ann.requester, input).await.unwrap();
    let uri = format!("/goals/goal/{}", goal.id);

    let (status, _) = app.delete(&ann, &uri).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let row = app.store.goal_row(goal.id).await.expect("row survives");
    assert_eq!(row.status, GoalStatus::Archived);
    assert_eq!(row.title, "Run a marathon");
    assert_eq!(row.updated, goal.updated);

    let (_, list) = app.get(&ann, "/goals/goal/list").await;
    assert_eq!(list, json!([]));
    let (status, _) = app.get(&ann, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&ann, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn goal_list_hides_archived_goals_and_deleted_categories() {
    let app = TestApp::new();
    let ann = app.user().await;
    let services = app.services();
    let live = category_for(&app, &ann).await;
    let doomed = category_for(&app, &ann).await;

    let mut visible = GoalFactory::create(live);
    visible.title = "Visible".into();
    services.goals.create(&ann.requester, visible).await.unwrap();

    let mut archived = GoalFactory::create(live);
    archived.title = "Archived".into();
    archived.status = Some(GoalStatus::Archived);
    services.goals.create(&ann.requester, archived).await.unwrap();

    let mut orphaned = GoalFactory::create(doomed);
    orphaned.title = "Orphaned".into();
    let orphaned = services.goals.create(&ann.requester, orphaned).await.unwrap();
    services.categories.delete(&ann.requester, doomed).await.unwrap();

    let (_, list) = app.get(&ann, "/goals/goal/list").await;
    assert_eq!(titles(&list), vec!["Visible"]);

    let (_, list) = app.get(&ann, "/goals/goal/list?status__in=archived,to_do,done,in_progress").await;
    assert_eq!(titles(&list), vec!["Visible"]);

    let (status, _) = app.get(&ann, &format!("/goals/goal/{}", orphaned.id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn goal_detail_is_readable_but_not_writable_by_others() {
    let app = TestApp::new();
    let ann = app.user().await;
    let eve = app.user().await;
    let category = category_for(&app, &ann).await;
    let goal = app
        .services()
        .goals
        .create(&ann.requester, GoalFactory::create(category))
        .await
        .unwrap();
    let uri = format!("/goals/goal/{}", goal.id);

    let (status, body) = app.get(&eve, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], ann.requester.id.to_string());

    let (status, _) = app.patch(&eve, &uri, json!({"title": "Hijacked"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&eve, &uri).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, list) = app.get(&eve, "/goals/goal/list").await;
    assert_eq!(list, json!([]));
    let row = app.store.goal_row(goal.id).await.unwrap();
    assert_eq!(row.title, goal.title);
    assert_ne!(row.status, GoalStatus::Archived);
}

#[tokio::test]
async fn patching_a_goal_with_null_category_is_rejected() {
    let app = TestApp::new();
    let ann = app.user().await;
    let category = category_for(&app, &ann).await;
    let goal = app
        .services()
        .goals
        .create(&ann.requester, GoalFactory::create(category))
        .await
        .unwrap();
    let uri = format!("/goals/goal/{}", goal.id);

    let (status, body) = app
        .patch(&ann, &uri, json!({"category": null, "title": "Renamed"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["category"], json!(["This field may not be null."]));

    let row = app.store.goal_row(goal.id).await.unwrap();
    assert_eq!(row.category_id, category);
    assert_eq!(row.title, goal.title);

    let (status, body) = app.patch(&ann, &uri, json!({"description": null})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], json!(null));
}

#[tokio::test]
async fn goal_list_filters_search_and_orders() {
    let app = TestApp::new();
    let ann = app.user().await;
    let services = app.services();
    let work = category_for(&app, &ann).await;
    let home = category_for(&app, &ann).await;

    let specs = [
        (work, "Write report", "quarterly numbers", GoalPriority::High, "2023-03-10"),
        (work, "Book flights", "conference trip", GoalPriority::Low, "2023-05-01"),
        (home, "Paint fence", "before the REPORT is due", GoalPriority::High, "2023-04-15"),
    ];
    for (category, title, description, priority, due) in specs {
        let mut input = GoalFactory::create(category);
        input.title = title.into();
        input.description = Some(description.into());
        input.priority = Some(priority);
        input.due_date = Some(due.parse().unwrap());
        services.goals.create(&ann.requester, input).await.unwrap();
    }

    let (_, list) = app.get(&ann, "/goals/goal/list").await;
    assert_eq!(titles(&list), vec!["Book flights", "Paint fence", "Write report"]);

    let (_, list) = app.get(&ann, "/goals/goal/list?ordering=-title").await;
    assert_eq!(titles(&list), vec!["Write report", "Paint fence", "Book flights"]);

    let (_, list) = app.get(&ann, "/goals/goal/list?search=report").await;
    assert_eq!(titles(&list), vec!["Paint fence", "Write report"]);

    let (_, list) = app
        .get(&ann, "/goals/goal/list?due_date__gte=2023-03-15&due_date__lte=2023-04-30")
        .await;
    assert_eq!(titles(&list), vec!["Paint fence"]);

    let (_, list) = app.get(&ann, &format!("/goals/goal/list?category={work}&priority=high")).await;
    assert_eq!(titles(&list), vec!["Write report"]);

    let (_, list) = app
        .get(&ann, &format!("/goals/goal/list?category__in={work},{home}&priority__in=low"))
        .await;
    assert_eq!(titles(&list), vec!["Book flights"]);
}

#[tokio::test]
async fn search_words_may_match_different_fields() {
    let app = TestApp::new();
    let ann = app.user().await;
    let services = app.services();
    let category = category_for(&app, &ann).await;

    let specs = [
        ("Quarterly report", "budget review"),
        ("Quarterly review", "team offsite"),
        ("Budget", "for the quarterly close"),
    ];
    for (title, description) in specs {
        let mut input = GoalFactory::create(category);
        input.title = title.into();
        input.description = Some(description.into());
        services.goals.create(&ann.requester, input).await.unwrap();
    }

    let (status, list) = app.get(&ann, "/goals/goal/list?search=quarterly%20budget").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&list), vec!["Budget", "Quarterly report"]);

    let (_, list) = app.get(&ann, "/goals/goal/list?search=%20%20quarterly%20%20").await;
    assert_eq!(titles(&list), vec!["Budget", "Quarterly report", "Quarterly review"]);

    let (_, list) = app.get(&ann, "/goals/goal/list?search=quarterly%20holiday").await;
    assert_eq!(list, json!([]));
}
