//! Fake-data builders for every write payload. Each call yields fresh,
//! unique-enough values; tests override the fields they care about.

use chrono::{Duration, Utc};
use fake::faker::internet::en::{SafeEmail, Username};
use fake::faker::lorem::en::{Sentence, Words};
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use uuid::Uuid;

use domains::GoalPriority;
use services::{CreateBoard, CreateCategory, CreateComment, CreateGoal, Signup};

fn title() -> String {
    let words: Vec<String> = Words(2..4).fake();
    words.join(" ")
}

pub struct UserFactory;

impl UserFactory {
    pub const PASSWORD: &'static str = "AnyPass2022";

    pub fn signup() -> Signup {
        let base: String = Username().fake();
        let suffix = Uuid::now_v7().simple().to_string();
        Signup {
            username: format!("{base}-{}", &suffix[suffix.len() - 8..]),
            password: Self::PASSWORD.to_string(),
            password_repeat: Self::PASSWORD.to_string(),
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            email: SafeEmail().fake(),
        }
    }
}

pub struct BoardFactory;

impl BoardFactory {
    pub fn create() -> CreateBoard {
        CreateBoard { title: title() }
    }
}

pub struct CategoryFactory;

impl CategoryFactory {
    pub fn create(board: Uuid) -> CreateCategory {
        CreateCategory {
            title: title(),
            board,
        }
    }
}

pub struct GoalFactory;

impl GoalFactory {
    pub fn create(category: Uuid) -> CreateGoal {
        let priorities = [
            GoalPriority::Low,
            GoalPriority::Medium,
            GoalPriority::High,
            GoalPriority::Critical,
        ];
        let due_in: i64 = (1..60).fake();
        CreateGoal {
            category,
            title: title(),
            description: Some(Sentence(4..10).fake()),
            status: None,
            priority: Some(priorities[(0..priorities.len()).fake::<usize>()]),
            due_date: Some((Utc::now() + Duration::days(due_in)).date_naive()),
        }
    }
}

pub struct CommentFactory;

impl CommentFactory {
    pub fn create(goal: Uuid) -> CreateComment {
        CreateComment {
            goal,
            text: Sentence(3..8).fake(),
        }
    }
}
