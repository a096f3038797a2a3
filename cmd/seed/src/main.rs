//! Fills the configured store with a demo account and a realistic spread of
//! boards, categories, goals and comments. Everything goes through the
//! services, so the data obeys the same rules as API writes.
//!
//! ```text
//! GOALBOARD__STORAGE__BACKEND=postgres cargo run -p seed -- [username]
//! ```

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use fake::faker::lorem::en::{Sentence, Words};
use fake::Fake;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use auth_adapters::{Argon2Hasher, JwtTokenService};
use configs::{Settings, StorageBackend};
use domains::{DomainError, GoalPriority, GoalStatus, PasswordHasher, Requester, TokenService};
use services::{CreateBoard, CreateCategory, CreateComment, CreateGoal, Ports, Services, Signup};
use storage_adapters::MemoryStore;

const DEFAULT_USERNAME: &str = "demo";
const PASSWORD: &str = "DemoPass2022";

const BOARDS: &[(&str, &[&str])] = &[
    ("Personal", &["Health", "Reading", "Travel"]),
    ("Work", &["Projects", "Learning"]),
];
const GOALS_PER_CATEGORY: usize = 4;
const COMMENTS_PER_GOAL: usize = 2;

const STATUSES: [GoalStatus; 3] = [GoalStatus::ToDo, GoalStatus::InProgress, GoalStatus::Done];
const PRIORITIES: [GoalPriority; 4] = [
    GoalPriority::Low,
    GoalPriority::Medium,
    GoalPriority::High,
    GoalPriority::Critical,
];

#[derive(Debug, Default)]
struct Report {
    boards: usize,
    categories: usize,
    goals: usize,
    comments: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load settings")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log.level)),
        )
        .init();

    let username = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_USERNAME.to_string());
    let services = Services::new(build_ports(&settings).await?);

    let user = match services
        .accounts
        .signup(Signup {
            username: username.clone(),
            password: PASSWORD.to_string(),
            password_repeat: PASSWORD.to_string(),
            first_name: "Demo".to_string(),
            last_name: "User".to_string(),
            email: format!("{username}@example.com"),
        })
        .await
    {
        Ok(user) => user,
        Err(DomainError::Validation(errors)) if errors.get("username").is_some() => {
            warn!(%username, "User already exists; nothing seeded");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    let requester = Requester {
        id: user.id,
        username: user.username,
    };

    let report = seed(&services, &requester).await?;
    info!(
        %username,
        password = PASSWORD,
        boards = report.boards,
        categories = report.categories,
        goals = report.goals,
        comments = report.comments,
        "Seeded demo data"
    );
    if settings.storage.backend == StorageBackend::Memory {
        warn!("The memory backend was seeded; the data is gone once this process exits");
    }
    Ok(())
}

async fn seed(services: &Services, requester: &Requester) -> anyhow::Result<Report> {
    let mut report = Report::default();
    for (board_title, categories) in BOARDS {
        let board = services
            .boards
            .create(
                requester,
                CreateBoard {
                    title: board_title.to_string(),
                },
            )
            .await?;
        report.boards += 1;

        for category_title in *categories {
            let category = services
                .categories
                .create(
                    requester,
                    CreateCategory {
                        board: board.id,
                        title: category_title.to_string(),
                    },
                )
                .await?;
            report.categories += 1;

            for _ in 0..GOALS_PER_CATEGORY {
                let goal = services.goals.create(requester, fake_goal(category.id)).await?;
                report.goals += 1;

                for _ in 0..COMMENTS_PER_GOAL {
                    services
                        .comments
                        .create(
                            requester,
                            CreateComment {
                                goal: goal.id,
                                text: Sentence(3..10).fake(),
                            },
                        )
                        .await?;
                    report.comments += 1;
                }
            }
        }
    }
    Ok(report)
}

fn fake_goal(category: Uuid) -> CreateGoal {
    let words: Vec<String> = Words(2..5).fake();
    let due_in: i64 = (1..90).fake();
    CreateGoal {
        category,
        title: words.join(" "),
        description: Some(Sentence(6..14).fake()),
        status: Some(STATUSES[(0..STATUSES.len()).fake::<usize>()]),
        priority: Some(PRIORITIES[(0..PRIORITIES.len()).fake::<usize>()]),
        due_date: Some((Utc::now() + Duration::days(due_in)).date_naive()),
    }
}

async fn build_ports(settings: &Settings) -> anyhow::Result<Ports> {
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(
        settings.auth.secret_bytes(),
        Duration::seconds(60),
    ));

    match settings.storage.backend {
        StorageBackend::Memory => Ok(Ports::from_store(Arc::new(MemoryStore::new()), hasher, tokens)),
        #[cfg(feature = "db-postgres")]
        StorageBackend::Postgres => {
            use secrecy::ExposeSecret;

            let url = settings
                .database
                .url
                .as_ref()
                .context("database.url is not set")?;
            let store = storage_adapters::PgStore::connect(url.expose_secret(), 2).await?;
            store.migrate().await?;
            Ok(Ports::from_store(Arc::new(store), hasher, tokens))
        }
        #[cfg(not(feature = "db-postgres"))]
        StorageBackend::Postgres => {
            anyhow::bail!("storage.backend = \"postgres\" needs the db-postgres feature")
        }
    }
}
