//! Parent records needed by repository tests.

use labhub_app::ports::{HubRepository, JobRepository, PrinterRepository, UserRepository};
use labhub_domain::hub::Hub;
use labhub_domain::job::Job;
use labhub_domain::printer::Printer;
use labhub_domain::user::{ApiToken, User};
use sqlx::SqlitePool;

use crate::pool::Config;
use crate::{SqliteHubRepository, SqliteJobRepository, SqlitePrinterRepository, SqliteUserRepository};

pub async fn memory_pool() -> SqlitePool {
    Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .unwrap()
    .pool()
    .clone()
}

pub async fn seed_user(pool: &SqlitePool, name: &str) -> User {
    let user = User::builder()
        .name(name)
        .email(format!("{}@example.com", name.to_lowercase()))
        .build()
        .unwrap();
    let token = ApiToken::from_plaintext(format!("token-{name}"));
    SqliteUserRepository::new(pool.clone())
        .create(user, token.digest())
        .await
        .unwrap()
}

pub async fn seed_printer(pool: &SqlitePool, owner: &User) -> Printer {
    let printer = Printer::builder()
        .name("Bench")
        .owner_id(owner.id)
        .build()
        .unwrap();
    SqlitePrinterRepository::new(pool.clone())
        .create(printer)
        .await
        .unwrap()
}

pub async fn seed_job(pool: &SqlitePool, printer: &Printer) -> Job {
    let job = Job::builder()
        .printer_id(printer.id)
        .created_by_user_id(printer.owner_id)
        .status("printing")
        .build()
        .unwrap();
    SqliteJobRepository::new(pool.clone())
        .create(job)
        .await
        .unwrap()
}

pub async fn seed_hub(pool: &SqlitePool, owner: &User) -> Hub {
    let hub = Hub::builder()
        .name("Greenhouse")
        .owner_id(owner.id)
        .build()
        .unwrap();
    SqliteHubRepository::new(pool.clone())
        .create(hub)
        .await
        .unwrap()
}
