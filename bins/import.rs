//! Copy legacy JSON data (`users.json`, `stories.json`) into Postgres.
//!
//! Usage: `import [--migrate] [data_dir]`. Without `--migrate` the schema must
//! already be up to date.

use std::path::PathBuf;

use anyhow::{bail, Context};
use migration::MigratorTrait;
use service::Stores;
use tracing::info;

struct Args {
    migrate: bool,
    data_dir: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args { migrate: false, data_dir: None };
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--migrate" => args.migrate = true,
            flag if flag.starts_with("--") => bail!("unknown flag `{flag}` (usage: import [--migrate] [data_dir])"),
            dir => args.data_dir = Some(PathBuf::from(dir)),
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let args = parse_args()?;
    let mut cfg = configs::AppConfig::load_and_validate()?;
    cfg.database.normalize_from(&|key: &str| std::env::var(key).ok());
    cfg.database.validate().context("import needs a Postgres target")?;
    let data_dir = args.data_dir.unwrap_or_else(|| PathBuf::from(&cfg.storage.data_dir));

    let db = models::db::connect_with_config(&cfg.database).await.context("connecting to Postgres")?;
    if args.migrate {
        migration::Migrator::up(&db, None).await.context("running migrations")?;
    } else {
        let pending = migration::Migrator::get_pending_migrations(&db).await?;
        if !pending.is_empty() {
            bail!(
                "database schema is missing or outdated ({} pending migration(s)); rerun with --migrate",
                pending.len()
            );
        }
    }

    let stores = Stores::postgres(db);
    let report = service::import::import_legacy(&data_dir, &stores)
        .await
        .with_context(|| format!("importing from {}", data_dir.display()))?;
    info!(data_dir = %data_dir.display(), ?report, "import complete");
    println!(
        "imported {} users ({} passwords hashed), {} follows, {} stories ({} without a known author)",
        report.users, report.passwords_hashed, report.follows, report.stories, report.orphaned_stories
    );
    Ok(())
}
