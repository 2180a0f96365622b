use sea_orm_migration::prelude::*;
use store_api::{config, db, migrator::Migrator};
use tracing::{error, info};

/// `migration [up|down|status|fresh]`, `up` when omitted
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_config()?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let command = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    info!(command = %command, "Starting database migration");

    let pool = db::establish_connection_from_app_config(&cfg).await?;

    let result = match command.as_str() {
        "up" => Migrator::up(&pool, None).await,
        "down" => Migrator::down(&pool, Some(1)).await,
        "fresh" => Migrator::fresh(&pool).await,
        "status" => Migrator::status(&pool).await,
        other => {
            error!("Unknown migration command '{}'", other);
            anyhow::bail!("unknown migration command '{other}', expected up|down|status|fresh");
        }
    };

    if let Err(e) = result {
        error!("Migration failed: {}", e);
        return Err(e.into());
    }

    info!("Migration completed successfully");
    db::close_pool(pool).await?;
    Ok(())
}
