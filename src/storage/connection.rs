use crate::config::DatabaseConfig;
use crate::storage::entity::{budget_allocation, line_item, project, supplier};
use log::info;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr, EntityTrait,
    Schema, Statement,
};
use std::time::Duration;

const BUDGET_UNIQUE_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS idx_budget_allocations_project_category ON budget_allocations(project_id, category);";

// 每次修改预算行后刷新 updated_at（SQLite 默认关闭递归触发器，不会自触发）
const BUDGET_TOUCH_TRIGGER: &str = "CREATE TRIGGER IF NOT EXISTS trg_budget_allocations_touch
AFTER UPDATE ON budget_allocations
BEGIN
    UPDATE budget_allocations SET updated_at = CAST(strftime('%s', 'now') AS INTEGER) WHERE id = NEW.id;
END;";

pub async fn establish_connection(cfg: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(cfg.url.to_owned());
    opt.connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Info);

    if cfg.is_in_memory() {
        // 内存库每个连接都是独立的数据库，只能用单连接且不能回收
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(cfg.max_connections)
            .min_connections(1)
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(1800));
    }

    let db = Database::connect(opt).await?;

    execute_raw(&db, "PRAGMA foreign_keys = ON;").await?;
    if !cfg.is_in_memory() {
        execute_raw(&db, "PRAGMA journal_mode=WAL;").await?;
    }

    create_schema(&db).await?;

    info!(
        "Database connection established ({}), schema ensured.",
        if cfg.is_in_memory() { "memory" } else { "file" }
    );

    Ok(db)
}

/// 建表 + 唯一索引 + 触发器，可重复执行
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    // 被引用的表先建
    create_table(db, project::Entity).await?;
    create_table(db, supplier::Entity).await?;
    create_table(db, line_item::Entity).await?;
    create_table(db, budget_allocation::Entity).await?;

    execute_raw(db, BUDGET_UNIQUE_INDEX).await?;
    execute_raw(db, BUDGET_TOUCH_TRIGGER).await?;

    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let stmt = builder.build(schema.create_table_from_entity(entity).if_not_exists());
    db.execute(stmt).await?;
    Ok(())
}

async fn execute_raw(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(DbBackend::Sqlite, sql.to_string()))
        .await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn memory_db() -> DatabaseConnection {
    establish_connection(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory database")
}
