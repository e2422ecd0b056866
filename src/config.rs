use std::path::PathBuf;

const DEFAULT_DATABASE_URL: &str = "sqlite://buildcost.db?mode=rwc";
const DEFAULT_LOG_DIR: &str = "logs";

/// 运行配置，全部来自环境变量（可由 .env 提供）
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub log_dir: PathBuf,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 1,
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::new("sqlite::memory:")
    }

    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

impl AppConfig {
    /// 读取 .env（若存在）后再读进程环境变量
    pub fn from_env() -> Self {
        let env_file = dotenv::dotenv().ok();

        let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let max_connections = std::env::var("BUILDCOST_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(1);
        let log_dir = std::env::var("BUILDCOST_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_DIR));

        Self {
            database: DatabaseConfig {
                max_connections,
                ..DatabaseConfig::new(url)
            },
            log_dir,
            env_file,
        }
    }
}
