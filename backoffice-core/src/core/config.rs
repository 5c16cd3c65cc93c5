use std::path::{Path, PathBuf};

/// 引擎配置 - 所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./work_dir | 工作目录（数据库、日志） |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | LOCK_WAIT_MS | 5000 | 写锁等待超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/backoffice LOCK_WAIT_MS=2000 cargo run --example quickstart
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志文件
    pub work_dir: String,
    /// 日志级别: trace | debug | info | warn | error
    pub log_level: String,
    /// 是否输出 JSON 格式日志 (生产环境)
    pub log_json: bool,
    /// 获取写锁的最长等待时间 (毫秒)，超时返回可重试的 Contention 错误
    pub lock_wait_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            lock_wait_ms: std::env::var("LOCK_WAIT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
        }
    }

    /// Path of the engine database inside the work dir
    pub fn db_path(&self) -> PathBuf {
        Path::new(&self.work_dir).join("backoffice.redb")
    }

    /// Path of the log directory inside the work dir
    pub fn log_dir(&self) -> PathBuf {
        Path::new(&self.work_dir).join("logs")
    }
}
