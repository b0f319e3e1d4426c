use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

// 仅用于开发环境
const DEV_JWT_SECRET: &str = "school-system-development-secret-change-me";

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖
            .add_source(
                Environment::with_prefix("SCHOOLSYS")
                    .separator("_")
                    .try_parsing(true),
            );

        // 支持从环境变量加载
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("cache.redis.url", std::env::var("REDIS_URL").ok())?
            .set_override_option(
                "cache.redis.key_prefix",
                std::env::var("REDIS_KEY_PREFIX").ok(),
            )?
            .set_override_option("cache.redis.default_ttl", std::env::var("REDIS_TTL").ok())?;

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        app_config.normalize()?;
        Ok(app_config)
    }

    /// 补全派生值并校验关键配置
    fn normalize(&mut self) -> Result<(), ConfigError> {
        // 处理工作线程数
        if self.server.workers == 0 {
            self.server.workers = num_cpus::get().min(self.server.max_workers.max(1));
        }

        if self.jwt.secret.is_empty() {
            if self.is_production() {
                return Err(ConfigError::Message(
                    "jwt.secret must be set in production".to_string(),
                ));
            }
            self.jwt.secret = DEV_JWT_SECRET.to_string();
        }

        if !(1..=7).contains(&self.school.school_days) {
            return Err(ConfigError::Message(format!(
                "school.school_days must be within 1..=7, got {}",
                self.school.school_days
            )));
        }

        if self.school.grading_scale <= 0.0 {
            return Err(ConfigError::Message(
                "school.grading_scale must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取 Unix 套接字路径 (如果配置了)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source_uses_defaults() {
        let config = Config::builder().build().unwrap();
        let app_config: AppConfig = config.try_deserialize().unwrap();
        assert_eq!(app_config.server.port, 8080);
        assert_eq!(app_config.cache.cache_type, "moka");
        assert_eq!(app_config.school.grading_scale, 10.0);
        assert_eq!(app_config.school.school_days, 5);
        assert!(app_config.is_development());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::builder()
            .set_override("school.passing_average", 6.0)
            .unwrap()
            .set_override("server.port", 9000)
            .unwrap()
            .build()
            .unwrap();
        let app_config: AppConfig = config.try_deserialize().unwrap();
        assert_eq!(app_config.school.passing_average, 6.0);
        assert_eq!(app_config.school.max_import_rows, 1000);
        assert_eq!(app_config.server_bind_address(), "127.0.0.1:9000");
    }

    #[test]
    fn test_normalize_fills_dev_secret_and_workers() {
        let mut app_config = AppConfig::default();
        app_config.normalize().unwrap();
        assert!(!app_config.jwt.secret.is_empty());
        assert!(app_config.server.workers >= 1);
    }

    #[test]
    fn test_normalize_rejects_missing_secret_in_production() {
        let mut app_config = AppConfig::default();
        app_config.app.environment = "production".to_string();
        assert!(app_config.normalize().is_err());
    }

    #[test]
    fn test_normalize_rejects_bad_school_week() {
        let mut app_config = AppConfig::default();
        app_config.school.school_days = 0;
        assert!(app_config.normalize().is_err());
    }
}
