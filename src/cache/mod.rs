//! 对象缓存层
//!
//! 通过插件注册表选择后端（`moka` 内存缓存或 `redis`），
//! 启动时由 [`create_object_cache`] 按配置创建，失败时回退到内存缓存。

pub mod object_cache;
pub mod register;
pub mod traits;

use std::sync::Arc;

use tracing::warn;

pub use traits::{CacheResult, ObjectCache, ObjectCacheExt};

use crate::config::AppConfig;
use crate::errors::{Result, SchoolSystemError};
use register::get_object_cache_plugin;

/// 缓存键
pub mod keys {
    /// 仪表盘全局计数
    pub const DASHBOARD_STATS: &str = "dashboard:stats";

    /// 会话用户缓存
    pub fn session_user(user_id: i64) -> String {
        format!("user:{user_id}")
    }
}

/// 声明对象缓存插件，在程序加载时注册到插件表
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:expr, $ty:ty) => {
        #[ctor::ctor]
        fn __register_object_cache_plugin() {
            $crate::cache::register::register_object_cache_plugin(
                $name,
                std::sync::Arc::new(|| {
                    Box::pin(async {
                        let cache = <$ty>::new()
                            .map_err($crate::errors::SchoolSystemError::cache_connection)?;
                        Ok(Box::new(cache) as Box<dyn $crate::cache::ObjectCache>)
                    })
                }),
            );
        }
    };
}

async fn try_plugin(name: &str) -> Result<Arc<dyn ObjectCache>> {
    let constructor = get_object_cache_plugin(name).ok_or_else(|| {
        SchoolSystemError::cache_plugin_not_found(format!("Cache backend '{name}' not registered"))
    })?;
    let cache = constructor().await?;
    Ok(Arc::from(cache))
}

/// 按配置创建缓存实例，配置的后端不可用时回退到 moka
pub async fn create_object_cache() -> Result<Arc<dyn ObjectCache>> {
    let cache_type = AppConfig::get().cache.cache_type.as_str();

    warn!("Attempting to create {} cache backend", cache_type);

    match try_plugin(cache_type).await {
        Ok(cache) => {
            warn!("Successfully created {} cache backend", cache_type);
            Ok(cache)
        }
        Err(e) if cache_type != "moka" => {
            warn!("Failed to create {} cache: {}", cache_type, e);
            warn!("Falling back to memory cache");
            try_plugin("moka").await
        }
        Err(e) => Err(e),
    }
}
