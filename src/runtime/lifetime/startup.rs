use crate::cache::{ObjectCache, create_object_cache};
use crate::models::users::entities::UserRole;
use crate::models::users::requests::CreateUserRequest;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::random::generate_initial_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 空库时创建默认管理员
async fn seed_admin(storage: &Arc<dyn Storage>) {
    match storage.count_users().await {
        Ok(count) if count > 0 => {
            debug!("Found {} existing user(s), admin seed not needed", count);
            return;
        }
        Ok(_) => {
            info!("User table is empty, seeding the default administrator");
        }
        Err(e) => {
            warn!("Could not count users ({}), admin seed skipped", e);
            return;
        }
    }

    let password = match std::env::var("ADMIN_PASSWORD") {
        Ok(pwd) if !pwd.trim().is_empty() => pwd,
        _ => {
            let pwd = generate_initial_password();
            warn!("==========================================================");
            warn!("  ADMIN_PASSWORD is not set, a password was generated");
            warn!("  Initial admin password: {}", pwd);
            warn!("  It is shown only once, change it after the first login");
            warn!("==========================================================");
            pwd
        }
    };

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Admin password hashing failed ({}), admin seed skipped", e);
            return;
        }
    };

    let admin = CreateUserRequest {
        username: "admin".to_string(),
        email: "admin@school.local".to_string(),
        password: password_hash,
        full_name: "Administrator".to_string(),
        role: UserRole::Admin,
    };

    match storage.create_user(admin).await {
        Ok(user) => info!(
            "Default administrator created (ID: {}, username: {})",
            user.id, user.username
        ),
        Err(e) => warn!("Default administrator could not be created: {}", e),
    }
}

/// 启动前准备：加密提供者、存储与迁移、默认管理员、缓存
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Cache registry is enabled");
    }

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    seed_admin(&storage).await;

    let cache = create_object_cache()
        .await
        .expect("Failed to create cache");
    warn!("Cache backend initialized");

    StartupContext { storage, cache }
}
