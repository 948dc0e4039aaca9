//! Hermit Server - 校园二手交易市场交易引擎
//!
//! # 架构概述
//!
//! 本模块是 Hermit Server 的主入口，提供以下核心功能：
//!
//! - **交易引擎** (`checkout`): 库存台账、购物车、订单工厂、交付码校验
//! - **认证** (`auth`): JWT 校验与用户身份提取
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! hermit-server/src/
//! ├── core/          # 配置、状态、HTTP 服务器
//! ├── auth/          # JWT 认证
//! ├── api/           # HTTP 路由和处理器
//! ├── checkout/      # 交易引擎 (存储/台账/购物车/交付码/订单)
//! └── utils/         # 日志、校验工具
//! ```

pub mod api;
pub mod auth;
pub mod checkout;
pub mod core;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use checkout::{
    CartStore, CheckoutError, CheckoutManager, CheckoutStorage, ExpiryScheduler, InventoryLedger,
};
pub use core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv, 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    utils::logger::init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    __  __                    _ __
   / / / /__  _____ ____ ___ (_) /_
  / /_/ / _ \/ ___// __ `__ \/ / __/
 / __  /  __/ /   / / / / / / / /_
/_/ /_/\___/_/   /_/ /_/ /_/_/\__/
    "#
    );
}
