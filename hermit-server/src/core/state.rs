use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::auth::JwtService;
use crate::checkout::{CheckoutManager, ExpiryScheduler};
use crate::core::Config;

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是服务的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | checkout | Arc<CheckoutManager> | 交易引擎 (库存/购物车/订单/交付码) |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | shutdown | CancellationToken | 后台任务停机信号 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 交易引擎
    pub checkout: Arc<CheckoutManager>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 后台任务停机信号
    shutdown: CancellationToken,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 交易引擎 (work_dir/database/hermit.redb)
    /// 3. JWT 服务
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("hermit.redb");
        let checkout =
            CheckoutManager::open(&db_path).expect("Failed to initialize checkout storage");

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self {
            config: config.clone(),
            checkout: Arc::new(checkout),
            jwt_service,
            shutdown: CancellationToken::new(),
        }
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用
    ///
    /// 启动的任务：
    /// - 过期订单扫描器 (ExpiryScheduler)
    pub fn start_background_tasks(&self) {
        let scheduler = ExpiryScheduler::new(
            self.checkout.clone(),
            Duration::from_secs(self.config.expiry_sweep_interval_seconds),
            Duration::from_secs(self.config.pending_order_ttl_minutes * 60),
            self.shutdown.clone(),
        );
        tokio::spawn(scheduler.run());
    }

    /// 获取交易引擎
    pub fn checkout_manager(&self) -> &Arc<CheckoutManager> {
        &self.checkout
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 通知后台任务停机
    pub fn shutdown_background_tasks(&self) {
        self.shutdown.cancel();
    }
}
