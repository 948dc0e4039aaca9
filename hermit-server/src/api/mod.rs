//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`items`] - 商品列表接口
//! - [`cart`] - 购物车接口
//! - [`orders`] - 订单与交付确认接口

pub mod cart;
pub mod health;
pub mod items;
pub mod orders;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult};
