//! 共享库
//!
//! 命令行程序共用的配置加载和日志初始化。

pub mod config;
pub mod observability;
