//! 可观测性模块
//!
//! 日志的统一初始化。`RUST_LOG` 优先于配置中的日志级别。

pub mod tracing;

pub use self::tracing::{build_filter, init};
