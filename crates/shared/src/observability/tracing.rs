//! 日志初始化

use crate::config::ObservabilityConfig;
use anyhow::Result;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// 构建日志过滤器：`RUST_LOG` > 配置的日志级别 > info
pub fn build_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化全局 tracing subscriber
///
/// 日志写到 stderr，stdout 留给命令输出。重复初始化返回错误。
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let fmt_layer = if config.is_json() {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_ansi(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(fmt_layer)
        .try_init()?;

    ::tracing::debug!(
        log_level = %config.log_level,
        log_format = %config.log_format,
        "日志已初始化"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_falls_back() {
        let config = ObservabilityConfig {
            log_level: "not a level[".to_string(),
            ..Default::default()
        };
        // 仅验证不会 panic
        let _ = build_filter(&config);
    }

    #[test]
    fn test_init_twice_fails() {
        let config = ObservabilityConfig::default();
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
