//! 字段过滤器命令行
//!
//! 默认模式：从 stdin 逐行读取 JSON 记录，对每条记录输出 true / false。
//! `--derive` 模式：从 stdin 读取一条 JSON 记录，输出由其生成的过滤器配置。

use anyhow::{Context, Result, anyhow};
use field_filter::{
    DescriptorPool, DynamicMessage, FilterSpec, MessageDescriptor, compile, derive_spec,
};
use field_filter_shared::config::{AppConfig, FilterConfig};
use field_filter_shared::observability;
use std::fs;
use std::io::{self, BufRead, Read, Write};
use tracing::{debug, info};

const SERVICE_NAME: &str = "field-filter";

fn main() -> Result<()> {
    let derive = std::env::args().skip(1).any(|arg| arg == "--derive");

    let config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });
    observability::init(&config.observability)?;

    info!(
        environment = %config.environment,
        schema = %config.filter.schema_path.display(),
        root = %config.filter.root_message,
        "Starting field-filter"
    );

    let descriptor = load_descriptor(&config.filter)?;

    if derive {
        run_derive(descriptor)
    } else {
        run_match(&config.filter, descriptor)
    }
}

/// 加载模式并取出根消息类型
fn load_descriptor(config: &FilterConfig) -> Result<MessageDescriptor> {
    let json = fs::read_to_string(&config.schema_path)
        .with_context(|| format!("无法读取模式文件 {}", config.schema_path.display()))?;
    let pool = DescriptorPool::from_json(&json)?;
    pool.get_message_by_name(&config.root_message)
        .ok_or_else(|| anyhow!("模式中不存在消息类型 {}", config.root_message))
}

/// 逐行匹配记录
fn run_match(config: &FilterConfig, descriptor: MessageDescriptor) -> Result<()> {
    let json = fs::read_to_string(&config.spec_path)
        .with_context(|| format!("无法读取过滤器配置 {}", config.spec_path.display()))?;
    let spec = FilterSpec::from_json(&json)?;
    let filter = compile(&descriptor, &spec)?;
    info!("过滤器已编译: {}", spec);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut matched = 0usize;
    let mut total = 0usize;

    for (i, line) in io::stdin().lock().lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(&line)
            .with_context(|| format!("第 {} 行不是合法 JSON", i + 1))?;
        let record = DynamicMessage::from_json(descriptor.clone(), &value)
            .with_context(|| format!("第 {} 行无法解码为 {}", i + 1, descriptor.name()))?;

        let result = filter.matches(&record);
        total += 1;
        if result {
            matched += 1;
        }
        writeln!(out, "{}", result)?;
    }

    debug!(total, matched, "匹配完成");
    Ok(())
}

/// 由一条记录生成过滤器配置
fn run_derive(descriptor: MessageDescriptor) -> Result<()> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let value: serde_json::Value = serde_json::from_str(&input).context("输入不是合法 JSON")?;
    let record = DynamicMessage::from_json(descriptor, &value)?;
    let spec = derive_spec(&record)?;

    println!("{}", serde_json::to_string_pretty(&spec)?);
    Ok(())
}
