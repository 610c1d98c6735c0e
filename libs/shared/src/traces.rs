use std::env;

use anyhow::{Context, Result};
use opentelemetry::global;
use opentelemetry::trace::TracerProvider;
use opentelemetry::KeyValue;
use opentelemetry_otlp::SpanExporter;
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tracing::{error, info};
use tracing_subscriber::{
    filter::EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Registry,
};

/// Tracing 配置结构
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// 服务名称
    pub service_name: String,
    /// 服务版本
    pub service_version: String,
    /// 服务环境 (dev, staging, prod)
    pub environment: String,
    /// OTLP collector endpoint，未配置时不导出 span
    pub otlp_endpoint: Option<String>,
    /// 日志级别
    pub log_level: String,
    /// 是否启用控制台输出
    pub console_output: bool,
    /// 是否启用JSON格式
    pub json_format: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "users-api".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            console_output: env::var("CONSOLE_OUTPUT")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            json_format: env::var("JSON_FORMAT")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        }
    }
}

fn init_opentelemetry(config: &TracingConfig, endpoint: &str) -> Result<SdkTracerProvider> {
    use opentelemetry_otlp::WithExportConfig;

    let resource = Resource::builder()
        .with_attributes([
            KeyValue::new("service.name", config.service_name.clone()),
            KeyValue::new("service.version", config.service_version.clone()),
            KeyValue::new("service.environment", config.environment.clone()),
            KeyValue::new("service.instance.id", uuid::Uuid::new_v4().to_string()),
        ])
        .build();

    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .context("failed to create OTLP span exporter")?;

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .with_sampler(Sampler::AlwaysOn)
        .build())
}

/// 统一的 tracing 初始化入口
pub fn init_tracing() -> Result<TracingCleanup> {
    init_tracing_with_config(TracingConfig::default())
}

/// 使用自定义配置初始化 tracing
///
/// 全局 subscriber 只能安装一次，重复调用会返回错误。
pub fn init_tracing_with_config(config: TracingConfig) -> Result<TracingCleanup> {
    let mut cleanup = TracingCleanup::default();

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let otel_layer = match config.otlp_endpoint.as_deref() {
        Some(endpoint) => {
            let provider = init_opentelemetry(&config, endpoint)?;
            let layer = tracing_opentelemetry::layer()
                .with_error_records_to_exceptions(true)
                .with_tracer(provider.tracer("users-api"));
            global::set_tracer_provider(provider.clone());
            cleanup.tracer_provider = Some(provider);
            Some(layer)
        }
        None => None,
    };

    let registry = Registry::default().with(env_filter).with(otel_layer);

    if !config.console_output {
        registry.try_init()?;
    } else if config.json_format {
        let fmt_layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_target(false)
            .with_level(true)
            .with_thread_ids(true);
        registry.with(fmt_layer).try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_target(false)
            .with_level(true);
        registry.with(fmt_layer).try_init()?;
    }

    info!(
        service_name = %config.service_name,
        service_version = %config.service_version,
        environment = %config.environment,
        otlp = config.otlp_endpoint.is_some(),
        "Tracing initialized successfully"
    );

    Ok(cleanup)
}

/// 清理资源的结构体
#[derive(Default)]
pub struct TracingCleanup {
    tracer_provider: Option<SdkTracerProvider>,
}

impl TracingCleanup {
    /// 刷新并关闭 tracer provider
    pub fn cleanup(self) {
        if let Some(provider) = self.tracer_provider {
            if let Err(e) = provider.shutdown() {
                error!("Failed to shutdown tracer provider: {:?}", e);
            } else {
                info!("Tracer provider shutdown successfully");
            }
        }
    }
}
