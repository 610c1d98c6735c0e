use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::SharedError;

/// 环境变量前缀，例如 `USERS_PORT=8080`
pub const ENV_PREFIX: &str = "USERS";

/// 可选的配置文件（不带扩展名）
pub const CONFIG_FILE: &str = "config/users";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub addr: String,
    pub port: u16,
    /// 单个请求的超时时间（秒）
    pub request_timeout_secs: u64,
    /// 是否允许任意来源的跨域请求
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_secs: 30,
            cors_permissive: true,
        }
    }
}

impl ServerConfig {
    pub fn new(addr: String, port: u16) -> Self {
        Self {
            addr,
            port,
            ..Default::default()
        }
    }

    pub fn default_for_test() -> Self {
        Self::new("127.0.0.1".to_string(), 0)
    }

    /// 加载配置：默认值 <- config/users.toml <- USERS_* 环境变量
    pub fn load() -> Result<Self, SharedError> {
        Self::load_from(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    fn load_from(env: Environment) -> Result<Self, SharedError> {
        let defaults = Self::default();
        let cfg = Config::builder()
            .set_default("addr", defaults.addr)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("cors_permissive", defaults.cors_permissive)?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(env)
            .build()?;

        let server: ServerConfig = cfg.try_deserialize()?;
        server.validate()?;
        Ok(server)
    }

    fn validate(&self) -> Result<(), SharedError> {
        if self.addr.trim().is_empty() {
            return Err(SharedError::ConfigurationError(
                "addr must not be empty".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(SharedError::ConfigurationError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}
