//! 运行时配置
//!
//! 默认值写死在常量里，构建时可以通过环境变量覆盖
//! (`PROPISCINEIRO_API_URL` / `PROPISCINEIRO_TOKEN_KEY` / `PROPISCINEIRO_LOG_LINES`)。

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TOKEN_STORAGE_KEY: &str = "token";
pub const DEFAULT_LOG_LINES: u32 = 200;

/// 前端客户端配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// 后端 API 根地址（不含结尾的 `/`）
    pub api_base_url: String,
    /// LocalStorage 中保存 token 的键
    pub token_storage_key: String,
    /// 系统日志页面默认读取的行数
    pub default_log_lines: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_storage_key: DEFAULT_TOKEN_STORAGE_KEY.to_string(),
            default_log_lines: DEFAULT_LOG_LINES,
        }
    }
}

impl ClientConfig {
    /// 读取构建时注入的环境变量，缺失时使用默认值
    pub fn from_build_env() -> Self {
        Self::from_overrides(
            option_env!("PROPISCINEIRO_API_URL"),
            option_env!("PROPISCINEIRO_TOKEN_KEY"),
            option_env!("PROPISCINEIRO_LOG_LINES"),
        )
    }

    /// 用可选的覆盖值构建配置
    ///
    /// 空字符串视为未设置；行数无法解析或为 0 时回退到默认值。
    pub fn from_overrides(
        api_base_url: Option<&str>,
        token_storage_key: Option<&str>,
        default_log_lines: Option<&str>,
    ) -> Self {
        let defaults = Self::default();

        let api_base_url = non_empty(api_base_url)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let token_storage_key = non_empty(token_storage_key)
            .map(str::to_string)
            .unwrap_or(defaults.token_storage_key);

        let default_log_lines = non_empty(default_log_lines)
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.default_log_lines);

        Self {
            api_base_url,
            token_storage_key,
            default_log_lines,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
