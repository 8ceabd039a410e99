use std::env;
use std::net::SocketAddr;

use thiserror::Error;

use crate::manifest::AccountAssociation;

pub const PUBLIC_URL: &str = "PUBLIC_URL";
pub const PRODUCTION_URL: &str = "PRODUCTION_URL";
pub const PROJECT_TITLE: &str = "PROJECT_TITLE";
pub const MANIFEST_BIND: &str = "MANIFEST_BIND";
pub const ASSOCIATION_HEADER: &str = "ACCOUNT_ASSOCIATION_HEADER";
pub const ASSOCIATION_PAYLOAD: &str = "ACCOUNT_ASSOCIATION_PAYLOAD";
pub const ASSOCIATION_SIGNATURE: &str = "ACCOUNT_ASSOCIATION_SIGNATURE";

pub const DEFAULT_TITLE: &str = "SBT Mint";
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

// 宿主签发的身份证明，随应用一起发布
pub const DEFAULT_HEADER: &str = "eyJmaWQiOjg2OTk5OSwidHlwZSI6ImN1c3RvZHkiLCJrZXkiOiIweDc2ZDUwQjBFMTQ3OWE5QmEyYkQ5MzVGMUU5YTI3QzBjNjQ5QzhDMTIifQ";
pub const DEFAULT_PAYLOAD: &str = "eyJkb21haW4iOiJ2dGFtYXJhLWdsb3dpbmd2aXN0YWFwcC52ZXJjZWwuYXBwIn0";
pub const DEFAULT_SIGNATURE: &str = "MHg2NGUzMTg3YjcyNzQ0ZGI0ZjE0M2QzNWIwNTI2ZWEyY2M3NGE3ZjU3ODU1MjY5Mzg3ZTIxM2FlNzZkMTZlZDEyMjgxYjFmZjc1NDJlNTIyMDJkYTFkOWEwMjk5NTExZjAxNmRlMWEyNTAwMGQ2MzI1MGRhM2Y2OGY2NzY2ZWMwODFj";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("neither PUBLIC_URL nor PRODUCTION_URL is set")]
    MissingBaseUrl,
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

// manifest 服务的运行时配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub app_url: String,
    pub project_title: String,
    pub bind: SocketAddr,
    pub association: AccountAssociation,
}

impl AppConfig {
    // 从进程环境读取（调用方负责先加载 .env）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        // 优先使用显式的 PUBLIC_URL，否则用生产域名拼出 https 地址
        let app_url = match (get(PUBLIC_URL), get(PRODUCTION_URL)) {
            (Some(url), _) => url,
            (None, Some(host)) => format!("https://{}", host.trim()),
            (None, None) => return Err(ConfigError::MissingBaseUrl),
        };
        let app_url = app_url.trim().trim_end_matches('/').to_string();
        if !(app_url.starts_with("http://") || app_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: PUBLIC_URL,
                reason: format!("{app_url} is not an http(s) url"),
            });
        }

        let bind = get(MANIFEST_BIND)
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::Invalid {
                key: MANIFEST_BIND,
                reason: err.to_string(),
            })?;

        Ok(Self {
            app_url,
            project_title: get(PROJECT_TITLE).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            bind,
            association: AccountAssociation {
                header: get(ASSOCIATION_HEADER).unwrap_or_else(|| DEFAULT_HEADER.to_string()),
                payload: get(ASSOCIATION_PAYLOAD).unwrap_or_else(|| DEFAULT_PAYLOAD.to_string()),
                signature: get(ASSOCIATION_SIGNATURE)
                    .unwrap_or_else(|| DEFAULT_SIGNATURE.to_string()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn public_url_wins_and_loses_trailing_slash() {
        let config = load(&[
            (PUBLIC_URL, "https://mint.example.com/"),
            (PRODUCTION_URL, "ignored.example.com"),
        ])
        .unwrap();
        assert_eq!(config.app_url, "https://mint.example.com");
        assert_eq!(config.project_title, DEFAULT_TITLE);
        assert_eq!(config.bind, DEFAULT_BIND.parse::<SocketAddr>().unwrap());
        assert_eq!(config.association.header, DEFAULT_HEADER);
    }

    #[test]
    fn production_host_gets_https_prefix() {
        let config = load(&[(PRODUCTION_URL, "sbt.vercel.app")]).unwrap();
        assert_eq!(config.app_url, "https://sbt.vercel.app");
    }

    #[test]
    fn missing_base_url_is_an_error() {
        assert_eq!(load(&[]), Err(ConfigError::MissingBaseUrl));
        assert_eq!(load(&[(PUBLIC_URL, "  ")]), Err(ConfigError::MissingBaseUrl));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            load(&[(PUBLIC_URL, "ftp://mint.example.com")]),
            Err(ConfigError::Invalid { key: PUBLIC_URL, .. })
        ));
        assert!(matches!(
            load(&[(PUBLIC_URL, "https://a.b"), (MANIFEST_BIND, "nowhere")]),
            Err(ConfigError::Invalid { key: MANIFEST_BIND, .. })
        ));
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            (PUBLIC_URL, "http://localhost:3000"),
            (PROJECT_TITLE, "Guild Pass"),
            (MANIFEST_BIND, "127.0.0.1:8080"),
            (ASSOCIATION_SIGNATURE, "sig"),
        ])
        .unwrap();
        assert_eq!(config.project_title, "Guild Pass");
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.association.signature, "sig");
        assert_eq!(config.association.payload, DEFAULT_PAYLOAD);
    }
}
