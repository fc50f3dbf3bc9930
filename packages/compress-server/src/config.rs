use std::net::SocketAddr;
use std::str::FromStr;

use compress_core::DEFAULT_MAX_DIMENSION;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// サーバー設定
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// 幅指定がないときの長辺の上限
    pub max_dimension: u32,
    pub max_upload_bytes: usize,
    /// 同時に走らせるエンコード数
    pub max_concurrent_encodes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_dimension: DEFAULT_MAX_DIMENSION,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_concurrent_encodes: default_concurrency(),
        }
    }
}

impl ServerConfig {
    /// 環境変数から ServerConfig を作成する
    ///
    /// 任意の環境変数（未設定ならデフォルト）:
    /// - BIND_ADDR
    /// - MAX_DIMENSION
    /// - MAX_UPLOAD_BYTES
    /// - MAX_CONCURRENT_ENCODES
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー検索関数から設定を読む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| format!("BIND_ADDR is invalid: {e}"))?;

        let max_dimension =
            parse_positive(&lookup, "MAX_DIMENSION")?.unwrap_or(DEFAULT_MAX_DIMENSION);
        let max_upload_bytes =
            parse_positive(&lookup, "MAX_UPLOAD_BYTES")?.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        let max_concurrent_encodes =
            parse_positive(&lookup, "MAX_CONCURRENT_ENCODES")?.unwrap_or_else(default_concurrency);

        Ok(Self {
            bind_addr,
            max_dimension,
            max_upload_bytes,
            max_concurrent_encodes,
        })
    }
}

fn parse_positive<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, String>
where
    T: FromStr + Default + PartialEq,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<T>() {
        Ok(v) if v == T::default() => Err(format!("{key} must be greater than 0")),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(format!("{key} must be a positive integer, got {raw:?}")),
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.max_dimension, DEFAULT_MAX_DIMENSION);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.max_concurrent_encodes >= 1);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("MAX_DIMENSION", "2560"),
            ("MAX_UPLOAD_BYTES", "1048576"),
            ("MAX_CONCURRENT_ENCODES", "3"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.max_dimension, 2560);
        assert_eq!(config.max_upload_bytes, 1_048_576);
        assert_eq!(config.max_concurrent_encodes, 3);
    }

    #[test]
    fn test_invalid_values() {
        assert!(ServerConfig::from_lookup(lookup_from(&[("BIND_ADDR", "nowhere")])).is_err());
        assert!(ServerConfig::from_lookup(lookup_from(&[("MAX_DIMENSION", "0")])).is_err());
        assert!(ServerConfig::from_lookup(lookup_from(&[("MAX_UPLOAD_BYTES", "lots")])).is_err());
    }
}
