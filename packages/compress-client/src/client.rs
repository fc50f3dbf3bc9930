use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::error::ClientError;
use crate::options::CompressOptions;
use crate::selection::SelectedFile;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// 1 ファイルを圧縮してエンコード済みバイト列を返すもの
#[async_trait]
pub trait Compressor: Send + Sync {
    async fn compress(
        &self,
        file: &SelectedFile,
        options: &CompressOptions,
    ) -> Result<Bytes, ClientError>;
}

/// サーバーのエラー記述子
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// 圧縮サーバーの HTTP クライアント
#[derive(Clone)]
pub struct CompressClient {
    client: Client,
    base_url: String,
}

impl CompressClient {
    /// 新しい CompressClient を作成する
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(base_url));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// 環境変数から CompressClient を作成する
    ///
    /// 任意の環境変数:
    /// - COMPRESSOR_URL（未設定なら http://127.0.0.1:8080）
    pub fn from_env(timeout: Duration) -> Result<Self, ClientError> {
        let base_url =
            std::env::var("COMPRESSOR_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        Self::new(base_url, timeout)
    }

    pub fn endpoint(&self) -> String {
        format!("{}/compress", self.base_url)
    }
}

#[async_trait]
impl Compressor for CompressClient {
    async fn compress(
        &self,
        file: &SelectedFile,
        options: &CompressOptions,
    ) -> Result<Bytes, ClientError> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new()
            .part("file", part)
            .text("type", options.format.as_str())
            .text("quality", options.quality_field())
            .text("width", options.width_field());

        let response = self
            .client
            .post(self.endpoint())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.bytes().await?);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string(),
        };
        tracing::warn!(file = %file.name, status = %status, error = %message, "compression rejected");

        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client() {
        let client = CompressClient::new("http://localhost:8080/", DEFAULT_TIMEOUT).unwrap();

        // 末尾のスラッシュが削除される
        assert_eq!(client.base_url, "http://localhost:8080");
        assert_eq!(client.endpoint(), "http://localhost:8080/compress");
    }

    #[test]
    fn test_rejects_non_http_url() {
        let result = CompressClient::new("ftp://example.com", DEFAULT_TIMEOUT);
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }
}
