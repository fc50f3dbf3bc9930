use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use compress_core::{OutputFormat, derive_output_filename};
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;

use crate::client::Compressor;
use crate::error::FormError;
use crate::options::CompressOptions;
use crate::selection::SelectedFile;
use crate::summary::savings_percent;

pub const DEFAULT_CONCURRENCY: usize = 2;

const ABORTED_REASON: &str = "batch aborted after an earlier failure";

/// 1 ファイルが失敗したときの扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// 失敗したファイルだけを失敗として報告し、残りは続行する
    #[default]
    Continue,
    /// 最初の失敗で新しいリクエストの発行をやめる（処理中のものは完了させる）
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Submitting,
}

/// 圧縮済みファイル
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
    pub source_size: u64,
    pub saved_percent: f64,
}

impl CompressedFile {
    pub fn new(source: &SelectedFile, format: OutputFormat, bytes: Bytes) -> Self {
        let source_size = source.size();
        Self {
            filename: derive_output_filename(&source.name, format),
            content_type: format.content_type(),
            saved_percent: savings_percent(source_size, bytes.len() as u64),
            bytes,
            source_size,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(CompressedFile),
    Failure { reason: String },
}

/// 入力 1 件ごとの結果
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub index: usize,
    pub name: String,
    pub outcome: Outcome,
}

impl FileReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }
}

/// バッチ全体の結果。入力順に並ぶ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn successes(&self) -> impl Iterator<Item = &CompressedFile> {
        self.files.iter().filter_map(|f| match &f.outcome {
            Outcome::Success(compressed) => Some(compressed),
            Outcome::Failure { .. } => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| !f.is_success())
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }
}

/// 選択されたファイルを上限付きの並列数で圧縮サーバーへ送る
pub struct BatchRunner {
    compressor: Arc<dyn Compressor>,
    concurrency: usize,
    policy: FailurePolicy,
    state: watch::Sender<BatchState>,
}

impl BatchRunner {
    pub fn new(compressor: Arc<dyn Compressor>) -> Self {
        let (state, _) = watch::channel(BatchState::Idle);
        Self {
            compressor,
            concurrency: DEFAULT_CONCURRENCY,
            policy: FailurePolicy::default(),
            state,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> BatchState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<BatchState> {
        self.state.subscribe()
    }

    /// バッチを実行し、全ファイルの結果が揃ってから返す
    pub async fn run(
        &self,
        files: &[SelectedFile],
        options: &CompressOptions,
    ) -> Result<BatchReport, FormError> {
        if files.is_empty() {
            return Err(FormError::NoFilesSelected);
        }
        options.validate()?;

        self.state.send_replace(BatchState::Submitting);
        tracing::info!(
            files = files.len(),
            concurrency = self.concurrency,
            policy = ?self.policy,
            f = %options.format,
            q = options.quality,
            w = ?options.width,
            "submitting batch"
        );

        let slots = Arc::new(Semaphore::new(self.concurrency));
        let aborted = Arc::new(AtomicBool::new(false));
        let mut tasks = JoinSet::new();
        let mut names = HashMap::new();

        for (index, file) in files.iter().cloned().enumerate() {
            let job = Job {
                index,
                file,
                options: *options,
                policy: self.policy,
                compressor: Arc::clone(&self.compressor),
                slots: Arc::clone(&slots),
                aborted: Arc::clone(&aborted),
            };
            let name = job.file.name.clone();
            let handle = tasks.spawn(job.run());
            names.insert(handle.id(), (index, name));
        }

        let mut reports = Vec::with_capacity(files.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, report)) => reports.push(report),
                Err(e) => {
                    let Some((index, name)) = names.remove(&e.id()) else {
                        continue;
                    };
                    tracing::error!(file = %name, error = %e, "compression task failed");
                    reports.push(FileReport {
                        index,
                        name,
                        outcome: Outcome::Failure {
                            reason: format!("task failed: {e}"),
                        },
                    });
                }
            }
        }
        reports.sort_by_key(|r| r.index);

        let report = BatchReport { files: reports };
        tracing::info!(
            succeeded = report.success_count(),
            failed = report.failures().count(),
            "batch finished"
        );
        self.state.send_replace(BatchState::Idle);

        Ok(report)
    }
}

/// 1 ファイル分の送信タスク
struct Job {
    index: usize,
    file: SelectedFile,
    options: CompressOptions,
    policy: FailurePolicy,
    compressor: Arc<dyn Compressor>,
    slots: Arc<Semaphore>,
    aborted: Arc<AtomicBool>,
}

impl Job {
    async fn run(self) -> FileReport {
        let outcome = match self.slots.acquire().await {
            Ok(_permit) if !self.aborted.load(Ordering::SeqCst) => self.compress().await,
            _ => Outcome::Failure {
                reason: ABORTED_REASON.to_string(),
            },
        };

        FileReport {
            index: self.index,
            name: self.file.name,
            outcome,
        }
    }

    /// スロットを保持したまま呼ばれる
    async fn compress(&self) -> Outcome {
        tracing::debug!(file = %self.file.name, index = self.index, "uploading");

        match self.compressor.compress(&self.file, &self.options).await {
            Ok(bytes) => {
                let compressed = CompressedFile::new(&self.file, self.options.format, bytes);
                tracing::info!(
                    file = %self.file.name,
                    output = %compressed.filename,
                    size = compressed.size(),
                    saved = compressed.saved_percent,
                    "compressed"
                );
                Outcome::Success(compressed)
            }
            Err(e) => {
                tracing::warn!(file = %self.file.name, error = %e, "compression failed");
                if self.policy == FailurePolicy::Abort {
                    // スロットを返す前に閉じ、待機中のタスクを起こさない
                    self.aborted.store(true, Ordering::SeqCst);
                    self.slots.close();
                }
                Outcome::Failure {
                    reason: e.to_string(),
                }
            }
        }
    }
}
