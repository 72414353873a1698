// src/notify/mod.rs
//! Alert delivery seam. Transports (SMTP, chat webhooks) live outside this
//! crate; here the digest is either logged or dropped into an outbox directory.

pub mod digest;

pub use digest::AlertDigest;

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, digest: &AlertDigest) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Emits the digest through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, digest: &AlertDigest) -> Result<()> {
        tracing::info!(
            target: "notify",
            high = digest.high,
            medium = digest.medium,
            subject = %digest.subject,
            "alert digest"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Writes each digest as `<timestamp>.txt` into a directory, for a mail
/// relay or a human to pick up.
#[derive(Debug, Clone)]
pub struct OutboxNotifier {
    dir: PathBuf,
}

impl OutboxNotifier {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn notify(&self, digest: &AlertDigest) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create outbox {}", self.dir.display()))?;
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        let path = self.dir.join(format!("{stamp}.txt"));
        let content = format!("Subject: {}\n\n{}", digest.subject, digest.body);
        fs::write(&path, content)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        tracing::info!(target: "notify", path = %path.display(), "digest written to outbox");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "outbox"
    }
}

/// Fans a digest out to every notifier; the first failure is returned after
/// all have been tried.
pub async fn notify_all(notifiers: &[Box<dyn Notifier>], digest: &AlertDigest) -> Result<()> {
    let mut first_err = None;
    for n in notifiers {
        if let Err(e) = n.notify(digest).await {
            tracing::warn!(error = ?e, notifier = n.name(), "notify failed");
            first_err.get_or_insert(e);
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
