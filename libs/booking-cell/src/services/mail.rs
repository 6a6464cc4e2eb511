use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::models::MailDraft;

/// Hands a pre-filled draft to the platform's mail client.
///
/// Success means the composer opened; whether the user sends the message is
/// not observable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailComposer: Send + Sync {
    async fn open(&self, draft: &MailDraft) -> Result<()>;
}

/// Opens `mailto:` links with the desktop URL opener.
pub struct SystemMailComposer {
    opener: String,
}

impl SystemMailComposer {
    pub fn new() -> Self {
        let opener = if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(target_os = "windows") {
            "explorer"
        } else {
            "xdg-open"
        };
        Self::with_opener(opener)
    }

    pub fn with_opener(opener: &str) -> Self {
        Self { opener: opener.to_string() }
    }
}

impl Default for SystemMailComposer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailComposer for SystemMailComposer {
    async fn open(&self, draft: &MailDraft) -> Result<()> {
        debug!("Opening mail composer for {}", draft.recipient);

        let status = Command::new(&self.opener)
            .arg(draft.mailto())
            .status()
            .await
            .with_context(|| format!("Failed to launch {}", self.opener))?;

        if !status.success() {
            bail!("{} exited with {}", self.opener, status);
        }
        Ok(())
    }
}
