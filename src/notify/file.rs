// src/notify/file.rs
//! Filesystem transport: one `.txt`/`.html` pair per notification.
//!
//! Serves as the `file` delivery transport and doubles as a dry-run mode
//! for trying out new source or dispatch configs without mailing anyone.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::{Notifier, OutboundMessage};

const SLUG_MAX: usize = 60;

/// Writes messages into a directory as numbered text/HTML pairs.
pub struct FileNotifier {
    dir: PathBuf,
    seq: AtomicUsize,
}

impl FileNotifier {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            seq: AtomicUsize::new(1),
        }
    }
}

#[async_trait]
impl Notifier for FileNotifier {
    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating {}", self.dir.display()))?;

        let n = self.seq.fetch_add(1, Ordering::SeqCst);
        let stem = format!("{n:03}-{}", slug(&message.subject));
        let txt_path = self.dir.join(format!("{stem}.txt"));
        let html_path = self.dir.join(format!("{stem}.html"));

        let txt = format!("Subject: {}\n\n{}", message.subject, message.body.text);
        tokio::fs::write(&txt_path, txt)
            .await
            .with_context(|| format!("writing {}", txt_path.display()))?;
        tokio::fs::write(&html_path, &message.body.html)
            .await
            .with_context(|| format!("writing {}", html_path.display()))?;

        tracing::info!(path = %txt_path.display(), "notification written");
        Ok(())
    }
}

/// Filesystem-safe stem from a subject line: lowercase ASCII alphanumerics,
/// everything else collapsed to single dashes.
fn slug(subject: &str) -> String {
    let mut out = String::new();
    let mut prev_dash = true;
    for c in subject.chars() {
        let c = if c.is_ascii_alphanumeric() {
            c.to_ascii_lowercase()
        } else {
            '-'
        };
        if c == '-' && prev_dash {
            continue;
        }
        prev_dash = c == '-';
        out.push(c);
        if out.len() >= SLUG_MAX {
            break;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("message");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MessageBody;

    #[test]
    fn slug_collapses_punctuation_and_caps_length() {
        assert_eq!(slug("[papers] A new bound!"), "papers-a-new-bound");
        assert_eq!(slug("___"), "message");
        assert!(slug(&"x y ".repeat(100)).len() <= SLUG_MAX);
    }

    #[tokio::test]
    async fn send_writes_numbered_text_and_html_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = FileNotifier::new(dir.path());
        let message = OutboundMessage {
            subject: "[papers] First".to_string(),
            body: MessageBody {
                text: "plain".to_string(),
                html: "<p>rich</p>".to_string(),
            },
        };
        notifier.send(&message).await.unwrap();
        notifier.send(&message).await.unwrap();

        let txt = std::fs::read_to_string(dir.path().join("001-papers-first.txt")).unwrap();
        assert!(txt.starts_with("Subject: [papers] First"));
        assert!(txt.ends_with("plain"));
        let html = std::fs::read_to_string(dir.path().join("001-papers-first.html")).unwrap();
        assert_eq!(html, "<p>rich</p>");
        assert!(dir.path().join("002-papers-first.txt").exists());
    }
}
