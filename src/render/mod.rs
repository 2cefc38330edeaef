// src/render/mod.rs
//! Message rendering: entry and digest bodies in paired plain-text / HTML
//! form.
//!
//! Titles, links, and dates are escaped before interpolation; summaries are
//! feed-supplied HTML fragments and pass through as-is after formula
//! translation.

pub mod mathml;

use anyhow::Result;
use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::feed::Entry;

/// Plain-text and HTML renditions of one notification.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageBody {
    pub text: String,
    pub html: String,
}

/// Turns entries into notification bodies. Implementations must be pure:
/// same input, same output, no delivery side effects.
pub trait Renderer: Send + Sync {
    /// Body for a single-entry notification.
    fn render_entry(&self, feed: &str, entry: &Entry) -> Result<MessageBody>;

    /// Body for one digest covering a whole batch.
    fn render_digest(&self, feed: &str, entries: &[Entry], today: NaiveDate)
        -> Result<MessageBody>;
}

const TEXT_SUMMARY_LIMIT: usize = 500;

const ENTRY_CSS: &str = r#"<style>
  body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Helvetica Neue', Arial, sans-serif;
         line-height: 1.6; max-width: 800px; margin: 0 auto; padding: 20px; background-color: #f5f5f5; }
  .container { background-color: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
  h1 { color: #2c3e50; border-bottom: 3px solid #3498db; padding-bottom: 10px; }
  .summary { background-color: #f9f9f9; padding: 15px; border-left: 4px solid #3498db; margin: 15px 0; color: #555; }
  a { color: #3498db; text-decoration: none; }
  a:hover { text-decoration: underline; }
</style>"#;

const DIGEST_CSS: &str = r#"<style>
  body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Helvetica Neue', Arial, sans-serif;
         line-height: 1.6; max-width: 900px; margin: 0 auto; padding: 20px; background-color: #f5f5f5; }
  .container { background-color: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
  h1 { color: #2c3e50; border-bottom: 3px solid #3498db; padding-bottom: 10px; }
  .entry { margin: 30px 0; padding: 20px; background-color: #f9f9f9; border-left: 4px solid #3498db; border-radius: 4px; }
  .entry h2 { margin-top: 0; }
  .entry h2 a { color: #2c3e50; text-decoration: none; }
  .entry h2 a:hover { color: #3498db; }
  .summary { background-color: white; padding: 15px; border-left: 3px solid #95a5a6; margin: 15px 0; color: #555; }
  .meta { color: #7f8c8d; font-size: 0.9em; margin: 10px 0; }
  .no-entries { text-align: center; color: #7f8c8d; padding: 40px; font-style: italic; }
</style>"#;

/// Default renderer: styled HTML with MathML-translated summaries, plus a
/// minimal plain-text alternative.
#[derive(Debug, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for HtmlRenderer {
    fn render_entry(&self, _feed: &str, entry: &Entry) -> Result<MessageBody> {
        let text = format!(
            "{}\n\n{}\n\n{}...",
            entry.title,
            entry.link,
            truncate_chars(&entry.summary, TEXT_SUMMARY_LIMIT)
        );

        let html = format!(
            concat!(
                "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n",
                "{css}\n</head>\n<body>\n<div class=\"container\">\n",
                "<h1><a href=\"{href}\" target=\"_blank\">{title}</a></h1>\n",
                "<div class=\"summary\">{summary}</div>\n",
                "<p><a href=\"{href}\" target=\"_blank\">Read more →</a></p>\n",
                "</div>\n</body>\n</html>\n"
            ),
            css = ENTRY_CSS,
            href = encode_double_quoted_attribute(&entry.link),
            title = encode_text(&entry.title),
            summary = mathml::translate_formulas(&entry.summary),
        );

        Ok(MessageBody { text, html })
    }

    fn render_digest(
        &self,
        feed: &str,
        entries: &[Entry],
        today: NaiveDate,
    ) -> Result<MessageBody> {
        let heading = format!("{feed} - Daily digest ({today})");

        let mut text = format!("{heading}\n\nTotal: {} entries\n\n", entries.len());
        for (i, entry) in entries.iter().enumerate() {
            text.push_str(&format!("{}. {}\n   {}\n\n", i + 1, entry.title, entry.link));
        }

        let mut html = format!(
            concat!(
                "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n",
                "<title>{heading}</title>\n{css}\n</head>\n<body>\n<div class=\"container\">\n",
                "<h1>{heading}</h1>\n<p>Total: {count} entries</p>\n"
            ),
            heading = encode_text(&heading),
            css = DIGEST_CSS,
            count = entries.len(),
        );
        if entries.is_empty() {
            html.push_str("<div class=\"no-entries\">No new entries today.</div>\n");
        }
        for entry in entries {
            let meta = match entry.timestamp() {
                Some(ts) => format!(
                    "<div class=\"meta\">Published: {}</div>\n",
                    ts.format("%Y-%m-%d %H:%M")
                ),
                None => String::new(),
            };
            html.push_str(&format!(
                concat!(
                    "<div class=\"entry\">\n",
                    "<h2><a href=\"{href}\" target=\"_blank\">{title}</a></h2>\n",
                    "{meta}",
                    "<div class=\"summary\">{summary}</div>\n",
                    "</div>\n"
                ),
                href = encode_double_quoted_attribute(&entry.link),
                title = encode_text(&entry.title),
                meta = meta,
                summary = mathml::translate_formulas(&entry.summary),
            ));
        }
        html.push_str("</div>\n</body>\n</html>\n");

        Ok(MessageBody { text, html })
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
