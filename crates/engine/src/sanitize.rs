//! Notification body sanitization and title translation.
//!
//! Forum notification bodies arrive HTML-escaped and tag-laden, sometimes
//! entity-encoded more than once by upstream plugins. Each pass decodes one
//! level of entities and drops markup; passes repeat until the text stops
//! changing, so double-encoded content still comes out plain.

use std::sync::Arc;

use scraper::Html;

use herald_common::error::AppError;

use crate::translate::Translator;

/// Upper bound on decode passes; real content settles in two or three.
const MAX_PASSES: usize = 4;

/// One decode + strip pass: parse as an HTML fragment and keep only the
/// text nodes.
fn strip_once(input: &str) -> String {
    let fragment = Html::parse_fragment(input);
    fragment.root_element().text().collect()
}

/// Reduce a notification body to plain text.
pub fn sanitize_body(raw: &str) -> String {
    let mut current = raw.to_string();
    for _ in 0..MAX_PASSES {
        let next = strip_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Renders notification titles in the recipient's language.
pub struct ContentSanitizer {
    translator: Arc<dyn Translator>,
}

impl ContentSanitizer {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    /// Translate the short title text, then strip any markup the translator
    /// echoed back.
    pub async fn translate_title(&self, body_short: &str, lang: &str) -> Result<String, AppError> {
        let translated = self.translator.translate(body_short, lang).await?;
        Ok(strip_once(&translated))
    }
}
