use std::collections::HashSet;
use tracing::trace;

use crate::config::FormatConfig;
use crate::types::{Article, FormattedMessage};

/// Markers after which provider content is machine-truncated garbage.
const TRUNCATION_MARKERS: &[&str] = &["[+", "\u{2026}", "..."];

/// Characters that mark a sentence as markup or table debris.
const REJECT_CHARS: &[char] = &['[', ']', '(', ')', '{', '}', '<', '>', '|'];

/// Prefixes that mark a sentence as a bare link or a mention.
const REJECT_PREFIXES: &[&str] = &["http", "www", "//", "@"];

/// Promotional phrases that disqualify a sentence outright.
const BOILERPLATE: &[&str] = &["subscribe", "click here", "read more"];

/// Why an article produced no message. These are expected outcomes of the
/// content-quality gate, not faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("article failed validation")]
    InvalidArticle,
    #[error("fewer than the minimum number of usable sentences")]
    InsufficientContent,
    #[error("composed body below minimum length")]
    TooShort,
}

struct RuleContext {
    title_lower: String,
    min_sentence_len: usize,
}

/// One named sentence rule. Returns true when the sentence must be dropped.
/// The chain is applied in declaration order so the same article always
/// yields the same message.
struct SentenceRule {
    name: &'static str,
    rejects: fn(&RuleContext, &str) -> bool,
}

const SENTENCE_RULES: &[SentenceRule] = &[
    SentenceRule {
        name: "too_short",
        rejects: |ctx, s| s.chars().count() < ctx.min_sentence_len,
    },
    SentenceRule {
        name: "markup_chars",
        rejects: |_, s| s.contains(REJECT_CHARS),
    },
    SentenceRule {
        name: "link_prefix",
        rejects: |_, s| {
            let lower = s.to_lowercase();
            REJECT_PREFIXES.iter().any(|p| lower.starts_with(p))
        },
    },
    SentenceRule {
        name: "boilerplate",
        rejects: |_, s| {
            let lower = s.to_lowercase();
            BOILERPLATE.iter().any(|p| lower.contains(p))
        },
    },
    SentenceRule {
        name: "repeats_title",
        rejects: |ctx, s| {
            let lower = s.to_lowercase();
            lower == ctx.title_lower || lower.contains(&ctx.title_lower)
        },
    },
];

/// Turns one article into a deduplicated, length-bounded message body.
pub struct Formatter {
    config: FormatConfig,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(FormatConfig::default())
    }
}

impl Formatter {
    pub fn new(config: FormatConfig) -> Self {
        Self { config }
    }

    pub fn format(&self, article: &Article) -> Result<FormattedMessage, FormatError> {
        if !article.is_valid() {
            return Err(FormatError::InvalidArticle);
        }

        let combined = combine_text(
            article.description.as_deref().unwrap_or(""),
            article.content.as_deref().unwrap_or(""),
        );
        let sentences = split_sentences(&combined);
        let filtered = self.filter_sentences(&article.title, &sentences);

        let kept: Vec<&String> = filtered
            .iter()
            .filter(|s| s.chars().count() >= self.config.keep_sentence_len)
            .take(self.config.max_sentences)
            .collect();
        if kept.len() < self.config.min_sentences {
            return Err(FormatError::InsufficientContent);
        }

        let body = self.compose(article, &kept);
        if body.trim().chars().count() < self.config.min_body_len {
            return Err(FormatError::TooShort);
        }

        Ok(FormattedMessage {
            article_id: article.id,
            body,
        })
    }

    /// Apply the sentence rules in order, then keep the first occurrence of
    /// each case-normalized sentence. Deterministic and idempotent.
    pub fn filter_sentences(&self, title: &str, sentences: &[String]) -> Vec<String> {
        let ctx = RuleContext {
            title_lower: title.trim().to_lowercase(),
            min_sentence_len: self.config.min_sentence_len,
        };
        let mut seen: HashSet<String> = HashSet::new();
        let mut kept = Vec::new();
        'sentences: for sentence in sentences {
            let s = sentence.trim();
            for rule in SENTENCE_RULES {
                if (rule.rejects)(&ctx, s) {
                    trace!("Dropped sentence via rule {}: {}", rule.name, s);
                    continue 'sentences;
                }
            }
            if seen.insert(s.to_lowercase()) {
                kept.push(s.to_string());
            }
        }
        kept
    }

    fn compose(&self, article: &Article, sentences: &[&String]) -> String {
        let mut body = String::new();
        if let Some(image) = article.image_url.as_deref().filter(|u| !u.trim().is_empty()) {
            body.push_str(image.trim());
            body.push('\n');
        }
        body.push_str(&format!(
            "{}: {}\n\n",
            article.source_name,
            article.title.trim()
        ));
        for sentence in sentences {
            body.push_str(&format!("- {sentence}\n"));
        }
        if let Some(url) = article.url.as_deref().filter(|u| !u.trim().is_empty()) {
            body.push_str(&format!("Source: {}\n", url.trim()));
        }
        body.push('\n');
        body.push_str(&self.config.footer);
        body
    }
}

/// Join the trimmed description with the cleaned content and guarantee a
/// terminal punctuation mark at the end.
fn combine_text(description: &str, content: &str) -> String {
    let description = description.trim();
    let content = clean_content(content);
    let mut parts: Vec<&str> = Vec::new();
    if !description.is_empty() {
        parts.push(description);
    }
    if !content.is_empty() {
        parts.push(&content);
    }
    let mut combined = parts.join(". ");
    if !combined.ends_with(['.', '!', '?']) {
        combined.push('.');
    }
    combined
}

/// Cut provider content at the first machine-truncation marker.
fn clean_content(content: &str) -> String {
    let mut cleaned = content.trim();
    if let Some(cut) = TRUNCATION_MARKERS.iter().filter_map(|m| cleaned.find(m)).min() {
        cleaned = cleaned[..cut].trim_end();
    }
    cleaned.to_string()
}

/// Split on runs of terminal punctuation followed by whitespace or end of
/// text. Decimal points and other mid-token periods do not break sentences.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            while let Some(&next) = chars.peek() {
                if matches!(next, '.' | '!' | '?') {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            match chars.peek() {
                Some(next) if next.is_whitespace() => {
                    let trimmed = current.trim();
                    if !trimmed.is_empty() {
                        sentences.push(trimmed.to_string());
                    }
                    current.clear();
                }
                _ => {}
            }
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}
