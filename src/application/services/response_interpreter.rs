//! Turns the model's reply to a sentiment prompt into a [`SentimentResult`].
//!
//! The model is asked for JSON but does not always comply. A strict parse is
//! tried first; when that fails, individual fields are recovered from the raw
//! reply with regular expressions. Only a reply with no sentiment token and
//! no summary at all is rejected.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::domain::{Sentiment, SentimentDistribution, SentimentResult, limit_topics};

pub const DEFAULT_SCORE: f64 = 0.7;
pub const DEFAULT_EMOTION: &str = "Neutral";
pub const DEFAULT_TITLE: &str = "Text Analysis";

static SENTIMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)sentiment.*?:\s*["']?(positiv|negativ|neutral)"#).unwrap()
});
static SCORE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)score.*?:\s*(0\.\d+)").unwrap());
static SUMMARY_PATTERNS: LazyLock<[(Regex, SummarySource); 3]> = LazyLock::new(|| {
    [
        (
            Regex::new(r#"(?i)summary"?\s*:\s*"([^"]+)""#).unwrap(),
            SummarySource::DoubleQuoted,
        ),
        (
            Regex::new(r#"(?i)summary"?\s*:\s*'([^']+)'"#).unwrap(),
            SummarySource::SingleQuoted,
        ),
        (
            Regex::new(
                r#"(?i)summary"?\s*:\s*"?([\s\S]+?)"?\s*(?:,\s*"?(?:title|topics|intent|emotion|distribution)|\z)"#,
            )
            .unwrap(),
            SummarySource::Unquoted,
        ),
    ]
});
static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)title.*?:\s*["']?(.*?)["']?(?:,|\}|$)"#).unwrap());
static EMOTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)emotion.*?:\s*["']?(.*?)["']?(?:,|\}|$)"#).unwrap());
static DISTRIBUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)distribution.*?:\s*\{([^}]+)\}").unwrap());
static TOPICS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"topics"?\s*:\s*\[([\s\S]*?)\]"#).unwrap());
static INTENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"intent"?\s*:\s*\[([\s\S]*?)\]"#).unwrap());
static DISTRIBUTION_KEYS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    ["positive", "neutral", "negative"].map(|key| {
        Regex::new(&format!(r#"(?i)["']?{key}["']?\s*:\s*(-?\d+(?:\.\d+)?)"#)).unwrap()
    })
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterpretError {
    #[error("Invalid response format from AI")]
    InvalidResponseFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySource {
    DoubleQuoted,
    SingleQuoted,
    Unquoted,
    /// Nothing matched; the whole reply stands in for the summary.
    WholeResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionSource {
    Json,
    KeyValues,
    Synthesized,
}

/// What the fallback path managed to recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryReport {
    pub sentiment_found: bool,
    pub summary: SummarySource,
    pub distribution: DistributionSource,
}

impl RecoveryReport {
    pub fn is_low_confidence(&self) -> bool {
        !self.sentiment_found || self.summary == SummarySource::WholeResponse
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    /// The reply parsed as JSON. `complete` is false when either the
    /// sentiment or the summary field was missing.
    Strict {
        result: SentimentResult,
        complete: bool,
    },
    Recovered {
        result: SentimentResult,
        report: RecoveryReport,
    },
}

impl Interpretation {
    pub fn result(&self) -> &SentimentResult {
        match self {
            Interpretation::Strict { result, .. } | Interpretation::Recovered { result, .. } => {
                result
            }
        }
    }

    pub fn into_result(self) -> SentimentResult {
        match self {
            Interpretation::Strict { result, .. } | Interpretation::Recovered { result, .. } => {
                result
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Interpretation::Strict { .. } => "strict",
            Interpretation::Recovered { .. } => "recovered",
        }
    }

    pub fn is_low_confidence(&self) -> bool {
        match self {
            Interpretation::Strict { complete, .. } => !complete,
            Interpretation::Recovered { report, .. } => report.is_low_confidence(),
        }
    }
}

#[derive(Deserialize)]
struct StrictPayload {
    sentiment: Option<Sentiment>,
    score: Option<f64>,
    summary: Option<String>,
    title: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    intent: Vec<String>,
    emotion: Option<String>,
    distribution: Option<SentimentDistribution>,
}

/// Removes Markdown code fence markers the model likes to wrap JSON in.
pub fn strip_code_fence(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

pub fn interpret(raw: &str, fallback_title: &str) -> Result<Interpretation, InterpretError> {
    if raw.trim().is_empty() {
        return Err(InterpretError::InvalidResponseFormat);
    }

    let cleaned = strip_code_fence(raw);
    match parse_strict(&cleaned) {
        Some(payload) => {
            tracing::debug!("Model reply parsed as JSON");
            from_strict(payload, fallback_title)
        }
        None => {
            tracing::debug!("Model reply is not valid JSON, recovering fields");
            recover(raw, fallback_title)
        }
    }
}

fn parse_strict(cleaned: &str) -> Option<StrictPayload> {
    let value: serde_json::Value = serde_json::from_str(cleaned).ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

fn from_strict(
    payload: StrictPayload,
    fallback_title: &str,
) -> Result<Interpretation, InterpretError> {
    let summary = payload.summary.unwrap_or_default().trim().to_string();
    let has_sentiment = payload.sentiment.is_some();
    let has_summary = !summary.is_empty();

    if !has_sentiment && !has_summary {
        return Err(InterpretError::InvalidResponseFormat);
    }

    let sentiment = payload.sentiment.unwrap_or(Sentiment::Neutral);
    let score = clamp_score(payload.score.unwrap_or(DEFAULT_SCORE));

    let result = SentimentResult {
        sentiment,
        score,
        summary,
        title: resolve_title(payload.title.as_deref(), fallback_title),
        topics: limit_topics(payload.topics),
        intent: clean_list(payload.intent),
        emotion: non_empty(payload.emotion.as_deref())
            .unwrap_or(DEFAULT_EMOTION)
            .to_string(),
        distribution: payload
            .distribution
            .unwrap_or_else(|| SentimentDistribution::synthesize(sentiment, score)),
    };

    Ok(Interpretation::Strict {
        result,
        complete: has_sentiment && has_summary,
    })
}

fn recover(raw: &str, fallback_title: &str) -> Result<Interpretation, InterpretError> {
    let found_sentiment = capture(&SENTIMENT, raw).and_then(|s| s.parse::<Sentiment>().ok());

    let (summary, summary_source) = SUMMARY_PATTERNS
        .iter()
        .find_map(|(pattern, source)| {
            capture(pattern, raw)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| (s.to_string(), *source))
        })
        .unwrap_or_else(|| (raw.trim().to_string(), SummarySource::WholeResponse));

    if found_sentiment.is_none() && summary_source == SummarySource::WholeResponse {
        tracing::warn!("No sentiment or summary could be recovered from model reply");
        return Err(InterpretError::InvalidResponseFormat);
    }

    let sentiment = found_sentiment.unwrap_or(Sentiment::Neutral);
    let score = capture(&SCORE, raw)
        .and_then(|s| s.parse::<f64>().ok())
        .map(clamp_score)
        .unwrap_or(DEFAULT_SCORE);
    let (distribution, distribution_source) = recover_distribution(raw, sentiment, score);

    let result = SentimentResult {
        sentiment,
        score,
        summary,
        title: resolve_title(capture(&TITLE, raw), fallback_title),
        topics: limit_topics(capture(&TOPICS, raw).map(parse_list).unwrap_or_default()),
        intent: capture(&INTENT, raw).map(parse_list).unwrap_or_default(),
        emotion: non_empty(capture(&EMOTION, raw))
            .unwrap_or(DEFAULT_EMOTION)
            .to_string(),
        distribution,
    };

    let report = RecoveryReport {
        sentiment_found: found_sentiment.is_some(),
        summary: summary_source,
        distribution: distribution_source,
    };
    tracing::debug!(?report, "Recovered sentiment result from unstructured reply");

    Ok(Interpretation::Recovered { result, report })
}

fn recover_distribution(
    raw: &str,
    sentiment: Sentiment,
    score: f64,
) -> (SentimentDistribution, DistributionSource) {
    if let Some(body) = capture(&DISTRIBUTION, raw) {
        if let Ok(parsed) = serde_json::from_str::<SentimentDistribution>(&format!("{{{body}}}")) {
            return (parsed, DistributionSource::Json);
        }

        let [positive, neutral, negative] = DISTRIBUTION_KEYS
            .each_ref()
            .map(|pattern| capture(pattern, body).and_then(|v| v.parse::<f64>().ok()));
        if let (Some(positive), Some(neutral), Some(negative)) = (positive, neutral, negative) {
            return (
                SentimentDistribution {
                    positive,
                    neutral,
                    negative,
                },
                DistributionSource::KeyValues,
            );
        }
    }

    (
        SentimentDistribution::synthesize(sentiment, score),
        DistributionSource::Synthesized,
    )
}

/// Parses the inside of a bracketed list, as JSON when possible and by
/// splitting on commas otherwise.
fn parse_list(inner: &str) -> Vec<String> {
    if let Ok(items) = serde_json::from_str::<Vec<String>>(&format!("[{inner}]")) {
        return clean_list(items);
    }

    inner
        .split(',')
        .map(|item| {
            item.trim()
                .chars()
                .filter(|c| !matches!(c, '"' | '[' | ']' | '\''))
                .collect::<String>()
        })
        .filter(|item| !item.trim().is_empty())
        .collect()
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn resolve_title(candidate: Option<&str>, fallback_title: &str) -> String {
    non_empty(candidate)
        .or_else(|| non_empty(Some(fallback_title)))
        .unwrap_or(DEFAULT_TITLE)
        .to_string()
}

fn capture<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        DEFAULT_SCORE
    } else {
        score.clamp(0.0, 1.0)
    }
}
