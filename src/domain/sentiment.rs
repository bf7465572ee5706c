use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Upper bound on the number of topics kept on a result.
pub const MAX_TOPICS: usize = 7;

/// Overall polarity of a text.
///
/// Labels follow the vocabulary the model is asked to answer in
/// (`positiv`, `negativ`, `neutral`); parsing is case-insensitive and also
/// accepts the English spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positiv",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negativ",
        }
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positiv" | "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negativ" | "negative" => Ok(Sentiment::Negative),
            other => Err(format!("Invalid sentiment: {}", other)),
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Sentiment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Sentiment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Percentage breakdown across the three polarities.
///
/// Values coming straight from the model are kept as-is and may not add up to
/// exactly 100; [`SentimentDistribution::synthesize`] always does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl SentimentDistribution {
    /// The dominant polarity gets `score * 100`, the other two split the rest.
    pub fn synthesize(sentiment: Sentiment, score: f64) -> Self {
        let dominant = score * 100.0;
        let remainder = ((1.0 - score) * 100.0) / 2.0;
        match sentiment {
            Sentiment::Positive => Self {
                positive: dominant,
                neutral: remainder,
                negative: remainder,
            },
            Sentiment::Neutral => Self {
                positive: remainder,
                neutral: dominant,
                negative: remainder,
            },
            Sentiment::Negative => Self {
                positive: remainder,
                neutral: remainder,
                negative: dominant,
            },
        }
    }

    pub fn total(&self) -> f64 {
        self.positive + self.neutral + self.negative
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub sentiment: Sentiment,
    pub score: f64,
    pub summary: String,
    pub title: String,
    pub topics: Vec<String>,
    pub intent: Vec<String>,
    pub emotion: String,
    pub distribution: SentimentDistribution,
}

/// Trims, drops empty entries and duplicates, keeps first-seen order and at
/// most [`MAX_TOPICS`] entries.
pub fn limit_topics<I, S>(topics: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut unique: Vec<String> = Vec::new();
    for topic in topics {
        let topic = topic.as_ref().trim();
        if topic.is_empty() || unique.iter().any(|seen| seen == topic) {
            continue;
        }
        unique.push(topic.to_string());
        if unique.len() == MAX_TOPICS {
            break;
        }
    }
    unique
}
