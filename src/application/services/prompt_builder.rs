pub const DEFAULT_RESPONSE_LANGUAGE: &str = "Danish";

/// Builds the structured-output prompt for a full sentiment analysis.
///
/// Generated fields are requested in `language`; the title is always kept in
/// the language of the source text. The source text is embedded verbatim.
#[derive(Debug, Clone)]
pub struct SentimentPromptBuilder {
    language: String,
}

impl SentimentPromptBuilder {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn build(&self, text: &str) -> String {
        let language = &self.language;
        format!(
            r#"Please analyze the sentiment of the following text and provide the response IN {upper} while maintaining the same level of analysis quality.
IMPORTANT: Keep the title in its original language - do not translate it.

1. The overall sentiment (strictly one of: positiv, negativ, or neutral)
2. A confidence score between 0 and 1
3. A brief, concise summary in {language} (maximum 2-3 short sentences) that captures the core sentiment and main point
4. Keep the original title of the text as is - DO NOT translate it
   If this appears to be an article or blog post, use its actual title without translation
5. Identify key topics in {language} (as an array of strings)
6. Determine the intent in {language} (e.g. praise, recommendation, complaint, as an array)
7. Identify the primary emotion in {language} (e.g. happy, satisfied, angry)
8. Provide sentiment distribution percentages that sum to 100%:
   - Positive percentage
   - Neutral percentage
   - Negative percentage

Text to analyze:
"{text}"

Format your response in JSON like this (with {language} text, except for the title):
{{
  "sentiment": "positiv/negativ/neutral",
  "score": 0.XX,
  "summary": "short and precise explanation (2-3 sentences)",
  "title": "original title - do not translate",
  "topics": ["topic1", "topic2", ...],
  "intent": ["intent1", "intent2"],
  "emotion": "primary emotion",
  "distribution": {{
    "positive": XX,
    "neutral": XX,
    "negative": XX
  }}
}}"#,
            upper = language.to_uppercase(),
        )
    }
}

impl Default for SentimentPromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_RESPONSE_LANGUAGE)
    }
}

/// Prompt for the lightweight sentiment endpoint: a label and an explanation.
pub fn build_direct_sentiment_prompt(text: &str) -> String {
    format!(
        r#"Analyze the sentiment of the following text and categorize it as either POSITIVE, NEGATIVE, or NEUTRAL. Also provide a brief explanation of why. Format the response as JSON with two fields: "sentiment" and "explanation". The sentiment should be one of the three categories mentioned.

Text to analyze: "{text}""#
    )
}
