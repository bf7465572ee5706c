use helpai::application::services::{
    DEFAULT_EMOTION, DEFAULT_SCORE, DEFAULT_TITLE, DistributionSource, InterpretError,
    Interpretation, SummarySource, interpret, strip_code_fence,
};
use helpai::domain::{Sentiment, SentimentDistribution};

const FALLBACK_TITLE: &str = "Guessed Title";

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn given_complete_json_when_interpreting_then_returns_strict_result() {
    let raw = r#"{"sentiment":"positiv","score":0.9,"summary":"Great product.","title":"Review","topics":["quality","price"],"intent":["praise"],"emotion":"glad","distribution":{"positive":90,"neutral":5,"negative":5}}"#;

    let interpretation = interpret(raw, FALLBACK_TITLE).unwrap();

    assert_eq!(interpretation.kind(), "strict");
    assert!(!interpretation.is_low_confidence());
    let result = interpretation.result();
    assert_eq!(result.sentiment, Sentiment::Positive);
    assert!(approx(result.score, 0.9));
    assert_eq!(result.summary, "Great product.");
    assert_eq!(result.title, "Review");
    assert_eq!(result.topics, vec!["quality", "price"]);
    assert_eq!(result.intent, vec!["praise"]);
    assert_eq!(result.emotion, "glad");
    assert_eq!(
        result.distribution,
        SentimentDistribution {
            positive: 90.0,
            neutral: 5.0,
            negative: 5.0
        }
    );
}

#[test]
fn given_json_in_code_fence_when_interpreting_then_parses_strictly() {
    let raw = "```json\n{\"sentiment\": \"negativ\", \"score\": 0.8, \"summary\": \"Bad.\"}\n```";

    let interpretation = interpret(raw, FALLBACK_TITLE).unwrap();

    assert_eq!(interpretation.kind(), "strict");
    let result = interpretation.result();
    assert_eq!(result.sentiment, Sentiment::Negative);
    assert_eq!(result.title, FALLBACK_TITLE);
    assert_eq!(result.emotion, DEFAULT_EMOTION);
    assert!(approx(result.distribution.negative, 80.0));
    assert!(approx(result.distribution.total(), 100.0));
}

#[test]
fn given_json_without_sentiment_when_interpreting_then_low_confidence_neutral() {
    let raw = r#"{"summary": "Only a summary here."}"#;

    let interpretation = interpret(raw, FALLBACK_TITLE).unwrap();

    assert!(matches!(
        interpretation,
        Interpretation::Strict {
            complete: false,
            ..
        }
    ));
    assert!(interpretation.is_low_confidence());
    let result = interpretation.result();
    assert_eq!(result.sentiment, Sentiment::Neutral);
    assert!(approx(result.score, DEFAULT_SCORE));
    assert!(approx(result.distribution.neutral, 70.0));
}

#[test]
fn given_json_with_neither_signal_when_interpreting_then_fails() {
    let result = interpret(r#"{"foo": 1}"#, FALLBACK_TITLE);

    assert_eq!(result, Err(InterpretError::InvalidResponseFormat));
}

#[test]
fn given_out_of_range_score_when_interpreting_then_clamps() {
    let raw = r#"{"sentiment": "positive", "score": 1.7, "summary": "Very good."}"#;

    let result = interpret(raw, FALLBACK_TITLE).unwrap().into_result();

    assert!(approx(result.score, 1.0));
    assert_eq!(result.sentiment, Sentiment::Positive);
}

#[test]
fn given_plain_text_reply_when_interpreting_then_recovers_and_synthesizes_distribution() {
    let raw = "Sentiment: positiv\nScore: 0.82\nSummary: \"The author loves coffee.\"";

    let interpretation = interpret(raw, FALLBACK_TITLE).unwrap();

    let Interpretation::Recovered { result, report } = interpretation else {
        panic!("expected recovered interpretation");
    };
    assert_eq!(result.sentiment, Sentiment::Positive);
    assert!(approx(result.score, 0.82));
    assert_eq!(result.summary, "The author loves coffee.");
    assert_eq!(result.title, FALLBACK_TITLE);
    assert_eq!(result.emotion, DEFAULT_EMOTION);
    assert!(approx(result.distribution.positive, 82.0));
    assert!(approx(result.distribution.neutral, 9.0));
    assert!(approx(result.distribution.negative, 9.0));
    assert!(report.sentiment_found);
    assert_eq!(report.summary, SummarySource::DoubleQuoted);
    assert_eq!(report.distribution, DistributionSource::Synthesized);
    assert!(!report.is_low_confidence());
}

#[test]
fn given_json_with_trailing_commas_when_interpreting_then_recovers_fields() {
    let raw = r#"{
  "sentiment": "positiv",
  "score": 0.82,
  "summary": "Coffee changed the world.",
  "title": "How Coffee Changed the World",
  "topics": ["coffee", "history",],
}"#;

    let interpretation = interpret(raw, FALLBACK_TITLE).unwrap();

    assert_eq!(interpretation.kind(), "recovered");
    let result = interpretation.result();
    assert_eq!(result.sentiment, Sentiment::Positive);
    assert_eq!(result.summary, "Coffee changed the world.");
    assert_eq!(result.title, "How Coffee Changed the World");
    assert_eq!(result.topics, vec!["coffee", "history"]);
    assert!(result.intent.is_empty());
}

#[test]
fn given_single_quoted_summary_and_loose_distribution_when_interpreting_then_reads_key_values() {
    let raw = "sentiment: negativ, summary: 'Bad service', distribution: {positive: 10, neutral: 20, negative: 70}";

    let Interpretation::Recovered { result, report } = interpret(raw, FALLBACK_TITLE).unwrap()
    else {
        panic!("expected recovered interpretation");
    };

    assert_eq!(result.sentiment, Sentiment::Negative);
    assert_eq!(result.summary, "Bad service");
    assert!(approx(result.score, DEFAULT_SCORE));
    assert_eq!(report.summary, SummarySource::SingleQuoted);
    assert_eq!(report.distribution, DistributionSource::KeyValues);
    assert_eq!(
        result.distribution,
        SentimentDistribution {
            positive: 10.0,
            neutral: 20.0,
            negative: 70.0
        }
    );
}

#[test]
fn given_unquoted_summary_when_interpreting_then_stops_at_next_field() {
    let raw = "Sentiment: neutral\nSummary: The text is mostly factual, title: Market Update";

    let Interpretation::Recovered { result, report } = interpret(raw, FALLBACK_TITLE).unwrap()
    else {
        panic!("expected recovered interpretation");
    };

    assert_eq!(result.summary, "The text is mostly factual");
    assert_eq!(result.title, "Market Update");
    assert_eq!(report.summary, SummarySource::Unquoted);
}

#[test]
fn given_summary_without_sentiment_when_interpreting_then_low_confidence() {
    let raw = "Summary: \"Just a summary.\"";

    let interpretation = interpret(raw, FALLBACK_TITLE).unwrap();

    assert!(interpretation.is_low_confidence());
    assert_eq!(interpretation.result().sentiment, Sentiment::Neutral);
}

#[test]
fn given_sentiment_without_summary_when_interpreting_then_uses_whole_reply() {
    let raw = "The sentiment: negativ overall";

    let Interpretation::Recovered { result, report } = interpret(raw, FALLBACK_TITLE).unwrap()
    else {
        panic!("expected recovered interpretation");
    };

    assert_eq!(result.sentiment, Sentiment::Negative);
    assert_eq!(result.summary, raw);
    assert_eq!(report.summary, SummarySource::WholeResponse);
    assert!(report.is_low_confidence());
}

#[test]
fn given_reply_without_any_signal_when_interpreting_then_fails() {
    let result = interpret("I cannot help with that request.", FALLBACK_TITLE);

    assert_eq!(result, Err(InterpretError::InvalidResponseFormat));
}

#[test]
fn given_blank_reply_when_interpreting_then_fails() {
    assert_eq!(
        interpret("   \n ", FALLBACK_TITLE),
        Err(InterpretError::InvalidResponseFormat)
    );
}

#[test]
fn given_empty_fallback_title_when_model_gives_none_then_uses_default_title() {
    let raw = r#"{"sentiment": "neutral", "summary": "Fine."}"#;

    let result = interpret(raw, "").unwrap().into_result();

    assert_eq!(result.title, DEFAULT_TITLE);
}

#[test]
fn given_recovered_topics_over_limit_when_interpreting_then_caps_at_seven() {
    let raw = r#"sentiment: positiv, summary: "Lots of topics", topics: ["a","b","c","a","d","e","f","g","h","i"]"#;

    let result = interpret(raw, FALLBACK_TITLE).unwrap().into_result();

    assert_eq!(result.topics, vec!["a", "b", "c", "d", "e", "f", "g"]);
}

#[test]
fn given_fenced_reply_when_stripping_then_removes_markers() {
    assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
    assert_eq!(strip_code_fence("  plain  "), "plain");
}
