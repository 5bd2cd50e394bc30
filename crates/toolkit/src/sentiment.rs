//! Lexicon-based sentiment analysis tool

use contracts::{ContractError, Tool};
use tracing::debug;

pub const SENTIMENT_TOOL_NAME: &str = "sentiment_analysis";

const POSITIVE: &[&str] = &[
    "amazing", "appreciate", "benefit", "best", "delighted", "effective", "excellent",
    "excited", "exciting", "fantastic", "glad", "good", "great", "happy", "helpful",
    "impressive", "innovative", "love", "opportunity", "pleased", "positive", "success",
    "successful", "thank", "thanks", "valuable", "welcome", "wonderful",
];

const NEGATIVE: &[&str] = &[
    "angry", "annoyed", "awful", "bad", "broken", "complaint", "disappointed",
    "disappointing", "difficult", "fail", "failed", "failure", "frustrated", "hate",
    "negative", "poor", "problem", "sorry", "terrible", "unfortunately", "upset", "worse",
    "worst", "wrong",
];

/// Sentiment classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

/// Classifies text so outreach drafts stay positive and engaging
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentAnalysisTool;

impl SentimentAnalysisTool {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, text: &str) -> Sentiment {
        let mut score: i32 = 0;
        for word in text
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            if POSITIVE.contains(&word.as_str()) {
                score += 1;
            } else if NEGATIVE.contains(&word.as_str()) {
                score -= 1;
            }
        }
        debug!(score, "sentiment scored");

        match score {
            s if s > 0 => Sentiment::Positive,
            s if s < 0 => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

impl Tool for SentimentAnalysisTool {
    fn name(&self) -> &str {
        SENTIMENT_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Analyzes the sentiment of text to ensure positive and engaging communication."
    }

    fn run(&self, input: &str) -> Result<String, ContractError> {
        if input.trim().is_empty() {
            return Err(ContractError::tool(SENTIMENT_TOOL_NAME, "no text to analyze"));
        }
        Ok(self.classify(input).as_str().to_string())
    }
}
