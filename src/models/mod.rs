use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// A titled content span detected within a document, or a synthesized
/// page-range section when no headings were found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    pub content: String,
}

/// One validated multiple-choice question. `correct` indexes into `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(s: &str) -> Result<Self, ApiError> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ApiError::InvalidInput(format!(
                "Difficulty must be 'easy', 'medium', or 'hard', got '{}'.",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

fn default_difficulty() -> String {
    "medium".to_string()
}

fn default_num_questions() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct QuizRequest {
    pub content: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default = "default_num_questions")]
    pub num_questions: usize,
    /// Chapter titles selected by the client. Passed through for display;
    /// the caller is expected to have already narrowed `content`.
    #[serde(default)]
    pub chapters: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestion>,
    pub difficulty: String,
    pub num_questions: usize,
}

#[derive(Debug, Deserialize)]
pub struct ExplanationRequest {
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
}

#[derive(Debug, Serialize)]
pub struct ExplanationResponse {
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub explanation: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub total_chars: usize,
    pub chapters: Vec<Chapter>,
    pub full_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parses_known_levels() {
        assert_eq!(Difficulty::parse("easy").unwrap(), Difficulty::Easy);
        assert_eq!(Difficulty::parse("medium").unwrap(), Difficulty::Medium);
        assert_eq!(Difficulty::parse("hard").unwrap(), Difficulty::Hard);
    }

    #[test]
    fn difficulty_rejects_unknown_level() {
        let err = Difficulty::parse("extreme").unwrap_err();
        assert!(err.to_string().contains("extreme"));
    }

    #[test]
    fn quiz_request_fills_defaults() {
        let req: QuizRequest = serde_json::from_str(r#"{"content": "some text"}"#).unwrap();
        assert_eq!(req.difficulty, "medium");
        assert_eq!(req.num_questions, 10);
        assert!(req.chapters.is_none());
    }
}
