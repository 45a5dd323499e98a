use std::time::Duration;

use anyhow::Result;
use serde_json::Value;

use crate::config::Config;
use crate::models::{Difficulty, QuizQuestion};
use crate::services::chunker;
use crate::services::llm::TextGenerator;

const GENERATION_TEMPERATURE: f32 = 0.7;
const GENERATION_MAX_TOKENS: u32 = 4000;
const EXPLANATION_TEMPERATURE: f32 = 0.5;
const EXPLANATION_MAX_TOKENS: u32 = 300;

/// Minimum-interval backpressure between consecutive generation calls.
/// Kept as its own object so tests can drive it with a paused clock.
pub struct Pacer {
    interval: Duration,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Pacer { interval }
    }

    pub async fn pause(&self) {
        if !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
    }
}

/// What one chunk produced: the questions that survived validation plus a
/// count of entries the model returned that did not.
#[derive(Debug, Default)]
pub struct ChunkOutcome {
    pub accepted: Vec<QuizQuestion>,
    pub rejected: usize,
}

#[derive(Debug)]
pub struct QuizOutcome {
    pub questions: Vec<QuizQuestion>,
    pub rejected: usize,
}

/// Spread `total` questions across `chunk_count` chunks so the quotas sum
/// exactly to `total`. The remainder is front-loaded: early chunks get one
/// extra question each until it is used up.
pub fn distribute(total: usize, chunk_count: usize) -> Vec<usize> {
    if chunk_count == 0 {
        return Vec::new();
    }
    if chunk_count == 1 {
        return vec![total];
    }

    let base = total / chunk_count;
    let remainder = total % chunk_count;
    (0..chunk_count)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

fn difficulty_instruction(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => {
            "Create simple, straightforward questions that test basic understanding. \
             Options should be clearly distinct."
        }
        Difficulty::Medium => {
            "Create moderately challenging questions that test comprehension and \
             application. Include some plausible distractors."
        }
        Difficulty::Hard => {
            "Create challenging questions that test deep understanding and critical \
             thinking. Distractors should be very plausible."
        }
    }
}

fn build_chunk_prompt(chunk_text: &str, difficulty: Difficulty, quota: usize) -> String {
    format!(
        r#"You are an expert quiz creator. Based on the following educational content, generate exactly {quota} multiple choice questions.

DIFFICULTY LEVEL: {level}
{instruction}

CONTENT:
{chunk_text}

INSTRUCTIONS:
1. Each question should have exactly 4 options (A, B, C, D)
2. Only ONE option should be correct
3. Questions should cover different aspects of the content
4. Questions should be clear and unambiguous
5. All options should be plausible
6. IMPORTANT: Keep options SHORT (1-4 words max). No full sentences as options.

OUTPUT FORMAT (JSON array only, no other text):
[
  {{
    "question": "Your question text here?",
    "options": ["Option A", "Option B", "Option C", "Option D"],
    "correct": 0
  }}
]

The "correct" field should be the index (0-3) of the correct answer.

Generate the quiz now:"#,
        quota = quota,
        level = difficulty.as_str().to_uppercase(),
        instruction = difficulty_instruction(difficulty),
        chunk_text = chunk_text,
    )
}

fn build_explanation_prompt(question: &str, user_answer: &str, correct_answer: &str) -> String {
    format!(
        "You are a helpful tutor. A student answered a quiz question incorrectly. \
         Please explain why their answer was wrong and why the correct answer is right.\n\n\
         QUESTION: {}\n\n\
         STUDENT'S ANSWER: {}\n\n\
         CORRECT ANSWER: {}\n\n\
         Provide a clear, concise explanation (2-3 sentences) that helps the student \
         understand the concept better. Be encouraging but informative.",
        question, user_answer, correct_answer
    )
}

/// The model is asked for a bare JSON array but routinely wraps it in prose.
/// Take everything from the first '[' to the last ']'.
fn extract_json_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

fn validate_question(entry: &Value) -> Option<QuizQuestion> {
    let question = entry.get("question")?.as_str()?.to_string();
    let raw_options = entry.get("options")?.as_array()?;
    if raw_options.len() != 4 {
        return None;
    }
    let mut options = Vec::with_capacity(4);
    for opt in raw_options {
        options.push(opt.as_str()?.to_string());
    }
    let correct = entry.get("correct")?.as_u64()?;
    if correct > 3 {
        return None;
    }
    Some(QuizQuestion {
        question,
        options,
        correct: correct as usize,
    })
}

/// Parse a raw model response into validated questions. An unparsable
/// response yields an empty outcome; a malformed entry is dropped on its
/// own without rejecting the rest of the chunk. Anything beyond `quota`
/// is ignored.
pub fn parse_chunk_response(raw: &str, quota: usize) -> ChunkOutcome {
    let Some(array_text) = extract_json_array(raw) else {
        tracing::warn!("no JSON array found in model response");
        return ChunkOutcome::default();
    };
    let Ok(entries) = serde_json::from_str::<Vec<Value>>(array_text) else {
        tracing::warn!("model response array failed to decode");
        return ChunkOutcome::default();
    };

    let mut outcome = ChunkOutcome::default();
    for entry in &entries {
        if outcome.accepted.len() == quota {
            break;
        }
        match validate_question(entry) {
            Some(q) => outcome.accepted.push(q),
            None => {
                tracing::debug!(%entry, "dropping malformed question entry");
                outcome.rejected += 1;
            }
        }
    }
    outcome
}

/// Ask the model for one chunk's share of questions. A transport failure
/// propagates (the service is unreachable for every later chunk too); a
/// malformed response is a per-chunk loss and returns an empty outcome.
pub async fn generate_chunk_questions<G: TextGenerator>(
    generator: &G,
    chunk_text: &str,
    difficulty: Difficulty,
    quota: usize,
) -> Result<ChunkOutcome> {
    let prompt = build_chunk_prompt(chunk_text, difficulty, quota);
    let raw = generator
        .complete(&prompt, GENERATION_TEMPERATURE, GENERATION_MAX_TOKENS)
        .await?;
    Ok(parse_chunk_response(&raw, quota))
}

/// Generate a quiz over arbitrarily long content: chunk it, spread the
/// question count across the chunks, and walk the chunks sequentially with
/// a pacing pause between consecutive calls. Chunks with a zero quota are
/// skipped without a call or a pause. The final count may fall short of
/// `num_questions` when chunks underdeliver; partial yield is accepted.
pub async fn generate_quiz<G: TextGenerator>(
    generator: &G,
    pacer: &Pacer,
    config: &Config,
    content: &str,
    difficulty: Difficulty,
    num_questions: usize,
) -> Result<QuizOutcome> {
    let chunks = chunker::chunk(content, config.chunk_budget);
    let quotas = distribute(num_questions, chunks.len());
    tracing::info!(
        chunks = chunks.len(),
        num_questions,
        difficulty = difficulty.as_str(),
        "starting chunked quiz generation"
    );

    let mut questions = Vec::with_capacity(num_questions);
    let mut rejected = 0;
    let mut called = false;

    for (i, (chunk_text, &quota)) in chunks.iter().zip(quotas.iter()).enumerate() {
        if quota == 0 {
            continue;
        }
        if called {
            pacer.pause().await;
        }
        called = true;

        let outcome = generate_chunk_questions(generator, chunk_text, difficulty, quota).await?;
        tracing::info!(
            chunk = i,
            quota,
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected,
            "chunk processed"
        );
        questions.extend(outcome.accepted);
        rejected += outcome.rejected;
    }

    Ok(QuizOutcome {
        questions,
        rejected,
    })
}

/// Explain a wrong answer. Failure degrades to an apologetic message
/// rather than an error; the explanation is a courtesy, not a contract.
pub async fn generate_explanation<G: TextGenerator>(
    generator: &G,
    question: &str,
    user_answer: &str,
    correct_answer: &str,
) -> String {
    let prompt = build_explanation_prompt(question, user_answer, correct_answer);
    match generator
        .complete(&prompt, EXPLANATION_TEMPERATURE, EXPLANATION_MAX_TOKENS)
        .await
    {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "explanation generation failed");
            format!("Unable to generate explanation: {}", e)
        }
    }
}
