mod config;
mod error;
mod models;
mod services;

use std::sync::Arc;

use axum::{
    Router,
    extract::{Multipart, State},
    response::Json,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

use config::Config;
use error::ApiError;
use models::{
    Difficulty, ExplanationRequest, ExplanationResponse, QuizRequest, QuizResponse, UploadResponse,
};
use services::chapterizer;
use services::llm::LlmClient;
use services::quiz::{self, Pacer};

#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    llm_client: Arc<LlmClient>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr.clone();

    // Built once at startup and shared across requests. Missing credentials
    // abort here instead of failing every generation call later.
    let llm_client = Arc::new(LlmClient::from_env()?);

    let app_state = AppState {
        config: Arc::new(config),
        llm_client,
    };

    let app = Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/upload", post(upload_document))
        .route("/api/quiz/generate", post(create_quiz))
        .route("/api/quiz/explain", post(explain_answer))
        .with_state(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::AllowMethods::any())
                .allow_headers(tower_http::cors::AllowHeaders::any()),
        )
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "StudyQuiz API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health_check() -> &'static str {
    "OK"
}

/// Upload a plain-text study document. Binary formats are converted to text
/// upstream; this endpoint takes the extracted text, segments it into
/// chapters, and returns them with a short preview.
async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Upload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.txt").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Upload(e.to_string()))?;
        let text = decode_text(&data)?;

        tracing::info!(%filename, total_chars = text.len(), "document uploaded");
        let chapters = chapterizer::segment(&text, &[], &state.config);

        return Ok(Json(UploadResponse {
            filename,
            total_chars: text.len(),
            chapters,
            full_text: preview(&text, 1000),
        }));
    }

    Err(ApiError::Upload(
        "multipart form must contain a 'file' field".to_string(),
    ))
}

async fn create_quiz(
    State(state): State<AppState>,
    Json(request): Json<QuizRequest>,
) -> Result<Json<QuizResponse>, ApiError> {
    let difficulty = validate_request(&request, &state.config)?;

    let request_id = Uuid::new_v4();
    tracing::info!(
        %request_id,
        content_len = request.content.len(),
        difficulty = difficulty.as_str(),
        num_questions = request.num_questions,
        "quiz generation request"
    );
    if let Some(chapters) = &request.chapters {
        tracing::debug!(%request_id, ?chapters, "chapter filter supplied by client");
    }

    let pacer = Pacer::new(state.config.pacing_delay);
    let outcome = quiz::generate_quiz(
        state.llm_client.as_ref(),
        &pacer,
        &state.config,
        &request.content,
        difficulty,
        request.num_questions,
    )
    .await
    .map_err(|e| ApiError::Generation(e.to_string()))?;

    if outcome.rejected > 0 {
        tracing::warn!(%request_id, rejected = outcome.rejected, "dropped malformed question entries");
    }
    tracing::info!(%request_id, generated = outcome.questions.len(), "quiz generation finished");

    let num_questions = outcome.questions.len();
    Ok(Json(QuizResponse {
        questions: outcome.questions,
        difficulty: difficulty.as_str().to_string(),
        num_questions,
    }))
}

async fn explain_answer(
    State(state): State<AppState>,
    Json(request): Json<ExplanationRequest>,
) -> Json<ExplanationResponse> {
    let explanation = quiz::generate_explanation(
        state.llm_client.as_ref(),
        &request.question,
        &request.user_answer,
        &request.correct_answer,
    )
    .await;

    Json(ExplanationResponse {
        question: request.question,
        user_answer: request.user_answer,
        correct_answer: request.correct_answer,
        explanation,
    })
}

/// Reject bad input before any chunking or model traffic happens.
fn validate_request(request: &QuizRequest, config: &Config) -> Result<Difficulty, ApiError> {
    if request.content.len() < config.min_content_len {
        return Err(ApiError::InvalidInput(format!(
            "Content must be at least {} characters long.",
            config.min_content_len
        )));
    }
    if request.num_questions < 1 || request.num_questions > config.max_questions {
        return Err(ApiError::InvalidInput(format!(
            "Number of questions must be between 1 and {}.",
            config.max_questions
        )));
    }
    Difficulty::parse(&request.difficulty)
}

fn decode_text(data: &[u8]) -> Result<String, ApiError> {
    // Strip the UTF-8 BOM some editors prepend.
    let bytes = if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &data[3..]
    } else {
        data
    };
    String::from_utf8(bytes.to_vec())
        .map_err(|_| ApiError::Upload("file is not valid UTF-8 text".to_string()))
}

fn preview(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut p: String = text.chars().take(limit).collect();
    p.push_str("...");
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(content: &str, difficulty: &str, num_questions: usize) -> QuizRequest {
        QuizRequest {
            content: content.to_string(),
            difficulty: difficulty.to_string(),
            num_questions,
            chapters: None,
        }
    }

    #[test]
    fn validation_rejects_short_content() {
        let req = request(&"x".repeat(99), "medium", 10);
        let err = validate_request(&req, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("at least 100 characters"));
    }

    #[test]
    fn validation_rejects_out_of_range_counts() {
        let content = "c".repeat(200);
        for bad in [0, 51] {
            let req = request(&content, "medium", bad);
            let err = validate_request(&req, &Config::default()).unwrap_err();
            assert!(err.to_string().contains("between 1 and 50"));
        }
    }

    #[test]
    fn validation_rejects_unknown_difficulty() {
        let req = request(&"c".repeat(200), "extreme", 10);
        assert!(validate_request(&req, &Config::default()).is_err());
    }

    #[test]
    fn validation_accepts_boundary_values() {
        let content = "c".repeat(100);
        assert_eq!(
            validate_request(&request(&content, "hard", 50), &Config::default()).unwrap(),
            Difficulty::Hard
        );
        assert_eq!(
            validate_request(&request(&content, "easy", 1), &Config::default()).unwrap(),
            Difficulty::Easy
        );
    }

    #[test]
    fn decode_text_strips_utf8_bom() {
        let mut data = vec![0xEF, 0xBB, 0xBF];
        data.extend_from_slice("hello".as_bytes());
        assert_eq!(decode_text(&data).unwrap(), "hello");
    }

    #[test]
    fn preview_truncates_long_text() {
        let text = "a".repeat(1500);
        let p = preview(&text, 1000);
        assert_eq!(p.len(), 1003);
        assert!(p.ends_with("..."));

        assert_eq!(preview("short", 1000), "short");
    }
}
