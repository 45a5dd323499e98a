use std::time::Duration;

/// Tunables for segmentation and quiz generation. Read once at startup from
/// the environment; every knob falls back to the documented default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum characters handed to the model in one generation call.
    pub chunk_budget: usize,
    /// Minimum interval between consecutive generation calls.
    pub pacing_delay: Duration,
    /// Upper bound on questions per request.
    pub max_questions: usize,
    /// Content shorter than this is rejected before any processing.
    pub min_content_len: usize,
    /// Headings whose offsets fall in the same window of this many
    /// characters are treated as duplicates of one physical line.
    pub dedup_window: usize,
    /// Pages grouped per fallback section.
    pub pages_per_section: usize,
    /// Cap on fallback sections; the last section absorbs the remainder.
    pub max_sections: usize,
    /// Optional cap on heading title length. Unset by default; integrations
    /// that want to reject implausibly long headings opt in explicitly.
    pub max_heading_len: Option<usize>,
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            chunk_budget: 15_000,
            pacing_delay: Duration::from_secs(2),
            max_questions: 50,
            min_content_len: 100,
            dedup_window: 50,
            pages_per_section: 3,
            max_sections: 10,
            max_heading_len: None,
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            chunk_budget: env_usize("QUIZ_CHUNK_BUDGET", defaults.chunk_budget),
            pacing_delay: Duration::from_secs(env_u64(
                "QUIZ_PACING_DELAY_SECS",
                defaults.pacing_delay.as_secs(),
            )),
            max_questions: env_usize("QUIZ_MAX_QUESTIONS", defaults.max_questions),
            min_content_len: env_usize("QUIZ_MIN_CONTENT_LEN", defaults.min_content_len),
            dedup_window: env_usize("CHAPTER_DEDUP_WINDOW", defaults.dedup_window),
            pages_per_section: env_usize("CHAPTER_PAGES_PER_SECTION", defaults.pages_per_section),
            max_sections: env_usize("CHAPTER_MAX_SECTIONS", defaults.max_sections),
            max_heading_len: std::env::var("CHAPTER_MAX_HEADING_LEN")
                .ok()
                .and_then(|v| v.parse().ok()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.chunk_budget, 15_000);
        assert_eq!(cfg.pacing_delay, Duration::from_secs(2));
        assert_eq!(cfg.max_questions, 50);
        assert_eq!(cfg.min_content_len, 100);
        assert_eq!(cfg.dedup_window, 50);
        assert_eq!(cfg.pages_per_section, 3);
        assert_eq!(cfg.max_sections, 10);
        assert!(cfg.max_heading_len.is_none());
    }
}
