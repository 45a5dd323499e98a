pub mod chapterizer;
pub mod chunker;
pub mod llm;
pub mod quiz;
