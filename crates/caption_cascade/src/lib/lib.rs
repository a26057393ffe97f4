mod error;
mod llm;
pub mod normalize;
pub mod parser;
mod processor;
pub mod scanner;
pub mod sources;
pub mod tracing;
pub mod types;
pub mod video;
pub mod watch;
pub mod yt;

pub use error::{Absence, Error, SourceError, SummaryError};
pub use llm::gemini;
pub use llm::summarizer::{Summarizer, Summary};
pub use processor::{builder::TranscriptPipelineBuilder, TranscriptPipeline};
pub use video::{LanguagePair, Stage, Transcript, TranscriptResult, VideoReference};
