pub mod caption_source;
pub mod metadata_extractor;
pub mod summarizer;
