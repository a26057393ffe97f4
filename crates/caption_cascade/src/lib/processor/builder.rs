use crate::{sources::CaptionSource, video::LanguagePair, TranscriptPipeline};

pub struct TranscriptPipelineBuilder<P = (), T = (), A = (), B = ()> {
    languages: LanguagePair,
    primary: P,
    transcript_service: T,
    mirrors_a: A,
    mirrors_b: B,
}

impl Default for TranscriptPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptPipelineBuilder {
    pub fn new() -> Self {
        Self {
            languages: LanguagePair::default(),
            primary: (),
            transcript_service: (),
            mirrors_a: (),
            mirrors_b: (),
        }
    }
}

impl<P, T, A, B> TranscriptPipelineBuilder<P, T, A, B> {
    pub fn primary<P2: CaptionSource + Send + Sync>(
        self,
        primary: P2,
    ) -> TranscriptPipelineBuilder<P2, T, A, B> {
        TranscriptPipelineBuilder {
            languages: self.languages,
            primary,
            transcript_service: self.transcript_service,
            mirrors_a: self.mirrors_a,
            mirrors_b: self.mirrors_b,
        }
    }

    pub fn transcript_service<T2: CaptionSource + Send + Sync>(
        self,
        transcript_service: T2,
    ) -> TranscriptPipelineBuilder<P, T2, A, B> {
        TranscriptPipelineBuilder {
            languages: self.languages,
            primary: self.primary,
            transcript_service,
            mirrors_a: self.mirrors_a,
            mirrors_b: self.mirrors_b,
        }
    }

    /// First mirror pool (captions-listing mirrors)
    pub fn mirrors_a<A2: CaptionSource + Send + Sync>(
        self,
        mirrors_a: A2,
    ) -> TranscriptPipelineBuilder<P, T, A2, B> {
        TranscriptPipelineBuilder {
            languages: self.languages,
            primary: self.primary,
            transcript_service: self.transcript_service,
            mirrors_a,
            mirrors_b: self.mirrors_b,
        }
    }

    /// Second mirror pool (stream-info mirrors), the last resort
    pub fn mirrors_b<B2: CaptionSource + Send + Sync>(
        self,
        mirrors_b: B2,
    ) -> TranscriptPipelineBuilder<P, T, A, B2> {
        TranscriptPipelineBuilder {
            languages: self.languages,
            primary: self.primary,
            transcript_service: self.transcript_service,
            mirrors_a: self.mirrors_a,
            mirrors_b,
        }
    }

    pub fn languages(mut self, languages: LanguagePair) -> Self {
        self.languages = languages;
        self
    }
}

impl<P, T, A, B> TranscriptPipelineBuilder<P, T, A, B>
where
    P: CaptionSource + Send + Sync,
    T: CaptionSource + Send + Sync,
    A: CaptionSource + Send + Sync,
    B: CaptionSource + Send + Sync,
{
    pub fn build(self) -> TranscriptPipeline<P, T, A, B> {
        TranscriptPipeline {
            languages: self.languages,
            primary: self.primary,
            transcript_service: self.transcript_service,
            mirrors_a: self.mirrors_a,
            mirrors_b: self.mirrors_b,
        }
    }
}
