//! Text-to-speech provider boundary, the TTS-upstream sibling of the
//! LLM provider boundary. The real candidate-model request/response
//! dance against the TTS endpoint is an external-provider concern and
//! is not implemented here; [`NullTtsSynthesizer`] lets the speech gate
//! degrade to "no audio" on a synthesis failure.

use async_trait::async_trait;
use thiserror::Error;

use wayfarer_core_types::VoiceConfig;

#[derive(Clone, Debug, Error)]
pub enum TtsError {
    #[error("no candidate model returned audio")]
    NoAudio,
    #[error("tts request failed: {0}")]
    Request(String),
}

/// One synthesised response. If audio arrives as raw PCM16 rather than
/// WAV, the gate wraps it.
#[derive(Clone, Debug)]
pub struct SynthesizedAudio {
    pub mime: String,
    pub audio_base64: String,
}

/// A TTS upstream honouring the persona voice config. The real provider
/// and a deterministic mock both satisfy this.
#[async_trait]
pub trait TtsSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &VoiceConfig) -> Result<SynthesizedAudio, TtsError>;
}

/// No-op synthesizer: always reports no audio, so the loop continues
/// silently after a warning thought whenever no real provider is
/// configured.
#[derive(Debug, Default, Clone)]
pub struct NullTtsSynthesizer;

#[async_trait]
impl TtsSynthesizer for NullTtsSynthesizer {
    async fn synthesize(&self, _text: &str, _voice: &VoiceConfig) -> Result<SynthesizedAudio, TtsError> {
        Err(TtsError::NoAudio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_synthesizer_always_reports_no_audio() {
        let synth = NullTtsSynthesizer;
        let voice = VoiceConfig::default();
        let err = synth.synthesize("hello", &voice).await.unwrap_err();
        assert!(matches!(err, TtsError::NoAudio));
    }
}
