pub mod gate;
pub mod wav;

pub use gate::{await_outcome, watchdog_for, SpeechGate, SpeechOutcome, WATCHDOG_CEILING, WATCHDOG_FLOOR};
pub use wav::{is_raw_pcm, parse_sample_rate_from_mime, wrap_pcm16_as_wav, DEFAULT_SAMPLE_RATE};

pub use wayfarer_core_types::SpeechRequest;
