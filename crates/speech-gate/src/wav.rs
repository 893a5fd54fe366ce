//! Minimal WAV wrapping for raw PCM16 TTS responses.

pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;
const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// Parse a `rate=` parameter out of a mime type such as
/// `audio/L16;rate=24000`. Falls back to
/// [`DEFAULT_SAMPLE_RATE`] when the parameter is absent or malformed.
pub fn parse_sample_rate_from_mime(mime: &str) -> u32 {
    mime.split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("rate="))
        .and_then(|rate| rate.parse::<u32>().ok())
        .unwrap_or(DEFAULT_SAMPLE_RATE)
}

/// True when a mime string names raw PCM rather than a self-describing
/// container such as `audio/wav`.
pub fn is_raw_pcm(mime: &str) -> bool {
    let head = mime.split(';').next().unwrap_or(mime).trim();
    head.eq_ignore_ascii_case("audio/l16") || head.eq_ignore_ascii_case("audio/pcm")
}

/// Wrap raw little-endian PCM16 samples in a minimal RIFF/WAVE header.
pub fn wrap_pcm16_as_wav(pcm: &[u8], sample_rate: u32) -> Vec<u8> {
    let byte_rate = sample_rate * CHANNELS as u32 * (BITS_PER_SAMPLE as u32 / 8);
    let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);
    let data_len = pcm.len() as u32;
    let riff_len = 36 + data_len;

    let mut out = Vec::with_capacity(44 + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_len.to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(pcm);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rate_parameter() {
        assert_eq!(parse_sample_rate_from_mime("audio/L16;rate=16000"), 16_000);
    }

    #[test]
    fn falls_back_to_default_without_rate() {
        assert_eq!(parse_sample_rate_from_mime("audio/wav"), DEFAULT_SAMPLE_RATE);
    }

    #[test]
    fn identifies_raw_pcm_mimes() {
        assert!(is_raw_pcm("audio/L16;rate=24000"));
        assert!(!is_raw_pcm("audio/wav"));
    }

    #[test]
    fn wraps_pcm_with_correct_header_lengths() {
        let pcm = vec![0u8; 100];
        let wav = wrap_pcm16_as_wav(&pcm, 24_000);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + 100);
        let data_len = u32::from_le_bytes(wav[40..44].try_into().unwrap());
        assert_eq!(data_len, 100);
    }
}
