//! PCM sample format conversion
//!
//! The remote model streams 16-bit little-endian interleaved PCM. These
//! helpers convert between that wire layout and the f32 samples the output
//! graph mixes.

/// Decode little-endian 16-bit PCM bytes into f32 samples
///
/// Returns None if the byte length is odd.
///
/// # Example
/// ```
/// use promptdj_core::audio::format::pcm16le_to_f32;
///
/// let samples = pcm16le_to_f32(&[0x00, 0x40, 0x00, 0xC0]).unwrap();
/// assert_eq!(samples, vec![0.5, -0.5]);
///
/// assert!(pcm16le_to_f32(&[0x00]).is_none());
/// ```
pub fn pcm16le_to_f32(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
            .collect(),
    )
}

/// Encode f32 samples as little-endian 16-bit PCM bytes
///
/// Samples outside -1.0..=1.0 are clamped. Positive values scale by 32767 and
/// negative ones by 32768, so both ends of the i16 range are reachable.
pub fn f32_to_pcm16le(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|&s| {
            let clamped = s.clamp(-1.0, 1.0);
            let scaled = if clamped >= 0.0 {
                clamped * 32767.0
            } else {
                clamped * 32768.0
            };
            (scaled as i16).to_le_bytes()
        })
        .collect()
}
