//! 16-bit little-endian mono PCM

/// Clamp to [-1, 1] and scale to `i16`, truncating toward zero
#[inline]
pub fn sample_to_i16(sample: f64) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f64) as i16
}

/// Encode samples as 16-bit little-endian byte pairs
pub fn encode_pcm16_le(samples: &[f64]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|&s| sample_to_i16(s).to_le_bytes())
        .collect()
}

/// Decode 16-bit little-endian byte pairs; a trailing odd byte is ignored
pub fn decode_pcm16_le(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f64 / 32768.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_to_i16() {
        assert_eq!(sample_to_i16(0.0), 0);
        assert_eq!(sample_to_i16(1.0), 32767);
        assert_eq!(sample_to_i16(-1.0), -32767);
        assert_eq!(sample_to_i16(2.5), 32767);
        assert_eq!(sample_to_i16(-7.0), -32767);
        assert_eq!(sample_to_i16(0.5), 16383);
    }

    #[test]
    fn test_encode_byte_order() {
        assert_eq!(encode_pcm16_le(&[1.0, -1.0]), vec![0xFF, 0x7F, 0x01, 0x80]);
        assert!(encode_pcm16_le(&[]).is_empty());
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode_pcm16_le(&[0x00, 0x40, 0x00, 0xC0]), vec![0.5, -0.5]);
        assert_eq!(decode_pcm16_le(&[0x00, 0x40, 0x12]), vec![0.5]);
    }
}
