//! Content digests appended to the signing bytes of writes

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::wire::DataPair;
use crate::Result;

const MURMUR3_SEED: u32 = 1234;
const SAMPLE_BYTES: usize = 64;
const SAMPLE_EVERY: usize = 128;

/// How a multi-put binds its signature to the batch content
///
/// Only `Md5KeysValues` covers every byte of the batch. The others hash
/// less, or hash faster, for batches where a full MD5 is too slow; the
/// service must be configured to expect the same strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestStrategy {
    /// MD5 over every key and value, in order
    #[default]
    Md5KeysValues,
    /// MD5 over every value
    Md5Values,
    /// MD5 over the first 64 bytes of every 128th value
    Md5Abbreviated,
    /// Murmur3-32 (seed 1234) over every key and value
    Murmur3,
    /// Murmur3-32 (seed 1234) over each key and a 64-byte window of its
    /// value, starting at `index % value_len`
    Murmur3Sliding,
}

/// `MD5(key || value)`, the extra signing bytes of a single put
pub fn put_digest(key: &str, value: &[u8]) -> Vec<u8> {
    let mut hasher = Md5::new();
    hasher.update(key.as_bytes());
    hasher.update(value);
    hasher.finalize().to_vec()
}

/// Extra signing bytes of a multi-put batch
///
/// MD5 strategies yield 16 bytes, Murmur3 strategies the 4-byte big-endian sum.
pub fn multi_put_digest(pairs: &[DataPair], strategy: DigestStrategy) -> Result<Vec<u8>> {
    let digest = match strategy {
        DigestStrategy::Md5KeysValues => {
            let mut hasher = Md5::new();
            for pair in pairs {
                hasher.update(pair.key.as_bytes());
                hasher.update(&pair.value);
            }
            hasher.finalize().to_vec()
        }
        DigestStrategy::Md5Values => {
            let mut hasher = Md5::new();
            for pair in pairs {
                hasher.update(&pair.value);
            }
            hasher.finalize().to_vec()
        }
        DigestStrategy::Md5Abbreviated => {
            let mut hasher = Md5::new();
            for pair in pairs.iter().step_by(SAMPLE_EVERY) {
                let end = pair.value.len().min(SAMPLE_BYTES);
                hasher.update(&pair.value[..end]);
            }
            hasher.finalize().to_vec()
        }
        DigestStrategy::Murmur3 => {
            let mut content = Vec::new();
            for pair in pairs {
                content.extend_from_slice(pair.key.as_bytes());
                content.extend_from_slice(&pair.value);
            }
            murmur3_sum32(&content)?
        }
        DigestStrategy::Murmur3Sliding => {
            let mut content = Vec::new();
            for (i, pair) in pairs.iter().enumerate() {
                content.extend_from_slice(pair.key.as_bytes());
                content.extend_from_slice(sliding_window(i, &pair.value));
            }
            murmur3_sum32(&content)?
        }
    };
    Ok(digest)
}

fn murmur3_sum32(content: &[u8]) -> Result<Vec<u8>> {
    let hash = murmur3::murmur3_32(&mut &content[..], MURMUR3_SEED)?;
    Ok(hash.to_be_bytes().to_vec())
}

fn sliding_window(index: usize, value: &[u8]) -> &[u8] {
    if value.is_empty() {
        return value;
    }
    let start = index % value.len();
    let end = (start + SAMPLE_BYTES).min(value.len());
    &value[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(n: usize, value_len: usize) -> Vec<DataPair> {
        (0..n)
            .map(|i| DataPair::new(format!("key-{}", i), vec![(i % 251) as u8; value_len]))
            .collect()
    }

    #[test]
    fn test_put_digest_is_md5_of_key_and_value() {
        assert_eq!(
            hex::encode(put_digest("", b"")),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(put_digest("ab", b"c"), put_digest("a", b"bc"));
        assert_eq!(put_digest("k", b"v").len(), 16);
    }

    #[test]
    fn test_default_matches_concatenated_md5() {
        let pairs = vec![DataPair::new("a", b"1".to_vec()), DataPair::new("b", b"2".to_vec())];
        assert_eq!(
            multi_put_digest(&pairs, DigestStrategy::default()).unwrap(),
            put_digest("a1b", b"2")
        );
    }

    #[test]
    fn test_values_only_ignores_keys() {
        let a = vec![DataPair::new("x", b"v".to_vec())];
        let b = vec![DataPair::new("y", b"v".to_vec())];
        assert_eq!(
            multi_put_digest(&a, DigestStrategy::Md5Values).unwrap(),
            multi_put_digest(&b, DigestStrategy::Md5Values).unwrap()
        );
        assert_ne!(
            multi_put_digest(&a, DigestStrategy::Md5KeysValues).unwrap(),
            multi_put_digest(&b, DigestStrategy::Md5KeysValues).unwrap()
        );
    }

    #[test]
    fn test_abbreviated_samples_every_128th() {
        let mut pairs = batch(300, 100);
        let base = multi_put_digest(&pairs, DigestStrategy::Md5Abbreviated).unwrap();

        // Item 1 is never sampled
        pairs[1].value = vec![9; 10];
        assert_eq!(base, multi_put_digest(&pairs, DigestStrategy::Md5Abbreviated).unwrap());

        // Bytes past the 64-byte prefix of a sampled item are ignored
        pairs[128].value[80] ^= 0xff;
        assert_eq!(base, multi_put_digest(&pairs, DigestStrategy::Md5Abbreviated).unwrap());

        pairs[256].value[0] ^= 0xff;
        assert_ne!(base, multi_put_digest(&pairs, DigestStrategy::Md5Abbreviated).unwrap());
    }

    #[test]
    fn test_murmur3_is_seeded_sum32_of_concatenation() {
        let pairs = vec![
            DataPair::new("Hello", b", ".to_vec()),
            DataPair::new("world", b"!".to_vec()),
        ];
        let expected = murmur3::murmur3_32(&mut &b"Hello, world!"[..], 1234).unwrap();
        assert_eq!(
            multi_put_digest(&pairs, DigestStrategy::Murmur3).unwrap(),
            expected.to_be_bytes().to_vec()
        );

        let unseeded = murmur3::murmur3_32(&mut &b"Hello, world!"[..], 0).unwrap();
        assert_ne!(expected, unseeded);
    }

    #[test]
    fn test_murmur3_variants() {
        let pairs = batch(10, 200);
        let full = multi_put_digest(&pairs, DigestStrategy::Murmur3).unwrap();
        let sliding = multi_put_digest(&pairs, DigestStrategy::Murmur3Sliding).unwrap();
        assert_eq!(full.len(), 4);
        assert_eq!(sliding.len(), 4);
        assert_ne!(full, sliding);

        let mut changed = pairs.clone();
        changed[3].value[150] ^= 0xff;
        assert_ne!(full, multi_put_digest(&changed, DigestStrategy::Murmur3).unwrap());
        // Outside item 3's window [3, 67)
        assert_eq!(
            sliding,
            multi_put_digest(&changed, DigestStrategy::Murmur3Sliding).unwrap()
        );
    }

    #[test]
    fn test_murmur3_sliding_hashes_windows() {
        let pairs = vec![
            DataPair::new("a", vec![7u8; 100]),
            DataPair::new("b", b"xyz".to_vec()),
            DataPair::new("c", Vec::new()),
        ];
        let mut windows = b"a".to_vec();
        windows.extend_from_slice(&[7u8; 64]);
        windows.extend_from_slice(b"byz");
        windows.extend_from_slice(b"c");
        let expected = murmur3::murmur3_32(&mut &windows[..], 1234).unwrap();
        assert_eq!(
            multi_put_digest(&pairs, DigestStrategy::Murmur3Sliding).unwrap(),
            expected.to_be_bytes().to_vec()
        );
    }

    #[test]
    fn test_sliding_window_bounds() {
        assert_eq!(sliding_window(5, b""), b"");
        assert_eq!(sliding_window(5, b"abc"), b"c");
        assert_eq!(sliding_window(0, &[1u8; 100]).len(), 64);
        assert_eq!(sliding_window(90, &[1u8; 100]).len(), 10);
    }

    #[test]
    fn test_strategy_config_names() {
        let json = serde_json::to_string(&DigestStrategy::Murmur3Sliding).unwrap();
        assert_eq!(json, "\"murmur3_sliding\"");
        let parsed: DigestStrategy = serde_json::from_str("\"md5_abbreviated\"").unwrap();
        assert_eq!(parsed, DigestStrategy::Md5Abbreviated);
    }
}
