use super::EmbeddingProvider;
use crate::error::Result;
use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};

/// Fixed keys so vectors are stable across processes and Rust versions.
/// Changing them changes every embedding: re-index both collections.
const HASH_SEED_K0: u64 = 0x6d61_7463_6864_6230;
const HASH_SEED_K1: u64 = 0x0f1e_2d3c_4b5a_6978;

const WORD_WEIGHT: f64 = 1.0;
const BIGRAM_WEIGHT: f64 = 0.5;

/// Feature-hashing embedder.
///
/// - No model files, no training
/// - Lower-cased word tokens plus adjacent-word bigrams
/// - Signed buckets (SipHash-1-3) to reduce collision bias
/// - L2-normalized output; empty text gives the zero vector
///
/// Texts sharing vocabulary land close together, which is enough for
/// operating the store without an inference runtime and for tests.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash(&self, token: &str, salt: u8) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        salt.hash(&mut hasher);
        token.hash(&mut hasher);
        hasher.finish()
    }

    fn add(&self, vector: &mut [f64], token: &str, weight: f64) {
        let idx = (self.hash(token, 0) % self.dimension as u64) as usize;
        let sign = if self.hash(token, 1) & 1 == 0 { 1.0 } else { -1.0 };
        vector[idx] += sign * weight;
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl EmbeddingProvider for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f64>> {
        let tokens = tokenize(text);
        let mut vector = vec![0.0f64; self.dimension];

        for token in &tokens {
            self.add(&mut vector, token, WORD_WEIGHT);
        }
        for pair in tokens.windows(2) {
            self.add(&mut vector, &format!("{} {}", pair[0], pair[1]), BIGRAM_WEIGHT);
        }

        let norm = crate::search::similarity::l2_norm(&vector);
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::cosine_similarity;

    #[test]
    fn test_deterministic_and_normalized() {
        let e = HashEmbedder::new(64);
        let a = e.embed("Skills: Rust, SQL").unwrap();
        let b = e.embed("Skills: Rust, SQL").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let norm = crate::search::similarity::l2_norm(&a);
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let e = HashEmbedder::new(16);
        assert!(e.embed("").unwrap().iter().all(|x| *x == 0.0));
        assert!(e.embed(" | , ").unwrap().iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_case_insensitive_tokens() {
        let e = HashEmbedder::new(128);
        assert_eq!(e.embed("PYTHON Django").unwrap(), e.embed("python django").unwrap());
    }

    #[test]
    fn test_shared_vocabulary_scores_higher() {
        let e = HashEmbedder::new(256);
        let job = e
            .embed("Job Title: Backend Engineer | Required Skills: rust, postgres, kafka")
            .unwrap();
        let close = e
            .embed("Skills: rust, postgres, kafka | Backend Engineer at Initech")
            .unwrap();
        let far = e
            .embed("Skills: watercolor, calligraphy | Illustrator at Studio")
            .unwrap();
        assert!(cosine_similarity(&job, &close) > cosine_similarity(&job, &far));
    }

    #[test]
    fn test_tokenizer_keeps_language_names() {
        assert_eq!(tokenize("C++, C# and Go!"), vec!["c++", "c#", "and", "go"]);
    }
}
