use ndarray::Array1;
use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;

pub const DEFAULT_DIMENSIONS: usize = 512;

/// Deterministic term-frequency vectors over hashed buckets.
///
/// Terms are lower-cased unicode words of two or more characters; each term
/// lands in an FNV-1a bucket and vectors are L2-normalized, so a dot product
/// is the cosine similarity.
#[derive(Debug, Clone, Copy)]
pub struct HashedTermEmbedder {
    dimensions: usize,
}

impl Default for HashedTermEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl HashedTermEmbedder {
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    #[must_use]
    pub const fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[must_use]
    pub fn embed(&self, text: &str) -> Array1<f32> {
        let mut tf: HashMap<String, f32> = HashMap::new();
        for term in tokenize(text) {
            *tf.entry(term).or_default() += 1.0;
        }

        let mut vector = Array1::<f32>::zeros(self.dimensions);
        for (term, count) in &tf {
            // Longer terms carry more signal than short function words.
            let weight = 1.0 + (term.chars().count() as f32).ln();
            vector[bucket(term, self.dimensions)] += count * weight;
        }

        let norm = vector.dot(&vector).sqrt();
        if norm > f32::EPSILON {
            vector /= norm;
        }
        vector
    }
}

/// Cosine similarity of two normalized vectors; zero on a dimension mismatch.
#[must_use]
pub fn cosine(a: &Array1<f32>, b: &Array1<f32>) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.dot(b).clamp(-1.0, 1.0)
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.unicode_words()
        .filter(|word| word.chars().count() >= 2)
        .map(str::to_lowercase)
}

fn bucket(term: &str, dimensions: usize) -> usize {
    const OFFSET: u64 = 14_695_981_039_346_656_037;
    const PRIME: u64 = 1_099_511_628_211;
    let mut hash = OFFSET;
    for b in term.as_bytes() {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(PRIME);
    }
    (hash % dimensions as u64) as usize
}
