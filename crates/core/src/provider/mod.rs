//! Embedding providers: composed text in, fixed-dimension vector out.
//!
//! The dimension reported by a provider is fixed for its lifetime and must
//! equal the store's dimension. Every vector a provider returns is checked
//! against it before use; a mismatch is a configuration error, never
//! something to pad or truncate around.

/// Deterministic feature-hashing provider.
pub mod hash;

pub use hash::HashEmbedder;

use crate::error::{Error, Result};

/// Maps text to a vector of [`dimension`](EmbeddingProvider::dimension) floats.
///
/// Implementations may block (model inference); async hosts should call
/// them from a blocking-capable context.
pub trait EmbeddingProvider: Send + Sync {
    /// Implementation name, used in logs and errors.
    fn name(&self) -> &str;

    fn dimension(&self) -> usize;

    /// Embed one text. Failures should be reported as
    /// [`Error::ProviderUnavailable`].
    fn embed(&self, text: &str) -> Result<Vec<f64>>;

    /// Embed several texts (default implementation: loop).
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f64>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Embed `text` and verify the result has `expected` components.
pub fn embed_checked(
    provider: &dyn EmbeddingProvider,
    expected: usize,
    text: &str,
    context: &str,
) -> Result<Vec<f64>> {
    let vector = provider.embed(text)?;
    if vector.len() != expected {
        tracing::error!(
            provider = provider.name(),
            context,
            expected,
            actual = vector.len(),
            "provider returned a vector of the wrong dimension"
        );
        return Err(Error::DimensionMismatch {
            context: format!("provider '{}' for {context}", provider.name()),
            expected,
            actual: vector.len(),
        });
    }
    Ok(vector)
}
