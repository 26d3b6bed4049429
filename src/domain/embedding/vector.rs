//! Vector math for similarity matching and persistence

use crate::domain::DomainError;

/// Calculate cosine similarity between two vectors.
///
/// Vectors of mismatched length score 0.0 rather than erroring: entries
/// embedded under an older model are incomparable, not invalid.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Encode a vector as little-endian f32 bytes for blob storage
pub fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);

    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }

    bytes
}

/// Decode little-endian f32 bytes back into a vector
pub fn decode_embedding(bytes: &[u8]) -> Result<Vec<f32>, DomainError> {
    if bytes.len() % 4 != 0 {
        return Err(DomainError::cache(format!(
            "Corrupt embedding blob: {} bytes is not a multiple of 4",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
