use app_state::EMBEDDING_DIM;
use serde_json::Value;

/// Parses a stored prototype embedding. Accepts a JSON array of numbers or
/// a JSON string containing one (the legacy profile format). Returns `None`
/// for anything malformed, wrong-dimensional, or non-finite.
#[must_use]
pub fn parse_prototype(raw: &Value) -> Option<Vec<f32>> {
    let parsed: Vec<f32> = match raw {
        Value::Array(_) => serde_json::from_value(raw.clone()).ok()?,
        Value::String(inner) => serde_json::from_str(inner).ok()?,
        _ => return None,
    };
    validate_embedding(&parsed).then_some(parsed)
}

#[must_use]
pub fn validate_embedding(embedding: &[f32]) -> bool {
    embedding.len() == EMBEDDING_DIM && embedding.iter().all(|value| value.is_finite())
}

/// Normalizes a vector to unit length in place. A zero vector is left
/// effectively unchanged by dividing by a tiny epsilon instead of zero.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
    let norm = if norm == 0.0 { 1e-10 } else { norm };
    for value in vector.iter_mut() {
        *value /= norm;
    }
}

/// Mean of the given embeddings, re-normalized to unit length. This is how
/// tier 1 matches collapse into a search prototype.
#[must_use]
pub fn mean_prototype(embeddings: &[Vec<f32>]) -> Option<Vec<f32>> {
    let first = embeddings.first()?;
    let mut mean = vec![0.0f32; first.len()];
    for embedding in embeddings {
        for (accumulator, value) in mean.iter_mut().zip(embedding.iter()) {
            *accumulator += value;
        }
    }
    let count = embeddings.len() as f32;
    for value in &mut mean {
        *value /= count;
    }
    l2_normalize(&mut mean);
    Some(mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unit_vector(dim: usize) -> Vec<f32> {
        let mut vector = vec![0.0f32; dim];
        vector[0] = 1.0;
        vector
    }

    #[test]
    fn parses_json_array_prototype() {
        let raw = serde_json::to_value(unit_vector(EMBEDDING_DIM)).expect("serializable");
        let parsed = parse_prototype(&raw).expect("valid prototype");
        assert_eq!(parsed.len(), EMBEDDING_DIM);
        assert!((parsed[0] - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn parses_stringified_prototype() {
        let inner = serde_json::to_string(&unit_vector(EMBEDDING_DIM)).expect("serializable");
        let parsed = parse_prototype(&json!(inner)).expect("valid prototype");
        assert_eq!(parsed.len(), EMBEDDING_DIM);
    }

    #[test]
    fn rejects_non_vector_values() {
        assert!(parse_prototype(&json!(42)).is_none());
        assert!(parse_prototype(&json!({"embedding": [1.0]})).is_none());
        assert!(parse_prototype(&json!("not json")).is_none());
        assert!(parse_prototype(&Value::Null).is_none());
    }

    #[test]
    fn rejects_wrong_dimension() {
        let raw = serde_json::to_value(unit_vector(128)).expect("serializable");
        assert!(parse_prototype(&raw).is_none());
    }

    #[test]
    fn rejects_non_finite_components() {
        let mut vector = unit_vector(EMBEDDING_DIM);
        vector[5] = f32::NAN;
        assert!(!validate_embedding(&vector));
        vector[5] = f32::INFINITY;
        assert!(!validate_embedding(&vector));
    }

    #[test]
    fn normalize_produces_unit_length() {
        let mut vector = vec![3.0, 4.0];
        l2_normalize(&mut vector);
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_survives_zero_vector() {
        let mut vector = vec![0.0, 0.0, 0.0];
        l2_normalize(&mut vector);
        assert!(vector.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn mean_prototype_averages_and_normalizes() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        let mean = mean_prototype(&[a, b]).expect("non-empty");
        assert!((mean[0] - mean[1]).abs() < 1e-6);
        let norm: f32 = mean.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mean_prototype_of_nothing_is_none() {
        assert!(mean_prototype(&[]).is_none());
    }
}
