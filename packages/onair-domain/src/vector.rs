pub fn l2_norm(vec: &[f32]) -> f32 {
	vec.iter().map(|value| value * value).sum::<f32>().sqrt()
}

/// Scales the vector to unit L2 norm. Zero vectors are left untouched.
pub fn l2_normalize(vec: &mut [f32]) {
	let norm = l2_norm(vec);

	if norm <= f32::EPSILON {
		return;
	}

	for value in vec.iter_mut() {
		*value /= norm;
	}
}

/// Cosine similarity of two vectors. Returns 0.0 for mismatched lengths or
/// zero-norm inputs so degenerate embeddings sort last instead of poisoning
/// the ranking with NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
	if a.len() != b.len() || a.is_empty() {
		return 0.0;
	}

	let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
	let norms = l2_norm(a) * l2_norm(b);

	if norms <= f32::EPSILON {
		return 0.0;
	}

	dot / norms
}
