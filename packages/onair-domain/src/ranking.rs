use crate::candidate::Candidate;

/// Top `max_results` candidates by fused score, descending. The sort is
/// stable, so equal scores keep their retrieval order.
pub fn rank(mut candidates: Vec<Candidate>, max_results: usize) -> Vec<Candidate> {
	candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
	candidates.truncate(max_results);

	candidates
}

/// Retains candidates whose fused score reaches `min_score`. Used for bulk
/// quality audits, independent of ranking.
pub fn filter_by_confidence(candidates: Vec<Candidate>, min_score: f32) -> Vec<Candidate> {
	candidates.into_iter().filter(|candidate| candidate.score >= min_score).collect()
}
