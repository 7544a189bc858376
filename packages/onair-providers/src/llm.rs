// std
use std::{collections::HashMap, fmt::Write as _, time::Duration};

// crates.io
use color_eyre::{Result, eyre};
use regex::Regex;
use reqwest::Client;
use serde_json::Value;

use onair_domain::{candidate::Candidate, score};

/// Substituted when the model gives no usable rationale.
pub const FALLBACK_REASONING: &str = "ベクトル類似度に基づく推薦です。";
/// Substituted when the model gives no parseable score.
pub const DEFAULT_SCORE: f32 = 0.5;

#[derive(Clone, Debug)]
pub struct LlmRecommendation {
	pub corner_id: i64,
	pub score: f32,
	pub reasoning: String,
}

/// Raw parse result before the fallback defaults are applied. Kept separate
/// so the fallback policy stays independently testable.
#[derive(Clone, Debug, Default)]
pub struct ParsedRecommendation {
	pub corner_id: Option<i64>,
	pub score: Option<f32>,
	pub reasoning: Option<String>,
}

/// Asks the model to pick the single best corner for the memo.
///
/// Candidates beyond `max_candidates` are dropped in input order, so callers
/// passing similarity-sorted results keep the strongest ones. A parse miss is
/// never an error; only backend unavailability is.
pub async fn recommend(
	cfg: &onair_config::LlmProviderConfig,
	memo: &str,
	candidates: &[Candidate],
	max_candidates: usize,
) -> Result<LlmRecommendation> {
	if candidates.is_empty() {
		return Err(eyre::eyre!("LLM recommendation requires at least one candidate."));
	}

	let shortlist = &candidates[..candidates.len().min(max_candidates.max(1))];
	let prompt = build_recommend_prompt(memo, shortlist);
	let response = generate(cfg, &prompt).await?;
	let parsed = parse_recommendation(&response);

	Ok(normalize_recommendation(parsed, shortlist[0].corner_id))
}

/// Asks the model to score every candidate independently. Candidates the
/// response never mentions get [`DEFAULT_SCORE`].
pub async fn score_all(
	cfg: &onair_config::LlmProviderConfig,
	memo: &str,
	candidates: &[Candidate],
) -> Result<Vec<(i64, f32)>> {
	if candidates.is_empty() {
		return Ok(Vec::new());
	}

	let prompt = build_score_all_prompt(memo, candidates);
	let response = generate(cfg, &prompt).await?;
	let scores = parse_score_lines(&response);

	Ok(candidates
		.iter()
		.map(|candidate| {
			let score = scores.get(&candidate.corner_id).copied().unwrap_or(DEFAULT_SCORE);

			(candidate.corner_id, score::clamp_unit(score))
		})
		.collect())
}

async fn generate(cfg: &onair_config::LlmProviderConfig, prompt: &str) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"prompt": prompt,
		"stream": false,
		"options": { "temperature": cfg.temperature },
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(cfg.api_key.as_deref(), &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_generate_response(json)
}

fn parse_generate_response(json: Value) -> Result<String> {
	// Ollama generate shape.
	if let Some(text) = json.get("response").and_then(|v| v.as_str()) {
		return Ok(text.to_string());
	}

	// OpenAI-compatible chat shape.
	if let Some(text) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|content| content.as_str())
	{
		return Ok(text.to_string());
	}

	Err(eyre::eyre!("LLM response is missing generated text."))
}

fn build_recommend_prompt(memo: &str, candidates: &[Candidate]) -> String {
	format!(
		"あなたはラジオ番組のコーナー選択アシスタントです。\n\
		以下のメモ内容に最も適したラジオコーナーを選択し、理由を説明してください。\n\n\
		メモ内容:\n{memo}\n\n\
		候補コーナー:\n{corners}\n\n\
		タスク:\n\
		1. メモ内容を分析し、適切なコーナーを1つ選択\n\
		2. 選択理由を簡潔に説明（2-3文）\n\
		3. 適合度を0.0-1.0のスコアで評価\n\n\
		以下の形式で回答してください:\n\
		推薦コーナーID: [corner_id]\n\
		スコア: [0.0-1.0]\n\
		理由: [選択理由]\n",
		corners = format_candidates(candidates),
	)
}

fn build_score_all_prompt(memo: &str, candidates: &[Candidate]) -> String {
	let mut corners = String::new();

	for candidate in candidates {
		let _ = writeln!(
			corners,
			"- ID: {}, タイトル: {}, 説明: {}",
			candidate.corner_id, candidate.title, candidate.description,
		);
	}

	format!(
		"あなたはラジオ番組のコーナー選択アシスタントです。\n\
		以下のメモ内容が各コーナーにどの程度適しているか評価してください。\n\n\
		メモ内容:\n{memo}\n\n\
		コーナー一覧:\n{corners}\n\
		各コーナーについて、0.0-1.0のスコアで適合度を評価してください。\n\
		以下の形式で回答:\n\
		コーナーID [id]: スコア [score]\n",
	)
}

fn format_candidates(candidates: &[Candidate]) -> String {
	let mut out = String::new();

	for (i, candidate) in candidates.iter().enumerate() {
		if i > 0 {
			out.push_str("\n\n");
		}
		let _ = write!(
			out,
			"{}. ID: {}\n   タイトル: {}\n   説明: {}\n   類似度: {:.3}",
			i + 1,
			candidate.corner_id,
			candidate.title,
			candidate.description,
			candidate.similarity,
		);
	}

	out
}

/// Scans the response line by line for the labelled fields. Later occurrences
/// override earlier ones; malformed lines are skipped.
fn parse_recommendation(response: &str) -> ParsedRecommendation {
	let mut parsed = ParsedRecommendation::default();

	for line in response.lines() {
		let line = line.trim();

		if let Some(rest) = strip_label(line, &["推薦コーナーID", "推奨コーナーID"]) {
			if let Ok(id) = rest.trim().trim_matches(['[', ']']).parse::<i64>() {
				parsed.corner_id = Some(id);
			}
		} else if let Some(rest) = strip_label(line, &["スコア"]) {
			if let Ok(score) = rest.trim().trim_matches(['[', ']']).parse::<f32>() {
				parsed.score = Some(score);
			}
		} else if let Some(rest) = strip_label(line, &["理由"]) {
			let rest = rest.trim();

			if !rest.is_empty() {
				parsed.reasoning = Some(rest.to_string());
			}
		}
	}

	parsed
}

/// Applies the fallback defaults: missing id means the first candidate,
/// missing score means [`DEFAULT_SCORE`], missing rationale means the generic
/// message. The score is clamped whatever the model emitted.
fn normalize_recommendation(parsed: ParsedRecommendation, fallback_id: i64) -> LlmRecommendation {
	LlmRecommendation {
		corner_id: parsed.corner_id.unwrap_or(fallback_id),
		score: score::clamp_unit(parsed.score.unwrap_or(DEFAULT_SCORE)),
		reasoning: parsed.reasoning.unwrap_or_else(|| FALLBACK_REASONING.to_string()),
	}
}

fn strip_label<'a>(line: &'a str, labels: &[&str]) -> Option<&'a str> {
	for label in labels {
		if let Some(rest) = line.strip_prefix(label) {
			let rest = rest.trim_start();

			if let Some(rest) = rest.strip_prefix(':').or_else(|| rest.strip_prefix('：')) {
				return Some(rest);
			}
		}
	}

	None
}

fn parse_score_lines(response: &str) -> HashMap<i64, f32> {
	let mut scores = HashMap::new();
	let Ok(pattern) =
		Regex::new(r"ID\s*\[?(-?\d+)\]?\s*[:：]\s*(?:スコア\s*)?\[?([0-9]*\.?[0-9]+)\]?")
	else {
		return scores;
	};

	for line in response.lines() {
		if let Some(caps) = pattern.captures(line)
			&& let Ok(id) = caps[1].parse::<i64>()
			&& let Ok(score) = caps[2].parse::<f32>()
		{
			scores.insert(id, score);
		}
	}

	scores
}

#[cfg(test)]
mod tests {
	use super::*;

	fn candidate(corner_id: i64, title: &str) -> Candidate {
		Candidate::from_similarity(corner_id, title.to_string(), "desc".to_string(), 1, 0.7)
	}

	#[test]
	fn parses_well_formed_response() {
		let response = "推薦コーナーID: 3\nスコア: 0.9\n理由: リスナーQ&Aのテーマに合致します。";
		let parsed = parse_recommendation(response);

		assert_eq!(parsed.corner_id, Some(3));
		assert_eq!(parsed.score, Some(0.9));
		assert_eq!(parsed.reasoning.as_deref(), Some("リスナーQ&Aのテーマに合致します。"));
	}

	#[test]
	fn accepts_alternate_label_and_fullwidth_colon() {
		let parsed = parse_recommendation("推奨コーナーID： [7]\nスコア： [0.65]");

		assert_eq!(parsed.corner_id, Some(7));
		assert_eq!(parsed.score, Some(0.65));
	}

	#[test]
	fn skips_malformed_lines() {
		let response = "推薦コーナーID: abc\nスコア: very high\n何か別の行";
		let parsed = parse_recommendation(response);

		assert!(parsed.corner_id.is_none());
		assert!(parsed.score.is_none());
		assert!(parsed.reasoning.is_none());
	}

	#[test]
	fn missing_score_defaults_to_half() {
		let parsed = parse_recommendation("推薦コーナーID: 2\n理由: 合う。");
		let normalized = normalize_recommendation(parsed, 9);

		assert_eq!(normalized.corner_id, 2);
		assert_eq!(normalized.score, DEFAULT_SCORE);
	}

	#[test]
	fn missing_id_falls_back_to_first_candidate() {
		let normalized = normalize_recommendation(parse_recommendation("スコア: 0.8"), 41);

		assert_eq!(normalized.corner_id, 41);
		assert_eq!(normalized.reasoning, FALLBACK_REASONING);
	}

	#[test]
	fn out_of_range_score_is_clamped() {
		let normalized = normalize_recommendation(parse_recommendation("スコア: 1.7"), 1);

		assert_eq!(normalized.score, 1.0);

		let normalized = normalize_recommendation(parse_recommendation("スコア: -0.2"), 1);

		assert_eq!(normalized.score, 0.0);
	}

	#[test]
	fn parses_generate_response_formats() {
		let ollama = serde_json::json!({ "response": "推薦コーナーID: 1" });

		assert_eq!(parse_generate_response(ollama).unwrap(), "推薦コーナーID: 1");

		let openai = serde_json::json!({
			"choices": [ { "message": { "content": "スコア: 0.4" } } ]
		});

		assert_eq!(parse_generate_response(openai).unwrap(), "スコア: 0.4");
		assert!(parse_generate_response(serde_json::json!({ "done": true })).is_err());
	}

	#[test]
	fn parses_score_lines_with_varied_shapes() {
		let response = "\
コーナーID 3: スコア 0.8
コーナーID [5]: 0.25
ID 9: スコア [1.0]
スコアのない行";
		let scores = parse_score_lines(response);

		assert_eq!(scores.get(&3), Some(&0.8));
		assert_eq!(scores.get(&5), Some(&0.25));
		assert_eq!(scores.get(&9), Some(&1.0));
		assert_eq!(scores.len(), 3);
	}

	#[test]
	fn recommend_prompt_lists_candidates_with_similarity() {
		let prompt =
			build_recommend_prompt("駅前のカフェ", &[candidate(1, "街角スポットライト")]);

		assert!(prompt.contains("駅前のカフェ"));
		assert!(prompt.contains("ID: 1"));
		assert!(prompt.contains("類似度: 0.700"));
		assert!(prompt.contains("推薦コーナーID"));
	}

	#[test]
	fn score_all_prompt_lists_every_candidate() {
		let prompt = build_score_all_prompt(
			"メモ",
			&[candidate(1, "a"), candidate(2, "b"), candidate(3, "c")],
		);

		assert!(prompt.contains("- ID: 1"));
		assert!(prompt.contains("- ID: 3"));
		assert!(prompt.contains("コーナーID [id]: スコア [score]"));
	}
}
