use std::collections::HashSet;

/// Score awarded when a job lists no required skills.
const NO_REQUIREMENTS_SCORE: i64 = 100;

fn normalize(skills: &[String]) -> HashSet<String> {
    skills
        .iter()
        .map(|skill| skill.trim().to_lowercase())
        .filter(|skill| !skill.is_empty())
        .collect()
}

/// match_score
///
/// Fit between a worker and a job on a 0–100 scale: the share of the job's distinct
/// required skills the worker has, rounded half up. Skills compare case-insensitively
/// after trimming; order and duplicates in either list do not matter.
///
/// Integer arithmetic keeps the rounding exact: `{A,B,C}` against `{B,C,D}` is
/// `2/3`, which scores 67.
pub fn match_score(worker_skills: &[String], required_skills: &[String]) -> i64 {
    let required = normalize(required_skills);
    if required.is_empty() {
        return NO_REQUIREMENTS_SCORE;
    }

    let worker = normalize(worker_skills);
    let overlap = required.intersection(&worker).count() as i64;
    let total = required.len() as i64;

    (200 * overlap + total) / (2 * total)
}
