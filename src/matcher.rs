//! Scanning fetched commits for the build marker

use crate::github::Commit;

const NO_TAG: &str = "00000";
const TAG_LEN: usize = 5;

/// Returns the first commit (in server order) whose message contains `marker`.
///
/// Plain case-sensitive substring containment: with the default `[build.` marker,
/// `[build.42]` and an unterminated `[build.x` both match.
pub fn find_build_commit<'a>(commits: &'a [Commit], marker: &str) -> Option<&'a Commit> {
    commits.iter().find(|commit| commit.message().contains(marker))
}

/// Returns true if at least one commit message contains `marker`.
pub fn has_build_commit(commits: &[Commit], marker: &str) -> bool {
    find_build_commit(commits, marker).is_some()
}

/// Short tag for log output: the last five characters of the newest commit's sha.
pub fn short_tag(commits: &[Commit]) -> String {
    commits
        .first()
        .and_then(|commit| commit.sha.as_deref())
        .filter(|sha| sha.len() >= TAG_LEN && sha.is_ascii())
        .map(|sha| sha[sha.len() - TAG_LEN..].to_string())
        .unwrap_or_else(|| NO_TAG.to_string())
}
