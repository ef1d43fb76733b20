//! Path-based commit type hints.
//!
//! Used when the model omits a type or the user asks for a suggestion.

use crate::git::diff::{ChangedFile, DiffContext, FileStatus};
use crate::grammar::commit_type::CommitType;

const CI_PREFIXES: &[&str] = &[".github/workflows/", ".circleci/", ".buildkite/", ".gitlab/ci/"];
const CI_FILES: &[&str] = &[
    ".gitlab-ci.yml",
    ".travis.yml",
    "jenkinsfile",
    "azure-pipelines.yml",
    "bitbucket-pipelines.yml",
];
const BUILD_FILES: &[&str] = &[
    "cargo.toml",
    "cargo.lock",
    "build.rs",
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "makefile",
    "cmakelists.txt",
    "dockerfile",
    "go.mod",
    "go.sum",
    "pom.xml",
    "build.gradle",
    "pyproject.toml",
    "setup.py",
    "requirements.txt",
    "gemfile",
    "gemfile.lock",
];
const TEST_DIRS: &[&str] = &["test", "tests", "__tests__", "spec", "specs"];
const DOC_DIRS: &[&str] = &["doc", "docs"];
const DOC_EXTENSIONS: &[&str] = &["md", "rst", "adoc", "txt"];
const STYLE_EXTENSIONS: &[&str] = &["css", "scss", "sass", "less", "styl"];

/// Rank commit types by how many changed files point at them.
///
/// Ties keep the order of [`CommitType::ALL`]. An empty diff yields `[chore]`.
pub fn suggest_types(diff: &DiffContext) -> Vec<CommitType> {
    let mut counts = [0usize; CommitType::ALL.len()];
    for file in &diff.files {
        let t = classify(file);
        if let Some(idx) = CommitType::ALL.iter().position(|c| *c == t) {
            counts[idx] += 1;
        }
    }

    let mut ranked: Vec<(usize, CommitType)> = CommitType::ALL
        .iter()
        .enumerate()
        .filter(|(idx, _)| counts[*idx] > 0)
        .map(|(idx, t)| (idx, *t))
        .collect();
    ranked.sort_by(|(a, _), (b, _)| counts[*b].cmp(&counts[*a]).then(a.cmp(b)));

    if ranked.is_empty() {
        return vec![CommitType::Chore];
    }
    ranked.into_iter().map(|(_, t)| t).collect()
}

/// The type a single changed path suggests.
fn classify(file: &ChangedFile) -> CommitType {
    let path = file.path.to_lowercase();
    let segments: Vec<&str> = path.split('/').collect();
    let name = segments.last().copied().unwrap_or_default();
    let dirs = &segments[..segments.len().saturating_sub(1)];
    let extension = name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();

    if CI_PREFIXES.iter().any(|p| path.starts_with(p)) || CI_FILES.contains(&name) {
        return CommitType::Ci;
    }
    if BUILD_FILES.contains(&name) {
        return CommitType::Build;
    }
    if dirs.iter().any(|d| TEST_DIRS.contains(d))
        || name.starts_with("test_")
        || name.contains("_test.")
        || name.contains(".test.")
        || name.contains(".spec.")
    {
        return CommitType::Test;
    }
    if dirs.iter().any(|d| DOC_DIRS.contains(d))
        || DOC_EXTENSIONS.contains(&extension)
        || name.starts_with("readme")
        || name.starts_with("changelog")
    {
        return CommitType::Docs;
    }
    if STYLE_EXTENSIONS.contains(&extension) {
        return CommitType::Style;
    }

    match file.status {
        FileStatus::Added => CommitType::Feat,
        FileStatus::Deleted | FileStatus::Renamed => CommitType::Refactor,
        FileStatus::Modified => CommitType::Fix,
    }
}
