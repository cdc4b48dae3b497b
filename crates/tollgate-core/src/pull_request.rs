//! Pull request references.

use serde::{Deserialize, Serialize};

/// The pull request an event targets. All statuses are published against
/// `head_sha` and every execution request carries a copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub org: String,
    pub repo: String,
    /// Branch the pull request merges into.
    pub base_ref: String,
    /// Commit at the head of the pull request.
    pub head_sha: String,
    /// Pull request number, when known.
    pub number: Option<u64>,
    /// Login of the pull request author, when known.
    pub author: Option<String>,
}

impl PullRequestRef {
    pub fn new(
        org: impl Into<String>,
        repo: impl Into<String>,
        base_ref: impl Into<String>,
        head_sha: impl Into<String>,
    ) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            base_ref: base_ref.into(),
            head_sha: head_sha.into(),
            number: None,
            author: None,
        }
    }

    pub fn with_number(mut self, number: u64) -> Self {
        self.number = Some(number);
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// `org/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.org, self.repo)
    }

    /// First seven characters of the head commit, for log output.
    pub fn short_sha(&self) -> &str {
        match self.head_sha.char_indices().nth(7) {
            Some((end, _)) => &self.head_sha[..end],
            None => &self.head_sha,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_and_short_sha() {
        let pr = PullRequestRef::new("org", "repo", "main", "abc1234567890");
        assert_eq!(pr.full_name(), "org/repo");
        assert_eq!(pr.short_sha(), "abc1234");
    }

    #[test]
    fn test_short_sha_counts_characters() {
        let pr = PullRequestRef::new("org", "repo", "main", "ééééééééé");
        assert_eq!(pr.short_sha(), "ééééééé");

        let pr = PullRequestRef::new("org", "repo", "main", "abcdefé12");
        assert_eq!(pr.short_sha(), "abcdefé");
    }

    #[test]
    fn test_short_sha_of_short_commit() {
        let pr = PullRequestRef::new("org", "repo", "main", "foo");
        assert_eq!(pr.short_sha(), "foo");

        let pr = PullRequestRef::new("org", "repo", "main", "ééééé");
        assert_eq!(pr.short_sha(), "ééééé");
    }
}
