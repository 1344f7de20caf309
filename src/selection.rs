use crate::github::types::Repository;

/// The repository currently chosen in the selection control, plus a token
/// that changes on every selection so late contributor responses can be told
/// apart from current ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    repo_id: Option<u64>,
    token: u64,
}

impl Selection {
    pub fn repo_id(&self) -> Option<u64> {
        self.repo_id
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn choose(&mut self, repo_id: u64) -> u64 {
        self.repo_id = Some(repo_id);
        self.bump()
    }

    /// New token for the same repository, used when re-requesting.
    pub fn bump(&mut self) -> u64 {
        self.token = self.token.wrapping_add(1);
        self.token
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.token == token
    }

    /// First repository whose id matches the selection.
    pub fn active<'a>(&self, repos: &'a [Repository]) -> Option<&'a Repository> {
        let id = self.repo_id?;
        repos.iter().find(|r| r.id == id)
    }

    pub fn index_in(&self, repos: &[Repository]) -> Option<usize> {
        let id = self.repo_id?;
        repos.iter().position(|r| r.id == id)
    }
}
