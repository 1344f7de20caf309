use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub updated_at: String,
    pub contributors_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Contributor {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub contributions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_ignores_unknown_fields_and_null_description() {
        let json = r#"{
            "id": 42,
            "node_id": "MDEw",
            "name": "JavaScript",
            "description": null,
            "html_url": "https://github.com/HackYourFuture/JavaScript",
            "forks_count": 7,
            "updated_at": "2018-03-01T10:00:00Z",
            "contributors_url": "https://api.github.com/repos/HackYourFuture/JavaScript/contributors",
            "private": false
        }"#;
        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.id, 42);
        assert_eq!(repo.description, None);
        assert_eq!(repo.forks_count, 7);
    }

    #[test]
    fn contributor_parses_api_shape() {
        let json = r#"[{"login":"mkruijt","id":7113309,"avatar_url":"https://avatars2.githubusercontent.com/u/7113309?v=4","html_url":"https://github.com/mkruijt","type":"User","contributions":28}]"#;
        let list: Vec<Contributor> = serde_json::from_str(json).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].login, "mkruijt");
        assert_eq!(list[0].contributions, 28);
    }
}
