#![cfg(test)]

use crate::github::types::{Contributor, Repository};

pub fn make_repo(id: u64, name: &str) -> Repository {
    Repository {
        id,
        name: name.to_string(),
        description: Some(format!("{name} description")),
        html_url: format!("https://github.com/HackYourFuture/{name}"),
        forks_count: id * 10,
        updated_at: "2018-03-01T10:00:00Z".to_string(),
        contributors_url: format!("https://api.github.com/repos/HackYourFuture/{name}/contributors"),
    }
}

pub fn make_contributor(login: &str, contributions: u64) -> Contributor {
    Contributor {
        login: login.to_string(),
        avatar_url: format!("https://avatars.githubusercontent.com/{login}?v=4"),
        html_url: format!("https://github.com/{login}"),
        contributions,
    }
}

pub fn buffer_text(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            out.push_str(buf[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}
