use crate::error::FetchError;
use crate::github::types::{Contributor, Repository};
use crossterm::event::{KeyEvent, MouseEvent};

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
    ReposLoaded(Result<Vec<Repository>, FetchError>),
    ContributorsLoaded {
        token: u64,
        result: Result<Vec<Contributor>, FetchError>,
    },
    AvatarLoaded {
        url: String,
        png: Option<Vec<u8>>,
    },
}
