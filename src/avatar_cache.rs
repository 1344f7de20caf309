use crate::kitty_protocol::encode_png;
use std::collections::HashMap;
use std::io::Cursor;

/// Edge, in pixels, of the square PNG handed to the terminal.
pub const THUMBNAIL_PX: u32 = 96;

#[derive(Debug, Clone, PartialEq, Eq)]
enum AvatarState {
    Pending,
    Ready { image_id: u32, png: Vec<u8> },
    Failed,
}

/// Avatars of the roster currently on screen. Cleared whenever the roster is
/// rebuilt, so nothing outlives the selection it was fetched for.
pub struct AvatarCache {
    entries: HashMap<String, AvatarState>,
    encoded: HashMap<(String, u16, u16), String>,
    next_id: u32,
    dirty: bool,
}

impl AvatarCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            encoded: HashMap::new(),
            next_id: 1,
            dirty: false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.encoded.clear();
        self.dirty = true;
    }

    /// Keeps the images but forces the terminal placements to be redrawn.
    pub fn clear_placements(&mut self) {
        self.dirty = true;
    }

    /// True when the terminal needs its image placements wiped before the
    /// next frame.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Marks `url` as wanted. Returns true if the caller should fetch it.
    pub fn request(&mut self, url: &str) -> bool {
        if url.is_empty() || self.entries.contains_key(url) {
            return false;
        }
        self.entries.insert(url.to_string(), AvatarState::Pending);
        true
    }

    /// Stores a fetched thumbnail; results for urls no longer wanted are
    /// dropped.
    pub fn store(&mut self, url: &str, png: Option<Vec<u8>>) {
        let Some(entry) = self.entries.get_mut(url) else {
            tracing::debug!(url, "dropping avatar for previous roster");
            return;
        };
        *entry = match png {
            Some(png) => {
                let image_id = self.next_id;
                self.next_id = self.next_id.wrapping_add(1).max(1);
                AvatarState::Ready { image_id, png }
            }
            None => AvatarState::Failed,
        };
        self.dirty = true;
    }

    #[cfg(test)]
    pub fn is_ready(&self, url: &str) -> bool {
        matches!(self.entries.get(url), Some(AvatarState::Ready { .. }))
    }

    /// Kitty sequence drawing the avatar into a `cols` x `rows` box.
    pub fn encoded(&mut self, url: &str, cols: u16, rows: u16) -> Option<&str> {
        let AvatarState::Ready { image_id, png } = self.entries.get(url)? else {
            return None;
        };
        let key = (url.to_string(), cols, rows);
        if !self.encoded.contains_key(&key) {
            let seq = encode_png(*image_id, png, cols, rows);
            self.encoded.insert(key.clone(), seq);
        }
        self.encoded.get(&key).map(String::as_str)
    }
}

impl Default for AvatarCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes a PNG or JPEG avatar and re-encodes it as a square PNG thumbnail,
/// the only format the kitty protocol takes directly.
pub fn thumbnail_png(bytes: &[u8], px: u32) -> Option<Vec<u8>> {
    let img = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => {
            tracing::debug!(error = %e, "avatar decode failed");
            return None;
        }
    };
    let thumb = img.thumbnail(px, px);
    let mut out = Vec::new();
    thumb
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .ok()?;
    Some(out)
}
