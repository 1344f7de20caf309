/// Pixel size of one terminal cell, used to keep avatars square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSize {
    pub width: u16,
    pub height: u16,
}

impl CellSize {
    const FALLBACK: CellSize = CellSize {
        width: 8,
        height: 16,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsCapability {
    Kitty(CellSize),
    Unsupported,
}

const MULTIPLEXER_VARS: &[&str] = &["TMUX", "ZELLIJ", "STY"];
const KITTY_PROGRAMS: &[&str] = &["WezTerm", "ghostty"];

pub fn detect_graphics_cap() -> GraphicsCapability {
    let cap = capability_from_env(|key| std::env::var(key).ok());
    match cap {
        GraphicsCapability::Kitty(_) => {
            let cell = cell_pixel_size().unwrap_or(CellSize::FALLBACK);
            tracing::info!(width = cell.width, height = cell.height, "kitty graphics enabled");
            GraphicsCapability::Kitty(cell)
        }
        GraphicsCapability::Unsupported => {
            tracing::info!("no inline image support, using initials tiles");
            cap
        }
    }
}

/// Decides support from the environment alone. Image escapes do not survive
/// multiplexers, so those always fall back.
fn capability_from_env(var: impl Fn(&str) -> Option<String>) -> GraphicsCapability {
    let multiplexed = MULTIPLEXER_VARS.iter().any(|k| var(k).is_some())
        || var("TERM").is_some_and(|t| t.starts_with("screen"));
    if multiplexed {
        return GraphicsCapability::Unsupported;
    }

    let kitty = var("KITTY_WINDOW_ID").is_some()
        || var("TERM_PROGRAM").is_some_and(|p| KITTY_PROGRAMS.contains(&p.as_str()));
    if kitty {
        GraphicsCapability::Kitty(CellSize::FALLBACK)
    } else {
        GraphicsCapability::Unsupported
    }
}

#[cfg(unix)]
fn cell_pixel_size() -> Option<CellSize> {
    use std::mem::MaybeUninit;
    let mut ws = MaybeUninit::<libc::winsize>::uninit();
    // SAFETY: TIOCGWINSZ fills a winsize on success.
    let ret = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, ws.as_mut_ptr()) };
    if ret != 0 {
        return None;
    }
    // SAFETY: ret == 0, so ws was written.
    let ws = unsafe { ws.assume_init() };
    if ws.ws_col == 0 || ws.ws_row == 0 || ws.ws_xpixel == 0 || ws.ws_ypixel == 0 {
        return None;
    }
    Some(CellSize {
        width: ws.ws_xpixel / ws.ws_col,
        height: ws.ws_ypixel / ws.ws_row,
    })
}

#[cfg(not(unix))]
fn cell_pixel_size() -> Option<CellSize> {
    None
}

impl GraphicsCapability {
    pub fn is_kitty(&self) -> bool {
        matches!(self, GraphicsCapability::Kitty(_))
    }

    /// Width in columns of a square avatar `rows` cells tall. Initials tiles
    /// assume the usual 1:2 cell aspect.
    pub fn square_cols(&self, rows: u16) -> u16 {
        match self {
            GraphicsCapability::Kitty(cell) if cell.width > 0 => {
                let px = u32::from(rows) * u32::from(cell.height);
                px.div_ceil(u32::from(cell.width)).max(1) as u16
            }
            _ => rows.saturating_mul(2),
        }
    }

    /// Font size may change with the window; only kitty placements care.
    pub fn redetect_cell_size(&mut self) {
        if let GraphicsCapability::Kitty(cell) = self {
            if let Some(fresh) = cell_pixel_size() {
                *cell = fresh;
            }
        }
    }
}
