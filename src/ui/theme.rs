use ratatui::style::Color;

/// Fallback avatar tiles, picked by login hash.
pub const AVATAR_COLORS: &[Color] = &[
    Color::Rgb(231, 111, 81),
    Color::Rgb(244, 162, 97),
    Color::Rgb(233, 196, 106),
    Color::Rgb(42, 157, 143),
    Color::Rgb(116, 185, 255),
    Color::Rgb(181, 131, 230),
];

// HYF red on a dark slate base
pub const ACCENT: Color = Color::Rgb(226, 60, 72);
pub const HEADER_BG: Color = Color::Rgb(28, 30, 38);
pub const STATUS_BG: Color = Color::Rgb(33, 35, 44);
pub const SELECTED_BG: Color = Color::Rgb(58, 44, 56);
pub const UNFOCUSED_SEL_BG: Color = Color::Rgb(42, 40, 48);
pub const SEPARATOR: Color = Color::Rgb(60, 62, 76);
pub const BORDER_COLOR: Color = Color::Rgb(72, 75, 92);
pub const FOCUS_COLOR: Color = Color::Rgb(255, 138, 128);
pub const DIM_TEXT: Color = Color::Rgb(110, 114, 130);
pub const LINK_COLOR: Color = Color::Rgb(116, 185, 255);
pub const BADGE_BG: Color = Color::Rgb(42, 157, 143);
pub const ERROR_FG: Color = Color::LightRed;
pub const SECTION_HEADER_FG: Color = Color::White;

/// Stable tile colour for a login so a contributor keeps the same fallback
/// avatar across selections.
pub fn avatar_color(login: &str) -> Color {
    let hash = login
        .bytes()
        .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    AVATAR_COLORS[hash % AVATAR_COLORS.len()]
}
