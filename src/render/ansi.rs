//! ANSI escape helpers shared by the render components.

pub const RESET: &str = "\x1b[0m";
pub const WHITE: &str = "\x1b[97m";
pub const GREY: &str = "\x1b[37m";
pub const DARK_GREY: &str = "\x1b[90m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";
pub const MAGENTA: &str = "\x1b[35m";
pub const RED: &str = "\x1b[31m";
pub const BAR_BG: &str = "\x1b[48;5;236m";

/// Fallback when no marker colors are configured.
const DEFAULT_MARKER_COLOR: [u8; 3] = [200, 200, 200];

/// Append a cursor move to the start of `row` (0-indexed).
pub fn move_to_row(buf: &mut String, row: u16) {
    buf.push_str(&format!("\x1b[{};1H", row + 1));
}

/// Append a 24-bit foreground color.
pub fn fg_rgb(buf: &mut String, [r, g, b]: [u8; 3]) {
    buf.push_str(&format!("\x1b[38;2;{};{};{}m", r, g, b));
}

/// Color for palette slot `index`, cycling through `palette`.
pub fn palette_color(palette: &[[u8; 3]], index: usize) -> [u8; 3] {
    if palette.is_empty() {
        DEFAULT_MARKER_COLOR
    } else {
        palette[index % palette.len()]
    }
}
