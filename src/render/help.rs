//! Help overlay rendering.
//!
//! Displays a centered help box with all key bindings.

use std::io::Write;

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};

/// Help text lines for the help overlay.
pub const HELP_LINES: &[&str] = &[
    "",
    "  ╔═══════════════════════════════════════════╗",
    "  ║              evtmkr key help              ║",
    "  ╠═══════════════════════════════════════════╣",
    "  ║                                           ║",
    "  ║  Navigation                               ║",
    "  ║    <-/->        Step one frame            ║",
    "  ║    Up/Down      Large step back / forward ║",
    "  ║    Ctrl+<-/->   Previous / next marker    ║",
    "  ║    g            Go to frame number        ║",
    "  ║    Click/drag   Scrub the timeline        ║",
    "  ║                                           ║",
    "  ║  Playback                                 ║",
    "  ║    Space        Play / Pause              ║",
    "  ║    +/-          Speed up / down           ║",
    "  ║    Enter        Reset speed               ║",
    "  ║                                           ║",
    "  ║  Markers                                  ║",
    "  ║    Marker keys  Mark / unmark frame       ║",
    "  ║    Alt+arrows   Move marker at playhead   ║",
    "  ║    Del/Bksp     Remove marker at playhead ║",
    "  ║    Ctrl+D       Combo mark (1 then a)     ║",
    "  ║    Ctrl+Z       Undo                      ║",
    "  ║    Ctrl+Shift+Z Redo                      ║",
    "  ║    Ctrl+S       Save events               ║",
    "  ║                                           ║",
    "  ║  General                                  ║",
    "  ║    ?            Show this help            ║",
    "  ║    q/Esc        Save and quit             ║",
    "  ║                                           ║",
    "  ║         Press any key to close            ║",
    "  ╚═══════════════════════════════════════════╝",
    "",
];

/// Width of the help box (for centering calculations).
pub const HELP_BOX_WIDTH: usize = 47;

/// Starting row that centers the help box vertically.
pub fn calc_help_start_row(term_height: u16) -> u16 {
    let box_height = HELP_LINES.len() as u16;
    (term_height.saturating_sub(box_height)) / 2
}

/// Starting column that centers the help box horizontally.
pub fn calc_help_start_col(term_width: u16) -> u16 {
    ((term_width as usize).saturating_sub(HELP_BOX_WIDTH) / 2) as u16
}

/// Clear the screen and draw the help box.
pub fn render_help(out: &mut impl Write, width: u16, height: u16) -> Result<()> {
    let start_row = calc_help_start_row(height);
    let col = calc_help_start_col(width);

    queue!(out, Clear(ClearType::All))?;
    for (i, line) in HELP_LINES.iter().enumerate() {
        queue!(
            out,
            MoveTo(col, start_row + i as u16),
            SetForegroundColor(Color::Green),
            Print(line),
            ResetColor,
        )?;
    }
    out.flush()?;
    Ok(())
}
