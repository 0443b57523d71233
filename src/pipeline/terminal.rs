// src/pipeline/terminal.rs

use std::io::{self, Write};

/// ANSI: clear screen, clear scrollback, cursor home.
pub const CLEAR_SEQUENCE: &[u8] = b"\x1b[2J\x1b[3J\x1b[H";

/// Clear the terminal in the platform-appropriate way.
pub fn clear_screen(console: &mut (dyn Write + Send)) -> io::Result<()> {
    if cfg!(windows) {
        std::process::Command::new("cmd").args(["/C", "cls"]).status()?;
        return Ok(());
    }
    console.write_all(CLEAR_SEQUENCE)?;
    console.flush()
}
