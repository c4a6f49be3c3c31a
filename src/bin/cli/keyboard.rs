use std::io::stdout;
use std::time::Duration;

use crossterm::{
    cursor::{Hide, MoveToColumn, Show},
    event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
    Result,
};

/// Wait up to `timeout` for a key press and report whether the user asked to
/// stop, with `ESC` or `Ctrl+C`.
pub(crate) fn poll_stop_key(timeout: Duration) -> Result<bool> {
    enable_raw_mode()?;
    execute!(stdout(), Hide)?;
    let result = poll(timeout);
    execute!(stdout(), MoveToColumn(0), Show)?;
    disable_raw_mode()?;

    if !result? {
        // Timeout expired with no event
        return Ok(false);
    }

    // It's guaranteed that read() wont block if `poll` returns `Ok(true)`
    let event = read()?;

    // As we are in raw mode, Ctrl+C is captured here as a key event rather
    // than a signal.
    Ok(event == Event::Key(KeyCode::Esc.into())
        || event
            == Event::Key(KeyEvent {
                modifiers: KeyModifiers::CONTROL,
                code: KeyCode::Char('c'),
            }))
}
