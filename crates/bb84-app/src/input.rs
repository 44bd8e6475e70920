//! Terminal-agnostic keyboard input.

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries (crossterm, termion,
/// etc.) enabling deterministic simulation testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Escape key (quit).
    Esc,
    /// Up arrow key (raise interception rate).
    Up,
    /// Down arrow key (lower interception rate).
    Down,
    /// Left arrow key (slower animation).
    Left,
    /// Right arrow key (faster animation).
    Right,
}
