//! Change notification for boards.

use super::coords::Coords;

/// A change to a board's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardEvent {
    /// The whole grid was replaced.
    NewBoard,
    /// A single hex was replaced.
    HexChanged(Coords),
    /// Many hexes changed at once, or a board-wide option was toggled.
    AllHexesChanged,
}

/// Observer registered on a board instance.
pub trait BoardListener {
    fn board_changed(&mut self, board_id: i32, event: &BoardEvent);
}

impl<F> BoardListener for F
where
    F: FnMut(i32, &BoardEvent),
{
    fn board_changed(&mut self, board_id: i32, event: &BoardEvent) {
        self(board_id, event)
    }
}
