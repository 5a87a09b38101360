//! Board persistence.
//!
//! Implements the line-oriented board file format: a tokenizer for quoted
//! records, the reader with its strict and best-effort modes, and the writer.

pub mod board_file;

pub use board_file::{
    encode_board, load_board, load_board_file, parse_board_file, read_board, save_board,
    save_board_file, BoardFile, BoardFileError,
};
