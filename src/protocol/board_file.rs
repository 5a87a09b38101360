//! Board file reading and writing.
//!
//! A board file is a sequence of line records with case-insensitive
//! keywords; `#` starts a comment and strings are double-quoted with `\"`,
//! `\\` and `\n` escapes:
//!
//! ```text
//! size 16 17
//! option exit_roads_to_pavement false
//! description "Rolling hills"
//! hex 0101 0 "woods:1;road:1:9" "forest"
//! note 305 "ford"
//! tag "hills"
//! end
//! ```
//!
//! Hex records fill the grid in row-major file order; the index written in
//! each record is informational and ignored on read. Note coordinates are
//! packed as `x * 100 + y`, or `x * 1000 + y` on boards wider or taller than
//! 99 hexes.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, error, warn};

use crate::board::terrain::parse_terrain_list;
use crate::board::{Board, BoardDimensions, BoardOptions, Coords, Hex, Terrain};

/// Option name carrying `BoardOptions::roads_auto_exit`.
const OPTION_ROADS_TO_PAVEMENT: &str = "exit_roads_to_pavement";

/// Errors that can occur while reading or writing a board file.
#[derive(Debug, thiserror::Error)]
pub enum BoardFileError {
    #[error("board file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: malformed size record '{text}'")]
    MalformedSize { line: usize, text: String },

    #[error("line {line}: malformed hex record '{text}'")]
    MalformedHex { line: usize, text: String },

    #[error("line {line}: bad note coordinate '{text}'")]
    BadNoteCoords { line: usize, text: String },

    #[error("line {line}: unterminated string")]
    UnterminatedString { line: usize },

    #[error("board is invalid: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// The records of a board file, before any terrain is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardFile {
    pub dims: BoardDimensions,
    pub roads_auto_exit: bool,
    /// Exactly `dims.area()` hexes, back-filled with blank hexes.
    pub hexes: Vec<Hex>,
    pub description: Option<String>,
    pub notes: Vec<(Coords, String)>,
    pub tags: Vec<String>,
}

impl BoardFile {
    /// Copies the records onto `board`, rebuilding everything derived.
    pub fn install_into(self, board: &mut Board) {
        board.set_options(BoardOptions {
            roads_auto_exit: self.roads_auto_exit,
            ..board.options()
        });
        board.set_description(self.description);
        board.clear_tags();
        for tag in self.tags {
            board.add_tag(tag);
        }
        board.clear_annotations();
        for (c, text) in self.notes {
            board.add_annotation(c, text);
        }
        board.new_data(self.dims, self.hexes.into_iter().map(Some).collect());
    }

    pub fn into_board(self, board_id: i32) -> Board {
        let mut board = Board::new(board_id, self.dims);
        self.install_into(&mut board);
        board
    }
}

/// Splits a line into barewords and quoted strings, stopping at a comment.
fn tokenize(text: &str, line: usize) -> Result<Vec<String>, BoardFileError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.peek() {
            None | Some('#') => break,
            Some('"') => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        None => return Err(BoardFileError::UnterminatedString { line }),
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('n') => s.push('\n'),
                            Some(c) => s.push(c),
                            None => return Err(BoardFileError::UnterminatedString { line }),
                        },
                        Some(c) => s.push(c),
                    }
                }
                tokens.push(s);
            }
            Some(_) => {
                let mut s = String::new();
                while let Some(c) = chars.next_if(|c| !c.is_whitespace() && *c != '"') {
                    s.push(c);
                }
                tokens.push(s);
            }
        }
    }
    Ok(tokens)
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn note_multiplier(dims: BoardDimensions) -> i32 {
    if dims.is_wide() {
        1000
    } else {
        100
    }
}

struct Parser {
    best_effort: bool,
    dims: Option<BoardDimensions>,
    roads_auto_exit: bool,
    hexes: Vec<Hex>,
    description: Option<String>,
    raw_notes: Vec<(usize, String, String)>,
    tags: Vec<String>,
}

impl Parser {
    /// Logs a recoverable problem in best-effort mode, otherwise fails with it.
    fn tolerate(&self, err: BoardFileError) -> Result<(), BoardFileError> {
        if self.best_effort {
            warn!(error = %err, "continuing past board file error");
            Ok(())
        } else {
            error!(error = %err, "board file rejected");
            Err(err)
        }
    }

    fn record(&mut self, tokens: &[String], line: usize, text: &str) -> Result<bool, BoardFileError> {
        let keyword = tokens[0].to_ascii_lowercase();
        match keyword.as_str() {
            "size" => {
                let dims = match tokens {
                    [_, w, h, ..] => w
                        .parse()
                        .ok()
                        .zip(h.parse().ok())
                        .and_then(|(w, h)| BoardDimensions::new(w, h).ok()),
                    _ => None,
                };
                match dims {
                    Some(d) => self.dims = Some(d),
                    None => {
                        self.tolerate(BoardFileError::MalformedSize {
                            line,
                            text: text.trim().to_string(),
                        })?;
                        self.dims = Some(BoardDimensions::default());
                    }
                }
            }
            "option" => match tokens {
                [_, name, value, ..] if name.eq_ignore_ascii_case(OPTION_ROADS_TO_PAVEMENT) => {
                    match value.to_ascii_lowercase().parse::<bool>() {
                        Ok(v) => self.roads_auto_exit = v,
                        Err(_) => warn!(line, value = value.as_str(), "ignoring non-boolean option value"),
                    }
                }
                _ => debug!(line, "ignoring unrecognized option"),
            },
            "hex" => {
                let hex = match tokens {
                    [_, _index, level, rest @ ..] => level.parse::<i32>().ok().map(|level| {
                        let spec = rest.first().map_or("", String::as_str);
                        let theme = rest.get(1).map_or("", String::as_str);
                        let (terrains, errors) = parse_terrain_list(spec);
                        for e in errors {
                            warn!(line, error = %e, "skipping terrain entry");
                        }
                        let mut hex = Hex::with_terrains(level, terrains);
                        hex.set_theme(theme);
                        hex
                    }),
                    _ => None,
                };
                match hex {
                    Some(h) => self.hexes.push(h),
                    None => {
                        self.tolerate(BoardFileError::MalformedHex {
                            line,
                            text: text.trim().to_string(),
                        })?;
                        // keep later hexes in their positions
                        self.hexes.push(Hex::default());
                    }
                }
            }
            "description" => {
                if let Some(text) = tokens.get(1) {
                    match &mut self.description {
                        Some(d) => {
                            d.push_str("\n\n");
                            d.push_str(text);
                        }
                        None => self.description = Some(text.clone()),
                    }
                }
            }
            "note" => {
                if let [_, packed, text, ..] = tokens {
                    self.raw_notes.push((line, packed.clone(), text.clone()));
                }
            }
            "tag" => {
                if let Some(tag) = tokens.get(1) {
                    self.tags.push(tag.clone());
                }
            }
            "end" => return Ok(false),
            other => debug!(line, keyword = other, "ignoring unknown record"),
        }
        Ok(true)
    }

    fn finish(self) -> Result<BoardFile, BoardFileError> {
        let dims = self.dims.unwrap_or_else(|| {
            debug!("no size record, using the default board size");
            BoardDimensions::default()
        });

        let mult = note_multiplier(dims);
        let mut notes = Vec::new();
        for (line, packed, text) in self.raw_notes {
            let c = packed
                .parse::<i32>()
                .ok()
                .filter(|n| *n >= 0)
                .map(|n| Coords::new(n / mult, n % mult))
                .filter(|c| dims.contains(*c));
            match c {
                Some(c) => notes.push((c, text)),
                None => {
                    let err = BoardFileError::BadNoteCoords { line, text: packed };
                    if self.best_effort {
                        warn!(error = %err, "dropping note");
                    } else {
                        error!(error = %err, "board file rejected");
                        return Err(err);
                    }
                }
            }
        }

        let mut hexes = self.hexes;
        if hexes.len() != dims.area() {
            debug!(found = hexes.len(), expected = dims.area(), "hex count does not match size");
        }
        hexes.resize(dims.area(), Hex::default());

        Ok(BoardFile {
            dims,
            roads_auto_exit: self.roads_auto_exit,
            hexes,
            description: self.description,
            notes,
            tags: self.tags,
        })
    }
}

/// Parses board file text into its records.
///
/// With `best_effort`, malformed records are logged and patched instead of
/// failing the parse.
pub fn parse_board_file(text: &str, best_effort: bool) -> Result<BoardFile, BoardFileError> {
    let mut parser = Parser {
        best_effort,
        dims: None,
        roads_auto_exit: true,
        hexes: Vec::new(),
        description: None,
        raw_notes: Vec::new(),
        tags: Vec::new(),
    };

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let tokens = match tokenize(raw, line) {
            Ok(t) => t,
            Err(e) => {
                parser.tolerate(e)?;
                continue;
            }
        };
        if tokens.is_empty() {
            continue;
        }
        if !parser.record(&tokens, line, raw)? {
            break;
        }
    }
    parser.finish()
}

/// Parses and validates a board without touching any existing board.
///
/// An invalid board is an error unless `best_effort` is set, in which case
/// it is returned as it stands.
pub fn read_board(board_id: i32, text: &str, best_effort: bool) -> Result<Board, BoardFileError> {
    let file = parse_board_file(text, best_effort)?;
    let board = file.into_board(board_id);
    check_validity(&board, best_effort)?;
    Ok(board)
}

fn check_validity(board: &Board, best_effort: bool) -> Result<(), BoardFileError> {
    let mut errors = Vec::new();
    if board.is_valid(Some(&mut errors)) {
        return Ok(());
    }
    if best_effort {
        warn!(problems = errors.len(), "installing invalid board in best-effort mode");
        Ok(())
    } else {
        error!(problems = errors.len(), "board failed validation, load aborted");
        Err(BoardFileError::Invalid(errors))
    }
}

/// Loads a board file into `board`. On error the board is left untouched.
pub fn load_board(board: &mut Board, mut reader: impl Read, best_effort: bool) -> Result<(), BoardFileError> {
    let mut text = String::new();
    if let Err(e) = reader.read_to_string(&mut text) {
        error!(error = %e, "could not read board");
        return Err(e.into());
    }
    let file = parse_board_file(&text, best_effort)?;
    let staged = file.clone().into_board(board.board_id());
    check_validity(&staged, best_effort)?;
    file.install_into(board);
    Ok(())
}

pub fn load_board_file(board: &mut Board, path: impl AsRef<Path>, best_effort: bool) -> Result<(), BoardFileError> {
    let file = File::open(path.as_ref())?;
    load_board(board, BufReader::new(file), best_effort)
}

/// A terrain entry as saved: derived exits are written out explicitly.
fn saved_terrain(t: &Terrain) -> String {
    if !t.exits_specified() && t.exits() != 0 {
        format!("{}:{}", t, t.exits())
    } else {
        t.to_string()
    }
}

/// Renders a board in file form. Automatic terrain is left out.
pub fn encode_board(board: &Board) -> String {
    let dims = board.dimensions();
    let wide = dims.is_wide();
    let mut out = String::new();

    out.push_str(&format!("size {} {}\n", dims.width(), dims.height()));
    if !board.options().roads_auto_exit {
        out.push_str(&format!("option {OPTION_ROADS_TO_PAVEMENT} false\n"));
    }
    if let Some(d) = board.description() {
        out.push_str(&format!("description {}\n", quote(d)));
    }
    for c in dims.all_coords() {
        let (level, spec, theme) = match board.hex(c) {
            Some(h) => {
                let spec = h
                    .terrains()
                    .filter(|t| !t.kind().is_automatic())
                    .map(saved_terrain)
                    .collect::<Vec<_>>()
                    .join(";");
                (h.level(), spec, h.theme().to_string())
            }
            None => (0, String::new(), String::new()),
        };
        out.push_str(&format!(
            "hex {} {} {} {}\n",
            c.board_num(wide),
            level,
            quote(&spec),
            quote(&theme)
        ));
    }
    let mult = note_multiplier(dims);
    for (c, notes) in board.all_annotations() {
        for note in notes {
            out.push_str(&format!("note {} {}\n", c.x * mult + c.y, quote(note)));
        }
    }
    for tag in board.tags() {
        out.push_str(&format!("tag {}\n", quote(tag)));
    }
    out.push_str("end\n");
    out
}

pub fn save_board(board: &Board, mut writer: impl Write) -> Result<(), BoardFileError> {
    writer.write_all(encode_board(board).as_bytes())?;
    writer.flush()?;
    Ok(())
}

pub fn save_board_file(board: &Board, path: impl AsRef<Path>) -> Result<(), BoardFileError> {
    let file = File::create(path.as_ref())?;
    save_board(board, BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TerrainKind;

    const SMALL: &str = "\
# a tiny board
size 2 2
hex 0101 1 \"woods:1\" \"forest\"
hex 0201 0 \"\" \"\"
hex 0102 0 \"road:1\" \"\"
hex 0202 0 \"road:1\" \"\"
end
";

    #[test]
    fn tokenizer_handles_quotes_and_comments() {
        let tokens = tokenize(r#"note 305 "say \"hi\"\nback\\slash" # trailing"#, 1).unwrap();
        assert_eq!(tokens, vec!["note", "305", "say \"hi\"\nback\\slash"]);
        assert_eq!(tokenize("   # only a comment", 1).unwrap(), Vec::<String>::new());
        assert_eq!(tokenize(r#"hex 1 0 "" """#, 1).unwrap(), vec!["hex", "1", "0", "", ""]);
        assert!(matches!(
            tokenize(r#"tag "open"#, 4),
            Err(BoardFileError::UnterminatedString { line: 4 })
        ));
    }

    #[test]
    fn parses_records_in_order() {
        let file = parse_board_file(SMALL, false).unwrap();
        assert_eq!(file.dims, BoardDimensions::new(2, 2).unwrap());
        assert_eq!(file.hexes.len(), 4);
        assert_eq!(file.hexes[0].level(), 1);
        assert_eq!(file.hexes[0].theme(), "forest");
        assert!(file.hexes[3].contains_terrain(TerrainKind::Road));
        assert!(file.roads_auto_exit);
    }

    #[test]
    fn hex_index_is_ignored() {
        let text = "size 2 1\nhex 9999 3 \"\" \"\"\nhex 0101 4 \"\" \"\"\nend\n";
        let file = parse_board_file(text, false).unwrap();
        assert_eq!(file.hexes[0].level(), 3);
        assert_eq!(file.hexes[1].level(), 4);
    }

    #[test]
    fn missing_hexes_are_back_filled() {
        let file = parse_board_file("size 3 3\nhex 0101 2 \"\" \"\"\n", false).unwrap();
        assert_eq!(file.hexes.len(), 9);
        assert_eq!(file.hexes[8], Hex::default());
    }

    #[test]
    fn malformed_size_fails_unless_best_effort() {
        let text = "size sixteen 17\nend\n";
        assert!(matches!(
            parse_board_file(text, false),
            Err(BoardFileError::MalformedSize { line: 1, .. })
        ));
        let file = parse_board_file(text, true).unwrap();
        assert_eq!(file.dims, BoardDimensions::default());
    }

    #[test]
    fn oversized_board_is_a_malformed_size() {
        let text = "size 100000 100000\nend\n";
        assert!(matches!(
            parse_board_file(text, false),
            Err(BoardFileError::MalformedSize { line: 1, .. })
        ));
        let file = parse_board_file(text, true).unwrap();
        assert_eq!(file.hexes.len(), BoardDimensions::default().area());
    }

    #[test]
    fn descriptions_concatenate_and_notes_unpack() {
        let text = "\
size 20 20
description \"first\"
description \"second\"
note 1203 \"bridge out\"
tag \"river\"
KEYWORD ignored
end
tag \"after end\"
";
        let file = parse_board_file(text, false).unwrap();
        assert_eq!(file.description.as_deref(), Some("first\n\nsecond"));
        assert_eq!(file.notes, vec![(Coords::new(12, 3), "bridge out".to_string())]);
        assert_eq!(file.tags, vec!["river"]);
    }

    #[test]
    fn off_board_note_is_rejected() {
        let text = "size 4 4\nnote 907 \"nowhere\"\n";
        assert!(matches!(
            parse_board_file(text, false),
            Err(BoardFileError::BadNoteCoords { line: 2, .. })
        ));
        assert!(parse_board_file(text, true).unwrap().notes.is_empty());
    }

    #[test]
    fn roads_option_round_trips() {
        let text = "size 1 1\nOPTION Exit_Roads_To_Pavement FALSE\nend\n";
        let board = read_board(0, text, false).unwrap();
        assert!(!board.options().roads_auto_exit);
        assert!(encode_board(&board).contains("option exit_roads_to_pavement false"));
    }

    #[test]
    fn save_writes_implicit_exits_and_skips_automatic() {
        let board = read_board(0, SMALL, false).unwrap();
        let saved = encode_board(&board);
        // (0, 1) meets (1, 1) to its south-east
        assert!(saved.contains("hex 0102 0 \"road:1:4\" \"\""), "{saved}");
        assert!(saved.contains("hex 0202 0 \"road:1:32\" \"\""), "{saved}");
        assert!(!saved.contains("incline"));
        assert!(saved.starts_with("size 2 2\n"));
        assert!(saved.ends_with("end\n"));
    }

    #[test]
    fn invalid_board_rejected_or_passed_through() {
        let text = "size 1 1\nhex 0101 0 \"woods:7\" \"\"\nend\n";
        assert!(matches!(read_board(0, text, false), Err(BoardFileError::Invalid(_))));
        let board = read_board(0, text, true).unwrap();
        assert_eq!(board.hex(Coords::new(0, 0)).unwrap().terrain_level(TerrainKind::Woods), Some(7));
    }

    #[test]
    fn failed_load_leaves_board_untouched() {
        let mut board = read_board(5, SMALL, false).unwrap();
        let err = load_board(&mut board, "size x\n".as_bytes(), false);
        assert!(err.is_err());
        assert_eq!(board.dimensions(), BoardDimensions::new(2, 2).unwrap());
        assert_eq!(board.hex(Coords::new(0, 0)).unwrap().theme(), "forest");
    }
}
