//! hexboard -- inspect and normalise board files.
//!
//! Usage:
//!   hexboard check FILE [--strict]
//!   hexboard resave FILE [OUT]
//!   hexboard elevations FILE X Y MODE [HEIGHT] [--airborne]
//!
//! `check` prints a summary and every validation problem, exiting non-zero
//! for an invalid board. `resave` rewrites a board in canonical form.
//! `elevations` lists where a unit could deploy in the zero-based hex (X, Y).
//! Logs go to stderr; set `RUST_LOG` to change the level.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hexboard::board::{Board, Coords};
use hexboard::deploy::{allowed_elevations, MovementMode, UnitProfile};
use hexboard::protocol::{encode_board, read_board, BoardFileError};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

fn load(path: &str, best_effort: bool) -> Result<Board, BoardFileError> {
    let text = fs::read_to_string(path)?;
    read_board(0, &text, best_effort)
}

fn check(path: &str, strict: bool) -> Result<bool, BoardFileError> {
    let board = load(path, !strict)?;
    let mut errors = Vec::new();
    let valid = board.is_valid(Some(&mut errors));

    let mut out = io::stdout().lock();
    writeln!(out, "size {}", board.dimensions())?;
    writeln!(out, "elevation {}..{}", board.min_elevation(), board.max_elevation())?;
    writeln!(out, "buildings {}", board.buildings().count())?;
    for e in board.building_errors().iter().chain(&errors) {
        writeln!(out, "error {e}")?;
    }
    writeln!(out, "{}", if valid { "valid" } else { "invalid" })?;
    Ok(valid)
}

fn resave(path: &str, target: Option<&str>) -> Result<(), BoardFileError> {
    let board = load(path, true)?;
    let text = encode_board(&board);
    match target {
        Some(out) => {
            fs::write(out, text)?;
            info!(from = path, to = out, "board resaved");
        }
        None => io::stdout().lock().write_all(text.as_bytes())?,
    }
    Ok(())
}

fn elevations(path: &str, args: &[String]) -> Result<(), String> {
    let [x, y, mode, rest @ ..] = args else {
        return Err("elevations needs X Y MODE".to_string());
    };
    let x: i32 = x.parse().map_err(|_| format!("invalid X '{x}'"))?;
    let y: i32 = y.parse().map_err(|_| format!("invalid Y '{y}'"))?;
    let mode: MovementMode = mode.parse()?;
    let mut unit = UnitProfile::new(mode, 0);
    for arg in rest {
        match arg.as_str() {
            "--airborne" => unit = unit.airborne(),
            h => unit.height = h.parse().map_err(|_| format!("invalid height '{h}'"))?,
        }
    }

    let board = load(path, true).map_err(|e| e.to_string())?;
    let c = Coords::new(x, y);
    let hex = board.hex(c).ok_or_else(|| format!("{c} is off the board"))?;
    let options = allowed_elevations(&unit, c, &board, hex).map_err(|e| e.to_string())?;
    let mut out = io::stdout().lock();
    for o in options {
        writeln!(out, "{o}").map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn usage() -> ExitCode {
    eprintln!("usage: hexboard check FILE [--strict]");
    eprintln!("       hexboard resave FILE [OUT]");
    eprintln!("       hexboard elevations FILE X Y MODE [HEIGHT] [--airborne]");
    ExitCode::from(2)
}

fn main() -> ExitCode {
    init_logging();
    let args: Vec<String> = env::args().skip(1).collect();

    match args.as_slice() {
        [cmd, path, rest @ ..] if cmd == "check" => {
            let strict = rest.iter().any(|a| a == "--strict");
            match check(path, strict) {
                Ok(true) => ExitCode::SUCCESS,
                Ok(false) => ExitCode::FAILURE,
                Err(e) => {
                    error!(path = path.as_str(), error = %e, "check failed");
                    ExitCode::FAILURE
                }
            }
        }
        [cmd, path, rest @ ..] if cmd == "resave" => match resave(path, rest.first().map(String::as_str)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(path = path.as_str(), error = %e, "resave failed");
                ExitCode::FAILURE
            }
        },
        [cmd, path, rest @ ..] if cmd == "elevations" => match elevations(path, rest) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(path = path.as_str(), error = %e, "elevation query failed");
                ExitCode::FAILURE
            }
        },
        _ => usage(),
    }
}
