//! Setup dialogue run before the terminal surface is opened.

use std::io::{self, BufRead, Write};

use crate::config::{Settings, DEFAULT_SIZE};

/// Writes `msg` and reads lines until `parse` accepts one. Malformed input
/// just asks again; running out of input is an error.
pub fn ask<R, W, T, F>(input: &mut R, output: &mut W, msg: &str, parse: F) -> io::Result<T>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> Option<T>,
{
    let mut line = String::new();
    loop {
        write!(output, "{}", msg)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed during setup",
            ));
        }

        if let Some(v) = parse(line.trim()) {
            return Ok(v);
        }
        log::debug!("rejected setup answer {:?}", line.trim());
    }
}

/// Empty means `default`, otherwise a positive integer.
pub fn parse_dimension(default: usize) -> impl Fn(&str) -> Option<usize> {
    move |s: &str| {
        if s.is_empty() {
            return Some(default);
        }
        s.parse::<usize>().ok().filter(|&n| n > 0)
    }
}

/// `y`/`yes`/`n`/`no` in any case; empty means `default`.
pub fn parse_yes_no(default: bool) -> impl Fn(&str) -> Option<bool> {
    move |s: &str| match s.to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

pub fn ask_torus<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<bool> {
    ask(
        input,
        output,
        "Make the board a torus (wrap around the edges)? y/[n]: ",
        parse_yes_no(false),
    )
}

/// Asks for rows, columns and topology, in that order.
pub fn settings_from_dialogue<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Settings> {
    let dim = |what: &str| {
        format!(
            "Specify a number of {} for the board (default {}): ",
            what, DEFAULT_SIZE
        )
    };

    let rows = ask(input, output, &dim("rows"), parse_dimension(DEFAULT_SIZE))?;
    let cols = ask(input, output, &dim("columns"), parse_dimension(DEFAULT_SIZE))?;
    let on_torus = ask_torus(input, output)?;

    Ok(Settings {
        rows,
        cols,
        on_torus,
        ..Settings::default()
    })
}
