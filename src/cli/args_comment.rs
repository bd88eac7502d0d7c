//! Round trip of invocation arguments through the generated build file
//!
//! The first line of the build file records the arguments it was generated with, so a
//! later run without arguments regenerates it the same way.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const ARGS_COMMENT_PREFIX: &str = "# github-build";

/// Arguments recorded in the first line of `build_file`, empty when absent
pub fn args_from_file(build_file: &Path) -> Vec<String> {
    let Ok(file) = File::open(build_file) else {
        return Vec::new();
    };

    let mut first_line = String::new();
    if BufReader::new(file).read_line(&mut first_line).is_err() {
        return Vec::new();
    }

    match first_line.trim().strip_prefix(ARGS_COMMENT_PREFIX) {
        Some(rest) => split_args(rest),
        None => Vec::new(),
    }
}

/// Header line recording `args`, `None` when there is nothing to record
pub fn args_comment(args: &[String]) -> Option<String> {
    if args.is_empty() {
        return None;
    }

    let quoted: Vec<String> = args.iter().map(|arg| quote(arg)).collect();
    Some(format!("{} {}", ARGS_COMMENT_PREFIX, quoted.join(" ")))
}

fn quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| !c.is_whitespace() && !matches!(c, '\'' | '"' | '\\'));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

/// Splits a command line the way a POSIX shell would, without expansion
pub fn split_args(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                for quoted in chars.by_ref() {
                    if quoted == '\'' {
                        break;
                    }
                    current.push(quoted);
                }
            }
            '"' => {
                in_word = true;
                while let Some(quoted) = chars.next() {
                    match quoted {
                        '"' => break,
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                current.push(escaped);
                            }
                        }
                        other => current.push(other),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            other => {
                in_word = true;
                current.push(other);
            }
        }
    }

    if in_word {
        args.push(current);
    }
    args
}
