//! Import extraction
//!
//! Finds the raw import strings a Solidity source declares, in source order.
//! Comments are blanked first so commented-out imports are ignored; string
//! literals are preserved so `//` inside a path survives.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches every Solidity import form:
/// `import "a";`, `import "a" as A;`, `import * as A from "a";`,
/// `import {x, y as z} from "a";`
static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s*(?:[^;"']*?\bfrom\s*)?["']([^"']+)["']"#)
        .expect("import pattern is valid")
});

/// Extract raw import strings from Solidity source, in declaration order
pub fn extract_imports(code: &str) -> Vec<String> {
    let stripped = strip_comments(code);
    IMPORT_RE
        .captures_iter(&stripped)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Replace comments with whitespace, keeping string literals and line breaks
fn strip_comments(code: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        Str(char),
    }

    let mut out = String::with_capacity(code.len());
    let mut state = State::Code;
    let mut chars = code.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::BlockComment;
                }
                '"' | '\'' => {
                    out.push(c);
                    state = State::Str(c);
                }
                _ => out.push(c),
            },
            State::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                } else {
                    out.push(' ');
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else if c == '\n' {
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
            State::Str(quote) => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == quote || c == '\n' {
                    state = State::Code;
                }
            }
        }
    }

    out
}
