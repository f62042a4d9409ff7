//! Escaping utilities for Markdown output.
//!
//! The serializer emits author-provided text into positions where Markdown
//! metacharacters would change meaning, so plain text is always escaped on
//! the way out. Delimiter-run calculators keep code spans and fenced blocks
//! valid when the payload itself contains backticks.

/// Escape characters that carry Markdown meaning in plain text.
///
/// Escaped unconditionally: `\`, `*`, `_`, `[`, `]`, `` ` ``, `|`, `<`,
/// `>`. Escaped positionally: `#` at line start, `!` before `[`.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut chars = text.chars().peekable();
    let mut at_line_start = true;

    while let Some(c) = chars.next() {
        match c {
            '\\' | '*' | '_' | '[' | ']' | '`' | '|' | '<' | '>' => {
                out.push('\\');
                out.push(c);
            }
            '#' if at_line_start => {
                out.push('\\');
                out.push(c);
            }
            '!' if chars.peek() == Some(&'[') => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
        at_line_start = c == '\n';
    }

    out
}

/// Smallest fence width (at least 3) whose backtick run does not occur in
/// the code payload.
pub fn fence_width(code: &str) -> usize {
    longest_backtick_run(code).max(2) + 1
}

/// Smallest delimiter width (at least 1) for an inline code span around
/// the given payload.
pub fn code_span_width(code: &str) -> usize {
    longest_backtick_run(code) + 1
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
