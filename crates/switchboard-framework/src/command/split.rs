use thiserror::Error;

/// Lexing failure reported back to the user verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("No closing quotation")]
    UnclosedQuote,
    #[error("No escaped character")]
    DanglingEscape,
}

#[derive(Clone, Copy)]
enum State {
    /// Between words.
    Idle,
    Word,
    SingleQuoted,
    DoubleQuoted,
}

/// POSIX shell-like word splitting.
///
/// Handles:
/// - Whitespace-separated words (space, tab, CR, LF)
/// - Single quotes, taken literally
/// - Double quotes, where a backslash only escapes `"` and `\`
/// - Backslash escapes outside quotes
/// - Quoted fragments glued to adjacent text (`a"b c"` is one word)
///
/// An empty quoted string yields an empty word.
pub fn shell_split(input: &str) -> Result<Vec<String>, SplitError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut state = State::Idle;
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        match state {
            State::Idle | State::Word => match ch {
                ' ' | '\t' | '\r' | '\n' => {
                    if let State::Word = state {
                        words.push(std::mem::take(&mut current));
                        state = State::Idle;
                    }
                }
                '\\' => {
                    current.push(chars.next().ok_or(SplitError::DanglingEscape)?);
                    state = State::Word;
                }
                '\'' => state = State::SingleQuoted,
                '"' => state = State::DoubleQuoted,
                _ => {
                    current.push(ch);
                    state = State::Word;
                }
            },
            State::SingleQuoted => match ch {
                '\'' => state = State::Word,
                _ => current.push(ch),
            },
            State::DoubleQuoted => match ch {
                '"' => state = State::Word,
                '\\' => match chars.next() {
                    Some(next @ ('"' | '\\')) => current.push(next),
                    Some(next) => {
                        current.push('\\');
                        current.push(next);
                    }
                    None => return Err(SplitError::DanglingEscape),
                },
                _ => current.push(ch),
            },
        }
    }

    match state {
        State::SingleQuoted | State::DoubleQuoted => Err(SplitError::UnclosedQuote),
        State::Word => {
            words.push(current);
            Ok(words)
        }
        State::Idle => Ok(words),
    }
}
