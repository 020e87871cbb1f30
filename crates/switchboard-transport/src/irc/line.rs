//! IRC protocol lines (RFC 1459 framing, without IRCv3 tags).

use std::fmt;
use std::str::FromStr;

use switchboard_core::Hostmask;

use crate::error::TransportError;

/// One protocol line: `[:prefix] COMMAND [params...] [:trailing]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub prefix: Option<String>,
    pub command: String,
    pub params: Vec<String>,
}

impl Line {
    pub fn new<I, S>(command: &str, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefix: None,
            command: command.to_string(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Nickname part of the prefix, if any.
    pub fn source_nick(&self) -> Option<&str> {
        self.prefix
            .as_deref()
            .map(|prefix| Hostmask::parse(prefix).nick)
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }
}

impl FromStr for Line {
    type Err = TransportError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut rest = raw.trim_end_matches(['\r', '\n']);

        let prefix = match rest.strip_prefix(':') {
            Some(stripped) => {
                let (prefix, remainder) = stripped
                    .split_once(' ')
                    .ok_or_else(|| TransportError::InvalidLine(raw.to_string()))?;
                rest = remainder;
                Some(prefix.to_string())
            }
            None => None,
        };

        rest = rest.trim_start_matches(' ');
        let (command, mut rest) = match rest.split_once(' ') {
            Some((command, remainder)) => (command, remainder),
            None => (rest, ""),
        };
        if command.is_empty() {
            return Err(TransportError::InvalidLine(raw.to_string()));
        }

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing.to_string());
                break;
            }
            match rest.split_once(' ') {
                Some((middle, remainder)) => {
                    params.push(middle.to_string());
                    rest = remainder;
                }
                None => {
                    params.push(rest.to_string());
                    break;
                }
            }
        }

        Ok(Self {
            prefix,
            command: command.to_ascii_uppercase(),
            params,
        })
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{prefix} ")?;
        }
        f.write_str(&self.command)?;

        if let Some((last, middle)) = self.params.split_last() {
            for param in middle {
                write!(f, " {param}")?;
            }
            if last.is_empty() || last.contains(' ') || last.starts_with(':') {
                write!(f, " :{last}")?;
            } else {
                write!(f, " {last}")?;
            }
        }
        Ok(())
    }
}
