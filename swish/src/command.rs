//! One parsed command line: argument tokens, redirections and the
//! background marker.

use crate::error::{ShellError, ShellResult};
use std::io;
use std::path::PathBuf;

pub const BACKGROUND_MARKER: &str = "&";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectKind {
    /// `<` file
    Input,
    /// `>` file
    Truncate,
    /// `>>` file
    Append,
}

impl RedirectKind {
    pub fn operator(&self) -> &'static str {
        match self {
            Self::Input => "<",
            Self::Truncate => ">",
            Self::Append => ">>",
        }
    }

    const ALL: [Self; 3] = [Self::Input, Self::Truncate, Self::Append];
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub kind: RedirectKind,
    pub path: PathBuf,
    /// Token index of the operator
    pub position: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    /// Tokens as typed, minus a trailing `&`
    pub tokens: Vec<String>,
    pub input: Option<Redirect>,
    pub output: Option<Redirect>,
    pub background: bool,
}

impl Command {
    /// Build a command from the tokens of one line.
    ///
    /// Only the first `<`, `>` and `>>` are recognized. When both `>` and
    /// `>>` appear, `>` is the output redirection and `>>` is dropped.
    pub fn parse(mut tokens: Vec<String>) -> ShellResult<Self> {
        let background = tokens.last().is_some_and(|t| t == BACKGROUND_MARKER);
        if background {
            tokens.pop();
        }
        if tokens.is_empty() {
            return Err(ShellError::InvalidArgument(
                "missing command before '&'".to_string(),
            ));
        }

        let input = find_redirect(&tokens, RedirectKind::Input)?;
        let output = match find_redirect(&tokens, RedirectKind::Truncate)? {
            Some(truncate) => Some(truncate),
            None => find_redirect(&tokens, RedirectKind::Append)?,
        };

        Ok(Self {
            tokens,
            input,
            output,
            background,
        })
    }

    /// Display name of a job started from this command.
    pub fn name(&self) -> &str {
        self.tokens.first().map_or("", String::as_str)
    }

    /// Arguments handed to the program: every recognized operator and its
    /// operand is removed, including an `>>` overridden by `>`.
    pub fn argv(&self) -> Vec<&str> {
        let mut skip = Vec::new();
        for kind in RedirectKind::ALL {
            if let Some(pos) = position_of(&self.tokens, kind) {
                skip.extend([pos, pos + 1]);
            }
        }
        self.tokens
            .iter()
            .enumerate()
            .filter(|(i, _)| !skip.contains(i))
            .map(|(_, t)| t.as_str())
            .collect()
    }
}

fn position_of(tokens: &[String], kind: RedirectKind) -> Option<usize> {
    tokens.iter().position(|t| t == kind.operator())
}

fn find_redirect(tokens: &[String], kind: RedirectKind) -> ShellResult<Option<Redirect>> {
    let Some(position) = position_of(tokens, kind) else {
        return Ok(None);
    };
    let path = tokens.get(position + 1).ok_or_else(|| ShellError::Redirection {
        path: PathBuf::from(kind.operator()),
        source: io::Error::new(io::ErrorKind::InvalidInput, "missing file operand"),
    })?;
    Ok(Some(Redirect {
        kind,
        path: PathBuf::from(path),
        position,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(line: &str) -> Command {
        Command::parse(tokenize(line).unwrap()).unwrap()
    }

    #[test]
    fn test_plain_command() {
        let cmd = parse("ls -l /tmp");
        assert!(!cmd.background);
        assert!(cmd.input.is_none() && cmd.output.is_none());
        assert_eq!(cmd.argv(), vec!["ls", "-l", "/tmp"]);
        assert_eq!(cmd.name(), "ls");
    }

    #[test]
    fn test_trailing_ampersand() {
        let cmd = parse("sleep 5 &");
        assert!(cmd.background);
        assert_eq!(cmd.argv(), vec!["sleep", "5"]);
    }

    #[test]
    fn test_ampersand_in_middle_is_an_argument() {
        let cmd = parse("echo & done");
        assert!(!cmd.background);
        assert_eq!(cmd.argv(), vec!["echo", "&", "done"]);
    }

    #[test]
    fn test_lone_ampersand_is_invalid() {
        let err = Command::parse(vec!["&".to_string()]).unwrap_err();
        assert!(matches!(err, ShellError::InvalidArgument(_)));
    }

    #[test]
    fn test_input_and_output() {
        let cmd = parse("sort < in.txt > out.txt");
        let input = cmd.input.clone().unwrap();
        assert_eq!(input.kind, RedirectKind::Input);
        assert_eq!(input.path, PathBuf::from("in.txt"));
        assert_eq!(input.position, 1);
        let output = cmd.output.clone().unwrap();
        assert_eq!(output.kind, RedirectKind::Truncate);
        assert_eq!(output.position, 3);
        assert_eq!(cmd.argv(), vec!["sort"]);
    }

    #[test]
    fn test_append() {
        let cmd = parse("echo bye >> out.txt");
        assert_eq!(cmd.output.unwrap().kind, RedirectKind::Append);
    }

    #[test]
    fn test_truncate_wins_over_append() {
        let cmd = parse("echo x >> a.txt > b.txt");
        let output = cmd.output.clone().unwrap();
        assert_eq!(output.kind, RedirectKind::Truncate);
        assert_eq!(output.path, PathBuf::from("b.txt"));
        assert_eq!(cmd.argv(), vec!["echo", "x"]);
    }

    #[test]
    fn test_redirect_before_program() {
        let cmd = parse("< in.txt cat");
        assert_eq!(cmd.argv(), vec!["cat"]);
    }

    #[test]
    fn test_missing_operand() {
        let err = Command::parse(tokenize("cat <").unwrap()).unwrap_err();
        assert!(matches!(err, ShellError::Redirection { .. }));
    }

    #[test]
    fn test_background_with_redirect() {
        let cmd = parse("echo hi > out.txt &");
        assert!(cmd.background);
        assert_eq!(cmd.output.unwrap().path, PathBuf::from("out.txt"));
    }
}
