use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use swish::builtins::BUILTINS;

/// Completes built-in names in command position and file names everywhere.
pub struct SwishHelper;

impl SwishHelper {
    pub fn new() -> Self {
        Self
    }
}

impl Completer for SwishHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_cursor = &line[..pos];

        let (start, word) = find_word_start(line_to_cursor);

        if word.is_empty() {
            return Ok((pos, vec![]));
        }

        let is_first_word = !line_to_cursor[..start].contains(|c: char| !c.is_whitespace());

        let mut completions = Vec::new();

        if is_first_word {
            for builtin in BUILTINS {
                if builtin.name.starts_with(word) {
                    completions.push(Pair {
                        display: builtin.name.to_string(),
                        replacement: builtin.name.to_string(),
                    });
                }
            }
        }

        if !is_first_word || word.contains('/') || word.starts_with('.') {
            let (dir, partial) = match word.rfind('/') {
                Some(last_slash) => (&word[..=last_slash], &word[last_slash + 1..]),
                None => ("", word),
            };

            for name in complete_path(&resolve_dir(dir), partial) {
                completions.push(Pair {
                    replacement: format!("{}{}", dir, name),
                    display: name,
                });
            }
        }

        Ok((start, completions))
    }
}

fn complete_path(dir: &Path, partial: &str) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return vec![];
    };
    let mut names: Vec<String> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with(partial) {
                return None;
            }
            let is_dir = entry.file_type().is_ok_and(|ft| ft.is_dir());
            Some(if is_dir { format!("{name}/") } else { name })
        })
        .collect();
    names.sort();
    names
}

fn find_word_start(line: &str) -> (usize, &str) {
    let mut start = line.len();
    for (i, c) in line.char_indices().rev() {
        if c.is_whitespace() {
            break;
        }
        start = i;
    }
    (start, &line[start..])
}

fn resolve_dir(dir: &str) -> PathBuf {
    if dir.is_empty() {
        PathBuf::from(".")
    } else if let Some(rest) = dir.strip_prefix("~/") {
        dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(dir))
    } else {
        PathBuf::from(dir)
    }
}

impl Hinter for SwishHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for SwishHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Borrowed(hint)
    }
}

impl Validator for SwishHelper {}

impl Helper for SwishHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_start_after_space() {
        assert_eq!(find_word_start("fg 1"), (3, "1"));
        assert_eq!(find_word_start("wait-"), (0, "wait-"));
        assert_eq!(find_word_start("cat "), (4, ""));
    }

    #[test]
    fn completes_files_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alpha.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("alps")).unwrap();
        std::fs::write(dir.path().join("beta.txt"), "").unwrap();

        assert_eq!(complete_path(dir.path(), "al"), vec!["alpha.txt", "alps/"]);
    }

    #[test]
    fn resolve_empty_dir_is_cwd() {
        assert_eq!(resolve_dir(""), PathBuf::from("."));
        assert_eq!(resolve_dir("/tmp/"), PathBuf::from("/tmp/"));
    }
}
