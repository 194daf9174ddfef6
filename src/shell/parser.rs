//! Tokenizes a line and recursively builds a [`ParsedInput`] tree.
//!
//! Quoting, globbing, and variable expansion are out of scope (see the
//! shell core's non-goals), so a "word" here is simply whatever sits
//! between whitespace, separators, and parentheses.

use crate::shell::ast::{Command, ParsedInput, Separator, SingleInput};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("unbalanced parentheses")]
    UnbalancedParens,
    #[error("cannot mix '{0}' and '{1}' at the same level; use parentheses to group")]
    MixedSeparators(char, char),
    #[error("empty command between separators")]
    EmptyCommand,
}

/// Parse one line into a [`ParsedInput`] tree. Subshell bodies are captured
/// as raw text and re-parsed lazily (by calling this function again) only
/// when the executor actually dispatches that branch.
pub fn parse(line: &str) -> Result<ParsedInput, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    check_balanced(trimmed)?;

    match find_top_separator(trimmed)? {
        Some(';') => {
            let inputs = split_depth0(trimmed, ';')
                .into_iter()
                .map(parse_chain_item)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ParsedInput {
                separator: Separator::Seq,
                inputs,
            })
        }
        Some('&') => {
            let inputs = split_depth0(trimmed, '&')
                .into_iter()
                .map(parse_chain_item)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ParsedInput {
                separator: Separator::Para,
                inputs,
            })
        }
        Some('|') => {
            let inputs = split_depth0(trimmed, '|')
                .into_iter()
                .map(parse_pipe_stage)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ParsedInput {
                separator: Separator::Pipe,
                inputs,
            })
        }
        Some(other) => unreachable!("find_top_separator only returns |, ;, & but got {other:?}"),
        None => Ok(ParsedInput::single(parse_chain_item(trimmed)?)),
    }
}

/// Parse one `;`/`&`-delimited item: a plain command, or (since `|` binds
/// tighter than `;`/`&`) a pure-command pipeline, or a bare subshell.
fn parse_chain_item(segment: &str) -> Result<SingleInput, ParseError> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Err(ParseError::EmptyCommand);
    }

    if let Some(inner) = wholly_parenthesized(segment) {
        return Ok(SingleInput::Subshell(inner.to_string()));
    }

    let stages = split_depth0(segment, '|');
    if stages.len() > 1 {
        let commands = stages
            .into_iter()
            .map(|s| parse_command(s.trim()))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(SingleInput::Pipeline(commands));
    }

    Ok(SingleInput::Command(parse_command(segment)?))
}

/// Parse one stage of a *top-level* pipeline, which (unlike a nested
/// pipeline under `;`/`&`) may itself be a subshell.
fn parse_pipe_stage(segment: &str) -> Result<SingleInput, ParseError> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Err(ParseError::EmptyCommand);
    }
    if let Some(inner) = wholly_parenthesized(segment) {
        return Ok(SingleInput::Subshell(inner.to_string()));
    }
    Ok(SingleInput::Command(parse_command(segment)?))
}

fn parse_command(segment: &str) -> Result<Command, ParseError> {
    let mut words = segment.split_whitespace().map(str::to_string);
    let program = words.next().ok_or(ParseError::EmptyCommand)?;
    Ok(Command {
        program,
        args: words.collect(),
    })
}

/// If `s` is a single parenthesized group spanning the whole string (the
/// first `(` matches the last `)`), return the text between them.
fn wholly_parenthesized(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'(') || bytes.last() != Some(&b')') {
        return None;
    }
    let mut depth = 0i32;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                // The opening paren closed before the final character —
                // this is not one group spanning the whole string.
                if depth == 0 && i != s.len() - 1 {
                    return None;
                }
            }
            _ => {}
        }
    }
    Some(&s[1..s.len() - 1])
}

/// Scan depth-0 characters (outside any `(...)` group) and report which
/// separator character appears, erroring if more than one kind is mixed.
fn find_top_separator(s: &str) -> Result<Option<char>, ParseError> {
    let mut depth = 0i32;
    let mut found: Option<char> = None;
    for ch in s.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            '|' | ';' | '&' if depth == 0 => match found {
                None => found = Some(ch),
                Some(prev) if prev == ch => {}
                Some(prev) => return Err(ParseError::MixedSeparators(prev, ch)),
            },
            _ => {}
        }
    }
    Ok(found)
}

/// Split `s` on every depth-0 occurrence of `sep`, trimming each piece.
fn split_depth0(s: &str, sep: char) -> Vec<String> {
    let mut depth = 0i32;
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in s.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            c if c == sep && depth == 0 => {
                pieces.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    pieces.push(current);
    pieces
        .into_iter()
        .map(|p| p.trim().to_string())
        .collect()
}

fn check_balanced(s: &str) -> Result<(), ParseError> {
    let mut depth = 0i32;
    for ch in s.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(ParseError::UnbalancedParens);
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ParseError::UnbalancedParens);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_command() {
        let input = parse("echo hi").unwrap();
        assert_eq!(input.separator, Separator::None);
        assert_eq!(
            input.inputs,
            vec![SingleInput::Command(Command {
                program: "echo".into(),
                args: vec!["hi".into()],
            })]
        );
    }

    #[test]
    fn pipe_separator() {
        let input = parse("echo a | tr a b").unwrap();
        assert_eq!(input.separator, Separator::Pipe);
        assert_eq!(input.inputs.len(), 2);
    }

    #[test]
    fn seq_separator() {
        let input = parse("echo x ; echo y").unwrap();
        assert_eq!(input.separator, Separator::Seq);
        assert_eq!(input.inputs.len(), 2);
    }

    #[test]
    fn para_separator() {
        let input = parse("cmd1 & cmd2 & cmd3").unwrap();
        assert_eq!(input.separator, Separator::Para);
        assert_eq!(input.inputs.len(), 3);
    }

    #[test]
    fn nested_pipeline_under_seq() {
        let input = parse("a | b ; c").unwrap();
        assert_eq!(input.separator, Separator::Seq);
        match &input.inputs[0] {
            SingleInput::Pipeline(cmds) => assert_eq!(cmds.len(), 2),
            other => panic!("expected pipeline, got {other:?}"),
        }
    }

    #[test]
    fn subshell_alone() {
        let input = parse("(echo 1 ; echo 2)").unwrap();
        assert_eq!(input.separator, Separator::None);
        match &input.inputs[0] {
            SingleInput::Subshell(body) => assert_eq!(body, "echo 1 ; echo 2"),
            other => panic!("expected subshell, got {other:?}"),
        }
    }

    #[test]
    fn subshell_piped_to_command() {
        let input = parse("(echo 1 ; echo 2) | wc -l").unwrap();
        assert_eq!(input.separator, Separator::Pipe);
        assert_eq!(input.inputs.len(), 2);
        assert!(matches!(input.inputs[0], SingleInput::Subshell(_)));
        assert!(matches!(input.inputs[1], SingleInput::Command(_)));
    }

    #[test]
    fn broadcast_subshell_group() {
        let input = parse("(cat & cat)").unwrap();
        match &input.inputs[0] {
            SingleInput::Subshell(body) => {
                let inner = parse(body).unwrap();
                assert_eq!(inner.separator, Separator::Para);
                assert_eq!(inner.inputs.len(), 2);
            }
            other => panic!("expected subshell, got {other:?}"),
        }
    }

    #[test]
    fn mixed_separators_at_same_level_is_error() {
        assert!(matches!(
            parse("a ; b & c"),
            Err(ParseError::MixedSeparators(';', '&'))
        ));
    }

    #[test]
    fn unbalanced_parens_is_error() {
        assert_eq!(parse("(echo hi"), Err(ParseError::UnbalancedParens));
        assert_eq!(parse("echo hi)"), Err(ParseError::UnbalancedParens));
    }

    #[test]
    fn empty_input_is_error() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("   "), Err(ParseError::Empty));
    }

    #[test]
    fn two_adjacent_subshells_split_on_pipe() {
        let input = parse("(a;b)|(c)").unwrap();
        assert_eq!(input.separator, Separator::Pipe);
        assert_eq!(input.inputs.len(), 2);
    }
}
