//! Hand-rolled recursive-descent parser for HexiDirect source text.
//!
//! Mirrors the character-at-a-time style used throughout the rest of the
//! rule-string family: a `Cursor` walks the text one `char` at a time,
//! `peek`-ing before it commits to consuming anything.

use crate::ast::{
    AbstractRule, Alternative, BracketGroup, Orient, SourceDirection, Target, TargetDirectiveSpec,
};
use crate::cell::State;
use crate::error::{ParseError, ParseErrorKind};
use crate::geometry::Direction;
use crate::presets::expand_presets;

type PResult<T> = Result<T, (usize, ParseErrorKind)>;

/// A byte-indexed walker over a single rule's text, skipping insignificant
/// whitespace between tokens as it goes (see `skip_ws`).
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Cursor { text, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Advances past a run of insignificant whitespace between tokens.
    /// Never called mid-token (see `parse_state`), so whitespace inside an
    /// identifier is never silently absorbed — it just terminates the
    /// token's run and is left for the next call site to trip over.
    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn expect(&mut self, c: char) -> PResult<()> {
        self.skip_ws();
        match self.peek() {
            Some(found) if found == c => {
                self.bump();
                Ok(())
            }
            Some(_) | None => Err((self.pos, ParseErrorKind::Missing(c))),
        }
    }

    /// Consumes a maximal run of `[a-z0-9_]`, requiring it start with a
    /// lowercase letter or be exactly `_`. Digits are folded into the
    /// candidate run (and rejected) rather than left for a trailing
    /// direction digit — see DESIGN.md on the `a3` negative test.
    fn parse_state(&mut self) -> PResult<State> {
        self.skip_ws();
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_lowercase() || c == '_' => {
                self.bump();
            }
            Some(c) => return Err((self.pos, ParseErrorKind::Unexpected(c))),
            None => return Err((self.pos, ParseErrorKind::Unexpected('\0'))),
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_lowercase() || c == '_' || c.is_ascii_digit() {
                self.bump();
            } else {
                break;
            }
        }
        let run = &self.text[start..self.pos];
        State::parse(run).map_err(|kind| (start, kind))
    }

    /// Consumes a single digit `1..=6` as a direction.
    fn parse_direction(&mut self) -> PResult<Direction> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_digit() => {
                self.bump();
                let n = c.to_digit(10).unwrap();
                Direction::new(n).ok_or((start, ParseErrorKind::BadDirection(n)))
            }
            Some(c) => Err((start, ParseErrorKind::Unexpected(c))),
            None => Err((start, ParseErrorKind::MissingNumber)),
        }
    }

    /// Consumes a run of decimal digits as an unsigned integer.
    fn parse_uint(&mut self) -> PResult<u32> {
        let start = self.pos;
        let mut n: u32 = 0;
        let mut any = false;
        while let Some(c) = self.peek() {
            if let Some(d) = c.to_digit(10) {
                self.bump();
                any = true;
                n = n.saturating_mul(10).saturating_add(d);
            } else {
                break;
            }
        }
        if any {
            Ok(n)
        } else {
            Err((start, ParseErrorKind::MissingNumber))
        }
    }

    fn parse_orient(&mut self) -> PResult<Orient> {
        self.skip_ws();
        match self.peek() {
            Some('.') => {
                self.bump();
                Ok(Orient::PointingToCenter)
            }
            Some('%') => {
                self.bump();
                Ok(Orient::AnyDirection)
            }
            Some(c) if c.is_ascii_digit() => Ok(Orient::Fixed(self.parse_direction()?)),
            _ => Ok(Orient::Any),
        }
    }

    /// `alt = [ "-" ] [ direction ] state [ orient ] ;`
    fn parse_alternative(&mut self) -> PResult<Alternative> {
        self.skip_ws();
        let negated = if self.peek() == Some('-') {
            self.bump();
            true
        } else {
            false
        };
        self.skip_ws();
        let neg_pos = self.pos;
        let position = match self.peek() {
            Some(c) if c.is_ascii_digit() => Some(self.parse_direction()?),
            _ => None,
        };
        if negated && position.is_none() {
            return Err((neg_pos, ParseErrorKind::NegationWithoutPosition));
        }
        let state = self.parse_state()?;
        let orient = self.parse_orient()?;
        Ok(Alternative {
            position,
            negated,
            state,
            orient,
        })
    }

    /// `bracket = "[" alt { "|" alt } "]" [ integer ] ;`
    fn parse_bracket(&mut self) -> PResult<BracketGroup> {
        self.expect('[')?;
        let mut alternatives = vec![self.parse_alternative()?];
        self.skip_ws();
        while self.peek() == Some('|') {
            self.bump();
            alternatives.push(self.parse_alternative()?);
            self.skip_ws();
        }
        self.expect(']')?;
        self.skip_ws();
        let repeat = if matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.parse_uint()?
        } else {
            1
        };
        if !(1..=6).contains(&repeat) {
            return Err((self.pos, ParseErrorKind::BadRepeatCount(repeat)));
        }
        Ok(BracketGroup {
            alternatives,
            repeat,
        })
    }

    /// `source = state [ "%" | direction ] { bracket } ;`
    fn parse_source(&mut self) -> PResult<(State, SourceDirection, Vec<BracketGroup>)> {
        let state = self.parse_state()?;
        self.skip_ws();
        let direction = match self.peek() {
            Some('%') => {
                self.bump();
                SourceDirection::Any
            }
            Some(c) if c.is_ascii_digit() => SourceDirection::Fixed(self.parse_direction()?),
            _ => SourceDirection::None,
        };
        let mut groups = Vec::new();
        self.skip_ws();
        while self.peek() == Some('[') {
            groups.push(self.parse_bracket()?);
            self.skip_ws();
        }
        Ok((state, direction, groups))
    }

    /// `target = state [ "%" [ integer ] | direction ] ;`
    ///
    /// Extends the published grammar with the `.` [integer] form needed for
    /// `z.K` pointing-transfer targets (see `TargetDirectiveSpec::PointTransfer`
    /// and the DESIGN.md note on this grammar gap).
    fn parse_target(&mut self) -> PResult<Target> {
        let state = self.parse_state()?;
        self.skip_ws();
        let directive = match self.peek() {
            Some('%') => {
                self.bump();
                self.skip_ws();
                let n = if matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.parse_uint()?
                } else {
                    0
                };
                if !(0..=5).contains(&n) {
                    return Err((self.pos, ParseErrorKind::BadRotation(n)));
                }
                TargetDirectiveSpec::Rotate(n)
            }
            Some('.') => {
                self.bump();
                self.skip_ws();
                let n = if matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.parse_uint()?
                } else {
                    0
                };
                if !(0..=5).contains(&n) {
                    return Err((self.pos, ParseErrorKind::BadRotation(n)));
                }
                TargetDirectiveSpec::PointTransfer(n)
            }
            Some(c) if c.is_ascii_digit() => {
                TargetDirectiveSpec::Fixed(self.parse_direction()?)
            }
            _ => TargetDirectiveSpec::None,
        };
        Ok(Target { state, directive })
    }
}

/// Finds the byte offset of the first depth-0 occurrence of `needle`
/// (bracket nesting tracked via `[`/`]`), or `None`.
fn find_top_level(text: &str, needle: &str) -> Option<usize> {
    let mut depth = 0i32;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'[' => depth += 1,
            b']' => depth -= 1,
            _ if depth == 0 && text[i..].starts_with(needle) => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Splits `text` on `sep` at bracket-depth 0.
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Parses one rule's `source => target` text into an `AbstractRule` with
/// `group_id` left at 0 — the caller fills it in. Whitespace between tokens
/// is skipped token-by-token as the cursor walks the text (see
/// `Cursor::skip_ws`); it is never stripped up front, so whitespace landing
/// inside a state identifier still terminates that identifier's run and
/// surfaces as leftover, unparseable text.
fn parse_one_rule(text: &str) -> Result<AbstractRule, (usize, ParseErrorKind)> {
    let arrow = find_top_level(text, "=>").ok_or_else(|| {
        let eq = text.find('=');
        match eq {
            Some(i) => (i + 1, ParseErrorKind::Missing('>')),
            None => (text.len(), ParseErrorKind::Missing('=')),
        }
    })?;
    let (head, rest) = (&text[..arrow], &text[arrow + 2..]);
    let mut src_cursor = Cursor::new(head);
    let (src_state, src_direction, groups) = src_cursor.parse_source()?;
    src_cursor.skip_ws();
    if !src_cursor.eof() {
        return Err((src_cursor.pos, ParseErrorKind::ExtraJunk));
    }
    let mut tgt_cursor = Cursor::new(rest);
    let target = tgt_cursor.parse_target()?;
    tgt_cursor.skip_ws();
    if !tgt_cursor.eof() {
        return Err((tgt_cursor.pos, ParseErrorKind::ExtraJunk));
    }
    Ok(AbstractRule {
        src_state,
        src_direction,
        groups,
        target,
        group_id: 0,
    })
}

/// Parses a full HexiDirect source text (after preset substitution) into
/// abstract rules. A top-level `;` or newline terminates a rule; a `#`
/// starting a line marks a comment; a top-level `|` before `=>` splits a
/// rule's source into siblings that share one group id (see DESIGN.md).
///
/// Whitespace is never stripped up front: each rule's text is handed to the
/// cursor-based parser as written, which skips whitespace *between* tokens
/// but not in the middle of one (`spec.md` §4.3 forbids whitespace inside a
/// state identifier).
pub fn parse_ruleset(source: &str) -> Result<Vec<AbstractRule>, ParseError> {
    let source = expand_presets(source);
    let mut rules = Vec::new();
    let mut group_id: u32 = 0;

    for (rule_index, raw_line) in split_lines(&source).into_iter().enumerate() {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let arrow = find_top_level(trimmed, "=>").ok_or_else(|| ParseError {
            rule_index,
            offset: 0,
            kind: ParseErrorKind::Missing('='),
        })?;
        let head = &trimmed[..arrow];
        let tail = &trimmed[arrow..];
        let sources = split_top_level(head, '|');
        for source_part in sources {
            let full = format!("{}{}", source_part, tail);
            let rule = parse_one_rule(&full).map_err(|(offset, kind)| ParseError {
                rule_index,
                offset,
                kind,
            })?;
            rules.push(AbstractRule { group_id, ..rule });
        }
        group_id += 1;
    }
    Ok(rules)
}

/// Splits source text into rule-lines on top-level `\n`, then further on
/// top-level `;` within each physical line — except a line that is a
/// comment (starts with `#`, ignoring leading whitespace) is kept whole, so
/// a `;` inside a comment never gets mistaken for a rule separator and
/// splits off a trailing fragment that isn't itself marked as a comment.
fn split_lines(source: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    for nl_part in split_top_level(source, '\n') {
        if nl_part.trim_start().starts_with('#') {
            lines.push(nl_part);
        } else {
            for part in split_top_level(nl_part, ';') {
                lines.push(part);
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SourceDirection;

    #[test]
    fn parses_simple_rule() {
        let rules = parse_ruleset("_[t.] => a").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].group_id, 0);
        assert_eq!(rules[0].src_state, State::Empty);
        assert_eq!(rules[0].src_direction, SourceDirection::None);
        assert_eq!(rules[0].groups.len(), 1);
    }

    #[test]
    fn comment_and_blank_lines_ignored() {
        let rules = parse_ruleset("# comment\n\na% => a%\n").unwrap();
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn semicolon_terminates_rules() {
        let rules = parse_ruleset("a% => a%; b% => b%1").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].group_id, 0);
        assert_eq!(rules[1].group_id, 1);
    }

    #[test]
    fn top_level_pipe_shares_group_id() {
        let rules = parse_ruleset("a[_|a][_]5 | a[a]4[_|a][_|a] => _").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].group_id, 0);
        assert_eq!(rules[1].group_id, 0);
    }

    #[test]
    fn rejects_digit_in_state() {
        let err = parse_ruleset("a3 => b").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::DigitInState);
    }

    #[test]
    fn rejects_negation_without_position() {
        let err = parse_ruleset("a[-b] => c").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NegationWithoutPosition);
    }

    #[test]
    fn rejects_bad_repeat_count() {
        let err = parse_ruleset("a[x]7 => b").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::BadRepeatCount(7));
    }

    #[test]
    fn rejects_bad_rotation() {
        let err = parse_ruleset("a => b%9").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::BadRotation(9));
    }

    #[test]
    fn whitespace_around_tokens_is_insignificant() {
        let rules = parse_ruleset("  a % => a % 1  ").unwrap();
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn whitespace_inside_a_state_identifier_is_rejected() {
        let err = parse_ruleset("ab cd => e").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExtraJunk);
    }

    #[test]
    fn whitespace_between_a_state_and_a_trailing_direction_digit_is_fine() {
        let rules = parse_ruleset("a 3 => b").unwrap();
        assert_eq!(rules[0].src_direction, SourceDirection::Fixed(Direction::new(3).unwrap()));
    }

    #[test]
    fn a_comment_line_containing_a_semicolon_is_ignored_whole() {
        let rules = parse_ruleset("# enable a; then step\nx => y").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].src_state, State::Named("x".into()));
    }
}
