use std::collections::HashSet;

use crate::regex::ast::{Compiled, Token};
use crate::regex::error::CompileError;

// ^ and $ only anchor at the very start/end of the whole pattern; inside
// groups or alternatives they're always literals, so anchor detection
// happens once here and threads through recursive calls as allow_anchors.
pub fn compile(pattern: &str) -> Result<Compiled, CompileError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut group_counter = 0usize;
    let tokens = compile_tokens(&chars, &mut group_counter, true)?;
    Ok(Compiled {
        tokens,
        group_count: group_counter,
    })
}

fn compile_tokens(
    chars: &[char],
    group_counter: &mut usize,
    allow_anchors: bool,
) -> Result<Vec<Token>, CompileError> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                i += 1;
                if i >= chars.len() {
                    tokens.push(Token::Literal('\\'));
                    break;
                }
                let escaped = chars[i];
                if escaped == 'd' {
                    tokens.push(Token::Digit);
                    i += 1;
                } else if escaped == 'w' {
                    tokens.push(Token::Word);
                    i += 1;
                } else if escaped.is_ascii_digit() {
                    let mut j = i;
                    let mut digits = String::new();
                    while j < chars.len() && chars[j].is_ascii_digit() {
                        digits.push(chars[j]);
                        j += 1;
                    }
                    let id: usize = digits.parse().expect("non-empty ascii digit run");
                    tokens.push(Token::Backref(id));
                    i = j;
                } else {
                    tokens.push(Token::Literal(escaped));
                    i += 1;
                }
            }
            '.' => {
                tokens.push(Token::Any);
                i += 1;
            }
            '[' => {
                i += 1;
                let negate = i < chars.len() && chars[i] == '^';
                if negate {
                    i += 1;
                }
                let mut set: HashSet<char> = HashSet::new();
                let mut closed = false;
                while i < chars.len() {
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        set.insert(chars[i + 1]);
                        i += 2;
                        continue;
                    }
                    if chars[i] == ']' {
                        closed = true;
                        i += 1;
                        break;
                    }
                    set.insert(chars[i]);
                    i += 1;
                }
                if !closed {
                    return Err(CompileError::UnclosedClass);
                }
                tokens.push(if negate {
                    Token::NegClass(set)
                } else {
                    Token::PosClass(set)
                });
            }
            '(' => {
                *group_counter += 1;
                let id = *group_counter;
                let end = find_group_end(chars, i).ok_or(CompileError::UnclosedGroup)?;
                let body = &chars[i + 1..end];
                i = end + 1;

                let alternatives = split_top_level_alternatives(body);
                tokens.push(Token::CaptureStart(id));
                if alternatives.len() == 1 {
                    let inner = compile_tokens(&alternatives[0], group_counter, false)?;
                    tokens.extend(inner);
                } else {
                    let mut branches = Vec::with_capacity(alternatives.len());
                    for alt in &alternatives {
                        branches.push(compile_tokens(alt, group_counter, false)?);
                    }
                    tokens.push(Token::Alternation(branches));
                }
                tokens.push(Token::CaptureEnd(id));
            }
            '^' => {
                if allow_anchors && i == 0 {
                    tokens.push(Token::StartAnchor);
                } else {
                    tokens.push(Token::Literal('^'));
                }
                i += 1;
            }
            '$' => {
                if allow_anchors && i == chars.len() - 1 {
                    tokens.push(Token::EndAnchor);
                } else {
                    tokens.push(Token::Literal('$'));
                }
                i += 1;
            }
            '+' | '?' | '*' => {
                let wrapped = match tokens.last() {
                    Some(prev) if prev.is_quantifiable() => {
                        let base = tokens.pop().expect("checked Some above");
                        Some(match c {
                            '+' => Token::OneOrMore(Box::new(base)),
                            '?' => Token::ZeroOrOne(Box::new(base)),
                            '*' => Token::ZeroOrMore(Box::new(base)),
                            _ => unreachable!(),
                        })
                    }
                    _ => None,
                };
                tokens.push(wrapped.unwrap_or(Token::Literal(c)));
                i += 1;
            }
            other => {
                tokens.push(Token::Literal(other));
                i += 1;
            }
        }
    }

    Ok(tokens)
}

fn find_unescaped(chars: &[char], start: usize, target: char) -> Option<usize> {
    let mut j = start;
    while j < chars.len() {
        if chars[j] == '\\' && j + 1 < chars.len() {
            j += 2;
            continue;
        }
        if chars[j] == target {
            return Some(j);
        }
        j += 1;
    }
    None
}

// skips over bracketed classes so a ')' inside [...] never closes the
// group prematurely
fn find_group_end(chars: &[char], open_idx: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut j = open_idx + 1;
    while j < chars.len() {
        match chars[j] {
            '\\' if j + 1 < chars.len() => j += 2,
            '[' => match find_unescaped(chars, j + 1, ']') {
                Some(close) => j = close + 1,
                None => return None,
            },
            '(' => {
                depth += 1;
                j += 1;
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
                j += 1;
            }
            _ => j += 1,
        }
    }
    None
}

// skips '|' inside nested parens, a bracketed class, or an escape
fn split_top_level_alternatives(body: &[char]) -> Vec<Vec<char>> {
    let mut parts = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;
    let mut j = 0usize;

    while j < body.len() {
        match body[j] {
            '\\' if j + 1 < body.len() => {
                current.push(body[j]);
                current.push(body[j + 1]);
                j += 2;
            }
            '[' => match find_unescaped(body, j + 1, ']') {
                Some(close) => {
                    current.extend_from_slice(&body[j..=close]);
                    j = close + 1;
                }
                None => {
                    current.push(body[j]);
                    j += 1;
                }
            },
            '(' => {
                depth += 1;
                current.push(body[j]);
                j += 1;
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(body[j]);
                j += 1;
            }
            '|' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
                j += 1;
            }
            c => {
                current.push(c);
                j += 1;
            }
        }
    }
    parts.push(current);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_count(pattern: &str) -> usize {
        compile(pattern).unwrap().group_count
    }

    #[test]
    fn literal_characters_compile_as_is() {
        let compiled = compile("abc").unwrap();
        assert_eq!(
            compiled.tokens,
            vec![Token::Literal('a'), Token::Literal('b'), Token::Literal('c')]
        );
    }

    #[test]
    fn digit_and_word_shorthands() {
        let compiled = compile(r"\d\w").unwrap();
        assert_eq!(compiled.tokens, vec![Token::Digit, Token::Word]);
    }

    #[test]
    fn backref_consumes_maximal_digit_run() {
        let compiled = compile(r"\12").unwrap();
        assert_eq!(compiled.tokens, vec![Token::Backref(12)]);
    }

    #[test]
    fn escaped_metacharacter_is_a_literal() {
        let compiled = compile(r"\.").unwrap();
        assert_eq!(compiled.tokens, vec![Token::Literal('.')]);
    }

    #[test]
    fn bracket_class_is_literal_and_deduplicated() {
        let compiled = compile("[aab]").unwrap();
        match &compiled.tokens[..] {
            [Token::PosClass(set)] => {
                assert_eq!(set.len(), 2);
                assert!(set.contains(&'a'));
                assert!(set.contains(&'b'));
            }
            other => panic!("unexpected tokens: {other:?}"),
        }
    }

    #[test]
    fn negated_bracket_class() {
        let compiled = compile("[^abc]").unwrap();
        assert!(matches!(&compiled.tokens[..], [Token::NegClass(_)]));
    }

    #[test]
    fn unclosed_bracket_class_is_malformed() {
        assert_eq!(compile("[abc").unwrap_err(), CompileError::UnclosedClass);
    }

    #[test]
    fn unclosed_group_is_malformed() {
        assert_eq!(compile("(abc").unwrap_err(), CompileError::UnclosedGroup);
    }

    #[test]
    fn start_anchor_only_at_pattern_start() {
        let compiled = compile("^abc").unwrap();
        assert_eq!(compiled.tokens[0], Token::StartAnchor);

        let compiled = compile("a^bc").unwrap();
        assert!(compiled.tokens.contains(&Token::Literal('^')));
        assert!(!compiled.tokens.contains(&Token::StartAnchor));
    }

    #[test]
    fn end_anchor_only_at_pattern_end() {
        let compiled = compile("abc$").unwrap();
        assert_eq!(*compiled.tokens.last().unwrap(), Token::EndAnchor);

        let compiled = compile("a$bc").unwrap();
        assert!(compiled.tokens.contains(&Token::Literal('$')));
        assert!(!compiled.tokens.contains(&Token::EndAnchor));
    }

    #[test]
    fn anchors_inside_groups_are_always_literal() {
        let compiled = compile("(^a)").unwrap();
        assert!(compiled.tokens.contains(&Token::Literal('^')));
        assert!(!compiled.tokens.contains(&Token::StartAnchor));

        let compiled = compile("(a$)").unwrap();
        assert!(compiled.tokens.contains(&Token::Literal('$')));
        assert!(!compiled.tokens.contains(&Token::EndAnchor));
    }

    #[test]
    fn quantifier_at_start_of_pattern_is_literal_not_error() {
        for pattern in ["+abc", "?abc", "*abc"] {
            let compiled = compile(pattern).unwrap();
            assert_eq!(
                compiled.tokens[0],
                Token::Literal(pattern.chars().next().unwrap())
            );
        }
    }

    #[test]
    fn quantifiers_wrap_the_preceding_atom() {
        let compiled = compile("a+").unwrap();
        assert_eq!(
            compiled.tokens,
            vec![Token::OneOrMore(Box::new(Token::Literal('a')))]
        );

        let compiled = compile("a?").unwrap();
        assert_eq!(
            compiled.tokens,
            vec![Token::ZeroOrOne(Box::new(Token::Literal('a')))]
        );

        let compiled = compile("a*").unwrap();
        assert_eq!(
            compiled.tokens,
            vec![Token::ZeroOrMore(Box::new(Token::Literal('a')))]
        );
    }

    #[test]
    fn single_alternative_group_inlines_its_tokens() {
        let compiled = compile("(ab)").unwrap();
        assert_eq!(
            compiled.tokens,
            vec![
                Token::CaptureStart(1),
                Token::Literal('a'),
                Token::Literal('b'),
                Token::CaptureEnd(1),
            ]
        );
    }

    #[test]
    fn multi_alternative_group_emits_alternation() {
        let compiled = compile("(cat|dog)").unwrap();
        assert!(matches!(
            compiled.tokens[1],
            Token::Alternation(ref branches) if branches.len() == 2
        ));
    }

    #[test]
    fn group_ids_are_dense_and_left_to_right_including_nested() {
        let compiled = compile("((a)(b))").unwrap();
        assert_eq!(compiled.group_count, 3);
        assert_eq!(compiled.tokens[0], Token::CaptureStart(1));
    }

    #[test]
    fn group_counter_threads_through_nested_alternations() {
        assert_eq!(group_count("((a|b)(c|d))"), 3);
    }

    #[test]
    fn quantifier_after_a_closed_group_is_a_literal_not_a_wrapped_group() {
        let compiled = compile("(ab)+").unwrap();
        assert_eq!(
            compiled.tokens,
            vec![
                Token::CaptureStart(1),
                Token::Literal('a'),
                Token::Literal('b'),
                Token::CaptureEnd(1),
                Token::Literal('+'),
            ]
        );
    }
}
