use crate::regex::ast::{Compiled, Token};

// cloned before every speculative step so a failed branch can never leak
// its captures into a sibling branch
#[derive(Debug, Clone)]
struct Captures {
    stack: Vec<usize>,
    map: Vec<Option<String>>,
}

impl Captures {
    fn new(group_count: usize) -> Self {
        Captures {
            stack: Vec::new(),
            map: vec![None; group_count],
        }
    }
}

pub fn matches(compiled: &Compiled, input: &str) -> bool {
    if compiled.tokens.is_empty() {
        return false;
    }

    let starts_anchor = matches!(compiled.tokens.first(), Some(Token::StartAnchor));
    let ends_anchor = matches!(compiled.tokens.last(), Some(Token::EndAnchor));

    let mut inner: &[Token] = &compiled.tokens[..];
    if starts_anchor {
        inner = &inner[1..];
    }
    if ends_anchor {
        inner = &inner[..inner.len() - 1];
    }

    let attempt = |start: usize| -> bool {
        match_here(inner, input, start, Captures::new(compiled.group_count), ends_anchor)
    };

    if starts_anchor {
        attempt(0)
    } else {
        (0..=input.len())
            .filter(|&s| input.is_char_boundary(s))
            .any(attempt)
    }
}

fn token_matches(token: &Token, c: char) -> bool {
    match token {
        Token::Literal(l) => c == *l,
        Token::Digit => c.is_ascii_digit(),
        Token::Word => c.is_alphanumeric() || c == '_',
        Token::Any => c != '\n',
        Token::PosClass(set) => set.contains(&c),
        Token::NegClass(set) => !set.contains(&c),
        // Quantifiers, captures, alternation, anchors and back-references
        // never reach single-character matching.
        _ => false,
    }
}

fn match_atom_at(atom: &Token, input: &str, pos: usize) -> Option<usize> {
    let c = input[pos..].chars().next()?;
    if token_matches(atom, c) {
        Some(pos + c.len_utf8())
    } else {
        None
    }
}

// require_end mirrors the pattern's own $ anchor
fn match_here(
    tokens: &[Token],
    input: &str,
    pos: usize,
    captures: Captures,
    require_end: bool,
) -> bool {
    let Some(first) = tokens.first() else {
        return if require_end { pos == input.len() } else { true };
    };
    let rest = &tokens[1..];

    match first {
        Token::Alternation(branches) => {
            for branch in branches {
                let mut spliced = branch.clone();
                spliced.extend_from_slice(rest);
                if match_here(&spliced, input, pos, captures.clone(), require_end) {
                    return true;
                }
            }
            false
        }
        Token::CaptureStart(_) => {
            let mut next = captures.clone();
            next.stack.push(pos);
            match_here(rest, input, pos, next, require_end)
        }
        Token::CaptureEnd(id) => {
            let mut next = captures.clone();
            match next.stack.pop() {
                Some(start_idx) => {
                    if *id >= 1 && *id <= next.map.len() {
                        next.map[*id - 1] = Some(input[start_idx..pos].to_string());
                    }
                    match_here(rest, input, pos, next, require_end)
                }
                // No open capture on this branch: malformed internal state,
                // never reachable from a well-formed compiled pattern.
                None => false,
            }
        }
        Token::Backref(id) => {
            if *id == 0 || *id > captures.map.len() {
                return false;
            }
            // Clone the captured text out before moving `captures` into the
            // recursive call below; matching on a borrow of `captures.map`
            // would otherwise keep it borrowed across that move.
            let captured = captures.map[*id - 1].clone();
            match captured {
                Some(captured) if input[pos..].starts_with(captured.as_str()) => {
                    let next_pos = pos + captured.len();
                    match_here(rest, input, next_pos, captures, require_end)
                }
                _ => false,
            }
        }
        Token::OneOrMore(base) => match_repeated(base, rest, input, pos, captures, require_end, 1),
        Token::ZeroOrMore(base) => {
            match_repeated(base, rest, input, pos, captures, require_end, 0)
        }
        Token::ZeroOrOne(base) => {
            if let Some(next_pos) = match_atom_at(base, input, pos) {
                if match_here(rest, input, next_pos, captures.clone(), require_end) {
                    return true;
                }
            }
            match_here(rest, input, pos, captures, require_end)
        }
        atom => match match_atom_at(atom, input, pos) {
            Some(next_pos) => match_here(rest, input, next_pos, captures, require_end),
            None => false,
        },
    }
}

// consumes the maximal run of base matches, then retries the continuation
// with shorter and shorter runs until one succeeds or min is undercut
fn match_repeated(
    base: &Token,
    rest: &[Token],
    input: &str,
    pos: usize,
    captures: Captures,
    require_end: bool,
    min: usize,
) -> bool {
    let mut positions = vec![pos];
    let mut cursor = pos;
    while let Some(next) = match_atom_at(base, input, cursor) {
        cursor = next;
        positions.push(cursor);
    }

    let max = positions.len() - 1;
    if max < min {
        return false;
    }
    for used in (min..=max).rev() {
        if match_here(rest, input, positions[used], captures.clone(), require_end) {
            return true;
        }
    }
    false
}
