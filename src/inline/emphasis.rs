//! Emphasis, strong emphasis and strikethrough.
//!
//! Delimiter runs are classified by flanking rules when scanned, then
//! matched with the CommonMark delimiter-stack algorithm, including the
//! rule of three. Lower bounds for failed opener searches are kept per
//! (character, can-open, length mod 3) class.

use crate::node::Node;

use super::{Piece, pieces_to_nodes};

/// A delimiter run still on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delim {
    pub ch: u8,
    /// Characters not yet consumed by a match.
    pub count: usize,
    /// Run length as scanned; the rule of three uses this.
    pub orig: usize,
    pub can_open: bool,
    pub can_close: bool,
}

/// Classify the run `text[start..end]` of `ch`.
pub fn classify(text: &str, start: usize, end: usize, ch: u8) -> Delim {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();

    let ws_before = before.is_none_or(char::is_whitespace);
    let ws_after = after.is_none_or(char::is_whitespace);
    let punct_before = before.is_some_and(is_punctuation);
    let punct_after = after.is_some_and(is_punctuation);

    let left_flanking = !ws_after && (!punct_after || ws_before || punct_before);
    let right_flanking = !ws_before && (!punct_before || ws_after || punct_after);

    let (can_open, can_close) = if ch == b'_' {
        (
            left_flanking && (!right_flanking || punct_before),
            right_flanking && (!left_flanking || punct_after),
        )
    } else {
        (left_flanking, right_flanking)
    };

    Delim {
        ch,
        count: end - start,
        orig: end - start,
        can_open,
        can_close,
    }
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || (!c.is_ascii() && !c.is_alphanumeric() && !c.is_whitespace())
}

fn class_index(delim: &Delim) -> usize {
    let ch = match delim.ch {
        b'*' => 0,
        b'_' => 1,
        _ => 2,
    };
    (ch * 2 + usize::from(delim.can_open)) * 3 + delim.orig % 3
}

fn delim_at(pieces: &[Piece], index: usize) -> Delim {
    match pieces[index] {
        Piece::Delim(delim) => delim,
        _ => Delim {
            ch: 0,
            count: 0,
            orig: 0,
            can_open: false,
            can_close: false,
        },
    }
}

fn set_count(pieces: &mut [Piece], index: usize, count: usize) {
    if let Piece::Delim(delim) = &mut pieces[index] {
        delim.count = count;
    }
}

fn can_match(opener: &Delim, closer: &Delim) -> bool {
    if opener.ch != closer.ch || !opener.can_open {
        return false;
    }
    if opener.ch == b'~' {
        return opener.count == closer.count && opener.count <= 2;
    }
    if (opener.can_close || closer.can_open)
        && (opener.orig + closer.orig) % 3 == 0
        && !(opener.orig % 3 == 0 && closer.orig % 3 == 0)
    {
        return false;
    }
    true
}

/// Match delimiters at or above `bottom` in the stack, wrapping matched
/// ranges of pieces into emphasis nodes. Leaves `delims` truncated to
/// `bottom`; unmatched runs stay in `pieces` as literal text.
pub(super) fn process_emphasis(pieces: &mut Vec<Piece>, delims: &mut Vec<usize>, bottom: usize) {
    let mut openers_bottom = [bottom; 18];
    let mut c = bottom;
    while c < delims.len() {
        let closer = delim_at(pieces, delims[c]);
        if !closer.can_close {
            c += 1;
            continue;
        }

        let class = class_index(&closer);
        let floor = openers_bottom[class].max(bottom);
        let found = (floor..c)
            .rev()
            .find(|&o| can_match(&delim_at(pieces, delims[o]), &closer));

        let Some(o) = found else {
            openers_bottom[class] = c;
            if closer.can_open {
                c += 1;
            } else {
                delims.remove(c);
                shift_bounds_after_remove(&mut openers_bottom, c, 1);
            }
            continue;
        };

        let opener_piece = delims[o];
        let closer_piece = delims[c];
        let opener = delim_at(pieces, opener_piece);
        let used = if closer.ch == b'~' {
            closer.count
        } else if opener.count >= 2 && closer.count >= 2 {
            2
        } else {
            1
        };

        let inner: Vec<Piece> = pieces.drain(opener_piece + 1..closer_piece).collect();
        let removed = inner.len();
        let children = pieces_to_nodes(inner);
        let node = match (closer.ch, used) {
            (b'~', _) => Node::Delete { children },
            (_, 2) => Node::Strong { children },
            _ => Node::Emphasis { children },
        };
        pieces.insert(opener_piece + 1, Piece::Node(node));

        // Delimiters between the pair are now inside the node.
        let between = c - o - 1;
        delims.drain(o + 1..c);
        shift_bounds_after_remove(&mut openers_bottom, o + 1, between);
        c = o + 1;
        for index in &mut delims[c..] {
            *index = *index + 1 - removed;
        }

        set_count(pieces, opener_piece, opener.count - used);
        set_count(pieces, delims[c], closer.count - used);
        if opener.count == used {
            delims.remove(o);
            shift_bounds_after_remove(&mut openers_bottom, o, 1);
            c -= 1;
        }
        if closer.count == used {
            delims.remove(c);
            shift_bounds_after_remove(&mut openers_bottom, c, 1);
        }
    }
    delims.truncate(bottom);
}

/// Keep stored search floors valid after `count` stack entries starting at
/// `at` were removed.
fn shift_bounds_after_remove(bounds: &mut [usize; 18], at: usize, count: usize) {
    for bound in bounds.iter_mut() {
        if *bound >= at + count {
            *bound -= count;
        } else if *bound > at {
            *bound = at;
        }
    }
}
