use crate::model::Key;

/// Physical US-QWERTY rows, unshifted, top to bottom.
pub const ROWS: [&str; 4] = ["1234567890-=", "qwertyuiop[]\\", "asdfghjkl;'", "zxcvbnm,./"];

pub const HOME_ROW: &str = "asdfghjkl;";
pub const ALPHABET: &str = "qwertyuiopasdfghjklzxcvbnm";

const LEFT_HAND_LETTERS: &str = "qwertasdfgzxcvb";
const RIGHT_HAND_LETTERS: &str = "yuiophjklnm";

// Columns 0..5 of every row are struck by the left hand.
const HAND_SPLIT_COLUMN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
    Unknown,
}

impl Hand {
    /// Letters typed by this hand. `Unknown` means either hand.
    pub fn letters(self) -> &'static str {
        match self {
            Hand::Left => LEFT_HAND_LETTERS,
            Hand::Right => RIGHT_HAND_LETTERS,
            Hand::Unknown => ALPHABET,
        }
    }
}

/// Map a character of the requested text to the key that produces it.
pub fn key_for_text_char(c: char) -> Key {
    match c {
        ' ' => Key::SPACE,
        '\n' => Key::ENTER,
        '\t' => Key::TAB,
        c => Key::Char(c),
    }
}

fn locate(c: char) -> Option<(usize, usize)> {
    let c = c.to_ascii_lowercase();
    ROWS.iter()
        .enumerate()
        .find_map(|(row, keys)| keys.chars().position(|k| k == c).map(|col| (row, col)))
}

fn neighbors_in_row(row: usize, col: usize, out: &mut Vec<char>) {
    let keys: Vec<char> = ROWS[row].chars().collect();
    let lo = col.saturating_sub(1);
    let hi = (col + 1).min(keys.len().saturating_sub(1));
    if lo > hi {
        return;
    }
    out.extend_from_slice(&keys[lo..=hi]);
}

/// Keys physically next to `c`: horizontal neighbours plus the rows above and
/// below within one column. Unknown keys yield the whole alphabet.
pub fn adjacent(c: char) -> Vec<char> {
    let Some((row, col)) = locate(c) else {
        return ALPHABET.chars().collect();
    };

    let keys: Vec<char> = ROWS[row].chars().collect();
    let mut out = Vec::new();
    if col > 0 {
        out.push(keys[col - 1]);
    }
    if col + 1 < keys.len() {
        out.push(keys[col + 1]);
    }
    if row > 0 {
        neighbors_in_row(row - 1, col, &mut out);
    }
    if row + 1 < ROWS.len() {
        neighbors_in_row(row + 1, col, &mut out);
    }

    out
}

pub fn hand(c: char) -> Hand {
    match locate(c) {
        Some((_, col)) if col < HAND_SPLIT_COLUMN => Hand::Left,
        Some(_) => Hand::Right,
        None => Hand::Unknown,
    }
}
