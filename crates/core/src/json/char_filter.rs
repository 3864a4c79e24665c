pub const CHAR_RANGE: usize = 128;

/// Category of the first byte of a flat-JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    None,
    Number,
    String,
    Bracket,
}

static CHAR_FILTER: [CharClass; CHAR_RANGE] = build_char_filter();

const fn build_char_filter() -> [CharClass; CHAR_RANGE] {
    let mut table = [CharClass::None; CHAR_RANGE];
    let mut c = b'0';
    while c <= b'9' {
        table[c as usize] = CharClass::Number;
        c += 1;
    }
    table[b'-' as usize] = CharClass::Number;
    table[b'"' as usize] = CharClass::String;
    table[b'{' as usize] = CharClass::Bracket;
    table[b'[' as usize] = CharClass::Bracket;
    table
}

pub fn classify(byte: u8) -> CharClass {
    CHAR_FILTER
        .get(byte as usize)
        .copied()
        .unwrap_or(CharClass::None)
}
