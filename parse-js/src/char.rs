use ahash::HashSet;
use ahash::HashSetExt;
use core::ops::RangeInclusive;
use once_cell::sync::Lazy;

#[derive(Clone)]
pub struct CharFilter {
  chars: HashSet<char>,
}

impl CharFilter {
  pub fn new() -> CharFilter {
    CharFilter {
      chars: HashSet::new(),
    }
  }

  pub fn add_char(&mut self, c: char) {
    self.chars.insert(c);
  }

  pub fn add_chars(&mut self, chars: RangeInclusive<char>) {
    for c in chars {
      self.chars.insert(c);
    }
  }

  pub fn add_chars_from_slice(&mut self, chars: &str) {
    for c in chars.chars() {
      self.chars.insert(c);
    }
  }

  pub fn has(&self, c: char) -> bool {
    self.chars.contains(&c)
  }
}

pub const ECMASCRIPT_LINE_TERMINATORS: [char; 4] = ['\n', '\r', '\u{2028}', '\u{2029}'];

pub const ECMASCRIPT_WHITESPACE: [char; 21] = [
  '\x09', // Horizontal tab
  '\x0b', // Vertical tab
  '\x0c', // Form feed
  '\x20', // Space
  '\u{00A0}', // NO-BREAK SPACE
  '\u{1680}', // OGHAM SPACE MARK
  '\u{2000}', // EN QUAD
  '\u{2001}', // EM QUAD
  '\u{2002}', // EN SPACE
  '\u{2003}', // EM SPACE
  '\u{2004}', // THREE-PER-EM SPACE
  '\u{2005}', // FOUR-PER-EM SPACE
  '\u{2006}', // SIX-PER-EM SPACE
  '\u{2007}', // FIGURE SPACE
  '\u{2008}', // PUNCTUATION SPACE
  '\u{2009}', // THIN SPACE
  '\u{200A}', // HAIR SPACE
  '\u{202F}', // NARROW NO-BREAK SPACE
  '\u{205F}', // MEDIUM MATHEMATICAL SPACE
  '\u{3000}', // IDEOGRAPHIC SPACE
  '\u{FEFF}', // ZERO WIDTH NO-BREAK SPACE (BOM)
];

#[inline]
pub fn is_line_terminator(c: char) -> bool {
  ECMASCRIPT_LINE_TERMINATORS.contains(&c)
}

/// Approximates Unicode ID_Start using the Alphabetic property, which is a superset of the letter categories that make up ID_Start.
pub fn is_id_start(c: char) -> bool {
  if c.is_ascii() {
    return ID_START.has(c);
  };
  c.is_alphabetic()
}

// Nonspacing and spacing marks (Mn, Mc) and connector punctuation (Pc) that aren't Alphabetic. Blocks are listed whole where most of their assigned chars are marks.
const ID_CONTINUE_MARKS: [(char, char); 41] = [
  ('\u{0300}', '\u{036F}'), // Combining Diacritical Marks
  ('\u{0483}', '\u{0487}'), // Cyrillic combining marks
  ('\u{0591}', '\u{05BD}'), // Hebrew points
  ('\u{05BF}', '\u{05C7}'),
  ('\u{0610}', '\u{061A}'), // Arabic marks
  ('\u{064B}', '\u{065F}'),
  ('\u{0670}', '\u{0670}'),
  ('\u{06D6}', '\u{06ED}'),
  ('\u{0711}', '\u{0711}'), // Syriac
  ('\u{0730}', '\u{074A}'),
  ('\u{07A6}', '\u{07B0}'), // Thaana
  ('\u{07EB}', '\u{07F3}'), // NKo
  ('\u{0816}', '\u{082D}'), // Samaritan
  ('\u{0859}', '\u{085B}'), // Mandaic
  ('\u{0898}', '\u{08FF}'), // Arabic Extended-A marks
  ('\u{0900}', '\u{0903}'), // Devanagari and the other Brahmic scripts
  ('\u{093A}', '\u{094F}'),
  ('\u{0951}', '\u{0957}'),
  ('\u{0962}', '\u{0963}'),
  ('\u{0981}', '\u{0983}'),
  ('\u{09BC}', '\u{09D7}'),
  ('\u{0A01}', '\u{0A03}'),
  ('\u{0A3C}', '\u{0A51}'),
  ('\u{0E31}', '\u{0E31}'), // Thai
  ('\u{0E34}', '\u{0E3A}'),
  ('\u{0E47}', '\u{0E4E}'),
  ('\u{0F18}', '\u{0F19}'), // Tibetan
  ('\u{0F71}', '\u{0F84}'),
  ('\u{1AB0}', '\u{1AFF}'), // Combining Diacritical Marks Extended
  ('\u{1DC0}', '\u{1DFF}'), // Combining Diacritical Marks Supplement
  ('\u{200C}', '\u{200D}'), // ZWNJ and ZWJ
  ('\u{203F}', '\u{2040}'), // Undertie and character tie
  ('\u{2054}', '\u{2054}'), // Inverted undertie
  ('\u{20D0}', '\u{20FF}'), // Combining Diacritical Marks for Symbols
  ('\u{302A}', '\u{302F}'), // CJK tone marks
  ('\u{3099}', '\u{309A}'), // Kana voicing marks
  ('\u{FE00}', '\u{FE0F}'), // Variation selectors
  ('\u{FE20}', '\u{FE2F}'), // Combining half marks
  ('\u{FE33}', '\u{FE34}'), // Presentation form low lines
  ('\u{FE4D}', '\u{FE4F}'),
  ('\u{FF3F}', '\u{FF3F}'), // Fullwidth low line
];

pub fn is_id_continue(c: char) -> bool {
  if c.is_ascii() {
    return ID_CONTINUE.has(c);
  };
  c.is_alphanumeric()
    || ID_CONTINUE_MARKS.iter().any(|(start, end)| (*start..=*end).contains(&c))
    || ('\u{E0100}'..='\u{E01EF}').contains(&c)
}

pub static DIGIT: Lazy<CharFilter> = Lazy::new(|| {
  let mut filter = CharFilter::new();
  filter.add_chars('0'..='9');
  filter
});

pub static DIGIT_BIN: Lazy<CharFilter> = Lazy::new(|| {
  let mut filter = CharFilter::new();
  filter.add_chars('0'..='1');
  filter
});

pub static DIGIT_HEX: Lazy<CharFilter> = Lazy::new(|| {
  let mut filter = CharFilter::new();
  filter.add_chars('0'..='9');
  filter.add_chars('a'..='f');
  filter.add_chars('A'..='F');
  filter
});

pub static DIGIT_OCT: Lazy<CharFilter> = Lazy::new(|| {
  let mut filter = CharFilter::new();
  filter.add_chars('0'..='7');
  filter
});

// ASCII subset; non-ASCII chars are checked with `is_id_start`.
pub static ID_START: Lazy<CharFilter> = Lazy::new(|| {
  let mut filter = CharFilter::new();
  filter.add_chars('a'..='z');
  filter.add_chars('A'..='Z');
  filter.add_chars_from_slice("$_");
  filter
});

pub static ID_CONTINUE: Lazy<CharFilter> = Lazy::new(|| {
  let mut filter = ID_START.clone();
  filter.add_chars('0'..='9');
  filter
});

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unicode_identifier_classes() {
    assert!(is_id_start('a'));
    assert!(is_id_start('$'));
    assert!(is_id_start('ü'));
    assert!(is_id_start('中'));
    assert!(!is_id_start('1'));
    assert!(!is_id_start('\u{2028}'));
    assert!(is_id_continue('1'));
    assert!(is_id_continue('\u{200D}'));
    assert!(is_id_continue('٣'));
    assert!(!is_id_continue('-'));
  }

  #[test]
  fn marks_and_connectors_continue_identifiers() {
    for c in ['\u{0301}', '\u{036F}', '\u{20D7}', '\u{203F}', '\u{2040}', '\u{FE4F}', '\u{FF3F}', '\u{E0100}'] {
      assert!(is_id_continue(c), "{:?}", c);
      assert!(!is_id_start(c), "{:?}", c);
    }
  }
}
