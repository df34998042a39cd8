//! `An+B` patterns for the `:nth-*` pseudo-class family.
//!
//! Accepted syntax: `odd`, `even`, a bare signed integer, and the general
//! `An+B` form with an optional sign on `A`, an implicit coefficient (`n`,
//! `+n`, `-n`) and an optional `+B`/`-B` term whose sign may be surrounded by
//! whitespace. The `of S` clause is not supported.

use std::fmt;

use super::tokenizer::is_css_whitespace;

/// Coefficients of `an+b`. Matches 1-based sibling indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NthPattern {
    pub a: i32,
    pub b: i32,
}

impl NthPattern {
    /// `odd`, i.e. `2n+1`.
    pub const ODD: Self = Self { a: 2, b: 1 };
    /// `even`, i.e. `2n`.
    pub const EVEN: Self = Self { a: 2, b: 0 };

    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Whether the 1-based `index` is produced by some `n >= 0`.
    pub fn matches(&self, index: usize) -> bool {
        let index = index as i64;
        let a = i64::from(self.a);
        let b = i64::from(self.b);
        if a == 0 {
            return index == b;
        }
        let diff = index - b;
        diff % a == 0 && diff / a >= 0
    }

    /// Parse the raw text between the parentheses of `:nth-child(...)`.
    ///
    /// Returns `None` for anything that is not a valid `An+B` expression.
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim_matches(is_css_whitespace).to_ascii_lowercase();
        match text.as_str() {
            "" => return None,
            "odd" => return Some(Self::ODD),
            "even" => return Some(Self::EVEN),
            _ => {}
        }

        let Some(n_pos) = text.find('n') else {
            return parse_signed(&text).map(|b| Self::new(0, b));
        };

        let a = match &text[..n_pos] {
            "" | "+" => 1,
            "-" => -1,
            digits => parse_signed(digits)?,
        };

        let rest = text[n_pos + 1..].trim_start_matches(is_css_whitespace);
        if rest.is_empty() {
            return Some(Self::new(a, 0));
        }

        let (sign, magnitude) = if let Some(tail) = rest.strip_prefix('+') {
            (1, tail)
        } else if let Some(tail) = rest.strip_prefix('-') {
            (-1, tail)
        } else {
            return None;
        };
        let b = parse_unsigned(magnitude.trim_start_matches(is_css_whitespace))?;
        Some(Self::new(a, sign * b))
    }
}

/// Integer with an optional leading sign and no interior whitespace.
fn parse_signed(text: &str) -> Option<i32> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_unsigned(text: &str) -> Option<i32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl fmt::Display for NthPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.a, self.b) {
            (0, b) => write!(f, "{b}"),
            (a, b) => {
                match a {
                    1 => f.write_str("n")?,
                    -1 => f.write_str("-n")?,
                    a => write!(f, "{a}n")?,
                }
                match b {
                    0 => Ok(()),
                    b if b > 0 => write!(f, "+{b}"),
                    b => write!(f, "{b}"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_matches_odd_indices() {
        let odd = NthPattern::new(2, 1);
        for index in [1, 3, 5, 7, 99] {
            assert!(odd.matches(index), "index {index}");
        }
        for index in [2, 4, 6, 100] {
            assert!(!odd.matches(index), "index {index}");
        }
    }

    #[test]
    fn zero_coefficient_is_exact() {
        let third = NthPattern::new(0, 3);
        assert!(third.matches(3));
        assert!(!third.matches(1));
        assert!(!third.matches(6));
    }

    #[test]
    fn negative_coefficient_counts_down() {
        // -n+3 selects the first three.
        let first_three = NthPattern::new(-1, 3);
        assert!(first_three.matches(1));
        assert!(first_three.matches(3));
        assert!(!first_three.matches(4));
    }

    #[test]
    fn offset_larger_than_index() {
        // 3n+5 selects 5, 8, 11, ... never 2.
        let pattern = NthPattern::new(3, 5);
        assert!(!pattern.matches(2));
        assert!(pattern.matches(5));
        assert!(pattern.matches(8));
    }

    #[test]
    fn parse_keywords() {
        assert_eq!(NthPattern::parse("odd"), Some(NthPattern::ODD));
        assert_eq!(NthPattern::parse(" EVEN "), Some(NthPattern::EVEN));
    }

    #[test]
    fn unicode_spaces_are_not_whitespace() {
        assert_eq!(NthPattern::parse("\u{a0}2n"), None);
        assert_eq!(NthPattern::parse("2n\u{3000}+1"), None);
        assert_eq!(NthPattern::parse("\x0C2n +\t1\n"), Some(NthPattern::new(2, 1)));
    }

    #[test]
    fn parse_common_forms() {
        assert_eq!(NthPattern::parse("n"), Some(NthPattern::new(1, 0)));
        assert_eq!(NthPattern::parse("2n"), Some(NthPattern::new(2, 0)));
        assert_eq!(NthPattern::parse("2n+1"), Some(NthPattern::new(2, 1)));
        assert_eq!(NthPattern::parse("-n+3"), Some(NthPattern::new(-1, 3)));
        assert_eq!(NthPattern::parse("7"), Some(NthPattern::new(0, 7)));
    }

    #[test]
    fn parse_signed_and_spaced_forms() {
        assert_eq!(NthPattern::parse("+2n-1"), Some(NthPattern::new(2, -1)));
        assert_eq!(NthPattern::parse("+n"), Some(NthPattern::new(1, 0)));
        assert_eq!(NthPattern::parse("2n + 1"), Some(NthPattern::new(2, 1)));
        assert_eq!(NthPattern::parse(" 3N - 2 "), Some(NthPattern::new(3, -2)));
        assert_eq!(NthPattern::parse("-4"), Some(NthPattern::new(0, -4)));
    }

    #[test]
    fn parse_rejects_malformed() {
        for raw in ["", "2 n", "+ n", "n+", "2n+-1", "2n 1", "foo", "2n+1 of .a", "1.5n", "n+x"] {
            assert_eq!(NthPattern::parse(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn display_is_canonical() {
        assert_eq!(NthPattern::ODD.to_string(), "2n+1");
        assert_eq!(NthPattern::new(-1, 3).to_string(), "-n+3");
        assert_eq!(NthPattern::new(2, -1).to_string(), "2n-1");
        assert_eq!(NthPattern::new(1, 0).to_string(), "n");
        assert_eq!(NthPattern::new(0, 4).to_string(), "4");
    }
}
