use pretty_assertions::assert_eq;

use crate::{Error, Regexp, Span};

/// Asserts that `pattern` matches somewhere in `text` with the given
/// whole-match range, and yields the [`crate::Match`] for further group
/// assertions.
macro_rules! assert_match {
    ($pattern:expr, $text:expr, $range:expr) => {{
        let m = Regexp::new($pattern)
            .search($text)
            .unwrap()
            .unwrap_or_else(|| {
                panic!("{:?} should match {:?}", $pattern, $text)
            });
        assert_eq!($range, m.range(), "{:?} on {:?}", $pattern, $text);
        m
    }};
}

macro_rules! assert_no_match {
    ($pattern:expr, $text:expr) => {{
        assert_eq!(
            None,
            Regexp::new($pattern).search($text).unwrap(),
            "{:?} on {:?}",
            $pattern,
            $text
        );
    }};
}

fn span(start: usize, end: usize) -> Option<Span> {
    Some(Span { start, end: Some(end) })
}

#[test]
fn literals() {
    assert_match!("abc", "abc", 0..3);
    assert_match!("abc", "xxabc", 2..5);
    assert_match!("abc", "xxabcyy", 2..5);
    assert_no_match!("abc", "abx");
    assert_no_match!("abc", "");
}

#[test]
fn match_can_end_at_the_last_character() {
    // The accepting state is only reachable one position past the final
    // consumed character.
    assert_match!("c", "abc", 2..3);
    assert_match!("abc", "zabc", 1..4);
}

#[test]
fn leftmost_match_wins() {
    // `ab` completes before `abc` can, both starting at 0.
    assert_match!("ab|abc", "abc", 0..2);
    // The `b` branch only matches at position 1; the attempt seeded at
    // position 0 still wins.
    assert_match!("b|abc", "abc", 0..3);
}

#[test]
fn later_branch_can_match_when_an_earlier_branch_fails() {
    // A failed branch must not shadow a sibling branch's arc at the same
    // input position.
    assert_match!("a|b", "b", 0..1);
    assert_match!("a|b|c", "c", 0..1);
    assert_match!("ab|ac", "ac", 0..2);
    assert_match!("ab|ac", "zac", 1..3);
    assert_no_match!("ab|ac", "ad");
}

#[test]
fn greedy_quantifiers() {
    assert_match!("a?", "a", 0..1);
    assert_match!("a*", "aaa", 0..3);
    assert_match!("a+", "aaa", 0..3);
    // A greedy star is still happy with nothing.
    assert_match!("a*", "bbb", 0..0);
    assert_match!("b*", "abc", 0..0);
    assert_no_match!("a+", "bbb");
}

#[test]
fn lazy_quantifiers() {
    assert_match!("a??", "a", 0..0);
    assert_match!("a+?", "aaa", 0..1);
    let m = assert_match!("a(.*?)b", "abab", 0..2);
    assert_eq!(span(1, 1), m.group(1));
}

#[test]
fn greedy_and_lazy_disagree_on_the_same_input() {
    let m = assert_match!("a(.*)b", "axbxxb", 0..6);
    assert_eq!(span(1, 5), m.group(1));

    let m = assert_match!("a(.*?)b", "axbxxb", 0..3);
    assert_eq!(span(1, 2), m.group(1));
}

#[test]
fn greedy_star_backs_off_for_the_suffix() {
    // The star cannot swallow the final `bc`.
    let m = assert_match!("a(.*)bc", "abababc", 0..7);
    assert_eq!(span(1, 5), m.group(1));
}

#[test]
fn capture_groups() {
    let m = assert_match!("(a(b*)c(d*e))", "sssabbbbbbcdddef", 3..15);
    assert_eq!(span(3, 15), m.group(1));
    assert_eq!(span(4, 10), m.group(2));
    assert_eq!(span(11, 15), m.group(3));
    assert_eq!(3, m.group_count());
}

#[test]
fn nested_groups() {
    let m = assert_match!("(a(b)c)", "abc", 0..3);
    assert_eq!(span(0, 3), m.group(1));
    assert_eq!(span(1, 2), m.group(2));
}

#[test]
fn quantified_group_keeps_its_first_iteration() {
    let m = assert_match!("(ab)+", "abab", 0..4);
    assert_eq!(span(0, 2), m.group(1));

    let m = assert_match!("(ab)*", "ab", 0..2);
    assert_eq!(span(0, 2), m.group(1));
}

#[test]
fn lazy_group_star_skips_the_group_entirely() {
    let m = assert_match!("(ab)*?", "ab", 0..0);
    assert_eq!(None, m.group(1));
}

#[test]
fn lazy_plus_inside_alternation() {
    let m = assert_match!("(ab|c+?d)", "ccccccccd", 0..9);
    assert_eq!(span(0, 9), m.group(1));
}

#[test]
fn empty_group_is_erased() {
    let m = assert_match!("a()b", "ab", 0..2);
    assert_eq!(1, m.group_count());
    assert_eq!(None, m.group(1));
}

#[test]
fn empty_pattern_matches_the_empty_string() {
    assert_match!("", "abc", 0..0);
    assert_match!("", "", 0..0);
}

#[test]
fn empty_alternation_branch() {
    // The empty branch matches the empty string at position 0.
    assert_match!("abc|", "xyz", 0..0);
    assert_match!("abc|", "abc", 0..3);
    assert_match!("|abc", "zabc", 0..0);
}

#[test]
fn class_escapes() {
    let m = assert_match!(r"(\d+)-(\d+)-(\d+)", "1234-567-890", 0..12);
    assert_eq!(span(0, 4), m.group(1));
    assert_eq!(span(5, 8), m.group(2));
    assert_eq!(span(9, 12), m.group(3));

    assert_match!(r"\w+", " abZ ", 1..4);
    assert_match!(r"\s", "a b", 1..2);
    assert_match!(r"\S+", "  ab ", 2..4);
    assert_match!(r"\D+", "12ab34", 2..4);
}

#[test]
fn word_class_excludes_digits_and_underscore() {
    assert_match!(r"\w+", "a_b", 0..1);
    assert_match!(r"\w+", "7abc", 1..4);
    assert_no_match!(r"\w", "123_");
}

#[test]
fn dot_matches_any_character() {
    assert_match!("a.c", "abc", 0..3);
    assert_match!("a.c", "aβc", 0..3);
    assert_match!("a.c", "a c", 0..3);
    // But never the absence of one.
    assert_no_match!("a.", "a");
}

#[test]
fn escaped_metacharacters_are_literals() {
    assert_match!(r"a\*b", "a*b", 0..3);
    assert_match!(r"\(x\)", "(x)", 0..3);
    assert_match!(r"a\\b", r"a\b", 0..3);
}

#[test]
fn positions_count_characters_not_bytes() {
    assert_match!("β", "aβc", 1..2);
    assert_match!("c", "αβc", 2..3);
}

#[test]
fn search_at() {
    let mut re = Regexp::new("a");
    let m = re.search_at("aaa", 1).unwrap().unwrap();
    assert_eq!(1..2, m.range());
    assert_eq!(None, re.search_at("abc", 1).unwrap());
}

#[test]
fn literal_search_agrees_with_substring_scan() {
    for text in ["", "a", "ab", "xxabyy", "aab", "babab", "xyz", "bab"] {
        let found = Regexp::new("ab")
            .search(text)
            .unwrap()
            .map(|m| m.start());
        assert_eq!(text.find("ab"), found, "text {:?}", text);
    }
}

#[test]
fn compile_errors() {
    let err = |pattern: &str| Regexp::new(pattern).search("").unwrap_err();

    assert_eq!(Error::StackedQuantifier(2), err("a**"));
    assert_eq!(Error::StackedQuantifier(2), err("a*+"));
    assert_eq!(Error::StackedQuantifier(3), err("a*?*?"));
    assert_eq!(Error::TrailingEscape(2), err(r"ab\"));
    assert_eq!(Error::UnmatchedParen(3), err("(ab"));
    assert_eq!(Error::TrailingInput(2), err("ab)"));
    assert_eq!(Error::UnexpectedToken(0), err("*ab"));
    assert_eq!(Error::UnexpectedToken(0), err("+a"));
    // A quantifier cannot apply to an erased empty group.
    assert_eq!(Error::UnexpectedToken(2), err("()*"));
}

#[test]
fn unsupported_syntax_is_rejected() {
    let err = |pattern: &str| Regexp::new(pattern).search("").unwrap_err();

    assert_eq!(Error::UnexpectedToken(0), err("[ab]"));
    assert_eq!(Error::UnexpectedToken(0), err("^a"));
    assert_eq!(Error::UnexpectedToken(0), err("{2}"));
    assert_eq!(Error::TrailingInput(1), err("a[b]"));
    assert_eq!(Error::TrailingInput(1), err("a$"));
    assert_eq!(Error::TrailingInput(1), err("a{2}"));
}

#[test]
fn compile_is_idempotent() {
    let mut re = Regexp::new("(a)(b)");
    assert_eq!(None, re.group_count());
    re.compile().unwrap();
    assert_eq!(Some(2), re.group_count());
    re.compile().unwrap();
    assert_eq!(Some(2), re.group_count());
    assert_eq!(2..4, re.search("xxab").unwrap().unwrap().range());
}

#[test]
fn dump_concatenation() {
    let mut re = Regexp::new("ab");
    re.compile().unwrap();
    assert_eq!(
        r#"state 0
  'a' -> 1
state 1
  'b' -> 2
state 2 (accept)
"#,
        re.dump().unwrap()
    );
}

#[test]
fn dump_alternation() {
    // Branch tails stay distinct even though they look alike; only spliced
    // pairs merge.
    let mut re = Regexp::new("a|b");
    re.compile().unwrap();
    assert_eq!(
        r#"state 0
  ε -> 1
  ε -> 2
state 1
  'a' -> 3
state 2
  'b' -> 4
state 3
  ε -> 5
state 4
  ε -> 5
state 5 (accept)
"#,
        re.dump().unwrap()
    );
}

#[test]
fn dump_spliced_quantifier() {
    // `a`'s exit adopted the starred atom's entry arcs; the loop arc still
    // points at the original entry, and the two fold into state 1.
    let mut re = Regexp::new("ab*");
    re.compile().unwrap();
    assert_eq!(
        r#"state 0
  'a' -> 1
state 1
  'b' -> 2
  ε -> 3
state 2
  ε -> 1
state 3 (accept)
"#,
        re.dump().unwrap()
    );
}

#[test]
fn dump_is_none_before_compilation() {
    assert_eq!(None, Regexp::new("ab").dump());
}
