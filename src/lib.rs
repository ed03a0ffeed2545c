/*! A small regular expression engine built on an explicit NFA.

A pattern is lexed into a flat token stream, compiled by a recursive-descent
compiler into a graph of states and arcs (a nondeterministic finite
automaton), and executed by a [Pike VM][1]: a simulation that advances every
candidate path through the automaton simultaneously, one input position at a
time. Because at most one candidate path is live per automaton state at any
position, matching runs in time proportional to `pattern size × input size`,
never falling back to exponential backtracking.

The engine supports literals, `.`, the shorthand classes `\d \D \w \W \s \S`,
capture groups, alternation, and both greedy (`* + ?`) and lazy (`*? +? ??`)
quantifiers. Disambiguation between greedy and lazy repetition, and between
alternation branches, is encoded purely in the order in which arcs hang off
each state: the matcher walks arcs in insertion order, and the first path to
reach a state at a given position wins.

Bracket expressions (`[...]`), brace quantifiers (`{m,n}`) and the `^`/`$`
anchors are recognized by the tokenizer but rejected by the compiler.

# Example

```
use renfa::Regexp;

let mut re = Regexp::new("a(b*)c");
let m = re.search("xxabbbc").unwrap().unwrap();

assert_eq!(2..7, m.range());
assert_eq!(3, m.group(1).unwrap().start);
assert_eq!(Some(6), m.group(1).unwrap().end);
```

[1]: https://swtch.com/~rsc/regexp/regexp2.html
*/

use std::ops::Range;

use thiserror::Error;

mod nfa;
mod tokenizer;

use nfa::compiler::Compiler;
use nfa::pikevm::{Captures, PikeVm};
use nfa::Nfa;

/// Errors raised while compiling a pattern.
///
/// All errors are detected at compile time and carry the offending position
/// within the pattern, counted in characters. Matching itself never fails.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A backslash is the last character of the pattern.
    #[error("trailing backslash at position {0}")]
    TrailingEscape(usize),

    /// A `(` without its `)`, or the other way around.
    #[error("unmatched parenthesis at position {0}")]
    UnmatchedParen(usize),

    /// Two quantifiers in immediate succession, like `a**` or `a*+`.
    #[error("quantifier follows another quantifier at position {0}")]
    StackedQuantifier(usize),

    /// A token that cannot start an atom, like a leading `*` or a `{`.
    #[error("unexpected token at position {0}")]
    UnexpectedToken(usize),

    /// Input remains after the top-level alternation, like the stray
    /// parenthesis in `ab)`.
    #[error("unexpected trailing input at position {0}")]
    TrailingInput(usize),
}

/// Boundaries of a capture group, in characters.
///
/// `end` is `None` for a group that was opened but never closed before the
/// match completed, which can happen when the pattern ends inside an
/// optional group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: Option<usize>,
}

/// The result of a successful search: the whole-match boundaries plus one
/// optional [`Span`] per capture group.
///
/// Group 0 is the whole match. Groups are numbered by the order of their
/// opening parenthesis in the pattern, left to right, regardless of nesting.
/// A group that never participated in the match has no span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    start: usize,
    end: usize,
    groups: Vec<Option<Span>>,
}

impl Match {
    pub(crate) fn from_captures(captures: Captures) -> Option<Self> {
        let groups = captures.into_spans();
        let whole = groups.first().copied().flatten()?;
        let end = whole.end?;
        Some(Self { start: whole.start, end, groups })
    }

    /// Position where the whole match starts.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Position right after the last character of the whole match.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// The whole match as a character range.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Boundaries recorded for group `n`, or `None` if the group never
    /// opened during the match. Group 0 is always present.
    pub fn group(&self, n: usize) -> Option<Span> {
        self.groups.get(n).copied().flatten()
    }

    /// Number of capture groups declared in the pattern, not counting
    /// group 0.
    pub fn group_count(&self) -> usize {
        self.groups.len() - 1
    }
}

/// A regular expression: a pattern string plus, once [`Regexp::compile`] has
/// run, the automaton compiled from it.
///
/// Compilation is lazy and idempotent; [`Regexp::search`] compiles on first
/// use. The compiled automaton is never mutated by matching, so a `Regexp`
/// can run any number of searches.
pub struct Regexp {
    pattern: String,
    debug: bool,
    nfa: Option<Nfa>,
}

impl Regexp {
    /// Creates a regular expression from a pattern. No parsing happens
    /// until [`Regexp::compile`] or the first search.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self { pattern: pattern.into(), debug: false, nfa: None }
    }

    /// When enabled, the textual dump of the automaton is logged at debug
    /// level right after compilation.
    pub fn debug(mut self, yes: bool) -> Self {
        self.debug = yes;
        self
    }

    /// The pattern this regexp was created from.
    #[inline]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Compiles the pattern into its automaton. Does nothing if the pattern
    /// is already compiled.
    pub fn compile(&mut self) -> Result<(), Error> {
        self.nfa().map(|_| ())
    }

    /// The compiled automaton, compiling the pattern on first use.
    fn nfa(&mut self) -> Result<&Nfa, Error> {
        let nfa = match self.nfa.take() {
            Some(nfa) => nfa,
            None => {
                let nfa = Compiler::new(&self.pattern).compile()?;
                if self.debug {
                    log::debug!("compiled {:?} into:\n{}", self.pattern, nfa);
                }
                nfa
            }
        };
        Ok(self.nfa.insert(nfa))
    }

    /// Searches `text` for the first match of the pattern, compiling it
    /// first if needed. The search is unanchored: the match may start at
    /// any position.
    pub fn search(&mut self, text: &str) -> Result<Option<Match>, Error> {
        self.search_at(text, 0)
    }

    /// Like [`Regexp::search`], but only considers matches starting at or
    /// after `start`, counted in characters.
    pub fn search_at(
        &mut self,
        text: &str,
        start: usize,
    ) -> Result<Option<Match>, Error> {
        let nfa = self.nfa()?;
        let chars: Vec<char> = text.chars().collect();
        let captures = PikeVm::new(nfa).search(&chars, start);
        Ok(captures.and_then(Match::from_captures))
    }

    /// Number of capture groups in the pattern, or `None` if the pattern
    /// has not been compiled yet.
    pub fn group_count(&self) -> Option<usize> {
        self.nfa.as_ref().map(|nfa| nfa.group_count() as usize)
    }

    /// Textual enumeration of the automaton's states and arcs in discovery
    /// order, or `None` if the pattern has not been compiled yet.
    pub fn dump(&self) -> Option<String> {
        self.nfa.as_ref().map(|nfa| nfa.to_string())
    }
}
