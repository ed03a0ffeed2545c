/*! Compiles a token stream into an automaton.

The grammar, lowest to highest precedence:

```text
alternate := concat ('|' concat)*
concat    := modified*
modified  := atom quantifier?
atom      := literal | '.' | class-escape | '(' alternate ')'
```

Each parsing function returns a [`Fragment`] whose exit state has no
outgoing arcs yet, so the caller can keep splicing and wiring without ever
rewriting arcs that already point into the fragment. Quantifiers encode
greediness purely through arc order: the greedy variants append their
epsilon arcs (try the atom first), the lazy variants prepend them (try the
skip first).
*/

use crate::nfa::{ClassRanges, Fragment, Label, Nfa, NfaBuilder};
use crate::tokenizer::{ClassKind, TokenKind, Tokenizer};
use crate::Error;

/// Compiles one pattern. Single use: [`Compiler::compile`] consumes the
/// compiler and yields the finished [`Nfa`].
pub(crate) struct Compiler {
    tokenizer: Tokenizer,
    builder: NfaBuilder,
}

impl Compiler {
    pub fn new(pattern: &str) -> Self {
        Self { tokenizer: Tokenizer::new(pattern), builder: NfaBuilder::new() }
    }

    /// Parses the whole pattern and builds its automaton. Anything left
    /// over after the top-level alternation is an error, so stray tokens
    /// like the parenthesis in `ab)` are rejected.
    pub fn compile(mut self) -> Result<Nfa, Error> {
        let fragment = self.alternate()?;
        let token = self.tokenizer.peek()?;
        if token.kind != TokenKind::End {
            return Err(Error::TrailingInput(token.pos));
        }
        Ok(self.builder.finish(fragment))
    }

    /// `alternate := concat ('|' concat)*`
    ///
    /// With a single branch this adds nothing. Otherwise every branch is
    /// wrapped between a shared entry and a shared exit state; branch
    /// entries are wired in source order, which gives alternation its
    /// leftmost-first priority. An empty branch (`abc|`, `|abc`) becomes a
    /// direct epsilon from entry to exit and matches the empty string.
    /// Runs of consecutive bars collapse into one.
    fn alternate(&mut self) -> Result<Option<Fragment>, Error> {
        let first = self.concat()?;
        if self.tokenizer.peek()?.kind != TokenKind::Alternation {
            return Ok(first);
        }

        let entry = self.builder.new_state();
        let exit = self.builder.new_state();
        let mut branch = first;

        loop {
            match branch {
                Some(f) => {
                    self.builder.append_arc(entry, Label::Epsilon, f.entry);
                    self.builder.append_arc(f.exit, Label::Epsilon, exit);
                }
                None => {
                    self.builder.append_arc(entry, Label::Epsilon, exit);
                }
            }
            if self.tokenizer.peek()?.kind != TokenKind::Alternation {
                break;
            }
            while self.tokenizer.peek()?.kind == TokenKind::Alternation {
                self.tokenizer.advance()?;
            }
            branch = self.concat()?;
        }

        Ok(Some(Fragment { entry, exit }))
    }

    /// `concat := modified*`
    ///
    /// Chains fragments left to right. Instead of joining consecutive
    /// fragments with an epsilon, the running exit state adopts the next
    /// fragment's entry arcs directly; the entry is reused as the merge
    /// point. Returns `None` when the concatenation is empty, which is
    /// valid inside a group or an alternation.
    fn concat(&mut self) -> Result<Option<Fragment>, Error> {
        let mut result: Option<Fragment> = None;

        loop {
            let token = self.tokenizer.peek()?;
            let fragment = match token.kind {
                TokenKind::OpenGroup => self.group()?,
                TokenKind::Literal(c) => {
                    self.tokenizer.advance()?;
                    Some(self.atom(Label::Literal(c)))
                }
                TokenKind::Dot => {
                    self.tokenizer.advance()?;
                    Some(self.atom(Label::Class(ClassRanges::any())))
                }
                TokenKind::Class(class) => {
                    self.tokenizer.advance()?;
                    Some(self.atom(Label::Class(predefined(class))))
                }
                TokenKind::Alternation
                | TokenKind::End
                | TokenKind::CloseGroup => break,
                _ if result.is_some() => break,
                _ => return Err(Error::UnexpectedToken(token.pos)),
            };

            let fragment = match fragment {
                Some(f) => self.quantify(f)?,
                None => {
                    // An erased empty group leaves nothing for a
                    // quantifier to apply to.
                    let next = self.tokenizer.peek()?;
                    if next.kind.is_quantifier() {
                        return Err(Error::UnexpectedToken(next.pos));
                    }
                    continue;
                }
            };

            result = Some(match result {
                None => fragment,
                Some(run) => {
                    self.builder.splice(run.exit, fragment.entry);
                    Fragment { entry: run.entry, exit: fragment.exit }
                }
            });
        }

        Ok(result)
    }

    /// `'(' alternate ')'`
    ///
    /// Claims the group number before parsing the body, so groups are
    /// numbered by their opening parenthesis, left to right, regardless of
    /// nesting. The inner fragment is wrapped between a pair of boundary
    /// states joined by group-open/group-close arcs. An empty body (`()`)
    /// is erased entirely, it still consumes a group number but can never
    /// capture anything.
    fn group(&mut self) -> Result<Option<Fragment>, Error> {
        let open = self.tokenizer.advance()?;
        debug_assert_eq!(TokenKind::OpenGroup, open.kind);

        let group = self.builder.next_group();
        let inner = self.alternate()?;

        let token = self.tokenizer.peek()?;
        if token.kind != TokenKind::CloseGroup {
            return Err(Error::UnmatchedParen(token.pos));
        }
        self.tokenizer.advance()?;

        Ok(inner.map(|f| {
            let entry = self.builder.new_state();
            let exit = self.builder.new_state();
            self.builder.append_arc(entry, Label::GroupOpen(group), f.entry);
            self.builder.append_arc(f.exit, Label::GroupClose(group), exit);
            Fragment { entry, exit }
        }))
    }

    /// A two-state fragment joined by a single arc.
    fn atom(&mut self, label: Label) -> Fragment {
        let entry = self.builder.new_state();
        let exit = self.builder.new_state();
        self.builder.append_arc(entry, label, exit);
        Fragment { entry, exit }
    }

    /// `modified := atom quantifier?`
    ///
    /// Operates on a fragment `(entry, exit)` whose exit has no arcs yet.
    /// Greedy variants append their epsilon arcs, lazy variants prepend
    /// the skip arc so the matcher tries skipping before repeating. A
    /// quantifier directly following another quantifier is a syntax error
    /// at the second quantifier's position.
    fn quantify(&mut self, f: Fragment) -> Result<Fragment, Error> {
        let token = self.tokenizer.peek()?;

        let result = match token.kind {
            TokenKind::Star => {
                self.tokenizer.advance()?;
                let exit = self.builder.new_state();
                self.builder.append_arc(f.entry, Label::Epsilon, exit);
                self.builder.append_arc(f.exit, Label::Epsilon, f.entry);
                Fragment { entry: f.entry, exit }
            }
            TokenKind::LazyStar => {
                self.tokenizer.advance()?;
                let exit = self.builder.new_state();
                self.builder.prepend_arc(f.entry, Label::Epsilon, exit);
                self.builder.append_arc(f.exit, Label::Epsilon, f.entry);
                Fragment { entry: f.entry, exit }
            }
            TokenKind::Plus => {
                self.tokenizer.advance()?;
                let exit = self.builder.new_state();
                self.builder.append_arc(f.exit, Label::Epsilon, f.entry);
                self.builder.append_arc(f.exit, Label::Epsilon, exit);
                Fragment { entry: f.entry, exit }
            }
            TokenKind::LazyPlus => {
                self.tokenizer.advance()?;
                let exit = self.builder.new_state();
                self.builder.append_arc(f.exit, Label::Epsilon, exit);
                self.builder.append_arc(f.exit, Label::Epsilon, f.entry);
                Fragment { entry: f.entry, exit }
            }
            TokenKind::Quest => {
                self.tokenizer.advance()?;
                self.builder.append_arc(f.entry, Label::Epsilon, f.exit);
                f
            }
            TokenKind::LazyQuest => {
                self.tokenizer.advance()?;
                self.builder.prepend_arc(f.entry, Label::Epsilon, f.exit);
                f
            }
            _ => return Ok(f),
        };

        let next = self.tokenizer.peek()?;
        if next.kind.is_quantifier() {
            return Err(Error::StackedQuantifier(next.pos));
        }

        Ok(result)
    }
}

/// The fixed table behind the six class-escape letters.
fn predefined(class: ClassKind) -> ClassRanges {
    match class {
        ClassKind::Digit => ClassRanges::digit(false),
        ClassKind::NotDigit => ClassRanges::digit(true),
        ClassKind::Word => ClassRanges::word(false),
        ClassKind::NotWord => ClassRanges::word(true),
        ClassKind::Space => ClassRanges::space(false),
        ClassKind::NotSpace => ClassRanges::space(true),
    }
}
