/*! Lexer for the pattern syntax.

Tokenization is the first step of compilation. The tokenizer takes the
pattern string and produces tokens on demand; the compiler inspects the
current token with [`Tokenizer::peek`] and consumes it with
[`Tokenizer::advance`]. A single lookahead slot backs `peek`, so no token is
ever lexed twice.

Lexing needs at most two characters of lookahead: at each position the
three lazy-quantifier digraphs (`*?`, `+?`, `??`) are tried first, then the
single-character operator table, then backslash escapes. Anything else is a
literal character.
*/

use crate::Error;


/// The six recognized shorthand class escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClassKind {
    Digit,
    NotDigit,
    Word,
    NotWord,
    Space,
    NotSpace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// End of the pattern. Lexing past the end keeps returning this kind.
    End,
    Literal(char),
    Dot,
    Alternation,
    OpenGroup,
    CloseGroup,
    Star,
    Plus,
    Quest,
    LazyStar,
    LazyPlus,
    LazyQuest,
    Class(ClassKind),
    // Recognized lexically but rejected by the compiler.
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Caret,
    Dollar,
}

impl TokenKind {
    pub fn is_quantifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Star
                | TokenKind::Plus
                | TokenKind::Quest
                | TokenKind::LazyStar
                | TokenKind::LazyPlus
                | TokenKind::LazyQuest
        )
    }
}

/// A token plus the character position where it starts in the pattern. The
/// END token's position equals the pattern length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

/// Takes a pattern and produces a sequence of tokens.
pub(crate) struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    /// Holds the token returned by `peek` until `advance` consumes it.
    /// Never written while occupied.
    lookahead: Option<Token>,
}

impl Tokenizer {
    /// Creates a new [`Tokenizer`]. Nothing is lexed until the first call
    /// to [`Tokenizer::peek`] or [`Tokenizer::advance`].
    pub fn new(pattern: &str) -> Self {
        Self { chars: pattern.chars().collect(), pos: 0, lookahead: None }
    }

    /// Returns the current token without consuming it.
    pub fn peek(&mut self) -> Result<Token, Error> {
        if let Some(token) = self.lookahead {
            return Ok(token);
        }
        let token = self.lex()?;
        self.lookahead = Some(token);
        Ok(token)
    }

    /// Consumes the current token and returns it.
    pub fn advance(&mut self) -> Result<Token, Error> {
        match self.lookahead.take() {
            Some(token) => Ok(token),
            None => self.lex(),
        }
    }

    fn lex(&mut self) -> Result<Token, Error> {
        let pos = self.pos;

        let Some(&c) = self.chars.get(self.pos) else {
            return Ok(Token { kind: TokenKind::End, pos: self.chars.len() });
        };

        // The lazy quantifiers are the only two-character operators and take
        // precedence over the one-character table, so `??` is a single lazy
        // quest, not two quests.
        if let Some(&'?') = self.chars.get(self.pos + 1) {
            let kind = match c {
                '*' => Some(TokenKind::LazyStar),
                '+' => Some(TokenKind::LazyPlus),
                '?' => Some(TokenKind::LazyQuest),
                _ => None,
            };
            if let Some(kind) = kind {
                self.pos += 2;
                return Ok(Token { kind, pos });
            }
        }

        let kind = match c {
            '|' => Some(TokenKind::Alternation),
            '(' => Some(TokenKind::OpenGroup),
            ')' => Some(TokenKind::CloseGroup),
            '[' => Some(TokenKind::OpenBracket),
            ']' => Some(TokenKind::CloseBracket),
            '{' => Some(TokenKind::OpenBrace),
            '}' => Some(TokenKind::CloseBrace),
            '*' => Some(TokenKind::Star),
            '+' => Some(TokenKind::Plus),
            '?' => Some(TokenKind::Quest),
            '^' => Some(TokenKind::Caret),
            '$' => Some(TokenKind::Dollar),
            '.' => Some(TokenKind::Dot),
            _ => None,
        };

        if let Some(kind) = kind {
            self.pos += 1;
            return Ok(Token { kind, pos });
        }

        if c == '\\' {
            let Some(&escaped) = self.chars.get(self.pos + 1) else {
                return Err(Error::TrailingEscape(pos));
            };
            self.pos += 2;
            let kind = match escaped {
                'd' => TokenKind::Class(ClassKind::Digit),
                'D' => TokenKind::Class(ClassKind::NotDigit),
                'w' => TokenKind::Class(ClassKind::Word),
                'W' => TokenKind::Class(ClassKind::NotWord),
                's' => TokenKind::Class(ClassKind::Space),
                'S' => TokenKind::Class(ClassKind::NotSpace),
                other => TokenKind::Literal(other),
            };
            return Ok(Token { kind, pos });
        }

        self.pos += 1;
        Ok(Token { kind: TokenKind::Literal(c), pos })
    }
}
