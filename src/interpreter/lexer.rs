use logos::Logos;

use crate::error::ParseError;

/// A position inside a source string, used for diagnostics.
///
/// Lines and columns are 1-based; `length` is the number of characters the
/// token occupies in its line. A default `Location` (line 0) means "no
/// position recorded yet" and is patched in by whoever knows the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    /// 1-based line number.
    pub line:   usize,
    /// 1-based column of the first character.
    pub column: usize,
    /// Number of characters covered.
    pub length: usize,
}

impl Location {
    /// Returns `true` if no position has been recorded.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        self.line == 0
    }

    /// Renders the location as a three-line snippet:
    ///
    /// ```text
    /// <path>:<line>:<col>:
    /// <source line verbatim>
    ///      ~~~~
    /// ```
    ///
    /// # Example
    /// ```
    /// use lilt::Location;
    ///
    /// let location = Location { line: 1, column: 5, length: 2 };
    /// let shown = location.show("demo.lilt", "int x = 1;");
    ///
    /// assert_eq!(shown, "demo.lilt:1:5:\nint x = 1;\n    ~~");
    /// ```
    #[must_use]
    pub fn show(&self, path: &str, source: &str) -> String {
        if self.is_unset() {
            return format!("{path}:?:?:");
        }

        let text = source.lines().nth(self.line - 1).unwrap_or("");
        let mut underline = " ".repeat(self.column.saturating_sub(1));
        underline.push_str(&"~".repeat(self.length.max(1)));

        format!("{path}:{}:{}:\n{text}\n{underline}", self.line, self.column)
    }
}

/// The shape of a token, separate from any payload it carries.
///
/// Discriminants are powers of two so a set of expected kinds can be stored
/// as a single bitmask (see [`ExpectedSet`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum TokenKind {
    Number       = 1 << 0,
    Identifier   = 1 << 1,
    Str          = 1 << 2,
    Char         = 1 << 3,
    Plus         = 1 << 4,
    Minus        = 1 << 5,
    Star         = 1 << 6,
    Slash        = 1 << 7,
    Increment    = 1 << 8,
    Decrement    = 1 << 9,
    PlusAssign   = 1 << 10,
    MinusAssign  = 1 << 11,
    StarAssign   = 1 << 12,
    SlashAssign  = 1 << 13,
    Assign       = 1 << 14,
    EqualEqual   = 1 << 15,
    BangEqual    = 1 << 16,
    Less         = 1 << 17,
    LessEqual    = 1 << 18,
    Greater      = 1 << 19,
    GreaterEqual = 1 << 20,
    Bang         = 1 << 21,
    LeftParen    = 1 << 22,
    RightParen   = 1 << 23,
    LeftBrace    = 1 << 24,
    RightBrace   = 1 << 25,
    LeftBracket  = 1 << 26,
    RightBracket = 1 << 27,
    Semicolon    = 1 << 28,
    Dot          = 1 << 29,
    Comma        = 1 << 30,
    Invalid      = 1 << 31,
    Eof          = 1 << 32,
}

impl TokenKind {
    /// The bit this kind occupies in an [`ExpectedSet`].
    #[must_use]
    pub const fn mask(self) -> u64 {
        self as u64
    }

    /// A short human-readable name, used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Identifier => "identifier",
            Self::Str => "string",
            Self::Char => "character",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::Slash => "'/'",
            Self::Increment => "'++'",
            Self::Decrement => "'--'",
            Self::PlusAssign => "'+='",
            Self::MinusAssign => "'-='",
            Self::StarAssign => "'*='",
            Self::SlashAssign => "'/='",
            Self::Assign => "'='",
            Self::EqualEqual => "'=='",
            Self::BangEqual => "'!='",
            Self::Less => "'<'",
            Self::LessEqual => "'<='",
            Self::Greater => "'>'",
            Self::GreaterEqual => "'>='",
            Self::Bang => "'!'",
            Self::LeftParen => "'('",
            Self::RightParen => "')'",
            Self::LeftBrace => "'{'",
            Self::RightBrace => "'}'",
            Self::LeftBracket => "'['",
            Self::RightBracket => "']'",
            Self::Semicolon => "';'",
            Self::Dot => "'.'",
            Self::Comma => "','",
            Self::Invalid => "invalid token",
            Self::Eof => "end of file",
        }
    }
}

const ALL_KINDS: &[TokenKind] = &[TokenKind::Number,
                                  TokenKind::Identifier,
                                  TokenKind::Str,
                                  TokenKind::Char,
                                  TokenKind::Plus,
                                  TokenKind::Minus,
                                  TokenKind::Star,
                                  TokenKind::Slash,
                                  TokenKind::Increment,
                                  TokenKind::Decrement,
                                  TokenKind::PlusAssign,
                                  TokenKind::MinusAssign,
                                  TokenKind::StarAssign,
                                  TokenKind::SlashAssign,
                                  TokenKind::Assign,
                                  TokenKind::EqualEqual,
                                  TokenKind::BangEqual,
                                  TokenKind::Less,
                                  TokenKind::LessEqual,
                                  TokenKind::Greater,
                                  TokenKind::GreaterEqual,
                                  TokenKind::Bang,
                                  TokenKind::LeftParen,
                                  TokenKind::RightParen,
                                  TokenKind::LeftBrace,
                                  TokenKind::RightBrace,
                                  TokenKind::LeftBracket,
                                  TokenKind::RightBracket,
                                  TokenKind::Semicolon,
                                  TokenKind::Dot,
                                  TokenKind::Comma,
                                  TokenKind::Invalid,
                                  TokenKind::Eof];

/// A bitmask over [`TokenKind`]s describing what the parser would have
/// accepted at some position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpectedSet(u64);

impl ExpectedSet {
    /// The set containing exactly `kind`.
    #[must_use]
    pub const fn of(kind: TokenKind) -> Self {
        Self(kind.mask())
    }

    /// Adds a kind to the set.
    #[must_use]
    pub const fn with(self, kind: TokenKind) -> Self {
        Self(self.0 | kind.mask())
    }

    /// Checks whether `kind` is in the set.
    #[must_use]
    pub const fn contains(&self, kind: TokenKind) -> bool {
        self.0 & kind.mask() != 0
    }
}

impl From<TokenKind> for ExpectedSet {
    fn from(kind: TokenKind) -> Self {
        Self::of(kind)
    }
}

impl std::ops::BitOr<TokenKind> for ExpectedSet {
    type Output = Self;

    fn bitor(self, rhs: TokenKind) -> Self {
        self.with(rhs)
    }
}

impl std::ops::BitOr for TokenKind {
    type Output = ExpectedSet;

    fn bitor(self, rhs: Self) -> ExpectedSet {
        ExpectedSet::of(self).with(rhs)
    }
}

impl std::fmt::Display for ExpectedSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for kind in ALL_KINDS {
            if self.contains(*kind) {
                if !first {
                    write!(f, " or ")?;
                }
                write!(f, "{}", kind.name())?;
                first = false;
            }
        }
        if first {
            write!(f, "nothing")?;
        }
        Ok(())
    }
}

/// Represents a lexical token in the source input.
///
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// This enum defines all recognized tokens in the language.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"//[^\n\r]*")]
pub enum Token {
    /// Float literal tokens carrying the `f` suffix, such as `1.5f` or `3f`.
    #[regex(r"[0-9]+\.[0-9]*f", parse_float)]
    #[regex(r"[0-9]+f", parse_float)]
    Float(f32),
    /// Double literal tokens, such as `3.14`.
    #[regex(r"[0-9]+\.[0-9]*", parse_double)]
    Double(f64),
    /// Integer literal tokens, such as `42`.
    #[regex(r"[0-9]+", parse_int)]
    Int(i64),
    /// String literal tokens with `\n`, `\t`, `\"` and `\\` escapes.
    #[regex(r#""([^"\\\n]|\\.)*""#, parse_string)]
    Str(String),
    /// Character literal tokens, such as `'c'` or `'\n'`.
    #[regex(r"'([^'\\\n]|\\.)'", parse_char)]
    CharLit(char),
    /// `if`
    #[token("if")]
    If,
    /// `else`
    #[token("else")]
    Else,
    /// `for`
    #[token("for")]
    For,
    /// `while`
    #[token("while")]
    While,
    /// `return`
    #[token("return")]
    Return,
    /// `break`
    #[token("break")]
    Break,
    /// `struct`
    #[token("struct")]
    Struct,
    /// Identifier tokens; type, variable or function names such as `x`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// `++`
    #[token("++")]
    Increment,
    /// `--`
    #[token("--")]
    Decrement,
    /// `+=`
    #[token("+=")]
    PlusAssign,
    /// `-=`
    #[token("-=")]
    MinusAssign,
    /// `*=`
    #[token("*=")]
    StarAssign,
    /// `/=`
    #[token("/=")]
    SlashAssign,
    /// `==`
    #[token("==")]
    EqualEqual,
    /// `!=`
    #[token("!=")]
    BangEqual,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `=`
    #[token("=")]
    Assign,
    /// `<`
    #[token("<")]
    Less,
    /// `>`
    #[token(">")]
    Greater,
    /// `!`
    #[token("!")]
    Bang,
    /// `(`
    #[token("(")]
    LeftParen,
    /// `)`
    #[token(")")]
    RightParen,
    /// `{`
    #[token("{")]
    LeftBrace,
    /// `}`
    #[token("}")]
    RightBrace,
    /// `[`
    #[token("[")]
    LeftBracket,
    /// `]`
    #[token("]")]
    RightBracket,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `.`
    #[token(".")]
    Dot,
    /// `,`
    #[token(",")]
    Comma,

    /// Line breaks; skipped, but tracked for locations.
    #[token("\n", |lex| {
        lex.extras.line       += 1;
        lex.extras.line_start  = lex.span().end;
        logos::Skip
    })]
    Newline,
}

/// Additional information carried by the lexer during tokenization.
///
/// Tracks the current line number and the byte offset of that line's first
/// character, so every token can be given a full [`Location`].
pub struct LexerExtras {
    /// The current 1-based line number.
    pub line:       usize,
    /// Byte offset where the current line begins.
    pub line_start: usize,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self { line:       1,
               line_start: 0, }
    }
}

impl Token {
    /// The [`TokenKind`] of this token.
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        match self {
            Self::Float(_) | Self::Double(_) | Self::Int(_) => TokenKind::Number,
            Self::Str(_) => TokenKind::Str,
            Self::CharLit(_) => TokenKind::Char,
            // Keywords count as identifiers for the kind set; the parser
            // matches them directly by token.
            Self::If
            | Self::Else
            | Self::For
            | Self::While
            | Self::Return
            | Self::Break
            | Self::Struct
            | Self::Identifier(_) => TokenKind::Identifier,
            Self::Increment => TokenKind::Increment,
            Self::Decrement => TokenKind::Decrement,
            Self::PlusAssign => TokenKind::PlusAssign,
            Self::MinusAssign => TokenKind::MinusAssign,
            Self::StarAssign => TokenKind::StarAssign,
            Self::SlashAssign => TokenKind::SlashAssign,
            Self::EqualEqual => TokenKind::EqualEqual,
            Self::BangEqual => TokenKind::BangEqual,
            Self::LessEqual => TokenKind::LessEqual,
            Self::GreaterEqual => TokenKind::GreaterEqual,
            Self::Plus => TokenKind::Plus,
            Self::Minus => TokenKind::Minus,
            Self::Star => TokenKind::Star,
            Self::Slash => TokenKind::Slash,
            Self::Assign => TokenKind::Assign,
            Self::Less => TokenKind::Less,
            Self::Greater => TokenKind::Greater,
            Self::Bang => TokenKind::Bang,
            Self::LeftParen => TokenKind::LeftParen,
            Self::RightParen => TokenKind::RightParen,
            Self::LeftBrace => TokenKind::LeftBrace,
            Self::RightBrace => TokenKind::RightBrace,
            Self::LeftBracket => TokenKind::LeftBracket,
            Self::RightBracket => TokenKind::RightBracket,
            Self::Semicolon => TokenKind::Semicolon,
            Self::Dot => TokenKind::Dot,
            Self::Comma => TokenKind::Comma,
            Self::Newline => TokenKind::Invalid,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Float(v) => write!(f, "number {v}"),
            Self::Double(v) => write!(f, "number {v}"),
            Self::Int(v) => write!(f, "number {v}"),
            Self::Str(s) => write!(f, "string {s:?}"),
            Self::CharLit(c) => write!(f, "character {c:?}"),
            Self::If => write!(f, "'if'"),
            Self::Else => write!(f, "'else'"),
            Self::For => write!(f, "'for'"),
            Self::While => write!(f, "'while'"),
            Self::Return => write!(f, "'return'"),
            Self::Break => write!(f, "'break'"),
            Self::Struct => write!(f, "'struct'"),
            Self::Identifier(name) => write!(f, "identifier \"{name}\""),
            Self::Newline => write!(f, "newline"),
            other => write!(f, "{}", other.kind().name()),
        }
    }
}

/// Turns a source string into a sequence of located tokens.
///
/// Whitespace and `//` comments are skipped. The first unrecognized
/// character aborts tokenization with a [`ParseError::InvalidToken`]
/// carrying its location.
///
/// # Errors
/// Returns an error when an unrecognized character or a malformed literal
/// (bad escape, out-of-range integer) is encountered.
///
/// # Example
/// ```
/// use lilt::interpreter::lexer::{Token, tokenize};
///
/// let tokens = tokenize("int x = 3;").unwrap();
/// let kinds: Vec<&Token> = tokens.iter().map(|(t, _)| t).collect();
///
/// assert_eq!(kinds,
///            vec![&Token::Identifier("int".to_string()),
///                 &Token::Identifier("x".to_string()),
///                 &Token::Assign,
///                 &Token::Int(3),
///                 &Token::Semicolon]);
/// ```
pub fn tokenize(source: &str) -> Result<Vec<(Token, Location)>, ParseError> {
    let mut lexer = Token::lexer_with_extras(source, LexerExtras::default());
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let location = Location { line:   lexer.extras.line,
                                  column: span.start - lexer.extras.line_start + 1,
                                  length: span.len(), };

        match result {
            Ok(token) => tokens.push((token, location)),
            Err(()) => return Err(ParseError::InvalidToken { location }),
        }
    }

    Ok(tokens)
}

/// Parses a float literal, trimming the mandatory `f` suffix.
fn parse_float(lex: &logos::Lexer<Token>) -> Option<f32> {
    lex.slice().trim_end_matches('f').parse().ok()
}

/// Parses a double literal from the current token slice.
fn parse_double(lex: &logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse().ok()
}

/// Parses an integer literal from the current token slice.
fn parse_int(lex: &logos::Lexer<Token>) -> Option<i64> {
    lex.slice().parse().ok()
}

/// Resolves a single escape character, shared by string and char literals.
const fn unescape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        '\'' => Some('\''),
        _ => None,
    }
}

/// Parses a string literal, resolving escapes. Unknown escapes fail the
/// token, which surfaces as an invalid-token error at its location.
fn parse_string(lex: &logos::Lexer<Token>) -> Option<String> {
    let raw = lex.slice();
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(unescape(chars.next()?)?);
        } else {
            out.push(c);
        }
    }

    Some(out)
}

/// Parses a character literal, resolving a possible escape.
fn parse_char(lex: &logos::Lexer<Token>) -> Option<char> {
    let raw = lex.slice();
    let inner = &raw[1..raw.len() - 1];
    let mut chars = inner.chars();
    let first = chars.next()?;

    if first == '\\' { unescape(chars.next()?) } else { Some(first) }
}
