use std::fmt;
use std::str::Chars;

/// Byte range of a token within the expression text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Ident,
    Number,
    String,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,

    // Comparators the solver accepts
    LessEqual,
    GreaterEqual,
    EqualEqual,

    // Comparators recognized only to be rejected
    Less,
    Greater,
    NotEqual,
    Assign,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,

    // Special
    Eof,
    Error,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::LessEqual => "'<='",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::EqualEqual => "'=='",
            TokenKind::Less => "'<'",
            TokenKind::Greater => "'>'",
            TokenKind::NotEqual => "'!='",
            TokenKind::Assign => "'='",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Eof => "end of expression",
            TokenKind::Error => "invalid character",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Source text; for strings, the unquoted contents
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    pos: usize,
    current: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            pos: 0,
            current,
        }
    }

    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current;
        self.current = self.chars.next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        c
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos;
        self.advance();
        Token::new(kind, Span::new(start, self.pos), &self.source[start..self.pos])
    }

    /// One- or two-character operator: `first` alone, or `first` followed by `=`
    fn with_optional_eq(&mut self, alone: TokenKind, with_eq: TokenKind) -> Token {
        let start = self.pos;
        self.advance();
        let kind = if self.peek() == Some('=') {
            self.advance();
            with_eq
        } else {
            alone
        };
        Token::new(kind, Span::new(start, self.pos), &self.source[start..self.pos])
    }

    fn read_ident(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        let text = &self.source[start..self.pos];
        Token::new(TokenKind::Ident, Span::new(start, self.pos), text)
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.' || c == '_') {
            self.advance();
        }
        // Exponent: 1e3, 2.5E-2
        if matches!(self.peek(), Some('e' | 'E')) {
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = &self.source[start..self.pos];
        Token::new(TokenKind::Number, Span::new(start, self.pos), text)
    }

    fn read_string(&mut self, quote: char) -> Token {
        let start = self.pos;
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.advance() {
                Some(c) if c == quote => {
                    return Token::new(TokenKind::String, Span::new(start, self.pos), value);
                }
                Some('\\') => {
                    if let Some(escaped) = self.advance() {
                        value.push(escaped);
                    }
                }
                Some(c) => value.push(c),
                None => {
                    return Token::new(
                        TokenKind::Error,
                        Span::new(start, self.pos),
                        &self.source[start..self.pos],
                    );
                }
            }
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;
        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, Span::new(start, start), "");
        };

        match c {
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '*' => self.single(TokenKind::Star),
            '/' => self.single(TokenKind::Slash),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            ',' => self.single(TokenKind::Comma),
            '<' => self.with_optional_eq(TokenKind::Less, TokenKind::LessEqual),
            '>' => self.with_optional_eq(TokenKind::Greater, TokenKind::GreaterEqual),
            '=' => self.with_optional_eq(TokenKind::Assign, TokenKind::EqualEqual),
            '!' => self.with_optional_eq(TokenKind::Error, TokenKind::NotEqual),
            '\'' | '"' => self.read_string(c),
            c if c.is_ascii_digit() || c == '.' => self.read_number(),
            c if c.is_alphabetic() || c == '_' => self.read_ident(),
            _ => self.single(TokenKind::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_subscript_comparison() {
        let tokens = Lexer::tokenize("product_price['A'] <= product_price[\"B\"]");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::LBracket,
                TokenKind::String,
                TokenKind::RBracket,
                TokenKind::LessEqual,
                TokenKind::Ident,
                TokenKind::LBracket,
                TokenKind::String,
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[0].text, "product_price");
        assert_eq!(tokens[2].text, "A");
        assert_eq!(tokens[7].text, "B");
    }

    #[test]
    fn test_tokenize_comparators() {
        assert_eq!(
            kinds("< <= > >= == != ="),
            vec![
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::EqualEqual,
                TokenKind::NotEqual,
                TokenKind::Assign,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_numbers() {
        let tokens = Lexer::tokenize("1 2.5 .5 1e3 2.5E-2");
        let texts: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Number)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, vec!["1", "2.5", ".5", "1e3", "2.5E-2"]);
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let tokens = Lexer::tokenize("product_price['A");
        assert_eq!(tokens[2].kind, TokenKind::Error);
    }

    #[test]
    fn test_unknown_character_is_error() {
        assert_eq!(kinds("a @ b")[1], TokenKind::Error);
    }

    #[test]
    fn test_spans() {
        let tokens = Lexer::tokenize("x  <= 1");
        assert_eq!(tokens[1].span, Span::new(3, 5));
    }
}
