use super::ast::{BinaryOp, Expr, Key, Relation};
use super::error::InjectionError;
use super::lexer::{Lexer, Span, Token, TokenKind};
use crate::domain::ConstraintType;

/// Deepest allowed nesting of parentheses and unary signs
pub const MAX_NESTING_DEPTH: usize = 256;

/// Most binary operators a single relation may contain
pub const MAX_OPERATORS: usize = 1024;

/// Recursive-descent parser for a single relational expression
///
/// ```text
/// relation := expr comparator expr EOF
/// expr     := term (('+' | '-') term)*
/// term     := unary (('*' | '/') unary)*
/// unary    := ('-' | '+') unary | primary
/// primary  := NUMBER | NAME | NAME '[' key ']' | '(' expr ')'
/// key      := STRING | STRING ',' price | '(' STRING ',' price ')'
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    operators: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            operators: 0,
        }
    }

    pub fn parse(source: &str) -> Result<Relation, InjectionError> {
        let tokens = Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_relation()
    }

    fn current(&self) -> &Token {
        // The lexer always terminates the stream with Eof
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self, expected: &str) -> InjectionError {
        let token = self.current();
        if token.kind == TokenKind::Error {
            return InjectionError::InvalidCharacter {
                text: token.text.clone(),
                span: token.span,
            };
        }
        let found = match token.kind {
            TokenKind::Eof => token.kind.to_string(),
            _ => format!("{} '{}'", token.kind, token.text),
        };
        InjectionError::UnexpectedToken {
            expected: expected.to_string(),
            found,
            span: token.span,
        }
    }

    fn descend(&mut self, span: Span) -> Result<(), InjectionError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(InjectionError::TooDeep {
                limit: MAX_NESTING_DEPTH,
                span,
            });
        }
        Ok(())
    }

    fn count_operator(&mut self, span: Span) -> Result<(), InjectionError> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(InjectionError::TooManyOperators {
                limit: MAX_OPERATORS,
                span,
            });
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, InjectionError> {
        if self.peek_kind() == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn parse_relation(&mut self) -> Result<Relation, InjectionError> {
        let lhs = self.parse_expr()?;
        let comparator = self.parse_comparator()?;
        let rhs = self.parse_expr()?;

        match self.peek_kind() {
            TokenKind::Eof => Ok(Relation {
                lhs,
                comparator,
                rhs,
            }),
            kind if is_comparator(kind) => Err(InjectionError::ChainedComparison {
                span: self.current().span,
            }),
            _ => Err(self.unexpected("end of expression")),
        }
    }

    fn parse_comparator(&mut self) -> Result<ConstraintType, InjectionError> {
        let token = self.current().clone();
        let comparator = match token.kind {
            TokenKind::LessEqual => ConstraintType::LessThanOrEqual,
            TokenKind::GreaterEqual => ConstraintType::GreaterThanOrEqual,
            TokenKind::EqualEqual => ConstraintType::Equal,
            TokenKind::Less | TokenKind::Greater => {
                return Err(InjectionError::StrictInequality {
                    op: token.text,
                    span: token.span,
                })
            }
            TokenKind::NotEqual => return Err(InjectionError::NotEqual { span: token.span }),
            TokenKind::Assign => return Err(InjectionError::Assignment { span: token.span }),
            TokenKind::Eof => return Err(InjectionError::MissingComparator),
            _ => return Err(self.unexpected("'<=', '>=' or '=='")),
        };
        self.advance();
        Ok(comparator)
    }

    fn parse_expr(&mut self) -> Result<Expr, InjectionError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            let span = self.advance().span;
            self.count_operator(span)?;
            let rhs = self.parse_term()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_term(&mut self) -> Result<Expr, InjectionError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            let span = self.advance().span;
            self.count_operator(span)?;
            let rhs = self.parse_unary()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, InjectionError> {
        match self.peek_kind() {
            TokenKind::Minus => {
                let start = self.advance().span;
                self.descend(start)?;
                let operand = self.parse_unary();
                self.ascend();
                let operand = operand?;
                let span = start.merge(operand.span());
                Ok(Expr::Neg {
                    operand: Box::new(operand),
                    span,
                })
            }
            TokenKind::Plus => {
                let start = self.advance().span;
                self.descend(start)?;
                let operand = self.parse_unary();
                self.ascend();
                operand
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, InjectionError> {
        match self.peek_kind() {
            TokenKind::Number => {
                let token = self.advance();
                Ok(Expr::Number {
                    value: parse_number(&token.text)?,
                    span: token.span,
                })
            }
            TokenKind::Ident => {
                let token = self.advance();
                if self.peek_kind() != TokenKind::LBracket {
                    return Ok(Expr::Name {
                        name: token.text,
                        span: token.span,
                    });
                }
                self.advance();
                let key = self.parse_key()?;
                let end = self.expect(TokenKind::RBracket)?.span;
                Ok(Expr::Subscript {
                    name: token.text,
                    key,
                    span: token.span.merge(end),
                })
            }
            TokenKind::LParen => {
                let start = self.advance().span;
                self.descend(start)?;
                let expr = self.parse_expr();
                self.ascend();
                let expr = expr?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(self.unexpected("number, name or '('")),
        }
    }

    fn parse_key(&mut self) -> Result<Key, InjectionError> {
        if self.peek_kind() == TokenKind::LParen {
            self.advance();
            let key = self.parse_key_items()?;
            self.expect(TokenKind::RParen)?;
            return Ok(key);
        }
        self.parse_key_items()
    }

    fn parse_key_items(&mut self) -> Result<Key, InjectionError> {
        let product_id = self.expect(TokenKind::String)?.text;
        if self.peek_kind() != TokenKind::Comma {
            return Ok(Key::Product(product_id));
        }
        self.advance();

        let negative = if self.peek_kind() == TokenKind::Minus {
            self.advance();
            true
        } else {
            false
        };
        let price = parse_number(&self.expect(TokenKind::Number)?.text)?;
        Ok(Key::ProductPrice(
            product_id,
            if negative { -price } else { price },
        ))
    }
}

fn is_comparator(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::LessEqual
            | TokenKind::GreaterEqual
            | TokenKind::EqualEqual
            | TokenKind::Less
            | TokenKind::Greater
            | TokenKind::NotEqual
            | TokenKind::Assign
    )
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    let span: Span = lhs.span().merge(rhs.span());
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        span,
    }
}

fn parse_number(text: &str) -> Result<f64, InjectionError> {
    let cleaned = text.replace('_', "");
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InjectionError::InvalidNumber(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_comparison() {
        let relation = Parser::parse("product_price['A'] <= product_price['B']").unwrap();
        assert_eq!(relation.comparator, ConstraintType::LessThanOrEqual);
        match (&relation.lhs, &relation.rhs) {
            (
                Expr::Subscript {
                    name: l,
                    key: Key::Product(a),
                    ..
                },
                Expr::Subscript {
                    name: r,
                    key: Key::Product(b),
                    ..
                },
            ) => {
                assert_eq!(l, "product_price");
                assert_eq!(r, "product_price");
                assert_eq!(a, "A");
                assert_eq!(b, "B");
            }
            other => panic!("unexpected relation: {:?}", other),
        }
    }

    #[test]
    fn test_parse_selection_keys() {
        for source in ["x['A', 1.5] == 1", "x[('A', 1.5)] == 1"] {
            let relation = Parser::parse(source).unwrap();
            match relation.lhs {
                Expr::Subscript {
                    key: Key::ProductPrice(product, price),
                    ..
                } => {
                    assert_eq!(product, "A");
                    assert_eq!(price, 1.5);
                }
                other => panic!("unexpected lhs for {source}: {:?}", other),
            }
        }
    }

    #[test]
    fn test_precedence() {
        let relation = Parser::parse("1 + 2 * product_sales['A'] >= 3").unwrap();
        match relation.lhs {
            Expr::Binary {
                op: BinaryOp::Add,
                rhs,
                ..
            } => assert!(matches!(*rhs, Expr::Binary { op: BinaryOp::Mul, .. })),
            other => panic!("unexpected lhs: {:?}", other),
        }
    }

    #[test]
    fn test_strict_inequality_is_rejected() {
        let err = Parser::parse("product_price['A'] < product_price['B']").unwrap_err();
        assert!(matches!(err, InjectionError::StrictInequality { ref op, .. } if op == "<"));

        let err = Parser::parse("product_price['A'] > 1").unwrap_err();
        assert!(matches!(err, InjectionError::StrictInequality { ref op, .. } if op == ">"));
    }

    #[test]
    fn test_other_comparators_are_rejected() {
        assert!(matches!(
            Parser::parse("product_price['A'] != 1"),
            Err(InjectionError::NotEqual { .. })
        ));
        assert!(matches!(
            Parser::parse("product_price['A'] = 1"),
            Err(InjectionError::Assignment { .. })
        ));
        assert!(matches!(
            Parser::parse("product_price['A']"),
            Err(InjectionError::MissingComparator)
        ));
    }

    #[test]
    fn test_chained_comparison_is_rejected() {
        let err = Parser::parse("0.5 <= product_price['A'] <= 1.5").unwrap_err();
        assert!(matches!(err, InjectionError::ChainedComparison { .. }));
    }

    #[test]
    fn test_malformed_syntax() {
        assert!(matches!(
            Parser::parse("product_price['A' <= 1"),
            Err(InjectionError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            Parser::parse("product_price['A'] <= (1 + 2"),
            Err(InjectionError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            Parser::parse("product_price['A'] <= 1 1"),
            Err(InjectionError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            Parser::parse("product_price['A'] <= 1 $"),
            Err(InjectionError::InvalidCharacter { .. })
        ));
    }

    #[test]
    fn test_invalid_number() {
        assert!(matches!(
            Parser::parse("product_price['A'] <= 1.2.3"),
            Err(InjectionError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_deep_parentheses_are_rejected() {
        let n = 10_000;
        let source = format!("{}1{} <= 1", "(".repeat(n), ")".repeat(n));
        assert!(matches!(
            Parser::parse(&source),
            Err(InjectionError::TooDeep { limit: MAX_NESTING_DEPTH, .. })
        ));
    }

    #[test]
    fn test_long_sign_runs_are_rejected() {
        let minus = format!("{}1 <= 1", "-".repeat(10_000));
        assert!(matches!(
            Parser::parse(&minus),
            Err(InjectionError::TooDeep { .. })
        ));

        let plus = format!("{}1 <= 1", "+".repeat(10_000));
        assert!(matches!(
            Parser::parse(&plus),
            Err(InjectionError::TooDeep { .. })
        ));
    }

    #[test]
    fn test_operator_count_is_bounded() {
        let sum = vec!["1"; 10_000].join(" + ");
        assert!(matches!(
            Parser::parse(&format!("{} <= 1", sum)),
            Err(InjectionError::TooManyOperators { limit: MAX_OPERATORS, .. })
        ));
    }

    #[test]
    fn test_nesting_within_limit_parses() {
        let n = MAX_NESTING_DEPTH / 2;
        let source = format!("{}1{} <= 1", "(".repeat(n), ")".repeat(n));
        assert!(Parser::parse(&source).is_ok());

        let sum = vec!["product_sales['A']"; 500].join(" + ");
        assert!(Parser::parse(&format!("{} >= 1", sum)).is_ok());
    }
}
