//! Value expression parsing.
//!
//! The grammar is flat: a primary expression followed by either a filter
//! pipeline or a single binary operator with a primary right operand.
//! Parentheses are the only grouping mechanism.

use fith_core::{ParseError, ParseErrorKind, Span};

use super::parser::{Parser, adjacent, describe};
use crate::ast::expr::*;
use crate::ast::{BinaryOp, UnaryOp};
use crate::lexer::{Token, TokenKind};

impl<'src> Parser<'src> {
    /// Parse a value expression.
    pub(super) fn parse_value(&mut self) -> Result<Expr, ParseError> {
        let value = self.parse_primary()?;

        if self.check(TokenKind::Pipe) {
            return self.parse_pipe(value);
        }

        if let Some(op) = BinaryOp::from_token(self.peek().kind) {
            self.advance();
            let right = self.parse_primary()?;
            let span = value.span();
            return Ok(Expr::Binary(Box::new(BinaryExpr {
                left: value,
                op,
                right,
                span,
            })));
        }

        Ok(value)
    }

    /// Parse `| filter | filter ...` after an initial value.
    fn parse_pipe(&mut self, value: Expr) -> Result<Expr, ParseError> {
        let span = value.span();
        let mut filters = Vec::new();

        while self.eat(TokenKind::Pipe).is_some() {
            let token = self.peek();
            if token.kind != TokenKind::Identifier {
                if matches!(token.kind, TokenKind::Error | TokenKind::Eof) {
                    return Err(self.unexpected(token, "filter name"));
                }
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedIdentifier,
                    token.span,
                    format!("expected filter name after '|', found {}", describe(token)),
                ));
            }
            self.advance();
            filters.push(Filter {
                name: token.lexeme.to_string(),
                span: token.span,
            });
        }

        Ok(Expr::Pipe(Box::new(PipeExpr {
            value,
            filters,
            span,
        })))
    }

    /// Parse a primary expression.
    pub(super) fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek();

        if let Some(op) = UnaryOp::from_token(token.kind) {
            self.advance();
            let operand = self.parse_primary()?;
            return Ok(Expr::Unary(Box::new(UnaryExpr {
                op,
                operand,
                span: token.span,
            })));
        }

        match token.kind {
            TokenKind::Dot => self.parse_variable(),

            TokenKind::Identifier => self.parse_call(),

            TokenKind::StringLiteral => {
                self.advance();
                Ok(literal(LiteralKind::String(unescape(token.lexeme)), token.span))
            }

            TokenKind::IntLiteral => {
                self.advance();
                let kind = match token.lexeme.parse::<i64>() {
                    Ok(value) => LiteralKind::Int(value),
                    Err(_) => LiteralKind::Float(parse_float(token)?),
                };
                Ok(literal(kind, token.span))
            }

            TokenKind::FloatLiteral => {
                self.advance();
                Ok(literal(LiteralKind::Float(parse_float(token)?), token.span))
            }

            TokenKind::True | TokenKind::False => {
                self.advance();
                Ok(literal(LiteralKind::Bool(token.kind == TokenKind::True), token.span))
            }

            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_value()?;
                self.expect(TokenKind::RightParen)?;
                Ok(inner)
            }

            TokenKind::Error | TokenKind::Eof => Err(self.unexpected(token, "expression")),

            _ => Err(ParseError::new(
                ParseErrorKind::ExpectedExpression,
                token.span,
                format!("expected expression, found {}", describe(token)),
            )),
        }
    }

    /// Parse `.`, `.A.B` and subscripts such as `.Items[0]`.
    ///
    /// Field segments must directly follow their dot, so `.A .B` is two
    /// expressions rather than the path `.A.B`.
    fn parse_variable(&mut self) -> Result<Expr, ParseError> {
        let dot = self.expect(TokenKind::Dot)?;
        let mut path = vec![CURRENT.to_string()];

        let first = self.peek();
        if is_field_name(first.kind) && self.is_adjacent(&first) {
            self.advance();
            path.push(first.lexeme.to_string());

            loop {
                let next_dot = self.peek();
                if next_dot.kind != TokenKind::Dot || !self.is_adjacent(&next_dot) {
                    break;
                }
                let field = self.peek_nth(1);
                if !is_field_name(field.kind) || !adjacent(&next_dot, &field) {
                    break;
                }
                self.advance();
                self.advance();
                path.push(field.lexeme.to_string());
            }
        }

        let mut expr = Expr::Variable(VariableExpr {
            path,
            span: dot.span,
        });

        while self.eat(TokenKind::LeftBracket).is_some() {
            let index = self.parse_value()?;
            self.expect(TokenKind::RightBracket)?;
            expr = Expr::Index(Box::new(IndexExpr {
                object: expr,
                index,
                span: dot.span,
            }));
        }

        Ok(expr)
    }

    /// Parse `name arg arg ...`.
    ///
    /// Arguments are primaries; commas between them are skipped. The list
    /// ends at any token that cannot start an argument (`|`, a binary
    /// operator, `)`, the closing delimiter) and before an `ident =`
    /// include parameter. A leading `-` is read as subtraction, so negative
    /// arguments need parentheses.
    fn parse_call(&mut self) -> Result<Expr, ParseError> {
        let name = self.expect(TokenKind::Identifier)?;
        let mut args = Vec::new();

        loop {
            let token = self.peek();
            if token.kind == TokenKind::Comma {
                self.advance();
                continue;
            }
            if !token.kind.starts_primary() || token.kind == TokenKind::Minus {
                break;
            }
            if token.kind == TokenKind::Identifier && self.peek_nth(1).kind == TokenKind::Equal {
                break;
            }
            args.push(self.parse_primary()?);
        }

        Ok(Expr::Call(CallExpr {
            name: name.lexeme.to_string(),
            args,
            span: name.span,
        }))
    }
}

fn literal(kind: LiteralKind, span: Span) -> Expr {
    Expr::Literal(LiteralExpr { kind, span })
}

/// Identifiers and keywords may both name fields (`.end`, `.If`).
fn is_field_name(kind: TokenKind) -> bool {
    kind == TokenKind::Identifier || kind.is_keyword()
}

fn parse_float(token: Token<'_>) -> Result<f64, ParseError> {
    token.lexeme.parse::<f64>().map_err(|_| {
        ParseError::new(
            ParseErrorKind::InvalidNumber,
            token.span,
            format!("invalid number '{}'", token.lexeme),
        )
    })
}

/// Resolve backslash escapes in a string literal body.
///
/// Unknown escapes are kept verbatim.
pub(super) fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
