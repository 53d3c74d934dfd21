//! Template structure parsing: text, output actions and directives.

use fith_core::{ParseError, ParseErrorKind, Span};

use super::expr_parser::unescape;
use super::parser::{Parser, describe};
use crate::ast::{
    BlockNode, ExtendsNode, IfNode, IncludeNode, IncludeParam, Node, RANGE_KEY_VAR,
    RANGE_VALUE_VAR, RangeNode, TextNode,
};
use crate::lexer::TokenKind;

/// How a directive body was terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyEnd {
    Else,
    End,
}

impl<'src> Parser<'src> {
    /// Parse nodes until end of input.
    pub(super) fn parse_top_level(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => return Ok(nodes),
                TokenKind::OpenDelim => {
                    let keyword = self.peek_nth(1);
                    if matches!(keyword.kind, TokenKind::Else | TokenKind::End) {
                        return Err(ParseError::new(
                            ParseErrorKind::UnexpectedToken,
                            keyword.span,
                            format!("{} without a matching if, range or block", keyword.kind),
                        ));
                    }
                    nodes.push(self.parse_action()?);
                }
                _ => nodes.push(self.parse_text()?),
            }
        }
    }

    /// Parse a directive body up to `{{else}}` or `{{end}}`, consuming the
    /// terminating action.
    fn parse_body(&mut self, construct: &str, start: Span, allow_else: bool) -> Result<(Vec<Node>, BodyEnd), ParseError> {
        let mut nodes = Vec::new();
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => return Err(ParseError::missing_end(start, construct)),
                TokenKind::OpenDelim => {
                    let keyword = self.peek_nth(1);
                    match keyword.kind {
                        TokenKind::End => {
                            self.advance();
                            self.advance();
                            self.expect_close()?;
                            return Ok((nodes, BodyEnd::End));
                        }
                        TokenKind::Else if allow_else => {
                            self.advance();
                            self.advance();
                            self.expect_close()?;
                            return Ok((nodes, BodyEnd::Else));
                        }
                        TokenKind::Else => {
                            return Err(ParseError::new(
                                ParseErrorKind::UnexpectedToken,
                                keyword.span,
                                format!("unexpected {{{{else}}}} in {construct}"),
                            ));
                        }
                        _ => nodes.push(self.parse_action()?),
                    }
                }
                _ => nodes.push(self.parse_text()?),
            }
        }
    }

    fn parse_text(&mut self) -> Result<Node, ParseError> {
        let token = self.expect(TokenKind::Text)?;
        Ok(Node::Text(TextNode {
            text: token.lexeme.to_string(),
            span: token.span,
        }))
    }

    /// Parse one `{{ ... }}` action, starting at the opening delimiter.
    fn parse_action(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::OpenDelim)?;
        let token = self.peek();
        match token.kind {
            TokenKind::If => self.parse_if(),
            TokenKind::Range => self.parse_range(),
            TokenKind::Include => self.parse_include(),
            TokenKind::Extends => self.parse_extends(),
            TokenKind::Block => self.parse_block(),
            TokenKind::CloseDelim => Err(ParseError::new(
                ParseErrorKind::ExpectedExpression,
                token.span,
                "empty action",
            )),
            _ => {
                let expr = self.parse_value()?;
                self.expect_close()?;
                Ok(Node::Output(expr))
            }
        }
    }

    // =========================================
    // Control flow
    // =========================================

    /// `{{if cond}} ... [{{else}} ...] {{end}}`
    fn parse_if(&mut self) -> Result<Node, ParseError> {
        let start = self.expect(TokenKind::If)?.span;
        let condition = self.parse_value()?;
        self.expect_close()?;

        let (then_body, end) = self.parse_body("if", start, true)?;
        let else_body = match end {
            BodyEnd::Else => Some(self.parse_body("if", start, false)?.0),
            BodyEnd::End => None,
        };

        Ok(Node::If(IfNode {
            condition,
            then_body,
            else_body,
            span: start,
        }))
    }

    /// `{{range collection}} ... [{{else}} ...] {{end}}`
    fn parse_range(&mut self) -> Result<Node, ParseError> {
        let start = self.expect(TokenKind::Range)?.span;
        let collection = self.parse_value()?;
        self.expect_close()?;

        let (body, end) = self.parse_body("range", start, true)?;
        let else_body = match end {
            BodyEnd::Else => Some(self.parse_body("range", start, false)?.0),
            BodyEnd::End => None,
        };

        Ok(Node::Range(RangeNode {
            value_var: RANGE_VALUE_VAR.to_string(),
            key_var: Some(RANGE_KEY_VAR.to_string()),
            collection,
            body,
            else_body,
            span: start,
        }))
    }

    // =========================================
    // Composition
    // =========================================

    /// `{{include "name" [key=value ...] [context]}}`
    ///
    /// Parameters are read while the next tokens look like `ident =`; the
    /// first other expression is the context and must be the last thing in
    /// the action.
    fn parse_include(&mut self) -> Result<Node, ParseError> {
        let start = self.expect(TokenKind::Include)?.span;
        let name = self.parse_quoted_name("include")?;

        let mut params = Vec::new();
        let mut context = None;
        loop {
            self.eat(TokenKind::Comma);
            let token = self.peek();
            if token.kind == TokenKind::CloseDelim {
                break;
            }
            if token.kind == TokenKind::Identifier && self.peek_nth(1).kind == TokenKind::Equal {
                self.advance();
                self.advance();
                let value = self.parse_value()?;
                params.push(IncludeParam {
                    name: token.lexeme.to_string(),
                    value,
                    span: token.span,
                });
                continue;
            }
            context = Some(self.parse_value()?);
            break;
        }
        self.expect_close()?;

        Ok(Node::Include(IncludeNode {
            name,
            params,
            context,
            span: start,
        }))
    }

    /// `{{extends "name"}}`
    fn parse_extends(&mut self) -> Result<Node, ParseError> {
        let start = self.expect(TokenKind::Extends)?.span;
        let parent = self.parse_quoted_name("extends")?;
        self.expect_close()?;
        Ok(Node::Extends(ExtendsNode { parent, span: start }))
    }

    /// `{{block "name"}} default {{end}}`
    fn parse_block(&mut self) -> Result<Node, ParseError> {
        let start = self.expect(TokenKind::Block)?.span;
        let token = self.peek();
        let name = match token.kind {
            TokenKind::StringLiteral | TokenKind::Identifier => {
                self.advance();
                token.lexeme.to_string()
            }
            _ => return Err(self.expected_name(token, "block")),
        };
        self.expect_close()?;

        let (body, _) = self.parse_body("block", start, false)?;
        Ok(Node::Block(BlockNode {
            name,
            body,
            span: start,
        }))
    }

    fn parse_quoted_name(&mut self, directive: &str) -> Result<String, ParseError> {
        let token = self.peek();
        if token.kind != TokenKind::StringLiteral {
            return Err(self.expected_name(token, directive));
        }
        self.advance();
        Ok(unescape(token.lexeme))
    }

    fn expected_name(&mut self, token: crate::lexer::Token<'src>, directive: &str) -> ParseError {
        if matches!(token.kind, TokenKind::Error | TokenKind::Eof) {
            return self.unexpected(token, "template name");
        }
        ParseError::new(
            ParseErrorKind::ExpectedName,
            token.span,
            format!("expected quoted name after '{directive}', found {}", describe(token)),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use fith_core::ParseErrorKind;

    fn parse(source: &str) -> Template {
        Parser::parse(source).unwrap()
    }

    fn parse_err(source: &str) -> fith_core::ParseError {
        Parser::parse(source).unwrap_err()
    }

    // =========================================
    // Structure
    // =========================================

    #[test]
    fn text_and_output() {
        let template = parse("Hello, {{.Name}}!");
        assert_eq!(template.nodes.len(), 3);
        assert!(matches!(&template.nodes[0], Node::Text(t) if t.text == "Hello, "));
        assert!(matches!(&template.nodes[1], Node::Output(Expr::Variable(v)) if v.path == [".", "Name"]));
        assert!(matches!(&template.nodes[2], Node::Text(t) if t.text == "!"));
    }

    #[test]
    fn empty_template() {
        assert!(parse("").nodes.is_empty());
    }

    #[test]
    fn if_else() {
        let template = parse("{{if .A}}yes{{else}}no{{end}}");
        let Node::If(node) = &template.nodes[0] else {
            panic!("expected if");
        };
        assert_eq!(node.then_body.len(), 1);
        assert_eq!(node.else_body.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn nested_if_in_else() {
        let template = parse("{{if .A}}a{{else}}{{if .B}}b{{end}}{{end}}");
        let Node::If(outer) = &template.nodes[0] else {
            panic!("expected if");
        };
        let else_body = outer.else_body.as_ref().unwrap();
        assert!(matches!(else_body[0], Node::If(_)));
    }

    #[test]
    fn range_with_else() {
        let template = parse("{{range .Items}}{{.}}{{else}}none{{end}}");
        let Node::Range(node) = &template.nodes[0] else {
            panic!("expected range");
        };
        assert_eq!(node.value_var, ".");
        assert_eq!(node.key_var.as_deref(), Some("@key"));
        assert_eq!(node.body.len(), 1);
        assert!(node.else_body.is_some());
    }

    #[test]
    fn block_with_default() {
        let template = parse(r#"{{block "title"}}Default{{end}}"#);
        let Node::Block(block) = &template.nodes[0] else {
            panic!("expected block");
        };
        assert_eq!(block.name, "title");
        assert_eq!(block.body.len(), 1);
    }

    #[test]
    fn extends_directive() {
        let template = parse("  {{extends \"base\"}}{{block \"content\"}}x{{end}}");
        assert_eq!(template.extends().map(|e| e.parent.as_str()), Some("base"));
    }

    #[test]
    fn quoted_names_are_unescaped() {
        let template = parse(r#"{{extends "a\\b"}}{{include "say \"hi\""}}{{block "t\tab"}}{{end}}"#);
        assert_eq!(template.extends().map(|e| e.parent.as_str()), Some(r"a\b"));
        let Node::Include(include) = &template.nodes[1] else {
            panic!("expected include");
        };
        assert_eq!(include.name, r#"say "hi""#);
        let Node::Block(block) = &template.nodes[2] else {
            panic!("expected block");
        };
        assert_eq!(block.name, "t\tab");
    }

    // =========================================
    // Include
    // =========================================

    #[test]
    fn include_plain() {
        let template = parse(r#"{{include "header"}}"#);
        let Node::Include(inc) = &template.nodes[0] else {
            panic!("expected include");
        };
        assert_eq!(inc.name, "header");
        assert!(inc.params.is_empty());
        assert!(inc.context.is_none());
    }

    #[test]
    fn include_params() {
        let template = parse(r#"{{include "card" title=.Title, count=3}}"#);
        let Node::Include(inc) = &template.nodes[0] else {
            panic!("expected include");
        };
        let names: Vec<_> = inc.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["title", "count"]);
        assert!(inc.context.is_none());
    }

    #[test]
    fn include_context() {
        let template = parse(r#"{{include "user" .User}}"#);
        let Node::Include(inc) = &template.nodes[0] else {
            panic!("expected include");
        };
        assert!(matches!(&inc.context, Some(Expr::Variable(v)) if v.path == [".", "User"]));
    }

    #[test]
    fn include_params_then_context() {
        let template = parse(r#"{{include "user" a=1 .User}}"#);
        let Node::Include(inc) = &template.nodes[0] else {
            panic!("expected include");
        };
        assert_eq!(inc.params.len(), 1);
        assert!(inc.context.is_some());
    }

    #[test]
    fn include_rejects_tokens_after_context() {
        let err = parse_err(r#"{{include "user" .User a=1}}"#);
        assert_eq!(err.kind, ParseErrorKind::MissingCloseDelimiter);
    }

    #[test]
    fn include_requires_quoted_name() {
        let err = parse_err("{{include header}}");
        assert_eq!(err.kind, ParseErrorKind::ExpectedName);
    }

    // =========================================
    // Errors
    // =========================================

    #[test]
    fn missing_end() {
        let err = parse_err("{{if .A}}never closed");
        assert_eq!(err.kind, ParseErrorKind::MissingEnd);
        assert_eq!(err.span.line, 1);
        assert_eq!(err.span.col, 3);
    }

    #[test]
    fn stray_end() {
        let err = parse_err("text{{end}}");
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
    }

    #[test]
    fn else_in_block() {
        let err = parse_err(r#"{{block "a"}}x{{else}}y{{end}}"#);
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
    }

    #[test]
    fn missing_close_delimiter() {
        let err = parse_err("{{.Name");
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);

        let err = parse_err("{{.Name )}}");
        assert_eq!(err.kind, ParseErrorKind::MissingCloseDelimiter);
    }

    #[test]
    fn empty_action() {
        assert_eq!(parse_err("{{ }}").kind, ParseErrorKind::ExpectedExpression);
    }

    #[test]
    fn lexical_error_position() {
        let err = parse_err("line one\n{{ .A & .B }}");
        assert_eq!(err.kind, ParseErrorKind::Lexical);
        assert_eq!((err.span.line, err.span.col), (2, 7));
    }

    #[test]
    fn deterministic_ast() {
        let source = "{{range .Items}}{{@index}}:{{.}} {{end}}";
        assert_eq!(parse(source), parse(source));
    }
}
