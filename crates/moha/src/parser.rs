//! Recursive-descent parser: tokens → [`ast`](crate::ast) nodes.
//!
//! Binary-operator precedence is handled by a small precedence-climbing
//! loop, hand-written rather than generated by a parser-combinator or
//! grammar crate — statements and expressions both dispatch on the next
//! token the same way the lexer does.

use crate::ast::{AssignTarget, BinOp, Expr, Guard, Literal, ObjectKey, Stmt, UnaryOp};
use crate::error::{CodeLoc, CompileError};
use crate::lexer::{Lexer, SpannedToken, Token};

pub struct Parser<'a> {
    file: &'a str,
    tokens: Vec<SpannedToken>,
    pos: usize,
}

/// Parses a full program (a sequence of top-level statements) from source text.
pub fn parse_program(file: &str, source: &str) -> Result<Vec<Stmt>, CompileError> {
    let stripped = crate::lexer::strip_comments(source);
    let tokens = Lexer::new(file, &stripped).tokenize()?;
    Parser::new(file, tokens).parse_program()
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(file: &'a str, tokens: Vec<SpannedToken>) -> Self {
        Self { file, tokens, pos: 0 }
    }

    fn parse_program(mut self) -> Result<Vec<Stmt>, CompileError> {
        let mut stmts = Vec::new();
        while !self.at(&Token::Eof) {
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn loc(&self) -> CodeLoc {
        self.tokens[self.pos].loc
    }

    fn at(&self, t: &Token) -> bool {
        self.peek() == t
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].token.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::new(self.file, self.loc(), message)
    }

    fn expect(&mut self, t: &Token) -> Result<(), CompileError> {
        if self.at(t) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(format!("expected {t:?}, found {:?}", self.peek())))
        }
    }

    fn expect_ident(&mut self) -> Result<String, CompileError> {
        match self.bump() {
            Token::Ident(name) => Ok(name),
            other => Err(self.error(format!("expected identifier, found {other:?}"))),
        }
    }

    // ---- statements ----

    fn parse_block(&mut self) -> Result<Vec<Stmt>, CompileError> {
        self.expect(&Token::LBrace)?;
        let mut stmts = Vec::new();
        while !self.at(&Token::RBrace) {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(&Token::RBrace)?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, CompileError> {
        let span = self.loc();
        match self.peek() {
            Token::If => self.parse_guarded(true),
            Token::Do => self.parse_guarded(false),
            Token::Def => self.parse_def(),
            Token::Return => {
                self.bump();
                let value = self.parse_expr()?;
                self.expect(&Token::Semi)?;
                Ok(Stmt::Return(value, span))
            }
            Token::Abort => {
                self.bump();
                let value = self.parse_expr()?;
                self.expect(&Token::Semi)?;
                Ok(Stmt::Abort(value, span))
            }
            Token::Pass => {
                self.bump();
                self.expect(&Token::Semi)?;
                Ok(Stmt::Pass(span))
            }
            Token::Import => self.parse_import(span),
            Token::From => self.parse_import_from(span),
            Token::Export => self.parse_export(span),
            _ => self.parse_expr_or_assign(span),
        }
    }

    /// `if`/`do` guarded commands: one or more `(cond) { body }` clauses,
    /// the first whose condition is true runs and the statement exits; `if`
    /// with no matching guard is a no-op that falls through to the
    /// enclosing EXIT semantics, `do` repeats until none match.
    fn parse_guarded(&mut self, is_if: bool) -> Result<Stmt, CompileError> {
        let span = self.loc();
        self.bump(); // `if` or `do`
        let mut guards = Vec::new();
        loop {
            self.expect(&Token::LParen)?;
            let cond = self.parse_expr()?;
            self.expect(&Token::RParen)?;
            let body = self.parse_block()?;
            guards.push(Guard { cond, body });
            if self.at(&Token::Comma) {
                self.bump();
                continue;
            }
            // Guard clauses also chain by simple juxtaposition, with no
            // separator between one `{ body }` and the next `(cond)`
            // (`if (a) { .. } (b) { .. }`).
            if self.at(&Token::LParen) {
                continue;
            }
            break;
        }
        self.expect(&Token::Semi).or_else(|_| Ok(()))?;
        Ok(if is_if {
            Stmt::If { guards, span }
        } else {
            Stmt::Do { guards, span }
        })
    }

    fn parse_def(&mut self) -> Result<Stmt, CompileError> {
        let span = self.loc();
        self.bump(); // def
        let name = self.expect_ident()?;
        let params = self.parse_param_list()?;
        let body = self.parse_block()?;
        Ok(Stmt::Def { name, params, body, span })
    }

    fn parse_param_list(&mut self) -> Result<Vec<String>, CompileError> {
        self.expect(&Token::LParen)?;
        let mut params = Vec::new();
        while !self.at(&Token::RParen) {
            params.push(self.expect_ident()?);
            if self.at(&Token::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(&Token::RParen)?;
        Ok(params)
    }

    fn parse_import(&mut self, span: CodeLoc) -> Result<Stmt, CompileError> {
        self.bump(); // import
        let path = self.expect_string()?;
        self.expect(&Token::Semi)?;
        Ok(Stmt::Import { path, span })
    }

    fn parse_import_from(&mut self, span: CodeLoc) -> Result<Stmt, CompileError> {
        self.bump(); // from
        let path = self.expect_string()?;
        self.expect(&Token::Import)?;
        let mut members = vec![self.expect_ident()?];
        while self.at(&Token::Comma) {
            self.bump();
            members.push(self.expect_ident()?);
        }
        self.expect(&Token::Semi)?;
        Ok(Stmt::ImportFrom { members, path, span })
    }

    fn parse_export(&mut self, span: CodeLoc) -> Result<Stmt, CompileError> {
        self.bump(); // export
        let mut names = vec![self.expect_ident()?];
        while self.at(&Token::Comma) {
            self.bump();
            names.push(self.expect_ident()?);
        }
        self.expect(&Token::Semi)?;
        Ok(Stmt::Export { names, span })
    }

    fn expect_string(&mut self) -> Result<String, CompileError> {
        match self.bump() {
            Token::Str(s) => Ok(s),
            other => Err(self.error(format!("expected string literal, found {other:?}"))),
        }
    }

    fn parse_expr_or_assign(&mut self, span: CodeLoc) -> Result<Stmt, CompileError> {
        let expr = self.parse_expr()?;
        if self.at(&Token::Assign) {
            self.bump();
            let target = expr_to_assign_target(expr, self)?;
            let value = self.parse_expr()?;
            self.expect(&Token::Semi)?;
            return Ok(Stmt::Assign { target, value, span });
        }
        self.expect(&Token::Semi)?;
        Ok(Stmt::Expr(expr))
    }

    // ---- expressions, precedence-climbing ----

    fn parse_expr(&mut self) -> Result<Expr, CompileError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_and()?;
        while self.at(&Token::OrOr) {
            let span = self.loc();
            self.bump();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right), span);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_not()?;
        while self.at(&Token::AndAnd) {
            let span = self.loc();
            self.bump();
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right), span);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, CompileError> {
        if self.at(&Token::Not) {
            let span = self.loc();
            self.bump();
            let expr = self.parse_not()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(expr),
                span,
            });
        }
        self.parse_in()
    }

    fn parse_in(&mut self) -> Result<Expr, CompileError> {
        let elem = self.parse_comparison()?;
        if self.at(&Token::In) {
            let span = self.loc();
            self.bump();
            let pool = self.parse_comparison()?;
            return Ok(Expr::In {
                elem: Box::new(elem),
                pool: Box::new(pool),
                span,
            });
        }
        Ok(elem)
    }

    fn parse_comparison(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_bitor()?;
        loop {
            let op = match self.peek() {
                Token::Eq => BinOp::Eq,
                Token::Ne => BinOp::Ne,
                Token::Lt => BinOp::Lt,
                Token::Le => BinOp::Le,
                Token::Gt => BinOp::Gt,
                Token::Ge => BinOp::Ge,
                _ => break,
            };
            let span = self.loc();
            self.bump();
            let right = self.parse_bitor()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_bitor(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_bitxor()?;
        while self.at(&Token::Pipe) {
            let span = self.loc();
            self.bump();
            let right = self.parse_bitxor()?;
            left = Expr::Binary {
                op: BinOp::BitOr,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_bitxor(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_bitand()?;
        while self.at(&Token::Caret) {
            let span = self.loc();
            self.bump();
            let right = self.parse_bitand()?;
            left = Expr::Binary {
                op: BinOp::BitXor,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_bitand(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_shift()?;
        while self.at(&Token::Amp) {
            let span = self.loc();
            self.bump();
            let right = self.parse_shift()?;
            left = Expr::Binary {
                op: BinOp::BitAnd,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_shift(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Token::Shl => BinOp::LShift,
                Token::Shr => BinOp::RShift,
                _ => break,
            };
            let span = self.loc();
            self.bump();
            let right = self.parse_additive()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            let span = self.loc();
            self.bump();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Mod,
                _ => break,
            };
            let span = self.loc();
            self.bump();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, CompileError> {
        let span = self.loc();
        let op = match self.peek() {
            Token::Minus => Some(UnaryOp::Neg),
            Token::Plus => Some(UnaryOp::Pos),
            Token::Tilde => Some(UnaryOp::Invert),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let expr = self.parse_unary()?;
            return Ok(Expr::Unary {
                op,
                expr: Box::new(expr),
                span,
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Token::Dot => {
                    let span = self.loc();
                    self.bump();
                    let name = self.expect_ident()?;
                    expr = Expr::Attr {
                        target: Box::new(expr),
                        name,
                        span,
                    };
                }
                Token::LBracket => {
                    let span = self.loc();
                    self.bump();
                    let index = self.parse_expr()?;
                    self.expect(&Token::RBracket)?;
                    expr = Expr::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                        span,
                    };
                }
                Token::LParen => {
                    let span = self.loc();
                    self.bump();
                    let mut args = Vec::new();
                    while !self.at(&Token::RParen) {
                        args.push(self.parse_expr()?);
                        if self.at(&Token::Comma) {
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    self.expect(&Token::RParen)?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        span,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, CompileError> {
        let span = self.loc();
        match self.peek().clone() {
            Token::Int(v) => {
                self.bump();
                Ok(Expr::Literal(Literal::Int(v), span))
            }
            Token::Float(v) => {
                self.bump();
                Ok(Expr::Literal(Literal::Float(v), span))
            }
            Token::Str(s) => {
                self.bump();
                Ok(Expr::Literal(Literal::Str(s), span))
            }
            Token::True => {
                self.bump();
                Ok(Expr::Literal(Literal::Bool(true), span))
            }
            Token::False => {
                self.bump();
                Ok(Expr::Literal(Literal::Bool(false), span))
            }
            Token::Null => {
                self.bump();
                Ok(Expr::Literal(Literal::Null, span))
            }
            Token::Ident(name) => {
                self.bump();
                Ok(Expr::Identifier(name, span))
            }
            Token::LParen => {
                self.bump();
                let expr = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            Token::LBracket => self.parse_array_literal(span),
            Token::LBrace => self.parse_object_literal(span),
            Token::Def => self.parse_closure(span),
            other => Err(self.error(format!("unexpected token {other:?} in expression"))),
        }
    }

    fn parse_array_literal(&mut self, span: CodeLoc) -> Result<Expr, CompileError> {
        self.bump(); // [
        let mut items = Vec::new();
        while !self.at(&Token::RBracket) {
            items.push(self.parse_expr()?);
            if self.at(&Token::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(&Token::RBracket)?;
        Ok(Expr::ArrayLiteral(items, span))
    }

    fn parse_object_literal(&mut self, span: CodeLoc) -> Result<Expr, CompileError> {
        self.bump(); // {
        let mut entries = Vec::new();
        while !self.at(&Token::RBrace) {
            let key = match self.bump() {
                Token::Ident(name) => ObjectKey::Ident(name),
                Token::Str(s) => ObjectKey::Str(s),
                other => return Err(self.error(format!("expected object key, found {other:?}"))),
            };
            self.expect(&Token::Colon)?;
            let value = self.parse_expr()?;
            entries.push((key, value));
            if self.at(&Token::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(&Token::RBrace)?;
        Ok(Expr::ObjectLiteral(entries, span))
    }

    fn parse_closure(&mut self, span: CodeLoc) -> Result<Expr, CompileError> {
        self.bump(); // def
        let params = self.parse_param_list()?;
        let body = self.parse_block()?;
        Ok(Expr::Closure { params, body, span })
    }
}

/// Converts an already-parsed expression into an assignment target, rejecting
/// anything that is not a bare name or a member access.
fn expr_to_assign_target(expr: Expr, parser: &Parser<'_>) -> Result<AssignTarget, CompileError> {
    match expr {
        Expr::Identifier(name, _) => Ok(AssignTarget::Var(name)),
        Expr::Index { target, index, .. } => Ok(AssignTarget::Member {
            object: target,
            key: index,
        }),
        Expr::Attr { target, name, span } => Ok(AssignTarget::Member {
            object: target,
            key: Box::new(Expr::Literal(Literal::Str(name), span)),
        }),
        other => Err(parser.error(format!("invalid assignment target: {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_assignment() {
        let stmts = parse_program("t.mo", "x = 1 + 2;").unwrap();
        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Stmt::Assign { target, value, .. } => {
                assert_eq!(*target, AssignTarget::Var("x".to_owned()));
                assert!(matches!(value, Expr::Binary { op: BinOp::Add, .. }));
            }
            other => panic!("expected assign, got {other:?}"),
        }
    }

    #[test]
    fn parses_guarded_if_with_multiple_clauses() {
        let stmts = parse_program("t.mo", "if (x) { y = 1; }, (z) { y = 2; };").unwrap();
        match &stmts[0] {
            Stmt::If { guards, .. } => assert_eq!(guards.len(), 2),
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn parses_def_with_params_and_return() {
        let stmts = parse_program("t.mo", "def add(a, b) { return a + b; }").unwrap();
        match &stmts[0] {
            Stmt::Def { name, params, body, .. } => {
                assert_eq!(name, "add");
                assert_eq!(params, &["a".to_owned(), "b".to_owned()]);
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected def, got {other:?}"),
        }
    }

    #[test]
    fn parses_call_index_and_attr_chain() {
        let stmts = parse_program("t.mo", "y = a.b[0](1, 2);").unwrap();
        match &stmts[0] {
            Stmt::Assign { value, .. } => assert!(matches!(value, Expr::Call { .. })),
            other => panic!("expected assign, got {other:?}"),
        }
    }

    #[test]
    fn parses_import_and_export() {
        let stmts = parse_program("t.mo", "import \"libs/foo\";\nfrom \"bar\" import x, y;\nexport x;").unwrap();
        assert!(matches!(stmts[0], Stmt::Import { .. }));
        assert!(matches!(stmts[1], Stmt::ImportFrom { .. }));
        assert!(matches!(stmts[2], Stmt::Export { .. }));
    }

    #[test]
    fn and_or_short_circuit_precedence() {
        let stmts = parse_program("t.mo", "z = a && b || c;").unwrap();
        match &stmts[0] {
            Stmt::Assign { value, .. } => assert!(matches!(value, Expr::Or(..))),
            other => panic!("expected assign, got {other:?}"),
        }
    }
}
