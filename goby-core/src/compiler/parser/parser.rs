//! Goby 语法分析器
//!
//! 自顶向下的递归下降解析器，表达式部分采用运算符优先级爬升。
//! 换行是语句终结符；`while` 条件解析期间禁止 do 块附着（do 归属 while）。

use super::super::lexer::token_kind::GobyTokenKind;
use super::error::{ErrorLocation, ParseError, ParseErrorKind, ParseResult};
use super::expr::{
    AssignTarget, Assignment, Binary, BlockLiteral, ConstantRef, Expr, ExprKind, Identifier,
    IndexAccess, InstanceVarRef, LiteralArray, LiteralFalse, LiteralHash, LiteralInt, LiteralNil,
    LiteralString, LiteralTrue, Logical, MethodCall, RangeLiteral, SelfRef, Unary, YieldExpr,
};
use super::program::{Program, ProgramKind};
use super::stmt::{
    BeginStmt, ClassDefStmt, DefStmt, ExprStmt, IfStmt, IncludeStmt, ParamDecl, ParamKind,
    ReturnStmt, Stmt, StmtKind, WhileStmt,
};
use super::utils::{compound_assign_base, get_precedence};
use crate::kit::lexer::core::SourcePosition;
use crate::kit::lexer::scanner::Token;

pub struct Parser {
    tokens: Vec<Token<GobyTokenKind>>,
    pos: usize,
    /// while 条件解析期间为 true，此时 do 不作为块附着
    no_do_block: bool,
}

impl Parser {
    pub fn new(tokens: Vec<Token<GobyTokenKind>>) -> Self {
        Self {
            tokens,
            pos: 0,
            no_do_block: false,
        }
    }

    /// 解析整个程序（顶层语句列表）
    pub fn parse(&mut self) -> ParseResult<Program> {
        let statements = self.parse_body_until(&[])?;
        Ok(Box::new(ProgramKind { statements }))
    }

    // ==================== 基础辅助 ====================

    fn current(&self) -> Option<&Token<GobyTokenKind>> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<GobyTokenKind> {
        self.current().map(|token| token.kind)
    }

    /// 消费当前token
    fn consume(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// 检查当前token是否为指定类型
    fn check(&self, kind: GobyTokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    /// 匹配并消费指定类型的token
    fn match_token(&mut self, kind: GobyTokenKind) -> bool {
        if self.check(kind) {
            self.consume();
            true
        } else {
            false
        }
    }

    /// 获取当前token的位置信息
    fn current_location(&self) -> ErrorLocation {
        match self.current() {
            Some(token) => ErrorLocation::At(token.span.start),
            None => ErrorLocation::Eof,
        }
    }

    /// 当前行号（EOF时取最后一个token的行号）
    fn current_line(&self) -> u32 {
        let line = match self.current() {
            Some(token) => token.span.start.line,
            None => self
                .tokens
                .last()
                .map(|token| token.span.end.line)
                .unwrap_or(1),
        };
        line as u32
    }

    /// 获取当前token的文本表示（错误消息用）
    fn current_token_text(&self) -> String {
        match self.current() {
            Some(token) => match &token.text {
                Some(text) => text.clone(),
                None => format!("{:?}", token.kind),
            },
            None => "EOF".to_string(),
        }
    }

    /// 创建带有当前位置的错误
    fn error_here(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            location: self.current_location(),
        }
    }

    /// 期望并消费指定类型的token，否则返回错误
    fn expect(&mut self, kind: GobyTokenKind) -> ParseResult<()> {
        if self.match_token(kind) {
            Ok(())
        } else {
            Err(self.error_here(ParseErrorKind::UnexpectedToken {
                found: self.current_token_text(),
                expected: vec![format!("{:?}", kind)],
            }))
        }
    }

    /// 期望一个标识符，返回其名称
    fn expect_identifier(&mut self) -> ParseResult<String> {
        match self.current() {
            Some(token) if token.kind == GobyTokenKind::Identifier => {
                let name = token.text.clone().unwrap_or_default();
                self.consume();
                Ok(name)
            }
            Some(_) => Err(self.error_here(ParseErrorKind::ExpectedIdentifier {
                found: self.current_token_text(),
            })),
            None => Err(ParseError::at_eof(ParseErrorKind::UnexpectedEndOfInput)),
        }
    }

    /// 期望一个常量（大写开头），返回其名称
    fn expect_constant(&mut self) -> ParseResult<String> {
        match self.current() {
            Some(token) if token.kind == GobyTokenKind::Constant => {
                let name = token.text.clone().unwrap_or_default();
                self.consume();
                Ok(name)
            }
            Some(_) => Err(self.error_here(ParseErrorKind::ExpectedConstant {
                found: self.current_token_text(),
            })),
            None => Err(ParseError::at_eof(ParseErrorKind::UnexpectedEndOfInput)),
        }
    }

    fn check_terminator(&self) -> bool {
        self.check(GobyTokenKind::Newline) || self.check(GobyTokenKind::Semicolon)
    }

    /// 跳过换行和分号
    fn skip_terminators(&mut self) {
        while self.check_terminator() {
            self.consume();
        }
    }

    /// 跳过换行（括号内续行用）
    fn skip_newlines(&mut self) {
        while self.check(GobyTokenKind::Newline) {
            self.consume();
        }
    }

    // ==================== 语句解析 ====================

    /// 解析语句列表直到遇到stop token或EOF（stop token不消费）
    ///
    /// stops 为空表示解析到文件末尾（顶层）
    fn parse_body_until(&mut self, stops: &[GobyTokenKind]) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        loop {
            self.skip_terminators();

            match self.current_kind() {
                None => {
                    if stops.is_empty() {
                        break;
                    }
                    // 块未闭合（缺少 end 等）
                    return Err(ParseError::at_eof(ParseErrorKind::UnexpectedEndOfInput));
                }
                Some(kind) if stops.contains(&kind) => break,
                Some(_) => {}
            }

            let stmt = self.parse_statement()?;
            statements.push(stmt);

            // 语句后必须是终结符、stop token或EOF
            match self.current_kind() {
                None => {}
                Some(kind) if stops.contains(&kind) => {}
                Some(GobyTokenKind::Newline) | Some(GobyTokenKind::Semicolon) => {}
                Some(_) => {
                    return Err(self.error_here(ParseErrorKind::UnexpectedToken {
                        found: self.current_token_text(),
                        expected: vec!["newline".to_string(), ";".to_string()],
                    }));
                }
            }
        }

        Ok(statements)
    }

    /// 解析单个语句
    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.current_kind() {
            Some(GobyTokenKind::If) => self.parse_if_statement(),
            Some(GobyTokenKind::While) => self.parse_while_statement(),
            Some(GobyTokenKind::Def) => self.parse_def_statement(),
            Some(GobyTokenKind::Class) => self.parse_class_statement(false),
            Some(GobyTokenKind::Module) => self.parse_class_statement(true),
            Some(GobyTokenKind::Include) => self.parse_include_statement(),
            Some(GobyTokenKind::Return) => self.parse_return_statement(),
            Some(GobyTokenKind::Begin) => self.parse_begin_statement(),
            Some(_) => {
                let line = self.current_line();
                let expression = self.parse_expression(0)?;
                Ok(Box::new(StmtKind::Expr(ExprStmt { expression, line })))
            }
            None => Err(ParseError::at_eof(ParseErrorKind::UnexpectedEndOfInput)),
        }
    }

    /// if cond ... [elsif cond ...] [else ...] end
    fn parse_if_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.current_line();
        self.expect(GobyTokenKind::If)?;
        let condition = self.parse_expression(0)?;
        let then_body = self.parse_body_until(&[
            GobyTokenKind::Elsif,
            GobyTokenKind::Else,
            GobyTokenKind::End,
        ])?;

        let mut elsif_branches = Vec::new();
        while self.match_token(GobyTokenKind::Elsif) {
            let elsif_condition = self.parse_expression(0)?;
            let elsif_body = self.parse_body_until(&[
                GobyTokenKind::Elsif,
                GobyTokenKind::Else,
                GobyTokenKind::End,
            ])?;
            elsif_branches.push((elsif_condition, elsif_body));
        }

        let else_body = if self.match_token(GobyTokenKind::Else) {
            Some(self.parse_body_until(&[GobyTokenKind::End])?)
        } else {
            None
        };
        self.expect(GobyTokenKind::End)?;

        Ok(Box::new(StmtKind::If(IfStmt {
            condition,
            then_body,
            elsif_branches,
            else_body,
            line,
        })))
    }

    /// while cond [do] ... end
    fn parse_while_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.current_line();
        self.expect(GobyTokenKind::While)?;

        // 条件中的 do 归属 while，不作为块
        let saved = self.no_do_block;
        self.no_do_block = true;
        let condition = self.parse_expression(0);
        self.no_do_block = saved;
        let condition = condition?;

        self.match_token(GobyTokenKind::Do);
        let body = self.parse_body_until(&[GobyTokenKind::End])?;
        self.expect(GobyTokenKind::End)?;

        Ok(Box::new(StmtKind::While(WhileStmt {
            condition,
            body,
            line,
        })))
    }

    /// def [self.]name[(params)] ... end
    fn parse_def_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.current_line();
        self.expect(GobyTokenKind::Def)?;

        let receiver_is_self = if self.check(GobyTokenKind::SelfKw) {
            self.consume();
            self.expect(GobyTokenKind::Dot)?;
            true
        } else {
            false
        };

        let name = self.parse_method_name()?;
        let params = if self.match_token(GobyTokenKind::LeftParenthesis) {
            self.parse_param_list()?
        } else {
            Vec::new()
        };

        let body = self.parse_body_until(&[GobyTokenKind::End])?;
        self.expect(GobyTokenKind::End)?;

        Ok(Box::new(StmtKind::Def(DefStmt {
            name,
            receiver_is_self,
            params,
            body,
            line,
        })))
    }

    /// def 位置的方法名：标识符或运算符
    fn parse_method_name(&mut self) -> ParseResult<String> {
        let name = match self.current_kind() {
            Some(GobyTokenKind::Identifier) => {
                let name = self
                    .current()
                    .and_then(|token| token.text.clone())
                    .unwrap_or_default();
                self.consume();
                return Ok(name);
            }
            Some(GobyTokenKind::Plus) => "+",
            Some(GobyTokenKind::Minus) => "-",
            Some(GobyTokenKind::Asterisk) => "*",
            Some(GobyTokenKind::Slash) => "/",
            Some(GobyTokenKind::Percent) => "%",
            Some(GobyTokenKind::DoubleEqual) => "==",
            Some(GobyTokenKind::BangEqual) => "!=",
            Some(GobyTokenKind::LessThan) => "<",
            Some(GobyTokenKind::LessThanEqual) => "<=",
            Some(GobyTokenKind::GreaterThan) => ">",
            Some(GobyTokenKind::GreaterThanEqual) => ">=",
            Some(GobyTokenKind::Spaceship) => "<=>",
            Some(GobyTokenKind::Bang) => "!",
            Some(GobyTokenKind::LeftSquareBracket) => {
                self.consume();
                self.expect(GobyTokenKind::RightSquareBracket)?;
                let name = if self.match_token(GobyTokenKind::Equal) {
                    "[]="
                } else {
                    "[]"
                };
                return Ok(name.to_string());
            }
            _ => {
                return Err(self.error_here(ParseErrorKind::ExpectedIdentifier {
                    found: self.current_token_text(),
                }));
            }
        };
        self.consume();
        Ok(name.to_string())
    }

    /// 参数表（'(' 已消费，消费至 ')'）
    ///
    /// 顺序约束：必选在前，可选其次，splat 最后
    fn parse_param_list(&mut self) -> ParseResult<Vec<ParamDecl>> {
        let mut params = Vec::new();
        self.skip_newlines();
        if self.match_token(GobyTokenKind::RightParenthesis) {
            return Ok(params);
        }

        let mut seen_optional = false;
        let mut seen_splat = false;
        loop {
            self.skip_newlines();
            if seen_splat {
                return Err(self.error_here(ParseErrorKind::SplatNotLast));
            }

            if self.match_token(GobyTokenKind::Asterisk) {
                let name = self.expect_identifier()?;
                params.push(ParamDecl {
                    name,
                    kind: ParamKind::Splat,
                });
                seen_splat = true;
            } else {
                let name = self.expect_identifier()?;
                if self.match_token(GobyTokenKind::Equal) {
                    let default = self.parse_expression(0)?;
                    params.push(ParamDecl {
                        name,
                        kind: ParamKind::Optional(default),
                    });
                    seen_optional = true;
                } else {
                    if seen_optional {
                        return Err(self.error_here(ParseErrorKind::RequiredAfterOptional));
                    }
                    params.push(ParamDecl {
                        name,
                        kind: ParamKind::Required,
                    });
                }
            }

            self.skip_newlines();
            if self.match_token(GobyTokenKind::Comma) {
                continue;
            }
            self.expect(GobyTokenKind::RightParenthesis)?;
            break;
        }

        Ok(params)
    }

    /// class Name [< Superclass] ... end / module Name ... end
    fn parse_class_statement(&mut self, is_module: bool) -> ParseResult<Stmt> {
        let line = self.current_line();
        if is_module {
            self.expect(GobyTokenKind::Module)?;
        } else {
            self.expect(GobyTokenKind::Class)?;
        }

        let name = self.expect_constant()?;
        let superclass = if !is_module && self.match_token(GobyTokenKind::LessThan) {
            Some(self.expect_constant()?)
        } else {
            None
        };

        let body = self.parse_body_until(&[GobyTokenKind::End])?;
        self.expect(GobyTokenKind::End)?;

        Ok(Box::new(StmtKind::ClassDef(ClassDefStmt {
            name,
            superclass,
            body,
            is_module,
            line,
        })))
    }

    /// include ModuleName
    fn parse_include_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.current_line();
        self.expect(GobyTokenKind::Include)?;
        let module_name = self.expect_constant()?;
        Ok(Box::new(StmtKind::Include(IncludeStmt {
            module_name,
            line,
        })))
    }

    /// return [expr]
    fn parse_return_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.current_line();
        self.expect(GobyTokenKind::Return)?;

        let value = match self.current_kind() {
            None
            | Some(GobyTokenKind::Newline)
            | Some(GobyTokenKind::Semicolon)
            | Some(GobyTokenKind::End)
            | Some(GobyTokenKind::Else)
            | Some(GobyTokenKind::Elsif)
            | Some(GobyTokenKind::Rescue) => None,
            Some(_) => Some(self.parse_expression(0)?),
        };

        Ok(Box::new(StmtKind::Return(ReturnStmt { value, line })))
    }

    /// begin ... rescue [=> name] ... end
    fn parse_begin_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.current_line();
        self.expect(GobyTokenKind::Begin)?;

        let body = self.parse_body_until(&[GobyTokenKind::Rescue, GobyTokenKind::End])?;
        if self.check(GobyTokenKind::End) {
            // begin 必须带 rescue 子句
            return Err(self.error_here(ParseErrorKind::UnexpectedToken {
                found: self.current_token_text(),
                expected: vec!["rescue".to_string()],
            }));
        }
        self.expect(GobyTokenKind::Rescue)?;

        let rescue_var = if self.match_token(GobyTokenKind::HashRocket) {
            Some(self.expect_identifier()?)
        } else {
            None
        };

        let rescue_body = self.parse_body_until(&[GobyTokenKind::End])?;
        self.expect(GobyTokenKind::End)?;

        Ok(Box::new(StmtKind::Begin(BeginStmt {
            body,
            rescue_var,
            rescue_body,
            line,
        })))
    }

    // ==================== 表达式解析 ====================

    /// 运算符优先级爬升
    fn parse_expression(&mut self, min_precedence: i32) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let Some(kind) = self.current_kind() else {
                break;
            };
            let precedence = get_precedence(kind);
            if precedence == 0 || precedence < min_precedence {
                break;
            }

            // 赋值：右结合，同级重入
            if kind == GobyTokenKind::Equal || compound_assign_base(kind).is_some() {
                let op_position = self
                    .current()
                    .map(|token| token.span.start)
                    .unwrap_or_default();
                self.consume();
                self.skip_newlines();
                let value = self.parse_expression(precedence)?;
                left = self.make_assignment(left, kind, value, op_position)?;
                continue;
            }

            match kind {
                GobyTokenKind::AndAnd | GobyTokenKind::OrOr => {
                    self.consume();
                    self.skip_newlines();
                    let right = self.parse_expression(precedence + 1)?;
                    left = Box::new(ExprKind::Logical(Logical {
                        left,
                        op: kind,
                        right,
                    }));
                }
                GobyTokenKind::DotDot => {
                    let line = self.current_line();
                    self.consume();
                    self.skip_newlines();
                    let end = self.parse_expression(precedence + 1)?;
                    left = Box::new(ExprKind::RangeLiteral(RangeLiteral {
                        start: left,
                        end,
                        line,
                    }));
                }
                _ => {
                    let line = self.current_line();
                    self.consume();
                    self.skip_newlines();
                    let right = self.parse_expression(precedence + 1)?;
                    left = Box::new(ExprKind::Binary(Binary {
                        left,
                        op: kind,
                        right,
                        line,
                    }));
                }
            }
        }

        Ok(left)
    }

    /// 将已解析的左侧表达式转换为赋值目标；复合赋值脱糖为 a = a op b
    fn make_assignment(
        &self,
        target_expr: Expr,
        op: GobyTokenKind,
        value: Expr,
        op_position: SourcePosition,
    ) -> ParseResult<Expr> {
        let line = op_position.line as u32;
        let original = compound_assign_base(op).map(|_| target_expr.clone());

        let target = match *target_expr {
            ExprKind::Identifier(ident) => AssignTarget::Local(ident.name),
            ExprKind::InstanceVarRef(ivar) => AssignTarget::InstanceVariable(ivar.name),
            ExprKind::ConstantRef(constant) => AssignTarget::Constant(constant.name),
            ExprKind::IndexAccess(access) => AssignTarget::Index {
                receiver: access.receiver,
                index: access.index,
            },
            _ => {
                return Err(ParseError::at(
                    ParseErrorKind::InvalidAssignmentTarget,
                    op_position,
                ));
            }
        };

        let value = match compound_assign_base(op) {
            Some(base_op) => Box::new(ExprKind::Binary(Binary {
                // original 在 compound 分支必然存在
                left: original.unwrap_or_else(|| Box::new(ExprKind::LiteralNil(LiteralNil))),
                op: base_op,
                right: value,
                line,
            })),
            None => value,
        };

        Ok(Box::new(ExprKind::Assignment(Assignment {
            target,
            value,
            line,
        })))
    }

    /// 一元运算符（- !），编译为方法派发
    fn parse_unary(&mut self) -> ParseResult<Expr> {
        match self.current_kind() {
            Some(kind @ (GobyTokenKind::Minus | GobyTokenKind::Bang)) => {
                let line = self.current_line();
                self.consume();
                let operand = self.parse_unary()?;
                Ok(Box::new(ExprKind::Unary(Unary { op: kind, operand, line })))
            }
            _ => {
                let primary = self.parse_primary()?;
                self.parse_postfix(primary)
            }
        }
    }

    /// 后缀：方法调用链（.name）和索引访问（[expr]）
    fn parse_postfix(&mut self, mut expr: Expr) -> ParseResult<Expr> {
        loop {
            match self.current_kind() {
                Some(GobyTokenKind::Dot) => {
                    let line = self.current_line();
                    self.consume();
                    let name = self.parse_call_method_name()?;
                    let arguments = if self.match_token(GobyTokenKind::LeftParenthesis) {
                        self.parse_call_arguments()?
                    } else {
                        Vec::new()
                    };
                    let block = self.try_parse_block()?;
                    expr = Box::new(ExprKind::MethodCall(MethodCall {
                        receiver: Some(expr),
                        name,
                        arguments,
                        block,
                        line,
                    }));
                }
                Some(GobyTokenKind::LeftSquareBracket) => {
                    let line = self.current_line();
                    self.consume();
                    self.skip_newlines();
                    let index = self.parse_expression(0)?;
                    self.skip_newlines();
                    self.expect(GobyTokenKind::RightSquareBracket)?;
                    expr = Box::new(ExprKind::IndexAccess(IndexAccess {
                        receiver: expr,
                        index,
                        line,
                    }));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// 点号后的方法名；class/include 关键字在此作为方法名合法
    fn parse_call_method_name(&mut self) -> ParseResult<String> {
        match self.current_kind() {
            Some(GobyTokenKind::Identifier) => {
                let name = self
                    .current()
                    .and_then(|token| token.text.clone())
                    .unwrap_or_default();
                self.consume();
                Ok(name)
            }
            Some(GobyTokenKind::Class) => {
                self.consume();
                Ok("class".to_string())
            }
            Some(GobyTokenKind::Include) => {
                self.consume();
                Ok("include".to_string())
            }
            _ => Err(self.error_here(ParseErrorKind::ExpectedIdentifier {
                found: self.current_token_text(),
            })),
        }
    }

    /// 实参列表（'(' 已消费，消费至 ')'）
    fn parse_call_arguments(&mut self) -> ParseResult<Vec<Expr>> {
        // 括号内重新允许 do 块
        let saved = self.no_do_block;
        self.no_do_block = false;

        let mut arguments = Vec::new();
        self.skip_newlines();
        if self.match_token(GobyTokenKind::RightParenthesis) {
            self.no_do_block = saved;
            return Ok(arguments);
        }

        loop {
            self.skip_newlines();
            let argument = self.parse_expression(0)?;
            arguments.push(argument);
            self.skip_newlines();
            if self.match_token(GobyTokenKind::Comma) {
                continue;
            }
            self.expect(GobyTokenKind::RightParenthesis)?;
            break;
        }

        self.no_do_block = saved;
        Ok(arguments)
    }

    /// 尝试解析 do 块（do [|params|] ... end）
    fn try_parse_block(&mut self) -> ParseResult<Option<BlockLiteral>> {
        if self.no_do_block || !self.check(GobyTokenKind::Do) {
            return Ok(None);
        }
        let line = self.current_line();
        self.consume();

        let mut params = Vec::new();
        if self.match_token(GobyTokenKind::OrOr) {
            // `do ||` 空参数表，词法为单个 OrOr token
        } else if self.match_token(GobyTokenKind::Pipe) {
            if !self.match_token(GobyTokenKind::Pipe) {
                loop {
                    let name = self.expect_identifier()?;
                    params.push(name);
                    if self.match_token(GobyTokenKind::Comma) {
                        continue;
                    }
                    self.expect(GobyTokenKind::Pipe)?;
                    break;
                }
            }
        }

        let body = self.parse_body_until(&[GobyTokenKind::End])?;
        self.expect(GobyTokenKind::End)?;

        Ok(Some(BlockLiteral { params, body, line }))
    }

    /// 基础表达式
    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let Some(kind) = self.current_kind() else {
            return Err(ParseError::at_eof(ParseErrorKind::UnexpectedEndOfInput));
        };

        match kind {
            GobyTokenKind::LiteralInteger => {
                let text = self
                    .current()
                    .and_then(|token| token.text.clone())
                    .unwrap_or_default();
                match text.parse::<i64>() {
                    Ok(value) => {
                        self.consume();
                        Ok(Box::new(ExprKind::LiteralInt(LiteralInt { value })))
                    }
                    Err(_) => Err(self.error_here(ParseErrorKind::InvalidNumberFormat(text))),
                }
            }
            GobyTokenKind::LiteralString => {
                let value = self
                    .current()
                    .and_then(|token| token.text.clone())
                    .unwrap_or_default();
                self.consume();
                Ok(Box::new(ExprKind::LiteralString(LiteralString { value })))
            }
            GobyTokenKind::True => {
                self.consume();
                Ok(Box::new(ExprKind::LiteralTrue(LiteralTrue)))
            }
            GobyTokenKind::False => {
                self.consume();
                Ok(Box::new(ExprKind::LiteralFalse(LiteralFalse)))
            }
            GobyTokenKind::Nil => {
                self.consume();
                Ok(Box::new(ExprKind::LiteralNil(LiteralNil)))
            }
            GobyTokenKind::SelfKw => {
                self.consume();
                Ok(Box::new(ExprKind::SelfRef(SelfRef)))
            }
            GobyTokenKind::InstanceVariable => {
                let name = self
                    .current()
                    .and_then(|token| token.text.clone())
                    .unwrap_or_default();
                self.consume();
                Ok(Box::new(ExprKind::InstanceVarRef(InstanceVarRef { name })))
            }
            GobyTokenKind::Constant => {
                let line = self.current_line();
                let name = self
                    .current()
                    .and_then(|token| token.text.clone())
                    .unwrap_or_default();
                self.consume();
                Ok(Box::new(ExprKind::ConstantRef(ConstantRef { name, line })))
            }
            GobyTokenKind::Identifier => self.parse_identifier_expression(),
            GobyTokenKind::Yield => self.parse_yield_expression(),
            GobyTokenKind::LeftParenthesis => {
                self.consume();
                // 括号内重新允许 do 块
                let saved = self.no_do_block;
                self.no_do_block = false;
                self.skip_newlines();
                let inner = self.parse_expression(0);
                self.no_do_block = saved;
                let inner = inner?;
                self.skip_newlines();
                self.expect(GobyTokenKind::RightParenthesis)?;
                Ok(inner)
            }
            GobyTokenKind::LeftSquareBracket => self.parse_array_literal(),
            GobyTokenKind::LeftCurlyBrace => self.parse_hash_literal(),
            _ => Err(self.error_here(ParseErrorKind::UnexpectedToken {
                found: self.current_token_text(),
                expected: vec!["expression".to_string()],
            })),
        }
    }

    /// 标识符：带括号或带块则为方法调用，否则留给编译器消解（局部变量 vs self 调用）
    fn parse_identifier_expression(&mut self) -> ParseResult<Expr> {
        let line = self.current_line();
        let name = self
            .current()
            .and_then(|token| token.text.clone())
            .unwrap_or_default();
        self.consume();

        if self.match_token(GobyTokenKind::LeftParenthesis) {
            let arguments = self.parse_call_arguments()?;
            let block = self.try_parse_block()?;
            return Ok(Box::new(ExprKind::MethodCall(MethodCall {
                receiver: None,
                name,
                arguments,
                block,
                line,
            })));
        }

        if self.check(GobyTokenKind::Do) && !self.no_do_block {
            let block = self.try_parse_block()?;
            return Ok(Box::new(ExprKind::MethodCall(MethodCall {
                receiver: None,
                name,
                arguments: Vec::new(),
                block,
                line,
            })));
        }

        Ok(Box::new(ExprKind::Identifier(Identifier { name, line })))
    }

    /// yield 或 yield(args)
    fn parse_yield_expression(&mut self) -> ParseResult<Expr> {
        let line = self.current_line();
        self.expect(GobyTokenKind::Yield)?;
        let arguments = if self.match_token(GobyTokenKind::LeftParenthesis) {
            self.parse_call_arguments()?
        } else {
            Vec::new()
        };
        Ok(Box::new(ExprKind::YieldExpr(YieldExpr { arguments, line })))
    }

    /// 数组字面量 [a, b, c]
    fn parse_array_literal(&mut self) -> ParseResult<Expr> {
        self.expect(GobyTokenKind::LeftSquareBracket)?;
        let mut elements = Vec::new();

        self.skip_newlines();
        if self.match_token(GobyTokenKind::RightSquareBracket) {
            return Ok(Box::new(ExprKind::LiteralArray(LiteralArray { elements })));
        }

        loop {
            self.skip_newlines();
            let element = self.parse_expression(0)?;
            elements.push(element);
            self.skip_newlines();
            if self.match_token(GobyTokenKind::Comma) {
                continue;
            }
            self.expect(GobyTokenKind::RightSquareBracket)?;
            break;
        }

        Ok(Box::new(ExprKind::LiteralArray(LiteralArray { elements })))
    }

    /// 哈希字面量 { key: v, "key": v }，键固定为字符串
    fn parse_hash_literal(&mut self) -> ParseResult<Expr> {
        self.expect(GobyTokenKind::LeftCurlyBrace)?;
        let mut entries = Vec::new();

        self.skip_newlines();
        if self.match_token(GobyTokenKind::RightCurlyBrace) {
            return Ok(Box::new(ExprKind::LiteralHash(LiteralHash { entries })));
        }

        loop {
            self.skip_newlines();
            let key = match self.current_kind() {
                Some(
                    GobyTokenKind::Identifier
                    | GobyTokenKind::Constant
                    | GobyTokenKind::LiteralString,
                ) => {
                    let key = self
                        .current()
                        .and_then(|token| token.text.clone())
                        .unwrap_or_default();
                    self.consume();
                    key
                }
                _ => {
                    return Err(self.error_here(ParseErrorKind::UnexpectedToken {
                        found: self.current_token_text(),
                        expected: vec!["hash key".to_string()],
                    }));
                }
            };
            self.expect(GobyTokenKind::Colon)?;
            self.skip_newlines();
            let value = self.parse_expression(0)?;
            entries.push((key, value));

            self.skip_newlines();
            if self.match_token(GobyTokenKind::Comma) {
                continue;
            }
            self.expect(GobyTokenKind::RightCurlyBrace)?;
            break;
        }

        Ok(Box::new(ExprKind::LiteralHash(LiteralHash { entries })))
    }
}
