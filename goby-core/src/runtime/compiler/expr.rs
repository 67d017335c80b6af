//! 表达式编译
//!
//! 每个表达式在栈上恰好留一个值。运算符一律降级为方法派发，
//! 只有 && 和 || 编译成短路跳转。

use crate::compiler::lexer::token_kind::GobyTokenKind;
use crate::compiler::parser::expr::BlockLiteral;
use crate::compiler::parser::{binary_method_name, AssignTarget, Assignment, Expr, ExprKind};
use crate::runtime::bytecode::{Instruction, Literal, ParamInfo};

use super::{context, CompileContext, CompileError, Compiler, ContextKind};

/// 编译表达式
pub(crate) fn compile_expr(compiler: &mut Compiler, expr: &Expr) -> Result<(), CompileError> {
    match expr.as_ref() {
        ExprKind::LiteralInt(literal) => {
            let index = compiler.add_constant(Literal::Integer(literal.value));
            compiler.emit(Instruction::PushConstant(index), 0);
        }
        ExprKind::LiteralString(literal) => {
            let index = compiler.add_constant(Literal::Str(literal.value.clone()));
            compiler.emit(Instruction::PushConstant(index), 0);
        }
        ExprKind::LiteralTrue(_) => {
            compiler.emit(Instruction::PushTrue, 0);
        }
        ExprKind::LiteralFalse(_) => {
            compiler.emit(Instruction::PushFalse, 0);
        }
        ExprKind::LiteralNil(_) => {
            compiler.emit(Instruction::PushNil, 0);
        }
        ExprKind::SelfRef(_) => {
            compiler.emit(Instruction::PushSelf, 0);
        }
        ExprKind::LiteralArray(literal) => {
            if literal.elements.len() > u16::MAX as usize {
                return Err(CompileError::TooManyElements);
            }
            for element in &literal.elements {
                compile_expr(compiler, element)?;
            }
            compiler.emit(Instruction::NewArray(literal.elements.len() as u16), 0);
        }
        ExprKind::LiteralHash(literal) => {
            if literal.entries.len() > u16::MAX as usize {
                return Err(CompileError::TooManyElements);
            }
            for (key, value) in &literal.entries {
                let key_index = compiler.add_string_constant(key);
                compiler.emit(Instruction::PushConstant(key_index), 0);
                compile_expr(compiler, value)?;
            }
            compiler.emit(Instruction::NewHash(literal.entries.len() as u16), 0);
        }
        ExprKind::RangeLiteral(range) => {
            compile_expr(compiler, &range.start)?;
            compile_expr(compiler, &range.end)?;
            compiler.emit(Instruction::NewRange, range.line);
        }
        ExprKind::Identifier(identifier) => {
            context::emit_load_variable(compiler, &identifier.name, identifier.line);
        }
        ExprKind::ConstantRef(constant) => {
            let index = compiler.add_string_constant(&constant.name);
            compiler.emit(Instruction::GetConstant(index), constant.line);
        }
        ExprKind::InstanceVarRef(ivar) => {
            let index = compiler.add_string_constant(&ivar.name);
            compiler.emit(Instruction::GetInstanceVariable(index), 0);
        }
        ExprKind::Binary(binary) => {
            compile_expr(compiler, &binary.left)?;
            compile_expr(compiler, &binary.right)?;
            let method = binary_method_name(binary.op).ok_or(CompileError::InvalidOperator)?;
            let name_index = compiler.add_string_constant(method);
            compiler.emit(
                Instruction::Send { name: name_index, argc: 1, block: None },
                binary.line,
            );
        }
        ExprKind::Logical(logical) => {
            compile_expr(compiler, &logical.left)?;
            compiler.emit(Instruction::Dup, 0);
            let jump = match logical.op {
                GobyTokenKind::AndAnd => {
                    compiler.emit_jump(Instruction::JumpIfFalse(u32::MAX), 0)
                }
                _ => compiler.emit_jump(Instruction::JumpIfTrue(u32::MAX), 0),
            };
            compiler.emit(Instruction::Pop, 0);
            compile_expr(compiler, &logical.right)?;
            compiler.patch_jump(jump);
        }
        ExprKind::Unary(unary) => match unary.op {
            GobyTokenKind::Minus => {
                // 负整数字面量直接折叠成常量
                if let ExprKind::LiteralInt(literal) = unary.operand.as_ref() {
                    let index = compiler.add_constant(Literal::Integer(-literal.value));
                    compiler.emit(Instruction::PushConstant(index), unary.line);
                } else {
                    compile_expr(compiler, &unary.operand)?;
                    let name_index = compiler.add_string_constant("-@");
                    compiler.emit(
                        Instruction::Send { name: name_index, argc: 0, block: None },
                        unary.line,
                    );
                }
            }
            GobyTokenKind::Bang => {
                compile_expr(compiler, &unary.operand)?;
                let name_index = compiler.add_string_constant("!");
                compiler.emit(
                    Instruction::Send { name: name_index, argc: 0, block: None },
                    unary.line,
                );
            }
            _ => return Err(CompileError::InvalidOperator),
        },
        ExprKind::Assignment(assignment) => {
            compile_assignment(compiler, assignment)?;
        }
        ExprKind::MethodCall(call) => {
            match &call.receiver {
                Some(receiver) => compile_expr(compiler, receiver)?,
                None => {
                    compiler.emit(Instruction::PushSelf, call.line);
                }
            }
            if call.arguments.len() > u8::MAX as usize {
                return Err(CompileError::TooManyArguments);
            }
            for argument in &call.arguments {
                compile_expr(compiler, argument)?;
            }
            let block = match &call.block {
                Some(literal) => Some(compile_block_literal(compiler, literal)?),
                None => None,
            };
            let name_index = compiler.add_string_constant(&call.name);
            compiler.emit(
                Instruction::Send {
                    name: name_index,
                    argc: call.arguments.len() as u8,
                    block,
                },
                call.line,
            );
        }
        ExprKind::IndexAccess(access) => {
            compile_expr(compiler, &access.receiver)?;
            compile_expr(compiler, &access.index)?;
            let name_index = compiler.add_string_constant("[]");
            compiler.emit(
                Instruction::Send { name: name_index, argc: 1, block: None },
                access.line,
            );
        }
        ExprKind::YieldExpr(yield_expr) => {
            if yield_expr.arguments.len() > u8::MAX as usize {
                return Err(CompileError::TooManyArguments);
            }
            for argument in &yield_expr.arguments {
                compile_expr(compiler, argument)?;
            }
            compiler.emit(
                Instruction::InvokeBlock { argc: yield_expr.arguments.len() as u8 },
                yield_expr.line,
            );
        }
    }
    Ok(())
}

/// 编译赋值。Set* 指令保留栈顶，赋值表达式的值就是右侧的值；
/// 索引赋值例外，它派发 "[]="，表达式的值是该方法的返回值。
fn compile_assignment(
    compiler: &mut Compiler,
    assignment: &Assignment,
) -> Result<(), CompileError> {
    let line = assignment.line;
    match &assignment.target {
        AssignTarget::Local(name) => {
            compile_expr(compiler, &assignment.value)?;
            context::emit_store_local(compiler, name, line)?;
        }
        AssignTarget::InstanceVariable(name) => {
            compile_expr(compiler, &assignment.value)?;
            let index = compiler.add_string_constant(name);
            compiler.emit(Instruction::SetInstanceVariable(index), line);
        }
        AssignTarget::Constant(name) => {
            compile_expr(compiler, &assignment.value)?;
            let index = compiler.add_string_constant(name);
            compiler.emit(Instruction::SetConstant(index), line);
        }
        AssignTarget::Index { receiver, index } => {
            compile_expr(compiler, receiver)?;
            compile_expr(compiler, index)?;
            compile_expr(compiler, &assignment.value)?;
            let name_index = compiler.add_string_constant("[]=");
            compiler.emit(Instruction::Send { name: name_index, argc: 2, block: None }, line);
        }
    }
    Ok(())
}

/// 把块字面量编成序列，返回它在当前序列常量池中的下标。
/// 块上下文对外层透明，未命中的变量继续向外解析。
fn compile_block_literal(
    compiler: &mut Compiler,
    literal: &BlockLiteral,
) -> Result<u16, CompileError> {
    compiler.push_context(CompileContext::new("block", ContextKind::Block));
    for param in &literal.params {
        compiler.current.add_param(param, ParamInfo::Required)?;
    }
    compiler.compile_body(&literal.body, true)?;
    compiler.emit(Instruction::Return, literal.line);
    let sequence = compiler.pop_context();
    Ok(compiler.add_constant(Literal::Sequence(sequence)))
}
