//! 语句编译
//!
//! 每条语句遵守同一个栈约定：`keep` 为真时恰好留下一个值，
//! 否则不留。分支与循环的各条路径必须给出相同的栈效果。

use goby_log::trace;

use crate::compiler::parser::stmt::{
    BeginStmt, ClassDefStmt, DefStmt, IfStmt, IncludeStmt, ParamKind, ReturnStmt, WhileStmt,
};
use crate::compiler::parser::{Stmt, StmtKind};
use crate::runtime::bytecode::{Instruction, Literal, ParamInfo};

use super::{context, expr, CompileContext, CompileError, Compiler, ContextKind};

/// 编译语句
pub(crate) fn compile_stmt(
    compiler: &mut Compiler,
    stmt: &Stmt,
    keep: bool,
) -> Result<(), CompileError> {
    match stmt.as_ref() {
        StmtKind::Expr(expr_stmt) => {
            expr::compile_expr(compiler, &expr_stmt.expression)?;
            if !keep {
                compiler.emit(Instruction::Pop, expr_stmt.line);
            }
        }
        StmtKind::If(if_stmt) => compile_if(compiler, if_stmt, keep)?,
        StmtKind::While(while_stmt) => compile_while(compiler, while_stmt, keep)?,
        StmtKind::Def(def_stmt) => compile_def(compiler, def_stmt, keep)?,
        StmtKind::ClassDef(class_stmt) => compile_class(compiler, class_stmt, keep)?,
        StmtKind::Include(include_stmt) => compile_include(compiler, include_stmt, keep)?,
        StmtKind::Return(return_stmt) => compile_return(compiler, return_stmt)?,
        StmtKind::Begin(begin_stmt) => compile_begin(compiler, begin_stmt, keep)?,
    }
    Ok(())
}

/// 编译 if/elsif/else 链
fn compile_if(compiler: &mut Compiler, if_stmt: &IfStmt, keep: bool) -> Result<(), CompileError> {
    let line = if_stmt.line;
    let mut end_jumps = Vec::new();

    expr::compile_expr(compiler, &if_stmt.condition)?;
    let mut next_branch = compiler.emit_jump(Instruction::JumpIfFalse(u32::MAX), line);
    compiler.compile_body(&if_stmt.then_body, keep)?;
    end_jumps.push(compiler.emit_jump(Instruction::Jump(u32::MAX), line));

    for (condition, body) in &if_stmt.elsif_branches {
        compiler.patch_jump(next_branch);
        expr::compile_expr(compiler, condition)?;
        next_branch = compiler.emit_jump(Instruction::JumpIfFalse(u32::MAX), line);
        compiler.compile_body(body, keep)?;
        end_jumps.push(compiler.emit_jump(Instruction::Jump(u32::MAX), line));
    }

    compiler.patch_jump(next_branch);
    match &if_stmt.else_body {
        Some(body) => compiler.compile_body(body, keep)?,
        None => {
            // 没有 else 时整个 if 的值是 nil
            if keep {
                compiler.emit(Instruction::PushNil, line);
            }
        }
    }

    for jump in end_jumps {
        compiler.patch_jump(jump);
    }
    Ok(())
}

/// 编译 while 循环，循环本身的值固定是 nil
fn compile_while(
    compiler: &mut Compiler,
    while_stmt: &WhileStmt,
    keep: bool,
) -> Result<(), CompileError> {
    let line = while_stmt.line;
    let loop_start = compiler.current_offset() as u32;

    expr::compile_expr(compiler, &while_stmt.condition)?;
    let exit = compiler.emit_jump(Instruction::JumpIfFalse(u32::MAX), line);
    compiler.compile_body(&while_stmt.body, false)?;
    compiler.emit(Instruction::Jump(loop_start), line);
    compiler.patch_jump(exit);

    if keep {
        compiler.emit(Instruction::PushNil, line);
    }
    Ok(())
}

/// 编译方法定义。方法体在独立上下文中编成序列，
/// 缺省值表达式编进序言，运行时按实参是否绑定跳过。
fn compile_def(compiler: &mut Compiler, def_stmt: &DefStmt, keep: bool) -> Result<(), CompileError> {
    let line = def_stmt.line;
    trace!(compiler.logger, "compile_def: {}", def_stmt.name);

    compiler.push_context(CompileContext::new(&def_stmt.name, ContextKind::Method));
    for param in &def_stmt.params {
        let info = match &param.kind {
            ParamKind::Required => ParamInfo::Required,
            ParamKind::Optional(_) => ParamInfo::Optional,
            ParamKind::Splat => ParamInfo::Splat,
        };
        compiler.current.add_param(&param.name, info)?;
    }
    for (index, param) in def_stmt.params.iter().enumerate() {
        if let ParamKind::Optional(default) = &param.kind {
            let skip = compiler.emit_jump(
                Instruction::JumpIfBound { index: index as u8, target: u32::MAX },
                line,
            );
            expr::compile_expr(compiler, default)?;
            compiler.emit(Instruction::SetLocal { depth: 0, index: index as u8 }, line);
            compiler.emit(Instruction::Pop, line);
            compiler.patch_jump(skip);
        }
    }
    compiler.compile_body(&def_stmt.body, true)?;
    compiler.emit(Instruction::Return, line);
    let body = compiler.pop_context();

    let body_index = compiler.add_constant(Literal::Sequence(body));
    let name_index = compiler.add_string_constant(&def_stmt.name);
    let instruction = if def_stmt.receiver_is_self {
        Instruction::DefineClassMethod { name: name_index, body: body_index }
    } else {
        Instruction::DefineMethod { name: name_index, body: body_index }
    };
    compiler.emit(instruction, line);

    if keep {
        compiler.emit(Instruction::PushNil, line);
    }
    Ok(())
}

/// 编译类/模块定义。类体序列在类对象为 self 的帧里执行，
/// 帧返回固定压 nil，所以这条语句在栈上留一个值。
fn compile_class(
    compiler: &mut Compiler,
    class_stmt: &ClassDefStmt,
    keep: bool,
) -> Result<(), CompileError> {
    let line = class_stmt.line;
    trace!(compiler.logger, "compile_class: {}", class_stmt.name);

    compiler.push_context(CompileContext::new(&class_stmt.name, ContextKind::ClassBody));
    compiler.compile_body(&class_stmt.body, false)?;
    compiler.emit(Instruction::PushNil, line);
    compiler.emit(Instruction::Return, line);
    let body = compiler.pop_context();

    let has_superclass = class_stmt.superclass.is_some();
    if let Some(superclass) = &class_stmt.superclass {
        let index = compiler.add_string_constant(superclass);
        compiler.emit(Instruction::GetConstant(index), line);
    }

    let body_index = compiler.add_constant(Literal::Sequence(body));
    let name_index = compiler.add_string_constant(&class_stmt.name);
    compiler.emit(
        Instruction::DefineClass {
            name: name_index,
            body: body_index,
            is_module: class_stmt.is_module,
            has_superclass,
        },
        line,
    );

    if !keep {
        compiler.emit(Instruction::Pop, line);
    }
    Ok(())
}

fn compile_include(
    compiler: &mut Compiler,
    include_stmt: &IncludeStmt,
    keep: bool,
) -> Result<(), CompileError> {
    let line = include_stmt.line;
    let index = compiler.add_string_constant(&include_stmt.module_name);
    compiler.emit(Instruction::GetConstant(index), line);
    compiler.emit(Instruction::Include, line);
    if keep {
        compiler.emit(Instruction::PushNil, line);
    }
    Ok(())
}

fn compile_return(
    compiler: &mut Compiler,
    return_stmt: &ReturnStmt,
) -> Result<(), CompileError> {
    match &return_stmt.value {
        Some(value) => expr::compile_expr(compiler, value)?,
        None => {
            compiler.emit(Instruction::PushNil, return_stmt.line);
        }
    }
    compiler.emit(Instruction::Return, return_stmt.line);
    Ok(())
}

/// 编译 begin/rescue。主路径成功走到 PopRescue 后跳过补救体；
/// 出错时虚拟机把栈截回注册时的深度、压入错误值并跳到
/// rescue 入口。
fn compile_begin(
    compiler: &mut Compiler,
    begin_stmt: &BeginStmt,
    keep: bool,
) -> Result<(), CompileError> {
    let line = begin_stmt.line;

    let rescue_entry = compiler.emit_jump(Instruction::PushRescue(u32::MAX), line);
    compiler.compile_body(&begin_stmt.body, keep)?;
    compiler.emit(Instruction::PopRescue, line);
    let end_jump = compiler.emit_jump(Instruction::Jump(u32::MAX), line);

    compiler.patch_jump(rescue_entry);
    match &begin_stmt.rescue_var {
        Some(name) => {
            context::emit_store_local(compiler, name, line)?;
            compiler.emit(Instruction::Pop, line);
        }
        None => {
            compiler.emit(Instruction::Pop, line);
        }
    }
    compiler.compile_body(&begin_stmt.rescue_body, keep)?;

    compiler.patch_jump(end_jump);
    Ok(())
}
