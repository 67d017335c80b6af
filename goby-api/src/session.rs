//! REPL 会话
//!
//! 持有跨行共享的虚拟机与局部变量名表。每行是一个求值单元：
//! 编译时把先前的局部变量当作已占用的槽位，执行时在共享作用域
//! 里继续，所以跨行的局部变量、类定义和常量都保持可见。
//! 求值失败不会破坏会话，下一行可以继续。

use std::io::Write;
use std::time::Instant;

use goby_core::compiler::lexer::tokenize_with_logger;
use goby_core::compiler::parser::Parser;
use goby_core::runtime::compile_with_locals;
use goby_core::Vm;

use crate::config::RunConfig;
use crate::error::GobyError;
use crate::types::ExecuteOutput;

/// 持久的 REPL 会话：同一个虚拟机服务连续的输入行。
pub struct Session {
    vm: Vm,
    /// 先前各行定义的局部变量名，按槽位顺序
    locals: Vec<String>,
    config: RunConfig,
}

impl Session {
    pub fn new(config: &RunConfig) -> Self {
        let mut vm = Vm::with_config_and_logger(config.limits.clone(), config.logger.clone());
        vm.set_argv(&config.argv);
        Session {
            vm,
            locals: Vec::new(),
            config: config.clone(),
        }
    }

    /// 重定向程序输出（puts / print）。
    pub fn set_output(&mut self, sink: Box<dyn Write>) {
        self.vm.set_output(sink);
    }

    /// 求值一行。成功时记录新出现的局部变量名；失败的行
    /// 不贡献任何局部变量，但虚拟机状态仍然可用。
    pub fn eval(&mut self, line: &str) -> Result<ExecuteOutput, GobyError> {
        let tokens = tokenize_with_logger(line, self.config.logger.clone())?;
        let program = Parser::new(tokens).parse()?;
        let (sequence, names) = compile_with_locals(&program, &self.locals)?;

        let before = self.vm.instructions_executed();
        let start = Instant::now();
        let value = self.vm.run_repl(sequence)?;
        let elapsed = start.elapsed();
        self.locals = names;

        let inspect = self.vm.inspect(&value);
        Ok(ExecuteOutput {
            value,
            inspect,
            instructions_executed: self.vm.instructions_executed() - before,
            elapsed,
        })
    }
}
