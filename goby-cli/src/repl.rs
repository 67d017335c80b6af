//! 交互式前端
//!
//! 一个生产者线程逐行读取标准输入，经无界 FIFO 通道交给求值端；
//! 同一个 Session 顺序消费，一行输入对应一行回应。标准输入关闭
//! 后通道发送端析构，求值循环随之退出。

use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use goby_api::{RunConfig, Session};

const PROMPT: &str = ">> ";

pub fn start(config: &RunConfig) {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(text) => {
                    if tx.send(text).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    run_loop(config, rx, &mut io::stdout());
}

fn run_loop(config: &RunConfig, lines: mpsc::Receiver<String>, out: &mut dyn Write) {
    let mut session = Session::new(config);

    let _ = writeln!(out, "Goby {}", env!("CARGO_PKG_VERSION"));
    let _ = write!(out, "{}", PROMPT);
    let _ = out.flush();

    while let Ok(line) = lines.recv() {
        if let Some(response) = eval_line(&mut session, &line) {
            let _ = writeln!(out, "{}", response);
        }
        let _ = write!(out, "{}", PROMPT);
        let _ = out.flush();
    }
}

/// 求值一行，返回回显文本；空行不回应。
/// 求值失败回显错误而不是终止，会话保持可用。
fn eval_line(session: &mut Session, line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match session.eval(trimmed) {
        Ok(output) => Some(output.inspect),
        Err(e) => Some(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(inputs: &[&str]) -> String {
        let (tx, rx) = mpsc::channel();
        for input in inputs {
            tx.send(input.to_string()).unwrap();
        }
        drop(tx);

        let mut out = Vec::new();
        run_loop(&RunConfig::default(), rx, &mut out);
        String::from_utf8(out).unwrap()
    }

    fn banner() -> String {
        format!("Goby {}\n", env!("CARGO_PKG_VERSION"))
    }

    #[test]
    fn test_one_line_in_one_response_out() {
        let text = transcript(&["1 + 2", "\"a\" + \"b\""]);
        assert_eq!(text, banner() + ">> 3\n>> \"ab\"\n>> ");
    }

    #[test]
    fn test_locals_persist_between_lines() {
        let text = transcript(&["x = 21", "x * 2"]);
        assert!(text.contains(">> 21\n"));
        assert!(text.contains(">> 42\n"));
    }

    #[test]
    fn test_error_is_echoed_and_session_continues() {
        let text = transcript(&["total = 5", "[].missing", "total"]);
        assert!(text.contains("NoMethodError: undefined method 'missing' for Array"));
        // 出错之后先前的局部变量仍然可用
        assert!(text.ends_with(">> 5\n>> "));
    }

    #[test]
    fn test_empty_lines_produce_no_response() {
        let text = transcript(&["", "   ", "7"]);
        assert_eq!(text, banner() + ">> >> >> 7\n>> ");
    }
}
