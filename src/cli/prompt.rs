//! 대화형 입력 - 입력값을 파싱/검증하고 실패하면 다시 묻는다

use std::io::{BufRead, Write};

use crate::error::TradingError;

/// 기본 재시도 횟수
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

pub struct Prompter<R, W> {
  input: R,
  output: W,
  max_attempts: usize,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
  pub fn new(input: R, output: W) -> Self {
    Prompter { input, output, max_attempts: DEFAULT_MAX_ATTEMPTS }
  }

  pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
    self.max_attempts = max_attempts.max(1);
    self
  }

  pub fn say(&mut self, line: &str) -> Result<(), TradingError> {
    writeln!(self.output, "{}", line)?;
    Ok(())
  }

  fn read_answer(&mut self, label: &str) -> Result<String, TradingError> {
    write!(self.output, "{}: ", label)?;
    self.output.flush()?;

    let mut line = String::new();
    if self.input.read_line(&mut line)? == 0 {
      return Err(TradingError::Parse(format!("input closed while reading '{}'", label)));
    }
    Ok(line.trim().to_string())
  }

  /// `parse` 가 성공할 때까지 최대 `max_attempts` 번 묻는다
  pub fn ask<T, F>(&mut self, label: &str, mut parse: F) -> Result<T, TradingError>
  where
    F: FnMut(&str) -> Result<T, TradingError>,
  {
    let mut attempts = 0;
    loop {
      let answer = self.read_answer(label)?;
      match parse(&answer) {
        Ok(value) => return Ok(value),
        Err(e) => {
          attempts += 1;
          writeln!(self.output, "  {}", e)?;
          if attempts >= self.max_attempts {
            return Err(e);
          }
        }
      }
    }
  }

  /// 빈 입력이면 `default` 반환
  pub fn ask_or<T, F>(&mut self, label: &str, default: T, parse: F) -> Result<T, TradingError>
  where
    T: std::fmt::Display,
    F: Fn(&str) -> Result<T, TradingError>,
  {
    let label = format!("{} [{}]", label, default);
    let mut default = Some(default);
    self.ask(&label, |answer| {
      if answer.is_empty() {
        if let Some(value) = default.take() {
          return Ok(value);
        }
      }
      parse(answer)
    })
  }

  pub fn ask_non_empty(&mut self, label: &str) -> Result<String, TradingError> {
    self.ask(label, |answer| {
      if answer.is_empty() {
        Err(TradingError::Validation(format!("{} must not be empty", label)))
      } else {
        Ok(answer.to_string())
      }
    })
  }
}

pub fn parse_chunks(input: &str) -> Result<u32, TradingError> {
  let chunks: u32 = input
    .parse()
    .map_err(|_| TradingError::Validation(format!("Number of chunks must be a positive integer, got '{}'", input)))?;
  crate::order_core::validator::validate_chunk_count(chunks)
}

pub fn parse_interval(input: &str) -> Result<f64, TradingError> {
  let secs: f64 = input
    .parse()
    .map_err(|_| TradingError::Validation(format!("Interval must be a number of seconds, got '{}'", input)))?;
  crate::order_core::validator::validate_interval(secs)?;
  Ok(secs)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  #[test]
  fn test_reprompts_until_valid() {
    let mut out = Vec::new();
    let mut prompter = Prompter::new(Cursor::new("abc\n0\n4\n"), &mut out);

    let chunks = prompter.ask("Number of chunks", parse_chunks).unwrap();
    assert_eq!(chunks, 4);

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("Number of chunks: ").count(), 3);
    assert!(text.contains("must be a positive integer"));
  }

  #[test]
  fn test_gives_up_after_max_attempts() {
    let mut prompter = Prompter::new(Cursor::new("x\ny\nz\n5\n"), Vec::new()).with_max_attempts(2);
    assert!(prompter.ask("Interval", parse_interval).unwrap_err().is_validation());
  }

  #[test]
  fn test_default_on_empty_answer() {
    let mut prompter = Prompter::new(Cursor::new("\n2.5\n"), Vec::new());
    assert_eq!(prompter.ask_or("Interval", 10.0, parse_interval).unwrap(), 10.0);
    assert_eq!(prompter.ask_or("Interval", 10.0, parse_interval).unwrap(), 2.5);
  }

  #[test]
  fn test_closed_input_is_an_error() {
    let mut prompter = Prompter::new(Cursor::new(""), Vec::new());
    assert!(matches!(prompter.ask_non_empty("API Key"), Err(TradingError::Parse(_))));
  }
}
