use dayplan_core::{ActualTimePrompt, Task};
use std::io::{self, BufRead, Write};

/// Asks on stdout, reads one line from stdin.
pub struct StdinPrompt;

impl ActualTimePrompt for StdinPrompt {
    fn actual_minutes(&mut self, task: &Task, default_minutes: i32) -> Option<i32> {
        println!("\nAll sessions of \"{}\" are done.", task.title);
        print!("How many minutes did it actually take? [{default_minutes}] (s = skip): ");
        io::stdout().flush().ok();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => parse_answer(&line, default_minutes),
        }
    }
}

/// Blank accepts the default; `s`/`skip`/`n` or anything non-numeric dismisses.
fn parse_answer(line: &str, default_minutes: i32) -> Option<i32> {
    let answer = line.trim();
    if answer.is_empty() {
        return Some(default_minutes);
    }
    answer.parse::<i32>().ok().filter(|m| *m > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers() {
        assert_eq!(parse_answer("\n", 45), Some(45));
        assert_eq!(parse_answer(" 70 \n", 45), Some(70));
        assert_eq!(parse_answer("s\n", 45), None);
        assert_eq!(parse_answer("skip", 45), None);
        assert_eq!(parse_answer("-5", 45), None);
    }
}
