//! Interactive command parsing

use std::str::FromStr;

use topper_common::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Upvote,
    Downvote,
    Next,
    Previous,
    Stats,
    Leaderboard,
    Language(Locale),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let head = parts.next().unwrap_or("").to_ascii_lowercase();

        let command = match head.as_str() {
            "u" | "up" | "+" => Command::Upvote,
            "d" | "down" | "-" => Command::Downvote,
            "n" | "next" => Command::Next,
            "p" | "prev" => Command::Previous,
            "s" | "stats" => Command::Stats,
            "l" | "top" => Command::Leaderboard,
            "lang" => {
                let code = parts.next().ok_or("usage: lang <en|ro|uk|ru>")?;
                Command::Language(code.parse().map_err(|e| format!("{}", e))?)
            }
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            "" => return Err("empty command".to_string()),
            other => return Err(format!("unknown command {:?}, try 'h'", other)),
        };
        Ok(command)
    }
}

pub const HELP: &str = "\
  u  upvote        d  downvote
  n  next          p  previous
  s  statistics    l  leaderboard
  lang <code>      switch language (en, ro, uk, ru)
  h  help          q  quit";
