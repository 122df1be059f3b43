//! Command parsing for the interactive radar
//!
//! Slash commands control the session; any other input is a stock query to add.

use radar_core::{Horizon, RadarError, Result};

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Resolve a query and add it to the watchlist
    Add { query: String },
    /// Remove a watched stock by code, symbol or name
    Remove { query: String },
    /// Show the watchlist
    List,
    /// Refresh ratings and show the rankings
    Refresh,
    /// Restrict output to one horizon, or `None` for all
    Horizon { horizon: Option<Horizon> },
    /// Toggle the strong-only filter
    Strong,
    /// Show help
    Help,
    /// Exit the radar
    Exit,
}

impl Command {
    /// Parse a command from user input
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(RadarError::Command("Empty input".to_string()));
        }

        // Anything that is not a slash command is a query
        let Some(body) = input.strip_prefix('/') else {
            return Ok(Command::Add {
                query: input.to_string(),
            });
        };

        let mut parts = body.split_whitespace();
        let Some(cmd) = parts.next().map(str::to_lowercase) else {
            return Err(RadarError::Command("Empty command".to_string()));
        };
        // names may contain spaces, so the query is the rest of the line
        let rest = parts.collect::<Vec<_>>().join(" ");

        match cmd.as_str() {
            "add" | "a" | "新增" => Ok(Command::Add {
                query: required(rest, "add")?,
            }),
            "remove" | "rm" | "del" | "刪除" => Ok(Command::Remove {
                query: required(rest, "remove")?,
            }),
            "list" | "ls" | "清單" => Ok(Command::List),
            "refresh" | "r" | "更新" => Ok(Command::Refresh),
            "horizon" | "hz" | "週期" => {
                let horizon = match rest.as_str() {
                    "" | "all" | "全部" => None,
                    value => Some(value.parse()?),
                };
                Ok(Command::Horizon { horizon })
            }
            "strong" | "s" | "強勢" => Ok(Command::Strong),
            "help" | "h" | "?" | "說明" => Ok(Command::Help),
            "exit" | "quit" | "q" | "離開" => Ok(Command::Exit),
            _ => Err(RadarError::Command(format!("Unknown command: {cmd}"))),
        }
    }

    /// Get help text for all commands
    pub fn help_text() -> &'static str {
        r"
Stock Radar Commands
====================

Watchlist Commands:
  <query>                加入股票 (Add by code, name or partial name)
  /add <query>           加入股票 (Add to watchlist)
  /remove <query>        移除股票 (Remove from watchlist)
  /list                  顯示清單 (Show watchlist)

Rating Commands:
  /refresh               更新評等 (Refresh ratings)
  /horizon <s|m|l|all>   切換週期 (Short / medium / long / all)
  /strong                只看強勢 (Toggle strong-buy only)

Other Commands:
  /help                  顯示說明 (Show help)
  /exit                  離開 (Exit)

Command Aliases:
  /a = /add      /rm = /remove    /ls = /list
  /r = /refresh  /hz = /horizon   /s = /strong   /q = /exit
"
    }

    /// Get a short description of the command
    pub fn description(&self) -> &'static str {
        match self {
            Command::Add { .. } => "Add to watchlist",
            Command::Remove { .. } => "Remove from watchlist",
            Command::List => "Show watchlist",
            Command::Refresh => "Refresh ratings",
            Command::Horizon { .. } => "Select horizon",
            Command::Strong => "Toggle strong-only filter",
            Command::Help => "Show help",
            Command::Exit => "Exit the radar",
        }
    }
}

fn required(arg: String, command: &str) -> Result<String> {
    if arg.is_empty() {
        Err(RadarError::Command(format!(
            "Missing query for {command} command"
        )))
    } else {
        Ok(arg)
    }
}
