//! Shell command parsing.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Phones,
    Details,
    Pools,
    Jobs,
    Poll,
    Scrape,
    WhoAmI,
    Login,
    Logout,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let word = line.split_whitespace().next()?;
        let command = match word.to_ascii_lowercase().as_str() {
            "phones" | "ls" => Command::Phones,
            "details" => Command::Details,
            "pools" => Command::Pools,
            "jobs" | "status" => Command::Jobs,
            "poll" => Command::Poll,
            "scrape" => Command::Scrape,
            "whoami" => Command::WhoAmI,
            "login" => Command::Login,
            "logout" => Command::Logout,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Unknown(word.to_string()),
        };
        Some(command)
    }
}

pub const HELP: &str = "\
Commands:
  phones   list registered phones
  details  list scraped phone details (serial, DN, switch port)
  pools    list device pools
  jobs     show sync job and scrape queue status
  poll     queue an immediate CUCM sync
  scrape   queue an immediate phone scrape
  whoami   show the current session
  login    sign in again
  logout   end the session
  quit     exit";
