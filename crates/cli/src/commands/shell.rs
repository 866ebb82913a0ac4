//! Interactive mode.
//!
//! The backend session lives in a cookie held by the API client, which only
//! survives as long as the process. The shell keeps one context alive and
//! runs each stdin line as a command against it.

use std::io::Write;

use clap::Parser;
use digi_storefront::AppContext;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{Cli, Commands};

const PROMPT: &str = "digi> ";

/// Read commands until EOF or `exit`. Returns `false` if stdin failed.
pub async fn run(ctx: &AppContext) -> bool {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{PROMPT}");
        let _ = std::io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return true,
            Err(e) => {
                eprintln!("error: {e}");
                return false;
            }
        };

        let args = split_args(&line);
        match args.first().map(String::as_str) {
            None => continue,
            Some("exit" | "quit") => return true,
            Some(_) => {}
        }

        match Cli::try_parse_from(std::iter::once("digi".to_string()).chain(args)) {
            Ok(Cli {
                command: Commands::Shell,
            }) => eprintln!("error: already in a shell"),
            Ok(cli) => {
                super::execute(ctx, cli.command).await;
            }
            // Help and usage errors render themselves
            Err(e) => {
                let _ = e.print();
            }
        }
    }
}

/// Split a command line on whitespace, keeping double-quoted runs together.
fn split_args(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    args.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        args.push(current);
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_args_keeps_quoted_runs() {
        assert_eq!(
            split_args(r#"register -n "Jane Doe" -e jane@example.com"#),
            vec!["register", "-n", "Jane Doe", "-e", "jane@example.com"]
        );
        assert_eq!(split_args("   "), Vec::<String>::new());
        assert_eq!(split_args(r#"profile -n """#), vec!["profile", "-n", ""]);
    }
}
