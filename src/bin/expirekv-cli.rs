//! EXPIREKV CLI
//!
//! Interactive shell over a store file.

use clap::Parser;
use expirekv::{BackendKind, ExpiringStore, StoreConfig};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

/// EXPIREKV CLI - Interactive Shell
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Database file
    #[arg(short, long, default_value = "./data/expirekv.redb")]
    path: PathBuf,

    /// Bucket entries are stored under
    #[arg(short, long, default_value = "entries")]
    bucket: String,

    /// Seconds to wait if another process holds the file
    #[arg(long, default_value_t = 1)]
    open_timeout: u64,

    /// Use a throwaway in-memory store
    #[arg(long)]
    memory: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Put { key: String, value: String, ttl: i64 },
    Get { key: String },
    Del { key: String },
    Len,
    Stats,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let backend = if args.memory {
        BackendKind::Memory
    } else {
        BackendKind::Durable
    };
    let config = StoreConfig::default()
        .with_backend(backend)
        .with_path(&args.path)
        .with_bucket(&args.bucket)
        .with_open_timeout(Duration::from_secs(args.open_timeout));

    let store = ExpiringStore::open(&config)?;

    if args.memory {
        println!("Using in-memory store");
    } else {
        println!("Opened {}", args.path.display());
    }
    println!("Type 'help' for available commands, 'quit' to exit.\n");

    loop {
        print!("expirekv> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            println!("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("help") {
            print_help();
            continue;
        }

        match parse_command(input) {
            Ok(cmd) => execute(&store, cmd),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}

fn execute<B: expirekv::Backend>(store: &ExpiringStore<B>, cmd: Command) {
    match cmd {
        Command::Put { key, value, ttl } => match store.put(&key, value, ttl) {
            Ok(()) => println!("OK"),
            Err(e) => eprintln!("Error: {}", e),
        },
        Command::Get { key } => match store.get(&key) {
            Ok(value) => println!("\"{}\"", value),
            Err(e) if e.is_not_found() => println!("(nil)"),
            Err(e) => eprintln!("Error: {}", e),
        },
        Command::Del { key } => match store.delete(&key) {
            Ok(()) => println!("(integer) 1"),
            Err(e) if e.is_not_found() => println!("(integer) 0"),
            Err(e) => eprintln!("Error: {}", e),
        },
        Command::Len => match store.len() {
            Ok(n) => println!("(integer) {}", n),
            Err(e) => eprintln!("Error: {}", e),
        },
        Command::Stats => println!("{}", store.stats().summary()),
    }
}

fn parse_command(input: &str) -> anyhow::Result<Command> {
    let parts: Vec<&str> = input.split_whitespace().collect();

    if parts.is_empty() {
        anyhow::bail!("Empty command");
    }

    let cmd = parts[0].to_uppercase();
    let key = || parts.get(1).map(|k| k.to_string());

    match cmd.as_str() {
        "PUT" | "SET" => {
            if parts.len() != 4 {
                anyhow::bail!("PUT requires key, value and ttl: PUT <key> <value> <ttl_seconds>");
            }
            let ttl = parts[3]
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid ttl: {}", parts[3]))?;
            Ok(Command::Put {
                key: parts[1].to_string(),
                value: parts[2].to_string(),
                ttl,
            })
        }
        "GET" => match key() {
            Some(key) => Ok(Command::Get { key }),
            None => anyhow::bail!("GET requires a key: GET <key>"),
        },
        "DEL" | "DELETE" => match key() {
            Some(key) => Ok(Command::Del { key }),
            None => anyhow::bail!("DEL requires a key: DEL <key>"),
        },
        "LEN" => Ok(Command::Len),
        "STATS" => Ok(Command::Stats),
        _ => anyhow::bail!("Unknown command: {}. Type 'help' for available commands.", cmd),
    }
}

fn print_help() {
    println!("Available commands:");
    println!("  PUT <key> <value> <ttl>  Store a value for ttl seconds (<= 0 expires at once)");
    println!("  GET <key>                Get a value, (nil) if missing or expired");
    println!("  DEL <key>                Delete a key");
    println!("  LEN                      Stored entries, expired ones included");
    println!("  STATS                    Operation counters and latency");
    println!("  help                     Show this help");
    println!("  quit                     Exit the shell");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_put() {
        assert_eq!(
            parse_command("put name1 john 3").unwrap(),
            Command::Put {
                key: "name1".into(),
                value: "john".into(),
                ttl: 3
            }
        );
        assert!(parse_command("PUT name1 john").is_err());
        assert!(parse_command("PUT name1 john soon").is_err());
    }

    #[test]
    fn test_parse_other_commands() {
        assert_eq!(
            parse_command("GET k").unwrap(),
            Command::Get { key: "k".into() }
        );
        assert_eq!(
            parse_command("del k").unwrap(),
            Command::Del { key: "k".into() }
        );
        assert_eq!(parse_command("stats").unwrap(), Command::Stats);
        assert!(parse_command("GET").is_err());
        assert!(parse_command("FLUSH").is_err());
    }
}
