//! Collect running configurations through a jump host
//!
//! Opens one SSH session on a management host, then hops to every element
//! listed in a JSON inventory and prints its sanitized configuration.
//!
//! # Inventory
//!
//! ```json
//! [
//!   {"line": "ssh", "authentication": "Password", "password": "pw", "ip_address": "10.0.0.5"},
//!   {"line": "telnet", "authentication": "Username:Password",
//!    "username": "admin", "password": "pw", "ip_address": "172.16.0.1"}
//! ]
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --example collect_configs -- --host 10.1.1.1 --user admin --password secret \
//!     --inventory elements.json
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use nethop::{
    DEFAULT_EXTRACTION_COMMAND, ElementDescriptor, ElementRecord, ExecOutcome, HopDriver,
    JumpSessionBuilder,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let inventory = std::fs::read_to_string(&args.inventory)?;
    let records: Vec<ElementRecord> = serde_json::from_str(&inventory)?;
    let elements = records
        .into_iter()
        .map(ElementDescriptor::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    println!(
        "Connecting to {}:{} ({} element(s))...",
        args.host,
        args.port,
        elements.len()
    );

    let mut builder = JumpSessionBuilder::new(&args.host)
        .port(args.port)
        .username(&args.user)
        .timeout(Duration::from_secs(args.timeout));

    if let Some(password) = &args.password {
        builder = builder.password(password);
    } else if let Some(key_path) = &args.key {
        builder = builder.private_key(key_path);
    } else {
        eprintln!("Error: Must provide either --password or --key");
        std::process::exit(1);
    }

    let mut session = builder.open().await?;
    println!("Connected!");

    {
        let mut driver = HopDriver::new(&mut session)?;
        for element in &elements {
            println!("\n{} {}", element.connect_method, element.address);
            println!("{}", "-".repeat(50));

            match driver.exec(element, &[args.command.as_str()]).await {
                Ok(ExecOutcome::Completed(response)) => {
                    println!("{}", response.result);
                    println!("{}", "-".repeat(50));
                    println!(
                        "{} in {:?}",
                        response.hostname.as_deref().unwrap_or("?"),
                        response.elapsed
                    );
                }
                Ok(ExecOutcome::Skipped(failure)) => println!("skipped: {}", failure),
                Err(e) => {
                    // the shell is out of sync after a timeout
                    eprintln!("{}: {}", element.address, e);
                    break;
                }
            }

            if !driver.log().is_empty() {
                print!("{}", driver.log().text());
            }
        }
    }

    println!("\nClosing connection...");
    session.close().await?;
    println!("Done!");

    Ok(())
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    host: String,
    port: u16,
    user: String,
    password: Option<String>,
    key: Option<PathBuf>,
    inventory: PathBuf,
    command: String,
    timeout: u64,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut host = "localhost".to_string();
        let mut port = 22u16;
        let mut user = env::var("USER").unwrap_or_else(|_| "root".to_string());
        let mut password = None;
        let mut key = None;
        let mut inventory = PathBuf::from("elements.json");
        let mut command = DEFAULT_EXTRACTION_COMMAND.to_string();
        let mut timeout = 30u64;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    i += 1;
                    if i < args.len() {
                        host = args[i].clone();
                    }
                }
                "--port" | "-p" => {
                    i += 1;
                    if i < args.len() {
                        port = args[i].parse().unwrap_or(22);
                    }
                }
                "--user" | "-u" => {
                    i += 1;
                    if i < args.len() {
                        user = args[i].clone();
                    }
                }
                "--password" | "-P" => {
                    i += 1;
                    if i < args.len() {
                        password = Some(args[i].clone());
                    }
                }
                "--key" | "-k" => {
                    i += 1;
                    if i < args.len() {
                        key = Some(PathBuf::from(&args[i]));
                    }
                }
                "--inventory" | "-i" => {
                    i += 1;
                    if i < args.len() {
                        inventory = PathBuf::from(&args[i]);
                    }
                }
                "--command" | "-c" => {
                    i += 1;
                    if i < args.len() {
                        command = args[i].clone();
                    }
                }
                "--timeout" | "-t" => {
                    i += 1;
                    if i < args.len() {
                        timeout = args[i].parse().unwrap_or(30);
                    }
                }
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                }
            }
            i += 1;
        }

        Self {
            host,
            port,
            user,
            password,
            key,
            inventory,
            command,
            timeout,
        }
    }

    fn print_help() {
        println!(
            r#"nethop collect_configs example

USAGE:
    cargo run --example collect_configs -- [OPTIONS]

OPTIONS:
    -h, --host <HOST>         Jump host [default: localhost]
    -p, --port <PORT>         SSH port [default: 22]
    -u, --user <USER>         Username [default: $USER]
    -P, --password <PASS>     Password for authentication
    -k, --key <PATH>          Path to SSH private key
    -i, --inventory <PATH>    JSON list of elements [default: elements.json]
    -c, --command <CMD>       Command to run on each element [default: show run]
    -t, --timeout <SECS>      Read timeout [default: 30]
    --help                    Print this help message
"#
        );
    }
}
