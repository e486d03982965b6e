//! Issue and open sealed tokens from the command line.
//!
//! Loads `.env` automatically if present, otherwise reads from the environment.
//!
//! ```bash
//! cargo run --example token -- issue "Jon Snow" --admin
//! cargo run --example token -- open eyJhbG...
//! ```

use std::sync::Arc;

use axum_sealed_jwt::{AuthConfig, AuthorizationGate, Identity, SystemClock, TokenIssuer};

fn main() {
    dotenvy::dotenv().ok();

    let config = AuthConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }

    match args[0].as_str() {
        "issue" => {
            let name = args.get(1).unwrap_or_else(|| usage());
            let admin = args.iter().skip(2).any(|a| a == "--admin");
            let issuer = TokenIssuer::new(&config, Arc::new(SystemClock));
            match issuer.issue(&Identity::new(name.as_str(), admin)) {
                Ok(issued) => println!("{}", issued.token),
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            }
        }
        "open" => {
            let token = args.get(1).unwrap_or_else(|| usage());
            let gate = AuthorizationGate::new(&config, Arc::new(SystemClock));
            match gate.evaluate(token) {
                Ok(c) => {
                    println!("Valid\n");
                    println!("  name  : {}", c.name);
                    println!("  admin : {}", c.admin);
                    println!("  exp   : {}", fmt(c.exp));
                }
                Err(e) => {
                    eprintln!("Rejected: {e}");
                    std::process::exit(1);
                }
            }
        }
        _ => usage(),
    }
}

fn fmt(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

fn usage() -> ! {
    eprintln!("Usage:");
    eprintln!("  cargo run --example token -- issue <name> [--admin]");
    eprintln!("  cargo run --example token -- open  <token>");
    std::process::exit(1);
}
