//! Operator CLI for credential hashes and the account file. Commands mirror the
//! library API one to one so behaviour can be checked from a shell.

use std::env;
use std::process::ExitCode;

use flashcard_credentials::accounts::AccountStore;
use flashcard_credentials::config::load_config;
use flashcard_credentials::logging::init_tracing;
use flashcard_credentials::{hash_password, verify_password, StoredCredentialHash};
use serde_json::json;
use tracing::debug;

fn print_usage() -> ExitCode {
    eprintln!("Commands:\n  hash-password <plaintext>\n  verify-password <plaintext> <stored-hash>\n  inspect-hash <stored-hash>\n  register <config> <username> <password>\n  login <config> <username> <password>\n  reset-password <config> <username> <current> <new>\n  delete-account <config> <username> <password>");
    ExitCode::from(2)
}

fn open_store(config_path: &str) -> Result<AccountStore, String> {
    let config = load_config(config_path).map_err(|e| format!("config load failed: {e}"))?;
    init_tracing(&config.debug_level);
    debug!(accounts = %config.accounts_path.display(), "using account file");
    AccountStore::open(&config.accounts_path).map_err(|e| format!("account store failed: {e}"))
}

fn report(result: Result<String, String>) -> ExitCode {
    match result {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return print_usage();
    }

    match args[1].as_str() {
        "hash-password" => {
            if args.len() != 3 {
                return print_usage();
            }
            init_tracing("warn");
            println!("{}", hash_password(&args[2]));
            ExitCode::SUCCESS
        }
        "verify-password" => {
            if args.len() != 4 {
                return print_usage();
            }
            init_tracing("warn");
            let matches = verify_password(&args[2], &args[3]);
            println!("{}", if matches { "match" } else { "no-match" });
            if matches {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        "inspect-hash" => {
            if args.len() != 3 {
                return print_usage();
            }
            init_tracing("warn");
            report(
                StoredCredentialHash::parse(&args[2])
                    .map(|stored| {
                        let printable = json!({
                            "salt": stored.salt_b64(),
                            "saltBytes": stored.salt_bytes().len(),
                            "digestBytes": stored.digest_bytes().len(),
                        });
                        serde_json::to_string_pretty(&printable).unwrap_or_default()
                    })
                    .map_err(|e| format!("invalid stored hash: {e}")),
            )
        }
        "register" => {
            if args.len() != 5 {
                return print_usage();
            }
            report(open_store(&args[2]).and_then(|mut store| {
                store
                    .register(&args[3], &args[4])
                    .map(|_| format!("registered {}", args[3].trim()))
                    .map_err(|e| format!("register failed: {e}"))
            }))
        }
        "login" => {
            if args.len() != 5 {
                return print_usage();
            }
            report(open_store(&args[2]).and_then(|store| {
                store
                    .authenticate(&args[3], &args[4])
                    .map(|_| "ok".to_string())
                    .map_err(|e| format!("login failed: {e}"))
            }))
        }
        "reset-password" => {
            if args.len() != 6 {
                return print_usage();
            }
            report(open_store(&args[2]).and_then(|mut store| {
                store
                    .reset_password(&args[3], &args[4], &args[5])
                    .map(|_| "password updated".to_string())
                    .map_err(|e| format!("reset failed: {e}"))
            }))
        }
        "delete-account" => {
            if args.len() != 5 {
                return print_usage();
            }
            report(open_store(&args[2]).and_then(|mut store| {
                store
                    .delete_account(&args[3], &args[4])
                    .map(|_| format!("deleted {}", args[3].trim()))
                    .map_err(|e| format!("delete failed: {e}"))
            }))
        }
        _ => print_usage(),
    }
}
