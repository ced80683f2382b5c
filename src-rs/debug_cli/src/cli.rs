use std::env;

use crate::models::CLIConfig;

const DEFAULT_URL: &str = "http://localhost:8080";
const DEFAULT_FILTER: &str = "All";

pub fn parse_config() -> CLIConfig {
    let mut cfg = CLIConfig {
        base_url: env_or("SCHOLARFLOW_URL", DEFAULT_URL.to_string()),
        filter: env_or("SCHOLARFLOW_FILTER", DEFAULT_FILTER.to_string()),
        subject: env_opt("SCHOLARFLOW_SUBJECT"),
        debug: env_bool("SCHOLARFLOW_DEBUG", false),
    };

    let mut args = env::args().skip(1).peekable();
    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--base" => cfg.base_url = args.next().unwrap_or(cfg.base_url),
            "--filter" => cfg.filter = args.next().unwrap_or(cfg.filter),
            "--subject" => cfg.subject = args.next().or(cfg.subject),
            "--debug" => {
                // optional explicit value: --debug false
                cfg.debug = match args.peek().and_then(|v| v.parse::<bool>().ok()) {
                    Some(value) => {
                        args.next();
                        value
                    }
                    None => true,
                };
            }
            other => eprintln!("ignoring unknown argument: {}", other),
        }
    }

    cfg
}

fn env_or(key: &str, fallback: String) -> String {
    env_opt(key).unwrap_or(fallback)
}

fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn env_bool(key: &str, fallback: bool) -> bool {
    match env::var(key) {
        Ok(value) => value.parse::<bool>().unwrap_or(fallback),
        Err(_) => fallback,
    }
}
