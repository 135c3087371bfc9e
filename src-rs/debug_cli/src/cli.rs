use std::env;

use crate::models::CLIConfig;

const DEFAULT_URL: &str = "http://localhost:8080";

pub fn parse_config() -> CLIConfig {
    let mut cfg = CLIConfig {
        base_url: env::var("GITMESSAGES_URL").unwrap_or_else(|_| DEFAULT_URL.to_string()),
        debug: env::var("GITMESSAGES_DEBUG")
            .map(|value| is_truthy(&value))
            .unwrap_or(false),
        token: non_empty(env::var("GITMESSAGES_TOKEN").ok()),
    };

    let mut args = env::args().skip(1).peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--base" => {
                if let Some(url) = args.next() {
                    cfg.base_url = url;
                }
            }
            "--token" => cfg.token = non_empty(args.next()),
            "--debug" => {
                cfg.debug = args
                    .next_if(|next| !next.starts_with('-'))
                    .map(|value| is_truthy(&value))
                    .unwrap_or(true);
            }
            other => eprintln!("ignoring unknown argument: {}", other),
        }
    }

    cfg
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "on" | "yes")
}
