use std::io::{self, Write};

use crate::models::{CLIConfig, CycleStats, Health, HistoryEntry, RandomResponse};

pub fn banner(cfg: &CLIConfig) {
    println!("gitmessages debug CLI");
    println!("API: {}", cfg.base_url);
    println!("Press Enter to draw a message, /help for commands.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  <enter> | /draw        Draw a message (JSON endpoint)");
    println!("  /text                  Draw a message (plain-text endpoint)");
    println!("  /stats                 Show usage for the current cycle");
    println!("  /reset                 Start a new cycle");
    println!("  /list [limit]          Show the first messages of the pool");
    println!("  /health                Server health");
    println!("  /history               Messages drawn this session");
    println!("  /debug [on|off]        Toggle debug output");
    println!("  /config                Show current config");
    println!("  /base <url>            Update base URL");
    println!("  /token [token]         Set or clear the admin bearer token");
    println!("  /exit | /quit          Exit");
}

pub fn message(resp: &RandomResponse, debug: bool) {
    println!("#{} {}", resp.data.id, resp.data.content);
    if let Some(meta) = &resp.meta {
        println!(
            "   cycle {} - {}/{} used",
            meta.cycle, meta.used_in_cycle, meta.total_messages
        );
    }
    if debug {
        println!(
            "   success={} created_at={} served_at={}",
            resp.success, resp.data.created_at, resp.timestamp
        );
    }
}

pub fn text(content: &str) {
    println!("{}", content);
}

pub fn stats(stats: &CycleStats) {
    println!("cycle:     {}", stats.cycle);
    println!("total:     {}", stats.total_messages);
    println!("used:      {}", stats.used_in_cycle);
    println!("remaining: {}", stats.remaining_in_cycle);
}

pub fn list(messages: &[String], limit: usize) {
    if messages.is_empty() {
        println!("no messages");
        return;
    }
    for (idx, content) in messages.iter().take(limit).enumerate() {
        println!("{:>4}  {}", idx + 1, content);
    }
    if messages.len() > limit {
        println!("... {} more", messages.len() - limit);
    }
}

pub fn health(health: &Health, debug: bool) {
    let status = health["status"].as_str().unwrap_or("unknown");
    let database = health["checks"]["database"]["status"].as_str().unwrap_or("unknown");
    println!("status: {}  database: {}", status, database);
    if debug {
        println!("{}", health);
    }
}

pub fn config(cfg: &CLIConfig) {
    println!("config:");
    println!("  base: {}", cfg.base_url);
    println!("  debug: {}", cfg.debug);
    println!("  token: {}", if cfg.token.is_some() { "set" } else { "unset" });
}

pub fn history(items: &[HistoryEntry]) {
    if items.is_empty() {
        println!("no history");
        return;
    }
    for entry in items {
        match entry.cycle {
            Some(cycle) => println!("[cycle {}] #{} {}", cycle, entry.message.id, entry.message.content),
            None => println!("#{} {}", entry.message.id, entry.message.content),
        }
    }
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}
