use std::io;

use crate::client::HTTPClient;
use crate::models::{CLIConfig, HistoryEntry};
use crate::render;

pub struct REPL {
    pub config: CLIConfig,
    pub client: HTTPClient,
    pub history: Vec<HistoryEntry>,
}

impl REPL {
    pub fn new(config: CLIConfig, client: HTTPClient) -> Self {
        Self {
            config,
            client,
            history: Vec::new(),
        }
    }

    pub fn run(&mut self) {
        render::banner(&self.config);
        loop {
            render::prompt();
            let mut line = String::new();
            match io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim();
            let command = if line.is_empty() { "/draw" } else { line };
            if self.handle_command(command) {
                break;
            }
        }
    }

    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim();
        match cmd {
            "exit" | "quit" => return true,
            "help" => render::help(),
            "draw" => self.draw(),
            "text" => match self.client.draw_text() {
                Ok(text) => render::text(&text),
                Err(err) => render::error(&err),
            },
            "stats" => match self.client.stats() {
                Ok(resp) => render::stats(&resp.data),
                Err(err) => render::error(&err),
            },
            "reset" => match self.client.reset() {
                Ok(resp) => render::info(&format!("{} (cycle {})", resp.message, resp.cycle)),
                Err(err) => render::error(&err),
            },
            "list" => {
                let limit = rest.parse::<usize>().unwrap_or(10);
                match self.client.list() {
                    Ok(messages) => render::list(&messages, limit),
                    Err(err) => render::error(&err),
                }
            }
            "health" => match self.client.health() {
                Ok(health) => render::health(&health, self.config.debug),
                Err(err) => render::error(&err),
            },
            "history" => render::history(&self.history),
            "debug" => {
                self.config.debug = match rest {
                    "" => !self.config.debug,
                    "on" => true,
                    "off" => false,
                    _ => {
                        render::error("usage: /debug [on|off]");
                        return false;
                    }
                };
                render::info(&format!("debug: {}", self.config.debug));
            }
            "config" => render::config(&self.config),
            "base" => {
                if rest.is_empty() {
                    render::info(&format!("base: {}", self.config.base_url));
                } else {
                    self.config.base_url = rest.to_string();
                    self.rebuild_client();
                }
            }
            "token" => {
                self.config.token = if rest.is_empty() { None } else { Some(rest.to_string()) };
                self.rebuild_client();
            }
            _ => render::info("unknown command, type /help"),
        }
        false
    }

    fn draw(&mut self) {
        match self.client.draw() {
            Ok(resp) => {
                render::message(&resp, self.config.debug);
                self.history.push(HistoryEntry {
                    message: resp.data,
                    cycle: resp.meta.map(|meta| meta.cycle),
                });
            }
            Err(err) => render::error(&err),
        }
    }

    fn rebuild_client(&mut self) {
        match HTTPClient::new(&self.config.base_url, self.config.token.clone()) {
            Ok(client) => {
                self.client = client;
                render::info("client updated");
            }
            Err(err) => render::error(&err),
        }
    }
}
