use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;

use crate::models::{ErrorResponse, Health, RandomResponse, ResetResponse, StatsResponse};

pub struct HTTPClient {
    pub base_url: String,
    pub token: Option<String>,
    client: Client,
}

impl HTTPClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| err.to_string())?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => req,
        }
    }

    pub fn draw(&self) -> Result<RandomResponse, String> {
        self.send_json(self.client.get(self.url("/api/v1/random")))
    }

    pub fn draw_text(&self) -> Result<String, String> {
        let resp = self
            .client
            .get(self.url("/api/v1/random.txt"))
            .send()
            .map_err(|err| err.to_string())?;
        let status = resp.status();
        let body = resp.text().map_err(|err| err.to_string())?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(format!("http {}: {}", status.as_u16(), body))
        }
    }

    pub fn stats(&self) -> Result<StatsResponse, String> {
        self.send_json(self.client.get(self.url("/api/v1/stats")))
    }

    pub fn reset(&self) -> Result<ResetResponse, String> {
        self.send_json(self.authorized(self.client.post(self.url("/api/v1/reset"))))
    }

    pub fn list(&self) -> Result<Vec<String>, String> {
        self.send_json(self.client.get(self.url("/api/v1/messages.json")))
    }

    pub fn health(&self) -> Result<Health, String> {
        self.send_json(self.client.get(self.url("/healthz")))
    }

    fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, String> {
        let resp = req.send().map_err(|err| err.to_string())?;
        decode(resp)
    }
}

fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, String> {
    let status = resp.status();
    if status.is_success() {
        return resp.json::<T>().map_err(|err| err.to_string());
    }
    let body = resp.text().unwrap_or_default();
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) => Err(format!(
            "http {} {}: {}",
            status.as_u16(),
            parsed.error.code,
            parsed.error.message
        )),
        Err(_) => Err(format!("http {}: {}", status.as_u16(), body)),
    }
}
