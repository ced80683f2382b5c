use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::models::{NewTaskRequest, PrioritizeInfo, StatsInfo, TaskInfo};

pub struct HTTPClient {
    pub base_url: String,
    client: Client,
}

impl HTTPClient {
    pub fn new(base_url: &str) -> Result<Self, String> {
        let client = Client::builder()
            // prioritization waits on the model, so allow more than a plain call
            .timeout(std::time::Duration::from_secs(90))
            .build()
            .map_err(|err| err.to_string())?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn list_tasks(&self, filter: &str) -> Result<Vec<TaskInfo>, String> {
        let req = self
            .client
            .get(self.url("/tasks"))
            .query(&[("filter", filter)]);
        let value: serde_json::Value = send_json(req)?;
        let tasks = value
            .get("tasks")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let mut out = Vec::new();
        for item in tasks {
            if let Ok(task) = serde_json::from_value::<TaskInfo>(item) {
                out.push(task);
            }
        }
        Ok(out)
    }

    pub fn add_task(&self, req: &NewTaskRequest) -> Result<TaskInfo, String> {
        send_json(self.client.post(self.url("/tasks")).json(req))
    }

    pub fn delete_task(&self, id: &str) -> Result<(), String> {
        let resp = self
            .client
            .delete(self.url(&format!("/tasks/{}", id)))
            .send()
            .map_err(|err| err.to_string())?;
        check(resp).map(|_| ())
    }

    pub fn toggle_status(&self, id: &str) -> Result<TaskInfo, String> {
        send_json(self.client.post(self.url(&format!("/tasks/{}/status", id))))
    }

    pub fn toggle_timer(&self, id: &str) -> Result<TaskInfo, String> {
        send_json(self.client.post(self.url(&format!("/tasks/{}/timer", id))))
    }

    pub fn reset_timer(&self, id: &str) -> Result<TaskInfo, String> {
        send_json(self.client.post(self.url(&format!("/tasks/{}/timer/reset", id))))
    }

    /// The server answers non-2xx for refused or failed runs but still sends
    /// the outcome body, so it is decoded regardless of status.
    pub fn prioritize(&self) -> Result<PrioritizeInfo, String> {
        let resp = self
            .client
            .post(self.url("/prioritize"))
            .send()
            .map_err(|err| err.to_string())?;
        resp.json::<PrioritizeInfo>().map_err(|err| err.to_string())
    }

    pub fn stats(&self) -> Result<StatsInfo, String> {
        send_json(self.client.get(self.url("/stats")))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, String> {
    let resp = req.send().map_err(|err| err.to_string())?;
    check(resp)?.json::<T>().map_err(|err| err.to_string())
}

fn check(resp: Response) -> Result<Response, String> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or(body);
    Err(format!("http {}: {}", status.as_u16(), message))
}
