use std::io;

use crate::client::HTTPClient;
use crate::models::{CLIConfig, NewTaskRequest, TaskInfo};
use crate::render;

pub struct REPL {
    pub config: CLIConfig,
    pub client: HTTPClient,
    /// Tasks from the last listing, so commands can refer to them by number.
    pub listing: Vec<TaskInfo>,
}

impl REPL {
    pub fn new(config: CLIConfig, client: HTTPClient) -> Self {
        Self {
            config,
            client,
            listing: Vec::new(),
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
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('/') {
                if self.handle_command(&line) {
                    break;
                }
                continue;
            }
            self.add(&line);
        }
    }

    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim();
        match cmd {
            "exit" | "quit" => return true,
            "help" => render::help(),
            "list" | "ls" => {
                let filter = if rest.is_empty() {
                    self.config.filter.clone()
                } else {
                    rest.to_string()
                };
                self.list(&filter);
            }
            "filter" => {
                if rest.is_empty() {
                    render::info(&format!("filter: {}", self.config.filter));
                } else {
                    self.config.filter = rest.to_string();
                    render::info("filter updated");
                }
            }
            "add" => {
                if rest.is_empty() {
                    render::error("title required");
                } else {
                    self.add(rest);
                }
            }
            "done" => self.with_task(rest, |client, id| client.toggle_status(id)),
            "timer" => self.with_task(rest, |client, id| client.toggle_timer(id)),
            "reset" => self.with_task(rest, |client, id| client.reset_timer(id)),
            "delete" | "rm" => match self.resolve(rest) {
                Some(id) => match self.client.delete_task(&id) {
                    Ok(()) => {
                        self.listing.retain(|t| t.id != id);
                        render::info("task deleted");
                    }
                    Err(err) => render::error(&err),
                },
                None => render::error("usage: /delete <n|id>"),
            },
            "prioritize" | "ai" => {
                render::info("asking the advisor...");
                match self.client.prioritize() {
                    Ok(result) => render::prioritize(&result),
                    Err(err) => render::error(&err),
                }
            }
            "stats" => match self.client.stats() {
                Ok(stats) => render::stats(&stats),
                Err(err) => render::error(&err),
            },
            "subject" => {
                if rest.is_empty() {
                    render::info(&format!("subject: {:?}", self.config.subject));
                } else {
                    self.config.subject = Some(rest.to_string());
                    render::info("subject updated");
                }
            }
            "debug" => {
                if rest.is_empty() {
                    self.config.debug = !self.config.debug;
                    render::info(&format!("debug: {}", self.config.debug));
                } else if let Some(flag) = parse_on_off(rest) {
                    self.config.debug = flag;
                    render::info(&format!("debug: {}", self.config.debug));
                } else {
                    render::error("invalid debug flag");
                }
            }
            "config" => render::config(&self.config),
            "base" => {
                if rest.is_empty() {
                    render::info(&format!("base: {}", self.config.base_url));
                } else {
                    match HTTPClient::new(rest) {
                        Ok(client) => {
                            self.config.base_url = rest.to_string();
                            self.client = client;
                            self.listing.clear();
                            render::info("base url updated");
                        }
                        Err(err) => render::error(&err),
                    }
                }
            }
            _ => render::info("unknown command, type /help"),
        }
        false
    }

    fn add(&mut self, spec: &str) {
        let req = match parse_new_task(spec, self.config.subject.as_deref()) {
            Ok(req) => req,
            Err(err) => {
                render::error(&err);
                return;
            }
        };
        match self.client.add_task(&req) {
            Ok(task) => render::task(&task),
            Err(err) => render::error(&err),
        }
    }

    fn list(&mut self, filter: &str) {
        match self.client.list_tasks(filter) {
            Ok(tasks) => {
                render::tasks(&tasks, self.config.debug);
                self.listing = tasks;
            }
            Err(err) => render::error(&err),
        }
    }

    fn with_task<F>(&mut self, reference: &str, op: F)
    where
        F: FnOnce(&HTTPClient, &str) -> Result<TaskInfo, String>,
    {
        let Some(id) = self.resolve(reference) else {
            render::error("expected a task number from /list or a task id");
            return;
        };
        match op(&self.client, &id) {
            Ok(task) => {
                if let Some(slot) = self.listing.iter_mut().find(|t| t.id == task.id) {
                    *slot = task.clone();
                }
                render::task(&task);
            }
            Err(err) => render::error(&err),
        }
    }

    fn resolve(&self, reference: &str) -> Option<String> {
        resolve_reference(&self.listing, reference)
    }
}

fn resolve_reference(listing: &[TaskInfo], reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    if let Ok(n) = reference.parse::<usize>() {
        if n >= 1 && n <= listing.len() {
            return Some(listing[n - 1].id.clone());
        }
    }
    Some(reference.to_string())
}

/// `title | priority | subject | deadline | hours`, trailing fields optional.
fn parse_new_task(spec: &str, default_subject: Option<&str>) -> Result<NewTaskRequest, String> {
    let fields: Vec<&str> = spec.split('|').map(str::trim).collect();
    let title = fields.first().copied().unwrap_or("");
    if title.is_empty() {
        return Err("title required".to_string());
    }
    let priority = match fields.get(1).copied().unwrap_or("") {
        "" => "Medium".to_string(),
        raw => normalize_priority(raw).ok_or_else(|| format!("unknown priority: {}", raw))?,
    };
    let subject = match fields.get(2).copied() {
        Some(subject) if !subject.is_empty() => subject.to_string(),
        _ => default_subject.unwrap_or("").to_string(),
    };
    let estimated_hours = match fields.get(4).copied() {
        Some(raw) if !raw.is_empty() => Some(
            raw.parse::<f64>()
                .map_err(|_| format!("invalid hours: {}", raw))?,
        ),
        _ => None,
    };
    Ok(NewTaskRequest {
        title: title.to_string(),
        description: String::new(),
        subject,
        deadline: fields.get(3).copied().unwrap_or("").to_string(),
        priority,
        estimated_hours,
    })
}

fn normalize_priority(raw: &str) -> Option<String> {
    match raw.to_lowercase().as_str() {
        "low" | "l" => Some("Low".to_string()),
        "medium" | "med" | "m" => Some("Medium".to_string()),
        "high" | "h" => Some("High".to_string()),
        _ => None,
    }
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
