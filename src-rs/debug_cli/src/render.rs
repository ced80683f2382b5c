use std::io::{self, Write};

use crate::models::{CLIConfig, PrioritizeInfo, StatsInfo, TaskInfo};

pub fn banner(cfg: &CLIConfig) {
    println!("ScholarFlow Debug CLI");
    println!("API: {}", cfg.base_url);
    println!("Filter: {}  Debug: {}", cfg.filter, cfg.debug);
    println!("Type /help for commands. A plain line adds a task with that title.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                          Show commands");
    println!("  /exit | /quit                  Exit");
    println!("  /list [filter]                 List tasks (All, Todo, In Progress, Completed)");
    println!("  /filter <name>                 Set default list filter");
    println!("  /add <title> [| priority | subject | deadline | hours]");
    println!("                                 Add a task");
    println!("  /done <n|id>                   Toggle completion");
    println!("  /timer <n|id>                  Start or stop the timer");
    println!("  /reset <n|id>                  Reset tracked time");
    println!("  /delete <n|id>                 Delete a task");
    println!("  /prioritize                    Ask the advisor to reprioritize open tasks");
    println!("  /stats                         Completion rate and tracked time");
    println!("  /subject <name>                Default subject for new tasks");
    println!("  /debug [on|off]                Toggle AI reasoning output");
    println!("  /config                        Show current config");
    println!("  /base <url>                    Update base URL");
}

pub fn tasks(tasks: &[TaskInfo], debug: bool) {
    if tasks.is_empty() {
        println!("no tasks");
        return;
    }
    for (idx, task) in tasks.iter().enumerate() {
        println!("{:>3}. {}", idx + 1, line(task));
        if debug {
            println!("     id: {}", task.id);
            if let Some(reasoning) = &task.ai_reasoning {
                println!("     ai: {}", reasoning);
            }
        }
    }
}

pub fn task(task: &TaskInfo) {
    println!("{}", line(task));
}

fn line(task: &TaskInfo) -> String {
    let marker = if task.is_timer_running { " (running)" } else { "" };
    let subject = if task.subject.is_empty() {
        String::new()
    } else {
        format!(" [{}]", task.subject)
    };
    let deadline = if task.deadline.is_empty() {
        String::new()
    } else {
        format!(" due {}", task.deadline)
    };
    format!(
        "[{}] {:<6} {}{}{} {}{}",
        task.status,
        task.priority,
        task.title,
        subject,
        deadline,
        clock(task.time_spent_seconds),
        marker
    )
}

fn clock(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

pub fn stats(stats: &StatsInfo) {
    println!(
        "{} tasks, {} done ({}%), {} tracked",
        stats.total, stats.completed_count, stats.completion_rate, stats.total_time
    );
}

pub fn prioritize(result: &PrioritizeInfo) {
    match result.outcome.as_str() {
        "applied" => println!(
            "advisor returned {} suggestions, {} tasks updated",
            result.suggestions.unwrap_or(0),
            result.updated.unwrap_or(0)
        ),
        "nothing_to_prioritize" => println!("no open tasks to prioritize"),
        "already_running" => println!("prioritization already in progress"),
        _ => error(result.error.as_deref().unwrap_or("prioritization failed")),
    }
}

pub fn config(cfg: &CLIConfig) {
    println!("config:");
    println!("  base: {}", cfg.base_url);
    println!("  filter: {}", cfg.filter);
    println!("  debug: {}", cfg.debug);
    if let Some(subject) = &cfg.subject {
        println!("  subject: {}", subject);
    }
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}
