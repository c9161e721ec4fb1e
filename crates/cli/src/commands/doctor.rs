//! Doctor command - validate configuration and show status

use anyhow::Result;
use festival_notifier_adapters::schedule::{DailySchedule, parse_timezone};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    schedule: CheckResult,
    events: CheckResult,
    llm: CheckResult,
    images: CheckResult,
    discord: CheckResult,
    settings: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        schedule: CheckResult::error("Not checked"),
        events: CheckResult::error("Not checked"),
        llm: CheckResult::error("Not checked"),
        images: CheckResult::error("Not checked"),
        discord: CheckResult::error("Not checked"),
        settings: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.schedule = check_schedule(config);
        report.events = check_env_key(
            "Calendarific",
            &config.events.api_key_env,
            format!("Country: {}", config.general.country),
        );
        report.llm = check_llm(config);
        report.images = check_images(config);
        report.discord = check_env_key(
            "Discord",
            &config.discord.token_env,
            format!("API: {}", config.discord.base_url),
        );
        report.settings = check_settings(&config.general.settings_path);
    }

    let checks = [
        &report.config,
        &report.schedule,
        &report.events,
        &report.llm,
        &report.images,
        &report.discord,
        &report.settings,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn check_schedule(config: &AppConfig) -> CheckResult {
    let general = &config.general;

    let tz = match parse_timezone(&general.timezone) {
        Ok(tz) => tz,
        Err(e) => return CheckResult::error(e.to_string()),
    };

    let schedule = match DailySchedule::new(&general.schedule, tz) {
        Ok(s) => s,
        Err(e) => return CheckResult::error(e.to_string()),
    };

    match schedule.next_after(chrono::Utc::now()) {
        Some(next) => CheckResult::ok(format!(
            "'{}' in {}, next run {}",
            schedule.expression(),
            general.timezone,
            next.format("%Y-%m-%d %H:%M %Z")
        ))
        .with_details(serde_json::json!({
            "expression": schedule.expression(),
            "timezone": general.timezone,
            "next_run": next.to_rfc3339(),
        })),
        None => CheckResult::error(format!(
            "Schedule '{}' never fires",
            schedule.expression()
        )),
    }
}

fn check_llm(config: &AppConfig) -> CheckResult {
    let provider = &config.llm.provider;
    let model = &config.llm.model;

    let api_key_env = match provider.as_str() {
        "gemini" => &config.llm.gemini.api_key_env,
        "openai" => &config.llm.openai.api_key_env,
        "stub" => return CheckResult::warn("Provider: stub (offline, fixed greetings)"),
        other => return CheckResult::error(format!("Unknown provider: {}", other)),
    };

    check_env_key(
        provider,
        api_key_env,
        format!("Provider: {}, Model: {}", provider, model),
    )
}

fn check_images(config: &AppConfig) -> CheckResult {
    let images = &config.images;

    let key_env = match images.provider.as_str() {
        "pexels" => &images.pexels.api_key_env,
        "unsplash" => &images.unsplash.access_key_env,
        "none" => return CheckResult::ok("Images disabled"),
        other => return CheckResult::error(format!("Unknown image provider: {}", other)),
    };

    check_env_key(
        &images.provider,
        key_env,
        format!("Provider: {}, per_page: {}", images.provider, images.per_page),
    )
}

/// Check a secret env var is set, without revealing its value
fn check_env_key(provider: &str, env_var: &str, summary: String) -> CheckResult {
    if env_var.is_empty() {
        return CheckResult::error(format!("No key env var configured for {}", provider));
    }

    match std::env::var(env_var) {
        Ok(val) if !val.trim().is_empty() => {
            CheckResult::ok(format!("{}, key: {} (set)", summary, env_var))
        }
        _ => CheckResult::warn(format!("{}, key: {} (not set)", summary, env_var)),
    }
}

fn check_settings(path: &Path) -> CheckResult {
    if !path.exists() {
        return CheckResult::ok(format!(
            "{} not created yet (guilds use defaults)",
            path.display()
        ));
    }

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => return CheckResult::error(format!("Cannot read {}: {}", path.display(), e)),
    };

    match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&raw) {
        Ok(map) => CheckResult::ok(format!("{} guild(s) configured", map.len()))
            .with_details(serde_json::json!({ "path": path.display().to_string() })),
        Err(e) => CheckResult::error(format!("{} is not valid JSON: {}", path.display(), e)),
    }
}

fn print_report(report: &DoctorReport) {
    println!("festival-notifier Doctor Report");
    println!("===============================");
    println!();

    print_check("Config", &report.config);
    print_check("Schedule", &report.schedule);
    print_check("Events", &report.events);
    print_check("LLM Provider", &report.llm);
    print_check("Images", &report.images);
    print_check("Discord", &report.discord);
    print_check("Settings", &report.settings);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready to run! Try: festival-notifier run --dry-run --once");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
