//! Command execution
//!
//! Every command returns the text to print; `main` owns stdout.

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use hackrore_common::case_report::CaseReport;
use hackrore_common::config::HackroreConfig;
use hackrore_common::tickets::{NewTicket, TicketLog, TicketStatus, EXPORT_FILE_NAME};
use hackrore_common::{
    DiagnosticCheck, FileStore, NewResult, Session, SharedStore, TestStatus, LEVEL_THRESHOLDS,
};

use crate::cli::{Commands, ConfigCommands, TicketCommands};
use crate::display::{self, Style};

/// Everything a command needs for one invocation
pub struct App {
    pub config: HackroreConfig,
    pub config_path: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub session: Session,
    pub tickets: TicketLog,
    pub json: bool,
    pub style: Style,
}

impl App {
    /// File-backed app rooted at `data_dir`
    pub fn open(config: HackroreConfig, config_path: Option<PathBuf>, data_dir: PathBuf) -> Self {
        let store: SharedStore = Arc::new(FileStore::new(&data_dir));
        Self::with_store(config, config_path, data_dir, store)
    }

    pub fn with_store(
        config: HackroreConfig,
        config_path: Option<PathBuf>,
        data_dir: PathBuf,
        store: SharedStore,
    ) -> Self {
        debug!(data_dir = %data_dir.display(), "opening session");
        let style = Style::from_mode(config.display.color);
        Self {
            session: Session::open(store.clone()),
            tickets: TicketLog::load(store),
            config,
            config_path,
            data_dir,
            json: false,
            style,
        }
    }
}

fn parse_status(raw: &str) -> Result<TestStatus> {
    raw.parse::<TestStatus>()
        .with_context(|| format!("invalid --status '{}'", raw))
}

/// JSON when it parses, otherwise the raw text as a string value
fn parse_details(raw: Option<&str>) -> Option<Value> {
    raw.map(|text| serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}

fn to_json(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize output")
}

pub fn execute(app: &mut App, command: &Commands) -> Result<String> {
    match command {
        Commands::Status => status(app),
        Commands::Check {
            kind,
            status,
            score,
            details,
        } => check(app, kind, status, *score, details.as_deref()),
        Commands::Checks => checks(app),
        Commands::Xp { amount, reason } => xp(app, *amount, reason),
        Commands::Record {
            id,
            name,
            status,
            details,
        } => record_result(app, id, name.as_deref(), status, details.as_deref()),
        Commands::Results => results(app),
        Commands::History { limit } => history(app, *limit),
        Commands::ClearResults => clear_results(app),
        Commands::Unlocks => unlocks(app),
        Commands::Ticket { action } => ticket(app, action),
        Commands::CaseReport {
            technician,
            client,
            device,
            issue,
            notes,
            out,
        } => {
            let report = CaseReport {
                technician: technician
                    .clone()
                    .unwrap_or_else(|| app.config.profile.technician_name.clone()),
                client: client.clone(),
                device: device.clone(),
                issue: issue.clone(),
                notes: notes.clone(),
            };
            case_report(app, &report, out.as_deref())
        }
        Commands::Config { action } => config(app, action),
    }
}

fn status(app: &App) -> Result<String> {
    let ledger = app.session.progression()?;
    let results = app.session.results()?;

    if app.json {
        let progress = ledger.progress_to_next_level();
        return to_json(&json!({
            "xp": ledger.xp(),
            "level": ledger.level(),
            "max_level": ledger.is_max_level(),
            "progress": progress,
            "overall_status": results.overall_status(),
            "counts": results.counts(),
            "unlocked": ledger.unlockables().iter().filter(|u| u.unlocked).map(|u| &u.id).collect::<Vec<_>>(),
            "durable": ledger.is_durable() && results.is_durable(),
        }));
    }
    Ok(display::render_status(&app.style, ledger, results))
}

fn check(
    app: &mut App,
    kind: &str,
    status: &str,
    score: Option<u64>,
    details: Option<&str>,
) -> Result<String> {
    let check: DiagnosticCheck = kind.parse()?;
    let status = parse_status(status)?;
    let report = app
        .session
        .record_check(check, status, score, parse_details(details))?;
    info!(check = %check, status = %status, xp = report.award.as_ref().map(|a| a.amount).unwrap_or(0), "check recorded");

    if app.json {
        return to_json(&json!({
            "check": check,
            "result": report.result,
            "award": report.award,
        }));
    }

    let mut lines = Vec::new();
    match &report.result {
        Some(result) => lines.push(display::render_result_line(&app.style, result)),
        None => lines.push(format!("{} {}", app.style.status_badge(status), check.display_name())),
    }
    match &report.award {
        Some(award) => lines.push(display::render_award(&app.style, award)),
        None => lines.push(app.style.dim("No XP awarded.")),
    }
    Ok(lines.join("\n"))
}

fn checks(app: &App) -> Result<String> {
    if app.json {
        let list: Vec<Value> = DiagnosticCheck::ALL
            .iter()
            .map(|c| {
                json!({
                    "check": c,
                    "result_id": c.result_id(),
                    "name": c.display_name(),
                    "scored": c.is_scored(),
                })
            })
            .collect();
        return to_json(&Value::Array(list));
    }
    Ok(display::render_checks())
}

fn xp(app: &mut App, amount: u64, reason: &str) -> Result<String> {
    let award = app.session.add_xp(amount, reason)?;
    if app.json {
        return to_json(&json!(award));
    }
    Ok(display::render_award(&app.style, &award))
}

fn record_result(
    app: &mut App,
    id: &str,
    name: Option<&str>,
    status: &str,
    details: Option<&str>,
) -> Result<String> {
    let status = parse_status(status)?;
    let mut new = NewResult::new(id, name.unwrap_or(id), status);
    new.details = parse_details(details);
    let result = app.session.add_result(new)?;

    if app.json {
        return to_json(&json!(result));
    }
    Ok(display::render_result_line(&app.style, &result))
}

fn results(app: &App) -> Result<String> {
    let results = app.session.results()?;
    if app.json {
        return to_json(&json!({
            "overall_status": results.overall_status(),
            "results": results.results(),
        }));
    }
    let mut out = display::render_results(&app.style, results.results().values());
    out.push_str(&format!(
        "\n{}\nOverall: {}",
        app.style.dim(display::HR),
        app.style.status_badge(results.overall_status())
    ));
    Ok(out)
}

fn history(app: &App, limit: usize) -> Result<String> {
    let results = app.session.results()?;
    if app.json {
        let entries: Vec<_> = results.history().take(limit).collect();
        return to_json(&json!(entries));
    }
    Ok(display::render_results(&app.style, results.history().take(limit)))
}

fn clear_results(app: &mut App) -> Result<String> {
    app.session.results_mut()?.clear_results();
    info!("results cleared");
    if app.json {
        return to_json(&json!({ "cleared": true }));
    }
    Ok("Results and history cleared.".to_string())
}

fn unlocks(app: &App) -> Result<String> {
    let ledger = app.session.progression()?;
    if app.json {
        return to_json(&json!(ledger.unlockables()));
    }
    let mut out = display::render_unlocks(&app.style, ledger.unlockables());
    if let Some(next) = LEVEL_THRESHOLDS.get(ledger.level() as usize) {
        out.push_str(&format!(
            "\n{}",
            app.style.dim(&format!("Next level at {} XP", next))
        ));
    }
    Ok(out)
}

fn ticket(app: &mut App, action: &TicketCommands) -> Result<String> {
    match action {
        TicketCommands::Add {
            client,
            device,
            issue,
        } => {
            let ticket = app.tickets.add(NewTicket::new(client, device, issue))?;
            if app.json {
                return to_json(&json!(ticket));
            }
            Ok(format!("Opened ticket {} for {}", app.style.accent(&ticket.id), ticket.client))
        }
        TicketCommands::List { search } => {
            let tickets = match search {
                Some(query) => app.tickets.search(query),
                None => app.tickets.tickets().iter().collect(),
            };
            if app.json {
                return to_json(&json!(tickets));
            }
            Ok(display::render_tickets(&app.style, &tickets))
        }
        TicketCommands::Status { id, status } => {
            let status: TicketStatus = status.parse()?;
            let ticket = app.tickets.set_status(id, status)?;
            if app.json {
                return to_json(&json!(ticket));
            }
            Ok(format!("Ticket {} is now {}", ticket.id, ticket.status))
        }
        TicketCommands::Delete { id } => {
            if !app.tickets.delete(id) {
                bail!("no ticket with id '{}'", id);
            }
            if app.json {
                return to_json(&json!({ "deleted": id }));
            }
            Ok(format!("Deleted ticket {}", id))
        }
        TicketCommands::Export { out } => {
            let dir = out.clone().unwrap_or_else(|| PathBuf::from("."));
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            let path = dir.join(EXPORT_FILE_NAME);
            fs::write(&path, app.tickets.export_json()?)
                .with_context(|| format!("failed to write {}", path.display()))?;
            if app.json {
                return to_json(&json!({ "path": path, "count": app.tickets.tickets().len() }));
            }
            Ok(format!("Exported {} tickets to {}", app.tickets.tickets().len(), path.display()))
        }
    }
}

fn case_report(app: &App, report: &CaseReport, out: Option<&Path>) -> Result<String> {
    let dir = out.unwrap_or_else(|| Path::new("."));
    let path = report.write_to(dir)?;
    info!(path = %path.display(), "case report written");
    if app.json {
        return to_json(&json!({ "path": path }));
    }
    Ok(format!("Case report saved to {}", path.display()))
}

fn config(app: &App, action: &ConfigCommands) -> Result<String> {
    match action {
        ConfigCommands::Show => {
            if app.json {
                return to_json(&json!(app.config));
            }
            let mut out = app.config.to_toml()?;
            out.push_str(&format!("\n# data dir in use: {}", app.data_dir.display()));
            Ok(out)
        }
        ConfigCommands::Init { force } => {
            let path = match app.config_path.clone().or_else(HackroreConfig::default_path) {
                Some(path) => path,
                None => bail!("no config directory available; pass --config"),
            };
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            HackroreConfig::default().save_to(&path)?;
            if app.json {
                return to_json(&json!({ "path": path }));
            }
            Ok(format!("Wrote {}", path.display()))
        }
    }
}
