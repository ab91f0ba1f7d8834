//! Technician ticket log.
//!
//! Repair tickets persisted as one JSON array under `hackrore_logs`.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{HackroreError, Result};
use crate::storage::SharedStore;

pub const TICKETS_KEY: &str = "hackrore_logs";

/// File name used for exports
pub const EXPORT_FILE_NAME: &str = "technician_logs.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Fixed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "Pending",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Fixed => "Fixed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = HackroreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "pending" => Ok(TicketStatus::Pending),
            "in progress" | "inprogress" => Ok(TicketStatus::InProgress),
            "fixed" => Ok(TicketStatus::Fixed),
            _ => Err(HackroreError::invalid(format!(
                "unknown ticket status '{}' (expected pending, in-progress or fixed)",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub date: NaiveDate,
    pub client: String,
    pub device: String,
    pub issue: String,
    pub status: TicketStatus,
}

impl Ticket {
    fn matches(&self, needle: &str) -> bool {
        [&self.client, &self.device, &self.issue, &self.id]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub client: String,
    pub device: String,
    pub issue: String,
}

impl NewTicket {
    pub fn new(client: &str, device: &str, issue: &str) -> Self {
        Self {
            client: client.trim().to_string(),
            device: device.trim().to_string(),
            issue: issue.trim().to_string(),
        }
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [("client", &self.client), ("device", &self.device), ("issue", &self.issue)] {
            if value.is_empty() {
                return Err(HackroreError::invalid(format!("ticket {} is required", field)));
            }
        }
        Ok(())
    }
}

pub struct TicketLog {
    store: SharedStore,
    tickets: Vec<Ticket>,
    durable: bool,
}

impl TicketLog {
    pub fn load(store: SharedStore) -> Self {
        let tickets = match store.get(TICKETS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "ignoring unreadable ticket log");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "storage read failed");
                Vec::new()
            }
        };
        Self {
            store,
            tickets,
            durable: true,
        }
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn get(&self, id: &str) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    pub fn is_durable(&self) -> bool {
        self.durable
    }

    /// Open a ticket dated today with status Pending
    pub fn add(&mut self, new: NewTicket) -> Result<Ticket> {
        new.validate()?;
        let ticket = Ticket {
            id: Uuid::new_v4().simple().to_string()[..8].to_string(),
            date: Utc::now().date_naive(),
            client: new.client,
            device: new.device,
            issue: new.issue,
            status: TicketStatus::Pending,
        };
        self.tickets.push(ticket.clone());
        debug!(id = %ticket.id, "ticket opened");
        self.persist();
        Ok(ticket)
    }

    pub fn set_status(&mut self, id: &str, status: TicketStatus) -> Result<&Ticket> {
        let idx = self
            .tickets
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| HackroreError::invalid(format!("no ticket with id '{}'", id)))?;
        self.tickets[idx].status = status;
        self.persist();
        Ok(&self.tickets[idx])
    }

    /// Returns false when nothing matched
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.tickets.len();
        self.tickets.retain(|t| t.id != id);
        let removed = self.tickets.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Case-insensitive match on client, device, issue or id
    pub fn search(&self, query: &str) -> Vec<&Ticket> {
        let needle = query.trim().to_lowercase();
        self.tickets.iter().filter(|t| t.matches(&needle)).collect()
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.tickets)?)
    }

    fn persist(&mut self) {
        let written = serde_json::to_string(&self.tickets)
            .map_err(HackroreError::from)
            .and_then(|json| self.store.set(TICKETS_KEY, &json));
        match written {
            Ok(()) => self.durable = true,
            Err(e) => {
                warn!(error = %e, "could not save ticket log, continuing in memory");
                self.durable = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};

    #[test]
    fn test_add_and_reload() {
        let store = MemoryStore::shared();
        let mut log = TicketLog::load(store.clone());
        let t = log
            .add(NewTicket::new("Jane Smith", "MacBook Air", "Broken Screen"))
            .unwrap();
        assert_eq!(t.status, TicketStatus::Pending);
        assert_eq!(t.id.len(), 8);

        let reloaded = TicketLog::load(store);
        assert_eq!(reloaded.tickets(), log.tickets());
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut log = TicketLog::load(MemoryStore::shared());
        assert!(log.add(NewTicket::new("Acme", "  ", "Boot Loop")).is_err());
        assert!(log.tickets().is_empty());
    }

    #[test]
    fn test_deleting_last_ticket_is_saved() {
        let store = MemoryStore::shared();
        let mut log = TicketLog::load(store.clone());
        let t = log.add(NewTicket::new("John Doe", "Dell XPS 15", "Overheating")).unwrap();

        assert!(log.delete(&t.id));
        assert!(!log.delete(&t.id));
        assert_eq!(store.get(TICKETS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_status_and_search() {
        let mut log = TicketLog::load(MemoryStore::shared());
        let a = log.add(NewTicket::new("Acme Corp", "ThinkPad X1", "Boot Loop")).unwrap();
        log.add(NewTicket::new("John Doe", "Dell XPS 15", "Overheating")).unwrap();

        log.set_status(&a.id, TicketStatus::InProgress).unwrap();
        assert_eq!(log.get(&a.id).unwrap().status, TicketStatus::InProgress);
        assert!(log.set_status("nope", TicketStatus::Fixed).is_err());

        assert_eq!(log.search("thinkpad").len(), 1);
        assert_eq!(log.search("o").len(), 2);
        assert!(log.search("macbook").is_empty());
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        assert_eq!("in-progress".parse::<TicketStatus>().unwrap(), TicketStatus::InProgress);
        assert_eq!("Fixed".parse::<TicketStatus>().unwrap(), TicketStatus::Fixed);
    }
}
