//! Prompt option parsing
//!
//! Accepted input (after trimming):
//! - `traceip <IPv4>`
//! - `record`
//! - `exit`

use std::net::Ipv4Addr;

use crate::models::errors::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Geolocate and enrich an address
    TraceIp(Ipv4Addr),
    /// Print the aggregated distance report
    Record,
    Exit,
}

impl Command {
    pub fn parse(input: &str) -> AppResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_option(input));
        }

        let parts: Vec<&str> = trimmed.split(' ').collect();
        match parts.as_slice() {
            ["traceip", ip] => parse_ipv4(ip).map(Command::TraceIp),
            ["record"] => Ok(Command::Record),
            ["exit"] => Ok(Command::Exit),
            _ => Err(AppError::invalid_option(input)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Command::TraceIp(_) => "traceip",
            Command::Record => "record",
            Command::Exit => "exit",
        }
    }
}

pub fn parse_ipv4(raw: &str) -> AppResult<Ipv4Addr> {
    raw.parse::<Ipv4Addr>().map_err(|_| AppError::invalid_ip(raw))
}
