use std::fmt::{Display, Formatter};
use std::process::{Command, Stdio};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::info;

use crate::config::SearchEngine;

pub const NEW_TAB_URL: &str = "about:newtab";

// Same unreserved set as JavaScript's encodeURIComponent.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    EmptyTarget,
    EmptyApp,
    Spawn { command: String, message: String },
}

impl Display for LaunchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTarget => write!(f, "empty launch target"),
            Self::EmptyApp => write!(f, "empty browser application"),
            Self::Spawn { command, message } => {
                write!(f, "failed to spawn '{command}': {message}")
            }
        }
    }
}

impl std::error::Error for LaunchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Display for LaunchCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Builds the platform command that hands `target` to the browser `app`.
pub fn browser_command(app: &str, target: &str) -> Result<LaunchCommand, LaunchError> {
    let app = app.trim();
    if app.is_empty() {
        return Err(LaunchError::EmptyApp);
    }
    let target = target.trim();
    if target.is_empty() {
        return Err(LaunchError::EmptyTarget);
    }

    let command = if cfg!(target_os = "windows") {
        LaunchCommand {
            program: "cmd".to_string(),
            args: vec![
                "/C".to_string(),
                "start".to_string(),
                String::new(),
                app.to_string(),
                target.to_string(),
            ],
        }
    } else if cfg!(target_os = "macos") {
        LaunchCommand {
            program: "open".to_string(),
            args: vec!["-a".to_string(), app.to_string(), target.to_string()],
        }
    } else {
        LaunchCommand {
            program: app.to_string(),
            args: vec![target.to_string()],
        }
    };
    Ok(command)
}

pub fn web_search_url(engine: SearchEngine, query: &str) -> Result<String, LaunchError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(LaunchError::EmptyTarget);
    }
    let encoded = utf8_percent_encode(query, QUERY_ENCODE_SET);
    Ok(format!("{}{encoded}", engine.url_prefix()))
}

pub fn open_history_entry(app: &str, url: &str) -> Result<(), LaunchError> {
    spawn_detached(&browser_command(app, url)?)
}

pub fn start_page_command(app: &str) -> Result<LaunchCommand, LaunchError> {
    browser_command(app, NEW_TAB_URL)
}

pub fn open_start_page(app: &str) -> Result<(), LaunchError> {
    spawn_detached(&start_page_command(app)?)
}

/// Opens a new tab searching `query`, or the start page when there is no
/// query text.
pub fn open_new_tab(
    app: &str,
    engine: SearchEngine,
    query: Option<&str>,
) -> Result<(), LaunchError> {
    match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(text) => spawn_detached(&browser_command(app, &web_search_url(engine, text)?)?),
        None => open_start_page(app),
    }
}

/// Spawns without waiting on the child.
fn spawn_detached(command: &LaunchCommand) -> Result<(), LaunchError> {
    Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|error| LaunchError::Spawn {
            command: command.to_string(),
            message: error.to_string(),
        })?;
    info!(command = %command, "launched browser");
    Ok(())
}
