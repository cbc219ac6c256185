use std::path::PathBuf;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::action_executor::{self, LaunchError};
use crate::config::{self, Browser, Config, ConfigError};
use crate::contract::{ActionResponseDto, SearchStateDto};
use crate::history::{HistorySearcher, HistorySource};
use crate::live_search::LiveSearch;
use crate::logging;

#[derive(Debug)]
pub enum RuntimeError {
    Config(ConfigError),
    Launch(LaunchError),
    Io(std::io::Error),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Launch(error) => write!(f, "launch error: {error}"),
            Self::Io(error) => write!(f, "io error: {error}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<ConfigError> for RuntimeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LaunchError> for RuntimeError {
    fn from(value: LaunchError) -> Self {
        Self::Launch(value)
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub config_path: Option<PathBuf>,
    pub browser: Option<Browser>,
    pub query: Option<String>,
    pub write_default_config: bool,
}

pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, String> {
    let mut options = RuntimeOptions::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter.next().ok_or("--config requires a path")?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--browser" => {
                let value = iter.next().ok_or("--browser requires a name")?;
                let browser =
                    Browser::parse(value).ok_or_else(|| format!("unknown browser '{value}'"))?;
                options.browser = Some(browser);
            }
            "--query" => {
                let value = iter.next().ok_or("--query requires text")?;
                options.query = Some(value.clone());
            }
            "--write-config" => options.write_default_config = true,
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    Ok(options)
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    let mut cfg = config::load(options.config_path.as_deref())?;
    if let Some(browser) = options.browser {
        cfg.browser = browser;
    }
    if options.write_default_config && !cfg.config_path.exists() {
        config::save(&cfg)?;
        eprintln!(
            "[histfind-core] wrote default config to {}",
            cfg.config_path.display()
        );
    }

    if let Err(error) = logging::init(&cfg.log_level) {
        eprintln!("[histfind-core] file logging disabled: {error}");
    }
    info!(
        browser = cfg.browser.label(),
        config_path = %cfg.config_path.display(),
        max_results = cfg.max_results,
        "startup"
    );

    if let Some(query) = options.query {
        let searcher = HistorySearcher::from_config(&cfg);
        let result = searcher.search(&query);
        emit(&SearchStateDto::from_result(&query, &result));
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_interactive(&cfg))
}

enum Command<'a> {
    Query(&'a str),
    Open(usize),
    Web(&'a str),
    NewTab,
}

fn parse_command(line: &str) -> Command<'_> {
    if let Some(rest) = line.strip_prefix(":open ") {
        if let Ok(index) = rest.trim().parse::<usize>() {
            return Command::Open(index);
        }
    }
    if let Some(rest) = line.strip_prefix(":web ") {
        return Command::Web(rest);
    }
    if line.trim() == ":new" {
        return Command::NewTab;
    }
    Command::Query(line)
}

/// Each stdin line is the full query text after a keystroke; settled states
/// are written to stdout as JSON lines.
async fn run_interactive(cfg: &Config) -> Result<(), RuntimeError> {
    let mut live = LiveSearch::new(HistorySearcher::from_config(cfg));
    let mut updates = live.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    live.set_query("");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                handle_command(&mut live, cfg, parse_command(&line));
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if !state.is_loading {
                    emit(&SearchStateDto::from_result(live.query().unwrap_or_default(), &state));
                }
            }
        }
    }

    live.close();
    Ok(())
}

fn handle_command<S: HistorySource>(live: &mut LiveSearch<S>, cfg: &Config, command: Command<'_>) {
    let launched = match command {
        Command::Query(text) => {
            live.set_query(text);
            return;
        }
        Command::Open(index) => {
            let snapshot = live.snapshot();
            match index.checked_sub(1).and_then(|i| snapshot.data.get(i)) {
                Some(entry) => action_executor::open_history_entry(cfg.browser_app(), &entry.url)
                    .map(|()| entry.url.clone()),
                None => Err(LaunchError::EmptyTarget),
            }
        }
        Command::Web(text) => {
            action_executor::web_search_url(cfg.search_engine, text).and_then(|url| {
                action_executor::open_new_tab(cfg.browser_app(), cfg.search_engine, Some(text))
                    .map(|()| url)
            })
        }
        Command::NewTab => action_executor::open_start_page(cfg.browser_app())
            .map(|()| action_executor::NEW_TAB_URL.to_string()),
    };

    let response = match launched {
        Ok(target) => ActionResponseDto::Opened { target },
        Err(error) => {
            warn!(%error, "launch failed");
            ActionResponseDto::Failed {
                message: error.to_string(),
            }
        }
    };
    emit(&response);
}

fn emit<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(error) => warn!(%error, "failed to encode output line"),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_args, parse_command, Command};
    use crate::config::Browser;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn parses_known_flags() {
        let options =
            parse_cli_args(&args(&["--browser", "zen", "--query", "rust book", "--write-config"]))
                .unwrap();
        assert_eq!(options.browser, Some(Browser::Zen));
        assert_eq!(options.query.as_deref(), Some("rust book"));
        assert!(options.write_default_config);
    }

    #[test]
    fn rejects_unknown_and_incomplete_flags() {
        assert!(parse_cli_args(&args(&["--verbose"])).is_err());
        assert!(parse_cli_args(&args(&["--config"])).is_err());
        assert!(parse_cli_args(&args(&["--browser", "netscape"])).is_err());
    }

    #[test]
    fn recognizes_commands_and_plain_queries() {
        assert!(matches!(parse_command(":open 2"), Command::Open(2)));
        assert!(matches!(parse_command(":web rust lang"), Command::Web("rust lang")));
        assert!(matches!(parse_command(":new"), Command::NewTab));
        assert!(matches!(parse_command(":open x"), Command::Query(":open x")));
        assert!(matches!(parse_command("foo bar"), Command::Query("foo bar")));
    }
}
