//! Terminal client for the meetings list.
//!
//! Reads filter commands from stdin, reloads the list the way the web console
//! does and prints every page that lands.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use dotenvy::dotenv;
use pushkind_meetings::debounce::{FILTER_DEBOUNCE, FilterWatcher};
use pushkind_meetings::domain::filter::{LocationFilter, TypeFilter};
use pushkind_meetings::models::config::ServerConfig;
use pushkind_meetings::pagination::{Viewport, page_range_for};
use pushkind_meetings::repository::HttpRepository;
use pushkind_meetings::store::{ListAction, ListState, MeetingListStore};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  search <text>          filter by topic (no text clears it)
  type <online|offline|hybrid|all>
  location <name|all>
  from <YYYY-MM-DD|->    start of the date range
  to <YYYY-MM-DD|->      end of the date range
  per-page <n>
  page <n>
  clear                  reset every filter
  retry                  repeat the last failed request
  compact                toggle the narrow page bar
  quit";

enum Command {
    Edit(ListAction),
    Page(usize),
    Clear,
    Retry,
    Compact,
    Help,
    Quit,
}

fn parse_date(value: &str) -> Result<Option<NaiveDate>, String> {
    if value.is_empty() || value == "-" {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("not a date: {value}"))
}

fn parse_number(value: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| format!("not a positive number: {value}"))
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (name, arg) = line.split_once(' ').unwrap_or((line, ""));
    let arg = arg.trim();

    let command = match name {
        "search" => Command::Edit(ListAction::SetSearch(arg.to_string())),
        "type" => Command::Edit(ListAction::SetMeetingType(
            TypeFilter::from_param(arg).map_err(|e| e.to_string())?,
        )),
        "location" => Command::Edit(ListAction::SetLocation(LocationFilter::from_param(arg))),
        "from" => Command::Edit(ListAction::SetStartDate(parse_date(arg)?)),
        "to" => Command::Edit(ListAction::SetEndDate(parse_date(arg)?)),
        "per-page" => Command::Edit(ListAction::SetPerPage(parse_number(arg)?)),
        "page" => Command::Page(parse_number(arg)?),
        "clear" => Command::Clear,
        "retry" => Command::Retry,
        "compact" => Command::Compact,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(command)
}

fn render(state: &ListState, viewport: Viewport) -> String {
    if let Some(error) = &state.error {
        let hint = if error.retryable { " (type `retry`)" } else { "" };
        return format!("error: {}{hint}", error.message);
    }

    let mut out = String::new();
    if state.meetings.is_empty() {
        out.push_str("no meetings\n");
    }
    for meeting in &state.meetings {
        out.push_str(&format!(
            "#{:<5} {}  {:<8} {}\n",
            meeting.id,
            meeting.start_time.format("%Y-%m-%d %H:%M"),
            meeting.meeting_type,
            meeting.topic
        ));
    }

    let meta = &state.pagination;
    let buttons = page_range_for(meta.current_page, meta.last_page, viewport)
        .pages
        .iter()
        .map(|page| match page {
            Some(page) if *page == meta.current_page => format!("[{page}]"),
            Some(page) => page.to_string(),
            None => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(&format!("{buttons}   ({} total)", meta.total));
    out
}

fn viewport(compact: &AtomicBool) -> Viewport {
    if compact.load(Ordering::Relaxed) {
        Viewport::Compact
    } else {
        Viewport::Regular
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("warn"));

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let repo = match HttpRepository::new(
        server_config.api_base_url.clone(),
        server_config.api_token.clone(),
        server_config.request_timeout(),
    ) {
        Ok(repo) => repo,
        Err(err) => {
            log::error!("Failed to build API client: {err}");
            std::process::exit(1);
        }
    };

    let store = Arc::new(MeetingListStore::new(Arc::new(repo)));
    let watcher = Arc::new(FilterWatcher::new(Arc::clone(&store), FILTER_DEBOUNCE));
    let compact = Arc::new(AtomicBool::new(false));

    // Prints each page once its request settles.
    let mut updates = store.subscribe();
    let printer_compact = Arc::clone(&compact);
    let printer = tokio::spawn(async move {
        let mut printed = (0, true);
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            let key = (state.latest_request, state.loading);
            if key == printed {
                continue;
            }
            printed = key;
            if state.loading {
                println!("loading page {}...", state.requested_page);
            } else {
                println!("{}", render(&state, viewport(&printer_compact)));
            }
        }
    });

    let initial = Arc::clone(&store);
    tokio::spawn(async move {
        initial.fetch(1).await;
    });

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                log::error!("Failed to read stdin: {err}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(Command::Edit(action)) => {
                if !watcher.edit(action) {
                    println!("filters unchanged");
                }
            }
            Ok(Command::Page(_)) if store.snapshot().loading => {
                println!("still loading, try again when the page settles");
            }
            Ok(Command::Page(page)) => {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store.go_to_page(page).await;
                });
            }
            Ok(Command::Clear) => {
                let watcher = Arc::clone(&watcher);
                tokio::spawn(async move {
                    watcher.clear().await;
                });
            }
            Ok(Command::Retry) => {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    if !store.retry().await {
                        println!("nothing to retry");
                    }
                });
            }
            Ok(Command::Compact) => {
                compact.fetch_xor(true, Ordering::Relaxed);
                println!("{}", render(&store.snapshot(), viewport(&compact)));
            }
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Quit) => break,
            Err(message) => println!("{message}"),
        }
    }

    printer.abort();
}
