//! Interactive browse session.
//!
//! Reads one command per line from stdin. The session keeps the last search
//! results, so ships can be referred to by result number (`#2`) as well as
//! by id, and memoizes the last detail record shown.

use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use rsi::{CatalogService, DetailRecord, EntityId, SearchSummary, Transport};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands;
use crate::error::CommandError;
use crate::view;

const HELP: &str = "\
commands:
  search <name>          search ships by name
  show <ship>            show ship details
  thumb <ship>           download the ship's thumbnail
  import <ship> [obj]    decode the ship's model, optionally writing OBJ
  open <ship>            print the ship's website address
  clear                  clear the cache
  help                   show this text
  quit                   leave
<ship> is an id or a result number such as #1";

/// A ship reference typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// 1-based position in the last search results.
    Result(usize),
    Id(EntityId),
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(number) = s.strip_prefix('#') {
            return match number.parse::<usize>() {
                Ok(n) if n > 0 => Ok(Self::Result(n)),
                _ => Err(format!("invalid result number: {s}")),
            };
        }
        EntityId::new(s).map(Self::Id).map_err(|e| e.to_string())
    }
}

/// A parsed browse command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Search(String),
    Show(Target),
    Thumbnail(Target),
    Import(Target, Option<PathBuf>),
    Open(Target),
    ClearCache,
    Help,
    Quit,
}

impl FromStr for BrowseCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err("empty command".to_string());
        };
        let rest: Vec<&str> = words.collect();

        let target = |rest: &[&str]| -> Result<Target, String> {
            match rest {
                [target] => target.parse(),
                _ => Err(format!("usage: {verb} <ship>")),
            }
        };

        match verb {
            "search" | "s" if !rest.is_empty() => Ok(Self::Search(rest.join(" "))),
            "search" | "s" => Err("usage: search <name>".to_string()),
            "show" | "info" => target(&rest).map(Self::Show),
            "thumb" | "thumbnail" => target(&rest).map(Self::Thumbnail),
            "open" => target(&rest).map(Self::Open),
            "import" => match rest.as_slice() {
                [ship] => Ok(Self::Import(ship.parse()?, None)),
                [ship, obj] => Ok(Self::Import(ship.parse()?, Some(PathBuf::from(obj)))),
                _ => Err("usage: import <ship> [obj]".to_string()),
            },
            "clear" => Ok(Self::ClearCache),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("unknown command: {other} (try `help`)")),
        }
    }
}

/// The most recently viewed detail record.
///
/// Showing the same ship again reuses the record without touching the
/// catalog at all.
#[derive(Debug, Default)]
pub struct DetailMemo {
    last: Option<(EntityId, DetailRecord)>,
}

impl DetailMemo {
    /// The record for `id`, fetched through the catalog unless it is the
    /// memoized one.
    pub async fn get<T: Transport>(
        &mut self,
        catalog: &CatalogService<T>,
        id: &EntityId,
    ) -> rsi::Result<&DetailRecord> {
        let entry = match self.last.take() {
            Some(entry) if entry.0 == *id => entry,
            previous => {
                // Keep the old record if the fetch fails.
                self.last = previous;
                (id.clone(), catalog.detail(id).await?)
            }
        };
        Ok(&self.last.insert(entry).1)
    }

    pub fn forget(&mut self) {
        self.last = None;
    }
}

enum Flow {
    Continue,
    Quit,
}

struct Session<'a, T: Transport> {
    catalog: &'a CatalogService<T>,
    results: Vec<SearchSummary>,
    memo: DetailMemo,
}

impl<'a, T: Transport> Session<'a, T> {
    fn new(catalog: &'a CatalogService<T>) -> Self {
        Self {
            catalog,
            results: Vec::new(),
            memo: DetailMemo::default(),
        }
    }

    fn resolve(&self, target: Target) -> Result<EntityId, CommandError> {
        match target {
            Target::Id(id) => Ok(id),
            Target::Result(n) => n
                .checked_sub(1)
                .and_then(|index| self.results.get(index))
                .map(|hit| hit.id.clone())
                .ok_or_else(|| {
                    CommandError::Usage(format!("no result #{n} ({} results)", self.results.len()))
                }),
        }
    }

    async fn execute(&mut self, command: BrowseCommand) -> Result<Flow, CommandError> {
        match command {
            BrowseCommand::Search(query) => {
                self.results = commands::search(self.catalog, &query, false).await?;
            }
            BrowseCommand::Show(target) => {
                let id = self.resolve(target)?;
                let record = self.memo.get(self.catalog, &id).await?;
                let website = self.catalog.website_url(record);
                print!("{}", view::detail(record, website.as_deref()));
            }
            BrowseCommand::Thumbnail(target) => {
                let id = self.resolve(target)?;
                commands::thumbnail(self.catalog, &id).await?;
            }
            BrowseCommand::Import(target, obj) => {
                let id = self.resolve(target)?;
                commands::import(self.catalog, &id, obj.as_deref()).await?;
            }
            BrowseCommand::Open(target) => {
                let id = self.resolve(target)?;
                let record = self.memo.get(self.catalog, &id).await?;
                match self.catalog.website_url(record) {
                    Some(url) => println!("{url}"),
                    None => {
                        return Err(CommandError::Missing {
                            what: "website",
                            name: record.name.clone(),
                        });
                    }
                }
            }
            BrowseCommand::ClearCache => {
                self.memo.forget();
                commands::clear_cache(self.catalog)?;
            }
            BrowseCommand::Help => println!("{HELP}"),
            BrowseCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

fn prompt() -> Result<(), CommandError> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")
        .and_then(|()| stdout.flush())
        .map_err(|e| CommandError::io("<stdout>", e))
}

/// Run the session until `quit` or end of input.
///
/// A failing command is reported and the session continues.
pub async fn run<T: Transport>(catalog: &CatalogService<T>) -> Result<(), CommandError> {
    let mut session = Session::new(catalog);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    loop {
        prompt()?;
        let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| CommandError::io("<stdin>", e))?
        else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match line.parse::<BrowseCommand>() {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match session.execute(command).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => tracing::error!("{e}"),
        }
    }
    Ok(())
}
