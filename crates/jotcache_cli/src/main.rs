//! Command-line inspector for a jotcache store file.
//!
//! # Responsibility
//! - Verify `jotcache_core` linkage and print its version.
//! - Inspect an existing store read-only: list, search, resolve open URLs.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use jotcache_core::{core_version, CompanionQuery, DeepLink, NoteEntity, DEFAULT_NAMESPACE};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "jotcache_cli",
    about = "Read-only inspection of a jotcache store",
    version
)]
struct Cli {
    /// Store file to open read-only. Without it only the version is printed.
    db: Option<PathBuf>,

    /// Key-value namespace the notes live in.
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List notes whose text contains the words (case-insensitive).
    Search { text: Vec<String> },

    /// Print the text of the note an activation URL points at.
    Open { url: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    println!("jotcache_core version={}", core_version());

    let Some(db_path) = cli.db else {
        if cli.command.is_some() {
            Cli::command()
                .error(ErrorKind::MissingRequiredArgument, "a store path is required")
                .exit();
        }
        return ExitCode::SUCCESS;
    };

    let query = match CompanionQuery::open(&db_path, cli.namespace) {
        Ok(query) => query,
        Err(err) => {
            eprintln!("failed to open `{}`: {err}", db_path.display());
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        None => print_entities(&query.suggested()),
        Some(Command::Search { text }) => print_entities(&query.search(&text.join(" "))),
        Some(Command::Open { url }) => {
            let Some(link) = DeepLink::parse(&url) else {
                eprintln!("not an open-note URL: {url}");
                return ExitCode::FAILURE;
            };
            match query.note(link.note_id()) {
                Some(note) => println!("{}", note.plain_text),
                None => {
                    eprintln!("note not found: {}", link.note_id());
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}

fn print_entities(entities: &[NoteEntity]) {
    for entity in entities {
        println!(
            "{}\t{}\t{}",
            entity.id,
            entity.display_title(),
            entity.open_url()
        );
    }
    println!("count={}", entities.len());
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};
    use jotcache_core::DEFAULT_NAMESPACE;
    use std::path::PathBuf;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_store_path_and_search_words() {
        let cli =
            Cli::try_parse_from(["jotcache_cli", "notes.db", "search", "eggs", "milk"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("notes.db")));
        assert_eq!(cli.namespace, DEFAULT_NAMESPACE);
        match cli.command {
            Some(Command::Search { text }) => assert_eq!(text, vec!["eggs", "milk"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_open_with_custom_namespace() {
        let cli = Cli::try_parse_from([
            "jotcache_cli",
            "--namespace",
            "group.other",
            "notes.db",
            "open",
            "jotcache://edit?id=x",
        ])
        .unwrap();
        assert_eq!(cli.namespace, "group.other");
        match cli.command {
            Some(Command::Open { url }) => assert_eq!(url, "jotcache://edit?id=x"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["jotcache_cli", "notes.db", "bogus"]).is_err());
    }

    #[test]
    fn bare_invocation_only_prints_version() {
        let cli = Cli::try_parse_from(["jotcache_cli"]).unwrap();
        assert!(cli.db.is_none() && cli.command.is_none());
    }
}
