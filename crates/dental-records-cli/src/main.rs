#![forbid(unsafe_code)]

//! `dental-records`: terminal front end for the clinic's visit records.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use dental_records_core::config::{AppConfig, StoreKind, APP_NAME, APP_VERSION};
use dental_records_core::{
    ClinicClock, IntakeForm, JalaliDate, RecordBrowser, RecordId, RecordStore, SuggestionKind,
    SuggestionList, VisitField, VisitRecord,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn usage() -> &'static str {
    "dental-records — patient visit records for the clinic\n\n\
USAGE:\n\
  dental-records [--config PATH] [--sqlite PATH] <COMMAND> [ARGS]\n\
  dental-records --version\n\n\
COMMANDS:\n\
  add [--FIELD VALUE]...            save a new visit\n\
  list [--search TERM] [--date JDATE] [--gregorian-date DATE] [--json]\n\
                                    one row per file number\n\
  history FILE_NUMBER [--search TERM] [--date JDATE] [--json]\n\
                                    every visit for one file number\n\
  edit ID [--FIELD VALUE]...        change fields of one visit\n\
  delete ID [--yes]                 remove one visit\n\
  print FILE_NUMBER [--out DIR]     write a printable HTML history\n\
  suggest KIND [INPUT]              doctors | services | return-reasons\n\n\
FIELDS:\n\
  --file-number --name --father-name --doctor --corrective-doctor\n\
  --services --which-tooth --return-doctor --return-reason\n\n\
NOTES:\n\
  - JDATE is a Jalali date, e.g. 1405-07-26.\n\
  - Without --config the file is taken from $DENTAL_RECORDS_CONFIG or the\n\
    user config directory. $DENTAL_RECORDS_URL and $DENTAL_RECORDS_API_KEY\n\
    override the remote store.\n\
  - Logs go to stderr; set RUST_LOG to change the filter.\n"
}

fn version() -> String {
    format!("{APP_NAME} {APP_VERSION}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Add {
        values: Vec<(VisitField, String)>,
    },
    List {
        search: String,
        date: Option<NaiveDate>,
        json: bool,
    },
    History {
        file_number: String,
        search: String,
        date: Option<NaiveDate>,
        json: bool,
    },
    Edit {
        id: RecordId,
        values: Vec<(VisitField, String)>,
    },
    Delete {
        id: RecordId,
        yes: bool,
    },
    Print {
        file_number: String,
        out: Option<PathBuf>,
    },
    Suggest {
        kind: SuggestionKind,
        input: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cli {
    config: Option<PathBuf>,
    sqlite: Option<PathBuf>,
    command: Command,
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_jalali(raw: &str) -> Result<NaiveDate, String> {
    let date: JalaliDate = raw.parse().map_err(|e| format!("--date: {e}"))?;
    date.to_gregorian()
        .ok_or_else(|| format!("--date: {raw} has no Gregorian equivalent"))
}

fn parse_gregorian(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("--gregorian-date: {e}"))
}

fn parse_field_flag(flag: &str) -> Option<VisitField> {
    flag.strip_prefix("--").and_then(|name| name.parse().ok())
}

fn parse_args(args: &[String]) -> Result<Cli, String> {
    let mut config = None;
    let mut sqlite = None;
    let mut positional: Vec<String> = Vec::new();
    let mut values: Vec<(VisitField, String)> = Vec::new();
    let mut search = String::new();
    let mut date = None;
    let mut json = false;
    let mut yes = false;
    let mut out = None;

    let mut i = 0usize;
    while i < args.len() {
        let a = args[i].as_str();
        match a {
            "--config" => config = Some(PathBuf::from(next_value(args, &mut i, a)?)),
            "--sqlite" => sqlite = Some(PathBuf::from(next_value(args, &mut i, a)?)),
            "--search" => search = next_value(args, &mut i, a)?.to_string(),
            "--date" => date = Some(parse_jalali(next_value(args, &mut i, a)?)?),
            "--gregorian-date" => date = Some(parse_gregorian(next_value(args, &mut i, a)?)?),
            "--out" => out = Some(PathBuf::from(next_value(args, &mut i, a)?)),
            "--json" => json = true,
            "--yes" | "-y" => yes = true,
            _ if a.starts_with("--") => {
                let field = parse_field_flag(a).ok_or_else(|| format!("unknown option {a}"))?;
                let value = next_value(args, &mut i, a)?;
                values.push((field, value.to_string()));
            }
            _ => positional.push(a.to_string()),
        }
        i += 1;
    }

    let mut positional = positional.into_iter();
    let name = positional.next().ok_or("missing command")?;
    let mut arg = |what: &str| positional.next().ok_or(format!("{name} requires {what}"));

    let command = match name.as_str() {
        "add" => Command::Add { values },
        "list" => Command::List { search, date, json },
        "history" => Command::History {
            file_number: arg("FILE_NUMBER")?,
            search,
            date,
            json,
        },
        "edit" => Command::Edit {
            id: arg("ID")?.parse().map_err(|e| format!("invalid ID: {e}"))?,
            values,
        },
        "delete" => Command::Delete {
            id: arg("ID")?.parse().map_err(|e| format!("invalid ID: {e}"))?,
            yes,
        },
        "print" => Command::Print {
            file_number: arg("FILE_NUMBER")?,
            out,
        },
        "suggest" => Command::Suggest {
            kind: arg("KIND")?.parse()?,
            input: arg("INPUT").unwrap_or_default(),
        },
        other => return Err(format!("unknown command {other}")),
    };

    Ok(Cli {
        config,
        sqlite,
        command,
    })
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = &cli.sqlite {
        config.store.kind = StoreKind::Sqlite;
        config.store.path = Some(path.clone());
    }
    Ok(config)
}

fn init_tracing(config: &AppConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(io::stderr)
        .init();
}

fn record_json(record: &VisitRecord, clock: &ClinicClock) -> serde_json::Value {
    json!({
        "record": record,
        "jalali_created_at": clock.jalali_datetime(&record.created_at),
    })
}

fn write_records(
    out: &mut dyn Write,
    records: &[&VisitRecord],
    clock: &ClinicClock,
    as_json: bool,
) -> anyhow::Result<()> {
    if as_json {
        let rows: Vec<_> = records.iter().map(|r| record_json(r, clock)).collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
        return Ok(());
    }
    for record in records {
        let mut line = format!("{}", record.id);
        for field in VisitField::ALL {
            line.push('\t');
            line.push_str(record.fields.get(field));
        }
        line.push('\t');
        line.push_str(&clock.jalali_datetime(&record.created_at));
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn confirm(input: &mut dyn BufRead, prompt: &str) -> anyhow::Result<bool> {
    eprint!("{prompt} [y/N] ");
    io::stderr().flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn run(
    command: Command,
    config: &AppConfig,
    store: &dyn RecordStore,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let clock = config.clock()?;

    match command {
        Command::Add { values } => {
            let mut form = IntakeForm::new(clock);
            for (field, value) in values {
                form.set(field, value);
            }
            let record = form.submit(store)?;
            if let Some(notice) = form.notice() {
                writeln!(out, "{}", notice.message)?;
            }
            writeln!(out, "{}", record.id)?;
        }

        Command::List { search, date, json } => {
            let mut browser = RecordBrowser::new(clock);
            browser.load(store)?;
            browser.set_search(search);
            browser.set_date(date);
            write_records(out, &browser.rows(), &clock, json)?;
        }

        Command::History {
            file_number,
            search,
            date,
            json,
        } => {
            let mut browser = RecordBrowser::new(clock);
            browser.load(store)?;
            browser.set_search(search);
            browser.set_date(date);
            let title = browser.open_history(file_number).title();
            if !json {
                writeln!(out, "{title}")?;
            }
            write_records(out, &browser.history_entries(), &clock, json)?;
        }

        Command::Edit { id, values } => {
            if values.is_empty() {
                bail!("edit needs at least one --FIELD VALUE");
            }
            let mut browser = RecordBrowser::new(clock);
            browser.load(store)?;
            let dialog = browser.begin_edit(id)?;
            for (field, value) in values {
                dialog.set(field, value);
            }
            let changed = dialog.changed_fields();
            let saved = browser.save_edit(store)?;
            let names: Vec<&str> = changed.iter().map(|f| f.column()).collect();
            writeln!(out, "{} updated: {}", saved.id, names.join(", "))?;
        }

        Command::Delete { id, yes } => {
            let mut browser = RecordBrowser::new(clock);
            browser.load(store)?;
            let confirmation = browser.request_delete(id)?;
            let prompt = format!(
                "Delete visit {} ({} / {})?",
                confirmation.id(),
                confirmation.record().fields.file_number,
                confirmation.record().fields.name
            );
            if yes || confirm(input, &prompt)? {
                let removed = browser.confirm_delete(store)?;
                writeln!(out, "{} deleted", removed.id)?;
            } else {
                browser.cancel_delete();
                writeln!(out, "cancelled")?;
            }
        }

        Command::Print { file_number, out: dir } => {
            let mut browser = RecordBrowser::new(clock);
            browser.load(store)?;
            browser.open_history(file_number);
            let view = browser
                .print_view(config.print_header())
                .context("no history open")?;
            let dir = dir.unwrap_or_else(|| std::env::temp_dir().join("dental-records"));
            let path = view.write_document(&dir)?;
            writeln!(out, "{}", path.display())?;
        }

        Command::Suggest { kind, input: typed } => {
            let list = SuggestionList::fetch(store, kind)?;
            let values: Vec<&str> = if typed.is_empty() {
                list.values().iter().map(String::as_str).collect()
            } else {
                list.matching(&typed)
            };
            for value in values {
                writeln!(out, "{value}")?;
            }
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() || args.iter().any(|a| a == "-h" || a == "--help") {
        print!("{}", usage());
        return Ok(());
    }
    if args.iter().any(|a| a == "-V" || a == "--version") {
        println!("{}", version());
        return Ok(());
    }

    let cli = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("{e}\n\n{}", usage());
        std::process::exit(2);
    });

    let config = load_config(&cli).context("loading configuration")?;
    init_tracing(&config);

    let store = config.build_store().context("opening record store")?;
    tracing::debug!(command = ?cli.command, "Running command");
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(
        cli.command,
        &config,
        store.as_ref(),
        &mut stdin.lock(),
        &mut stdout.lock(),
    )
}
