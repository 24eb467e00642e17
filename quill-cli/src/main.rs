//! Quill CLI - template tokenizer inspection tool
//!
//! Usage:
//!   quill <file>                      Print one line per event
//!   quill --template '<p>{{ x }}</p>' Tokenize an inline template
//!   quill <file> --format json        One JSON object per event
//!   quill <file> --stats              Also print tokenizer counters
//!
//! Reads stdin when neither a file nor `--template` is given. Set `RUST_LOG`
//! (e.g. `RUST_LOG=quill=trace`) to see state transitions on stderr.

use std::fs;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use quill_template::{Delimiters, Event, Tokenizer, TokenizerOptions, TokenizerStats};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Quill - dump the lexical events of a template
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Tokenize a file
    quill App.template

    # Inline template with custom delimiters
    quill --template 'Hi [[ name ]]' --delimiters '[[' ']]'

    # Machine-readable output
    quill App.template --format json
"#)]
struct Cli {
    /// Template file to read (stdin if omitted)
    #[arg(value_name = "FILE", conflicts_with = "template")]
    path: Option<PathBuf>,

    /// Tokenize this string instead of a file
    #[arg(short, long, value_name = "TEXT")]
    template: Option<String>,

    /// Interpolation delimiters
    #[arg(long, num_args = 2, value_names = ["OPEN", "CLOSE"])]
    delimiters: Option<Vec<String>>,

    /// Read interpolation delimiters as plain text
    #[arg(long)]
    v_pre: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Print tokenizer counters to stderr
    #[arg(long)]
    stats: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Aligned, human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let template = load_template(&cli)?;
    let options = build_options(&cli)?;

    let mut tokenizer = Tokenizer::with_options(Vec::new(), options);
    tokenizer.parse(&template);
    let stats = tokenizer.stats();
    let events = tokenizer.into_sink();
    debug!(events = events.len(), bytes = template.len(), "tokenized");

    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let mut out = BufWriter::new(stdout.lock());
    for (index, &event) in events.iter().enumerate() {
        let record = EventRecord::new(&template, event);
        match cli.format {
            Format::Text => writeln!(out, "{}", format_line(index, &record, color))?,
            Format::Json => {
                serde_json::to_writer(&mut out, &record)?;
                writeln!(out)?;
            }
        }
    }
    out.flush()?;

    report_diagnostics(&events);
    if cli.stats {
        print_stats(stats);
    }
    Ok(())
}

/// Template text from `--template`, the file argument, or stdin.
fn load_template(cli: &Cli) -> Result<String> {
    if let Some(ref template) = cli.template {
        return Ok(template.clone());
    }
    match cli.path {
        Some(ref path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display())),
        None => io::read_to_string(io::stdin()).context("failed to read template from stdin"),
    }
}

fn build_options(cli: &Cli) -> Result<TokenizerOptions> {
    let mut options = TokenizerOptions::default().with_v_pre(cli.v_pre);
    if let Some([open, close]) = cli.delimiters.as_deref() {
        let delimiters = Delimiters::new(open, close).context("invalid --delimiters")?;
        options = options.with_delimiters(delimiters);
    }
    Ok(options)
}

/// Flat, serializable view of one event.
#[derive(Debug, PartialEq, Eq, Serialize)]
struct EventRecord<'a> {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    directive: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quote: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl<'a> EventRecord<'a> {
    fn new(input: &'a str, event: Event) -> Self {
        let mut record = Self {
            kind: event.kind(),
            start: event.span().map(|span| span.start),
            end: event.span().map(|span| span.end),
            text: event.text(input),
            directive: event.directive_name(input),
            quote: None,
            code: None,
        };
        match event {
            Event::OpenTagEnd { end }
            | Event::SelfClosingTag { end }
            | Event::AttribNameEnd { end } => record.end = Some(end),
            Event::AttribEnd { quote, end } => {
                record.end = Some(end);
                record.quote = Some(quote.into());
            }
            Event::Error { code, index } => {
                record.start = Some(index);
                record.code = Some(code.into());
            }
            _ => {}
        }
        record
    }
}

/// `index  kind  offsets  detail`, with the kind coloured when `color` is set.
fn format_line(index: usize, record: &EventRecord<'_>, color: bool) -> String {
    let offsets = match (record.start, record.end) {
        (Some(start), Some(end)) => format!("{start}..{end}"),
        (Some(at), None) | (None, Some(at)) => format!("@{at}"),
        (None, None) => String::new(),
    };

    let detail = if let Some(code) = record.code {
        code.to_owned()
    } else if let Some(quote) = record.quote {
        quote.to_owned()
    } else {
        match (record.text, record.directive) {
            (Some(text), Some(name)) if name != text => format!("{text:?} ({name})"),
            (Some(text), _) => format!("{text:?}"),
            (None, _) => String::new(),
        }
    };

    let kind = format!("{:<16}", record.kind);
    let kind = match (color, record.code, record.kind) {
        (false, ..) => kind,
        (true, Some(_), _) => kind.red().bold().to_string(),
        (true, None, "end") => kind.dimmed().to_string(),
        (true, None, _) => kind.cyan().to_string(),
    };

    format!("{index:>4}  {kind} {offsets:<10} {detail}")
        .trim_end()
        .to_owned()
}

fn report_diagnostics(events: &[Event]) {
    let count = events
        .iter()
        .filter(|event| matches!(event, Event::Error { .. }))
        .count();
    if count == 0 {
        return;
    }
    let noun = if count == 1 { "diagnostic" } else { "diagnostics" };
    if io::stderr().is_terminal() {
        eprintln!("{}: {count} {noun}", "warning".yellow().bold());
    } else {
        eprintln!("warning: {count} {noun}");
    }
}

fn print_stats(stats: TokenizerStats) {
    eprintln!("=== Tokenizer Stats ===");
    eprintln!("steps:             {}", stats.steps);
    eprintln!("reconsumes:        {}", stats.reconsumes);
    eprintln!("state transitions: {}", stats.state_transitions);
    eprintln!("events emitted:    {}", stats.events_emitted);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use quill_template::{ErrorCode, QuoteType, Shorthand, Span};

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("quill").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn template_conflicts_with_file() {
        assert!(Cli::try_parse_from(["quill", "a.html", "--template", "x"]).is_err());
    }

    #[test]
    fn inline_template_is_used() {
        let cli = cli(&["--template", "<p>"]);
        assert_eq!(load_template(&cli).unwrap(), "<p>");
        assert_eq!(cli.format, Format::Text);
    }

    #[test]
    fn missing_file_reports_path() {
        let cli = cli(&["does/not/exist.template"]);
        let err = load_template(&cli).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.template"));
    }

    #[test]
    fn options_from_flags() {
        let cli = cli(&["--template", "x", "--delimiters", "[[", "]]", "--v-pre"]);
        let options = build_options(&cli).unwrap();
        assert_eq!(options.delimiters.open(), b"[[");
        assert_eq!(options.delimiters.close(), b"]]");
        assert!(options.v_pre);
    }

    #[test]
    fn invalid_delimiters_are_rejected() {
        let cli = cli(&["--template", "x", "--delimiters", "<%", "%>"]);
        let err = build_options(&cli).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.starts_with("invalid --delimiters"), "{message}");
        assert!(message.contains("starts with '<'"), "{message}");
    }

    #[test]
    fn span_record() {
        let record = EventRecord::new("<div>", Event::OpenTagName(Span::new(1, 4)));
        assert_eq!(
            record,
            EventRecord {
                kind: "open-tag-name",
                start: Some(1),
                end: Some(4),
                text: Some("div"),
                directive: None,
                quote: None,
                code: None,
            }
        );
    }

    #[test]
    fn attribute_end_record() {
        let event = Event::AttribEnd {
            quote: QuoteType::Single,
            end: 12,
        };
        let json = serde_json::to_string(&EventRecord::new("", event)).unwrap();
        assert_eq!(json, r#"{"kind":"attrib-end","end":12,"quote":"Single"}"#);
    }

    #[test]
    fn error_record() {
        let event = Event::Error {
            code: ErrorCode::EofInTag,
            index: 4,
        };
        let json = serde_json::to_string(&EventRecord::new("<div", event)).unwrap();
        assert_eq!(json, r#"{"kind":"error","start":4,"code":"eof-in-tag"}"#);
    }

    #[test]
    fn text_line_layout() {
        let record = EventRecord::new("hi", Event::Text(Span::new(0, 2)));
        let line = format_line(0, &record, false);
        assert_eq!(
            line.split_whitespace().collect::<Vec<_>>(),
            ["0", "text", "0..2", "\"hi\""]
        );
    }

    #[test]
    fn shorthand_line_names_directive() {
        let input = "<a @click>";
        let event = Event::DirName {
            span: Span::new(3, 4),
            shorthand: Some(Shorthand::On),
        };
        let line = format_line(1, &EventRecord::new(input, event), false);
        assert!(line.ends_with("\"@\" (v-on)"), "{line}");
    }

    #[test]
    fn end_line_has_no_trailing_space() {
        let line = format_line(7, &EventRecord::new("", Event::End), false);
        assert_eq!(line, "   7  end");
    }
}
