//! Purpose: `prestige` CLI entry point: a local host for the storefront core.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Command results are JSON on stdout (pretty on a TTY).
//! Invariants: Non-interactive errors and toast notices are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: All catalog mutations go through `Storefront` or `CatalogStore`.
#![allow(clippy::result_large_err)]
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde::Serialize;
use serde_json::{Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use prestige::api::{
    Error, ErrorKind, Field, FileStorage, FormKind, Product, Storefront, to_exit_code,
};
use prestige::notice::{Notice, notice_json, toast_notices};
use prestige::storage_paths::default_storage_dir;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse_from(std::env::args_os().collect::<Vec<OsString>>()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage).with_message(clap_error_summary(&err)),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let storage_dir = cli.dir.unwrap_or_else(default_storage_dir);
    let color_mode = cli.color;

    command_dispatch::dispatch_command(cli.command, storage_dir, color_mode)
        .map_err(|err| (err, color_mode))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "prestige",
    version,
    about = "Local host for the Prestige storefront catalog",
    long_about = None,
    after_help = r#"EXAMPLES
  $ prestige catalog list
  $ prestige catalog add --name Hat --price 19.99 --image img/hat.webp --description "A warm hat"
  $ prestige catalog update 8 --price 17.50
  $ prestige catalog delete 8 --yes
  $ prestige render products
  $ prestige validate checkout --field name=Ana --field email=ana@example.com

LEARN MORE
  $ prestige <command> --help"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        help = "Storage directory for persisted keys (default: ~/.prestige/storage)",
        value_hint = ValueHint::DirPath
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize labels of terminal diagnostics on stderr: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        arg_required_else_help = true,
        about = "List and edit the persisted catalog"
    )]
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    #[command(
        arg_required_else_help = true,
        about = "Print rendered markup for a mount point",
        after_help = r#"EXAMPLES
  $ prestige render products
  $ prestige render cart --add 1 --add 4"#
    )]
    Render {
        #[arg(value_enum, help = "What to render")]
        target: RenderTarget,
        #[arg(long = "add", help = "Product id to put in the preview cart (repeatable)")]
        add: Vec<u64>,
    },
    #[command(
        arg_required_else_help = true,
        about = "Run one form's validators over field values",
        long_about = r#"Run every validator of a form and report the error slot of each failing field.

Fields are given as KEY=VALUE where KEY is the input id (checkout-email) or
its short form (email). Missing fields are validated as empty."#,
        after_help = r#"EXAMPLES
  $ prestige validate product --field name=Hat --field price=19.99
  $ prestige validate contact --field contact-email=a@b

NOTES
  - Exits 2 when any field fails."#
    )]
    Validate {
        #[arg(value_enum, help = "Form to validate")]
        form: FormArg,
        #[arg(long = "field", help = "Field value as KEY=VALUE (repeatable)")]
        fields: Vec<String>,
    },
    #[command(about = "Print version info as JSON")]
    Version,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        after_help = r#"EXAMPLES
  $ prestige completion bash > ~/.local/share/bash-completion/completions/prestige
  $ prestige completion zsh > ~/.zfunc/_prestige"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum CatalogCommand {
    #[command(about = "List products (seeds the default catalog on first use)")]
    List,
    #[command(about = "Create a product through the product form validators")]
    Add {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        price: String,
        #[arg(long, default_value = "")]
        image: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    #[command(
        arg_required_else_help = true,
        about = "Edit a product; omitted fields keep their current value"
    )]
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    #[command(arg_required_else_help = true, about = "Delete a product")]
    Delete {
        id: u64,
        #[arg(long, help = "Confirm the deletion")]
        yes: bool,
    },
    #[command(about = "Discard the stored catalog and restore the default products")]
    Reset,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderTarget {
    Products,
    Cart,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormArg {
    Product,
    Checkout,
    Contact,
}

impl From<FormArg> for FormKind {
    fn from(value: FormArg) -> Self {
        match value {
            FormArg::Product => FormKind::Product,
            FormArg::Checkout => FormKind::Checkout,
            FormArg::Contact => FormKind::Contact,
        }
    }
}

fn open_storefront(storage_dir: &std::path::Path) -> Result<Storefront<FileStorage>, Error> {
    let mut storefront = Storefront::new(FileStorage::new(storage_dir));
    let outcome = storefront.start()?;
    tracing::debug!(?outcome, dir = %storage_dir.display(), "storefront started");
    Ok(storefront)
}

/// Resolves `email` or `checkout-email` style keys against one form's fields.
fn resolve_field(kind: FormKind, key: &str) -> Option<Field> {
    kind.fields().iter().copied().find(|field| {
        let id = field.input_id();
        id == key || id.split_once('-').is_some_and(|(_, short)| short == key)
    })
}

fn product_json(product: &Product) -> Value {
    serde_json::to_value(product).unwrap_or(Value::Null)
}

/// Writes one command result. Pretty-printed for a terminal, one line otherwise.
fn emit_json(value: Value) {
    let encoded = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    match encoded {
        Ok(json) => println!("{json}"),
        Err(err) => emit_error(
            &Error::new(ErrorKind::Internal)
                .with_message("failed to encode command output")
                .with_source(err),
            ColorMode::Never,
        ),
    }
}

#[derive(Copy, Clone)]
enum AnsiColor {
    Red,
    Yellow,
}

impl AnsiColor {
    fn paint(self, label: &str, enabled: bool) -> String {
        if !enabled {
            return label.to_string();
        }
        let code = match self {
            AnsiColor::Red => "31",
            AnsiColor::Yellow => "33",
        };
        format!("\u{1b}[{code}m{label}\u{1b}[0m")
    }
}

/// Stderr carries either labeled text for a person or one JSON object per line.
fn emit_diagnostic(json: Value, text: impl FnOnce(bool) -> String, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", text(color_mode.use_color(is_tty)));
        return;
    }
    match serde_json::to_string(&json) {
        Ok(line) => eprintln!("{line}"),
        Err(_) => eprintln!(
            "{{\"error\":{{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}}}"
        ),
    }
}

fn notice_time_now() -> String {
    use time::format_description::well_known::Rfc3339;
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| {
            time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()
        })
        .and_then(|ts| ts.format(&Rfc3339).ok())
        .unwrap_or_default()
}

fn emit_toasts(storefront: &Storefront<FileStorage>, cmd: &str, color_mode: ColorMode) {
    for notice in toast_notices(storefront.toasts(), cmd, &notice_time_now()) {
        emit_notice(&notice, color_mode);
    }
}

fn emit_notice(notice: &Notice, color_mode: ColorMode) {
    emit_diagnostic(
        notice_json(notice),
        |color| format!("{} {}", AnsiColor::Yellow.paint("toast:", color), notice.message),
        color_mode,
    );
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let report = ErrorReport::from_error(err);
    emit_diagnostic(report.to_json(), |color| report.to_text(color), color_mode);
}

/// Flattened view of an `Error` chain shared by the JSON and text renderings.
#[derive(Debug, Serialize)]
struct ErrorReport {
    kind: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    causes: Vec<String>,
}

impl ErrorReport {
    fn from_error(err: &Error) -> Self {
        let mut causes = Vec::new();
        let mut cur = err.source();
        while let Some(source) = cur {
            causes.push(source.to_string());
            cur = source.source();
        }
        Self {
            kind: format!("{:?}", err.kind()),
            message: err
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| default_message(err.kind()).to_string()),
            hint: err.hint().map(str::to_string),
            key: err.key().map(str::to_string),
            path: err.path().map(|path| path.display().to_string()),
            causes,
        }
    }

    fn to_json(&self) -> Value {
        json!({ "error": self })
    }

    fn to_text(&self, color: bool) -> String {
        let mut lines = vec![format!("{} {}", AnsiColor::Red.paint("error:", color), self.message)];
        let extras = [
            ("hint:", self.hint.as_deref()),
            ("key:", self.key.as_deref()),
            ("path:", self.path.as_deref()),
            ("caused by:", self.causes.first().map(String::as_str)),
        ];
        for (label, value) in extras {
            if let Some(value) = value {
                lines.push(format!("{} {value}", AnsiColor::Yellow.paint(label, color)));
            }
        }
        lines.join("\n")
    }
}

fn default_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Internal => "internal error",
        ErrorKind::Usage => "usage error",
        ErrorKind::NotFound => "not found",
        ErrorKind::Busy => "storage is locked by another writer",
        ErrorKind::Permission => "permission denied",
        ErrorKind::Corrupt => "stored data is unreadable",
        ErrorKind::Io => "i/o error",
    }
}

fn clap_error_summary(err: &clap::Error) -> String {
    err.to_string()
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.strip_prefix("error:").unwrap_or(line).trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

#[cfg(test)]
mod tests {
    use super::{Cli, ErrorReport, resolve_field};
    use clap::CommandFactory;
    use prestige::api::{Error, ErrorKind, Field, FormKind};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn field_keys_accept_short_and_full_ids() {
        assert_eq!(
            resolve_field(FormKind::Checkout, "email"),
            Some(Field::CheckoutEmail)
        );
        assert_eq!(
            resolve_field(FormKind::Checkout, "checkout-email"),
            Some(Field::CheckoutEmail)
        );
        assert_eq!(resolve_field(FormKind::Checkout, "subject"), None);
        assert_eq!(
            resolve_field(FormKind::Contact, "message"),
            Some(Field::ContactMessage)
        );
    }

    #[test]
    fn error_report_json_omits_absent_fields() {
        let err = Error::new(ErrorKind::NotFound).with_hint("Use `prestige catalog list`.");
        let value = ErrorReport::from_error(&err).to_json();
        assert_eq!(value["error"]["kind"], "NotFound");
        assert_eq!(value["error"]["message"], "not found");
        assert_eq!(value["error"]["hint"], "Use `prestige catalog list`.");
        assert!(value["error"].get("path").is_none());
        assert!(value["error"].get("causes").is_none());
    }

    #[test]
    fn error_report_text_lists_key_and_first_cause() {
        let err = Error::new(ErrorKind::Corrupt)
            .with_message("stored value is not valid UTF-8")
            .with_key("prestige_products")
            .with_source(std::io::Error::other("bad byte"));
        let text = ErrorReport::from_error(&err).to_text(false);
        assert_eq!(
            text,
            "error: stored value is not valid UTF-8\nkey: prestige_products\ncaused by: bad byte"
        );
    }
}
