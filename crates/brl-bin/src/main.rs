//! brlx entrypoint: translate one line of annotated text and print the cells.
use anyhow::{Context, Result};
use clap::Parser;
use core_braille::tables::{ComputerBrailleTable, ContractedTable};
use core_braille::{BrailleOutput, ExpandingTranslator, ExpansionPolicy, TranslatorHandle};
use core_config::{Config, load_from};
use core_text::{AnnotatedText, BrailleStyle, SpanKind, TextRange};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use unicode_normalization::UnicodeNormalization;

const LOG_FILE_NAME: &str = "brlx.log";
const BRAILLE_PATTERN_BASE: u32 = 0x2800;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "brlx", version, about = "Expanding braille translator")] // minimal metadata
struct Args {
    /// Text to translate (NFC-normalized before any offsets are applied).
    pub text: String,
    /// Expansion policy (none, selection, all). Defaults to the config value.
    #[arg(long)]
    pub policy: Option<ExpansionPolicy>,
    /// Editable value range `START:END` (character offsets). Defaults to the whole
    /// text when a cursor is given.
    #[arg(long, value_parser = parse_range)]
    pub value: Option<TextRange>,
    /// Cursor (selection start) offset.
    #[arg(long)]
    pub cursor: Option<usize>,
    /// Selection end offset; omitted means a collapsed cursor.
    #[arg(long = "select-end")]
    pub select_end: Option<usize>,
    /// Pre-rendered cells `POS:HEX` spliced at POS, e.g. `3:3c3c`. Repeatable.
    #[arg(long = "extra", value_parser = parse_extra)]
    pub extra: Vec<ExtraArg>,
    /// Bold range `START:END`. Repeatable.
    #[arg(long = "bold", value_parser = parse_range)]
    pub bold: Vec<TextRange>,
    /// Disable the uncontracted backend regardless of configuration.
    #[arg(long = "no-uncontracted")]
    pub no_uncontracted: bool,
    /// Emit JSON instead of the human-readable listing.
    #[arg(long)]
    pub json: bool,
    /// Optional configuration file path (overrides discovery of `brlx.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ExtraArg {
    position: usize,
    cells: Vec<u8>,
}

fn parse_range(s: &str) -> Result<TextRange, String> {
    let (a, b) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got `{s}`"))?;
    let start = a.trim().parse::<usize>().map_err(|e| format!("bad start `{a}`: {e}"))?;
    let end = b.trim().parse::<usize>().map_err(|e| format!("bad end `{b}`: {e}"))?;
    if start > end {
        return Err(format!("range start {start} after end {end}"));
    }
    Ok(TextRange::new(start, end))
}

fn parse_extra(s: &str) -> Result<ExtraArg, String> {
    let (pos, hex) = s
        .split_once(':')
        .ok_or_else(|| format!("expected POS:HEX, got `{s}`"))?;
    let position = pos.trim().parse::<usize>().map_err(|e| format!("bad position `{pos}`: {e}"))?;
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in `{hex}`"));
    }
    let cells = (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("bad cell `{}`: {e}", &hex[i..i + 2])))
        .collect::<Result<Vec<u8>, String>>()?;
    Ok(ExtraArg { position, cells })
}

/// Build the annotated line from CLI arguments. Span order matters: the value
/// span is attached before the selection so both accessors find them.
fn build_text(args: &Args) -> Result<AnnotatedText> {
    let normalized: String = args.text.nfc().collect();
    let mut text = AnnotatedText::new(&normalized);
    let value = args
        .value
        .or_else(|| args.cursor.map(|_| TextRange::new(0, text.len())));
    if let Some(value) = value {
        text.add_span(SpanKind::Value, value)
            .context("value span")?;
    }
    if let Some(cursor) = args.cursor {
        let end = args.select_end.unwrap_or(cursor);
        let sel = TextRange::new(cursor.min(end), cursor.max(end));
        text.add_span(SpanKind::ValueSelection, sel)
            .context("selection span")?;
    }
    for extra in &args.extra {
        text.add_span(
            SpanKind::ExtraCells(extra.cells.clone()),
            TextRange::new(extra.position, extra.position),
        )
        .context("extra cells span")?;
    }
    for bold in &args.bold {
        text.add_span(SpanKind::Style(BrailleStyle::BOLD), *bold)
            .context("bold span")?;
    }
    Ok(text)
}

fn build_translator(config: &Config, force_no_uncontracted: bool) -> ExpandingTranslator {
    let default: TranslatorHandle = Arc::new(ContractedTable);
    let uncontracted: Option<TranslatorHandle> =
        if config.uncontracted_enabled() && !force_no_uncontracted {
            Some(Arc::new(ComputerBrailleTable))
        } else {
            None
        };
    ExpandingTranslator::new(default, uncontracted)
}

/// Render cells as Unicode braille patterns (U+2800 block).
fn braille_string(cells: &[u8]) -> String {
    cells
        .iter()
        .filter_map(|&c| char::from_u32(BRAILLE_PATTERN_BASE + c as u32))
        .collect()
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    braille: String,
    #[serde(flatten)]
    output: &'a BrailleOutput,
}

fn print_output(out: &BrailleOutput, json: bool) -> Result<()> {
    let braille = braille_string(&out.cells);
    if json {
        let doc = JsonOutput {
            braille,
            output: out,
        };
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("{braille}");
        println!("cells:           {:02x?}", out.cells);
        println!("text_to_braille: {:?}", out.text_to_braille);
        println!("braille_to_text: {:?}", out.braille_to_text);
    }
    Ok(())
}

async fn translate_line(
    translator: &ExpandingTranslator,
    text: &AnnotatedText,
    policy: ExpansionPolicy,
    config: &Config,
) -> Result<BrailleOutput> {
    let pending = translator.translate(text, policy)?;
    let chunks = pending.chunk_count();
    let out = match config.effective_timeout {
        Some(limit) => tokio::time::timeout(limit, pending.finish())
            .await
            .with_context(|| format!("translation did not complete within {limit:?}"))?,
        None => pending.finish().await,
    };
    info!(
        target: "runtime.translate",
        text_len = text.len(),
        chunks,
        cells = out.cells.len(),
        policy = policy.as_str(),
        "translate_complete"
    );
    Ok(out)
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join(LOG_FILE_NAME);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(_) => {
                self.log_guard = Some(guard);
            }
            Err(_err) => {
                // Global tracing subscriber already installed; drop guard so writer shuts down.
            }
        }

        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();

    let args = Args::parse();
    let config = load_from(args.config.clone())?;
    let policy = args.policy.unwrap_or_else(|| config.policy());
    info!(
        target: "runtime.startup",
        config_override = args.config.is_some(),
        policy = policy.as_str(),
        uncontracted = config.uncontracted_enabled() && !args.no_uncontracted,
        timeout = ?config.effective_timeout,
        "bootstrap_complete"
    );

    let text = build_text(&args)?;
    let translator = build_translator(&config, args.no_uncontracted);
    let out = translate_line(&translator, &text, policy, &config).await?;
    print_output(&out, args.json)
}
