//! fb2epub - FictionBook to EPUB converter

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use fb2epub::Book;
use fb2epub::export::{EpubExporter, Exporter, TextExporter, build_toc};

#[derive(Parser)]
#[command(name = "fb2epub")]
#[command(version, about = "FictionBook to EPUB converter", long_about = None)]
#[command(after_help = "EXAMPLES:
    fb2epub book.fb2                  Convert to book.epub
    fb2epub book.fb2 book.txt         Convert to plain text
    fb2epub -i book.fb2               Show book metadata
    fb2epub --toc book.fb2            Print the table of contents as JSON")]
struct Cli {
    /// Input file (FB2)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (default: INPUT with the format's extension)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Output format (default: inferred from OUTPUT, else epub)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Show book metadata without converting
    #[arg(short, long, conflicts_with = "toc")]
    info: bool,

    /// Print the table of contents as JSON without converting
    #[arg(long)]
    toc: bool,

    /// Suppress output messages
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log pipeline details
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Epub,
    Text,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Epub => "epub",
            OutputFormat::Text => "txt",
        }
    }

    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "epub" => Some(OutputFormat::Epub),
            "txt" | "text" => Some(OutputFormat::Text),
            _ => None,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = if cli.info {
        show_info(&cli.input)
    } else if cli.toc {
        show_toc(&cli.input)
    } else {
        convert(&cli)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn show_info(path: &Path) -> Result<(), String> {
    let book = Book::open(path).map_err(|e| e.to_string())?;

    let desc = &book.description;
    println!("File: {}", path.display());
    println!("Title: {}", desc.title);
    let authors: Vec<String> = desc.authors.iter().filter_map(|a| a.display_name()).collect();
    if !authors.is_empty() {
        println!("Authors: {}", authors.join(", "));
    }
    if !desc.genres.is_empty() {
        println!("Genres: {}", desc.genres.join(", "));
    }
    if let Some(ref language) = desc.language {
        println!("Language: {language}");
    }
    if let Some(ref date) = desc.date {
        println!("Date: {date}");
    }
    if !desc.series.is_empty() {
        println!("Series: {}", desc.series.join(", "));
    }
    println!("Identifier: {}", book.identifier);
    println!("Sections: {}", book.flat_sections().len());
    println!("Images: {}", book.images().len());
    for diagnostic in &book.diagnostics {
        println!("Warning: {diagnostic}");
    }

    Ok(())
}

fn show_toc(path: &Path) -> Result<(), String> {
    let book = Book::open(path).map_err(|e| e.to_string())?;
    let toc = build_toc(&book).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&toc).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn convert(cli: &Cli) -> Result<(), String> {
    let format = cli
        .format
        .or_else(|| cli.output.as_deref().and_then(OutputFormat::from_path))
        .unwrap_or(OutputFormat::Epub);
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension(format.extension()));

    let book = Book::open(&cli.input).map_err(|e| e.to_string())?;

    let file = File::create(&output).map_err(|e| format!("{}: {e}", output.display()))?;
    let mut writer = BufWriter::new(file);
    match format {
        OutputFormat::Epub => EpubExporter::new().export(&book, &mut writer),
        OutputFormat::Text => TextExporter::new().export(&book, &mut writer),
    }
    .map_err(|e| e.to_string())?;
    writer.flush().map_err(|e| e.to_string())?;

    if !cli.quiet {
        println!(
            "{} -> {} ({} sections)",
            cli.input.display(),
            output.display(),
            book.flat_sections().len()
        );
    }
    Ok(())
}
