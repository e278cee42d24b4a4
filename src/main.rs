use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use tgmd::{DEFAULT_CONFIG, Options};

#[derive(Parser)]
#[command(name = "tgmd")]
#[command(about = "Convert Markdown to Telegram MarkdownV2")]
struct Cli {
    /// Input Markdown file ("-" or omitted reads stdin)
    input: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML style table; keys it omits keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wrap the whole output in a block quote
    #[arg(long)]
    quote: bool,

    /// Make the whole quote expandable (implies --quote)
    #[arg(long)]
    expandable: bool,

    /// Make quote lines after the first N expandable (implies --quote)
    #[arg(long, value_name = "N")]
    expand_after: Option<usize>,

    /// Print the default style table and exit
    #[arg(long)]
    print_default_config: bool,

    /// Log more detail to stderr (repeat for trace output)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.print_default_config {
        print!("{DEFAULT_CONFIG}");
        return;
    }

    let options = match load_options(&cli) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let source = match read_input(cli.input.as_deref()) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading input: {}", e);
            std::process::exit(1);
        }
    };

    let rendered = match tgmd::convert(&source, &options) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = write_output(cli.output.as_deref(), &rendered) {
        eprintln!("Error writing output: {}", e);
        std::process::exit(1);
    }
}

/// Respects `RUST_LOG`; `-v` raises the default level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn load_options(cli: &Cli) -> Result<Options, tgmd::ConfigError> {
    let options = match &cli.config {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            Options::load(path)?
        }
        None => Options::default(),
    };
    Ok(apply_quote_flags(options, cli))
}

fn apply_quote_flags(mut options: Options, cli: &Cli) -> Options {
    if cli.quote || cli.expandable || cli.expand_after.is_some() {
        options.quote.enable = true;
    }
    if cli.expandable {
        options.quote.expandable = true;
    }
    if let Some(lines) = cli.expand_after {
        options.quote.expand_after_lines = lines;
    }
    options
}

fn read_input(input: Option<&Path>) -> io::Result<Vec<u8>> {
    match input {
        Some(path) if path != Path::new("-") => fs::read(path),
        _ => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_output(output: Option<&Path>, bytes: &[u8]) -> io::Result<()> {
    match output {
        Some(path) => fs::write(path, bytes),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn quote_flags_enable_quoting() {
        let cli = Cli::try_parse_from(["tgmd", "--expand-after", "4", "in.md"]).unwrap();
        let options = apply_quote_flags(Options::default(), &cli);
        assert!(options.quote.enable);
        assert!(!options.quote.expandable);
        assert_eq!(options.quote.expand_after_lines, 4);
    }

    #[test]
    fn no_flags_keep_config_quote_settings() {
        let cli = Cli::try_parse_from(["tgmd"]).unwrap();
        let mut configured = Options::default();
        configured.quote.enable = true;
        configured.quote.expand_after_lines = 2;

        let options = apply_quote_flags(configured.clone(), &cli);
        assert_eq!(options, configured);
    }

    #[test]
    fn reads_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        fs::write(&path, "# Hi").unwrap();
        assert_eq!(read_input(Some(&path)).unwrap(), b"# Hi");
    }
}
