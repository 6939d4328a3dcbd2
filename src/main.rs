use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use svgviewer::{
    BeautifyOptions, ExportError, ExportFormat, Options, ResvgRasterizer, SizeReport,
    default_file_name, export, try_beautify, try_optimize,
};

#[derive(Parser)]
#[command(name = "svgviewer")]
#[command(about = "Optimize, beautify and convert SVG files", long_about = None)]
struct Cli {
    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Minify an SVG
    Optimize(OptimizeArgs),
    /// Re-indent an SVG
    Beautify(BeautifyArgs),
    /// Rasterize an SVG to PNG, JPEG, WebP or ICO
    Convert(ConvertArgs),
}

#[derive(Args)]
struct OptimizeArgs {
    /// Input file (use - for stdin)
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Output file (use - for stdout)
    #[arg(short, long, default_value = "-")]
    output: PathBuf,

    /// Precision for attribute numbers (decimal places)
    #[arg(short, long, default_value = "2")]
    precision: u8,

    /// Keep comments
    #[arg(long)]
    keep_comments: bool,

    /// Keep attributes with empty values
    #[arg(long)]
    keep_empty_attrs: bool,

    /// Keep whitespace between tags
    #[arg(long)]
    keep_whitespace: bool,

    /// Keep XML declaration
    #[arg(long)]
    keep_xml_declaration: bool,

    /// Print size comparison
    #[arg(short, long)]
    stats: bool,
}

#[derive(Args)]
struct BeautifyArgs {
    /// Input file (use - for stdin)
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Output file (use - for stdout)
    #[arg(short, long, default_value = "-")]
    output: PathBuf,

    /// Spaces per indentation level
    #[arg(long, default_value = "2")]
    indent: usize,
}

#[derive(Args)]
struct ConvertArgs {
    /// Input file (use - for stdin)
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Output file (use - for stdout, defaults to converted.<format>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: png, jpeg, webp or ico
    #[arg(short, long, default_value = "png")]
    format: ExportFormat,

    /// Square size in pixels (required for ico: 16, 32, 48, 64, 128 or 256)
    #[arg(short, long, conflicts_with_all = ["width", "height"])]
    size: Option<u32>,

    /// Width in pixels (defaults to the SVG's own width)
    #[arg(long)]
    width: Option<u32>,

    /// Height in pixels (defaults to the SVG's own height)
    #[arg(long)]
    height: Option<u32>,
}

fn main() {
    let cli = Cli::parse();

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        });
    }

    let result = match cli.command {
        Command::Optimize(args) => run_optimize(args),
        Command::Beautify(args) => run_beautify(args),
        Command::Convert(args) => run_convert(args),
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run_optimize(args: OptimizeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let input = read_input(&args.input)?;

    let options = Options {
        precision: args.precision,
        remove_comments: !args.keep_comments,
        remove_empty_attrs: !args.keep_empty_attrs,
        collapse_whitespace: !args.keep_whitespace,
        remove_xml_declaration: !args.keep_xml_declaration,
    };

    let output = match try_optimize(&input, &options) {
        Ok(output) => output,
        Err(e) => {
            log::warn!("Input is not well-formed, leaving it unchanged: {}", e);
            input.clone()
        }
    };

    write_output(&args.output, output.as_bytes())?;

    if args.stats {
        eprintln!("{}", SizeReport::new(&input, &output));
    }

    Ok(())
}

fn run_beautify(args: BeautifyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let input = read_input(&args.input)?;
    let options = BeautifyOptions {
        indent: args.indent,
    };

    let output = match try_beautify(&input, &options) {
        Ok(output) => output,
        Err(e) => {
            log::warn!("Input is not well-formed, leaving it unchanged: {}", e);
            input
        }
    };

    write_output(&args.output, output.as_bytes())?;
    Ok(())
}

fn run_convert(args: ConvertArgs) -> Result<(), Box<dyn std::error::Error>> {
    let input = read_input(&args.input)?;
    let rasterizer = ResvgRasterizer::default().with_system_fonts();

    let (width, height) = match (args.size, args.width, args.height) {
        (Some(size), _, _) => (size, size),
        (None, Some(w), Some(h)) => (w, h),
        (None, w, h) => {
            let (nw, nh) = rasterizer
                .natural_size(&input)
                .map_err(ExportError::Raster)?;
            (w.unwrap_or(nw), h.unwrap_or(nh))
        }
    };

    let bytes = export(&rasterizer, &input, args.format, width, height)?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(default_file_name(args.format)));
    write_output(&output, &bytes)?;
    log::debug!("wrote {} bytes of {}", bytes.len(), args.format);

    Ok(())
}

fn read_input(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if path.as_os_str() == "-" {
        io::stdout().write_all(bytes)
    } else {
        fs::write(path, bytes)
    }
}

static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}): {}", target, record.args()),
                log::Level::Warn => eprintln!("Warning (in {}): {}", target, record.args()),
                log::Level::Info => eprintln!("Info (in {}): {}", target, record.args()),
                log::Level::Debug => eprintln!("Debug (in {}): {}", target, record.args()),
                log::Level::Trace => eprintln!("Trace (in {}): {}", target, record.args()),
            }
        }
    }

    fn flush(&self) {}
}
