use anyhow::Context;
use clap::{ArgAction, Parser};
use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Write};
use std::path::PathBuf;

use logtint::tty::{should_use_colors, terminal_width, ColorMode};
use logtint::{
    ColorTable, GroupKeyTable, LogProcessor, LogType, Matcher, PipelineConfig, ProcessorConfig,
    Profile, StreamPipeline, TransformRules,
};

#[derive(Parser)]
#[command(name = "logtint")]
#[command(about = "Format, filter and colorize log streams")]
#[command(version)]
struct Args {
    /// Input files (default: stdin, '-' reads stdin)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// YAML profile with line pattern, filters and rewrite rules
    #[arg(short = 'c', long = "config", value_name = "YAML")]
    config: Option<PathBuf>,

    /// Line pattern: a regex with named groups, or 'level,tag,message = "<regex>"'
    #[arg(short = 'r', long = "regex", value_name = "PATTERN")]
    regex: Option<String>,

    /// Only show lines whose tag matches (repeatable, comma separated)
    #[arg(short = 't', long = "tag", action = ArgAction::Append, value_delimiter = ',')]
    tag_keywords: Vec<String>,

    /// Show lines containing a keyword, highlighting it (repeatable, comma separated)
    #[arg(short = 'k', long = "keyword", action = ArgAction::Append, value_delimiter = ',')]
    line_keywords: Vec<String>,

    /// Highlight these terms in messages (repeatable, comma separated)
    #[arg(long = "highlight", action = ArgAction::Append, value_delimiter = ',')]
    highlights: Vec<String>,

    /// Blank messages containing this text ('re:' prefix for a regex)
    #[arg(long = "hide", action = ArgAction::Append)]
    hide: Vec<String>,

    /// Regex deriving a group key from messages; a banner marks group changes
    #[arg(long = "separator", action = ArgAction::Append)]
    separators: Vec<String>,

    /// Blank the tag column when the tag repeats
    #[arg(long)]
    hide_same_tags: bool,

    /// Kind of log being read
    #[arg(long = "log-type", value_enum)]
    log_type: Option<LogType>,

    /// When to use colors
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorMode,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output")]
    output_file: Option<PathBuf>,

    /// Debug mode - verbose logging and statistics on stderr
    #[arg(long)]
    debug: bool,

    /// Buffer size for I/O
    #[arg(long, default_value = "65536")] // 64KB
    buffer_size: usize,
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn build_processor(args: &Args, profile: &Profile, use_colors: bool) -> anyhow::Result<LogProcessor> {
    let config = ProcessorConfig {
        hide_same_tags: args.hide_same_tags || profile.hide_same_tags.unwrap_or(false),
        log_type: args.log_type.or(profile.log_type).unwrap_or_default(),
        use_colors,
        width: terminal_width(),
    };

    let mut processor = LogProcessor::new(config, ColorTable::new(), GroupKeyTable::new());
    profile.apply(&mut processor)?;

    if let Some(regex) = &args.regex {
        processor
            .setup_regex_parser(regex)
            .context("Invalid --regex")?;
    }
    if !args.separators.is_empty() {
        processor.setup_separator(&args.separators)?;
    }
    processor.setup_condition(&args.tag_keywords, &args.line_keywords)?;
    processor.setup_highlight(&args.highlights);

    if !args.hide.is_empty() {
        let mut rules = TransformRules::new();
        for hidden in &args.hide {
            rules.add_hide(Matcher::parse(hidden)?);
        }
        processor.setup_trans(rules);
    }

    if processor.pattern().is_none() {
        log::warn!("no line pattern configured (use --regex or log-line-regex in a profile); nothing will be shown");
    }

    Ok(processor)
}

fn run(args: Args) -> anyhow::Result<()> {
    let profile = match &args.config {
        Some(path) => Profile::load(path)
            .with_context(|| format!("Failed to load profile '{}'", path.display()))?,
        None => Profile::default(),
    };

    let use_colors = should_use_colors(args.color);
    let processor = build_processor(&args, &profile, use_colors)?;

    let config = PipelineConfig {
        debug: args.debug,
        buffer_size: args.buffer_size,
        banner_width: terminal_width().unwrap_or(80),
    };
    let mut pipeline = StreamPipeline::new(config, Box::new(processor));

    // Set up output
    let mut output: Box<dyn Write> = match &args.output_file {
        Some(path) => {
            let file = File::create(path).with_context(|| {
                format!("Failed to create output file '{}'", path.display())
            })?;
            Box::new(io::BufWriter::with_capacity(args.buffer_size, file))
        }
        // stdout is line buffered, so followed streams show up promptly
        None => Box::new(io::stdout().lock()),
    };

    let stdin_only = [PathBuf::from("-")];
    let inputs: &[PathBuf] = if args.files.is_empty() {
        &stdin_only
    } else {
        &args.files
    };

    for path in inputs {
        if path.as_os_str() == "-" {
            let stdin = io::stdin();
            let reader = BufReader::with_capacity(args.buffer_size, stdin.lock());
            pipeline.process_stream(reader, &mut output, None)?;
        } else {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file '{}'", path.display()))?;
            let reader = BufReader::with_capacity(args.buffer_size, file);
            let name = path.to_string_lossy();
            pipeline.process_stream(reader, &mut output, Some(&name))?;
        }
    }

    if let Err(e) = output.flush() {
        if e.kind() != ErrorKind::BrokenPipe {
            return Err(e.into());
        }
    }

    if args.debug {
        let stats = pipeline.get_stats();
        eprintln!("Final statistics:");
        eprintln!("  Lines read: {}", stats.lines_seen);
        eprintln!("  Lines shown: {}", stats.lines_output);
        eprintln!("  Lines suppressed: {}", stats.lines_suppressed);
        eprintln!("  Group separators: {}", stats.separators_written);
        eprintln!(
            "  Processing time: {}",
            humantime::format_duration(stats.processing_time)
        );
    }

    Ok(())
}
