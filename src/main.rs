//! # ptouch-print
//!
//! Print labels on Brother P-Touch printers.
//!
//! Print commands are applied in the order they are given:
//!
//! ```bash
//! # two lines of text, then a cut mark
//! ptouch-print --text "Hello" "World" --cutmark
//!
//! # an image with 20px of blank tape on both sides, three chained copies
//! ptouch-print --pad 20 --image logo.png --pad 20 --copies 3 --chain
//!
//! # render without a printer
//! ptouch-print --force-tape-width 76 --writepng out.png --text "Hello"
//! ```

use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use log::{debug, warn, LevelFilter};
use std::{path::PathBuf, process};

use ptouch::{
    model, Compositor, Error, FontRenderer, PrintJob, PrintJobOptions, Printer, RenderConfig,
};

/// ptouch-print - print labels on Brother P-Touch printers
#[derive(Parser, Debug)]
#[command(name = "ptouch-print")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug output
    #[arg(long)]
    debug: bool,

    /// Use font <FILE> or <NAME>
    #[arg(long, value_name = "FILE")]
    font: Option<String>,

    /// Manually set font size
    #[arg(long, value_name = "SIZE")]
    fontsize: Option<u32>,

    /// Instead of printing, write output to png file
    #[arg(long, value_name = "FILE")]
    writepng: Option<PathBuf>,

    /// Set tape width in pixels, use together with --writepng without a printer connected
    #[arg(long, value_name = "PX")]
    force_tape_width: Option<u32>,

    /// Sets the number of identical prints
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    copies: u32,

    /// Join copies into one strip without cutting between them
    #[arg(long)]
    chain: bool,

    /// Show info about detected tape
    #[arg(long)]
    info: bool,

    /// Show printers supported by this version
    #[arg(long)]
    list_supported: bool,

    /// Print image <FILE>, `-` reads from stdin
    #[arg(long, value_name = "FILE", action = ArgAction::Append)]
    image: Vec<PathBuf>,

    /// Print 1-4 lines of text
    #[arg(long, value_name = "TEXT", num_args = 1..=4, action = ArgAction::Append)]
    text: Vec<String>,

    /// Print a mark where the tape should be cut
    #[arg(
        long,
        num_args = 0,
        default_missing_value = "true",
        action = ArgAction::Append
    )]
    cutmark: Vec<bool>,

    /// Add <N> pixels padding (blank tape)
    #[arg(long, value_name = "N", action = ArgAction::Append)]
    pad: Vec<u32>,
}

/// One print command, in command line order.
#[derive(Debug)]
enum Block {
    Image(PathBuf),
    Text(Vec<String>),
    Cutmark,
    Pad(u32),
}

impl Cli {
    fn render_config(&self) -> RenderConfig {
        let mut config = RenderConfig::new();
        if let Some(font) = &self.font {
            config = config.font(font.as_str());
        }
        if let Some(size) = self.fontsize {
            config = config.font_size(size);
        }
        config
    }
}

/// Print commands sorted by their position on the command line.
fn blocks(matches: &ArgMatches) -> Vec<Block> {
    let mut blocks: Vec<(usize, Block)> = Vec::new();

    if let (Some(values), Some(indices)) = (
        matches.get_many::<PathBuf>("image"),
        matches.indices_of("image"),
    ) {
        blocks.extend(indices.zip(values.map(|p| Block::Image(p.clone()))));
    }
    if let (Some(values), Some(indices)) =
        (matches.get_many::<u32>("pad"), matches.indices_of("pad"))
    {
        blocks.extend(indices.zip(values.map(|&n| Block::Pad(n))));
    }
    if let Some(indices) = matches.indices_of("cutmark") {
        blocks.extend(indices.map(|i| (i, Block::Cutmark)));
    }
    if let (Some(occurrences), Some(mut indices)) = (
        matches.get_occurrences::<String>("text"),
        matches.indices_of("text"),
    ) {
        for occurrence in occurrences {
            let lines: Vec<String> = occurrence.cloned().collect();
            // one index per value, the block sorts by its first line
            let first = indices.next();
            for _ in 1..lines.len() {
                indices.next();
            }
            if let Some(i) = first {
                blocks.push((i, Block::Text(lines)));
            }
        }
    }

    blocks.sort_by_key(|(i, _)| *i);
    blocks.into_iter().map(|(_, b)| b).collect()
}

fn init_logger(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    init_logger(cli.debug);

    if let Err(e) = run(&cli, &matches) {
        eprintln!("{}", e);
        process::exit(e.exit_code());
    }
}

fn run(cli: &Cli, matches: &ArgMatches) -> Result<(), Error> {
    if cli.list_supported {
        println!("Supported printers (some might have quirks)");
        for profile in model::supported() {
            println!("\t{}", profile.name);
        }
        return Ok(());
    }

    let offline = cli.writepng.is_some() && cli.force_tape_width.is_some();
    if cli.force_tape_width.is_some() && cli.writepng.is_none() {
        warn!("--force-tape-width is only used together with --writepng, ignoring it");
    }

    let mut printer = None;
    let tape_width = match cli.force_tape_width {
        Some(px) if offline => px,
        _ => {
            let p = printer.insert(Printer::open()?);
            p.initialize()?;
            let status = p.query_status()?;
            if cli.debug {
                println!("{}", status.hex_dump());
            }
            if cli.info {
                println!("{}", status);
                return p.close();
            }
            status.tape_width_px()
        }
    };
    debug!("tape width is {}px", tape_width);

    let config = cli.render_config();
    let mut font: Option<FontRenderer> = None;
    let mut label = Compositor::new(tape_width, &config);
    for block in blocks(matches) {
        match block {
            Block::Image(path) => {
                label.image(&path)?;
            }
            Block::Text(lines) => {
                let renderer = match font.take() {
                    Some(f) => f,
                    None => FontRenderer::find(config.font_name())?,
                };
                label.text(&lines, &renderer)?;
                font = Some(renderer);
            }
            Block::Cutmark => {
                label.cutmark();
            }
            Block::Pad(n) => {
                label.padding(n);
            }
        }
    }

    let canvas = match label.finish() {
        Some(canvas) => canvas,
        None => {
            println!("nothing to print");
            return Ok(());
        }
    };

    if let Some(path) = &cli.writepng {
        return canvas.save_png(path);
    }

    match printer.as_mut() {
        Some(p) => {
            let options = PrintJobOptions::new()
                .copies(cli.copies)
                .chain(cli.chain);
            PrintJob::new(p, options).run(&canvas)?;
            p.close()
        }
        None => Err(Error::DeviceNotFound),
    }
}
