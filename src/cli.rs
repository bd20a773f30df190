use crate::art::ArtConfig;
use crate::generator::{Palette, Policy};
use crate::geometry::Size;
use crate::session::StippleConfig;
use rand::rngs::OsRng;
use rand::Rng;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use structopt::clap::Shell;
use structopt::StructOpt;
use structopt_flags::QuietVerbose;

fn load_policy(s: &str) -> Result<Policy, String> {
    let path = PathBuf::from(s);
    let file = File::open(path).map_err(|e| format!("Failed to open policy file: {}", e))?;
    let reader = BufReader::new(file);
    let policy = serde_json::from_reader(reader)
        .map_err(|e| format!("Failed to parse policy file: {}", e))?;
    Ok(policy)
}

#[derive(Debug)]
pub struct RendererConfig {
    #[cfg(feature = "visual")]
    pub visual: bool,
    #[cfg(feature = "visual")]
    pub slow: bool,
    #[cfg(feature = "visual")]
    pub interactive: bool,
    #[cfg(feature = "visual")]
    pub vsync: bool,
    #[cfg(feature = "visual")]
    pub fullscreen: bool,
    #[cfg(feature = "visual")]
    pub window_size: Size,
    #[cfg(feature = "visual")]
    pub hold: Option<f32>,
}

#[derive(Debug)]
pub struct MaskRun {
    pub stipple: StippleConfig,
    pub sources: Vec<String>,
    pub custom: Option<String>,
    pub max_attempts: Option<usize>,
    pub output: PathBuf,
    pub mask_output: Option<PathBuf>,
}

#[derive(Debug)]
pub struct ArtRun {
    pub art: ArtConfig,
    pub output_dir: PathBuf,
    pub counter: PathBuf,
    pub pieces: usize,
}

#[derive(Debug)]
pub enum AppCommand {
    Mask(MaskRun),
    Art(ArtRun),
}

#[derive(Debug)]
pub struct AppConfig {
    pub command: AppCommand,
    pub renderer: RendererConfig,
}

#[derive(Debug, StructOpt)]
pub struct MaskOpt {
    #[structopt(help = "Candidate source images, tried in order")]
    sources: Vec<String>,

    #[structopt(long, help = "Image to load first, falling back to the sources on failure")]
    custom: Option<String>,

    #[structopt(
        parse(from_os_str),
        short,
        long,
        default_value = "dot-mask-image.png",
        help = "Composite output image"
    )]
    output: PathBuf,

    #[structopt(parse(from_os_str), long, help = "Also save the raw dot mask")]
    mask_output: Option<PathBuf>,

    #[structopt(
        parse(try_from_str),
        short,
        long,
        default_value = "3000x3000",
        help = "Canvas size"
    )]
    size: Size,

    #[structopt(short, long, default_value = "1000000", help = "Number of dots")]
    dots: usize,

    #[structopt(long, default_value = "2", help = "Dot diameter in pixels")]
    dot_size: f32,

    #[structopt(long, default_value = "10000", help = "Dots generated per tick")]
    chunk_size: usize,

    #[structopt(
        parse(try_from_str),
        short,
        long,
        default_value = "grid-jitter",
        help = "Distribution policy"
    )]
    policy: Policy,

    #[structopt(
        parse(try_from_str = load_policy),
        long,
        help = "Read the distribution policy from a json file"
    )]
    policy_config: Option<Policy>,

    #[structopt(long, help = "Maximum number of source loads before giving up")]
    max_attempts: Option<usize>,

    #[structopt(parse(try_from_str), long, help = "Random seed")]
    seed: Option<u64>,
}

#[derive(Debug, StructOpt)]
pub struct ArtOpt {
    #[structopt(
        parse(from_os_str),
        short,
        long,
        default_value = "progress",
        help = "Directory for exported pieces"
    )]
    output_dir: PathBuf,

    #[structopt(
        parse(from_os_str),
        long,
        default_value = "progress/save-count.json",
        help = "Persisted save counter"
    )]
    counter: PathBuf,

    #[structopt(long, default_value = "1", help = "Number of pieces to render")]
    pieces: usize,

    #[structopt(
        parse(try_from_str),
        short,
        long,
        default_value = "1920x1080",
        help = "Canvas size"
    )]
    size: Size,

    #[structopt(short, long, default_value = "1000000", help = "Number of dots per piece")]
    dots: usize,

    #[structopt(long, default_value = "10000", help = "Dots drawn per frame")]
    dots_per_frame: usize,

    #[structopt(long, default_value = "1", help = "Dot diameter in pixels")]
    dot_size: f32,

    #[structopt(
        parse(try_from_str),
        short,
        long,
        default_value = "beach",
        help = "First pattern"
    )]
    policy: Policy,

    #[structopt(
        parse(try_from_str = load_policy),
        long,
        help = "Read the first pattern from a json file"
    )]
    policy_config: Option<Policy>,

    #[structopt(parse(try_from_str), long, help = "First palette (random when omitted)")]
    palette: Option<Palette>,

    #[structopt(long, default_value = "10", help = "Background grey level")]
    background: u8,

    #[structopt(parse(try_from_str), long, help = "Random seed")]
    seed: Option<u64>,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    #[structopt(about = "Generate a dot mask and show a source image through it")]
    Mask(MaskOpt),

    #[structopt(about = "Render generative dot art")]
    Art(ArtOpt),
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "Stipple Mask",
    about = "Generate stippled images from dot masks and point patterns"
)]
pub struct Opt {
    #[structopt(flatten)]
    pub verbose: QuietVerbose,

    #[structopt(subcommand)]
    command: Option<Command>,

    #[cfg(feature = "visual")]
    #[structopt(short = "V", long, global = true, help = "Open a window to show the generation")]
    visual: bool,

    #[cfg(feature = "visual")]
    #[structopt(long, global = true, help = "Render every tick during visualisation")]
    slow: bool,

    #[cfg(feature = "visual")]
    #[structopt(
        long,
        global = true,
        help = "Keep the window open for Space (next source) and R (regenerate) until Esc"
    )]
    interactive: bool,

    #[cfg(feature = "visual")]
    #[structopt(long, global = true, help = "Turns on vsync")]
    vsync: bool,

    #[cfg(feature = "visual")]
    #[structopt(short, long, global = true, help = "Runs the application in full screen")]
    fullscreen: bool,

    #[cfg(feature = "visual")]
    #[structopt(
        parse(try_from_str),
        long,
        global = true,
        default_value = "900x900",
        help = "Preview window size"
    )]
    window_size: Size,

    #[cfg(feature = "visual")]
    #[structopt(long, global = true, help = "Hold the image for n seconds after finishing")]
    hold: Option<f32>,

    #[structopt(long, possible_values= &Shell::variants(), case_insensitive = true, help = "Generate shell completions and exit")]
    pub completions: Option<Shell>,
}

impl Opt {
    pub fn to_app_config(self) -> Result<AppConfig, &'static str> {
        let command = match self.command.ok_or("A subcommand is required")? {
            Command::Mask(opt) => AppCommand::Mask(MaskRun {
                stipple: StippleConfig {
                    total_dots: opt.dots,
                    size: opt.size,
                    dot_size: opt.dot_size,
                    chunk_size: opt.chunk_size,
                    policy: opt.policy_config.unwrap_or(opt.policy),
                    seed: opt.seed.unwrap_or_else(|| OsRng.gen()),
                },
                sources: opt.sources,
                custom: opt.custom,
                max_attempts: opt.max_attempts,
                output: opt.output,
                mask_output: opt.mask_output,
            }),
            Command::Art(opt) => AppCommand::Art(ArtRun {
                art: ArtConfig {
                    total_dots: opt.dots,
                    dots_per_frame: opt.dots_per_frame,
                    size: opt.size,
                    dot_size: opt.dot_size,
                    policy: opt.policy_config.unwrap_or(opt.policy),
                    palette: opt.palette.unwrap_or_else(|| Palette::random(&mut OsRng)),
                    background: opt.background,
                    seed: opt.seed.unwrap_or_else(|| OsRng.gen()),
                },
                output_dir: opt.output_dir,
                counter: opt.counter,
                pieces: opt.pieces,
            }),
        };

        Ok(AppConfig {
            command,
            renderer: RendererConfig {
                #[cfg(feature = "visual")]
                visual: self.visual,
                #[cfg(feature = "visual")]
                slow: self.slow,
                #[cfg(feature = "visual")]
                interactive: self.interactive,
                #[cfg(feature = "visual")]
                vsync: self.vsync,
                #[cfg(feature = "visual")]
                fullscreen: self.fullscreen,
                #[cfg(feature = "visual")]
                window_size: self.window_size,
                #[cfg(feature = "visual")]
                hold: self.hold,
            },
        })
    }
}
