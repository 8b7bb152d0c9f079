use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Parser, Debug)]
#[command(name = "reframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Adapt a document to a new canvas size.
    Adapt(AdaptArgs),
    /// Print content analysis of a document.
    Analyze(AnalyzeArgs),
    /// Print text placement scoring for a target and advice bundle.
    Score(ScoreArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SafeZoneArg {
    Tiktok,
    InstagramStory,
    InstagramReel,
    YoutubeShorts,
}

impl From<SafeZoneArg> for reframe::SafeZoneProfile {
    fn from(v: SafeZoneArg) -> Self {
        match v {
            SafeZoneArg::Tiktok => reframe::SafeZoneProfile::Tiktok,
            SafeZoneArg::InstagramStory => reframe::SafeZoneProfile::InstagramStory,
            SafeZoneArg::InstagramReel => reframe::SafeZoneProfile::InstagramReel,
            SafeZoneArg::YoutubeShorts => reframe::SafeZoneProfile::YoutubeShorts,
        }
    }
}

#[derive(Parser, Debug)]
struct AdaptArgs {
    /// Input document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Target width in pixels.
    #[arg(long)]
    width: f64,

    /// Target height in pixels.
    #[arg(long)]
    height: f64,

    /// Usable share of each dimension (0..=1).
    #[arg(long)]
    safe_area: Option<f64>,

    /// Platform safe zone; overrides `--safe-area`.
    #[arg(long, value_enum)]
    safe_zone: Option<SafeZoneArg>,

    /// Advice bundle JSON (faces, focal point, layout advice).
    #[arg(long)]
    advice: Option<PathBuf>,

    /// Engine configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Target identifier for advice and feedback lookups.
    #[arg(long, default_value = "")]
    target_id: String,

    /// Preferred pattern for this target (repeatable).
    #[arg(long = "prefer")]
    preferred: Vec<String>,

    /// Installed font as `Family:Style` (repeatable). Every font is accepted when omitted.
    #[arg(long = "font")]
    fonts: Vec<String>,

    /// Output document JSON.
    #[arg(long)]
    out: PathBuf,

    /// Output metrics JSON.
    #[arg(long)]
    metrics: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    /// Input document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Target width; with `--height`, also prints the target profile.
    #[arg(long, requires = "height")]
    width: Option<f64>,

    /// Target height.
    #[arg(long, requires = "width")]
    height: Option<f64>,

    /// Engine configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ScoreArgs {
    /// Advice bundle JSON.
    #[arg(long)]
    advice: PathBuf,

    /// Target width in pixels.
    #[arg(long)]
    width: f64,

    /// Target height in pixels.
    #[arg(long)]
    height: f64,

    /// Usable share of each dimension (0..=1).
    #[arg(long, default_value_t = 0.9)]
    safe_area: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Adapt(args) => cmd_adapt(args),
        Command::Analyze(args) => cmd_analyze(args),
        Command::Score(args) => cmd_score(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<reframe::ReframeConfig> {
    match path {
        Some(p) => reframe::ReframeConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display())),
        None => Ok(reframe::ReframeConfig::default()),
    }
}

fn load_advice(path: &Path) -> anyhow::Result<reframe::AdviceBundle> {
    let f = File::open(path).with_context(|| format!("open advice '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse advice '{}'", path.display()))
}

fn parse_font(arg: &str) -> anyhow::Result<reframe::FontName> {
    let (family, style) = arg
        .split_once(':')
        .with_context(|| format!("font '{arg}' is not `Family:Style`"))?;
    Ok(reframe::FontName {
        family: family.trim().to_string(),
        style: style.trim().to_string(),
    })
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(f), value)
        .with_context(|| format!("write json '{}'", path.display()))
}

fn cmd_adapt(args: AdaptArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut doc = reframe::Document::from_path(&args.in_path)
        .with_context(|| format!("load document '{}'", args.in_path.display()))?;
    let advice = args.advice.as_deref().map(load_advice).transpose()?;

    let request = reframe::AdaptRequest {
        target_width: args.width,
        target_height: args.height,
        target_id: args.target_id,
        preferred_patterns: args.preferred,
        safe_area_ratio: args.safe_area,
        safe_zone: args.safe_zone.map(Into::into),
        advice,
    };

    let mut loader = if args.fonts.is_empty() {
        reframe::StaticFontLoader::accept_all()
    } else {
        let fonts = args
            .fonts
            .iter()
            .map(|s| parse_font(s))
            .collect::<anyhow::Result<Vec<_>>>()?;
        reframe::StaticFontLoader::with_fonts(fonts)
    };
    let mut font_cache = reframe::FontCache::default();
    let outcome = reframe::ScalingOrchestrator::new(config).adapt(
        &mut doc,
        &request,
        &mut font_cache,
        &mut loader,
    );

    for w in &outcome.warnings {
        eprintln!("warning: {w}");
    }
    write_json(&args.out, &doc.to_def())?;
    if let Some(path) = &args.metrics {
        write_json(path, &outcome)?;
    }
    if !outcome.success {
        anyhow::bail!("adaptation failed: {}", outcome.errors.join("; "));
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let doc = reframe::Document::from_path(&args.in_path)
        .with_context(|| format!("load document '{}'", args.in_path.display()))?;
    let analysis = reframe::analyze_content(&doc, doc.root(), &config.analysis, None)?;

    let target = args
        .width
        .zip(args.height)
        .map(|(w, h)| reframe::Dimensions::new(w, h).sanitized());
    let report = serde_json::json!({
        "analysis": analysis,
        "aspect_class": target.map(reframe::classify_aspect),
        "profile": target.map(reframe::resolve_layout_profile),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_score(args: ScoreArgs) -> anyhow::Result<()> {
    let advice = load_advice(&args.advice)?;
    let target = reframe::Dimensions::new(args.width, args.height).sanitized();
    let safe = reframe::SafeAreaInsets::from_ratio(target, args.safe_area).safe_bounds(target);
    let scoring = reframe::score_placement(
        reframe::resolve_layout_profile(target),
        target,
        safe,
        &advice.faces,
        advice.focal_point,
    );
    println!("{}", serde_json::to_string_pretty(&scoring)?);
    Ok(())
}
