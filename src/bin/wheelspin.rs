use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "wheelspin", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render and encode a spin animation.
    Spin(SpinArgs),
    /// Print the spin plan summary and its landing verdict as JSON.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
struct SpinArgs {
    /// Winning pocket: 0, 00 or 1..36.
    #[arg(long)]
    outcome: String,

    /// Wheel layout: european or american.
    #[arg(long, default_value = "european")]
    layout: wheelspin::LayoutKind,

    /// Output path; the extension is replaced by the encoded format's.
    #[arg(long)]
    out: PathBuf,

    /// Engine configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Byte budget override.
    #[arg(long)]
    budget: Option<u64>,

    /// Square frame edge in pixels.
    #[arg(long)]
    size: Option<u32>,

    /// Animation length in milliseconds.
    #[arg(long)]
    duration_ms: Option<u64>,

    /// Frame-rate hint.
    #[arg(long)]
    fps: Option<f64>,

    /// Re-time the wheel through the phase curves instead of drawing raw physics.
    #[arg(long, default_value_t = false)]
    stylized: bool,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Winning pocket: 0, 00 or 1..36.
    #[arg(long)]
    outcome: String,

    /// Wheel layout: european or american.
    #[arg(long, default_value = "european")]
    layout: wheelspin::LayoutKind,

    /// Engine configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Animation length in milliseconds.
    #[arg(long)]
    duration_ms: Option<u64>,

    /// Frame-rate hint.
    #[arg(long)]
    fps: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Spin(args) => cmd_spin(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<wheelspin::SpinConfig> {
    Ok(match path {
        Some(p) => wheelspin::SpinConfig::from_path(p)?,
        None => wheelspin::SpinConfig::default(),
    })
}

fn cmd_spin(args: SpinArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_ref())?;
    let engine = wheelspin::SpinEngine::from_config(cfg)?;

    let mut req = wheelspin::SpinRequest::new(args.outcome, args.layout);
    if let Some(budget) = args.budget {
        req = req.with_byte_budget(budget);
    }
    if let Some(edge) = args.size {
        req = req.with_frame_size(edge, edge);
    }
    if let Some(ms) = args.duration_ms {
        req = req.with_duration_ms(ms);
    }
    if let Some(fps) = args.fps {
        req = req.with_fps_hint(fps);
    }
    if args.stylized {
        req = req.with_mode(wheelspin::RenderMode::Stylized);
    }

    let out = engine.generate(&req)?;
    let path = out.artifact.save(&args.out)?;

    let summary = serde_json::json!({
        "path": path.display().to_string(),
        "format": out.artifact.format(),
        "size": out.artifact.size(),
        "frames": out.report.frame_count,
        "fps": out.report.fps,
        "attempts": out.steps.len(),
        "exhausted": out.exhausted,
        "issues": out.report.issues,
        "suggestions": out.report.suggestions,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("serialize spin summary")?
    );
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_ref())?;
    let engine = wheelspin::SpinEngine::from_config(cfg)?;

    let mut req = wheelspin::SpinRequest::new(args.outcome, args.layout);
    if let Some(ms) = args.duration_ms {
        req = req.with_duration_ms(ms);
    }
    if let Some(fps) = args.fps {
        req = req.with_fps_hint(fps);
    }
    let plan = engine.plan(&req)?;

    let last = plan.total_frames() - 1;
    let summary = serde_json::json!({
        "outcome": plan.winning_label().to_string(),
        "layout": plan.layout(),
        "fps": plan.fps(),
        "total_frames": plan.total_frames(),
        "drop_frame": plan.drop_frame(),
        "winning_pocket_index": plan.winning_pocket_index(),
        "landing_pocket": plan.landing_pocket(),
        "final_wheel_angle": plan.wheel_angles()[last],
        "final_ball_angle": plan.ball_angles()[last],
        "verify": wheelspin::verify_spin_plan(&plan),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("serialize plan summary")?
    );
    Ok(())
}
