use anyhow::{anyhow, Context};
use clap::Parser;

use tracklet_reid::{
    load_tracklets, AnomalyChecker, MatchConfig, MergePolicy, ReidMatcher, RoadUserType,
    ShortTrackletPolicy, TrackletId, TrackletStore,
};

/// Proposes tracklet merges and flags anomalous tracklets
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file with tracklets
    #[arg(short, long)]
    tracklets: String,

    /// JSON file with matching parameters
    #[arg(short, long)]
    config: Option<String>,

    #[arg(long)]
    feature_threshold: Option<f32>,

    #[arg(long)]
    point_threshold: Option<f32>,

    #[arg(long)]
    tracklet_threshold: Option<f32>,

    #[arg(long)]
    speed_tolerance: Option<f32>,

    /// Merge policy: all or greedy
    #[arg(long)]
    policy: Option<String>,

    /// Accept short tracklets without the speed check
    #[arg(long)]
    skip_short: bool,

    #[arg(long)]
    parallel: bool,

    /// Tracklet to check for anomaly as `class:instance`, may repeat
    #[arg(long)]
    anomaly: Vec<String>,
}

fn parse_id(s: &str) -> anyhow::Result<TrackletId> {
    let (class, instance) = s
        .split_once(':')
        .ok_or_else(|| anyhow!("expected `class:instance`, got `{}`", s))?;

    Ok(TrackletId::new(
        RoadUserType::try_from(class.parse::<i32>()?)?,
        instance.parse()?,
    ))
}

fn build_config(args: &Args) -> anyhow::Result<MatchConfig> {
    let mut config = match &args.config {
        Some(path) => MatchConfig::from_file(path).with_context(|| format!("reading {}", path))?,
        None => MatchConfig::default(),
    };

    if let Some(x) = args.feature_threshold {
        config.feature_threshold = x;
    }

    if let Some(x) = args.point_threshold {
        config.point_threshold = x;
    }

    if let Some(x) = args.tracklet_threshold {
        config.tracklet_threshold = x;
    }

    if let Some(x) = args.speed_tolerance {
        config.speed_tolerance = x;
    }

    if let Some(policy) = &args.policy {
        config.merge_policy = match policy.to_lowercase().as_str() {
            "all" => MergePolicy::All,
            "greedy" => MergePolicy::Greedy,
            x => return Err(anyhow!("unknown merge policy `{}`", x)),
        };
    }

    if args.skip_short {
        config.short_tracklet_policy = ShortTrackletPolicy::SkipSpeedCheck;
    }

    config.parallel |= args.parallel;

    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = build_config(&args)?;

    let tracklets = load_tracklets(&args.tracklets)
        .with_context(|| format!("loading {}", args.tracklets))?;

    let report = ReidMatcher::new(config.clone()).run(&tracklets);

    for c in &report.candidates {
        println!(
            "merge {} -> {} feature={:.3} speed_delta={} gap={}f/{:.1}px{}",
            c.head,
            c.tail,
            c.evidence.feature_distance,
            c.evidence
                .speed_delta
                .map_or_else(|| "-".to_string(), |d| format!("{:.3}", d)),
            c.evidence.time_gap,
            c.evidence.spatial_gap,
            if c.spatially_close { "" } else { " (far)" },
        );
    }

    for s in &report.skipped {
        match s.tail {
            Some(tail) => println!("skipped {} -> {}: {}", s.head, tail, s.error),
            None => println!("skipped {}: {}", s.head, s.error),
        }
    }

    let checker = AnomalyChecker::new(&config);

    for raw in &args.anomaly {
        let id = parse_id(raw)?;
        let query = tracklets
            .get(&id)
            .ok_or_else(|| anyhow!("no tracklet {}", id))?;

        match checker.check_anomaly(query, tracklets.iter()) {
            Ok(anomalous) => println!("anomaly {} {}: {}", id, id.class, anomalous),
            Err(err) => println!("anomaly {} {}: error: {}", id, id.class, err),
        }
    }

    Ok(())
}
