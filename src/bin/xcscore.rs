//! Command-line front end: score a single IGC flight against one or more
//! league rulesets and print the resulting routes.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use xcscore::league::{self, League};
use xcscore::serialize;
use xcscore::track::Track;

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum LeagueArg {
    Frcfd,
    Uknxcl,
    Ukxcl,
}

impl From<LeagueArg> for League {
    fn from(arg: LeagueArg) -> Self {
        match arg {
            LeagueArg::Frcfd => League::Frcfd,
            LeagueArg::Uknxcl => League::Uknxcl,
            LeagueArg::Ukxcl => League::Ukxcl,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Gpx,
    Kml,
}

/// Score a flight log against one or more cross-country league rulesets.
#[derive(Parser, Debug)]
#[command(name = "xcscore", version, about)]
struct Cli {
    /// Path to the IGC flight log.
    file: String,

    /// League ruleset(s) to score against. Repeatable; defaults to all
    /// three when omitted.
    #[arg(long, value_enum)]
    league: Vec<LeagueArg>,

    /// How far to run each league's scoring pipeline: -1 for the full
    /// sequence, or a non-negative cutoff matching the league's staged
    /// complexity gates.
    #[arg(long, default_value_t = -1)]
    complexity: i32,

    /// Override the league's documented closure radius (kilometres).
    /// Ignored by leagues with no closure-based routes (`ukxcl`).
    #[arg(long)]
    epsilon_km: Option<f64>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let bytes = std::fs::read(&cli.file).with_context(|| format!("reading {}", cli.file))?;
    let mut track =
        Track::from_igc(&cli.file, &bytes).with_context(|| format!("parsing {}", cli.file))?;
    log::info!("{}: {} fixes", cli.file, track.len());
    track.preprocess();

    let leagues = if cli.league.is_empty() {
        vec![LeagueArg::Frcfd, LeagueArg::Uknxcl, LeagueArg::Ukxcl]
    } else {
        cli.league
    };

    let mut routes = Vec::new();
    for league_arg in leagues {
        routes.extend(league::optimize_with_epsilon(
            &mut track,
            league_arg.into(),
            cli.complexity,
            None,
            cli.epsilon_km,
        ));
    }

    let rendered = match cli.format {
        OutputFormat::Text => serialize::to_text(&routes),
        OutputFormat::Gpx => serialize::to_gpx(&routes),
        OutputFormat::Kml => serialize::to_kml(&routes),
    };
    print!("{rendered}");

    Ok(())
}
