//! badge-sim: run two badges against each other on the host

use std::path::PathBuf;

use anyhow::{Context, Result};
use badge_sim::{SimConfig, Simulation, Summary};
use clap::Parser;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Two badges playing versus over a lossy IR link", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Random seed for the link and the badges
    #[arg(long)]
    seed: Option<u64>,

    /// Probability that a frame is lost, 0.0 to 1.0
    #[arg(long, value_name = "RATE")]
    drop_rate: Option<f64>,

    /// Simulated time limit in milliseconds
    #[arg(long, value_name = "MS")]
    duration: Option<u64>,

    /// Long-press MODE on the first badge at this time
    #[arg(long, value_name = "MS")]
    surprise_at: Option<u64>,

    /// More output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn apply(&self, config: &mut SimConfig) {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(rate) = self.drop_rate {
            config.drop_rate = rate;
        }
        if let Some(duration) = self.duration {
            config.duration_ms = duration;
        }
        if self.surprise_at.is_some() {
            config.surprise_at_ms = self.surprise_at;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimConfig::default(),
    };
    args.apply(&mut config);

    let summary = Simulation::new(&config)?.run();
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &Summary) {
    println!(
        "{} ms simulated, {} frames carried, {} lost",
        summary.elapsed_ms, summary.carried, summary.lost
    );
    if !summary.settled {
        println!("match did not finish in time");
    }

    for badge in &summary.badges {
        println!();
        println!("{}", badge.name);
        println!("  screen:     {}", badge.final_app.unwrap_or("-"));
        match badge.best_score {
            Some(score) => println!("  best score: {}", score),
            None => println!("  best score: -"),
        }
        println!(
            "  ir:         {} sent, {} received, {} rejected, {} dropped",
            badge.stats.sent, badge.stats.received, badge.stats.rejected, badge.stats.dropped
        );
        for report in &badge.reports {
            println!(
                "  report:     {} vs {} ({}) nonce {:#06x}",
                report.my_score, report.other_score, report.other_user, report.nonce
            );
        }
        if badge.reports.is_empty() {
            println!("  report:     none");
        }
    }

    println!();
    if summary.agreed() {
        println!("both badges agree on the result");
    } else {
        println!("badges do not share a reported result");
    }
}
