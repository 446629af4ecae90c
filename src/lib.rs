pub mod analysis;
pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod fetchers;
pub mod http;
pub mod rate_limiter;
pub mod services;
pub mod store;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;
use colored::Colorize;
use std::fs;
use std::io;

use crate::cli::{AnalyzeArgs, Command, StoreArg};
use crate::config::settings::AppConfig;
use crate::domain::AnalysisResult;
use crate::services::analysis::AnalysisService;
use crate::services::server::ServerService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16, store: StoreArg) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut config = AppConfig::from_env();
        config.store.backend = store.into();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_analyze(args: &AnalyzeArgs) -> Result<()> {
    let mut config = AppConfig::from_env();
    if args.no_cache {
        config.scraper.use_cache = false;
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let analysis = runtime.block_on(load_analysis(&config, args))?;

    print_summary(&analysis);

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&analysis)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("\n{} {}", "Saved analysis to".dimmed(), path.display());
    }
    Ok(())
}

async fn load_analysis(config: &AppConfig, args: &AnalyzeArgs) -> Result<AnalysisResult> {
    let service = AnalysisService::new(config)?;
    let result = match (&args.link, &args.input) {
        (Some(link), _) => service.analyze_link(link).await,
        (None, Some(path)) => service.analyze_file(&path.to_string_lossy()).await,
        (None, None) => anyhow::bail!("Either --link or --input is required"),
    };
    result.context("Failed to load swim results")
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "swim_analytics", &mut io::stdout());
    Ok(())
}

fn print_summary(analysis: &AnalysisResult) {
    let swimmer = &analysis.swimmer;
    println!("{}", swimmer.name.bold().cyan());
    println!(
        "Age {} | {} meets | {} events | {} points | avg place {:.1}",
        swimmer.age,
        swimmer.total_meets,
        swimmer.total_events,
        analysis.summary.total_points,
        analysis.summary.average_place
    );

    println!("\n{}", "Best times".bold());
    for best in &analysis.performance.best_times {
        println!(
            "  {:<14} {:>9}  {} {}",
            best.event,
            best.time.green(),
            best.course_type.as_str(),
            best.date.dimmed()
        );
    }

    if let Some(meet) = &analysis.meet_breakdown.current_meet {
        println!("\n{} {} ({})", "Latest meet:".bold(), meet.name, meet.date);
        for result in &meet.results {
            let improvement = if result.improvement.starts_with('+') {
                result.improvement.green()
            } else if result.improvement.starts_with('-') {
                result.improvement.red()
            } else {
                result.improvement.normal()
            };
            println!("  {:<14} {:>9}  {}", result.event, result.time, improvement);
        }
    }

    let insights = &analysis.insights;
    for strength in &insights.strengths {
        println!("{} {}", "+".green(), strength);
    }
    for weakness in &insights.improvements {
        println!("{} {}", "-".yellow(), weakness);
    }
    for recommendation in &insights.recommendations {
        println!("{} {}", "*".blue(), recommendation);
    }
}
