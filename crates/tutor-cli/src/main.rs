//! tutor — rule-based tutoring assistant CLI.
//!
//! Chat with the tutor, pull non-repeating practice questions, list the
//! skill catalog, estimate mastery from a score table, and rank practice
//! recommendations by weakest skill.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use tracing::error;
use tutor_core::tutor::Tutor;

/// tutor — rule-based tutoring assistant
#[derive(Parser)]
#[command(name = "tutor", version = "0.1.0", about = "Rule-based tutor with non-repeating practice questions")]
struct Cli {
    /// Config file path
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Fixed seed for reproducible question selection
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Talk to the tutor (interactive unless -m is given)
    Chat {
        /// Message to send; repeat for several turns
        #[arg(short = 'm', long = "message")]
        messages: Vec<String>,
        /// Subject to start with
        #[arg(long)]
        subject: Option<String>,
        /// Topic to start with
        #[arg(long)]
        topic: Option<String>,
    },

    /// Get practice questions for a skill
    Practice {
        /// Skill name (see `tutor skills`)
        skill: String,
        /// Number of questions
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },

    /// Recommend practice for the weakest skills
    Recommend {
        /// Only skills from this subject ("All Subjects" for no filter)
        #[arg(long)]
        subject: Option<String>,
        /// Only this difficulty: Easy, Medium, Hard ("Any" for no filter)
        #[arg(long)]
        difficulty: Option<String>,
        /// Maximum number of recommendations
        #[arg(short = 'k', long = "top-k")]
        top_k: Option<usize>,
        /// JSON score table used to estimate mastery
        #[arg(long)]
        scores: Option<String>,
        /// Print cards as JSON
        #[arg(long)]
        json: bool,
    },

    /// List subjects and skills
    Skills {
        /// Only list this subject's skills
        subject: Option<String>,
    },

    /// Print the effective configuration as JSON
    Config,

    /// Estimate mastery from a JSON score table
    Estimate {
        /// Path to a JSON array of {student_id, skill, score} rows
        path: String,
        /// Print estimates as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing.
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("tutor=debug,tutor_cli=debug,tutor_core=debug")
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("tutor=warn,tutor_cli=warn,tutor_core=warn")
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config_path = cli.config.clone().unwrap_or_else(config::default_path);
    let mut cfg = match config::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("tutor: {e:#}");
            std::process::exit(1);
        }
    };
    // CLI flags override config.
    if cli.seed.is_some() {
        cfg.tutor.seed = cli.seed;
    }

    let mut tutor = Tutor::new(cfg.tutor.clone());

    let result = match cli.command {
        Command::Chat {
            messages,
            subject,
            topic,
        } => commands::chat::run(&mut tutor, &messages, subject.as_deref(), topic.as_deref()),
        Command::Practice { skill, count } => commands::practice::run(&mut tutor, &skill, count),
        Command::Recommend {
            subject,
            difficulty,
            top_k,
            scores,
            json,
        } => commands::recommend::run(
            &mut tutor,
            &cfg,
            commands::recommend::Options {
                subject: subject.as_deref(),
                difficulty: difficulty.as_deref(),
                top_k,
                scores: scores.as_deref(),
                json,
            },
        ),
        Command::Skills { subject } => commands::skills::run(subject.as_deref()),
        Command::Estimate { path, json } => commands::estimate::run(&cfg, &path, json),
        Command::Config => commands::show_config::run(&cfg),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("tutor: {e:#}");
        std::process::exit(1);
    }
}
