use colored::Colorize;
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;

use clap::Parser;

mod libtrivia;
use crate::libtrivia::question::QuestionFile;

#[derive(Parser, Debug)]
#[command(name = "Revisor")]
#[command(version, about = "Checks a question file before playing with it", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "info")]
    log_level: String,

    file: PathBuf,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();

    info!("{}", format!("Checking {:?}", args.file).cyan());
    let content = match QuestionFile::read(&args.file) {
        Ok(c) => c,
        Err(err) => {
            error!("{}", format!("{}!", err).red());
            std::process::exit(1);
        }
    };

    let mut rejected = 0;
    info!(
        "{}",
        format!("├ {} questions", content.questions.len()).blue()
    );
    for (index, (raw, entry)) in content.questions.iter().zip(content.entries()).enumerate() {
        match entry {
            Ok(question) => info!(
                "{} {}",
                "│".blue(),
                format!(
                    "├ {}. [{}] {} ({} options)",
                    index + 1,
                    question.category,
                    question.prompt,
                    question.options.len()
                )
                .green()
            ),
            Err(reason) => {
                rejected += 1;
                error!(
                    "{} {}",
                    "│".blue(),
                    format!("├ ✘ {}. {:?} ({})", index + 1, raw.question, reason)
                        .red()
                        .strikethrough()
                );
            }
        }
    }

    if rejected > 0 {
        error!(
            "{}",
            format!("{} of {} questions rejected", rejected, content.questions.len()).red()
        );
        std::process::exit(1);
    }
    info!("{}", "All questions are valid".green());
}
