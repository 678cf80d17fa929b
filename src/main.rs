use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

const EXIT_SUCCESS: i32 = 0;
const EXIT_ANSWERS: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score an answers file and print the result
    Score {
        /// Path to the answers JSON file (question id -> answer object)
        answers: PathBuf,

        /// Output tab-separated values for scripting
        #[arg(long)]
        tsv: bool,

        /// Write the score report as JSON to this path
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Validate the configuration and report every error and warning
    Check,
    /// Write a starter config file
    Init {
        /// Target path (defaults to the config path)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "quizcast")]
#[command(about = "Assessment scoring and archetype classification CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/quizcast/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn load_config_or_exit(path: Option<String>, verbose: bool) -> quizcast::config::Config {
    let config = match quizcast::config::load_config(path.map(PathBuf::from)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if verbose {
        eprintln!(
            "Loaded {} questions, {} dimensions, {} rules, {} archetypes",
            config.questions.len(),
            config.dimensions.len(),
            config.rules.len(),
            config.archetypes.len()
        );
    }

    config
}

fn main() {
    let cli = Cli::parse();
    let start_time = Instant::now();

    match cli.command {
        Commands::Init { path, force } => {
            match quizcast::config::write_starter_config(path, force) {
                Ok(written) => {
                    println!("Config written to {}", written.display());
                    println!("Run `quizcast check` after editing it.");
                    std::process::exit(EXIT_SUCCESS);
                }
                Err(e) => {
                    eprintln!("Init error: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            }
        }
        Commands::Check => {
            let config = load_config_or_exit(cli.config, cli.verbose);

            let mut clean = true;
            if let Err(errors) = quizcast::scoring::validate_config(&config) {
                clean = false;
                eprintln!("Config errors:");
                for error in errors {
                    eprintln!("  - {}", error);
                }
            }
            let warnings = quizcast::scoring::config_warnings(&config);
            if !warnings.is_empty() {
                clean = false;
                eprintln!("Config warnings:");
                for warning in warnings {
                    eprintln!("  - {}", warning);
                }
            }
            if !clean {
                std::process::exit(EXIT_CONFIG);
            }
            println!("Config OK.");
            std::process::exit(EXIT_SUCCESS);
        }
        Commands::Score { answers, tsv, save } => {
            let config = load_config_or_exit(cli.config, cli.verbose);

            // Validate config at startup; warnings only surface with -v
            if let Err(errors) = quizcast::scoring::validate_config(&config) {
                eprintln!("Config errors:");
                for error in errors {
                    eprintln!("  - {}", error);
                }
                std::process::exit(EXIT_CONFIG);
            }
            if cli.verbose {
                for warning in quizcast::scoring::config_warnings(&config) {
                    eprintln!("Warning: {}", warning);
                }
            }

            let answer_set = match quizcast::answers::load_answers(&answers) {
                Ok(a) => a,
                Err(e) => {
                    eprintln!("Answers error: {}", e);
                    std::process::exit(EXIT_ANSWERS);
                }
            };

            if cli.verbose {
                eprintln!(
                    "Loaded {} answers ({} questions configured)",
                    answer_set.len(),
                    config.questions.len()
                );
            }

            let report = match quizcast::scoring::score(&config, &answer_set) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Scoring error: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };

            if tsv {
                println!("{}", quizcast::output::format_tsv(&report));
            } else {
                let use_colors = quizcast::output::should_use_colors();
                println!("{}", quizcast::output::format_report(&report, use_colors));
            }

            if let Some(path) = save {
                if let Err(e) = quizcast::answers::save_report(&path, &report) {
                    eprintln!("Failed to save report: {}", e);
                    std::process::exit(EXIT_ANSWERS);
                }
                if cli.verbose {
                    eprintln!("Report saved to {}", path.display());
                }
            }

            if cli.verbose {
                eprintln!();
                eprintln!("Scored in {:?}", start_time.elapsed());
            }

            std::process::exit(EXIT_SUCCESS);
        }
    }
}
