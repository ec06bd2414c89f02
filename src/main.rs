mod logging;
mod ui;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use toolit::generator::{self, PasswordConfig};
use toolit::units::{self, UnitCategory};
use toolit::vault::{self, EncryptedData, PasswordMetadata, SavePasswordRequest};
use toolit::{PerformanceMonitor, analyze_strength, json, links, text};
use tracing::{debug, info};
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(
    name = "toolit",
    version,
    author,
    about = "Password generator, strength analyzer, vault encryption and text utilities"
)]
struct Cli {
    /// Print only the bare result
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug); TOOLIT_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log per-operation timings when done
    #[arg(long, global = true, env = "TOOLIT_TIMINGS")]
    timings: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate random passwords
    Generate(GenerateArgs),

    /// Score a password and estimate its crack time
    Analyze {
        /// Password to analyze; prompted for (hidden) when omitted
        password: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Encrypt or decrypt a vault entry
    Vault {
        #[command(subcommand)]
        action: VaultAction,
    },

    /// Pretty-print or minify JSON
    Json {
        /// Input file; stdin when omitted
        file: Option<PathBuf>,

        #[arg(short, long)]
        minify: bool,
    },

    /// Count words, characters, lines, paragraphs and sentences
    Count {
        /// Input file; stdin when omitted
        file: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a value between units
    Convert {
        #[arg(allow_negative_numbers = true)]
        value: f64,
        from: String,
        to: String,

        #[arg(short, long, value_enum)]
        category: UnitCategory,
    },

    /// Validate a URL and generate a short code for it
    Url {
        url: String,

        #[arg(long, default_value_t = links::DEFAULT_SHORT_CODE_LENGTH)]
        short_length: usize,

        #[arg(long, default_value_t = links::DEFAULT_DISPLAY_LENGTH)]
        max_display: usize,
    },
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(short, long, default_value_t = generator::DEFAULT_LENGTH, value_parser = parse_length)]
    length: usize,

    #[arg(long)]
    no_uppercase: bool,

    #[arg(long)]
    no_lowercase: bool,

    #[arg(long)]
    no_numbers: bool,

    #[arg(long)]
    no_special: bool,

    /// Leave out look-alike characters (i l 1 L o 0 O)
    #[arg(short, long)]
    exclude_similar: bool,

    /// Number of passwords to generate
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,
}

impl GenerateArgs {
    fn config(&self) -> PasswordConfig {
        PasswordConfig {
            length: self.length,
            include_uppercase: !self.no_uppercase,
            include_lowercase: !self.no_lowercase,
            include_numbers: !self.no_numbers,
            include_special_chars: !self.no_special,
            exclude_similar: self.exclude_similar,
        }
    }
}

#[derive(Subcommand)]
enum VaultAction {
    /// Encrypt a secret with a user key and print the entry as JSON
    Encrypt {
        /// Label for the entry; prints a full save request when given
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Decrypt an entry read from a JSON file or stdin
    Decrypt { file: Option<PathBuf> },
}

fn parse_length(s: &str) -> Result<usize, String> {
    let length: usize = s.parse().map_err(|_| format!("`{}` is not a number", s))?;
    if !(generator::MIN_LENGTH..=generator::MAX_LENGTH).contains(&length) {
        return Err(format!(
            "length must be between {} and {}",
            generator::MIN_LENGTH,
            generator::MAX_LENGTH
        ));
    }
    Ok(length)
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn run_generate(
    args: &GenerateArgs,
    options: &ui::DisplayOptions,
    monitor: &mut PerformanceMonitor,
) -> Result<()> {
    let config = args.config();

    let passwords: Vec<_> = (0..args.count)
        .map(|_| {
            let password = monitor.measure("generate", || generator::generate_password(&config));
            let result = monitor.measure("analyze", || analyze_strength(&password));
            (password, result)
        })
        .collect();

    info!(
        count = args.count,
        length = config.length,
        classes = config.enabled_classes(),
        "generated passwords"
    );

    ui::display_passwords(&passwords, &config, options);
    Ok(())
}

fn run_analyze(
    password: Option<&str>,
    as_json: bool,
    options: &ui::DisplayOptions,
    monitor: &mut PerformanceMonitor,
) -> Result<()> {
    let password = match password {
        Some(p) => Zeroizing::new(p.to_string()),
        None => ui::prompt_secret("Password", "Password")?,
    };

    let result = monitor.measure("analyze", || analyze_strength(&password));

    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialize result")?
        );
    } else {
        ui::display_strength(&password, &result, options);
    }
    Ok(())
}

fn run_vault(
    action: &VaultAction,
    options: &ui::DisplayOptions,
    monitor: &mut PerformanceMonitor,
) -> Result<()> {
    match action {
        VaultAction::Encrypt { label } => {
            let secret = ui::prompt_secret("Secret", "Secret")?;
            let user_key = ui::prompt_user_key(true)?;

            monitor.start_measure("encrypt");
            let (encrypted, elapsed) =
                ui::show_progress(options.unicode_support, "Deriving key...", || {
                    Ok(vault::encrypt_password(&secret, &user_key)?)
                })?;
            monitor.end_measure("encrypt");
            debug!(elapsed_ms = elapsed.as_millis() as u64, "vault entry encrypted");

            let output = match label {
                Some(label) => {
                    let metadata = PasswordMetadata::from_password(&secret);
                    let request = SavePasswordRequest::new(label, encrypted, metadata)?;
                    serde_json::to_string_pretty(&request)
                }
                None => serde_json::to_string_pretty(&encrypted),
            }
            .context("Failed to serialize vault entry")?;

            println!("{}", output);
        }
        VaultAction::Decrypt { file } => {
            let input = read_input(file.as_deref())?;
            let entry: EncryptedData =
                serde_json::from_str(&input).context("Input is not a vault entry")?;
            let user_key = ui::prompt_user_key(false)?;

            monitor.start_measure("decrypt");
            let (secret, _) = ui::show_progress(options.unicode_support, "Deriving key...", || {
                Ok(vault::decrypt_password(&entry, &user_key)?)
            })?;
            monitor.end_measure("decrypt");

            println!("{}", &**secret);
        }
    }
    Ok(())
}

fn run_json(
    file: Option<&Path>,
    minify: bool,
    monitor: &mut PerformanceMonitor,
) -> Result<()> {
    let input = read_input(file)?;
    let formatted = monitor
        .measure("json", || json::format_json(&input, minify))
        .map_err(|e| {
            anyhow::anyhow!(
                "Invalid JSON (line {}, column {}): {}",
                e.line(),
                e.column(),
                e
            )
        })?;

    println!("{}", formatted);
    Ok(())
}

fn run_count(
    file: Option<&Path>,
    as_json: bool,
    options: &ui::DisplayOptions,
    monitor: &mut PerformanceMonitor,
) -> Result<()> {
    let input = read_input(file)?;
    let stats = monitor.measure("count", || text::analyze_text(&input));

    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialize text stats")?
        );
    } else {
        ui::display_text_stats(&stats, options);
    }
    Ok(())
}

fn run_convert(
    value: f64,
    from: &str,
    to: &str,
    category: UnitCategory,
    options: &ui::DisplayOptions,
    monitor: &mut PerformanceMonitor,
) -> Result<()> {
    let converted = monitor
        .measure("convert", || units::convert_unit(value, from, to, category))
        .with_context(|| {
            format!(
                "Cannot convert {} to {}; {} units are: {}",
                from,
                to,
                category,
                category.units().join(", ")
            )
        })?;

    if options.quiet {
        println!("{}", converted);
    } else {
        println!("{} {} = {} {}", value, from, converted, to);
    }
    Ok(())
}

fn run_url(
    url: &str,
    short_length: usize,
    max_display: usize,
    options: &ui::DisplayOptions,
) -> Result<()> {
    if !links::is_valid_url(url) {
        anyhow::bail!("Invalid URL: {}", url.trim());
    }

    let normalized = links::normalize_url(url);
    let code = links::generate_short_code(short_length);

    if options.quiet {
        println!("{}", code);
        return Ok(());
    }

    println!("URL:     {}", links::format_url_for_display(&normalized, max_display));
    println!("Domain:  {}", links::extract_domain(&normalized));
    println!("Code:    {}", code);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbosity = if cli.timings {
        cli.verbose.max(1)
    } else {
        cli.verbose
    };
    logging::setup_logging(verbosity, console::colors_enabled_stderr())?;

    let options = ui::DisplayOptions::detect(cli.quiet);
    let mut monitor = PerformanceMonitor::new();

    match &cli.command {
        Command::Generate(args) => run_generate(args, &options, &mut monitor)?,
        Command::Analyze { password, json } => {
            run_analyze(password.as_deref(), *json, &options, &mut monitor)?
        }
        Command::Vault { action } => run_vault(action, &options, &mut monitor)?,
        Command::Json { file, minify } => run_json(file.as_deref(), *minify, &mut monitor)?,
        Command::Count { file, json } => {
            run_count(file.as_deref(), *json, &options, &mut monitor)?
        }
        Command::Convert {
            value,
            from,
            to,
            category,
        } => run_convert(*value, from, to, *category, &options, &mut monitor)?,
        Command::Url {
            url,
            short_length,
            max_display,
        } => run_url(url, *short_length, *max_display, &options)?,
    }

    if cli.timings {
        monitor.log_summary();
    }

    Ok(())
}
