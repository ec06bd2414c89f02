use anyhow::{Context, Result};
use console::{Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use rpassword::read_password;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use toolit::generator::PasswordConfig;
use toolit::strength::{CharClasses, Strength, StrengthResult};
use toolit::text::TextStats;
use toolit::vault;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

pub const MIN_SAFE_ENTROPY: f64 = 60.0;

pub const MIN_SAFE_PASSWORD_LENGTH: usize = 12;

pub const MAX_SECRET_BYTES: usize = 1024 * 1024;

pub struct DisplayOptions {
    pub unicode_support: bool,
    pub color_support: bool,
    pub quiet: bool,
}

impl DisplayOptions {
    pub fn detect(quiet: bool) -> Self {
        Self {
            unicode_support: detect_unicode_support(),
            color_support: detect_color_support(),
            quiet,
        }
    }

    fn style(&self, style: Style) -> Style {
        if self.color_support { style } else { Style::new() }
    }

    fn branches(&self) -> (&'static str, &'static str) {
        if self.unicode_support {
            ("├─", "└─")
        } else {
            ("|-", "`-")
        }
    }
}

pub fn detect_unicode_support() -> bool {
    supports_unicode::on(supports_unicode::Stream::Stdout)
}

pub fn detect_color_support() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

pub fn get_status_symbols(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support {
        ("✓", "!")
    } else {
        ("+", "!")
    }
}

fn strength_style(strength: Strength) -> Style {
    match strength {
        Strength::Weak => Style::new().red(),
        Strength::Medium => Style::new().yellow(),
        Strength::Strong => Style::new().blue(),
        Strength::VeryStrong => Style::new().green(),
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

fn validate_control_characters(s: &str, input_name: &str) -> Result<String> {
    let control_chars: Vec<(usize, char)> = s
        .chars()
        .enumerate()
        .filter(|(_, c)| c.is_control())
        .collect();

    if !control_chars.is_empty() {
        let term = Term::stderr();

        let warning_msg = format!(
            "WARNING: {} contains {} control character(s) at position(s): {}",
            input_name,
            control_chars.len(),
            control_chars
                .iter()
                .map(|(pos, _)| pos.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        term.write_line(&warning_msg)?;
        term.write_str("Continue anyway? [y/N]: ")?;
        term.flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;
        let response = response.trim().to_lowercase();

        term.clear_last_lines(2)?;

        if response != "y" && response != "yes" {
            anyhow::bail!("Aborted");
        }
    }

    Ok(s.to_string())
}

fn normalize_and_validate(s: &str, input_name: &str) -> Result<String> {
    let trimmed = s.trim();
    let normalized: String = trimmed.nfc().collect();
    validate_control_characters(&normalized, input_name)
}

/// Hidden prompt for a secret, NFC-normalized and trimmed.
pub fn prompt_secret(prompt: &str, input_name: &str) -> Result<Zeroizing<String>> {
    eprint!("{}: ", prompt);
    io::stderr().flush()?;

    let raw = Zeroizing::new(
        read_password().with_context(|| format!("Failed to read {}", input_name.to_lowercase()))?,
    );

    let normalized = Zeroizing::new(normalize_and_validate(&raw, input_name)?);

    if normalized.is_empty() {
        anyhow::bail!("{} cannot be empty", input_name);
    }

    if normalized.len() > MAX_SECRET_BYTES {
        anyhow::bail!(
            "{} too long ({} bytes, maximum is {})",
            input_name,
            normalized.len(),
            MAX_SECRET_BYTES
        );
    }

    Ok(normalized)
}

pub fn prompt_user_key(confirm: bool) -> Result<Zeroizing<String>> {
    let key = prompt_secret("User key", "User key")?;
    vault::validate_user_key(&key)?;

    if confirm {
        let again = prompt_secret("Confirm user key", "User key")?;
        if *again != *key {
            anyhow::bail!("User keys do not match");
        }
    }

    Ok(key)
}

pub fn show_progress<F, T>(
    unicode_support: bool,
    message: &'static str,
    f: F,
) -> Result<(T, Duration)>
where
    F: FnOnce() -> Result<T>,
{
    let term = Term::stderr();
    term.hide_cursor().ok();

    let pb = ProgressBar::new_spinner();

    if unicode_support {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"]),
        );
    } else {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("-\\|/-"),
        );
    }

    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));

    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();

    pb.finish_and_clear();
    term.show_cursor().ok();

    result.map(|r| (r, elapsed))
}

pub fn display_passwords(
    passwords: &[(Zeroizing<String>, StrengthResult)],
    config: &PasswordConfig,
    options: &DisplayOptions,
) {
    if options.quiet {
        for (password, _) in passwords {
            println!("{}", &**password);
        }
        return;
    }

    for (i, (password, _)) in passwords.iter().enumerate() {
        println!("Out[{}]:\n{}", i, &**password);
    }
    println!();

    display_settings(config, options);

    if let Some((password, result)) = passwords.first() {
        display_stats(result, password.chars().count(), options);
    }
}

fn display_settings(config: &PasswordConfig, options: &DisplayOptions) {
    let (mid, last) = options.branches();
    let (check_ok, check_warn) = get_status_symbols(options.unicode_support);

    let length_secure = config.length >= MIN_SAFE_PASSWORD_LENGTH;
    let length_style = options.style(if length_secure {
        Style::new().green()
    } else {
        Style::new().yellow()
    });
    let length_status = if length_secure { check_ok } else { check_warn };

    let flag = |enabled: bool| if enabled { "on" } else { "off" };

    println!("Settings:");
    println!(
        "  {} Length     {} {}",
        mid,
        length_style.apply_to(format!("[{}]", length_status)),
        length_style.apply_to(config.length)
    );
    println!("  {} Uppercase  {}", mid, flag(config.include_uppercase));
    println!("  {} Lowercase  {}", mid, flag(config.include_lowercase));
    println!("  {} Numbers    {}", mid, flag(config.include_numbers));
    println!("  {} Symbols    {}", mid, flag(config.include_special_chars));
    println!(
        "  {} Similar    {}",
        mid,
        if config.exclude_similar {
            "excluded"
        } else {
            "allowed"
        }
    );
    println!("  {} Charset    {} chars", mid, config.charset().len());
    println!("  {} Sampling   Unbiased rejection", last);
    println!();
}

fn display_stats(result: &StrengthResult, length: usize, options: &DisplayOptions) {
    let (mid, last) = options.branches();
    let (check_ok, check_warn) = get_status_symbols(options.unicode_support);

    let entropy_style = options.style(if result.entropy >= MIN_SAFE_ENTROPY {
        Style::new().green()
    } else {
        Style::new().yellow()
    });
    let entropy_status = if result.entropy >= MIN_SAFE_ENTROPY {
        check_ok
    } else {
        check_warn
    };

    let verdict_style = options.style(strength_style(result.strength));
    let strength_status = match result.strength {
        Strength::Strong | Strength::VeryStrong => check_ok,
        Strength::Weak | Strength::Medium => check_warn,
    };

    println!("Stats:");
    println!(
        "  {} Entropy    {} {} bits",
        mid,
        entropy_style.apply_to(format!("[{}]", entropy_status)),
        entropy_style.apply_to(format!("{:.1}", result.entropy))
    );
    println!(
        "  {} Length     {} {}",
        mid,
        length,
        plural(length, "char", "chars")
    );
    println!("  {} Score      {}/7", mid, result.score);
    println!("  {} Crack time {}", last, result.crack_time);

    println!(
        "\n{} Strength: {}",
        verdict_style.apply_to(format!("[{}]", strength_status)),
        verdict_style.apply_to(result.strength)
    );
}

pub fn display_strength(password: &str, result: &StrengthResult, options: &DisplayOptions) {
    if options.quiet {
        println!("{}", result.strength);
        return;
    }

    let (mid, last) = options.branches();
    let (check_ok, _) = get_status_symbols(options.unicode_support);
    let classes = CharClasses::of(password);
    let length = password.chars().count();

    let present = |yes: bool| if yes { check_ok } else { "-" };

    println!("Classes:");
    println!("  {} Uppercase  [{}]", mid, present(classes.uppercase));
    println!("  {} Lowercase  [{}]", mid, present(classes.lowercase));
    println!("  {} Numbers    [{}]", mid, present(classes.digits));
    println!("  {} Symbols    [{}]", last, present(classes.special));
    println!();

    if !result.feedback.is_empty() {
        println!("Feedback:");
        let count = result.feedback.len();
        for (i, line) in result.feedback.iter().enumerate() {
            let branch = if i + 1 == count { last } else { mid };
            println!("  {} {}", branch, line);
        }
        println!();
    }

    display_stats(result, length, options);
}

pub fn display_text_stats(stats: &TextStats, options: &DisplayOptions) {
    let (mid, last) = options.branches();

    if options.quiet {
        println!("{}", stats.words);
        return;
    }

    println!("Text:");
    println!("  {} Words         {}", mid, stats.words);
    println!("  {} Characters    {}", mid, stats.characters);
    println!("  {} No spaces     {}", mid, stats.characters_no_spaces);
    println!("  {} Lines         {}", mid, stats.lines);
    println!("  {} Paragraphs    {}", mid, stats.paragraphs);
    println!("  {} Sentences     {}", mid, stats.sentences);
    println!(
        "  {} Words/sentence {:.1}",
        last, stats.average_words_per_sentence
    );
}
