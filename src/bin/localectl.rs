use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use url::Url;

use locale_router::config::{load_config, validate_config, ConfigError, SiteConfig};
use locale_router::locale::{parse_accept_language, Locale, LocaleRegistry};
use locale_router::routing::{LocaleEngine, RequestContext};

#[derive(Parser)]
#[command(name = "localectl")]
#[command(about = "Offline inspection of locale routing decisions", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Built-in defaults when absent.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a request and print the decision
    Resolve {
        /// Absolute URL or path (query and fragment allowed)
        target: String,
        /// Stored locale preference (cookie value)
        #[arg(long)]
        stored: Option<String>,
        /// Raw Accept-Language header
        #[arg(long)]
        accept_language: Option<String>,
    },
    /// Print SEO links for a page
    Seo {
        /// Path without locale prefix, e.g. /posts/my-slug
        remainder: String,
        /// Locale code; the default locale when absent or unsupported
        #[arg(long)]
        locale: Option<String>,
        /// Print HTML tags instead of JSON
        #[arg(long)]
        html: bool,
    },
    /// Format numbers and a date with a locale's rules
    Format {
        /// Locale code; the default locale when absent or unsupported
        #[arg(long)]
        locale: Option<String>,
        /// Number to format (repeatable)
        #[arg(long = "number", allow_negative_numbers = true)]
        numbers: Vec<f64>,
        /// Date to format, as YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print the static route table
    Routes,
    /// Validate the configuration and list every problem
    Check,
}

/// Path, query and fragment split out of a CLI target.
struct Target {
    origin: Option<String>,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl Target {
    fn parse(raw: &str) -> Self {
        if let Ok(url) = Url::parse(raw) {
            let origin = url.host_str().map(|host| match url.port() {
                Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
                None => format!("{}://{}", url.scheme(), host),
            });
            return Self {
                origin,
                path: url.path().to_string(),
                query: url.query().map(str::to_string),
                fragment: url.fragment().map(str::to_string),
            };
        }

        let (rest, fragment) = match raw.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (raw, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (rest, None),
        };
        Self {
            origin: None,
            path: path.to_string(),
            query,
            fragment,
        }
    }
}

fn load(cli_config: Option<&PathBuf>) -> Result<SiteConfig, ConfigError> {
    match cli_config {
        Some(path) => load_config(path),
        None => Ok(SiteConfig::default()),
    }
}

/// Formatted values for one locale.
#[derive(Serialize)]
struct Formatted<'a> {
    locale: &'a Locale,
    numbers: Vec<String>,
    date: Option<String>,
}

/// `locale_or_default`, warning when a requested code is not supported.
fn pick_locale<'r>(registry: &'r LocaleRegistry, code: Option<&str>) -> &'r Locale {
    let locale = registry.locale_or_default(code);
    if let Some(code) = code.filter(|c| *c != locale.code()) {
        eprintln!("warning: unsupported locale '{}', using '{}'", code, locale.code());
    }
    locale
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let engine = || -> Result<LocaleEngine, ConfigError> {
        LocaleEngine::from_config(&load(cli.config.as_ref())?)
    };

    match cli.command {
        Commands::Resolve {
            target,
            stored,
            accept_language,
        } => {
            let engine = engine()?;
            let target = Target::parse(&target);
            let browser = accept_language
                .as_deref()
                .map(parse_accept_language)
                .unwrap_or_default();
            let ctx = RequestContext {
                path: &target.path,
                query: target.query.as_deref(),
                fragment: target.fragment.as_deref(),
                origin: target.origin.as_deref(),
                stored_locale: stored.as_deref(),
                browser_locales: &browser,
            };
            print_json(&engine.plan(&ctx))?;
        }
        Commands::Seo {
            remainder,
            locale,
            html,
        } => {
            let engine = engine()?;
            let locale = pick_locale(engine.registry(), locale.as_deref());
            let links = engine.seo(&remainder, locale);
            if html {
                print!("{}", links.to_html());
            } else {
                print_json(&links)?;
            }
        }
        Commands::Format {
            locale,
            numbers,
            date,
        } => {
            let engine = engine()?;
            let locale = pick_locale(engine.registry(), locale.as_deref());
            let rules = locale.format();
            print_json(&Formatted {
                locale,
                numbers: numbers.iter().map(|n| rules.format_number(*n)).collect(),
                date: date.map(|d| rules.format_date(&d)),
            })?;
        }
        Commands::Routes => print_json(&engine()?.static_routes())?,
        Commands::Check => return Ok(check(cli.config.as_ref())),
    }

    Ok(ExitCode::SUCCESS)
}

fn check(path: Option<&PathBuf>) -> ExitCode {
    let config = match load(path) {
        Ok(config) => config,
        Err(ConfigError::Validation(errors)) => {
            for error in &errors {
                eprintln!("error: {}", error);
            }
            eprintln!("{} problem(s) found", errors.len());
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match validate_config(&config) {
        Ok(()) => {
            println!("ok: {} locales, {} legacy routes", config.locales.len(), config.legacy.routes.len());
            ExitCode::SUCCESS
        }
        Err(errors) => {
            for error in &errors {
                eprintln!("error: {}", error);
            }
            eprintln!("{} problem(s) found", errors.len());
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
