use anyhow::{anyhow, bail, Context, Result};
use crossterm::style::Stylize;
use slotmachine_client::app_paths::AppPaths;
use slotmachine_client::config::client::API_KEY_ENV;
use slotmachine_client::config::settings::Settings;
use slotmachine_client::display::{display_fields, display_simulation, export_spins_to_csv};
use slotmachine_client::{ClientConfigBuilder, QueryOptions, SlotMachineClient};
use std::path::PathBuf;
use std::time::Duration;

fn print_help() {
    println!("{}", "slotmachine - Slot Machine Simulator client".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  slotmachine [OPTIONS]");
    println!();
    println!("{}", "Simulation:".yellow());
    println!("  {}          - Number of spins", "--spins <N>".green());
    println!("  {}          - Reels per spin", "--reels <N>".green());
    println!("  {}            - Bet per spin", "--bet <X>".green());
    println!(
        "  {} - Extra query parameter (repeatable)",
        "--param <key=value>".green()
    );
    println!();
    println!("{}", "Connection:".yellow());
    println!(
        "  {}      - API key (else {}, else config file)",
        "--api-key <KEY>".green(),
        API_KEY_ENV
    );
    println!("  {}     - Override the API base URL", "--base-url <URL>".green());
    println!("  {}    - Request timeout in seconds", "--timeout <SECS>".green());
    println!("  {}        - Retries on network failure (0-3)", "--retries <N>".green());
    println!();
    println!("{}", "Output:".yellow());
    println!("  {}                 - Print the raw JSON response", "--json".green());
    println!("  {}    - Write the spins to a CSV file", "--export <FILE>".green());
    println!("  {}                - Enable debug logging", "--debug".green());
    println!(
        "  {}      - Write a commented config file",
        "--generate-config".green()
    );
    println!("  {}                 - Show this help", "--help".green());
}

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    options: QueryOptions,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    retries: Option<u32>,
    json: bool,
    export: Option<PathBuf>,
    debug: bool,
    generate_config: bool,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("{name} requires a value"))
        };
        match arg.as_str() {
            "--spins" => cli.options.spins = Some(parse_number("--spins", &value("--spins")?)?),
            "--reels" => cli.options.reels = Some(parse_number("--reels", &value("--reels")?)?),
            "--bet" => cli.options.bet = Some(parse_number("--bet", &value("--bet")?)?),
            "--param" => {
                let pair = value("--param")?;
                let (key, val) = pair
                    .split_once('=')
                    .filter(|(k, _)| !k.is_empty())
                    .ok_or_else(|| anyhow!("--param expects key=value, got '{pair}'"))?;
                cli.options.extra.insert(key.to_string(), val.into());
            }
            "--api-key" => cli.api_key = Some(value("--api-key")?),
            "--base-url" => cli.base_url = Some(value("--base-url")?),
            "--timeout" => cli.timeout_secs = Some(parse_number("--timeout", &value("--timeout")?)?),
            "--retries" => cli.retries = Some(parse_number("--retries", &value("--retries")?)?),
            "--export" => cli.export = Some(PathBuf::from(value("--export")?)),
            "--json" => cli.json = true,
            "--debug" => cli.debug = true,
            "--generate-config" => cli.generate_config = true,
            "--help" | "-h" => cli.help = true,
            other => bail!("unknown argument '{other}' (see --help)"),
        }
    }

    Ok(cli)
}

fn parse_number<T: std::str::FromStr>(flag: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| anyhow!("{flag} expects a number, got '{raw}'"))
}

fn generate_config() -> Result<()> {
    let path = AppPaths::config_file()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(&path, Settings::create_default_with_comments())
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Configuration file created at: {}", path.display());
    Ok(())
}

/// Client settings from every source, strongest last: settings file, then
/// environment, then command-line flags.
fn client_builder<F>(cli: &CliArgs, settings: &Settings, env: F) -> ClientConfigBuilder
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = settings.client_builder().apply_env(env);
    if let Some(url) = &cli.base_url {
        builder = builder.base_url(url.clone());
    }
    if let Some(key) = &cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(secs) = cli.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if let Some(retries) = cli.retries {
        builder = builder.max_retries(retries);
    }
    builder
}

fn run(cli: CliArgs) -> Result<bool> {
    let settings = Settings::load_or_default();
    let builder = client_builder(&cli, &settings, |name| std::env::var(name).ok());

    let client = SlotMachineClient::new(builder.build()?)?;
    let response = client.execute(&cli.options)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(response.as_map())?);
    }

    if !response.is_ok() {
        eprintln!(
            "{} {}",
            "API error:".red().bold(),
            response.error_message().unwrap_or("unknown error")
        );
        return Ok(false);
    }

    match response.simulation() {
        Ok(sim) => {
            if !cli.json {
                display_simulation(&sim, &settings.display);
            }
            if let Some(path) = &cli.export {
                export_spins_to_csv(&sim, path)
                    .with_context(|| format!("exporting spins to {}", path.display()))?;
                println!("{}", format!("Spins exported to {}", path.display()).green());
            }
        }
        Err(e) => {
            tracing::warn!(target: "slotmachine", "{e}");
            if cli.export.is_some() {
                bail!("cannot export: {e}");
            }
            if !cli.json {
                if let Some(serde_json::Value::Object(data)) = response.data() {
                    display_fields(data);
                }
            }
        }
    }

    Ok(true)
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if cli.help {
        print_help();
        return;
    }

    slotmachine_client::logging::init_tracing(cli.debug);

    if cli.generate_config {
        if let Err(e) = generate_config() {
            eprintln!("Error writing config file: {e:#}");
            std::process::exit(1);
        }
        return;
    }

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red().bold());
            if let Some(body) = e
                .downcast_ref::<slotmachine_client::ClientError>()
                .and_then(|err| err.body())
            {
                eprintln!("Response body: {body}");
            }
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmachine_client::QueryValue;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_simulation_flags() {
        let cli = parse_args(&args(&[
            "--spins", "5", "--reels", "3", "--bet", "2.5", "--param", "theme=fruit", "--json",
        ]))
        .unwrap();
        assert_eq!(cli.options.spins, Some(5));
        assert_eq!(cli.options.reels, Some(3));
        assert_eq!(cli.options.bet, Some(2.5));
        assert_eq!(cli.options.extra.get("theme"), Some(&QueryValue::from("fruit")));
        assert!(cli.json);
    }

    #[test]
    fn test_parse_connection_flags() {
        let cli = parse_args(&args(&[
            "--api-key", "k", "--base-url", "http://localhost", "--timeout", "5", "--retries", "2",
        ]))
        .unwrap();
        assert_eq!(cli.api_key.as_deref(), Some("k"));
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost"));
        assert_eq!(cli.timeout_secs, Some(5));
        assert_eq!(cli.retries, Some(2));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&["--spins"])).is_err());
        assert!(parse_args(&args(&["--spins", "many"])).is_err());
        assert!(parse_args(&args(&["--param", "novalue"])).is_err());
        assert!(parse_args(&args(&["--param", "=x"])).is_err());
        assert!(parse_args(&args(&["--frobnicate"])).is_err());
    }

    fn env_with<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    fn file_settings() -> Settings {
        let mut settings = Settings::default();
        settings.api.api_key = Some("file-key".to_string());
        settings.api.base_url = "http://file.local".to_string();
        settings.api.timeout_secs = 7;
        settings
    }

    #[test]
    fn test_flags_beat_environment() {
        let cli = parse_args(&args(&[
            "--api-key", "flag-key", "--base-url", "http://flag.local", "--timeout", "2",
        ]))
        .unwrap();
        let env = env_with(&[
            ("APIVERVE_API_KEY", "env-key"),
            ("APIVERVE_BASE_URL", "http://env.local"),
        ]);
        let config = client_builder(&cli, &file_settings(), env).build().unwrap();

        assert_eq!(config.api_key(), "flag-key");
        assert_eq!(config.endpoint().as_str(), "http://flag.local/slotmachine");
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_environment_beats_settings_file() {
        let env = env_with(&[
            ("APIVERVE_API_KEY", "env-key"),
            ("APIVERVE_BASE_URL", "http://env.local"),
        ]);
        let config = client_builder(&CliArgs::default(), &file_settings(), env)
            .build()
            .unwrap();

        assert_eq!(config.api_key(), "env-key");
        assert_eq!(config.endpoint().as_str(), "http://env.local/slotmachine");
        assert_eq!(config.timeout(), Duration::from_secs(7));
    }

    #[test]
    fn test_settings_file_beats_defaults() {
        let config = client_builder(&CliArgs::default(), &file_settings(), env_with(&[]))
            .build()
            .unwrap();

        assert_eq!(config.api_key(), "file-key");
        assert_eq!(config.endpoint().as_str(), "http://file.local/slotmachine");
        assert_eq!(config.timeout(), Duration::from_secs(7));
    }

    #[test]
    fn test_defaults_when_nothing_overrides() {
        let cli = parse_args(&args(&["--api-key", "flag-key"])).unwrap();
        let config = client_builder(&cli, &Settings::default(), env_with(&[]))
            .build()
            .unwrap();

        assert_eq!(
            config.endpoint().as_str(),
            "https://api.apiverve.com/v1/slotmachine"
        );
        assert_eq!(config.max_retries(), 0);
    }

    #[test]
    fn test_no_key_anywhere_fails() {
        let result = client_builder(&CliArgs::default(), &Settings::default(), env_with(&[])).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_args() {
        assert_eq!(parse_args(&[]).unwrap(), CliArgs::default());
    }
}
