// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, bail};
use clientdesk_api::{HttpBackend, MemoryBackend};
use clientdesk_app::{Backend, Console};
use config::Config;
use runtime::ThreadedRuntime;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    match options.action {
        Action::Help => {
            print_help();
            return Ok(());
        }
        Action::PrintConfigPath => {
            println!("{}", options.config_path.display());
            return Ok(());
        }
        Action::PrintExampleConfig => {
            print!("{}", Config::example_config(&options.config_path));
            return Ok(());
        }
        Action::Check | Action::Launch => {}
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `clientdesk --print-example-config` for a template",
            options.config_path.display()
        )
    })?;
    logging::init_logging(&config.log_path()?, config.log_filter())?;

    let backend = open_backend(&options, &config)?;
    if options.action == Action::Check {
        return Ok(());
    }

    let mut console = Console::new();
    let mut runtime = ThreadedRuntime::new(backend, config.notice_timeout()?);
    clientdesk_tui::run_app(&mut console, &mut runtime)
}

/// Builds the backend the console talks to. `--check` against a real API
/// also pings its health endpoint.
fn open_backend(options: &CliOptions, config: &Config) -> Result<Arc<dyn Backend>> {
    if options.demo {
        info!("using in-memory demo registry");
        return Ok(Arc::new(MemoryBackend::demo()));
    }

    let base_url = match &options.api_base {
        Some(url) => url.clone(),
        None => config.api_base_url(),
    };
    let http = HttpBackend::new(&base_url, config.api_timeout()?).with_context(|| {
        format!(
            "bad API settings in {}; fix [api] or pass --api-base",
            options.config_path.display()
        )
    })?;
    if options.action == Action::Check {
        http.health()?;
        println!("ok: {}", http.base_url());
    }
    info!(base_url = http.base_url(), "using registry API");
    Ok(Arc::new(http))
}

/// What the invocation should do once flags are parsed. `--help` wins over
/// everything else; otherwise the last action flag counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Action {
    #[default]
    Launch,
    Check,
    PrintConfigPath,
    PrintExampleConfig,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    api_base: Option<String>,
    demo: bool,
    action: Action,
}

impl CliOptions {
    fn set_action(&mut self, action: Action) {
        if self.action != Action::Help {
            self.action = action;
        }
    }
}

fn parse_cli_args<I, S>(args: I, config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path,
        api_base: None,
        demo: false,
        action: Action::Launch,
    };

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let flag = arg.as_ref();
        match flag {
            "--config" | "--api-base" => {
                let Some(value) = args.next() else {
                    bail!("{flag} needs a value; see --help");
                };
                let value = value.as_ref().to_owned();
                if flag == "--config" {
                    options.config_path = PathBuf::from(value);
                } else {
                    options.api_base = Some(value);
                }
            }
            "--demo" => options.demo = true,
            "--check" => options.set_action(Action::Check),
            "--print-config-path" => options.set_action(Action::PrintConfigPath),
            "--print-example-config" => options.set_action(Action::PrintExampleConfig),
            "--help" | "-h" => options.set_action(Action::Help),
            unknown => bail!("unknown argument {unknown:?}; run with --help to see supported options"),
        }
    }

    Ok(options)
}

fn print_help() {
    println!("clientdesk: inline-editable client registry");
    println!();
    println!("usage: clientdesk [options]");
    println!("  --config <path>          Read config from <path>");
    println!("  --api-base <url>         Registry API base URL (overrides config and CLIENTDESK_API_BASE)");
    println!("  --demo                   Use an in-memory registry seeded with sample clients");
    println!("  --check                  Load config, reach the API health endpoint, then exit");
    println!("  --print-config-path      Show which config file would be read");
    println!("  --print-example-config   Print a commented config template");
    println!("  -h, --help               Show this message");
}

#[cfg(test)]
mod tests {
    use super::{Action, CliOptions, parse_cli_args};
    use anyhow::Result;
    use std::path::PathBuf;

    fn fallback_path() -> PathBuf {
        PathBuf::from("/tmp/clientdesk/config.toml")
    }

    #[test]
    fn no_arguments_launch_with_fallback_config() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), fallback_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: fallback_path(),
                api_base: None,
                demo: false,
                action: Action::Launch,
            }
        );
        Ok(())
    }

    #[test]
    fn value_flags_override_config_and_api() -> Result<()> {
        let options = parse_cli_args(
            [
                "--config",
                "/etc/clientdesk.toml",
                "--api-base",
                "http://10.0.0.5:8000",
            ],
            fallback_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/etc/clientdesk.toml"));
        assert_eq!(options.api_base.as_deref(), Some("http://10.0.0.5:8000"));
        assert_eq!(options.action, Action::Launch);
        Ok(())
    }

    #[test]
    fn value_flags_without_value_fail() {
        for flag in ["--config", "--api-base"] {
            let error = parse_cli_args([flag], fallback_path())
                .expect_err("dangling flag should fail");
            assert_eq!(error.to_string(), format!("{flag} needs a value; see --help"));
        }
    }

    #[test]
    fn unknown_argument_points_at_help() {
        let error =
            parse_cli_args(["--verbose"], fallback_path()).expect_err("unknown flag should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument \"--verbose\""));
        assert!(message.contains("--help"));
    }

    #[test]
    fn last_action_flag_wins_and_demo_combines() -> Result<()> {
        let options = parse_cli_args(
            ["--print-config-path", "--demo", "--check"],
            fallback_path(),
        )?;
        assert!(options.demo);
        assert_eq!(options.action, Action::Check);

        let options = parse_cli_args(["--check", "--print-example-config"], fallback_path())?;
        assert_eq!(options.action, Action::PrintExampleConfig);
        Ok(())
    }

    #[test]
    fn help_beats_other_actions() -> Result<()> {
        let short = parse_cli_args(["-h", "--check"], fallback_path())?;
        assert_eq!(short.action, Action::Help);

        let long = parse_cli_args(["--demo", "--help"], fallback_path())?;
        assert_eq!(long.action, Action::Help);
        Ok(())
    }
}
