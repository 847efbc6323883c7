use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ts_model_check::{check_files, load_config, CheckConfig, CheckOptions};

const DEFAULT_CONFIG_FILE: &str = ".ts-model-check.yaml";

#[derive(Debug, Default)]
struct CliOptions {
    backend_model_file: Option<PathBuf>,
    typescript_file: Option<PathBuf>,
    check_blank: bool,
    config_file: Option<PathBuf>,
}

enum RunOutcome {
    Synced,
    Unsynced(usize),
}

fn main() -> ExitCode {
    match run(env::args().collect()) {
        Ok(RunOutcome::Synced) => ExitCode::SUCCESS,
        Ok(RunOutcome::Unsynced(count)) => {
            let issue_or_issues = if count == 1 { "issue" } else { "issues" };
            println!("\nPlease fix the {count} {issue_or_issues} above to have the backend models synced with the TypeScript interfaces.");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<RunOutcome, String> {
    let options = parse_cli_options(&args[1..])?;

    if let (Some(models_path), Some(types_path)) =
        (&options.backend_model_file, &options.typescript_file)
    {
        let check_options = CheckOptions {
            check_blank: options.check_blank,
            ..CheckOptions::default()
        };
        return run_pair(models_path, types_path, &check_options);
    }

    if options.backend_model_file.is_some() || options.typescript_file.is_some() {
        return Err(
            "both --backend-model-file and --typescript-file are required for a one-shot check"
                .to_string(),
        );
    }

    let config_path = options
        .config_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if !config_path.is_file() {
        return Err(format!(
            "no check requested: pass --backend-model-file/--typescript-file or provide {}",
            config_path.display()
        ));
    }

    let config = load_config(&config_path).map_err(|e| e.to_string())?;
    run_configured_checks(&config, options.check_blank)
}

fn run_pair(
    models_path: &Path,
    types_path: &Path,
    options: &CheckOptions,
) -> Result<RunOutcome, String> {
    ensure_file_exists(models_path, "backend models")?;
    ensure_file_exists(types_path, "TypeScript interfaces")?;

    let diagnostics = check_files(models_path, types_path, options).map_err(|e| e.to_string())?;
    report(&diagnostics)
}

fn run_configured_checks(config: &CheckConfig, check_blank: bool) -> Result<RunOutcome, String> {
    if config.checks.is_empty() {
        return Err("config file defines no checks".to_string());
    }

    let options = CheckOptions {
        check_blank: check_blank || config.check_blank,
        name_conversions: config.name_conversions.clone(),
    };

    let mut total = 0usize;
    for check in &config.checks {
        ensure_file_exists(&check.backend_model_path, "backend models")?;
        ensure_file_exists(&check.frontend_interface_path, "TypeScript interfaces")?;

        let found = check_files(
            &check.backend_model_path,
            &check.frontend_interface_path,
            &options,
        )
        .map_err(|e| format!("check '{}': {e}", check.name))?;

        // Each check's diagnostics print under its own header.
        if !found.is_empty() {
            println!("\nCheck '{}' is out of sync:", check.name);
            for message in &found {
                println!("{message}");
            }
            total += found.len();
        }
    }

    if total == 0 {
        println!("Success: all models are synced with their corresponding TypeScript interfaces.");
        return Ok(RunOutcome::Synced);
    }

    Ok(RunOutcome::Unsynced(total))
}

fn report(diagnostics: &[String]) -> Result<RunOutcome, String> {
    if diagnostics.is_empty() {
        println!("Success: all models are synced with their corresponding TypeScript interfaces.");
        return Ok(RunOutcome::Synced);
    }

    for message in diagnostics {
        println!("{message}");
    }

    Ok(RunOutcome::Unsynced(diagnostics.len()))
}

fn ensure_file_exists(path: &Path, role: &str) -> Result<(), String> {
    if path.is_file() {
        Ok(())
    } else {
        Err(format!(
            "{} that should contain the {role} does not exist. Please check and try again.",
            path.display()
        ))
    }
}

fn parse_cli_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "-v" | "--version" => {
                println!("ts-model-check {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "-bmf" | "--backend-model-file" => {
                options.backend_model_file = Some(expect_value(args, &mut i)?);
            }
            "-tsf" | "--typescript-file" => {
                options.typescript_file = Some(expect_value(args, &mut i)?);
            }
            "--check-blank" => options.check_blank = true,
            "--config" => {
                options.config_file = Some(expect_value(args, &mut i)?);
            }
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
        i += 1;
    }

    Ok(options)
}

fn expect_value(args: &[String], i: &mut usize) -> Result<PathBuf, String> {
    let flag = args[*i].clone();
    *i += 1;
    args.get(*i)
        .map(PathBuf::from)
        .ok_or_else(|| format!("{flag} requires a path argument"))
}

fn print_usage() {
    eprintln!(
        "Usage:\n  ts-model-check -bmf <models.py> -tsf <types.ts> [--check-blank]\n  ts-model-check [--config <path>] [--check-blank]\n  ts-model-check --version\n\nOptions:\n  -bmf, --backend-model-file <path>  Path to the backend model file.\n  -tsf, --typescript-file <path>     Path to the TypeScript interface file.\n      --check-blank                  Also check that blank=True fields are optional.\n      --config <path>                Configuration file (default {DEFAULT_CONFIG_FILE}).\n  -v, --version                      Show the version.\n  -h, --help                         Show this help message."
    );
}
