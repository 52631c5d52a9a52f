//! Sheetcalc - command-line front end for the spreadsheet engine

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use log::debug;
use sheetcalc_core::{CellValue, SheetConfig, Spreadsheet};
use sheetcalc_engine::engine::Formula;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::env;
use std::path::PathBuf;

fn print_usage() {
    eprintln!("Usage: sheetcalc [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Spreadsheet file to open (.json)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <FORMULA>   Evaluate a formula and print the result");
    eprintln!("  -s, --set <NAME=CONTENT>  Set a cell before printing (can be repeated)");
    eprintln!("  -o, --output <FILE>       Save the spreadsheet as JSON (non-interactive)");
    eprintln!("  --config <FILE>           Load settings from TOML file");
    eprintln!("  -v, --verbose             Log recalculation details");
    eprintln!("  -h, --help                Print help");
}

#[derive(Default)]
struct Options {
    file_path: Option<PathBuf>,
    command: Option<String>,
    edits: Vec<String>,
    output_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
    verbose: bool,
}

/// Returns `None` when help was requested.
fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        let mut value = |flag: &str| -> Result<String> {
            i += 1;
            match args.get(i) {
                Some(v) => Ok(v.clone()),
                None => bail!("{} requires a value", flag),
            }
        };
        match arg {
            "-h" | "--help" => return Ok(None),
            "-c" | "--command" => options.command = Some(value("--command")?),
            "-s" | "--set" => options.edits.push(value("--set")?),
            "-o" | "--output" => options.output_file = Some(PathBuf::from(value("--output")?)),
            "--config" => options.config_file = Some(PathBuf::from(value("--config")?)),
            "-v" | "--verbose" => options.verbose = true,
            arg if arg.starts_with('-') => bail!("Unknown option: {}", arg),
            _ => {
                if options.file_path.is_some() {
                    bail!("Unexpected argument: {}", arg);
                }
                options.file_path = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    Ok(Some(options))
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "sheetcalc")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

fn load_config(explicit: Option<&PathBuf>) -> Result<SheetConfig> {
    if let Some(path) = explicit {
        return SheetConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }
    match user_config_path() {
        Some(path) if path.exists() => {
            debug!("using config {}", path.display());
            SheetConfig::load(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))
        }
        _ => Ok(SheetConfig::default()),
    }
}

fn open_sheet(config: &SheetConfig, file_path: Option<&PathBuf>) -> Result<Spreadsheet> {
    match file_path {
        Some(path) if path.exists() => config
            .open(path)
            .with_context(|| format!("Failed to open {}", path.display())),
        Some(path) => {
            let mut sheet = config.build()?;
            sheet.set_file_path(path);
            Ok(sheet)
        }
        None => Ok(config.build()?),
    }
}

fn run(options: Options) -> Result<()> {
    if let Some(text) = &options.command {
        let formula: Formula = text.parse()?;
        println!("{}", CellValue::from(formula.evaluate(|_| None)));
        return Ok(());
    }

    let config = load_config(options.config_file.as_ref())?;
    let mut sheet = open_sheet(&config, options.file_path.as_ref())?;

    for edit in &options.edits {
        let Some((name, content)) = edit.split_once('=') else {
            bail!("Expected NAME=CONTENT, got {:?}", edit);
        };
        let order = sheet
            .set_contents_of_cell(name.trim(), content)
            .with_context(|| format!("Failed to set {}", name.trim()))?;
        debug!("{} changed, recalculated {:?}", name.trim(), order);
    }

    if let Some(output_path) = &options.output_file {
        sheet.save(output_path)?;
        println!("Saved to {}", output_path.display());
        return Ok(());
    }

    for name in sheet.get_names_of_all_nonempty_cells() {
        let contents = sheet.get_cell_contents(&name)?;
        let value = sheet.get_cell_value(&name)?;
        println!("{}: {} => {}", name, contents, value);
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    let level = if options.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(e) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    if let Err(e) = run(options) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
