use std::io::Read;

use napkin_core::{Analysis, DetectionInput, Engine, NapkinConfig};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Napkin(napkin_core::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Napkin(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<napkin_core::Error> for CliError {
    fn from(value: napkin_core::Error) -> Self {
        Self::Napkin(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

const USAGE: &str = "Usage: napkin-cli analyze <detections.json|-> [--config <config.json>] [-o <out.json>] [--pretty]";

#[derive(Debug, Default)]
struct Args {
    input: Option<String>,
    output: Option<String>,
    config: Option<String>,
    pretty: bool,
}

impl Args {
    fn parse(mut argv: std::env::Args) -> Result<Self, CliError> {
        // argv[0] is the binary path.
        let _ = argv.next();

        let mut args = Args::default();
        let mut saw_command = false;
        while let Some(arg) = argv.next() {
            match arg.as_str() {
                "analyze" if !saw_command => saw_command = true,
                "-o" | "--output" => {
                    args.output = Some(argv.next().ok_or(CliError::Usage(USAGE))?);
                }
                "--config" => {
                    args.config = Some(argv.next().ok_or(CliError::Usage(USAGE))?);
                }
                "--pretty" => args.pretty = true,
                "-h" | "--help" => return Err(CliError::Usage(USAGE)),
                _ if args.input.is_none() => args.input = Some(arg),
                _ => return Err(CliError::Usage(USAGE)),
            }
        }
        if args.input.is_none() {
            return Err(CliError::Usage(USAGE));
        }
        Ok(args)
    }
}

fn read_input(path: &str) -> Result<String, CliError> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn run() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse(std::env::args())?;

    let config = match &args.config {
        Some(path) => NapkinConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => NapkinConfig::default(),
    };

    let input_path = args.input.as_deref().unwrap_or("-");
    let input = DetectionInput::from_json_str(&read_input(input_path)?)?;

    let engine = Engine::with_config(config);
    let analysis: Analysis = engine.analyze(&input);

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&analysis)?
    } else {
        serde_json::to_string(&analysis)?
    };

    match &args.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => println!("{rendered}"),
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
