//! toastguard - show a Windows toast notification from the command line
//!
//! Every argument is validated before anything is displayed; see the library
//! docs for the rules.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use toastguard::core::request::check_command_line;
use toastguard::security::LocalFiles;
use toastguard::toast;
use toastguard::{Category, RawRequest, RequestGuard, ToastConfig, ToastError, ToastPayload};

const EXAMPLES: &str = r#"Examples:
  toastguard -m "Hello World" -s "MyApp"
  toastguard -m "Meeting in 5 minutes" -s "Calendar" -t "Reminder" --type reminder
  toastguard -m "Custom notification" -s "MyApp" -i "C:\icon.png" -a "C:\sound.wav""#;

#[derive(Debug, Parser)]
#[command(name = "toastguard", version)]
#[command(args_override_self = true)]
#[command(about = "Shows Windows toast notifications with custom text, title, icon, and sound", long_about = None)]
#[command(after_help = EXAMPLES)]
struct Cli {
    /// Notification message to display
    #[arg(short, long, allow_hyphen_values = true, required_unless_present = "dump_config")]
    message: Option<String>,

    /// Application name (source of notification)
    #[arg(short, long, allow_hyphen_values = true, required_unless_present = "dump_config")]
    source: Option<String>,

    /// Notification title
    #[arg(short, long, allow_hyphen_values = true)]
    title: Option<String>,

    /// Path to PNG icon file
    #[arg(short, long)]
    icon: Option<String>,

    /// Path to WAV audio file
    #[arg(short, long)]
    audio: Option<String>,

    /// Disable notification sound
    #[arg(long)]
    muted: bool,

    /// Notification type
    #[arg(long = "type", value_enum, ignore_case = true, default_value_t = Category::Default)]
    category: Category,

    /// Configuration file (default: <config dir>/toastguard/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the toast XML instead of displaying it
    #[arg(long)]
    print_xml: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn raw_request(&self) -> RawRequest {
        RawRequest {
            message: self.message.clone().unwrap_or_default(),
            source: self.source.clone().unwrap_or_default(),
            title: self.title.clone(),
            icon: self.icon.clone(),
            audio: self.audio.clone(),
            muted: self.muted,
            category: self.category,
        }
    }
}

/// Options whose next argument is a value, never a flag
const VALUE_OPTIONS: &[&str] = &[
    "-m", "--message", "-s", "--source", "-t", "--title", "-i", "--icon", "-a", "--audio", "--type", "--config",
];

/// `/?` is the conventional Windows help switch.
fn normalize_help_alias(args: Vec<OsString>) -> Vec<OsString> {
    let mut normalized = Vec::with_capacity(args.len());
    let mut in_value = false;
    for arg in args {
        let is_alias = !in_value && arg == "/?";
        in_value = !in_value && arg.to_str().is_some_and(|a| VALUE_OPTIONS.contains(&a));
        normalized.push(if is_alias { OsString::from("--help") } else { arg });
    }
    normalized
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    // Only fails if a subscriber is already installed.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run(cli: &Cli) -> Result<(), ToastError> {
    let config = ToastConfig::discover(cli.config.as_deref())?;

    if cli.dump_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let guard = RequestGuard::from_config(&config);
    debug!("Restricted directories: {:?}", guard.policy().restricted_dirs());

    let request = guard.prepare(&cli.raw_request(), &LocalFiles)?;
    let payload = ToastPayload::build(&request)?;

    if cli.print_xml {
        println!("{}", payload.xml());
        return Ok(());
    }

    toast::show(&payload, request.source.as_str(), &config.notification)?;
    println!("Toast notification displayed successfully!");
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<OsString> = std::env::args_os().collect();

    if let Err(e) = check_command_line(args.iter().skip(1)) {
        eprintln!("Error: {e}");
        eprintln!("\nUse --help for usage information.");
        return ExitCode::from(e.exit_code());
    }

    let cli = match Cli::try_parse_from(normalize_help_alias(args)) {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version land here too, on stdout.
            let _ = e.print();
            return if e.use_stderr() { ExitCode::from(1) } else { ExitCode::SUCCESS };
        }
    };

    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_usage_error() => {
            error!("{}", e);
            eprintln!("Error: {e}");
            eprintln!("\nUse --help for usage information.");
            ExitCode::from(e.exit_code())
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Unexpected error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
