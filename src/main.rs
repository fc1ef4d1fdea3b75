use clap::{Args, Parser, Subcommand};
use merchant_gateway::application::dispatcher::Channel;
use merchant_gateway::application::gateway::Gateway;
use merchant_gateway::domain::driver::Outcome;
use merchant_gateway::domain::params::RequestParams;
use merchant_gateway::domain::settings::SettingValue;
use merchant_gateway::interfaces::json::request_reader::{RequestReader, parse_key_value};
use miette::{IntoDiagnostic, Result, miette};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the drivers that can be loaded
    Drivers,
    /// Print a driver's settings after overrides are applied
    Settings(DriverArgs),
    /// Submit a payment request
    Process(RequestArgs),
    /// Handle a gateway return callback
    Return(RequestArgs),
}

#[derive(Args)]
struct DriverArgs {
    /// Driver name, short (`dummy`) or qualified (`merchant_dummy`)
    #[arg(short, long)]
    driver: String,

    /// Setting override as key=value (repeatable)
    #[arg(long = "setting", value_parser = parse_key_value)]
    settings: Vec<(String, String)>,

    /// JSON file with setting overrides
    #[arg(long)]
    settings_file: Option<PathBuf>,
}

#[derive(Args)]
struct RequestArgs {
    #[command(flatten)]
    driver: DriverArgs,

    /// Request parameter as key=value (repeatable)
    #[arg(short, long = "param", value_parser = parse_key_value)]
    params: Vec<(String, String)>,

    /// JSON file with request parameters
    #[arg(long)]
    params_file: Option<PathBuf>,

    /// The request arrived over an encrypted transport
    #[arg(long)]
    secure: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Drivers => {
            let drivers = Gateway::new().list_valid_drivers().await.into_diagnostic()?;
            for driver in drivers {
                writeln!(out, "{driver}").into_diagnostic()?;
            }
        }
        Command::Settings(args) => {
            let gateway = open_gateway(&args, Channel::Unverified).await?;
            let settings = gateway
                .settings()
                .ok_or_else(|| miette!("no payment driver is loaded"))?;
            serde_json::to_writer_pretty(&mut out, settings).into_diagnostic()?;
            writeln!(out).into_diagnostic()?;
        }
        Command::Process(args) => {
            let gateway = open_gateway(&args.driver, channel(args.secure)).await?;
            let outcome = gateway
                .process(request_params(&args)?)
                .await
                .into_diagnostic()?;
            write_outcome(outcome, &mut out)?;
        }
        Command::Return(args) => {
            let gateway = open_gateway(&args.driver, channel(args.secure)).await?;
            let outcome = gateway
                .process_return(request_params(&args)?)
                .await
                .into_diagnostic()?;
            write_outcome(outcome, &mut out)?;
        }
    }

    Ok(())
}

fn channel(secure: bool) -> Channel {
    if secure {
        Channel::Secure
    } else {
        Channel::Unverified
    }
}

async fn open_gateway(args: &DriverArgs, channel: Channel) -> Result<Gateway> {
    let mut gateway = Gateway::new().with_channel(channel);
    gateway.try_load(&args.driver).await.into_diagnostic()?;

    // File overrides first, so individual --setting flags win.
    let mut overrides: BTreeMap<String, SettingValue> = match &args.settings_file {
        Some(path) => {
            let file = File::open(path).into_diagnostic()?;
            RequestReader::new(file).settings().into_diagnostic()?
        }
        None => BTreeMap::new(),
    };
    for (key, value) in &args.settings {
        overrides.insert(key.clone(), SettingValue::from(value.as_str()));
    }

    gateway.initialize(&overrides).into_diagnostic()?;
    Ok(gateway)
}

fn request_params(args: &RequestArgs) -> Result<RequestParams> {
    let mut params = match &args.params_file {
        Some(path) => {
            let file = File::open(path).into_diagnostic()?;
            RequestReader::new(file).params().into_diagnostic()?
        }
        None => RequestParams::new(),
    };
    params.extend(args.params.iter().cloned());
    Ok(params)
}

fn write_outcome<W: Write>(outcome: Outcome, out: &mut W) -> Result<()> {
    match outcome {
        Outcome::Complete(response) => {
            serde_json::to_writer_pretty(&mut *out, &response).into_diagnostic()?;
            writeln!(out).into_diagnostic()?;
        }
        Outcome::Redirect(redirect) => {
            redirect.write_to(out).into_diagnostic()?;
        }
    }
    Ok(())
}
