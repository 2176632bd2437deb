use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use heatmiser_rs::dcb::parse_field_value;
use heatmiser_rs::logging::{init_logger_with_level, log_info};
use heatmiser_rs::util::{format_hex_compact, hex_dump, parse_hex};
use heatmiser_rs::{ConnectionConfig, DecodedRecord, DeviceSession, TcpTransport, WriteMode};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "heatmiser-cli")]
#[command(about = "CLI tool for Heatmiser V3 network thermostats")]
struct Cli {
    /// Thermostat hostname or IP address
    host: String,
    #[arg(short, long, default_value = "8068")]
    port: u16,
    #[arg(long, default_value = "0")]
    pin: u16,
    #[arg(long, default_value = "5")]
    timeout_secs: u64,
    /// Do not wait for write acknowledgements
    #[arg(long)]
    no_ack: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every field the thermostat reports
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print one field
    Read { param: String },
    /// Set one field, printing it before and after
    Write { param: String, value: String },
    /// Set the thermostat clock to this machine's local time
    Time,
    /// Print the raw DCB bytes
    Dump,
    /// Write raw bytes at a DCB write address, e.g. `poke 21 01`
    Poke { address: u16, data: String },
}

fn print_field(record: &DecodedRecord, param: &str) -> anyhow::Result<()> {
    match record.get(param) {
        Some(value) if value.is_group() => println!("{param}:\n{value}"),
        Some(value) => println!("{param} = {value}"),
        None => bail!("'{param}' is not reported by this {} thermostat", record.model()),
    }
    Ok(())
}

async fn run(session: &mut DeviceSession<TcpTransport>, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::List { json } => {
            let record = session.read().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print!("{record}");
            }
        }
        Commands::Read { param } => {
            let record = session.read().await?;
            print_field(&record, &param)?;
        }
        Commands::Write { param, value } => {
            let before = session.read().await?;
            print_field(&before, &param)?;
            let value = parse_field_value(&param, &value)?;
            session
                .write(&param, value)
                .await
                .with_context(|| format!("writing '{param}'"))?;
            let after = session.read().await?;
            print_field(&after, &param)?;
        }
        Commands::Time => {
            session.read().await?;
            session.set_clock().await?;
            let record = session.read().await?;
            print_field(&record, "clock")?;
        }
        Commands::Dump => {
            let dcb = session.read_dcb().await?;
            println!("{}", hex_dump(&dcb, 16));
        }
        Commands::Poke { address, data } => {
            let data = parse_hex(&data).with_context(|| format!("parsing '{data}'"))?;
            session.write_dcb(address, &data).await?;
            println!("{address} <- [{}]", format_hex_compact(&data));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger_with_level("warn");

    let cli = Cli::parse();
    let write_mode = if cli.no_ack {
        WriteMode::FireAndForget
    } else {
        WriteMode::Acknowledged
    };
    let config = ConnectionConfig::new(&cli.host)
        .with_port(cli.port)
        .with_pin(cli.pin)
        .with_timeout(Duration::from_secs(cli.timeout_secs))
        .with_write_mode(write_mode);

    let mut session = DeviceSession::connect(&config)
        .await
        .with_context(|| format!("connecting to {}:{}", cli.host, cli.port))?;
    let result = run(&mut session, cli.command).await;
    session.disconnect().await?;
    log_info("Disconnected");
    result
}
