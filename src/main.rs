use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use actionpad::config::{self, Config};
use actionpad::core::{Engine, Execution, InputSlot};
use actionpad::domain::{EngineError, UserInputs};
use actionpad::infrastructure::{AlloyCodec, AlloyGateway, ProviderConfig};
use actionpad::store::{ButtonLibrary, StoredButton};

#[derive(Debug, Parser)]
#[command(
    name = "actionpad",
    version,
    about = "Run EVM contract action buttons from JSON definitions"
)]
struct Args {
    /// Config file (defaults to ~/.config/actionpad/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ad-hoc endpoint (http(s)://, ws(s):// or an IPC path), overrides configured chains
    #[arg(long, global = true)]
    rpc: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the function a button calls and the inputs it still needs
    Inspect {
        /// Button file or directory (defaults to the configured buttons_dir)
        file: Option<PathBuf>,

        #[arg(long)]
        name: Option<String>,
    },
    /// Resolve arguments and execute a button
    Run {
        /// Button file or directory (defaults to the configured buttons_dir)
        file: Option<PathBuf>,

        #[arg(long)]
        name: Option<String>,

        /// Argument value as INDEX=VALUE, may be repeated
        #[arg(long = "arg", value_parser = parse_arg_input)]
        args: Vec<(usize, String)>,

        /// Chain id for buttons that ask for one
        #[arg(long)]
        chain: Option<u64>,

        /// Contract address for buttons that ask for one
        #[arg(long)]
        address: Option<String>,

        /// Write the filled argument values back to the button file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<EngineError>() {
                Some(engine_err) => eprintln!("{}: {engine_err}", engine_err.kind()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => config::load_from(path)?,
        None => config::load()?,
    };

    match args.command {
        Command::Inspect { file, name } => {
            let library = open_library(file.as_ref(), &config)?;
            let button = library.find(name.as_deref())?;
            let gateway = Arc::new(offline_gateway(&config));
            let engine = Engine::new(gateway.clone(), gateway, config.registry());
            inspect(&engine, button)
        }
        Command::Run {
            file,
            name,
            args: arg_inputs,
            chain,
            address,
            save,
        } => {
            let library = open_library(file.as_ref(), &config)?;
            let button = library.find(name.as_deref())?;
            let gateway = Arc::new(connect_gateway(args.rpc.as_deref(), &config).await?);
            let engine = Engine::new(gateway.clone(), gateway, config.registry());

            let mut inputs = UserInputs::new();
            inputs.chain_id = chain;
            inputs.address = address;
            for (index, value) in arg_inputs {
                inputs = inputs.arg(index, Value::String(value));
            }

            let invocation = engine.run(&button.config, &inputs).await?;
            match &invocation.execution {
                Execution::Read(value) => println!("{}", serde_json::to_string_pretty(value)?),
                Execution::Sent(handle) => println!("{}", handle.hash),
            }

            if save {
                let filled = button.config.with_filled_args(invocation.config.args.clone());
                ButtonLibrary::save(&button.path, &filled)?;
                info!(path = %button.path.display(), "saved arguments");
            }
            Ok(())
        }
    }
}

fn open_library(file: Option<&PathBuf>, config: &Config) -> Result<ButtonLibrary> {
    let path = file
        .or(config.buttons_dir.as_ref())
        .context("no button file given and no buttons_dir configured")?;
    let library = ButtonLibrary::open(path)?;
    for error in &library.errors {
        warn!("{error}");
    }
    if library.is_empty() {
        bail!("no buttons in {}", path.display());
    }
    Ok(library)
}

fn offline_gateway(config: &Config) -> AlloyGateway {
    AlloyGateway::new(Arc::new(AlloyCodec::new()), config.endpoints(), config.active_chain)
        .with_account(config.account.clone())
}

async fn connect_gateway(rpc: Option<&str>, config: &Config) -> Result<AlloyGateway> {
    let gateway = match rpc {
        Some(rpc) => {
            AlloyGateway::connect(Arc::new(AlloyCodec::new()), ProviderConfig::parse(rpc)).await?
        }
        None => offline_gateway(config),
    };
    if config.account.is_some() {
        return Ok(gateway.with_account(config.account.clone()));
    }

    let account = match gateway.node_account().await {
        Ok(account) => account,
        Err(err) => {
            warn!("could not query node accounts: {err:#}");
            None
        }
    };
    Ok(gateway.with_account(account))
}

fn inspect(engine: &Engine, button: &StoredButton) -> Result<()> {
    let config = &button.config;
    let inspection = engine.inspect(config)?;

    println!("button:   {}", config.name);
    println!("file:     {}", button.path.display());
    println!("basis:    {}", inspection.basis);
    if let Some(function) = &inspection.function {
        if function.is_constructor() {
            println!("function: {}", function.signature());
        } else {
            println!(
                "function: {} [{}]",
                function.signature(),
                function.selector_hex()
            );
        }
    }
    if config.read_only {
        println!("mode:     read-only");
    }

    if inspection.pending.is_empty() {
        println!("pending:  none");
        return Ok(());
    }
    println!("pending:");
    for slot in &inspection.pending {
        match slot {
            InputSlot::ChainId => println!("  --chain"),
            InputSlot::Address => println!("  --address"),
            InputSlot::Arg { index, name, ty } => println!("  --arg {index}=<{ty}>  {name}"),
        }
    }
    Ok(())
}

fn parse_arg_input(text: &str) -> Result<(usize, String), String> {
    let (index, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=VALUE, got '{text}'"))?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("invalid argument index '{index}'"))?;
    Ok((index, value.to_string()))
}
