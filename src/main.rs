use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::collections::BTreeMap;
use std::ffi::OsString;
use unisender::response::remote_error;
use unisender::{Client, ClientConfig, Param, Params};

/// unisender - UniSender API command-line client
///
/// Calls any UniSender API method and prints the JSON response.
///
/// Examples:
///   unisender call getLists
///   unisender call createList title="Weekly news"
///   unisender subscribe 1,2 --email user@example.com fields[Name]=Ann
#[derive(Parser, Debug)]
#[command(author, version = env!("UNISENDER_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API key (also via UNISENDER_API_KEY)
    #[arg(long, env = "UNISENDER_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Attempts per call, alternating between the two API hosts
    #[arg(long, value_name = "N", default_value_t = unisender::config::DEFAULT_RETRY_COUNT, global = true)]
    retry_count: u32,

    /// Per-attempt timeout in seconds (default 10)
    #[arg(long, value_name = "SECONDS", global = true)]
    timeout: Option<u64>,

    /// Encoding of non-UTF-8 parameter values, e.g. windows-1251
    #[arg(long, value_name = "LABEL", global = true)]
    encoding: Option<String>,

    /// Send the request body bzip2-compressed
    #[arg(long, global = true)]
    compression: bool,

    /// Ask the service to run the method in test mode
    #[arg(long, global = true)]
    test_mode: bool,

    #[arg(long, value_name = "URL", hide = true, global = true)]
    primary_host: Option<String>,

    #[arg(long, value_name = "URL", hide = true, global = true)]
    fallback_host: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Call an API method by name
    Call(CallArgs),

    /// Subscribe an email and/or phone to mailing lists
    Subscribe(SubscribeArgs),
}

#[derive(clap::Args, Debug)]
struct CallArgs {
    /// Method name, e.g. getLists
    #[arg(value_name = "METHOD")]
    method: String,

    /// Parameters as KEY=VALUE; KEY[SUB]=VALUE builds a nested map
    #[arg(value_name = "KEY=VALUE")]
    params: Vec<OsString>,
}

#[derive(clap::Args, Debug)]
struct SubscribeArgs {
    /// Comma-separated list ids
    #[arg(value_name = "LIST_IDS")]
    list_ids: String,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    /// Extra parameters as KEY=VALUE
    #[arg(value_name = "KEY=VALUE")]
    params: Vec<OsString>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let client = Client::new(build_config(&cli)?)?;

    let response = match cli.command {
        Commands::Call(args) => {
            client
                .call(&args.method, parse_params(args.params)?)
                .await?
        }
        Commands::Subscribe(args) => {
            let mut extra = parse_params(args.params)?;
            let mut fields = match extra.remove("fields") {
                Some(Param::Map(fields)) => fields,
                Some(_) => bail!("'fields' must be given as fields[NAME]=VALUE"),
                None => Params::new(),
            };
            if let Some(email) = args.email {
                fields.insert("email", email);
            }
            if let Some(phone) = args.phone {
                fields.insert("phone", phone);
            }
            client.subscribe(&args.list_ids, fields, extra).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&response)?);

    if let Some(err) = remote_error(&response) {
        return Err(err.into());
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let api_key = cli
        .api_key
        .clone()
        .context("No API key given; pass --api-key or set UNISENDER_API_KEY")?;

    let mut config = ClientConfig::new(api_key)
        .retry_count(cli.retry_count)
        .compression(cli.compression)
        .test_mode(cli.test_mode);

    if let Some(seconds) = cli.timeout {
        config = config.timeout_secs(seconds);
    }
    if let Some(label) = &cli.encoding {
        config = config.encoding_label(label)?;
    }
    if cli.primary_host.is_some() || cli.fallback_host.is_some() {
        let defaults = unisender::Hosts::default();
        config = config.hosts(
            cli.primary_host.clone().unwrap_or(defaults.primary),
            cli.fallback_host.clone().unwrap_or(defaults.fallback),
        );
    }
    Ok(config)
}

/// Parses `KEY=VALUE` and `KEY[SUB]=VALUE` arguments.
///
/// Values that are not valid UTF-8 are passed on as raw bytes for the
/// configured source encoding.
fn parse_params(args: Vec<OsString>) -> Result<Params> {
    let mut params = Params::new();
    let mut nested: BTreeMap<String, Params> = BTreeMap::new();

    for arg in args {
        let (key, value) = split_param(arg)?;
        match key.split_once('[') {
            Some((outer, rest)) => {
                let inner = rest
                    .strip_suffix(']')
                    .filter(|inner| !outer.is_empty() && !inner.is_empty())
                    .ok_or_else(|| anyhow!("Invalid parameter key '{}'", key))?;
                nested
                    .entry(outer.to_string())
                    .or_default()
                    .insert(inner, value);
            }
            None => {
                params.insert(key, value);
            }
        }
    }

    for (key, map) in nested {
        params.insert(key, map);
    }
    Ok(params)
}

fn split_param(arg: OsString) -> Result<(String, Param)> {
    let bytes = os_bytes(arg);
    let eq = bytes
        .iter()
        .position(|b| *b == b'=')
        .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{}'", String::from_utf8_lossy(&bytes)))?;

    let key = std::str::from_utf8(&bytes[..eq])
        .context("Parameter names must be UTF-8")?
        .to_string();
    if key.is_empty() {
        bail!("Empty parameter name in '{}'", String::from_utf8_lossy(&bytes));
    }

    let value = match String::from_utf8(bytes[eq + 1..].to_vec()) {
        Ok(text) => Param::Text(text),
        Err(e) => Param::Raw(e.into_bytes()),
    };
    Ok((key, value))
}

#[cfg(unix)]
fn os_bytes(arg: OsString) -> Vec<u8> {
    use std::os::unix::ffi::OsStringExt;
    arg.into_vec()
}

#[cfg(not(unix))]
fn os_bytes(arg: OsString) -> Vec<u8> {
    arg.to_string_lossy().into_owned().into_bytes()
}
