//! gatefs command-line client
//!
//! Thin wrapper over the gateway facade: one connect, one operation,
//! one disconnect per invocation. Endpoint and user identity come from
//! flags or the `GATEFS_ENDPOINT`/`GATEFS_USER` environment variables,
//! optionally seeded from a TOML config file.
//!
//! Usage:
//!   gatefs --endpoint mem://localhost:9000 --user hadoop list /demo1
//!   gatefs upload ./h.txt /demo1

use std::io::{Read, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use gatefs::api::{GatewayError, RemoteFileGateway};
use gatefs::config::{defaults, GatewayConfig};

/// Sequential file-operation gateway client
#[derive(Parser)]
#[command(name = "gatefs")]
#[command(about = "File operations against a remote hierarchical storage service")]
struct Args {
    /// Endpoint URI (scheme://host:port); falls back to GATEFS_ENDPOINT
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// User identity; falls back to GATEFS_USER
    #[arg(long, global = true)]
    user: Option<String>,

    /// Optional TOML config file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify that the endpoint can be dialed
    Connect,

    /// Create a file with the given content
    Create {
        /// Remote file path
        path: String,
        /// Initial content
        content: String,
    },

    /// Print a file's contents to stdout
    Read {
        /// Remote file path
        path: String,
    },

    /// Rename a file or directory
    Rename {
        /// Existing remote path
        old: String,
        /// New remote path
        new: String,
    },

    /// Delete a file or directory
    Delete {
        /// Remote path
        path: String,
        /// Remove directory contents as well
        #[arg(long)]
        recursive: bool,
    },

    /// Create a directory
    Mkdir {
        /// Remote directory path
        dir: String,
    },

    /// Upload a local file into a remote directory
    Upload {
        /// Local file path
        local: PathBuf,
        /// Remote directory path
        remote_dir: String,
    },

    /// Download a remote file to a local path
    Download {
        /// Remote file path
        remote: String,
        /// Local destination path
        local: PathBuf,
    },

    /// List a directory
    List {
        /// Remote directory path
        dir: String,
    },
}

fn main() {
    let args = Args::parse();

    // Config file is optional; flags and environment win over it.
    let config = match &args.config {
        Some(path) => match GatewayConfig::from_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("gatefs: config: {}", e);
                std::process::exit(1);
            }
        },
        None => GatewayConfig::default(),
    };

    gatefs::logging::init(&args.log_level);

    let endpoint = resolve(&args.endpoint, defaults::ENDPOINT_ENV, &config.connection.endpoint);
    let user = resolve(&args.user, defaults::USER_ENV, &config.connection.user);

    let (endpoint, user) = match (endpoint, user) {
        (Some(endpoint), Some(user)) => (endpoint, user),
        (None, _) => {
            eprintln!(
                "gatefs: connection: no endpoint given (use --endpoint or {})",
                defaults::ENDPOINT_ENV
            );
            std::process::exit(1);
        }
        (_, None) => {
            eprintln!(
                "gatefs: connection: no user identity given (use --user or {})",
                defaults::USER_ENV
            );
            std::process::exit(1);
        }
    };

    let mut gateway = RemoteFileGateway::with_config(&config);
    if let Err(e) = gateway.connect(&endpoint, &user) {
        fail(&e);
    }

    let result = run(&gateway, &args.command);
    gateway.disconnect();

    if let Err(e) = result {
        fail(&e);
    }
}

/// Flag value, else environment variable, else config file value.
fn resolve(flag: &Option<String>, env_var: &str, from_config: &str) -> Option<String> {
    if let Some(value) = flag {
        return Some(value.clone());
    }
    if let Ok(value) = std::env::var(env_var) {
        if !value.is_empty() {
            return Some(value);
        }
    }
    if !from_config.is_empty() {
        return Some(from_config.to_string());
    }
    None
}

fn run(gateway: &RemoteFileGateway, command: &Command) -> Result<(), GatewayError> {
    match command {
        Command::Connect => {
            let ctx = gateway.context().ok_or(GatewayError::NotConnected)?;
            println!("connected to {} as {}", ctx.endpoint(), ctx.user());
            Ok(())
        }
        Command::Create { path, content } => gateway.create_file(path, content.as_bytes()),
        Command::Read { path } => {
            let mut stream = gateway.read_file(path)?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).map_err(|e| GatewayError::RemoteIo {
                    path: path.clone(),
                    source: e.into(),
                })?;
                if n == 0 {
                    break;
                }
                out.write_all(&buf[..n]).map_err(|e| GatewayError::LocalIo {
                    path: PathBuf::from("stdout"),
                    source: e,
                })?;
            }
            Ok(())
        }
        Command::Rename { old, new } => gateway.rename(old, new),
        Command::Delete { path, recursive } => gateway.delete(path, *recursive),
        Command::Mkdir { dir } => gateway.mkdir(dir),
        Command::Upload { local, remote_dir } => {
            // One dot per transferred chunk, the classic progress bar
            let mut tick = || {
                eprint!(".");
                let _ = std::io::stderr().flush();
            };
            let result = gateway.upload_local_file(local, remote_dir, Some(&mut tick));
            eprintln!();
            result
        }
        Command::Download { remote, local } => gateway.download_remote_file(remote, local),
        Command::List { dir } => {
            for entry in gateway.list(dir)? {
                let kind = if entry.is_dir { "dir " } else { "file" };
                println!(
                    "{} {:>12} {:>3} {}",
                    kind, entry.len, entry.replication, entry.path
                );
            }
            Ok(())
        }
    }
}

/// Print the error kind and message to stderr and exit non-zero.
fn fail(err: &GatewayError) -> ! {
    eprintln!("gatefs: {}: {}", err.kind(), err);
    std::process::exit(1);
}
