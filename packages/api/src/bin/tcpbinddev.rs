//! Demo tool for device-bound dialing.
//!
//! Example setup on Linux, with two interfaces on overlapping subnets:
//!
//! ```text
//! ip addr add 192.168.1.2/24 dev eth0
//! ip addr add 192.168.1.3/16 dev eth1
//! tcpbinddev dial --addr 192.168.1.1:6666 --device eth1
//! ```
//!
//! The routing table would send 192.168.1.1 out of eth0 (longest prefix);
//! a SYN leaving eth1 shows the interface binding took effect.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tcpbinddev::{BindDev, TlsDialConfig};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_rustls::TlsAcceptor;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tcpbinddev")]
#[command(about = "Dial through a chosen network interface, or serve a test stream", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open concurrent device-bound connections and read from each
    Dial(DialArgs),
    /// Accept connections and write a payload to each at a fixed interval
    Serve(ServeArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Proto {
    Tcp,
    Tls,
}

#[derive(Args)]
struct DialArgs {
    /// Destination address
    #[arg(long, default_value = "127.0.0.1:8090")]
    addr: String,

    /// tcp4 or tcp6
    #[arg(long, default_value = "tcp4")]
    network: String,

    /// Source address, like 192.168.1.3:0
    #[arg(long)]
    saddr: Option<String>,

    /// Interface to send traffic out of
    #[arg(long)]
    device: Option<String>,

    #[arg(long, value_enum, default_value_t = Proto::Tcp)]
    proto: Proto,

    /// Connect and handshake deadline in seconds, 0 waits indefinitely
    #[arg(long, default_value_t = 3)]
    timeout: u64,

    /// Number of concurrent connections
    #[arg(long, default_value_t = 2)]
    connections: usize,

    /// Messages to read from each connection before closing it
    #[arg(long, default_value_t = 3)]
    reads: usize,

    /// PEM bundle of CA certificates to trust instead of the system store
    #[arg(long)]
    ca: Option<PathBuf>,

    /// Skip server certificate verification
    #[arg(long)]
    insecure: bool,

    /// Name to verify the server certificate against
    #[arg(long)]
    server_name: Option<String>,
}

#[derive(Args)]
struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0:8090")]
    listen: String,

    #[arg(long, value_enum, default_value_t = Proto::Tcp)]
    proto: Proto,

    /// PEM certificate chain (tls only)
    #[arg(long)]
    cert: Option<PathBuf>,

    /// PEM private key (tls only)
    #[arg(long)]
    key: Option<PathBuf>,

    #[arg(long, default_value = "bbbbbbb")]
    payload: String,

    /// Seconds between writes
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // One thread: every connection shares it, which shows the dialed sockets
    // are driven by the reactor rather than by a thread each.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    match cli.command {
        Commands::Dial(args) => runtime.block_on(run_dial(args)),
        Commands::Serve(args) => runtime.block_on(run_serve(args)),
    }
}

async fn run_dial(args: DialArgs) -> anyhow::Result<()> {
    let tls = match args.proto {
        Proto::Tls => Some(client_tls_config(&args)?),
        Proto::Tcp => None,
    };

    let mut tasks = JoinSet::new();
    for id in 0..args.connections {
        let builder = dial_builder(&args)?;
        let tls = tls.clone();
        let reads = args.reads;
        tasks.spawn(async move {
            if let Err(e) = run_connection(id, builder, tls, reads).await {
                tracing::error!(id, "{e:#}");
            }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        joined.context("connection task panicked")?;
    }
    Ok(())
}

fn dial_builder(args: &DialArgs) -> anyhow::Result<BindDev> {
    let mut builder = BindDev::parse(&args.network, args.addr.clone())?
        .timeout(Duration::from_secs(args.timeout));
    if let Some(saddr) = &args.saddr {
        builder = builder.source(saddr.clone());
    }
    if let Some(device) = &args.device {
        builder = builder.device(device.clone());
    }
    Ok(builder)
}

fn client_tls_config(args: &DialArgs) -> anyhow::Result<TlsDialConfig> {
    let config = if args.insecure {
        TlsDialConfig::danger_accept_invalid_certs()?
    } else if let Some(ca) = &args.ca {
        TlsDialConfig::from_pem_file(ca)?
    } else {
        TlsDialConfig::with_native_roots()?
    };
    Ok(match &args.server_name {
        Some(name) => config.with_server_name(name.clone()),
        None => config,
    })
}

async fn run_connection(
    id: usize,
    builder: BindDev,
    tls: Option<TlsDialConfig>,
    reads: usize,
) -> anyhow::Result<()> {
    match tls {
        Some(config) => {
            let stream = builder.connect_tls(&config).await?;
            let (tcp, _) = stream.get_ref();
            tracing::info!(id, local = %tcp.local_addr()?, remote = %tcp.peer_addr()?, "connected (tls)");
            read_messages(id, stream, reads).await
        }
        None => {
            let stream = builder.connect().await?;
            tracing::info!(id, local = %stream.local_addr()?, remote = %stream.peer_addr()?, "connected");
            read_messages(id, stream, reads).await
        }
    }
}

async fn read_messages<S: AsyncRead + Unpin>(id: usize, mut stream: S, reads: usize) -> anyhow::Result<()> {
    let mut buf = vec![0u8; 1024];
    for _ in 0..reads {
        let n = stream.read(&mut buf).await.context("read failed")?;
        if n == 0 {
            tracing::info!(id, "peer closed the connection");
            return Ok(());
        }
        tracing::info!(id, message = %String::from_utf8_lossy(&buf[..n]), "read");
    }
    tracing::info!(id, "done reading");
    Ok(())
}

async fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    let acceptor = match args.proto {
        Proto::Tls => {
            let (Some(cert), Some(key)) = (&args.cert, &args.key) else {
                bail!("--proto tls needs --cert and --key");
            };
            Some(load_acceptor(cert, key)?)
        }
        Proto::Tcp => None,
    };

    let listener = TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("failed to listen on {}", args.listen))?;
    tracing::info!(listen = %listener.local_addr()?, proto = ?args.proto, "listening");

    let payload: Arc<[u8]> = args.payload.into_bytes().into();
    let interval = Duration::from_secs(args.interval);

    loop {
        let (stream, peer) = listener.accept().await.context("accept failed")?;
        let acceptor = acceptor.clone();
        let payload = payload.clone();

        tokio::spawn(async move {
            let result = match acceptor {
                Some(acceptor) => match acceptor.accept(stream).await {
                    Ok(tls) => write_loop(tls, &payload, interval).await,
                    Err(e) => Err(e),
                },
                None => write_loop(stream, &payload, interval).await,
            };
            if let Err(e) = result {
                tracing::info!(%peer, "connection closed: {e}");
            }
        });
    }
}

async fn write_loop<S: AsyncWrite + Unpin>(mut stream: S, payload: &[u8], interval: Duration) -> io::Result<()> {
    loop {
        tokio::time::sleep(interval).await;
        stream.write_all(payload).await?;
        stream.flush().await?;
        tracing::debug!(bytes = payload.len(), "write ok");
    }
}

fn load_acceptor(cert: &Path, key: &Path) -> anyhow::Result<TlsAcceptor> {
    let certs = rustls_pemfile::certs(&mut BufReader::new(
        File::open(cert).with_context(|| format!("failed to open {}", cert.display()))?,
    ))
    .collect::<Result<Vec<_>, _>>()
    .with_context(|| format!("failed to parse {}", cert.display()))?;

    let key = rustls_pemfile::private_key(&mut BufReader::new(
        File::open(key).with_context(|| format!("failed to open {}", key.display()))?,
    ))
    .with_context(|| format!("failed to parse {}", key.display()))?
    .with_context(|| format!("no private key in {}", key.display()))?;

    let config = rustls::ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()?
    .with_no_client_auth()
    .with_single_cert(certs, key)?;
    Ok(TlsAcceptor::from(Arc::new(config)))
}
