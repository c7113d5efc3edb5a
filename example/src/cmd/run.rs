use std::fs;
use std::io::{stdout, Write};
use std::net::SocketAddr;
use std::path::Path;

use futures::{Stream, StreamExt};
use tokio_stream::wrappers::{TcpListenerStream, UnixListenerStream};
use whatsapp_webhook::service::DEFAULT_MAX_BODY_SIZE;
use whatsapp_webhook::{Config, EventNotification, Listener};

#[derive(clap::Args)]
pub struct Opt {
    /// `tcp://<address>` or `unix://<path>` to listen on.
    #[arg(default_value = "tcp://127.0.0.1:8080")]
    bind: String,
    #[arg(long, env = "WEBHOOK_VERIFY_TOKEN", hide_env_values = true)]
    verify_token: String,
    #[arg(long, env = "WEBHOOK_APP_SECRET", hide_env_values = true)]
    app_secret: String,
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_SIZE)]
    max_body_size: usize,
}

pub async fn main(opt: Opt) -> anyhow::Result<()> {
    let config = Config {
        max_body_size: opt.max_body_size,
        ..Config::new(opt.verify_token, opt.app_secret)
    };
    let _guard;

    if let Some(addr) = opt.bind.strip_prefix("tcp://") {
        let addr: SocketAddr = addr.parse()?;
        let listener = TcpListenerStream::new(tokio::net::TcpListener::bind(addr).await?);
        print_all(Listener::new(listener, config)).await
    } else if let Some(path) = opt.bind.strip_prefix("unix://") {
        let path = Path::new(path);
        let _ = fs::remove_file(path);
        let listener = UnixListenerStream::new(tokio::net::UnixListener::bind(path)?);
        _guard = crate::common::RmGuard(path);
        print_all(Listener::new(listener, config)).await
    } else {
        anyhow::bail!("unknown bind address type: {}", opt.bind);
    }
}

async fn print_all(mut s: impl Stream<Item = EventNotification> + Unpin) -> anyhow::Result<()> {
    while let Some(notification) = s.next().await {
        let mut stdout = stdout().lock();
        writeln!(stdout, "Notification: {}", notification.object)?;
        for entry in &notification.entry {
            for change in &entry.changes {
                writeln!(
                    stdout,
                    "Change: {} (entry: {}) {}",
                    change.field,
                    entry.id,
                    serde_json::to_string(&change.value)?
                )?;
            }
        }
    }

    Ok(())
}
