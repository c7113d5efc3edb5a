use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use whatsapp_webhook::signature;

/// Prints the `X-Hub-Signature-256` header value the platform would send for a body.
#[derive(clap::Args)]
pub struct Opt {
    #[arg(long, env = "WEBHOOK_APP_SECRET", hide_env_values = true)]
    app_secret: String,
    /// File containing the request body. Defaults to the standard input.
    file: Option<PathBuf>,
}

pub fn main(opt: Opt) -> anyhow::Result<()> {
    let body = if let Some(path) = opt.file {
        fs::read(path)?
    } else {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        buf
    };

    println!("{}", signature::header_value(&opt.app_secret, &body));

    Ok(())
}
