mod cmd;
mod common;

use clap::Parser;

#[derive(Parser)]
enum Cmd {
    Run(cmd::run::Opt),
    Sign(cmd::sign::Opt),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cmd = Cmd::parse();
    match cmd {
        Cmd::Run(opt) => cmd::run::main(opt).await,
        Cmd::Sign(opt) => cmd::sign::main(opt),
    }
}
