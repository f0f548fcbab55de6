#![cfg_attr(test, allow(unused_crate_dependencies))]

use args::Command;
use clap::crate_version;
use mimalloc::MiMalloc;
use tokio::runtime;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod args;
mod commands;
mod telemetry;

const THREAD_NAME: &str = "graphql-microservice";

fn main() -> anyhow::Result<()> {
    let args = self::args::parse();

    match &args.command {
        Command::Stitch(stitch) => {
            print!("{}", commands::stitch(stitch)?);
        }
        Command::Serve(serve) => {
            let runtime = runtime::Builder::new_multi_thread()
                .enable_all()
                .thread_name(THREAD_NAME)
                .build()?;

            runtime.block_on(async {
                telemetry::init(&args);

                let crate_version = crate_version!();
                tracing::info!("GraphQL microservice {crate_version}");

                commands::serve(serve).await
            })?;
        }
    }

    Ok(())
}
