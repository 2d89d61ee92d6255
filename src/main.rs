// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use podplay::{HttpFeedClient, ReqwestClient, Shell, ShellConfig, VirtualDevice};

const DEFAULT_FEED: &str = "http://podcasts.files.bbci.co.uk/p02pc9pj.rss";

/// Browse a podcast feed and play its episodes through one shared player
#[derive(Parser, Debug)]
#[command(name = "podplay")]
#[command(about = "Browse a podcast feed and play its episodes through one shared player")]
#[command(version)]
struct Args {
    /// RSS feed URL or path to local RSS file
    #[arg(default_value = DEFAULT_FEED)]
    feed: String,

    /// Start with the normalized feed data shown as JSON
    #[arg(long)]
    show_json: bool,

    /// Delay before the audio device confirms a play or pause request
    #[arg(long, default_value = "150")]
    device_latency_ms: u64,

    /// Log playback transitions to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "podplay=debug",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let feed_client = HttpFeedClient::new(ReqwestClient::new());
    let device = VirtualDevice::new(Duration::from_millis(args.device_latency_ms));
    let controls = device.controls();

    let shell = Shell::new(
        feed_client,
        device,
        ShellConfig {
            feed_source: args.feed,
            show_json: args.show_json,
        },
    )
    .with_controls(controls);

    shell.run().await.context("Podcast shell failed")?;

    Ok(())
}
