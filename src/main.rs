use anyhow::Context;
use clap::Parser;
use preview_shots::capture::{
    capture_previews, discover_previews, LogProgress, ProgressSink, TerminalProgress,
};
use preview_shots::{ChromeDriver, ConnectionMode, RunConfig};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Page listing the previews
    #[arg(short, long)]
    url: Option<String>,

    /// Output directory for screenshots
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Only capture previews whose name matches (case-insensitive regex, repeatable)
    #[arg(short, long)]
    filter: Vec<String>,

    /// Viewport label; `<width>x<height>` also resizes the page
    #[arg(long)]
    viewport: Option<String>,

    /// Settle delay before each action, in milliseconds
    #[arg(short, long)]
    wait: Option<u64>,

    /// Navigation timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// JSON run configuration; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chrome executable to launch
    #[arg(long)]
    chrome_path: Option<String>,

    /// Launch Chrome with --no-sandbox
    #[arg(long)]
    no_sandbox: bool,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Attach to a Chrome already listening on this debug port
    #[arg(long)]
    debug_port: Option<u16>,

    /// Print discovered previews without capturing
    #[arg(long)]
    list: bool,

    /// Log progress instead of drawing a progress bar
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    async fn run_config(&self) -> anyhow::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)
                .await
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => RunConfig::default(),
        };

        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(dir) = &self.dir {
            config.dir = dir.clone();
        }
        if !self.filter.is_empty() {
            config.filter = self.filter.clone();
        }
        if let Some(viewport) = &self.viewport {
            config.viewport = viewport.clone();
        }
        if self.wait.is_some() {
            config.wait_ms = self.wait;
        }
        if let Some(timeout) = self.timeout {
            config.navigation.timeout = Duration::from_secs(timeout);
        }

        config.validate()?;
        Ok(config)
    }

    fn connection_mode(&self) -> ConnectionMode {
        match self.debug_port {
            Some(port) => ConnectionMode::DebugPort(port),
            None => ConnectionMode::Sandboxed {
                chrome_path: self.chrome_path.clone(),
                no_sandbox: self.no_sandbox,
                headless: !self.headed,
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = args.run_config().await?;

    log::info!("Capturing previews from {} into {}", config.url, config.dir.display());

    let driver = ChromeDriver::new(args.connection_mode()).await?;
    let page = driver.open_page().await?;

    if let Some((width, height)) = config.viewport_size() {
        page.set_viewport_size(width, height).await?;
    }

    let filter = config.preview_filter()?;
    let previews = discover_previews(
        &page,
        &config.url,
        &filter,
        &config.viewport,
        &config.navigation,
    )
    .await?;

    if args.list {
        for (name, descriptors) in previews.iter() {
            println!("{} ({})", name, descriptors.len());
            for descriptor in descriptors {
                println!("  {}", descriptor.url);
            }
        }
        driver.close().await?;
        return Ok(());
    }

    let mut progress: Box<dyn ProgressSink> = if args.quiet {
        Box::new(LogProgress)
    } else {
        Box::new(TerminalProgress::new())
    };

    let result = capture_previews(&page, &previews, &config.capture_options(), progress.as_mut()).await;

    match result {
        Ok(report) => {
            println!(
                "Captured {} screenshot(s) of {} preview(s) into {}",
                report.screenshots.len(),
                report.previews,
                config.dir.display()
            );
            driver.close().await?;
            Ok(())
        }
        Err(e) => {
            log::error!("Capture aborted: {}", e);
            let _ = driver.close().await;
            Err(e.into())
        }
    }
}
