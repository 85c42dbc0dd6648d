use clap::Parser;
use docent::core::config::{self, DocentConfig};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "docent", about = "Terminal client for a document Q&A server")]
struct Args {
    /// Server base URL (overrides DOCENT_BASE_URL and the config file)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Session to open on startup
    #[arg(short, long)]
    session: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let (file_config, config_error) = match config::load_config() {
        Ok(c) => (c, None),
        Err(e) => (DocentConfig::default(), Some(e)),
    };
    let resolved = config::resolve(
        &file_config,
        args.base_url.as_deref(),
        args.session.as_deref(),
    );

    // Initialize file logger - writes to docent.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("docent.log") {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    if let Some(e) = config_error {
        log::warn!("Ignoring config file: {}", e);
    }
    log::info!("Docent starting up against {}", resolved.base_url);

    docent::tui::run(resolved)
}
