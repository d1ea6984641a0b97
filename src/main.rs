use sitemapms::args::Overrides;
use sitemapms::{Generator, Settings};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments; clap prints usage and exits on its own errors
    let overrides = match Overrides::try_from_args(std::env::args_os()) {
        Ok(overrides) => overrides,
        Err(e) => e.exit(),
    };

    let settings = match Settings::load(&overrides) {
        Ok(settings) => settings,
        Err(e) => return fail(e),
    };

    // Operators see what the run is about to do; the password stays hidden
    println!("{settings}");

    let start_time = std::time::Instant::now();
    match Generator::new(settings).generate().await {
        Ok(summary) => {
            ::log::info!(
                "Wrote {} entries ({} suppressed) in {:.2} seconds",
                summary.written,
                summary.suppressed,
                start_time.elapsed().as_secs_f64()
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

/// Report a fatal error on stderr, once
fn fail(e: sitemapms::Error) -> ExitCode {
    eprintln!("{}", error_message(&e));
    ExitCode::FAILURE
}

fn error_message(e: &sitemapms::Error) -> String {
    format!("sitemapms: {e}")
}
