use kindle_highlights::app;
use kindle_highlights::config::Config;
use kindle_highlights::error::EXIT_SUCCESS;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = Config::load();

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    let code = match app::run(&config, &mut stdin.lock(), &mut stdout) {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };

    std::process::exit(code);
}
