//! Light showcase binary

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;
    use light_showcase::{args::ShowcaseArgs, window, ShowcaseConfig};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ShowcaseConfig::from(ShowcaseArgs::parse());
    log::info!(
        "Starting {} at {}x{} (vsync: {}, antialias: {}, shadows: {})",
        config.title,
        config.width,
        config.height,
        config.vsync,
        config.antialias,
        config.shadows
    );

    if let Err(err) = window::run(config) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

// The web build starts from `web::main`
#[cfg(target_arch = "wasm32")]
fn main() {}
