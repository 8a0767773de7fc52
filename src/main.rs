use clap::Parser;
use color_eyre::Result;
use moodsync::{Config, Profile, Storage, cli::Cli};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev {
        Profile::Dev
    } else {
        Profile::Prod
    };

    // An explicit --config path wins over the profile's config location
    let config = match cli.config {
        Some(ref path) => Config::load_from_path(&moodsync::utils::expand_path(path), None)?,
        None => Config::load_with_profile(profile)?,
    };

    // RUST_LOG overrides the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str()))
        .init();

    let db_path = config.get_database_path();
    let storage = Storage::new(
        db_path.to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?
    )?;

    moodsync::cli::run(cli.command, &config, &storage)?;

    Ok(())
}
