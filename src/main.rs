use std::sync::Arc;
use log::info;
use surface_engine::Engine;
use surface_engine::os::HeadlessPlatform;
use crate::probe::ProbeConfig;

mod probe;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => ProbeConfig::load(path)?,
        None => ProbeConfig::default(),
    };

    let mut engine = match config.candidates {
        Some(candidates) => {
            let mut platform = HeadlessPlatform::new(candidates);
            if let Some(guess) = config.guess {
                platform = platform.with_guess(guess);
            }
            Engine::with_platform(Arc::new(platform))
        }
        None => Engine::new()?,
    };
    engine.set_default_request(config.request);

    info!("platform: {} (headless: {})", engine.platform().name(), engine.platform().is_headless());

    let selected = engine.choose_pixel_format(None)?;

    println!("{}", serde_json::to_string_pretty(&selected)?);

    Ok(())
}
