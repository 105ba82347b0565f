use anyhow::{Context, Result};

use pn_play::config::PlayConfig;
use pn_play::game::{FireError, TokenGame};
use pn_play::net::io::{NetDescription, read_description, write_description, write_json};
use pn_play::options::{Options, PlayMode};
use pn_play::report::SessionReport;

fn main() -> Result<()> {
    if std::env::var("PN_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("PN_LOG")
            .write_style("PN_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    let options = match Options::parse_from(std::env::args_os()) {
        Ok(options) => options,
        Err(err) => err.exit(),
    };
    log::debug!("pn-play options: {:?}", options);

    let mut config = match &options.config {
        Some(path) => PlayConfig::load_from_file(path)?,
        None => PlayConfig::default(),
    };
    options.apply_to(&mut config);

    let description = read_description(&options.net)
        .with_context(|| format!("Failed to read net description: {:?}", options.net))?;
    let net = description
        .build()
        .with_context(|| format!("Invalid net description: {:?}", options.net))?;
    net.log_diagnostics();

    let mut game = match config.seed {
        Some(seed) => TokenGame::with_seed(net, seed),
        None => TokenGame::new(net),
    };
    game.set_auto_concurrency(config.auto_concurrency);

    let mut report = SessionReport::new(game.marking());
    match options.mode {
        PlayMode::Enabled => {}
        PlayMode::Fire => {
            for id in &options.transitions {
                match game.fire(&id.as_str().into()) {
                    Ok(outcome) => report.record_fire(&outcome),
                    Err(FireError::NotEnabled(transition)) => {
                        log::warn!("{} is not enabled, skipped", transition)
                    }
                    Err(err) => return Err(err).context("firing failed"),
                }
            }
        }
        PlayMode::Step => {
            let outcome = game.play_step()?;
            report.record_step(&outcome);
        }
        PlayMode::Run => report.play(&mut game, config.max_steps)?,
    }
    report.finish(&mut game, config.include_zero_tokens);
    print!("{}", report);

    if let Some(path) = &options.output {
        write_json(path, &report)
            .with_context(|| format!("Failed to write report: {:?}", path))?;
    }
    if let Some(path) = &options.save {
        let mut saved = NetDescription::from_net(game.net());
        saved.actions = description.actions.clone();
        saved.layout = description.layout.clone();
        write_description(path, &saved)
            .with_context(|| format!("Failed to write net description: {:?}", path))?;
    }
    Ok(())
}
