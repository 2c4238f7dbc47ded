mod core;
mod engine;
mod shell;
mod transport;
mod view;

use std::sync::Arc;

use crate::core::PlayerConfig;
use crate::engine::SimulatedEngine;
use crate::shell::Shell;
use crate::transport::TransportController;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Loaded once and shared read-only from here on
    let config = Arc::new(PlayerConfig::load()?);
    let engine = Arc::new(SimulatedEngine::spawn()?);
    let controller = TransportController::new(config);

    let mut shell = Shell::new(controller, engine);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    shell
        .run(stdin.lock(), &mut stdout)
        .map_err(|e| anyhow::anyhow!("Shell failed: {}", e))?;

    log::info!("Player transport shut down");
    Ok(())
}
