//! Headless demo: plays a full match to completion with every seat on the
//! bundled `SimplePolicy`, logging each engine event. Grounded on the
//! teacher's `main.rs` tracing setup, pointed at this crate's engine loop
//! instead of an axum server.

use guandan_core::engine::Engine;
use guandan_core::event::LoggingSink;
use guandan_core::match_state::DealOutcome;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "guandan_core=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let seed = std::env::args().nth(1).and_then(|s| s.parse().ok()).or(Some(42));
    let mut engine = Engine::new(seed);
    let mut sink = LoggingSink;

    tracing::info!(?seed, "starting match");

    loop {
        engine.new_deal(&mut sink)?;
        engine.run_to_suspension(&mut sink);

        let placements = engine.deal.as_ref().expect("a deal was just played out").finished_order.clone();
        tracing::info!(?placements, levels = ?engine.match_state.team_levels, "deal finished");

        if let Some(DealOutcome::MatchFinished { winning_team }) = engine.last_deal_outcome() {
            tracing::info!(winning_team, "match finished");
            break;
        }
    }

    Ok(())
}
