//! Masquerade Match Server
//!
//! Runs a scripted demo match through the authority, then optionally keeps a
//! live session ticking until Ctrl-C (`masquerade-server --serve`).

use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use masquerade::{
    game::{
        authority::{Authority, Intent},
        cooldown::AbilityId,
        events::{GameEventData, TopicSet},
        faction::Faction,
        leaderboard,
        state::ConnectionId,
    },
    network::session::{AuthoritySession, SessionConfig},
    MatchConfig, VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let match_config = MatchConfig::from_env().context("loading match config")?;
    match_config.validate().context("validating match config")?;
    let session_config = SessionConfig::from_env().context("loading session config")?;
    session_config.validate().context("validating session config")?;

    info!("Masquerade Server v{}", VERSION);
    info!("Tick Rate: {} Hz", session_config.tick_rate);
    info!(
        "Ready: {}s, Match: {}s, Win Score: {}",
        match_config.ready_duration, match_config.match_duration, match_config.victory.win_score_threshold
    );

    demo_match(match_config.clone(), &session_config);

    if std::env::args().any(|a| a == "--serve") {
        serve(match_config, session_config).await?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Four bots play one match to the end.
fn demo_match(config: MatchConfig, session: &SessionConfig) {
    info!("=== Starting Demo Match ===");

    let mut auth = Authority::with_match_id(config, [1; 16]);
    info!("Match ID: {}", hex::encode(auth.match_id()));

    let bots: Vec<ConnectionId> = (0..4u8).map(|i| ConnectionId::new([i + 1; 16])).collect();
    for (i, id) in bots.iter().enumerate() {
        auth.attach(*id, Some(&format!("bot-{i}")));
        auth.request_faction_claim(*id, i as u8);
    }

    let dt = session.dt();
    let limit = ((auth.config().ready_duration + auth.config().match_duration) / dt) as u64 + 10;
    let mut total_events = 0;

    for _ in 0..limit {
        for id in &bots {
            play(&mut auth, *id);
        }

        let result = auth.tick(dt);
        total_events += result.events.len();
        for event in &result.events {
            match &event.data {
                GameEventData::PhaseChanged { old_phase, new_phase } => {
                    info!("t={:.2}s phase {:?} -> {:?}", event.time, old_phase, new_phase);
                }
                GameEventData::SurvivorEliminated { victim, .. } => {
                    info!("t={:.2}s survivor {} eliminated", event.time, victim);
                }
                GameEventData::TaskCompleted { faction } => {
                    info!("t={:.2}s task completed by {:?}", event.time, faction);
                }
                _ => {}
            }
        }

        if result.match_ended {
            break;
        }
    }

    info!("=== Match Results ===");
    info!("Outcome: {:?}", auth.outcome());
    info!("Faction score: {}", auth.faction_score());
    for (place, entry) in auth.leaderboard().iter().enumerate() {
        info!("#{}: {} - Score: {}", place + 1, entry.name, entry.score);
    }
    info!("Leaderboard wire form: {:?}", leaderboard::encode(&auth.leaderboard()));
    info!("View hash: {}", hex::encode(auth.view_hash()));
    info!("Total events: {}", total_events);
}

/// One bot decision. Rejections are expected and only logged at debug.
fn play(auth: &mut Authority, id: ConnectionId) {
    let Some((faction, carried)) = auth
        .connection(&id)
        .filter(|c| c.alive)
        .map(|c| (c.faction, c.carried_item))
    else {
        return;
    };

    match faction {
        Faction::Chaser => {
            // Follow the first living Survivor, then swing
            let prey = auth
                .roster()
                .iter()
                .find(|c| c.is_survivor() && c.alive)
                .map(|c| (c.id, c.position));
            if let Some((prey, at)) = prey {
                if let Some(layer) = auth.layer_of(&prey) {
                    if auth.layer_of(&id) != Some(layer) {
                        auth.request_layer_transition(id, layer);
                    }
                }
                auth.request(id, &Intent::ReportPosition { x: at.x, y: at.y });
            }
            auth.request_ability_use(id, AbilityId::Shockwave);
        }
        Faction::Survivor => {
            let goal = match carried {
                Some(_) => auth
                    .world()
                    .zones()
                    .find(|z| z.faction == Faction::Survivor)
                    .map(|z| (z.layer, z.position, None)),
                None => auth
                    .world()
                    .items()
                    .find(|i| i.carrier.is_none() && i.allowed_faction.map_or(true, |f| f == Faction::Survivor))
                    .map(|i| (i.layer, i.position, Some(i.id))),
            };
            let Some((layer, at, item)) = goal else {
                return;
            };
            if auth.layer_of(&id) != Some(layer) {
                auth.request_layer_transition(id, layer);
            }
            auth.request(id, &Intent::ReportPosition { x: at.x, y: at.y });
            match item {
                Some(item) => {
                    auth.request_pickup(id, item);
                }
                None => {
                    let zone = auth.world().zones().find(|z| z.faction == Faction::Survivor).map(|z| z.id);
                    if let Some(zone) = zone {
                        auth.request_submit(id, zone);
                    }
                }
            }
        }
        Faction::NoFaction => debug!(connection = %id, "bot has no faction"),
    }
}

/// Live session until Ctrl-C.
async fn serve(config: MatchConfig, session_config: SessionConfig) -> anyhow::Result<()> {
    let (session, handle) = AuthoritySession::new(Authority::new(config), session_config);
    let task = tokio::spawn(session.run());

    let mut feed = handle.subscribe(TopicSet::all()).await?;
    let logger = tokio::spawn(async move {
        while let Some(msg) = feed.next().await {
            debug!(topic = ?msg.topic(), "broadcast");
        }
    });

    info!("Serving; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;

    handle.shutdown().await?;
    let authority = task.await.context("authority task")?;
    logger.abort();
    info!(
        phase = ?authority.phase(),
        connections = authority.roster().len(),
        "shut down"
    );
    Ok(())
}
