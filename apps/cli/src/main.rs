use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_catalog, load_settings,
    playback::{log_entries, PlaybackQueue, PlaybackStep},
    play_turn, BattleApi, BattleClient, TurnMode,
};
use shared::{
    domain::{ActionDescriptor, ActionId, AgentSnapshot, BattleId, BotId},
    protocol::StartBattleRequest,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "battle_cli", about = "Terminal client for the agent battle server")]
struct Cli {
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the server answers.
    Health,
    /// List the bot roster.
    Bots,
    /// List the available actions.
    Actions,
    /// Print the server's summary of a battle.
    Summary { battle_id: String },
    /// Print a bot's skins; with `--level`, only those unlocked at that level.
    Skins {
        bot_id: String,
        #[arg(long)]
        level: Option<u32>,
    },
    /// Run a battle to the end, always playing the same action for agent 1.
    Fight {
        #[arg(long, default_value = "mende")]
        bot1: String,
        #[arg(long, default_value = "regulus")]
        bot2: String,
        #[arg(long)]
        agent1_name: Option<String>,
        #[arg(long)]
        agent2_name: Option<String>,
        /// Preferred action id; falls back to the first affordable action.
        #[arg(long)]
        action: Option<i64>,
        #[arg(long)]
        turn_mode: Option<TurnMode>,
        #[arg(long, default_value_t = 50)]
        max_rounds: u32,
        /// Print each turn at once instead of pacing the log.
        #[arg(long)]
        no_pace: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    let client = BattleClient::from_settings(&settings)?;

    match cli.command {
        Command::Health => {
            let health = client.health().await?;
            println!("server {} status={}", client.base_url(), health.status);
        }
        Command::Bots => {
            for bot in client.fetch_bots().await? {
                println!(
                    "{} {:<10} {:<12} {} | HP +{} ATK +{} DEF +{} STA +{} | {}",
                    bot.avatar,
                    bot.id,
                    bot.name,
                    bot.title,
                    bot.stats.hp_bonus,
                    bot.stats.attack_bonus,
                    bot.stats.defense_bonus,
                    bot.stats.stamina_bonus,
                    bot.special
                );
            }
        }
        Command::Actions => {
            for action in client.fetch_actions().await? {
                println!(
                    "{:>3} {} {:<16} ⚡ {:<3} 💥 {}-{} {}",
                    action.id,
                    action.emoji,
                    action.name,
                    action.stamina_cost,
                    action.damage.min,
                    action.damage.max,
                    action.description
                );
            }
        }
        Command::Summary { battle_id } => {
            let summary = client.battle_summary(&BattleId::from(battle_id.as_str())).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Skins { bot_id, level } => {
            let bot_id = BotId::from(bot_id.as_str());
            let skins = match level {
                Some(level) => client.unlocked_skins(&bot_id, level).await?,
                None => client.fetch_skins(&bot_id).await?,
            };
            println!("{}", serde_json::to_string_pretty(&skins)?);
        }
        Command::Fight {
            bot1,
            bot2,
            agent1_name,
            agent2_name,
            action,
            turn_mode,
            max_rounds,
            no_pace,
        } => {
            let fight = Fight {
                request: StartBattleRequest::new(
                    agent1_name.as_deref().unwrap_or(&settings.agent1_name),
                    agent2_name.as_deref().unwrap_or(&settings.agent2_name),
                    Some(BotId::from(bot1.as_str())),
                    Some(BotId::from(bot2.as_str())),
                ),
                preferred: action.map(ActionId),
                mode: turn_mode.unwrap_or(settings.turn_mode),
                max_rounds,
                pace: !no_pace,
            };
            run_fight(&client, fight).await?;
        }
    }

    Ok(())
}

struct Fight {
    request: StartBattleRequest,
    preferred: Option<ActionId>,
    mode: TurnMode,
    max_rounds: u32,
    pace: bool,
}

async fn run_fight(client: &BattleClient, fight: Fight) -> Result<()> {
    let health = client
        .health()
        .await
        .with_context(|| format!("battle server at {} is not reachable", client.base_url()))?;
    if !health.is_ok() {
        bail!("battle server reports status '{}'", health.status);
    }

    let catalog = load_catalog(client).await;
    if catalog.actions.is_empty() {
        bail!("server offered no actions");
    }
    for bot_id in [&fight.request.agent1_bot, &fight.request.agent2_bot]
        .into_iter()
        .flatten()
    {
        if catalog.bot(bot_id).is_none() {
            tracing::warn!(%bot_id, "bot not in catalog; the server may reject it");
        }
    }

    let started = client.start_battle(&fight.request).await?;
    let battle_id = started.battle_id;
    println!("Kampf {battle_id}: {} vs {}", started.agent1.name, started.agent2.name);
    print_status(1, &started.agent1, &started.agent2);

    let mut agent1 = started.agent1;
    let mut queue = PlaybackQueue::new();
    let mut finished = false;
    for _ in 0..fight.max_rounds {
        let Some(action_id) = choose_action(&catalog.actions, &agent1, fight.preferred) else {
            bail!("no action available");
        };
        let result = play_turn(client, fight.mode, &battle_id, action_id).await?;
        agent1 = result.agent1.clone();

        if fight.pace {
            queue.schedule_turn(&result, Instant::now());
            finished = play_queue(&mut queue).await;
        } else {
            for line in log_entries(&result) {
                println!("{line}");
            }
            print_status(result.round, &result.agent1, &result.agent2);
            if result.is_over() {
                announce(result.winner.as_deref());
                finished = true;
            }
        }
        if finished {
            break;
        }
    }
    if !finished {
        println!("Abbruch nach {} Runden", fight.max_rounds);
    }

    match client.battle_summary(&battle_id).await {
        Ok(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
        Err(err) => tracing::warn!(%battle_id, "summary unavailable: {err}"),
    }
    Ok(())
}

/// Prints queued steps as they fall due. Returns whether the battle ended.
async fn play_queue(queue: &mut PlaybackQueue) -> bool {
    let mut finished = false;
    while let Some(at) = queue.next_deadline() {
        tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await;
        for step in queue.drain_due(Instant::now()) {
            match step {
                PlaybackStep::AppendLog(line) => println!("{line}"),
                PlaybackStep::RefreshDisplay(frame) => {
                    print_status(frame.round, &frame.agent1, &frame.agent2);
                }
                PlaybackStep::CheckBattleOver {
                    battle_over,
                    winner,
                } => {
                    if battle_over {
                        announce(winner.as_deref());
                        finished = true;
                    }
                }
            }
        }
    }
    finished
}

/// The preferred action if agent 1 can pay for it, else the first one it can
/// pay for. With nothing affordable the first action is sent anyway and the
/// server decides.
fn choose_action(
    actions: &[ActionDescriptor],
    actor: &AgentSnapshot,
    preferred: Option<ActionId>,
) -> Option<ActionId> {
    let affordable = |action: &&ActionDescriptor| actor.can_afford(action);
    preferred
        .and_then(|id| actions.iter().filter(affordable).find(|a| a.id == id))
        .or_else(|| actions.iter().find(affordable))
        .or_else(|| actions.first())
        .map(|action| action.id)
}

fn print_status(round: u32, agent1: &AgentSnapshot, agent2: &AgentSnapshot) {
    println!(
        "-- Runde {round} | {} {}/{} HP ⚡ {} | {} {}/{} HP ⚡ {}",
        agent1.name,
        agent1.hp,
        agent1.max_hp,
        agent1.stamina,
        agent2.name,
        agent2.hp,
        agent2.max_hp,
        agent2.stamina
    );
}

fn announce(winner: Option<&str>) {
    match winner {
        Some(winner) => println!("🏆 {winner} gewinnt!"),
        None => println!("Unentschieden"),
    }
}
