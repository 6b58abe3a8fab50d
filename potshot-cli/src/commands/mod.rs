use comfy_table::{presets::UTF8_FULL, Table};
use dialoguer::Confirm;
use potshot_core::{
    format_coins, parse_coins, AccountId, CallContext, FeeStrategy, GameError, GameState,
    LotteryHouse, MemoryLedger, PayoutRecord, PlayOutcome, Result,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Account the game itself lives at on this host.
const CONTRACT: &str = "potshot";

/// Everything the CLI persists: the game plus its payout ledger.
#[derive(Debug, Serialize, Deserialize)]
struct GameFile {
    game: GameState,
    payouts: Vec<PayoutRecord>,
}

fn game_path(data_dir: &Path) -> PathBuf {
    data_dir.join("game.json")
}

fn load(data_dir: &Path) -> Result<GameFile> {
    let path = game_path(data_dir);
    if !path.exists() {
        return Err(GameError::internal(
            "no game here yet, run 'potshot init <owner>' first",
        ));
    }
    let content = std::fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&content)?)
}

fn save(data_dir: &Path, file: &GameFile) -> Result<()> {
    let content = serde_json::to_string_pretty(file)?;
    std::fs::write(game_path(data_dir), content)?;
    Ok(())
}

pub fn init(data_dir: &Path, owner: &str) -> Result<()> {
    let path = game_path(data_dir);
    if path.exists() {
        return Err(GameError::internal(format!(
            "a game already exists at {}, the owner can start over with 'potshot reset'",
            path.display()
        )));
    }

    let file = GameFile {
        game: GameState::new(owner),
        payouts: Vec::new(),
    };
    save(data_dir, &file)?;

    println!("New game owned by {}", owner);
    println!("Pot starts at {}", file.game.pot_display());
    println!(
        "Fee strategy ({}): {}",
        file.game.fee_strategy(),
        file.game.explain_fees()
    );
    println!("Lottery: {}", file.game.explain_lottery());
    Ok(())
}

pub async fn play(data_dir: &Path, player: &str, attach: Option<&str>) -> Result<()> {
    let mut file = load(data_dir)?;
    let attached = match attach {
        Some(s) => parse_coins(s)?,
        None => 0,
    };

    let ledger = Arc::new(MemoryLedger::new());
    let house = LotteryHouse::new(CONTRACT, file.game, ledger.clone());
    let player_id = AccountId::from(player);
    let mut rng = StdRng::from_entropy();

    let outcome = house.play(&player_id, attached, &mut rng).await;
    house.settle_pending().await;

    let shared = house.game();
    let game = shared.lock().await;
    file.game = game.clone();
    drop(game);
    file.payouts.extend(ledger.records());
    save(data_dir, &file)?;

    match outcome? {
        PlayOutcome::Won { payout } => {
            println!(
                "{} hit the pot and takes {}!",
                player,
                format_coins(payout.amount)
            );
            println!("The game is closed until the owner opens a new round.");
        }
        PlayOutcome::Lost => {
            println!("No luck this time, {}.", player);
            println!(
                "The pot stands at {}, a repeat play now costs {}.",
                file.game.pot_display(),
                file.game.fee_display()
            );
        }
    }
    Ok(())
}

pub fn status(data_dir: &Path) -> Result<()> {
    let file = load(data_dir)?;
    let game = &file.game;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Owner".to_string(), game.owner().to_string()]);
    table.add_row(vec![
        "Active".to_string(),
        if game.is_active() { "yes" } else { "no" }.to_string(),
    ]);
    table.add_row(vec!["Pot".to_string(), game.pot_display()]);
    table.add_row(vec!["Players in".to_string(), game.player_count().to_string()]);
    table.add_row(vec!["Repeat-play fee".to_string(), game.fee_display()]);
    table.add_row(vec![
        "Fee strategy".to_string(),
        game.fee_strategy().to_string(),
    ]);
    table.add_row(vec![
        "Last played".to_string(),
        game.last_played()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string()),
    ]);
    table.add_row(vec![
        "Winner".to_string(),
        game.winner()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string()),
    ]);
    println!("{table}");

    if !file.payouts.is_empty() {
        println!();
        println!("Payouts:");
        for record in &file.payouts {
            println!(
                "  {}  {} to {}",
                record.at.format("%Y-%m-%d %H:%M:%S"),
                format_coins(record.amount),
                record.to
            );
        }
    }
    Ok(())
}

pub fn explain(data_dir: &Path) -> Result<()> {
    let file = load(data_dir)?;
    println!(
        "Fee strategy ({}): {}",
        file.game.fee_strategy(),
        file.game.explain_fees()
    );
    println!("Lottery: {}", file.game.explain_lottery());
    Ok(())
}

pub fn has_played(data_dir: &Path, account: &str) -> Result<()> {
    let file = load(data_dir)?;
    let id = AccountId::from(account);
    if file.game.has_played(&id) {
        println!("{} is in this round", account);
    } else {
        println!("{} has not played this round, the first shot is free", account);
    }
    Ok(())
}

pub fn set_fee(data_dir: &Path, caller: &str, strategy: &str) -> Result<()> {
    let mut file = load(data_dir)?;
    let strategy: FeeStrategy = strategy.parse()?;
    let ctx = CallContext::new(caller, CONTRACT);
    file.game.set_fee_strategy(&ctx, strategy)?;
    save(data_dir, &file)?;
    println!(
        "Fee strategy set to {}: {}",
        strategy,
        file.game.explain_fees()
    );
    Ok(())
}

pub fn set_chance(data_dir: &Path, caller: &str, chance: f64) -> Result<()> {
    let mut file = load(data_dir)?;
    let ctx = CallContext::new(caller, CONTRACT);
    file.game.set_lottery_chance(&ctx, chance)?;
    save(data_dir, &file)?;
    println!("{}", file.game.explain_lottery());
    Ok(())
}

pub fn reset(data_dir: &Path, caller: &str, force: bool) -> Result<()> {
    let mut file = load(data_dir)?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Reset the game and drop {} enrolled players?",
                file.game.player_count()
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Reset cancelled");
            return Ok(());
        }
    }

    let ctx = CallContext::new(caller, CONTRACT);
    file.game.reset(&ctx)?;
    save(data_dir, &file)?;
    println!("New round open. Pot back to {}.", file.game.pot_display());
    Ok(())
}
