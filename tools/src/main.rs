//! starminer-runner: headless session runner for Star Miner.
//!
//! Usage:
//!   starminer-runner --clicks 500 --db star-miner.db
//!   starminer-runner --ipc-mode --data-dir ./data

use anyhow::{Context, Result};
use starminer_core::{
    catalog::{self, CostType},
    clock::SystemClock,
    codec,
    config::GameConfig,
    cost,
    event::GameEvent,
    exchange,
    format::{format_duration, format_quantity, percentage},
    scheduler::Scheduler,
    snapshot::GameSnapshot,
    store::SqliteStore,
    transition,
    types::Quantity,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Click {
        #[serde(default = "one")]
        count: u64,
    },
    Purchase {
        upgrade_id: String,
    },
    Prestige,
    Reconcile,
    Credit {
        amount: String,
    },
    Poll,
    Reset,
    Catalog,
    Quit,
}

fn one() -> u64 {
    1
}

#[derive(serde::Serialize)]
struct UiState {
    session_id:          String,
    stardust:            String,
    stardust_display:    String,
    per_click:           String,
    per_tick:            String,
    credits:             String,
    total_clicks:        u64,
    prestige_level:      u32,
    can_prestige:        bool,
    prestige_progress:   u8,
    stardust_cfx_value:  String,
    achievements:        Vec<String>,
    upgrades:            Vec<UpgradeView>,
    events:              Vec<GameEvent>,
}

#[derive(serde::Serialize)]
struct UpgradeView {
    id:         &'static str,
    name:       &'static str,
    level:      u32,
    next_cost:  String,
    cost_type:  CostType,
    affordable: bool,
}

#[derive(serde::Serialize)]
struct CatalogEntry {
    id:          &'static str,
    name:        &'static str,
    description: &'static str,
    base_cost:   u64,
    per_click:   u64,
    per_tick:    u64,
    cost_type:   CostType,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let clicks = parse_arg(&args, "--clicks", 0u64);
    let data_dir = arg_value(&args, "--data-dir").unwrap_or("./data");

    let config = match GameConfig::load(data_dir) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("using default config: {e}");
            GameConfig::default()
        }
    };
    let db = arg_value(&args, "--db")
        .unwrap_or(config.storage.db_path.as_str())
        .to_string();

    if !ipc_mode {
        println!("Star Miner - session runner");
        println!("  clicks:    {clicks}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let store = SqliteStore::open(&db).with_context(|| format!("opening save database {db}"))?;
    store.migrate()?;

    let mut scheduler = Scheduler::start(&config, Box::new(store), Box::new(SystemClock))?;

    if ipc_mode {
        run_ipc_loop(&mut scheduler)?;
    } else {
        for _ in 0..clicks {
            scheduler.click();
        }
        scheduler.poll();
        print_summary(&mut scheduler);
    }

    scheduler.shutdown();
    Ok(())
}

fn run_ipc_loop(scheduler: &mut Scheduler) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Catalog => {
                let entries: Vec<CatalogEntry> = catalog::active()
                    .map(|u| CatalogEntry {
                        id:          u.id,
                        name:        u.name,
                        description: u.description,
                        base_cost:   u.base_cost,
                        per_click:   u.per_click,
                        per_tick:    u.per_tick,
                        cost_type:   u.cost_type,
                    })
                    .collect();
                writeln!(stdout, "{}", serde_json::to_string(&entries)?)?;
            }
            other => {
                if let Err(e) = apply(scheduler, other) {
                    write_error(&mut stdout, &e.to_string())?;
                    continue;
                }
                scheduler.poll();
                let state = build_ui_state(scheduler);
                writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn apply(scheduler: &mut Scheduler, cmd: IpcCommand) -> Result<()> {
    match cmd {
        IpcCommand::Click { count } => {
            for _ in 0..count {
                scheduler.click();
            }
        }
        IpcCommand::Purchase { upgrade_id } => {
            if catalog::find(&upgrade_id).is_none() {
                log::warn!("Unknown upgrade: {upgrade_id}");
            }
            scheduler.purchase_upgrade(&upgrade_id);
        }
        IpcCommand::Prestige => {
            scheduler.activate_prestige();
        }
        IpcCommand::Reconcile => {
            scheduler.reconcile_idle();
        }
        IpcCommand::Credit { amount } => {
            let amount = codec::parse_tagged(&amount)
                .map_err(|reason| anyhow::anyhow!("bad credit amount: {reason}"))?;
            scheduler.credit_secondary(&amount);
        }
        IpcCommand::Reset => {
            scheduler.reset();
        }
        IpcCommand::GetState | IpcCommand::Poll => {}
        IpcCommand::Catalog | IpcCommand::Quit => {}
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{err_json}")?;
    stdout.flush()?;
    Ok(())
}

fn build_ui_state(scheduler: &mut Scheduler) -> UiState {
    let s = scheduler.snapshot();
    let requirement = Quantity::from(catalog::PRESTIGE_REQUIREMENT);

    UiState {
        session_id:         scheduler.session_id().to_string(),
        stardust:           s.resource.to_string(),
        stardust_display:   format_quantity(&s.resource),
        per_click:          s.resource_per_click.to_string(),
        per_tick:           s.resource_per_tick.to_string(),
        credits:            s.secondary_currency.to_string(),
        total_clicks:       s.total_clicks,
        prestige_level:     s.prestige_level,
        can_prestige:       transition::can_activate_prestige(&s),
        prestige_progress:  percentage(&s.resource, &requirement),
        stardust_cfx_value: exchange::stardust_to_cfx(&s.resource).to_string(),
        achievements:       s.achievements.iter().cloned().collect(),
        upgrades:           upgrade_views(&s),
        events:             scheduler.drain_events(),
    }
}

fn upgrade_views(s: &GameSnapshot) -> Vec<UpgradeView> {
    catalog::active()
        .map(|u| {
            let level = s.level_of(u.id);
            UpgradeView {
                id:         u.id,
                name:       u.name,
                level,
                next_cost:  cost::cost_at_level(u, level).to_string(),
                cost_type:  u.cost_type,
                affordable: cost::can_afford(s, u.id),
            }
        })
        .collect()
}

fn print_summary(scheduler: &mut Scheduler) {
    let s = scheduler.snapshot();
    let spent = cost::total_spent(&s);

    for event in scheduler.drain_events() {
        if let GameEvent::IdleReconciled { seconds, reward } = event {
            println!(
                "Welcome back: away {}, earned {reward} stardust",
                format_duration(seconds.max(0) as u64)
            );
            println!();
        }
    }

    println!("=== SESSION SUMMARY ===");
    println!("  session:        {}", scheduler.session_id());
    println!("  stardust:       {}", format_quantity(&s.resource));
    println!("  per click:      {}", format_quantity(&s.resource_per_click));
    println!("  per second:     {}", format_quantity(&s.resource_per_tick));
    println!("  credits:        {}", format_quantity(&s.secondary_currency));
    println!("  total clicks:   {}", s.total_clicks);
    println!("  prestige:       {}", s.prestige_level);
    println!(
        "  to prestige:    {}%",
        percentage(&s.resource, &Quantity::from(catalog::PRESTIGE_REQUIREMENT))
    );
    println!(
        "  spent:          {} stardust, {} credits",
        format_quantity(&spent.stardust),
        format_quantity(&spent.credits)
    );

    println!();
    println!("=== UPGRADES ===");
    for u in catalog::active() {
        let level = s.level_of(u.id);
        println!(
            "  {:<18} lvl {:>3} | next: {} {}",
            u.name,
            level,
            format_quantity(&cost::cost_at_level(u, level)),
            u.cost_type.label()
        );
    }

    if !s.achievements.is_empty() {
        println!();
        println!("=== ACHIEVEMENTS ===");
        for id in &s.achievements {
            let name = starminer_core::achievements::find(id).map_or(id.as_str(), |a| a.name);
            println!("  {name}");
        }
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
