//! Forecourt - Entry Point
//!
//! Command-line front end over the simulation engine. State lives in a
//! data directory; every mutating command loads the run, applies the
//! change, and writes the run back.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use forecourt::core::config::SimConfig;
use forecourt::core::error::{Result, SimError};
use forecourt::events::template::EventScope;
use forecourt::presets::default_state;
use forecourt::report::breakeven_for_store;
use forecourt::sim::{compare_scenarios, Scenario, Simulation, Storage};

/// Forecourt - deterministic day-stepped simulator for fuel-station
/// service chains
#[derive(Parser, Debug)]
#[command(name = "forecourt")]
#[command(about = "Day-stepped economic simulator for fuel-station service chains")]
struct Args {
    /// Data directory holding state, ledger, and snapshots
    #[arg(long, default_value = "forecourt-data")]
    data_dir: PathBuf,

    /// Engine config TOML; built-in defaults apply when absent
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a fresh run seeded with the demo chain
    Init {
        /// Overwrite an existing run
        #[arg(long)]
        force: bool,
    },
    /// Show the current day, cash, and chain summary
    Status,
    /// Advance the simulation
    Simulate {
        #[arg(long, default_value_t = 1)]
        days: u32,
    },
    /// Roll the run back to an earlier snapshot
    Rollback {
        #[arg(long, default_value_t = 1)]
        days: u32,
    },
    /// Discard all progress and return to the initial state
    Reset,
    /// Re-seed the random stream
    Seed { seed: u64 },
    /// Force an event template active starting today
    Inject {
        template: String,

        /// global, station, or store
        #[arg(long, default_value = "store")]
        scope: String,

        /// Station or store id the event lands on
        #[arg(long, default_value = "")]
        target: String,

        /// Override the template's rolled duration
        #[arg(long)]
        duration: Option<u32>,

        /// Severity override in 0..1
        #[arg(long)]
        intensity: Option<f64>,
    },
    /// List active events and installed templates
    Events,
    /// Buy stock for a store, bounded by HQ cash
    Purchase {
        store: String,
        sku: String,

        /// Display name for a SKU not yet carried
        #[arg(long, default_value = "")]
        name: String,

        #[arg(long)]
        unit_cost: f64,

        #[arg(long)]
        qty: f64,
    },
    /// Close a store and salvage its stock and assets
    CloseStore { store: String },
    /// Run what-if scenarios against the current state
    Compare {
        /// TOML file with [[scenario]] tables
        #[arg(long)]
        file: PathBuf,

        #[arg(long, default_value_t = 30)]
        days: u32,

        /// Seed override applied to every branch
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Break-even order quantities per store
    Breakeven,
    /// Export ledger records as JSON lines
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

/// Top-level shape of a `--file` scenarios TOML.
#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(default, rename = "scenario")]
    scenarios: Vec<Scenario>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "forecourt=info".into()))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let storage = Storage::new(&args.data_dir);

    if let Command::Init { force } = args.command {
        if storage.exists() && !force {
            return Err(SimError::InvalidArgument(format!(
                "a run already exists in {}; pass --force to overwrite",
                args.data_dir.display()
            )));
        }
        let sim = Simulation::new(config, default_state());
        storage.save(&sim)?;
        println!("initialized demo chain in {}", args.data_dir.display());
        return Ok(());
    }

    if !storage.exists() {
        return Err(SimError::InvalidArgument(format!(
            "no run in {}; use `forecourt init` first",
            args.data_dir.display()
        )));
    }
    let mut sim = storage.load(config)?;

    match args.command {
        Command::Init { .. } => unreachable!("handled above"),
        Command::Status => print_status(&sim),
        Command::Simulate { days } => {
            let results = sim.simulate(days)?;
            storage.save(&sim)?;
            if let Some(last) = results.last() {
                println!(
                    "simulated {} day(s); day {} revenue {:.2}, operating profit {:.2}, net cashflow {:.2}",
                    days, last.day, last.total_revenue, last.total_operating_profit, last.total_net_cashflow
                );
            }
            println!("cash {:.2}, next day {}", sim.state().cash, sim.current_day());
        }
        Command::Rollback { days } => {
            let day = sim.rollback(days)?;
            storage.save(&sim)?;
            println!("rolled back to end of day {}, next day {}", day, sim.current_day());
        }
        Command::Reset => {
            sim.reset();
            storage.save(&sim)?;
            println!("run reset to day {}", sim.current_day());
        }
        Command::Seed { seed } => {
            sim.set_seed(seed);
            storage.save(&sim)?;
            println!("seed set to {}", seed);
        }
        Command::Inject {
            template,
            scope,
            target,
            duration,
            intensity,
        } => {
            let scope = parse_scope(&scope)?;
            let event = sim.inject_event(&template, scope, &target, duration, intensity)?;
            storage.save(&sim)?;
            println!(
                "injected '{}' ({}..{}, intensity {:.2})",
                event.name, event.start_day, event.end_day, event.intensity
            );
        }
        Command::Events => print_events(&sim),
        Command::Purchase {
            store,
            sku,
            name,
            unit_cost,
            qty,
        } => {
            let spent = sim.purchase_inventory(&store, &sku, &name, unit_cost, qty)?;
            storage.save(&sim)?;
            println!("purchased for {:.2}; cash {:.2}", spent, sim.state().cash);
        }
        Command::CloseStore { store } => {
            let recovered = sim.close_store(&store)?;
            storage.save(&sim)?;
            println!("closed {}; salvage {:.2}", store, recovered);
        }
        Command::Compare { file, days, seed } => {
            let parsed: ScenarioFile =
                toml::from_str(&fs::read_to_string(&file)?).map_err(|e| {
                    SimError::InvalidArgument(format!("{}: {}", file.display(), e))
                })?;
            let cmp = compare_scenarios(sim.state(), sim.config(), days, seed, &parsed.scenarios)?;
            print_comparison(&cmp);
        }
        Command::Breakeven => {
            for store in sim.state().stores.values() {
                let report = breakeven_for_store(store, sim.current_day());
                println!("[{}] fixed/day {:.2}", report.store_name, report.fixed_cost_per_day);
                match report.store_beq {
                    Some(beq) => println!("  store BEQ: {:.1} orders/day", beq),
                    None => println!("  store BEQ: unreachable (no positive contribution)"),
                }
                for (service, beq) in &report.per_service_beq {
                    println!("  {}: {:.1} orders/day", service, beq);
                }
            }
        }
        Command::Export { out } => {
            let mut lines = String::new();
            for record in sim.ledger().records() {
                lines.push_str(&serde_json::to_string(record)?);
                lines.push('\n');
            }
            fs::write(&out, lines)?;
            println!(
                "exported {} day record(s) to {}",
                sim.ledger().len(),
                out.display()
            );
        }
    }
    Ok(())
}

fn parse_scope(scope: &str) -> Result<EventScope> {
    match scope {
        "global" => Ok(EventScope::Global),
        "station" => Ok(EventScope::Station),
        "store" => Ok(EventScope::Store),
        other => Err(SimError::InvalidArgument(format!(
            "unknown scope '{}'; expected global, station, or store",
            other
        ))),
    }
}

fn print_status(sim: &Simulation) {
    let state = sim.state();
    println!("day {} (next to simulate), cash {:.2}", state.day, state.cash);
    println!(
        "{} station(s), {} store(s) ({} open)",
        state.stations.len(),
        state.stores.len(),
        state.open_store_count()
    );
    for store in state.stores.values() {
        println!(
            "- {} [{}] at {}: {:?}, cash {:.2}",
            store.id, store.name, store.station, store.status, store.cash_balance
        );
    }
    if state.hq_credit_used > 0.0 {
        println!(
            "credit used {:.2} of {:.2}",
            state.hq_credit_used, state.hq_credit_limit
        );
    }
    if let Some(last) = sim.ledger().last() {
        println!(
            "last day {}: revenue {:.2}, operating profit {:.2}, net cashflow {:.2}",
            last.day, last.total_revenue, last.total_operating_profit, last.total_net_cashflow
        );
    }
}

fn print_events(sim: &Simulation) {
    let state = sim.state();
    let today = state.day;
    println!("active events:");
    let mut any = false;
    for event in &state.active_events {
        if event.is_active_on(today) {
            any = true;
            println!(
                "- {} ({:?}/{}) days {}..{}, intensity {:.2}{}",
                event.name,
                event.scope,
                if event.target_id.is_empty() {
                    "all"
                } else {
                    &event.target_id
                },
                event.start_day,
                event.end_day,
                event.intensity,
                if event.store_closed { ", closes store" } else { "" }
            );
        }
    }
    if !any {
        println!("- none");
    }
    println!("templates:");
    for template in state.event_templates.values() {
        println!(
            "- {} '{}' p={:.3}/day, {}..{} day(s), cooldown {}{}",
            template.template_id,
            template.name,
            template.daily_probability,
            template.duration_days_min,
            template.duration_days_max,
            template.cooldown_days,
            if template.enabled { "" } else { " (disabled)" }
        );
    }
}

fn print_comparison(cmp: &forecourt::sim::ScenarioComparison) {
    let b = &cmp.baseline;
    println!(
        "baseline over {} day(s): cash {:.2}, revenue {:.2}, operating profit {:.2}, net cashflow {:.2}, avg orders {:.1}",
        b.days, b.end_cash, b.total_revenue, b.total_operating_profit, b.total_net_cashflow, b.avg_daily_orders
    );
    for outcome in &cmp.outcomes {
        match &outcome.result {
            Ok((m, d)) => println!(
                "{}: cash {:.2} ({:+.2}), revenue {:.2} ({:+.2}), profit {:.2} ({:+.2}), net {:.2} ({:+.2})",
                outcome.name,
                m.end_cash,
                d.end_cash,
                m.total_revenue,
                d.total_revenue,
                m.total_operating_profit,
                d.total_operating_profit,
                m.total_net_cashflow,
                d.total_net_cashflow
            ),
            Err(e) => println!("{}: failed: {}", outcome.name, e),
        }
    }
}
