// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::prelude::*;
use std::sync::Arc;
use clap::{Parser, Subcommand};
use clap::AppSettings;
use clap_num::maybe_hex;
use anyhow::{Result, Context};
use env_logger::fmt::Color;
use log::LevelFilter;

use sunxi_clk::config::Config;
use sunxi_clk::delay::SpinDelay;
use sunxi_clk::regs::MemoryBus;
use sunxi_clk::tree::ClockTree;
use sunxi_clk::util::{fmt_rate, read_file_str};

#[macro_use]
extern crate log;

/// Drive sunxi clocks against an in-memory register bank
#[derive(Parser, Debug)]
#[clap(
    global_setting(AppSettings::DeriveDisplayOrder)
)]
pub struct Args {
    /// Config file
    config: String,

    /// Verbosity. Can be repeated
    #[clap(short, long, parse(from_occurrences))]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every clock with its rate
    Dump,
    /// Show the rate a clock would get
    Round {
        clock: String,
        #[clap(parse(try_from_str = maybe_hex))]
        rate: u64,
    },
    /// Change the rate of a clock
    Set {
        clock: String,
        #[clap(parse(try_from_str = maybe_hex))]
        rate: u64,
    },
    Enable {
        clock: String,
    },
    Disable {
        clock: String,
    },
}

fn init_logging(level: u8) {
    let lf = match level {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(lf)
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            let mut style = buf.style();
            let level = match record.level() {
                log::Level::Error => style.set_color(Color::Red).set_intense(true).value("ERROR"),
                log::Level::Warn =>  style.set_color(Color::Yellow).set_intense(true).value("WARN "),
                log::Level::Info =>  style.set_color(Color::Green).set_intense(true).value("INFO "),
                log::Level::Debug => style.set_color(Color::Cyan).set_intense(true).value("DEBUG"),
                log::Level::Trace => style.set_color(Color::Blue).set_intense(true).value("TRACE"),
            };

            writeln!(buf, "{} {}", level, record.args())
        })
        .init();
}

fn dump(tree: &ClockTree) -> Result<()> {
    for slot in tree.iter() {
        let parent = tree.parent(slot)?.map(|p| p.name.as_str()).unwrap_or("-");
        let rate = tree.rate(&slot.name)?;
        let state = if slot.clock.is_enabled() { "on" } else { "off" };
        println!("{:<12} {:<10} parent={:<10} rate={:<12} {}",
            slot.name, slot.clock.kind(), parent, fmt_rate(rate), state);
    }
    Ok(())
}

fn dump_registers(bus: &MemoryBus) {
    for (addr, value) in bus.words() {
        println!("0x{:08x}: 0x{:08x}", addr, value);
    }
}

fn run(tree: &ClockTree, bus: &MemoryBus, command: Command) -> Result<()> {
    match command {
        Command::Dump => return dump(tree),
        Command::Round { clock, rate } => {
            let rate = tree.round_rate(&clock, rate)?;
            println!("{} {}", clock, fmt_rate(rate));
            return Ok(());
        }
        Command::Set { clock, rate } => {
            let rate = tree.set_rate(&clock, rate)?;
            info!("{} rate={}", clock, fmt_rate(rate));
        }
        Command::Enable { clock } => tree.enable(&clock)?,
        Command::Disable { clock } => tree.disable(&clock)?,
    }

    dump(tree)?;
    dump_registers(bus);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config: Config = serde_yaml::from_str(&read_file_str(&args.config)?)
        .with_context(|| format!("Failed to parse {}", args.config))?;

    let bus = Arc::new(config.register_bank());
    let tree = sunxi_clk::sunxi::init_clocks(&config.clocks, bus.clone(), Arc::new(SpinDelay))?;

    run(&tree, &bus, args.command)
}
