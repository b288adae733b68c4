//! Fiery Script - trigger runner
//!
//! Loads a trigger file, attaches one trigger to a scratch world, runs it and
//! keeps pulsing until nothing is left waiting.
//!
//! ```text
//! fiery-script <trigger-file> [vnum] [--pulses N] [--config path]
//! ```

use anyhow::{bail, Context, Result};
use fiery_config::ScriptConfig;
use fiery_scripting::{AttachType, RecordingHost, RunMode, ScriptEngine, TriggerIndex};
use fiery_world::{Character, Object, Room, World};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: fiery-script <trigger-file> [vnum] [--pulses N] [--config path]";

/// Pulse budget when `--pulses` is not given
const DEFAULT_PULSES: u64 = 600;

struct Args {
    trigger_file: String,
    vnum: Option<i32>,
    pulses: u64,
    config: Option<String>,
}

impl Args {
    fn parse() -> Result<Self> {
        let mut trigger_file = None;
        let mut vnum = None;
        let mut pulses = DEFAULT_PULSES;
        let mut config = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--pulses" => {
                    let value = args.next().context("--pulses needs a value")?;
                    pulses = value.parse().with_context(|| format!("bad pulse count '{}'", value))?;
                }
                "--config" => config = Some(args.next().context("--config needs a path")?),
                "-h" | "--help" => bail!(USAGE),
                _ if trigger_file.is_none() => trigger_file = Some(arg),
                _ if vnum.is_none() => {
                    vnum = Some(arg.parse().with_context(|| format!("bad trigger vnum '{}'", arg))?)
                }
                _ => bail!("unexpected argument '{}'\n{}", arg, USAGE),
            }
        }

        Ok(Self {
            trigger_file: trigger_file.context(USAGE)?,
            vnum,
            pulses,
            config,
        })
    }
}

fn load_config(path: Option<&str>) -> ScriptConfig {
    let loaded = match path {
        Some(path) => ScriptConfig::load_from_file(path),
        None => ScriptConfig::load_default(),
    };
    match loaded {
        Ok(config) => {
            info!("✓ Configuration loaded");
            config
        }
        Err(e) => {
            warn!("⚠️  Failed to load script options: {}", e);
            warn!("   Using default configuration");
            ScriptConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse()?;

    info!("🔥 Fiery Script starting up...");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = load_config(args.config.as_deref());
    config.display();

    info!("📂 Loading triggers from {}...", args.trigger_file);
    let index = TriggerIndex::load_file(&args.trigger_file)
        .with_context(|| format!("loading triggers from {}", args.trigger_file))?;
    info!("✓ {} triggers loaded", index.len());

    let template = match args.vnum {
        Some(vnum) => index.get(vnum).cloned().with_context(|| format!("no trigger #{}", vnum))?,
        None => index
            .iter()
            .min_by_key(|t| t.vnum)
            .cloned()
            .context("trigger file holds no triggers")?,
    };
    info!(
        "🎯 Running trigger #{} '{}' ({})",
        template.vnum,
        template.name,
        template.type_names()
    );

    // Scratch world: one room holding a mob, a player and an object
    let mut world = World::new();
    let room = world.create_room(Room::new(1, "The Scratch Room", 0));
    let mob = world.create_character(Character::mobile(1, "scratch mob", "the scratch mob"));
    let player = world.create_character(Character::player("Tester"));
    let obj = world.create_object(Object::new(1, "scratch object", "a scratch object"));
    world.char_to_room(mob, room)?;
    world.char_to_room(player, room)?;
    world.obj_to_room(obj, room)?;

    let owner = match template.attach_type {
        AttachType::Mobile => mob,
        AttachType::Object => obj,
        AttachType::Room => room,
    };

    let pulses_per_hour = config.pulses_per_mud_hour();
    let random_pulses = config.random_pulses();
    let period = Duration::from_millis(1000 / config.passes_per_sec.max(1));

    let mut engine = ScriptEngine::new(config, index);
    let id = engine.attach(&world, owner, template.vnum, None)?;
    engine.set_local(owner, id, "actor", player);

    let mut host = RecordingHost::new(world);
    let ret = engine.run(&mut host, owner, id, RunMode::New);
    info!("Trigger returned {}", ret);

    let mut interval = tokio::time::interval(period);
    let mut pulse = 0;
    while engine.pending_waits() > 0 && pulse < args.pulses {
        interval.tick().await;
        pulse += 1;
        engine.pulse(&mut host);

        if pulses_per_hour > 0 && pulse % pulses_per_hour == 0 {
            host.world.time.advance_hour();
            engine.time_triggers(&mut host);
        }
        if random_pulses > 0 && pulse % random_pulses == 0 {
            engine.random_triggers(&mut host);
        }
    }

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("📜 {} commands issued over {} pulses", host.commands.len(), pulse);
    for (issuer, line) in &host.commands {
        info!("  {:?} > {}", issuer, line);
    }
    if engine.pending_waits() > 0 {
        warn!("⚠️  {} waits still pending after {} pulses", engine.pending_waits(), pulse);
    }
    for entry in engine.log().entries() {
        warn!("  [{}] {}", entry.kind, entry);
    }

    info!("👋 Done");
    Ok(())
}
