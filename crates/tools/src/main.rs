use std::env;
use std::fs;
use std::path::PathBuf;

use foundation::TileCoord;
use layers::Pane;
use runtime::headless::{Harness, PaneState, SurfaceOp};
use runtime::{Event, RefreshPolicy, ViewerConfig};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    let config = take_config(&mut args)?;

    match cmd.as_str() {
        "years" => cmd_years(&config, args),
        "tile-url" => cmd_tile_url(&config, args),
        "center-tiles" => cmd_center_tiles(&config, args),
        "plan" => cmd_plan(config, args),
        _ => Err(usage()),
    }
}

/// Removes `--config FILE` from `args` and loads it; defaults otherwise.
fn take_config(args: &mut Vec<String>) -> Result<ViewerConfig, String> {
    let Some(pos) = args.iter().position(|a| a == "--config") else {
        return Ok(ViewerConfig::default());
    };
    if pos + 1 >= args.len() {
        return Err("--config requires a path".to_string());
    }
    let path = PathBuf::from(args.remove(pos + 1));
    args.remove(pos);

    let raw = fs::read_to_string(&path).map_err(|e| format!("read {path:?}: {e}"))?;
    let config = ViewerConfig::from_json(&raw).map_err(|e| format!("{path:?}: {e}"))?;
    debug!(path = %path.display(), "loaded viewer config");
    Ok(config)
}

fn cmd_years(config: &ViewerConfig, args: Vec<String>) -> Result<(), String> {
    // imagery years
    if let Some(other) = args.first() {
        return Err(format!("unknown arg: {other}\n\n{}", usage()));
    }
    let catalog = config.catalog().map_err(|e| e.to_string())?;
    for year in catalog.list_years() {
        println!(
            "{}\t{}\tnative_zoom={}\t{}",
            year.label,
            year.layer_id,
            config.tiles.native_zoom_for(&year.layer_id),
            config.tiles.url_template(&year.layer_id)
        );
    }
    Ok(())
}

fn parse_num<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, String> {
    raw.parse::<T>()
        .map_err(|_| format!("{name} must be a non-negative integer, got {raw:?}"))
}

fn cmd_tile_url(config: &ViewerConfig, args: Vec<String>) -> Result<(), String> {
    // imagery tile-url <layer_id> <z> <x> <y>
    let [layer_id, z, x, y] = args.as_slice() else {
        return Err(usage());
    };
    let tile = TileCoord::new(
        parse_num("z", z)?,
        parse_num("x", x)?,
        parse_num("y", y)?,
    );
    println!("{}", config.tiles.tile_url(layer_id, tile));
    Ok(())
}

fn cmd_center_tiles(config: &ViewerConfig, args: Vec<String>) -> Result<(), String> {
    // imagery center-tiles [--zoom Z]
    let mut zoom = config.view.zoom;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--zoom" => {
                i += 1;
                let raw = args.get(i).ok_or("--zoom requires a value")?;
                zoom = parse_num("zoom", raw)?;
            }
            other => {
                return Err(format!("unknown arg: {other}\n\n{}", usage()));
            }
        }
        i += 1;
    }

    let catalog = config.catalog().map_err(|e| e.to_string())?;
    let selection = catalog.selection(&config.default_bottom, &config.default_top);
    let tile = TileCoord::containing(config.view.center, zoom);
    for (pane, year) in [(Pane::Bottom, selection.bottom), (Pane::Top, selection.top)] {
        let native = config.tiles.native_zoom_for(&year.layer_id);
        let note = if zoom > native { " (upsampled)" } else { "" };
        println!(
            "{pane}\t{}\t{}{note}",
            year.label,
            config.tiles.tile_url(&year.layer_id, tile)
        );
    }
    Ok(())
}

#[derive(Debug, Default, PartialEq)]
struct PlanArgs {
    bottom: Option<String>,
    top: Option<String>,
    mode: Option<String>,
    water: bool,
    opacity: Option<String>,
    policy: Option<RefreshPolicy>,
}

fn parse_plan_args(args: &[String]) -> Result<PlanArgs, String> {
    let mut out = PlanArgs::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| format!("{flag} requires a value"))
        };
        match flag {
            "--bottom" => out.bottom = Some(value()?),
            "--top" => out.top = Some(value()?),
            "--mode" => out.mode = Some(value()?),
            "--opacity" => out.opacity = Some(value()?),
            "--policy" => {
                let raw = value()?;
                out.policy = Some(match raw.as_str() {
                    "full-rebuild" => RefreshPolicy::FullRebuild,
                    "split-style" => RefreshPolicy::SplitStyle,
                    _ => return Err(format!("unknown policy: {raw}")),
                });
            }
            "--water" => out.water = true,
            other => return Err(format!("unknown arg: {other}\n\n{}", usage())),
        }
        i += 1;
    }
    Ok(out)
}

#[derive(Serialize)]
struct PlanReport<'a> {
    bootstrap: Vec<SurfaceOp>,
    updates: Vec<SurfaceOp>,
    bottom_pane: Option<&'a PaneState>,
    top_pane: Option<&'a PaneState>,
    trace: Vec<&'a Event>,
}

fn cmd_plan(mut config: ViewerConfig, args: Vec<String>) -> Result<(), String> {
    // imagery plan [--bottom ID] [--top ID] [--mode M] [--water] [--opacity V] [--policy P]
    let plan = parse_plan_args(&args)?;
    if let Some(policy) = plan.policy {
        config.refresh_policy = policy;
    }

    let mut h = Harness::start(&config).map_err(|e| e.to_string())?;
    let bootstrap = h.surface.take_ops();

    if let Some(id) = &plan.bottom {
        h.controls.select_bottom(id);
    }
    if let Some(id) = &plan.top {
        h.controls.select_top(id);
    }
    if let Some(mode) = &plan.mode {
        h.controls.select_mode(mode);
    }
    if plan.water {
        h.controls.set_water_boost(true);
    }
    if let Some(v) = &plan.opacity {
        h.controls.drag_opacity(v);
    }
    let handled = h.pump().map_err(|e| e.to_string())?;
    debug!(handled, "replayed control changes");

    let report = PlanReport {
        bootstrap,
        updates: h.surface.take_ops(),
        bottom_pane: h.surface.pane(Pane::Bottom),
        top_pane: h.surface.pane(Pane::Top),
        trace: h.engine.trace().events().collect(),
    };
    let payload = serde_json::to_string_pretty(&report).map_err(|e| format!("json: {e}"))?;
    println!("{payload}");
    Ok(())
}

fn usage() -> String {
    let exe = env::args().next().unwrap_or_else(|| "imagery".to_string());
    format!(
        "Usage:\n  {exe} years\n  {exe} tile-url <layer_id> <z> <x> <y>\n  {exe} center-tiles [--zoom Z]\n  {exe} plan [--bottom ID] [--top ID] [--mode M] [--water] [--opacity V] [--policy full-rebuild|split-style]\n\nEvery command accepts --config <viewer.json> (partial overrides of the built-in config).\nSet RUST_LOG=debug for sync engine logs on stderr.\n"
    )
}
