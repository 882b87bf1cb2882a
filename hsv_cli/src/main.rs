use anyhow::Context;
use std::env;
use std::path::Path;
use tracing::debug;

use hsv_core::{Color, ColorInput, HsvConfig, ImageSource, TextArt, TextArtOptions};

fn print_help() {
    println!(
        r#"hsv {}

            Commands:
            new <config.json>
            add <config.json> <threshold> <color> <text...> [--fade]
            add-image <config.json> <threshold> <image> [max_width] [--fade]
            remove <config.json> <threshold>
            list <config.json>
            judge <config.json> <score...>
            preview <image> [max_width] [aspect]
            gradient <start_color> <end_color> <text...>
            pattern <width> <height> <type> <color1> <color2>
            scheme <color> <type> <count>
            merge <out.json> <strategy> <in.json...>

            Colors: #RGB, #RRGGBBAA, names (red), bytes (255,0,0) or floats (1.0,0,0,0.5).
            Logging: HSV_LOG=debug (falls back to RUST_LOG).

            Examples:
            cargo run -p hsv_cli -- new judgments.json
            cargo run -p hsv_cli -- add judgments.json 115 yellow PERFECT --fade
            cargo run -p hsv_cli -- judge judgments.json 113 99 50
        "#,
        hsv_core::version()
    );
}

fn init_logging() {
    let filter = env::var("HSV_LOG")
        .or_else(|_| env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

fn parse_color(raw: &str) -> anyhow::Result<Color> {
    let input: ColorInput = raw.parse()?;
    input
        .resolve()
        .with_context(|| format!("invalid color '{raw}'"))
}

fn parse_f64(raw: Option<&String>, what: &str) -> anyhow::Result<f64> {
    raw.with_context(|| format!("missing <{what}>"))?
        .parse()
        .with_context(|| format!("{what} must be a number"))
}

/// Render cells with 24-bit ANSI colors for a terminal preview.
fn ansi(art: &TextArt) -> String {
    let mut out = String::new();
    for row in &art.rows {
        for cell in row {
            let (r, g, b) = cell.color.to_rgb_tuple();
            out.push_str(&format!("\x1b[38;2;{r};{g};{b}m{}", cell.ch));
        }
        out.push_str("\x1b[0m\n");
    }
    out
}

fn swatch(color: &Color) -> String {
    let (r, g, b) = color.to_rgb_tuple();
    format!("\x1b[48;2;{r};{g};{b}m    \x1b[0m {}", color.to_hex(true))
}

fn load(path: &str) -> anyhow::Result<HsvConfig> {
    HsvConfig::load(path).with_context(|| format!("failed to load config '{path}'"))
}

fn save(config: &HsvConfig, path: &str) -> anyhow::Result<()> {
    config
        .save(path)
        .with_context(|| format!("failed to save config '{path}'"))
}

fn list(config: &HsvConfig) {
    if config.is_empty() {
        println!("(no judgments)");
        return;
    }
    for j in config.iter_descending() {
        let first_line = j.text.lines().next().unwrap_or("");
        let lines = j.text.lines().count();
        let more = if lines > 1 {
            format!(" (+{} lines)", lines - 1)
        } else {
            String::new()
        };
        println!(
            "  >= {:>8} | {} | fade={:<5} | {}{}",
            j.threshold(),
            j.color.to_hex(true),
            j.fade,
            first_line,
            more
        );
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    // trailing --fade applies to add / add-image
    let fade = args.iter().any(|a| a == "--fade");
    let args: Vec<String> = args.into_iter().filter(|a| a != "--fade").collect();

    debug!(command = %args[1], args = args.len() - 2, fade, "dispatch");
    match args[1].as_str() {
        "new" => {
            let path = args.get(2).context("missing <config.json>")?;
            if Path::new(path).exists() {
                anyhow::bail!("'{path}' already exists");
            }
            save(&HsvConfig::new(), path)?;
            println!("Created empty config: {path}");
        }
        "add" => {
            let path = args.get(2).context("missing <config.json>")?;
            let threshold = parse_f64(args.get(3), "threshold")?;
            let color = parse_color(args.get(4).context("missing <color>")?)?;
            let text = args.get(5..).map(|t| t.join(" ")).unwrap_or_default();

            let mut config = load(path)?;
            config.add(threshold, text, color, fade)?;
            save(&config, path)?;
            println!("Added judgment >= {threshold} and saved {path}");
        }
        "add-image" => {
            let path = args.get(2).context("missing <config.json>")?;
            let threshold = parse_f64(args.get(3), "threshold")?;
            let image = args.get(4).context("missing <image>")?;
            let max_width: u32 = match args.get(5) {
                Some(w) => w.parse().context("max_width must be a positive integer")?,
                None => TextArtOptions::default().max_width,
            };

            let mut config = load(path)?;
            config
                .add_image(threshold, Path::new(image), max_width, fade)
                .with_context(|| format!("failed to convert '{image}'"))?;
            save(&config, path)?;
            println!("Added image judgment >= {threshold} and saved {path}");
        }
        "remove" => {
            let path = args.get(2).context("missing <config.json>")?;
            let threshold = parse_f64(args.get(3), "threshold")?;

            let mut config = load(path)?;
            if config.get(threshold).is_none() {
                println!("No judgment at {threshold}; nothing to do.");
                return Ok(());
            }
            config.remove(threshold);
            save(&config, path)?;
            println!("Removed judgment {threshold} and saved {path}");
        }
        "list" => {
            let path = args.get(2).context("missing <config.json>")?;
            let config = load(path)?;
            println!("Config: {path} ({} judgments)", config.len());
            list(&config);
        }
        "judge" => {
            let path = args.get(2).context("missing <config.json>")?;
            let config = load(path)?;
            if args.len() < 4 {
                anyhow::bail!("missing <score>");
            }
            for raw in &args[3..] {
                let score = parse_f64(Some(raw), "score")?;
                match config.get_judgment_for_score(score) {
                    Some(j) => {
                        println!("{score:>8} -> >= {} {}", j.threshold(), swatch(&j.color));
                        println!("{}", j.text);
                    }
                    None => println!("{score:>8} -> (no judgment)"),
                }
            }
        }
        "preview" => {
            let image = args.get(2).context("missing <image>")?;
            let mut options = TextArtOptions::default();
            if let Some(w) = args.get(3) {
                options.max_width = w.parse().context("max_width must be a positive integer")?;
            }
            if let Some(a) = args.get(4) {
                options.aspect = a.parse().context("aspect must be a number")?;
            }
            let art = hsv_core::textart::from_image_with(
                &ImageSource::from(Path::new(image)),
                &options,
            )?;
            print!("{}", ansi(&art));
        }
        "gradient" => {
            let start = parse_color(args.get(2).context("missing <start_color>")?)?;
            let end = parse_color(args.get(3).context("missing <end_color>")?)?;
            let text = args.get(4..).map(|t| t.join(" ")).unwrap_or_default();
            print!("{}", ansi(&hsv_core::gradient_text(&text, &start, &end)));
        }
        "pattern" => {
            let width: usize = args
                .get(2)
                .context("missing <width>")?
                .parse()
                .context("width must be a number")?;
            let height: usize = args
                .get(3)
                .context("missing <height>")?
                .parse()
                .context("height must be a number")?;
            let kind = args.get(4).context("missing <type>")?;
            let c1 = parse_color(args.get(5).context("missing <color1>")?)?;
            let c2 = parse_color(args.get(6).context("missing <color2>")?)?;
            let art = hsv_core::create_pattern(width, height, kind, &c1, &c2)?;
            print!("{}", ansi(&art));
        }
        "scheme" => {
            let base = parse_color(args.get(2).context("missing <color>")?)?;
            let kind = args.get(3).context("missing <type>")?;
            let count: usize = args
                .get(4)
                .context("missing <count>")?
                .parse()
                .context("count must be a number")?;
            for color in hsv_core::generate_color_scheme(&base, kind, count)? {
                println!("{}", swatch(&color));
            }
        }
        "merge" => {
            let out = args.get(2).context("missing <out.json>")?;
            let strategy = args.get(3).context("missing <strategy>")?;
            let configs = args
                .get(4..)
                .unwrap_or_default()
                .iter()
                .map(|p| load(p))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let merged = hsv_core::merge_configs(&configs, strategy)?;
            save(&merged, out)?;
            println!(
                "Merged {} configs ({} judgments) into {out}",
                configs.len(),
                merged.len()
            );
        }

        _ => print_help(),
    }

    Ok(())
}
