use clap::Parser;
use span_optimizer::layout::evaluate;
use span_optimizer::recommend::recommend;
use span_optimizer::render;
use span_optimizer::request::{DEFAULT_BASE_MARGIN, OptimizeResponse, build_params};
use span_optimizer::types::{DEFAULT_PIECE_LENGTHS, Strategy, WastePolicy, format_grouped};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "span_optimizer",
    about = "1-D span filling optimizer with standard piece lengths"
)]
struct Cli {
    /// Total span length in mm
    #[arg(long, default_value_t = 9500.0)]
    length: f64,

    /// Piece lengths to choose from (default: 1829 1524 1219 914 610)
    #[arg(long = "pieces", num_args = 1..)]
    pieces: Option<Vec<u32>>,

    /// Minimum end margin on each side, in mm
    #[arg(long, default_value_t = DEFAULT_BASE_MARGIN)]
    base_margin: f64,

    /// Extra margin added to each side, in mm
    #[arg(long, default_value_t = 0.0)]
    alpha: f64,

    /// Where leftover space goes: even or right-only
    #[arg(long, default_value = "even", value_parser = parse_policy)]
    policy: WastePolicy,

    /// Strategy to run (repeatable): min-pieces, large-priority, greedy, max-pieces
    #[arg(long = "strategy", value_parser = parse_strategy)]
    strategies: Vec<Strategy>,

    /// Show an ASCII bar of each layout
    #[arg(long)]
    layout: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Log each strategy run to stderr
    #[arg(long, short)]
    verbose: bool,
}

fn parse_policy(s: &str) -> Result<WastePolicy, String> {
    s.parse()
}

fn parse_strategy(s: &str) -> Result<Strategy, String> {
    s.parse()
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let pieces = cli
        .pieces
        .clone()
        .unwrap_or_else(|| DEFAULT_PIECE_LENGTHS.to_vec());

    let params = build_params(cli.length, &pieces, cli.base_margin, cli.alpha, cli.policy)
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let mut strategies = Vec::new();
    for s in &cli.strategies {
        if !strategies.contains(s) {
            strategies.push(*s);
        }
    }
    if strategies.is_empty() {
        strategies = Strategy::ALL.to_vec();
    }

    let results = evaluate(&strategies, &params);
    let recommendation = recommend(&results, params.catalog.is_empty());

    if cli.json {
        let response = OptimizeResponse {
            results,
            recommendation,
        };
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    for result in &results {
        println!("[{}] {}", result.strategy, result.strategy.title());
        if !result.message.is_empty() {
            println!("  {}", result.message);
        }
        for entry in result.summary.iter().skip(1) {
            println!("  {}: {}", entry.metric, entry.value);
        }
        if result.is_success() {
            let detail: Vec<String> = result
                .piece_counts()
                .iter()
                .map(|(len, n)| format!("{}mm x {}", format_grouped(*len as f64, 0), n))
                .collect();
            let detail = if detail.is_empty() {
                "none".to_string()
            } else {
                detail.join(", ")
            };
            println!("  Pieces used: {}", detail);
        }
        if cli.layout {
            print!("{}", render::render_layout(result, params.total_length));
        }
        println!();
    }

    match recommendation {
        Some(rec) => {
            println!("Recommendation:");
            println!(
                "  Least unfilled space: {} ({} mm)",
                rec.least_waste.strategy,
                format_grouped(rec.least_waste.internal_waste, 1)
            );
            println!(
                "  Fewest pieces: {} ({} pieces, {} mm unfilled)",
                rec.fewest_pieces.strategy,
                rec.fewest_pieces.piece_count,
                format_grouped(rec.fewest_pieces.internal_waste, 1)
            );
            println!(
                "  Most pieces: {} ({} pieces, {} mm unfilled)",
                rec.most_pieces.strategy,
                rec.most_pieces.piece_count,
                format_grouped(rec.most_pieces.internal_waste, 1)
            );
        }
        None => println!("No successful layout to recommend."),
    }
}
