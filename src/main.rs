// algotrace: heuristic action-trace extraction for data-structure visualization

use std::fs;
use std::path::Path;

use algotrace::{parse_source, Container, Player};

fn print_usage(program_name: &str) {
    eprintln!("Usage: {} <file> [--json] [--play]", program_name);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --json    print the full trace as JSON");
    eprintln!("  --play    replay the trace and print the final state");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("algotrace");

    let mut input_file: Option<&str> = None;
    let mut as_json = false;
    let mut play = false;
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--json" => as_json = true,
            "--play" => play = true,
            other if other.starts_with("--") => {
                eprintln!("Error: Unknown option '{}'", other);
                print_usage(program_name);
                std::process::exit(1);
            }
            other => input_file = Some(other),
        }
    }

    let Some(input_file) = input_file else {
        eprintln!("Error: No input file provided");
        eprintln!();
        print_usage(program_name);
        std::process::exit(1);
    };

    if !Path::new(input_file).exists() {
        eprintln!("Error: File '{}' not found", input_file);
        print_usage(program_name);
        std::process::exit(1);
    }

    let source = fs::read_to_string(input_file)?;
    let trace = parse_source(&source);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&trace)?);
        return Ok(());
    }

    println!("Intent: {}", trace.intent);
    println!();

    if trace.data_structures.is_empty() {
        println!("No data structures detected.");
    } else {
        println!("Data structures:");
        for (name, kind) in &trace.data_structures {
            println!("  {} ({})", name, kind);
        }
    }
    println!();

    println!("Actions ({}):", trace.actions.len());
    for (i, action) in trace.actions.iter().enumerate() {
        println!("  {:>4}  {}", i + 1, action);
    }

    if play {
        let mut player = Player::new(&trace);
        player.run_to_end();
        let final_state = player.current();

        println!();
        println!("Final state after {} steps:", player.position());
        for (name, container) in final_state.containers() {
            match container {
                Container::Stack { items }
                | Container::Queue { items }
                | Container::Array { items } => {
                    println!("  {} ({}): [{}]", name, container.kind(), items.join(", "));
                }
                Container::LinkedList { nodes } => {
                    println!("  {} (linkedlist): {}", name, nodes.join(" -> "));
                }
                Container::Grid { rows } => {
                    println!("  {} (matrix): {} row(s)", name, rows.len());
                }
                Container::Map { entries } => {
                    let pairs: Vec<String> = entries
                        .iter()
                        .map(|(k, v)| format!("{}={}", k, v))
                        .collect();
                    println!("  {} (map): {{{}}}", name, pairs.join(", "));
                }
            }
        }

        let mut vars: Vec<(&str, String)> = final_state
            .vars()
            .map(|(name, value)| (name, value.to_string()))
            .collect();
        vars.sort();
        for (name, value) in vars {
            println!("  {} = {}", name, value);
        }
    }

    Ok(())
}
