use crate::config::settings::DisplaySettings;
use crate::response::SimulationData;
use anyhow::Result;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use crossterm::style::Stylize;
use serde_json::{Map, Value};
use std::path::Path;

pub fn spin_table(sim: &SimulationData, settings: &DisplaySettings) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut headers = vec!["#"];
    if settings.show_reels {
        headers.push("Reels");
    }
    headers.extend(["Bet", "Payout", "Result"]);
    table.set_header(
        headers
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for spin in sim.spins.iter().take(settings.max_rows) {
        let mut row = vec![Cell::new(spin.spin_number)];
        if settings.show_reels {
            row.push(Cell::new(spin.symbols()));
        }
        row.push(Cell::new(spin.bet));
        row.push(Cell::new(spin.payout));
        let outcome = match (spin.win_type.is_empty(), spin.is_win) {
            (false, _) => spin.win_type.clone(),
            (true, true) => "Win".to_string(),
            (true, false) => "No win".to_string(),
        };
        let color = if spin.is_win { Color::Green } else { Color::Reset };
        row.push(Cell::new(outcome).fg(color));
        table.add_row(row);
    }

    table
}

pub fn summary_lines(sim: &SimulationData) -> Vec<String> {
    vec![
        format!(
            "{} spins on {} reels at {} per spin",
            sim.total_spins, sim.num_reels, sim.bet_per_spin
        ),
        format!(
            "Wins: {}  Losses: {}  Win rate: {}%",
            sim.wins, sim.losses, sim.win_percentage
        ),
        format!(
            "Total bet: {}  Winnings: {}  Net: {}",
            sim.total_bet, sim.total_winnings, sim.net_profit
        ),
    ]
}

pub fn display_simulation(sim: &SimulationData, settings: &DisplaySettings) {
    if sim.spins.is_empty() {
        println!("{}", "No spins returned.".yellow());
    } else {
        println!("{}", spin_table(sim, settings));
        if sim.spins.len() > settings.max_rows {
            println!(
                "{}",
                format!("... {} more spins not shown", sim.spins.len() - settings.max_rows)
                    .yellow()
            );
        }
    }

    println!();
    for line in summary_lines(sim) {
        println!("{line}");
    }
    let net = format!("Net profit: {}", sim.net_profit);
    if sim.net_profit >= 0.0 {
        println!("{}", net.green());
    } else {
        println!("{}", net.red());
    }
}

/// Fallback view for `data` payloads that do not match the documented shape.
pub fn display_fields(data: &Map<String, Value>) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Field").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    for (key, value) in data {
        table.add_row(vec![key.clone(), value_to_cell(value)]);
    }
    println!("{table}");
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "NULL".to_string(),
        v => v.to_string(),
    }
}

pub fn export_spins_to_csv(sim: &SimulationData, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["spin", "reels", "bet", "payout", "win_type", "is_win"])?;
    for spin in &sim.spins {
        wtr.write_record([
            spin.spin_number.to_string(),
            spin.reels
                .iter()
                .map(|r| r.name.as_str())
                .collect::<Vec<_>>()
                .join("|"),
            spin.bet.to_string(),
            spin.payout.to_string(),
            spin.win_type.clone(),
            spin.is_win.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{Reel, Spin};
    use tempfile::TempDir;

    fn sample() -> SimulationData {
        let reel = |symbol: &str, name: &str| Reel {
            symbol: symbol.to_string(),
            name: name.to_string(),
        };
        SimulationData {
            total_spins: 2,
            num_reels: 2,
            bet_per_spin: 1.0,
            spins: vec![
                Spin {
                    spin_number: 1,
                    reels: vec![reel("7", "Seven"), reel("7", "Seven")],
                    bet: 1.0,
                    payout: 20.0,
                    win_type: "Jackpot".to_string(),
                    is_win: true,
                },
                Spin {
                    spin_number: 2,
                    reels: vec![reel("B", "Bell"), reel("C", "Cherry")],
                    bet: 1.0,
                    payout: 0.0,
                    win_type: String::new(),
                    is_win: false,
                },
            ],
            total_bet: 2.0,
            total_winnings: 20.0,
            net_profit: 18.0,
            wins: 1,
            losses: 1,
            win_percentage: 50.0,
            available_symbols: vec![],
        }
    }

    #[test]
    fn test_spin_table_respects_max_rows_and_reels() {
        let settings = DisplaySettings {
            show_reels: false,
            max_rows: 1,
        };
        let rendered = spin_table(&sample(), &settings).to_string();
        assert!(rendered.contains("Jackpot"));
        assert!(!rendered.contains("No win"));
        assert!(!rendered.contains("Reels"));
    }

    #[test]
    fn test_spin_table_fills_missing_win_type() {
        let rendered = spin_table(&sample(), &DisplaySettings::default()).to_string();
        assert!(rendered.contains("No win"));
        assert!(rendered.contains("7 7"));
    }

    #[test]
    fn test_summary() {
        let lines = summary_lines(&sample());
        assert_eq!(lines[0], "2 spins on 2 reels at 1 per spin");
        assert_eq!(lines[1], "Wins: 1  Losses: 1  Win rate: 50%");
    }

    #[test]
    fn test_csv_export() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spins.csv");
        export_spins_to_csv(&sample(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "spin,reels,bet,payout,win_type,is_win");
        assert_eq!(lines[1], "1,Seven|Seven,1,20,Jackpot,true");
        assert_eq!(lines[2], "2,Bell|Cherry,1,0,,false");
    }
}
