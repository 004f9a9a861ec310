pub mod json;
pub mod table;

use crate::model::SnapshotRecord;
use crate::store::update::UpdateOutcome;

pub fn print_record(record: &SnapshotRecord, json_output: bool) {
    if json_output {
        println!("{}", json::render(record));
    } else {
        print!("{}", table::render(record));
    }
}

pub fn print_outcome(outcome: &UpdateOutcome, diagnostics: &[String], json_output: bool, verbose: bool) {
    if json_output {
        println!("{}", json::render(outcome.changes()));
        return;
    }

    match outcome {
        UpdateOutcome::NoData { existing } => {
            println!("No prices extracted; stored snapshot left unchanged.");
            if existing.is_none() {
                println!("Nothing has been stored yet.");
            }
        }
        UpdateOutcome::Unchanged { record } => {
            println!("No price changes since {}.", record.updated_at_display());
        }
        UpdateOutcome::Updated { record, changes } => {
            print!("{}", table::render_changes(changes));
            println!(
                "\n{} changed of {} games, saved at {}",
                changes.len(),
                record.current.len(),
                record.updated_at_display()
            );
        }
    }

    print_diagnostics(diagnostics, verbose);
}

fn print_diagnostics(diagnostics: &[String], verbose: bool) {
    if diagnostics.is_empty() {
        return;
    }

    println!();
    if verbose {
        println!("Diagnostics:");
        println!("{}", "-".repeat(40));
        for diagnostic in diagnostics {
            println!("  {diagnostic}");
        }
    } else {
        for diagnostic in diagnostics {
            println!("[diagnostic] {diagnostic}");
        }
    }
}
