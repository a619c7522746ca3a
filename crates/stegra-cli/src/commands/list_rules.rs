//! List rules command implementation.

use stegra_rules::all_rules;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<42} Description", "Code", "Name");
    println!("{}", "-".repeat(110));

    for rule in all_rules() {
        println!(
            "{:<8} {:<42} {}",
            rule.code(),
            rule.name(),
            rule.description()
        );
    }

    println!("\nPresets:");
    println!("  recommended  - All rules, ST007 off unless enabled (default)");
    println!("  strict       - All rules (alias: all)");
    println!("  minimal      - ST001, ST003, ST008, ST009, ST010 (for gradual adoption)");

    println!("\nRules ST004, ST005 and ST013 need options in stegra.toml; see `stegra init`.");

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  stegra check --rules no-multiple-blank-lines,depends-on-last");
    println!("  stegra check --rules ST001,ST002,ST003");
}
