use std::{env, env::VarError};

/// The server takes no arguments. Any argument prints the help text and the current configuration instead.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // TCS_LEDGER_RPC_URL is left out because it usually embeds an API key
    const DISPLAY_ENVS: [&str; 11] = [
        "RUST_LOG",
        "TCS_DATABASE_URL",
        "TCS_DB_MAX_CONNECTIONS",
        "TCS_COLLECTIONS",
        "TCS_LEDGER_TIMEOUT_SECS",
        "TCS_BLOCK_HEIGHT_INTERVAL_SECS",
        "TCS_STALENESS_WINDOW_SECS",
        "TCS_BUSY_DELAY_MS",
        "TCS_IDLE_DELAY_MS",
        "TCS_POLL_ORDERS",
        "TCS_POLL_BALANCES",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
