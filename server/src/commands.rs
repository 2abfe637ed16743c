//! Canned replies for the commands an operator tool sends.

/// Reply text the way a vanilla server with LuckPerms would phrase it.
pub fn default_response(command: &str) -> String {
    let mut words = command.split_whitespace();

    match words.next() {
        Some("stop") => "Stopping the server".to_string(),
        Some("list") => "There are 0 of a max of 20 players online: ".to_string(),
        Some("say") => format!("[Server] {}", words.collect::<Vec<_>>().join(" ")),
        Some("lp") => luckperms(&words.collect::<Vec<_>>()),
        _ => unknown(command),
    }
}

// lp user <name> permission set <node> <value>
fn luckperms(args: &[&str]) -> String {
    match args {
        ["user", name, "permission", "set", node, value] => {
            format!("[LP] Set {} to {} for {} in context global.", node, value, name)
        }
        ["user", name, "permission", "unset", node] => {
            format!("[LP] Unset {} for {} in context global.", node, name)
        }
        _ => "[LP] Command not recognised.".to_string(),
    }
}

fn unknown(command: &str) -> String {
    format!(
        "Unknown or incomplete command, see below for error{}<--[HERE]",
        command
    )
}
