use std::collections::HashSet;

use voicelog::commands;

#[test]
fn test_all_commands_contain_expected_names() {
    let cmds = commands::all();
    let names: HashSet<&str> = cmds.iter().map(|cmd| cmd.name.as_str()).collect();

    let expected = ["help", "setvlog", "setlang", "unsetvlog", "join", "leave"];
    assert_eq!(cmds.len(), expected.len());
    for name in &expected {
        assert!(
            names.contains(name),
            "Expected command '{}' not found in commands::all(). Present names: {:?}",
            name,
            names
        );
    }
}

#[test]
fn test_no_duplicate_command_names() {
    let cmds = commands::all();
    let mut seen = HashSet::new();

    for cmd in &cmds {
        assert!(
            seen.insert(cmd.name.as_str()),
            "Duplicate command name found: '{}'",
            cmd.name
        );
    }
}

#[test]
fn test_all_commands_are_prefix_and_slash_commands() {
    for cmd in &commands::all() {
        assert!(
            cmd.slash_action.is_some(),
            "Command '{}' is not a slash command",
            cmd.name
        );
        assert!(
            cmd.prefix_action.is_some(),
            "Command '{}' is not a prefix command",
            cmd.name
        );
    }
}
