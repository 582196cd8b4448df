//! Minimal headless console example.
//!
//! Registers a few entries, sends commands programmatically and shows a
//! `RUN_ON_MAIN_MENU` variable waiting in the deferred queue until the host
//! reports the main menu.
//!
//! Run with: `cargo run --example minimal`

use bevy::prelude::*;
use dorito_console::prelude::*;

fn main() {
    App::new()
        .add_plugins(MinimalPlugins)
        .add_plugins(ConsolePlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, (drive_frames, print_outputs).chain())
        .run();
}

fn setup(mut console: Console) {
    console.add(
        CommandEntry::int_var("Server.MaxPlayers", 8)
            .module("Server")
            .description("Maximum player count")
            .range(1u32, 16)
            .flags(CommandFlags::ARCHIVED),
    );

    console.add(
        CommandEntry::string_var("Server.Motd", "Welcome")
            .module("Server")
            .description("Message shown once the main menu is up")
            .flags(CommandFlags::RUN_ON_MAIN_MENU),
    );

    console.add(
        CommandEntry::action("greet", |args, out| {
            *out = format!("Hello, {}!", args.get(0).unwrap_or("World"));
            true
        })
        .description("Greet someone")
        .arg("name Who to greet"),
    );

    println!("Console initialized. Registered: Server.MaxPlayers, Server.Motd, greet");
}

/// Send commands on the first frames, then show the main menu.
fn drive_frames(
    mut frame: Local<u32>,
    mut host: ResMut<HostState>,
    mut input: MessageWriter<ConsoleInputEvent>,
    mut exit: MessageWriter<AppExit>,
) {
    *frame += 1;
    match *frame {
        1 => {
            println!("\n--- Sending commands ---");
            input.write(ConsoleInputEvent::new("Server.MaxPlayers"));
            input.write(ConsoleInputEvent::new("Server.MaxPlayers 12"));
            input.write(ConsoleInputEvent::new("Server.MaxPlayers 40"));
            input.write(ConsoleInputEvent::new("greet Developer"));
            input.write(ConsoleInputEvent::new("Server.Motd \"Have fun\""));
        }
        3 => {
            println!("\n--- Main menu shown, draining deferred commands ---");
            host.main_menu_shown = true;
        }
        5 => {
            input.write(ConsoleInputEvent::new("help server"));
            input.write(ConsoleInputEvent::new("writeconfig"));
        }
        7 => {
            exit.write(AppExit::Success);
        }
        _ => {}
    }
}

/// Print console output messages.
fn print_outputs(mut events: MessageReader<ConsoleOutputEvent>) {
    for event in events.read() {
        let prefix = match event.level {
            ConsoleOutputLevel::Info => "[INFO]",
            ConsoleOutputLevel::Error => "[ERROR]",
            ConsoleOutputLevel::Command => "[$]",
            ConsoleOutputLevel::Result => "[>]",
        };
        println!("{} {}", prefix, event.message.trim_end());
    }
}
