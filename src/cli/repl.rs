use anyhow::Result;
use std::io::{self, Write};

use crate::core::message::{ChatMessage, Sender};
use crate::core::store::SessionStore;

pub async fn run(app: super::App) -> Result<()> {
    println!("\x1b[1mtalu\x1b[0m v{}", env!("CARGO_PKG_VERSION"));
    println!("Type \x1b[33m/help\x1b[0m for commands, \x1b[33mCtrl-D\x1b[0m to exit.\n");

    if app.store.sessions().is_empty() {
        print_empty_state(
            "No sessions yet",
            "Start one with /new, or just type a message.",
        );
    } else {
        print_history(&app);
    }

    loop {
        let title = app.store.title();
        if title.is_empty() {
            eprint!("\x1b[32;1mtalu>\x1b[0m ");
        } else {
            eprint!("\x1b[32;1m{title}>\x1b[0m ");
        }
        io::stderr().flush().ok();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => {
                // EOF (Ctrl-D)
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        }

        let input = input.trim().to_string();
        if input.is_empty() {
            continue;
        }

        if input.starts_with('/') {
            match handle_command(&input, &app).await {
                Ok(true) => continue,
                Ok(false) => break,
                Err(e) => {
                    eprintln!("\x1b[31mCommand error: {e}\x1b[0m");
                    continue;
                }
            }
        }

        send_message(&app, &input).await;
    }

    Ok(())
}

/// Send a user message into the current session (creating one if needed)
/// and render the streamed reply.
pub async fn send_message(app: &super::App, text: &str) {
    let session_id = match app.store.current_session() {
        Some(id) => id,
        None => match app.manager.create_session().await {
            Ok(id) => id,
            Err(e) => {
                eprintln!("\x1b[31mCould not create a session: {e}\x1b[0m");
                return;
            }
        },
    };

    app.store
        .add_message(ChatMessage::new_user(session_id.clone(), text.to_string()));

    app.manager.stream_message(&session_id, text).await;
    println!();
}

async fn handle_command(input: &str, app: &super::App) -> Result<bool> {
    let (cmd, arg) = match input.split_once(' ') {
        Some((c, a)) => (c, a.trim()),
        None => (input, ""),
    };

    match cmd {
        "/help" => {
            println!("Commands:");
            println!("  /sessions        list sessions");
            println!("  /new             start a new session");
            println!("  /select <id>     switch to a session");
            println!("  /rename <title>  rename the current session");
            println!("  /delete [id]     delete a session (default: current)");
            println!("  /quit            exit");
        }
        "/sessions" => {
            let sessions = app.store.sessions();
            if sessions.is_empty() {
                print_empty_state("No sessions yet", "Start one with /new.");
                return Ok(true);
            }
            let current = app.store.current_session();
            for session in &sessions {
                let marker = if current.as_deref() == Some(session.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{marker} {}  \x1b[36m{}\x1b[0m  ({})",
                    session.id,
                    session.title,
                    session.last_activity().format("%Y-%m-%d %H:%M")
                );
            }
        }
        "/new" => {
            let id = app.manager.create_session().await?;
            println!("Started session {id}");
        }
        "/select" => {
            if arg.is_empty() {
                eprintln!("Usage: /select <id>");
                return Ok(true);
            }
            app.manager.select_session(arg).await?;
            print_history(app);
        }
        "/rename" => {
            if arg.is_empty() {
                eprintln!("Usage: /rename <title>");
                return Ok(true);
            }
            let Some(session_id) = app.store.current_session() else {
                eprintln!("No session selected.");
                return Ok(true);
            };
            app.manager.rename_session(&session_id, arg).await?;
            println!("Renamed to \"{arg}\"");
        }
        "/delete" => {
            let target = if arg.is_empty() {
                app.store.current_session()
            } else {
                Some(arg.to_string())
            };
            let Some(session_id) = target else {
                eprintln!("No session selected.");
                return Ok(true);
            };
            app.manager.delete_session(&session_id).await?;
            println!("Deleted session {session_id}");
        }
        "/quit" | "/exit" => return Ok(false),
        _ => eprintln!("Unknown command: {cmd} (try /help)"),
    }

    Ok(true)
}

fn print_history(app: &super::App) {
    let messages = app.store.messages();
    if messages.is_empty() {
        print_empty_state("No messages yet", "Type below to start the conversation.");
        return;
    }
    for msg in &messages {
        match msg.sender {
            Sender::User => println!("\x1b[32;1myou>\x1b[0m {}", msg.content),
            Sender::Assistant => println!("{}", msg.content),
        }
    }
}

fn print_empty_state(title: &str, description: &str) {
    println!("\x1b[1m  {title}\x1b[0m");
    println!("  {description}\n");
}
