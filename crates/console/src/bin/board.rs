//! `kiosk-board` -- interactive threaded-comment console.
//!
//! Connects to the comment backend, renders one page of the tree at a
//! time, and maps console commands onto board operations. Every
//! mutation reloads the visible page; a failed one leaves it untouched
//! and prints the error instead.
//!
//! # Environment variables
//!
//! | Variable             | Required | Default | Description                     |
//! |----------------------|----------|---------|---------------------------------|
//! | `KIOSK_COMMENTS_URL` | no       | `http://localhost:8080/tree_comments/api` | Comment backend base URL |

use std::io::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kiosk_comments::api::CommentsApi;
use kiosk_comments::board::CommentBoard;
use kiosk_comments::render::render_page;
use kiosk_console::{is_yes, parse_board_command, BoardCommand, BOARD_HELP};

const DEFAULT_BASE_URL: &str = "http://localhost:8080/tree_comments/api";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kiosk_board=info,kiosk_comments=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url =
        std::env::var("KIOSK_COMMENTS_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    tracing::info!(base_url = %base_url, "Comment board console starting");

    let mut board = CommentBoard::new(CommentsApi::new(base_url));
    match board.refresh().await {
        Ok(page) => print!("{}", render_page(&page)),
        Err(e) => eprintln!("error: {e}"),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        let Ok(Some(line)) = lines.next_line().await else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_board_command(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        let result = match command {
            BoardCommand::Help => {
                println!("{BOARD_HELP}");
                continue;
            }
            BoardCommand::Quit => break,
            BoardCommand::Reload => board.refresh().await.map(Some),
            BoardCommand::NextPage => board.next_page().await.map(Some),
            BoardCommand::PrevPage => board.prev_page().await,
            BoardCommand::Sort(order) => board.set_sort(order).await.map(Some),
            BoardCommand::Find(text) => board.search(&text).await.map(Some),
            BoardCommand::Add(text) => board.post_root(&text).await.map(Some),
            BoardCommand::Reply { parent, text } => {
                board.post_reply(&parent, &text).await.map(Some)
            }
            BoardCommand::Remove(id) => {
                print!("Delete comment {id} and all its replies? [y/N] ");
                let _ = std::io::stdout().flush();
                let Ok(Some(answer)) = lines.next_line().await else {
                    break;
                };
                if !is_yes(&answer) {
                    println!("Kept.");
                    continue;
                }
                board.delete(&id).await.map(Some)
            }
        };

        match result {
            Ok(Some(page)) => print!("{}", render_page(&page)),
            Ok(None) => println!("Already on the first page."),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    tracing::info!("Comment board console exiting");
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
