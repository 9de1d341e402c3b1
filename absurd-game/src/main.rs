use absurd_game::config::GameConfig;
use absurd_game::models::{Author, Genre};
use absurd_game::services::game::{Game, GameError};
use absurd_game::services::metrics::gather_metrics;
use absurd_game::startup::Application;
use game_core::observability::init_tracing;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::signal;

const HELP: &str = "\
Команды:
  genres          список жанров
  play <жанр>     начать жанр
  next | <Enter>  следующая фраза
  back            вернуться к выбору жанра
  chat <текст>    написать Абсурд-боту
  history         история чата
  stats           метрики
  quit            выход";

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

async fn say(out: &mut Stdout, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}

/// Handle one input line. Returns `false` when the user asked to quit.
async fn dispatch(game: &Game, line: &str, out: &mut Stdout) -> std::io::Result<bool> {
    let line = line.trim();
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "" | "next" => match game.next_phrase().await {
            Some(phrase) => say(out, &format!("» {phrase}")).await?,
            None => say(out, "Сначала выбери жанр: play <жанр>").await?,
        },
        "genres" => {
            for genre in Genre::all() {
                say(out, &format!("{genre}  [{}]  {}", genre.id, genre.description)).await?;
            }
        }
        "play" => match game.select_genre(rest).await {
            Ok(selection) => {
                say(
                    out,
                    &format!("{} · {} фраз", selection.genre, selection.phrase_count),
                )
                .await?;
                if let Some(phrase) = selection.first_phrase {
                    say(out, &format!("» {phrase}")).await?;
                }
            }
            Err(GameError::Busy) => say(out, "Подожди, жанр ещё загружается…").await?,
            Err(GameError::Load(e)) => {
                say(out, &format!("Ошибка загрузки фраз для жанра: {e}")).await?
            }
        },
        "back" => {
            game.back_to_genres().await;
            say(out, "Выбери жанр: genres").await?;
        }
        "chat" => match game.send_chat(rest).await {
            Some(reply) => say(out, &format!("🤖 {reply}")).await?,
            None => say(out, "Напиши что-нибудь после chat").await?,
        },
        "history" => {
            for entry in game.chat_history() {
                let who = match entry.author {
                    Author::User => "ты",
                    Author::Bot => "бот",
                };
                say(out, &format!("{who}: {}", entry.text)).await?;
            }
        }
        "stats" => {
            say(out, &format!("Показано фраз: {}", game.shown_count().await)).await?;
            say(
                out,
                &format!(
                    "Порядок фраз: {:?}, история чата: {} сообщений",
                    game.cursor_policy().await,
                    game.transcript_capacity()
                ),
            )
            .await?;
            say(out, gather_metrics().trim_end()).await?;
        }
        "help" => say(out, HELP).await?,
        "quit" | "exit" => return Ok(false),
        _ => say(out, HELP).await?,
    }

    Ok(true)
}

async fn run(game: &Game) -> std::io::Result<()> {
    let mut out = io::stdout();
    let mut lines = BufReader::new(io::stdin()).lines();

    say(&mut out, "🎭 Абсурдная Игра").await?;
    game.welcome();
    if let Some(entry) = game.chat_history().last() {
        say(&mut out, &format!("🤖 {}", entry.text)).await?;
    }
    say(&mut out, HELP).await?;

    while let Some(line) = lines.next_line().await? {
        if !dispatch(game, &line, &mut out).await? {
            break;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = GameConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {e}");
        std::io::Error::other(format!("Configuration error: {e}"))
    })?;

    init_tracing("absurd-game", &config.logging);

    let app = Application::build(config).map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {e}"))
    })?;

    tracing::info!(
        cursor_policy = ?app.config().phrases.cursor_policy,
        providers = app.game().provider_count(),
        "Absurd game started"
    );

    tokio::select! {
        result = run(app.game()) => result?,
        _ = shutdown_signal() => {}
    }

    tracing::info!(shown = app.game().shown_count().await, "Absurd game stopped");
    Ok(())
}
