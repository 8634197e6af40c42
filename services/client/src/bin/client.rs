//! services/client/src/bin/client.rs
//!
//! The terminal front end: wires configuration, adapters and storage tiers
//! into the shared state, resumes a stored credential or runs the auth flow,
//! then drives the session machines from a small command loop.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use client_lib::{
    adapters::{HttpBackend, JsonFileStore, MemoryStore},
    config::Config,
    error::ClientError,
    session::{
        ActionError, ActiveTab, AppState, ArtifactGenerator, AuthFlow, AuthMode, ChatPanel,
        HistoryBrowser, SourceManager, UploadFile,
    },
};
use study_assistant_core::domain::{Credential, Difficulty};
use study_assistant_core::quiz::ScoreBand;
use study_assistant_core::vault::CredentialVault;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

enum SessionOutcome {
    Logout,
    Expired,
    Quit,
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Backend at {}", config.api_base_url);

    // --- 2. Build Adapters and Storage Tiers ---
    let backend = Arc::new(HttpBackend::new(&config.api_base_url, config.http_timeout)?);
    let durable = Arc::new(JsonFileStore::open(config.storage_dir.join("storage.json")));
    let session_tier = Arc::new(MemoryStore::new());
    let vault = Arc::new(CredentialVault::new(durable.clone(), session_tier));

    // --- 3. Build the Shared AppState ---
    let state = Arc::new(AppState {
        auth_api: backend.clone(),
        source_api: backend.clone(),
        generation_api: backend.clone(),
        chat_api: backend,
        vault,
        durable_store: durable,
    });

    // --- 4. Authenticate (resume or prompt) and Run Sessions ---
    loop {
        let credential = match state.vault.load() {
            Some(stored) => {
                println!("Welcome back, {}!", stored.user.username);
                stored
            }
            None => match run_auth(state.clone()).await? {
                Some(credential) => credential,
                None => break,
            },
        };

        match run_session(state.clone(), credential).await? {
            SessionOutcome::Logout => {
                state.vault.clear();
                println!("Logged out.");
            }
            SessionOutcome::Expired => {
                println!("Your session has expired. Please log in again.");
            }
            SessionOutcome::Quit => break,
        }
    }

    Ok(())
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Runs the login/register form until it succeeds or the user quits.
async fn run_auth(state: Arc<AppState>) -> Result<Option<Credential>, ClientError> {
    let mut flow = AuthFlow::new(state);
    loop {
        match flow.mode() {
            AuthMode::Login => println!("-- Login (type 'switch' to register, 'quit' to exit) --"),
            AuthMode::Register => println!("-- Register (type 'switch' to log in, 'quit' to exit) --"),
        }
        let username = prompt("Username: ")?;
        match username.as_str() {
            "switch" => {
                flow.toggle_mode();
                continue;
            }
            "quit" => return Ok(None),
            _ => flow.username = username,
        }
        if flow.mode() == AuthMode::Register {
            flow.email = prompt("Email: ")?;
        }
        flow.password = prompt("Password: ")?;
        flow.remember_me = prompt("Remember me? [y/N]: ")?.eq_ignore_ascii_case("y");

        // submit() only hits the network after client-side validation passes.
        match flow.submit().await {
            Some(credential) => {
                println!("Signed in as {}.", credential.user.username);
                return Ok(Some(credential));
            }
            None => {
                if let Some(error) = flow.error() {
                    println!("! {}", error);
                }
            }
        }
    }
}

async fn run_session(
    state: Arc<AppState>,
    credential: Credential,
) -> Result<SessionOutcome, ClientError> {
    let token = credential.token.clone();
    let user_id = credential.user.id;

    let mut sources = SourceManager::new(state.clone(), user_id);
    let mut generator = ArtifactGenerator::new(state.clone(), user_id);
    let mut history = HistoryBrowser::new(state.clone());
    let mut chat = ChatPanel::new(state.clone(), user_id);

    if let Err(e) = sources.load(&token).await {
        if e == ActionError::SessionExpired {
            return Ok(SessionOutcome::Expired);
        }
        println!("! Could not load sources: {}", e);
    }
    if let Err(e) = chat.bootstrap(&token).await {
        if e == ActionError::SessionExpired {
            return Ok(SessionOutcome::Expired);
        }
        println!("! Could not start chat: {}", e);
    }
    history.refresh_best_effort(&token).await;

    println!("Type 'help' for commands.");
    loop {
        let line = prompt("> ")?;
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");
        let rest: Vec<&str> = parts.collect();

        let result = match command {
            "" => Ok(()),
            "help" => {
                print_help();
                Ok(())
            }
            "sources" => {
                print_sources(&sources);
                Ok(())
            }
            "upload" => upload(&mut sources, &token, &rest).await,
            "paste" => {
                let text = prompt("Paste your study material: ")?;
                sources.add_text(&token, &text).await
            }
            "select" => {
                match source_id(&sources, &rest) {
                    Some(id) => sources.toggle_selection(&id),
                    None => println!("! No such source"),
                }
                Ok(())
            }
            "select-all" => {
                sources.select_all();
                Ok(())
            }
            "delete" => match source_id(&sources, &rest) {
                Some(id) => sources.delete(&token, &id).await,
                None => {
                    println!("! No such source");
                    Ok(())
                }
            },
            "cards" => {
                let count = rest.first().and_then(|c| c.parse().ok()).unwrap_or(5);
                let material = sources.selected_content();
                let result = generator
                    .generate_flashcards(&token, &material, count, &mut history)
                    .await;
                if result.is_ok() {
                    print_flashcards(&generator);
                }
                result
            }
            "quiz" => {
                let count = rest.first().and_then(|c| c.parse().ok()).unwrap_or(5);
                let difficulty = rest
                    .get(1)
                    .and_then(|d| Difficulty::parse(d))
                    .unwrap_or(Difficulty::Medium);
                let material = sources.selected_content();
                let result = generator
                    .generate_quiz(&token, &material, count, difficulty, &mut history)
                    .await;
                if result.is_ok() {
                    print_quiz(&generator);
                }
                result
            }
            "reveal" => {
                if let (Some(view), Some(index)) = (
                    generator.flashcards_mut(),
                    rest.first().and_then(|i| i.parse::<usize>().ok()),
                ) {
                    view.toggle_reveal(index.saturating_sub(1));
                }
                print_flashcards(&generator);
                Ok(())
            }
            "answer" => {
                answer(&mut generator, &rest);
                Ok(())
            }
            "submit" => {
                submit_quiz(&mut generator);
                Ok(())
            }
            "retake" => {
                if let Some(view) = generator.quiz_mut() {
                    view.attempt.retake();
                    println!("Answers cleared. Good luck!");
                }
                Ok(())
            }
            "history" => {
                history.refresh_best_effort(&token).await;
                print_history(&history);
                Ok(())
            }
            "view-cards" => {
                let index = rest.first().and_then(|i| i.parse::<usize>().ok()).unwrap_or(0);
                if history.view_flashcard_set(index.saturating_sub(1), &mut generator) {
                    print_flashcards(&generator);
                } else {
                    println!("! No such flashcard set");
                }
                Ok(())
            }
            "view-quiz" => {
                let index = rest.first().and_then(|i| i.parse::<usize>().ok()).unwrap_or(0);
                if history.view_quiz_set(index.saturating_sub(1), &mut generator) {
                    print_quiz(&generator);
                } else {
                    println!("! No such quiz");
                }
                Ok(())
            }
            "delete-cards" => {
                delete_from_history(&mut history, &token, &rest, true).await
            }
            "delete-quiz" => {
                delete_from_history(&mut history, &token, &rest, false).await
            }
            "chat" => {
                let text = rest.join(" ");
                let selected = sources.selected_content();
                let result = chat.send_message(&token, &text, &selected).await;
                for message in chat.messages().iter().rev().take(2).rev() {
                    println!("[{}] {}", message.role.as_str(), message.content);
                }
                result
            }
            "clear-chat" => {
                if prompt("Discard the whole conversation? [y/N]: ")?.eq_ignore_ascii_case("y") {
                    chat.clear_chat(&token).await
                } else {
                    Ok(())
                }
            }
            "logout" => return Ok(SessionOutcome::Logout),
            "quit" => return Ok(SessionOutcome::Quit),
            other => {
                println!("! Unknown command '{}'. Type 'help'.", other);
                Ok(())
            }
        };

        match result {
            Ok(()) => {}
            Err(ActionError::SessionExpired) => return Ok(SessionOutcome::Expired),
            Err(error) => println!("! {}", error),
        }
    }
}

fn print_help() {
    println!("sources | upload <path> | paste | select <n> | select-all | delete <n>");
    println!("cards [count] | quiz [count] [easy|medium|hard] | reveal <n>");
    println!("answer <question> <option> | submit | retake");
    println!("history | view-cards <n> | view-quiz <n> | delete-cards <n> | delete-quiz <n>");
    println!("chat <message> | clear-chat | logout | quit");
}

fn print_sources(sources: &SourceManager) {
    if sources.sources().is_empty() {
        println!("No sources yet. Use 'upload' or 'paste'.");
        return;
    }
    for (i, source) in sources.sources().iter().enumerate() {
        let mark = if sources.is_selected(&source.id) { "x" } else { " " };
        println!(
            "{:>3}. [{}] {} ({}, {} chars)",
            i + 1,
            mark,
            source.name,
            source.kind.as_str(),
            source.content.len()
        );
    }
}

fn source_id(sources: &SourceManager, rest: &[&str]) -> Option<String> {
    let index = rest.first()?.parse::<usize>().ok()?.checked_sub(1)?;
    sources.sources().get(index).map(|s| s.id.clone())
}

async fn upload(
    sources: &mut SourceManager,
    token: &str,
    rest: &[&str],
) -> Result<(), ActionError> {
    let mut files = Vec::new();
    for path in rest {
        let path = Path::new(path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        match std::fs::read(path) {
            Ok(bytes) => files.push(UploadFile { name, bytes }),
            Err(e) => println!("! {}: {}", name, e),
        }
    }
    if files.is_empty() {
        println!("Usage: upload <path> [more paths]");
        return Ok(());
    }
    let errors = sources.upload(token, files).await?;
    for error in errors {
        println!("! {}", error);
    }
    print_sources(sources);
    Ok(())
}

fn print_flashcards(generator: &ArtifactGenerator) {
    let Some(view) = generator.flashcards() else {
        println!("No flashcards yet. Use 'cards'.");
        return;
    };
    println!("== {} ==", view.title);
    if let Some(warning) = &view.warning {
        println!("(note: {})", warning);
    }
    for (i, card) in view.cards.iter().enumerate() {
        println!("{:>3}. Q: {}", i + 1, card.question);
        if view.is_revealed(i) {
            println!("     A: {}", card.answer);
        }
    }
}

fn answer(generator: &mut ArtifactGenerator, rest: &[&str]) {
    let question = rest.first().and_then(|q| q.parse::<usize>().ok());
    let option = rest.get(1).and_then(|o| o.parse::<usize>().ok());
    let Some(view) = generator.quiz_mut() else {
        println!("No quiz yet. Use 'quiz'.");
        return;
    };
    match (question, option) {
        (Some(q), Some(o)) if q >= 1 && o >= 1 => {
            if view.attempt.is_submitted() {
                println!("! Quiz already submitted; use 'retake' to try again.");
                return;
            }
            if !view.select_answer(q - 1, o - 1) {
                println!("! No such question or option.");
                return;
            }
            println!("{} of {} answered.", view.attempt.answered_count(), view.questions.len());
        }
        _ => println!("Usage: answer <question> <option>"),
    }
}

fn submit_quiz(generator: &mut ArtifactGenerator) {
    let Some(view) = generator.quiz_mut() else {
        println!("No quiz yet. Use 'quiz'.");
        return;
    };
    if !view.attempt.submit() {
        println!(
            "! Answer every question first ({} of {} answered).",
            view.attempt.answered_count(),
            view.questions.len()
        );
        return;
    }
    let score = view.attempt.score(&view.questions);
    let percentage = view.attempt.percentage(&view.questions);
    let verdict = match view.attempt.band(&view.questions) {
        ScoreBand::Success => "Great work!",
        ScoreBand::Warning => "Not bad, keep studying.",
        ScoreBand::Danger => "Time to review the material.",
    };
    println!(
        "Score: {}/{} ({}%) - {}",
        score,
        view.questions.len(),
        percentage,
        verdict
    );
    for (i, question) in view.questions.iter().enumerate() {
        let chosen = view.attempt.selected(i);
        let correct = chosen.is_some() && chosen == question.correct_answer;
        println!("{:>3}. {} {}", i + 1, if correct { "✓" } else { "✗" }, question.question);
        if !correct {
            if let Some(answer) = question.correct_answer.and_then(|c| question.options.get(c)) {
                println!("     correct answer: {}", answer);
            }
            if let Some(explanation) = &question.explanation {
                println!("     {}", explanation);
            }
        }
    }
}

fn print_quiz(generator: &ArtifactGenerator) {
    let Some(view) = generator.quiz() else {
        println!("No quiz yet. Use 'quiz'.");
        return;
    };
    println!("== {} ==", view.title);
    if let Some(warning) = &view.warning {
        println!("(note: {})", warning);
    }
    for (i, question) in view.questions.iter().enumerate() {
        println!("{:>3}. {}", i + 1, question.question);
        for (j, option) in question.options.iter().enumerate() {
            let mark = if view.attempt.selected(i) == Some(j) { ">" } else { " " };
            println!("    {} {}. {}", mark, j + 1, option);
        }
    }
    if generator.active_tab == ActiveTab::Quiz {
        println!("Answer with 'answer <question> <option>', then 'submit'.");
    }
}

fn print_history(history: &HistoryBrowser) {
    println!("-- Flashcard sets --");
    if history.flashcard_sets().is_empty() {
        println!("(none)");
    }
    for (i, set) in history.flashcard_sets().iter().enumerate() {
        println!(
            "{:>3}. {} ({} cards, {})",
            i + 1,
            set.title,
            set.flashcards.len(),
            set.created_at.format("%Y-%m-%d")
        );
    }
    println!("-- Quizzes --");
    if history.quiz_sets().is_empty() {
        println!("(none)");
    }
    for (i, set) in history.quiz_sets().iter().enumerate() {
        println!(
            "{:>3}. {} ({} questions, {})",
            i + 1,
            set.title,
            set.questions.len(),
            set.created_at.format("%Y-%m-%d")
        );
    }
}

async fn delete_from_history(
    history: &mut HistoryBrowser,
    token: &str,
    rest: &[&str],
    flashcards: bool,
) -> Result<(), ActionError> {
    let index = rest
        .first()
        .and_then(|i| i.parse::<usize>().ok())
        .and_then(|i| i.checked_sub(1));
    let id = match index {
        Some(i) if flashcards => history.flashcard_sets().get(i).map(|s| s.id),
        Some(i) => history.quiz_sets().get(i).map(|s| s.id),
        None => None,
    };
    let Some(id) = id else {
        println!("! No such set");
        return Ok(());
    };
    let confirm = prompt("Delete this set permanently? [y/N]: ")
        .map_err(|e| ActionError::Message(e.to_string()))?;
    if !confirm.eq_ignore_ascii_case("y") {
        return Ok(());
    }
    if flashcards {
        history.delete_flashcard_set(token, id).await
    } else {
        history.delete_quiz_set(token, id).await
    }
}
