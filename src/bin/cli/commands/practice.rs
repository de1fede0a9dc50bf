use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use vocab_lib::vocabulary::scheduler::format_interval;
use vocab_lib::vocabulary::{
    build_session, AdvanceEvent, ExerciseKind, GuessRating, PracticeSession, SessionParams,
};

use crate::app::App;
use crate::render::terminal::{paint, status_label, Color};

/// Read one line; None on EOF or when the learner types `q`
fn prompt(text: &str) -> Result<Option<String>> {
    print!("{} ", text);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let line = line.trim_end_matches(['\r', '\n']).to_string();
    if line.trim().eq_ignore_ascii_case("q") {
        return Ok(None);
    }
    Ok(Some(line))
}

fn read_rating() -> Result<Option<GuessRating>> {
    loop {
        let Some(input) = prompt("[1] forgot  [2] partially  [3] knew it:")? else {
            return Ok(None);
        };
        match input.trim() {
            "1" => return Ok(Some(GuessRating::Forgot)),
            "2" => return Ok(Some(GuessRating::Partial)),
            "3" => return Ok(Some(GuessRating::Knew)),
            _ => println!("Please answer 1, 2 or 3."),
        }
    }
}

pub async fn run(app: &App, params: SessionParams, seed: Option<u64>, use_color: bool) -> Result<()> {
    let pool = app.list_words()?;
    let scheduler = app.scheduler();
    let now = scheduler.now();

    let items = match seed {
        Some(seed) => build_session(&pool, &params, now, &mut StdRng::seed_from_u64(seed)),
        None => build_session(&pool, &params, now, &mut rand::thread_rng()),
    };

    if items.is_empty() {
        println!("Nothing to practice. Add words with `vocab-cli add`.");
        return Ok(());
    }

    let mut session = PracticeSession::new(items, scheduler.clone());
    let delay = Duration::from_millis(app.config.session.feedback_delay_ms);
    let mut quit = false;

    println!("Practice: {} exercises (q to quit)\n", session.total_count());

    while !session.is_finished() {
        let item = session.present()?.clone();
        let progress = format!("[{}/{}]", session.completed_count(), session.total_count());
        println!("{}", paint(&progress, Color::DIM, use_color));

        let feedback = match item.kind {
            ExerciseKind::Guess => {
                println!("{}", paint(&item.word_data.word, Color::BOLD, use_color));
                if prompt("Recall the meaning, then press Enter:")?.is_none() {
                    quit = true;
                    break;
                }
                println!("{}", item.word_data.definition);
                for example in &item.word_data.examples {
                    println!("  \u{2022} {}", example);
                }
                let Some(rating) = read_rating()? else {
                    quit = true;
                    break;
                };
                session.submit_guess(rating)?
            }
            ExerciseKind::Write => {
                println!("{}", paint(&item.word_data.definition, Color::BOLD, use_color));
                let Some(answer) = prompt("Type the word:")? else {
                    quit = true;
                    break;
                };
                let feedback = session.submit_written(&answer)?;
                if feedback.quality == 5 {
                    println!("{}", paint("Correct!", Color::GREEN, use_color));
                } else {
                    println!(
                        "{} {}",
                        paint("Not quite. It was:", Color::RED, use_color),
                        item.word_data.word
                    );
                }
                feedback
            }
        };

        println!("Accuracy {:.0}%", feedback.accuracy * 100.0);
        tokio::time::sleep(delay).await;

        let word = session.finish_feedback()?;
        println!(
            "{}, next review in {}",
            status_label(word.status(), use_color),
            format_interval(feedback.interval_days)
        );
        if prompt("Enter to continue:")?.is_none() {
            quit = true;
            break;
        }

        match session.advance()? {
            AdvanceEvent::RetrySameCard => println!("\nOnce more.\n"),
            AdvanceEvent::Next => println!(),
            AdvanceEvent::Finished => {}
        }
    }

    let summary = if quit { session.quit() } else { session.summary() };
    scheduler.flush().await;

    println!();
    if summary.finished {
        println!("{}", paint("Session complete!", Color::GREEN, use_color));
    } else {
        println!("Session ended early.");
    }
    println!(
        "{}/{} exercises done in {} answers ({} right first time)",
        summary.completed_count, summary.total_count, summary.answers, summary.first_try_count
    );

    Ok(())
}
