//! Headless front-end for scripted play.
//!
//! A line-oriented protocol over any reader/writer pair, meant for automated
//! testing and for agents playing the game:
//! - While configuring, the first line is the chapter limit (an empty line
//!   keeps the default)
//! - While playing, a number picks that choice (1-based)
//! - Lines starting with `#` are commands (`restart`, `status`, `journey`,
//!   `help`, `quit`)
//!
//! Output lines are tagged `[SETUP]`, `[STORY]`, `[CHOICES]`, `[STATUS]`,
//! `[JOURNEY]`, `[ERROR]` and `[END]`.

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::config::ChapterLimit;
use crate::controller::{Advance, Controller, ControllerError, ControllerState};
use crate::service::StoryService;

const HELP: &[&str] = &[
    "  <number>   - Take that choice",
    "  #restart   - Abandon this story and start over",
    "  #status    - Show chapter, alignment and summaries",
    "  #journey   - Show the chapters so far",
    "  #help      - Show this help",
    "  #quit      - Exit",
];

/// Run the headless protocol until `#quit` or end of input.
pub async fn run<S, R, W>(controller: &mut Controller<S>, input: R, output: &mut W) -> io::Result<()>
where
    S: StoryService + 'static,
    R: BufRead,
    W: Write,
{
    writeln!(output, "=== Adventure Headless Mode ===")?;
    writeln!(output, "Commands:")?;
    for line in HELP {
        writeln!(output, "{line}")?;
    }
    writeln!(output)?;
    prompt_for_state(controller, output)?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        controller.apply_pending_summaries();

        if let Some(command) = line.strip_prefix('#') {
            if !run_command(controller, command.trim(), output).await? {
                writeln!(output, "Goodbye!")?;
                break;
            }
            output.flush()?;
            continue;
        }

        match controller.state() {
            ControllerState::Configuring => {
                begin_story(controller, line, output).await?;
            }
            ControllerState::Playing => {
                if line.is_empty() {
                    continue;
                }
                match line.parse::<usize>() {
                    Ok(index) => take_choice(controller, index, output).await?,
                    Err(_) => writeln!(output, "[ERROR] Enter a choice number or #help.")?,
                }
            }
            ControllerState::Ended => {
                if !line.is_empty() {
                    writeln!(
                        output,
                        "[ERROR] The story has ended. Type #restart to play again or #quit to exit."
                    )?;
                }
            }
            // Transitions complete before the next line is read.
            ControllerState::Loading(_) | ControllerState::Concluding => {}
        }
        output.flush()?;
    }

    Ok(())
}

/// Handle a `#` command. Returns `false` when the session should stop.
async fn run_command<S, W>(controller: &mut Controller<S>, command: &str, output: &mut W) -> io::Result<bool>
where
    S: StoryService + 'static,
    W: Write,
{
    match command {
        "quit" | "exit" => return Ok(false),
        "restart" => match controller.restart().await {
            Ok(advance) => {
                debug!(?advance, "restarted");
                report(controller, advance, output)?;
            }
            Err(err) => writeln!(output, "[ERROR] {err}")?,
        },
        "status" => {
            let session = controller.session();
            writeln!(output, "[STATUS]")?;
            writeln!(output, "  State: {}", controller.state())?;
            writeln!(output, "  Chapter limit: {}", controller.chapter_limit())?;
            if session.chapter_count() > 0 {
                writeln!(output, "  Progress: {}", controller.progress().label())?;
                writeln!(output, "  Alignment: {}", session.alignment().display_name())?;
                writeln!(
                    output,
                    "  Summaries: {}/{}",
                    session.summary_count(),
                    session.completed_count()
                )?;
            }
            if let Some(status) = controller.status_message() {
                writeln!(output, "  Message: {status}")?;
            }
        }
        "journey" => {
            writeln!(output, "[JOURNEY]")?;
            for entry in controller.journey() {
                match (entry.summary, entry.choice) {
                    (Some(summary), _) => writeln!(output, "  Chapter {}: {summary}", entry.number)?,
                    (None, choice) => {
                        writeln!(output, "  Chapter {}: {}", entry.number, entry.excerpt)?;
                        if let Some(choice) = choice {
                            writeln!(output, "    -> {choice}")?;
                        }
                    }
                }
            }
        }
        "help" => {
            writeln!(output, "[HELP]")?;
            for line in HELP {
                writeln!(output, "{line}")?;
            }
        }
        other => writeln!(output, "[ERROR] Unknown command #{other}. Type #help for help.")?,
    }
    Ok(true)
}

async fn begin_story<S, W>(controller: &mut Controller<S>, line: &str, output: &mut W) -> io::Result<()>
where
    S: StoryService + 'static,
    W: Write,
{
    if !line.is_empty() {
        if let Err(err) = controller.configure_custom(line) {
            writeln!(output, "[ERROR] {err}")?;
            return prompt_for_state(controller, output);
        }
    }

    match controller.start_session().await {
        Ok(advance) => report(controller, advance, output),
        Err(err) => writeln!(output, "[ERROR] {err}"),
    }
}

async fn take_choice<S, W>(controller: &mut Controller<S>, index: usize, output: &mut W) -> io::Result<()>
where
    S: StoryService + 'static,
    W: Write,
{
    match controller.submit_choice(index).await {
        Ok(advance) => report(controller, advance, output),
        Err(ControllerError::MissingSession) => {
            let message = controller.status_message().unwrap_or_default().to_string();
            writeln!(output, "[ERROR] {message}")
        }
        Err(err) => writeln!(output, "[ERROR] {err}"),
    }
}

/// Print whatever the controller settled on after a transition.
fn report<S, W>(controller: &Controller<S>, advance: Advance, output: &mut W) -> io::Result<()>
where
    S: StoryService + 'static,
    W: Write,
{
    if advance == Advance::Failed {
        if let Some(status) = controller.status_message() {
            writeln!(output, "[ERROR] {status}")?;
        }
        if controller.state() == ControllerState::Playing {
            return print_chapter(controller, output, false);
        }
    }
    prompt_for_state(controller, output)
}

fn prompt_for_state<S, W>(controller: &Controller<S>, output: &mut W) -> io::Result<()>
where
    S: StoryService + 'static,
    W: Write,
{
    match controller.state() {
        ControllerState::Configuring => writeln!(
            output,
            "[SETUP] Enter a chapter limit ({}-{}), or an empty line for {}:",
            ChapterLimit::MIN,
            ChapterLimit::MAX,
            controller.chapter_limit()
        ),
        ControllerState::Playing => print_chapter(controller, output, true),
        ControllerState::Ended => {
            writeln!(output, "[END]")?;
            for para in controller.conclusion().unwrap_or_default().split("\n\n") {
                writeln!(output, "{para}")?;
            }
            writeln!(output)?;
            writeln!(output, "Type #restart to play again or #quit to exit.")
        }
        ControllerState::Loading(_) | ControllerState::Concluding => Ok(()),
    }
}

fn print_chapter<S, W>(controller: &Controller<S>, output: &mut W, show_status: bool) -> io::Result<()>
where
    S: StoryService + 'static,
    W: Write,
{
    writeln!(output, "[STORY] {}", controller.progress().label())?;
    for para in controller.current_story().unwrap_or_default().split("\n\n") {
        writeln!(output, "{para}")?;
    }
    writeln!(output)?;

    let choices = controller.current_choices();
    if choices.is_empty() {
        writeln!(output, "[CHOICES] none. Type #restart to begin again.")?;
    } else {
        writeln!(output, "[CHOICES]")?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(output, "  {}. {choice}", i + 1)?;
        }
    }
    if let Some(status) = controller.status_message().filter(|_| show_status) {
        writeln!(output, "[STATUS] {status}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use crate::testing::MockStoryService;

    async fn play(mock: MockStoryService, script: &str) -> (Controller<MockStoryService>, String) {
        let mut controller = Controller::new(mock, ControllerConfig::new());
        let mut output = Vec::new();
        run(&mut controller, script.as_bytes(), &mut output)
            .await
            .unwrap();
        (controller, String::from_utf8(output).unwrap())
    }

    #[tokio::test]
    async fn test_empty_setup_line_keeps_default_limit() {
        let mock = MockStoryService::new().with_opening("Once upon a time.", &["Go", "Stay"], Some("S1"));
        let (controller, out) = play(mock, "\n#quit\n").await;

        assert_eq!(controller.chapter_limit(), ChapterLimit::DEFAULT);
        assert!(out.contains("[STORY] Chapter 1 of 10"));
        assert!(out.contains("  2. Stay"));
        assert!(out.ends_with("Goodbye!\n"));
    }

    #[tokio::test]
    async fn test_invalid_limit_reprompts() {
        let mock = MockStoryService::new().with_opening("A", &["L"], Some("S1"));
        let (controller, out) = play(mock, "99\n4\n").await;

        assert!(out.contains("[ERROR] chapter limit must be between 3 and 50, got 99"));
        assert_eq!(controller.chapter_limit().get(), 4);
        assert_eq!(controller.state(), ControllerState::Playing);
    }

    #[tokio::test]
    async fn test_non_numeric_choice_is_an_error() {
        let mock = MockStoryService::new().with_opening("A", &["L"], Some("S1"));
        let (_, out) = play(mock, "\nleft\n9\n").await;

        assert!(out.contains("[ERROR] Enter a choice number or #help."));
        assert!(out.contains("[ERROR] choice 9 is not on offer (1 available)"));
    }

    #[tokio::test]
    async fn test_journey_shows_choice_until_summary_arrives() {
        let mock = MockStoryService::new()
            .with_opening("A", &["L"], Some("S1"))
            .with_continuation("B", &["X"])
            .delay_summary("A", std::time::Duration::from_secs(5));
        let (_, out) = play(mock, "\n1\n#journey\n").await;

        assert!(out.contains("[JOURNEY]\n  Chapter 1: A\n    -> L\n  Chapter 2: B\n"));
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let (_, out) = play(MockStoryService::new(), "#dance\n").await;
        assert!(out.contains("[ERROR] Unknown command #dance."));
    }
}
