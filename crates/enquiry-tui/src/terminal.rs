//! Interactive terminal session for the enquiry wizard.

use crate::app::{App, InputResult};
use crate::render;
use crate::worker::SubmitWorker;
use anyhow::{bail, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use enquiry_core::{Confirmation, EnquiryTransport, SubmissionCoordinator};
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// How the interactive session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    Closed,
    Sent(Confirmation),
}

/// Run the wizard full screen until it is closed or the user quits.
///
/// The coordinator's wizard must already be open. A submission still in flight
/// at exit is given up to `drain` to reach the endpoint.
pub fn run<T>(coordinator: Arc<SubmissionCoordinator<T>>, drain: Duration) -> Result<SessionEnd>
where
    T: EnquiryTransport + 'static,
{
    use std::io::IsTerminal;

    if !std::io::stdout().is_terminal() {
        bail!(
            "No TTY detected. The enquiry wizard needs an interactive terminal.\n\
             Use `enquiry submit --file <draft.toml>` for scripted enquiries."
        );
    }

    let mut worker = SubmitWorker::new(coordinator)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(worker.coordinator().wizard().clone());
    let result = run_loop(&mut terminal, &mut app, &mut worker);

    // Restore the terminal even when the loop failed.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if worker.is_pending() {
        println!("Finishing the enquiry already on its way...");
    }
    if let Some(outcome) = worker.finish(drain) {
        info!("In-flight submission settled after exit: {:?}", outcome);
    }

    let end = result?;
    info!("Wizard session ended: {:?}", end);
    Ok(end)
}

fn run_loop<T>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    worker: &mut SubmitWorker<T>,
) -> Result<SessionEnd>
where
    T: EnquiryTransport + 'static,
{
    loop {
        terminal.draw(|f| render::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                match app.handle_input(key) {
                    InputResult::Quit => return Ok(SessionEnd::Quit),
                    InputResult::Closed => {
                        return Ok(match app.completed.take() {
                            Some(confirmation) => SessionEnd::Sent(confirmation),
                            None => SessionEnd::Closed,
                        });
                    }
                    InputResult::Submit => {
                        worker.start();
                    }
                    InputResult::Continue => {}
                }
            }
        }

        if let Some(outcome) = worker.poll() {
            app.apply_outcome(outcome);
        }
    }
}
