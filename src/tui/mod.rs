mod app_logic;
mod app_state;
mod event_handler;
mod ui_renderer;

pub use app_logic::TuiApp;
pub use app_state::ShellState;

pub use self::run_tui::run_tui;

// Terminal setup/teardown and the main loop
mod run_tui {
    use super::app_logic::TuiApp;
    use super::event_handler::handle_events;
    use super::ui_renderer::ui_frame;
    use crate::store::KeyValueStore;
    use crate::tokens::StatsSource;
    use anyhow::Result;
    use crossterm::{
        event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };
    use ratatui::prelude::{CrosstermBackend, Terminal};
    use std::io::{self, Stdout};

    /// Runs the shell until the user quits and hands the app back so the
    /// caller can inspect the final language and store.
    pub fn run_tui<S: KeyValueStore, P: StatsSource>(mut app: TuiApp<S, P>) -> Result<TuiApp<S, P>> {
        let mut terminal = init_terminal()?;

        let loop_result = (|| -> Result<()> {
            while !app.should_quit() {
                terminal.draw(|frame| ui_frame(frame, &app))?;
                handle_events(&mut app)?;
            }
            Ok(())
        })();

        restore_terminal(terminal)?;
        loop_result.map(|()| app)
    }

    fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend).map_err(Into::into)
    }

    fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            DisableBracketedPaste,
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor().map_err(Into::into)
    }
}
