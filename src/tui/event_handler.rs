use super::app_logic::TuiApp;
use crate::store::KeyValueStore;
use crate::tokens::StatsSource;
use anyhow::Result;
use crossterm::event;
use std::time::Duration;

pub(super) fn handle_events<S: KeyValueStore, P: StatsSource>(app: &mut TuiApp<S, P>) -> Result<()> {
    if event::poll(Duration::from_millis(50))? {
        app.handle_event(event::read()?);
    }
    Ok(())
}
