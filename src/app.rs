use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::Rect;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::info;

use crate::{
  action::Action,
  components::{Component, error_view::ErrorView, modal::ModalHost, settings_list::SettingsList},
  config::Config,
  mode::Mode,
  settings::{
    ItemValue, ListView, OnChange, Renderer, SharedItems,
    dialogs::{DialogRequest, Dialogs, TuiDialogs},
  },
  tui,
  tui::Tui,
};

pub struct App {
  pub config: Config,
  pub settings_list: SettingsList,
  pub modal: ModalHost,
  pub error_view: ErrorView,
  pub should_quit: bool,
  pub should_suspend: bool,
  pub mode: Mode,
  action_tx: UnboundedSender<Action>,
  action_rx: UnboundedReceiver<Action>,
  dialog_rx: UnboundedReceiver<DialogRequest>,
}

impl App {
  pub fn new(config: Config, items: SharedItems) -> Result<Self> {
    let (action_tx, action_rx) = mpsc::unbounded_channel();
    let (dialog_tx, dialog_rx) = mpsc::unbounded_channel();

    let dialogs: Arc<dyn Dialogs> = Arc::new(TuiDialogs::new(dialog_tx));
    let renderer = Renderer::new(dialogs, config.strings.info.clone());
    let changes = action_tx.clone();
    let on_change: OnChange = Arc::new(move |key: &str, value: &ItemValue| {
      let _ = changes.send(Action::ValueChanged { key: key.to_string(), value: value.to_string() });
    });
    let dispatcher = renderer.render(&ListView::new(), &items, on_change, config.sort_alphabetically);

    let mut settings_list = SettingsList::new(dispatcher);
    settings_list.register_action_handler(action_tx.clone())?;

    Ok(Self {
      config,
      settings_list,
      modal: ModalHost::new(),
      error_view: ErrorView::default(),
      should_quit: false,
      should_suspend: false,
      mode: Mode::Default,
      action_tx,
      action_rx,
      dialog_rx,
    })
  }

  fn new_tui(&self) -> Result<Tui> {
    Ok(Tui::new()?.tick_rate(self.config.tick_rate).frame_rate(self.config.frame_rate).mouse(true).paste(true))
  }

  pub async fn run(&mut self) -> Result<()> {
    let mut tui = self.new_tui()?;
    tui.enter()?;

    loop {
      while let Ok(request) = self.dialog_rx.try_recv() {
        self.modal.push(request);
        self.mode = Mode::Dialog;
        self.action_tx.send(Action::Render)?;
      }

      if let Some(e) = tui.next().await {
        match e {
          tui::Event::Quit => self.action_tx.send(Action::Quit)?,
          tui::Event::Tick => self.action_tx.send(Action::Tick)?,
          tui::Event::Render => self.action_tx.send(Action::Render)?,
          tui::Event::Resize(x, y) => self.action_tx.send(Action::Resize(x, y))?,
          _ => {},
        }
        if let Some(action) = self.handle_event(e).await? {
          self.action_tx.send(action)?;
        }
      }

      while let Ok(action) = self.action_rx.try_recv() {
        if action != Action::Tick && action != Action::Render {
          log::debug!("{action:?}");
        }

        match &action {
          Action::DialogClosed => {
            if !self.modal.is_open() {
              self.mode = Mode::Default;
            }
          },
          Action::Error(message) => {
            self.error_view.set_message(message);
            self.mode = Mode::Error;
          },
          Action::ExitError => self.mode = if self.modal.is_open() { Mode::Dialog } else { Mode::Default },
          Action::ValueChanged { key, value } => info!("App: `{}` is now {}", key, value),
          Action::Quit => self.should_quit = true,
          Action::Suspend => self.should_suspend = true,
          Action::Resume => self.should_suspend = false,
          Action::Resize(w, h) => {
            tui.resize(Rect::new(0, 0, *w, *h))?;
            self.draw(&mut tui)?;
          },
          Action::Render => self.draw(&mut tui)?,
          _ => {},
        }
        if let Some(action) = self.settings_list.update(action).await? {
          self.action_tx.send(action)?
        };
      }

      if self.should_suspend {
        tui.suspend()?;
        self.action_tx.send(Action::Resume)?;
        tui = self.new_tui()?;
        tui.enter()?;
      } else if self.should_quit {
        tui.stop()?;
        break;
      }
    }
    tui.exit()?;
    Ok(())
  }

  /// Routes a terminal event to whatever currently owns the keyboard.
  async fn handle_event(&mut self, event: tui::Event) -> Result<Option<Action>> {
    match self.mode {
      Mode::Error => self.error_view.handle_events(Some(event)).await,
      Mode::Dialog => self.modal.handle_events(Some(event)).await,
      Mode::Default => {
        let global = match &event {
          tui::Event::Key(key) => global_action(*key),
          _ => None,
        };
        match global {
          Some(action) => Ok(Some(action)),
          None => self.settings_list.handle_events(Some(event)).await,
        }
      },
    }
  }

  fn draw(&mut self, tui: &mut Tui) -> Result<()> {
    let mut failures = Vec::new();
    tui.draw(|f| {
      let area = f.area();
      let drawn = match self.mode {
        Mode::Error => self.error_view.draw(f, area),
        Mode::Default | Mode::Dialog => self.settings_list.draw(f, area).and_then(|_| self.modal.draw(f, area)),
      };
      if let Err(e) = drawn {
        failures.push(format!("Failed to draw: {:?}", e));
      }
    })?;
    for failure in failures {
      self.action_tx.send(Action::Error(failure))?;
    }
    Ok(())
  }
}

fn global_action(key: KeyEvent) -> Option<Action> {
  match key {
    KeyEvent { code: KeyCode::Char('q'), modifiers: _, state: _, kind: _ } => Some(Action::Quit),
    KeyEvent { code: KeyCode::Char('c' | 'C'), modifiers: KeyModifiers::CONTROL, state: _, kind: _ } => {
      Some(Action::Quit)
    },
    KeyEvent { code: KeyCode::Char('z' | 'Z'), modifiers: KeyModifiers::CONTROL, state: _, kind: _ } => {
      Some(Action::Suspend)
    },
    _ => None,
  }
}
