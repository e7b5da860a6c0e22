use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use optin_modal::config::{AppConfig, GlobalAction, KeyResolver};
use optin_modal::event::ModalEvent;
use optin_modal::host::Page;
use optin_modal::markup;
use ratatui::layout::{Position, Rect};
use tracing::{debug, error, info};

use crate::Theme;
use crate::tui::{Event, Tui};
use crate::view::{self, HitMap};

pub struct App {
    page: Page,
    resolver: Arc<KeyResolver>,
    theme: Theme,
    hits: HitMap,
    status: Option<String>,
    last_tick: Instant,
    should_quit: bool,
    should_suspend: bool,
}

impl App {
    pub fn new(config: &AppConfig, resolver: Arc<KeyResolver>, theme: Theme) -> Self {
        let document = markup::consent_page(&config.modal.elements);
        Self {
            page: Page::new(document, &config.modal, Arc::clone(&resolver)),
            resolver,
            theme,
            hits: HitMap::default(),
            status: None,
            last_tick: Instant::now(),
            should_quit: false,
            should_suspend: false,
        }
    }

    /// Opens the dialog before the first frame, as if a trigger was used.
    pub fn open_dialog(&mut self) {
        self.page.open(None);
        self.handle_page_events();
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        // The tick rate drives the dialog's focus and reset delays.
        let mut tui = Tui::new(60.0, 50.0)?;
        tui.enter()?;

        loop {
            self.handle_events(&mut tui).await?;
            if self.should_suspend {
                tui.suspend()?;
                self.should_suspend = false;
                tui.enter()?;
                tui.clear()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        Ok(())
    }

    async fn handle_events(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        let Some(event) = tui.next_event().await else {
            self.should_quit = true;
            return Ok(());
        };

        match event {
            Event::Init => self.last_tick = Instant::now(),
            Event::Quit => self.should_quit = true,
            Event::Error(message) => error!(%message, "Terminal event error"),
            Event::Tick => {
                let now = Instant::now();
                self.page.tick(now.duration_since(self.last_tick));
                self.last_tick = now;
            }
            Event::Render => self.render(tui)?,
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                self.render(tui)?;
            }
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Paste(text) => self.page.paste(&text),
        }

        self.handle_page_events();
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.resolver.matches_global(&key, GlobalAction::Suspend) {
            self.should_suspend = true;
            return;
        }
        if self.page.key(key) {
            return;
        }
        if !self.page.is_open()
            && !self.page.is_editing()
            && self.resolver.matches_global(&key, GlobalAction::Quit)
        {
            self.should_quit = true;
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let position = Position::new(mouse.column, mouse.row);
        if self.hits.contains(position) {
            self.page.click(self.hits.hit(position));
        }
    }

    fn handle_page_events(&mut self) {
        for event in self.page.drain_events() {
            match event {
                ModalEvent::Opened => {
                    debug!("Dialog opened");
                    self.status = None;
                }
                ModalEvent::Closed => debug!("Dialog closed"),
                ModalEvent::Submitted(opt_in) => {
                    info!(phone = %opt_in.phone, email = %opt_in.email, "Opt-in received");
                    self.status = Some(format!("Subscribed {}", opt_in.email));
                }
            }
        }
    }

    fn render(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        tui.draw(|frame| {
            view::render(
                frame,
                &self.page,
                &self.resolver,
                &self.theme,
                self.status.as_deref(),
                &mut self.hits,
            );
        })?;
        Ok(())
    }
}
