// Full-screen file picker for choosing the sermon recording

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "aac", "m4a"];

/// Rows moved by PageUp/PageDown
const PAGE: usize = 10;

/// Check if a path has one of the recording extensions offered by the picker
pub fn is_media_file(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let ext = ext.to_lowercase();
        return VIDEO_EXTENSIONS.contains(&ext.as_str()) || AUDIO_EXTENSIONS.contains(&ext.as_str());
    }
    false
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickerEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PickerOutcome {
    Continue,
    Selected(PathBuf),
    Cancelled,
}

pub struct FilePicker {
    title: String,
    dir: PathBuf,
    entries: Vec<PickerEntry>,
    list_state: ListState,
    show_all: bool,
    message: Option<String>,
}

impl FilePicker {
    pub fn new(dir: &Path, title: &str) -> io::Result<Self> {
        let dir = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
        let mut picker = Self {
            title: title.to_string(),
            dir,
            entries: Vec::new(),
            list_state: ListState::default(),
            show_all: false,
            message: None,
        };
        picker.reload()?;
        Ok(picker)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[PickerEntry] {
        &self.entries
    }

    pub fn selected(&self) -> Option<&PickerEntry> {
        self.list_state.selected().and_then(|i| self.entries.get(i))
    }

    /// Re-read the current directory: parent link, then folders, then files.
    /// Fails when the directory itself cannot be listed.
    pub fn reload(&mut self) -> io::Result<()> {
        let mut dirs = Vec::new();
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
        {
            let entry = match entry {
                Ok(entry) => entry,
                // The folder itself could not be read
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(_) => continue,
            };
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') && !self.show_all {
                continue;
            }

            let path = entry.path().to_path_buf();
            if entry.file_type().is_dir() {
                dirs.push(PickerEntry {
                    path,
                    name,
                    is_dir: true,
                });
            } else if self.show_all || is_media_file(&path) {
                files.push(PickerEntry {
                    path,
                    name,
                    is_dir: false,
                });
            }
        }

        let by_name = |a: &PickerEntry, b: &PickerEntry| a.name.to_lowercase().cmp(&b.name.to_lowercase());
        dirs.sort_by(by_name);
        files.sort_by(by_name);

        self.entries.clear();
        if let Some(parent) = self.dir.parent() {
            self.entries.push(PickerEntry {
                path: parent.to_path_buf(),
                name: "..".to_string(),
                is_dir: true,
            });
        }
        self.entries.extend(dirs);
        self.entries.extend(files);

        // Land on the first file when there is one, it's what the operator wants
        let first = self
            .entries
            .iter()
            .position(|e| !e.is_dir)
            .or(if self.entries.is_empty() { None } else { Some(0) });
        self.list_state.select(first);
        Ok(())
    }

    pub fn move_by(&mut self, delta: isize) {
        if self.entries.is_empty() {
            return;
        }
        let last = self.entries.len() - 1;
        let current = self.list_state.selected().unwrap_or(0);
        let next = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            (current + delta as usize).min(last)
        };
        self.list_state.select(Some(next));
    }

    fn change_dir(&mut self, dir: PathBuf) -> io::Result<()> {
        let previous = std::mem::replace(&mut self.dir, dir);
        if let Err(e) = self.reload() {
            self.dir = previous;
            self.reload()?;
            self.message = Some(format!("Cannot open folder: {}", e));
        }
        Ok(())
    }

    /// Enter a folder or choose a file
    pub fn open_selected(&mut self) -> io::Result<PickerOutcome> {
        let Some(entry) = self.selected().cloned() else {
            return Ok(PickerOutcome::Continue);
        };
        self.message = None;

        if entry.is_dir {
            if entry.name == ".." {
                self.go_parent()?;
            } else {
                self.change_dir(entry.path)?;
            }
            Ok(PickerOutcome::Continue)
        } else {
            Ok(PickerOutcome::Selected(entry.path))
        }
    }

    /// Go up one folder, keeping the folder we came from highlighted
    pub fn go_parent(&mut self) -> io::Result<()> {
        let Some(parent) = self.dir.parent().map(Path::to_path_buf) else {
            return Ok(());
        };
        let came_from = self.dir.clone();
        self.change_dir(parent)?;
        if let Some(idx) = self
            .entries
            .iter()
            .position(|e| e.is_dir && e.name != ".." && e.path == came_from)
        {
            self.list_state.select(Some(idx));
        }
        Ok(())
    }

    pub fn toggle_show_all(&mut self) -> io::Result<()> {
        self.show_all = !self.show_all;
        self.reload()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> io::Result<PickerOutcome> {
        if key.kind != KeyEventKind::Press {
            return Ok(PickerOutcome::Continue);
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(PickerOutcome::Cancelled);
            }
            KeyCode::Esc | KeyCode::Char('q') => return Ok(PickerOutcome::Cancelled),
            KeyCode::Up | KeyCode::Char('k') => self.move_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_by(1),
            KeyCode::PageUp => self.move_by(-(PAGE as isize)),
            KeyCode::PageDown => self.move_by(PAGE as isize),
            KeyCode::Home => self.list_state.select(Some(0).filter(|_| !self.entries.is_empty())),
            KeyCode::End => self.move_by(isize::MAX),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => return self.open_selected(),
            KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => self.go_parent()?,
            KeyCode::Char('.') => self.toggle_show_all()?,
            _ => {}
        }
        Ok(PickerOutcome::Continue)
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .areas(frame.area());

        let header_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", self.title))
            .title_alignment(Alignment::Center);
        frame.render_widget(
            Paragraph::new(self.dir.display().to_string()).block(header_block),
            header,
        );

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|entry| {
                if entry.is_dir {
                    ListItem::new(Line::from(Span::styled(
                        format!("{}/", entry.name),
                        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                    )))
                } else {
                    ListItem::new(Line::from(entry.name.clone()))
                }
            })
            .collect();

        let list_title = if self.show_all {
            " All files "
        } else {
            " Video and audio files "
        };
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(list_title))
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, body, &mut self.list_state);

        let help = match &self.message {
            Some(msg) => Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Red))),
            None => Line::from(vec![
                Span::styled("[Enter]", Style::default().fg(Color::Green)),
                Span::raw(" Select/Open  "),
                Span::styled("[Backspace]", Style::default().fg(Color::Green)),
                Span::raw(" Up a folder  "),
                Span::styled("[.]", Style::default().fg(Color::Green)),
                Span::raw(" All files  "),
                Span::styled("[Esc]", Style::default().fg(Color::Red)),
                Span::raw(" Cancel"),
            ]),
        };
        frame.render_widget(
            Paragraph::new(help)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL)),
            footer,
        );
    }
}

fn run_picker<B: Backend>(
    terminal: &mut Terminal<B>,
    picker: &mut FilePicker,
) -> io::Result<Option<PathBuf>> {
    loop {
        terminal.draw(|frame| picker.render(frame))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            match picker.handle_key(key)? {
                PickerOutcome::Continue => {}
                PickerOutcome::Selected(path) => return Ok(Some(path)),
                PickerOutcome::Cancelled => return Ok(None),
            }
        }
    }
}

/// Let the operator choose a recording. `None` when they cancel.
pub fn pick_file(start: &Path, title: &str) -> io::Result<Option<PathBuf>> {
    let mut picker = FilePicker::new(start, title)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e);
    }

    let result = Terminal::new(CrosstermBackend::new(io::stdout()))
        .and_then(|mut terminal| run_picker(&mut terminal, &mut picker));

    // Restore the console whatever happened inside the loop
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;

    result
}
