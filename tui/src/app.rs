use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use todo_core::{ApiError, Filter, Todo, TodoStore, Transport};
use tracing::info;

/// Which form field receives typed characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Title,
    Description,
}

impl Field {
    fn other(self) -> Self {
        match self {
            Field::Title => Field::Description,
            Field::Description => Field::Title,
        }
    }
}

/// Create/edit form state. `edit_id` is set when editing an existing todo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    pub title: String,
    pub description: String,
    pub focus: Field,
    pub edit_id: Option<String>,
}

impl Form {
    fn for_edit(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone(),
            focus: Field::Title,
            edit_id: Some(todo.id.clone()),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.edit_id.is_some()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_edit() {
            "Update"
        } else {
            "Add Task"
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
        }
    }
}

/// Status message for user feedback
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub timestamp: Instant,
    pub message_type: StatusType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusType {
    Success,
    Error,
}

/// Main application state, owned by the event loop and lent to `ui::draw`
pub struct App<T> {
    pub store: TodoStore<T>,
    pub filter: Filter,
    /// Index into the filtered view
    pub selected: usize,
    pub form: Option<Form>,
    pub status_message: Option<StatusMessage>,
    /// True until the first load settles, successfully or not
    pub loading: bool,
    pub should_quit: bool,
}

impl<T: Transport> App<T> {
    pub fn new(store: TodoStore<T>) -> Self {
        Self {
            store,
            filter: Filter::All,
            selected: 0,
            form: None,
            status_message: None,
            loading: true,
            should_quit: false,
        }
    }

    /// The filtered view the list renders
    pub fn visible(&self) -> Vec<&Todo> {
        self.store.filter(self.filter)
    }

    pub fn selected_todo(&self) -> Option<&Todo> {
        self.visible().get(self.selected).copied()
    }

    pub fn reload(&mut self) {
        let result = self.store.load_all();
        self.loading = false;
        if let Err(e) = result {
            self.show_error("Could not load tasks", &e);
        }
        self.clamp_selection();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.form.is_some() {
            self.handle_form_key(key);
        } else {
            self.handle_list_key(key.code);
        }
    }

    fn handle_list_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Tab => self.set_filter(self.filter.next()),
            KeyCode::BackTab => self.set_filter(self.filter.prev()),
            KeyCode::Char('1') => self.set_filter(Filter::All),
            KeyCode::Char('2') => self.set_filter(Filter::Pending),
            KeyCode::Char('3') => self.set_filter(Filter::Completed),
            KeyCode::Char('a') | KeyCode::Char('n') | KeyCode::Char('+') => {
                self.form = Some(Form::default());
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(todo) = self.selected_todo() {
                    self.form = Some(Form::for_edit(todo));
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => self.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.form = None,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                form.focus = form.focus.other();
            }
            KeyCode::Enter => self.submit_form(),
            KeyCode::Backspace => {
                form.focused_mut().pop();
            }
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                form.focused_mut().push(c);
            }
            _ => {}
        }
    }

    /// Send the form; it closes only when the server accepted it
    fn submit_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let result = match &form.edit_id {
            Some(id) => self.store.update(id, &form.title, &form.description),
            None => self.store.create(&form.title, &form.description),
        };
        let verb = if form.is_edit() { "updated" } else { "added" };
        match result {
            Ok(()) => {
                info!(verb, "form submitted");
                self.form = None;
                self.show_success(&format!("Task {verb}"));
                self.clamp_selection();
            }
            Err(e) => self.show_error("Could not save task", &e),
        }
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_todo().map(|t| t.id.clone()) else {
            return;
        };
        match self.store.toggle_status(&id) {
            Ok(()) => self.clamp_selection(),
            Err(e) => self.show_error("Could not update status", &e),
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected_todo().map(|t| t.id.clone()) else {
            return;
        };
        match self.store.delete(&id) {
            Ok(()) => {
                self.show_success("Task deleted");
                self.clamp_selection();
            }
            Err(e) => self.show_error("Could not delete task", &e),
        }
    }

    fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.selected = 0;
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
    }

    /// Keep the cursor on a row after the filtered view shrinks
    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn show_success(&mut self, text: &str) {
        self.status_message = Some(StatusMessage {
            text: text.to_string(),
            timestamp: Instant::now(),
            message_type: StatusType::Success,
        });
    }

    /// Input errors are shown as-is; request failures get the action as context
    fn show_error(&mut self, context: &str, error: &ApiError) {
        let text = if error.is_local() {
            error.to_string()
        } else {
            format!("{context}: {error}")
        };
        self.status_message = Some(StatusMessage {
            text,
            timestamp: Instant::now(),
            message_type: StatusType::Error,
        });
    }

    /// Drop the status message once it is older than `max_age`
    pub fn update_status_message(&mut self, max_age: Duration) {
        if self
            .status_message
            .as_ref()
            .is_some_and(|m| m.timestamp.elapsed() >= max_age)
        {
            self.status_message = None;
        }
    }
}
