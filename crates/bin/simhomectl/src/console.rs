//! Interactive console over the control panel and the parameters form.
//!
//! Each input line parses into a [`Command`]; executing it yields the lines
//! to print. Notifications raised while a command ran are printed first.

use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use simhome_adapter_virtual::{VirtualFlags, VirtualHeater, VirtualHouse, VirtualParameters};
use simhome_app::event_bus::InProcessEventBus;
use simhome_app::ports::{EventPublisher, Notifier};
use simhome_app::services::parameters_form::INVALID_FILE;
use simhome_app::services::{ControlPanel, FormEntry, ParametersForm};
use simhome_domain::device::{DoorAction, DoorState, ItemKind, LightState, WindowState};
use simhome_domain::error::SimHomeError;
use simhome_domain::event::HouseEvent;
use simhome_domain::id::{DoorId, WindowId};
use simhome_domain::location::Location;
use simhome_domain::selection::{DeviceRef, ItemSelection};
use simhome_domain::time::{parse_date, parse_time_of_day};

pub type Panel = ControlPanel<Arc<VirtualHouse>, Arc<VirtualParameters>, InProcessEventBus>;

pub type Form = ParametersForm<
    Arc<VirtualHouse>,
    Arc<VirtualParameters>,
    Arc<VirtualHeater>,
    Arc<VirtualFlags>,
    Arc<QueuedNotifier>,
>;

const HELP: &str = "\
commands:
  locations                 list the locations of the house
  select <location>         select a room or outdoor area by name
  item <window|light|door>  choose the item kind
  window <id|N|E|S|W>       choose a window of the selected room
  door <id|N|E|S|W>         choose a door of the selected room
  open | close              open or close the selected window or door
  lock | unlock             lock or unlock the selected door
  on | off                  switch the light of the selected location
  status                    show the selection and the available actions
  upload <file.json>        upload a house layout
  param <field> <value>     set a parameter (name, profile, location,
                            inside, outside, date, time, summer, winter)
  save                      submit the simulation parameters
  permissions               broadcast a permissions change
  offline | online          take the house registry off or on line
  quit";

/// Notifier that queues messages until the console prints them.
#[derive(Debug, Default)]
pub struct QueuedNotifier(Mutex<Vec<String>>);

impl QueuedNotifier {
    /// Take every queued message.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for QueuedNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(message, "operator notified");
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

/// Simulation parameter addressed by `param`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamField {
    Name,
    Profile,
    Location,
    Inside,
    Outside,
    Date,
    Time,
    Summer,
    Winter,
}

impl FromStr for ParamField {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "name" => Self::Name,
            "profile" => Self::Profile,
            "location" => Self::Location,
            "inside" => Self::Inside,
            "outside" => Self::Outside,
            "date" => Self::Date,
            "time" => Self::Time,
            "summer" => Self::Summer,
            "winter" => Self::Winter,
            _ => return Err(invalid("parameter", s)),
        })
    }
}

/// A window or door, picked by id or by the wall it sits in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevicePick {
    Id(u32),
    Direction(String),
}

impl DevicePick {
    fn parse(arg: &str) -> Self {
        arg.parse()
            .map_or_else(|_| Self::Direction(arg.to_string()), Self::Id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Locations,
    Select(String),
    Item(ItemKind),
    Window(DevicePick),
    Door(DevicePick),
    Open,
    Close,
    Lock,
    Unlock,
    On,
    Off,
    Status,
    Upload(PathBuf),
    Param(ParamField, String),
    Save,
    Permissions,
    Offline,
    Online,
    Quit,
}

impl FromStr for Command {
    type Err = ConsoleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let required = |name: &'static str| {
            if rest.is_empty() {
                Err(ConsoleError::MissingArgument(name))
            } else {
                Ok(rest)
            }
        };

        Ok(match word.to_ascii_lowercase().as_str() {
            "help" | "?" => Self::Help,
            "locations" | "ls" => Self::Locations,
            "select" => Self::Select(required("select")?.to_string()),
            "item" => {
                let arg = required("item")?;
                Self::Item(arg.parse().map_err(|_| invalid("item kind", arg))?)
            }
            "window" => Self::Window(DevicePick::parse(required("window")?)),
            "door" => Self::Door(DevicePick::parse(required("door")?)),
            "open" => Self::Open,
            "close" => Self::Close,
            "lock" => Self::Lock,
            "unlock" => Self::Unlock,
            "on" => Self::On,
            "off" => Self::Off,
            "status" => Self::Status,
            "upload" => Self::Upload(PathBuf::from(required("upload")?)),
            "param" => {
                let (field, value) = required("param")?
                    .split_once(' ')
                    .ok_or(ConsoleError::MissingArgument("param"))?;
                Self::Param(field.parse()?, value.trim().to_string())
            }
            "save" => Self::Save,
            "permissions" => Self::Permissions,
            "offline" => Self::Offline,
            "online" => Self::Online,
            "quit" | "exit" => Self::Quit,
            other => return Err(ConsoleError::UnknownCommand(other.to_string())),
        })
    }
}

/// What the caller should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Lines(Vec<String>),
    Quit,
}

/// Console errors.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("unknown command `{0}`, try `help`")]
    UnknownCommand(String),

    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),

    #[error("invalid {what} `{value}`")]
    InvalidValue { what: &'static str, value: String },

    #[error("`{0}` is not available for the current selection")]
    Unavailable(&'static str),

    #[error("failed to read layout file")]
    Io(#[from] std::io::Error),

    #[error("failed to parse layout file")]
    Layout(#[from] serde_json::Error),

    #[error("command failed")]
    Domain(#[from] SimHomeError),
}

fn invalid(what: &'static str, value: &str) -> ConsoleError {
    ConsoleError::InvalidValue {
        what,
        value: value.to_string(),
    }
}

/// Render an error with its whole source chain.
#[must_use]
pub fn describe(err: &dyn Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Parse a JSON house layout.
///
/// # Errors
///
/// Returns [`ConsoleError::Io`] or [`ConsoleError::Layout`].
pub fn read_layout(path: &std::path::Path) -> Result<Vec<Location>, ConsoleError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub struct Console {
    panel: Panel,
    form: Form,
    house: Arc<VirtualHouse>,
    bus: InProcessEventBus,
    notifier: Arc<QueuedNotifier>,
}

impl Console {
    pub fn new(
        house: Arc<VirtualHouse>,
        parameters: Arc<VirtualParameters>,
        heater: Arc<VirtualHeater>,
        flags: Arc<VirtualFlags>,
        bus: InProcessEventBus,
    ) -> Self {
        let notifier = Arc::new(QueuedNotifier::default());
        let panel = ControlPanel::new(Arc::clone(&house), Arc::clone(&parameters), bus.clone());
        let form = ParametersForm::new(
            Arc::clone(&house),
            parameters,
            heater,
            flags,
            Arc::clone(&notifier),
        );
        Self {
            panel,
            form,
            house,
            bus,
            notifier,
        }
    }

    /// Mount the form and the panel, uploading `layout` first when given.
    ///
    /// # Errors
    ///
    /// Returns the first failure; a rejected layout is also notified.
    pub async fn start(&mut self, layout: Option<Vec<Location>>) -> Result<Vec<String>, ConsoleError> {
        let mut lines = Vec::new();
        if let Some(locations) = layout {
            self.form.upload_layout(locations).await?;
        }
        if self.form.mount().await? == FormEntry::Dashboard {
            lines.push("parameters already saved".to_string());
        }
        self.panel.mount().await?;
        lines.push(format!(
            "{} locations loaded, type `help` for commands",
            self.panel.locations().len()
        ));
        Ok(lines)
    }

    /// Parse and run one input line. Errors become printable lines.
    pub async fn run_line(&mut self, line: &str) -> Reply {
        if line.trim().is_empty() {
            return Reply::Lines(Vec::new());
        }
        let result = match line.parse::<Command>() {
            Ok(command) => self.execute(command).await,
            Err(err) => Err(err),
        };
        let mut lines: Vec<String> = self
            .notifier
            .drain()
            .into_iter()
            .map(|message| format!("! {message}"))
            .collect();
        match result {
            Ok(Reply::Quit) => return Reply::Quit,
            Ok(Reply::Lines(output)) => lines.extend(output),
            Err(err) => lines.push(format!("error: {}", describe(&err))),
        }
        Reply::Lines(lines)
    }

    /// Run one command.
    ///
    /// # Errors
    ///
    /// Returns whatever the panel, the form or the registry rejected.
    pub async fn execute(&mut self, command: Command) -> Result<Reply, ConsoleError> {
        tracing::debug!(?command, "executing command");
        let lines = match command {
            Command::Help => HELP.lines().map(str::to_string).collect(),
            Command::Locations => self
                .panel
                .locations()
                .iter()
                .map(|l| format!("{:<12} {}", l.key().to_string(), l.label()))
                .collect(),
            Command::Select(label) => {
                self.panel.select_location_by_label(&label).await?;
                self.status()
            }
            Command::Item(kind) => {
                self.panel.select_item_kind(kind)?;
                self.status()
            }
            Command::Window(pick) => {
                let id = self.pick_window(&pick)?;
                self.panel.select_device(DeviceRef::Window(id))?;
                self.status()
            }
            Command::Door(pick) => {
                let id = self.pick_door(&pick)?;
                self.panel.select_device(DeviceRef::Door(id))?;
                self.status()
            }
            Command::Open => self.open_or_close(true).await?,
            Command::Close => self.open_or_close(false).await?,
            Command::Lock => {
                self.panel.set_door_state(DoorState::Locked).await?;
                self.status()
            }
            Command::Unlock => {
                let to = self
                    .panel
                    .door_actions()
                    .into_iter()
                    .find_map(|action| match action {
                        DoorAction::Unlock { to } => Some(to),
                        _ => None,
                    })
                    .ok_or(ConsoleError::Unavailable("unlock"))?;
                self.panel.set_door_state(to).await?;
                self.status()
            }
            Command::On => {
                self.panel.set_light_state(LightState::On).await?;
                self.status()
            }
            Command::Off => {
                self.panel.set_light_state(LightState::Off).await?;
                self.status()
            }
            Command::Status => self.status(),
            Command::Upload(path) => {
                let locations = read_layout(&path).inspect_err(|err| {
                    tracing::warn!(path = %path.display(), error = %describe(err), "layout file rejected");
                    self.notifier.notify(INVALID_FILE);
                })?;
                self.form.upload_layout(locations).await?;
                self.panel.reset_all().await?;
                vec![format!(
                    "layout uploaded, {} locations",
                    self.panel.locations().len()
                )]
            }
            Command::Param(field, value) => {
                self.set_param(field, &value)?;
                vec![format!("{field:?} set")]
            }
            Command::Save => {
                self.form.save().await?;
                vec!["parameters saved".to_string()]
            }
            Command::Permissions => {
                self.bus.publish(HouseEvent::PermissionsChanged).await?;
                vec!["permissions change broadcast".to_string()]
            }
            Command::Offline => {
                self.house.set_reachable(false);
                vec!["house registry offline".to_string()]
            }
            Command::Online => {
                self.house.set_reachable(true);
                vec!["house registry online".to_string()]
            }
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Lines(lines))
    }

    /// Let the panel react to a bus event.
    pub async fn handle_event(&mut self, event: &HouseEvent) -> Vec<String> {
        match self.panel.handle_event(event).await {
            Ok(()) if matches!(event, HouseEvent::PermissionsChanged) => {
                vec!["permissions changed, selection cleared".to_string()]
            }
            Ok(()) => Vec::new(),
            Err(err) => {
                tracing::warn!(event = event.name(), error = %err, "failed to handle event");
                vec![format!("error: {}", describe(&err))]
            }
        }
    }

    #[must_use]
    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    #[must_use]
    pub fn form(&self) -> &Form {
        &self.form
    }

    async fn open_or_close(&mut self, open: bool) -> Result<Vec<String>, ConsoleError> {
        match self.panel.selection().item_kind() {
            Some(ItemKind::Door) => {
                let target = if open { DoorState::Open } else { DoorState::Closed };
                self.panel.set_door_state(target).await?;
            }
            Some(ItemKind::Window) => {
                let target = if open {
                    WindowState::Open
                } else {
                    WindowState::Closed
                };
                self.panel.set_window_state(target).await?;
            }
            _ => return Err(ConsoleError::Unavailable(if open { "open" } else { "close" })),
        }
        Ok(self.status())
    }

    fn pick_window(&self, pick: &DevicePick) -> Result<WindowId, ConsoleError> {
        let selection = self.panel.selection();
        let found = match pick {
            DevicePick::Id(id) => selection
                .windows()
                .iter()
                .find(|c| c.value.id.get() == *id)
                .map(|c| c.value.id),
            DevicePick::Direction(dir) => selection
                .windows()
                .iter()
                .find(|c| c.label.eq_ignore_ascii_case(dir))
                .map(|c| c.value.id),
        };
        found.ok_or_else(|| invalid("window", &pick_text(pick)))
    }

    fn pick_door(&self, pick: &DevicePick) -> Result<DoorId, ConsoleError> {
        let selection = self.panel.selection();
        let found = match pick {
            DevicePick::Id(id) => selection
                .doors()
                .iter()
                .find(|c| c.value.id.get() == *id)
                .map(|c| c.value.id),
            DevicePick::Direction(dir) => selection
                .doors()
                .iter()
                .find(|c| c.label.eq_ignore_ascii_case(dir))
                .map(|c| c.value.id),
        };
        found.ok_or_else(|| invalid("door", &pick_text(pick)))
    }

    fn set_param(&mut self, field: ParamField, value: &str) -> Result<(), ConsoleError> {
        let temperature = |value: &str| value.parse::<f64>().map_err(|_| invalid("temperature", value));
        let date = |value: &str| parse_date(value).map_err(|_| invalid("date", value));
        match field {
            ParamField::Name => self.form.set_user_name(value),
            ParamField::Profile => self.form.select_profile(value)?,
            ParamField::Location => self.form.select_user_location(value)?,
            ParamField::Inside => self.form.set_inside_temp(temperature(value)?),
            ParamField::Outside => self.form.set_outside_temp(temperature(value)?),
            ParamField::Date => self.form.set_date(date(value)?),
            ParamField::Time => self
                .form
                .set_time(parse_time_of_day(value).map_err(|_| invalid("time", value))?),
            ParamField::Summer => self.form.set_summer_start(date(value)?),
            ParamField::Winter => self.form.set_winter_start(date(value)?),
        }
        Ok(())
    }

    fn status(&self) -> Vec<String> {
        let selection = self.panel.selection();
        let Some(location) = selection.location() else {
            return vec!["nothing selected".to_string()];
        };
        let kinds: Vec<&str> = selection
            .available_item_kinds()
            .iter()
            .map(|k| k.as_str())
            .collect();
        let mut lines = vec![
            format!("location: {} ({})", location.label(), location.key()),
            format!("light: {}", location.light().state),
            format!("item kinds: {}", kinds.join(", ")),
        ];
        match selection.item() {
            ItemSelection::None => {}
            ItemSelection::Light => {
                let actions: Vec<String> = self
                    .panel
                    .light_actions()
                    .iter()
                    .map(|s| format!("switch {s}"))
                    .collect();
                lines.push(format!("light selected, actions: {}", actions.join(", ")));
            }
            ItemSelection::Window(_) => {
                for choice in selection.windows() {
                    lines.push(format!(
                        "  window {} [{}] {}",
                        choice.value.id, choice.label, choice.value.state
                    ));
                }
                if let Some(window) = selection.selected_window() {
                    let actions: Vec<String> = self
                        .panel
                        .window_actions()
                        .iter()
                        .map(|a| format!("{a:?}").to_lowercase())
                        .collect();
                    lines.push(format!(
                        "window {} selected, actions: {}",
                        window.id,
                        or_none(&actions)
                    ));
                }
            }
            ItemSelection::Door(_) => {
                for choice in selection.doors() {
                    lines.push(format!(
                        "  door {} [{}] {}",
                        choice.value.id, choice.label, choice.value.state
                    ));
                }
                if let Some(door) = selection.selected_door() {
                    let actions: Vec<String> = self
                        .panel
                        .door_actions()
                        .iter()
                        .map(|a| match a {
                            DoorAction::Unlock { to } => format!("unlock (to {to})"),
                            other => format!("{other:?}").to_lowercase(),
                        })
                        .collect();
                    lines.push(format!(
                        "door {} selected, actions: {}",
                        door.id,
                        or_none(&actions)
                    ));
                }
            }
        }
        lines
    }
}

fn pick_text(pick: &DevicePick) -> String {
    match pick {
        DevicePick::Id(id) => id.to_string(),
        DevicePick::Direction(dir) => dir.clone(),
    }
}

fn or_none(actions: &[String]) -> String {
    if actions.is_empty() {
        "none".to_string()
    } else {
        actions.join(", ")
    }
}
