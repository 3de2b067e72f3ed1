//! Launcher settings: the structured view of the per-game settings file.
//!
//! All sections and fields are optional with defaults so a partial file is
//! valid; `effective_*` accessors apply fallbacks. Command building from the
//! path/options/arguments strings is deliberately simple (whitespace split);
//! these are operator-authored tool invocations, not a shell.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ports::CommandSpec;
use crate::sequence::{DEFAULT_EXIT_SEQUENCE, DEFAULT_LAUNCH_SEQUENCE, SequenceSpec};

/// Settings for the primary ("game") process.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameSettings {
    /// Path to the primary executable. May also be supplied on the command
    /// line as the launch target.
    pub executable: Option<String>,
    /// Working directory for the primary process; defaults to the
    /// executable's directory.
    pub directory: Option<String>,
    /// Display name, used for logging only.
    pub name: Option<String>,
}

/// Path/options/arguments triple describing one external helper tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolSettings {
    pub path: String,
    pub options: String,
    pub arguments: String,
}

impl ToolSettings {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.path.trim().is_empty()
    }

    /// Executable basename, for name-based termination.
    #[must_use]
    pub fn basename(&self) -> String {
        PathBuf::from(self.path.trim())
            .file_name()
            .map_or_else(|| self.path.trim().to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Build the tool's command line: options first, then arguments.
    #[must_use]
    pub fn command(&self) -> CommandSpec {
        CommandSpec::new(self.path.trim())
            .args(self.options.split_whitespace())
            .args(self.arguments.split_whitespace())
    }
}

/// Controller-mapper tool plus its per-player profiles.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MapperSettings {
    #[serde(flatten)]
    pub tool: ToolSettings,
    pub player1_profile: String,
    pub player2_profile: String,
}

impl MapperSettings {
    /// Build the mapper command for the supported mapper families.
    ///
    /// antimicro-family mappers take `--tray --hidden --profile <p1>` with an
    /// optional second-controller profile; joyxoff-family mappers take
    /// `-load <p1>`. Anything else falls back to the plain options/arguments
    /// invocation when those are present. Returns `None` when the mapper or
    /// its first profile is not configured.
    #[must_use]
    pub fn command(&self) -> Option<CommandSpec> {
        if !self.tool.is_configured() || self.player1_profile.trim().is_empty() {
            return None;
        }

        let family = self.tool.basename().to_ascii_lowercase();
        if family.contains("antimicro") {
            let mut spec = CommandSpec::new(self.tool.path.trim())
                .args(["--tray", "--hidden", "--profile"])
                .arg(self.player1_profile.trim());
            if !self.player2_profile.trim().is_empty() {
                spec = spec
                    .args(["--next", "--profile-controller", "2", "--profile"])
                    .arg(self.player2_profile.trim());
            }
            return Some(spec);
        }
        if family.contains("joyxoff") || family.contains("joy2key") || family.contains("keysticks")
        {
            return Some(
                CommandSpec::new(self.tool.path.trim())
                    .arg("-load")
                    .arg(self.player1_profile.trim()),
            );
        }
        if !self.tool.options.trim().is_empty() || !self.tool.arguments.trim().is_empty() {
            return Some(self.tool.command());
        }
        None
    }
}

/// Multi-monitor tool and its two layout configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MonitorSettings {
    #[serde(flatten)]
    pub tool: ToolSettings,
    /// Layout loaded while the game runs.
    pub gaming_config: String,
    /// Layout restored on exit.
    pub desktop_config: String,
}

impl MonitorSettings {
    /// `<tool> /load <config>` when both tool and config are set.
    #[must_use]
    pub fn load_command(&self, config: &str) -> Option<CommandSpec> {
        if !self.tool.is_configured() || config.trim().is_empty() {
            return None;
        }
        Some(
            CommandSpec::new(self.tool.path.trim())
                .arg("/load")
                .arg(config.trim()),
        )
    }
}

/// External helper tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolsSettings {
    pub controller_mapper: MapperSettings,
    pub borderless: ToolSettings,
    pub monitor: MonitorSettings,
}

/// One pre/post hook slot: a tool invocation plus a wait flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HookSettings {
    pub path: String,
    pub options: String,
    pub arguments: String,
    /// Block the sequence until the hook exits instead of tracking it.
    pub wait: bool,
}

impl HookSettings {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.path.trim().is_empty()
    }

    #[must_use]
    pub fn command(&self) -> CommandSpec {
        CommandSpec::new(self.path.trim())
            .args(self.options.split_whitespace())
            .args(self.arguments.split_whitespace())
    }
}

/// The hook slots addressable from sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookSlot {
    Pre1,
    Pre2,
    Pre3,
    Post1,
    Post2,
    Post3,
    JustAfterLaunch,
    JustBeforeExit,
}

impl HookSlot {
    /// The action name this slot answers to, doubling as its registry key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Pre1 => "Pre1",
            Self::Pre2 => "Pre2",
            Self::Pre3 => "Pre3",
            Self::Post1 => "Post1",
            Self::Post2 => "Post2",
            Self::Post3 => "Post3",
            Self::JustAfterLaunch => "JustAfterLaunch",
            Self::JustBeforeExit => "JustBeforeExit",
        }
    }
}

/// Hook configuration by slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HooksSettings {
    pub pre1: HookSettings,
    pub pre2: HookSettings,
    pub pre3: HookSettings,
    pub post1: HookSettings,
    pub post2: HookSettings,
    pub post3: HookSettings,
    pub just_after_launch: HookSettings,
    pub just_before_exit: HookSettings,
}

impl HooksSettings {
    #[must_use]
    pub fn slot(&self, slot: HookSlot) -> &HookSettings {
        match slot {
            HookSlot::Pre1 => &self.pre1,
            HookSlot::Pre2 => &self.pre2,
            HookSlot::Pre3 => &self.pre3,
            HookSlot::Post1 => &self.post1,
            HookSlot::Post2 => &self.post2,
            HookSlot::Post3 => &self.post3,
            HookSlot::JustAfterLaunch => &self.just_after_launch,
            HookSlot::JustBeforeExit => &self.just_before_exit,
        }
    }
}

/// Borderless helper behavior for the run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BorderlessMode {
    /// Helper is not launched.
    #[default]
    Off,
    /// Helper is launched after the primary process.
    Enabled,
    /// Helper is launched and left running on exit even when
    /// `terminate_borderless_on_exit` is set.
    Keep,
}

/// Run-level option flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OptionsSettings {
    /// Launch the primary process elevated.
    pub run_as_admin: bool,
    /// Hide the taskbar for the duration of the run (the `No-TB` action).
    pub hide_taskbar: bool,
    pub borderless: BorderlessMode,
    pub terminate_borderless_on_exit: bool,
    /// Enable the kill-list sweep (`Kill-List` action and end-of-run).
    pub use_kill_list: bool,
    /// Executable basenames to terminate by name.
    pub kill_list: Vec<String>,
    /// Archive the saves directory before launching.
    pub backup_saves: bool,
    /// Backups retained after rotation.
    pub max_backups: u32,
}

impl Default for OptionsSettings {
    fn default() -> Self {
        Self {
            run_as_admin: false,
            hide_taskbar: false,
            borderless: BorderlessMode::Off,
            terminate_borderless_on_exit: false,
            use_kill_list: false,
            kill_list: Vec::new(),
            backup_saves: false,
            max_backups: 5,
        }
    }
}

/// The two sequence strings. Absent or empty strings fall back to the
/// defaults the launcher has always used.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SequenceSettings {
    pub launch: Option<String>,
    pub exit: Option<String>,
}

/// Top-level settings structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LauncherSettings {
    pub game: GameSettings,
    pub tools: ToolsSettings,
    pub hooks: HooksSettings,
    pub options: OptionsSettings,
    pub sequences: SequenceSettings,
}

impl LauncherSettings {
    /// Parse settings from a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(raw).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// The launch sequence, falling back to the built-in default.
    #[must_use]
    pub fn effective_launch_sequence(&self) -> SequenceSpec {
        Self::effective_sequence(self.sequences.launch.as_deref(), DEFAULT_LAUNCH_SEQUENCE)
    }

    /// The exit sequence, falling back to the built-in default.
    #[must_use]
    pub fn effective_exit_sequence(&self) -> SequenceSpec {
        Self::effective_sequence(self.sequences.exit.as_deref(), DEFAULT_EXIT_SEQUENCE)
    }

    fn effective_sequence(configured: Option<&str>, default: &str) -> SequenceSpec {
        match configured {
            Some(raw) if !raw.trim().is_empty() => SequenceSpec::parse(raw),
            _ => SequenceSpec::parse(default),
        }
    }

    /// Command for the primary process, when an executable is configured.
    ///
    /// The working directory defaults to the executable's own directory.
    #[must_use]
    pub fn game_command(&self) -> Option<CommandSpec> {
        let exe = self.game.executable.as_deref().map(str::trim)?;
        if exe.is_empty() {
            return None;
        }
        let program = PathBuf::from(exe);
        let cwd = self
            .game
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                program
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(PathBuf::from)
            });
        let mut spec = CommandSpec::new(program);
        if let Some(dir) = cwd {
            spec = spec.current_dir(dir);
        }
        Some(spec)
    }

    /// Display name for logging: configured name, else the executable stem.
    #[must_use]
    pub fn game_display_name(&self) -> String {
        if let Some(name) = self.game.name.as_deref() {
            if !name.trim().is_empty() {
                return name.trim().to_string();
            }
        }
        self.game
            .executable
            .as_deref()
            .and_then(|exe| {
                PathBuf::from(exe.trim())
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "game".to_string())
    }
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("settings file is not valid JSON: {0}")]
    Parse(String),

    #[error("max_backups must be between 1 and 100, got {0}")]
    InvalidMaxBackups(u32),

    #[error("kill_list entries must not be empty")]
    EmptyKillListEntry,

    #[error("kill list is enabled but empty")]
    EmptyKillList,
}

/// Validate settings values.
pub fn validate_settings(settings: &LauncherSettings) -> Result<(), SettingsError> {
    let options = &settings.options;

    if options.backup_saves && !(1..=100).contains(&options.max_backups) {
        return Err(SettingsError::InvalidMaxBackups(options.max_backups));
    }

    if options.use_kill_list {
        if options.kill_list.is_empty() {
            return Err(SettingsError::EmptyKillList);
        }
        if options.kill_list.iter().any(|name| name.trim().is_empty()) {
            return Err(SettingsError::EmptyKillListEntry);
        }
    }

    Ok(())
}
