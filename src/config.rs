use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub directory: DirectoryConfig,
    pub scan: ScanConfig,
    pub layout: LayoutConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Origin of the case management service (task and message endpoints live under it)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Raw Cookie header sent with every request, for authenticated sessions
    pub cookie: Option<String>,
}

/// Queue directory: which senders are handling queues and how they are labelled
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Transfer guidelines document linked from escalation guidance
    pub policy_url: String,
    pub queues: Vec<QueueConfig>,
    pub routing: RoutingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Sender address of the queue as it appears in correspondence
    pub address: String,
    /// Display label; empty means the address is shown as-is
    #[serde(default)]
    pub label: String,
    /// Whether messages from this queue count toward the transfer flow
    #[serde(default = "default_true")]
    pub target: bool,
    /// Terminal escalation destination
    #[serde(default)]
    pub problem_solver: bool,
}

/// Where an unsure handler should send a case once it reaches the HIGH tier
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Label of the queue that gets its own Problem Solver destination
    pub unloading_delays: String,
    pub when_unloading_delays: String,
    pub otherwise: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Delay between opening a task and scanning it
    pub scan_delay_ms: u64,
    /// Delay between a finished scan and the warning popup
    pub warning_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Panel width in columns
    pub panel_width: u16,
    /// Panel height cap in rows (the terminal height caps it too)
    pub panel_max_height: u16,
    /// Warning popup width in columns
    pub modal_width: u16,
}

/// Semantic theme configuration, defaults follow the case tool's dark header palette
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    // Base colors
    pub bg: String,
    pub bg_panel: String,
    pub bg_element: String,
    pub fg: String,
    pub fg_muted: String,

    // Border colors
    pub border: String,
    pub border_active: String,

    // Accent colors
    pub primary: String,
    pub current: String,

    // Tier colors
    pub clear: String,
    pub active: String,
    pub moderate: String,
    pub high: String,
    pub critical: String,
    pub neutral: String,
}

fn default_true() -> bool {
    true
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://optimus-internal-eu.amazon.com".to_string(),
            timeout_secs: 15,
            cookie: None,
        }
    }
}

/// The EU ROC outbound queues: (address, label, problem solver)
const DEFAULT_QUEUES: &[(&str, &str, bool)] = &[
    ("eu-roc-ob-unloading-delays@amazon.com", "Unloading Delays", false),
    ("eu-roc-ob-rec-monitoring@amazon.com", "Receiving Monitoring", false),
    ("fleet-preventive-maintenance@amazon.de", "Fleet Maintenance", false),
    ("eu-roc-ob-add-truck@amazon.com", "Add Truck", false),
    ("eu-roc-ob-sourcing@amazon.com", "Sourcing", false),
    ("eu-roc-loss-prevention@amazon.de", "Loss Prevention", false),
    ("eu-roc-ob-support@amazon.com", "OB Support", false),
    ("eu-roc-dm-frontline-problemsolver@amazon.com", "DM FL Problem Solver", true),
    ("eu-roc-safety@amazon.com", "Safety", false),
    ("eu-roc-ob-our-trailer@amazon.com", "OUR Trailer", false),
    ("eu-roc-dm-afp-problemsolver@amazon.com", "DM AFP Problem Solver", true),
    ("eu-fleet-support@amazon.com", "Fleet Support", false),
    ("eu-roc-ob-scheduling@amazon.com", "OB Scheduling", false),
    ("eu-roc-ob-equipement@amazon.com", "OB Equipment", false),
    ("roc-tio-missing-trailers@amazon.com", "TIO Missing Trailers", false),
    ("roc-intermodal@amazon.com", "Intermodal", false),
    ("eu-roc-ob-late-truck@amazon.com", "OB Late Truck", false),
    ("roc-intermodal-tours@amazon.com", "Intermodal Tours", false),
    ("eu-roc-rail-problemsolver@amazon.com", "Rail Problem Solver", true),
    ("eu-roc-dm-recovery-problemsolver@amazon.com", "DM R Problem Solver", true),
];

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            policy_url: "https://policy.a2z.com/docs/694472/publication".to_string(),
            queues: DEFAULT_QUEUES
                .iter()
                .map(|&(address, label, problem_solver)| QueueConfig {
                    address: address.to_string(),
                    label: label.to_string(),
                    target: true,
                    problem_solver,
                })
                .collect(),
            routing: RoutingConfig::default(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            unloading_delays: "Unloading Delays".to_string(),
            when_unloading_delays: "DM FL Problem Solver".to_string(),
            otherwise: "DM R Problem Solver".to_string(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_delay_ms: 1000,
            warning_delay_ms: 800,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            panel_width: 46,
            panel_max_height: 40,
            modal_width: 72,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            // Base colors
            bg: "#1b2430".to_string(),
            bg_panel: "#232f3e".to_string(),
            bg_element: "#2d3a4a".to_string(),
            fg: "#f7f7f5".to_string(),
            fg_muted: "#aaaaaa".to_string(),

            // Border colors
            border: "#3c4a5c".to_string(),
            border_active: "#0073bb".to_string(),

            // Accent colors
            primary: "#ff9900".to_string(),
            current: "#3b82f6".to_string(),

            // Tier colors
            clear: "#28a745".to_string(),
            active: "#0073bb".to_string(),
            moderate: "#3b82f6".to_string(),
            high: "#d97706".to_string(),
            critical: "#e53e3e".to_string(),
            neutral: "#6c757d".to_string(),
        }
    }
}

impl Config {
    /// Default config location: ~/.config/routetui/config.toml
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("routetui/config.toml"))
            .unwrap_or_else(|| {
                PathBuf::from(shellexpand::tilde("~/.config/routetui/config.toml").into_owned())
            })
    }

    /// Load from the default location, falling back to defaults on any problem
    pub fn load() -> Self {
        let config_path = Self::default_path();

        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(path = %config_path.display(), "Config error: {:#}", e),
            }
        }

        Self::default()
    }

    /// Load from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }
}

impl ThemeConfig {
    pub fn bg(&self) -> ratatui::style::Color {
        parse_color(&self.bg)
    }
    pub fn bg_panel(&self) -> ratatui::style::Color {
        parse_color(&self.bg_panel)
    }
    pub fn bg_element(&self) -> ratatui::style::Color {
        parse_color(&self.bg_element)
    }
    pub fn fg(&self) -> ratatui::style::Color {
        parse_color(&self.fg)
    }
    pub fn fg_muted(&self) -> ratatui::style::Color {
        parse_color(&self.fg_muted)
    }
    pub fn border(&self) -> ratatui::style::Color {
        parse_color(&self.border)
    }
    pub fn border_active(&self) -> ratatui::style::Color {
        parse_color(&self.border_active)
    }
    pub fn primary(&self) -> ratatui::style::Color {
        parse_color(&self.primary)
    }
    pub fn current(&self) -> ratatui::style::Color {
        parse_color(&self.current)
    }

    /// Resolve a tier color token to a terminal color
    pub fn token(&self, token: crate::cases::ColorToken) -> ratatui::style::Color {
        use crate::cases::ColorToken;

        let hex = match token {
            ColorToken::Clear => &self.clear,
            ColorToken::Active => &self.active,
            ColorToken::Moderate => &self.moderate,
            ColorToken::High => &self.high,
            ColorToken::Critical => &self.critical,
            ColorToken::Neutral => &self.neutral,
        };
        parse_color(hex)
    }
}

/// Parse color string to ratatui Color
pub fn parse_color(s: &str) -> ratatui::style::Color {
    use ratatui::style::Color;

    // Try hex first (#RRGGBB)
    if s.starts_with('#') && s.len() == 7 {
        let channel = |range: std::ops::Range<usize>| {
            s.get(range).and_then(|hex| u8::from_str_radix(hex, 16).ok())
        };
        if let (Some(r), Some(g), Some(b)) = (channel(1..3), channel(3..5), channel(5..7)) {
            return Color::Rgb(r, g, b);
        }
    }

    // Named colors
    match s.to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "white" => Color::White,
        _ => Color::White,
    }
}
