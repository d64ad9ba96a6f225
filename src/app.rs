use ratatui::layout::Rect;
use std::sync::Arc;
use std::time::{Duration, Instant};

use routetui::cases::{QueueDirectory, ScanOutcome, ScanReport, task_id_from_url};
use routetui::config::Config;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Panel,
    /// Typing a task URL into the help bar
    Navigate,
    /// Escalation warning popup is open
    Warning,
}

/// What the panel's status line says
#[derive(Debug, Clone, PartialEq)]
pub enum ScanStatus {
    Loading,
    NoTask,
    Scanning,
    NoCase,
    Complete { case_id: String, transfer_count: usize },
}

/// Header drag in progress: where the mouse went down and where the panel was
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    start: (u16, u16),
    origin: (u16, u16),
    moved: bool,
}

/// Presentation state of the floating panel. Reset when leaving a case.
#[derive(Debug, Default)]
pub struct PanelState {
    pub minimized: bool,
    /// Top-left corner once dragged; `None` keeps it anchored bottom-right
    pub position: Option<(u16, u16)>,
    pub drag: Option<Drag>,
    pub scroll: u16,
    pub last_scanned_task: Option<String>,
    pub last_report: Option<ScanReport>,
}

impl PanelState {
    fn reset_cache(&mut self) {
        self.last_scanned_task = None;
        self.last_report = None;
    }

    /// Whether a finished scan for this task is already on screen
    fn has_result_for(&self, task_id: &str) -> bool {
        self.last_scanned_task.as_deref() == Some(task_id) && self.last_report.is_some()
    }
}

/// Mouse movement (in cells) before a press on the header becomes a drag
const DRAG_THRESHOLD: u16 = 3;
/// Cells at the header's right end that toggle minimize ("[—]" plus corner)
const MINIMIZE_HIT_WIDTH: u16 = 5;

pub struct App {
    pub config: Arc<Config>,
    pub directory: Arc<QueueDirectory>,
    pub view: View,
    pub should_quit: bool,
    pub status_message: Option<String>,
    /// Panel is shown only while a case task is open
    pub visible: bool,
    pub task_id: Option<String>,
    pub scan_status: ScanStatus,
    pub panel: PanelState,
    pub url_input: String,
    // Mouse tracking - panel area from the last render
    pub panel_area: Rect,
    pub screen: Rect,
    // Debounced actions: scheduled at
    pending_scan: Option<Instant>,
    pending_warning: Option<Instant>,
}

impl App {
    pub fn new(config: Arc<Config>, directory: Arc<QueueDirectory>) -> Self {
        Self {
            config,
            directory,
            view: View::Panel,
            should_quit: false,
            status_message: None,
            visible: false,
            task_id: None,
            scan_status: ScanStatus::Loading,
            panel: PanelState::default(),
            url_input: String::new(),
            panel_area: Rect::default(),
            screen: Rect::default(),
            pending_scan: None,
            pending_warning: None,
        }
    }

    pub fn set_status(&mut self, msg: &str) {
        self.status_message = Some(msg.to_string());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Follow a case tool URL: show the panel for task pages, hide it elsewhere
    pub fn navigate(&mut self, url: &str) {
        match task_id_from_url(url) {
            Some(task_id) => {
                let task_id = task_id.to_string();
                self.open_task(task_id);
            }
            None => self.leave_case(),
        }
    }

    /// Show the panel for a task and schedule a scan
    pub fn open_task(&mut self, task_id: String) {
        tracing::debug!(task_id = %task_id, "Opened task");
        self.visible = true;
        self.task_id = Some(task_id);
        self.pending_scan = Some(Instant::now());
    }

    /// Navigated away from a case: hide the panel and forget the last scan
    pub fn leave_case(&mut self) {
        self.visible = false;
        self.task_id = None;
        self.pending_scan = None;
        self.pending_warning = None;
        self.panel.reset_cache();
        self.scan_status = ScanStatus::NoTask;
        if self.view == View::Warning {
            self.view = View::Panel;
        }
    }

    /// Check if the scheduled scan is due (scan delay elapsed)
    pub fn check_pending_scan(&mut self) -> bool {
        let delay = Duration::from_millis(self.config.scan.scan_delay_ms);
        if self.pending_scan.is_some_and(|at| at.elapsed() >= delay) {
            self.pending_scan = None;
            return true;
        }
        false
    }

    /// Drop the cached result so the next scan hits the source again
    pub fn request_rescan(&mut self) {
        self.panel.reset_cache();
        self.pending_scan = None;
    }

    /// Start a scan of the current task. Returns the task id to scan, or
    /// `None` when there is no task or its result is already cached.
    pub fn begin_scan(&mut self) -> Option<String> {
        let Some(task_id) = self.task_id.clone() else {
            self.scan_status = ScanStatus::NoTask;
            return None;
        };
        if self.panel.has_result_for(&task_id) {
            return None;
        }
        self.scan_status = ScanStatus::Scanning;
        Some(task_id)
    }

    /// Store a finished scan and schedule the warning when it calls for one
    pub fn finish_scan(&mut self, report: ScanReport) {
        if self.task_id.as_deref() != Some(report.task_id.as_str()) {
            // Navigated elsewhere while the scan ran
            return;
        }

        self.scan_status = match &report.outcome {
            ScanOutcome::NoCase => ScanStatus::NoCase,
            ScanOutcome::Analyzed(analysis) => ScanStatus::Complete {
                case_id: analysis.case_id.clone(),
                transfer_count: analysis.transfer_count,
            },
        };
        if report
            .analysis()
            .is_some_and(|analysis| analysis.escalation.needs_warning())
        {
            self.pending_warning = Some(Instant::now());
        }
        self.panel.scroll = 0;
        self.panel.last_scanned_task = Some(report.task_id.clone());
        self.panel.last_report = Some(report);
    }

    /// Check if the warning popup is due and open it
    pub fn check_pending_warning(&mut self) -> bool {
        let delay = Duration::from_millis(self.config.scan.warning_delay_ms);
        if self.pending_warning.is_some_and(|at| at.elapsed() >= delay) {
            self.pending_warning = None;
            if self.view != View::Navigate {
                self.view = View::Warning;
            }
            return true;
        }
        false
    }

    pub fn dismiss_warning(&mut self) {
        self.view = View::Panel;
    }

    /// Reopen the warning for the case on screen, if it had one
    pub fn show_warning(&mut self) -> bool {
        let has_warning = self
            .panel
            .last_report
            .as_ref()
            .and_then(|report| report.analysis())
            .is_some_and(|analysis| analysis.escalation.needs_warning());
        if has_warning {
            self.view = View::Warning;
        }
        has_warning
    }

    pub fn toggle_minimized(&mut self) {
        self.panel.minimized = !self.panel.minimized;
    }

    pub fn start_navigate(&mut self) {
        self.url_input.clear();
        self.view = View::Navigate;
    }

    pub fn submit_navigate(&mut self) {
        let url = std::mem::take(&mut self.url_input);
        self.view = View::Panel;
        self.navigate(url.trim());
        if !self.visible {
            self.set_status("Not a task URL");
        }
    }

    pub fn cancel_navigate(&mut self) {
        self.url_input.clear();
        self.view = View::Panel;
    }

    pub fn scroll_down(&mut self) {
        self.panel.scroll = self.panel.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.panel.scroll = self.panel.scroll.saturating_sub(1);
    }

    /// Update areas from the last render (called during render)
    pub fn set_areas(&mut self, screen: Rect, panel: Rect) {
        self.screen = screen;
        self.panel_area = panel;
    }

    /// Mouse down: start a drag when it lands on the panel's header row
    pub fn mouse_down(&mut self, x: u16, y: u16) {
        let area = self.panel_area;
        if !self.visible || area.width == 0 {
            return;
        }
        let on_header = y == area.y && x >= area.x && x < area.x + area.width;
        if on_header {
            self.panel.drag = Some(Drag {
                start: (x, y),
                origin: (area.x, area.y),
                moved: false,
            });
        }
    }

    /// Mouse drag: move the panel once past the threshold, kept on screen
    pub fn mouse_drag(&mut self, x: u16, y: u16) {
        let Some(drag) = self.panel.drag.as_mut() else {
            return;
        };
        let dx = i32::from(x) - i32::from(drag.start.0);
        let dy = i32::from(y) - i32::from(drag.start.1);
        if dx.unsigned_abs() > u32::from(DRAG_THRESHOLD) || dy.unsigned_abs() > u32::from(DRAG_THRESHOLD) {
            drag.moved = true;
        }
        if !drag.moved {
            return;
        }

        let max_x = self.screen.width.saturating_sub(self.panel_area.width);
        let max_y = self.screen.height.saturating_sub(self.panel_area.height);
        let new_x = (i32::from(drag.origin.0) + dx).clamp(0, i32::from(max_x));
        let new_y = (i32::from(drag.origin.1) + dy).clamp(0, i32::from(max_y));
        // Both bounds fit in u16 after the clamp
        self.panel.position = Some((new_x as u16, new_y as u16));
    }

    /// Whether a click lands on the minimize toggle at the header's right end
    pub fn on_minimize_button(&self, x: u16, y: u16) -> bool {
        let area = self.panel_area;
        let right = area.x + area.width;
        self.visible && area.width > 0 && y == area.y && x < right && x + MINIMIZE_HIT_WIDTH >= right
    }

    /// Mouse up: end the drag. Returns true if the panel moved.
    pub fn mouse_up(&mut self) -> bool {
        self.panel
            .drag
            .take()
            .is_some_and(|drag| drag.moved)
    }
}
