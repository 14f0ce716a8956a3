pub const TIME_SETTINGS: TimeSettings = TimeSettings {
    min_refresh_ms: 20,
    max_render_fps: 30,
};

pub const HISTORY_SETTINGS: HistorySettings = HistorySettings {
    bar_width: 5,
    bar_gap: 1,
    text_bar_width: 40,
};

pub const WINDOW_TITLES: WindowTitles = WindowTitles {
    running: "Running",
    stopped: "Stopped",
};

pub struct TimeSettings {
    pub min_refresh_ms: u64,
    pub max_render_fps: u64,
}

pub struct HistorySettings {
    pub bar_width: u16,
    pub bar_gap: u16,
    pub text_bar_width: usize,
}

pub struct WindowTitles {
    pub running: &'static str,
    pub stopped: &'static str,
}
