use crate::config::Settings;

/// Settings to run with, plus the reason the config was rejected, if it was.
pub struct LoadedSettings {
    pub settings: Settings,
    pub problem: Option<String>,
}

/// Read and validate the config. A bad file never stops startup; the
/// defaults are used and the problem is reported on stderr.
pub fn load_settings() -> LoadedSettings {
    let (settings, problem) = match Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => (s, None),
            Err(msg) => (
                Settings::default(),
                Some(format!("invalid config, using defaults: {msg}")),
            ),
        },
        Err(e) => (
            Settings::default(),
            Some(format!("failed to load config, using defaults: {e}")),
        ),
    };

    if let Some(problem) = &problem {
        eprintln!("tapdeck: {problem}");
    }
    LoadedSettings { settings, problem }
}
