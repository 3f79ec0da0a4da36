/// One-shot overrides for the next contract validation.
///
/// Every setting applies to exactly one check. The `take_*` accessors return
/// the current value and reset it, so a setting cannot leak into a later
/// call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationControls {
    forced_path: Option<String>,
    skip_request: bool,
    skip_response: bool,
}

impl ValidationControls {
    /// Validate the next exchange against `path` instead of the resolved template.
    /// An empty path clears the override.
    pub fn force_path(&mut self, path: impl Into<String>) {
        let path = path.into();
        self.forced_path = (!path.is_empty()).then_some(path);
    }

    pub fn skip_request(&mut self) {
        self.skip_request = true;
    }

    pub fn skip_response(&mut self) {
        self.skip_response = true;
    }

    pub fn take_forced_path(&mut self) -> Option<String> {
        self.forced_path.take()
    }

    pub fn take_skip_request(&mut self) -> bool {
        std::mem::take(&mut self.skip_request)
    }

    pub fn take_skip_response(&mut self) -> bool {
        std::mem::take(&mut self.skip_response)
    }

    /// `true` when both skips are pending, clearing both.
    ///
    /// Leaves everything untouched otherwise, including a pending forced
    /// path, which stays for the next call that actually validates.
    pub fn take_skip_both(&mut self) -> bool {
        if self.skip_request && self.skip_response {
            self.skip_request = false;
            self.skip_response = false;
            true
        } else {
            false
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}
