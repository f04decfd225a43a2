//! Applying a display mode through the primary OS entry point.

use crate::display::DisplayBackend;
use crate::error::Result;
use crate::fallback::{FallbackApplicator, FallbackReport};
use crate::mode::{ChangeScope, DisplayMode, ModeRequest};
use crate::os;
use crate::resolver::MonitorIdentity;
use std::fmt;

/// Outcome of a native display reconfiguration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplyResult {
    Successful,
    RequiresRestart,
    Failed,
    BadMode,
    NotUpdated,
    BadFlags,
    BadParam,
}

impl ApplyResult {
    /// Map a native `DISP_CHANGE_*` code. Codes outside the known set are
    /// treated as [`ApplyResult::Failed`].
    pub fn from_code(code: i32) -> Self {
        match code {
            os::DISP_CHANGE_SUCCESSFUL => ApplyResult::Successful,
            os::DISP_CHANGE_RESTART => ApplyResult::RequiresRestart,
            os::DISP_CHANGE_FAILED => ApplyResult::Failed,
            os::DISP_CHANGE_BADMODE => ApplyResult::BadMode,
            os::DISP_CHANGE_NOTUPDATED => ApplyResult::NotUpdated,
            os::DISP_CHANGE_BADFLAGS => ApplyResult::BadFlags,
            os::DISP_CHANGE_BADPARAM => ApplyResult::BadParam,
            other => {
                log::warn!("unknown display change result {other}, treating as failed");
                ApplyResult::Failed
            }
        }
    }

    /// The native code for this result.
    pub fn code(&self) -> i32 {
        match self {
            ApplyResult::Successful => os::DISP_CHANGE_SUCCESSFUL,
            ApplyResult::RequiresRestart => os::DISP_CHANGE_RESTART,
            ApplyResult::Failed => os::DISP_CHANGE_FAILED,
            ApplyResult::BadMode => os::DISP_CHANGE_BADMODE,
            ApplyResult::NotUpdated => os::DISP_CHANGE_NOTUPDATED,
            ApplyResult::BadFlags => os::DISP_CHANGE_BADFLAGS,
            ApplyResult::BadParam => os::DISP_CHANGE_BADPARAM,
        }
    }

    pub fn is_success(&self) -> bool {
        *self == ApplyResult::Successful
    }
}

impl fmt::Display for ApplyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ApplyResult::Successful => "the settings change was successful",
            ApplyResult::RequiresRestart => "the computer must be restarted for the mode to work",
            ApplyResult::Failed => "the display driver failed the specified mode",
            ApplyResult::BadMode => "the mode is not supported",
            ApplyResult::NotUpdated => "unable to write settings to the registry",
            ApplyResult::BadFlags => "an invalid set of flags was passed in",
            ApplyResult::BadParam => "an invalid parameter was passed in",
        };
        write!(f, "{text} ({})", self.code())
    }
}

/// What happened when a mode was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Result of the primary call.
    pub primary: ApplyResult,
    /// Report of the fallback path, present iff the primary call failed
    /// and the scope changes the display.
    pub fallback: Option<FallbackReport>,
    /// Scope the primary call was made with.
    pub scope: ChangeScope,
}

/// Primary apply path with a single fallback attempt.
#[derive(Debug, Clone)]
pub struct ModeApplicator<B, F> {
    backend: B,
    fallback: F,
    scope: ChangeScope,
}

impl<B: DisplayBackend, F: FallbackApplicator> ModeApplicator<B, F> {
    /// Applicator that persists modes to the registry profile.
    pub fn new(backend: B, fallback: F) -> Self {
        Self {
            backend,
            fallback,
            scope: ChangeScope::Persistent,
        }
    }

    pub fn with_scope(mut self, scope: ChangeScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn scope(&self) -> ChangeScope {
        self.scope
    }

    /// Apply `mode` to `identity`.
    ///
    /// The primary call is made exactly once. Any result other than
    /// [`ApplyResult::Successful`] runs the fallback exactly once, except
    /// under [`ChangeScope::Test`], where nothing is changed.
    pub fn apply(&self, identity: &MonitorIdentity, mode: DisplayMode) -> Result<ApplyOutcome> {
        let request = ModeRequest::new(identity.instance_name(), mode)?;
        let code = self.backend.change_mode(&request, self.scope)?;
        let primary = ApplyResult::from_code(code);
        log::info!(
            "ChangeDisplaySettingsEx({}, {mode}, {:?}) -> {primary:?}",
            identity.instance_name(),
            self.scope
        );

        let fallback = if primary.is_success() || self.scope == ChangeScope::Test {
            None
        } else {
            Some(self.fallback.apply_fallback(identity, mode))
        };

        Ok(ApplyOutcome {
            primary,
            fallback,
            scope: self.scope,
        })
    }
}

/// Ask the OS to reload the display configuration from the registry.
pub fn reset_display<B: DisplayBackend + ?Sized>(backend: &B) -> Result<ApplyResult> {
    let result = ApplyResult::from_code(backend.reset()?);
    log::info!("display reset -> {result:?}");
    Ok(result)
}
