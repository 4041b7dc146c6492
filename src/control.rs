//! UI glue: commands and keyboard shortcuts applied to a session

use crate::canvas::Canvas;
use crate::config::ModelTier;
use crate::detector::LandmarkDetector;
use crate::error::OverlayError;
use crate::landmarks::Category;
use crate::scheduler::Session;
use crate::source::MediaFile;

/// A user action from the control surface
#[derive(Debug, Clone)]
pub enum ControlCommand {
    Start,
    Stop,
    SetModel(ModelTier),
    SetMultiSubject(bool),
    SetVisibility(Category, bool),
    ToggleVisibility(Category),
    SetMesh(bool),
    SetConfidenceThreshold(f32),
    LoadFile(Option<MediaFile>),
}

/// Single-letter keyboard shortcuts, no modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Start,
    Stop,
    ToggleFace,
    ToggleHands,
    TogglePose,
}

impl Shortcut {
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            's' => Some(Shortcut::Start),
            't' => Some(Shortcut::Stop),
            'f' => Some(Shortcut::ToggleFace),
            'h' => Some(Shortcut::ToggleHands),
            'p' => Some(Shortcut::TogglePose),
            _ => None,
        }
    }

    pub fn command(&self) -> ControlCommand {
        match self {
            Shortcut::Start => ControlCommand::Start,
            Shortcut::Stop => ControlCommand::Stop,
            Shortcut::ToggleFace => ControlCommand::ToggleVisibility(Category::Face),
            Shortcut::ToggleHands => ControlCommand::ToggleVisibility(Category::Hands),
            Shortcut::TogglePose => ControlCommand::ToggleVisibility(Category::Pose),
        }
    }
}

impl ControlCommand {
    /// Apply to `session`
    pub async fn apply<D, C>(self, session: &mut Session<D, C>) -> Result<(), OverlayError>
    where
        D: LandmarkDetector,
        C: Canvas,
    {
        tracing::debug!(command = ?self, "Control command");
        match self {
            ControlCommand::Start => session.start().await,
            ControlCommand::Stop => {
                session.stop();
                Ok(())
            }
            ControlCommand::SetModel(tier) => session.set_model(tier).await,
            ControlCommand::SetMultiSubject(enabled) => {
                session.set_multi_subject(enabled);
                Ok(())
            }
            ControlCommand::SetVisibility(category, visible) => {
                session.set_visibility(category, visible);
                Ok(())
            }
            ControlCommand::ToggleVisibility(category) => {
                let visible = session.toggle_visibility(category);
                tracing::info!(category = category.display_name(), visible, "Layer toggled");
                Ok(())
            }
            ControlCommand::SetMesh(visible) => {
                session.set_mesh_visible(visible);
                Ok(())
            }
            ControlCommand::SetConfidenceThreshold(value) => session.set_confidence_threshold(value),
            ControlCommand::LoadFile(file) => session.load_file(file).await,
        }
    }
}

/// Handle a key press. Unknown keys are ignored; a start key while already
/// running is logged and ignored.
pub async fn handle_key<D, C>(session: &mut Session<D, C>, key: char) -> Result<(), OverlayError>
where
    D: LandmarkDetector,
    C: Canvas,
{
    let Some(shortcut) = Shortcut::from_key(key) else {
        return Ok(());
    };
    match shortcut.command().apply(session).await {
        Err(OverlayError::InvalidTransition { from, action }) => {
            tracing::warn!(%from, action, "Shortcut ignored");
            Ok(())
        }
        other => other,
    }
}
