//! Concrete scene content, selected by `SceneChoice`.

mod basic;
mod pitch;
mod playground;

pub use basic::BasicScene;
pub use pitch::PitchScene;
pub use playground::PlaygroundScene;

use crate::config::SceneChoice;
use physics::{ActorId, Result, Scene, SceneContent};

/// The closed set of sandbox scenes.
pub enum SandboxScene {
    Basic(BasicScene),
    Pitch(PitchScene),
    Playground(PlaygroundScene),
}

impl SandboxScene {
    pub fn new(choice: SceneChoice) -> Self {
        match choice {
            SceneChoice::Basic => Self::Basic(BasicScene::default()),
            SceneChoice::Pitch => Self::Pitch(PitchScene::default()),
            SceneChoice::Playground => Self::Playground(PlaygroundScene::default()),
        }
    }

    /// Actor whose pose and velocity the driver prints.
    pub fn tracked(&self) -> Option<ActorId> {
        match self {
            Self::Basic(s) => s.tracked(),
            Self::Pitch(s) => s.tracked(),
            Self::Playground(s) => s.tracked(),
        }
    }
}

impl SceneContent for SandboxScene {
    fn custom_init(&mut self, scene: &mut Scene) -> Result<()> {
        match self {
            Self::Basic(s) => s.custom_init(scene),
            Self::Pitch(s) => s.custom_init(scene),
            Self::Playground(s) => s.custom_init(scene),
        }
    }

    fn custom_update(&mut self, scene: &mut Scene) -> Result<()> {
        match self {
            Self::Basic(s) => s.custom_update(scene),
            Self::Pitch(s) => s.custom_update(scene),
            Self::Playground(s) => s.custom_update(scene),
        }
    }
}
